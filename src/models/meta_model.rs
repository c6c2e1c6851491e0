//! models/meta_model.rs
//! Respuesta de `GET config-meta`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::bundle_model::GroupableColumn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ModuleGroupingMeta {
    #[serde(default, rename = "groupingSupported", alias = "grouping_supported")]
    pub grouping_supported: bool,
    #[serde(default, rename = "groupableColumns", alias = "groupable_columns")]
    pub groupable_columns: Vec<GroupableColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RendererCompatibility {
    #[serde(default)]
    pub background_image: bool,
    #[serde(default)]
    pub alpha: bool,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigMeta {
    #[serde(default)]
    pub supported_fonts: Vec<String>,
    #[serde(default)]
    pub accepted_color_formats: Vec<String>,
    #[serde(default, rename = "moduleGrouping", alias = "module_grouping")]
    pub module_grouping: IndexMap<String, ModuleGroupingMeta>,
    #[serde(default)]
    pub renderer_compatibility: IndexMap<String, RendererCompatibility>,
}

impl ConfigMeta {
    /// `true` si la fuente es conocida (o si el backend no publicó la lista).
    pub fn supports_font(&self, font_family: &str) -> bool {
        self.supported_fonts.is_empty()
            || self
                .supported_fonts
                .iter()
                .any(|font| font.eq_ignore_ascii_case(font_family))
    }
}
