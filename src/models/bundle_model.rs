//! models/bundle_model.rs
//! Agregado persistido: config global, presets, overrides por módulo y metadatos.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::export_config_model::{null_as_default, ExportConfig};
use crate::models::meta_model::ConfigMeta;
use crate::models::patch_model::ConfigPatch;

/// Clave del ámbito sintético "global" (no es un módulo real).
pub const GLOBAL_SCOPE: &str = "global";

/// Forma en el cable de la config de un módulo: `{ override_global, config }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModuleConfig {
    #[serde(default)]
    pub override_global: bool,
    #[serde(default)]
    pub config: ConfigPatch,
}

/// Estado de un módulo respecto de la config global.
///
/// `Inherited` puede conservar un borrador suspendido (la config que tenía
/// cuando se desactivó el override) pero nunca participa en la resolución.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ModuleConfig", into = "ModuleConfig")]
pub enum ModuleScope {
    Inherited { suspended: Option<ConfigPatch> },
    Overridden(ConfigPatch),
}

impl Default for ModuleScope {
    fn default() -> Self {
        ModuleScope::Inherited { suspended: None }
    }
}

impl ModuleScope {
    pub fn is_overriding(&self) -> bool {
        matches!(self, ModuleScope::Overridden(_))
    }

    /// Capa de override activa, si la hay.
    pub fn override_patch(&self) -> Option<&ConfigPatch> {
        match self {
            ModuleScope::Overridden(patch) => Some(patch),
            ModuleScope::Inherited { .. } => None,
        }
    }

    pub fn suspended(&self) -> Option<&ConfigPatch> {
        match self {
            ModuleScope::Inherited { suspended } => suspended.as_ref(),
            ModuleScope::Overridden(_) => None,
        }
    }

    /// Parche almacenado, activo o suspendido.
    pub fn stored_patch_mut(&mut self) -> Option<&mut ConfigPatch> {
        match self {
            ModuleScope::Overridden(patch) => Some(patch),
            ModuleScope::Inherited { suspended } => suspended.as_mut(),
        }
    }
}

impl From<ModuleConfig> for ModuleScope {
    fn from(wire: ModuleConfig) -> Self {
        if wire.override_global {
            ModuleScope::Overridden(wire.config)
        } else if wire.config.is_empty() {
            ModuleScope::Inherited { suspended: None }
        } else {
            ModuleScope::Inherited {
                suspended: Some(wire.config),
            }
        }
    }
}

impl From<ModuleScope> for ModuleConfig {
    fn from(scope: ModuleScope) -> Self {
        match scope {
            ModuleScope::Overridden(config) => ModuleConfig {
                override_global: true,
                config,
            },
            ModuleScope::Inherited { suspended } => ModuleConfig {
                override_global: false,
                config: suspended.unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetConfig {
    pub name: String,
    #[serde(default)]
    pub config: ConfigPatch,
}

impl PresetConfig {
    pub fn new(name: impl Into<String>, config: ConfigPatch) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub key: String,
    pub label: String,
    #[serde(default = "default_visible")]
    pub default_visible: bool,
}

fn default_visible() -> bool {
    true
}

/// Columna que el módulo declara apta para agrupar / subtotalizar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupableColumn {
    pub key: String,
    pub label: String,
    #[serde(default, rename = "isNumeric", alias = "is_numeric")]
    pub is_numeric: bool,
}

impl GroupableColumn {
    pub fn new(key: &str, label: &str, is_numeric: bool) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            is_numeric,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModuleMeta {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub columns: Vec<ColumnMeta>,
    #[serde(default)]
    pub sort_options: Vec<String>,
    #[serde(default)]
    pub group_options: Vec<String>,
    #[serde(default)]
    pub renderers: Vec<String>,
    #[serde(default, rename = "groupingSupported", alias = "grouping_supported")]
    pub grouping_supported: bool,
    #[serde(default, rename = "groupableColumns", alias = "groupable_columns")]
    pub groupable_columns: Vec<GroupableColumn>,
}

impl ModuleMeta {
    /// Etiqueta de una columna; si no se conoce, la propia clave.
    pub fn column_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.groupable_columns
            .iter()
            .find(|col| col.key == key)
            .map(|col| col.label.as_str())
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|col| col.key == key)
                    .map(|col| col.label.as_str())
            })
            .unwrap_or(key)
    }
}

/// El agregado completo que se carga una vez por sesión y se guarda entero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExportConfigBundle {
    #[serde(default, deserialize_with = "null_as_default")]
    pub global_config: ExportConfig,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modules: IndexMap<String, ModuleScope>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub presets: IndexMap<String, PresetConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub module_meta: IndexMap<String, ModuleMeta>,
}

impl ExportConfigBundle {
    pub fn module_scope(&self, module_key: &str) -> Option<&ModuleScope> {
        self.modules.get(module_key)
    }

    pub fn is_overriding(&self, module_key: &str) -> bool {
        self.modules
            .get(module_key)
            .is_some_and(ModuleScope::is_overriding)
    }

    pub fn preset(&self, name: Option<&str>) -> Option<&PresetConfig> {
        name.and_then(|name| self.presets.get(name))
    }

    /// Columnas agrupables del módulo; vacío si el módulo no soporta agrupamiento.
    pub fn groupable_columns(&self, module_key: &str) -> &[GroupableColumn] {
        match self.module_meta.get(module_key) {
            Some(meta) if meta.grouping_supported => &meta.groupable_columns,
            _ => &[],
        }
    }

    /// Primer módulo real (el ámbito global no tiene documento propio).
    pub fn first_module_key(&self) -> Option<&str> {
        self.module_meta
            .keys()
            .chain(self.modules.keys())
            .map(String::as_str)
            .find(|key| *key != GLOBAL_SCOPE)
    }

    /// Completa los metadatos de agrupamiento de cada módulo con los de `config-meta`.
    pub fn apply_grouping_meta(&mut self, meta: &ConfigMeta) {
        for (key, grouping) in &meta.module_grouping {
            let entry = self
                .module_meta
                .entry(key.clone())
                .or_insert_with(|| ModuleMeta {
                    key: key.clone(),
                    label: key.clone(),
                    ..ModuleMeta::default()
                });
            entry.grouping_supported = grouping.grouping_supported;
            entry.groupable_columns = grouping.groupable_columns.clone();
        }
    }
}
