//! lib.rs
//! Motor de configuración jerárquica de exportación PDF: resolución
//! global → preset → override de módulo, temas, agrupamiento y vista previa.

pub mod config;
pub mod logger;
pub mod models;
pub mod services;

#[cfg(test)]
mod tests;

pub use crate::config::studio_config::StudioSettings;
pub use crate::models::bundle_model::{ExportConfigBundle, ModuleScope, GLOBAL_SCOPE};
pub use crate::models::export_config_model::{ExportConfig, ThemeConfig, ThemeField};
pub use crate::models::patch_model::ConfigPatch;
pub use crate::services::store_service::ConfigStore;
pub use crate::services::studio_service::{ConfigStudio, LoadState};
