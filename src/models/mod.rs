//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod bundle_model;
pub mod export_config_model;
pub mod meta_model;
pub mod patch_model;
pub mod preview_model;
