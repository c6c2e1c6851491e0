//! services/mod.rs
//! Módulo que agrupa la lógica de resolución, validación y sesión del estudio.

pub mod color_service;
pub mod filename_service;
pub mod gateway_service;
pub mod grouping_service;
pub mod merge_service;
pub mod normalize_service;
pub mod preview_service;
pub mod registry_service;
pub mod store_service;
pub mod studio_service;
pub mod theme_service;
