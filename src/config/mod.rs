//! config/mod.rs
//! Módulo raíz para la configuración del estudio.

pub mod studio_config;
