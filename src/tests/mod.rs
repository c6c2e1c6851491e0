//! tests/mod.rs
//! Pruebas unitarias por servicio, más fakes compartidos.

mod color_tests;
mod fakes;
mod filename_tests;
mod normalize_tests;
mod settings_tests;
mod theme_tests;
