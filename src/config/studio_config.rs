//! config/studio_config.rs
//! Ajustes de la sesión del estudio (URL del backend, debounce, etc.),
//! leídos del entorno / `.env`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use serde::{Deserialize, Serialize};

/// Ajustes del estudio, con valores por defecto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioSettings {
    pub api_url: String,              // base del backend, sin barra final
    pub preview_debounce_ms: u64,     // espera antes de pedir la vista previa
    pub auto_preview: bool,           // vista previa automática al editar
    pub request_timeout_secs: u64,    // timeout de cada request HTTP
    pub discard_stale_previews: bool, // descartar respuestas de previews viejas
}

impl Default for StudioSettings {
    fn default() -> Self {
        StudioSettings {
            api_url: "http://127.0.0.1:8000/admin".to_string(),
            preview_debounce_ms: 800,
            auto_preview: true,
            request_timeout_secs: 30,
            discard_stale_previews: true,
        }
    }
}

impl StudioSettings {
    /// Carga `.env` (si existe) y lee las variables `PDF_STUDIO_*`.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StudioSettings::default();
        StudioSettings {
            api_url: lookup("PDF_STUDIO_API_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.api_url),
            preview_debounce_ms: parse_var(
                &lookup,
                "PDF_STUDIO_PREVIEW_DEBOUNCE_MS",
                defaults.preview_debounce_ms,
            ),
            auto_preview: parse_flag(&lookup, "PDF_STUDIO_AUTO_PREVIEW", defaults.auto_preview),
            request_timeout_secs: parse_var(
                &lookup,
                "PDF_STUDIO_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            discard_stale_previews: parse_flag(
                &lookup,
                "PDF_STUDIO_DISCARD_STALE_PREVIEWS",
                defaults.discard_stale_previews,
            ),
        }
    }

    pub fn preview_debounce(&self) -> Duration {
        Duration::from_millis(self.preview_debounce_ms)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!(
                "(StudioSettings) {}='{}' no es válido; se usa {}",
                key,
                raw,
                default
            );
            default
        }),
        None => default,
    }
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|raw| raw.trim().to_ascii_lowercase()) {
        Some(raw) => match raw.as_str() {
            "1" | "true" | "yes" | "on" | "si" | "sí" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                log::warn!(
                    "(StudioSettings) {}='{}' no es un booleano; se usa {}",
                    key,
                    raw,
                    default
                );
                default
            }
        },
        None => default,
    }
}
