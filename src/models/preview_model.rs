//! models/preview_model.rs
//! Estructuras de datos para requests/estados de la vista previa.

use serde::{Deserialize, Serialize};

use crate::models::bundle_model::ExportConfigBundle;

/// Cuerpo de `POST preview`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub module: String,
    pub preset: Option<String>,
    pub config: ExportConfigBundle,
}

/// Documento de vista previa instalado (el "object URL" vivo).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewArtifact {
    pub url: String,
    pub module: String,
    pub size_bytes: usize,
    /// Token del request que lo produjo.
    pub token: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewStatus {
    #[default]
    Idle,
    /// Hay un render programado (debounce) o en curso.
    Pending,
    Ready {
        url: String,
    },
    /// Mensaje para mostrar junto al área de vista previa.
    Failed(String),
}

impl PreviewStatus {
    pub fn message(&self) -> String {
        match self {
            PreviewStatus::Idle => String::new(),
            PreviewStatus::Pending => "Generando vista previa...".to_string(),
            PreviewStatus::Ready { .. } => "Vista previa actualizada".to_string(),
            PreviewStatus::Failed(msg) => msg.clone(),
        }
    }
}
