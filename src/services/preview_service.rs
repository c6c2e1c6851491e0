//! services/preview_service.rs
//! Vista previa con debounce. Mantiene como máximo un documento vivo y lo
//! libera al reemplazarlo o al cerrar la sesión.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::preview_model::{PreviewArtifact, PreviewRequest, PreviewStatus};
use crate::services::gateway_service::PreviewRenderer;

const TEMP_DIR_PREFIX: &str = "pdf_studio_preview_";
const FILE_URL_PREFIX: &str = "file://";

/// Dónde viven los documentos de vista previa (el equivalente a un object URL).
pub trait ArtifactStore: Send + Sync {
    /// Guarda el documento y devuelve su URL.
    fn create(&self, bytes: &Bytes) -> Result<String>;

    /// Libera la URL. Liberar una URL desconocida no es un error.
    fn revoke(&self, url: &str);
}

/// Guarda cada vista previa como archivo en un directorio temporal privado.
/// El directorio se borra al soltar el store.
pub struct TempDirArtifacts {
    dir: TempDir,
}

impl TempDirArtifacts {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir()
            .context("No se pudo crear el directorio temporal de vistas previas")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn path_for(url: &str) -> PathBuf {
        PathBuf::from(url.strip_prefix(FILE_URL_PREFIX).unwrap_or(url))
    }
}

impl ArtifactStore for TempDirArtifacts {
    fn create(&self, bytes: &Bytes) -> Result<String> {
        let path = self
            .dir
            .path()
            .join(format!("preview_{}.pdf", Uuid::new_v4()));
        std::fs::write(&path, bytes)
            .with_context(|| format!("No se pudo escribir {}", path.display()))?;
        Ok(format!("{}{}", FILE_URL_PREFIX, path.display()))
    }

    fn revoke(&self, url: &str) {
        let path = Self::path_for(url);
        // sólo se borran archivos propios
        if !path.starts_with(self.dir.path()) {
            log::warn!("(revoke) URL ajena al store ignorada: {}", url);
            return;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => log::debug!("(revoke) Vista previa liberada: {}", url),
            Err(e) => log::warn!("(revoke) No se pudo borrar {}: {}", path.display(), e),
        }
    }
}

#[derive(Default)]
struct PreviewState {
    next_token: u64,
    latest_token: u64,
    in_flight: usize,
    current: Option<PreviewArtifact>,
    status: PreviewStatus,
    pending: Option<JoinHandle<()>>,
    closed: bool,
}

impl PreviewState {
    fn settled_status(&self) -> PreviewStatus {
        match &self.current {
            Some(artifact) => PreviewStatus::Ready {
                url: artifact.url.clone(),
            },
            None => PreviewStatus::Idle,
        }
    }
}

/// Marca un render en curso. Descuenta `in_flight` al soltarse, también si
/// el future del render se descarta a mitad de camino.
struct InFlight {
    state: Arc<Mutex<PreviewState>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

/// Lo que necesita una tarea de render; se clona hacia las tareas de tokio.
#[derive(Clone)]
struct PreviewContext {
    renderer: Arc<dyn PreviewRenderer>,
    artifacts: Arc<dyn ArtifactStore>,
    state: Arc<Mutex<PreviewState>>,
    discard_stale: bool,
}

impl PreviewContext {
    fn lock(&self) -> MutexGuard<'_, PreviewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn issue_token(&self) -> Option<(u64, InFlight)> {
        let mut state = self.lock();
        if state.closed {
            return None;
        }
        state.next_token += 1;
        state.latest_token = state.next_token;
        state.in_flight += 1;
        state.status = PreviewStatus::Pending;
        let guard = InFlight {
            state: Arc::clone(&self.state),
        };
        Some((state.next_token, guard))
    }

    async fn render(&self, token: u64, guard: InFlight, request: PreviewRequest) -> PreviewStatus {
        let result = self.renderer.render_preview(&request).await;
        // antes de tomar el lock: el guard también lo necesita
        drop(guard);

        let mut state = self.lock();

        if state.closed {
            log::debug!("(render) Vista previa #{} descartada: sesión cerrada", token);
            return PreviewStatus::Idle;
        }
        if self.discard_stale && token != state.latest_token {
            log::debug!(
                "(render) Vista previa #{} descartada: ya se pidió la #{}",
                token,
                state.latest_token
            );
            return state.status.clone();
        }

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("(render) Falló la vista previa de '{}': {:?}", request.module, e);
                state.status =
                    PreviewStatus::Failed(format!("No se pudo generar la vista previa: {}", e));
                return state.status.clone();
            }
        };

        let url = match self.artifacts.create(&bytes) {
            Ok(url) => url,
            Err(e) => {
                log::error!("(render) No se pudo instalar la vista previa: {:?}", e);
                state.status =
                    PreviewStatus::Failed(format!("No se pudo mostrar la vista previa: {}", e));
                return state.status.clone();
            }
        };

        let previous = state.current.replace(PreviewArtifact {
            url: url.clone(),
            module: request.module.clone(),
            size_bytes: bytes.len(),
            token,
        });
        if let Some(previous) = previous {
            self.artifacts.revoke(&previous.url);
        }
        log::info!(
            "(render) Vista previa #{} de '{}' lista ({} bytes)",
            token,
            request.module,
            bytes.len()
        );
        state.status = PreviewStatus::Ready { url };
        state.status.clone()
    }
}

pub struct PreviewScheduler {
    ctx: PreviewContext,
    debounce: Duration,
}

impl PreviewScheduler {
    pub fn new(
        renderer: Arc<dyn PreviewRenderer>,
        artifacts: Arc<dyn ArtifactStore>,
        debounce: Duration,
        discard_stale: bool,
    ) -> Self {
        Self {
            ctx: PreviewContext {
                renderer,
                artifacts,
                state: Arc::new(Mutex::new(PreviewState::default())),
                discard_stale,
            },
            debounce,
        }
    }

    /// Render inmediato (botón "actualizar"). Cancela el debounce pendiente.
    pub async fn request_preview(&self, request: PreviewRequest) -> PreviewStatus {
        self.abort_pending();
        let Some((token, guard)) = self.ctx.issue_token() else {
            return PreviewStatus::Idle;
        };
        self.ctx.render(token, guard, request).await
    }

    /// Programa un render tras el debounce; una nueva llamada dentro de la
    /// ventana reemplaza a la anterior. Los renders ya lanzados no se cancelan.
    /// Debe llamarse dentro de un runtime de tokio.
    pub fn schedule_preview(&self, request: PreviewRequest) {
        let mut state = self.ctx.lock();
        if state.closed {
            return;
        }
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        state.status = PreviewStatus::Pending;

        let ctx = self.ctx.clone();
        let delay = self.debounce;
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some((token, guard)) = ctx.issue_token() else {
                return;
            };
            // tarea aparte: abortar el debounce no corta un render en curso
            tokio::spawn(async move {
                ctx.render(token, guard, request).await;
            });
        }));
    }

    /// Cancela el render programado (no el que ya está en curso).
    pub fn cancel_pending(&self) {
        self.abort_pending();
        let mut state = self.ctx.lock();
        if state.in_flight == 0 && state.status == PreviewStatus::Pending {
            state.status = state.settled_status();
        }
    }

    fn abort_pending(&self) {
        if let Some(pending) = self.ctx.lock().pending.take() {
            pending.abort();
        }
    }

    pub fn status(&self) -> PreviewStatus {
        self.ctx.lock().status.clone()
    }

    pub fn current_url(&self) -> Option<String> {
        self.ctx.lock().current.as_ref().map(|a| a.url.clone())
    }

    pub fn current_artifact(&self) -> Option<PreviewArtifact> {
        self.ctx.lock().current.clone()
    }

    pub fn latest_token(&self) -> u64 {
        self.ctx.lock().latest_token
    }

    /// Cierra el scheduler: cancela el debounce y libera el documento actual.
    /// Los renders que terminen después se descartan. Idempotente.
    pub fn release(&self) {
        let mut state = self.ctx.lock();
        state.closed = true;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        if let Some(current) = state.current.take() {
            self.ctx.artifacts.revoke(&current.url);
        }
        state.status = PreviewStatus::Idle;
    }
}

impl Drop for PreviewScheduler {
    fn drop(&mut self) {
        self.release();
    }
}
