//! tests/fakes.rs
//! Colaboradores falsos en memoria para las pruebas de la sesión y la vista previa.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::models::bundle_model::ExportConfigBundle;
use crate::models::meta_model::ConfigMeta;
use crate::models::preview_model::PreviewRequest;
use crate::services::gateway_service::{LoadedBundle, PersistenceGateway, PreviewRenderer};
use crate::services::preview_service::ArtifactStore;

/// Renderer que devuelve un "PDF" numerado. Cada llamada puede tardar lo que
/// indique la cola de demoras.
#[derive(Default)]
pub(crate) struct FakeRenderer {
    requests: Mutex<Vec<PreviewRequest>>,
    delays: Mutex<VecDeque<Duration>>,
    failing: AtomicBool,
}

impl FakeRenderer {
    pub(crate) fn with_delays(delays: &[u64]) -> Self {
        let renderer = Self::default();
        *renderer.delays.lock().unwrap() = delays
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect();
        renderer
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<PreviewRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PreviewRenderer for FakeRenderer {
    async fn render_preview(&self, request: &PreviewRequest) -> Result<Bytes> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("backend caído"));
        }
        Ok(Bytes::from(format!("%PDF-1.4 vista previa {}", call)))
    }
}

/// Store en memoria que lleva la cuenta de URLs vivas.
#[derive(Default)]
pub(crate) struct FakeArtifacts {
    live: Mutex<HashSet<String>>,
    revoked: Mutex<Vec<String>>,
    created: AtomicUsize,
}

impl FakeArtifacts {
    pub(crate) fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub(crate) fn is_live(&self, url: &str) -> bool {
        self.live.lock().unwrap().contains(url)
    }

    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub(crate) fn revoked(&self) -> Vec<String> {
        self.revoked.lock().unwrap().clone()
    }
}

impl ArtifactStore for FakeArtifacts {
    fn create(&self, _bytes: &Bytes) -> Result<String> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        let url = format!("mem://preview/{}", n);
        self.live.lock().unwrap().insert(url.clone());
        Ok(url)
    }

    fn revoke(&self, url: &str) {
        self.live.lock().unwrap().remove(url);
        self.revoked.lock().unwrap().push(url.to_string());
    }
}

/// Backend en memoria: devuelve el payload guardado y registra los guardados.
pub(crate) struct FakeGateway {
    raw: Mutex<Value>,
    meta: Option<ConfigMeta>,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
    saved: Mutex<Vec<ExportConfigBundle>>,
}

impl FakeGateway {
    pub(crate) fn new(bundle: ExportConfigBundle, meta: Option<ConfigMeta>) -> Self {
        Self::with_raw(serde_json::to_value(bundle).unwrap(), meta)
    }

    /// Sirve el JSON tal cual, como lo mandaría el backend.
    pub(crate) fn with_raw(raw: Value, meta: Option<ConfigMeta>) -> Self {
        Self {
            raw: Mutex::new(raw),
            meta,
            fail_load: AtomicBool::new(false),
            fail_save: AtomicBool::new(false),
            saved: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn saved(&self) -> Vec<ExportConfigBundle> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersistenceGateway for FakeGateway {
    async fn load_bundle(&self) -> Result<LoadedBundle> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(anyhow!("conexión rechazada"));
        }
        LoadedBundle::from_raw(self.raw.lock().unwrap().clone())
    }

    async fn load_meta(&self) -> Result<ConfigMeta> {
        self.meta
            .clone()
            .ok_or_else(|| anyhow!("config-meta no disponible"))
    }

    async fn save_bundle(&self, bundle: &ExportConfigBundle) -> Result<ExportConfigBundle> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(anyhow!("timeout"));
        }
        self.saved.lock().unwrap().push(bundle.clone());
        *self.raw.lock().unwrap() = serde_json::to_value(bundle)?;
        Ok(bundle.clone())
    }
}
