//! services/studio_service.rs
//! Sesión del estudio de configuración: une el store, la persistencia y la
//! vista previa. Los errores de red se convierten en estado, nunca en pánicos.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::config::studio_config::StudioSettings;
use crate::models::export_config_model::{ExportConfig, ThemeField};
use crate::models::meta_model::ConfigMeta;
use crate::models::preview_model::PreviewStatus;
use crate::services::filename_service::render_filename;
use crate::services::gateway_service::{HttpGateway, PersistenceGateway, PreviewRenderer};
use crate::services::normalize_service::NormalizeReport;
use crate::services::preview_service::{ArtifactStore, PreviewScheduler, TempDirArtifacts};
use crate::services::registry_service::{default_bundle, merge_builtin_presets, module_label};
use crate::services::store_service::ConfigStore;
use crate::services::theme_service::ThemeWarning;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Ready,
    /// Bloqueante: no se pudo cargar la configuración.
    Failed(String),
}

pub struct ConfigStudio {
    settings: StudioSettings,
    gateway: Arc<dyn PersistenceGateway>,
    scheduler: PreviewScheduler,
    store: ConfigStore,
    meta: Option<ConfigMeta>,
    load_state: LoadState,
    save_error: Option<String>,
    last_normalize: Option<NormalizeReport>,
    /// `global_config` con secciones `null` en el último payload cargado.
    load_null_scopes: Vec<String>,
}

impl ConfigStudio {
    pub fn new(
        settings: StudioSettings,
        gateway: Arc<dyn PersistenceGateway>,
        renderer: Arc<dyn PreviewRenderer>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        let scheduler = PreviewScheduler::new(
            renderer,
            artifacts,
            settings.preview_debounce(),
            settings.discard_stale_previews,
        );
        Self {
            settings,
            gateway,
            scheduler,
            store: ConfigStore::new(default_bundle()),
            meta: None,
            load_state: LoadState::NotLoaded,
            save_error: None,
            last_normalize: None,
            load_null_scopes: Vec::new(),
        }
    }

    /// Estudio contra el backend HTTP, con vistas previas en un directorio temporal.
    pub fn with_http(settings: StudioSettings) -> Result<Self> {
        let gateway = Arc::new(HttpGateway::new(&settings)?);
        let artifacts = Arc::new(TempDirArtifacts::new()?);
        Ok(Self::new(settings, gateway.clone(), gateway, artifacts))
    }

    pub fn settings(&self) -> &StudioSettings {
        &self.settings
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn meta(&self) -> Option<&ConfigMeta> {
        self.meta.as_ref()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    pub fn last_normalize(&self) -> Option<&NormalizeReport> {
        self.last_normalize.as_ref()
    }

    pub fn preview_status(&self) -> PreviewStatus {
        self.scheduler.status()
    }

    pub fn preview_url(&self) -> Option<String> {
        self.scheduler.current_url()
    }

    /// Carga el bundle y los metadatos. Un fallo del bundle bloquea la sesión;
    /// un fallo de los metadatos sólo se registra.
    pub async fn load(&mut self) -> bool {
        log::info!("(load) Cargando configuración PDF...");
        let mut bundle = match self.gateway.load_bundle().await {
            Ok(loaded) => {
                // los ámbitos de módulos y presets los vuelve a ver la normalización
                self.load_null_scopes = loaded
                    .null_scopes
                    .into_iter()
                    .filter(|scope| scope == "global_config")
                    .collect();
                loaded.bundle
            }
            Err(e) => {
                log::error!("(load) No se pudo cargar la configuración: {:?}", e);
                self.load_state =
                    LoadState::Failed(format!("No se pudo cargar la configuración: {}", e));
                return false;
            }
        };

        let added = merge_builtin_presets(&mut bundle);
        if added > 0 {
            log::info!("(load) Se agregaron {} presets de fábrica", added);
        }

        match self.gateway.load_meta().await {
            Ok(meta) => {
                bundle.apply_grouping_meta(&meta);
                self.meta = Some(meta);
            }
            Err(e) => log::warn!("(load) Metadatos no disponibles: {:?}", e),
        }

        self.store.replace_baseline(bundle);
        self.load_state = LoadState::Ready;
        self.save_error = None;
        log::info!(
            "(load) Configuración cargada: {} módulos, {} presets",
            self.store.draft().module_meta.len(),
            self.store.draft().presets.len()
        );
        self.preview_after_change();
        true
    }

    /// Normaliza y guarda el borrador. Si falla, el borrador se conserva y el
    /// error queda en `save_error`.
    pub async fn save(&mut self) -> bool {
        self.save_error = None;
        let report = self.store.normalize_with_load_scopes(&self.load_null_scopes);
        if !report.null_scopes.is_empty() {
            log::warn!(
                "(save) Se guarda igual con secciones null en: {}",
                report.null_scopes.join(", ")
            );
        }
        self.last_normalize = Some(report);

        let draft = self.store.draft().clone();
        match self.gateway.save_bundle(&draft).await {
            Ok(mut saved) => {
                if let Some(meta) = &self.meta {
                    saved.apply_grouping_meta(meta);
                }
                self.store.replace_baseline(saved);
                self.load_null_scopes.clear();
                log::info!("(save) Configuración guardada");
                true
            }
            Err(e) => {
                log::error!("(save) No se pudo guardar la configuración: {:?}", e);
                self.save_error = Some(format!("No se pudo guardar la configuración: {}", e));
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.save_error = None;
        self.preview_after_change();
    }

    pub fn edit<F>(&mut self, updater: F)
    where
        F: FnOnce(ExportConfig) -> ExportConfig,
    {
        self.store.update_config_state(updater);
        self.preview_after_change();
    }

    pub fn select_module(&mut self, module_key: &str) {
        self.store.select_module(module_key);
        self.preview_after_change();
    }

    pub fn select_preset(&mut self, preset_name: Option<&str>) {
        self.store.select_preset(preset_name);
        self.preview_after_change();
    }

    pub fn set_override(&mut self, enabled: bool) {
        self.store.set_override(enabled);
        self.preview_after_change();
    }

    pub fn duplicate_from_global(&mut self, module_key: &str) -> bool {
        let overriding = self.store.duplicate_from_global(module_key);
        self.preview_after_change();
        overriding
    }

    pub fn reset_theme_field(&mut self, field: ThemeField) {
        self.store.reset_theme_field(field);
        self.preview_after_change();
    }

    pub fn theme_warnings(&self) -> Vec<ThemeWarning> {
        self.store.theme_warnings(self.meta.as_ref())
    }

    pub fn grouping_warning(&self) -> Option<String> {
        self.store.grouping_warning()
    }

    /// Nombre del archivo exportado para el módulo de vista previa.
    pub fn export_filename(
        &self,
        context: &IndexMap<String, String>,
        now: NaiveDateTime,
    ) -> Option<String> {
        let module = self.store.preview_module()?;
        let config = self.store.effective_config()?;
        Some(render_filename(
            &config.filename.pattern,
            &module,
            &module_label(&module),
            context,
            now,
        ))
    }

    /// Vista previa inmediata, sin debounce.
    pub async fn refresh_preview(&self) -> PreviewStatus {
        match self.store.preview_request() {
            Some(request) => self.scheduler.request_preview(request).await,
            None => {
                log::warn!("(refresh_preview) No hay módulos para previsualizar");
                PreviewStatus::Failed("No hay módulos para previsualizar".to_string())
            }
        }
    }

    /// Libera la vista previa actual y cancela la pendiente.
    pub fn close(&mut self) {
        self.scheduler.release();
        log::info!("(close) Estudio cerrado");
    }

    fn preview_after_change(&self) {
        if !self.settings.auto_preview || self.load_state != LoadState::Ready {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            log::warn!("(preview_after_change) Sin runtime de tokio; no se programa la vista previa");
            return;
        }
        if let Some(request) = self.store.preview_request() {
            self.scheduler.schedule_preview(request);
        }
    }
}
