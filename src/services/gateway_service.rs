//! services/gateway_service.rs
//! Colaboradores externos: persistencia del bundle y renderizado de vista previa.
//! `HttpGateway` implementa ambos contra el backend REST.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use serde_json::Value;

use crate::config::studio_config::StudioSettings;
use crate::models::bundle_model::ExportConfigBundle;
use crate::models::meta_model::ConfigMeta;
use crate::models::preview_model::PreviewRequest;
use crate::services::normalize_service::null_section_scopes;

/// Bundle cargado junto con los ámbitos que llegaron con secciones `null`.
/// Al tipar el bundle, las de `global_config` se vuelven valores por defecto,
/// así que sólo quedan registradas acá.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadedBundle {
    pub bundle: ExportConfigBundle,
    pub null_scopes: Vec<String>,
}

impl LoadedBundle {
    pub fn from_raw(raw: Value) -> Result<Self> {
        let null_scopes = null_section_scopes(&raw);
        if !null_scopes.is_empty() {
            log::warn!(
                "(LoadedBundle::from_raw) Secciones null recibidas en: {}",
                null_scopes.join(", ")
            );
        }
        let bundle = serde_json::from_value(raw).context("Bundle con formato inválido")?;
        Ok(Self {
            bundle,
            null_scopes,
        })
    }
}

#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// `GET config`
    async fn load_bundle(&self) -> Result<LoadedBundle>;

    /// `GET config-meta`
    async fn load_meta(&self) -> Result<ConfigMeta>;

    /// `PUT config`; devuelve el bundle persistido.
    async fn save_bundle(&self, bundle: &ExportConfigBundle) -> Result<ExportConfigBundle>;
}

#[async_trait]
pub trait PreviewRenderer: Send + Sync {
    /// `POST preview`; devuelve el documento binario.
    async fn render_preview(&self, request: &PreviewRequest) -> Result<Bytes>;
}

#[derive(Clone)]
pub struct HttpGateway {
    base_url: String,
    http_client: Client,
}

impl HttpGateway {
    pub fn new(settings: &StudioSettings) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("No se pudo construir el cliente HTTP")?;
        Ok(Self {
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Falla con el cuerpo de la respuesta si el status no es 2xx.
    async fn ensure_success(op: &str, resp: Response) -> Result<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body_txt = resp.text().await.unwrap_or_default();
        log::error!("({}) Respuesta no exitosa: status={} body='{}'", op, status, body_txt);
        Err(anyhow!("{} respondió {}: {}", op, status, body_txt))
    }
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    async fn load_bundle(&self) -> Result<LoadedBundle> {
        let resp = self
            .http_client
            .get(self.url("pdf-config"))
            .send()
            .await
            .context("(load_bundle) Fallo al hacer GET pdf-config")?;
        let resp = Self::ensure_success("load_bundle", resp).await?;
        let raw: Value = resp
            .json()
            .await
            .context("(load_bundle) Respuesta no es JSON")?;
        LoadedBundle::from_raw(raw).context("(load_bundle) Bundle inválido")
    }

    async fn load_meta(&self) -> Result<ConfigMeta> {
        let resp = self
            .http_client
            .get(self.url("pdf-config/meta"))
            .send()
            .await
            .context("(load_meta) Fallo al hacer GET pdf-config/meta")?;
        let resp = Self::ensure_success("load_meta", resp).await?;
        resp.json()
            .await
            .context("(load_meta) Metadatos con formato inválido")
    }

    async fn save_bundle(&self, bundle: &ExportConfigBundle) -> Result<ExportConfigBundle> {
        let resp = self
            .http_client
            .put(self.url("pdf-config"))
            .json(bundle)
            .send()
            .await
            .context("(save_bundle) Fallo al hacer PUT pdf-config")?;
        let resp = Self::ensure_success("save_bundle", resp).await?;
        resp.json()
            .await
            .context("(save_bundle) Bundle guardado con formato inválido")
    }
}

#[async_trait]
impl PreviewRenderer for HttpGateway {
    async fn render_preview(&self, request: &PreviewRequest) -> Result<Bytes> {
        log::info!(
            "(render_preview) Solicitando vista previa de '{}' (preset={:?})",
            request.module,
            request.preset
        );
        let resp = self
            .http_client
            .post(self.url("pdf-config/preview"))
            .json(request)
            .send()
            .await
            .context("(render_preview) Fallo al hacer POST pdf-config/preview")?;
        let resp = Self::ensure_success("render_preview", resp).await?;
        resp.bytes()
            .await
            .context("(render_preview) No se pudo leer el documento")
    }
}
