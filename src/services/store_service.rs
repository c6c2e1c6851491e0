//! services/store_service.rs
//! Fuente única de verdad de la sesión: bundle base (último cargado), borrador
//! editable y selección actual (módulo / preset).

use crate::models::bundle_model::{ExportConfigBundle, ModuleMeta, ModuleScope, GLOBAL_SCOPE};
use crate::models::export_config_model::{ExportConfig, ThemeConfig, ThemeField};
use crate::models::meta_model::ConfigMeta;
use crate::models::patch_model::ConfigPatch;
use crate::models::preview_model::PreviewRequest;
use crate::services::grouping_service::{grouping_report, GroupingReport};
use crate::services::merge_service::{
    effective_module_config, merge_config, resolve_module_config,
};
use crate::services::normalize_service::{normalize_bundle_with_load_scopes, NormalizeReport};
use crate::services::registry_service::normalize_module_key;
use crate::services::theme_service::{
    resolve_fallback_theme, resolve_theme, theme_warnings, ThemeWarning,
};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    baseline: ExportConfigBundle,
    draft: ExportConfigBundle,
    selected_module: String,
    selected_preset: Option<String>,
}

impl ConfigStore {
    pub fn new(bundle: ExportConfigBundle) -> Self {
        Self {
            baseline: bundle.clone(),
            draft: bundle,
            selected_module: GLOBAL_SCOPE.to_string(),
            selected_preset: None,
        }
    }

    pub fn draft(&self) -> &ExportConfigBundle {
        &self.draft
    }

    pub fn baseline(&self) -> &ExportConfigBundle {
        &self.baseline
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.baseline
    }

    pub fn selected_module(&self) -> &str {
        &self.selected_module
    }

    pub fn selected_preset(&self) -> Option<&str> {
        self.selected_preset.as_deref()
    }

    /// Acepta claves heredadas (`purchase_orders` → `orders`).
    pub fn select_module(&mut self, module_key: &str) {
        self.selected_module = normalize_module_key(module_key);
    }

    pub fn select_preset(&mut self, preset_name: Option<&str>) {
        if let Some(name) = preset_name {
            if !self.draft.presets.contains_key(name) {
                log::warn!(
                    "(select_preset) El preset '{}' no existe; se resuelve sin preset",
                    name
                );
            }
        }
        self.selected_preset = preset_name.map(str::to_string);
    }

    /// Módulo con documento propio para la vista previa: el seleccionado o,
    /// en el ámbito global, el primer módulo real.
    pub fn preview_module(&self) -> Option<String> {
        if self.selected_module == GLOBAL_SCOPE {
            self.draft.first_module_key().map(str::to_string)
        } else {
            Some(self.selected_module.clone())
        }
    }

    pub fn module_meta(&self) -> Option<&ModuleMeta> {
        let module = self.preview_module()?;
        self.draft.module_meta.get(&module)
    }

    pub fn is_overriding(&self) -> bool {
        self.draft.is_overriding(&self.selected_module)
    }

    /// Aplica `updater` a la config editable del ámbito activo.
    ///
    /// En un módulo que no sobreescribe, la edición va a la config global
    /// (se edita aquello de lo que se hereda).
    pub fn update_config_state<F>(&mut self, updater: F)
    where
        F: FnOnce(ExportConfig) -> ExportConfig,
    {
        let module = self.selected_module.clone();
        if module == GLOBAL_SCOPE || !self.draft.is_overriding(&module) {
            let current = self.draft.global_config.clone();
            self.draft.global_config = updater(current);
            return;
        }

        let current = self.resolved_config();
        let updated = updater(current);
        self.draft.modules.insert(
            module,
            ModuleScope::Overridden(ConfigPatch::from_config(&updated)),
        );
    }

    /// Activa o desactiva el override del módulo seleccionado.
    ///
    /// Al activarlo se toma una instantánea de la config resuelta (más el
    /// borrador suspendido, si lo hay); al desactivarlo el parche queda suspendido.
    pub fn set_override(&mut self, enabled: bool) {
        let module = self.selected_module.clone();
        if module == GLOBAL_SCOPE {
            log::warn!("(set_override) El ámbito global no puede sobreescribirse");
            return;
        }

        let scope = self.draft.modules.get(&module).cloned().unwrap_or_default();
        let next = match (scope, enabled) {
            (ModuleScope::Inherited { suspended }, true) => {
                let resolved = resolve_module_config(&self.draft, &module, self.selected_preset());
                let seeded = match &suspended {
                    Some(patch) => merge_config(&resolved, patch),
                    None => resolved,
                };
                ModuleScope::Overridden(ConfigPatch::from_config(&seeded))
            }
            (ModuleScope::Overridden(patch), false) => ModuleScope::Inherited {
                suspended: Some(patch),
            },
            (unchanged, _) => unchanged,
        };
        self.draft.modules.insert(module, next);
    }

    /// Si el módulo sobreescribe: vuelca su override en la config global y lo
    /// vuelve heredado. Si no: crea un override con la config resuelta.
    /// Devuelve si el módulo queda sobreescribiendo.
    pub fn duplicate_from_global(&mut self, module_key: &str) -> bool {
        let module = normalize_module_key(module_key);
        if module == GLOBAL_SCOPE {
            return false;
        }

        let scope = self.draft.modules.get(&module).cloned().unwrap_or_default();
        match scope {
            ModuleScope::Overridden(patch) => {
                self.draft.global_config = merge_config(&self.draft.global_config, &patch);
                self.draft
                    .modules
                    .insert(module, ModuleScope::Inherited { suspended: None });
                false
            }
            ModuleScope::Inherited { .. } => {
                let resolved = resolve_module_config(&self.draft, &module, self.selected_preset());
                self.draft.modules.insert(
                    module,
                    ModuleScope::Overridden(ConfigPatch::from_config(&resolved)),
                );
                true
            }
        }
    }

    /// Descarta el borrador y vuelve al último bundle cargado.
    pub fn reset(&mut self) {
        self.draft = self.baseline.clone();
    }

    /// Nuevo bundle autoritativo (carga o respuesta del guardado).
    pub fn replace_baseline(&mut self, bundle: ExportConfigBundle) {
        self.baseline = bundle.clone();
        self.draft = bundle;
    }

    pub fn normalize(&mut self) -> NormalizeReport {
        self.normalize_with_load_scopes(&[])
    }

    /// Normaliza el borrador sumando al reporte los ámbitos `null` vistos al cargar.
    pub fn normalize_with_load_scopes(&mut self, load_scopes: &[String]) -> NormalizeReport {
        normalize_bundle_with_load_scopes(&mut self.draft, load_scopes)
    }

    pub fn resolved_config(&self) -> ExportConfig {
        resolve_module_config(&self.draft, &self.selected_module, self.selected_preset())
    }

    pub fn resolved_theme(&self) -> ThemeConfig {
        resolve_theme(&self.draft, &self.selected_module, self.selected_preset())
    }

    pub fn fallback_theme(&self) -> ThemeConfig {
        resolve_fallback_theme(&self.draft, &self.selected_module, self.selected_preset())
    }

    /// Revierte un campo del tema al valor heredado.
    pub fn reset_theme_field(&mut self, field: ThemeField) {
        let fallback = self.fallback_theme();
        self.update_config_state(|mut config| {
            config.theme.copy_field(&fallback, field);
            config
        });
    }

    pub fn theme_warnings(&self, meta: Option<&ConfigMeta>) -> Vec<ThemeWarning> {
        theme_warnings(&self.resolved_theme(), meta)
    }

    /// Qué descartaría el saneamiento de agrupamiento para el módulo de vista previa.
    pub fn grouping_report(&self) -> GroupingReport {
        grouping_report(&self.resolved_config(), self.module_meta())
    }

    pub fn grouping_warning(&self) -> Option<String> {
        self.grouping_report().describe(self.module_meta())
    }

    /// Config saneada que recibe la vista previa.
    pub fn effective_config(&self) -> Option<ExportConfig> {
        let module = self.preview_module()?;
        Some(effective_module_config(
            &self.draft,
            &module,
            self.selected_preset(),
        ))
    }

    pub fn preview_request(&self) -> Option<PreviewRequest> {
        let module = self.preview_module()?;
        Some(build_preview_request(
            &self.draft,
            &module,
            self.selected_preset(),
        ))
    }
}

/// Request de vista previa: el bundle con el módulo fijado a su config efectiva.
pub fn build_preview_request(
    bundle: &ExportConfigBundle,
    module_key: &str,
    preset_name: Option<&str>,
) -> PreviewRequest {
    let effective = effective_module_config(bundle, module_key, preset_name);
    let mut config = bundle.clone();
    config.modules.insert(
        module_key.to_string(),
        ModuleScope::Overridden(ConfigPatch::from_config(&effective)),
    );
    PreviewRequest {
        module: module_key.to_string(),
        preset: preset_name.map(str::to_string),
        config,
    }
}
