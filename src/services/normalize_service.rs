//! services/normalize_service.rs
//! Normalización del bundle antes de guardarlo. Nunca bloquea el guardado:
//! lo que no se puede corregir se reporta y se deja pasar.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::models::bundle_model::{ExportConfigBundle, ModuleMeta};
use crate::models::export_config_model::{AdvancedConfig, BrandingConfig, ThemeConfig, ThemeField};
use crate::models::patch_model::ConfigPatch;
use crate::services::color_service::to_hex_color;
use crate::services::merge_service::fill_preset_margins;
use crate::services::registry_service::normalize_module_key;
use crate::services::theme_service::canonicalize_config_colors;

/// Resumen de lo que hizo `normalize_bundle`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizeReport {
    /// Ámbitos con alguna sección `null` (`modules.<key>.config`, `presets.<key>.config`).
    /// `global_config` sólo aparece si se pasó a `normalize_bundle_with_load_scopes`:
    /// al tipar el bundle sus secciones `null` ya son valores por defecto.
    pub null_scopes: Vec<String>,
    /// Claves heredadas renombradas: `(antigua, canónica)`.
    pub renamed_modules: Vec<(String, String)>,
    /// Claves heredadas descartadas porque la canónica ya existía.
    pub dropped_legacy_modules: Vec<String>,
    /// Capas a las que se les completaron los márgenes de su `margin_preset`.
    pub derived_margins: usize,
}

impl NormalizeReport {
    pub fn is_clean(&self) -> bool {
        self.null_scopes.is_empty()
            && self.renamed_modules.is_empty()
            && self.dropped_legacy_modules.is_empty()
    }
}

/// Ámbitos con secciones `null` en un payload crudo (antes de tiparlo).
/// Para `global_config` es la única forma de verlos, porque al tiparlo
/// las secciones `null` pasan a ser sus valores por defecto.
pub fn null_section_scopes(raw: &Value) -> Vec<String> {
    let mut scopes = Vec::new();
    let has_null_section = |config: Option<&Value>| {
        config
            .and_then(Value::as_object)
            .is_some_and(|sections| sections.values().any(Value::is_null))
    };

    if has_null_section(raw.get("global_config")) {
        scopes.push("global_config".to_string());
    }
    for (collection, nested) in [("modules", "config"), ("presets", "config")] {
        if let Some(entries) = raw.get(collection).and_then(Value::as_object) {
            for (key, entry) in entries {
                if has_null_section(entry.get(nested)) {
                    scopes.push(format!("{}.{}.{}", collection, key, nested));
                }
            }
        }
    }
    scopes
}

pub fn normalize_bundle(bundle: &mut ExportConfigBundle) -> NormalizeReport {
    normalize_bundle_with_load_scopes(bundle, &[])
}

/// Igual que `normalize_bundle`, sumando los ámbitos con secciones `null`
/// detectados al cargar el payload crudo (`null_section_scopes`).
pub fn normalize_bundle_with_load_scopes(
    bundle: &mut ExportConfigBundle,
    load_scopes: &[String],
) -> NormalizeReport {
    let mut report = NormalizeReport {
        null_scopes: load_scopes.to_vec(),
        ..NormalizeReport::default()
    };

    // 1. secciones null: se avisa y se quitan (null y ausente resuelven igual)
    for (key, scope) in bundle.modules.iter_mut() {
        if let Some(patch) = scope.stored_patch_mut() {
            if patch.strip_null_sections() > 0 {
                push_scope(&mut report, format!("modules.{}.config", key));
            }
        }
    }
    for (key, preset) in bundle.presets.iter_mut() {
        if preset.config.strip_null_sections() > 0 {
            push_scope(&mut report, format!("presets.{}.config", key));
        }
    }
    if !report.null_scopes.is_empty() {
        log::warn!(
            "(normalize_bundle) Secciones null en: {}. Se guardan con valores por defecto.",
            report.null_scopes.join(", ")
        );
    }

    // 2. claves heredadas
    rename_legacy_keys(&mut bundle.modules, &mut report, |_, _| {});
    rename_legacy_keys(
        &mut bundle.module_meta,
        &mut report,
        |meta: &mut ModuleMeta, canonical| meta.key = canonical.to_string(),
    );

    // 3. config global: colores canónicos y opacidades (los márgenes quedan como están)
    canonicalize_config_colors(&mut bundle.global_config);

    // 4. parches
    for scope in bundle.modules.values_mut() {
        if let Some(patch) = scope.stored_patch_mut() {
            report.derived_margins += normalize_patch(patch);
        }
    }
    for preset in bundle.presets.values_mut() {
        report.derived_margins += normalize_patch(&mut preset.config);
    }

    log::debug!("(normalize_bundle) {:?}", report);
    report
}

fn push_scope(report: &mut NormalizeReport, scope: String) {
    if !report.null_scopes.contains(&scope) {
        report.null_scopes.push(scope);
    }
}

fn rename_legacy_keys<V>(
    map: &mut IndexMap<String, V>,
    report: &mut NormalizeReport,
    on_rename: impl Fn(&mut V, &str),
) {
    let original = std::mem::take(map);
    let canonical_present: HashSet<String> = original
        .keys()
        .filter(|key| normalize_module_key(key) == **key)
        .cloned()
        .collect();

    for (key, mut value) in original {
        let canonical = normalize_module_key(&key);
        if canonical == key {
            map.insert(key, value);
            continue;
        }
        if canonical_present.contains(&canonical) || map.contains_key(&canonical) {
            log::warn!(
                "(normalize_bundle) '{}' descartado: ya existe '{}'",
                key,
                canonical
            );
            if !report.dropped_legacy_modules.contains(&key) {
                report.dropped_legacy_modules.push(key);
            }
            continue;
        }
        on_rename(&mut value, &canonical);
        if !report.renamed_modules.iter().any(|(old, _)| *old == key) {
            report.renamed_modules.push((key, canonical.clone()));
        }
        map.insert(canonical, value);
    }
}

/// Normaliza los valores presentes en un parche sin agregar secciones nuevas.
/// Devuelve 1 si se completaron los márgenes del preset.
fn normalize_patch(patch: &mut ConfigPatch) -> usize {
    let mut derived = 0;
    for (section, value) in patch.sections_mut() {
        let Some(fields) = value.as_object_mut() else {
            continue;
        };
        match section.as_str() {
            "format" => {
                if fill_preset_margins(fields) {
                    derived += 1;
                }
            }
            "watermark" => clamp_opacity(fields, "opacity"),
            "theme" => {
                clamp_opacity(fields, "background_opacity");
                let defaults = ThemeConfig::default();
                for field in ThemeField::ALL {
                    if let Some(fallback) = defaults.color(field) {
                        canonicalize_color_field(fields, field.key(), fallback);
                    }
                }
            }
            "advanced" => {
                let defaults = AdvancedConfig::default();
                for (key, fallback) in [
                    ("header_bg_color", &defaults.header_bg_color),
                    ("header_text_color", &defaults.header_text_color),
                    ("table_header_bg_color", &defaults.table_header_bg_color),
                    ("table_header_text_color", &defaults.table_header_text_color),
                    ("row_alt_bg_color", &defaults.row_alt_bg_color),
                ] {
                    canonicalize_color_field(fields, key, fallback);
                }
            }
            "branding" => {
                let fallback = BrandingConfig::default().accent_color.unwrap_or_default();
                canonicalize_color_field(fields, "accent_color", &fallback);
            }
            _ => {}
        }
    }
    derived
}

fn clamp_opacity(fields: &mut Map<String, Value>, key: &str) {
    if let Some(opacity) = fields.get(key).and_then(Value::as_f64) {
        if !(0.0..=1.0).contains(&opacity) {
            fields.insert(key.to_string(), Value::from(opacity.clamp(0.0, 1.0)));
        }
    }
}

fn canonicalize_color_field(fields: &mut Map<String, Value>, key: &str, fallback: &str) {
    if let Some(Value::String(color)) = fields.get_mut(key) {
        *color = to_hex_color(color, fallback);
    }
}
