//! services/merge_service.rs
//! Fusión profunda de capas y resolución global → preset → override de módulo.

use serde_json::{Map, Value};

use crate::models::bundle_model::{ColumnMeta, ExportConfigBundle, ModuleScope, GLOBAL_SCOPE};
use crate::models::export_config_model::{ColumnConfig, ExportConfig, MarginPreset, PdfMargins};
use crate::models::patch_model::ConfigPatch;
use crate::services::grouping_service::filter_grouping_config;
use crate::services::theme_service::canonicalize_config_colors;

/// Fusión profunda de dos objetos JSON.
///
/// Si ambos lados son objetos se fusiona clave por clave; cualquier otro valor
/// (arrays incluidos) del parche reemplaza al de la base. No muta las entradas.
pub fn deep_merge(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            let mut merged = base_map.clone();
            for (key, patch_value) in patch_map {
                let next = match merged.get(key) {
                    Some(base_value) if base_value.is_object() && patch_value.is_object() => {
                        deep_merge(base_value, patch_value)
                    }
                    _ => patch_value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        _ => patch.clone(),
    }
}

/// `deep_merge` sobre configuraciones tipadas. Los valores `null` del parche
/// se ignoran a cualquier profundidad; un campo que no encaja en el tipo se
/// descarta con un warning sin afectar a sus hermanos.
pub fn merge_config(base: &ExportConfig, patch: &ConfigPatch) -> ExportConfig {
    if patch.is_empty() {
        return base.clone();
    }
    let mut patch_value = patch.to_merge_value();
    if let Some(Value::Object(format)) = patch_value.get_mut("format") {
        fill_preset_margins(format);
    }

    let base_value = serde_json::to_value(base).unwrap_or_default();
    match serde_json::from_value::<ExportConfig>(deep_merge(&base_value, &patch_value)) {
        Ok(config) => config,
        Err(e) => {
            log::warn!(
                "(merge_config) El parche no encaja completo ({}); se aplica campo por campo",
                e
            );
            merge_config_by_leaf(base, base_value, &patch_value)
        }
    }
}

fn merge_config_by_leaf(
    base: &ExportConfig,
    base_value: Value,
    patch_value: &Value,
) -> ExportConfig {
    let mut leaves = Vec::new();
    collect_leaves(patch_value, &mut Vec::new(), &mut leaves);

    let mut acc = base_value;
    for (path, leaf) in leaves {
        let candidate = deep_merge(&acc, &nest(&path, leaf));
        match serde_json::from_value::<ExportConfig>(candidate.clone()) {
            Ok(_) => acc = candidate,
            Err(e) => log::warn!(
                "(merge_config) Campo '{}' ignorado por valor inválido: {}",
                path.join("."),
                e
            ),
        }
    }
    serde_json::from_value(acc).unwrap_or_else(|_| base.clone())
}

/// Hojas del parche con su ruta. Arrays y objetos vacíos cuentan como hoja.
fn collect_leaves(
    value: &Value,
    path: &mut Vec<String>,
    out: &mut Vec<(Vec<String>, Value)>,
) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, nested) in map {
                path.push(key.clone());
                collect_leaves(nested, path, out);
                path.pop();
            }
        }
        leaf if !path.is_empty() => out.push((path.clone(), leaf.clone())),
        _ => {}
    }
}

fn nest(path: &[String], leaf: Value) -> Value {
    path.iter().rev().fold(leaf, |acc, key| {
        let mut single = Map::new();
        single.insert(key.clone(), acc);
        Value::Object(single)
    })
}

/// Si una capa de formato fija un `margin_preset` no custom pero no trae
/// `margins`, los márgenes son los del preset. Devuelve si se completaron.
/// Mismo criterio en la resolución y en la normalización previa al guardado.
pub(crate) fn fill_preset_margins(format: &mut Map<String, Value>) -> bool {
    if format.get("margins").is_some_and(|margins| !margins.is_null()) {
        return false;
    }
    let preset = format
        .get("margin_preset")
        .and_then(|value| serde_json::from_value::<MarginPreset>(value.clone()).ok());
    let Some(mm) = preset.and_then(MarginPreset::margin_mm) else {
        return false;
    };
    match serde_json::to_value(PdfMargins::uniform(mm)) {
        Ok(margins) => {
            format.insert("margins".to_string(), margins);
            true
        }
        Err(_) => false,
    }
}

/// Global + preset, sin override de módulo.
pub fn resolve_inherited_config(
    bundle: &ExportConfigBundle,
    preset_name: Option<&str>,
) -> ExportConfig {
    let resolved = bundle.global_config.clone();
    match bundle.preset(preset_name) {
        Some(preset) => merge_config(&resolved, &preset.config),
        None => resolved,
    }
}

/// Config resuelta de un módulo: global → preset → override (sólo si el módulo lo tiene activo).
/// El ámbito `global` es la capa base y no se compone con nada.
pub fn resolve_module_config(
    bundle: &ExportConfigBundle,
    module_key: &str,
    preset_name: Option<&str>,
) -> ExportConfig {
    if module_key == GLOBAL_SCOPE {
        return bundle.global_config.clone();
    }
    let resolved = resolve_inherited_config(bundle, preset_name);
    match bundle
        .module_scope(module_key)
        .and_then(ModuleScope::override_patch)
    {
        Some(patch) => merge_config(&resolved, patch),
        None => resolved,
    }
}

/// Si la config no define columnas, usa las del catálogo del módulo.
pub fn ensure_module_columns(config: &mut ExportConfig, columns: &[ColumnMeta]) {
    if !config.content.columns.is_empty() || columns.is_empty() {
        return;
    }
    config.content.columns = columns
        .iter()
        .map(|col| ColumnConfig {
            key: col.key.clone(),
            label: col.label.clone(),
            visible: col.default_visible,
        })
        .collect();
}

/// Config que realmente se envía a la vista previa / exportación:
/// resuelta, con agrupamiento saneado, columnas completas y colores canónicos.
pub fn effective_module_config(
    bundle: &ExportConfigBundle,
    module_key: &str,
    preset_name: Option<&str>,
) -> ExportConfig {
    let resolved = resolve_module_config(bundle, module_key, preset_name);
    let mut effective = filter_grouping_config(&resolved, bundle.groupable_columns(module_key));
    if let Some(meta) = bundle.module_meta.get(module_key) {
        ensure_module_columns(&mut effective, &meta.columns);
    }
    canonicalize_config_colors(&mut effective);
    effective
}
