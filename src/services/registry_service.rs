//! services/registry_service.rs
//! Registro fijo de módulos exportables, claves heredadas y valores por defecto
//! (config global, presets de fábrica y catálogo de metadatos).

use indexmap::IndexMap;
use serde_json::json;

use crate::models::bundle_model::{
    ColumnMeta, ExportConfigBundle, GroupableColumn, ModuleMeta, PresetConfig, GLOBAL_SCOPE,
};
use crate::models::export_config_model::ExportConfig;
use crate::models::patch_model::ConfigPatch;

/// Entrada del registro: clave canónica, etiqueta y claves antiguas que se aceptan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudioModule {
    pub key: &'static str,
    pub label: &'static str,
    pub legacy_keys: &'static [&'static str],
}

pub static STUDIO_MODULES: [StudioModule; 9] = [
    StudioModule {
        key: GLOBAL_SCOPE,
        label: "Global",
        legacy_keys: &[],
    },
    StudioModule {
        key: "inventory_vehicles",
        label: "Inventario de vehículos",
        legacy_keys: &["vehicle_inventory"],
    },
    StudioModule {
        key: "inventory_remises",
        label: "Inventario de depósitos",
        legacy_keys: &["remise_inventory", "inventory_remise"],
    },
    StudioModule {
        key: "inventory_pharmacy",
        label: "Inventario de farmacia",
        legacy_keys: &["pharmacy"],
    },
    StudioModule {
        key: "inventory_habillement",
        label: "Inventario de vestuario",
        legacy_keys: &["clothing"],
    },
    StudioModule {
        key: "orders",
        label: "Órdenes de compra",
        legacy_keys: &["purchase_orders"],
    },
    StudioModule {
        key: "orders_remises",
        label: "Órdenes de compra de depósitos",
        legacy_keys: &["remise_orders"],
    },
    StudioModule {
        key: "orders_pharmacy",
        label: "Órdenes de compra de farmacia",
        legacy_keys: &["pharmacy_orders"],
    },
    StudioModule {
        key: "barcodes",
        label: "Códigos de barras",
        legacy_keys: &["barcode"],
    },
];

fn find_module(key: &str) -> Option<&'static StudioModule> {
    STUDIO_MODULES
        .iter()
        .find(|module| module.key == key || module.legacy_keys.contains(&key))
}

/// Clave canónica de un módulo; las claves desconocidas se devuelven tal cual.
pub fn normalize_module_key(key: &str) -> String {
    find_module(key)
        .map(|module| module.key.to_string())
        .unwrap_or_else(|| key.to_string())
}

pub fn is_module_key(key: &str) -> bool {
    find_module(key).is_some()
}

pub fn module_label(key: &str) -> String {
    find_module(key)
        .map(|module| module.label.to_string())
        .unwrap_or_else(|| normalize_module_key(key))
}

// --------------------------------------------------------------------------------
// Presets de fábrica
// --------------------------------------------------------------------------------

fn preset(name: &str, config: serde_json::Value) -> (String, PresetConfig) {
    (
        name.to_string(),
        PresetConfig::new(name, ConfigPatch::from_value(config)),
    )
}

pub fn builtin_presets() -> IndexMap<String, PresetConfig> {
    IndexMap::from([
        preset("Standard", json!({})),
        preset(
            "Compacto",
            json!({
                "format": {
                    "margin_preset": "narrow",
                    "margins": { "top_mm": 10.0, "right_mm": 10.0, "bottom_mm": 10.0, "left_mm": 10.0 },
                    "density": "compact"
                },
                "advanced": {
                    "base_font_size": 9,
                    "header_bg_color": "#0f172a",
                    "header_text_color": "#e2e8f0",
                    "table_header_bg_color": "#111827",
                    "table_header_text_color": "#e2e8f0",
                    "row_alt_bg_color": "#0b1220"
                },
                "theme": { "base_font_size": 9, "heading_font_size": 12 }
            }),
        ),
        preset(
            "Auditoría",
            json!({
                "watermark": { "enabled": true, "text": "AUDITORÍA", "opacity": 0.12 },
                "footer": {
                    "enabled": true,
                    "show_pagination": true,
                    "show_printed_at": true,
                    "text": "Documento reservado a la auditoría interna."
                }
            }),
        ),
        preset(
            "Cliente",
            json!({
                "header": {
                    "enabled": true,
                    "title_template": "{module_title}",
                    "subtitle_template": "Documento para el cliente",
                    "info_keys": []
                },
                "footer": {
                    "enabled": true,
                    "show_pagination": true,
                    "show_printed_at": false,
                    "text": "Gracias por su confianza."
                }
            }),
        ),
        preset("Sin encabezado", json!({ "header": { "enabled": false } })),
    ])
}

/// Agrega los presets de fábrica que falten; los presets guardados tienen prioridad.
pub fn merge_builtin_presets(bundle: &mut ExportConfigBundle) -> usize {
    let mut added = 0;
    for (name, preset) in builtin_presets() {
        if !bundle.presets.contains_key(&name) {
            bundle.presets.insert(name, preset);
            added += 1;
        }
    }
    added
}

// --------------------------------------------------------------------------------
// Catálogo de metadatos de módulos
// --------------------------------------------------------------------------------

fn columns(entries: &[(&str, &str)]) -> Vec<ColumnMeta> {
    entries
        .iter()
        .map(|(key, label)| ColumnMeta {
            key: key.to_string(),
            label: label.to_string(),
            default_visible: true,
        })
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn inventory_meta(key: &str, extra_variables: &[&str], renderers: &[&str]) -> ModuleMeta {
    let mut variables = strings(&["module", "module_title", "date", "generated_at"]);
    variables.extend(strings(extra_variables));
    ModuleMeta {
        key: key.to_string(),
        label: module_label(key),
        variables,
        columns: columns(&[
            ("name", "Material"),
            ("quantity", "Cantidad"),
            ("size", "Talla / Variante"),
            ("category", "Categoría"),
            ("lots", "Lote(s)"),
            ("expiration", "Vencimiento"),
            ("threshold", "Umbral"),
        ]),
        sort_options: strings(&["name", "category", "location"]),
        group_options: strings(&["category", "location"]),
        renderers: strings(renderers),
        grouping_supported: true,
        groupable_columns: vec![
            GroupableColumn::new("category", "Categoría", false),
            GroupableColumn::new("size", "Talla / Variante", false),
            GroupableColumn::new("lots", "Lote(s)", false),
            GroupableColumn::new("expiration", "Vencimiento", false),
            GroupableColumn::new("quantity", "Cantidad", true),
            GroupableColumn::new("threshold", "Umbral", true),
        ],
    }
}

fn orders_meta(key: &str) -> ModuleMeta {
    ModuleMeta {
        key: key.to_string(),
        label: module_label(key),
        variables: strings(&["module", "module_title", "date", "generated_at", "order_id"]),
        columns: columns(&[
            ("article", "Artículo"),
            ("ordered", "Pedido"),
            ("received", "Recibido"),
        ]),
        sort_options: strings(&["name"]),
        group_options: Vec::new(),
        renderers: strings(&["reportlab"]),
        grouping_supported: false,
        groupable_columns: Vec::new(),
    }
}

pub fn builtin_module_meta() -> IndexMap<String, ModuleMeta> {
    let barcodes = ModuleMeta {
        key: "barcodes".to_string(),
        label: module_label("barcodes"),
        variables: strings(&["module", "module_title", "date", "generated_at"]),
        columns: columns(&[("barcode", "Código de barras")]),
        renderers: strings(&["reportlab"]),
        ..ModuleMeta::default()
    };

    [
        inventory_meta("inventory_vehicles", &["vehicle"], &["html", "reportlab"]),
        inventory_meta("inventory_remises", &[], &["reportlab"]),
        inventory_meta("inventory_pharmacy", &[], &["reportlab"]),
        inventory_meta("inventory_habillement", &[], &["reportlab"]),
        orders_meta("orders"),
        orders_meta("orders_remises"),
        orders_meta("orders_pharmacy"),
        barcodes,
    ]
    .into_iter()
    .map(|meta| (meta.key.clone(), meta))
    .collect()
}

/// Bundle que se usa cuando el backend todavía no tiene configuración guardada.
pub fn default_bundle() -> ExportConfigBundle {
    ExportConfigBundle {
        global_config: ExportConfig::default(),
        modules: IndexMap::new(),
        presets: builtin_presets(),
        module_meta: builtin_module_meta(),
    }
}
