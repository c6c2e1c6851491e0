//! tests/normalize_tests.rs
//! Pruebas de la normalización previa al guardado.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::models::bundle_model::{ExportConfigBundle, ModuleMeta, ModuleScope, PresetConfig};
    use crate::models::export_config_model::{MarginPreset, PdfMargins};
    use crate::models::patch_model::ConfigPatch;
    use crate::services::merge_service::resolve_module_config;
    use crate::services::normalize_service::{normalize_bundle, null_section_scopes};

    fn bundle_desde_json(value: serde_json::Value) -> ExportConfigBundle {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_secciones_null_se_reportan_y_no_bloquean() {
        let mut bundle = bundle_desde_json(json!({
            "global_config": { "branding": null },
            "modules": {
                "orders": { "override_global": true, "config": { "branding": null, "footer": { "text": "Pie" } } }
            },
            "presets": {
                "Vacío": { "name": "Vacío", "config": { "theme": null } }
            }
        }));
        let antes = resolve_module_config(&bundle, "orders", Some("Vacío"));

        let report = normalize_bundle(&mut bundle);
        assert_eq!(
            report.null_scopes,
            vec!["modules.orders.config".to_string(), "presets.Vacío.config".to_string()]
        );
        assert!(bundle.presets["Vacío"].config.is_empty());
        // null y ausente resuelven igual
        assert_eq!(resolve_module_config(&bundle, "orders", Some("Vacío")), antes);
    }

    #[test]
    fn test_null_section_scopes_en_payload_crudo() {
        let raw = json!({
            "global_config": { "branding": null },
            "modules": { "orders": { "override_global": false, "config": { "format": null } } },
            "presets": { "A": { "name": "A", "config": { "format": {} } } }
        });
        assert_eq!(
            null_section_scopes(&raw),
            vec!["global_config".to_string(), "modules.orders.config".to_string()]
        );
    }

    #[test]
    fn test_global_null_se_tipa_como_default() {
        let bundle = bundle_desde_json(json!({ "global_config": { "branding": null, "theme": null } }));
        assert_eq!(bundle.global_config, Default::default());
    }

    #[test]
    fn test_claves_heredadas_se_renombran() {
        let mut bundle = ExportConfigBundle::default();
        bundle.modules.insert(
            "purchase_orders".to_string(),
            ModuleScope::Overridden(ConfigPatch::from_value(json!({ "footer": { "text": "viejo" } }))),
        );
        bundle.modules.insert(
            "barcode".to_string(),
            ModuleScope::Overridden(ConfigPatch::from_value(json!({ "footer": { "text": "legacy" } }))),
        );
        bundle.modules.insert(
            "barcodes".to_string(),
            ModuleScope::Overridden(ConfigPatch::from_value(json!({ "footer": { "text": "actual" } }))),
        );
        bundle.module_meta.insert(
            "vehicle_inventory".to_string(),
            ModuleMeta { key: "vehicle_inventory".to_string(), ..ModuleMeta::default() },
        );

        let report = normalize_bundle(&mut bundle);
        assert!(bundle.modules.contains_key("orders"));
        assert!(!bundle.modules.contains_key("barcode"));
        assert_eq!(
            resolve_module_config(&bundle, "barcodes", None).footer.text.as_deref(),
            Some("actual")
        );
        assert_eq!(bundle.module_meta["inventory_vehicles"].key, "inventory_vehicles");
        assert!(report
            .renamed_modules
            .contains(&("purchase_orders".to_string(), "orders".to_string())));
        assert_eq!(report.dropped_legacy_modules, vec!["barcode".to_string()]);
        // el orden se conserva
        assert_eq!(bundle.modules.get_index(0).map(|(k, _)| k.as_str()), Some("orders"));
    }

    #[test]
    fn test_margenes_derivados_del_preset() {
        let mut bundle = ExportConfigBundle::default();
        bundle.global_config.format.margin_preset = MarginPreset::Wide;
        bundle.presets.insert(
            "Angosto".to_string(),
            PresetConfig::new(
                "Angosto",
                ConfigPatch::from_value(json!({ "format": { "margin_preset": "narrow" } })),
            ),
        );

        let antes = resolve_module_config(&bundle, "orders", Some("Angosto"));
        let global_antes = resolve_module_config(&bundle, "orders", None);

        let report = normalize_bundle(&mut bundle);
        // los márgenes explícitos del global se guardan tal cual
        assert_eq!(bundle.global_config.format.margins, PdfMargins::uniform(15.0));
        assert_eq!(report.derived_margins, 1);
        let preset = bundle.presets["Angosto"].config.section("format").unwrap();
        assert_eq!(preset["margins"]["top_mm"], json!(10.0));

        let resolved = resolve_module_config(&bundle, "orders", Some("Angosto"));
        assert_eq!(resolved.format.margins, PdfMargins::uniform(10.0));
        assert_eq!(resolved, antes);
        assert_eq!(resolve_module_config(&bundle, "orders", None), global_antes);
    }

    #[test]
    fn test_margenes_custom_no_se_tocan() {
        let mut bundle = ExportConfigBundle::default();
        bundle.global_config.format.margin_preset = MarginPreset::Custom;
        bundle.global_config.format.margins = PdfMargins::uniform(7.0);
        normalize_bundle(&mut bundle);
        assert_eq!(bundle.global_config.format.margins, PdfMargins::uniform(7.0));
    }

    #[test]
    fn test_colores_y_opacidades_en_parches() {
        let mut bundle = ExportConfigBundle::default();
        bundle.global_config.theme.text_color = "rgb(0, 0, 0)".to_string();
        bundle.global_config.watermark.opacity = -1.0;
        bundle.modules.insert(
            "orders".to_string(),
            ModuleScope::Inherited {
                suspended: Some(ConfigPatch::from_value(json!({
                    "theme": { "accent_color": "#F0A", "background_opacity": 4, "font_family": "Courier" },
                    "advanced": { "header_bg_color": "azul" },
                    "branding": { "accent_color": "rgba(16, 32, 48, 0.5)" },
                    "watermark": { "opacity": 1.5 }
                }))),
            },
        );

        normalize_bundle(&mut bundle);
        assert_eq!(bundle.global_config.theme.text_color, "#000000");
        assert_eq!(bundle.global_config.watermark.opacity, 0.0);

        let patch = bundle.modules["orders"].suspended().unwrap();
        assert_eq!(
            patch.section("theme"),
            Some(&json!({ "accent_color": "#ff00aa", "background_opacity": 1.0, "font_family": "Courier" }))
        );
        assert_eq!(patch.section("advanced"), Some(&json!({ "header_bg_color": "#111827" })));
        assert_eq!(patch.section("branding"), Some(&json!({ "accent_color": "#102030" })));
        assert_eq!(patch.section("watermark"), Some(&json!({ "opacity": 1.0 })));
    }

    #[test]
    fn test_bundle_limpio() {
        let mut bundle = crate::services::registry_service::default_bundle();
        let antes = bundle.clone();
        let report = normalize_bundle(&mut bundle);
        assert!(report.is_clean());
        assert_eq!(report.derived_margins, 0);
        assert_eq!(bundle, antes);
    }
}
