//! tests/theme_tests.rs
//! Pruebas de resolución del tema (campo por campo), tema heredado y advertencias.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::{json, Value};

    use crate::models::bundle_model::{ExportConfigBundle, ModuleScope, PresetConfig};
    use crate::models::export_config_model::{BackgroundMode, ThemeConfig, ThemeField};
    use crate::models::meta_model::ConfigMeta;
    use crate::models::patch_model::ConfigPatch;
    use crate::services::theme_service::{
        resolve_fallback_theme, resolve_theme, theme_warnings, ThemeWarning,
    };

    fn bundle() -> ExportConfigBundle {
        let mut bundle = ExportConfigBundle::default();
        bundle.global_config.theme.text_color = "#222222".to_string();
        bundle.presets.insert(
            "Marca".to_string(),
            PresetConfig::new(
                "Marca",
                ConfigPatch::from_value(json!({ "theme": { "accent_color": "#FF0000" } })),
            ),
        );
        bundle
    }

    fn override_theme(bundle: &mut ExportConfigBundle, module: &str, theme: Value) {
        bundle.modules.insert(
            module.to_string(),
            ModuleScope::Overridden(ConfigPatch::from_value(json!({ "theme": theme }))),
        );
    }

    #[test]
    fn test_bundle_vacio_da_tema_por_defecto() {
        let bundle = ExportConfigBundle::default();
        assert_eq!(resolve_theme(&bundle, "orders", None), ThemeConfig::default());
        assert_eq!(resolve_theme(&bundle, "global", None), ThemeConfig::default());
    }

    #[test]
    fn test_capas_campo_por_campo() {
        let mut bundle = bundle();
        override_theme(&mut bundle, "orders", json!({ "border_color": "#00ff00" }));

        let theme = resolve_theme(&bundle, "orders", Some("Marca"));
        assert_eq!(theme.text_color, "#222222"); // global
        assert_eq!(theme.accent_color, "#ff0000"); // preset
        assert_eq!(theme.border_color, "#00ff00"); // módulo
        assert_eq!(theme.table_header_bg, ThemeConfig::default().table_header_bg);
    }

    #[test]
    fn test_override_suspendido_no_participa() {
        let mut bundle = bundle();
        bundle.modules.insert(
            "orders".to_string(),
            ModuleScope::Inherited {
                suspended: Some(ConfigPatch::from_value(
                    json!({ "theme": { "text_color": "#abcdef" } }),
                )),
            },
        );
        assert_eq!(resolve_theme(&bundle, "orders", None).text_color, "#222222");
    }

    #[test]
    fn test_tema_heredado_excluye_modulo() {
        let mut bundle = bundle();
        override_theme(&mut bundle, "orders", json!({ "accent_color": "#0000ff" }));

        assert_eq!(resolve_theme(&bundle, "orders", Some("Marca")).accent_color, "#0000ff");
        assert_eq!(
            resolve_fallback_theme(&bundle, "orders", Some("Marca")).accent_color,
            "#ff0000"
        );
    }

    #[test]
    fn test_tema_heredado_del_ambito_global_es_el_por_defecto() {
        let bundle = bundle();
        assert_eq!(
            resolve_fallback_theme(&bundle, "global", Some("Marca")),
            ThemeConfig::default()
        );
        // el ámbito global no aplica el preset
        assert_eq!(resolve_theme(&bundle, "global", Some("Marca")).accent_color, "#4f46e5");
    }

    #[test]
    fn test_valores_invalidos_o_null_conservan_la_capa_anterior() {
        let mut bundle = bundle();
        override_theme(
            &mut bundle,
            "orders",
            json!({
                "base_font_size": "grande",
                "text_color": null,
                "background_mode": "degradado",
                "background_fit": "contain",
                "heading_font_size": 16
            }),
        );
        let theme = resolve_theme(&bundle, "orders", None);
        assert_eq!(theme.base_font_size, ThemeConfig::default().base_font_size);
        assert_eq!(theme.text_color, "#222222");
        assert_eq!(theme.background_mode, BackgroundMode::None);
        assert_eq!(theme.heading_font_size, 16);
    }

    #[test]
    fn test_colores_y_opacidad_canonicos() {
        let mut bundle = bundle();
        override_theme(
            &mut bundle,
            "orders",
            json!({
                "text_color": "rgb(255, 0, 0)",
                "muted_text_color": "transparent",
                "border_color": "#ABC",
                "background_opacity": 2.5
            }),
        );
        let theme = resolve_theme(&bundle, "orders", None);
        assert_eq!(theme.text_color, "#ff0000");
        assert_eq!(theme.muted_text_color, ThemeConfig::default().muted_text_color);
        assert_eq!(theme.border_color, "#aabbcc");
        assert_eq!(theme.background_opacity, 1.0);
    }

    #[test]
    fn test_tema_por_defecto_sin_advertencias() {
        assert!(theme_warnings(&ThemeConfig::default(), None).is_empty());
    }

    #[test]
    fn test_advertencia_de_contraste() {
        let theme = ThemeConfig {
            text_color: "#cccccc".to_string(),
            ..ThemeConfig::default()
        };
        let warnings = theme_warnings(&theme, None);
        assert!(warnings.iter().any(|w| matches!(
            w,
            ThemeWarning::LowContrast {
                foreground: ThemeField::TextColor,
                background: ThemeField::BackgroundColor,
                ..
            }
        )));
        assert!(warnings[0].message().contains("text_color"));
    }

    #[test]
    fn test_fondo_de_color_se_usa_solo_en_modo_color() {
        let mut theme = ThemeConfig {
            background_color: "#111111".to_string(),
            ..ThemeConfig::default()
        };
        // sin modo color la página es blanca: texto oscuro ok
        assert!(theme_warnings(&theme, None).is_empty());

        theme.background_mode = BackgroundMode::Color;
        assert!(!theme_warnings(&theme, None).is_empty());
    }

    #[test]
    fn test_fuente_no_soportada() {
        let meta = ConfigMeta {
            supported_fonts: vec!["Helvetica".to_string(), "Times-Roman".to_string()],
            ..ConfigMeta::default()
        };
        let mut theme = ThemeConfig::default();
        assert!(theme_warnings(&theme, Some(&meta)).is_empty());

        theme.font_family = "Comic Sans".to_string();
        assert_eq!(
            theme_warnings(&theme, Some(&meta)),
            vec![ThemeWarning::UnsupportedFont("Comic Sans".to_string())]
        );
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            (-10.0f64..10.0).prop_map(Value::from),
            ".{0,10}".prop_map(Value::from),
            "#[0-9a-fA-F]{3,6}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn prop_tema_siempre_completo(values in prop::collection::vec(arb_json(), 16)) {
            let layer: serde_json::Map<String, Value> = ThemeField::ALL
                .iter()
                .zip(values)
                .map(|(field, value)| (field.key().to_string(), value))
                .collect();
            let mut bundle = ExportConfigBundle::default();
            override_theme(&mut bundle, "orders", Value::Object(layer));

            let theme = resolve_theme(&bundle, "orders", None);
            for field in ThemeField::ALL {
                if let Some(color) = theme.color(field) {
                    prop_assert_eq!(color.len(), 7);
                    prop_assert!(color.starts_with('#'));
                }
            }
            prop_assert!((0.0..=1.0).contains(&theme.background_opacity));
        }
    }
}
