//! services/theme_service.rs
//! Resolución del tema efectivo (campo por campo) y del tema "heredado" para revertir campos.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::models::bundle_model::{ExportConfigBundle, ModuleScope, GLOBAL_SCOPE};
use crate::models::export_config_model::{
    AdvancedConfig, BackgroundMode, BrandingConfig, ExportConfig, ThemeConfig, ThemeField,
};
use crate::models::meta_model::ConfigMeta;
use crate::services::color_service::{contrast_ratio, to_hex_color, MIN_CONTRAST_RATIO};

/// Pares (texto, fondo) que se revisan para accesibilidad.
const CONTRAST_PAIRS: [(ThemeField, ThemeField); 4] = [
    (ThemeField::TextColor, ThemeField::BackgroundColor),
    (ThemeField::MutedTextColor, ThemeField::BackgroundColor),
    (ThemeField::TableHeaderText, ThemeField::TableHeaderBg),
    (ThemeField::TextColor, ThemeField::TableRowAltBg),
];

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeWarning {
    LowContrast {
        foreground: ThemeField,
        background: ThemeField,
        ratio: f64,
    },
    UnsupportedFont(String),
}

impl ThemeWarning {
    pub fn message(&self) -> String {
        match self {
            ThemeWarning::LowContrast {
                foreground,
                background,
                ratio,
            } => format!(
                "Contraste insuficiente entre '{}' y '{}' ({:.2}:1, mínimo {:.1}:1)",
                foreground.key(),
                background.key(),
                ratio,
                MIN_CONTRAST_RATIO
            ),
            ThemeWarning::UnsupportedFont(font) => {
                format!("La fuente '{}' no está disponible en el renderer", font)
            }
        }
    }
}

/// Tema efectivo del ámbito: defaults → global → preset → override del módulo.
pub fn resolve_theme(
    bundle: &ExportConfigBundle,
    module_key: &str,
    preset_name: Option<&str>,
) -> ThemeConfig {
    if module_key == GLOBAL_SCOPE {
        let mut theme = ThemeConfig::default();
        apply_theme_layer(&mut theme, &typed_layer(&bundle.global_config.theme));
        canonicalize_theme(&mut theme);
        return theme;
    }

    let mut theme = resolve_fallback_theme(bundle, module_key, preset_name);
    if let Some(layer) = bundle
        .module_scope(module_key)
        .and_then(ModuleScope::override_patch)
        .and_then(|patch| patch.section_object("theme"))
    {
        apply_theme_layer(&mut theme, layer);
    }
    canonicalize_theme(&mut theme);
    theme
}

/// Igual que `resolve_theme` pero sin la capa del módulo. Para el ámbito
/// global (que no hereda de nadie) es el tema por defecto.
pub fn resolve_fallback_theme(
    bundle: &ExportConfigBundle,
    module_key: &str,
    preset_name: Option<&str>,
) -> ThemeConfig {
    let mut theme = ThemeConfig::default();
    if module_key != GLOBAL_SCOPE {
        apply_theme_layer(&mut theme, &typed_layer(&bundle.global_config.theme));
        if let Some(layer) = bundle
            .preset(preset_name)
            .and_then(|preset| preset.config.section_object("theme"))
        {
            apply_theme_layer(&mut theme, layer);
        }
    }
    canonicalize_theme(&mut theme);
    theme
}

fn typed_layer(theme: &ThemeConfig) -> Map<String, Value> {
    match serde_json::to_value(theme) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Aplica una capa sobre el tema campo por campo. Campos ausentes, `null`
/// o con tipo inválido se ignoran y conservan el valor de la capa anterior.
pub fn apply_theme_layer(theme: &mut ThemeConfig, layer: &Map<String, Value>) {
    for field in ThemeField::ALL {
        let Some(value) = layer.get(field.key()).filter(|v| !v.is_null()) else {
            continue;
        };
        if !apply_theme_value(theme, field, value) {
            log::debug!(
                "(apply_theme_layer) Valor ignorado para '{}': {}",
                field.key(),
                value
            );
        }
    }
}

fn apply_theme_value(theme: &mut ThemeConfig, field: ThemeField, value: &Value) -> bool {
    match field {
        ThemeField::FontFamily => set_string(&mut theme.font_family, value),
        ThemeField::BaseFontSize => set_u32(&mut theme.base_font_size, value),
        ThemeField::HeadingFontSize => set_u32(&mut theme.heading_font_size, value),
        ThemeField::TextColor => set_string(&mut theme.text_color, value),
        ThemeField::MutedTextColor => set_string(&mut theme.muted_text_color, value),
        ThemeField::AccentColor => set_string(&mut theme.accent_color, value),
        ThemeField::TableHeaderBg => set_string(&mut theme.table_header_bg, value),
        ThemeField::TableHeaderText => set_string(&mut theme.table_header_text, value),
        ThemeField::TableRowAltBg => set_string(&mut theme.table_row_alt_bg, value),
        ThemeField::BorderColor => set_string(&mut theme.border_color, value),
        ThemeField::BackgroundMode => set_parsed(&mut theme.background_mode, value),
        ThemeField::BackgroundColor => set_string(&mut theme.background_color, value),
        ThemeField::BackgroundImage => match value.as_str() {
            Some(image) => {
                theme.background_image = Some(image.to_string());
                true
            }
            None => false,
        },
        ThemeField::BackgroundFit => set_parsed(&mut theme.background_fit, value),
        ThemeField::BackgroundPosition => set_string(&mut theme.background_position, value),
        ThemeField::BackgroundOpacity => match value.as_f64() {
            Some(opacity) if opacity.is_finite() => {
                theme.background_opacity = opacity;
                true
            }
            _ => false,
        },
    }
}

fn set_string(target: &mut String, value: &Value) -> bool {
    match value.as_str() {
        Some(s) => {
            *target = s.to_string();
            true
        }
        None => false,
    }
}

fn set_u32(target: &mut u32, value: &Value) -> bool {
    let parsed = value.as_u64().and_then(|n| u32::try_from(n).ok()).or_else(|| {
        value
            .as_f64()
            .filter(|n| n.is_finite() && *n >= 0.0 && *n <= f64::from(u32::MAX))
            .map(|n| n.round() as u32)
    });
    match parsed {
        Some(n) => {
            *target = n;
            true
        }
        None => false,
    }
}

fn set_parsed<T: DeserializeOwned>(target: &mut T, value: &Value) -> bool {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => {
            *target = parsed;
            true
        }
        Err(_) => false,
    }
}

/// Colores a `#rrggbb` (con fallback al tema por defecto) y opacidad en `[0, 1]`.
pub fn canonicalize_theme(theme: &mut ThemeConfig) {
    let defaults = ThemeConfig::default();
    for field in ThemeField::ALL {
        let fallback = defaults.color(field).unwrap_or("#000000");
        if let Some(color) = theme.color_mut(field) {
            *color = to_hex_color(color, fallback);
        }
    }
    theme.background_opacity = clamp_unit(theme.background_opacity, defaults.background_opacity);
}

/// Canonicaliza todos los colores de una config completa (tema, avanzado, branding).
pub fn canonicalize_config_colors(config: &mut ExportConfig) {
    canonicalize_theme(&mut config.theme);

    let advanced_defaults = AdvancedConfig::default();
    let advanced = &mut config.advanced;
    advanced.header_bg_color =
        to_hex_color(&advanced.header_bg_color, &advanced_defaults.header_bg_color);
    advanced.header_text_color =
        to_hex_color(&advanced.header_text_color, &advanced_defaults.header_text_color);
    advanced.table_header_bg_color = to_hex_color(
        &advanced.table_header_bg_color,
        &advanced_defaults.table_header_bg_color,
    );
    advanced.table_header_text_color = to_hex_color(
        &advanced.table_header_text_color,
        &advanced_defaults.table_header_text_color,
    );
    advanced.row_alt_bg_color =
        to_hex_color(&advanced.row_alt_bg_color, &advanced_defaults.row_alt_bg_color);

    if let Some(accent) = config.branding.accent_color.as_mut() {
        let fallback = BrandingConfig::default().accent_color.unwrap_or_default();
        *accent = to_hex_color(accent, &fallback);
    }

    config.watermark.opacity = clamp_unit(config.watermark.opacity, 0.08);
}

fn clamp_unit(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Advertencias no bloqueantes del tema (contraste y fuente).
pub fn theme_warnings(theme: &ThemeConfig, meta: Option<&ConfigMeta>) -> Vec<ThemeWarning> {
    // sin fondo de color, la página es blanca
    let page_background = match theme.background_mode {
        BackgroundMode::Color => theme.background_color.as_str(),
        _ => "#ffffff",
    };

    let mut warnings: Vec<ThemeWarning> = CONTRAST_PAIRS
        .iter()
        .filter_map(|(fg_field, bg_field)| {
            let fg = theme.color(*fg_field)?;
            let bg = match bg_field {
                ThemeField::BackgroundColor => page_background,
                other => theme.color(*other)?,
            };
            let ratio = contrast_ratio(fg, bg)?;
            (ratio < MIN_CONTRAST_RATIO).then_some(ThemeWarning::LowContrast {
                foreground: *fg_field,
                background: *bg_field,
                ratio,
            })
        })
        .collect();

    if let Some(meta) = meta {
        if !meta.supports_font(&theme.font_family) {
            warnings.push(ThemeWarning::UnsupportedFont(theme.font_family.clone()));
        }
    }
    warnings
}
