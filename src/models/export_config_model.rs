//! models/export_config_model.rs
//! Estructuras de la configuración de exportación PDF (una capa completa).

use serde::{Deserialize, Deserializer, Serialize};

/// Deserializa `null` como el valor por defecto de la sección.
/// El backend a veces guarda secciones como `null` en vez de omitirlas.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PdfPageSize {
    #[default]
    A4,
    A5,
    Letter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PdfOrientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarginPreset {
    #[default]
    Normal,
    Narrow,
    Wide,
    Custom,
}

impl MarginPreset {
    /// Margen (mm) que corresponde a cada preset; `Custom` usa los márgenes explícitos.
    pub fn margin_mm(self) -> Option<f64> {
        match self {
            MarginPreset::Narrow => Some(10.0),
            MarginPreset::Normal => Some(15.0),
            MarginPreset::Wide => Some(25.0),
            MarginPreset::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Comfort,
    #[default]
    Standard,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogoPosition {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupHeaderStyle {
    #[default]
    Bar,
    Inline,
    None,
}

/// Alcance de conteos/subtotales: por nivel o sólo en hojas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupScope {
    #[default]
    Level,
    Leaf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    #[default]
    None,
    Color,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundFit {
    #[default]
    Cover,
    Contain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfMargins {
    pub top_mm: f64,
    pub right_mm: f64,
    pub bottom_mm: f64,
    pub left_mm: f64,
}

impl PdfMargins {
    pub fn uniform(value: f64) -> Self {
        Self {
            top_mm: value,
            right_mm: value,
            bottom_mm: value,
            left_mm: value,
        }
    }
}

impl Default for PdfMargins {
    fn default() -> Self {
        Self::uniform(15.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FormatConfig {
    pub size: PdfPageSize,
    pub orientation: PdfOrientation,
    pub margin_preset: MarginPreset,
    #[serde(deserialize_with = "null_as_default")]
    pub margins: PdfMargins,
    pub density: Density,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    pub logo_enabled: bool,
    pub logo_url: Option<String>,
    pub logo_path: Option<String>,
    pub logo_width_mm: f64,
    pub logo_position: LogoPosition,
    pub company_name: Option<String>,
    pub accent_color: Option<String>,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            logo_enabled: true,
            logo_url: None,
            logo_path: None,
            logo_width_mm: 24.0,
            logo_position: LogoPosition::Left,
            company_name: Some("Gestión Stock Pro".to_string()),
            accent_color: Some("#4f46e5".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub enabled: bool,
    pub title_template: String,
    pub subtitle_template: String,
    pub info_keys: Vec<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title_template: "{module_title}".to_string(),
            subtitle_template: "Generado el {generated_at}".to_string(),
            info_keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub key: String,
    pub label: String,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContentConfig {
    pub columns: Vec<ColumnConfig>,
    pub sort_by: Option<String>,
    pub group_by: Option<String>,
    pub show_totals: bool,
}

/// Agrupamiento anidado: `keys[0]` es el nivel 1, `keys[1]` el nivel 2, etc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub enabled: bool,
    pub keys: Vec<String>,
    pub header_style: GroupHeaderStyle,
    pub page_break_between_level1: bool,
    pub show_counts: bool,
    pub counts_scope: GroupScope,
    pub show_subtotals: bool,
    pub subtotal_columns: Vec<String>,
    pub subtotal_scope: GroupScope,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            keys: Vec::new(),
            header_style: GroupHeaderStyle::Bar,
            page_break_between_level1: false,
            show_counts: true,
            counts_scope: GroupScope::Level,
            show_subtotals: false,
            subtotal_columns: Vec::new(),
            subtotal_scope: GroupScope::Level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    pub enabled: bool,
    pub show_pagination: bool,
    pub show_printed_at: bool,
    pub text: Option<String>,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_pagination: true,
            show_printed_at: true,
            text: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub enabled: bool,
    pub text: String,
    pub opacity: f64,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            text: "CONFIDENCIAL".to_string(),
            opacity: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilenameConfig {
    pub pattern: String,
    /// Variables extra disponibles en el patrón (además de las del módulo).
    pub variables: Vec<String>,
}

impl Default for FilenameConfig {
    fn default() -> Self {
        Self {
            pattern: "{module}_{date:%Y%m%d_%H%M}.pdf".to_string(),
            variables: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    pub font_family: String,
    pub base_font_size: u32,
    pub header_bg_color: String,
    pub header_text_color: String,
    pub table_header_bg_color: String,
    pub table_header_text_color: String,
    pub row_alt_bg_color: String,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            base_font_size: 10,
            header_bg_color: "#111827".to_string(),
            header_text_color: "#f8fafc".to_string(),
            table_header_bg_color: "#1f2937".to_string(),
            table_header_text_color: "#f8fafc".to_string(),
            row_alt_bg_color: "#0f172a".to_string(),
        }
    }
}

/// Tema visual. `ThemeConfig::default()` es el tema base sobre el que se
/// fusionan todas las capas, así que un tema resuelto nunca tiene huecos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub font_family: String,
    pub base_font_size: u32,
    pub heading_font_size: u32,
    pub text_color: String,
    pub muted_text_color: String,
    pub accent_color: String,
    pub table_header_bg: String,
    pub table_header_text: String,
    pub table_row_alt_bg: String,
    pub border_color: String,
    pub background_mode: BackgroundMode,
    pub background_color: String,
    pub background_image: Option<String>,
    pub background_fit: BackgroundFit,
    pub background_position: String,
    pub background_opacity: f64,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            base_font_size: 10,
            heading_font_size: 14,
            text_color: "#111827".to_string(),
            muted_text_color: "#6b7280".to_string(),
            accent_color: "#4f46e5".to_string(),
            table_header_bg: "#1f2937".to_string(),
            table_header_text: "#f8fafc".to_string(),
            table_row_alt_bg: "#f3f4f6".to_string(),
            border_color: "#e5e7eb".to_string(),
            background_mode: BackgroundMode::None,
            background_color: "#ffffff".to_string(),
            background_image: None,
            background_fit: BackgroundFit::Cover,
            background_position: "center".to_string(),
            background_opacity: 1.0,
        }
    }
}

/// Campos del tema, en el orden en que se editan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeField {
    FontFamily,
    BaseFontSize,
    HeadingFontSize,
    TextColor,
    MutedTextColor,
    AccentColor,
    TableHeaderBg,
    TableHeaderText,
    TableRowAltBg,
    BorderColor,
    BackgroundMode,
    BackgroundColor,
    BackgroundImage,
    BackgroundFit,
    BackgroundPosition,
    BackgroundOpacity,
}

impl ThemeField {
    pub const ALL: [ThemeField; 16] = [
        ThemeField::FontFamily,
        ThemeField::BaseFontSize,
        ThemeField::HeadingFontSize,
        ThemeField::TextColor,
        ThemeField::MutedTextColor,
        ThemeField::AccentColor,
        ThemeField::TableHeaderBg,
        ThemeField::TableHeaderText,
        ThemeField::TableRowAltBg,
        ThemeField::BorderColor,
        ThemeField::BackgroundMode,
        ThemeField::BackgroundColor,
        ThemeField::BackgroundImage,
        ThemeField::BackgroundFit,
        ThemeField::BackgroundPosition,
        ThemeField::BackgroundOpacity,
    ];

    /// Nombre del campo en el JSON.
    pub fn key(self) -> &'static str {
        match self {
            ThemeField::FontFamily => "font_family",
            ThemeField::BaseFontSize => "base_font_size",
            ThemeField::HeadingFontSize => "heading_font_size",
            ThemeField::TextColor => "text_color",
            ThemeField::MutedTextColor => "muted_text_color",
            ThemeField::AccentColor => "accent_color",
            ThemeField::TableHeaderBg => "table_header_bg",
            ThemeField::TableHeaderText => "table_header_text",
            ThemeField::TableRowAltBg => "table_row_alt_bg",
            ThemeField::BorderColor => "border_color",
            ThemeField::BackgroundMode => "background_mode",
            ThemeField::BackgroundColor => "background_color",
            ThemeField::BackgroundImage => "background_image",
            ThemeField::BackgroundFit => "background_fit",
            ThemeField::BackgroundPosition => "background_position",
            ThemeField::BackgroundOpacity => "background_opacity",
        }
    }

    pub fn is_color(self) -> bool {
        matches!(
            self,
            ThemeField::TextColor
                | ThemeField::MutedTextColor
                | ThemeField::AccentColor
                | ThemeField::TableHeaderBg
                | ThemeField::TableHeaderText
                | ThemeField::TableRowAltBg
                | ThemeField::BorderColor
                | ThemeField::BackgroundColor
        )
    }
}

impl ThemeConfig {
    /// Copia un único campo desde otro tema (para "volver al valor heredado").
    pub fn copy_field(&mut self, from: &ThemeConfig, field: ThemeField) {
        match field {
            ThemeField::FontFamily => self.font_family = from.font_family.clone(),
            ThemeField::BaseFontSize => self.base_font_size = from.base_font_size,
            ThemeField::HeadingFontSize => self.heading_font_size = from.heading_font_size,
            ThemeField::TextColor => self.text_color = from.text_color.clone(),
            ThemeField::MutedTextColor => self.muted_text_color = from.muted_text_color.clone(),
            ThemeField::AccentColor => self.accent_color = from.accent_color.clone(),
            ThemeField::TableHeaderBg => self.table_header_bg = from.table_header_bg.clone(),
            ThemeField::TableHeaderText => self.table_header_text = from.table_header_text.clone(),
            ThemeField::TableRowAltBg => self.table_row_alt_bg = from.table_row_alt_bg.clone(),
            ThemeField::BorderColor => self.border_color = from.border_color.clone(),
            ThemeField::BackgroundMode => self.background_mode = from.background_mode,
            ThemeField::BackgroundColor => self.background_color = from.background_color.clone(),
            ThemeField::BackgroundImage => self.background_image = from.background_image.clone(),
            ThemeField::BackgroundFit => self.background_fit = from.background_fit,
            ThemeField::BackgroundPosition => {
                self.background_position = from.background_position.clone()
            }
            ThemeField::BackgroundOpacity => self.background_opacity = from.background_opacity,
        }
    }

    /// Acceso mutable a los campos de color, en el orden de `ThemeField::ALL`.
    pub fn color_mut(&mut self, field: ThemeField) -> Option<&mut String> {
        match field {
            ThemeField::TextColor => Some(&mut self.text_color),
            ThemeField::MutedTextColor => Some(&mut self.muted_text_color),
            ThemeField::AccentColor => Some(&mut self.accent_color),
            ThemeField::TableHeaderBg => Some(&mut self.table_header_bg),
            ThemeField::TableHeaderText => Some(&mut self.table_header_text),
            ThemeField::TableRowAltBg => Some(&mut self.table_row_alt_bg),
            ThemeField::BorderColor => Some(&mut self.border_color),
            ThemeField::BackgroundColor => Some(&mut self.background_color),
            _ => None,
        }
    }

    pub fn color(&self, field: ThemeField) -> Option<&str> {
        match field {
            ThemeField::TextColor => Some(&self.text_color),
            ThemeField::MutedTextColor => Some(&self.muted_text_color),
            ThemeField::AccentColor => Some(&self.accent_color),
            ThemeField::TableHeaderBg => Some(&self.table_header_bg),
            ThemeField::TableHeaderText => Some(&self.table_header_text),
            ThemeField::TableRowAltBg => Some(&self.table_row_alt_bg),
            ThemeField::BorderColor => Some(&self.border_color),
            ThemeField::BackgroundColor => Some(&self.background_color),
            _ => None,
        }
    }
}

/// Configuración completa de exportación (todas las secciones presentes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExportConfig {
    #[serde(deserialize_with = "null_as_default")]
    pub format: FormatConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub branding: BrandingConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub header: HeaderConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub content: ContentConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub grouping: GroupingConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub footer: FooterConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub watermark: WatermarkConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub filename: FilenameConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub advanced: AdvancedConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub theme: ThemeConfig,
}

impl ExportConfig {
    /// Nombres de las secciones, tal como aparecen en el JSON.
    pub const SECTIONS: [&'static str; 10] = [
        "format",
        "branding",
        "header",
        "content",
        "grouping",
        "footer",
        "watermark",
        "filename",
        "advanced",
        "theme",
    ];
}
