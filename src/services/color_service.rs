//! services/color_service.rs
//! Normalización de colores y contraste WCAG.

/// Umbral WCAG AA para texto normal.
pub const MIN_CONTRAST_RATIO: f64 = 4.5;

/// Formatos que acepta `to_hex_color`.
pub const ACCEPTED_COLOR_FORMATS: [&str; 5] =
    ["#RGB", "#RRGGBB", "rgb(r,g,b)", "rgba(r,g,b,a)", "transparent"];

/// Intenta llevar un literal de color a `#rrggbb` en minúsculas.
/// Devuelve `None` si el literal no es reconocible (o es `transparent`).
pub fn normalize_color(input: &str) -> Option<String> {
    let value = input.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("transparent") {
        return None;
    }

    if let Some(hex) = value.strip_prefix('#') {
        return normalize_hex(hex);
    }

    let lower = value.to_ascii_lowercase();
    let inner = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    normalize_rgb(inner)
}

fn normalize_hex(hex: &str) -> Option<String> {
    // #abc exacto
    if hex.len() == 3 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        let expanded: String = hex
            .chars()
            .flat_map(|c| [c, c])
            .collect::<String>()
            .to_ascii_lowercase();
        return Some(format!("#{}", expanded));
    }

    // #aabbcc..., sólo los primeros 6 dígitos cuentan
    let prefix = hex.get(..6)?;
    if prefix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Some(format!("#{}", prefix.to_ascii_lowercase()));
    }
    None
}

fn normalize_rgb(inner: &str) -> Option<String> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }
    let mut hex = String::with_capacity(7);
    hex.push('#');
    for part in &parts[..3] {
        let channel: f64 = part.parse().ok()?;
        if channel.is_nan() {
            return None;
        }
        let byte = channel.clamp(0.0, 255.0).round() as u8;
        hex.push_str(&format!("{:02x}", byte));
    }
    Some(hex)
}

/// Normaliza `input` a `#rrggbb`; si no se puede, devuelve `fallback`
/// (también normalizado cuando es un color válido, para que la función sea idempotente).
pub fn to_hex_color(input: &str, fallback: &str) -> String {
    normalize_color(input)
        .or_else(|| normalize_color(fallback))
        .unwrap_or_else(|| fallback.to_string())
}

/// Canales RGB de un color ya normalizable.
pub fn rgb_channels(input: &str) -> Option<(u8, u8, u8)> {
    let hex = normalize_color(input)?;
    let r = u8::from_str_radix(&hex[1..3], 16).ok()?;
    let g = u8::from_str_radix(&hex[3..5], 16).ok()?;
    let b = u8::from_str_radix(&hex[5..7], 16).ok()?;
    Some((r, g, b))
}

/// Luminancia relativa WCAG 2.0.
/// See: https://www.w3.org/TR/WCAG20/#relativeluminancedef
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    fn channel(c: u8) -> f64 {
        let c = f64::from(c) / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
}

/// Ratio de contraste WCAG en `[1, 21]`, o `None` si algún color no es válido.
pub fn contrast_ratio(foreground: &str, background: &str) -> Option<f64> {
    let (fr, fg, fb) = rgb_channels(foreground)?;
    let (br, bg, bb) = rgb_channels(background)?;
    let l1 = relative_luminance(fr, fg, fb);
    let l2 = relative_luminance(br, bg, bb);
    let lighter = l1.max(l2);
    let darker = l1.min(l2);
    Some((lighter + 0.05) / (darker + 0.05))
}

/// `true` si el par existe y no llega al mínimo AA.
pub fn is_low_contrast(foreground: &str, background: &str) -> bool {
    contrast_ratio(foreground, background).is_some_and(|ratio| ratio < MIN_CONTRAST_RATIO)
}
