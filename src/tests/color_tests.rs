//! tests/color_tests.rs
//! Pruebas de normalización de colores y contraste WCAG.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::services::color_service::{
        contrast_ratio, is_low_contrast, normalize_color, relative_luminance, to_hex_color,
    };

    #[test]
    fn test_to_hex_color_ejemplos() {
        assert_eq!(to_hex_color("#fff", "#000000"), "#ffffff");
        assert_eq!(to_hex_color("rgb(0, 128, 255)", "#000000"), "#0080ff");
        assert_eq!(to_hex_color("not-a-color", "#112233"), "#112233");
    }

    #[test]
    fn test_to_hex_color_formatos() {
        assert_eq!(to_hex_color("  #ABCDEF  ", "#000000"), "#abcdef");
        assert_eq!(to_hex_color("#AbC", "#000000"), "#aabbcc");
        // sólo cuentan los primeros 6 dígitos
        assert_eq!(to_hex_color("#11223344", "#000000"), "#112233");
        assert_eq!(to_hex_color("rgba(255, 0, 0, 0.5)", "#000000"), "#ff0000");
        assert_eq!(to_hex_color("RGB(300, -20, 127.6)", "#000000"), "#ff0080");
        assert_eq!(to_hex_color("rgb(1, 2)", "#123456"), "#123456");
        assert_eq!(to_hex_color("#12", "#123456"), "#123456");
        assert_eq!(to_hex_color("#ggg", "#123456"), "#123456");
    }

    #[test]
    fn test_transparent_y_vacio_usan_fallback() {
        assert_eq!(to_hex_color("transparent", "#abcdef"), "#abcdef");
        assert_eq!(to_hex_color("   ", "#abcdef"), "#abcdef");
        assert_eq!(normalize_color("transparent"), None);
    }

    #[test]
    fn test_fallback_invalido_se_devuelve_tal_cual() {
        assert_eq!(to_hex_color("nada", "también nada"), "también nada");
    }

    #[test]
    fn test_contraste_extremos() {
        let ratio = contrast_ratio("#000000", "#ffffff").unwrap();
        assert!((ratio - 21.0).abs() < 0.01, "ratio={}", ratio);

        let same = contrast_ratio("#4f46e5", "#4f46e5").unwrap();
        assert!((same - 1.0).abs() < 1e-9);

        // simétrico
        let a = contrast_ratio("#1f2937", "#f8fafc").unwrap();
        let b = contrast_ratio("#f8fafc", "#1f2937").unwrap();
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_contraste_bajo() {
        let ratio = contrast_ratio("#777777", "#808080").unwrap();
        assert!(ratio < 4.5);
        assert!(is_low_contrast("#777777", "#808080"));
        assert!(!is_low_contrast("#111827", "#ffffff"));
    }

    #[test]
    fn test_contraste_color_invalido() {
        assert_eq!(contrast_ratio("rojo", "#ffffff"), None);
        assert_eq!(contrast_ratio("#000000", "transparent"), None);
        assert!(!is_low_contrast("rojo", "#ffffff"));
    }

    #[test]
    fn test_luminancia_relativa() {
        assert_eq!(relative_luminance(0, 0, 0), 0.0);
        assert!((relative_luminance(255, 255, 255) - 1.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_to_hex_color_idempotente(input in ".{0,24}", fallback in "#[0-9a-fA-F]{6}|.{0,12}") {
            let once = to_hex_color(&input, &fallback);
            prop_assert_eq!(to_hex_color(&once, &fallback), once);
        }

        #[test]
        fn prop_rgb_siempre_canonico(r in -50.0f64..400.0, g in 0.0f64..255.0, b in 0.0f64..255.0) {
            let hex = to_hex_color(&format!("rgb({}, {}, {})", r, g, b), "#000000");
            prop_assert_eq!(hex.len(), 7);
            prop_assert!(hex.starts_with('#'));
            prop_assert!(hex[1..].chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }

        #[test]
        fn prop_contraste_en_rango(a in "#[0-9a-f]{6}", b in "#[0-9a-f]{6}") {
            let ratio = contrast_ratio(&a, &b).unwrap();
            prop_assert!((1.0..=21.0 + 1e-9).contains(&ratio));
        }
    }
}
