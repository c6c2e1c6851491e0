//! tests/settings_tests.rs
//! Pruebas de `StudioSettings`.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::config::studio_config::StudioSettings;

    fn from_map(vars: &[(&str, &str)]) -> StudioSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StudioSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_valores_por_defecto() {
        let settings = from_map(&[]);
        assert_eq!(settings, StudioSettings::default());
        assert_eq!(settings.preview_debounce(), Duration::from_millis(800));
        assert!(settings.auto_preview);
        assert!(settings.discard_stale_previews);
    }

    #[test]
    fn test_lectura_de_variables() {
        let settings = from_map(&[
            ("PDF_STUDIO_API_URL", "https://stock.local/api/"),
            ("PDF_STUDIO_PREVIEW_DEBOUNCE_MS", "250"),
            ("PDF_STUDIO_AUTO_PREVIEW", "false"),
            ("PDF_STUDIO_REQUEST_TIMEOUT_SECS", " 5 "),
            ("PDF_STUDIO_DISCARD_STALE_PREVIEWS", "0"),
        ]);
        assert_eq!(settings.api_url, "https://stock.local/api");
        assert_eq!(settings.preview_debounce_ms, 250);
        assert!(!settings.auto_preview);
        assert_eq!(settings.request_timeout_secs, 5);
        assert!(!settings.discard_stale_previews);
    }

    #[test]
    fn test_valores_invalidos_usan_defaults() {
        let settings = from_map(&[
            ("PDF_STUDIO_API_URL", "   "),
            ("PDF_STUDIO_PREVIEW_DEBOUNCE_MS", "rápido"),
            ("PDF_STUDIO_AUTO_PREVIEW", "quizás"),
        ]);
        assert_eq!(settings, StudioSettings::default());
    }
}
