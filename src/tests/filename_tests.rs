//! tests/filename_tests.rs
//! Pruebas de `render_filename`.

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use indexmap::IndexMap;

    use crate::services::filename_service::render_filename;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn render(pattern: &str, context: &IndexMap<String, String>) -> String {
        render_filename(pattern, "orders", "Órdenes de compra", context, now())
    }

    #[test]
    fn test_patron_por_defecto() {
        assert_eq!(
            render("{module}_{date:%Y%m%d_%H%M}.pdf", &IndexMap::new()),
            "orders_20240309_1405.pdf"
        );
    }

    #[test]
    fn test_variables_integradas_y_contexto() {
        let mut context = IndexMap::new();
        context.insert("order_id".to_string(), "OC-17".to_string());
        assert_eq!(
            render("{module_title} {order_id} ({generated_at})", &context),
            "Órdenes de compra OC-17 (09/03/2024 14:05).pdf"
        );
    }

    #[test]
    fn test_contexto_pisa_variables() {
        let mut context = IndexMap::new();
        context.insert("module".to_string(), "otro".to_string());
        assert_eq!(render("{module}", &context), "otro.pdf");
    }

    #[test]
    fn test_llaves_escapadas_y_extension() {
        assert_eq!(render("{{copia}}_{module}.PDF", &IndexMap::new()), "{copia}_orders.PDF");
        assert_eq!(render("{date}", &IndexMap::new()), "2024-03-09 14:05:00.pdf");
    }

    #[test]
    fn test_patrones_invalidos_usan_fallback() {
        let context = IndexMap::new();
        let fallback = "orders_20240309_1405.pdf";
        assert_eq!(render("{desconocida}.pdf", &context), fallback);
        assert_eq!(render("{module", &context), fallback);
        assert_eq!(render("module}", &context), fallback);
        assert_eq!(render("{module:%Y}", &context), fallback);
    }
}
