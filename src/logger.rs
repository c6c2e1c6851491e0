//! logger.rs
//! Configuración del logger usando env_logger.

pub fn init_logger() {
    // Nivel desde RUST_LOG; si no está, "info".
    let log_env = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    // try_init: la app y los tests pueden llamarlo más de una vez
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_env))
        .format_timestamp_secs()
        .try_init();
}
