//! services/filename_service.rs
//! Nombre de archivo del PDF a partir del patrón configurado.

use std::fmt::Write;

use chrono::NaiveDateTime;
use indexmap::IndexMap;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const GENERATED_AT_FORMAT: &str = "%d/%m/%Y %H:%M";
const FALLBACK_DATE_FORMAT: &str = "%Y%m%d_%H%M";

/// Sustituye las variables del patrón (`{module}`, `{module_title}`, `{date}`,
/// `{date:%Y%m%d}`, `{generated_at}` y las de `context`). Si el patrón no se
/// puede renderizar se usa `{module}_{%Y%m%d_%H%M}.pdf`. Siempre termina en `.pdf`.
pub fn render_filename(
    pattern: &str,
    module_key: &str,
    module_title: &str,
    context: &IndexMap<String, String>,
    now: NaiveDateTime,
) -> String {
    let filename = match render_pattern(pattern, module_key, module_title, context, now) {
        Some(rendered) => rendered,
        None => {
            log::warn!(
                "(render_filename) Patrón inválido '{}'; se usa el nombre por defecto",
                pattern
            );
            format!("{}_{}.pdf", module_key, now.format(FALLBACK_DATE_FORMAT))
        }
    };
    if filename.to_lowercase().ends_with(".pdf") {
        filename
    } else {
        format!("{}.pdf", filename)
    }
}

fn render_pattern(
    pattern: &str,
    module_key: &str,
    module_title: &str,
    context: &IndexMap<String, String>,
    now: NaiveDateTime,
) -> Option<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return None,
            '{' => {
                let mut placeholder = String::new();
                loop {
                    match chars.next()? {
                        '}' => break,
                        '{' => return None,
                        other => placeholder.push(other),
                    }
                }
                let (name, spec) = match placeholder.split_once(':') {
                    Some((name, spec)) => (name, Some(spec)),
                    None => (placeholder.as_str(), None),
                };
                out.push_str(&resolve_variable(name, spec, module_key, module_title, context, now)?);
            }
            other => out.push(other),
        }
    }
    Some(out)
}

fn resolve_variable(
    name: &str,
    spec: Option<&str>,
    module_key: &str,
    module_title: &str,
    context: &IndexMap<String, String>,
    now: NaiveDateTime,
) -> Option<String> {
    // el contexto pisa a las variables integradas
    if let Some(value) = context.get(name) {
        return spec.is_none().then(|| value.clone());
    }
    match (name, spec) {
        ("module", None) => Some(module_key.to_string()),
        ("module_title", None) => Some(module_title.to_string()),
        ("generated_at", None) => format_date(now, GENERATED_AT_FORMAT),
        ("date", None) => format_date(now, DATE_FORMAT),
        ("date", Some(fmt)) => format_date(now, fmt),
        _ => None,
    }
}

/// `None` si el formato strftime no es válido.
fn format_date(now: NaiveDateTime, fmt: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", now.format(fmt)).ok()?;
    Some(out)
}
