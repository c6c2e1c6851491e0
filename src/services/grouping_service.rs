//! services/grouping_service.rs
//! Saneamiento de claves de agrupamiento/subtotales contra la whitelist del módulo,
//! y helpers de árbol de grupos para los renderers.

use std::cmp::Ordering;
use std::collections::HashSet;

use indexmap::IndexMap;

use crate::models::bundle_model::{GroupableColumn, ModuleMeta};
use crate::models::export_config_model::ExportConfig;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SanitizedKeys {
    /// Claves permitidas, sin duplicados, en orden de primera aparición.
    pub valid: Vec<String>,
    /// Claves fuera de la whitelist, en el orden en que llegaron (con repeticiones).
    pub invalid: Vec<String>,
}

pub fn sanitize_grouping_keys(keys: &[String], allowed: &HashSet<String>) -> SanitizedKeys {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut result = SanitizedKeys::default();
    for key in keys {
        if !allowed.contains(key) {
            result.invalid.push(key.clone());
            continue;
        }
        if !key.is_empty() && seen.insert(key.as_str()) {
            result.valid.push(key.clone());
        }
    }
    result
}

fn allowed_keys(groupable: &[GroupableColumn]) -> HashSet<String> {
    groupable.iter().map(|col| col.key.clone()).collect()
}

fn numeric_keys(groupable: &[GroupableColumn]) -> HashSet<String> {
    groupable
        .iter()
        .filter(|col| col.is_numeric)
        .map(|col| col.key.clone())
        .collect()
}

/// Copia saneada de la config (sólo para vista previa / exportación; el borrador no se toca).
pub fn filter_grouping_config(config: &ExportConfig, groupable: &[GroupableColumn]) -> ExportConfig {
    let allowed = allowed_keys(groupable);
    let numeric = numeric_keys(groupable);
    let mut filtered = config.clone();

    let keys = sanitize_grouping_keys(&config.grouping.keys, &allowed);
    if !keys.invalid.is_empty() {
        log::debug!(
            "(filter_grouping_config) Claves de agrupamiento descartadas: {:?}",
            keys.invalid
        );
    }
    filtered.grouping.keys = keys.valid;
    filtered.grouping.subtotal_columns =
        sanitize_grouping_keys(&config.grouping.subtotal_columns, &numeric).valid;

    if let Some(group_by) = &config.content.group_by {
        if !allowed.contains(group_by) {
            log::debug!(
                "(filter_grouping_config) group_by '{}' no es agrupable en este módulo",
                group_by
            );
            filtered.content.group_by = None;
        }
    }
    filtered
}

/// Lo que el saneamiento descartaría para un módulo, para mostrarlo como advertencia.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupingReport {
    pub dropped_keys: Vec<String>,
    pub dropped_subtotals: Vec<String>,
    pub dropped_group_by: Option<String>,
    /// `sort_by` que el módulo no conoce (sólo advertencia, no se descarta).
    pub unknown_sort_by: Option<String>,
}

impl GroupingReport {
    pub fn is_empty(&self) -> bool {
        self.dropped_keys.is_empty()
            && self.dropped_subtotals.is_empty()
            && self.dropped_group_by.is_none()
            && self.unknown_sort_by.is_none()
    }

    /// Mensaje legible con las etiquetas de las columnas descartadas.
    pub fn describe(&self, meta: Option<&ModuleMeta>) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let label = |key: &str| -> String {
            meta.map(|m| m.column_label(key).to_string())
                .unwrap_or_else(|| key.to_string())
        };
        let join = |keys: &[String]| -> String {
            keys.iter()
                .map(|key| label(key))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut parts = Vec::new();
        if !self.dropped_keys.is_empty() {
            parts.push(format!("Niveles de agrupamiento ignorados: {}", join(&self.dropped_keys)));
        }
        if !self.dropped_subtotals.is_empty() {
            parts.push(format!("Subtotales ignorados: {}", join(&self.dropped_subtotals)));
        }
        if let Some(group_by) = &self.dropped_group_by {
            parts.push(format!("Agrupar por ignorado: {}", label(group_by)));
        }
        if let Some(sort_by) = &self.unknown_sort_by {
            parts.push(format!("Orden desconocido para este módulo: {}", label(sort_by)));
        }
        Some(parts.join(". "))
    }
}

fn unique(keys: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter()
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// Calcula el reporte de agrupamiento de `config` frente al módulo `meta`.
pub fn grouping_report(config: &ExportConfig, meta: Option<&ModuleMeta>) -> GroupingReport {
    let groupable: &[GroupableColumn] = match meta {
        Some(meta) if meta.grouping_supported => &meta.groupable_columns,
        _ => &[],
    };
    let allowed = allowed_keys(groupable);
    let numeric = numeric_keys(groupable);

    let dropped_keys = unique(sanitize_grouping_keys(&config.grouping.keys, &allowed).invalid);
    let dropped_subtotals =
        unique(sanitize_grouping_keys(&config.grouping.subtotal_columns, &numeric).invalid);
    let dropped_group_by = config
        .content
        .group_by
        .clone()
        .filter(|key| !allowed.contains(key));

    let unknown_sort_by = match (meta, &config.content.sort_by) {
        (Some(meta), Some(sort_by)) => {
            let known = meta.columns.iter().any(|col| &col.key == sort_by)
                || allowed.contains(sort_by)
                || meta.sort_options.iter().any(|opt| opt == sort_by);
            (!known).then(|| sort_by.clone())
        }
        _ => None,
    };

    GroupingReport {
        dropped_keys,
        dropped_subtotals,
        dropped_group_by,
        unknown_sort_by,
    }
}

// --------------------------------------------------------------------------------
// Árbol de grupos
// --------------------------------------------------------------------------------

/// Valor de una fila para una columna de agrupamiento.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupValue {
    Null,
    Number(f64),
    Text(String),
}

impl From<&str> for GroupValue {
    fn from(value: &str) -> Self {
        GroupValue::Text(value.to_string())
    }
}

impl From<f64> for GroupValue {
    fn from(value: f64) -> Self {
        GroupValue::Number(value)
    }
}

impl From<i64> for GroupValue {
    fn from(value: i64) -> Self {
        GroupValue::Number(value as f64)
    }
}

impl<T: Into<GroupValue>> From<Option<T>> for GroupValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(GroupValue::Null)
    }
}

/// Orden de agrupamiento: nulos al final, números antes que texto,
/// texto sin distinguir mayúsculas.
pub fn compare_group_values(a: &GroupValue, b: &GroupValue) -> Ordering {
    match (a, b) {
        (GroupValue::Null, GroupValue::Null) => Ordering::Equal,
        (GroupValue::Null, _) => Ordering::Greater,
        (_, GroupValue::Null) => Ordering::Less,
        (GroupValue::Number(x), GroupValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (GroupValue::Number(_), GroupValue::Text(_)) => Ordering::Less,
        (GroupValue::Text(_), GroupValue::Number(_)) => Ordering::Greater,
        (GroupValue::Text(x), GroupValue::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
    }
}

#[derive(Debug, Clone)]
pub struct GroupNode<'a, R> {
    pub key: String,
    pub value: GroupValue,
    pub rows: Vec<&'a R>,
    pub children: Vec<GroupNode<'a, R>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub row_count: usize,
    pub child_count: usize,
    pub subtotals: IndexMap<String, f64>,
}

/// Ordena (estable) por todas las claves y agrupa filas consecutivas con el mismo valor.
pub fn build_group_tree<'a, R, F>(rows: &'a [R], keys: &[String], key_fn: F) -> Vec<GroupNode<'a, R>>
where
    F: Fn(&R, &str) -> GroupValue,
{
    if keys.is_empty() {
        return Vec::new();
    }
    let mut sorted: Vec<&'a R> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        keys.iter()
            .map(|key| compare_group_values(&key_fn(a, key), &key_fn(b, key)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    build_sorted(&sorted, keys, &key_fn)
}

fn build_sorted<'a, R, F>(rows: &[&'a R], keys: &[String], key_fn: &F) -> Vec<GroupNode<'a, R>>
where
    F: Fn(&R, &str) -> GroupValue,
{
    let key = &keys[0];
    let mut groups = Vec::new();
    let mut start = 0;
    while start < rows.len() {
        let value = key_fn(rows[start], key);
        let mut end = start + 1;
        while end < rows.len() && key_fn(rows[end], key) == value {
            end += 1;
        }
        let slice = &rows[start..end];
        let children = if keys.len() > 1 {
            build_sorted(slice, &keys[1..], key_fn)
        } else {
            Vec::new()
        };
        groups.push(GroupNode {
            key: key.clone(),
            value,
            rows: slice.to_vec(),
            children,
        });
        start = end;
    }
    groups
}

/// Recorrido en preorden (cada grupo antes que sus hijos).
pub fn flatten_groups<'g, 'a, R>(groups: &'g [GroupNode<'a, R>]) -> Vec<&'g GroupNode<'a, R>> {
    let mut flattened = Vec::new();
    for group in groups {
        flattened.push(group);
        flattened.extend(flatten_groups(&group.children));
    }
    flattened
}

pub fn compute_group_stats<R, F>(group: &GroupNode<'_, R>, subtotal_columns: &[String], value_fn: F) -> GroupStats
where
    F: Fn(&R, &str) -> Option<f64>,
{
    let mut subtotals: IndexMap<String, f64> = subtotal_columns
        .iter()
        .map(|key| (key.clone(), 0.0))
        .collect();
    for row in &group.rows {
        for (key, total) in subtotals.iter_mut() {
            if let Some(value) = value_fn(row, key) {
                *total += value;
            }
        }
    }
    GroupStats {
        row_count: group.rows.len(),
        child_count: group.children.len(),
        subtotals,
    }
}
