//! models/patch_model.rs
//! Configuración parcial (`Partial<ExportConfig>`): sólo las secciones/campos que una capa define.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::models::export_config_model::ExportConfig;

/// Capa parcial de configuración, guardada como objeto JSON por secciones.
///
/// Una sección presente como `null` se considera "no definida" al resolver,
/// pero se conserva tal cual hasta la normalización previa al guardado.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ConfigPatch(Map<String, Value>);

impl<'de> Deserialize<'de> for ConfigPatch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Option::<Map<String, Value>>::deserialize(deserializer)?;
        Ok(ConfigPatch(map.unwrap_or_default()))
    }
}

impl ConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye un parche desde un valor JSON. Cualquier cosa que no sea un
    /// objeto produce un parche vacío.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => ConfigPatch(map),
            Value::Null => ConfigPatch::default(),
            other => {
                log::warn!(
                    "(ConfigPatch::from_value) Se esperaba un objeto, se recibió {}; se usa parche vacío",
                    other
                );
                ConfigPatch::default()
            }
        }
    }

    /// Instantánea completa de una configuración (todas las secciones).
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::from_value(serde_json::to_value(config).unwrap_or_default())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn section(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Sección como objeto, ignorando secciones `null` o mal formadas.
    pub fn section_object(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0.get(name).and_then(Value::as_object)
    }

    pub fn set_section(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn remove_section(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn sections_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.0.iter_mut()
    }

    /// Secciones presentes como `null`.
    pub fn null_sections(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, value)| value.is_null())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Elimina las secciones `null` y devuelve cuántas había.
    pub fn strip_null_sections(&mut self) -> usize {
        let before = self.0.len();
        self.0.retain(|_, value| !value.is_null());
        before - self.0.len()
    }

    /// El parche sin valores `null` a ninguna profundidad, listo para fusionar.
    /// Un `null` es "no definido": nunca pisa el valor de la capa anterior.
    pub fn to_merge_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key.clone(), without_null_leaves(value)))
                .collect(),
        )
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn without_null_leaves(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, nested)| !nested.is_null())
                .map(|(key, nested)| (key.clone(), without_null_leaves(nested)))
                .collect(),
        ),
        other => other.clone(),
    }
}

impl From<Map<String, Value>> for ConfigPatch {
    fn from(map: Map<String, Value>) -> Self {
        ConfigPatch(map)
    }
}
