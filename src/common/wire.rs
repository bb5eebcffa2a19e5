// src/common/wire.rs

// Helpers para os payloads "soltos" da API do CRM: campos opcionais que às
// vezes chegam com o tipo errado não devem derrubar a resposta inteira.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Identificador opaco. O backend manda string ou número.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(RecordId(s)),
            Value::Number(n) => Ok(RecordId(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "id inválido: esperado string ou número, recebido {}",
                other
            ))),
        }
    }
}

/// Campo opcional tolerante: se o valor não decodifica como `T`, vira `None`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// String opcional tolerante: qualquer valor que não seja string vira `None`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Lista de strings tolerante: ignora itens que não são strings.
pub fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Trata `""` como ausente (o "falsy" do front antigo).
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        id: RecordId,
        #[serde(default, deserialize_with = "lenient_string")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient_string_list")]
        tags: Vec<String>,
    }

    #[test]
    fn numeric_ids_become_strings() {
        let p: Probe = serde_json::from_str(r#"{"id": 17}"#).unwrap();
        assert_eq!(p.id.as_str(), "17");
        assert!(p.name.is_none());
        assert!(p.tags.is_empty());
    }

    #[test]
    fn wrong_types_degrade_to_absent() {
        let p: Probe =
            serde_json::from_str(r#"{"id": "a1", "name": 5, "tags": ["vip", 3, null]}"#).unwrap();
        assert!(p.name.is_none());
        assert_eq!(p.tags, vec!["vip".to_string()]);
    }

    #[test]
    fn null_id_is_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"id": null}"#).is_err());
    }
}
