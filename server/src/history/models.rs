use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Body of `GET /history`. A missing or `null` list is an empty history.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryResponse {
    #[serde(deserialize_with = "null_as_empty")]
    pub requests: Vec<HistoryRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryRecord {
    #[serde(deserialize_with = "scalar_as_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "scalar_as_text")]
    pub timestamp: Option<String>,
    /// Shown as sent: `"1024"`, `512.0` and `-1` all survive.
    #[serde(deserialize_with = "scalar_as_text")]
    pub img_width: Option<String>,
    #[serde(deserialize_with = "scalar_as_text")]
    pub img_height: Option<String>,
    pub result: Truthiness,
}

impl HistoryRecord {
    /// Sort key: absent and empty timestamps compare as the empty string.
    pub fn sort_key(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }
}

/// Loose boolean: `null`, `false`, `0`, `""`, `[]` and `{}` are false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Truthiness(pub bool);

impl Truthiness {
    pub fn of(value: &Value) -> Self {
        Truthiness(match value {
            Value::Null => false,
            Value::Bool(flag) => *flag,
            Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
            Value::String(text) => !text.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(fields) => !fields.is_empty(),
        })
    }
}

impl<'de> Deserialize<'de> for Truthiness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Truthiness::of(&value))
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<HistoryRecord>, D::Error> {
    Ok(Option::<Vec<HistoryRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON value as display text; only `null` counts as absent.
fn scalar_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}
