use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// One uplink reading as returned by the data storage query API.
///
/// Missing or `null` fields decode to their zero value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Measurement {
    #[serde(deserialize_with = "null_as_default")]
    pub device_id: String,

    #[serde(deserialize_with = "null_as_default")]
    pub event: String,

    #[serde(deserialize_with = "null_as_default")]
    pub battery: i64,

    #[serde(deserialize_with = "null_as_default")]
    pub light: i64,

    #[serde(deserialize_with = "null_as_default")]
    pub temperature: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub raw: String,

    #[serde(deserialize_with = "null_as_default")]
    pub time: DateTime<Utc>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a query response body.
///
/// A JSON `null` body or record is treated as empty. Field names match
/// case-insensitively.
pub fn decode_measurements(body: &[u8]) -> serde_json::Result<Vec<Measurement>> {
    let records: Option<Vec<Option<Map<String, Value>>>> = serde_json::from_slice(body)?;

    records
        .unwrap_or_default()
        .into_iter()
        .map(|record| {
            let fields: Map<String, Value> = record
                .unwrap_or_default()
                .into_iter()
                .map(|(name, value)| (name.to_lowercase(), value))
                .collect();

            Measurement::deserialize(Value::Object(fields))
        })
        .collect()
}
