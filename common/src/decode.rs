use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{SensorSnapshot, NO_TRANSITION};

const KEY_TEMPERATURE: &str = "temperature";
const KEYS_HUMIDITY: [&str; 2] = ["humidite", "humidity"];
const KEY_CO2: &str = "co2";

const KEYS_HUMIDIFIER: [&str; 2] = ["humidificateur_actif", "humidifier_actif"];
const KEYS_VENTILATION: [&str; 1] = ["ventilation_actif"];
const KEYS_LEDS: [&str; 1] = ["leds_actif"];

const KEY_TRANSITION: &str = "transition";
const KEY_TRANSITION_TIMESTAMP: &str = "timestamp";
const KEY_TRANSITION_TYPE: &str = "type";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing or invalid required field: {0}")]
    MissingField(&'static str),
    #[error("invalid optional field: {0}")]
    InvalidField(&'static str),
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl DecodeError {
    /// Name of the offending field, if the failure is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(name) | Self::InvalidField(name) => Some(name),
            Self::NotAnObject | Self::Malformed(_) => None,
        }
    }
}

/// Parses a raw `/status` body and decodes it.
pub fn decode_snapshot_bytes(raw: &[u8]) -> Result<SensorSnapshot, DecodeError> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|err| DecodeError::Malformed(err.to_string()))?;
    match value {
        Value::Object(map) => decode_snapshot(&map),
        _ => Err(DecodeError::NotAnObject),
    }
}

pub fn decode_snapshot(payload: &Map<String, Value>) -> Result<SensorSnapshot, DecodeError> {
    let temperature = required_f64(payload, &[KEY_TEMPERATURE], "temperature")?;
    let humidity = required_f64(payload, &KEYS_HUMIDITY, "humidity")?;
    let co2 = required_i64(payload, KEY_CO2)?;

    let humidifier_active = optional_flag(payload, &KEYS_HUMIDIFIER)?;
    let ventilation_active = optional_flag(payload, &KEYS_VENTILATION)?;
    let leds_active = optional_flag(payload, &KEYS_LEDS)?;

    let transition = payload.get(KEY_TRANSITION).and_then(Value::as_object);
    let timestamp = transition
        .and_then(|record| record.get(KEY_TRANSITION_TIMESTAMP))
        .and_then(Value::as_str)
        .unwrap_or(NO_TRANSITION)
        .to_string();
    let transition_kind = transition
        .and_then(|record| record.get(KEY_TRANSITION_TYPE))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(SensorSnapshot {
        temperature,
        humidity,
        co2,
        humidifier_active,
        ventilation_active,
        leds_active,
        timestamp,
        transition_kind,
    })
}

/// First key of `keys` present in the payload. Later aliases are not
/// consulted once an earlier key is present, even if its value is invalid.
fn first_present<'a>(
    payload: &'a Map<String, Value>,
    keys: &[&'static str],
) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|key| payload.get(*key).map(|value| (*key, value)))
}

fn required_f64(
    payload: &Map<String, Value>,
    keys: &[&'static str],
    field: &'static str,
) -> Result<f64, DecodeError> {
    first_present(payload, keys)
        .and_then(|(_, value)| value.as_f64())
        .ok_or(DecodeError::MissingField(field))
}

fn required_i64(payload: &Map<String, Value>, key: &'static str) -> Result<i64, DecodeError> {
    let value = payload.get(key).ok_or(DecodeError::MissingField(key))?;
    if let Some(integer) = value.as_i64() {
        return Ok(integer);
    }
    // Fractional readings are truncated toward zero.
    match value.as_f64() {
        Some(float) if float.is_finite() && (i64::MIN as f64..=i64::MAX as f64).contains(&float) => {
            Ok(float.trunc() as i64)
        }
        _ => Err(DecodeError::MissingField(key)),
    }
}

fn optional_flag(payload: &Map<String, Value>, keys: &[&'static str]) -> Result<bool, DecodeError> {
    match first_present(payload, keys) {
        None | Some((_, Value::Null)) => Ok(false),
        Some((_, Value::Bool(active))) => Ok(*active),
        Some((key, _)) => Err(DecodeError::InvalidField(key)),
    }
}
