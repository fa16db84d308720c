use serde_json::{Map, Value, json};

use crate::config::EntryConfig;
use crate::types::RegisterValue;
use crate::Result;

pub const REDACTED: &str = "**REDACTED**";
const TO_REDACT: &[&str] = &["username", "password"];

/// One numbered register as listed by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterEntry {
    pub index: u16,
    pub name: String,
    pub value: RegisterValue,
}

impl RegisterEntry {
    pub fn new(index: u16, name: impl Into<String>, value: impl Into<RegisterValue>) -> Self {
        Self {
            index,
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Register tables keyed by padded `"index name"` so dumps line up when printed.
pub fn dump_registers(entries: &[RegisterEntry]) -> Map<String, Value> {
    entries
        .iter()
        .map(|e| {
            (
                format!("{:<4} {:<60}", e.index, e.name),
                Value::String(e.value.to_string()),
            )
        })
        .collect()
}

/// Replaces credential fields anywhere in `value`.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    if TO_REDACT.contains(&k.as_str()) {
                        (k.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (k.clone(), redact(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

/// Keeps the vendor part of a MAC address.
pub fn mask_mac(mac: &str) -> String {
    let mut masked: String = mac.chars().take(9).collect();
    masked.push('*');
    masked
}

pub fn config_entry_diagnostics(
    entry: &EntryConfig,
    mac: Option<&str>,
    parameters: &[RegisterEntry],
    calculations: &[RegisterEntry],
    visibilities: &[RegisterEntry],
) -> Result<Value> {
    let mut entry_data = redact(&serde_json::to_value(entry)?);
    let mac = mac.map(mask_mac).unwrap_or_default();
    if let Some(obj) = entry_data.as_object_mut() {
        let data = obj.entry("data").or_insert_with(|| Value::Object(Map::new()));
        if let Some(data) = data.as_object_mut() {
            data.insert("mac".to_string(), Value::String(mac));
        }
    }

    Ok(json!({
        "entry": entry_data,
        "parameters": dump_registers(parameters),
        "calculations": dump_registers(calculations),
        "visibilities": dump_registers(visibilities),
    }))
}
