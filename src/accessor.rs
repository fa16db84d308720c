use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::protocol::RegisterKey;
use crate::types::RegisterValue;
use crate::{Error, Result};

/// How a write is handed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub use_debounce: bool,
    pub update_immediately_after_write: bool,
}

impl WriteOptions {
    /// Skip the debounce window and re-read the registers right after writing.
    pub fn immediate() -> Self {
        Self {
            use_debounce: false,
            update_immediately_after_write: true,
        }
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            use_debounce: true,
            update_immediately_after_write: false,
        }
    }
}

/// Register read/write access to a connected controller.
///
/// Connection handling, polling and retries live behind this trait; failures are
/// reported as [`Error::Accessor`] and passed through unchanged.
pub trait DeviceAccessor {
    fn get_value(&self, key: &RegisterKey) -> Result<RegisterValue>;

    fn write(
        &mut self,
        key: &RegisterKey,
        value: RegisterValue,
        options: WriteOptions,
    ) -> Result<()>;

    fn get_text(&self, key: &RegisterKey) -> Result<String> {
        match self.get_value(key)? {
            RegisterValue::Text(s) => Ok(s),
            _ => Err(Error::RegisterType {
                key: key.to_string(),
                expected: "string",
            }),
        }
    }

    fn get_number(&self, key: &RegisterKey) -> Result<f64> {
        self.get_value(key)?.as_f64().ok_or_else(|| Error::RegisterType {
            key: key.to_string(),
            expected: "number",
        })
    }

    /// Binary outputs; an unset register reads as off.
    fn get_bool(&self, key: &RegisterKey) -> Result<bool> {
        let value = self.get_value(key)?;
        if value.is_null() {
            return Ok(false);
        }
        value.as_bool().ok_or_else(|| Error::RegisterType {
            key: key.to_string(),
            expected: "bool",
        })
    }
}

/// Register table held in memory. Writes land in the table immediately and are
/// also recorded so callers can inspect what was sent.
#[derive(Debug, Clone, Default)]
pub struct RegisterMap {
    values: BTreeMap<RegisterKey, RegisterValue>,
    writes: Vec<(RegisterKey, RegisterValue, WriteOptions)>,
}

impl RegisterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a flat `{"namespace.name": value}` JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        let values: BTreeMap<RegisterKey, RegisterValue> = serde_json::from_str(json)?;
        Ok(Self {
            values,
            writes: Vec::new(),
        })
    }

    pub fn with(mut self, key: RegisterKey, value: impl Into<RegisterValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: RegisterKey, value: impl Into<RegisterValue>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: &RegisterKey) -> Option<&RegisterValue> {
        self.values.get(key)
    }

    pub fn writes(&self) -> &[(RegisterKey, RegisterValue, WriteOptions)] {
        &self.writes
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegisterKey, &RegisterValue)> {
        self.values.iter()
    }
}

impl DeviceAccessor for RegisterMap {
    fn get_value(&self, key: &RegisterKey) -> Result<RegisterValue> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| Error::MissingRegister(key.to_string()))
    }

    fn write(
        &mut self,
        key: &RegisterKey,
        value: RegisterValue,
        options: WriteOptions,
    ) -> Result<()> {
        trace!(key = %key, value = %value, "register write");
        self.values.insert(key.clone(), value.clone());
        self.writes.push((key.clone(), value, options));
        Ok(())
    }
}

/// Host-side sensor states, looked up by entity id.
pub trait SensorStates {
    fn state(&self, entity_id: &str) -> Option<String>;
}

impl SensorStates for HashMap<String, String> {
    fn state(&self, entity_id: &str) -> Option<String> {
        self.get(entity_id).cloned()
    }
}

impl SensorStates for BTreeMap<String, String> {
    fn state(&self, entity_id: &str) -> Option<String> {
        self.get(entity_id).cloned()
    }
}
