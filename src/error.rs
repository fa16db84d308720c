use std::fmt;

use crate::types::{CircuitKind, Preset};

#[derive(Debug)]
pub enum Error {
    UnsupportedMode(String),
    UnsupportedPreset { circuit: CircuitKind, preset: Preset },
    MissingRegister(String),
    RegisterType { key: String, expected: &'static str },
    InvalidRegisterKey(String),
    InvalidTemperature(String),
    Accessor(Box<dyn std::error::Error + Send + Sync>),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedMode(mode) => write!(f, "unsupported mode: {mode}"),
            Error::UnsupportedPreset { circuit, preset } => {
                write!(f, "preset {preset} not supported by {circuit} circuit")
            }
            Error::MissingRegister(key) => write!(f, "missing register: {key}"),
            Error::RegisterType { key, expected } => {
                write!(f, "register {key} is not a {expected}")
            }
            Error::InvalidRegisterKey(key) => write!(f, "invalid register key: {key}"),
            Error::InvalidTemperature(state) => write!(f, "sensor has illegal state {state}"),
            Error::Accessor(e) => write!(f, "accessor error: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Accessor(e) => Some(e.as_ref()),
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
