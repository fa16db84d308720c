use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating mode as the heat pump itself names it, one per circuit mode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceMode {
    Off,
    Automatic,
    SecondHeatsource,
    Party,
    Holidays,
}

impl DeviceMode {
    pub const ALL: [DeviceMode; 5] = [
        DeviceMode::Off,
        DeviceMode::Automatic,
        DeviceMode::SecondHeatsource,
        DeviceMode::Party,
        DeviceMode::Holidays,
    ];

    /// The value written back to the mode register.
    pub fn as_device_str(&self) -> &'static str {
        match self {
            DeviceMode::Off => "Off",
            DeviceMode::Automatic => "Automatic",
            DeviceMode::SecondHeatsource => "Second heatsource",
            DeviceMode::Party => "Party",
            DeviceMode::Holidays => "Holidays",
        }
    }

    /// Parses a mode register value. Case and spaces vs underscores are ignored.
    pub fn from_device_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(' ', "_").as_str() {
            "off" => Some(DeviceMode::Off),
            "automatic" => Some(DeviceMode::Automatic),
            "second_heatsource" => Some(DeviceMode::SecondHeatsource),
            "party" => Some(DeviceMode::Party),
            "holidays" => Some(DeviceMode::Holidays),
            _ => None,
        }
    }

    /// Sub-modes that say nothing about whether the circuit is on or off.
    pub fn is_sticky(&self) -> bool {
        matches!(
            self,
            DeviceMode::Holidays | DeviceMode::Party | DeviceMode::SecondHeatsource
        )
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_device_str())
    }
}

/// Main operating status reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
    Heating,
    DomesticWater,
    Cooling,
    Defrost,
    SwimmingPoolSolar,
    HeatingExternalSource,
    /// Anything else the firmware reports (`evu`, `no request`, ...).
    Other(String),
}

impl DeviceStatus {
    pub fn from_device_str(s: &str) -> Self {
        match s {
            "heating" => DeviceStatus::Heating,
            "hot water" => DeviceStatus::DomesticWater,
            "cooling" => DeviceStatus::Cooling,
            "defrost" => DeviceStatus::Defrost,
            "swimming pool/solar" => DeviceStatus::SwimmingPoolSolar,
            "heating external source" => DeviceStatus::HeatingExternalSource,
            other => DeviceStatus::Other(other.to_string()),
        }
    }

    pub fn as_device_str(&self) -> &str {
        match self {
            DeviceStatus::Heating => "heating",
            DeviceStatus::DomesticWater => "hot water",
            DeviceStatus::Cooling => "cooling",
            DeviceStatus::Defrost => "defrost",
            DeviceStatus::SwimmingPoolSolar => "swimming pool/solar",
            DeviceStatus::HeatingExternalSource => "heating external source",
            DeviceStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_device_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingAction {
    Heating,
    Cooling,
    Idle,
    Off,
}

impl OperatingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingAction::Heating => "heating",
            OperatingAction::Cooling => "cooling",
            OperatingAction::Idle => "idle",
            OperatingAction::Off => "off",
        }
    }
}

impl fmt::Display for OperatingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperatingMode {
    #[default]
    Auto,
    Off,
}

impl OperatingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingMode::Auto => "auto",
            OperatingMode::Off => "off",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    #[default]
    None,
    Away,
    Boost,
    SecondHeatsource,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::None,
        Preset::SecondHeatsource,
        Preset::Boost,
        Preset::Away,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::None => "none",
            Preset::Away => "away",
            Preset::Boost => "boost",
            Preset::SecondHeatsource => "second_heatsource",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Preset::None),
            "away" => Some(Preset::Away),
            "boost" => Some(Preset::Boost),
            "second_heatsource" => Some(Preset::SecondHeatsource),
            _ => None,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A register value as the controller library hands it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RegisterValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RegisterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RegisterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RegisterValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Booleans, plus the 0/1 encoding some firmware uses for pump outputs.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RegisterValue::Bool(b) => Some(*b),
            RegisterValue::Number(n) if *n == 0.0 => Some(false),
            RegisterValue::Number(n) if *n == 1.0 => Some(true),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RegisterValue::Null)
    }
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterValue::Null => f.write_str("None"),
            RegisterValue::Bool(b) => write!(f, "{b}"),
            RegisterValue::Number(n) => write!(f, "{n}"),
            RegisterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RegisterValue {
    fn from(s: &str) -> Self {
        RegisterValue::Text(s.to_string())
    }
}

impl From<String> for RegisterValue {
    fn from(s: String) -> Self {
        RegisterValue::Text(s)
    }
}

impl From<f64> for RegisterValue {
    fn from(n: f64) -> Self {
        RegisterValue::Number(n)
    }
}

impl From<bool> for RegisterValue {
    fn from(b: bool) -> Self {
        RegisterValue::Bool(b)
    }
}

impl From<DeviceMode> for RegisterValue {
    fn from(mode: DeviceMode) -> Self {
        RegisterValue::Text(mode.as_device_str().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitKind {
    Heating,
    DomesticWater,
    Cooling,
}

impl CircuitKind {
    pub fn unique_id(&self) -> &'static str {
        match self {
            CircuitKind::Heating => "heating",
            CircuitKind::DomesticWater => "domestic_water",
            CircuitKind::Cooling => "cooling",
        }
    }
}

impl fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.unique_id())
    }
}

/// Events emitted by a circuit when its derived state changes or it writes to the device.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ActionChanged {
        circuit: CircuitKind,
        from: Option<OperatingAction>,
        to: OperatingAction,
        status: DeviceStatus,
    },
    ModeWritten { circuit: CircuitKind, mode: DeviceMode },
    TargetWritten { circuit: CircuitKind, value: f64 },
}
