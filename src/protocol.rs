use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::RegisterValue;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Parameters,
    Calculations,
    Visibilities,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Parameters => "parameters",
            Namespace::Calculations => "calculations",
            Namespace::Visibilities => "visibilities",
        }
    }

    fn from_prefix(s: &str) -> Option<Self> {
        match s {
            "parameters" => Some(Namespace::Parameters),
            "calculations" => Some(Namespace::Calculations),
            "visibilities" => Some(Namespace::Visibilities),
            _ => None,
        }
    }
}

/// A namespaced register key such as `parameters.ID_Ba_Hz_akt`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegisterKey {
    namespace: Namespace,
    name: String,
}

impl RegisterKey {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Bare register name, the form the device write path expects.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RegisterKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (prefix, name) = s
            .split_once('.')
            .ok_or_else(|| Error::InvalidRegisterKey(s.to_string()))?;
        let namespace =
            Namespace::from_prefix(prefix).ok_or_else(|| Error::InvalidRegisterKey(s.to_string()))?;
        if name.is_empty() {
            return Err(Error::InvalidRegisterKey(s.to_string()));
        }
        Ok(Self::new(namespace, name))
    }
}

impl TryFrom<String> for RegisterKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<RegisterKey> for String {
    fn from(key: RegisterKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for RegisterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace.as_str(), self.name)
    }
}

/// True when `source` names a controller register rather than an external sensor entity.
pub fn is_device_register(source: &str) -> bool {
    source
        .split_once('.')
        .is_some_and(|(prefix, _)| Namespace::from_prefix(prefix).is_some())
}

/// Well-known registers of the Luxtronik 2.x controller.
pub mod keys {
    use super::{Namespace, RegisterKey};

    fn parameter(name: &str) -> RegisterKey {
        RegisterKey::new(Namespace::Parameters, name)
    }

    fn calculation(name: &str) -> RegisterKey {
        RegisterKey::new(Namespace::Calculations, name)
    }

    pub fn status() -> RegisterKey {
        calculation("ID_WEB_WP_BZ_akt")
    }

    pub fn status1() -> RegisterKey {
        calculation("ID_WEB_HauptMenuStatus_Zeile1")
    }

    pub fn status3() -> RegisterKey {
        calculation("ID_WEB_HauptMenuStatus_Zeile3")
    }

    pub fn mode_heating() -> RegisterKey {
        parameter("ID_Ba_Hz_akt")
    }

    pub fn mode_domestic_water() -> RegisterKey {
        parameter("ID_Ba_Bw_akt")
    }

    pub fn mode_cooling() -> RegisterKey {
        parameter("ID_Einst_BA_Kuehl_akt")
    }

    pub fn heating_target_correction() -> RegisterKey {
        parameter("ID_Einst_WK_akt")
    }

    pub fn domestic_water_target_temperature() -> RegisterKey {
        parameter("ID_Soll_BWS_akt")
    }

    pub fn domestic_water_current_temperature() -> RegisterKey {
        calculation("ID_WEB_Temperatur_TBW")
    }

    pub fn outdoor_temperature() -> RegisterKey {
        calculation("ID_WEB_Temperatur_TA")
    }

    pub fn cooling_threshold() -> RegisterKey {
        parameter("ID_Einst_KuhlFreig_akt")
    }

    pub fn domestic_water_recirculation_pump() -> RegisterKey {
        calculation("ID_WEB_BUPout")
    }

    pub fn circulation_pump_heating() -> RegisterKey {
        calculation("ID_WEB_HUPout")
    }

    pub fn remote_maintenance() -> RegisterKey {
        parameter("ID_Einst_Fernwartung_akt")
    }

    pub fn efficiency_pump() -> RegisterKey {
        parameter("ID_Einst_Effizienzpumpe_akt")
    }

    pub fn pump_heat_control() -> RegisterKey {
        parameter("ID_Einst_P155_PumpHeatCtrl")
    }

    pub fn pump_optimization() -> RegisterKey {
        parameter("ID_Einst_Popt_akt")
    }

    pub fn heating_threshold() -> RegisterKey {
        parameter("ID_Einst_Heizgrenze")
    }
}

const STATUS1_WORKAROUND: &[&str] = &["heatpump running"];
const STATUS3_WORKAROUND: &[&str] = &["no request", "unknown", "none"];

/// Status line 1 values seen while the firmware reports a spurious `heating`.
pub(crate) fn in_status1_workaround(value: &RegisterValue) -> bool {
    value
        .as_str()
        .is_some_and(|s| STATUS1_WORKAROUND.contains(&s))
}

/// Status line 3 values meaning "no demand"; an unset line counts too.
pub(crate) fn in_status3_workaround(value: &RegisterValue) -> bool {
    match value {
        RegisterValue::Null => true,
        v => v.as_str().is_some_and(|s| STATUS3_WORKAROUND.contains(&s)),
    }
}

pub const DISCOVERY_PORTS: [u16; 2] = [4444, 47808];
pub const DISCOVERY_REQUEST: &str = "2000;111;1;\x00";
const DISCOVERY_REPLY_PREFIX: &str = "2500;111;";

/// Outcome of inspecting one datagram received during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryReply {
    /// Our own broadcast looped back.
    Echo,
    /// A controller answered; older firmware omits a usable port.
    Found(Option<u16>),
    /// Someone answered with the wrong magic.
    Foreign,
}

pub fn parse_discovery_datagram(payload: &str) -> DiscoveryReply {
    if payload == DISCOVERY_REQUEST {
        return DiscoveryReply::Echo;
    }
    if !payload.starts_with(DISCOVERY_REPLY_PREFIX) {
        return DiscoveryReply::Foreign;
    }
    let port = payload
        .split(';')
        .nth(2)
        .and_then(|field| field.trim().parse().ok());
    DiscoveryReply::Found(port)
}
