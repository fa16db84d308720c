//! Translation between the controller's status/mode vocabulary and the host's
//! action/mode/preset vocabulary.
//!
//! Everything here is a pure function over a [`Readings`] snapshot; the
//! [`Circuit`](crate::Circuit) takes the snapshot and owns the remembered state.

use crate::accessor::DeviceAccessor;
use crate::protocol::{RegisterKey, in_status1_workaround, in_status3_workaround, keys};
use crate::types::*;
use crate::{Error, Result};

/// Registers read fresh for one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Readings {
    pub status: DeviceStatus,
    /// Status lines 1 and 3, only read while `status` is `heating`.
    pub status1: RegisterValue,
    pub status3: RegisterValue,
    pub device_mode: DeviceMode,
    /// Recirculation pump (domestic water) or circulation pump (heating), only read during defrost.
    pub pump_running: bool,
}

impl Readings {
    pub fn new(status: DeviceStatus, device_mode: DeviceMode) -> Self {
        Self {
            status,
            status1: RegisterValue::Null,
            status3: RegisterValue::Null,
            device_mode,
            pump_running: false,
        }
    }

    pub fn read<A: DeviceAccessor + ?Sized>(
        accessor: &A,
        kind: CircuitKind,
        mode_key: &RegisterKey,
    ) -> Result<Self> {
        let status = read_status(accessor)?;
        let device_mode = read_device_mode(accessor, mode_key)?;
        let mut readings = Self::new(status, device_mode);

        if readings.status == DeviceStatus::Heating {
            readings.status1 = accessor.get_value(&keys::status1())?;
            readings.status3 = accessor.get_value(&keys::status3())?;
        }
        if readings.status == DeviceStatus::Defrost
            && let Some(pump) = pump_register(kind)
        {
            readings.pump_running = accessor.get_bool(&pump)?;
        }
        Ok(readings)
    }
}

/// An unset status register reads as an unknown status, like any other code
/// the controller has no name for.
fn read_status<A: DeviceAccessor + ?Sized>(accessor: &A) -> Result<DeviceStatus> {
    let key = keys::status();
    match accessor.get_value(&key)? {
        RegisterValue::Null => Ok(DeviceStatus::Other(String::new())),
        RegisterValue::Text(raw) => Ok(DeviceStatus::from_device_str(&raw)),
        _ => Err(Error::RegisterType {
            key: key.to_string(),
            expected: "string",
        }),
    }
}

/// Reads and parses a circuit's mode register. Unknown values are fatal.
pub(crate) fn read_device_mode<A: DeviceAccessor + ?Sized>(
    accessor: &A,
    mode_key: &RegisterKey,
) -> Result<DeviceMode> {
    let raw = accessor.get_text(mode_key)?;
    DeviceMode::from_device_str(&raw).ok_or(Error::UnsupportedMode(raw))
}

fn pump_register(kind: CircuitKind) -> Option<RegisterKey> {
    match kind {
        CircuitKind::Heating => Some(keys::circulation_pump_heating()),
        CircuitKind::DomesticWater => Some(keys::domestic_water_recirculation_pump()),
        CircuitKind::Cooling => None,
    }
}

/// Defrost is reported for whichever circuit happens to be active; the pump
/// outputs tell which one is really driving it.
pub fn special_heating(kind: CircuitKind, readings: &Readings, reported: OperatingMode) -> bool {
    match kind {
        CircuitKind::Heating | CircuitKind::DomesticWater => {
            readings.status == DeviceStatus::Defrost
                && reported != OperatingMode::Off
                && readings.pump_running
        }
        CircuitKind::Cooling => false,
    }
}

pub fn is_heating_active(
    kind: CircuitKind,
    heat_statuses: &[DeviceStatus],
    readings: &Readings,
    reported: OperatingMode,
) -> bool {
    if readings.status == DeviceStatus::Heating {
        // Pump forerun: firmware says heating while line 3 says there is no request.
        if in_status1_workaround(&readings.status1) && in_status3_workaround(&readings.status3) {
            return false;
        }
        return heat_statuses.contains(&DeviceStatus::Heating);
    }

    let external = matches!(
        readings.status,
        DeviceStatus::SwimmingPoolSolar | DeviceStatus::HeatingExternalSource
    );
    if heat_statuses.contains(&readings.status) || (external && reported != OperatingMode::Off) {
        return true;
    }

    special_heating(kind, readings, reported)
}

/// `reported` is the operating mode the circuit last handed out.
pub fn derive_action(
    kind: CircuitKind,
    heat_statuses: &[DeviceStatus],
    readings: &Readings,
    reported: OperatingMode,
) -> OperatingAction {
    if is_heating_active(kind, heat_statuses, readings, reported) {
        OperatingAction::Heating
    } else if readings.status == DeviceStatus::Cooling {
        OperatingAction::Cooling
    } else if operating_mode_for(readings.device_mode, reported) == OperatingMode::Off {
        OperatingAction::Off
    } else {
        OperatingAction::Idle
    }
}

/// Sticky device modes keep whatever was reported before.
pub fn operating_mode_for(device_mode: DeviceMode, previous: OperatingMode) -> OperatingMode {
    match device_mode {
        m if m.is_sticky() => previous,
        DeviceMode::Off => OperatingMode::Off,
        _ => OperatingMode::Auto,
    }
}

/// With host-driven control the device is switched off while idle, so the
/// preset the user picked is kept instead of falling back to `none`.
/// `last_action` is the action seen before the device went off.
pub fn device_mode_to_preset(
    device_mode: DeviceMode,
    host_control: bool,
    last_action: Option<OperatingAction>,
    remembered: Preset,
) -> Preset {
    match device_mode {
        DeviceMode::Off if host_control && last_action == Some(OperatingAction::Idle) => remembered,
        DeviceMode::Off | DeviceMode::Automatic => Preset::None,
        DeviceMode::SecondHeatsource => Preset::SecondHeatsource,
        DeviceMode::Party => Preset::Boost,
        DeviceMode::Holidays => Preset::Away,
    }
}

pub fn preset_and_mode_to_device_mode(mode: OperatingMode, preset: Preset) -> DeviceMode {
    if mode == OperatingMode::Off {
        return DeviceMode::Off;
    }
    match preset {
        Preset::Away => DeviceMode::Holidays,
        Preset::Boost => DeviceMode::Party,
        Preset::SecondHeatsource => DeviceMode::SecondHeatsource,
        Preset::None => DeviceMode::Automatic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::RegisterMap;

    const HEATING_SET: &[DeviceStatus] = &[DeviceStatus::Heating];

    fn heating(status1: &str, status3: &str) -> Readings {
        Readings {
            status1: status1.into(),
            status3: status3.into(),
            ..Readings::new(DeviceStatus::Heating, DeviceMode::Automatic)
        }
    }

    #[test]
    fn pump_forerun_is_not_heating() {
        let r = heating("heatpump running", "no request");
        for kind in [CircuitKind::Heating, CircuitKind::DomesticWater, CircuitKind::Cooling] {
            assert!(!is_heating_active(kind, HEATING_SET, &r, OperatingMode::Auto));
        }
    }

    #[test]
    fn real_heating_demand() {
        let r = heating("heatpump running", "heating");
        assert!(is_heating_active(CircuitKind::Heating, HEATING_SET, &r, OperatingMode::Auto));
        assert_eq!(
            derive_action(CircuitKind::Heating, HEATING_SET, &r, OperatingMode::Auto),
            OperatingAction::Heating
        );
    }

    #[test]
    fn heating_status_ignored_outside_heat_set() {
        let r = heating("heatpump running", "heating");
        let water = &[DeviceStatus::DomesticWater];
        assert!(!is_heating_active(CircuitKind::DomesticWater, water, &r, OperatingMode::Auto));
    }

    #[test]
    fn external_sources_heat_unless_off() {
        let r = Readings::new(DeviceStatus::SwimmingPoolSolar, DeviceMode::Automatic);
        assert!(is_heating_active(CircuitKind::Cooling, &[], &r, OperatingMode::Auto));
        assert!(!is_heating_active(CircuitKind::Cooling, &[], &r, OperatingMode::Off));

        let r = Readings::new(DeviceStatus::HeatingExternalSource, DeviceMode::Off);
        assert!(is_heating_active(CircuitKind::Heating, HEATING_SET, &r, OperatingMode::Auto));
    }

    #[test]
    fn defrost_needs_pump_and_mode() {
        let mut r = Readings::new(DeviceStatus::Defrost, DeviceMode::Automatic);
        assert!(!special_heating(CircuitKind::DomesticWater, &r, OperatingMode::Auto));
        r.pump_running = true;
        assert!(special_heating(CircuitKind::DomesticWater, &r, OperatingMode::Auto));
        assert!(special_heating(CircuitKind::Heating, &r, OperatingMode::Auto));
        assert!(!special_heating(CircuitKind::Heating, &r, OperatingMode::Off));
        assert!(!special_heating(CircuitKind::Cooling, &r, OperatingMode::Auto));
    }

    #[test]
    fn cooling_status_wins_over_mode() {
        for mode in DeviceMode::ALL {
            let r = Readings::new(DeviceStatus::Cooling, mode);
            assert_eq!(
                derive_action(CircuitKind::Cooling, &[], &r, OperatingMode::Off),
                OperatingAction::Cooling
            );
        }
    }

    #[test]
    fn idle_versus_off() {
        let other = DeviceStatus::Other("no request".to_string());
        let r = Readings::new(other.clone(), DeviceMode::Off);
        assert_eq!(
            derive_action(CircuitKind::Heating, HEATING_SET, &r, OperatingMode::Auto),
            OperatingAction::Off
        );
        let r = Readings::new(other.clone(), DeviceMode::Automatic);
        assert_eq!(
            derive_action(CircuitKind::Heating, HEATING_SET, &r, OperatingMode::Off),
            OperatingAction::Idle
        );
        let r = Readings::new(other, DeviceMode::Party);
        assert_eq!(
            derive_action(CircuitKind::Heating, HEATING_SET, &r, OperatingMode::Off),
            OperatingAction::Off
        );
    }

    #[test]
    fn unset_status_reads_as_unknown() {
        let regs = RegisterMap::new()
            .with(keys::status(), RegisterValue::Null)
            .with(keys::mode_heating(), "Automatic");
        let r = Readings::read(&regs, CircuitKind::Heating, &keys::mode_heating()).unwrap();
        assert_eq!(r.status, DeviceStatus::Other(String::new()));
        assert_eq!(
            derive_action(CircuitKind::Heating, HEATING_SET, &r, OperatingMode::Auto),
            OperatingAction::Idle
        );

        let regs = regs.with(keys::status(), 3.0);
        let err = Readings::read(&regs, CircuitKind::Heating, &keys::mode_heating()).unwrap_err();
        assert!(matches!(err, Error::RegisterType { expected: "string", .. }));
    }

    #[test]
    fn sticky_modes_keep_previous() {
        for mode in [DeviceMode::Holidays, DeviceMode::Party, DeviceMode::SecondHeatsource] {
            assert_eq!(operating_mode_for(mode, OperatingMode::Off), OperatingMode::Off);
            assert_eq!(operating_mode_for(mode, OperatingMode::Auto), OperatingMode::Auto);
        }
        for previous in [OperatingMode::Auto, OperatingMode::Off] {
            assert_eq!(operating_mode_for(DeviceMode::Off, previous), OperatingMode::Off);
            assert_eq!(operating_mode_for(DeviceMode::Automatic, previous), OperatingMode::Auto);
        }
    }

    #[test]
    fn preset_table() {
        let p = |m| device_mode_to_preset(m, false, None, Preset::Away);
        assert_eq!(p(DeviceMode::Off), Preset::None);
        assert_eq!(p(DeviceMode::Automatic), Preset::None);
        assert_eq!(p(DeviceMode::SecondHeatsource), Preset::SecondHeatsource);
        assert_eq!(p(DeviceMode::Party), Preset::Boost);
        assert_eq!(p(DeviceMode::Holidays), Preset::Away);
    }

    #[test]
    fn idle_fallback_keeps_remembered_preset() {
        let idle = Some(OperatingAction::Idle);
        let heating = Some(OperatingAction::Heating);
        let off = DeviceMode::Off;
        assert_eq!(device_mode_to_preset(off, true, idle, Preset::Boost), Preset::Boost);
        assert_eq!(device_mode_to_preset(off, false, idle, Preset::Boost), Preset::None);
        assert_eq!(device_mode_to_preset(off, true, heating, Preset::Boost), Preset::None);
    }

    #[test]
    fn reverse_mapping_priority() {
        let auto = |p| preset_and_mode_to_device_mode(OperatingMode::Auto, p);
        let off = preset_and_mode_to_device_mode(OperatingMode::Off, Preset::Away);
        assert_eq!(off, DeviceMode::Off);
        assert_eq!(auto(Preset::Away), DeviceMode::Holidays);
        assert_eq!(auto(Preset::Boost), DeviceMode::Party);
        assert_eq!(auto(Preset::SecondHeatsource), DeviceMode::SecondHeatsource);
        assert_eq!(auto(Preset::None), DeviceMode::Automatic);
    }

    #[test]
    fn mode_preset_round_trip() {
        // Sticky modes round-trip as long as the remembered mode is not off.
        for m in DeviceMode::ALL {
            let mode = operating_mode_for(m, OperatingMode::Auto);
            let preset = device_mode_to_preset(m, false, None, Preset::None);
            assert_eq!(preset_and_mode_to_device_mode(mode, preset), m, "{m}");
        }
    }
}
