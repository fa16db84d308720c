use tracing::{debug, error, info};

use crate::accessor::{DeviceAccessor, SensorStates, WriteOptions};
use crate::protocol::{RegisterKey, is_device_register, keys};
use crate::reconcile::{
    Readings, derive_action, device_mode_to_preset, operating_mode_for,
    preset_and_mode_to_device_mode,
};
use crate::setup::DeviceInfo;
use crate::types::*;
use crate::{Error, Result};

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;

/// Host states that mean "no reading yet" rather than a broken sensor.
const UNKNOWN_STATES: &[&str] = &["unknown", "unavailable", ""];

/// Where a circuit's current temperature comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemperatureSource {
    #[default]
    None,
    Register(RegisterKey),
    /// A host sensor entity id, e.g. `sensor.living_room_temperature`.
    External(String),
}

impl TemperatureSource {
    pub fn parse(source: Option<&str>) -> Result<Self> {
        match source {
            None => Ok(TemperatureSource::None),
            Some(s) if s.is_empty() => Ok(TemperatureSource::None),
            Some(s) if is_device_register(s) => Ok(TemperatureSource::Register(s.parse()?)),
            Some(s) => Ok(TemperatureSource::External(s.to_string())),
        }
    }
}

/// Parses a host sensor state into a finite temperature.
pub(crate) fn parse_temperature(state: &str) -> Result<f64> {
    match state.trim().parse::<f64>() {
        Ok(t) if t.is_finite() => Ok(t),
        _ => Err(Error::InvalidTemperature(state.to_string())),
    }
}

/// Everything the host shows for a circuit, taken from one read pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitState {
    pub action: OperatingAction,
    pub mode: OperatingMode,
    pub preset: Preset,
    pub current_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Default)]
struct Memory {
    last_mode: Option<DeviceMode>,
    last_action: Option<OperatingAction>,
    // Action seen on the last pass where the device was not off.
    action_before_off: Option<OperatingAction>,
    // Returned again while the device sits in a sticky mode.
    reported_mode: OperatingMode,
    preset: Preset,
    target_temperature: Option<f64>,
    external_temperature: Option<f64>,
}

pub struct CircuitBuilder {
    kind: CircuitKind,
    name: Option<String>,
    host_control: bool,
    current_source: TemperatureSource,
    target_key: Option<RegisterKey>,
    heat_statuses: Vec<DeviceStatus>,
    device_info: Option<DeviceInfo>,
    event_callbacks: Vec<EventCallback>,
}

impl CircuitBuilder {
    pub fn new(kind: CircuitKind) -> Self {
        let (current_source, target_key, heat_statuses) = match kind {
            CircuitKind::Heating => (
                TemperatureSource::None,
                keys::heating_target_correction(),
                vec![DeviceStatus::Heating],
            ),
            CircuitKind::DomesticWater => (
                TemperatureSource::Register(keys::domestic_water_current_temperature()),
                keys::domestic_water_target_temperature(),
                vec![DeviceStatus::DomesticWater],
            ),
            // Cooling status is matched as an action of its own, never as heating.
            CircuitKind::Cooling => (
                TemperatureSource::Register(keys::outdoor_temperature()),
                keys::cooling_threshold(),
                Vec::new(),
            ),
        };
        Self {
            kind,
            name: None,
            host_control: false,
            current_source,
            target_key: Some(target_key),
            heat_statuses,
            device_info: None,
            event_callbacks: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The host switches the device off while idle instead of the controller's own logic.
    pub fn host_control(mut self, enabled: bool) -> Self {
        self.host_control = enabled;
        self
    }

    pub fn current_temperature_source(mut self, source: TemperatureSource) -> Self {
        self.current_source = source;
        self
    }

    /// `None` makes the target temperature host-side only.
    pub fn target_register(mut self, key: Option<RegisterKey>) -> Self {
        self.target_key = key;
        self
    }

    pub fn heat_statuses(mut self, statuses: Vec<DeviceStatus>) -> Self {
        self.heat_statuses = statuses;
        self
    }

    pub fn device_info(mut self, info: DeviceInfo) -> Self {
        self.device_info = Some(info);
        self
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    pub fn build(self) -> Circuit {
        let (min_temp, max_temp, step) = match self.kind {
            CircuitKind::Heating => (-5.0, 5.0, 0.1),
            CircuitKind::DomesticWater => (40.0, 58.0, 1.0),
            CircuitKind::Cooling => (18.0, 30.0, 0.5),
        };
        let mode_key = match self.kind {
            CircuitKind::Heating => keys::mode_heating(),
            CircuitKind::DomesticWater => keys::mode_domestic_water(),
            CircuitKind::Cooling => keys::mode_cooling(),
        };
        Circuit {
            kind: self.kind,
            name: self.name.unwrap_or_else(|| self.kind.unique_id().to_string()),
            host_control: self.host_control,
            mode_key,
            target_key: self.target_key,
            current_source: self.current_source,
            heat_statuses: self.heat_statuses,
            min_temp,
            max_temp,
            step,
            device_info: self.device_info,
            memory: Memory::default(),
            event_callbacks: self.event_callbacks,
        }
    }
}

/// One controllable function of the heat pump, reconciled against the host's climate vocabulary.
///
/// Registers stay authoritative: every query reads them fresh through the accessor
/// passed in. The circuit only remembers what it last reported.
pub struct Circuit {
    kind: CircuitKind,
    name: String,
    host_control: bool,
    mode_key: RegisterKey,
    target_key: Option<RegisterKey>,
    current_source: TemperatureSource,
    heat_statuses: Vec<DeviceStatus>,
    min_temp: f64,
    max_temp: f64,
    step: f64,
    device_info: Option<DeviceInfo>,
    memory: Memory,
    event_callbacks: Vec<EventCallback>,
}

impl Circuit {
    pub fn builder(kind: CircuitKind) -> CircuitBuilder {
        CircuitBuilder::new(kind)
    }

    pub fn kind(&self) -> CircuitKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> &'static str {
        self.kind.unique_id()
    }

    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.device_info.as_ref()
    }

    pub fn mode_register(&self) -> &RegisterKey {
        &self.mode_key
    }

    pub fn target_register(&self) -> Option<&RegisterKey> {
        self.target_key.as_ref()
    }

    pub fn current_temperature_source(&self) -> &TemperatureSource {
        &self.current_source
    }

    // Advisory bounds; writes are not checked against them.
    pub fn min_temp(&self) -> f64 {
        self.min_temp
    }

    pub fn max_temp(&self) -> f64 {
        self.max_temp
    }

    pub fn target_temperature_step(&self) -> f64 {
        self.step
    }

    pub fn supported_presets(&self) -> &'static [Preset] {
        match self.kind {
            CircuitKind::Cooling => &[Preset::None],
            _ => &Preset::ALL,
        }
    }

    pub fn icon(&self, mode: OperatingMode) -> &'static str {
        match (self.kind, mode) {
            (CircuitKind::Heating, OperatingMode::Off) => "mdi:radiator-off",
            (CircuitKind::Heating, OperatingMode::Auto) => "mdi:radiator",
            (CircuitKind::DomesticWater, OperatingMode::Off) => "mdi:water-boiler-off",
            (CircuitKind::DomesticWater, OperatingMode::Auto) => "mdi:water-boiler-auto",
            (CircuitKind::Cooling, _) => "mdi:snowflake",
        }
    }

    pub fn last_mode(&self) -> Option<DeviceMode> {
        self.memory.last_mode
    }

    pub fn last_action(&self) -> Option<OperatingAction> {
        self.memory.last_action
    }

    pub fn readings<A: DeviceAccessor + ?Sized>(&self, accessor: &A) -> Result<Readings> {
        Readings::read(accessor, self.kind, &self.mode_key)
    }

    pub fn operating_action<A: DeviceAccessor + ?Sized>(
        &mut self,
        accessor: &A,
    ) -> Result<OperatingAction> {
        Ok(self.refresh(accessor)?.1)
    }

    pub fn operating_mode<A: DeviceAccessor + ?Sized>(
        &mut self,
        accessor: &A,
    ) -> Result<OperatingMode> {
        let (readings, _) = self.refresh(accessor)?;
        Ok(self.report_mode(readings.device_mode))
    }

    /// With host control, a device switched off while idle keeps reporting the
    /// preset the user picked until it leaves `Off`.
    pub fn preset<A: DeviceAccessor + ?Sized>(&mut self, accessor: &A) -> Result<Preset> {
        let (readings, _) = self.refresh(accessor)?;
        Ok(self.preset_for(readings.device_mode))
    }

    pub fn target_temperature<A: DeviceAccessor + ?Sized>(
        &self,
        accessor: &A,
    ) -> Result<Option<f64>> {
        match &self.target_key {
            Some(key) => read_optional_number(accessor, key),
            None => Ok(self.memory.target_temperature),
        }
    }

    /// Current temperature from the configured source. A malformed external
    /// reading is logged and shows up as unknown.
    pub fn current_temperature<A, S>(&mut self, accessor: &A, sensors: &S) -> Result<Option<f64>>
    where
        A: DeviceAccessor + ?Sized,
        S: SensorStates + ?Sized,
    {
        match &self.current_source {
            TemperatureSource::None => Ok(None),
            TemperatureSource::Register(key) => read_optional_number(accessor, key),
            TemperatureSource::External(entity_id) => {
                let state = sensors.state(entity_id);
                Ok(self.update_external_temperature(state.as_deref()))
            }
        }
    }

    /// Feed a host sensor state for an external temperature source.
    pub fn update_external_temperature(&mut self, state: Option<&str>) -> Option<f64> {
        self.memory.external_temperature = match state {
            None => None,
            Some(s) if UNKNOWN_STATES.contains(&s) => None,
            Some(s) => match parse_temperature(s) {
                Ok(t) => Some(t),
                Err(e) => {
                    error!(circuit = %self.kind, "unable to update from sensor: {e}");
                    None
                }
            },
        };
        self.memory.external_temperature
    }

    /// Full host-facing state from a single read pass.
    pub fn state<A, S>(&mut self, accessor: &A, sensors: &S) -> Result<CircuitState>
    where
        A: DeviceAccessor + ?Sized,
        S: SensorStates + ?Sized,
    {
        let (readings, action) = self.refresh(accessor)?;
        let mode = self.report_mode(readings.device_mode);
        let preset = self.preset_for(readings.device_mode);
        Ok(CircuitState {
            action,
            mode,
            preset,
            current_temperature: self.current_temperature(accessor, sensors)?,
            target_temperature: self.target_temperature(accessor)?,
            icon: self.icon(mode),
        })
    }

    /// Returns `false` without writing when the circuit is already in `mode`.
    pub fn set_operating_mode<A: DeviceAccessor + ?Sized>(
        &mut self,
        accessor: &mut A,
        mode: OperatingMode,
    ) -> Result<bool> {
        if self.operating_mode(&*accessor)? == mode {
            return Ok(false);
        }
        info!(circuit = %self.kind, mode = %mode, "set operating mode");
        let preset = self.preset(&*accessor)?;
        self.write_mode(accessor, preset_and_mode_to_device_mode(mode, preset))?;
        self.memory.reported_mode = mode;
        Ok(true)
    }

    pub fn set_preset<A: DeviceAccessor + ?Sized>(
        &mut self,
        accessor: &mut A,
        preset: Preset,
    ) -> Result<()> {
        if !self.supported_presets().contains(&preset) {
            return Err(Error::UnsupportedPreset {
                circuit: self.kind,
                preset,
            });
        }
        info!(circuit = %self.kind, preset = %preset, "set preset");
        self.memory.preset = preset;
        let mode = self.operating_mode(&*accessor)?;
        self.write_mode(accessor, preset_and_mode_to_device_mode(mode, preset))
    }

    /// Passed through to the target register unclamped. Returns whether the
    /// value went to the device.
    pub fn set_target_temperature<A: DeviceAccessor + ?Sized>(
        &mut self,
        accessor: &mut A,
        value: f64,
    ) -> Result<bool> {
        self.memory.target_temperature = Some(value);
        let Some(key) = &self.target_key else {
            return Ok(false);
        };
        info!(circuit = %self.kind, key = %key, value, "set target temperature");
        accessor.write(key, RegisterValue::Number(value), WriteOptions::immediate())?;
        self.emit(&Event::TargetWritten {
            circuit: self.kind,
            value,
        });
        Ok(true)
    }

    fn refresh<A: DeviceAccessor + ?Sized>(
        &mut self,
        accessor: &A,
    ) -> Result<(Readings, OperatingAction)> {
        let readings = self.readings(accessor)?;
        self.observe_mode(readings.device_mode);
        let action = derive_action(
            self.kind,
            &self.heat_statuses,
            &readings,
            self.memory.reported_mode,
        );
        self.record_action(action, &readings.status);
        if readings.device_mode != DeviceMode::Off {
            self.memory.action_before_off = Some(action);
        }
        Ok((readings, action))
    }

    fn report_mode(&mut self, device_mode: DeviceMode) -> OperatingMode {
        let mode = operating_mode_for(device_mode, self.memory.reported_mode);
        self.memory.reported_mode = mode;
        mode
    }

    fn preset_for(&self, device_mode: DeviceMode) -> Preset {
        device_mode_to_preset(
            device_mode,
            self.host_control,
            self.memory.action_before_off,
            self.memory.preset,
        )
    }

    fn observe_mode(&mut self, mode: DeviceMode) {
        if self.memory.last_mode != Some(mode) {
            debug!(
                circuit = %self.kind,
                from = ?self.memory.last_mode,
                to = %mode,
                "device mode changed"
            );
            self.memory.last_mode = Some(mode);
        }
    }

    fn record_action(&mut self, action: OperatingAction, status: &DeviceStatus) {
        let previous = self.memory.last_action;
        if previous == Some(action) {
            return;
        }
        self.memory.last_action = Some(action);
        info!(
            circuit = %self.kind,
            status = %status,
            from = ?previous,
            to = %action,
            "operating action changed"
        );
        self.emit(&Event::ActionChanged {
            circuit: self.kind,
            from: previous,
            to: action,
            status: status.clone(),
        });
    }

    fn write_mode<A: DeviceAccessor + ?Sized>(
        &mut self,
        accessor: &mut A,
        mode: DeviceMode,
    ) -> Result<()> {
        accessor.write(&self.mode_key, mode.into(), WriteOptions::immediate())?;
        self.memory.last_mode = Some(mode);
        self.emit(&Event::ModeWritten {
            circuit: self.kind,
            mode,
        });
        Ok(())
    }

    fn emit(&self, event: &Event) {
        for cb in &self.event_callbacks {
            cb(event);
        }
    }
}

/// Reads a numeric register; an unset register is an unknown value.
fn read_optional_number<A: DeviceAccessor + ?Sized>(
    accessor: &A,
    key: &RegisterKey,
) -> Result<Option<f64>> {
    let value = accessor.get_value(key)?;
    if value.is_null() {
        return Ok(None);
    }
    value.as_f64().map(Some).ok_or_else(|| Error::RegisterType {
        key: key.to_string(),
        expected: "number",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_source_from_config_string() {
        assert_eq!(TemperatureSource::parse(None).unwrap(), TemperatureSource::None);
        assert_eq!(
            TemperatureSource::parse(Some("calculations.ID_WEB_Temperatur_TA")).unwrap(),
            TemperatureSource::Register(keys::outdoor_temperature())
        );
        assert_eq!(
            TemperatureSource::parse(Some("sensor.room")).unwrap(),
            TemperatureSource::External("sensor.room".to_string())
        );
    }

    #[test]
    fn parse_temperature_rejects_non_finite() {
        assert_eq!(parse_temperature("21.5").unwrap(), 21.5);
        assert!(matches!(parse_temperature("nan"), Err(Error::InvalidTemperature(_))));
        assert!(parse_temperature("inf").is_err());
        assert!(parse_temperature("warm").is_err());
    }

    #[test]
    fn bounds_per_circuit() {
        let heating = Circuit::builder(CircuitKind::Heating).build();
        assert_eq!((heating.min_temp(), heating.max_temp()), (-5.0, 5.0));
        assert_eq!(heating.target_temperature_step(), 0.1);
        let water = Circuit::builder(CircuitKind::DomesticWater).build();
        assert_eq!((water.min_temp(), water.max_temp()), (40.0, 58.0));
        let cooling = Circuit::builder(CircuitKind::Cooling).build();
        assert_eq!(cooling.target_temperature_step(), 0.5);
        assert_eq!(cooling.supported_presets(), &[Preset::None]);
    }

    #[test]
    fn icons_follow_mode() {
        let heating = Circuit::builder(CircuitKind::Heating).build();
        assert_eq!(heating.icon(OperatingMode::Off), "mdi:radiator-off");
        assert_eq!(heating.icon(OperatingMode::Auto), "mdi:radiator");
        let water = Circuit::builder(CircuitKind::DomesticWater).build();
        assert_eq!(water.icon(OperatingMode::Off), "mdi:water-boiler-off");
        assert_eq!(water.icon(OperatingMode::Auto), "mdi:water-boiler-auto");
        let cooling = Circuit::builder(CircuitKind::Cooling).build();
        assert_eq!(cooling.icon(OperatingMode::Off), "mdi:snowflake");
    }

    #[test]
    fn unknown_sensor_state_is_not_an_error() {
        let mut heating = Circuit::builder(CircuitKind::Heating).build();
        assert_eq!(heating.update_external_temperature(Some("unknown")), None);
        assert_eq!(heating.update_external_temperature(Some("20.25")), Some(20.25));
        assert_eq!(heating.update_external_temperature(Some("NaN")), None);
    }
}
