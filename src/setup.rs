use tracing::{debug, info};

use crate::circuit::{Circuit, TemperatureSource};
use crate::config::EntryConfig;
use crate::protocol::keys;
use crate::switch::{EntityCategory, Switch};
use crate::types::CircuitKind;
use crate::Result;

const MODELS_ALPHA_INNOTEC: &[&str] = &["LWP", "LWV", "MSW", "SWC", "SWP"];
const MODELS_NOVELAN: &[&str] = &["BW", "LA", "LD", "LI", "SI", "ZLW"];
const MODELS_OTHER: &[&str] = &["CB", "CI", "CN", "CS"];

fn has_prefix(model: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| model.starts_with(p))
}

pub fn manufacturer_by_model(model: Option<&str>) -> Option<&'static str> {
    let model = model?;
    if has_prefix(model, MODELS_NOVELAN) {
        Some("Novelan")
    } else if has_prefix(model, MODELS_ALPHA_INNOTEC) {
        Some("Alpha Innotec")
    } else {
        None
    }
}

/// Firmware download page, laid out per manufacturer.
pub fn firmware_url_by_model(model: Option<&str>) -> String {
    let layout = match model {
        Some(m) if has_prefix(m, MODELS_ALPHA_INNOTEC) => 1,
        Some(m) if has_prefix(m, MODELS_NOVELAN) => 2,
        Some(m) if has_prefix(m, MODELS_OTHER) => 3,
        _ => 0,
    };
    format!("https://www.heatpump24.com/DownloadArea.php?layout={layout}")
}

/// Device registry entry an entity is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub firmware_url: String,
}

impl DeviceInfo {
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        model: Option<&str>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            manufacturer: manufacturer_by_model(model).map(str::to_string),
            model: model.map(str::to_string),
            firmware_url: firmware_url_by_model(model),
        }
    }
}

/// Devices the controller exposes. A circuit without a device gets no entities.
#[derive(Debug, Clone)]
pub struct DeviceInfos {
    pub main: DeviceInfo,
    pub heating: Option<DeviceInfo>,
    pub domestic_water: Option<DeviceInfo>,
    pub cooling: Option<DeviceInfo>,
}

pub struct Entities {
    pub circuits: Vec<Circuit>,
    pub switches: Vec<Switch>,
}

impl Entities {
    pub fn circuit(&self, kind: CircuitKind) -> Option<&Circuit> {
        self.circuits.iter().find(|c| c.kind() == kind)
    }

    pub fn circuit_mut(&mut self, kind: CircuitKind) -> Option<&mut Circuit> {
        self.circuits.iter_mut().find(|c| c.kind() == kind)
    }

    pub fn switch(&self, unique_id: &str) -> Option<&Switch> {
        self.switches.iter().find(|s| s.unique_id() == unique_id)
    }
}

/// Builds the climate circuits and switches for one configured controller.
pub fn setup_entry(entry: &EntryConfig, devices: &DeviceInfos) -> Result<Entities> {
    let settings = entry.effective();
    info!(host = %settings.host, port = settings.port, "setting up entities");

    let mut circuits = Vec::new();
    let mut switches = vec![
        Switch::new(
            keys::remote_maintenance(),
            "remote_maintenance",
            "Remote maintenance",
            "mdi:remote-desktop",
            devices.main.clone(),
        )
        .category(EntityCategory::Config),
        Switch::new(
            keys::efficiency_pump(),
            "efficiency_pump",
            "Efficiency pump",
            "mdi:leaf-circle",
            devices.main.clone(),
        )
        .category(EntityCategory::Config),
        Switch::new(
            keys::pump_heat_control(),
            "pump_heat_control",
            "Pump heat control",
            "mdi:pump",
            devices.main.clone(),
        )
        .category(EntityCategory::Config)
        .disabled_by_default(),
    ];

    match &devices.heating {
        Some(info) => {
            let indoor = Some(settings.ha_sensor_indoor_temperature.as_str());
            circuits.push(
                Circuit::builder(CircuitKind::Heating)
                    .name("Heating")
                    .host_control(settings.control_mode_home_assistant)
                    .current_temperature_source(TemperatureSource::parse(indoor)?)
                    .device_info(info.clone())
                    .build(),
            );
            switches.extend([
                Switch::new(
                    keys::pump_optimization(),
                    "pump_optimization",
                    "Pump optimization",
                    "mdi:tune",
                    info.clone(),
                )
                .category(EntityCategory::Config),
                Switch::new(
                    keys::mode_heating(),
                    "heating",
                    "Heating mode auto",
                    "mdi:radiator",
                    info.clone(),
                )
                .mode()
                .icon_off("mdi:radiator-off"),
                Switch::new(
                    keys::heating_threshold(),
                    "heating_threshold",
                    "Heating threshold",
                    "mdi:download-outline",
                    info.clone(),
                )
                .category(EntityCategory::Config),
            ]);
        }
        None => debug!("no heating device, skipping heating entities"),
    }

    match &devices.domestic_water {
        Some(info) => {
            circuits.push(
                Circuit::builder(CircuitKind::DomesticWater)
                    .name("Domestic water")
                    .host_control(settings.control_mode_home_assistant)
                    .device_info(info.clone())
                    .build(),
            );
            switches.push(
                Switch::new(
                    keys::mode_domestic_water(),
                    "domestic_water",
                    "Domestic water mode auto",
                    "mdi:water-boiler-auto",
                    info.clone(),
                )
                .mode()
                .icon_off("mdi:water-boiler-off"),
            );
        }
        None => debug!("no domestic water device, skipping domestic water entities"),
    }

    match &devices.cooling {
        Some(info) => {
            circuits.push(
                Circuit::builder(CircuitKind::Cooling)
                    .name("Cooling")
                    .host_control(settings.control_mode_home_assistant)
                    .device_info(info.clone())
                    .build(),
            );
            switches.push(
                Switch::new(
                    keys::mode_cooling(),
                    "cooling",
                    "Cooling mode auto",
                    "mdi:snowflake",
                    info.clone(),
                )
                .mode(),
            );
        }
        None => debug!("no cooling device, skipping cooling entities"),
    }

    Ok(Entities { circuits, switches })
}
