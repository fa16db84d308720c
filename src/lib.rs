mod accessor;
mod circuit;
mod config;
mod diagnostics;
mod discovery;
mod error;
mod protocol;
mod reconcile;
mod setup;
mod switch;
mod types;

pub use accessor::{DeviceAccessor, RegisterMap, SensorStates, WriteOptions};
pub use circuit::{Circuit, CircuitBuilder, CircuitState, TemperatureSource};
pub use config::{EntryConfig, EntryData, EntryOptions, Settings};
pub use diagnostics::{RegisterEntry, config_entry_diagnostics, dump_registers, mask_mac, redact};
pub use discovery::discover;
pub use error::{Error, Result};
pub use protocol::{
    DiscoveryReply, Namespace, RegisterKey, is_device_register, keys, parse_discovery_datagram,
};
pub use reconcile::{
    Readings, derive_action, device_mode_to_preset, is_heating_active, operating_mode_for,
    preset_and_mode_to_device_mode, special_heating,
};
pub use setup::{
    DeviceInfo, DeviceInfos, Entities, firmware_url_by_model, manufacturer_by_model, setup_entry,
};
pub use switch::{EntityCategory, Switch};
pub use types::*;
