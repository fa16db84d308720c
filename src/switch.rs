use tracing::info;

use crate::accessor::{DeviceAccessor, WriteOptions};
use crate::protocol::RegisterKey;
use crate::setup::DeviceInfo;
use crate::types::{DeviceMode, RegisterValue};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCategory {
    Config,
    Diagnostic,
}

/// A register exposed as an on/off switch.
#[derive(Debug, Clone)]
pub struct Switch {
    key: RegisterKey,
    unique_id: String,
    name: String,
    icon: &'static str,
    icon_off: Option<&'static str>,
    on_state: RegisterValue,
    off_state: RegisterValue,
    entity_category: Option<EntityCategory>,
    enabled_by_default: bool,
    device_info: DeviceInfo,
}

impl Switch {
    pub fn new(
        key: RegisterKey,
        unique_id: impl Into<String>,
        name: impl Into<String>,
        icon: &'static str,
        device_info: DeviceInfo,
    ) -> Self {
        Self {
            key,
            unique_id: unique_id.into(),
            name: name.into(),
            icon,
            icon_off: None,
            on_state: RegisterValue::Bool(true),
            off_state: RegisterValue::Bool(false),
            entity_category: None,
            enabled_by_default: true,
            device_info,
        }
    }

    /// A circuit mode register toggled between `Automatic` and `Off`.
    pub fn mode(mut self) -> Self {
        self.on_state = DeviceMode::Automatic.into();
        self.off_state = DeviceMode::Off.into();
        self
    }

    pub fn icon_off(mut self, icon: &'static str) -> Self {
        self.icon_off = Some(icon);
        self
    }

    pub fn category(mut self, category: EntityCategory) -> Self {
        self.entity_category = Some(category);
        self
    }

    pub fn disabled_by_default(mut self) -> Self {
        self.enabled_by_default = false;
        self
    }

    pub fn key(&self) -> &RegisterKey {
        &self.key
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entity_category(&self) -> Option<EntityCategory> {
        self.entity_category
    }

    pub fn enabled_by_default(&self) -> bool {
        self.enabled_by_default
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    pub fn is_on<A: DeviceAccessor + ?Sized>(&self, accessor: &A) -> Result<bool> {
        Ok(accessor.get_value(&self.key)? == self.on_state)
    }

    pub fn turn_on<A: DeviceAccessor + ?Sized>(&self, accessor: &mut A) -> Result<()> {
        info!(switch = %self.unique_id, "turn on");
        accessor.write(&self.key, self.on_state.clone(), WriteOptions::immediate())
    }

    pub fn turn_off<A: DeviceAccessor + ?Sized>(&self, accessor: &mut A) -> Result<()> {
        info!(switch = %self.unique_id, "turn off");
        accessor.write(&self.key, self.off_state.clone(), WriteOptions::immediate())
    }

    pub fn icon<A: DeviceAccessor + ?Sized>(&self, accessor: &A) -> Result<&'static str> {
        match self.icon_off {
            Some(off) if !self.is_on(accessor)? => Ok(off),
            _ => Ok(self.icon),
        }
    }
}
