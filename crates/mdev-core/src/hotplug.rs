//! Hotplug event dispatch: device-to-driver matching and teardown.
//!
//! Replaces the driver-core probe/remove callbacks of the original module
//! with explicit entry points: an external event source calls
//! [`HotplugDispatcher::device_attached`] and
//! [`HotplugDispatcher::device_detached`], and the dispatcher matches the
//! device against its ID table and drives the registry.

use crate::error::MdevError;
use crate::pci::{PciAddress, PciDeviceId, PciDeviceInfo};
use crate::registry::SharedRegistry;
use crate::types::MdevTypeDesc;

/// Matches attached devices against an ID table and binds them as parents.
///
/// The ID table starts empty and is filled from the parsed `ids`
/// configuration string and any IDs added later at runtime.
pub struct HotplugDispatcher {
    driver_name: String,
    type_groups: Vec<MdevTypeDesc>,
    id_table: Vec<PciDeviceId>,
    registry: SharedRegistry,
}

impl HotplugDispatcher {
    /// Creates a dispatcher for one driver profile.
    ///
    /// `type_groups` is the template bound to every matched parent.
    #[must_use]
    pub fn new(
        driver_name: &str,
        type_groups: Vec<MdevTypeDesc>,
        registry: SharedRegistry,
    ) -> Self {
        Self {
            driver_name: driver_name.to_string(),
            type_groups,
            id_table: Vec::new(),
            registry,
        }
    }

    /// Appends a dynamic ID rule to the table.
    pub fn add_id(&mut self, id: PciDeviceId) {
        log::info!(
            "{}: add [{:04x}:{:04x}[{:04x}:{:04x}]] class {:#08x}/{:08x}",
            self.driver_name,
            id.vendor,
            id.device,
            id.subvendor,
            id.subdevice,
            id.class,
            id.class_mask
        );
        self.id_table.push(id);
    }

    /// Returns the current ID table in insertion order.
    #[must_use]
    pub fn id_table(&self) -> &[PciDeviceId] {
        &self.id_table
    }

    /// Handles a device-attach event.
    ///
    /// The first matching rule wins: the device is bound as a parent with a
    /// fresh copy of the driver's type groups and `Ok(true)` is returned.
    /// Returns `Ok(false)` without side effects when no rule matches.
    pub fn device_attached(&self, info: PciDeviceInfo) -> Result<bool, MdevError> {
        if !self.id_table.iter().any(|id| id.matches(&info)) {
            return Ok(false);
        }
        log::info!(
            "pci: matched {} [{:04x}:{:04x}] -> driver '{}'",
            info.address,
            info.vendor_id,
            info.device_id,
            self.driver_name
        );
        self.registry
            .write(|r| r.bind(info, self.type_groups.clone()))?;
        Ok(true)
    }

    /// Handles a device-detach event.
    ///
    /// Detach cannot be refused: any live instances of the parent are
    /// force-removed before the parent is unbound. Returns `Ok(false)` if no
    /// parent was bound at the address.
    pub fn device_detached(&self, addr: PciAddress) -> Result<bool, MdevError> {
        self.registry.write(|r| {
            if !r.is_bound(addr) {
                return Ok(false);
            }
            for id in r.instances_of(addr) {
                log::warn!("hotplug: force-removing instance {id} of detached parent {addr}");
                r.remove_instance(id)?;
            }
            r.unbind(addr)?;
            Ok(true)
        })
    }
}
