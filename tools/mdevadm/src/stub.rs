//! The `mdev_pci` stub driver profile.
//!
//! Matches nothing by default (the ID table is filled dynamically from the
//! `ids` string) and advertises two identical mdev type groups per bound
//! parent, one available instance each. Instances carry no functionality;
//! the profile exists to exercise the registration and lifecycle pipeline
//! end-to-end.

use mdev_core::{HotplugDispatcher, MdevTypeDesc, SharedRegistry};

/// Driver name used in match and ID-table logs.
pub const DRIVER_NAME: &str = "mdev_pci";

/// Description reported by every type group.
pub const DESCRIPTION: &str = "mdev-pci mdev";

/// Device API string reported by every type group.
pub const DEVICE_API: &str = "vfio-pci";

/// The two type groups advertised by every bound parent.
pub fn type_groups() -> Vec<MdevTypeDesc> {
    ["0", "1"]
        .iter()
        .map(|name| MdevTypeDesc::new(name, DESCRIPTION, DEVICE_API, 1))
        .collect()
}

/// Creates the stub driver's hotplug dispatcher with an empty ID table.
pub fn dispatcher(registry: SharedRegistry) -> HotplugDispatcher {
    HotplugDispatcher::new(DRIVER_NAME, type_groups(), registry)
}
