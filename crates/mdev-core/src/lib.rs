//! Mediated-device registration and lifecycle simulation.
//!
//! A user-space model of the mdev PCI stub pipeline:
//!
//! - **ID rules** ([`PciDeviceId`], [`ids`]) decide which attached devices a
//!   driver binds, with the original comma/colon `ids` string syntax.
//! - **Registry** ([`MdevRegistry`]) tracks bound parents, their mdev type
//!   groups, and live instances under per-type capacity bounds.
//! - **Hotplug dispatch** ([`HotplugDispatcher`]) turns attach/detach events
//!   into bind and teardown against a [`SharedRegistry`].
//!
//! Instances carry no device functionality; they are lifecycle records only.
//! The hosting process owns the registry handle, so there is no process-wide
//! state and independent simulations can run side by side.

pub mod error;
pub mod hotplug;
pub mod ids;
pub mod pci;
pub mod registry;
pub mod types;

// Re-export all public types at the crate root for ergonomic imports.
pub use error::MdevError;
pub use hotplug::HotplugDispatcher;
pub use ids::{ParseIdError, parse_id_table};
pub use pci::{PCI_ANY_ID, ParseAddressError, PciAddress, PciDeviceId, PciDeviceInfo};
pub use registry::{InstanceId, InstanceInfo, MdevRegistry, SharedRegistry};
pub use types::{MdevTypeDesc, TypeStatus};
