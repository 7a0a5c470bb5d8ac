//! Mediated-device type descriptors.
//!
//! A parent device offers one or more named type groups; each group bounds
//! how many instances of that type may be live at once. The read-only
//! attribute quadruple (name, description, device API, available instances)
//! mirrors the per-type attribute files of the original driver.

/// Immutable description of one mdev type offered by a parent device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdevTypeDesc {
    /// Type name, unique within its parent (e.g. `"0"`).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Device API identifier (e.g. `"vfio-pci"`).
    pub device_api: String,
    /// Maximum concurrent live instances (at least 1).
    pub max_instances: u32,
}

impl MdevTypeDesc {
    /// Creates a type descriptor.
    #[must_use]
    pub fn new(name: &str, description: &str, device_api: &str, max_instances: u32) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            device_api: device_api.to_string(),
            max_instances,
        }
    }
}

/// Read-only snapshot of one mdev type, as reported by `describe_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeStatus {
    /// Type name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Device API identifier.
    pub device_api: String,
    /// Instances that can still be created: maximum minus live count.
    pub available_instances: u32,
}
