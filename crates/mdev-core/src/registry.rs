//! Central registry of bound parent devices and their mdev instances.
//!
//! Parents register with their offered type groups during bind, and the
//! registry tracks every live instance against its type's capacity bound.
//! Instance lifecycle is `absent -> live -> absent`; create and remove are
//! synchronous and atomic with respect to each other.
//!
//! The registry is a plain owned object. Hosts that serve concurrent callers
//! wrap it in a [`SharedRegistry`] handle, which serializes all operations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::MdevError;
use crate::pci::{PciAddress, PciDeviceInfo};
use crate::types::{MdevTypeDesc, TypeStatus};

/// Unique identifier of an mdev instance.
///
/// IDs are allocated from a monotonic counter and never reused, so a stale
/// ID held after remove can never alias a newer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Creates an ID from its raw counter value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One live instance, as reported by [`MdevRegistry::instances`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    /// Instance identifier.
    pub id: InstanceId,
    /// Address of the owning parent device.
    pub parent: PciAddress,
    /// Name of the instance's mdev type.
    pub type_name: String,
}

/// Per-type tracking record: the immutable descriptor plus the live count.
struct TypeEntry {
    desc: MdevTypeDesc,
    live: u32,
}

/// A bound parent device and its type table, keyed by type name.
struct ParentEntry {
    info: PciDeviceInfo,
    types: BTreeMap<String, TypeEntry>,
}

/// Back-reference from a live instance to its parent and type.
struct InstanceRecord {
    parent: PciAddress,
    type_name: String,
}

/// The mediated-device registry.
pub struct MdevRegistry {
    parents: BTreeMap<PciAddress, ParentEntry>,
    instances: BTreeMap<InstanceId, InstanceRecord>,
    next_instance: u64,
}

impl MdevRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parents: BTreeMap::new(),
            instances: BTreeMap::new(),
            next_instance: 1,
        }
    }

    /// Binds a parent device with its offered type groups.
    ///
    /// Fails with [`MdevError::DuplicateParent`] if the address is already
    /// bound, and with [`MdevError::InvalidTypes`] if the group list is
    /// empty, repeats a type name, or declares a zero instance bound.
    pub fn bind(&mut self, info: PciDeviceInfo, types: Vec<MdevTypeDesc>) -> Result<(), MdevError> {
        if self.parents.contains_key(&info.address) {
            return Err(MdevError::DuplicateParent);
        }
        if types.is_empty() {
            return Err(MdevError::InvalidTypes);
        }
        let mut table = BTreeMap::new();
        for desc in types {
            if desc.max_instances == 0 {
                return Err(MdevError::InvalidTypes);
            }
            let name = desc.name.clone();
            if table.insert(name, TypeEntry { desc, live: 0 }).is_some() {
                return Err(MdevError::InvalidTypes);
            }
        }
        log::info!(
            "registry: bound parent {} with {} mdev types",
            info.address,
            table.len()
        );
        self.parents.insert(info.address, ParentEntry { info, types: table });
        Ok(())
    }

    /// Unbinds a parent device and drops its type table.
    ///
    /// Refuses with [`MdevError::HasLiveInstances`] while any instance of the
    /// parent is live; callers that need forced teardown remove the instances
    /// first (see the hotplug detach path).
    pub fn unbind(&mut self, addr: PciAddress) -> Result<(), MdevError> {
        let parent = self.parents.get(&addr).ok_or(MdevError::UnknownParent)?;
        if parent.types.values().any(|entry| entry.live > 0) {
            return Err(MdevError::HasLiveInstances);
        }
        self.parents.remove(&addr);
        log::info!("registry: unbound parent {addr}");
        Ok(())
    }

    /// Creates a live instance of the named type on the given parent.
    ///
    /// Returns the fresh instance ID. Fails with
    /// [`MdevError::CapacityExceeded`] once the type's live count equals its
    /// maximum.
    pub fn create_instance(
        &mut self,
        addr: PciAddress,
        type_name: &str,
    ) -> Result<InstanceId, MdevError> {
        let parent = self.parents.get_mut(&addr).ok_or(MdevError::UnknownParent)?;
        let entry = parent.types.get_mut(type_name).ok_or(MdevError::UnknownType)?;
        if entry.live >= entry.desc.max_instances {
            return Err(MdevError::CapacityExceeded);
        }
        entry.live += 1;
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        self.instances.insert(
            id,
            InstanceRecord {
                parent: addr,
                type_name: type_name.to_string(),
            },
        );
        log::info!("registry: created instance {id} (type '{type_name}' on {addr})");
        Ok(id)
    }

    /// Removes a live instance by ID.
    pub fn remove_instance(&mut self, id: InstanceId) -> Result<(), MdevError> {
        let record = self.instances.remove(&id).ok_or(MdevError::UnknownInstance)?;
        let entry = self
            .parents
            .get_mut(&record.parent)
            .and_then(|parent| parent.types.get_mut(&record.type_name))
            .expect("instance record references an unbound parent type");
        entry.live -= 1;
        log::info!(
            "registry: removed instance {id} (type '{}' on {})",
            record.type_name,
            record.parent
        );
        Ok(())
    }

    /// Reports the read-only attribute snapshot of one type.
    pub fn describe_type(&self, addr: PciAddress, type_name: &str) -> Result<TypeStatus, MdevError> {
        let parent = self.parents.get(&addr).ok_or(MdevError::UnknownParent)?;
        let entry = parent.types.get(type_name).ok_or(MdevError::UnknownType)?;
        Ok(TypeStatus {
            name: entry.desc.name.clone(),
            description: entry.desc.description.clone(),
            device_api: entry.desc.device_api.clone(),
            available_instances: entry.desc.max_instances.saturating_sub(entry.live),
        })
    }

    /// Returns `true` if a parent is bound at the given address.
    #[must_use]
    pub fn is_bound(&self, addr: PciAddress) -> bool {
        self.parents.contains_key(&addr)
    }

    /// Iterates over bound parents in address order.
    pub fn parents(&self) -> impl Iterator<Item = &PciDeviceInfo> {
        self.parents.values().map(|parent| &parent.info)
    }

    /// Reports the attribute snapshots of every type of one parent.
    pub fn types_of(&self, addr: PciAddress) -> Result<Vec<TypeStatus>, MdevError> {
        let parent = self.parents.get(&addr).ok_or(MdevError::UnknownParent)?;
        Ok(parent
            .types
            .keys()
            .map(|name| {
                self.describe_type(addr, name)
                    .expect("type listed in its own parent table")
            })
            .collect())
    }

    /// Lists every live instance in ID order.
    #[must_use]
    pub fn instances(&self) -> Vec<InstanceInfo> {
        self.instances
            .iter()
            .map(|(id, record)| InstanceInfo {
                id: *id,
                parent: record.parent,
                type_name: record.type_name.clone(),
            })
            .collect()
    }

    /// Lists the IDs of live instances owned by one parent.
    #[must_use]
    pub fn instances_of(&self, addr: PciAddress) -> Vec<InstanceId> {
        self.instances
            .iter()
            .filter(|(_, record)| record.parent == addr)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl Default for MdevRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle serializing registry access across threads.
///
/// Read-only queries take the read lock; lifecycle operations take the write
/// lock, so the capacity invariant holds for any interleaving of callers.
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<MdevRegistry>>,
}

impl SharedRegistry {
    /// Creates a handle around a fresh empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MdevRegistry::new())),
        }
    }

    /// Executes a closure with a shared reference to the registry.
    pub fn read<R>(&self, f: impl FnOnce(&MdevRegistry) -> R) -> R {
        let guard = self.inner.read().expect("registry lock poisoned");
        f(&guard)
    }

    /// Executes a closure with a mutable reference to the registry.
    pub fn write<R>(&self, f: impl FnOnce(&mut MdevRegistry) -> R) -> R {
        let mut guard = self.inner.write().expect("registry lock poisoned");
        f(&mut guard)
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new()
    }
}
