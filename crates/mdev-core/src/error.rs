//! Registry operation error types.

use std::fmt;

/// Errors returned by mediated-device registry operations.
///
/// All variants are local and recoverable; none abort the hosting process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdevError {
    /// The parent device address is already bound.
    DuplicateParent,
    /// No parent device is bound at the given address.
    UnknownParent,
    /// The parent offers no mdev type with the given name.
    UnknownType,
    /// No live instance exists with the given ID.
    UnknownInstance,
    /// The type's live-instance count already equals its maximum.
    CapacityExceeded,
    /// The parent still has live instances and cannot be unbound.
    HasLiveInstances,
    /// The supplied type-group list is empty, repeats a name, or declares a
    /// zero instance bound.
    InvalidTypes,
}

impl fmt::Display for MdevError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateParent => f.write_str("parent device already bound"),
            Self::UnknownParent => f.write_str("parent device not bound"),
            Self::UnknownType => f.write_str("unknown mdev type"),
            Self::UnknownInstance => f.write_str("unknown mdev instance"),
            Self::CapacityExceeded => f.write_str("no available instances for this type"),
            Self::HasLiveInstances => f.write_str("parent device has live instances"),
            Self::InvalidTypes => f.write_str("invalid mdev type group list"),
        }
    }
}

impl std::error::Error for MdevError {}
