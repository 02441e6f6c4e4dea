// error.rs

use thiserror::Error;

/// Failures of the strict and non-blocking entry points. The plain lookups
/// (`InstanceMap::get`, `ReferenceMap::get`, `Accessor::for_host`) never fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessorError {
    /// Strict read of a slot that was never written.
    #[error("no value stored for type {type_name}")]
    SlotMissing { type_name: &'static str },

    /// Strict read of a host that has no bucket yet.
    #[error("no bucket stored for host")]
    HostMissing,

    /// The accessor's lock is held by another caller.
    #[error("accessor is locked by another caller")]
    Contended,
}

pub type Result<T> = std::result::Result<T, AccessorError>;
