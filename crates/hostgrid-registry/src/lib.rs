//! hostgrid-registry — single source of truth for host ownership.
//!
//! Tracks which tenant application currently owns which hostname within
//! one control-plane process and enforces exclusivity: a hostname maps to
//! at most one owner, and claiming a host held by a different owner is a
//! conflict, never an overwrite.
//!
//! Cross-process exclusivity is the coordination store's job; this
//! registry is the in-process gatekeeper all provisioning goes through.

pub mod error;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{HostRegistry, HostUpdate, HostValidator};
