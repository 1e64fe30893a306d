//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the REST backend, the persistent mirror, the viewport). Each trait
//! exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning `anyhow::Result`.

mod macros;
pub(crate) use macros::define_port_error;

mod employee_directory;
mod persistent_mirror;
mod skill_service;
mod viewport_lock;

#[cfg(test)]
pub use employee_directory::MockEmployeeDirectory;
pub use employee_directory::{
    EmployeeDirectory, EmployeeDirectoryError, FixtureEmployeeDirectory,
};
#[cfg(test)]
pub use persistent_mirror::MockPersistentMirror;
pub use persistent_mirror::{FixturePersistentMirror, MirrorError, MirrorKey, PersistentMirror};
#[cfg(test)]
pub use skill_service::MockSkillService;
pub use skill_service::{FixtureSkillService, SkillService, SkillServiceError};
#[cfg(test)]
pub use viewport_lock::MockViewportLock;
pub use viewport_lock::{FixtureViewportLock, ViewportLock};
