//! Employee directory client core.
//!
//! Reconciles an in-memory edit buffer, a durable key-value mirror and
//! freshly fetched employee records while an employee editor is open, and
//! drives the remote employee and skill workflows behind it.
//!
//! - [`domain`]: records, validation, the edit session and the directory
//!   service, plus the ports they depend on.
//! - [`outbound`]: reqwest, mirror and viewport adapters for those ports.
//! - [`config`]: OrthoConfig-backed settings.
//! - [`app`]: the application context wiring it all together.

pub mod app;
pub mod config;
pub mod domain;
pub mod outbound;

pub use app::{AppBuildError, EmployeeDirectoryApp, HttpDirectoryApp};
pub use config::DirectorySettings;
