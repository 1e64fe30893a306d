//! Outbound adapters implementing the domain ports.
//!
//! - [`http`]: reqwest adapters for the employee and skill REST API.
//! - [`mirror`]: in-memory and file-backed persistent mirrors.
//! - [`viewport`]: scroll-lock adapter for headless front ends.

pub mod http;
pub mod mirror;
pub mod viewport;
