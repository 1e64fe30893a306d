//! REST outbound adapters.
//!
//! Thin reqwest implementations of the `EmployeeDirectory` and
//! `SkillService` ports sharing one [`RestClient`].

mod client;
mod dto;
mod employee_directory;
mod skill_service;

pub use client::{RestClient, RestClientError};
pub use employee_directory::HttpEmployeeDirectory;
pub use skill_service::HttpSkillService;
