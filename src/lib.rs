#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod backend;
pub mod cache;
pub mod config;
pub mod draft;
pub mod engine;
pub mod error;
pub mod models;
pub mod notify;
pub mod params;
pub mod validate;

pub use config::Config;
pub use engine::WorkflowEngine;
pub use error::{BackendError, ConfigError, MailforgeError, Result, WorkflowError};
