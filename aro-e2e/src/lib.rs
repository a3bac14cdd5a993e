//! ARO end-to-end suite library
//!
//! This module exposes the clients, polling helpers and scenarios of the
//! cluster e2e suite for the CLI and for integration tests.

// Core modules
pub mod config;
pub mod error;
pub mod logging;
pub mod poll;

// Remote APIs
pub mod admin;
pub mod azure;
pub mod kubernetes;

// Scenarios and runner
pub mod suite;

pub use config::SuiteConfig;
pub use error::{ensure, E2eError, E2eResult};
pub use suite::{all_scenarios, Runner, Scenario, SuiteContext, SuiteReport};
