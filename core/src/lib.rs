//! Ambient support shared by the workspace: layered configuration, logging setup, and test
//! utilities.

pub mod config;
pub mod logging;
pub mod test_util;

pub use config::Config;
