pub mod chart;
pub mod config;
pub mod describer;
pub mod error;
pub mod history;
pub mod logging;
pub mod store;
pub mod workflow;
