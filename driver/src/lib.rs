//! Abbot driver
//!
//! Loads a workload file, runs the advisor over it and writes the report.

pub mod config;
pub mod error;
pub mod render;
pub mod workload;

pub use config::{Config, ReportConfig, ReportFormat, ReportTarget};
pub use error::{DriverError, DriverResult};
pub use render::{emit, render};
pub use workload::{QueryReport, QueryType, Workload};
