pub mod assert;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod report;
pub mod state;
pub mod time;
pub mod utils;

pub use assert::{ResponseValidator, extract};
pub use error::{ReportError, UsageError};
pub use execution::{EventAggregator, EventRecord, ScenarioContext};
pub use report::ReportTree;
pub use state::{Outcome, ReportStatus, StatusMapper};
