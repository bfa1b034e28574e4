//! HiGHS backend for mymip.
//!
//! - [`Environment`]: shared solver configuration; creates models and networks
//! - [`HighsProblem`]: a HiGHS instance implementing `ProblemBackend`
//! - [`enable_logging`]: installs the `tracing` subscriber

mod environment;
pub mod ffi;
mod logging;
mod output;
mod problem;
mod status;

pub use environment::Environment;
pub use ffi::{OptionValue, highs_version};
pub use logging::{LOG_FILE_ENV, LOG_FORMAT_ENV, LoggingError, TRACE_ENV, enable_logging};
pub use problem::HighsProblem;

pub use mymip_core::{Model, Network};
pub use mymip_solver::{SolverConfig, SolverError, SolverStatus};
