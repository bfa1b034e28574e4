//! Shared solver abstractions for mymip.
//!
//! This crate provides the capability set a numerical backend (like
//! `mymip-highs`) exposes to the model layer.
//!
//! # Overview
//!
//! - [`SolverConfig`]: Configuration options for solver behavior
//! - [`SolverStatus`]: Common status values across solvers
//! - [`SolverError`]: Error types for backend calls
//! - [`VarKind`], [`ObjectiveSense`], [`BoundKind`]: column attributes
//! - [`LpArrays`], [`RowBatch`], [`ColumnBatch`]: compressed array layouts
//! - [`ProblemBackend`]: Trait for a loaded, incrementally editable problem

mod config;
mod error;
mod kinds;
mod layout;
mod status;
mod traits;

pub use config::SolverConfig;
pub use error::SolverError;
pub use kinds::{BoundKind, ObjectiveSense, VarKind};
pub use layout::{ColumnBatch, LpArrays, RowBatch};
pub use status::SolverStatus;
pub use traits::ProblemBackend;
