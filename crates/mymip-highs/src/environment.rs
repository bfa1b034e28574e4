//! Shared HiGHS environment.
//!
//! An [`Environment`] holds the solver configuration and the extra raw
//! options that every problem it creates starts from. It is opened once and
//! shared through [`Rc`]; each [`HighsProblem`] keeps a back-reference, so
//! the environment closes when the last model referring to it is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use mymip_core::{Model, Network};
use mymip_solver::{SolverConfig, SolverError};
use tracing::debug;

use crate::ffi::{HighsHandle, OptionValue, highs_version};
use crate::problem::HighsProblem;

const OUTPUT_FLAG: &str = "output_flag";

pub struct Environment {
    config: SolverConfig,
    options: RefCell<Vec<(String, OptionValue)>>,
    // Options are validated against this instance before they are stored.
    validator: HighsHandle,
}

impl Environment {
    /// Open an environment, rejecting any config value HiGHS does not accept.
    pub fn open(config: SolverConfig) -> Result<Rc<Self>, SolverError> {
        let validator = HighsHandle::create()?;
        validator.set_option(OUTPUT_FLAG, &OptionValue::Bool(false))?;
        for (name, value) in config_options(&config)? {
            validator.set_option(name, &value)?;
        }
        debug!(
            component = "environment",
            operation = "open",
            status = "success",
            version = highs_version().as_deref().unwrap_or("unknown"),
            configured = !config.is_empty(),
            "Opened HiGHS environment"
        );
        Ok(Rc::new(Self {
            config,
            options: RefCell::new(Vec::new()),
            validator,
        }))
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Raw options set through [`Environment::set_option`], in the order set.
    pub fn options(&self) -> Vec<(String, OptionValue)> {
        self.options.borrow().clone()
    }

    /// Set a raw HiGHS option for problems created from now on.
    ///
    /// Unknown names and values of the wrong type return
    /// [`SolverError::InvalidOption`] and are not stored.
    pub fn set_option(&self, name: &str, value: OptionValue) -> Result<(), SolverError> {
        if let Err(err) = self.validator.set_option(name, &value) {
            debug!(
                component = "environment",
                operation = "set_option",
                status = "error",
                option = name,
                error = %err,
                "Rejected solver option"
            );
            return Err(err);
        }
        let mut options = self.options.borrow_mut();
        match options.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = value,
            None => options.push((name.to_string(), value)),
        }
        debug!(
            component = "environment",
            operation = "set_option",
            status = "success",
            option = name,
            "Stored solver option"
        );
        Ok(())
    }

    /// Whether solver console output is shown while a solve runs.
    pub fn output_enabled(&self) -> bool {
        let explicit = self
            .options
            .borrow()
            .iter()
            .rev()
            .find(|(name, _)| name == OUTPUT_FLAG)
            .map(|(_, value)| matches!(value, OptionValue::Bool(true)));
        explicit.unwrap_or_else(|| {
            self.config.log_to_console.unwrap_or(false) || self.config.verbosity.unwrap_or(0) > 0
        })
    }

    pub(crate) fn configure(&self, handle: &HighsHandle) -> Result<(), SolverError> {
        // Output stays off outside of solves; OutputGuard turns it on.
        handle.set_option(OUTPUT_FLAG, &OptionValue::Bool(false))?;
        for (name, value) in config_options(&self.config)? {
            handle.set_option(name, &value)?;
        }
        for (name, value) in self.options.borrow().iter() {
            if name != OUTPUT_FLAG {
                handle.set_option(name, value)?;
            }
        }
        Ok(())
    }

    pub fn create_problem(self: &Rc<Self>, name: &str) -> Result<HighsProblem, SolverError> {
        HighsProblem::new(Rc::clone(self), name)
    }

    /// Create an empty model backed by a fresh HiGHS instance.
    pub fn create_model(self: &Rc<Self>, name: &str) -> Result<Model, SolverError> {
        let problem = self.create_problem(name)?;
        Ok(Model::new(name, Box::new(problem)))
    }

    /// Create an empty network backed by a fresh HiGHS instance.
    pub fn create_network(self: &Rc<Self>, name: &str) -> Result<Network, SolverError> {
        let problem = self.create_problem(name)?;
        Ok(Network::new(name, Box::new(problem)))
    }

    pub fn version() -> Option<String> {
        highs_version()
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        debug!(
            component = "environment",
            operation = "close",
            status = "success",
            options = self.options.get_mut().len(),
            "Closed HiGHS environment"
        );
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("config", &self.config)
            .field("options", &self.options.borrow())
            .finish_non_exhaustive()
    }
}

/// HiGHS options for the values set in `config`.
fn config_options(config: &SolverConfig) -> Result<Vec<(&'static str, OptionValue)>, SolverError> {
    let mut options = Vec::new();
    if let Some(limit) = config.time_limit {
        options.push(("time_limit", OptionValue::Float(limit)));
    }
    if let Some(limit) = config.iteration_limit {
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        options.push(("simplex_iteration_limit", OptionValue::Int(limit)));
    }
    if let Some(gap) = config.mip_gap {
        options.push(("mip_rel_gap", OptionValue::Float(gap)));
    }
    if let Some(presolve) = config.presolve {
        let presolve = if presolve { "on" } else { "off" };
        options.push(("presolve", OptionValue::Str(presolve.to_string())));
    }
    if let Some(threads) = config.threads {
        let threads = i32::try_from(threads).unwrap_or(i32::MAX);
        options.push(("threads", OptionValue::Int(threads)));
    }
    if let Some(tolerance) = config.tolerance {
        options.push(("primal_feasibility_tolerance", OptionValue::Float(tolerance)));
        options.push(("dual_feasibility_tolerance", OptionValue::Float(tolerance)));
    }
    if let Some(enabled) = config.log_to_console {
        options.push(("log_to_console", OptionValue::Bool(enabled)));
    }
    if let Some(path) = &config.log_file {
        let path = path.to_str().ok_or_else(|| SolverError::InvalidOption {
            name: "log_file".to_string(),
            reason: "path is not valid UTF-8".to_string(),
        })?;
        options.push(("log_file", OptionValue::Str(path.to_string())));
    }
    Ok(options)
}
