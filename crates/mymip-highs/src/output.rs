//! Scoped control of HiGHS console output.

use tracing::warn;

use crate::ffi::{HighsHandle, OptionValue};

const OUTPUT_FLAG: &str = "output_flag";

/// Sets `output_flag` for the lifetime of the guard and restores the
/// previous value on drop, including early returns and unwinding.
pub(crate) struct OutputGuard<'a> {
    handle: &'a HighsHandle,
    previous: Option<bool>,
}

impl<'a> OutputGuard<'a> {
    pub(crate) fn new(handle: &'a HighsHandle, enabled: bool) -> Self {
        let previous = handle.bool_option(OUTPUT_FLAG);
        if previous != Some(enabled) {
            apply(handle, enabled);
        }
        Self { handle, previous }
    }
}

impl Drop for OutputGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous {
            apply(self.handle, previous);
        }
    }
}

fn apply(handle: &HighsHandle, enabled: bool) {
    if let Err(err) = handle.set_option(OUTPUT_FLAG, &OptionValue::Bool(enabled)) {
        warn!(
            component = "highs",
            operation = "output_flag",
            status = "warn",
            error = %err,
            "Failed to toggle solver output"
        );
    }
}
