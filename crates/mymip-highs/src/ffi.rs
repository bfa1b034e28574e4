//! FFI bindings to the HiGHS C API.
//!
//! This module contains all unsafe code of the crate. Every wrapper checks
//! slice lengths before handing pointers to the C library.
#![allow(unsafe_code)]

use std::ffi::{CStr, CString, c_void};
use std::ptr::{self, NonNull};

use mymip_solver::SolverError;
use tracing::{debug, trace};

pub use highs_sys::HighsInt;

/// Column-wise matrix format code.
const MATRIX_FORMAT_COLWISE: HighsInt = 1;

/// Option value types for HiGHS solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(String),
}

/// Borrowed arrays for one full model pass.
///
/// `a_start` holds one start offset per column.
#[derive(Debug, Clone, Copy)]
pub struct ModelArrays<'a> {
    pub sense: HighsInt,
    pub col_cost: &'a [f64],
    pub col_lower: &'a [f64],
    pub col_upper: &'a [f64],
    pub row_lower: &'a [f64],
    pub row_upper: &'a [f64],
    pub a_start: &'a [HighsInt],
    pub a_index: &'a [HighsInt],
    pub a_value: &'a [f64],
    pub integrality: Option<&'a [HighsInt]>,
}

/// Solution vectors copied out of the solver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSolution {
    pub col_value: Vec<f64>,
    pub col_dual: Vec<f64>,
    pub row_value: Vec<f64>,
    pub row_dual: Vec<f64>,
}

/// Owned HiGHS instance, destroyed on drop.
pub struct HighsHandle {
    ptr: NonNull<c_void>,
}

impl HighsHandle {
    pub fn create() -> Result<Self, SolverError> {
        let raw = unsafe { highs_sys::Highs_create() };
        let ptr = NonNull::new(raw).ok_or(SolverError::CreateFailed)?;
        trace!(
            component = "highs",
            operation = "create",
            status = "success",
            "Created HiGHS instance"
        );
        Ok(Self { ptr })
    }

    fn raw(&self) -> *mut c_void {
        self.ptr.as_ptr()
    }

    pub fn pass_model(&self, model: &ModelArrays<'_>) -> Result<(), SolverError> {
        let num_col = model.col_cost.len();
        let num_row = model.row_lower.len();
        ensure_len("col_lower", model.col_lower.len(), num_col)?;
        ensure_len("col_upper", model.col_upper.len(), num_col)?;
        ensure_len("row_upper", model.row_upper.len(), num_row)?;
        ensure_len("a_start", model.a_start.len(), num_col)?;
        ensure_len("a_value", model.a_value.len(), model.a_index.len())?;
        if let Some(integrality) = model.integrality {
            ensure_len("integrality", integrality.len(), num_col)?;
        }
        let num_col = to_highs_int(num_col)?;
        let num_row = to_highs_int(num_row)?;
        let num_nz = to_highs_int(model.a_value.len())?;

        let status = match model.integrality {
            None => unsafe {
                highs_sys::Highs_passLp(
                    self.raw(),
                    num_col,
                    num_row,
                    num_nz,
                    MATRIX_FORMAT_COLWISE,
                    model.sense,
                    0.0,
                    model.col_cost.as_ptr(),
                    model.col_lower.as_ptr(),
                    model.col_upper.as_ptr(),
                    model.row_lower.as_ptr(),
                    model.row_upper.as_ptr(),
                    model.a_start.as_ptr(),
                    model.a_index.as_ptr(),
                    model.a_value.as_ptr(),
                )
            },
            Some(integrality) => unsafe {
                highs_sys::Highs_passMip(
                    self.raw(),
                    num_col,
                    num_row,
                    num_nz,
                    MATRIX_FORMAT_COLWISE,
                    model.sense,
                    0.0,
                    model.col_cost.as_ptr(),
                    model.col_lower.as_ptr(),
                    model.col_upper.as_ptr(),
                    model.row_lower.as_ptr(),
                    model.row_upper.as_ptr(),
                    model.a_start.as_ptr(),
                    model.a_index.as_ptr(),
                    model.a_value.as_ptr(),
                    integrality.as_ptr(),
                )
            },
        };
        let operation = if model.integrality.is_some() {
            "Highs_passMip"
        } else {
            "Highs_passLp"
        };
        check(operation, status)
    }

    pub fn change_col_bounds(
        &self,
        set: &[HighsInt],
        lower: &[f64],
        upper: &[f64],
    ) -> Result<(), SolverError> {
        ensure_len("lower", lower.len(), set.len())?;
        ensure_len("upper", upper.len(), set.len())?;
        let num = to_highs_int(set.len())?;
        let status = unsafe {
            highs_sys::Highs_changeColsBoundsBySet(
                self.raw(),
                num,
                set.as_ptr(),
                lower.as_ptr(),
                upper.as_ptr(),
            )
        };
        check("Highs_changeColsBoundsBySet", status)
    }

    pub fn change_col_costs(&self, set: &[HighsInt], cost: &[f64]) -> Result<(), SolverError> {
        ensure_len("cost", cost.len(), set.len())?;
        let num = to_highs_int(set.len())?;
        let status = unsafe {
            highs_sys::Highs_changeColsCostBySet(self.raw(), num, set.as_ptr(), cost.as_ptr())
        };
        check("Highs_changeColsCostBySet", status)
    }

    pub fn change_objective_sense(&self, sense: HighsInt) -> Result<(), SolverError> {
        let status = unsafe { highs_sys::Highs_changeObjectiveSense(self.raw(), sense) };
        check("Highs_changeObjectiveSense", status)
    }

    pub fn change_integrality(
        &self,
        set: &[HighsInt],
        integrality: &[HighsInt],
    ) -> Result<(), SolverError> {
        ensure_len("integrality", integrality.len(), set.len())?;
        let num = to_highs_int(set.len())?;
        let status = unsafe {
            highs_sys::Highs_changeColsIntegralityBySet(
                self.raw(),
                num,
                set.as_ptr(),
                integrality.as_ptr(),
            )
        };
        check("Highs_changeColsIntegralityBySet", status)
    }

    /// Append rows given in compressed row form (`starts` has one entry per row).
    pub fn add_rows(
        &self,
        lower: &[f64],
        upper: &[f64],
        starts: &[HighsInt],
        index: &[HighsInt],
        value: &[f64],
    ) -> Result<(), SolverError> {
        ensure_len("upper", upper.len(), lower.len())?;
        ensure_len("starts", starts.len(), lower.len())?;
        ensure_len("value", value.len(), index.len())?;
        let num_row = to_highs_int(lower.len())?;
        let num_nz = to_highs_int(value.len())?;
        let status = unsafe {
            highs_sys::Highs_addRows(
                self.raw(),
                num_row,
                lower.as_ptr(),
                upper.as_ptr(),
                num_nz,
                starts.as_ptr(),
                index.as_ptr(),
                value.as_ptr(),
            )
        };
        check("Highs_addRows", status)
    }

    /// Append columns given in compressed column form (`starts` has one entry per column).
    pub fn add_cols(
        &self,
        cost: &[f64],
        lower: &[f64],
        upper: &[f64],
        starts: &[HighsInt],
        index: &[HighsInt],
        value: &[f64],
    ) -> Result<(), SolverError> {
        ensure_len("lower", lower.len(), cost.len())?;
        ensure_len("upper", upper.len(), cost.len())?;
        ensure_len("starts", starts.len(), cost.len())?;
        ensure_len("value", value.len(), index.len())?;
        let num_col = to_highs_int(cost.len())?;
        let num_nz = to_highs_int(value.len())?;
        let status = unsafe {
            highs_sys::Highs_addCols(
                self.raw(),
                num_col,
                cost.as_ptr(),
                lower.as_ptr(),
                upper.as_ptr(),
                num_nz,
                starts.as_ptr(),
                index.as_ptr(),
                value.as_ptr(),
            )
        };
        check("Highs_addCols", status)
    }

    /// Delete rows flagged with 1. HiGHS overwrites `mask` with the new row
    /// positions (-1 for deleted rows).
    pub fn delete_rows_by_mask(&self, mask: &mut [HighsInt]) -> Result<(), SolverError> {
        ensure_len("mask", mask.len(), self.num_row())?;
        let status = unsafe { highs_sys::Highs_deleteRowsByMask(self.raw(), mask.as_mut_ptr()) };
        check("Highs_deleteRowsByMask", status)
    }

    pub fn change_row_bounds(
        &self,
        set: &[HighsInt],
        lower: &[f64],
        upper: &[f64],
    ) -> Result<(), SolverError> {
        ensure_len("lower", lower.len(), set.len())?;
        ensure_len("upper", upper.len(), set.len())?;
        let num = to_highs_int(set.len())?;
        let status = unsafe {
            highs_sys::Highs_changeRowsBoundsBySet(
                self.raw(),
                num,
                set.as_ptr(),
                lower.as_ptr(),
                upper.as_ptr(),
            )
        };
        check("Highs_changeRowsBoundsBySet", status)
    }

    /// Pass a full primal column vector as the starting solution.
    pub fn set_primal_solution(&self, col_value: &[f64]) -> Result<(), SolverError> {
        ensure_len("col_value", col_value.len(), self.num_col())?;
        let status = unsafe {
            highs_sys::Highs_setSolution(
                self.raw(),
                col_value.as_ptr(),
                ptr::null(),
                ptr::null(),
                ptr::null(),
            )
        };
        check("Highs_setSolution", status)
    }

    pub fn run(&self) -> Result<(), SolverError> {
        let status = unsafe { highs_sys::Highs_run(self.raw()) };
        check("Highs_run", status)
    }

    pub fn solution(&self) -> Result<RawSolution, SolverError> {
        let num_col = self.num_col();
        let num_row = self.num_row();
        let mut solution = RawSolution {
            col_value: vec![0.0; num_col],
            col_dual: vec![0.0; num_col],
            row_value: vec![0.0; num_row],
            row_dual: vec![0.0; num_row],
        };
        let status = unsafe {
            highs_sys::Highs_getSolution(
                self.raw(),
                solution.col_value.as_mut_ptr(),
                solution.col_dual.as_mut_ptr(),
                solution.row_value.as_mut_ptr(),
                solution.row_dual.as_mut_ptr(),
            )
        };
        check("Highs_getSolution", status)?;
        Ok(solution)
    }

    pub fn objective_value(&self) -> f64 {
        unsafe { highs_sys::Highs_getObjectiveValue(self.raw()) }
    }

    pub fn model_status(&self) -> HighsInt {
        unsafe { highs_sys::Highs_getModelStatus(self.raw()) }
    }

    pub fn num_col(&self) -> usize {
        let value = unsafe { highs_sys::Highs_getNumCol(self.raw()) };
        usize::try_from(value).unwrap_or(0)
    }

    pub fn num_row(&self) -> usize {
        let value = unsafe { highs_sys::Highs_getNumRow(self.raw()) };
        usize::try_from(value).unwrap_or(0)
    }

    pub fn num_nz(&self) -> usize {
        let value = unsafe { highs_sys::Highs_getNumNz(self.raw()) };
        usize::try_from(value).unwrap_or(0)
    }

    /// Read a double info value of the last run.
    pub fn double_info(&self, name: &str) -> Option<f64> {
        let c_name = CString::new(name).ok()?;
        let mut value = 0.0;
        let status = unsafe {
            highs_sys::Highs_getDoubleInfoValue(self.raw(), c_name.as_ptr(), &raw mut value)
        };
        (status == highs_sys::STATUS_OK).then_some(value)
    }

    /// Read a 64-bit integer info value of the last run.
    pub fn int64_info(&self, name: &str) -> Option<i64> {
        let c_name = CString::new(name).ok()?;
        let mut value: i64 = 0;
        let status = unsafe {
            highs_sys::Highs_getInt64InfoValue(self.raw(), c_name.as_ptr(), &raw mut value)
        };
        (status == highs_sys::STATUS_OK).then_some(value)
    }

    pub fn bool_option(&self, name: &str) -> Option<bool> {
        let c_name = CString::new(name).ok()?;
        let mut value: HighsInt = 0;
        let status = unsafe {
            highs_sys::Highs_getBoolOptionValue(self.raw(), c_name.as_ptr(), &raw mut value)
        };
        (status == highs_sys::STATUS_OK).then_some(value != 0)
    }

    pub fn set_option(&self, name: &str, value: &OptionValue) -> Result<(), SolverError> {
        let invalid = |reason: &str| SolverError::InvalidOption {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        let c_name = CString::new(name).map_err(|_| invalid("name contains a NUL byte"))?;
        let status = match value {
            OptionValue::Bool(val) => unsafe {
                highs_sys::Highs_setBoolOptionValue(
                    self.raw(),
                    c_name.as_ptr(),
                    HighsInt::from(*val),
                )
            },
            OptionValue::Int(val) => unsafe {
                highs_sys::Highs_setIntOptionValue(self.raw(), c_name.as_ptr(), *val as HighsInt)
            },
            OptionValue::Float(val) => unsafe {
                highs_sys::Highs_setDoubleOptionValue(self.raw(), c_name.as_ptr(), *val)
            },
            OptionValue::Str(val) => {
                let c_value =
                    CString::new(val.as_str()).map_err(|_| invalid("value contains a NUL byte"))?;
                unsafe {
                    highs_sys::Highs_setStringOptionValue(
                        self.raw(),
                        c_name.as_ptr(),
                        c_value.as_ptr(),
                    )
                }
            }
        };
        if status < highs_sys::STATUS_OK {
            return Err(invalid("rejected by HiGHS"));
        }
        Ok(())
    }
}

impl Drop for HighsHandle {
    fn drop(&mut self) {
        unsafe { highs_sys::Highs_destroy(self.raw()) };
        trace!(
            component = "highs",
            operation = "destroy",
            status = "success",
            "Destroyed HiGHS instance"
        );
    }
}

/// Return the HiGHS solver version string, if available.
pub fn highs_version() -> Option<String> {
    unsafe {
        let ptr = highs_sys::Highs_version();
        if ptr.is_null() {
            None
        } else {
            CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
        }
    }
}

pub fn to_highs_int(value: usize) -> Result<HighsInt, SolverError> {
    HighsInt::try_from(value).map_err(|_| SolverError::IndexOverflow(value))
}

fn ensure_len(name: &str, got: usize, expected: usize) -> Result<(), SolverError> {
    if got == expected {
        Ok(())
    } else {
        Err(SolverError::InvalidArgument(format!(
            "{name} has {got} entries, expected {expected}"
        )))
    }
}

/// Map a HiGHS call status to a result. Warnings are not failures.
fn check(operation: &'static str, status: HighsInt) -> Result<(), SolverError> {
    if status < highs_sys::STATUS_OK {
        return Err(SolverError::CallFailed {
            operation,
            status: status as i32,
        });
    }
    if status != highs_sys::STATUS_OK {
        debug!(
            component = "highs",
            operation,
            status = "warning",
            status_code = status as i64,
            "HiGHS call returned a warning"
        );
    }
    Ok(())
}
