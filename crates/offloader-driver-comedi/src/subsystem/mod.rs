//! Subdevice accessors and their shared parameter types.

pub mod analog_input;

use std::fmt;

use comedi_sys::comedi_range;

/// comedilib unit code for volts.
const UNIT_VOLT: u32 = 0;
/// comedilib unit code for milliamps.
const UNIT_MILLIAMP: u32 = 1;

/// One entry of a channel's range table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Index passed to `comedi_data_read`
    pub index: u32,
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
    /// comedilib unit code
    pub unit: u32,
}

impl Default for Range {
    /// ±10 V, the usual range 0.
    fn default() -> Self {
        Self::new(0, -10.0, 10.0)
    }
}

impl Range {
    /// A range in volts.
    pub fn new(index: u32, min: f64, max: f64) -> Self {
        Self {
            index,
            min,
            max,
            unit: UNIT_VOLT,
        }
    }

    /// Copy a comedilib range table entry.
    ///
    /// # Safety
    ///
    /// `ptr` is null or points to a live `comedi_range`.
    pub(crate) unsafe fn from_ptr(index: u32, ptr: *const comedi_range) -> Option<Self> {
        let entry = ptr.as_ref()?;
        Some(Self {
            index,
            min: entry.min,
            max: entry.max,
            unit: entry.unit,
        })
    }

    /// `max - min`
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// e.g. `-5.000 to 5.000 V`
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            UNIT_VOLT => " V",
            UNIT_MILLIAMP => " mA",
            _ => "",
        };
        write!(f, "{:.3} to {:.3}{unit}", self.min, self.max)
    }
}

/// Where single-ended or differential inputs are referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalogReference {
    /// Against ground
    #[default]
    Ground,
    /// Against the common input
    Common,
    /// Against the paired input
    Differential,
    /// Board-specific
    Other,
}

impl AnalogReference {
    /// comedilib `AREF_*` value.
    pub fn to_raw(self) -> u32 {
        match self {
            AnalogReference::Ground => comedi_sys::AREF_GROUND,
            AnalogReference::Common => comedi_sys::AREF_COMMON,
            AnalogReference::Differential => comedi_sys::AREF_DIFF,
            AnalogReference::Other => comedi_sys::AREF_OTHER,
        }
    }
}
