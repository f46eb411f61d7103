//! Deduction, liability and scenario comparison arithmetic.
//!
//! Every function here is pure: the same profile, recommendations and
//! `as_of` date always produce the same result.

pub mod common;
pub mod comparison;
pub mod deductions;
pub mod liability;

pub use comparison::{AdditionalDeductions, ScenarioComparator};
pub use deductions::DeductionAggregator;
pub use liability::{Slab, TaxLiabilityCalculator};
