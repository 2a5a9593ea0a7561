//! TARA risk derivation
//!
//! Threat Analysis and Risk Assessment rows arrive with free-text impact and
//! feasibility ratings. [`derive_tara_fields`] normalizes them and fills the
//! risk value, attack vector parameter and Cybersecurity Assurance Level (CAL)
//! through fixed matrices. Every step is total: unrecognized text leaves the
//! dependent fields empty instead of failing.

pub mod levels;
pub mod row;
pub mod table;

pub use levels::{
    cal_for, normalize_feasibility, normalize_impact_rating, risk_value, Cal, FeasibilityLevel, ImpactLevel,
    VectorParam,
};
pub use row::{apply_tara_derivations, derive_tara_fields, CiaTriple, DerivedFields, TaraRow};
pub use table::{csv_escape, TaraTable};
