//! Shared primitive types used across the entire engine.

/// A stable, unique account identifier.
pub type AccountId = u64;

/// A sales representative identifier (the rep's name).
pub type RepId = String;

/// A location code, e.g. a US state abbreviation.
pub type Location = String;

/// An employee-count threshold used to split segments.
pub type Threshold = u64;

/// Default `risk_score` at or above which an account counts as high risk.
pub const DEFAULT_RISK_THRESHOLD: u8 = 70;
