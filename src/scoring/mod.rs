//! Obscurity-weighted scoring: quality score, point curve and time-bonus tiers.

/// Quality score and tier classification shared by every scoring component.
pub mod obscurity;
/// Continuous point curve awarded for a correct guess.
pub mod points;
/// Tiered time bonus granted for a correct guess.
pub mod time_bonus;

pub use self::obscurity::{ObscurityTier, TierThresholds, quality_score};
pub use self::points::{ScoringCurve, ScoringResult};
pub use self::time_bonus::{TimeBonusResult, TimeBonusTable};
