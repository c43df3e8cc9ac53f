use super::obscurity::{ObscurityTier, TierThresholds, quality_score};

/// Maximum award for a correct guess (quality score of zero).
pub const SCALE: u32 = 100;
/// Quality score at which the curve reaches its floor.
pub const CAP: f64 = 20_000.0;
/// Curve exponent; below one spreads awards evenly across the input range.
pub const EXPONENT: f64 = 0.4;
/// Floor so every correct guess is worth something.
pub const MIN_POINTS: u32 = 5;

/// Breakdown of a point award.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringResult {
    /// Quality score the award was derived from.
    pub quality_score: f64,
    /// Tier of the movie, for display only.
    pub tier: ObscurityTier,
    /// Points awarded.
    pub points: u32,
}

/// Continuous point curve:
/// `max(min_points, round(scale × (1 − (min(qs, cap) / cap)^exponent)))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringCurve {
    /// Maximum award.
    pub scale: u32,
    /// Saturation point of the curve.
    pub cap: f64,
    /// Spacing exponent.
    pub exponent: f64,
    /// Minimum award.
    pub min_points: u32,
    /// Bands used to report the tier alongside the award.
    pub thresholds: TierThresholds,
}

impl Default for ScoringCurve {
    fn default() -> Self {
        Self {
            scale: SCALE,
            cap: CAP,
            exponent: EXPONENT,
            min_points: MIN_POINTS,
            thresholds: TierThresholds::default(),
        }
    }
}

impl ScoringCurve {
    /// Points for a movie with the given popularity signals.
    pub fn points(&self, vote_count: u64, vote_average: f64) -> u32 {
        self.points_for_quality(quality_score(vote_count, vote_average))
    }

    /// Full breakdown for a movie with the given popularity signals.
    pub fn evaluate(&self, vote_count: u64, vote_average: f64) -> ScoringResult {
        let quality_score = quality_score(vote_count, vote_average);
        ScoringResult {
            quality_score,
            tier: self.thresholds.classify(quality_score),
            points: self.points_for_quality(quality_score),
        }
    }

    /// Points for an already computed quality score.
    pub fn points_for_quality(&self, quality_score: f64) -> u32 {
        let ratio = if self.cap > 0.0 {
            (quality_score.max(0.0).min(self.cap)) / self.cap
        } else {
            1.0
        };
        let raw = (f64::from(self.scale) * (1.0 - ratio.powf(self.exponent))).round();
        // raw lies in [0, scale] because ratio is in [0, 1]
        (raw as u32).max(self.min_points).min(self.scale.max(self.min_points))
    }
}
