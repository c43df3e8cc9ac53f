/// Lower bound (inclusive) of the very-well-known band.
pub const VERY_WELL_KNOWN_THRESHOLD: f64 = 3000.0;
/// Lower bound (inclusive) of the well-known band.
pub const WELL_KNOWN_THRESHOLD: f64 = 1000.0;
/// Lower bound (inclusive) of the moderate band.
pub const MODERATE_THRESHOLD: f64 = 200.0;

/// Compute the quality score of a movie: `vote_count × (vote_average / 10)`.
///
/// Higher means more widely known. The average is clamped to `[0, 10]` (NaN counts
/// as zero) so the result is always finite and non-negative.
pub fn quality_score(vote_count: u64, vote_average: f64) -> f64 {
    let average = if vote_average.is_nan() {
        0.0
    } else {
        vote_average.clamp(0.0, 10.0)
    };
    vote_count as f64 * (average / 10.0)
}

/// Discrete obscurity bucket derived from the quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObscurityTier {
    /// Blockbusters everybody has heard of.
    VeryWellKnown,
    /// Widely known titles.
    WellKnown,
    /// Moderately known titles.
    Moderate,
    /// Deep cuts.
    Obscure,
}

impl ObscurityTier {
    /// Stable kebab-case label used in logs and feedback messages.
    pub fn label(self) -> &'static str {
        match self {
            ObscurityTier::VeryWellKnown => "very-well-known",
            ObscurityTier::WellKnown => "well-known",
            ObscurityTier::Moderate => "moderate",
            ObscurityTier::Obscure => "obscure",
        }
    }
}

/// Band edges splitting quality scores into [`ObscurityTier`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    /// Quality score at or above which a movie is very well known.
    pub very_well_known: f64,
    /// Quality score at or above which a movie is well known.
    pub well_known: f64,
    /// Quality score at or above which a movie is moderately known.
    pub moderate: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            very_well_known: VERY_WELL_KNOWN_THRESHOLD,
            well_known: WELL_KNOWN_THRESHOLD,
            moderate: MODERATE_THRESHOLD,
        }
    }
}

impl TierThresholds {
    /// Classify a quality score into its tier.
    pub fn classify(&self, quality_score: f64) -> ObscurityTier {
        if quality_score >= self.very_well_known {
            ObscurityTier::VeryWellKnown
        } else if quality_score >= self.well_known {
            ObscurityTier::WellKnown
        } else if quality_score >= self.moderate {
            ObscurityTier::Moderate
        } else {
            ObscurityTier::Obscure
        }
    }
}
