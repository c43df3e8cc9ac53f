use super::obscurity::{ObscurityTier, TierThresholds, quality_score};

/// Seconds granted for a very-well-known movie.
pub const VERY_WELL_KNOWN_BONUS: u32 = 3;
/// Seconds granted for a well-known movie.
pub const WELL_KNOWN_BONUS: u32 = 5;
/// Seconds granted for a moderately known movie.
pub const MODERATE_BONUS: u32 = 7;
/// Seconds granted for an obscure movie.
pub const OBSCURE_BONUS: u32 = 10;

/// Breakdown of a time bonus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBonusResult {
    /// Quality score the bonus was derived from.
    pub quality_score: f64,
    /// Tier the movie fell into.
    pub tier: ObscurityTier,
    /// Seconds added to the clock.
    pub bonus: u32,
}

/// Fixed bonus per tier, larger for more obscure movies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBonusTable {
    /// Band edges.
    pub thresholds: TierThresholds,
    /// Bonus for [`ObscurityTier::VeryWellKnown`].
    pub very_well_known: u32,
    /// Bonus for [`ObscurityTier::WellKnown`].
    pub well_known: u32,
    /// Bonus for [`ObscurityTier::Moderate`].
    pub moderate: u32,
    /// Bonus for [`ObscurityTier::Obscure`].
    pub obscure: u32,
}

impl Default for TimeBonusTable {
    fn default() -> Self {
        Self {
            thresholds: TierThresholds::default(),
            very_well_known: VERY_WELL_KNOWN_BONUS,
            well_known: WELL_KNOWN_BONUS,
            moderate: MODERATE_BONUS,
            obscure: OBSCURE_BONUS,
        }
    }
}

impl TimeBonusTable {
    /// Bonus seconds for a movie with the given popularity signals.
    pub fn bonus(&self, vote_count: u64, vote_average: f64) -> u32 {
        self.evaluate(vote_count, vote_average).bonus
    }

    /// Full breakdown for a movie with the given popularity signals.
    pub fn evaluate(&self, vote_count: u64, vote_average: f64) -> TimeBonusResult {
        let quality_score = quality_score(vote_count, vote_average);
        let tier = self.thresholds.classify(quality_score);
        TimeBonusResult {
            quality_score,
            tier,
            bonus: self.bonus_for_tier(tier),
        }
    }

    /// Bonus configured for a tier.
    pub fn bonus_for_tier(&self, tier: ObscurityTier) -> u32 {
        match tier {
            ObscurityTier::VeryWellKnown => self.very_well_known,
            ObscurityTier::WellKnown => self.well_known,
            ObscurityTier::Moderate => self.moderate,
            ObscurityTier::Obscure => self.obscure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::points::ScoringCurve;

    #[test]
    fn bonus_per_tier() {
        let table = TimeBonusTable::default();
        assert_eq!(table.bonus(5000, 7.0), VERY_WELL_KNOWN_BONUS);
        assert_eq!(table.bonus(2000, 7.0), WELL_KNOWN_BONUS);
        assert_eq!(table.bonus(500, 8.0), MODERATE_BONUS);
        assert_eq!(table.bonus(100, 6.0), OBSCURE_BONUS);
    }

    #[test]
    fn empty_signal_is_obscure_with_max_bonus() {
        let result = TimeBonusTable::default().evaluate(0, 0.0);
        assert_eq!(result.quality_score, 0.0);
        assert_eq!(result.tier, ObscurityTier::Obscure);
        assert_eq!(result.bonus, OBSCURE_BONUS);
    }

    #[test]
    fn bonus_never_increases_with_quality() {
        let table = TimeBonusTable::default();
        let allowed = [
            VERY_WELL_KNOWN_BONUS,
            WELL_KNOWN_BONUS,
            MODERATE_BONUS,
            OBSCURE_BONUS,
        ];
        let mut previous = u32::MAX;
        for votes in (0..8000).step_by(25) {
            let bonus = table.bonus(votes, 7.5);
            assert!(allowed.contains(&bonus));
            assert!(bonus <= previous);
            previous = bonus;
        }
    }

    #[test]
    fn tiers_agree_with_scoring_curve() {
        let table = TimeBonusTable::default();
        let curve = ScoringCurve::default();
        for (votes, average) in [(0, 0.0), (150, 9.1), (999, 10.0), (4000, 7.5), (30000, 8.5)] {
            let bonus = table.evaluate(votes, average);
            let score = curve.evaluate(votes, average);
            assert_eq!(bonus.quality_score, score.quality_score);
            assert_eq!(bonus.tier, score.tier);
        }
    }
}
