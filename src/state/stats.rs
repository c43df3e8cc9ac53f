use crate::dates;

/// Long-running player statistics across daily challenges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    /// Completed daily sessions.
    pub games_played: u32,
    /// Sum of final scores.
    pub total_score: u64,
    /// Best final score.
    pub best_score: u32,
    /// Consecutive days played.
    pub current_streak: u32,
    /// Day key of the last completed session; empty when never played.
    pub last_played: String,
}

impl PlayerStats {
    /// Fold a completed session into the stats.
    ///
    /// Returns `false` and changes nothing when `date` was already recorded.
    pub fn record(&mut self, date: &str, score: u32) -> bool {
        if self.last_played == date {
            return false;
        }

        self.current_streak = if dates::is_previous_day(&self.last_played, date) {
            self.current_streak + 1
        } else {
            1
        };
        self.games_played += 1;
        self.total_score += u64::from(score);
        self.best_score = self.best_score.max(score);
        self.last_played = date.to_owned();
        true
    }

    /// Mean final score, zero before the first game.
    pub fn average_score(&self) -> u64 {
        match self.games_played {
            0 => 0,
            played => self.total_score / u64::from(played),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_game_starts_a_streak() {
        let mut stats = PlayerStats::default();
        assert!(stats.record("2026-01-19", 80));
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.best_score, 80);
        assert_eq!(stats.last_played, "2026-01-19");
    }

    #[test]
    fn consecutive_days_extend_the_streak() {
        let mut stats = PlayerStats::default();
        stats.record("2026-01-19", 80);
        stats.record("2026-01-20", 120);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.best_score, 120);
        assert_eq!(stats.total_score, 200);
        assert_eq!(stats.average_score(), 100);
    }

    #[test]
    fn gap_resets_the_streak() {
        let mut stats = PlayerStats::default();
        stats.record("2026-01-19", 80);
        stats.record("2026-01-20", 80);
        stats.record("2026-01-23", 10);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.games_played, 3);
    }

    #[test]
    fn same_day_is_recorded_once() {
        let mut stats = PlayerStats::default();
        assert!(stats.record("2026-01-19", 80));
        assert!(!stats.record("2026-01-19", 500));
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.best_score, 80);
    }
}
