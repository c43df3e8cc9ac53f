//! Application-level configuration loading, including the tunable game rules.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::scoring::{ScoringCurve, TierThresholds, TimeBonusTable};

/// Default location on disk where the player looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/movierush.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MOVIERUSH_CONFIG_PATH";
/// Environment variable that overrides the API base URL.
const API_URL_ENV: &str = "MOVIERUSH_API_URL";
/// Default API base URL.
const DEFAULT_API_BASE_URL: &str = "https://movierush.vercel.app";
/// Default directory for persisted session state.
const DEFAULT_STORAGE_DIR: &str = ".movierush";

/// Seconds on the clock when a session starts.
pub const INITIAL_TIME: f64 = 30.0;
/// Seconds removed for a new incorrect guess.
pub const TIME_PENALTY: f64 = 3.0;
/// Ceiling for the clock after time bonuses.
pub const MAX_TIME: f64 = 45.0;
/// Wall-clock period between two timer ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Seconds removed from the clock on each tick.
pub const TICK_DECREMENT: f64 = 1.0;
/// Quiet period before a typed query is sent to the search source.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
/// Queries shorter than this never reach the search source.
pub const MIN_QUERY_LEN: usize = 2;

/// Rules of a daily session: clock, penalties and scoring curves.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRules {
    /// Seconds on the clock at start.
    pub initial_time: f64,
    /// Seconds removed per new incorrect guess.
    pub time_penalty: f64,
    /// Clock ceiling.
    pub max_time: f64,
    /// Timer period.
    pub tick_interval: Duration,
    /// Seconds removed per tick.
    pub tick_decrement: f64,
    /// Point curve for correct guesses.
    pub scoring: ScoringCurve,
    /// Time bonus table for correct guesses.
    pub time_bonus: TimeBonusTable,
    /// Search debounce delay.
    pub search_debounce: Duration,
    /// Minimum query length for the search source.
    pub min_query_len: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            initial_time: INITIAL_TIME,
            time_penalty: TIME_PENALTY,
            max_time: MAX_TIME,
            tick_interval: TICK_INTERVAL,
            tick_decrement: TICK_DECREMENT,
            scoring: ScoringCurve::default(),
            time_bonus: TimeBonusTable::default(),
            search_debounce: SEARCH_DEBOUNCE,
            min_query_len: MIN_QUERY_LEN,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Game rules.
    pub rules: GameRules,
    /// Base URL of the challenge, search and stats API.
    pub api_base_url: String,
    /// Directory holding the persisted session files.
    pub storage_dir: PathBuf,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Some(url) = env::var(API_URL_ENV).ok().filter(|url| !url.trim().is_empty()) {
            config.api_base_url = url;
        }

        config
    }

    /// Parse a configuration document; absent fields keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rules: GameRules::default(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    rules: RawRules,
    api_base_url: Option<String>,
    storage_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
/// Rule overrides; every field is optional.
struct RawRules {
    initial_time: Option<f64>,
    time_penalty: Option<f64>,
    max_time: Option<f64>,
    tick_interval_ms: Option<u64>,
    tick_decrement: Option<f64>,
    search_debounce_ms: Option<u64>,
    min_query_len: Option<usize>,
    points_scale: Option<u32>,
    points_cap: Option<f64>,
    points_exponent: Option<f64>,
    min_points: Option<u32>,
    tier_very_well_known: Option<f64>,
    tier_well_known: Option<f64>,
    tier_moderate: Option<f64>,
    bonus_very_well_known: Option<u32>,
    bonus_well_known: Option<u32>,
    bonus_moderate: Option<u32>,
    bonus_obscure: Option<u32>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            rules: value.rules.into(),
            api_base_url: value.api_base_url.unwrap_or(defaults.api_base_url),
            storage_dir: value.storage_dir.unwrap_or(defaults.storage_dir),
        }
    }
}

impl From<RawRules> for GameRules {
    fn from(value: RawRules) -> Self {
        let defaults = GameRules::default();
        let default_bands = defaults.scoring.thresholds;

        let mut thresholds = TierThresholds {
            very_well_known: checked(
                "tier_very_well_known",
                value.tier_very_well_known,
                default_bands.very_well_known,
                non_negative,
            ),
            well_known: checked(
                "tier_well_known",
                value.tier_well_known,
                default_bands.well_known,
                non_negative,
            ),
            moderate: checked(
                "tier_moderate",
                value.tier_moderate,
                default_bands.moderate,
                non_negative,
            ),
        };
        if thresholds.very_well_known < thresholds.well_known
            || thresholds.well_known < thresholds.moderate
        {
            warn!(?thresholds, "tier thresholds must descend; using defaults");
            thresholds = default_bands;
        }

        let max_time = checked("max_time", value.max_time, defaults.max_time, positive);
        let mut initial_time = checked(
            "initial_time",
            value.initial_time,
            defaults.initial_time,
            positive,
        );
        if initial_time > max_time {
            warn!(initial_time, max_time, "initial_time exceeds max_time; clamping");
            initial_time = max_time;
        }

        let scale = checked("points_scale", value.points_scale, defaults.scoring.scale, |v| {
            v > 0
        });
        let mut min_points = value.min_points.unwrap_or(defaults.scoring.min_points);
        if min_points > scale {
            warn!(min_points, scale, "min_points exceeds points_scale; clamping");
            min_points = scale;
        }

        Self {
            initial_time,
            time_penalty: checked(
                "time_penalty",
                value.time_penalty,
                defaults.time_penalty,
                non_negative,
            ),
            max_time,
            tick_interval: Duration::from_millis(checked(
                "tick_interval_ms",
                value.tick_interval_ms,
                defaults.tick_interval.as_millis() as u64,
                |v| v > 0,
            )),
            tick_decrement: checked(
                "tick_decrement",
                value.tick_decrement,
                defaults.tick_decrement,
                positive,
            ),
            scoring: ScoringCurve {
                scale,
                cap: checked("points_cap", value.points_cap, defaults.scoring.cap, positive),
                exponent: checked(
                    "points_exponent",
                    value.points_exponent,
                    defaults.scoring.exponent,
                    positive,
                ),
                min_points,
                thresholds,
            },
            time_bonus: TimeBonusTable {
                thresholds,
                very_well_known: value
                    .bonus_very_well_known
                    .unwrap_or(defaults.time_bonus.very_well_known),
                well_known: value
                    .bonus_well_known
                    .unwrap_or(defaults.time_bonus.well_known),
                moderate: value
                    .bonus_moderate
                    .unwrap_or(defaults.time_bonus.moderate),
                obscure: value.bonus_obscure.unwrap_or(defaults.time_bonus.obscure),
            },
            search_debounce: value
                .search_debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.search_debounce),
            min_query_len: value.min_query_len.unwrap_or(defaults.min_query_len),
        }
    }
}

/// Take an override when `valid` accepts it, otherwise warn and keep `default`.
fn checked<T>(field: &'static str, value: Option<T>, default: T, valid: impl Fn(T) -> bool) -> T
where
    T: Copy + std::fmt::Debug,
{
    match value {
        Some(value) if valid(value) => value,
        Some(value) => {
            warn!(field, ?value, ?default, "rejected rule override; using default");
            default
        }
        None => default,
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
