//! Interval scheduling for both rating scales.
//!
//! Coarse (three buttons):
//! - again: 1 day
//! - good: current interval x 2 (at least 1)
//! - easy: current interval x 3 (at least 1)
//!
//! Fine (0-5 quality):
//! - below 3: 1 day
//! - first success: 1 day, second success: 3 days
//! - afterwards: current interval x (1.5 + (quality - 3) x 0.2)
//!
//! Every result is capped at `max_interval_days` and the due date is
//! `now + interval` days, keeping the time of day from `now`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CoarseRating, Quality, Rating, RatingScale};

pub const DEFAULT_MAX_INTERVAL_DAYS: u32 = 365;

/// Upper bound accepted for `max_interval_days` (100 years).
const MAX_ALLOWED_CAP_DAYS: u32 = 36_500;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerConfigError {
  #[error("{field} must be {expected}, got {value}")]
  Invalid {
    field: &'static str,
    expected: &'static str,
    value: String,
  },
}

fn invalid(field: &'static str, expected: &'static str, value: impl ToString) -> SchedulerConfigError {
  SchedulerConfigError::Invalid {
    field,
    expected,
    value: value.to_string(),
  }
}

/// Growth policy shared by both scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
  /// Coarse "good" multiplier.
  pub good_multiplier: u32,
  /// Coarse "easy" multiplier.
  pub easy_multiplier: u32,
  /// Lowest fine quality that counts as recalled.
  pub pass_threshold: u8,
  /// Fine interval after the second successful review.
  pub second_interval: u32,
  /// Fine growth factor at the pass threshold.
  pub base_factor: f64,
  /// Extra fine growth per quality point above the threshold.
  pub factor_step: f64,
  /// Cap applied to every computed interval, on both scales.
  pub max_interval_days: u32,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      good_multiplier: 2,
      easy_multiplier: 3,
      pass_threshold: 3,
      second_interval: 3,
      base_factor: 1.5,
      factor_step: 0.2,
      max_interval_days: DEFAULT_MAX_INTERVAL_DAYS,
    }
  }
}

impl SchedulerConfig {
  pub fn validate(&self) -> Result<(), SchedulerConfigError> {
    if self.good_multiplier < 1 {
      return Err(invalid("good_multiplier", ">= 1", self.good_multiplier));
    }
    if self.easy_multiplier < self.good_multiplier {
      return Err(invalid("easy_multiplier", ">= good_multiplier", self.easy_multiplier));
    }
    if self.pass_threshold > Quality::MAX {
      return Err(invalid("pass_threshold", "<= 5", self.pass_threshold));
    }
    if self.second_interval < 1 {
      return Err(invalid("second_interval", ">= 1", self.second_interval));
    }
    if !(self.base_factor.is_finite() && self.base_factor >= 1.0) {
      return Err(invalid("base_factor", "a finite number >= 1.0", self.base_factor));
    }
    if !(self.factor_step.is_finite() && self.factor_step >= 0.0) {
      return Err(invalid("factor_step", "a finite number >= 0.0", self.factor_step));
    }
    if self.max_interval_days < 1 || self.max_interval_days > MAX_ALLOWED_CAP_DAYS {
      return Err(invalid("max_interval_days", "between 1 and 36500", self.max_interval_days));
    }
    Ok(())
  }
}

/// Proposed new scheduling state. The caller writes both fields back together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleResult {
  pub interval_days: u32,
  pub next_review: DateTime<Utc>,
}

/// Interval a single button would produce, for labelling rating buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalPreview {
  pub rating: String,
  pub interval_days: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
  config: SchedulerConfig,
}

impl Scheduler {
  pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerConfigError> {
    config.validate()?;
    Ok(Self { config })
  }

  /// Pure: same inputs always give the same result.
  pub fn compute_next(&self, current_interval: u32, rating: Rating, now: DateTime<Utc>) -> ScheduleResult {
    let raw = match rating {
      Rating::Coarse(r) => self.coarse_interval(current_interval, r),
      Rating::Fine(q) => self.fine_interval(current_interval, q),
    };
    let interval_days = raw.max(1).min(self.config.max_interval_days);

    ScheduleResult {
      interval_days,
      next_review: now + Duration::days(i64::from(interval_days)),
    }
  }

  /// Interval each button of `scale` would give a card at `current_interval`.
  pub fn preview(&self, current_interval: u32, scale: RatingScale) -> Vec<IntervalPreview> {
    let ratings: Vec<Rating> = match scale {
      RatingScale::Coarse => CoarseRating::ALL.into_iter().map(Rating::Coarse).collect(),
      RatingScale::Fine => Quality::all().map(Rating::Fine).collect(),
    };
    // Intervals do not depend on the clock, so any instant works here.
    let epoch = DateTime::<Utc>::UNIX_EPOCH;

    ratings
      .into_iter()
      .map(|rating| IntervalPreview {
        rating: rating.label(),
        interval_days: self.compute_next(current_interval, rating, epoch).interval_days,
      })
      .collect()
  }

  fn coarse_interval(&self, current: u32, rating: CoarseRating) -> u32 {
    match rating {
      CoarseRating::Again => 1,
      CoarseRating::Good => current.saturating_mul(self.config.good_multiplier).max(1),
      CoarseRating::Easy => current.saturating_mul(self.config.easy_multiplier).max(1),
    }
  }

  fn fine_interval(&self, current: u32, quality: Quality) -> u32 {
    let q = quality.value();
    if q < self.config.pass_threshold {
      return 1;
    }

    match current {
      0 => 1,
      1 => self.config.second_interval,
      _ => {
        let factor = self.config.base_factor + f64::from(q - self.config.pass_threshold) * self.config.factor_step;
        // `as` saturates on overflow; the cap is applied afterwards.
        (f64::from(current) * factor).round() as u32
      }
    }
  }
}
