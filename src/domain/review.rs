use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Rejected rating input. Out-of-range values are refused, never clamped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
  #[error("quality {0} is outside the 0-{max} scale", max = Quality::MAX)]
  QualityOutOfRange(u8),
  #[error("unknown rating '{0}' (expected again, good or easy)")]
  UnknownRating(String),
}

/// Three-button scale: again / good / easy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoarseRating {
  Again,
  Good,
  Easy,
}

impl CoarseRating {
  pub const ALL: [CoarseRating; 3] = [Self::Again, Self::Good, Self::Easy];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Again => "again",
      Self::Good => "good",
      Self::Easy => "easy",
    }
  }
}

impl FromStr for CoarseRating {
  type Err = RatingError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "again" => Ok(Self::Again),
      "good" => Ok(Self::Good),
      "easy" => Ok(Self::Easy),
      other => Err(RatingError::UnknownRating(other.to_string())),
    }
  }
}

/// Fine-grained recall quality on the SM-2 style 0-5 scale.
///
/// - 0: complete blackout
/// - 1-2: incorrect, the answer felt familiar once shown
/// - 3: correct with serious difficulty
/// - 4: correct after hesitation
/// - 5: perfect recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
  pub const MAX: u8 = 5;

  pub fn new(value: u8) -> Result<Self, RatingError> {
    if value > Self::MAX {
      return Err(RatingError::QualityOutOfRange(value));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> u8 {
    self.0
  }

  pub fn all() -> impl Iterator<Item = Quality> {
    (0..=Self::MAX).map(Quality)
  }
}

impl TryFrom<u8> for Quality {
  type Error = RatingError;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<Quality> for u8 {
  fn from(quality: Quality) -> Self {
    quality.0
  }
}

/// Which button set the caller presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingScale {
  Coarse,
  Fine,
}

/// A self-assessment on either scale. Both feed the same scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
  Coarse(CoarseRating),
  Fine(Quality),
}

impl Rating {
  pub fn quality(value: u8) -> Result<Self, RatingError> {
    Quality::new(value).map(Self::Fine)
  }

  /// Short label for logs: "good", "q4".
  pub fn label(&self) -> String {
    match self {
      Self::Coarse(r) => r.as_str().to_string(),
      Self::Fine(q) => format!("q{}", q.value()),
    }
  }
}

impl From<CoarseRating> for Rating {
  fn from(rating: CoarseRating) -> Self {
    Self::Coarse(rating)
  }
}

impl From<Quality> for Rating {
  fn from(quality: Quality) -> Self {
    Self::Fine(quality)
  }
}
