pub mod card;
pub mod review;

pub use card::{Card, Deck};
pub use review::{CoarseRating, Quality, Rating, RatingError, RatingScale};
