mod competition;
mod competition_participant;
mod competition_type;
mod runner;

pub use competition::Competition;
pub use competition_participant::{CompetitionParticipant, RatingParticipant};
pub use competition_type::{CompetitionType, DifficultyInput};
pub use runner::{DEFAULT_RATING, Runner};
