use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Competition, CompetitionParticipant, CompetitionType, DifficultyInput};

/// Request payload for creating a new competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCompetitionRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub date: Option<NaiveDate>,

    /// Category key (`local`, `outside`, `national`, `international`) or a numeric coefficient
    #[serde(default)]
    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: DifficultyInput,
}

impl CreateCompetitionRequest {
    pub fn competition_type(&self) -> CompetitionType {
        CompetitionType::from(&self.difficulty)
    }
}

/// One runner's finish time within a competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ParticipantTime {
    /// Runner id
    pub id: i64,

    #[serde(default)]
    #[validate(custom(function = "validate_time"))]
    pub time: f64,
}

/// Request payload for adding (or re-timing) competition participants
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddParticipantsRequest {
    #[validate(length(min = 1, message = "At least one runner is required"), nested)]
    pub runners: Vec<ParticipantTime>,
}

impl AddParticipantsRequest {
    /// Each runner may appear only once per request
    pub fn validate_unique_runners(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        match self.runners.iter().find(|runner| !seen.insert(runner.id)) {
            Some(duplicate) => Err(format!("Runner {} is listed more than once", duplicate.id)),
            None => Ok(()),
        }
    }
}

/// Response containing competition details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionResponse {
    pub id: i64,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub difficulty: String,
    pub rated_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// Competition together with its participants, fastest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionDetailResponse {
    pub id: i64,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub difficulty: String,
    pub rated_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub participants: Vec<ParticipantDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantDetail {
    pub runner_id: i64,
    pub name: String,
    pub time: f64,
}

pub(crate) fn validate_difficulty(difficulty: &DifficultyInput) -> Result<(), validator::ValidationError> {
    let coefficient = CompetitionType::from(difficulty).coefficient();
    if coefficient.is_finite() && coefficient > 0.0 {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("invalid_difficulty");
        error.message = Some("Difficulty coefficient must be a positive number".into());
        Err(error)
    }
}

pub(crate) fn validate_time(time: f64) -> Result<(), validator::ValidationError> {
    if time.is_finite() && time >= 0.0 {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("invalid_time");
        error.message = Some("Time must be a non-negative number".into());
        Err(error)
    }
}

impl From<Competition> for CompetitionResponse {
    fn from(competition: Competition) -> Self {
        Self {
            id: competition.id,
            name: competition.name,
            date: competition.date,
            difficulty: competition.difficulty,
            rated_at: competition.rated_at,
            created_at: competition.created_at,
        }
    }
}

impl From<CompetitionParticipant> for ParticipantDetail {
    fn from(participant: CompetitionParticipant) -> Self {
        Self {
            runner_id: participant.runner_id,
            name: participant.name,
            time: participant.time,
        }
    }
}

impl CompetitionDetailResponse {
    pub fn new(competition: Competition, participants: Vec<CompetitionParticipant>) -> Self {
        Self {
            id: competition.id,
            name: competition.name,
            date: competition.date,
            difficulty: competition.difficulty,
            rated_at: competition.rated_at,
            created_at: competition.created_at,
            participants: participants.into_iter().map(ParticipantDetail::from).collect(),
        }
    }
}
