use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Competition category, weighting how far one result can move a rating.
///
/// Unknown category keys fall back to a coefficient of 1.0; numeric difficulties
/// are carried verbatim in [`CompetitionType::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CompetitionType {
    #[default]
    Local,
    Outside,
    National,
    International,
    Custom(f64),
}

impl CompetitionType {
    pub fn coefficient(&self) -> f64 {
        match self {
            Self::Local => 1.0,
            Self::Outside => 1.2,
            Self::National => 1.5,
            Self::International => 2.0,
            Self::Custom(value) => *value,
        }
    }

    /// Resolve a stored difficulty key.
    pub fn from_key(key: &str) -> Self {
        let key = key.trim();
        match key.to_lowercase().as_str() {
            "local" => Self::Local,
            "outside" => Self::Outside,
            "national" => Self::National,
            "international" => Self::International,
            _ => match key.parse::<f64>() {
                Ok(value) if value.is_finite() => Self::Custom(value),
                _ => Self::Custom(1.0),
            },
        }
    }

    /// Key written to the `difficulty` column
    pub fn as_key(&self) -> String {
        match self {
            Self::Local => "local".to_string(),
            Self::Outside => "outside".to_string(),
            Self::National => "national".to_string(),
            Self::International => "international".to_string(),
            Self::Custom(value) => value.to_string(),
        }
    }
}

impl fmt::Display for CompetitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

/// Difficulty as accepted over the wire: a category key or a raw coefficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DifficultyInput {
    Coefficient(f64),
    Key(String),
}

impl From<&DifficultyInput> for CompetitionType {
    fn from(input: &DifficultyInput) -> Self {
        match input {
            DifficultyInput::Coefficient(value) => CompetitionType::Custom(*value),
            DifficultyInput::Key(key) => CompetitionType::from_key(key),
        }
    }
}

impl Default for DifficultyInput {
    fn default() -> Self {
        Self::Key("local".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys() {
        assert_eq!(CompetitionType::from_key("local").coefficient(), 1.0);
        assert_eq!(CompetitionType::from_key("outside").coefficient(), 1.2);
        assert_eq!(CompetitionType::from_key("National").coefficient(), 1.5);
        assert_eq!(CompetitionType::from_key(" international ").coefficient(), 2.0);
    }

    #[test]
    fn test_unknown_key_defaults_to_one() {
        assert_eq!(CompetitionType::from_key("hard"), CompetitionType::Custom(1.0));
        assert_eq!(CompetitionType::from_key("").coefficient(), 1.0);
    }

    #[test]
    fn test_numeric_key_is_used_verbatim() {
        assert_eq!(CompetitionType::from_key("1.75"), CompetitionType::Custom(1.75));
        assert_eq!(CompetitionType::from_key("NaN").coefficient(), 1.0);
    }

    #[test]
    fn test_key_survives_storage() {
        for competition_type in [
            CompetitionType::Local,
            CompetitionType::Outside,
            CompetitionType::National,
            CompetitionType::International,
            CompetitionType::Custom(0.8),
        ] {
            assert_eq!(CompetitionType::from_key(&competition_type.as_key()), competition_type);
        }
    }

    #[test]
    fn test_difficulty_input_accepts_number_or_key() {
        let number: DifficultyInput = serde_json::from_str("1.3").unwrap();
        assert_eq!(CompetitionType::from(&number), CompetitionType::Custom(1.3));

        let key: DifficultyInput = serde_json::from_str("\"international\"").unwrap();
        assert_eq!(CompetitionType::from(&key), CompetitionType::International);
    }
}
