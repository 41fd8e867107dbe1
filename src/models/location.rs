use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;
use crate::models::trip::DateGranularity;

/// Kinds of itinerary locations. The URL token ("trailhead", "camp", ...)
/// is what clients send; the two-character code is what the store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Trailhead,
    Objective,
    Camp,
    Endpoint,
}

impl LocationType {
    /// Resolves a case-insensitive URL token. Unknown tokens are an
    /// error, never a silent default.
    pub fn from_token(token: &str) -> Result<Self, AppError> {
        match token.to_ascii_lowercase().as_str() {
            "trailhead" => Ok(LocationType::Trailhead),
            "objective" => Ok(LocationType::Objective),
            "camp" => Ok(LocationType::Camp),
            "endpoint" => Ok(LocationType::Endpoint),
            other => Err(AppError::UnknownLocationType(other.to_string())),
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            LocationType::Trailhead => "trailhead",
            LocationType::Objective => "objective",
            LocationType::Camp => "camp",
            LocationType::Endpoint => "endpoint",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LocationType::Trailhead => "TH",
            LocationType::Objective => "OB",
            LocationType::Camp => "CA",
            LocationType::Endpoint => "EP",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TH" => Some(LocationType::Trailhead),
            "OB" => Some(LocationType::Objective),
            "CA" => Some(LocationType::Camp),
            "EP" => Some(LocationType::Endpoint),
            _ => None,
        }
    }

    /// Camps sit on nights; everything else on days.
    pub fn granularity(&self) -> DateGranularity {
        match self {
            LocationType::Camp => DateGranularity::Night,
            _ => DateGranularity::Day,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TripLocation {
    pub id: i64,
    pub trip_id: i64,
    pub location_type: String,
    pub date: NaiveDate,
    pub details: Option<String>,
}

impl TripLocation {
    pub fn kind(&self) -> Option<LocationType> {
        LocationType::from_code(&self.location_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_resolve_case_insensitively() {
        assert_eq!(LocationType::from_token("Camp").unwrap(), LocationType::Camp);
        assert_eq!(
            LocationType::from_token("TRAILHEAD").unwrap(),
            LocationType::Trailhead
        );
        assert_eq!(
            LocationType::from_token("endpoint").unwrap(),
            LocationType::Endpoint
        );
    }

    #[test]
    fn unknown_token_is_an_error() {
        let err = LocationType::from_token("summit").unwrap_err();
        assert!(matches!(err, AppError::UnknownLocationType(ref t) if t == "summit"));
    }

    #[test]
    fn codes_round_trip() {
        for kind in [
            LocationType::Trailhead,
            LocationType::Objective,
            LocationType::Camp,
            LocationType::Endpoint,
        ] {
            assert_eq!(LocationType::from_code(kind.code()), Some(kind));
        }
        assert_eq!(LocationType::from_code("XX"), None);
    }

    #[test]
    fn only_camps_use_night_granularity() {
        assert_eq!(LocationType::Camp.granularity(), DateGranularity::Night);
        assert_eq!(LocationType::Trailhead.granularity(), DateGranularity::Day);
        assert_eq!(LocationType::Objective.granularity(), DateGranularity::Day);
        assert_eq!(LocationType::Endpoint.granularity(), DateGranularity::Day);
    }
}
