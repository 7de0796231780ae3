use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::schedule::{Day, Shift, Slot};
use crate::schedule::slot_utils::TOKEN_SEPARATOR;

/// Reasons a submission is turned away before it reaches storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("Employee name is required")]
    EmptyName,

    /// Token did not split into exactly a day part and a shift part
    #[error("Malformed preference '{0}': expected Day-Shift, e.g. Monday-Morning")]
    MalformedToken(String),

    #[error("Unknown day '{0}'")]
    UnknownDay(String),

    #[error("Unknown shift '{0}'")]
    UnknownShift(String),
}

/// Preference submission request from the frontend or an import row
#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceSubmissionRequest {
    pub name: String,
    #[serde(default)]
    pub preferences: Vec<String>,
}

/// A submission that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceSubmission {
    pub name: String,
    pub slots: Vec<Slot>,
}

/// Parses a "Day-Shift" token such as "Monday-Morning" or "monday - evening"
pub fn parse_slot_token(token: &str) -> Result<Slot, IntakeError> {
    let parts: Vec<&str> = token.split(TOKEN_SEPARATOR).map(str::trim).collect();
    if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
        return Err(IntakeError::MalformedToken(token.to_string()));
    }

    let day: Day = parts[0].parse().map_err(IntakeError::UnknownDay)?;
    let shift: Shift = parts[1].parse().map_err(IntakeError::UnknownShift)?;
    Ok(Slot::new(day, shift))
}

/// Validates a submission, turning every token into a typed slot
/// Repeated tokens are kept; the scheduler ignores the repeats
pub fn validate_submission(req: &PreferenceSubmissionRequest) -> Result<PreferenceSubmission, IntakeError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(IntakeError::EmptyName);
    }

    let slots = req
        .preferences
        .iter()
        .map(|token| parse_slot_token(token))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PreferenceSubmission {
        name: name.to_string(),
        slots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, tokens: &[&str]) -> PreferenceSubmissionRequest {
        PreferenceSubmissionRequest {
            name: name.to_string(),
            preferences: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn parses_plain_token() {
        assert_eq!(
            parse_slot_token("Monday-Morning"),
            Ok(Slot::new(Day::Monday, Shift::Morning))
        );
    }

    #[test]
    fn tolerates_spacing_and_case() {
        assert_eq!(
            parse_slot_token("saturday - EVENING"),
            Ok(Slot::new(Day::Saturday, Shift::Evening))
        );
    }

    #[test]
    fn token_without_separator_is_rejected() {
        assert_eq!(
            parse_slot_token("Monday"),
            Err(IntakeError::MalformedToken("Monday".to_string()))
        );
    }

    #[test]
    fn token_with_empty_half_is_rejected() {
        assert!(matches!(parse_slot_token("Monday-"), Err(IntakeError::MalformedToken(_))));
        assert!(matches!(parse_slot_token("-Morning"), Err(IntakeError::MalformedToken(_))));
        assert!(matches!(parse_slot_token(""), Err(IntakeError::MalformedToken(_))));
    }

    #[test]
    fn token_with_extra_parts_is_rejected() {
        assert!(matches!(
            parse_slot_token("Monday-Morning-Evening"),
            Err(IntakeError::MalformedToken(_))
        ));
    }

    #[test]
    fn unknown_names_are_reported() {
        assert_eq!(
            parse_slot_token("Caturday-Morning"),
            Err(IntakeError::UnknownDay("Caturday".to_string()))
        );
        assert_eq!(
            parse_slot_token("Monday-Night"),
            Err(IntakeError::UnknownShift("Night".to_string()))
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(
            validate_submission(&request("   ", &["Monday-Morning"])),
            Err(IntakeError::EmptyName)
        );
    }

    #[test]
    fn one_bad_token_rejects_the_whole_submission() {
        let result = validate_submission(&request("Ada", &["Monday-Morning", "Tuesday"]));
        assert_eq!(result, Err(IntakeError::MalformedToken("Tuesday".to_string())));
    }

    #[test]
    fn valid_submission_keeps_order_and_repeats() {
        let submission = validate_submission(&request(
            " Ada ",
            &["Friday-Evening", "Monday-Morning", "Friday-Evening"],
        ))
        .unwrap();
        assert_eq!(submission.name, "Ada");
        assert_eq!(
            submission.slots,
            vec![
                Slot::new(Day::Friday, Shift::Evening),
                Slot::new(Day::Monday, Shift::Morning),
                Slot::new(Day::Friday, Shift::Evening),
            ]
        );
    }

    #[test]
    fn submission_without_preferences_is_accepted() {
        let submission = validate_submission(&request("Grace", &[])).unwrap();
        assert!(submission.slots.is_empty());
    }

    #[test]
    fn request_deserializes_without_preferences_field() {
        let req: PreferenceSubmissionRequest = serde_json::from_str(r#"{"name":"Linus"}"#).unwrap();
        assert!(req.preferences.is_empty());
    }
}
