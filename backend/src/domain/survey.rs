//! Survey responses, answer catalogues and timestamp normalisation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OperatorId, OrbPointId, SurveyResponseId};

/// Selectable answer shown on the survey form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurveyOption {
    pub id: &'static str,
    pub text: &'static str,
}

/// Answers to "how did you hear about us?", in display order.
pub const HOW_DID_YOU_HEAR_OPTIONS: &[SurveyOption] = &[
    SurveyOption {
        id: "1",
        text: "Redes sociales",
    },
    SurveyOption {
        id: "2",
        text: "Recomendación de un amigo",
    },
    SurveyOption {
        id: "3",
        text: "Anuncio",
    },
    SurveyOption {
        id: "4",
        text: "Evento o activación",
    },
    SurveyOption {
        id: "5",
        text: "Promotor",
    },
];

/// Answers to "interested in crypto?".
pub const INTERESTED_CRYPTO_OPTIONS: &[SurveyOption] = &[
    SurveyOption { id: "1", text: "Sí" },
    SurveyOption { id: "2", text: "No" },
];

/// Whether `id` names an option in `catalogue`.
#[must_use]
pub fn is_known_option(catalogue: &[SurveyOption], id: &str) -> bool {
    catalogue.iter().any(|option| option.id == id)
}

/// Append-only record of one submitted survey.
///
/// `operator_id` and `orb_point_id` are the binding active at submission
/// time; later reassignments or deletions do not touch stored responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub id: SurveyResponseId,
    pub how_did_you_hear_about: String,
    pub visiting_from: String,
    #[serde(default)]
    pub interested_crypto: Vec<String>,
    pub contact_number: String,
    pub operator_id: OperatorId,
    pub orb_point_id: OrbPointId,
    #[serde(with = "survey_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Answers captured by the survey form before they are bound to a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyAnswers {
    pub how_did_you_hear_about: String,
    pub visiting_from: String,
    pub interested_crypto: Vec<String>,
    pub contact_number: String,
}

/// Reasons a set of answers is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurveyValidationError {
    UnknownHowDidYouHear { value: String },
    UnknownSector { value: String },
    UnknownCryptoOption { value: String },
    EmptyContactNumber,
}

impl fmt::Display for SurveyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHowDidYouHear { value } => {
                write!(f, "howDidYouHearAbout {value} is not a known option")
            }
            Self::UnknownSector { value } => {
                write!(f, "visitingFrom {value} is not a sector of this OrbPoint")
            }
            Self::UnknownCryptoOption { value } => {
                write!(f, "interestedCrypto {value} is not a known option")
            }
            Self::EmptyContactNumber => write!(f, "contactNumber must not be empty"),
        }
    }
}

impl std::error::Error for SurveyValidationError {}

impl SurveyAnswers {
    /// Check catalogue membership; `sector_exists` decides `visiting_from`.
    pub fn validate(
        &self,
        sector_exists: impl Fn(&str) -> bool,
    ) -> Result<(), SurveyValidationError> {
        if !is_known_option(HOW_DID_YOU_HEAR_OPTIONS, &self.how_did_you_hear_about) {
            return Err(SurveyValidationError::UnknownHowDidYouHear {
                value: self.how_did_you_hear_about.clone(),
            });
        }
        if !sector_exists(&self.visiting_from) {
            return Err(SurveyValidationError::UnknownSector {
                value: self.visiting_from.clone(),
            });
        }
        if let Some(unknown) = self
            .interested_crypto
            .iter()
            .find(|value| !is_known_option(INTERESTED_CRYPTO_OPTIONS, value))
        {
            return Err(SurveyValidationError::UnknownCryptoOption {
                value: unknown.clone(),
            });
        }
        if self.contact_number.trim().is_empty() {
            return Err(SurveyValidationError::EmptyContactNumber);
        }
        Ok(())
    }
}

/// Serde adapter accepting either RFC 3339 strings or `{seconds, nanoseconds}`
/// objects as exported by document stores. Serialises as RFC 3339.
pub mod survey_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

    #[derive(Deserialize)]
    struct StoreTimestamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(DateTime<Utc>),
        Store(StoreTimestamp),
    }

    /// Serialise as an RFC 3339 string.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    /// Deserialise either accepted representation.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Text(value) => Ok(value),
            RawTimestamp::Store(StoreTimestamp {
                seconds,
                nanoseconds,
            }) => DateTime::from_timestamp(seconds, nanoseconds)
                .ok_or_else(|| D::Error::custom("timestamp out of range")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    fn answers() -> SurveyAnswers {
        SurveyAnswers {
            how_did_you_hear_about: "2".to_owned(),
            visiting_from: "Food court".to_owned(),
            interested_crypto: vec!["1".to_owned()],
            contact_number: "+51 999 000 111".to_owned(),
        }
    }

    #[test]
    fn valid_answers_pass() {
        assert_eq!(answers().validate(|name| name == "Food court"), Ok(()));
    }

    #[rstest]
    #[case::unknown_source(
        SurveyAnswers { how_did_you_hear_about: "9".to_owned(), ..answers() },
        SurveyValidationError::UnknownHowDidYouHear { value: "9".to_owned() }
    )]
    #[case::unknown_sector(
        SurveyAnswers { visiting_from: "Roof".to_owned(), ..answers() },
        SurveyValidationError::UnknownSector { value: "Roof".to_owned() }
    )]
    #[case::unknown_crypto(
        SurveyAnswers { interested_crypto: vec!["1".to_owned(), "3".to_owned()], ..answers() },
        SurveyValidationError::UnknownCryptoOption { value: "3".to_owned() }
    )]
    #[case::blank_contact(
        SurveyAnswers { contact_number: "  ".to_owned(), ..answers() },
        SurveyValidationError::EmptyContactNumber
    )]
    fn invalid_answers_are_rejected(
        #[case] candidate: SurveyAnswers,
        #[case] expected: SurveyValidationError,
    ) {
        assert_eq!(candidate.validate(|name| name == "Food court"), Err(expected));
    }

    fn response_json(timestamp: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "howDidYouHearAbout": "1",
            "visitingFrom": "Food court",
            "interestedCrypto": ["1"],
            "contactNumber": "999",
            "operatorId": "3fa85f64-5717-4562-b3fc-2c963f66afa7",
            "orbPointId": "3fa85f64-5717-4562-b3fc-2c963f66afa8",
            "timestamp": timestamp,
        })
    }

    #[rstest]
    #[case(json!("2024-05-01T12:00:00Z"))]
    #[case(json!("2024-05-01T07:00:00-05:00"))]
    #[case(json!({ "seconds": 1_714_564_800, "nanoseconds": 0 }))]
    #[case(json!({ "_seconds": 1_714_564_800, "_nanoseconds": 0 }))]
    fn timestamps_normalise_to_the_same_instant(#[case] raw: serde_json::Value) {
        let response: SurveyResponse =
            serde_json::from_value(response_json(raw)).expect("deserialise response");
        let expected = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid instant");
        assert_eq!(response.timestamp, expected);
    }

    #[test]
    fn timestamps_serialise_as_rfc3339() {
        let response: SurveyResponse = serde_json::from_value(response_json(
            json!({ "seconds": 1_714_564_800, "nanoseconds": 0 }),
        ))
        .expect("deserialise response");
        let value = serde_json::to_value(&response).expect("serialise response");
        assert_eq!(value["timestamp"], "2024-05-01T12:00:00Z");
    }
}
