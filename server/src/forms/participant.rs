use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::{lenient_text, required_text, FieldErrors, INVALID_EMAIL};
use crate::models::Participant;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantForm {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantDraft {
    pub name: String,
    pub email: String,
}

impl ParticipantForm {
    pub fn clean(&self) -> Result<ParticipantDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name);
        let email = required_text(&mut errors, "email", &self.email).filter(|email| {
            let valid = email.validate_email();
            if !valid {
                errors.add("email", INVALID_EMAIL);
            }
            valid
        });

        match (name, email) {
            (Some(name), Some(email)) if errors.is_empty() => Ok(ParticipantDraft { name, email }),
            _ => Err(errors),
        }
    }
}

impl From<&Participant> for ParticipantForm {
    fn from(participant: &Participant) -> Self {
        Self {
            name: participant.name.clone(),
            email: participant.email.clone(),
        }
    }
}
