use crate::utils::error::{RaffleError, Result};
use crate::utils::validation::{validate_email, validate_required_pair};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// 產生 `p-<毫秒時間戳>-<遞增計數>` 形式的 id，同一行程內不重複
fn generate_id() -> String {
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("p-{}-{}", chrono::Utc::now().timestamp_millis(), n)
}

/// Untrusted participant input, and the persisted shape of a participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ParticipantData {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A registered participant. Fields are validated once in [`Participant::new`]
/// and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    id: String,
    name: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
}

impl Participant {
    pub fn new(data: ParticipantData) -> Result<Self> {
        let (name, email) = validate_required_pair(&data.name, &data.email)?;
        validate_email(email)?;

        let id = match data.id {
            Some(id) if id.trim().is_empty() => {
                return Err(RaffleError::validation("participant id cannot be empty"));
            }
            Some(id) => id,
            None => generate_id(),
        };

        let phone = data
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Case-insensitive email comparison, the participant uniqueness key.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.trim().to_lowercase()
    }
}

impl From<&Participant> for ParticipantData {
    fn from(p: &Participant) -> Self {
        Self {
            id: Some(p.id.clone()),
            name: p.name.clone(),
            email: p.email.clone(),
            phone: p.phone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_data() -> ParticipantData {
        ParticipantData::new(" Ana García ", "ana.garcia@test.com ").with_phone("123456789")
    }

    #[test]
    fn test_creates_participant_with_trimmed_fields() {
        let p = Participant::new(valid_data()).unwrap();

        assert!(p.id().starts_with("p-"));
        assert_eq!(p.name(), "Ana García");
        assert_eq!(p.email(), "ana.garcia@test.com");
        assert_eq!(p.phone(), Some("123456789"));
    }

    #[test]
    fn test_phone_is_optional() {
        let p = Participant::new(ParticipantData::new("Luis Sanz", "luis@test.com")).unwrap();
        assert_eq!(p.name(), "Luis Sanz");
        assert_eq!(p.phone(), None);

        let blank = Participant::new(ParticipantData::new("Luis", "luis@test.com").with_phone("  "))
            .unwrap();
        assert_eq!(blank.phone(), None);
    }

    #[test]
    fn test_whitespace_name_or_email_is_rejected() {
        for data in [
            ParticipantData { name: " ".into(), ..valid_data() },
            ParticipantData { email: " ".into(), ..valid_data() },
        ] {
            match Participant::new(data) {
                Err(RaffleError::Validation { message }) => {
                    assert_eq!(message, "name and email are required")
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_malformed_email_is_rejected() {
        for email in ["emailinvalido", "no-domain@host", "@test.com", "a b@test.com"] {
            let data = ParticipantData { email: email.into(), ..valid_data() };
            match Participant::new(data) {
                Err(RaffleError::Validation { message }) => assert_eq!(message, "invalid email"),
                other => panic!("{email}: expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_keeps_supplied_id() {
        let p = Participant::new(valid_data().with_id("p-custom-123")).unwrap();
        assert_eq!(p.id(), "p-custom-123");
        assert_eq!(p.name(), "Ana García");
    }

    #[test]
    fn test_blank_supplied_id_is_rejected() {
        assert!(matches!(
            Participant::new(valid_data().with_id("  ")),
            Err(RaffleError::Validation { .. })
        ));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Participant::new(ParticipantData::new("A", "a@test.com")).unwrap();
        let b = Participant::new(ParticipantData::new("B", "b@test.com")).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_email_comparison_ignores_case() {
        let p = Participant::new(ParticipantData::new("Paco", "paco@test.com")).unwrap();
        assert!(p.has_email("PACO@test.com"));
        assert!(!p.has_email("laura@test.com"));
    }

    #[test]
    fn test_round_trips_through_data() {
        let p = Participant::new(valid_data()).unwrap();
        let again = Participant::new(ParticipantData::from(&p)).unwrap();
        assert_eq!(p, again);
    }
}
