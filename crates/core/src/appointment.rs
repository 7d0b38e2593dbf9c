//! Appointment draft types and validation

use serde::{Deserialize, Serialize};

/// Urgency of a requested appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse a model-provided urgency string; anything unrecognized
    /// (including empty) falls back to `Low`.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Low,
        }
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Required fields of an appointment draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentField {
    PatientName,
    Date,
    Time,
}

impl AppointmentField {
    /// Bengali label used when prompting the caller for missing details
    pub fn caller_label(&self) -> &'static str {
        match self {
            Self::PatientName => "নাম",
            Self::Date => "তারিখ",
            Self::Time => "সময়",
        }
    }
}

/// Appointment data extracted from model output, before validation
/// and persistence.
///
/// The model is instructed to return empty strings for unknown fields,
/// so all fields deserialize permissively.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppointmentDraft {
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub phone: String,
    /// Calendar date, YYYY-MM-DD
    #[serde(default)]
    pub date: String,
    /// Local time of day, HH:MM
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Raw urgency string as emitted by the model; coerced at commit time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
}

impl AppointmentDraft {
    /// A draft is committable only when patient name, date and time are
    /// all non-empty. Anything less is a partial draft and must not be
    /// persisted.
    pub fn is_committable(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Which of the required fields are still missing
    pub fn missing_fields(&self) -> Vec<AppointmentField> {
        let mut missing = Vec::new();
        if self.patient_name.trim().is_empty() {
            missing.push(AppointmentField::PatientName);
        }
        if self.date.trim().is_empty() {
            missing.push(AppointmentField::Date);
        }
        if self.time.trim().is_empty() {
            missing.push(AppointmentField::Time);
        }
        missing
    }

    /// Effective urgency with the default applied
    pub fn urgency(&self) -> UrgencyLevel {
        self.urgency_level
            .as_deref()
            .map(UrgencyLevel::parse_or_default)
            .unwrap_or_default()
    }
}

/// A doctor available at the chamber, injected into session context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub name: String,
    pub specialty: String,
}

impl Doctor {
    pub fn new(name: impl Into<String>, specialty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specialty: specialty.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_parse() {
        assert_eq!(UrgencyLevel::parse_or_default("high"), UrgencyLevel::High);
        assert_eq!(UrgencyLevel::parse_or_default("HIGH"), UrgencyLevel::High);
        assert_eq!(
            UrgencyLevel::parse_or_default("medium"),
            UrgencyLevel::Medium
        );
        assert_eq!(UrgencyLevel::parse_or_default(""), UrgencyLevel::Low);
        assert_eq!(UrgencyLevel::parse_or_default("urgent"), UrgencyLevel::Low);
    }

    #[test]
    fn test_committable_requires_all_fields() {
        let draft = AppointmentDraft {
            patient_name: "Jane Doe".to_string(),
            phone: "555-0101".to_string(),
            date: "2024-01-02".to_string(),
            time: "15:00".to_string(),
            ..Default::default()
        };
        assert!(draft.is_committable());

        let partial = AppointmentDraft {
            patient_name: "Jane Doe".to_string(),
            date: "2024-01-02".to_string(),
            ..Default::default()
        };
        assert!(!partial.is_committable());
        assert_eq!(partial.missing_fields(), vec![AppointmentField::Time]);
    }

    #[test]
    fn test_whitespace_only_is_missing() {
        let draft = AppointmentDraft {
            patient_name: "  ".to_string(),
            date: "2024-01-02".to_string(),
            time: "15:00".to_string(),
            ..Default::default()
        };
        assert!(!draft.is_committable());
        assert_eq!(
            draft.missing_fields(),
            vec![AppointmentField::PatientName]
        );
    }

    #[test]
    fn test_draft_urgency_default() {
        let draft = AppointmentDraft::default();
        assert_eq!(draft.urgency(), UrgencyLevel::Low);

        let draft = AppointmentDraft {
            urgency_level: Some("high".to_string()),
            ..Default::default()
        };
        assert_eq!(draft.urgency(), UrgencyLevel::High);
    }

    #[test]
    fn test_draft_deserializes_with_missing_keys() {
        let draft: AppointmentDraft =
            serde_json::from_str(r#"{"patient_name": "Rahim"}"#).unwrap();
        assert_eq!(draft.patient_name, "Rahim");
        assert!(draft.date.is_empty());
        assert!(draft.urgency_level.is_none());
    }
}
