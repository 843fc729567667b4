//! Session record - yesterday's training facts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activities::ActivityVocabulary;

/// Rejected session input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one activity is required")]
    NoActivities,

    #[error("unknown activity '{name}'. Choose from: {allowed}")]
    UnknownActivity { name: String, allowed: String },

    #[error("invalid {field} '{value}'. Choose from: {allowed}")]
    InvalidOption {
        field: &'static str,
        value: String,
        allowed: String,
    },

    #[error("invalid session JSON: {0}")]
    Json(String),

    #[error("invalid activity vocabulary: {0}")]
    Vocabulary(String),
}

/// How hard yesterday's session was
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Intensity {
    Light,
    Moderate,
    Intense,
}

impl Intensity {
    pub const ALL: [Intensity; 3] = [Intensity::Light, Intensity::Moderate, Intensity::Intense];

    pub fn label(&self) -> &'static str {
        match self {
            Intensity::Light => "Light",
            Intensity::Moderate => "Moderate",
            Intensity::Intense => "Intense",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Intensity::Light => "🌱",
            Intensity::Moderate => "⚡",
            Intensity::Intense => "🔥",
        }
    }
}

/// Self-rated technique quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormQuality {
    Poor,
    Average,
    Good,
    Excellent,
}

impl FormQuality {
    pub const ALL: [FormQuality; 4] = [
        FormQuality::Poor,
        FormQuality::Average,
        FormQuality::Good,
        FormQuality::Excellent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormQuality::Poor => "Poor",
            FormQuality::Average => "Average",
            FormQuality::Good => "Good",
            FormQuality::Excellent => "Excellent",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            FormQuality::Poor => "📉",
            FormQuality::Average => "➖",
            FormQuality::Good => "📈",
            FormQuality::Excellent => "🏆",
        }
    }
}

/// Tiredness after the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Fatigue {
    Low,
    Medium,
    High,
}

impl Fatigue {
    pub const ALL: [Fatigue; 3] = [Fatigue::Low, Fatigue::Medium, Fatigue::High];

    pub fn label(&self) -> &'static str {
        match self {
            Fatigue::Low => "Low",
            Fatigue::Medium => "Medium",
            Fatigue::High => "High",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Fatigue::Low => "😊",
            Fatigue::Medium => "😐",
            Fatigue::High => "😴",
        }
    }
}

fn parse_label<T: Copy>(
    field: &'static str,
    input: &str,
    all: &[T],
    label: fn(&T) -> &'static str,
) -> Result<T, ValidationError> {
    let input = input.trim();
    all.iter()
        .find(|v| label(v).eq_ignore_ascii_case(input))
        .copied()
        .ok_or_else(|| ValidationError::InvalidOption {
            field,
            value: input.to_string(),
            allowed: all.iter().map(label).collect::<Vec<_>>().join(", "),
        })
}

impl FromStr for Intensity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("intensity", s, &Intensity::ALL, Intensity::label)
    }
}

impl FromStr for FormQuality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("form quality", s, &FormQuality::ALL, FormQuality::label)
    }
}

impl FromStr for Fatigue {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("fatigue", s, &Fatigue::ALL, Fatigue::label)
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for FormQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Fatigue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One past training session. Only constructible through validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    activities: Vec<String>,
    intensity: Intensity,
    form_quality: FormQuality,
    fatigue: Fatigue,
}

impl SessionRecord {
    /// Validate activities against the vocabulary and build a record.
    ///
    /// Activity names are matched case-insensitively and stored in their
    /// canonical spelling; repeated tags are collapsed, first occurrence wins.
    pub fn new<I, S>(
        vocabulary: &ActivityVocabulary,
        activities: I,
        intensity: Intensity,
        form_quality: FormQuality,
        fatigue: Fatigue,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical: Vec<String> = Vec::new();
        for raw in activities {
            let raw = raw.as_ref();
            let name = vocabulary
                .canonical(raw)
                .ok_or_else(|| ValidationError::UnknownActivity {
                    name: raw.trim().to_string(),
                    allowed: vocabulary.all().join(", "),
                })?;
            if !canonical.iter().any(|c| c == name) {
                canonical.push(name.to_string());
            }
        }

        if canonical.is_empty() {
            return Err(ValidationError::NoActivities);
        }

        Ok(Self {
            activities: canonical,
            intensity,
            form_quality,
            fatigue,
        })
    }

    /// Build from free-text labels (e.g. CLI flags)
    pub fn from_labels<I, S>(
        vocabulary: &ActivityVocabulary,
        activities: I,
        intensity: &str,
        form_quality: &str,
        fatigue: &str,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            vocabulary,
            activities,
            intensity.parse()?,
            form_quality.parse()?,
            fatigue.parse()?,
        )
    }

    /// Parse a JSON session description
    pub fn from_json(vocabulary: &ActivityVocabulary, json: &str) -> Result<Self, ValidationError> {
        let input: SessionInput =
            serde_json::from_str(json).map_err(|e| ValidationError::Json(e.to_string()))?;
        input.into_record(vocabulary)
    }

    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    pub fn form_quality(&self) -> FormQuality {
        self.form_quality
    }

    pub fn fatigue(&self) -> Fatigue {
        self.fatigue
    }

    /// Activities as a comma-joined list
    pub fn activity_list(&self) -> String {
        self.activities.join(", ")
    }

    pub fn has_activity(&self, name: &str) -> bool {
        self.activities.iter().any(|a| a == name)
    }
}

/// Unvalidated session data as it appears in JSON input and plan exports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInput {
    #[serde(alias = "drills_trained", alias = "drills")]
    pub activities: Vec<String>,
    pub intensity: String,
    #[serde(alias = "form_quality", alias = "form_rating", alias = "form")]
    pub form_quality: String,
    #[serde(alias = "fatigue_level")]
    pub fatigue: String,
}

impl SessionInput {
    pub fn into_record(
        self,
        vocabulary: &ActivityVocabulary,
    ) -> Result<SessionRecord, ValidationError> {
        SessionRecord::from_labels(
            vocabulary,
            &self.activities,
            &self.intensity,
            &self.form_quality,
            &self.fatigue,
        )
    }
}

impl From<&SessionRecord> for SessionInput {
    fn from(record: &SessionRecord) -> Self {
        Self {
            activities: record.activities.clone(),
            intensity: record.intensity.label().to_string(),
            form_quality: record.form_quality.label().to_string(),
            fatigue: record.fatigue.label().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> ActivityVocabulary {
        ActivityVocabulary::default()
    }

    #[test]
    fn test_new_valid_record() {
        let record = SessionRecord::new(
            &vocab(),
            ["Forehand", "Serve"],
            Intensity::Moderate,
            FormQuality::Good,
            Fatigue::Medium,
        )
        .unwrap();

        assert_eq!(record.activities(), &["Forehand".to_string(), "Serve".to_string()]);
        assert_eq!(record.intensity(), Intensity::Moderate);
        assert_eq!(record.form_quality(), FormQuality::Good);
        assert_eq!(record.fatigue(), Fatigue::Medium);
        assert_eq!(record.activity_list(), "Forehand, Serve");
    }

    #[test]
    fn test_empty_activities_rejected() {
        let result = SessionRecord::new(
            &vocab(),
            Vec::<String>::new(),
            Intensity::Light,
            FormQuality::Good,
            Fatigue::Low,
        );
        assert_eq!(result, Err(ValidationError::NoActivities));
    }

    #[test]
    fn test_unknown_activity_rejected() {
        let result = SessionRecord::new(
            &vocab(),
            ["Forehand", "Smash"],
            Intensity::Light,
            FormQuality::Good,
            Fatigue::Low,
        );
        match result {
            Err(ValidationError::UnknownActivity { name, allowed }) => {
                assert_eq!(name, "Smash");
                assert!(allowed.contains("Volley"));
            }
            other => panic!("expected UnknownActivity, got {:?}", other),
        }
    }

    #[test]
    fn test_activities_canonicalized_and_deduplicated() {
        let record = SessionRecord::new(
            &vocab(),
            ["volley", "Serve", "VOLLEY"],
            Intensity::Light,
            FormQuality::Good,
            Fatigue::Low,
        )
        .unwrap();
        assert_eq!(record.activity_list(), "Volley, Serve");
        assert!(record.has_activity("Volley"));
        assert!(!record.has_activity("volley"));
    }

    #[test]
    fn test_enum_parsing_case_insensitive() {
        assert_eq!("intense".parse::<Intensity>().unwrap(), Intensity::Intense);
        assert_eq!(" Excellent ".parse::<FormQuality>().unwrap(), FormQuality::Excellent);
        assert_eq!("HIGH".parse::<Fatigue>().unwrap(), Fatigue::High);
    }

    #[test]
    fn test_enum_parsing_rejects_unknown_label() {
        let err = "extreme".parse::<Intensity>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidOption {
                field: "intensity",
                value: "extreme".to_string(),
                allowed: "Light, Moderate, Intense".to_string(),
            }
        );
    }

    #[test]
    fn test_enums_are_ordered() {
        assert!(Intensity::Light < Intensity::Intense);
        assert!(FormQuality::Poor < FormQuality::Excellent);
        assert!(Fatigue::Medium < Fatigue::High);
    }

    #[test]
    fn test_from_json_with_original_field_names() {
        let json = r#"{"drills_trained": ["Forehand", "Backhand"], "intensity": "Moderate", "form_rating": "Good", "fatigue_level": "Medium"}"#;
        let record = SessionRecord::from_json(&vocab(), json).unwrap();
        assert_eq!(record.activity_list(), "Forehand, Backhand");
        assert_eq!(record.form_quality(), FormQuality::Good);
    }

    #[test]
    fn test_from_json_camel_case() {
        let json = r#"{"activities": ["Slice"], "intensity": "light", "formQuality": "poor", "fatigue": "low"}"#;
        let record = SessionRecord::from_json(&vocab(), json).unwrap();
        assert_eq!(record.form_quality(), FormQuality::Poor);
    }

    #[test]
    fn test_from_json_missing_field() {
        let json = r#"{"activities": ["Slice"], "intensity": "Light"}"#;
        let err = SessionRecord::from_json(&vocab(), json).unwrap_err();
        assert!(matches!(err, ValidationError::Json(_)));
    }

    #[test]
    fn test_session_input_round_trip() {
        let record =
            SessionRecord::from_labels(&vocab(), ["Return"], "Intense", "Average", "High").unwrap();
        let input = SessionInput::from(&record);
        assert_eq!(input.form_quality, "Average");
        assert_eq!(input.into_record(&vocab()).unwrap(), record);
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocabulary = ActivityVocabulary {
            basic: vec!["Jab".to_string()],
            advanced: vec!["Hook".to_string()],
            high_load: "Hook".to_string(),
            reaction: vec![],
            finesse: vec![],
        };
        assert!(SessionRecord::from_labels(&vocabulary, ["jab"], "Light", "Good", "Low").is_ok());
        let result = SessionRecord::from_labels(&vocabulary, ["Forehand"], "Light", "Good", "Low");
        assert!(result.is_err());
    }
}
