//! Activity vocabulary - tennis drills grouped by tier

use serde::{Deserialize, Serialize};

use crate::session::ValidationError;

/// Drill tiers used for balance rules
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Tier {
    Basic,    // Forehand, Backhand, Serve
    Advanced, // Slice, Dropshot, Volley, Return
}

impl Tier {
    pub fn emoji(&self) -> &'static str {
        match self {
            Tier::Basic => "🎾",
            Tier::Advanced => "🎯",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Basic => "Basic",
            Tier::Advanced => "Advanced",
        }
    }
}

/// Fundamental strokes
pub const BASIC_DRILLS: &[&str] = &["Forehand", "Backhand", "Serve"];

/// Touch, net and reaction work
pub const ADVANCED_DRILLS: &[&str] = &["Slice", "Dropshot", "Volley", "Return"];

/// Drill that loads the shoulder and arm the most
pub const HIGH_LOAD_DRILL: &str = "Serve";

pub const REACTION_DRILLS: &[&str] = &["Volley", "Return"];

pub const FINESSE_DRILLS: &[&str] = &["Slice", "Dropshot"];

/// The active set of activity tags plus the drills that trigger special rules.
///
/// Defaults to the tennis drill list; every tag can be overridden from the
/// environment (see [`crate::config::Config::from_env`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityVocabulary {
    pub basic: Vec<String>,
    pub advanced: Vec<String>,
    pub high_load: String,
    pub reaction: Vec<String>,
    pub finesse: Vec<String>,
}

impl Default for ActivityVocabulary {
    fn default() -> Self {
        Self {
            basic: to_owned(BASIC_DRILLS),
            advanced: to_owned(ADVANCED_DRILLS),
            high_load: HIGH_LOAD_DRILL.to_string(),
            reaction: to_owned(REACTION_DRILLS),
            finesse: to_owned(FINESSE_DRILLS),
        }
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

impl ActivityVocabulary {
    /// Check that the tiers are usable and every designated drill is a known tag
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.basic.is_empty() || self.advanced.is_empty() {
            return Err(ValidationError::Vocabulary(
                "both basic and advanced tiers need at least one activity".to_string(),
            ));
        }

        if let Some(dup) = self.basic.iter().find(|b| self.advanced.contains(b)) {
            return Err(ValidationError::Vocabulary(format!(
                "'{}' is listed in both tiers",
                dup
            )));
        }

        let designated = std::iter::once(&self.high_load)
            .chain(self.reaction.iter())
            .chain(self.finesse.iter());
        for name in designated {
            if self.tier_of(name).is_none() {
                return Err(ValidationError::Vocabulary(format!(
                    "designated activity '{}' is not in the vocabulary",
                    name
                )));
            }
        }

        Ok(())
    }

    /// All tags, basic tier first
    pub fn all(&self) -> Vec<&str> {
        self.basic
            .iter()
            .chain(self.advanced.iter())
            .map(String::as_str)
            .collect()
    }

    /// Tier of an activity (exact match)
    pub fn tier_of(&self, name: &str) -> Option<Tier> {
        if self.basic.iter().any(|b| b == name) {
            Some(Tier::Basic)
        } else if self.advanced.iter().any(|a| a == name) {
            Some(Tier::Advanced)
        } else {
            None
        }
    }

    /// Resolve user input to the canonical spelling (case-insensitive)
    pub fn canonical(&self, input: &str) -> Option<&str> {
        let input = input.trim();
        self.all()
            .into_iter()
            .find(|name| name.eq_ignore_ascii_case(input))
    }

    pub fn is_reaction(&self, name: &str) -> bool {
        self.reaction.iter().any(|r| r == name)
    }

    pub fn is_finesse(&self, name: &str) -> bool {
        self.finesse.iter().any(|f| f == name)
    }

    /// Comma-joined list of the basic tier, for suggestions
    pub fn basic_list(&self) -> String {
        self.basic.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary_is_valid() {
        assert!(ActivityVocabulary::default().validate().is_ok());
    }

    #[test]
    fn test_all_lists_basic_first() {
        let vocab = ActivityVocabulary::default();
        assert_eq!(
            vocab.all(),
            vec!["Forehand", "Backhand", "Serve", "Slice", "Dropshot", "Volley", "Return"]
        );
    }

    #[test]
    fn test_tier_of() {
        let vocab = ActivityVocabulary::default();
        assert_eq!(vocab.tier_of("Serve"), Some(Tier::Basic));
        assert_eq!(vocab.tier_of("Volley"), Some(Tier::Advanced));
        assert_eq!(vocab.tier_of("Lob"), None);
        // Exact match only
        assert_eq!(vocab.tier_of("serve"), None);
    }

    #[test]
    fn test_canonical_ignores_case_and_whitespace() {
        let vocab = ActivityVocabulary::default();
        assert_eq!(vocab.canonical("  dropshot "), Some("Dropshot"));
        assert_eq!(vocab.canonical("FOREHAND"), Some("Forehand"));
        assert_eq!(vocab.canonical("smash"), None);
    }

    #[test]
    fn test_designated_drills() {
        let vocab = ActivityVocabulary::default();
        assert_eq!(vocab.high_load, "Serve");
        assert!(vocab.is_reaction("Return"));
        assert!(vocab.is_finesse("Slice"));
        assert!(!vocab.is_finesse("Volley"));
    }

    #[test]
    fn test_validate_rejects_empty_tier() {
        let vocab = ActivityVocabulary {
            advanced: vec![],
            ..ActivityVocabulary::default()
        };
        assert!(matches!(vocab.validate(), Err(ValidationError::Vocabulary(_))));
    }

    #[test]
    fn test_validate_rejects_overlapping_tiers() {
        let mut vocab = ActivityVocabulary::default();
        vocab.advanced.push("Forehand".to_string());
        assert!(vocab.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_designated_drill() {
        let vocab = ActivityVocabulary {
            high_load: "Smash".to_string(),
            ..ActivityVocabulary::default()
        };
        let err = vocab.validate().unwrap_err();
        assert!(err.to_string().contains("Smash"));
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(Tier::Basic.name(), "Basic");
        assert!(!Tier::Advanced.emoji().is_empty());
    }
}
