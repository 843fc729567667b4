//! Response parser - pulls the four labelled sections out of free-form coach text
//!
//! Two phases per section: the first label synonym (in priority order) that
//! occurs anywhere in the text fixes where the section body starts; the body
//! then runs up to the nearest following label of any *other* section, or to
//! the end of the text.

use serde::{Deserialize, Serialize};

/// The four sections of structured advice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Plan,
    Goals,
    Warnings,
    Recovery,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Plan,
        Section::Goals,
        Section::Warnings,
        Section::Recovery,
    ];

    /// Accepted header labels, highest priority first
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Section::Plan => &["TODAYS_PLAN:", "TODAY'S_PLAN:", "TODAYS PLAN:", "TODAY'S PLAN:"],
            Section::Goals => &["DAILY_GOALS:", "DAILY GOALS:", "GOALS:"],
            Section::Warnings => &["WARNINGS:", "PRECAUTIONS:", "CAUTIONS:"],
            Section::Recovery => &["REST_SUGGESTIONS:", "REST SUGGESTIONS:", "RECOVERY:", "REST:"],
        }
    }

    /// Text used when the section label is missing
    pub fn default_text(&self) -> &'static str {
        match self {
            Section::Plan => "Continue practicing fundamentals with focus on form and consistency.",
            Section::Goals => "Improve stroke technique and court positioning.",
            Section::Warnings => "None - maintain good form throughout the session.",
            Section::Recovery => "Include proper warm-up, cool-down, and hydration.",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Plan => "TODAY'S PLAN",
            Section::Goals => "DAILY GOALS",
            Section::Warnings => "WARNINGS",
            Section::Recovery => "REST & RECOVERY",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Section::Plan => "📋",
            Section::Goals => "🎯",
            Section::Warnings => "⚠️",
            Section::Recovery => "🛌",
        }
    }
}

/// Plan, goals, warnings and recovery advice. All four are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAdvice {
    pub plan: String,
    pub goals: String,
    pub warnings: String,
    pub recovery: String,
}

impl StructuredAdvice {
    /// Every section at its default text
    pub fn defaults() -> Self {
        Self {
            plan: Section::Plan.default_text().to_string(),
            goals: Section::Goals.default_text().to_string(),
            warnings: Section::Warnings.default_text().to_string(),
            recovery: Section::Recovery.default_text().to_string(),
        }
    }

    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::Plan => &self.plan,
            Section::Goals => &self.goals,
            Section::Warnings => &self.warnings,
            Section::Recovery => &self.recovery,
        }
    }

    fn set(&mut self, section: Section, value: String) {
        match section {
            Section::Plan => self.plan = value,
            Section::Goals => self.goals = value,
            Section::Warnings => self.warnings = value,
            Section::Recovery => self.recovery = value,
        }
    }

    /// Sections in display order
    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> {
        Section::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    /// True when the warnings section says there is nothing to worry about
    pub fn no_warnings(&self) -> bool {
        self.warnings.trim().eq_ignore_ascii_case("none")
    }
}

/// Parse coach text into structured advice. Never fails.
///
/// A label that is present but followed directly by another section's label
/// yields an empty string, not the default.
pub fn parse(text: &str) -> StructuredAdvice {
    let mut advice = StructuredAdvice::defaults();
    for section in Section::ALL {
        if let Some(body) = extract(text, section) {
            advice.set(section, body.to_string());
        }
    }
    advice
}

/// Body of one section, or None if none of its labels occur
fn extract(text: &str, section: Section) -> Option<&str> {
    let start = section_start(text, section)?;
    let end = section_end(text, section, start);
    Some(text[start..end].trim())
}

fn section_start(text: &str, section: Section) -> Option<usize> {
    section
        .labels()
        .iter()
        .find_map(|label| text.find(label).map(|idx| idx + label.len()))
}

fn section_end(text: &str, section: Section, start: usize) -> usize {
    let rest = &text[start..];
    Section::ALL
        .iter()
        .filter(|other| **other != section)
        .flat_map(|other| other.labels().iter())
        .filter_map(|label| rest.find(label))
        .min()
        .map_or(text.len(), |offset| start + offset)
}
