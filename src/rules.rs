//! Rule engine - hardcoded training suggestions derived from a session record

use tracing::debug;

use crate::activities::{ActivityVocabulary, Tier};
use crate::config::Config;
use crate::session::{Fatigue, FormQuality, Intensity, SessionRecord};

/// Generic advice used when no rule matches
pub const DEFAULT_FALLBACK: [&str; 2] = [
    "🎾 Continue building on yesterday's progress with consistent practice",
    "🎯 Focus on one key area for improvement in today's session",
];

/// Which rule produced a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    RestDay,
    ReduceIntensity,
    PoorForm,
    AverageForm,
    AdvancedHeavy,
    TooManyActivities,
    HighLoadRecovery,
    ReactionDrill,
    FinesseWork,
    IncreaseIntensity,
    MaintainIntensity,
    Fallback,
}

/// A suggestion with the rule that fired it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub rule: Rule,
    pub text: String,
}

impl Suggestion {
    fn new(rule: Rule, text: impl Into<String>) -> Self {
        Self {
            rule,
            text: text.into(),
        }
    }
}

/// Deterministic suggestion table
#[derive(Debug, Clone)]
pub struct RuleEngine {
    vocabulary: ActivityVocabulary,
    fallback: [String; 2],
}

impl RuleEngine {
    pub fn new(vocabulary: ActivityVocabulary, fallback: [String; 2]) -> Self {
        Self { vocabulary, fallback }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.vocabulary.clone(), config.fallback_suggestions.clone())
    }

    /// Suggestion texts in rule order. Never empty.
    pub fn evaluate(&self, record: &SessionRecord) -> Vec<String> {
        self.suggestions(record).into_iter().map(|s| s.text).collect()
    }

    /// Evaluate every rule in table order
    pub fn suggestions(&self, record: &SessionRecord) -> Vec<Suggestion> {
        let mut out = Vec::new();
        let intensity = record.intensity();
        let fatigue = record.fatigue();

        // Fatigue and intensity management
        if intensity == Intensity::Intense && fatigue == Fatigue::High {
            out.push(Suggestion::new(
                Rule::RestDay,
                "🛌 Take a rest day or focus on light recovery exercises (gentle stretching, light footwork)",
            ));
            out.push(Suggestion::new(
                Rule::RestDay,
                "💧 Emphasize hydration and proper nutrition for recovery",
            ));
        } else if fatigue == Fatigue::High {
            out.push(Suggestion::new(
                Rule::ReduceIntensity,
                "⚡ Reduce training intensity today - focus on technique over power",
            ));
            out.push(Suggestion::new(
                Rule::ReduceIntensity,
                "🎯 Work on mental game and strategy instead of physical drills",
            ));
        }

        // Technique
        match record.form_quality() {
            FormQuality::Poor => {
                out.push(Suggestion::new(
                    Rule::PoorForm,
                    format!(
                        "📚 Repeat yesterday's drills ({}) with focus on proper technique",
                        record.activity_list()
                    ),
                ));
                out.push(Suggestion::new(
                    Rule::PoorForm,
                    "🎥 Consider video analysis or working with a coach on form correction",
                ));
                out.push(Suggestion::new(
                    Rule::PoorForm,
                    "🐌 Slow down stroke speed to perfect technique before adding power",
                ));
            }
            FormQuality::Average => {
                out.push(Suggestion::new(
                    Rule::AverageForm,
                    "🔧 Include technique refinement drills for yesterday's practiced strokes",
                ));
                out.push(Suggestion::new(
                    Rule::AverageForm,
                    "🎯 Focus on consistency over power in today's session",
                ));
            }
            FormQuality::Good | FormQuality::Excellent => {}
        }

        // Drill balance
        let advanced_count = self.count_tier(record, Tier::Advanced);
        let basic_count = self.count_tier(record, Tier::Basic);
        debug!(advanced_count, basic_count, "suggestions: tier balance");

        if advanced_count >= 3 {
            out.push(Suggestion::new(
                Rule::AdvancedHeavy,
                format!(
                    "⚖️ Balance today with fundamental drills ({}) to maintain solid foundation",
                    self.vocabulary.basic_list()
                ),
            ));
            out.push(Suggestion::new(
                Rule::AdvancedHeavy,
                "🎯 Focus on court positioning and footwork fundamentals",
            ));
        }

        if record.activities().len() >= 5 {
            out.push(Suggestion::new(
                Rule::TooManyActivities,
                "🎪 You trained many drills yesterday - consider focusing on 2-3 key areas today for deeper practice",
            ));
        }

        // Drill-specific advice
        let has = |pred: fn(&ActivityVocabulary, &str) -> bool| {
            record.activities().iter().any(|a| pred(&self.vocabulary, a))
        };

        if record.has_activity(&self.vocabulary.high_load) && intensity == Intensity::Intense {
            out.push(Suggestion::new(
                Rule::HighLoadRecovery,
                format!(
                    "🎾 Include shoulder and arm recovery exercises - {} is demanding on these muscles",
                    self.vocabulary.high_load
                ),
            ));
        }

        if has(ActivityVocabulary::is_reaction) {
            out.push(Suggestion::new(
                Rule::ReactionDrill,
                "⚡ Practice reaction time and quick decision-making drills",
            ));
        }

        if has(ActivityVocabulary::is_finesse) {
            out.push(Suggestion::new(
                Rule::FinesseWork,
                "🎨 Continue touch and finesse work - these skills require consistent practice",
            ));
        }

        // Intensity progression
        if intensity == Intensity::Light && fatigue == Fatigue::Low {
            out.push(Suggestion::new(
                Rule::IncreaseIntensity,
                "📈 You can safely increase intensity today - your body is ready for more challenge",
            ));
        } else if intensity == Intensity::Intense && fatigue == Fatigue::Low {
            out.push(Suggestion::new(
                Rule::MaintainIntensity,
                "💪 Great recovery! You can maintain high intensity if form stays good",
            ));
        }

        if out.is_empty() {
            debug!("suggestions: no rule fired, using fallback");
            out.extend(
                self.fallback
                    .iter()
                    .map(|text| Suggestion::new(Rule::Fallback, text.as_str())),
            );
        }

        debug!(count = out.len(), "suggestions: evaluated");
        out
    }

    fn count_tier(&self, record: &SessionRecord, tier: Tier) -> usize {
        record
            .activities()
            .iter()
            .filter(|a| self.vocabulary.tier_of(a) == Some(tier))
            .count()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(
            ActivityVocabulary::default(),
            DEFAULT_FALLBACK.map(str::to_string),
        )
    }
}
