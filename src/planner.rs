//! Plan generator - combines rule suggestions with the coach's structured advice

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::llm::{CompletionRequest, TextCompletionService};
use crate::parser::{self, StructuredAdvice};
use crate::rules::RuleEngine;
use crate::session::SessionRecord;

const COACH_SYSTEM_ROLE: &str =
    "You are a professional tennis coach with 20+ years of experience training players at all levels.";

const PLAN_MAX_TOKENS: u32 = 800;
const PLAN_TEMPERATURE: f32 = 0.7;

/// Recommendations for today, built once from yesterday's session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    rule_suggestions: Vec<String>,
    structured_advice: StructuredAdvice,
    raw_advice: String,
}

impl Plan {
    pub fn new(
        rule_suggestions: Vec<String>,
        structured_advice: StructuredAdvice,
        raw_advice: String,
    ) -> Self {
        Self {
            rule_suggestions,
            structured_advice,
            raw_advice,
        }
    }

    pub fn rule_suggestions(&self) -> &[String] {
        &self.rule_suggestions
    }

    pub fn structured_advice(&self) -> &StructuredAdvice {
        &self.structured_advice
    }

    /// Unmodified coach response, or a diagnostic if the coach was unreachable
    pub fn raw_advice(&self) -> &str {
        &self.raw_advice
    }
}

/// Builds plans from session records
pub struct PlanGenerator {
    rules: RuleEngine,
    service: Arc<dyn TextCompletionService>,
}

impl PlanGenerator {
    pub fn new(rules: RuleEngine, service: Arc<dyn TextCompletionService>) -> Self {
        Self { rules, service }
    }

    pub fn from_config(config: &Config, service: Arc<dyn TextCompletionService>) -> Self {
        Self::new(RuleEngine::from_config(config), service)
    }

    /// Generate today's plan. Service failures degrade to fallback advice.
    pub async fn create_plan(&self, record: &SessionRecord) -> Plan {
        let rule_suggestions = self.rules.evaluate(record);
        info!(
            activities = record.activities().len(),
            suggestions = rule_suggestions.len(),
            "create_plan: rules evaluated"
        );

        let request = CompletionRequest {
            system_role: COACH_SYSTEM_ROLE.to_string(),
            user_prompt: build_plan_prompt(record),
            max_output_tokens: PLAN_MAX_TOKENS,
            temperature: PLAN_TEMPERATURE,
        };

        let (structured_advice, raw_advice) = match self.service.complete(request).await {
            Ok(text) => {
                info!(len = text.len(), "create_plan: coach advice received");
                (parser::parse(&text), text)
            }
            Err(e) => {
                if e.is_auth() {
                    warn!("create_plan: check OPENAI_API_KEY in your environment or .env file");
                }
                warn!(error = %e, "create_plan: coach unavailable, using fallback advice");
                (
                    fallback_advice(record),
                    format!("Error accessing AI recommendations: {}", e),
                )
            }
        };

        Plan::new(rule_suggestions, structured_advice, raw_advice)
    }
}

/// Prompt asking for the four labelled sections
pub fn build_plan_prompt(record: &SessionRecord) -> String {
    format!(
        "You are an expert tennis training coach with extensive experience in player development.

Analyze this tennis training session from yesterday:

TRAINING SESSION DATA:
- Drills Practiced: {activities}
- Training Intensity: {intensity}
- Form/Technique Rating: {form}
- Fatigue Level After Session: {fatigue}

Based on this session data, provide a detailed analysis and recommendations for today's training. Structure your response as follows:

TODAYS_PLAN: [Specific drills and exercises for today's session, including duration and intensity recommendations]

DAILY_GOALS: [3-4 specific, actionable goals for today's training session]

WARNINGS: [Any precautions, injury prevention advice, or things to avoid based on yesterday's session]

REST_SUGGESTIONS: [Recovery activities, rest periods, and preparation advice for optimal performance]

Consider tennis-specific factors like:
- Stroke mechanics and muscle groups used
- Court movement and footwork
- Mental game and strategy
- Progressive skill development
- Injury prevention for tennis players

Provide practical, actionable advice that a tennis player can immediately implement.",
        activities = record.activity_list(),
        intensity = record.intensity(),
        form = record.form_quality(),
        fatigue = record.fatigue(),
    )
}

/// Advice used when the coach cannot be reached. Mentions only the record's own drills.
pub fn fallback_advice(record: &SessionRecord) -> StructuredAdvice {
    StructuredAdvice {
        plan: format!(
            "Focus on refining the drills from yesterday: {}. Adjust intensity based on your current fatigue level.",
            record.activity_list()
        ),
        goals: "Improve stroke consistency, maintain proper form, and build court confidence."
            .to_string(),
        warnings: "Monitor fatigue levels and stop if form deteriorates significantly.".to_string(),
        recovery: "Include proper warm-up, cool-down, and hydration.".to_string(),
    }
}
