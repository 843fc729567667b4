//! Advisor bot - answers follow-up questions about a generated plan
//!
//! Every call is self-contained: the plan and session are passed in and
//! nothing is remembered between questions.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Config;
use crate::llm::{CompletionRequest, TextCompletionService};
use crate::parser::Section;
use crate::planner::Plan;
use crate::session::SessionRecord;

const ADVISOR_SYSTEM_ROLE: &str = "You are a knowledgeable tennis coach. Answer questions about tennis training plans \
     using the provided context. Be specific, practical, and encouraging. Focus on tennis technique, strategy, \
     and player development.";

const ANSWER_MAX_TOKENS: u32 = 300;
const ANSWER_TEMPERATURE: f32 = 0.7;

/// Separator between rule suggestions in the context
pub const SUGGESTION_SEPARATOR: &str = " | ";

/// Canned follow-ups offered by the front-ends, as (short label, question)
pub const QUICK_QUESTIONS: [(&str, &str); 4] = [
    ("Why repeat this drill?", "Why should I practice this drill again?"),
    ("Can I skip tomorrow?", "Can I skip my tennis session tomorrow?"),
    ("Main focus next time?", "What's my main focus for the next tennis session?"),
    ("Fix my weak areas?", "How can I improve my weak areas in tennis?"),
];

/// Quick question by 1-based number
pub fn quick_question(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|i| QUICK_QUESTIONS.get(i))
        .map(|(_, question)| *question)
}

pub struct AdvisorBot {
    service: Arc<dyn TextCompletionService>,
    context_chars: usize,
}

impl AdvisorBot {
    pub fn new(service: Arc<dyn TextCompletionService>, context_chars: usize) -> Self {
        Self { service, context_chars }
    }

    pub fn from_config(config: &Config, service: Arc<dyn TextCompletionService>) -> Self {
        Self::new(service, config.context_chars)
    }

    /// Answer one question. Failures become an apology, never an error.
    pub async fn ask(&self, plan: &Plan, record: &SessionRecord, question: &str) -> String {
        let context = self.build_context(plan, record);
        debug!(context_len = context.len(), "ask: called");

        let request = CompletionRequest {
            system_role: ADVISOR_SYSTEM_ROLE.to_string(),
            user_prompt: format!("Context: {}\n\nQuestion: {}", context, question),
            max_output_tokens: ANSWER_MAX_TOKENS,
            temperature: ANSWER_TEMPERATURE,
        };

        match self.service.complete(request).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "ask: coach unavailable");
                format!(
                    "I'm having trouble accessing my tennis knowledge right now. Please try asking your question \
                     again, or refer to the written recommendations above. Error: {}",
                    e
                )
            }
        }
    }

    /// Session facts, the four advice sections and the rule suggestions,
    /// cut to the configured character budget
    pub fn build_context(&self, plan: &Plan, record: &SessionRecord) -> String {
        let advice = plan.structured_advice();
        let context = format!(
            "YESTERDAY'S TENNIS SESSION:
- Drills Practiced: {}
- Training Intensity: {}
- Form Rating: {}
- Fatigue Level: {}

TODAY'S RECOMMENDED PLAN:
- Suggested Drills: {}
- Daily Goals: {}
- Warnings: {}
- Recovery: {}

HARDCODED RECOMMENDATIONS:
{}",
            record.activity_list(),
            record.intensity(),
            record.form_quality(),
            record.fatigue(),
            advice.get(Section::Plan),
            advice.get(Section::Goals),
            advice.get(Section::Warnings),
            advice.get(Section::Recovery),
            plan.rule_suggestions().join(SUGGESTION_SEPARATOR),
        );
        truncate_chars(context, self.context_chars)
    }
}

/// Keep at most `max` characters
fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
    text
}
