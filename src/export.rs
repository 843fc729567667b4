//! Export - save a plan as a JSON document or a sectioned text report

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::activities::ActivityVocabulary;
use crate::parser::{Section, StructuredAdvice};
use crate::planner::Plan;
use crate::session::{SessionInput, SessionRecord};

pub const DEFAULT_FILENAME: &str = "daily_plan.json";

/// On-disk plan document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    pub date: String,
    pub session: SessionInput,
    pub rule_suggestions: Vec<String>,
    pub structured_advice: StructuredAdvice,
    pub raw_advice: String,
}

impl PlanDocument {
    pub fn new(plan: &Plan, record: &SessionRecord, date: &str) -> Self {
        Self {
            date: date.to_string(),
            session: SessionInput::from(record),
            rule_suggestions: plan.rule_suggestions().to_vec(),
            structured_advice: plan.structured_advice().clone(),
            raw_advice: plan.raw_advice().to_string(),
        }
    }

    /// Validate the stored session and rebuild the plan
    pub fn into_parts(self, vocabulary: &ActivityVocabulary) -> Result<(SessionRecord, Plan)> {
        let record = self
            .session
            .into_record(vocabulary)
            .context("Saved session does not match the current activity vocabulary")?;
        let plan = Plan::new(self.rule_suggestions, self.structured_advice, self.raw_advice);
        Ok((record, plan))
    }
}

/// Today's date as stored in exports
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

pub fn to_json(plan: &Plan, record: &SessionRecord, date: &str) -> Result<String> {
    let doc = PlanDocument::new(plan, record, date);
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Human-readable report, also used for terminal and chat display
pub fn to_report(plan: &Plan, record: &SessionRecord, date: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} YOUR DAILY PLAN {}\n", "=".repeat(20), "=".repeat(20)));
    out.push_str(&format!("Date: {}\n\n", date));

    out.push_str("📊 YESTERDAY'S SESSION:\n");
    out.push_str(&format!("  🎾 Drills: {}\n", record.activity_list()));
    out.push_str(&format!("  {} Intensity: {}\n", record.intensity().emoji(), record.intensity()));
    out.push_str(&format!("  {} Form: {}\n", record.form_quality().emoji(), record.form_quality()));
    out.push_str(&format!("  {} Fatigue: {}\n", record.fatigue().emoji(), record.fatigue()));

    out.push_str("\n🔧 RULE-BASED RECOMMENDATIONS:\n");
    for (i, suggestion) in plan.rule_suggestions().iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, suggestion));
    }

    out.push_str("\n🤖 AI-POWERED RECOMMENDATIONS:\n");
    let advice = plan.structured_advice();
    for (section, text) in advice.iter() {
        out.push_str(&format!("\n  {} {}:\n", section.emoji(), section.title()));
        if section == Section::Warnings && advice.no_warnings() {
            out.push_str("  No warnings - you're good to go!\n");
        } else {
            out.push_str(&format!("  {}\n", text));
        }
    }

    out
}

/// Write the plan; `.json` files get the JSON document, anything else the report
pub fn save(path: &Path, plan: &Plan, record: &SessionRecord) -> Result<()> {
    let date = today();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let content = if is_json {
        to_json(plan, record, &date)?
    } else {
        to_report(plan, record, &date)
    };

    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), json = is_json, "save: plan written");
    Ok(())
}

/// Read a JSON export without validating the session
pub fn load_document(path: &Path) -> Result<PlanDocument> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a plan export", path.display()))?;
    Ok(doc)
}

/// Read a JSON export back into a record and plan
pub fn load_json(path: &Path, vocabulary: &ActivityVocabulary) -> Result<(SessionRecord, Plan)> {
    load_document(path)?.into_parts(vocabulary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleEngine;

    fn record() -> SessionRecord {
        SessionRecord::from_labels(
            &ActivityVocabulary::default(),
            ["Backhand", "Return"],
            "Light",
            "Poor",
            "Low",
        )
        .unwrap()
    }

    fn plan() -> Plan {
        Plan::new(
            RuleEngine::default().evaluate(&record()),
            StructuredAdvice::defaults(),
            "TODAYS_PLAN: nothing parsed".to_string(),
        )
    }

    #[test]
    fn test_json_has_documented_keys() {
        let json = to_json(&plan(), &record(), "2026-10-18").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["date"], "2026-10-18");
        assert_eq!(value["session"]["activities"][1], "Return");
        assert_eq!(value["session"]["formQuality"], "Poor");
        assert!(value["ruleSuggestions"].is_array());
        assert!(value["structuredAdvice"]["plan"].is_string());
        assert_eq!(value["rawAdvice"], "TODAYS_PLAN: nothing parsed");
    }

    #[test]
    fn test_report_sections() {
        let report = to_report(&plan(), &record(), "2026-10-18");

        assert!(report.contains("Date: 2026-10-18"));
        assert!(report.contains("Drills: Backhand, Return"));
        assert!(report.contains("Form: Poor"));
        assert!(report.contains("  1. "));
        assert!(report.contains("TODAY'S PLAN:"));
        assert!(report.contains("REST & RECOVERY:"));
        assert!(report.contains(Section::Warnings.default_text()));
    }

    #[test]
    fn test_report_none_warnings() {
        let mut advice = StructuredAdvice::defaults();
        advice.warnings = "None".to_string();
        let plan = Plan::new(vec!["tip".to_string()], advice, String::new());

        let report = to_report(&plan, &record(), "2026-10-18");
        assert!(report.contains("No warnings - you're good to go!"));
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");

        save(&path, &plan(), &record()).unwrap();
        let (loaded_record, loaded_plan) =
            load_json(&path, &ActivityVocabulary::default()).unwrap();

        assert_eq!(loaded_record, record());
        assert_eq!(loaded_plan, plan());
    }

    #[test]
    fn test_save_text_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.txt");

        save(&path, &plan(), &record()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("===================="));
        assert!(content.contains("RULE-BASED RECOMMENDATIONS"));
    }

    #[test]
    fn test_load_rejects_unknown_activity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        save(&path, &plan(), &record()).unwrap();

        let vocabulary = ActivityVocabulary {
            basic: vec!["Jab".to_string()],
            advanced: vec!["Hook".to_string()],
            high_load: "Hook".to_string(),
            reaction: vec![],
            finesse: vec![],
        };
        assert!(load_json(&path, &vocabulary).is_err());
    }

    #[test]
    fn test_load_rejects_non_plan_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.json");
        fs::write(&path, r#"{"hello": "world"}"#).unwrap();

        let err = load_json(&path, &ActivityVocabulary::default()).unwrap_err();
        assert!(err.to_string().contains("is not a plan export"));
    }

    #[test]
    fn test_load_document_keeps_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        fs::write(&path, to_json(&plan(), &record(), "2026-01-02").unwrap()).unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.date, "2026-01-02");
        assert_eq!(doc.session.activities, vec!["Backhand", "Return"]);
    }
}
