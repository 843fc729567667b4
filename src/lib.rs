//! courtplan - Tennis training evaluator and daily planner
//!
//! Yesterday's session goes in; rule-based suggestions plus structured advice
//! from an AI coach come out. Follow-up questions are answered against the plan.

pub mod activities;
pub mod advisor;
pub mod bot;
pub mod config;
pub mod export;
pub mod llm;
pub mod menu;
pub mod parser;
pub mod planner;
pub mod rules;
pub mod session;
pub mod tui;

pub use config::Config;
pub use planner::{Plan, PlanGenerator};
pub use session::SessionRecord;
