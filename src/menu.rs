//! Terminal menu - guided session input, plan display and coach Q&A

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::activities::ActivityVocabulary;
use crate::advisor::{AdvisorBot, QUICK_QUESTIONS, quick_question};
use crate::config::Config;
use crate::export;
use crate::llm::TextCompletionService;
use crate::planner::{Plan, PlanGenerator};
use crate::session::{Fatigue, FormQuality, Intensity, SessionRecord};

const QUIT_WORDS: &[&str] = &["quit", "exit", "q"];

const JSON_EXAMPLE: &str = r#"{"activities": ["Forehand", "Serve"], "intensity": "Moderate", "formQuality": "Good", "fatigue": "Medium"}"#;

/// What to do after the main menu
enum MenuAction {
    NewPlan,
    Exit,
}

/// Interactive terminal session. Holds the chat history for the current plan.
pub struct MenuSession {
    config: Config,
    generator: PlanGenerator,
    advisor: AdvisorBot,
    editor: DefaultEditor,
    history: Vec<(String, String)>,
}

impl MenuSession {
    pub fn new(config: Config, service: Arc<dyn TextCompletionService>) -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;
        Ok(Self {
            generator: PlanGenerator::from_config(&config, service.clone()),
            advisor: AdvisorBot::from_config(&config, service),
            config,
            editor,
            history: Vec::new(),
        })
    }

    /// Run until the user exits or closes stdin
    pub async fn run(&mut self) -> Result<()> {
        print_header();

        if self.config.llm.has_api_key() {
            println!("✅ OpenAI API key configured");
        } else {
            println!("❌ OpenAI API key not configured - AI advice will fall back to defaults.");
            println!("   Add OPENAI_API_KEY=your_actual_api_key_here to your .env file.");
        }

        loop {
            let Some(record) = self.read_record()? else {
                break;
            };

            println!("\n🚀 Generating your personalized daily plan...");
            println!("🤔 Analyzing training data and consulting AI coach...");
            let plan = self.generator.create_plan(&record).await;
            self.history.clear();
            print_plan(&plan, &record);

            match self.plan_menu(&plan, &record).await? {
                MenuAction::NewPlan => {
                    println!("🔄 Starting over...");
                    continue;
                }
                MenuAction::Exit => break,
            }
        }

        println!("👋 Thank you for using courtplan!");
        Ok(())
    }

    async fn plan_menu(&mut self, plan: &Plan, record: &SessionRecord) -> Result<MenuAction> {
        loop {
            print_section_header("WHAT WOULD YOU LIKE TO DO?");
            println!("1. 🤖 Ask the coach questions");
            println!("2. 💾 Save plan to file");
            println!("3. 📋 View plan again");
            println!("4. 🆕 Create new plan");
            println!("5. 🚪 Exit");

            let Some(choice) = self.prompt("Select option (1-5): ")? else {
                return Ok(MenuAction::Exit);
            };

            match choice.as_str() {
                "1" => self.coach_session(plan, record).await?,
                "2" => self.save_plan(plan, record)?,
                "3" => print_plan(plan, record),
                "4" => return Ok(MenuAction::NewPlan),
                "5" => return Ok(MenuAction::Exit),
                _ => println!("❌ Invalid choice. Please select 1-5."),
            }
        }
    }

    async fn coach_session(&mut self, plan: &Plan, record: &SessionRecord) -> Result<()> {
        print_section_header("COACH CONVERSATION");
        println!("🤖 Ask me questions about your daily plan!");
        println!("💡 Quick questions (type the number):");
        for (i, (_, question)) in QUICK_QUESTIONS.iter().enumerate() {
            println!("   {}. {}", i + 1, question);
        }
        println!("\nType 'quit' to return to the menu, '/history' to review this conversation,");
        println!("'/clear' to forget it.\n");

        loop {
            let Some(input) = self.prompt("❓ Your question: ")? else {
                return Ok(());
            };

            match parse_coach_input(&input) {
                CoachInput::Quit => return Ok(()),
                CoachInput::Empty => println!("Please enter a question or 'quit' to exit."),
                CoachInput::History => self.print_history(),
                CoachInput::Clear => {
                    self.history.clear();
                    println!("🗑️ Chat history cleared.");
                }
                CoachInput::Ask(question) => {
                    println!("🤔 Coach is thinking...");
                    let answer = self.advisor.ask(plan, record, &question).await;
                    println!("🤖 Coach: {}\n", answer);
                    self.history.push((question, answer));
                }
            }
        }
    }

    fn print_history(&self) {
        if self.history.is_empty() {
            println!("No questions asked yet.");
            return;
        }
        for (i, (question, answer)) in self.history.iter().enumerate() {
            println!("{}. ❓ {}\n   🤖 {}", i + 1, question, answer);
        }
    }

    fn save_plan(&mut self, plan: &Plan, record: &SessionRecord) -> Result<()> {
        let text = format!("💾 Enter filename [{}]: ", export::DEFAULT_FILENAME);
        let Some(input) = self.prompt(&text)? else {
            return Ok(());
        };
        let path = output_path(&input);

        match export::save(&path, plan, record) {
            Ok(()) => println!("✅ Daily plan saved to {}", path.display()),
            Err(e) => println!("❌ Error saving file: {:#}", e),
        }
        Ok(())
    }

    /// Guided or JSON input. None when the user closes input.
    fn read_record(&mut self) -> Result<Option<SessionRecord>> {
        print_section_header("YESTERDAY'S TRAINING INPUT");
        println!("Choose input method:");
        println!("1. Manual input (guided)");
        println!("2. JSON input");

        let Some(choice) = self.prompt("Select option (1 or 2): ")? else {
            return Ok(None);
        };

        if choice == "2" {
            println!("Example: {}", JSON_EXAMPLE);
            let Some(json) = self.prompt("JSON: ")? else {
                return Ok(None);
            };
            match SessionRecord::from_json(&self.config.vocabulary, &json) {
                Ok(record) => return Ok(Some(record)),
                Err(e) => println!("❌ {}\nFalling back to manual input...", e),
            }
        } else if choice != "1" {
            println!("Invalid choice, using manual input...");
        }

        self.read_record_guided()
    }

    fn read_record_guided(&mut self) -> Result<Option<SessionRecord>> {
        let Some(activities) = self.read_activities()? else {
            return Ok(None);
        };
        let Some(intensity) =
            self.choose("⚡ Training intensity", &Intensity::ALL, Intensity::label)?
        else {
            return Ok(None);
        };
        let Some(form) =
            self.choose("📈 Form/technique rating", &FormQuality::ALL, FormQuality::label)?
        else {
            return Ok(None);
        };
        let Some(fatigue) =
            self.choose("😴 Fatigue after session", &Fatigue::ALL, Fatigue::label)?
        else {
            return Ok(None);
        };

        let vocabulary = &self.config.vocabulary;
        let record = SessionRecord::new(vocabulary, &activities, intensity, form, fatigue)?;
        Ok(Some(record))
    }

    fn read_activities(&mut self) -> Result<Option<Vec<String>>> {
        let names: Vec<String> =
            self.config.vocabulary.all().iter().map(|s| s.to_string()).collect();
        println!("\n🎯 Drills practiced:");
        for (i, name) in names.iter().enumerate() {
            let tier = self
                .config
                .vocabulary
                .tier_of(name)
                .map(|t| format!("{} {}", t.emoji(), t.name()))
                .unwrap_or_default();
            println!("  {}. {} ({})", i + 1, name, tier);
        }

        loop {
            let text = "Select drills (numbers or names, comma-separated): ";
            let Some(input) = self.prompt(text)? else {
                return Ok(None);
            };
            match resolve_activities(&self.config.vocabulary, &input) {
                Ok(activities) => return Ok(Some(activities)),
                Err(message) => println!("❌ {}", message),
            }
        }
    }

    fn choose<T: Copy>(
        &mut self,
        title: &str,
        options: &[T],
        label: fn(&T) -> &'static str,
    ) -> Result<Option<T>> {
        let labels: Vec<&str> = options.iter().map(label).collect();
        loop {
            let Some(input) = self.prompt(&format!("{} ({}): ", title, labels.join("/")))? else {
                return Ok(None);
            };
            match pick_option(options, label, &input) {
                Some(value) => return Ok(Some(value)),
                None => println!("❌ Invalid option. Choose from: {}", labels.join(", ")),
            }
        }
    }

    /// Read a trimmed line. None on Ctrl+C / Ctrl+D.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        match self.editor.readline(text) {
            Ok(line) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!("prompt: input closed");
                Ok(None)
            }
            Err(e) => Err(anyhow::anyhow!("Readline error: {}", e)),
        }
    }
}

/// One line typed in the coach conversation
#[derive(Debug, PartialEq)]
enum CoachInput {
    Quit,
    Empty,
    History,
    Clear,
    Ask(String),
}

/// Numbers pick a quick question; anything else is asked verbatim
fn parse_coach_input(input: &str) -> CoachInput {
    let input = input.trim();
    if QUIT_WORDS.contains(&input.to_lowercase().as_str()) {
        return CoachInput::Quit;
    }
    match input {
        "" => CoachInput::Empty,
        "/history" => CoachInput::History,
        "/clear" => CoachInput::Clear,
        _ => match input.parse::<usize>().ok().and_then(quick_question) {
            Some(question) => CoachInput::Ask(question.to_string()),
            None => CoachInput::Ask(input.to_string()),
        },
    }
}

/// Resolve "1, 3, volley" style input to canonical activity names
fn resolve_activities(vocabulary: &ActivityVocabulary, input: &str) -> Result<Vec<String>, String> {
    let all = vocabulary.all();
    let mut out: Vec<String> = Vec::new();

    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let name = match token.parse::<usize>() {
            Ok(n) if n >= 1 && n <= all.len() => all[n - 1],
            Ok(n) => return Err(format!("No drill number {}. Choose 1-{}", n, all.len())),
            Err(_) => vocabulary
                .canonical(token)
                .ok_or_else(|| {
                    format!("Unknown drill '{}'. Choose from: {}", token, all.join(", "))
                })?,
        };
        if !out.iter().any(|o| o == name) {
            out.push(name.to_string());
        }
    }

    if out.is_empty() {
        return Err("Select at least one drill".to_string());
    }
    Ok(out)
}

/// Match a 1-based number or a case-insensitive label
fn pick_option<T: Copy>(options: &[T], label: fn(&T) -> &'static str, input: &str) -> Option<T> {
    if let Ok(n) = input.trim().parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).copied();
    }
    options
        .iter()
        .find(|o| label(o).eq_ignore_ascii_case(input.trim()))
        .copied()
}

/// `name` -> `name.json`; empty -> default filename
fn output_path(input: &str) -> PathBuf {
    let input = input.trim();
    if input.is_empty() {
        return PathBuf::from(export::DEFAULT_FILENAME);
    }
    let path = PathBuf::from(input);
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("json")
    }
}

fn print_header() {
    println!("{}", "=".repeat(60));
    println!("🎾 courtplan - Tennis Training Evaluator & Daily Planner");
    println!("AI-powered tennis training analysis and personalized daily planning");
    println!("{}", "=".repeat(60));
}

fn print_section_header(title: &str) {
    println!("\n{} {} {}", "=".repeat(20), title, "=".repeat(20));
}

fn print_plan(plan: &Plan, record: &SessionRecord) {
    println!();
    print!("{}", export::to_report(plan, record, &export::today()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_activities_numbers_and_names() {
        let vocab = ActivityVocabulary::default();
        let out = resolve_activities(&vocab, "1, volley, 3").unwrap();
        assert_eq!(out, vec!["Forehand", "Volley", "Serve"]);
    }

    #[test]
    fn test_resolve_activities_deduplicates() {
        let vocab = ActivityVocabulary::default();
        let out = resolve_activities(&vocab, "2,Backhand,backhand").unwrap();
        assert_eq!(out, vec!["Backhand"]);
    }

    #[test]
    fn test_resolve_activities_errors() {
        let vocab = ActivityVocabulary::default();
        assert!(resolve_activities(&vocab, "").is_err());
        assert!(resolve_activities(&vocab, " , ").is_err());
        assert!(resolve_activities(&vocab, "0").unwrap_err().contains("No drill number 0"));
        assert!(resolve_activities(&vocab, "8").is_err());
        assert!(resolve_activities(&vocab, "smash").unwrap_err().contains("Unknown drill 'smash'"));
    }

    #[test]
    fn test_pick_option() {
        assert_eq!(pick_option(&Intensity::ALL, Intensity::label, "3"), Some(Intensity::Intense));
        assert_eq!(
            pick_option(&Intensity::ALL, Intensity::label, "moderate"),
            Some(Intensity::Moderate)
        );
        assert_eq!(pick_option(&Fatigue::ALL, Fatigue::label, "0"), None);
        assert_eq!(pick_option(&Fatigue::ALL, Fatigue::label, "4"), None);
        assert_eq!(pick_option(&FormQuality::ALL, FormQuality::label, "great"), None);
    }

    #[test]
    fn test_coach_input() {
        assert_eq!(parse_coach_input(" QUIT "), CoachInput::Quit);
        assert_eq!(parse_coach_input(""), CoachInput::Empty);
        assert_eq!(parse_coach_input("/history"), CoachInput::History);
        assert_eq!(parse_coach_input("/clear"), CoachInput::Clear);
        assert_eq!(
            parse_coach_input("2"),
            CoachInput::Ask("Can I skip my tennis session tomorrow?".to_string())
        );
        assert_eq!(parse_coach_input("9"), CoachInput::Ask("9".to_string()));
        assert_eq!(
            parse_coach_input("Why slice?"),
            CoachInput::Ask("Why slice?".to_string())
        );
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path(""), PathBuf::from("daily_plan.json"));
        assert_eq!(output_path("monday"), PathBuf::from("monday.json"));
        assert_eq!(output_path("monday.txt"), PathBuf::from("monday.txt"));
    }
}
