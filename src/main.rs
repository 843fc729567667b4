//! courtplan - Tennis training evaluator and daily planner

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::Level;

use courtplan::advisor::AdvisorBot;
use courtplan::export;
use courtplan::llm::create_service;
use courtplan::menu::MenuSession;
use courtplan::tui::App;
use courtplan::{Config, PlanGenerator, SessionRecord};

#[derive(Parser)]
#[command(name = "courtplan")]
#[command(author, version, about = "🎾 Tennis training evaluator & daily planner")]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal menu
    Menu,

    /// Generate today's plan from yesterday's session
    Plan {
        /// Drills practiced (comma-separated, e.g. "Serve,Volley")
        #[arg(short, long, value_delimiter = ',', required_unless_present = "json")]
        activities: Vec<String>,

        /// Light, Moderate or Intense
        #[arg(short, long, required_unless_present = "json")]
        intensity: Option<String>,

        /// Poor, Average, Good or Excellent
        #[arg(short = 'f', long, required_unless_present = "json")]
        form: Option<String>,

        /// Low, Medium or High
        #[arg(short = 't', long, required_unless_present = "json")]
        fatigue: Option<String>,

        /// Session as JSON instead of flags
        #[arg(long, conflicts_with_all = ["activities", "intensity", "form", "fatigue"])]
        json: Option<String>,

        /// Save the plan (.json for the document, anything else for the text report)
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Ask the coach about a saved plan
    Ask {
        /// Plan exported as JSON
        #[arg(short, long, default_value = export::DEFAULT_FILENAME)]
        plan: PathBuf,

        /// Question for the coach
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Browse a saved plan in the TUI
    View {
        /// Plan exported as JSON
        #[arg(default_value = export::DEFAULT_FILENAME)]
        file: PathBuf,
    },

    /// Start Telegram bot
    Bot {
        /// Telegram bot token (or set TELOXIDE_TOKEN env var)
        #[arg(short, long, env = "TELOXIDE_TOKEN")]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let service = create_service(&config.llm)?;

    match cli.command {
        Some(Commands::Plan {
            activities,
            intensity,
            form,
            fatigue,
            json,
            export: export_path,
        }) => {
            let record = match json {
                Some(json) => SessionRecord::from_json(&config.vocabulary, &json)?,
                None => {
                    let (Some(intensity), Some(form), Some(fatigue)) = (intensity, form, fatigue)
                    else {
                        bail!("--intensity, --form and --fatigue are required without --json");
                    };
                    let vocab = &config.vocabulary;
                    SessionRecord::from_labels(vocab, &activities, &intensity, &form, &fatigue)?
                }
            };

            if !config.llm.has_api_key() {
                eprintln!("⚠️  OPENAI_API_KEY not set - AI advice will use fallback text.");
            }

            let generator = PlanGenerator::from_config(&config, service);
            let plan = generator.create_plan(&record).await;
            print!("{}", export::to_report(&plan, &record, &export::today()));

            if let Some(path) = export_path {
                export::save(&path, &plan, &record)?;
                println!("\n✅ Daily plan saved to {}", path.display());
            }
        }

        Some(Commands::Ask { plan, question }) => {
            let (record, saved_plan) = export::load_json(&plan, &config.vocabulary)
                .with_context(|| format!("Could not load plan from {}", plan.display()))?;
            let advisor = AdvisorBot::from_config(&config, service);
            let answer = advisor.ask(&saved_plan, &record, &question.join(" ")).await;
            println!("🤖 Coach: {}", answer);
        }

        Some(Commands::View { file }) => {
            let doc = export::load_document(&file)?;
            let date = doc.date.clone();
            let (record, plan) = doc.into_parts(&config.vocabulary)?;
            let mut app = App::new(plan, record, date);
            app.run()?;
        }

        Some(Commands::Bot { token }) => {
            println!("Starting Telegram bot...");
            if !config.llm.has_api_key() {
                println!("OPENAI_API_KEY not set - plans will use fallback advice.");
            }
            let generator = Arc::new(PlanGenerator::from_config(&config, service.clone()));
            let advisor = Arc::new(AdvisorBot::from_config(&config, service));
            courtplan::bot::run_bot(token, Arc::new(config), generator, advisor).await?;
        }

        Some(Commands::Menu) | None => {
            // Default: interactive menu
            let mut session = MenuSession::new(config, service)?;
            session.run().await?;
        }
    }

    Ok(())
}
