//! Telegram bot module - collect yesterday's session, send the plan, answer questions

use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::{Dialogue, InMemStorage},
    prelude::*,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup},
    utils::command::BotCommands,
};
use tracing::{info, warn};

use crate::activities::ActivityVocabulary;
use crate::advisor::{AdvisorBot, QUICK_QUESTIONS, quick_question};
use crate::config::Config;
use crate::export;
use crate::planner::{Plan, PlanGenerator};
use crate::session::{Fatigue, FormQuality, Intensity, SessionRecord};

type MyDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Telegram rejects messages over 4096 chars; leave room for formatting
const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    /// Toggling drills on the inline keyboard
    ChoosingActivities { selected: Vec<String> },
    ChoosingIntensity { activities: Vec<String> },
    ChoosingForm {
        activities: Vec<String>,
        intensity: Intensity,
    },
    ChoosingFatigue {
        activities: Vec<String>,
        intensity: Intensity,
        form: FormQuality,
    },
    /// Plan delivered; free text goes to the coach
    Planned {
        record: SessionRecord,
        plan: Plan,
        history: Vec<(String, String)>,
    },
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Bot commands:")]
pub enum Command {
    #[command(description = "Start")]
    Start,
    #[command(description = "Show help")]
    Help,
    #[command(description = "Plan today from yesterday's session")]
    Plan,
    #[command(description = "Show the current plan again")]
    Show,
    #[command(description = "Questions asked about the current plan")]
    History,
    #[command(description = "Clear questions asked about the current plan")]
    Clear,
    #[command(description = "Forget the current plan")]
    Reset,
}

/// Decoded inline button
#[derive(Debug, Clone, PartialEq)]
enum CallbackAction {
    ToggleActivity(String),
    ActivitiesDone,
    Intensity(Intensity),
    Form(FormQuality),
    Fatigue(Fatigue),
    /// 1-based index into the quick questions
    Quick(usize),
}

fn parse_callback(data: &str) -> Option<CallbackAction> {
    if let Some(name) = data.strip_prefix("act:") {
        return Some(if name == "done" {
            CallbackAction::ActivitiesDone
        } else {
            CallbackAction::ToggleActivity(name.to_string())
        });
    }
    if let Some(label) = data.strip_prefix("int:") {
        return label.parse().ok().map(CallbackAction::Intensity);
    }
    if let Some(label) = data.strip_prefix("form:") {
        return label.parse().ok().map(CallbackAction::Form);
    }
    if let Some(label) = data.strip_prefix("fat:") {
        return label.parse().ok().map(CallbackAction::Fatigue);
    }
    if let Some(number) = data.strip_prefix("ask:") {
        return number
            .parse()
            .ok()
            .filter(|n| quick_question(*n).is_some())
            .map(CallbackAction::Quick);
    }
    None
}

/// Planned state with the conversation dropped; None if there is no plan
fn cleared(state: State) -> Option<State> {
    match state {
        State::Planned { record, plan, .. } => Some(State::Planned {
            record,
            plan,
            history: Vec::new(),
        }),
        _ => None,
    }
}

/// Add or remove a drill, keeping selection order
fn toggle(selected: &mut Vec<String>, name: &str) {
    if let Some(pos) = selected.iter().position(|s| s == name) {
        selected.remove(pos);
    } else {
        selected.push(name.to_string());
    }
}

/// Split on line boundaries so each chunk fits in one message
fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.lines() {
        let line_len = line.chars().count();

        if line_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { line_len } else { line_len + 1 };
        if current_len + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks
}

fn make_activities_keyboard(
    vocabulary: &ActivityVocabulary,
    selected: &[String],
) -> InlineKeyboardMarkup {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = vocabulary
        .all()
        .chunks(2)
        .map(|chunk| {
            chunk
                .iter()
                .map(|name| {
                    let mark = if selected.iter().any(|s| s == name) {
                        "✅".to_string()
                    } else {
                        vocabulary.tier_of(name).map(|t| t.emoji().to_string()).unwrap_or_default()
                    };
                    InlineKeyboardButton::callback(
                        format!("{} {}", mark, name),
                        format!("act:{}", name),
                    )
                })
                .collect()
        })
        .collect();

    buttons.push(vec![InlineKeyboardButton::callback("➡️ Done", "act:done")]);
    InlineKeyboardMarkup::new(buttons)
}

fn make_options_keyboard<T>(
    prefix: &str,
    options: &[T],
    label: fn(&T) -> &'static str,
    emoji: fn(&T) -> &'static str,
) -> InlineKeyboardMarkup {
    let row: Vec<InlineKeyboardButton> = options
        .iter()
        .map(|o| {
            InlineKeyboardButton::callback(
                format!("{} {}", emoji(o), label(o)),
                format!("{}:{}", prefix, label(o)),
            )
        })
        .collect();
    InlineKeyboardMarkup::new(vec![row])
}

fn make_quick_keyboard() -> InlineKeyboardMarkup {
    let buttons: Vec<Vec<InlineKeyboardButton>> = QUICK_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, (label, _))| {
            vec![InlineKeyboardButton::callback(
                format!("💬 {}", label),
                format!("ask:{}", i + 1),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(buttons)
}

/// Start the Telegram bot
pub async fn run_bot(
    token: String,
    config: Arc<Config>,
    generator: Arc<PlanGenerator>,
    advisor: Arc<AdvisorBot>,
) -> anyhow::Result<()> {
    let bot = Bot::new(token);

    let handler = dptree::entry()
        .enter_dialogue::<Update, InMemStorage<State>, State>()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    info!("Bot dispatcher starting");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<State>::new(), config, generator, advisor])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn send_long(bot: &Bot, chat_id: ChatId, text: &str) -> HandlerResult {
    for chunk in split_message(text, MAX_MESSAGE_CHARS) {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: MyDialogue,
    config: Arc<Config>,
) -> HandlerResult {
    match cmd {
        Command::Start => {
            let text = "🎾 courtplan\n\n\
                Tennis training evaluator and daily planner\n\n\
                /plan - plan today from yesterday's session\n\
                /show - show the current plan\n\
                /history - questions asked so far\n\
                /clear - clear the questions asked so far\n\
                /reset - start over\n\n\
                After a plan is ready, just type a question for the coach.";
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }

        Command::Plan => {
            dialogue
                .update(State::ChoosingActivities { selected: Vec::new() })
                .await?;
            bot.send_message(msg.chat.id, "🎯 Which drills did you practice yesterday?")
                .reply_markup(make_activities_keyboard(&config.vocabulary, &[]))
                .await?;
        }

        Command::Show => match dialogue.get().await?.unwrap_or_default() {
            State::Planned { record, plan, .. } => {
                let report = export::to_report(&plan, &record, &export::today());
                send_long(&bot, msg.chat.id, &report).await?;
            }
            _ => {
                bot.send_message(msg.chat.id, "No plan yet. Use /plan to create one.")
                    .await?;
            }
        },

        Command::History => match dialogue.get().await?.unwrap_or_default() {
            State::Planned { history, .. } if !history.is_empty() => {
                let text = history
                    .iter()
                    .enumerate()
                    .map(|(i, (q, a))| format!("{}. ❓ {}\n🤖 {}", i + 1, q, a))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                send_long(&bot, msg.chat.id, &text).await?;
            }
            _ => {
                bot.send_message(msg.chat.id, "No questions asked yet.").await?;
            }
        },

        Command::Clear => match cleared(dialogue.get().await?.unwrap_or_default()) {
            Some(state) => {
                dialogue.update(state).await?;
                bot.send_message(msg.chat.id, "🗑️ Chat history cleared.").await?;
            }
            None => {
                bot.send_message(msg.chat.id, "No plan yet. Use /plan to create one.")
                    .await?;
            }
        },

        Command::Reset => {
            dialogue.reset().await?;
            bot.send_message(msg.chat.id, "🔄 Cleared. Use /plan to start again.")
                .await?;
        }
    }

    Ok(())
}

/// Ask the coach, reply, and remember the exchange in the dialogue
async fn answer_question(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &MyDialogue,
    advisor: &AdvisorBot,
    (record, plan, mut history): (SessionRecord, Plan, Vec<(String, String)>),
    question: &str,
) -> HandlerResult {
    bot.send_message(chat_id, "🤔 Coach is thinking...").await?;
    let answer = advisor.ask(&plan, &record, question).await;
    send_long(bot, chat_id, &format!("🤖 {}", answer)).await?;

    history.push((question.to_string(), answer));
    dialogue
        .update(State::Planned {
            record,
            plan,
            history,
        })
        .await?;
    Ok(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dialogue: MyDialogue,
    config: Arc<Config>,
    generator: Arc<PlanGenerator>,
    advisor: Arc<AdvisorBot>,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(data), Some(message)) = (q.data.as_deref(), q.message.as_ref()) else {
        return Ok(());
    };
    let Some(action) = parse_callback(data) else {
        warn!(data, "Unknown callback data");
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();
    let state = dialogue.get().await?.unwrap_or_default();

    match (state, action) {
        (State::ChoosingActivities { mut selected }, CallbackAction::ToggleActivity(name)) => {
            let Some(name) = config.vocabulary.canonical(&name) else {
                return Ok(());
            };
            toggle(&mut selected, name);
            let keyboard = make_activities_keyboard(&config.vocabulary, &selected);
            dialogue.update(State::ChoosingActivities { selected }).await?;
            bot.edit_message_reply_markup(chat_id, message_id)
                .reply_markup(keyboard)
                .await?;
        }

        (State::ChoosingActivities { selected }, CallbackAction::ActivitiesDone) => {
            if selected.is_empty() {
                bot.send_message(chat_id, "Select at least one drill.").await?;
                return Ok(());
            }
            let text = format!(
                "🎾 Drills: {}\n\n⚡ How intense was the session?",
                selected.join(", ")
            );
            dialogue
                .update(State::ChoosingIntensity { activities: selected })
                .await?;
            bot.edit_message_text(chat_id, message_id, text)
                .reply_markup(make_options_keyboard(
                    "int",
                    &Intensity::ALL,
                    Intensity::label,
                    Intensity::emoji,
                ))
                .await?;
        }

        (State::ChoosingIntensity { activities }, CallbackAction::Intensity(intensity)) => {
            let text = format!(
                "{} Intensity: {}\n\n📈 How was your form?",
                intensity.emoji(),
                intensity
            );
            dialogue
                .update(State::ChoosingForm { activities, intensity })
                .await?;
            bot.edit_message_text(chat_id, message_id, text)
                .reply_markup(make_options_keyboard(
                    "form",
                    &FormQuality::ALL,
                    FormQuality::label,
                    FormQuality::emoji,
                ))
                .await?;
        }

        (State::ChoosingForm { activities, intensity }, CallbackAction::Form(form)) => {
            let text = format!(
                "{} Form: {}\n\n😴 How tired were you afterwards?",
                form.emoji(),
                form
            );
            dialogue
                .update(State::ChoosingFatigue {
                    activities,
                    intensity,
                    form,
                })
                .await?;
            bot.edit_message_text(chat_id, message_id, text)
                .reply_markup(make_options_keyboard(
                    "fat",
                    &Fatigue::ALL,
                    Fatigue::label,
                    Fatigue::emoji,
                ))
                .await?;
        }

        (
            State::ChoosingFatigue {
                activities,
                intensity,
                form,
            },
            CallbackAction::Fatigue(fatigue),
        ) => {
            let vocab = &config.vocabulary;
            let record = match SessionRecord::new(vocab, &activities, intensity, form, fatigue) {
                Ok(record) => record,
                Err(e) => {
                    dialogue.reset().await?;
                    bot.send_message(chat_id, format!("❌ {}. Use /plan to try again.", e))
                        .await?;
                    return Ok(());
                }
            };

            let waiting = "🤔 Analyzing your session and consulting the coach...";
            bot.edit_message_text(chat_id, message_id, waiting).await?;
            let plan = generator.create_plan(&record).await;
            info!(chat_id = %chat_id, "Plan delivered");

            let report = export::to_report(&plan, &record, &export::today());
            send_long(&bot, chat_id, &report).await?;
            let prompt = "🤖 Ask me anything about this plan, or /plan for a new one.";
            bot.send_message(chat_id, prompt)
                .reply_markup(make_quick_keyboard())
                .await?;
            dialogue
                .update(State::Planned {
                    record,
                    plan,
                    history: Vec::new(),
                })
                .await?;
        }

        (
            State::Planned {
                record,
                plan,
                history,
            },
            CallbackAction::Quick(number),
        ) => {
            let Some(question) = quick_question(number) else {
                return Ok(());
            };
            let session = (record, plan, history);
            answer_question(&bot, chat_id, &dialogue, &advisor, session, question).await?;
        }

        _ => {
            // Stale button from an earlier dialogue
            bot.send_message(chat_id, "That button is no longer active. Use /plan to start again.")
                .await?;
        }
    }

    Ok(())
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    dialogue: MyDialogue,
    advisor: Arc<AdvisorBot>,
) -> HandlerResult {
    let state = dialogue.get().await?.unwrap_or_default();

    match state {
        State::Planned {
            record,
            plan,
            history,
        } => {
            let Some(question) = msg.text().map(str::trim).filter(|t| !t.is_empty()) else {
                return Ok(());
            };
            let session = (record, plan, history);
            answer_question(&bot, msg.chat.id, &dialogue, &advisor, session, question).await?;
        }

        State::Start => {
            bot.send_message(msg.chat.id, "Use /plan to get today's training plan")
                .await?;
        }

        _ => {
            bot.send_message(msg.chat.id, "Use the buttons above, or /reset to start over.")
                .await?;
        }
    }

    Ok(())
}
