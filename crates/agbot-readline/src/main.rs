mod command;
mod paint;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use agbot_core::render::{ClockFormat, RenderOptions, UserTextMode, render};
use agbot_core::session::{ControllerOptions, SessionController, SessionEvent};
use agbot_interaction::config::{self, SessionSettings};
use agbot_interaction::GeminiCompletionClient;

use crate::command::{COMMANDS, ShellCommand};
use crate::paint::{paint_message, paint_recent_searches};

const SAFETY_NOTICE: &str = "Always consult a licensed electrician like AG Electrical Group \
for complex electrical work and follow local safety codes.";
const EMERGENCY_NOTICE: &str =
    "For emergency electrical issues, contact a qualified electrician immediately.";

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render_options(settings: &SessionSettings) -> RenderOptions {
    let clock = if settings.uses_twelve_hour_clock() {
        ClockFormat::TwelveHour
    } else {
        ClockFormat::TwentyFourHour
    };
    let user_text = if settings.literal_user_text {
        UserTextMode::Literal
    } else {
        UserTextMode::Markdown
    };
    RenderOptions::default()
        .with_clock(clock)
        .with_user_text(user_text)
}

fn print_banner() {
    println!("{}", "=== AG Intelligent Bot ===".bright_blue().bold());
    println!("{}", "AG Electrical Group".bright_black());
    println!("{}", format!("⚠ {SAFETY_NOTICE}").yellow());
    println!(
        "{}",
        "Ask about electrical systems, safety, or technical specifications. \
         Type '/recent' for recent searches, '/help' for commands, or 'quit' to exit."
            .bright_black()
    );
    println!();
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  /recent      show or hide recent searches");
    println!("  /pick <n>    put recent search n into the prompt");
    println!("  /close       hide recent searches");
    println!("  quit         leave");
    println!(
        "{}",
        "Press Enter to send your message. Ctrl-C cancels a running request.".bright_black()
    );
    println!("{}", EMERGENCY_NOTICE.bright_black());
}

/// Discards notifications that piled up from panel and input changes.
fn drain_stale(events: &mut broadcast::Receiver<SessionEvent>) {
    while events.try_recv().is_ok() {}
}

/// Prints appended messages until the session is idle again.
async fn follow_request(events: &mut broadcast::Receiver<SessionEvent>, options: &RenderOptions) {
    let mut seen_in_flight = false;
    loop {
        match events.recv().await {
            Ok(SessionEvent::MessageAppended(message)) => {
                println!("{}\n", paint_message(&render(&message, options)));
            }
            Ok(SessionEvent::StateChanged(state)) => {
                if state.is_request_in_flight() {
                    if !seen_in_flight {
                        println!("{}", "Processing your request...".bright_black());
                    }
                    seen_in_flight = true;
                } else if seen_in_flight {
                    return;
                }
            }
            Ok(SessionEvent::RecentSearchesChanged(_)) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Display fell behind session events");
            }
            Err(RecvError::Closed) => return,
        }
    }
}

/// Prints messages already queued on `events` without waiting for more.
fn print_appended(events: &mut broadcast::Receiver<SessionEvent>, options: &RenderOptions) {
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::MessageAppended(message) = event {
            println!("{}\n", paint_message(&render(&message, options)));
        }
    }
}

/// The main entry point for the AG bot REPL.
///
/// Loads configuration and the API key, starts a session controller backed
/// by Gemini, and drives it from a rustyline prompt. Output is drawn from
/// session events, so the transcript shown is exactly what the controller
/// recorded.
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // ===== Backend Initialization =====
    let config = config::load_config()?;
    let api_key = config::resolve_api_key()?;
    let client = Arc::new(GeminiCompletionClient::from_config(&config, api_key));
    let controller = SessionController::with_options(
        client,
        ControllerOptions {
            request_timeout: config.session.request_timeout(),
            ..Default::default()
        },
    );
    let options = render_options(&config.session);
    let mut events = controller.subscribe();

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    print_banner();
    for message in controller.transcript().await.iter() {
        println!("{}\n", paint_message(&render(message, &options)));
    }

    // ===== Main REPL Loop =====
    loop {
        let pending = controller.state().await.pending_input;
        let readline = if pending.is_empty() {
            rl.readline(">> ")
        } else {
            rl.readline_with_initial(">> ", (pending.as_str(), ""))
        };

        match readline {
            Ok(line) => match ShellCommand::parse(&line) {
                ShellCommand::Quit => {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                ShellCommand::Empty => continue,
                ShellCommand::Help => print_help(),
                ShellCommand::ToggleRecent => {
                    controller.toggle_recent_searches_panel().await;
                    if controller.state().await.is_recent_searches_panel_open {
                        let recent = controller.recent_searches().await;
                        println!("{}", paint_recent_searches(&recent));
                    }
                }
                ShellCommand::CloseRecent => controller.close_recent_searches_panel().await,
                ShellCommand::Pick(n) => {
                    if !controller.select_recent_search_at(n - 1).await {
                        println!("{}", format!("No recent search #{n}").yellow());
                    }
                }
                ShellCommand::Unknown(cmd) => {
                    println!("{}", format!("Unknown command: {cmd}").bright_black());
                }
                ShellCommand::Ask(question) => {
                    let _ = rl.add_history_entry(&question);
                    controller.set_pending_input(question).await;
                    if !controller.state().await.can_submit() {
                        continue;
                    }
                    drain_stale(&mut events);

                    let Some(handle) = controller.submit_pending().await else {
                        continue;
                    };

                    let interrupted = tokio::select! {
                        _ = follow_request(&mut events, &options) => false,
                        _ = tokio::signal::ctrl_c() => true,
                    };
                    if interrupted {
                        println!("{}", "Cancelling request...".yellow());
                        handle.cancel();
                        handle.wait().await;
                        print_appended(&mut events, &options);
                    }
                }
            },
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
