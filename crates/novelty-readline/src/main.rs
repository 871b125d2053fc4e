use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use novelty_application::GenerationOrchestrator;
use novelty_core::user::UserService;
use novelty_infrastructure::{
    ConfigBasedUserService, ConfigService, NoveltyPaths, SecretServiceImpl,
};
use novelty_interaction::{GeminiClient, GeminiIdeaAgent, GeminiImageAgent};

mod render;

use render::render_loop;

#[derive(Parser)]
#[command(name = "novelty")]
#[command(about = "Novelty Architect - turn keywords into illustrated invention ideas", long_about = None)]
struct Cli {
    /// Generate once for these keywords and exit
    #[arg(short, long)]
    keywords: Option<String>,

    /// Directory holding config.toml, secret.json and logs/
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "novelty_application=trace" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

/// REPL commands other than plain keyword input.
const COMMANDS: &[(&str, &str)] = &[
    ("/help", "show usage"),
    ("/bio", "show the grounding profile"),
    ("quit", "exit"),
    ("exit", "exit"),
];

/// Commands starting with `prefix`, in table order. Empty input matches nothing.
fn matching_commands(prefix: &str) -> Vec<(&'static str, &'static str)> {
    if prefix.is_empty() {
        return Vec::new();
    }
    COMMANDS
        .iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .copied()
        .collect()
}

/// Completes and hints REPL commands; anything else is keyword input.
#[derive(Clone, Default)]
struct CliHelper;

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = matching_commands(&line[..pos])
            .into_iter()
            .map(|(name, description)| Pair {
                display: format!("{name}  {description}"),
                replacement: name.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        if COMMANDS.iter().any(|(name, _)| *name == line.trim_end()) {
            Owned(line.bright_cyan().to_string())
        } else {
            Owned(line.red().to_string())
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        line.starts_with('/')
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    /// Suggests the rest of a slash command followed by what it does.
    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let typed = &line[..pos];
        if !typed.starts_with('/') || pos < line.len() {
            return None;
        }
        let (name, description) = matching_commands(typed).into_iter().next()?;
        Some(format!("{}  ({description})", &name[typed.len()..]))
    }
}

impl Validator for CliHelper {}

/// Routes tracing output to a daily log file so the terminal stays clean.
fn init_logging(paths: &NoveltyPaths, log_level: Option<&str>) -> Result<WorkerGuard> {
    let logs_dir = paths.logs_dir()?;
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{level}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let appender = tracing_appender::rolling::daily(&logs_dir, "novelty.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

/// Wires configuration, secrets and the Gemini clients into an orchestrator.
async fn bootstrap(paths: &NoveltyPaths) -> Result<(GenerationOrchestrator, Arc<dyn UserService>)> {
    let config_service = Arc::new(ConfigService::new(paths)?);
    let config = config_service
        .get_config()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;
    let settings = config.generation;

    let secret_service = SecretServiceImpl::new(paths)?;
    let api_key = match secret_service.gemini_api_key().await {
        Ok(key) if !key.trim().is_empty() => key,
        Err(err) if !err.is_config() => return Err(err).context("Failed to read secret.json"),
        _ => {
            let secret_path = paths.ensure_secret_file()?;
            bail!(
                "No Gemini API key configured. Add it to {} or set GEMINI_API_KEY.",
                secret_path.display()
            );
        }
    };

    let client = GeminiClient::new(api_key, settings.request_timeout())?;
    let idea_agent = GeminiIdeaAgent::new(client.clone())
        .with_model(settings.text_model.clone())
        .with_idea_count(settings.idea_count);
    let image_agent = GeminiImageAgent::new(client).with_model(settings.image_model.clone());

    tracing::info!(
        "[Bootstrap] text model: {}, image model: {}, ideas per round: {}",
        settings.text_model,
        settings.image_model,
        settings.idea_count
    );

    let user_service: Arc<dyn UserService> = Arc::new(ConfigBasedUserService::new(config_service));
    let orchestrator = GenerationOrchestrator::new(
        Arc::new(idea_agent),
        Arc::new(image_agent),
        Arc::clone(&user_service),
        settings,
    );

    Ok((orchestrator, user_service))
}

fn print_line(line: String) {
    println!("{line}");
}

async fn run_once(orchestrator: &GenerationOrchestrator, keywords: &str) -> Result<()> {
    let sessions = orchestrator.subscribe();
    let progress = orchestrator.subscribe_progress();
    if orchestrator.submit(keywords).is_none() {
        bail!("Keywords must not be empty");
    }

    let session = render_loop(sessions, progress, true, print_line).await;
    match session.error {
        Some(error) => bail!(error),
        None => Ok(()),
    }
}

fn print_help() {
    println!(
        "{}",
        "Type keywords (e.g. 'smart contracts for licensing') to generate ideas.".bright_black()
    );
    println!(
        "{}",
        "'/bio' shows the profile ideas are grounded in, 'quit' exits.".bright_black()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Backend Initialization =====
    let paths = NoveltyPaths::new(cli.config_dir.as_deref());
    let _log_guard = init_logging(&paths, cli.log_level.as_deref())?;
    let (orchestrator, user_service) = bootstrap(&paths).await?;

    if let Some(keywords) = cli.keywords {
        return run_once(&orchestrator, &keywords).await;
    }

    let renderer = tokio::spawn(render_loop(
        orchestrator.subscribe(),
        orchestrator.subscribe_progress(),
        false,
        print_line,
    ));

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    println!("{}", "=== Novelty Architect ===".bright_magenta().bold());
    print_help();
    println!();

    // ===== Main REPL Loop =====
    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                match trimmed {
                    "/help" => print_help(),
                    "/bio" => println!("{}", user_service.get_user_profile().bio.bright_blue()),
                    _ if trimmed.starts_with('/') => {
                        println!("{}", "Unknown command".bright_black());
                    }
                    keywords => {
                        orchestrator.submit(keywords);
                    }
                }
            }
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

    orchestrator.shutdown();
    renderer.abort();

    Ok(())
}
