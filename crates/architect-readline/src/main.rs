mod command;
mod helper;

use std::io::Write as IoWrite;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use strum::IntoEnumIterator;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use architect_application::{ReplyEnd, Screen, SessionController};
use architect_core::profile::{ProfileFields, Tone};
use architect_core::section::{SectionKind, SectionState};
use architect_core::session::{ChatMessage, ChatRole, View};
use architect_infrastructure::{
    ArchitectPaths, ConfigService, FileKeyValueStore, SecretService, SessionStore,
};
use architect_interaction::{GeminiApiClient, GenerationGateway};

use crate::command::Command;
use crate::helper::CliHelper;

type Repl = Editor<CliHelper, DefaultHistory>;

/// What the session loop should do after a command.
enum Flow {
    Continue,
    Logout,
    Quit,
}

/// Entry point for the Profile Architect terminal wizard.
///
/// Loads config and secrets, then alternates between the login prompt and a
/// session loop until the user quits.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // ===== Backend Initialization =====
    let paths = ArchitectPaths::new(None);
    let config = ConfigService::new(&paths)?.load()?;
    let api_key = SecretService::new(&paths)?.gemini_api_key()?;

    let client = Arc::new(GeminiApiClient::from_config(&config.gemini, api_key)?);
    let gateway = GenerationGateway::new(client, config.gemini.clone());

    let sessions_dir = match config.storage.data_dir.clone() {
        Some(dir) => dir,
        None => paths.sessions_dir()?,
    };
    tracing::debug!(dir = %sessions_dir.display(), "Using session directory");
    let store = SessionStore::new(Arc::new(FileKeyValueStore::new(sessions_dir)));

    // ===== REPL Setup =====
    let mut rl: Repl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    println!("{}", "=== LinkedIn Profile Architect ===".bright_magenta().bold());
    println!();

    while let Some(mut controller) = login(&mut rl, &store, &gateway)? {
        match run_session(&mut rl, &mut controller).await? {
            Flow::Quit => {
                controller.logout();
                break;
            }
            Flow::Logout | Flow::Continue => {
                controller.logout();
                println!("{}", "Logged out.".bright_black());
                println!();
            }
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

/// Asks for a business handle until one is accepted. `None` on Ctrl-D.
fn login(
    rl: &mut Repl,
    store: &SessionStore,
    gateway: &GenerationGateway,
) -> Result<Option<SessionController>> {
    match store.list_ids() {
        Ok(ids) if !ids.is_empty() => {
            println!("{}", "Known profiles:".bright_black());
            for id in ids {
                println!("  {}", id.cyan());
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Could not list stored sessions"),
    }

    loop {
        let handle = match rl.readline("Business handle: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if handle.trim() == "quit" {
            return Ok(None);
        }

        match SessionController::login(store.clone(), gateway.clone(), &handle) {
            Ok(controller) => {
                println!(
                    "{}",
                    format!("Welcome, {}.", controller.session().id).bright_green()
                );
                return Ok(Some(controller));
            }
            Err(e) => eprintln!("{}", format!("Error: {e}").red()),
        }
    }
}

async fn run_session(rl: &mut Repl, controller: &mut SessionController) -> Result<Flow> {
    let mut shown: Option<Screen> = None;

    loop {
        let screen = controller.screen();
        if screen == Screen::Onboarding {
            if !run_intake(rl, controller)? {
                return Ok(Flow::Logout);
            }
            continue;
        }
        if shown != Some(screen) {
            render(controller, screen);
            shown = Some(screen);
        }

        let prompt = format!("[{}] >> ", controller.session().view);
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => return Ok(Flow::Quit),
            Err(err) => return Err(err.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message.yellow());
                continue;
            }
        };

        match execute(controller, command, &mut shown).await {
            Ok(Flow::Continue) => {}
            Ok(flow) => return Ok(flow),
            Err(e) => eprintln!("{}", format!("Error: {e}").red()),
        }
    }
}

async fn execute(
    controller: &mut SessionController,
    command: Command,
    shown: &mut Option<Screen>,
) -> architect_core::Result<Flow> {
    match command {
        Command::Generate(kind) => {
            println!("{}", format!("Drafting {}...", kind.title()).bright_black());
            let watcher = CtrlCWatcher::start();
            if controller.generate_section(kind, watcher.token()).await? {
                print_section(controller, kind);
            } else {
                println!("{}", "(draft cancelled)".bright_black());
            }
        }
        Command::Select(kind, index) => {
            controller.select_option(kind, index)?;
            print_section(controller, kind);
        }
        Command::Edit(kind, index, text) => {
            controller.edit_option(kind, index, &text)?;
            print_section(controller, kind);
        }
        Command::Approve(kind) => {
            let approved = controller.toggle_approve(kind)?;
            let label = if approved { "approved" } else { "unlocked for editing" };
            println!("{}", format!("{} {label}.", kind.title()).green());
        }
        Command::Finalize => {
            controller.finalize()?;
            println!("{}", "Strategy finalized. Your persona is ready.".bright_green());
            *shown = None;
        }
        Command::Chat => {
            controller.set_view(View::PostWriter)?;
            *shown = None;
        }
        Command::Fix { image, query } => {
            let bytes = tokio::fs::read(&image).await?;
            let guessed = mime_guess::from_path(&image).first();
            let mime = guessed
                .as_ref()
                .filter(|m| m.type_() == mime_guess::mime::IMAGE)
                .map(|m| m.essence_str())
                .unwrap_or_default();
            println!("{}", "Analyzing screenshot...".bright_black());
            let watcher = CtrlCWatcher::start();
            tokio::select! {
                answer = controller.analyze_screenshot(&bytes, mime, &query) => print_block(&answer),
                _ = watcher.cancelled() => println!("{}", "(analysis cancelled)".bright_black()),
            }
        }
        Command::View(view) => {
            controller.set_view(view)?;
            *shown = None;
        }
        Command::Home => {
            controller.set_view(controller.home_view())?;
            *shown = None;
        }
        Command::Recover => {
            controller.recover()?;
            *shown = None;
        }
        Command::Show => *shown = None,
        Command::Help => print_help(controller),
        Command::Logout => return Ok(Flow::Logout),
        Command::Quit => return Ok(Flow::Quit),
        Command::Message(text) => {
            if controller.screen() != Screen::PostWriter {
                println!(
                    "{}",
                    "Messages go to the Content Studio. Use /chat once your strategy is finalized."
                        .yellow()
                );
            } else {
                stream_reply(controller, &text).await?;
            }
        }
    }
    Ok(Flow::Continue)
}

/// Cancels a token on Ctrl-C until dropped.
///
/// Once `tokio::signal::ctrl_c` has been awaited, SIGINT no longer ends the
/// process, so every model call the user waits on runs under one of these.
struct CtrlCWatcher {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl CtrlCWatcher {
    fn start() -> Self {
        let cancel = CancellationToken::new();
        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };
        Self { cancel, task }
    }

    fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

impl Drop for CtrlCWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Sends a chat message and prints the reply as it streams. Ctrl-C cancels
/// the reply.
async fn stream_reply(controller: &mut SessionController, text: &str) -> architect_core::Result<()> {
    let watcher = CtrlCWatcher::start();
    let mut printed = String::new();
    let end = controller
        .send_message(text, watcher.token(), |message: &ChatMessage| {
            match message.text.strip_prefix(printed.as_str()) {
                Some(delta) => print!("{}", delta.bright_blue()),
                None => print!("\n{}", message.text.red()),
            }
            let _ = std::io::stdout().flush();
            printed.clone_from(&message.text);
        })
        .await;
    drop(watcher);

    println!();
    if end? == ReplyEnd::Cancelled {
        println!("{}", "(reply cancelled)".bright_black());
    }
    Ok(())
}

/// Walks through the onboarding form. Returns `false` if the user bailed
/// out with Ctrl-D.
fn run_intake(rl: &mut Repl, controller: &mut SessionController) -> Result<bool> {
    println!();
    println!("{}", "Let's build your profile strategy.".bright_magenta().bold());

    loop {
        let mut fields = ProfileFields::default();
        let questions: [(&str, &mut String); 7] = [
            ("Full name", &mut fields.full_name),
            ("Business name", &mut fields.business_name),
            ("Industry", &mut fields.industry),
            ("Target audience", &mut fields.target_audience),
            ("Unique value proposition", &mut fields.value_proposition),
            ("Personal story", &mut fields.personal_story),
            ("Key achievements (optional)", &mut fields.achievements),
        ];
        for (label, slot) in questions {
            match ask(rl, &format!("{label}: "))? {
                Some(answer) => *slot = answer,
                None => return Ok(false),
            }
        }

        println!("{}", "Tone:".bright_black());
        let tones: Vec<Tone> = Tone::iter().collect();
        for (i, tone) in tones.iter().enumerate() {
            println!("  {}. {}", i + 1, tone.description());
        }
        let Some(choice) = ask(rl, "Choose 1-4 [1]: ")? else {
            return Ok(false);
        };
        fields.tone = choice
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| tones.get(i).copied());

        match controller.submit_profile(fields) {
            Ok(()) => return Ok(true),
            Err(e) => {
                eprintln!("{}", format!("Error: {e}").red());
                println!("{}", "Let's try that again.".yellow());
            }
        }
    }
}

fn ask(rl: &mut Repl, prompt: &str) -> Result<Option<String>> {
    loop {
        match rl.readline(prompt) {
            Ok(line) => return Ok(Some(line)),
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }
}

fn render(controller: &mut SessionController, screen: Screen) {
    println!();
    match screen {
        Screen::Onboarding => {}
        Screen::ProfileBuilder => {
            println!("{}", "== Strategy & Profile ==".bright_magenta().bold());
            for kind in SectionKind::iter() {
                print_section(controller, kind);
            }
            println!(
                "{}",
                "Approve headline, about and experience, then /finalize.".bright_black()
            );
        }
        Screen::Troubleshooter => {
            println!("{}", "== Fix Issues ==".bright_magenta().bold());
            println!(
                "{}",
                "Send a screenshot with /fix <image-path> [what you are stuck on].".bright_black()
            );
        }
        Screen::PostWriter => {
            println!("{}", "== Content Studio ==".bright_magenta().bold());
            if let Err(e) = controller.ensure_chat() {
                eprintln!("{}", format!("Error: {e}").red());
                return;
            }
            for message in &controller.session().chat_history {
                print_message(message);
            }
        }
        Screen::MissingPersona { recovery } => {
            println!("{}", "Error: Strategy not finalized.".red());
            println!(
                "{}",
                format!("Type /recover to go back to {recovery}.").yellow()
            );
        }
    }
    print_nav(controller);
}

fn print_nav(controller: &SessionController) {
    let views: Vec<String> = controller
        .available_views()
        .into_iter()
        .map(|v| v.to_string())
        .collect();
    if !views.is_empty() {
        println!(
            "{}",
            format!("Views: {}  (/view <name>, /home, /logout)", views.join(", ")).bright_black()
        );
    }
}

fn print_section(controller: &SessionController, kind: SectionKind) {
    let Some(section) = controller.section(kind) else {
        return;
    };
    let status = match section.state() {
        SectionState::Empty => "not drafted".bright_black(),
        SectionState::Generating => "drafting".yellow(),
        SectionState::Populated => "review".cyan(),
        SectionState::Approved => "approved".green(),
    };
    let required = if kind.is_required() { "" } else { " (optional)" };
    println!();
    println!("{} [{status}]{required}", section.title().bold());
    for (i, option) in section.options().iter().enumerate() {
        let marker = if section.selected_index() == Some(i) { "*" } else { " " };
        println!("{marker} {}.", i + 1);
        for line in option.lines() {
            println!("    {line}");
        }
    }
}

fn print_message(message: &ChatMessage) {
    match message.role {
        ChatRole::User => println!("{}", format!("> {}", message.text).green()),
        ChatRole::Model => print_block(&message.text),
    }
    println!();
}

fn print_block(text: &str) {
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
}

fn print_help(controller: &SessionController) {
    println!("{}", "Commands:".bold());
    println!("  /generate <section>            draft options (headline, about, experience, strategy)");
    println!("  /select <section> <n>          choose option n");
    println!("  /edit <section> <n> <text>     replace option n");
    println!("  /approve <section>             approve or unlock a section");
    println!("  /finalize                      compile your persona");
    println!("  /chat                          open the Content Studio");
    println!("  /fix <image-path> [question]   get help with a LinkedIn screen");
    println!("  /view <name>, /home, /recover  navigate");
    println!("  /show                          redraw the current screen");
    println!("  /logout, quit");
    print_nav(controller);
}
