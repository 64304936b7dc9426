use clap::Subcommand;
use focusgate_core::{Command, Config, Event};

use super::{open_controller, print_events, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a focus session
    Start {
        /// Session length in minutes (defaults to the configured length)
        #[arg(long)]
        minutes: Option<u32>,
        /// Passphrase required to stop the session early
        #[arg(long)]
        passphrase: String,
    },
    /// Stop the current session (requires the passphrase)
    Stop {
        #[arg(long)]
        passphrase: String,
    },
    /// Reconcile enforcement state and print the current state
    Status,
    /// Live dashboard: countdown repaint plus expiry handling
    Watch,
}

pub async fn run(action: SessionAction) -> CliResult {
    match action {
        SessionAction::Start {
            minutes,
            passphrase,
        } => start(minutes, &passphrase),
        SessionAction::Stop { passphrase } => stop(&passphrase),
        SessionAction::Status => status(),
        SessionAction::Watch => watch().await,
    }
}

fn start(minutes: Option<u32>, passphrase: &str) -> CliResult {
    let config = Config::load_or_default();
    let minutes = minutes.unwrap_or(config.defaults.focus_minutes);
    let passphrase = passphrase.trim();

    // Invalid input is rejected here; no command is sent.
    if minutes == 0 {
        eprintln!("error: minutes must be a positive number");
        std::process::exit(1);
    }
    if passphrase.is_empty() {
        eprintln!("error: passphrase must not be empty");
        std::process::exit(1);
    }

    let (mut controller, _fires) = open_controller()?;
    controller.database().set_unlock_phrase(passphrase)?;
    let events = controller.handle(Command::StartFocus { minutes })?;
    print_events(&events)
}

fn stop(passphrase: &str) -> CliResult {
    let (mut controller, _fires) = open_controller()?;
    let stored = controller.database().unlock_phrase()?;
    if passphrase.trim() != stored {
        // Recoverable, user-visible failure: session state is untouched.
        eprintln!("error: passphrase does not match");
        std::process::exit(1);
    }
    let events = controller.handle(Command::StopFocus)?;
    print_events(&events)
}

fn status() -> CliResult {
    let (mut controller, _fires) = open_controller()?;
    let mut events = controller.handle(Command::CheckStatus)?;
    events.push(controller.snapshot()?);
    print_events(&events)
}

async fn watch() -> CliResult {
    let config = Config::load_or_default();
    let (mut controller, mut fires) = open_controller()?;
    print_events(&controller.handle(Command::CheckStatus)?)?;

    let refresh = config.dashboard.refresh_secs.max(1);
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(refresh));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Event::StateSnapshot { is_focusing, countdown, .. } = controller.snapshot()? {
                    if !is_focusing {
                        println!("standby");
                        break;
                    }
                    println!("focus  {countdown}");
                }
            }
            Some(fire) = fires.recv() => {
                let events = controller.on_trigger(fire)?;
                print_events(&events)?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
