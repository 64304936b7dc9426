use clap::Subcommand;
use focusgate_core::{Config, Database, NavigationGuard};

use super::CliResult;

#[derive(Subcommand)]
pub enum GuardAction {
    /// Evaluate a navigation target against the current session state
    Check { url: String },
}

pub fn run(action: GuardAction) -> CliResult {
    match action {
        GuardAction::Check { url } => {
            let config = Config::load_or_default();
            let db = Database::open()?;
            let guard = NavigationGuard::new(config.dashboard.url);
            let verdict = guard.check(&db.load_session_state()?, &db.load_block_list()?, &url);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            Ok(())
        }
    }
}
