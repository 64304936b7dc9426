pub mod config;
pub mod guard;
pub mod list;
pub mod session;
pub mod stats;

use focusgate_core::{
    Database, Event, FocusTrigger, MemoryRuleEngine, SessionController, TriggerFire,
};
use tokio::sync::mpsc::UnboundedReceiver;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the persistent store and build a controller over it.
fn open_controller(
) -> Result<(SessionController<MemoryRuleEngine>, UnboundedReceiver<TriggerFire>), Box<dyn std::error::Error>>
{
    let db = Database::open()?;
    let (trigger, fires) = FocusTrigger::new();
    Ok((
        SessionController::new(db, MemoryRuleEngine::new(), trigger),
        fires,
    ))
}

fn print_events(events: &[Event]) -> CliResult {
    for event in events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}
