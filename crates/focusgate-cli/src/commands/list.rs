use clap::Subcommand;
use focusgate_core::Database;

use super::CliResult;

#[derive(Subcommand)]
pub enum ListAction {
    /// Blocked sites
    Site {
        #[command(subcommand)]
        action: EntryAction,
    },
    /// Blocked keywords
    Keyword {
        #[command(subcommand)]
        action: EntryAction,
    },
}

#[derive(Subcommand)]
pub enum EntryAction {
    /// Add an entry
    Add { entry: String },
    /// Remove an entry
    Remove { entry: String },
    /// Print the list
    Show,
}

#[derive(Clone, Copy)]
enum Kind {
    Site,
    Keyword,
}

pub fn run(action: ListAction) -> CliResult {
    let db = Database::open()?;
    match action {
        ListAction::Site { action } => apply(&db, action, Kind::Site),
        ListAction::Keyword { action } => apply(&db, action, Kind::Keyword),
    }
}

fn apply(db: &Database, action: EntryAction, kind: Kind) -> CliResult {
    if let EntryAction::Show = action {
        let list = db.load_block_list()?;
        let entries = match kind {
            Kind::Site => list.sites(),
            Kind::Keyword => list.keywords(),
        };
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    // Editing is a deterrent-locked path, refused during a session. The
    // rule engine and the guard are the actual enforcement.
    if db.load_session_state()?.is_focusing {
        eprintln!("error: the block-list is locked while a focus session is active");
        std::process::exit(1);
    }

    let mut list = db.load_block_list()?;
    let (changed, entry) = match (action, kind) {
        (EntryAction::Add { entry }, Kind::Site) => (list.add_site(&entry), entry),
        (EntryAction::Add { entry }, Kind::Keyword) => (list.add_keyword(&entry), entry),
        (EntryAction::Remove { entry }, Kind::Site) => (list.remove_site(&entry), entry),
        (EntryAction::Remove { entry }, Kind::Keyword) => (list.remove_keyword(&entry), entry),
        (EntryAction::Show, _) => unreachable!("handled above"),
    };

    if changed {
        db.save_block_list(&list)?;
        println!("ok");
    } else {
        println!("unchanged: {entry}");
    }
    Ok(())
}
