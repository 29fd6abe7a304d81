//! Chain and catalog editing commands.

use clap::Subcommand;
use roundchain_core::{format_secs, parse_secs, Database, TaskId};
use serde::Serialize;

use super::{load_session, print_json, save_session, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// List the chain in slot order
    List,
    /// Create a task and append it to the chain
    Add {
        name: String,
        /// Target time ("90", "1:30", "1:00:00")
        time: String,
    },
    /// Append another slot for an existing task
    Repeat {
        /// Task id
        id: String,
    },
    /// Remove the slot at INDEX (0-based)
    Remove { index: usize },
    /// Move a slot to a new index
    Move { from: usize, to: usize },
    /// Rename or retime the task in slot INDEX
    Edit {
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        time: Option<String>,
    },
    /// Rename or retime the current task
    EditCurrent {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        time: Option<String>,
    },
}

#[derive(Serialize)]
struct SlotRow {
    slot: usize,
    id: String,
    name: String,
    target_secs: u64,
    target: String,
}

pub fn run(action: TaskAction) -> CmdResult {
    let db = Database::open()?;
    let mut session = load_session(&db)?;
    let mut added: Option<TaskId> = None;

    let changed = match action {
        TaskAction::List => {
            let state = session.state();
            let rows: Vec<SlotRow> = state
                .chain()
                .iter()
                .enumerate()
                .map(|(slot, id)| {
                    let task = state.catalog().get(id);
                    let target_secs = task.map(|t| t.target_sec).unwrap_or(0);
                    SlotRow {
                        slot,
                        id: id.to_string(),
                        name: task.map(|t| t.name.clone()).unwrap_or_default(),
                        target_secs,
                        target: format_secs(target_secs),
                    }
                })
                .collect();
            print_json(&rows)?;
            return Ok(());
        }
        TaskAction::Add { name, time } => {
            added = session.add_task(name, parse_secs(&time));
            added.is_some()
        }
        TaskAction::Repeat { id } => session.add_slot(&TaskId::from(id)),
        TaskAction::Remove { index } => session.remove_slot(index),
        TaskAction::Move { from, to } => session.move_slot(from, to),
        TaskAction::Edit { index, name, time } => {
            let Some(id) = session.state().chain().get(index).cloned() else {
                return Err(format!("no slot at index {index}").into());
            };
            session.edit_task(&id, name, time.as_deref().map(parse_secs))
        }
        TaskAction::EditCurrent { name, time } => {
            let current = session.state().current_task().cloned();
            let Some(current) = current else {
                return Err("current slot has no task".into());
            };
            let target = time.as_deref().map(parse_secs).unwrap_or(current.target_sec);
            session.edit_current(name.unwrap_or_default(), target)
        }
    };

    if !changed {
        return Err("edit rejected".into());
    }
    save_session(&db, &session)?;
    match added {
        Some(id) => print_json(&serde_json::json!({ "id": id }))?,
        None => println!("ok"),
    }
    Ok(())
}
