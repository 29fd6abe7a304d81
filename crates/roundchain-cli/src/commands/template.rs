//! Named session template commands.

use clap::Subcommand;
use roundchain_core::{Database, ValidationError};
use tracing::info;

use super::{load_session, print_json, print_outcome, save_session, CmdResult};

#[derive(Subcommand)]
pub enum TemplateAction {
    /// List saved templates, newest first
    List,
    /// Save the current chain and round count under NAME
    Save { name: String },
    /// Replace the live session with a saved template
    Load {
        /// Template name or id
        name: String,
    },
    /// Delete a saved template
    Delete {
        /// Template name or id
        name: String,
    },
    /// Print a saved template as JSON
    Show {
        /// Template name or id
        name: String,
    },
}

pub fn run(action: TemplateAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        TemplateAction::List => {
            print_json(&db.list_templates()?)?;
        }
        TemplateAction::Save { name } => {
            let session = load_session(&db)?;
            let saved = db.save_template(&session.to_template(name))?;
            info!(id = %saved.id, name = %saved.name, "template saved");
            print_json(&saved)?;
        }
        TemplateAction::Load { name } => {
            let template = db
                .get_template(&name)?
                .ok_or(ValidationError::TemplateNotFound(name))?;
            let mut session = load_session(&db)?;
            let events = session.load_template(&template)?;
            save_session(&db, &session)?;
            print_outcome(&events, &session)?;
        }
        TemplateAction::Delete { name } => {
            if !db.delete_template(&name)? {
                return Err(ValidationError::TemplateNotFound(name).into());
            }
            println!("deleted");
        }
        TemplateAction::Show { name } => {
            let template = db
                .get_template(&name)?
                .ok_or(ValidationError::TemplateNotFound(name))?;
            print_json(&template)?;
        }
    }
    Ok(())
}
