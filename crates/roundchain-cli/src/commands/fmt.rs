use clap::Subcommand;
use roundchain_core::{format_secs, parse_secs};

use super::CmdResult;

#[derive(Subcommand)]
pub enum FmtAction {
    /// Render seconds as M:SS or H:MM:SS
    Secs { secs: u64 },
    /// Parse "SS", "M:SS" or "H:MM:SS" into seconds (0 when malformed)
    Parse { text: String },
}

pub fn run(action: FmtAction) -> CmdResult {
    match action {
        FmtAction::Secs { secs } => println!("{}", format_secs(secs)),
        FmtAction::Parse { text } => println!("{}", parse_secs(&text)),
    }
    Ok(())
}
