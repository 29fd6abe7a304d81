use serde::{Deserialize, Serialize};

use crate::matrix::TaskStatus;

/// Display color handed to renderers for a task-slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayColor {
    Gray,
    Yellow,
    Red,
    Green,
    Orange,
}

/// Whether a slot is the one being timed, and on which side of its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotActivity {
    /// Not the current slot, or the session is idle.
    Inactive,
    UnderTarget,
    OverTarget,
}

/// Map a cell status and its activity to a color.
pub fn slot_color(status: TaskStatus, activity: SlotActivity) -> DisplayColor {
    match (status, activity) {
        (TaskStatus::Incomplete, SlotActivity::Inactive) => DisplayColor::Gray,
        (TaskStatus::Incomplete, SlotActivity::UnderTarget) => DisplayColor::Yellow,
        (TaskStatus::Incomplete, SlotActivity::OverTarget) => DisplayColor::Red,
        (TaskStatus::CompleteAt | TaskStatus::CompleteUnder, _) => DisplayColor::Green,
        (TaskStatus::CompleteOver, _) => DisplayColor::Orange,
        (TaskStatus::Skipped, _) => DisplayColor::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_slot_turns_red_in_overtime() {
        assert_eq!(
            slot_color(TaskStatus::Incomplete, SlotActivity::UnderTarget),
            DisplayColor::Yellow
        );
        assert_eq!(
            slot_color(TaskStatus::Incomplete, SlotActivity::OverTarget),
            DisplayColor::Red
        );
    }

    #[test]
    fn completed_slots_ignore_activity() {
        for activity in [
            SlotActivity::Inactive,
            SlotActivity::UnderTarget,
            SlotActivity::OverTarget,
        ] {
            assert_eq!(slot_color(TaskStatus::CompleteAt, activity), DisplayColor::Green);
            assert_eq!(slot_color(TaskStatus::CompleteUnder, activity), DisplayColor::Green);
            assert_eq!(slot_color(TaskStatus::CompleteOver, activity), DisplayColor::Orange);
            assert_eq!(slot_color(TaskStatus::Skipped, activity), DisplayColor::Gray);
        }
    }
}
