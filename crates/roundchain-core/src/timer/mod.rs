mod clock;
mod status;

pub use clock::{Clock, ManualClock, TimeSource, WallClock};
pub use status::{slot_color, DisplayColor, SlotActivity};
