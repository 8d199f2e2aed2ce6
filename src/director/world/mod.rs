pub mod apply;
pub mod diff;
pub mod state;

pub use apply::{apply_event, apply_tool_call};
pub use diff::{DiffSource, FieldChange, WorldDiff};
pub use state::{Dimension, GameMode, Mob, Phase, PlayerState, Weather, WorldState};
