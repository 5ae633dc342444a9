mod engine;
mod mode;

pub use engine::{Durations, TimerEngine, TimerState};
pub use mode::Mode;
