mod engine;
mod format;
mod signals;
mod timescale;
mod worker;

pub use engine::{StopOutcome, TimerEngine, STOP_TIMEOUT};
pub use format::{format_clock, format_seconds};
pub use signals::RunSignals;
pub use timescale::Timescale;
