mod category;
mod engine;
mod sequencer;

pub use category::{Category, CategoryFilter, IntervalState};
pub use engine::{Interval, IntervalHandle};
pub use sequencer::{get_interval, next_category};
