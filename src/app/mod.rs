//! Bot orchestration: the dispatch loop tying channel, sessions, generation
//! and rendering together.

mod orchestrator;
mod progress;


pub use orchestrator::Orchestrator;
pub use progress::Progress;
