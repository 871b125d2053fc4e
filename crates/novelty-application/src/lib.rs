//! Application layer for Novelty Architect.
//!
//! This crate coordinates one generation from keywords to illustrated idea
//! cards: the simulated progress bar, the idea and image calls, and the
//! session state the presentation layer renders.

pub mod orchestrator;
pub mod progress;
pub mod session;

pub use orchestrator::GenerationOrchestrator;
pub use progress::{ProgressSimulator, ProgressState, ProgressStep};
pub use session::{GenerationSession, GenerationView, ImageOutcome, SessionEvent, SessionPhase};
