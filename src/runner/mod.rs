mod dispatcher;
mod orchestrator;

pub use orchestrator::{Orchestrator, UnitReport};
