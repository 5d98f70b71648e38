//! Runner module - the agentic loop.
//!
//! [`Agent`] owns the conversation and the selected model, sends each round
//! through a [`Transport`](crate::llm::Transport) and dispatches requested
//! tools until the model answers without any.

mod agent;

pub use agent::{Agent, AgentSettings, TurnOutcome, TurnState};
