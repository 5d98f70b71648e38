//! Agent - drives one conversation through request/tool rounds.
//!
//! A turn starts with a user message and keeps issuing requests while the
//! model asks for tools. Each round either commits in full (the assistant
//! message together with its tool results) or not at all, so dropping the
//! `submit` future at any await point leaves a consistent conversation.

use log::{debug, info, warn};

use crate::config::LlmConfig;
use crate::error::Result;
use crate::llm::codec::{self, RequestOptions};
use crate::llm::provider::{Credentials, ProviderProfile};
use crate::llm::streaming::StreamReassembler;
use crate::llm::tools::ToolExecutor;
use crate::llm::transport::{ChunkSink, Transport};
use crate::llm::types::{ContentBlock, Conversation, Message};
use crate::output::{Renderer, argument_preview, result_preview};
use crate::storage::Snapshot;

/// Request settings that stay fixed across turns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub system_prompt: String,
    pub max_tokens: u32,
    /// Request a streamed response and render text as it arrives
    pub stream: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for AgentSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            system_prompt: config.system_prompt.clone(),
            max_tokens: config.max_tokens,
            stream: config.stream,
        }
    }
}

/// Where the agent is within a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingTurn,
    RequestInFlight,
    Streaming,
    Buffered,
    BlocksReady,
    ToolsExecuting,
}

/// Summary of a finished turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Requests issued during the turn
    pub rounds: usize,
    /// Tools dispatched during the turn
    pub tool_invocations: usize,
}

pub struct Agent<T: Transport> {
    transport: T,
    tools: ToolExecutor,
    conversation: Conversation,
    model: String,
    credentials: Credentials,
    settings: AgentSettings,
    state: TurnState,
}

impl<T: Transport> Agent<T> {
    pub fn new(
        transport: T,
        tools: ToolExecutor,
        model: impl Into<String>,
        credentials: Credentials,
        settings: AgentSettings,
    ) -> Self {
        Self {
            transport,
            tools,
            conversation: Conversation::new(),
            model: model.into(),
            credentials,
            settings,
            state: TurnState::AwaitingTurn,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Replace the model; takes effect on the next request
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
        info!("Model switched to {}", self.model);
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
        info!("Conversation cleared");
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.model.clone(), self.conversation.messages().to_vec())
    }

    /// Replace the conversation, and the model when the snapshot names one
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.conversation.replace(snapshot.messages);
        if let Some(model) = snapshot.model {
            self.set_model(model);
        }
    }

    /// Run one turn to completion.
    ///
    /// The user message stays in the conversation when a round fails; the
    /// failed round itself leaves no trace.
    pub async fn submit(&mut self, user_text: &str, renderer: &mut dyn Renderer) -> Result<TurnOutcome> {
        if self.state != TurnState::AwaitingTurn {
            warn!("Previous turn was interrupted in state {:?}", self.state);
            self.state = TurnState::AwaitingTurn;
        }

        // Selected once per turn, before anything is appended
        let profile = ProviderProfile::resolve(&self.model, &self.credentials)?;
        info!("Turn started (model={}, history={})", self.model, self.conversation.len());

        self.conversation.push(Message::user(user_text));
        let mut outcome = TurnOutcome::default();

        loop {
            self.transition(TurnState::RequestInFlight);
            outcome.rounds += 1;

            let blocks = match self.request(&profile, renderer).await {
                Ok(blocks) => blocks,
                Err(e) => {
                    self.transition(TurnState::AwaitingTurn);
                    return Err(e);
                }
            };
            self.transition(TurnState::BlocksReady);

            if blocks.is_empty() {
                debug!("Empty response, nothing to append");
                self.transition(TurnState::AwaitingTurn);
                renderer.turn_finished();
                return Ok(outcome);
            }

            let assistant = Message::assistant(blocks);
            let invocations: Vec<(String, String, serde_json::Value)> = assistant
                .tool_invocations()
                .map(|(id, name, arguments)| (id.to_string(), name.to_string(), arguments.clone()))
                .collect();

            if invocations.is_empty() {
                self.conversation.push(assistant);
                self.transition(TurnState::AwaitingTurn);
                renderer.turn_finished();
                info!(
                    "Turn finished after {} rounds, {} tool calls",
                    outcome.rounds, outcome.tool_invocations
                );
                return Ok(outcome);
            }

            self.transition(TurnState::ToolsExecuting);
            let mut results = Vec::with_capacity(invocations.len());
            for (id, name, arguments) in invocations {
                renderer.tool_call(&name, &argument_preview(&arguments));
                // Failures go back to the model as the result text
                let content = self.tools.invoke(&name, arguments).await.unwrap_or_else(|error| error);
                renderer.tool_result(&result_preview(&content));
                results.push(ContentBlock::tool_result(id, content));
                outcome.tool_invocations += 1;
            }

            self.conversation.push(assistant);
            self.conversation.push(Message::tool_results(results));
        }
    }

    /// Send the conversation once and turn the response into blocks
    async fn request(&mut self, profile: &ProviderProfile, renderer: &mut dyn Renderer) -> Result<Vec<ContentBlock>> {
        let options = RequestOptions {
            system_prompt: self.settings.system_prompt.clone(),
            max_tokens: self.settings.max_tokens,
            stream: self.settings.stream,
        };
        let body = codec::encode_request(&self.conversation, profile, &self.tools.definitions(), &options);

        let indicator = renderer.start_activity();

        if !self.settings.stream {
            self.transition(TurnState::Buffered);
            let sent = self.transport.send(profile, &body, None).await;
            indicator.stop();

            let blocks = codec::decode_response(&sent?.body, profile)?;
            render_text(&blocks, renderer);
            return Ok(blocks);
        }

        self.transition(TurnState::Streaming);
        let mut reassembler = StreamReassembler::new(profile.wire_dialect);
        let sent = {
            let mut on_chunk = |chunk: &[u8]| {
                reassembler.feed(chunk, &mut |text| {
                    indicator.stop();
                    renderer.text_delta(text);
                });
                if reassembler.has_output() {
                    indicator.stop();
                }
            };
            let sink: ChunkSink<'_> = &mut on_chunk;
            self.transport.send(profile, &body, Some(sink)).await
        };
        indicator.stop();

        let envelope = match sent {
            Ok(envelope) => envelope,
            Err(e) => {
                renderer.response_finished();
                return Err(e.into());
            }
        };

        // A provider may ignore `stream` and answer with a plain JSON body
        if reassembler.events_seen() == 0 && is_plain_json(&envelope.body) {
            debug!("No stream events in response, decoding as a buffered body");
            let blocks = codec::decode_response(&envelope.body, profile)?;
            render_text(&blocks, renderer);
            return Ok(blocks);
        }

        let finished = reassembler.finish(&mut |text| renderer.text_delta(text));
        renderer.response_finished();
        Ok(finished?)
    }

    fn transition(&mut self, next: TurnState) {
        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Text of a response that arrived in one piece
fn render_text(blocks: &[ContentBlock], renderer: &mut dyn Renderer) {
    for block in blocks {
        if let ContentBlock::Text { text } = block {
            renderer.text_delta(text);
        }
    }
    renderer.response_finished();
}

/// A whole body that is a JSON document rather than SSE records
fn is_plain_json(body: &[u8]) -> bool {
    matches!(
        serde_json::from_slice::<serde_json::Value>(body),
        Ok(serde_json::Value::Object(_) | serde_json::Value::Array(_))
    )
}
