//! Streaming support for LLM responses.
//!
//! Raw transport chunks are split into `data:` records ([`SseLineDecoder`]),
//! decoded into [`RawEvent`]s and folded into a [`StreamAccumulator`] that
//! rebuilds the final content-block sequence. Tool-call arguments arrive as
//! partial JSON fragments; they are buffered per open call and parsed exactly
//! once, when the call closes.

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use super::codec::{DecodeError, api_error_message, parse_arguments};
use super::provider::WireDialect;
use super::types::ContentBlock;

/// Sentinel some providers send as the last record
const DONE_SENTINEL: &str = "[DONE]";

/// One decoded record from the byte stream
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// A dialect-specific JSON event envelope
    Data(Value),
    /// Explicit end-of-stream sentinel
    Done,
}

/// Splits a byte stream into SSE `data:` records.
///
/// Bytes are buffered until a full line is available, so chunk boundaries may
/// fall anywhere, including inside a multi-byte UTF-8 sequence.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every record completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<RawEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_line(&line[..line.len() - 1]) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing record that was not newline-terminated
    pub fn finish(&mut self) -> Option<RawEvent> {
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line)
    }
}

/// Parse one SSE line. Comments, `event:` lines and malformed payloads yield `None`.
pub fn parse_line(line: &[u8]) -> Option<RawEvent> {
    let line = String::from_utf8_lossy(line);
    let line = line.strip_suffix('\r').unwrap_or(&line);

    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data == DONE_SENTINEL {
        return Some(RawEvent::Done);
    }

    match serde_json::from_str::<Value>(data) {
        Ok(value @ Value::Object(_)) => Some(RawEvent::Data(value)),
        Ok(_) | Err(_) => {
            debug!("Skipping malformed stream line: {}", data);
            None
        }
    }
}

// Anthropic event shapes. Unknown event and block types fall into `Other`.

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicEvent {
    ContentBlockStart {
        content_block: StartBlock,
    },
    ContentBlockDelta {
        delta: BlockDelta,
    },
    ContentBlockStop {
        #[serde(default)]
        #[allow(dead_code)]
        index: usize,
    },
    MessageStop {},
    Error {
        error: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StartBlock {
    ToolUse {
        id: String,
        name: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BlockDelta {
    TextDelta {
        text: String,
    },
    InputJsonDelta {
        partial_json: String,
    },
    #[serde(other)]
    Other,
}

// OpenAI-compatible chunk shapes

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Option<Vec<ChunkChoice>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

/// A tool call whose arguments are still arriving
#[derive(Debug)]
struct OpenToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl OpenToolCall {
    fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            arguments: String::new(),
        }
    }

    fn finalize(self) -> Result<ContentBlock, DecodeError> {
        let arguments = parse_arguments(&self.name, &self.arguments)?;
        Ok(ContentBlock::ToolInvocation {
            id: self.id,
            name: self.name,
            arguments,
        })
    }
}

/// Working state for one in-flight streamed response
#[derive(Debug)]
pub struct StreamAccumulator {
    dialect: WireDialect,
    text: String,
    open_tool: Option<OpenToolCall>,
    finished: Vec<ContentBlock>,
    terminated: bool,
    events_seen: usize,
}

impl StreamAccumulator {
    pub fn new(dialect: WireDialect) -> Self {
        Self {
            dialect,
            text: String::new(),
            open_tool: None,
            finished: Vec::new(),
            terminated: false,
            events_seen: 0,
        }
    }

    /// Fold one event into the accumulated state. Text increments are passed
    /// to `on_text` as they arrive.
    pub fn apply(&mut self, event: RawEvent, on_text: &mut dyn FnMut(&str)) -> Result<(), DecodeError> {
        if self.terminated {
            return Ok(());
        }
        self.events_seen += 1;

        match event {
            RawEvent::Done => {
                self.terminated = true;
                Ok(())
            }
            RawEvent::Data(value) => match self.dialect {
                WireDialect::Anthropic => self.apply_anthropic(value, on_text),
                WireDialect::OpenAiCompatible => self.apply_openai(value, on_text),
            },
        }
    }

    fn apply_anthropic(&mut self, value: Value, on_text: &mut dyn FnMut(&str)) -> Result<(), DecodeError> {
        let event: AnthropicEvent = match serde_json::from_value(value) {
            Ok(event) => event,
            Err(e) => {
                debug!("Skipping unrecognised anthropic event: {}", e);
                return Ok(());
            }
        };

        match event {
            AnthropicEvent::ContentBlockStart {
                content_block: StartBlock::ToolUse { id, name },
            } => {
                self.close_open_tool()?;
                self.open_tool = Some(OpenToolCall::new(id, name));
            }
            AnthropicEvent::ContentBlockDelta { delta } => match delta {
                BlockDelta::TextDelta { text } => self.push_text(&text, on_text),
                BlockDelta::InputJsonDelta { partial_json } => match self.open_tool.as_mut() {
                    Some(tool) => tool.arguments.push_str(&partial_json),
                    None => debug!("input_json_delta without an open tool block"),
                },
                BlockDelta::Other => {}
            },
            AnthropicEvent::ContentBlockStop { .. } => self.close_open_tool()?,
            AnthropicEvent::MessageStop {} => {
                self.close_open_tool()?;
                self.terminated = true;
            }
            AnthropicEvent::Error { error } => return Err(DecodeError::Api(api_error_message(&error))),
            AnthropicEvent::ContentBlockStart { .. } | AnthropicEvent::Other => {}
        }
        Ok(())
    }

    fn apply_openai(&mut self, value: Value, on_text: &mut dyn FnMut(&str)) -> Result<(), DecodeError> {
        let chunk: ChatChunk = match serde_json::from_value(value) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!("Skipping unrecognised chat chunk: {}", e);
                return Ok(());
            }
        };

        if let Some(error) = chunk.error {
            return Err(DecodeError::Api(api_error_message(&error)));
        }

        let Some(delta) = chunk
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.delta)
        else {
            return Ok(());
        };

        if let Some(text) = delta.content {
            self.push_text(&text, on_text);
        }

        for call in delta.tool_calls.unwrap_or_default() {
            let function = call.function.unwrap_or(FunctionDelta {
                name: None,
                arguments: None,
            });

            // Any entry carrying an id opens a new call, even an empty or repeated one
            if let Some(id) = call.id {
                self.close_open_tool()?;
                self.open_tool = Some(OpenToolCall::new(id, function.name.unwrap_or_default()));
            }

            if let Some(fragment) = function.arguments {
                match self.open_tool.as_mut() {
                    Some(tool) => tool.arguments.push_str(&fragment),
                    None => debug!("tool call fragment without an open call"),
                }
            }
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str, on_text: &mut dyn FnMut(&str)) {
        if text.is_empty() {
            return;
        }
        self.text.push_str(text);
        on_text(text);
    }

    fn close_open_tool(&mut self) -> Result<(), DecodeError> {
        if let Some(tool) = self.open_tool.take() {
            self.finished.push(tool.finalize()?);
        }
        Ok(())
    }

    /// Number of events folded so far
    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    /// Whether anything user-visible has been produced yet
    pub fn has_output(&self) -> bool {
        !self.text.is_empty() || self.open_tool.is_some() || !self.finished.is_empty() || self.terminated
    }

    /// Freeze into the final block list: one leading text block (if any text
    /// arrived), then tool invocations in the order they were opened.
    pub fn finish(mut self) -> Result<Vec<ContentBlock>, DecodeError> {
        self.close_open_tool()?;

        let mut blocks = Vec::with_capacity(self.finished.len() + 1);
        if !self.text.is_empty() {
            blocks.push(ContentBlock::Text { text: self.text });
        }
        blocks.extend(self.finished);
        Ok(blocks)
    }
}

/// Byte-level front end: line splitting plus accumulation.
///
/// The first decode failure is kept and reported by [`finish`](Self::finish);
/// later chunks are ignored.
#[derive(Debug)]
pub struct StreamReassembler {
    lines: SseLineDecoder,
    accumulator: StreamAccumulator,
    failure: Option<DecodeError>,
}

impl StreamReassembler {
    pub fn new(dialect: WireDialect) -> Self {
        Self {
            lines: SseLineDecoder::new(),
            accumulator: StreamAccumulator::new(dialect),
            failure: None,
        }
    }

    /// Feed one transport chunk
    pub fn feed(&mut self, chunk: &[u8], on_text: &mut dyn FnMut(&str)) {
        if self.failure.is_some() {
            return;
        }
        for event in self.lines.push(chunk) {
            if let Err(e) = self.accumulator.apply(event, on_text) {
                self.failure = Some(e);
                return;
            }
        }
    }

    pub fn has_output(&self) -> bool {
        self.accumulator.has_output()
    }

    pub fn events_seen(&self) -> usize {
        self.accumulator.events_seen()
    }

    /// End of stream: flush the last line and freeze the block list
    pub fn finish(mut self, on_text: &mut dyn FnMut(&str)) -> Result<Vec<ContentBlock>, DecodeError> {
        if let Some(e) = self.failure {
            return Err(e);
        }
        if let Some(event) = self.lines.finish() {
            self.accumulator.apply(event, on_text)?;
        }
        self.accumulator.finish()
    }
}

/// Reassemble a complete captured stream body in one call
pub fn reassemble(dialect: WireDialect, body: &[u8]) -> Result<Vec<ContentBlock>, DecodeError> {
    let mut reassembler = StreamReassembler::new(dialect);
    reassembler.feed(body, &mut |_| {});
    reassembler.finish(&mut |_| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ANTHROPIC_STREAM: &str = concat!(
        "event: message_start\n",
        "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n",
        "event: content_block_start\n",
        "data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Let me \"}}\n\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"check ✓\"}}\n\n",
        "data: {\"type\":\"content_block_stop\",\"index\":0}\n\n",
        "data: {\"type\":\"content_block_start\",\"index\":1,\"content_block\":{\"type\":\"tool_use\",\"id\":\"toolu_1\",\"name\":\"read\",\"input\":{}}}\n\n",
        "data: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\\\"path\\\":\"}}\n\n",
        "data: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"\\\"a.txt\\\"}\"}}\n\n",
        "data: {\"type\":\"content_block_stop\",\"index\":1}\n\n",
        "event: ping\n",
        "data: {\"type\":\"ping\"}\n\n",
        "data: {\"type\":\"content_block_start\",\"index\":2,\"content_block\":{\"type\":\"tool_use\",\"id\":\"toolu_2\",\"name\":\"bash\",\"input\":{}}}\n\n",
        "data: {\"type\":\"content_block_stop\",\"index\":2}\n\n",
        "data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"tool_use\"}}\n\n",
        "data: {\"type\":\"message_stop\"}\n\n",
    );

    const OPENAI_STREAM: &str = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"Run\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"ning\"}}]}\n",
        ": keep-alive\n",
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"type\":\"function\",\"function\":{\"name\":\"bash\",\"arguments\":\"\"}}]}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"{\\\"cmd\\\":\"}}]}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"\\\"ls\\\"}\"}}]}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":1,\"id\":\"call_2\",\"type\":\"function\",\"function\":{\"name\":\"read\",\"arguments\":\"{\\\"path\\\":\\\"b\\\"}\"}}]}}]}\n",
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n",
        "data: [DONE]\n",
    );

    fn anthropic_expected() -> Vec<ContentBlock> {
        vec![
            ContentBlock::text("Let me check ✓"),
            ContentBlock::tool_invocation("toolu_1", "read", json!({"path": "a.txt"})),
            ContentBlock::tool_invocation("toolu_2", "bash", json!({})),
        ]
    }

    fn openai_expected() -> Vec<ContentBlock> {
        vec![
            ContentBlock::text("Running"),
            ContentBlock::tool_invocation("call_1", "bash", json!({"cmd": "ls"})),
            ContentBlock::tool_invocation("call_2", "read", json!({"path": "b"})),
        ]
    }

    fn feed_in_chunks(dialect: WireDialect, body: &str, size: usize) -> (Vec<ContentBlock>, String) {
        let mut forwarded = String::new();
        let mut reassembler = StreamReassembler::new(dialect);
        for chunk in body.as_bytes().chunks(size) {
            reassembler.feed(chunk, &mut |t| forwarded.push_str(t));
        }
        let blocks = reassembler.finish(&mut |t| forwarded.push_str(t)).unwrap();
        (blocks, forwarded)
    }

    #[test]
    fn test_parse_line_variants() {
        assert_eq!(parse_line(b"data: [DONE]"), Some(RawEvent::Done));
        assert_eq!(parse_line(b"data:{\"a\":1}\r"), Some(RawEvent::Data(json!({"a": 1}))));
        assert_eq!(parse_line(b"event: ping"), None);
        assert_eq!(parse_line(b": comment"), None);
        assert_eq!(parse_line(b"data: not json"), None);
        assert_eq!(parse_line(b"data: 42"), None);
        assert_eq!(parse_line(b""), None);
    }

    #[test]
    fn test_line_decoder_holds_partial_lines() {
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        assert_eq!(decoder.push(b":1}\ndata: [DO"), vec![RawEvent::Data(json!({"a": 1}))]);
        assert!(decoder.push(b"NE]").is_empty());
        assert_eq!(decoder.finish(), Some(RawEvent::Done));
    }

    #[test]
    fn test_anthropic_stream_whole() {
        let (blocks, forwarded) = feed_in_chunks(WireDialect::Anthropic, ANTHROPIC_STREAM, ANTHROPIC_STREAM.len());
        assert_eq!(blocks, anthropic_expected());
        assert_eq!(forwarded, "Let me check ✓");
    }

    #[test]
    fn test_anthropic_stream_one_byte_chunks() {
        let whole = feed_in_chunks(WireDialect::Anthropic, ANTHROPIC_STREAM, ANTHROPIC_STREAM.len());
        let bytewise = feed_in_chunks(WireDialect::Anthropic, ANTHROPIC_STREAM, 1);
        assert_eq!(whole, bytewise);
    }

    #[test]
    fn test_openai_stream_whole() {
        let (blocks, forwarded) = feed_in_chunks(WireDialect::OpenAiCompatible, OPENAI_STREAM, OPENAI_STREAM.len());
        assert_eq!(blocks, openai_expected());
        assert_eq!(forwarded, "Running");
    }

    #[test]
    fn test_openai_stream_one_byte_chunks() {
        let whole = feed_in_chunks(WireDialect::OpenAiCompatible, OPENAI_STREAM, OPENAI_STREAM.len());
        let bytewise = feed_in_chunks(WireDialect::OpenAiCompatible, OPENAI_STREAM, 1);
        assert_eq!(whole, bytewise);
    }

    #[test]
    fn test_argument_fragments_concatenate_anthropic() {
        let mut acc = StreamAccumulator::new(WireDialect::Anthropic);
        let events = [
            json!({"type": "content_block_start", "index": 0, "content_block": {"type": "tool_use", "id": "t1", "name": "x"}}),
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "input_json_delta", "partial_json": "{\"a\":"}}),
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "input_json_delta", "partial_json": "1}"}}),
            json!({"type": "content_block_stop", "index": 0}),
        ];
        for event in events {
            acc.apply(RawEvent::Data(event), &mut |_| {}).unwrap();
        }
        assert_eq!(
            acc.finish().unwrap(),
            vec![ContentBlock::tool_invocation("t1", "x", json!({"a": 1}))]
        );
    }

    #[test]
    fn test_argument_fragments_concatenate_openai() {
        let mut acc = StreamAccumulator::new(WireDialect::OpenAiCompatible);
        let events = [
            json!({"choices": [{"delta": {"tool_calls": [{"id": "c1", "function": {"name": "x", "arguments": "{\"a\":"}}]}}]}),
            json!({"choices": [{"delta": {"tool_calls": [{"function": {"arguments": "1}"}}]}}]}),
        ];
        for event in events {
            acc.apply(RawEvent::Data(event), &mut |_| {}).unwrap();
        }
        // End of stream finalizes the still-open call
        assert_eq!(
            acc.finish().unwrap(),
            vec![ContentBlock::tool_invocation("c1", "x", json!({"a": 1}))]
        );
    }

    fn apply_all(dialect: WireDialect, events: Vec<Value>) -> Result<Vec<ContentBlock>, DecodeError> {
        let mut acc = StreamAccumulator::new(dialect);
        for event in events {
            acc.apply(RawEvent::Data(event), &mut |_| {})?;
        }
        acc.finish()
    }

    #[test]
    fn test_empty_id_still_starts_a_call() {
        let events = vec![
            json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "id": "", "function": {"name": "bash", "arguments": "{\"cmd\":"}}]}}]}),
            json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "function": {"arguments": "\"ls\"}"}}]}}]}),
        ];
        assert_eq!(
            apply_all(WireDialect::OpenAiCompatible, events).unwrap(),
            vec![ContentBlock::tool_invocation("", "bash", json!({"cmd": "ls"}))]
        );
    }

    #[test]
    fn test_empty_id_after_open_call_starts_another() {
        let events = vec![
            json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "id": "call_1", "function": {"name": "bash", "arguments": "{\"cmd\":\"ls\"}"}}]}}]}),
            json!({"choices": [{"delta": {"tool_calls": [{"index": 1, "id": "", "function": {"name": "read", "arguments": "{\"path\":\"a\"}"}}]}}]}),
        ];
        assert_eq!(
            apply_all(WireDialect::OpenAiCompatible, events).unwrap(),
            vec![
                ContentBlock::tool_invocation("call_1", "bash", json!({"cmd": "ls"})),
                ContentBlock::tool_invocation("", "read", json!({"path": "a"})),
            ]
        );
    }

    #[test]
    fn test_repeated_id_starts_another_call() {
        let events = vec![
            json!({"choices": [{"delta": {"tool_calls": [{"id": "c1", "function": {"name": "x", "arguments": "{\"a\":1}"}}]}}]}),
            json!({"choices": [{"delta": {"tool_calls": [{"id": "c1", "function": {"name": "y", "arguments": "{\"a\":2}"}}]}}]}),
        ];
        assert_eq!(
            apply_all(WireDialect::OpenAiCompatible, events).unwrap(),
            vec![
                ContentBlock::tool_invocation("c1", "x", json!({"a": 1})),
                ContentBlock::tool_invocation("c1", "y", json!({"a": 2})),
            ]
        );
    }

    #[test]
    fn test_text_always_leads_tool_blocks() {
        let mut acc = StreamAccumulator::new(WireDialect::Anthropic);
        let events = [
            json!({"type": "content_block_start", "index": 0, "content_block": {"type": "tool_use", "id": "t1", "name": "x"}}),
            json!({"type": "content_block_stop", "index": 0}),
            json!({"type": "content_block_delta", "index": 1, "delta": {"type": "text_delta", "text": "after"}}),
        ];
        for event in events {
            acc.apply(RawEvent::Data(event), &mut |_| {}).unwrap();
        }
        let blocks = acc.finish().unwrap();
        assert_eq!(blocks[0], ContentBlock::text("after"));
        assert!(blocks[1].is_tool_invocation());
    }

    #[test]
    fn test_malformed_events_are_skipped() {
        let body = concat!(
            "data: {oops\n",
            "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\"}}\n",
            "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"ok\"}}\n",
        );
        assert_eq!(reassemble(WireDialect::Anthropic, body.as_bytes()).unwrap(), vec![ContentBlock::text("ok")]);
    }

    #[test]
    fn test_invalid_concatenated_arguments_fail() {
        let body = concat!(
            "data: {\"type\":\"content_block_start\",\"content_block\":{\"type\":\"tool_use\",\"id\":\"t\",\"name\":\"x\"}}\n",
            "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\\\"a\\\":\"}}\n",
            "data: {\"type\":\"content_block_stop\"}\n",
        );
        let err = reassemble(WireDialect::Anthropic, body.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::ToolArguments { .. }));
    }

    #[test]
    fn test_stream_error_event_surfaces() {
        let body = "data: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n";
        let err = reassemble(WireDialect::Anthropic, body.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "API Error: Overloaded");
    }

    #[test]
    fn test_events_after_terminal_are_ignored() {
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"done\"}}]}\n",
            "data: [DONE]\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" extra\"}}]}\n",
        );
        assert_eq!(
            reassemble(WireDialect::OpenAiCompatible, body.as_bytes()).unwrap(),
            vec![ContentBlock::text("done")]
        );
    }

    #[test]
    fn test_empty_stream_yields_no_blocks() {
        let reassembler = StreamReassembler::new(WireDialect::Anthropic);
        assert!(!reassembler.has_output());
        assert_eq!(reassembler.events_seen(), 0);
        assert!(reassembler.finish(&mut |_| {}).unwrap().is_empty());
    }

    #[test]
    fn test_has_output_after_first_text() {
        let mut reassembler = StreamReassembler::new(WireDialect::OpenAiCompatible);
        reassembler.feed(b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n", &mut |_| {});
        assert!(!reassembler.has_output());
        reassembler.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n", &mut |_| {});
        assert!(reassembler.has_output());
    }
}
