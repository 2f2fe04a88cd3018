//! SSE stream consumption and event normalization
//!
//! The transport yields bytes; `eventsource-stream` reassembles SSE frames
//! (comment lines dropped, blank-line boundaries honored); [`parse`]
//! classifies each JSON payload. One unparseable frame is skipped, never
//! fatal. The pipeline is pull-driven, so dropping the stream cancels the
//! transfer and backpressure follows the consumer.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt, future};

use crate::error::LlmError;
use crate::types::StreamEvent;

pub mod parse;

pub use parse::classify;

/// A lazily-produced sequence of normalized stream events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

enum Frame {
    Event(StreamEvent),
    Skip,
    Done,
    Error(LlmError),
}

/// Normalize a streaming HTTP response body into stream events
///
/// `data: [DONE]` ends the sequence immediately; nothing after it is
/// yielded even if more bytes arrive.
pub fn events(response: reqwest::Response) -> EventStream {
    let frames = response
        .bytes_stream()
        .eventsource()
        .map(|result| match result {
            Ok(frame) => {
                let data = frame.data.trim();
                if data == "[DONE]" {
                    return Frame::Done;
                }
                match serde_json::from_str(data) {
                    Ok(payload) => Frame::Event(classify(
                        parse::resolve_event_name(&frame.event),
                        payload,
                    )),
                    Err(e) => {
                        tracing::debug!(error = %e, data = %data, "skipping unparseable SSE frame");
                        Frame::Skip
                    }
                }
            }
            Err(e) => Frame::Error(LlmError::Streaming(e.to_string())),
        })
        .take_while(|frame| future::ready(!matches!(frame, Frame::Done)))
        .filter_map(|frame| {
            future::ready(match frame {
                Frame::Event(event) => Some(Ok(event)),
                Frame::Error(e) => Some(Err(e)),
                Frame::Skip | Frame::Done => None,
            })
        });

    Box::pin(frames)
}

/// Reduce an event stream to its text deltas
///
/// Frames without a text delta are dropped; errors pass through.
pub fn text_deltas(
    events: EventStream,
) -> Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>> {
    Box::pin(events.filter_map(|result| {
        future::ready(match result {
            Ok(event) => event.text_delta.map(Ok),
            Err(e) => Some(Err(e)),
        })
    }))
}
