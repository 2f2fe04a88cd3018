//! Streaming client tests against the mock provider backend

mod harness;

use futures_util::StreamExt;
use harness::mock_provider::MockProvider;
use instruct_llm::types::ToolCallAccumulator;
use instruct_llm::{
    HttpConfig, OpenAiClient, Provider, QueryRequest, StreamActivity, StreamEvent, StreamEventType,
};

fn request() -> QueryRequest {
    QueryRequest::new("mock-model", "sys", "hello")
}

fn openai(mock: &MockProvider) -> OpenAiClient {
    OpenAiClient::from_config(HttpConfig::new(&mock.openai_base(), "test-key")).unwrap()
}

async fn collect_events(mock: &MockProvider) -> Vec<StreamEvent> {
    let stream = openai(mock).execute_stream(&request()).await.unwrap();
    stream
        .map(|result| result.expect("stream frames parse"))
        .collect()
        .await
}

#[tokio::test]
async fn responses_stream_yields_events_in_arrival_order() {
    let mock = MockProvider::start().await.unwrap();
    let events = collect_events(&mock).await;

    let types: Vec<StreamEventType> = events.iter().map(|e| e.event_type).collect();
    assert_eq!(
        types,
        vec![
            StreamEventType::Created,
            StreamEventType::OutputTextDelta,
            StreamEventType::OutputTextDelta,
            StreamEventType::ToolCallDelta,
            StreamEventType::ToolCallDelta,
            StreamEventType::OutputItemDone,
            StreamEventType::Completed,
        ]
    );

    assert!(events[0].is_thinking());
    assert_eq!(events[1].text_delta.as_deref(), Some("hi "));
    assert_eq!(events[2].text_delta.as_deref(), Some("there"));
    assert!(events.last().unwrap().is_final());
    assert_eq!(
        events.last().unwrap().status.as_deref(),
        Some("completed")
    );
}

#[tokio::test]
async fn done_sentinel_terminates_even_with_trailing_frames() {
    let mock = MockProvider::start().await.unwrap();
    let events = collect_events(&mock).await;

    // the transcript carries a text delta after [DONE]; it must not surface
    assert!(
        events
            .iter()
            .all(|e| e.text_delta.as_deref() != Some("never seen"))
    );
    assert_eq!(events.last().unwrap().event_type, StreamEventType::Completed);
}

#[tokio::test]
async fn malformed_frame_is_skipped_not_fatal() {
    let mock = MockProvider::start().await.unwrap();
    let events = collect_events(&mock).await;

    // the broken frame sits between the two text deltas; both survive
    let text: String = events
        .iter()
        .filter_map(|e| e.text_delta.clone())
        .collect();
    assert_eq!(text, "hi there");
}

#[tokio::test]
async fn streamed_tool_call_fragments_accumulate_into_one_call() {
    let mock = MockProvider::start().await.unwrap();
    let events = collect_events(&mock).await;

    let mut accumulator = ToolCallAccumulator::new();
    for event in &events {
        if event.activity == StreamActivity::ToolUse {
            accumulator.observe(event);
        }
    }

    let calls = accumulator.into_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id, "fc_1");
    assert_eq!(
        calls[0].arguments_json.as_deref(),
        Some("{\"city\":\"Oslo\"}")
    );
    assert_eq!(calls[0].name.as_deref(), Some("get_weather"));
}

#[tokio::test]
async fn legacy_text_streaming_surfaces_only_deltas() {
    let mock = MockProvider::start().await.unwrap();
    let chunks: Vec<String> = openai(&mock)
        .stream_text(&request())
        .await
        .unwrap()
        .map(|result| result.expect("chunks parse"))
        .collect()
        .await;

    assert_eq!(chunks, vec!["ab", "cd"]);

    let wire = mock.last_chat_request().unwrap();
    assert_eq!(wire["stream"], true);
}

#[tokio::test]
async fn reparsing_the_same_transcript_is_idempotent() {
    let mock = MockProvider::start().await.unwrap();
    let first = collect_events(&mock).await;
    let second = collect_events(&mock).await;

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.event_type, b.event_type);
        assert_eq!(a.activity, b.activity);
        assert_eq!(a.text_delta, b.text_delta);
        assert_eq!(a.raw_event_name, b.raw_event_name);
    }
}
