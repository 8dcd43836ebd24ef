//! Response stream plumbing.
//!
//! Each request runs one emitter task that pushes byte chunks into a bounded
//! channel; the HTTP writer drains the channel into the chunked response
//! body. Every send is a suspension point, so a slow or gone client freezes
//! or cancels the emitter through natural flow control.

use std::time::Duration;

use axum::body::Bytes;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::warn;

use crate::component::{ComponentKind, ComponentRegistry, Envelope};
use crate::config::Settings;
use crate::errors::StreamError;

pub mod card;
pub mod chart;
pub mod patterns;
pub mod table;

/// Capacity of the frame channel. Small on purpose: the transport's flow
/// control is the backpressure mechanism, not internal buffering.
const CHANNEL_CAPACITY: usize = 32;

/// Pace of the simulated "..." processing dots.
pub(crate) const DOT_PACE: Duration = Duration::from_millis(300);

/// Write side of one response stream, with pacing helpers.
pub struct StreamSink {
    tx: mpsc::Sender<Bytes>,
    settings: Settings,
}

impl StreamSink {
    /// Create a sink and the receiver the HTTP writer will drain.
    pub fn channel(settings: Settings) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (Self { tx, settings }, rx)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Send one raw chunk. Failure means the client hung up; callers unwind
    /// with `?` and the request task ends at its next suspension point.
    pub async fn raw(&self, chunk: impl Into<Bytes>) -> Result<(), StreamError> {
        self.tx
            .send(chunk.into())
            .await
            .map_err(|_| StreamError::Disconnected)
    }

    /// Stream prose with typing pacing: the configured char delay between
    /// characters, the word delay after each word. Every word is followed by
    /// a single space.
    pub async fn text(&self, text: &str) -> Result<(), StreamError> {
        for word in text.split_whitespace() {
            for ch in word.chars() {
                self.raw(ch.to_string()).await?;
                sleep(self.settings.char_delay).await;
            }
            self.raw(" ").await?;
            sleep(self.settings.word_delay).await;
        }
        Ok(())
    }

    /// Three "working on it" dots, `pace` apart. Callers gate this on
    /// `settings.simulate_processing`.
    pub async fn dots(&self, pace: Duration) -> Result<(), StreamError> {
        for _ in 0..3 {
            self.raw(".").await?;
            sleep(pace).await;
        }
        Ok(())
    }

    /// Hard wait, unrelated to pacing configuration.
    pub async fn pause(&self, wait: Duration) {
        sleep(wait).await;
    }

    /// Encode and send one component frame, then hold `delay`.
    pub async fn frame(&self, envelope: &Envelope, delay: Duration) -> Result<(), StreamError> {
        self.raw(envelope.encode()).await?;
        sleep(delay).await;
        Ok(())
    }
}

/// Introduce a component in the registry and emit its first frame.
///
/// A duplicate id is a server bug: the frame is dropped and the stream
/// continues, per the error policy.
pub async fn emit_introduction(
    sink: &StreamSink,
    registry: &mut ComponentRegistry,
    id: &str,
    kind: ComponentKind,
    data: Map<String, Value>,
    delay: Duration,
) -> Result<(), StreamError> {
    if let Err(err) = registry.introduce(id, kind, data.clone()) {
        warn!(%err, "dropping introduction frame");
        return Ok(());
    }
    sink.frame(&Envelope::new(kind, id, data), delay).await
}

/// Merge a patch into a previously introduced component and emit the
/// partial-update frame.
///
/// An unknown id is a server bug: the frame is dropped and the stream
/// continues, per the error policy. This is also what enforces the
/// introduction-before-update wire invariant.
pub async fn emit_update(
    sink: &StreamSink,
    registry: &mut ComponentRegistry,
    id: &str,
    patch: Map<String, Value>,
    delay: Duration,
) -> Result<(), StreamError> {
    match registry.update(id, &patch) {
        Ok(kind) => sink.frame(&Envelope::new(kind, id, patch), delay).await,
        Err(err) => {
            warn!(%err, "dropping update frame");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn drain(mut rx: mpsc::Receiver<Bytes>) -> String {
        let mut out = Vec::new();
        while let Ok(chunk) = rx.try_recv() {
            out.extend_from_slice(&chunk);
        }
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_text_streams_with_trailing_word_spaces() {
        let (sink, rx) = StreamSink::channel(Settings::instant());
        sink.text("hello  streaming\nworld").await.unwrap();
        drop(sink);
        assert_eq!(drain(rx).await, "hello streaming world ");
    }

    #[tokio::test]
    async fn test_raw_fails_after_receiver_drops() {
        let (sink, rx) = StreamSink::channel(Settings::instant());
        drop(rx);
        let err = sink.raw("anyone there?").await.unwrap_err();
        assert!(matches!(err, StreamError::Disconnected));
    }

    #[tokio::test]
    async fn test_emit_introduction_writes_frame_and_registry() {
        let (sink, rx) = StreamSink::channel(Settings::instant());
        let mut registry = ComponentRegistry::new();
        emit_introduction(
            &sink,
            &mut registry,
            "abc",
            ComponentKind::SimpleComponent,
            Map::new(),
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert!(registry.has("abc"));
        let body = drain(rx).await;
        assert_eq!(
            body,
            r#"$$${"type":"SimpleComponent","id":"abc","data":{}}$$$"#
        );
    }

    #[tokio::test]
    async fn test_emit_update_unknown_id_drops_frame() {
        let (sink, rx) = StreamSink::channel(Settings::instant());
        let mut registry = ComponentRegistry::new();
        let mut patch = Map::new();
        patch.insert("title".into(), json!("ghost"));

        emit_update(&sink, &mut registry, "ghost", patch, Duration::ZERO)
            .await
            .unwrap();

        let body = drain(rx).await;
        assert!(body.is_empty(), "dropped frame must not reach the wire");
    }

    #[tokio::test]
    async fn test_emit_update_merges_into_registry() {
        let (sink, rx) = StreamSink::channel(Settings::instant());
        let mut registry = ComponentRegistry::new();
        emit_introduction(
            &sink,
            &mut registry,
            "card",
            ComponentKind::SimpleComponent,
            Map::new(),
            Duration::ZERO,
        )
        .await
        .unwrap();

        let mut patch = Map::new();
        patch.insert("value".into(), json!(150));
        emit_update(&sink, &mut registry, "card", patch, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(registry.get("card").unwrap()["value"], json!(150));
        let body = drain(rx).await;
        assert_eq!(body.matches("$$$").count(), 4);
    }
}
