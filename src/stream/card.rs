//! SimpleComponent emitters.
//!
//! Five sub-modes share one shape: allocate an id, introduce it in the
//! registry, emit the first frame, then emit partial updates the client
//! merges by id. The delayed variants hold a hard wait between the first
//! frame and the update.

use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::component::{ComponentKind, ComponentRegistry};
use crate::errors::StreamError;
use crate::ids::new_component_id;
use crate::stream::{DOT_PACE, StreamSink, emit_introduction, emit_update};

fn data(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

/// Single card: empty placeholder, loading prose, one full update.
pub async fn single_card(
    sink: &StreamSink,
    registry: &mut ComponentRegistry,
) -> Result<(), StreamError> {
    let settings = sink.settings().clone();
    let id = new_component_id();

    emit_introduction(
        sink,
        registry,
        &id,
        ComponentKind::SimpleComponent,
        Map::new(),
        settings.frame_delay,
    )
    .await?;

    sink.text("Generating your card").await?;
    if settings.simulate_processing {
        sink.dots(DOT_PACE).await?;
    }
    sink.raw(" ").await?;

    emit_update(
        sink,
        registry,
        &id,
        data(&[
            ("title", json!("Dynamic Card")),
            (
                "description",
                json!("Data loaded successfully from the backend"),
            ),
            ("value", json!(150)),
            ("timestamp", json!(now_iso())),
        ]),
        settings.frame_delay,
    )
    .await?;

    sink.raw(" All set!").await
}

/// Single delayed card: partial first frame, a hard five-second wait, then
/// a units-only partial update.
pub async fn delayed_card(
    sink: &StreamSink,
    registry: &mut ComponentRegistry,
) -> Result<(), StreamError> {
    let settings = sink.settings().clone();
    let id = new_component_id();

    emit_introduction(
        sink,
        registry,
        &id,
        ComponentKind::SimpleComponent,
        data(&[
            ("title", json!("Card Title")),
            ("date", json!(now_iso())),
            ("description", json!("Generating units... please wait.")),
        ]),
        settings.frame_delay,
    )
    .await?;

    sink.pause(settings.single_card_wait).await;

    emit_update(
        sink,
        registry,
        &id,
        data(&[
            ("description", json!("Units added successfully!")),
            ("units", json!(150)),
        ]),
        settings.frame_delay,
    )
    .await?;

    sink.raw("\n\u{2713} Units ready!").await
}

/// Several delayed cards: partial first frames in quick succession, one
/// shared wait, then per-card unit updates.
pub async fn delayed_multi_cards(
    sink: &StreamSink,
    registry: &mut ComponentRegistry,
    requested: usize,
) -> Result<(), StreamError> {
    let settings = sink.settings().clone();
    let count = requested.min(settings.max_components_per_response);

    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id = new_component_id();
        emit_introduction(
            sink,
            registry,
            &id,
            ComponentKind::SimpleComponent,
            data(&[
                ("title", json!(format!("Delayed Card #{}", i + 1))),
                ("date", json!(now_iso())),
                ("description", json!("Generating units... please wait.")),
            ]),
            settings.frame_delay,
        )
        .await?;
        ids.push(id);
    }

    let plural = if count == 1 { "" } else { "s" };
    sink.raw(format!("\nProcessing {count} delayed card{plural}"))
        .await?;

    if settings.simulate_processing {
        // Dot-paced so the client sees life during the wait
        sink.dots(settings.multi_card_wait / 3).await?;
    } else {
        sink.pause(settings.multi_card_wait).await;
    }
    sink.raw("\n").await?;

    for (i, id) in ids.iter().enumerate() {
        emit_update(
            sink,
            registry,
            id,
            data(&[
                ("description", json!("Units added successfully!")),
                ("units", json!(50 * (i + 1))),
            ]),
            settings.frame_delay,
        )
        .await?;
    }

    sink.raw(format!(
        "\n\u{2713} All {count} delayed card{plural} completed!\n"
    ))
    .await
}

/// Several cards: empty placeholders first, then each filled in order.
pub async fn multi_cards(
    sink: &StreamSink,
    registry: &mut ComponentRegistry,
    requested: usize,
) -> Result<(), StreamError> {
    let settings = sink.settings().clone();
    let count = requested.min(settings.max_components_per_response);

    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let id = new_component_id();
        emit_introduction(
            sink,
            registry,
            &id,
            ComponentKind::SimpleComponent,
            Map::new(),
            settings.frame_delay,
        )
        .await?;
        ids.push(id);
    }

    sink.text(&format!("Loading data for all {count} cards"))
        .await?;
    if settings.simulate_processing {
        sink.dots(DOT_PACE).await?;
    }
    sink.raw(" ").await?;

    for (i, id) in ids.iter().enumerate() {
        emit_update(
            sink,
            registry,
            id,
            data(&[
                ("title", json!(format!("Card {}", i + 1))),
                (
                    "description",
                    json!(format!("This is card number {} with unique data", i + 1)),
                ),
                ("value", json!(100 * (i + 1))),
                ("timestamp", json!(now_iso())),
            ]),
            settings.frame_delay,
        )
        .await?;
    }

    sink.raw(" Complete!").await
}

/// One card filled a single field at a time: title, then description, then
/// value.
pub async fn incremental_card(
    sink: &StreamSink,
    registry: &mut ComponentRegistry,
) -> Result<(), StreamError> {
    let settings = sink.settings().clone();
    let id = new_component_id();

    emit_introduction(
        sink,
        registry,
        &id,
        ComponentKind::SimpleComponent,
        Map::new(),
        settings.frame_delay,
    )
    .await?;

    sink.text("Watch the card load incrementally...").await?;

    emit_update(
        sink,
        registry,
        &id,
        data(&[("title", json!("Progressive Card"))]),
        settings.frame_delay,
    )
    .await?;
    emit_update(
        sink,
        registry,
        &id,
        data(&[("description", json!("Description loaded..."))]),
        settings.frame_delay,
    )
    .await?;
    emit_update(
        sink,
        registry,
        &id,
        data(&[("value", json!(100))]),
        settings.frame_delay,
    )
    .await?;

    sink.raw(" Done with incremental loading!").await
}
