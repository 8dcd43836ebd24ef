//! ChartComponent emitters.
//!
//! Charts stream as a skeleton frame (chart_type, title, x_axis, empty
//! series) followed by point updates. The `series` field is replaced
//! wholesale on every frame; the `values` array inside the single series is
//! the accumulating dimension, rebuilt from the registry before each frame.
//! Multiple charts interleave round-robin by point index.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::component::presets::ChartPreset;
use crate::component::{ComponentKind, ComponentRegistry};
use crate::errors::StreamError;
use crate::ids::new_component_id;
use crate::stream::patterns::collection_count;
use crate::stream::{DOT_PACE, StreamSink, emit_introduction, emit_update};

static BAR_FAMILY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(bars?|revenue|performance|metrics?)\b").unwrap());
static LINE_FAMILY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(lines?|trends?|growth|sales?)\b").unwrap());
static REVENUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\brevenue\b").unwrap());
static PERFORMANCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(performance|metrics?)\b").unwrap());
static GROWTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bgrowth\b").unwrap());

struct ChartPlan {
    id: String,
    preset: ChartPreset,
    values: Vec<Value>,
}

/// Chart presets named in the message, bar scenarios before line scenarios.
/// Empty when only generic chart words appear; resolution fills later.
fn detect_presets(lower: &str) -> Vec<ChartPreset> {
    let mut presets = Vec::new();
    if BAR_FAMILY.is_match(lower) {
        if REVENUE.is_match(lower) {
            presets.push(ChartPreset::RevenueBar);
        } else if PERFORMANCE.is_match(lower) {
            presets.push(ChartPreset::PerformanceBar);
        } else {
            presets.push(ChartPreset::RevenueBar);
        }
    }
    if LINE_FAMILY.is_match(lower) {
        if GROWTH.is_match(lower) {
            presets.push(ChartPreset::GrowthLine);
        } else {
            presets.push(ChartPreset::SalesLine);
        }
    }
    presets
}

/// Same-kind duplication and canonical-order fill, as for tables: one named
/// preset with a higher count duplicates it ("two line charts"); otherwise
/// distinct presets fill in canonical order ("two charts").
fn resolve_presets(count: usize, named: Vec<ChartPreset>) -> Vec<ChartPreset> {
    if count > named.len() {
        if named.len() == 1 {
            return vec![named[0]; count];
        }
        let mut resolved = named;
        for preset in ChartPreset::ALL {
            if resolved.len() >= count {
                break;
            }
            if !resolved.contains(&preset) {
                resolved.push(preset);
            }
        }
        return resolved;
    }
    named.into_iter().take(count).collect()
}

/// Stream one or more charts with progressive point updates.
pub async fn handle_charts(
    lower: &str,
    sink: &StreamSink,
    registry: &mut ComponentRegistry,
) -> Result<(), StreamError> {
    let settings = sink.settings().clone();

    let mut presets = resolve_presets(collection_count(lower), detect_presets(lower));
    presets.truncate(settings.max_charts_per_response);
    let count = presets.len();

    let plans: Vec<ChartPlan> = presets
        .iter()
        .map(|preset| {
            let mut values = preset.values();
            values.truncate(settings.max_chart_points);
            ChartPlan {
                id: new_component_id(),
                preset: *preset,
                values,
            }
        })
        .collect();

    // Skeletons carry the immutable header: chart_type, title, x_axis
    for plan in &plans {
        let mut data = Map::new();
        data.insert("chart_type".into(), json!(plan.preset.chart_type()));
        data.insert("title".into(), json!(plan.preset.title()));
        data.insert("x_axis".into(), Value::Array(plan.preset.x_axis()));
        data.insert("series".into(), json!([]));
        emit_introduction(
            sink,
            registry,
            &plan.id,
            ComponentKind::ChartComponent,
            data,
            settings.frame_delay,
        )
        .await?;
    }

    sink.raw("\n").await?;
    if count == 1 {
        sink.text(&format!(
            "Generating {} chart",
            plans[0].preset.chart_type()
        ))
        .await?;
    } else {
        sink.text(&format!("Generating all {count} charts")).await?;
    }
    if settings.simulate_processing {
        sink.dots(DOT_PACE).await?;
    }
    sink.raw("\n").await?;

    // Round-robin by point index across charts in declared order
    let max_points = plans.iter().map(|plan| plan.values.len()).max().unwrap_or(0);
    for point_idx in 0..max_points {
        for plan in &plans {
            let Some(value) = plan.values.get(point_idx) else {
                continue;
            };
            let mut values = registry
                .get(&plan.id)
                .and_then(|data| data.get("series"))
                .and_then(Value::as_array)
                .and_then(|series| series.first())
                .and_then(|series| series.get("values"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            values.push(value.clone());

            let mut patch = Map::new();
            patch.insert(
                "series".into(),
                json!([{ "label": plan.preset.series_label(), "values": values }]),
            );
            emit_update(sink, registry, &plan.id, patch, settings.chart_point_delay).await?;
        }

        if (point_idx + 1) % 2 == 0 && point_idx < max_points - 1 {
            sink.raw(format!("\nLoaded {}/{max_points} points...\n", point_idx + 1))
                .await?;
        }
    }

    let total: usize = plans.iter().map(|plan| plan.values.len()).sum();
    if count == 1 {
        sink.raw(format!(
            "\n\u{2713} Chart completed with {total} data points!"
        ))
        .await
    } else {
        sink.raw(format!(
            "\n\u{2713} All {count} charts completed with {total} total data points!"
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::COMPONENT_DELIMITER;
    use crate::config::Settings;

    async fn run(message: &str) -> String {
        let (sink, mut rx) = StreamSink::channel(Settings::instant());
        let lower = message.to_lowercase();
        let emitter = tokio::spawn(async move {
            let mut registry = ComponentRegistry::new();
            handle_charts(&lower, &sink, &mut registry).await.unwrap();
        });
        let mut out = Vec::new();
        while let Some(chunk) = rx.recv().await {
            out.extend_from_slice(&chunk);
        }
        emitter.await.unwrap();
        String::from_utf8(out).unwrap()
    }

    fn frames(body: &str) -> Vec<serde_json::Value> {
        body.split(COMPONENT_DELIMITER)
            .skip(1)
            .step_by(2)
            .map(|payload| serde_json::from_str(payload).unwrap())
            .collect()
    }

    #[test]
    fn test_detect_presets_precedence() {
        assert_eq!(detect_presets("a line chart"), vec![ChartPreset::SalesLine]);
        assert_eq!(detect_presets("revenue chart"), vec![ChartPreset::RevenueBar]);
        assert_eq!(detect_presets("growth trend"), vec![ChartPreset::GrowthLine]);
        assert_eq!(
            detect_presets("performance metrics"),
            vec![ChartPreset::PerformanceBar]
        );
        // bar without a scenario keyword defaults to revenue
        assert_eq!(detect_presets("a bar graph"), vec![ChartPreset::RevenueBar]);
        // generic chart words name no preset; resolution fills later
        assert!(detect_presets("a graph").is_empty());
    }

    #[test]
    fn test_resolve_duplicates_single_preset() {
        let resolved = resolve_presets(2, vec![ChartPreset::SalesLine]);
        assert_eq!(resolved, vec![ChartPreset::SalesLine, ChartPreset::SalesLine]);
    }

    #[test]
    fn test_resolve_unnamed_presets_fill_distinct() {
        assert_eq!(resolve_presets(1, vec![]), vec![ChartPreset::SalesLine]);
        assert_eq!(resolve_presets(2, vec![]), vec![
            ChartPreset::SalesLine,
            ChartPreset::RevenueBar
        ]);
    }

    #[test]
    fn test_resolve_fills_distinct_presets() {
        let resolved = resolve_presets(3, vec![
            ChartPreset::GrowthLine,
            ChartPreset::PerformanceBar,
        ]);
        assert_eq!(resolved, vec![
            ChartPreset::GrowthLine,
            ChartPreset::PerformanceBar,
            ChartPreset::SalesLine
        ]);
    }

    #[tokio::test]
    async fn test_single_line_chart_values_accumulate() {
        let body = run("show me a line chart").await;
        let frames = frames(&body);
        assert_eq!(frames.len(), 6); // skeleton + 5 point updates

        let skeleton = &frames[0];
        assert_eq!(skeleton["type"], "ChartComponent");
        assert_eq!(skeleton["data"]["chart_type"], "line");
        assert_eq!(skeleton["data"]["title"], "Sales Over Time");
        assert_eq!(skeleton["data"]["series"], json!([]));
        assert_eq!(skeleton["data"]["x_axis"].as_array().unwrap().len(), 5);

        for (i, frame) in frames[1..].iter().enumerate() {
            assert_eq!(frame["id"], skeleton["id"]);
            let series = frame["data"]["series"].as_array().unwrap();
            assert_eq!(series.len(), 1);
            assert_eq!(series[0]["label"], "Sales");
            assert_eq!(series[0]["values"].as_array().unwrap().len(), i + 1);
        }
    }

    #[tokio::test]
    async fn test_values_are_prefix_extensions() {
        let body = run("growth chart").await;
        let frames = frames(&body);
        let mut previous: Vec<Value> = Vec::new();
        for frame in &frames[1..] {
            let values = frame["data"]["series"][0]["values"]
                .as_array()
                .unwrap()
                .clone();
            assert_eq!(values.len(), previous.len() + 1);
            assert_eq!(&values[..previous.len()], &previous[..]);
            previous = values;
        }
    }

    #[tokio::test]
    async fn test_two_charts_interleave_and_pick_distinct_presets() {
        let body = run("show me two charts").await;
        let frames = frames(&body);
        assert_eq!(frames.len(), 12); // 2 skeletons + 10 point updates

        assert_eq!(frames[0]["data"]["chart_type"], "line");
        assert_eq!(frames[1]["data"]["chart_type"], "bar");

        let first_id = frames[0]["id"].clone();
        let second_id = frames[1]["id"].clone();
        for pair in frames[2..].chunks(2) {
            assert_eq!(pair[0]["id"], first_id);
            assert_eq!(pair[1]["id"], second_id);
        }
        assert!(body.contains("All 2 charts completed with 10 total data points!"));
    }

    #[tokio::test]
    async fn test_header_fields_never_repeat_in_updates() {
        let body = run("revenue chart").await;
        let frames = frames(&body);
        for frame in &frames[1..] {
            let data = frame["data"].as_object().unwrap();
            assert!(data.get("chart_type").is_none());
            assert!(data.get("title").is_none());
            assert!(data.get("x_axis").is_none());
        }
    }
}
