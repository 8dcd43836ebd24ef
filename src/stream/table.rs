//! TableA emitters.
//!
//! Tables stream as a skeleton frame (columns, no rows) followed by row
//! updates. Every row frame carries the full cumulative `rows` array read
//! back from the registry, so the client replaces rather than appends.
//! With several tables in one response, rows interleave round-robin by row
//! index so every table shows progress immediately.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::component::presets::TableKind;
use crate::component::{ComponentKind, ComponentRegistry};
use crate::errors::StreamError;
use crate::ids::new_component_id;
use crate::stream::patterns::collection_count;
use crate::stream::{DOT_PACE, StreamSink, emit_introduction, emit_update};

static SALES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bsales?\b").unwrap());
static USERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\busers?\b").unwrap());
static PRODUCTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bproducts?\b").unwrap());

struct TablePlan {
    id: String,
    kind: TableKind,
    rows: Vec<Value>,
}

/// Table kinds named explicitly in the message, in canonical order.
fn detect_kinds(lower: &str) -> Vec<TableKind> {
    let mut kinds = Vec::new();
    if SALES.is_match(lower) {
        kinds.push(TableKind::Sales);
    }
    if USERS.is_match(lower) {
        kinds.push(TableKind::Users);
    }
    if PRODUCTS.is_match(lower) {
        kinds.push(TableKind::Products);
    }
    kinds
}

/// Resolve the final table list from the requested count and the kinds the
/// message named. Exactly one named kind with a higher count duplicates that
/// kind ("two sales tables" → two sales); otherwise the remaining kinds fill
/// in canonical order ("two tables" → sales + users).
fn resolve_kinds(count: usize, named: Vec<TableKind>) -> Vec<TableKind> {
    if count > named.len() {
        if named.len() == 1 {
            return vec![named[0]; count];
        }
        let mut resolved = named;
        for kind in TableKind::ALL {
            if resolved.len() >= count {
                break;
            }
            if !resolved.contains(&kind) {
                resolved.push(kind);
            }
        }
        return resolved;
    }
    named.into_iter().take(count).collect()
}

/// Stream one or more tables with progressive row updates.
pub async fn handle_tables(
    lower: &str,
    sink: &StreamSink,
    registry: &mut ComponentRegistry,
) -> Result<(), StreamError> {
    let settings = sink.settings().clone();

    let mut kinds = resolve_kinds(collection_count(lower), detect_kinds(lower));
    kinds.truncate(settings.max_tables_per_response);
    let count = kinds.len();

    let plans: Vec<TablePlan> = kinds
        .iter()
        .map(|kind| {
            let mut rows = kind.sample_rows();
            rows.truncate(settings.max_table_rows);
            TablePlan {
                id: new_component_id(),
                kind: *kind,
                rows,
            }
        })
        .collect();

    // Skeletons first so every table renders immediately
    for plan in &plans {
        let mut data = Map::new();
        data.insert("columns".into(), Value::Array(plan.kind.columns()));
        data.insert("rows".into(), json!([]));
        data.insert("total_rows".into(), json!(0));
        emit_introduction(
            sink,
            registry,
            &plan.id,
            ComponentKind::TableA,
            data,
            settings.frame_delay,
        )
        .await?;
    }

    sink.raw("\n").await?;
    if count == 1 {
        sink.text(&format!(
            "Here's your {} table. Loading data",
            plans[0].kind.name()
        ))
        .await?;
    } else {
        sink.text(&format!("Loading data for all {count} tables"))
            .await?;
    }
    if settings.simulate_processing {
        sink.dots(DOT_PACE).await?;
    }
    sink.raw("\n").await?;

    // Round-robin by row index across tables in declared order
    let max_rows = plans.iter().map(|plan| plan.rows.len()).max().unwrap_or(0);
    for row_idx in 0..max_rows {
        for plan in &plans {
            let Some(row) = plan.rows.get(row_idx) else {
                continue;
            };
            let mut rows = registry
                .get(&plan.id)
                .and_then(|data| data.get("rows"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            rows.push(row.clone());

            let mut patch = Map::new();
            patch.insert("total_rows".into(), json!(rows.len()));
            patch.insert("rows".into(), Value::Array(rows));
            emit_update(sink, registry, &plan.id, patch, settings.table_row_delay).await?;
        }

        if (row_idx + 1) % 2 == 0 && row_idx < max_rows - 1 {
            let loaded: usize = plans
                .iter()
                .map(|plan| plan.rows.len().min(row_idx + 1))
                .sum();
            sink.raw(format!("Loaded {loaded} rows... ")).await?;
        }
    }

    let total: usize = plans.iter().map(|plan| plan.rows.len()).sum();
    if count == 1 {
        sink.raw(format!("\n\u{2713} All {total} rows loaded successfully!"))
            .await
    } else {
        sink.raw(format!(
            "\n\u{2713} All {count} tables loaded with {total} total rows!"
        ))
        .await
    }
}
