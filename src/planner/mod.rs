//! LLM-backed component planning.
//!
//! For planner-keyword requests the rule-based emitters step aside and an
//! external model proposes the component layout. The pipeline is: cache
//! lookup → prompt → remote call with retries → delimiter extraction →
//! per-component validation → clamp → emit. Every failure mode ends in the
//! fixed fallback plan; nothing ever surfaces to the client as an error.

pub mod cache;

pub use cache::PlanCache;

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use crate::component::{ComponentKind, ComponentRegistry};
use crate::config::{LlmSettings, Settings};
use crate::errors::{PlannerError, StreamError};
use crate::ids::new_component_id;
use crate::stream::{StreamSink, emit_introduction};

/// Chart types a planned ChartComponent may carry.
const VALID_CHART_TYPES: [&str; 5] = ["line", "bar", "area", "pie", "scatter"];

const PLANNER_SYSTEM_PROMPT: &str = r#"You are a dashboard planner that decides which UI components to create for a user request.

<component_types>
1. SimpleComponent: card/summary with title, description, optional value
   Example: {"type":"SimpleComponent","data":{"title":"Sales Summary","description":"Total revenue increased 12%","value":15000}}

2. TableA: tabular data with columns and rows
   Example: {"type":"TableA","data":{"columns":["Region","Revenue"],"rows":[["US",12000],["EU",10000]]}}

3. ChartComponent: line/bar/area/pie/scatter charts
   Example: {"type":"ChartComponent","data":{"chart_type":"line","title":"Revenue Over Time","x_axis":["Jan","Feb","Mar"],"series":[{"label":"Sales","values":[100,120,150]}]}}
</component_types>

<rules>
- Return 1-5 components maximum
- For trends/time-series use ChartComponent (line); for comparisons use ChartComponent (bar)
- For lists/detailed data use TableA; for summaries/KPIs use SimpleComponent
- Provide realistic sample data
</rules>

Respond with ONLY a JSON array of component objects wrapped in $$$ delimiters:
$$$[{"type":"SimpleComponent","data":{"title":"..."}}]$$$"#;

static DELIMITED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$\$(.*?)\$\$\$").unwrap());

/// One planned component: kind plus a complete data snapshot. Ids are
/// assigned at emission time, so a cached plan replays with fresh ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedComponent {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub data: Map<String, Value>,
}

/// The outcome of one planning run.
#[derive(Debug, Clone)]
pub struct Plan {
    pub components: Vec<PlannedComponent>,
    pub from_cache: bool,
    pub fallback: bool,
}

impl Plan {
    fn fallback() -> Self {
        Self {
            components: fallback_components(),
            from_cache: false,
            fallback: true,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Plans component layouts through a remote chat-completion API.
pub struct LlmPlanner {
    llm: LlmSettings,
    max_components: usize,
    max_table_rows: usize,
    max_chart_points: usize,
    client: Client,
    cache: PlanCache,
}

impl LlmPlanner {
    pub fn new(settings: &Settings) -> Self {
        let client = Client::builder()
            .timeout(settings.llm.attempt_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            llm: settings.llm.clone(),
            max_components: settings.max_components_per_response,
            max_table_rows: settings.max_table_rows,
            max_chart_points: settings.max_chart_points,
            client,
            cache: PlanCache::new(settings.llm.cache_ttl),
        }
    }

    pub fn cache(&self) -> &PlanCache {
        &self.cache
    }

    /// Emit a plan's components as single self-contained frames, in plan
    /// order. The registry records every id so the wire protocol stays
    /// consistent with the progressive emitters.
    pub async fn stream_plan(
        &self,
        message: &str,
        sink: &StreamSink,
        registry: &mut ComponentRegistry,
    ) -> Result<(), StreamError> {
        let plan = self.generate_plan(message).await;
        let frame_delay = sink.settings().frame_delay;
        for component in plan.components {
            let id = new_component_id();
            emit_introduction(sink, registry, &id, component.kind, component.data, frame_delay)
                .await?;
        }
        Ok(())
    }

    /// Produce a validated plan. Infallible from the caller's perspective:
    /// cache hit, fresh model plan, or the fixed fallback.
    pub async fn generate_plan(&self, message: &str) -> Plan {
        if message.trim().is_empty() {
            warn!("empty message; serving fallback plan");
            return Plan::fallback();
        }

        let key = cache::cache_key(message);
        if let Some(components) = self.cache.get(&key) {
            info!("plan cache hit");
            return Plan {
                components,
                from_cache: true,
                fallback: false,
            };
        }

        if self.llm.api_key.is_none() {
            warn!("no LLM API key configured; serving fallback plan");
            return Plan::fallback();
        }

        let prompt = build_planning_prompt(message);
        for attempt in 1..=self.llm.max_attempts {
            match self.attempt_plan(&prompt).await {
                Ok(components) => {
                    self.cache.store(&key, components.clone());
                    info!(count = components.len(), "plan generated");
                    return Plan {
                        components,
                        from_cache: false,
                        fallback: false,
                    };
                }
                Err(err) => {
                    warn!(attempt, %err, "planner attempt failed");
                    if attempt < self.llm.max_attempts {
                        tokio::time::sleep(backoff(attempt)).await;
                    }
                }
            }
        }

        error!(
            attempts = self.llm.max_attempts,
            "planner exhausted retries; serving fallback plan"
        );
        Plan::fallback()
    }

    async fn attempt_plan(&self, prompt: &str) -> Result<Vec<PlannedComponent>, PlannerError> {
        let text = self.call_model(prompt).await?;
        let raw = extract_plan_json(&text)?;
        let components: Vec<PlannedComponent> = raw
            .into_iter()
            .filter_map(|value| self.validate_component(value))
            .take(self.max_components)
            .collect();
        if components.is_empty() {
            return Err(PlannerError::NoValidComponents);
        }
        Ok(components)
    }

    async fn call_model(&self, prompt: &str) -> Result<String, PlannerError> {
        let request = ChatRequest {
            model: &self.llm.model,
            max_tokens: self.llm.max_tokens,
            temperature: self.llm.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.llm.api_url)
            .header("x-api-key", self.llm.api_key.as_deref().unwrap_or_default())
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: ChatResponse = response.json().await?;
        let text: String = body
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            return Err(PlannerError::EmptyResponse);
        }
        Ok(text)
    }

    /// Check one raw plan object against the schema for its kind, clamping
    /// oversized arrays in place. Invalid objects are dropped, not fatal.
    fn validate_component(&self, value: Value) -> Option<PlannedComponent> {
        let mut component: PlannedComponent = match serde_json::from_value(value) {
            Ok(component) => component,
            Err(err) => {
                warn!(%err, "dropping malformed plan component");
                return None;
            }
        };

        let valid = match component.kind {
            ComponentKind::SimpleComponent => component.data.contains_key("title"),
            ComponentKind::TableA => validate_table(&mut component.data, self.max_table_rows),
            ComponentKind::ChartComponent => {
                validate_chart(&mut component.data, self.max_chart_points)
            }
        };

        if valid {
            Some(component)
        } else {
            warn!(kind = %component.kind, "dropping plan component failing validation");
            None
        }
    }
}

fn build_planning_prompt(message: &str) -> String {
    format!(
        "{PLANNER_SYSTEM_PROMPT}\n\n<user_request>\n{message}\n</user_request>"
    )
}

/// Exponential backoff: 1 s, 2 s, 4 s for attempts 1, 2, 3.
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1 << (attempt - 1))
}

/// Pull the plan array out of the model text. Prefers the last `$$$`
/// delimited region; otherwise strips Markdown fences and repairs
/// single-quoted strings before parsing. A bare object is wrapped into a
/// one-element array.
fn extract_plan_json(text: &str) -> Result<Vec<Value>, PlannerError> {
    let json_text = match DELIMITED.captures_iter(text).last() {
        Some(capture) => capture[1].trim().to_string(),
        None => repair_unfenced(text),
    };

    let value: Value = serde_json::from_str(&json_text).map_err(PlannerError::InvalidJson)?;
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

fn repair_unfenced(text: &str) -> String {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest.trim_start();
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest.trim_start();
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest.trim_end();
    }
    cleaned.replace('\'', "\"")
}

fn validate_table(data: &mut Map<String, Value>, max_rows: usize) -> bool {
    let Some(columns) = data.get("columns").and_then(Value::as_array) else {
        return false;
    };
    if columns.is_empty() {
        return false;
    }
    let Some(rows) = data.get_mut("rows").and_then(Value::as_array_mut) else {
        return false;
    };
    if !rows.iter().all(Value::is_array) {
        return false;
    }
    rows.truncate(max_rows);
    true
}

fn validate_chart(data: &mut Map<String, Value>, max_points: usize) -> bool {
    let Some(chart_type) = data.get("chart_type").and_then(Value::as_str) else {
        return false;
    };
    if !VALID_CHART_TYPES.contains(&chart_type) {
        return false;
    }
    if !data.contains_key("title") {
        return false;
    }
    if !data.get("x_axis").is_some_and(Value::is_array) {
        return false;
    }
    let Some(series) = data.get_mut("series").and_then(Value::as_array_mut) else {
        return false;
    };
    if series.is_empty() {
        return false;
    }
    for entry in series.iter_mut() {
        let Some(object) = entry.as_object_mut() else {
            return false;
        };
        if !object.contains_key("label") {
            return false;
        }
        let Some(values) = object.get_mut("values").and_then(Value::as_array_mut) else {
            return false;
        };
        values.truncate(max_points);
    }
    true
}

fn data_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// The fixed three-component plan served when planning fails: one component
/// of each kind with placeholder data. Pure so its structure is stable.
pub fn fallback_components() -> Vec<PlannedComponent> {
    vec![
        PlannedComponent {
            kind: ComponentKind::SimpleComponent,
            data: data_object(json!({
                "title": "Dashboard Summary",
                "description": "Welcome to StreamForge. Your data will appear here.",
            })),
        },
        PlannedComponent {
            kind: ComponentKind::TableA,
            data: data_object(json!({
                "columns": ["Metric", "Value", "Status"],
                "rows": [
                    ["Total Users", "1,234", "Active"],
                    ["Revenue", "$45,678", "Up 12%"],
                    ["Conversion Rate", "3.2%", "Stable"],
                ],
            })),
        },
        PlannedComponent {
            kind: ComponentKind::ChartComponent,
            data: data_object(json!({
                "chart_type": "line",
                "title": "Sample Trend",
                "x_axis": ["Jan", "Feb", "Mar", "Apr", "May"],
                "series": [{ "label": "Metric", "values": [100, 120, 150, 140, 180] }],
            })),
        },
    ]
}
