use std::time::Duration;

/// Runtime configuration for the streaming service.
///
/// `Default` gives the production values; `instant()` zeroes every delay for
/// tests and load probes. All fields are public so callers can tune
/// individual knobs with struct-update syntax.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    /// Delay between streamed words of prose.
    pub word_delay: Duration,
    /// Delay between individual streamed characters (processing dots).
    pub char_delay: Duration,
    /// Delay after each component frame.
    pub frame_delay: Duration,
    /// Delay after each table row frame.
    pub table_row_delay: Duration,
    /// Delay after each chart point frame.
    pub chart_point_delay: Duration,
    /// Hard wait before the single delayed card's partial update.
    pub single_card_wait: Duration,
    /// Hard wait before the multi delayed cards' partial updates.
    pub multi_card_wait: Duration,
    /// Stream "..." processing dots between loading prose and data frames.
    pub simulate_processing: bool,

    pub max_components_per_response: usize,
    pub max_tables_per_response: usize,
    pub max_charts_per_response: usize,
    pub max_table_rows: usize,
    pub max_chart_points: usize,

    pub llm: LlmSettings,
}

/// Configuration for the LLM planner collaborator.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Chat-completion endpoint URL.
    pub api_url: String,
    /// Bearer token; read from `STREAMFORGE_LLM_API_KEY` when present.
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Per-attempt request timeout.
    pub attempt_timeout: Duration,
    /// Total attempts before falling back (first try included).
    pub max_attempts: u32,
    /// Time-to-live for cached plans.
    pub cache_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8001,
            word_delay: Duration::from_millis(100),
            char_delay: Duration::from_millis(10),
            frame_delay: Duration::from_millis(100),
            table_row_delay: Duration::from_millis(200),
            chart_point_delay: Duration::from_millis(200),
            single_card_wait: Duration::from_secs(5),
            multi_card_wait: Duration::from_secs(3),
            simulate_processing: true,
            max_components_per_response: 5,
            max_tables_per_response: 3,
            max_charts_per_response: 3,
            max_table_rows: 20,
            max_chart_points: 50,
            llm: LlmSettings::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: std::env::var("STREAMFORGE_LLM_API_KEY").ok(),
            model: "claude-3-5-haiku-20241022".to_string(),
            max_tokens: 4096,
            temperature: 0.3,
            attempt_timeout: Duration::from_secs(30),
            max_attempts: 3,
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl Settings {
    /// Settings with every delay zeroed and processing simulation off.
    ///
    /// The wire protocol is unchanged; only pacing disappears. Used by the
    /// integration tests so a full response streams in milliseconds.
    pub fn instant() -> Self {
        Self {
            word_delay: Duration::ZERO,
            char_delay: Duration::ZERO,
            frame_delay: Duration::ZERO,
            table_row_delay: Duration::ZERO,
            chart_point_delay: Duration::ZERO,
            single_card_wait: Duration::ZERO,
            multi_card_wait: Duration::ZERO,
            simulate_processing: false,
            ..Self::default()
        }
    }
}
