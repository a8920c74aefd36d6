use thiserror::Error;

/// Unified error type for the routing and reliability core.
///
/// These double as internal control-flow signals: the router's attempt loop
/// matches on the taxonomy below to decide whether a failure is soft (try
/// the next candidate) or hard (abort the request).
#[derive(Error, Debug)]
pub enum RouterError {
    // ── LLM / structured-output errors ──────────────────────────
    #[error("llm provider error: {0}")]
    LlmProvider(String),

    #[error("llm returned no text")]
    LlmNone,

    #[error("llm rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("structured output invalid: {0}")]
    SchemaInvalid(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    // ── Policy / reliability errors ─────────────────────────────
    #[error("policy rejected provider on cost: estimated ${estimated:.4} > limit ${limit:.4}")]
    PolicyCost { estimated: f64, limit: f64 },

    #[error("policy rejected provider on capability: missing {missing:?}")]
    PolicyCapability { missing: Vec<String> },

    #[error("per-call latency exceeded: {duration_ms}ms > {limit_ms}ms")]
    LatencyExceeded { duration_ms: u64, limit_ms: u64 },

    #[error("end-to-end SLA exceeded: {elapsed_ms}ms >= {limit_ms}ms")]
    SlaTimeoutTotal { elapsed_ms: u64, limit_ms: u64 },

    // ── Tool errors ──────────────────────────────────────────────
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("tool argument invalid: {tool}: {reason}")]
    ToolArgInvalid { tool: String, reason: String },

    #[error("tool denied by guardrail: {tool}: {reason}")]
    ToolGuardDenied { tool: String, reason: String },

    #[error("tool execution failed: {tool}: {reason}")]
    ToolExecError { tool: String, reason: String },

    // ── Configuration errors ─────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ──────────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Machine-readable failure classification carried into timeline events as
/// `reason_code`. Kept separate from `RouterError` so the router can stamp a
/// stable tag without re-formatting (or fighting the borrow checker over)
/// the error that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LlmNone,
    SchemaInvalid,
    LatencyExceeded,
    PolicyCost,
    PolicyCapability,
    SlaTimeoutTotal,
    ToolArgInvalid,
    ToolGuardDenied,
    ToolExecError,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::LlmNone => "llm_none",
            ErrorKind::SchemaInvalid => "schema_invalid",
            ErrorKind::LatencyExceeded => "latency_exceeded",
            ErrorKind::PolicyCost => "policy_cost",
            ErrorKind::PolicyCapability => "policy_capability",
            ErrorKind::SlaTimeoutTotal => "sla_timeout_total",
            ErrorKind::ToolArgInvalid => "tool_arg_invalid",
            ErrorKind::ToolGuardDenied => "tool_guard_denied",
            ErrorKind::ToolExecError => "tool_exec_error",
            ErrorKind::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&RouterError> for ErrorKind {
    fn from(err: &RouterError) -> Self {
        match err {
            RouterError::LlmNone => ErrorKind::LlmNone,
            RouterError::SchemaInvalid(_) => ErrorKind::SchemaInvalid,
            RouterError::LatencyExceeded { .. } => ErrorKind::LatencyExceeded,
            RouterError::PolicyCost { .. } => ErrorKind::PolicyCost,
            RouterError::PolicyCapability { .. } => ErrorKind::PolicyCapability,
            RouterError::SlaTimeoutTotal { .. } => ErrorKind::SlaTimeoutTotal,
            RouterError::ToolArgInvalid { .. } => ErrorKind::ToolArgInvalid,
            RouterError::ToolGuardDenied { .. } => ErrorKind::ToolGuardDenied,
            RouterError::ToolExecError { .. } => ErrorKind::ToolExecError,
            _ => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;
