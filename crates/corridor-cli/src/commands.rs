use std::path::PathBuf;

use clap::{Parser, Subcommand};
use corridor_config::ConfigLoader;
use corridor_core::{Result, RouterError, SessionId, Timeline, TimelineEvent, ToolCall, ToolExecutor};
use corridor_engine::FailoverEngine;
use corridor_tools::BuiltinTools;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::clients::build_clients;

/// Routing and reliability core — run a request, explain its routing, or
/// inspect a session's timeline.
#[derive(Parser)]
#[command(name = "corridor", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory (models/, routing.yaml, policies/).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one request through the failover engine.
    Run {
        /// User prompt.
        prompt: String,
        /// Citation string the final payload must contain.
        #[arg(long)]
        citation: String,
        /// Tool to execute before routing (calc, web_fetch, file_read, ...).
        #[arg(long)]
        tool: Option<String>,
        /// JSON arguments for the tool.
        #[arg(long, default_value = "{}")]
        tool_args: String,
        /// Session id to append events under; a new one is generated if omitted.
        #[arg(long)]
        session: Option<SessionId>,
    },
    /// Summarize a session's routing decisions.
    Explain {
        /// Session id to explain.
        session: SessionId,
        /// Tool the session routed for (affects the statically-computed candidate list).
        #[arg(long)]
        tool: Option<String>,
    },
    /// Print a session's event timeline, or the global timeline if no session is given.
    Timeline {
        /// Session id; omit for the global log.
        session: Option<SessionId>,
    },
    /// Validate configuration across files and print any issues.
    ValidateConfig,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or("info")
        };
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
            )
            .with_target(false)
            .init();

        match self.command {
            Commands::Run { prompt, citation, tool, tool_args, session } => {
                Self::cmd_run(self.config.as_deref(), prompt, citation, tool, tool_args, session).await
            }
            Commands::Explain { session, tool } => Self::cmd_explain(self.config.as_deref(), session, tool),
            Commands::Timeline { session } => Self::cmd_timeline(self.config.as_deref(), session),
            Commands::ValidateConfig => Self::cmd_validate_config(self.config.as_deref()),
        }
    }

    async fn cmd_run(
        config: Option<&std::path::Path>,
        prompt: String,
        citation: String,
        tool: Option<String>,
        tool_args: String,
        session: Option<SessionId>,
    ) -> Result<()> {
        let loader = ConfigLoader::load(config)?;
        let session_id = session.unwrap_or_else(SessionId::new_v4);

        let tool_result = match &tool {
            Some(name) => {
                let arguments: Value = serde_json::from_str(&tool_args)
                    .map_err(|e| RouterError::Config(format!("invalid --tool-args: {e}")))?;
                let builtin = BuiltinTools::new(loader.guardrails().clone());
                let call = ToolCall { id: session_id.to_string(), tool_name: name.clone(), arguments };
                let executed = builtin.execute(&call).await?;
                executed.data
            }
            None => Value::Null,
        };

        let clients = build_clients(loader.registry());
        let timeline = Timeline::new("logs");
        let env_override = std::env::var("LLM_PROVIDER").ok();
        let tool_policy_override = tool.as_deref().and_then(|t| loader.routing().task_routing.policies.get(t));

        let engine = FailoverEngine::new(loader.registry().clone(), loader.routing().clone(), timeline, clients);
        let attempt = engine
            .attempt(
                session_id,
                tool.as_deref(),
                &prompt,
                &citation,
                &tool_result,
                loader.output_schema(),
                &loader.routing().policies,
                tool_policy_override,
                env_override.as_deref(),
            )
            .await;

        match &attempt.payload {
            Some(payload) => {
                engine.timeline().append(&TimelineEvent::new(
                    session_id,
                    "final_output",
                    details(&[
                        ("provider", json!(attempt.provider)),
                        ("model", json!(attempt.model)),
                    ]),
                ));
                info!(session = %session_id, provider = ?attempt.provider, "request completed");
                println!("{}", serde_json::to_string_pretty(payload)?);
            }
            None => {
                engine.timeline().append(&TimelineEvent::new(session_id, "final_output_fallback", details(&[])));
                error!(session = %session_id, tried = ?attempt.tried, "all providers exhausted without a valid payload");
                println!("null");
                std::process::exit(1);
            }
        }

        Ok(())
    }

    fn cmd_explain(config: Option<&std::path::Path>, session: SessionId, tool: Option<String>) -> Result<()> {
        let loader = ConfigLoader::load(config)?;
        let timeline = Timeline::new("logs");
        let env_override = std::env::var("LLM_PROVIDER").ok();
        let tool_policy_override = tool.as_deref().and_then(|t| loader.routing().task_routing.policies.get(t));

        // `explain` never calls a provider, so the engine needs no LLM clients.
        let engine = FailoverEngine::new(
            loader.registry().clone(),
            loader.routing().clone(),
            timeline,
            std::collections::HashMap::new(),
        );

        let explanation = corridor_engine::explain(
            &engine,
            session,
            tool.as_deref(),
            env_override.as_deref(),
            &loader.routing().policies,
            tool_policy_override,
        )?;
        println!("{}", serde_json::to_string_pretty(&explanation)?);
        Ok(())
    }

    fn cmd_timeline(_config: Option<&std::path::Path>, session: Option<SessionId>) -> Result<()> {
        let timeline = Timeline::new("logs");
        let events = match session {
            Some(session_id) => timeline.read_session(session_id)?,
            None => timeline.read_global()?,
        };
        for event in &events {
            println!("{}", serde_json::to_string(event)?);
        }
        Ok(())
    }

    fn cmd_validate_config(config: Option<&std::path::Path>) -> Result<()> {
        let loader = ConfigLoader::load(config)?;
        let issues = corridor_config::validate_all(&loader);
        if issues.is_empty() {
            println!("configuration valid, no issues found");
            return Ok(());
        }

        let mut has_error = false;
        for issue in &issues {
            println!("{issue}");
            has_error |= issue.severity == corridor_config::Severity::Error;
        }
        if has_error {
            std::process::exit(1);
        }
        Ok(())
    }
}

fn details(pairs: &[(&str, Value)]) -> serde_json::Map<String, Value> {
    let mut map = serde_json::Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}
