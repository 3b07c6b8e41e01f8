use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::fill::nudge::NudgeConfig;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-autofill",
    version,
    about = "Extract form fields from a page and fill them from AI suggestions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ollama API endpoint
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama model name
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,

    /// Append a JSONL trace of extractor operations to this file
    #[arg(long, global = true)]
    pub trace: Option<String>,

    /// Path to config file (default: form-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract fields from a page snapshot and print the AI payload
    Extract {
        /// Page snapshot JSON
        #[arg(long)]
        page: String,

        /// Write the payload here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Fill a page snapshot from a pasted agent reply
    Fill {
        /// Page snapshot JSON
        #[arg(long)]
        page: String,

        /// File holding the agent's reply
        #[arg(long)]
        response: String,

        /// Reply format: json or text
        #[arg(long)]
        format: Option<String>,

        /// Write the filled page snapshot here
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate suggestions with a source and fill them
    Suggest {
        /// Page snapshot JSON
        #[arg(long)]
        page: String,

        /// Suggestion source: mock or llm
        #[arg(long)]
        analyzer: Option<String>,

        /// Write the filled page snapshot here
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Serve extractor requests as JSON lines on stdin/stdout
    Serve {
        /// Page snapshot JSON
        #[arg(long)]
        page: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-autofill.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub fill: FillConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
    #[serde(default)]
    pub trace: TraceConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillConfig {
    #[serde(default = "default_arrow_down_delay_ms")]
    pub arrow_down_delay_ms: u64,

    #[serde(default = "default_enter_delay_ms")]
    pub enter_delay_ms: u64,

    #[serde(default = "default_json")]
    pub format: String,
}

impl Default for FillConfig {
    fn default() -> Self {
        let nudge = NudgeConfig::default();
        Self {
            arrow_down_delay_ms: nudge.arrow_down_delay_ms,
            enter_delay_ms: nudge.enter_delay_ms,
            format: "json".to_string(),
        }
    }
}

impl FillConfig {
    pub fn nudge(&self) -> NudgeConfig {
        NudgeConfig {
            arrow_down_delay_ms: self.arrow_down_delay_ms,
            enter_delay_ms: self.enter_delay_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestConfig {
    #[serde(default = "default_mock")]
    pub analyzer: String,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            analyzer: "mock".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OllamaConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

// Serde default helpers
fn default_arrow_down_delay_ms() -> u64 { NudgeConfig::default().arrow_down_delay_ms }
fn default_enter_delay_ms() -> u64 { NudgeConfig::default().enter_delay_ms }
fn default_json() -> String { "json".to_string() }
fn default_mock() -> String { "mock".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-autofill.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Resolved settings (merge CLI args with config file)
// ============================================================================

/// Settings every subcommand shares, after CLI > config > defaults.
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub verbose: u8,
    pub nudge: NudgeConfig,
    pub trace_path: Option<String>,
    pub ollama_endpoint: Option<String>,
    pub ollama_model: Option<String>,
}

pub fn resolve_settings(cli: &Cli, config: &AppConfig) -> RunSettings {
    RunSettings {
        verbose: cli.verbose,
        nudge: config.fill.nudge(),
        trace_path: cli.trace.clone().or_else(|| config.trace.path.clone()),
        ollama_endpoint: cli
            .ollama_endpoint
            .clone()
            .or_else(|| config.ollama.endpoint.clone()),
        ollama_model: cli
            .ollama_model
            .clone()
            .or_else(|| config.ollama.model.clone()),
    }
}
