//! Command-line interface for mindware.
//!
//! Provides commands for asking the relay a question, listing the
//! registered tools and showing the resolved configuration.

use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{MindwareParams, MindwareTool, ToolDescriptor};
use crate::config::{self, ResolvedConfig};

/// mindware - query the Mindware relay from the command line
#[derive(Parser, Debug)]
#[command(name = "mindware")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a prompt to the relay and print its answer
    Ask {
        /// Prompt text (reads --input or stdin if not provided)
        prompt: Option<String>,

        /// Read the prompt from a file
        #[arg(short, long, conflicts_with = "prompt")]
        input: Option<PathBuf>,

        /// API key (overrides MINDWARE_API_KEY and config file)
        #[arg(long)]
        api_key: Option<String>,

        /// Upper bound hint for relay actions
        #[arg(long)]
        max_actions: Option<u32>,

        /// Upper bound hint for relay services
        #[arg(long)]
        max_services: Option<u32>,

        /// Give up after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// List registered tools
    Tools {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Flag overrides for the `ask` command
#[derive(Debug, Default)]
struct AskOverrides {
    api_key: Option<String>,
    max_actions: Option<u32>,
    max_services: Option<u32>,
    timeout: Option<u64>,
}

impl AskOverrides {
    fn apply(self, config: &ResolvedConfig) -> MindwareParams {
        let mut params = config.relay_params();
        if self.api_key.is_some() {
            params.api_key = self.api_key;
        }
        if self.max_actions.is_some() {
            params.max_actions = self.max_actions;
        }
        if self.max_services.is_some() {
            params.max_services = self.max_services;
        }
        if let Some(secs) = self.timeout {
            params.timeout = Some(Duration::from_secs(secs));
        }
        params
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Ask {
                prompt,
                input,
                api_key,
                max_actions,
                max_services,
                timeout,
            } => {
                let overrides = AskOverrides {
                    api_key,
                    max_actions,
                    max_services,
                    timeout,
                };
                ask(prompt, input, overrides).await
            }
            Commands::Tools { json } => list_tools(json),
            Commands::Config => show_config(),
        }
    }
}

/// Build the relay tool from resolved config plus flag overrides
///
/// The environment was already consulted by `config`, so the tool gets no
/// second lookup.
fn build_tool(config: &ResolvedConfig, overrides: AskOverrides) -> Result<MindwareTool> {
    let params = overrides.apply(config);
    MindwareTool::with_key_lookup(params, |_| None).context("Failed to configure Mindware")
}

/// Tools available from the command line
fn catalog() -> Vec<ToolDescriptor> {
    vec![MindwareTool::descriptor()]
}

fn read_prompt(prompt: Option<String>, input: Option<PathBuf>) -> Result<String> {
    if let Some(prompt) = prompt {
        return Ok(prompt);
    }

    let text = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read prompt file: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read prompt from stdin")?;
            buffer
        }
    };

    Ok(strip_trailing_newline(text))
}

/// Drop the line ending editors and shells append to files and pipes
fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

async fn ask(prompt: Option<String>, input: Option<PathBuf>, overrides: AskOverrides) -> Result<()> {
    let config = config::config()?;
    let tool = build_tool(config, overrides)?;
    let prompt = read_prompt(prompt, input)?;

    let answer = tool
        .invoke(&prompt)
        .await
        .context("Mindware relay request failed")?;

    println!("{}", answer);
    Ok(())
}

fn list_tools(json: bool) -> Result<()> {
    let descriptors = catalog();

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    for descriptor in descriptors {
        println!("{:<12} {}", descriptor.name, descriptor.description);
    }
    Ok(())
}

fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("Mindware configuration");
    println!(
        "  config file:  {}",
        config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!(
        "  api key:      {}",
        if config.api_key.is_some() { "set" } else { "not set" }
    );
    println!("  base url:     {}", config.base_url);
    println!("  max actions:  {}", display_opt(config.max_actions));
    println!("  max services: {}", display_opt(config.max_services));
    println!(
        "  timeout:      {}",
        config
            .timeout
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "none".to_string())
    );
    Ok(())
}

fn display_opt(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unset".to_string())
}
