//! mindware - Mindware relay tool adapter
//!
//! Exposes the Mindware relay API as a pluggable tool: one string prompt
//! in, one string answer out, over a single authenticated HTTP exchange.
//!
//! # Modules
//!
//! - `adapters`: Tool trait, toolbox registry and the Mindware relay tool
//! - `config`: Layered settings (env, .mindware/config.yaml, defaults)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Ask the relay a question
//! MINDWARE_API_KEY=... mindware ask "what's the weather in Lisbon?"
//!
//! # List tools
//! mindware tools --json
//! ```

pub mod adapters;
pub mod cli;
pub mod config;

// Re-export main types at crate root for convenience
pub use adapters::{
    ConfigurationError, MindwareParams, MindwareTool, RemoteError, Tool, ToolDescriptor, Toolbox,
    ToolboxError, NO_RESPONSE_MESSAGE,
};
pub use config::ResolvedConfig;
