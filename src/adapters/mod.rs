//! Tool interfaces for external systems.
//!
//! A tool is a named capability that takes one string input and produces one
//! string output. Hosts keep tools in a [`Toolbox`] and dispatch by name.

pub mod mindware;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use mindware::{
    ConfigurationError, MindwareParams, MindwareTool, RemoteError, DEFAULT_BASE_URL,
    NO_RESPONSE_MESSAGE, RELAY_PATH,
};

/// Trait for tools a host framework can invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the host uses to address the tool
    fn name(&self) -> &str;

    /// Human-facing name (defaults to `name`)
    fn display_name(&self) -> &str {
        self.name()
    }

    /// Description shown to whoever picks the tool
    fn description(&self) -> &str;

    /// Run the tool with a single string input
    async fn call(&self, input: &str) -> Result<String>;
}

/// Name and description of a registered tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum ToolboxError {
    #[error("no tool registered under '{0}'")]
    UnknownTool(String),
}

/// Name-keyed set of tools
#[derive(Default, Clone)]
pub struct Toolbox {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        self.tools.insert(tool.name().to_string(), tool)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptors of all registered tools, sorted by name
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
            })
            .collect()
    }

    /// Dispatch `input` to the tool registered under `name`
    pub async fn call(&self, name: &str, input: &str) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolboxError::UnknownTool(name.to_string()))?;

        tracing::debug!(tool = name, "dispatching tool call");
        tool.call(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes its input"
        }

        async fn call(&self, input: &str) -> Result<String> {
            Ok(input.to_string())
        }
    }

    struct Shout;

    #[async_trait]
    impl Tool for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        fn display_name(&self) -> &str {
            "Shout"
        }

        fn description(&self) -> &str {
            "Uppercases its input"
        }

        async fn call(&self, input: &str) -> Result<String> {
            Ok(input.to_uppercase())
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let mut toolbox = Toolbox::new();
        toolbox.register(Arc::new(Echo));
        toolbox.register(Arc::new(Shout));

        assert_eq!(toolbox.call("echo", "hi").await.unwrap(), "hi");
        assert_eq!(toolbox.call("shout", "hi").await.unwrap(), "HI");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let toolbox = Toolbox::new();
        let err = toolbox.call("missing", "hi").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ToolboxError>(),
            Some(ToolboxError::UnknownTool(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut toolbox = Toolbox::new();
        assert!(toolbox.register(Arc::new(Echo)).is_none());
        assert!(toolbox.register(Arc::new(Echo)).is_some());
        assert_eq!(toolbox.len(), 1);
    }

    #[test]
    fn test_descriptors_sorted() {
        let mut toolbox = Toolbox::new();
        toolbox.register(Arc::new(Shout));
        toolbox.register(Arc::new(Echo));

        let names: Vec<_> = toolbox.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["echo", "shout"]);
    }

    #[test]
    fn test_display_name_defaults_to_name() {
        assert_eq!(Echo.display_name(), "echo");
        assert_eq!(Shout.display_name(), "Shout");
    }
}
