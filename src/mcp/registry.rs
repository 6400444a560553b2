//! MCP Tool Registry
//!
//! Manages registration and lookup of tools. The registry is assembled once
//! at startup and checked for completeness before the server starts serving.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::context::ToolContext;
use super::protocol::{ToolDefinition, ToolsCallResult};
use crate::error::ToolError;

// ============================================================================
// Tool Types
// ============================================================================

/// Result type for tool execution
pub type ToolResult = Result<ToolsCallResult, ToolError>;

/// Boxed future for async tool execution
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// Tool handler function type
pub type ToolHandler = Arc<dyn Fn(ToolContext, Value) -> ToolFuture + Send + Sync>;

/// A registered tool with metadata and handler
pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: ToolHandler,
    pub category: ToolCategory,
}

/// Decides how broker failures surface to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    /// Fire-and-forget publishing: broker failures are folded into an
    /// `isError` result instead of a request-level error.
    Publish,
    /// Inspection and lifecycle operations: broker failures propagate as
    /// typed errors.
    Admin,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool registered twice: {0}")]
    Duplicate(String),

    #[error("Declared tools without a handler: {0:?}")]
    Missing(Vec<String>),

    #[error("Registered tools that were never declared: {0:?}")]
    Undeclared(Vec<String>),
}

// ============================================================================
// Registry
// ============================================================================

/// Registry for MCP tools
pub struct McpRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl McpRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Names are unique.
    pub fn register_tool(&mut self, tool: RegisteredTool) -> Result<(), RegistryError> {
        if self.tools.contains_key(&tool.name) {
            return Err(RegistryError::Duplicate(tool.name));
        }
        self.tools.insert(tool.name.clone(), tool);
        Ok(())
    }

    /// Checks that the registered tools are exactly the declared ones.
    pub fn verify_complete(&self, declared: &[&str]) -> Result<(), RegistryError> {
        let declared: BTreeSet<&str> = declared.iter().copied().collect();
        let registered: BTreeSet<&str> = self.tools.keys().map(String::as_str).collect();

        let missing: Vec<String> = declared
            .difference(&registered)
            .map(|s| s.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RegistryError::Missing(missing));
        }

        let undeclared: Vec<String> = registered
            .difference(&declared)
            .map(|s| s.to_string())
            .collect();
        if !undeclared.is_empty() {
            return Err(RegistryError::Undeclared(undeclared));
        }
        Ok(())
    }

    /// Tool descriptors, sorted by name so listings are stable.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.input_schema.clone(),
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Get the number of registered tools
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

impl Default for McpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Builder helpers
// ============================================================================

/// Builder for registering a tool
pub struct ToolBuilder {
    name: String,
    description: String,
    input_schema: Value,
    category: ToolCategory,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
            category: ToolCategory::Admin,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn category(mut self, cat: ToolCategory) -> Self {
        self.category = cat;
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredTool
    where
        F: Fn(ToolContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        RegisteredTool {
            name: self.name,
            description: self.description,
            input_schema: self.input_schema,
            category: self.category,
            handler: Arc::new(move |ctx, params| Box::pin(handler(ctx, params))),
        }
    }
}
