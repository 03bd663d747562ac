//! MCP server for todo.txt queries.
//!
//! This module provides an MCP server that exposes read-only filtering,
//! aggregation, and suggestion tools over one todo.txt file.

// The rmcp `#[tool(aggr)]` macro requires ownership of input structs,
// making pass-by-value necessary for all tool handler functions.
#![allow(clippy::needless_pass_by_value)]

use crate::todo::{FilterOptions, TodoManager};
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::tool;
use rmcp::Error as McpError;
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Instructions for the MCP server, shown to agents using this server.
const INSTRUCTIONS: &str = r#"Read-only assistant over a todo.txt file.

Each line of the file is one task. Metadata is embedded in the line:
- `(A)`..`(Z)` priority prefix on active tasks
- `+project` tags (the pseudo-project `+in` is the inbox)
- `@context` tags (the context `@waiting` marks blocked/delegated tasks)
- `due:YYYY-MM-DD`, `t:YYYY-MM-DD` (threshold), and `rec:` (recurrence) tags
- completed tasks start with `x <completion-date> [<creation-date>]`

Use `overview` for counts and histograms, `suggest_next_task` when unsure
what to work on (optionally passing available minutes, a context, or an
energy level), and `query_tasks`/`get_all_tasks` for searching and
listing. Tasks are always returned sorted by due date, then priority,
then file order. Nothing here modifies the file.
"#;

/// Default result limit for `get_all_tasks`.
const DEFAULT_LIST_LIMIT: usize = 100;

/// Default result limit for `query_tasks`.
const DEFAULT_QUERY_LIMIT: usize = 1000;

/// MCP server for todo.txt queries.
#[derive(Clone)]
pub struct TodoServer {
    manager: Arc<TodoManager>,
}

impl TodoServer {
    /// Create a new server reading the given todo.txt file.
    ///
    /// The file does not need to exist yet; a missing file reads as an
    /// empty task list.
    #[must_use]
    pub fn new(todo_file: &Path) -> Self {
        Self { manager: Arc::new(TodoManager::new(todo_file)) }
    }
}

// Tool input schemas

/// Input for suggesting the next task.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SuggestNextTaskInput {
    /// How many minutes are available for work (optional).
    pub time_available_minutes: Option<u32>,
    /// Only consider tasks with this context (optional).
    pub context_filter: Option<String>,
    /// Current energy level: high, medium, or low (optional).
    pub energy_level: Option<String>,
}

/// Input for listing a project's tasks.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProjectTasksInput {
    /// Project name, without the `+` prefix.
    pub project_name: String,
}

/// Input for listing tasks with one context.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ContextTasksInput {
    /// Context name, without the `@` prefix.
    pub context: String,
}

/// Input for the free-text query tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryTasksInput {
    /// Text to search for in descriptions, raw lines, projects, and
    /// contexts (case-insensitive). Empty means no text filter.
    #[serde(default)]
    pub query_text: String,
    /// Only include tasks with at least one of these projects.
    #[serde(default)]
    pub projects: Vec<String>,
    /// Only include tasks with at least one of these contexts.
    #[serde(default)]
    pub contexts: Vec<String>,
    /// Whether to exclude completed tasks (default true).
    #[serde(default = "default_true")]
    pub exclude_completed: bool,
    /// Maximum number of tasks to return (default 1000).
    #[serde(default = "default_query_limit")]
    pub max_results: usize,
}

/// Input for the full task listing tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetAllTasksInput {
    /// Whether to list completed tasks instead of active ones
    /// (default false).
    #[serde(default)]
    pub include_completed: bool,
    /// Only include tasks with at least one of these contexts.
    #[serde(default)]
    pub include_contexts: Vec<String>,
    /// Exclude tasks with any of these contexts.
    #[serde(default)]
    pub exclude_contexts: Vec<String>,
    /// Only include tasks with at least one of these projects.
    #[serde(default)]
    pub include_projects: Vec<String>,
    /// Exclude tasks with any of these projects.
    #[serde(default)]
    pub exclude_projects: Vec<String>,
    /// Keep only tasks that have (true) or lack (false) a due date.
    pub has_due_date: Option<bool>,
    /// Maximum number of tasks to return (default 100).
    #[serde(default = "default_list_limit")]
    pub max_results: usize,
}

const fn default_true() -> bool {
    true
}

const fn default_query_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

const fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

/// Serialize a result value into a text tool response.
fn json_response<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Map a domain error (todo file unreadable) onto an MCP error.
fn internal(e: crate::error::Error) -> McpError {
    McpError::internal_error(e.to_string(), None)
}

// Tool implementations
// Note: rmcp macros require pass-by-value for input parameters

#[tool(tool_box)]
impl TodoServer {
    /// Get aggregate statistics over the whole file.
    #[tool(
        description = "Get a comprehensive task overview: counts, priority and project histograms, due-today and overdue numbers"
    )]
    fn overview(&self) -> Result<CallToolResult, McpError> {
        let overview = self.manager.overview().map_err(internal)?;
        json_response(&overview)
    }

    /// Suggest the next task to work on.
    #[tool(
        description = "Suggest the next task to work on based on due dates, priorities, available time, context, and energy level"
    )]
    fn suggest_next_task(
        &self,
        #[tool(aggr)] input: SuggestNextTaskInput,
    ) -> Result<CallToolResult, McpError> {
        let suggestion = self
            .manager
            .suggest_next_task(
                input.time_available_minutes,
                input.context_filter.as_deref(),
                input.energy_level.as_deref(),
            )
            .map_err(internal)?;

        match suggestion {
            Some(suggestion) => json_response(&suggestion),
            // Structured error result, not a protocol failure.
            None => json_response(&serde_json::json!({ "error": "No available tasks found" })),
        }
    }

    /// Show a project's active and waiting tasks.
    #[tool(description = "Show all tasks for a specific project, split into active and waiting")]
    fn project_tasks(
        &self,
        #[tool(aggr)] input: ProjectTasksInput,
    ) -> Result<CallToolResult, McpError> {
        let result = self.manager.project_tasks(&input.project_name).map_err(internal)?;
        json_response(&result)
    }

    /// Show waiting/blocked tasks grouped by project.
    #[tool(description = "Show all waiting/blocked tasks, organized by project")]
    fn waiting_tasks(&self) -> Result<CallToolResult, McpError> {
        let result = self.manager.waiting_tasks().map_err(internal)?;
        json_response(&result)
    }

    /// Show inbox tasks needing triage.
    #[tool(description = "Show all inbox (+in) tasks that need to be processed")]
    fn inbox_tasks(&self) -> Result<CallToolResult, McpError> {
        let result = self.manager.inbox_tasks().map_err(internal)?;
        json_response(&result)
    }

    /// Show tasks for one context.
    #[tool(description = "Show active tasks filtered by a specific context")]
    fn context_tasks(
        &self,
        #[tool(aggr)] input: ContextTasksInput,
    ) -> Result<CallToolResult, McpError> {
        let result = self.manager.context_tasks(&input.context).map_err(internal)?;
        json_response(&result)
    }

    /// Search tasks by free text with optional filters.
    #[tool(
        description = "Search tasks by free text across descriptions, projects, and contexts, with optional project/context filters"
    )]
    fn query_tasks(
        &self,
        #[tool(aggr)] input: QueryTasksInput,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .manager
            .query_tasks(
                &input.query_text,
                &input.projects,
                &input.contexts,
                input.exclude_completed,
                input.max_results,
            )
            .map_err(internal)?;
        json_response(&result)
    }

    /// List filtered tasks with a quick summary block.
    #[tool(
        description = "Get all tasks with optional filtering; the response includes a quick summary with priority, project, and context histograms"
    )]
    fn get_all_tasks(
        &self,
        #[tool(aggr)] input: GetAllTasksInput,
    ) -> Result<CallToolResult, McpError> {
        let options = FilterOptions {
            exclude_contexts: input.exclude_contexts,
            include_contexts: input.include_contexts,
            exclude_projects: input.exclude_projects,
            include_projects: input.include_projects,
            only_active: !input.include_completed,
            has_due_date: input.has_due_date,
        };
        let result = self.manager.all_tasks(&options, input.max_results).map_err(internal)?;
        json_response(&result)
    }
}

#[rmcp::tool(tool_box)]
impl rmcp::ServerHandler for TodoServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "todo-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn server_for(content: &str) -> (NamedTempFile, TodoServer) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let server = TodoServer::new(file.path());
        (file, server)
    }

    #[test]
    fn test_tools_succeed_on_sample_file() {
        let (_file, server) = server_for(
            "(A) review reports due:2024-12-23 +work\nprocess notes +in\nchase invoice @waiting\n",
        );

        assert!(server.overview().is_ok());
        assert!(server.waiting_tasks().is_ok());
        assert!(server.inbox_tasks().is_ok());
        assert!(server
            .project_tasks(ProjectTasksInput { project_name: "work".to_string() })
            .is_ok());
        assert!(server.context_tasks(ContextTasksInput { context: "waiting".to_string() }).is_ok());
        assert!(server
            .suggest_next_task(SuggestNextTaskInput {
                time_available_minutes: None,
                context_filter: None,
                energy_level: None,
            })
            .is_ok());
    }

    #[test]
    fn test_tools_succeed_on_missing_file() {
        let server = TodoServer::new(Path::new("/nonexistent/todo.txt"));
        assert!(server.overview().is_ok());
        assert!(server
            .get_all_tasks(GetAllTasksInput {
                include_completed: false,
                include_contexts: Vec::new(),
                exclude_contexts: Vec::new(),
                include_projects: Vec::new(),
                exclude_projects: Vec::new(),
                has_due_date: None,
                max_results: 100,
            })
            .is_ok());
    }

    #[test]
    fn test_input_defaults() {
        let input: QueryTasksInput = serde_json::from_str("{}").unwrap();
        assert!(input.exclude_completed);
        assert_eq!(input.max_results, DEFAULT_QUERY_LIMIT);
        assert!(input.query_text.is_empty());

        let input: GetAllTasksInput = serde_json::from_str("{}").unwrap();
        assert!(!input.include_completed);
        assert_eq!(input.max_results, DEFAULT_LIST_LIMIT);
        assert!(input.has_due_date.is_none());
    }

    #[test]
    fn test_required_argument_enforced() {
        // project_name is required; deserialization of the input must fail.
        let result: Result<ProjectTasksInput, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }
}
