//! # `todo_assistant`
//!
//! An MCP server exposing read-only query, filter, and suggestion tools
//! over a plain todo.txt file.

pub mod error;
pub mod mcp;
pub mod mcp_logging;
pub mod todo;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
