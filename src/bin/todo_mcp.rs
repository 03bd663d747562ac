//! MCP server binary for todo.txt queries.
//!
//! Runs an MCP server over stdio transport, reading the todo.txt file
//! given as the first command-line argument.

use rmcp::ServiceExt;
use std::path::{Path, PathBuf};
use todo_assistant::mcp::TodoServer;
use todo_assistant::mcp_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let todo_file = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: todo-mcp <path-to-todo.txt>")?;

    // Log next to the todo file; stdout belongs to the protocol.
    let base_dir = todo_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    if let Err(e) = mcp_logging::init(&base_dir) {
        eprintln!("Warning: MCP logging init failed: {e}");
    }
    mcp_logging::install_panic_hook();

    if !todo_file.exists() {
        mcp_logging::log_warning(&format!(
            "todo file {} does not exist yet; serving an empty task list",
            todo_file.display()
        ));
    }

    let server = TodoServer::new(&todo_file);
    mcp_logging::log_event("MCP server created, starting stdio transport");
    let service = server.serve(rmcp::transport::stdio()).await?;
    mcp_logging::log_event("MCP server running");
    service.waiting().await?;

    mcp_logging::log_shutdown(None);
    Ok(())
}
