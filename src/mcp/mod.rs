//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes the todo.txt query tools over the Model Context Protocol.

pub mod todo_server;

pub use todo_server::TodoServer;
