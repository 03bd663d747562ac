//! Todo.txt domain: parsing, filtering, sorting, and derived views.
//!
//! The [`TodoParser`] turns the flat file into [`Task`] records and
//! applies filter/sort pipelines; the [`TodoManager`] builds the
//! higher-level read-only views (overview, suggestions, groupings)
//! on top of it.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use todo_assistant::todo::TodoManager;
//!
//! let manager = TodoManager::new(Path::new("todo.txt"));
//! let overview = manager.overview().unwrap();
//! println!("{} active tasks", overview.active_tasks);
//! ```

pub mod manager;
pub mod models;
pub mod parser;

pub use manager::{
    AllTasksResult, ContextTasksResult, InboxResult, OverviewResult, ProjectCount,
    ProjectTasksResult, QueryResult, SuggestionResult, TodoManager, WaitingTasksResult,
};
pub use models::{FilterOptions, Task};
pub use parser::TodoParser;
