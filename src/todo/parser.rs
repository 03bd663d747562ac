//! Line-oriented todo.txt parser with filtering and sorting.
//!
//! Each query reads the file fresh; nothing is cached between calls.

use crate::error::{Error, Result};
use crate::todo::models::{FilterOptions, Task};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Sort key used for tasks without a due date. Sorts after every real
/// ISO date while still letting priority and line number break ties.
const NO_DUE_DATE_KEY: &str = "zzzz-12-31";

/// Completion marker with completion date and optional creation date:
/// `x 2024-01-15 2024-01-10 task description`.
static COMPLETED_DATES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^x\s+(\d{4}-\d{2}-\d{2})(?:\s+(\d{4}-\d{2}-\d{2}))?").unwrap()
});

/// Priority marker at the start of an active line: `(A)`.
static PRIORITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(([A-Z])\)").unwrap());

/// Project token. The `rec:+1d` exclusion is handled by checking the
/// preceding byte, since the regex crate has no look-behind.
static PROJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+(\w+)").unwrap());

/// Context token: `@name`.
static CONTEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").unwrap());

/// Due date tag: `due:YYYY-MM-DD`.
static DUE_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"due:(\d{4}-\d{2}-\d{2})").unwrap());

/// Threshold date tag: `t:YYYY-MM-DD`.
static THRESHOLD_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"t:(\d{4}-\d{2}-\d{2})").unwrap());

/// Recurrence tag: `rec:+1d`, `rec:1w`, ...
static RECURRENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"rec:(\+?\w+)").unwrap());

/// Completion prefix (marker plus dates) for description cleaning.
static COMPLETED_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^x\s+\d{4}-\d{2}-\d{2}(?:\s+\d{4}-\d{2}-\d{2})?\s*").unwrap()
});

/// Priority prefix for description cleaning.
static PRIORITY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\([A-Z]\)\s*").unwrap());

/// Metadata tags removed from descriptions.
static DUE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+due:\d{4}-\d{2}-\d{2}").unwrap());
static THRESHOLD_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+t:\d{4}-\d{2}-\d{2}").unwrap());
static RECURRENCE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+rec:\+?\w+").unwrap());

/// Parser and filter/sort engine for one todo.txt file.
#[derive(Debug, Clone)]
pub struct TodoParser {
    todo_file: PathBuf,
}

impl TodoParser {
    /// Create a parser bound to the given todo.txt file path.
    #[must_use]
    pub fn new(todo_file: &Path) -> Self {
        Self { todo_file: todo_file.to_path_buf() }
    }

    /// Path to the todo.txt file this parser reads.
    #[must_use]
    pub fn todo_file(&self) -> &Path {
        &self.todo_file
    }

    /// Parse a single todo.txt line into a [`Task`].
    ///
    /// Returns `None` for blank lines. Malformed or partial tags never
    /// fail; they simply leave the corresponding field empty. The
    /// returned task has `line_number` 0 until assigned by the loader.
    #[must_use]
    pub fn parse_line(raw_line: &str) -> Option<Task> {
        let line = raw_line.trim();
        if line.is_empty() {
            return None;
        }

        let completed = line.starts_with("x ");

        let mut completion_date = None;
        let mut creation_date = None;
        if completed {
            if let Some(captures) = COMPLETED_DATES.captures(line) {
                completion_date = Some(captures[1].to_string());
                creation_date = captures.get(2).map(|m| m.as_str().to_string());
            }
        }

        // Priority is only meaningful on active lines.
        let priority = if completed {
            None
        } else {
            PRIORITY.captures(line).and_then(|c| c[1].chars().next())
        };

        Some(Task {
            raw: line.to_string(),
            completed,
            priority,
            projects: extract_projects(line),
            contexts: CONTEXT.captures_iter(line).map(|c| c[1].to_string()).collect(),
            due_date: DUE_DATE.captures(line).map(|c| c[1].to_string()),
            threshold_date: THRESHOLD_DATE.captures(line).map(|c| c[1].to_string()),
            recurrence: RECURRENCE.captures(line).map(|c| c[1].to_string()),
            description: clean_description(line),
            creation_date,
            completion_date,
            line_number: 0,
        })
    }

    /// Load and parse every task in the file.
    ///
    /// A missing file yields an empty list. Line numbers are 1-based
    /// positions in the raw line list; blank lines produce no task but
    /// still advance the numbering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TodoFileRead`] if the file exists but cannot be
    /// read (permissions, invalid encoding).
    pub fn load_all_tasks(&self) -> Result<Vec<Task>> {
        if !self.todo_file.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.todo_file).map_err(|source| {
            Error::TodoFileRead { path: self.todo_file.clone(), source }
        })?;

        let mut tasks = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if let Some(mut task) = Self::parse_line(line) {
                task.line_number = i + 1;
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Load, filter, and sort tasks in one pass.
    ///
    /// All criteria in `options` are combined with logical AND; the
    /// surviving tasks are returned in [`Self::sort_tasks`] order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn filter_tasks(&self, options: &FilterOptions) -> Result<Vec<Task>> {
        let mut tasks = self.load_all_tasks()?;
        tasks.retain(|task| matches_filter(task, options));
        Ok(Self::sort_tasks(tasks))
    }

    /// Sort tasks by due date, then priority, then original line order.
    ///
    /// Tasks without a due date sort after every dated task; tasks
    /// without a priority sort after every prioritized one. The line
    /// number in the key makes the order total and deterministic.
    #[must_use]
    pub fn sort_tasks(mut tasks: Vec<Task>) -> Vec<Task> {
        tasks.sort_by(compare_tasks);
        tasks
    }
}

/// Comparison implementing the composite sort key.
fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    let key = |task: &Task| {
        (
            task.due_date.clone().unwrap_or_else(|| NO_DUE_DATE_KEY.to_string()),
            task.priority_rank(),
            task.line_number,
        )
    };
    key(a).cmp(&key(b))
}

/// Extract `+project` tokens, skipping any `+` directly preceded by a
/// `:` so recurrence tags like `rec:+1d` are not misread as projects.
fn extract_projects(line: &str) -> Vec<String> {
    PROJECT
        .captures_iter(line)
        .filter_map(|captures| {
            let marker = captures.get(0)?;
            if marker.start() > 0 && line.as_bytes()[marker.start() - 1] == b':' {
                return None;
            }
            Some(captures[1].to_string())
        })
        .collect()
}

/// Strip the completion prefix, priority marker, and recognized
/// metadata tags from a line. Project and context tokens remain part
/// of the description text.
fn clean_description(line: &str) -> String {
    let clean = COMPLETED_PREFIX.replace(line, "");
    let clean = PRIORITY_PREFIX.replace(&clean, "");
    let clean = DUE_TAG.replace_all(&clean, "");
    let clean = THRESHOLD_TAG.replace_all(&clean, "");
    let clean = RECURRENCE_TAG.replace_all(&clean, "");
    clean.trim().to_string()
}

/// Check a single task against every filter criterion.
fn matches_filter(task: &Task, options: &FilterOptions) -> bool {
    if options.only_active && task.completed {
        return false;
    }
    if !options.only_active && !task.completed {
        return false;
    }

    if options.exclude_contexts.iter().any(|ctx| task.has_context(ctx)) {
        return false;
    }
    if !options.include_contexts.is_empty()
        && !options.include_contexts.iter().any(|ctx| task.has_context(ctx))
    {
        return false;
    }

    if options.exclude_projects.iter().any(|proj| task.has_project(proj)) {
        return false;
    }
    if !options.include_projects.is_empty()
        && !options.include_projects.iter().any(|proj| task.has_project(proj))
    {
        return false;
    }

    if let Some(wants_due_date) = options.has_due_date {
        if wants_due_date != task.due_date.is_some() {
            return false;
        }
    }

    true
}
