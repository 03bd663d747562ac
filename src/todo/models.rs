//! Data model for parsed todo.txt lines.

use serde::{Deserialize, Serialize};

/// One parsed line of a todo.txt file.
///
/// Tasks are never mutated after construction; every query reparses the
/// file and builds fresh records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Original line text, trimmed.
    pub raw: String,
    /// Whether the line begins with the `x ` completion marker.
    pub completed: bool,
    /// Priority letter (`A`-`Z`). Only parsed on active lines.
    pub priority: Option<char>,
    /// Project names from `+name` tokens, in order of appearance.
    /// A `+` directly preceded by `:` (as in `rec:+1d`) is not a project.
    pub projects: Vec<String>,
    /// Context names from `@name` tokens, in order of appearance.
    pub contexts: Vec<String>,
    /// ISO date from a `due:YYYY-MM-DD` tag.
    pub due_date: Option<String>,
    /// ISO date from a `t:YYYY-MM-DD` threshold tag.
    pub threshold_date: Option<String>,
    /// Recurrence token from a `rec:` tag (may be `+`-prefixed, e.g. `+1d`).
    pub recurrence: Option<String>,
    /// Line text with the completion prefix, dates, priority marker, and
    /// `due:`/`t:`/`rec:` tags stripped. Project and context tokens stay.
    pub description: String,
    /// Creation date, present only on completed lines that carry one.
    pub creation_date: Option<String>,
    /// Completion date, present only on completed lines.
    pub completion_date: Option<String>,
    /// 1-based position in the raw line list. Blank lines are skipped
    /// without renumbering, so gaps are possible. Sort tiebreaker only.
    pub line_number: usize,
}

impl Task {
    /// Check whether the task carries the given context.
    #[must_use]
    pub fn has_context(&self, name: &str) -> bool {
        self.contexts.iter().any(|c| c == name)
    }

    /// Check whether the task carries the given project.
    #[must_use]
    pub fn has_project(&self, name: &str) -> bool {
        self.projects.iter().any(|p| p == name)
    }

    /// Priority rank for sorting: `A` = 1 through `Z` = 26, none = 999.
    #[must_use]
    pub fn priority_rank(&self) -> u16 {
        self.priority.map_or(999, |p| u16::from(p as u8 - b'A' + 1))
    }
}

/// Filter criteria for [`crate::todo::TodoParser::filter_tasks`].
///
/// All criteria are combined with logical AND. Empty lists mean
/// "no constraint".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Drop any task carrying one of these contexts.
    pub exclude_contexts: Vec<String>,
    /// If non-empty, keep only tasks with at least one of these contexts.
    pub include_contexts: Vec<String>,
    /// Drop any task carrying one of these projects.
    pub exclude_projects: Vec<String>,
    /// If non-empty, keep only tasks with at least one of these projects.
    pub include_projects: Vec<String>,
    /// If true (the default), keep only active tasks. If false, keep
    /// only completed tasks.
    pub only_active: bool,
    /// If set, keep only tasks whose due-date presence matches.
    pub has_due_date: Option<bool>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            exclude_contexts: Vec::new(),
            include_contexts: Vec::new(),
            exclude_projects: Vec::new(),
            include_projects: Vec::new(),
            only_active: true,
            has_due_date: None,
        }
    }
}
