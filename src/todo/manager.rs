//! High-level read-only views over a todo.txt file.
//!
//! Every operation loads the file fresh through [`TodoParser`] and
//! returns an explicit result struct that the MCP layer serializes.

use crate::error::Result;
use crate::todo::models::{FilterOptions, Task};
use crate::todo::parser::TodoParser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Context names that suit each energy level.
const ENERGY_CONTEXTS: &[(&str, &[&str])] = &[
    ("high", &["focus", "creative", "complex", "brainstorm", "learn"]),
    ("medium", &["medium"]),
    ("low", &["routine", "admin", "communicate", "organize", "review"]),
];

/// Context names that suit each time-available bucket.
const TIME_CONTEXTS: &[(&str, &[&str])] = &[
    ("quick", &["quick", "call", "email"]),
    ("medium", &["medium", "meeting"]),
    ("long", &["deep", "project"]),
];

/// Context marking blocked/delegated tasks.
const WAITING_CONTEXT: &str = "waiting";

/// Pseudo-project marking unprocessed inbox items.
const INBOX_PROJECT: &str = "in";

/// A project name with its task count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectCount {
    /// Project name (without the `+` prefix).
    pub project: String,
    /// Number of tasks carrying the project.
    pub count: usize,
}

/// Aggregate statistics over the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewResult {
    /// Every parsed line, completed or not.
    pub total_tasks: usize,
    /// Tasks not yet completed.
    pub active_tasks: usize,
    /// Completed tasks.
    pub completed_tasks: usize,
    /// Active tasks excluding the waiting context.
    pub main_tasks: usize,
    /// Active tasks carrying the waiting context.
    pub waiting_tasks: usize,
    /// Active tasks in the `+in` inbox.
    pub inbox_tasks: usize,
    /// Task count per priority letter over main tasks, with a
    /// `"No Priority"` bucket for unprioritized ones.
    pub priority_distribution: BTreeMap<String, usize>,
    /// Top 10 projects over active tasks (inbox excluded), by
    /// descending count.
    pub top_projects: Vec<ProjectCount>,
    /// Main tasks due exactly today.
    pub due_today: usize,
    /// Main tasks with a due date before today.
    pub overdue: usize,
}

/// A next-task suggestion with ranked alternatives and reasoning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionResult {
    /// The best candidate per sort order.
    pub suggested_task: Task,
    /// Human-readable explanation, `"; "`-joined.
    pub reasoning: String,
    /// Up to three further candidates.
    pub alternatives: Vec<Task>,
    /// Size of the base candidate set before narrowing.
    pub total_available: usize,
    /// Size of the candidate set after narrowing.
    pub filtered_candidates: usize,
}

/// Tasks for one project, split into active and waiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectTasksResult {
    /// The project name queried.
    pub project: String,
    /// Active tasks carrying the project.
    pub active_tasks: Vec<Task>,
    /// Waiting tasks carrying the project.
    pub waiting_tasks: Vec<Task>,
    /// Combined count of both lists.
    pub total_count: usize,
}

/// All waiting tasks plus a per-project grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitingTasksResult {
    /// Every waiting task, in sort order.
    pub waiting_tasks: Vec<Task>,
    /// Waiting tasks grouped by project. A task without projects lands
    /// in the `"No Project"` bucket; one with several appears in each.
    pub by_project: BTreeMap<String, Vec<Task>>,
    /// Number of waiting tasks.
    pub total_count: usize,
}

/// Inbox tasks needing triage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxResult {
    /// Active tasks in the `+in` inbox.
    pub inbox_tasks: Vec<Task>,
    /// Number of inbox tasks.
    pub count: usize,
    /// Whether the inbox is non-empty.
    pub needs_processing: bool,
}

/// Active tasks for a single context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextTasksResult {
    /// The context queried.
    pub context: String,
    /// Matching tasks.
    pub tasks: Vec<Task>,
    /// Number of matching tasks.
    pub count: usize,
}

/// Echo of the filters a query was run with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryInfo {
    /// Free-text query, empty when none was given.
    pub query_text: String,
    /// Project allow-list.
    pub projects_filter: Vec<String>,
    /// Context allow-list.
    pub contexts_filter: Vec<String>,
    /// Whether completed tasks were excluded.
    pub exclude_completed: bool,
    /// Result cap that was applied.
    pub max_results: usize,
}

/// Result-set metadata for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsInfo {
    /// Number of tasks returned.
    pub total_returned: usize,
    /// Whether the cap cut off further matches.
    pub truncated: bool,
    /// Whether free-text search was applied.
    pub search_applied: bool,
}

/// Free-text query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    /// Matching tasks, in sort order.
    pub tasks: Vec<Task>,
    /// Echo of the applied filters.
    pub query_info: QueryInfo,
    /// Result-set metadata.
    pub results_info: ResultsInfo,
}

/// Due-date statistics for a quick summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueDateInfo {
    /// Tasks carrying any due date.
    pub with_due_dates: usize,
    /// Tasks due exactly today.
    pub due_today: usize,
    /// Tasks due before today.
    pub overdue: usize,
}

/// Histograms over a returned task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickStats {
    /// Number of tasks summarized.
    pub task_count: usize,
    /// Task count per priority letter, with a `"No Priority"` bucket.
    pub priority_distribution: BTreeMap<String, usize>,
    /// Top 10 projects by descending count.
    pub top_projects: Vec<ProjectCount>,
    /// Task count per context.
    pub contexts: BTreeMap<String, usize>,
    /// Due-date statistics.
    pub due_date_info: DueDateInfo,
}

/// Quick summary attached to `get_all_tasks` responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QuickSummary {
    /// No tasks matched the filters.
    Empty {
        /// Human-readable note.
        message: String,
    },
    /// Histograms over the returned tasks.
    Stats(QuickStats),
}

impl QuickSummary {
    /// Summarize a (possibly truncated) task list against `today`.
    #[must_use]
    pub fn for_tasks(tasks: &[Task], today: &str) -> Self {
        if tasks.is_empty() {
            return Self::Empty { message: "No tasks found".to_string() };
        }

        let mut priority_distribution = BTreeMap::new();
        let mut contexts = BTreeMap::new();
        for task in tasks {
            *priority_distribution.entry(priority_bucket(task)).or_insert(0) += 1;
            for context in &task.contexts {
                *contexts.entry(context.clone()).or_insert(0) += 1;
            }
        }

        Self::Stats(QuickStats {
            task_count: tasks.len(),
            priority_distribution,
            top_projects: top_projects(tasks, None),
            contexts,
            due_date_info: DueDateInfo {
                with_due_dates: tasks.iter().filter(|t| t.due_date.is_some()).count(),
                due_today: tasks.iter().filter(|t| t.due_date.as_deref() == Some(today)).count(),
                overdue: count_overdue(tasks, today),
            },
        })
    }
}

/// Echo of the filters applied by `get_all_tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiltersApplied {
    /// Whether the query asked for completed tasks.
    pub include_completed: bool,
    /// Context allow-list.
    pub include_contexts: Vec<String>,
    /// Context deny-list.
    pub exclude_contexts: Vec<String>,
    /// Project allow-list.
    pub include_projects: Vec<String>,
    /// Project deny-list.
    pub exclude_projects: Vec<String>,
    /// Due-date presence filter, if any.
    pub has_due_date: Option<bool>,
    /// Result cap that was applied.
    pub max_results: usize,
}

/// Metadata attached to a `get_all_tasks` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllTasksMetadata {
    /// Number of tasks returned.
    pub total_returned: usize,
    /// Echo of the applied filters.
    pub filters_applied: FiltersApplied,
    /// Quick histogram summary of the returned tasks.
    pub summary: QuickSummary,
}

/// Full filtered task listing with metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllTasksResult {
    /// The filtered, sorted, capped task list.
    pub tasks: Vec<Task>,
    /// Result metadata and quick summary.
    pub metadata: AllTasksMetadata,
}

/// Derived business logic over one todo.txt file.
#[derive(Debug, Clone)]
pub struct TodoManager {
    parser: TodoParser,
}

impl TodoManager {
    /// Create a manager bound to the given todo.txt file path.
    #[must_use]
    pub fn new(todo_file: &Path) -> Self {
        Self { parser: TodoParser::new(todo_file) }
    }

    /// The underlying parser.
    #[must_use]
    pub const fn parser(&self) -> &TodoParser {
        &self.parser
    }

    /// Aggregate statistics, compared against the current local date.
    ///
    /// # Errors
    ///
    /// Returns an error if the todo file cannot be read.
    pub fn overview(&self) -> Result<OverviewResult> {
        self.overview_at(&today())
    }

    /// Aggregate statistics against an explicit `today` (ISO date).
    ///
    /// # Errors
    ///
    /// Returns an error if the todo file cannot be read.
    pub fn overview_at(&self, today: &str) -> Result<OverviewResult> {
        let all_tasks = self.parser.load_all_tasks()?;
        let active: Vec<&Task> = all_tasks.iter().filter(|t| !t.completed).collect();
        let main_tasks = self.parser.filter_tasks(&FilterOptions {
            exclude_contexts: vec![WAITING_CONTEXT.to_string()],
            ..FilterOptions::default()
        })?;
        let waiting_tasks = self.parser.filter_tasks(&FilterOptions {
            include_contexts: vec![WAITING_CONTEXT.to_string()],
            ..FilterOptions::default()
        })?;

        let mut priority_distribution = BTreeMap::new();
        for task in &main_tasks {
            *priority_distribution.entry(priority_bucket(task)).or_insert(0) += 1;
        }

        // Histogram over active tasks, leaving out the inbox pseudo-project.
        let active_owned: Vec<Task> = active.iter().map(|t| (*t).clone()).collect();
        let top = top_projects(&active_owned, Some(INBOX_PROJECT));

        Ok(OverviewResult {
            total_tasks: all_tasks.len(),
            active_tasks: active.len(),
            completed_tasks: all_tasks.len() - active.len(),
            main_tasks: main_tasks.len(),
            waiting_tasks: waiting_tasks.len(),
            inbox_tasks: active.iter().filter(|t| t.has_project(INBOX_PROJECT)).count(),
            priority_distribution,
            top_projects: top,
            due_today: main_tasks.iter().filter(|t| t.due_date.as_deref() == Some(today)).count(),
            overdue: count_overdue(&main_tasks, today),
        })
    }

    /// Suggest the next task to work on, against the current local date.
    ///
    /// Returns `Ok(None)` when the base candidate set is empty; the
    /// caller turns that into a structured error result.
    ///
    /// # Errors
    ///
    /// Returns an error if the todo file cannot be read.
    pub fn suggest_next_task(
        &self,
        time_available_minutes: Option<u32>,
        context_filter: Option<&str>,
        energy_level: Option<&str>,
    ) -> Result<Option<SuggestionResult>> {
        self.suggest_next_task_at(time_available_minutes, context_filter, energy_level, &today())
    }

    /// Suggest the next task against an explicit `today` (ISO date).
    ///
    /// The base candidate set is every active non-waiting task,
    /// restricted to `context_filter` when given. Energy and time
    /// narrowings that would leave zero candidates are discarded
    /// rather than failing.
    ///
    /// # Errors
    ///
    /// Returns an error if the todo file cannot be read.
    pub fn suggest_next_task_at(
        &self,
        time_available_minutes: Option<u32>,
        context_filter: Option<&str>,
        energy_level: Option<&str>,
        today: &str,
    ) -> Result<Option<SuggestionResult>> {
        let mut options = FilterOptions {
            exclude_contexts: vec![WAITING_CONTEXT.to_string()],
            ..FilterOptions::default()
        };
        if let Some(context) = context_filter {
            options.include_contexts = vec![context.to_string()];
        }
        let tasks = self.parser.filter_tasks(&options)?;
        if tasks.is_empty() {
            return Ok(None);
        }

        let mut candidates = tasks.clone();
        let mut filtering_reasons: Vec<String> = Vec::new();

        if let Some(level) = energy_level {
            if let Some(matching) = narrow_by_contexts(&candidates, ENERGY_CONTEXTS, level) {
                candidates = matching;
                filtering_reasons.push(format!("filtered for {level} energy tasks"));
            }
        }

        if let Some(minutes) = time_available_minutes {
            let category = if minutes <= 15 {
                "quick"
            } else if minutes <= 60 {
                "medium"
            } else {
                "long"
            };
            if let Some(matching) = narrow_by_contexts(&candidates, TIME_CONTEXTS, category) {
                candidates = matching;
                filtering_reasons.push(format!("filtered for {category} duration tasks"));
            }
        }

        if candidates.is_empty() {
            candidates = tasks.clone();
            filtering_reasons.push("no tasks matched filters, showing all available".to_string());
        }

        let suggested = candidates[0].clone();
        let alternatives: Vec<Task> = candidates.iter().skip(1).take(3).cloned().collect();

        let mut reasons: Vec<String> = Vec::new();
        if let Some(due) = &suggested.due_date {
            if due.as_str() <= today {
                reasons.push("Due today or overdue".to_string());
            } else {
                reasons.push(format!("Due {due}"));
            }
        }
        if let Some(priority) = suggested.priority {
            reasons.push(format!("Priority {priority}"));
        }
        if let Some(context) = context_filter {
            reasons.push(format!("Matches context {context}"));
        }
        if let Some(minutes) = time_available_minutes {
            reasons.push(format!("You have {minutes} minutes available"));
        }
        reasons.extend(filtering_reasons);
        if reasons.is_empty() {
            reasons.push("Next in priority order".to_string());
        }

        Ok(Some(SuggestionResult {
            suggested_task: suggested,
            reasoning: reasons.join("; "),
            alternatives,
            total_available: tasks.len(),
            filtered_candidates: candidates.len(),
        }))
    }

    /// Active and waiting tasks for one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the todo file cannot be read.
    pub fn project_tasks(&self, project_name: &str) -> Result<ProjectTasksResult> {
        let active_tasks = self.parser.filter_tasks(&FilterOptions {
            include_projects: vec![project_name.to_string()],
            ..FilterOptions::default()
        })?;
        let waiting_tasks = self.parser.filter_tasks(&FilterOptions {
            include_projects: vec![project_name.to_string()],
            include_contexts: vec![WAITING_CONTEXT.to_string()],
            ..FilterOptions::default()
        })?;

        Ok(ProjectTasksResult {
            project: project_name.to_string(),
            total_count: active_tasks.len() + waiting_tasks.len(),
            active_tasks,
            waiting_tasks,
        })
    }

    /// All waiting tasks, grouped by project.
    ///
    /// # Errors
    ///
    /// Returns an error if the todo file cannot be read.
    pub fn waiting_tasks(&self) -> Result<WaitingTasksResult> {
        let waiting_tasks = self.parser.filter_tasks(&FilterOptions {
            include_contexts: vec![WAITING_CONTEXT.to_string()],
            ..FilterOptions::default()
        })?;

        let mut by_project: BTreeMap<String, Vec<Task>> = BTreeMap::new();
        for task in &waiting_tasks {
            if task.projects.is_empty() {
                by_project.entry("No Project".to_string()).or_default().push(task.clone());
            } else {
                for project in &task.projects {
                    by_project.entry(project.clone()).or_default().push(task.clone());
                }
            }
        }

        Ok(WaitingTasksResult {
            total_count: waiting_tasks.len(),
            waiting_tasks,
            by_project,
        })
    }

    /// Active inbox (`+in`) tasks needing triage.
    ///
    /// # Errors
    ///
    /// Returns an error if the todo file cannot be read.
    pub fn inbox_tasks(&self) -> Result<InboxResult> {
        let inbox_tasks = self.parser.filter_tasks(&FilterOptions {
            include_projects: vec![INBOX_PROJECT.to_string()],
            ..FilterOptions::default()
        })?;

        Ok(InboxResult {
            count: inbox_tasks.len(),
            needs_processing: !inbox_tasks.is_empty(),
            inbox_tasks,
        })
    }

    /// Active tasks carrying one context.
    ///
    /// # Errors
    ///
    /// Returns an error if the todo file cannot be read.
    pub fn context_tasks(&self, context: &str) -> Result<ContextTasksResult> {
        let tasks = self.parser.filter_tasks(&FilterOptions {
            include_contexts: vec![context.to_string()],
            ..FilterOptions::default()
        })?;

        Ok(ContextTasksResult { context: context.to_string(), count: tasks.len(), tasks })
    }

    /// Free-text query over descriptions, raw lines, projects, and
    /// contexts (case-insensitive), after base filtering.
    ///
    /// A `max_results` of 0 disables the cap.
    ///
    /// # Errors
    ///
    /// Returns an error if the todo file cannot be read.
    pub fn query_tasks(
        &self,
        query_text: &str,
        projects: &[String],
        contexts: &[String],
        exclude_completed: bool,
        max_results: usize,
    ) -> Result<QueryResult> {
        let options = FilterOptions {
            include_projects: projects.to_vec(),
            include_contexts: contexts.to_vec(),
            only_active: exclude_completed,
            ..FilterOptions::default()
        };
        let mut tasks = self.parser.filter_tasks(&options)?;

        let search_applied = !query_text.is_empty();
        if search_applied {
            let query = query_text.to_lowercase();
            tasks.retain(|task| matches_query(task, &query));
        }

        let truncated = max_results > 0 && tasks.len() > max_results;
        if truncated {
            tasks.truncate(max_results);
        }

        Ok(QueryResult {
            query_info: QueryInfo {
                query_text: query_text.to_string(),
                projects_filter: projects.to_vec(),
                contexts_filter: contexts.to_vec(),
                exclude_completed,
                max_results,
            },
            results_info: ResultsInfo {
                total_returned: tasks.len(),
                truncated,
                search_applied,
            },
            tasks,
        })
    }

    /// Filtered task listing with a quick summary, against the current
    /// local date.
    ///
    /// # Errors
    ///
    /// Returns an error if the todo file cannot be read.
    pub fn all_tasks(&self, options: &FilterOptions, max_results: usize) -> Result<AllTasksResult> {
        self.all_tasks_at(options, max_results, &today())
    }

    /// Filtered task listing against an explicit `today` (ISO date).
    ///
    /// The summary is computed over the returned (capped) list.
    /// A `max_results` of 0 disables the cap.
    ///
    /// # Errors
    ///
    /// Returns an error if the todo file cannot be read.
    pub fn all_tasks_at(
        &self,
        options: &FilterOptions,
        max_results: usize,
        today: &str,
    ) -> Result<AllTasksResult> {
        let mut tasks = self.parser.filter_tasks(options)?;
        if max_results > 0 && tasks.len() > max_results {
            tasks.truncate(max_results);
        }

        let metadata = AllTasksMetadata {
            total_returned: tasks.len(),
            filters_applied: FiltersApplied {
                include_completed: !options.only_active,
                include_contexts: options.include_contexts.clone(),
                exclude_contexts: options.exclude_contexts.clone(),
                include_projects: options.include_projects.clone(),
                exclude_projects: options.exclude_projects.clone(),
                has_due_date: options.has_due_date,
                max_results,
            },
            summary: QuickSummary::for_tasks(&tasks, today),
        };

        Ok(AllTasksResult { tasks, metadata })
    }
}

/// Current local date as an ISO `YYYY-MM-DD` string.
fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Histogram bucket for a task's priority.
fn priority_bucket(task: &Task) -> String {
    task.priority.map_or_else(|| "No Priority".to_string(), |p| p.to_string())
}

/// Count tasks with a due date strictly before `today`. ISO dates
/// compare correctly as strings.
fn count_overdue(tasks: &[Task], today: &str) -> usize {
    tasks.iter().filter(|t| t.due_date.as_deref().is_some_and(|d| d < today)).count()
}

/// Top 10 projects by descending count. Ties keep first-seen order
/// thanks to the stable sort.
fn top_projects(tasks: &[Task], exclude: Option<&str>) -> Vec<ProjectCount> {
    let mut counts: Vec<ProjectCount> = Vec::new();
    for task in tasks {
        for project in &task.projects {
            if exclude == Some(project.as_str()) {
                continue;
            }
            match counts.iter_mut().find(|pc| &pc.project == project) {
                Some(pc) => pc.count += 1,
                None => counts.push(ProjectCount { project: project.clone(), count: 1 }),
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(10);
    counts
}

/// Keep only candidates with at least one context from the named
/// mapping entry. Returns `None` when the level is unknown or the
/// narrowing would leave zero tasks.
fn narrow_by_contexts(
    candidates: &[Task],
    mapping: &[(&str, &[&str])],
    level: &str,
) -> Option<Vec<Task>> {
    let (_, contexts) = mapping.iter().find(|(name, _)| *name == level)?;
    let matching: Vec<Task> = candidates
        .iter()
        .filter(|task| task.contexts.iter().any(|c| contexts.contains(&c.as_str())))
        .cloned()
        .collect();
    if matching.is_empty() {
        None
    } else {
        Some(matching)
    }
}

/// Case-insensitive match against description, raw text, projects,
/// and contexts. `query` must already be lowercase.
fn matches_query(task: &Task, query: &str) -> bool {
    task.description.to_lowercase().contains(query)
        || task.raw.to_lowercase().contains(query)
        || task.projects.iter().any(|p| p.to_lowercase().contains(query))
        || task.contexts.iter().any(|c| c.to_lowercase().contains(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_TODO: &str = "\
(A) review quarterly reports due:2024-12-23 +work
(C) backup laptop due:2024-12-20 @offline
call dentist about appointment +health @phone
finish code review for PR #123 +development @waiting
(B) write blog post about parsing +writing @focus
process meeting notes +in
sort vacation photos +in

water plants rec:+3d t:2024-12-18 @routine
x 2024-12-20 2024-12-19 completed example task +work
";

    fn manager_for(content: &str) -> (NamedTempFile, TodoManager) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let manager = TodoManager::new(file.path());
        (file, manager)
    }

    #[test]
    fn test_overview_counts() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let overview = manager.overview_at("2024-12-21").unwrap();

        assert_eq!(overview.total_tasks, 9);
        assert_eq!(overview.active_tasks, 8);
        assert_eq!(overview.completed_tasks, 1);
        assert_eq!(overview.main_tasks, 7);
        assert_eq!(overview.waiting_tasks, 1);
        assert_eq!(overview.inbox_tasks, 2);
    }

    #[test]
    fn test_overview_priority_distribution() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let overview = manager.overview_at("2024-12-21").unwrap();

        assert_eq!(overview.priority_distribution.get("A"), Some(&1));
        assert_eq!(overview.priority_distribution.get("B"), Some(&1));
        assert_eq!(overview.priority_distribution.get("C"), Some(&1));
        assert_eq!(overview.priority_distribution.get("No Priority"), Some(&4));
    }

    #[test]
    fn test_overview_top_projects_exclude_inbox() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let overview = manager.overview_at("2024-12-21").unwrap();

        assert!(overview.top_projects.iter().all(|pc| pc.project != "in"));
        assert!(overview.top_projects.iter().any(|pc| pc.project == "work" && pc.count == 1));
    }

    #[test]
    fn test_overview_due_today_and_overdue() {
        let (_file, manager) = manager_for(SAMPLE_TODO);

        let on_due_day = manager.overview_at("2024-12-20").unwrap();
        assert_eq!(on_due_day.due_today, 1);
        assert_eq!(on_due_day.overdue, 0);

        let later = manager.overview_at("2024-12-24").unwrap();
        assert_eq!(later.due_today, 0);
        assert_eq!(later.overdue, 2);
    }

    #[test]
    fn test_suggest_high_energy_prefers_focus_contexts() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let suggestion =
            manager.suggest_next_task_at(None, None, Some("high"), "2024-12-21").unwrap().unwrap();

        let high_contexts = ["focus", "creative", "complex", "brainstorm", "learn"];
        assert!(suggestion
            .suggested_task
            .contexts
            .iter()
            .any(|c| high_contexts.contains(&c.as_str())));
        assert!(suggestion.reasoning.contains("filtered for high energy tasks"));
    }

    #[test]
    fn test_suggest_unmatched_filters_fall_back() {
        // The only @phone task has no high-energy context; the energy
        // narrowing must be discarded instead of failing.
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let suggestion = manager
            .suggest_next_task_at(None, Some("phone"), Some("high"), "2024-12-21")
            .unwrap()
            .unwrap();

        assert!(suggestion.suggested_task.has_context("phone"));
        assert!(suggestion.reasoning.contains("Matches context phone"));
        assert!(!suggestion.reasoning.contains("filtered for high energy tasks"));
        assert_eq!(suggestion.total_available, 1);
        assert_eq!(suggestion.filtered_candidates, 1);
    }

    #[test]
    fn test_suggest_time_available_buckets() {
        let content = "\
reply to support emails @quick +admin
plan new architecture @deep +platform
";
        let (_file, manager) = manager_for(content);

        let quick =
            manager.suggest_next_task_at(Some(10), None, None, "2024-12-21").unwrap().unwrap();
        assert!(quick.suggested_task.has_context("quick"));
        assert!(quick.reasoning.contains("filtered for quick duration tasks"));
        assert!(quick.reasoning.contains("You have 10 minutes available"));

        let long =
            manager.suggest_next_task_at(Some(120), None, None, "2024-12-21").unwrap().unwrap();
        assert!(long.suggested_task.has_context("deep"));
        assert!(long.reasoning.contains("filtered for long duration tasks"));
    }

    #[test]
    fn test_suggest_due_and_priority_reasoning() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let suggestion =
            manager.suggest_next_task_at(None, None, None, "2024-12-21").unwrap().unwrap();

        // Earliest due date wins: (C) backup laptop due:2024-12-20.
        assert_eq!(suggestion.suggested_task.priority, Some('C'));
        assert!(suggestion.reasoning.contains("Due today or overdue"));
        assert!(suggestion.reasoning.contains("Priority C"));
        assert_eq!(suggestion.alternatives.len(), 3);
    }

    #[test]
    fn test_suggest_plain_task_reasoning_default() {
        let (_file, manager) = manager_for("just one plain task\n");
        let suggestion =
            manager.suggest_next_task_at(None, None, None, "2024-12-21").unwrap().unwrap();
        assert_eq!(suggestion.reasoning, "Next in priority order");
    }

    #[test]
    fn test_suggest_no_tasks_returns_none() {
        let (_file, manager) = manager_for("");
        let result = manager.suggest_next_task_at(None, None, None, "2024-12-21").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_project_tasks_includes_waiting() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let result = manager.project_tasks("development").unwrap();

        assert_eq!(result.project, "development");
        assert_eq!(result.active_tasks.len(), 1);
        assert_eq!(result.waiting_tasks.len(), 1);
        assert_eq!(result.total_count, 2);
    }

    #[test]
    fn test_waiting_tasks_grouping() {
        let content = "\
chase vendor invoice @waiting
await design review +website @waiting
await legal signoff +website +contracts @waiting
";
        let (_file, manager) = manager_for(content);
        let result = manager.waiting_tasks().unwrap();

        assert_eq!(result.total_count, 3);
        assert_eq!(result.by_project.get("No Project").map(Vec::len), Some(1));
        assert_eq!(result.by_project.get("website").map(Vec::len), Some(2));
        // A multi-project task appears under each of its projects.
        assert_eq!(result.by_project.get("contracts").map(Vec::len), Some(1));
    }

    #[test]
    fn test_inbox_tasks() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let result = manager.inbox_tasks().unwrap();

        assert_eq!(result.count, 2);
        assert!(result.needs_processing);
        assert!(result.inbox_tasks.iter().all(|t| t.has_project("in")));
    }

    #[test]
    fn test_inbox_empty() {
        let (_file, manager) = manager_for("walk the dog @routine\n");
        let result = manager.inbox_tasks().unwrap();
        assert_eq!(result.count, 0);
        assert!(!result.needs_processing);
    }

    #[test]
    fn test_context_tasks() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let result = manager.context_tasks("offline").unwrap();

        assert_eq!(result.context, "offline");
        assert_eq!(result.count, 1);
        assert!(result.tasks[0].has_context("offline"));
    }

    #[test]
    fn test_query_text_matches_everywhere() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let result = manager.query_tasks("REVIEW", &[], &[], true, 1000).unwrap();

        assert!(result.results_info.search_applied);
        assert_eq!(result.tasks.len(), 2);
        for task in &result.tasks {
            let found = task.description.to_lowercase().contains("review")
                || task.raw.to_lowercase().contains("review")
                || task.projects.iter().any(|p| p.to_lowercase().contains("review"))
                || task.contexts.iter().any(|c| c.to_lowercase().contains("review"));
            assert!(found);
        }
    }

    #[test]
    fn test_query_truncation() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let result = manager.query_tasks("", &[], &[], true, 3).unwrap();

        assert!(result.results_info.truncated);
        assert_eq!(result.tasks.len(), 3);
        assert!(!result.results_info.search_applied);
    }

    #[test]
    fn test_query_project_filter() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let result =
            manager.query_tasks("", &["work".to_string()], &[], true, 1000).unwrap();

        assert_eq!(result.tasks.len(), 1);
        assert!(result.tasks[0].has_project("work"));
        assert_eq!(result.query_info.projects_filter, vec!["work".to_string()]);
    }

    #[test]
    fn test_query_completed_only() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let result = manager.query_tasks("", &[], &[], false, 1000).unwrap();

        assert_eq!(result.tasks.len(), 1);
        assert!(result.tasks[0].completed);
    }

    #[test]
    fn test_all_tasks_summary_and_cap() {
        let (_file, manager) = manager_for(SAMPLE_TODO);
        let result =
            manager.all_tasks_at(&FilterOptions::default(), 5, "2024-12-21").unwrap();

        assert_eq!(result.tasks.len(), 5);
        assert_eq!(result.metadata.total_returned, 5);
        assert_eq!(result.metadata.filters_applied.max_results, 5);
        match &result.metadata.summary {
            QuickSummary::Stats(stats) => {
                assert_eq!(stats.task_count, 5);
                assert_eq!(stats.due_date_info.with_due_dates, 2);
            }
            QuickSummary::Empty { .. } => panic!("expected stats summary"),
        }
    }

    #[test]
    fn test_all_tasks_empty_summary() {
        let (_file, manager) = manager_for("");
        let result =
            manager.all_tasks_at(&FilterOptions::default(), 100, "2024-12-21").unwrap();

        assert!(result.tasks.is_empty());
        match &result.metadata.summary {
            QuickSummary::Empty { message } => assert_eq!(message, "No tasks found"),
            QuickSummary::Stats(_) => panic!("expected empty summary"),
        }
    }
}
