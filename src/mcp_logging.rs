//! MCP server logging to help debug disconnections.
//!
//! Writes logs to `.todo-assistant/mcp.log` under a base directory.
//! Since stdout/stderr are captured by the MCP protocol, this logs
//! directly to file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Directory holding server state, next to the todo file.
const DATA_DIR: &str = ".todo-assistant";

/// The log filename within the data directory.
const LOG_FILENAME: &str = "mcp.log";

/// Maximum log file size before rotation (1MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Global log file handle (lazily initialized).
static LOG_FILE: Mutex<Option<File>> = Mutex::new(None);

/// Get the path to the MCP log file.
#[must_use]
pub fn log_path(base_dir: &Path) -> PathBuf {
    base_dir.join(DATA_DIR).join(LOG_FILENAME)
}

/// Initialize the MCP logger for a base directory.
///
/// This should be called once at MCP server startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn init(base_dir: &Path) -> std::io::Result<()> {
    let path = log_path(base_dir);

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Rotate log file if too large
    if path.exists() {
        if let Ok(metadata) = fs::metadata(&path) {
            if metadata.len() > MAX_LOG_SIZE {
                let backup = path.with_extension("log.old");
                let _ = fs::rename(&path, backup);
            }
        }
    }

    // Open log file in append mode
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(file);
    }

    log_event("MCP server starting");

    Ok(())
}

/// Write a log entry with a UTC timestamp.
fn write_log(message: &str) {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(ref mut file) = *guard {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let _ = writeln!(file, "[{ts}] {message}");
            let _ = file.flush();
        }
    }
}

/// Log a general event.
pub fn log_event(message: &str) {
    write_log(&format!("EVENT: {message}"));
}

/// Log an error.
pub fn log_error(message: &str) {
    write_log(&format!("ERROR: {message}"));
}

/// Log a warning.
pub fn log_warning(message: &str) {
    write_log(&format!("WARN: {message}"));
}

/// Log MCP server shutdown.
pub fn log_shutdown(exit_code: Option<i32>) {
    match exit_code {
        Some(code) => write_log(&format!("SHUTDOWN: exit code {code}")),
        None => write_log("SHUTDOWN: normal"),
    }
}

/// Log a panic with its location and payload.
#[allow(deprecated)] // PanicInfo is deprecated but PanicHookInfo requires Rust 1.81+
fn log_panic(info: &panic::PanicInfo<'_>) {
    let location = info.location().map_or_else(
        || "unknown".to_string(),
        |loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()),
    );

    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());

    write_log(&format!("PANIC at {location}: {payload}"));
}

/// Install a panic hook that logs panics to the MCP log file.
///
/// This should be called after `init()`.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Log to our file
        log_panic(info);

        // Also call the original hook (which may print to stderr)
        original_hook(info);
    }));

    log_event("Panic hook installed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_path() {
        let path = log_path(Path::new("/notes"));
        assert_eq!(path, PathBuf::from("/notes/.todo-assistant/mcp.log"));
    }

    // Tests below must be serial because they share global state (LOG_FILE)

    #[serial_test::serial]
    #[test]
    fn test_init_creates_log_file() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).unwrap();

        let path = log_path(dir.path());
        assert!(path.exists());
    }

    #[serial_test::serial]
    #[test]
    fn test_log_event_writes_to_file() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).unwrap();

        log_event("test event");

        let content = fs::read_to_string(log_path(dir.path())).unwrap();
        assert!(content.contains("EVENT: test event"));
    }

    #[serial_test::serial]
    #[test]
    fn test_log_error_and_warning() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).unwrap();

        log_error("broken");
        log_warning("wobbly");

        let content = fs::read_to_string(log_path(dir.path())).unwrap();
        assert!(content.contains("ERROR: broken"));
        assert!(content.contains("WARN: wobbly"));
    }

    #[serial_test::serial]
    #[test]
    fn test_log_shutdown() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).unwrap();

        log_shutdown(None);
        log_shutdown(Some(42));

        let content = fs::read_to_string(log_path(dir.path())).unwrap();
        assert!(content.contains("SHUTDOWN: normal"));
        assert!(content.contains("SHUTDOWN: exit code 42"));
    }

    #[serial_test::serial]
    #[test]
    fn test_log_rotation() {
        let dir = TempDir::new().unwrap();
        let path = log_path(dir.path());

        fs::create_dir_all(path.parent().unwrap()).unwrap();

        // Create an oversized log file
        let size = usize::try_from(MAX_LOG_SIZE + 1).unwrap();
        fs::write(&path, "x".repeat(size)).unwrap();

        // Init should rotate it
        init(dir.path()).unwrap();

        assert!(path.with_extension("log.old").exists());
        assert!(fs::metadata(&path).unwrap().len() < MAX_LOG_SIZE);
    }

    #[serial_test::serial]
    #[test]
    fn test_panic_hook_logs_panics() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).unwrap();
        install_panic_hook();

        let _ = std::panic::catch_unwind(|| {
            panic!("test panic message");
        });

        let content = fs::read_to_string(log_path(dir.path())).unwrap();
        assert!(content.contains("PANIC at"));
        assert!(content.contains("test panic message"));
    }
}
