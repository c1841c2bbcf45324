//! Session discovery inside a Claude Code project directory.
//!
//! Claude Code stores each project's logs under
//! `~/.claude/projects/<encoded cwd>/<session id>.jsonl`. Sub-agent logs live
//! in nested directories, or as `agent-<id>.jsonl` beside the sessions in
//! older projects; neither is returned here.

use crate::model::error::InputError;
use crate::source::file::{file_stem, io_error, LogSource};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

const LOG_EXTENSION: &str = "jsonl";

/// File stem prefix of sub-agent logs stored next to session logs.
pub const SUBAGENT_LOG_PREFIX: &str = "agent-";

/// Convert an absolute working directory into Claude Code's project
/// directory name.
///
/// Every `/` becomes `-`, so `/Users/a/foo` maps to `-Users-a-foo`.
pub fn encode_project_path(cwd: &Path) -> String {
    cwd.to_string_lossy().replace('/', "-")
}

/// Restricts which sessions [`discover_sessions`] returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    /// Only the session whose file stem equals this id
    pub session_id: Option<String>,
    /// Only logs modified at or after this time
    pub modified_since: Option<SystemTime>,
}

impl SessionFilter {
    fn accepts(&self, source: &LogSource) -> bool {
        if let Some(wanted) = &self.session_id {
            if source.session_hint() != wanted {
                return false;
            }
        }
        match (self.modified_since, source.modified()) {
            (Some(since), Some(modified)) => modified >= since,
            _ => true,
        }
    }
}

/// List the top-level session logs of a project directory, in file name
/// order.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the directory does not exist.
/// Returns `InputError::Io` if it cannot be listed.
pub fn discover_sessions(
    project_dir: &Path,
    filter: &SessionFilter,
) -> Result<Vec<LogSource>, InputError> {
    let entries = fs::read_dir(project_dir).map_err(|e| io_error(project_dir, e))?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_error(project_dir, e))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => return Err(io_error(&path, e)),
        };
        let stem = file_stem(&path);
        if stem.starts_with(SUBAGENT_LOG_PREFIX) {
            debug!(path = %path.display(), "Skipping sub-agent log");
            continue;
        }
        let source = LogSource::new(&path, stem, metadata.modified().ok());
        if filter.accepts(&source) {
            sources.push(source);
        } else {
            debug!(path = %path.display(), "Session filtered out");
        }
    }

    sources.sort_by(|a, b| a.path().cmp(b.path()));
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn encode_project_path_replaces_every_slash() {
        assert_eq!(
            encode_project_path(&PathBuf::from("/Users/a/foo")),
            "-Users-a-foo"
        );
        assert_eq!(
            encode_project_path(&PathBuf::from("/home/dev/my.project")),
            "-home-dev-my.project"
        );
    }

    #[test]
    fn discover_lists_top_level_logs_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b-session.jsonl"), "").unwrap();
        fs::write(dir.path().join("a-session.jsonl"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir_all(dir.path().join("a-session/subagents")).unwrap();
        fs::write(
            dir.path().join("a-session/subagents/agent-x.jsonl"),
            "",
        )
        .unwrap();

        let sources = discover_sessions(dir.path(), &SessionFilter::default()).unwrap();

        let hints: Vec<&str> = sources.iter().map(LogSource::session_hint).collect();
        assert_eq!(hints, vec!["a-session", "b-session"]);
    }

    #[test]
    fn discover_skips_legacy_subagent_logs() {
        // GIVEN: a session log with an older-layout sub-agent log beside it
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("s1.jsonl"), "").unwrap();
        fs::write(dir.path().join("agent-a1.jsonl"), "").unwrap();

        // WHEN: discovering
        let sources = discover_sessions(dir.path(), &SessionFilter::default()).unwrap();

        // THEN: only the session is listed
        let hints: Vec<&str> = sources.iter().map(LogSource::session_hint).collect();
        assert_eq!(hints, vec!["s1"]);
    }

    #[test]
    fn discover_filters_by_session_id() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.jsonl"), "").unwrap();
        fs::write(dir.path().join("two.jsonl"), "").unwrap();

        let filter = SessionFilter {
            session_id: Some("two".to_string()),
            ..SessionFilter::default()
        };
        let sources = discover_sessions(dir.path(), &filter).unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].session_hint(), "two");
    }

    #[test]
    fn discover_filters_by_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old.jsonl"), "").unwrap();

        let filter = SessionFilter {
            modified_since: Some(SystemTime::now() + Duration::from_secs(3600)),
            ..SessionFilter::default()
        };
        let sources = discover_sessions(dir.path(), &filter).unwrap();

        assert!(sources.is_empty());
    }

    #[test]
    fn discover_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let result = discover_sessions(&missing, &SessionFilter::default());

        assert!(matches!(result, Err(InputError::FileNotFound { .. })));
    }
}
