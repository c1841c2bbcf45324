//! Durable artifact writes.
//!
//! Artifacts are written to a temporary file in the destination directory
//! and renamed into place, so a final path only ever holds a complete file.

use crate::model::{RenderError, SessionId};
use crate::render::html::{escape_html, SESSION_META_NAME};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Highest numeric suffix tried before giving up on a name.
pub const MAX_COLLISION_SUFFIX: usize = 1000;

/// Lines of an existing artifact searched for the session meta tag.
const META_SCAN_LINES: usize = 16;

/// Create `dir` and its parents if absent.
pub fn ensure_dir(dir: &Path) -> Result<(), RenderError> {
    fs::create_dir_all(dir).map_err(|source| RenderError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Pick the file stem for a session's primary artifact.
///
/// Returns `base` if it is free or already holds this session, otherwise the
/// first `base-N` that is.
///
/// # Errors
///
/// `RenderError::NameCollision` when every candidate belongs to another
/// session.
pub fn choose_stem(dir: &Path, base: &str, session_id: &SessionId) -> Result<String, RenderError> {
    let wanted = escape_html(session_id.as_str());
    let candidates =
        std::iter::once(base.to_string()).chain((1..=MAX_COLLISION_SUFFIX).map(|n| format!("{}-{}", base, n)));

    for stem in candidates {
        let path = artifact_path(dir, &stem);
        if !path.exists() {
            return Ok(stem);
        }
        match embedded_session_id(&path) {
            Some(existing) if existing == wanted => {
                debug!(path = %path.display(), "Reusing artifact of the same session");
                return Ok(stem);
            }
            _ => debug!(path = %path.display(), "Name taken by another session"),
        }
    }

    Err(RenderError::NameCollision {
        stem: base.to_string(),
    })
}

/// `<dir>/<stem>.html`
pub fn artifact_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.html", stem))
}

/// Session id recorded in an existing artifact, still HTML-escaped.
fn embedded_session_id(path: &Path) -> Option<String> {
    let prefix = format!("<meta name=\"{}\" content=\"", SESSION_META_NAME);
    let reader = BufReader::new(File::open(path).ok()?);

    reader
        .lines()
        .take(META_SCAN_LINES)
        .map_while(Result::ok)
        .find_map(|line| {
            line.trim()
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix("\">"))
                .map(str::to_string)
        })
}

/// Remove artifacts of `session_id` in a sub-agent directory whose stem is
/// not in `keep`, along with their own sub-agent directories.
///
/// Files without this session's meta tag are never touched. A directory is
/// removed only when this call emptied it and it keeps nothing. Failures
/// are logged and skipped. Returns the number of files removed.
pub fn prune_stale_artifacts(dir: &Path, keep: &BTreeSet<&str>, session_id: &SessionId) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Cannot list sub-agent directory");
            return 0;
        }
    };
    let wanted = escape_html(session_id.as_str());

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if path.is_dir() {
            if !keep.contains(name.as_str()) {
                removed += prune_stale_artifacts(&path, &BTreeSet::new(), session_id);
            }
            continue;
        }
        let stale = name
            .strip_suffix(".html")
            .is_some_and(|stem| !keep.contains(stem));
        if !stale || embedded_session_id(&path).as_deref() != Some(wanted.as_str()) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "Removed stale sub-agent artifact");
                removed += 1;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Cannot remove stale artifact"),
        }
    }

    if removed > 0 && keep.is_empty() && fs::remove_dir(dir).is_ok() {
        debug!(dir = %dir.display(), "Removed emptied sub-agent directory");
    }
    removed
}

/// Atomically replace `path` with `contents`.
///
/// The temporary file lives next to `path` so the final rename never
/// crosses filesystems. On failure the temporary file is removed and any
/// previous file at `path` is left as it was.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), RenderError> {
    let write_err = |source: std::io::Error| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".ccbook-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o644)).map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
