// src/exec/probe.rs

//! Host search-path lookup used for the pre-flight "does this command exist"
//! check.

use std::path::{Path, PathBuf};

/// Locate `program` the way a shell would.
///
/// A program containing a path separator is checked as a path; anything else
/// is looked up in every `PATH` entry in order.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    if program.contains('/') || program.contains('\\') {
        let path = Path::new(program);
        return is_executable(path).then(|| path.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    for base in std::env::split_paths(&path_var) {
        for candidate in candidates(&base, program) {
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(not(windows))]
fn candidates(base: &Path, program: &str) -> Vec<PathBuf> {
    vec![base.join(program)]
}

#[cfg(windows)]
fn candidates(base: &Path, program: &str) -> Vec<PathBuf> {
    let mut out = vec![base.join(program)];
    for ext in ["exe", "cmd", "bat"] {
        out.push(base.join(format!("{program}.{ext}")));
    }
    out
}

/// A regular file (after following links) with an execute bit set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}
