//! Standard configuration search paths.
//!
//! Responsibilities:
//! - Assemble the ordered list of directories a file loader searches,
//!   highest priority first.
//! - Use the `directories` crate for platform-appropriate user paths and
//!   the documented environment variables for the rest.
//!
//! Does NOT handle:
//! - File discovery itself (see `loader/file.rs`).
//!
//! Invariants:
//! - The list is a pure function of process environment, OS identity, and
//!   invocation path; it is recomputed on every call and carries no cache.
//! - No duplicates; empty entries are filtered out.

use std::env;
use std::path::{Path, PathBuf};

/// Standard configuration search paths, highest priority first:
/// current directory, `bin`-sibling resolutions, user home, user config
/// dirs, platform app-data dirs, system config dirs, system etc dirs.
pub fn get() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut push = |path: PathBuf| {
        if !path.as_os_str().is_empty() && !paths.contains(&path) {
            paths.push(path);
        }
    };

    // Current working directory (highest priority).
    push(PathBuf::from("."));

    // If the cwd is a bin directory, also check its parent.
    if let Ok(cwd) = env::current_dir() {
        if is_bin(&cwd) {
            if let Some(parent) = cwd.parent() {
                push(parent.to_path_buf());
            }
        }
    }

    // If the binary itself lives in a bin directory, check its parent.
    if let Ok(exe) = env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            if is_bin(exe_dir) {
                if let Some(parent) = exe_dir.parent() {
                    push(parent.to_path_buf());
                }
            }
        }
    }

    let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());

    // User home directory.
    if let Some(home) = &home {
        push(home.clone());
    }

    // XDG user config directory.
    if !cfg!(windows) {
        match env_dir("XDG_CONFIG_HOME") {
            Some(dir) => push(dir),
            None => {
                if let Some(home) = &home {
                    push(home.join(".config"));
                }
            }
        }
    }

    // Platform-specific user paths.
    if cfg!(windows) {
        if let Some(dir) = env_dir("APPDATA") {
            push(dir);
        }
        if let Some(dir) = env_dir("LOCALAPPDATA") {
            push(dir);
        }
    } else if cfg!(target_os = "macos") {
        if let Some(home) = &home {
            push(home.join("Library").join("Preferences"));
            push(home.join("Library").join("Application Support"));
        }
    }

    // XDG system-wide paths (before OS system paths).
    if !cfg!(windows) {
        let config_dirs =
            env::var("XDG_CONFIG_DIRS").unwrap_or_else(|_| "/etc/xdg".to_string());
        for dir in config_dirs.split(':').filter(|dir| !dir.is_empty()) {
            push(PathBuf::from(dir));
        }
    }

    // Platform-specific system paths.
    if cfg!(windows) {
        if let Some(dir) = env_dir("ProgramData") {
            push(dir);
        }
    } else if cfg!(target_os = "macos") {
        push(PathBuf::from("/Library/Preferences"));
        push(PathBuf::from("/Library/Application Support"));
    }

    // Unix-like system paths (lowest priority).
    if !cfg!(windows) {
        push(PathBuf::from("/etc"));
        push(PathBuf::from("/usr/local/etc"));
    }

    paths
}

fn is_bin(dir: &Path) -> bool {
    dir.file_name().is_some_and(|name| name == "bin")
}

fn env_dir(var: &str) -> Option<PathBuf> {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}
