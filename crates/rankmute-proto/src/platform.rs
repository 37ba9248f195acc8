//! Where rankmute keeps its files.
//!
//! Unix follows XDG (`~/.config/rankmute`, `~/.local/share/rankmute`) on
//! macOS too; other platforms use the `dirs` defaults.

use std::path::PathBuf;

const APP_DIR: &str = "rankmute";

#[cfg(unix)]
fn home_subdir(parts: &[&str]) -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
    path.extend(parts);
    path.join(APP_DIR)
}

pub fn data_dir() -> PathBuf {
    #[cfg(unix)]
    {
        home_subdir(&[".local", "share"])
    }
    #[cfg(not(unix))]
    {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    {
        home_subdir(&[".config"])
    }
    #[cfg(not(unix))]
    {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
    }
}

/// Default location of the persisted bearer token.
pub fn session_file() -> PathBuf {
    data_dir().join("session.json")
}

/// Default location of the tracing log file.
pub fn log_file() -> PathBuf {
    data_dir().join("rankmute.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_the_data_dir() {
        assert!(session_file().starts_with(data_dir()));
        assert!(log_file().starts_with(data_dir()));
        assert!(data_dir().ends_with(APP_DIR));
        assert!(config_dir().ends_with(APP_DIR));
    }
}
