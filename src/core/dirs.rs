use crate::core::error::{GitAccessorError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "git-accessor";

/// Platform base directory. On the XDG platforms `xdg_var` wins over `$HOME/<fallback>`.
fn base_directory(
    xdg_var: &str,
    xdg_fallback: &str,
    macos: &str,
    platform_default: fn() -> Option<PathBuf>,
) -> Option<PathBuf> {
    match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var_os(xdg_var)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(xdg_fallback))),
        "macos" => dirs::home_dir().map(|home| home.join(macos)),
        _ => platform_default(),
    }
}

pub fn get_config_directory() -> Result<PathBuf> {
    base_directory(
        "XDG_CONFIG_HOME",
        ".config",
        "Library/Application Support",
        dirs::config_dir,
    )
    .map(|base| base.join(APP_DIR))
    .ok_or(GitAccessorError::ConfigDirectoryNotFound)
}

pub fn get_cache_directory() -> Result<PathBuf> {
    base_directory("XDG_CACHE_HOME", ".cache", "Library/Caches", dirs::cache_dir)
        .map(|base| base.join(APP_DIR))
        .ok_or(GitAccessorError::ConfigDirectoryNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directories_end_with_app_name() {
        if let Ok(dir) = get_config_directory() {
            assert!(dir.ends_with(APP_DIR));
        }
        if let Ok(dir) = get_cache_directory() {
            assert!(dir.ends_with(APP_DIR));
        }
    }
}
