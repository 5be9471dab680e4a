//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the software root.
pub const SW_ROOT_ENV_VAR: &str = "RCCAR_SW_ROOT";

/// Get the software root directory.
///
/// This is `RCCAR_SW_ROOT` if it is set, otherwise the current working
/// directory. Parameter files live under `<root>/params` and sessions are
/// created under `<root>/sessions`.
pub fn get_sw_root() -> std::io::Result<PathBuf> {
    match std::env::var_os(SW_ROOT_ENV_VAR) {
        Some(root) => Ok(PathBuf::from(root)),
        None => std::env::current_dir()
    }
}
