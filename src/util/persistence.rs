use std::path::PathBuf;

use directories::ProjectDirs;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "jimi";
const APP_NAME: &str = "jimi";

/// Default location of the YAML configuration, e.g.
/// `~/.config/jimi/config.yaml` on Linux.
pub fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}
