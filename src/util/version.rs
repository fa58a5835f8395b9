pub const APP_NAME: &str = "jimi";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Release tag when built from a tagged checkout, crate version otherwise,
/// followed by the short commit hash when known.
pub fn version_label() -> String {
    let version = match GIT_TAG {
        Some(tag) => tag.to_string(),
        None => format!("v{APP_VERSION}"),
    };
    match GIT_COMMIT {
        Some(commit) => format!("{version} ({commit})"),
        None => version,
    }
}
