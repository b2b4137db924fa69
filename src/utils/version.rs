//! Build identification for log lines and `--version`

/// Crate version baked in at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn get_version() -> &'static str {
    VERSION
}

/// `hilink-client 0.3.1`, or `hilink-client 0.3.1 (abc1234)` when the
/// build exported `GIT_HASH`
pub fn version_banner() -> String {
    let name = env!("CARGO_PKG_NAME");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{} {} ({})", name, VERSION, hash),
        _ => format!("{} {}", name, VERSION),
    }
}
