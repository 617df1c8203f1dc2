//! `qsync version`

use serde::Serialize;

use crate::api::DEFAULT_ENDPOINT;
use crate::error::Result;

#[derive(Serialize)]
struct VersionInfo {
    version: &'static str,
    build: &'static str,
    api: &'static str,
}

impl VersionInfo {
    const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            build: if cfg!(debug_assertions) { "dev" } else { "release" },
            api: DEFAULT_ENDPOINT,
        }
    }
}

/// Print the version as text or JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let info = VersionInfo::current();
    if json {
        println!("{}", serde_json::to_string(&info)?);
    } else {
        println!("qsync version {} ({})", info.version, info.build);
    }
    Ok(())
}
