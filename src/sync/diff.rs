//! Unified diff of article bodies.

use similar::TextDiff;

/// Line-based unified diff from `local` to `remote`, empty if they match.
#[must_use]
pub fn unified_diff(local: &str, remote: &str) -> String {
    // Terminate both sides so the last line never shows up as changed
    let local = format!("{local}\n");
    let remote = format!("{remote}\n");
    TextDiff::from_lines(&local, &remote)
        .unified_diff()
        .context_radius(3)
        .header("local", "remote")
        .to_string()
}
