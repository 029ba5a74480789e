use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Append a step output to the `GITHUB_OUTPUT` file using the heredoc form,
/// which is safe for multiline values.
pub fn set_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut delimiter = String::from("QA_INSTRUCTIONS_EOF");
    while value.contains(&delimiter) {
        delimiter.push('_');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open output file {}", path.display()))?;

    write!(file, "{name}<<{delimiter}\n{value}\n{delimiter}\n")
        .with_context(|| format!("failed to write output {name}"))?;

    log::debug!("Set output {name} ({} chars)", value.chars().count());
    Ok(())
}
