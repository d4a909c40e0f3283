//! Terminal output formatting.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use ideabrowser_core::{AnalysisResult, BridgeConfig};

/// Print an analysis result as JSON on stdout.
pub fn print_result(result: &AnalysisResult, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(result)?
    } else {
        serde_json::to_string_pretty(result)?
    };
    println!("{}", rendered);
    Ok(())
}

/// Report collaborator output that could not be parsed.
pub fn print_parse_failure(raw: &str, source: &serde_json::Error) {
    eprintln!("{} {}", "✗".red().bold(), "Analysis output is not valid JSON".bold());
    eprintln!("  {}", source.to_string().dimmed());
    eprintln!();
    if raw.is_empty() {
        eprintln!("  {}", "(no output)".dimmed());
    } else {
        for line in raw.lines() {
            eprintln!("  {}", line);
        }
    }
}

/// Show the collaborator paths and whether they exist.
pub fn print_bridge_paths(bridge: &BridgeConfig) {
    println!("  {}", "Collaborator".bold());
    println!("    {}", path_status("executable", &bridge.executable_path));
    println!("    {}", path_status("script", &bridge.script_path));
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(note) = working_dir_note(bridge, &cwd) {
            println!("    {}", note.dimmed());
        }
    }
}

/// Note shown when a collaborator path is resolved against the working
/// directory, as the built-in `ml-engine/...` defaults are.
fn working_dir_note(bridge: &BridgeConfig, cwd: &Path) -> Option<String> {
    let cwd_relative = |path: &Path| path.is_relative() && path.components().count() > 1;
    (cwd_relative(&bridge.executable_path) || cwd_relative(&bridge.script_path)).then(|| {
        format!(
            "relative paths resolve against the working directory {}",
            cwd.display()
        )
    })
}

fn path_status(label: &str, path: &Path) -> String {
    let marker = if path.components().count() == 1 && path.is_relative() {
        "via PATH".yellow()
    } else if path.exists() {
        "found".green()
    } else {
        "missing".red()
    };
    format!("{:<11} {} ({})", label, path.display(), marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_status_markers() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();

        assert!(path_status("executable", Path::new("python3")).ends_with("(via PATH)"));
        assert!(path_status("script", dir.path()).ends_with("(found)"));
        assert!(path_status("script", &dir.path().join("nope.py")).ends_with("(missing)"));
    }

    #[test]
    fn test_working_dir_note_for_relative_defaults() {
        let cwd = Path::new("/srv/ideabrowser");
        let note = working_dir_note(&BridgeConfig::default(), cwd).unwrap();
        assert!(note.ends_with("/srv/ideabrowser"));

        let absolute = BridgeConfig {
            executable_path: "python3".into(),
            script_path: "/opt/ml/predict.py".into(),
            ..BridgeConfig::default()
        };
        assert_eq!(working_dir_note(&absolute, cwd), None);
    }
}
