use ngs_setup_core::SetupError;

use crate::path_utils;

/// Red, human-readable diagnostic for a build-aborting error.
pub fn render_ansi(err: &SetupError) -> String {
    ansi_red(render_plain(err))
}

pub fn render_plain(err: &SetupError) -> String {
    match err {
        SetupError::ToolUnavailable {
            tool,
            build_dir,
            search_path,
        } => {
            let searched = search_path
                .as_ref()
                .map(|paths| {
                    std::env::split_paths(paths)
                        .filter(|dir| !dir.as_os_str().is_empty())
                        .map(|dir| format!("  {}\n", path_utils::display_short(&dir, None)))
                        .collect::<String>()
                })
                .filter(|dirs| !dirs.is_empty())
                .unwrap_or_else(|| "  (PATH is not set)\n".to_string());
            format!(
                "Failed to find `{tool}`.\n\
                 It could not be built in {} and no executable `{tool}` is on PATH.\n\
                 Searched:\n\
                 {searched}",
                build_dir.display(),
            )
        }
        SetupError::MissingVersionFile { path } => format!(
            "Failed to read the version from {}.\n\
             Write the release version on its first line and run again.\n",
            path.display()
        ),
        other => format!("{other}\n"),
    }
}

fn ansi_red(text: String) -> String {
    format!("\u{1b}[31m{text}\u{1b}[0m")
}
