use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Expands a leading `~` component and anchors relative paths at `base`.
pub fn resolve_in(base: &Path, path: &Path) -> PathBuf {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    let starts_with_tilde =
        matches!(components.next(), Some(Component::Normal(first)) if first == "~");
    let home = dirs::home_dir().filter(|_| starts_with_tilde);
    match home {
        Some(home) if components.as_path().as_os_str().is_empty() => home,
        Some(home) => home.join(components.as_path()),
        None => path.to_path_buf(),
    }
}

/// Short form for user-facing output: relative to `project_dir` when inside it, otherwise
/// with the home directory shown as `~`.
pub fn display_short(path: &Path, project_dir: Option<&Path>) -> String {
    let relative = project_dir
        .and_then(|dir| path.strip_prefix(dir).ok())
        .filter(|relative| !relative.as_os_str().is_empty());
    if let Some(relative) = relative {
        return relative.display().to_string();
    }

    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn relative_paths_are_anchored_at_base() {
        let base = Path::new("/work/project");
        assert_eq!(
            resolve_in(base, Path::new("Utils/bedtools")),
            PathBuf::from("/work/project/Utils/bedtools")
        );
        assert_eq!(
            resolve_in(base, Path::new("/opt/VERSION.txt")),
            PathBuf::from("/opt/VERSION.txt")
        );
        assert_eq!(
            resolve_in(base, Path::new("~user/x")),
            PathBuf::from("/work/project/~user/x")
        );
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let base = Path::new("/work/project");
        assert_eq!(resolve_in(base, Path::new("~")), home);
        assert_eq!(resolve_in(base, Path::new("~/proj")), home.join("proj"));
    }

    #[test]
    fn display_prefers_project_relative_then_home() {
        let project = Path::new("/work/project");
        assert_eq!(
            display_short(Path::new("/work/project/dist"), Some(project)),
            "dist"
        );
        assert_eq!(display_short(project, Some(project)), "/work/project");

        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(display_short(&home.join("bin"), Some(project)), "~/bin");
        assert_eq!(display_short(&home, None), "~");
    }
}
