use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use anyhow::Context;

/// Directories produced by packaging runs, relative to the project root.
pub fn build_dirs(egg_info_dir: &str) -> [String; 3] {
    ["build".to_string(), "dist".to_string(), egg_info_dir.to_string()]
}

/// Removes the build directories that exist and returns the ones removed.
///
/// Anything else in `project_dir` is left alone; a second call finds nothing to do.
pub fn clean(project_dir: &Path, egg_info_dir: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for name in build_dirs(egg_info_dir) {
        let dir = project_dir.join(&name);
        if !dir.is_dir() {
            continue;
        }
        std::fs::remove_dir_all(&dir).with_context(|| format!("remove {}", dir.display()))?;
        tracing::debug!("removed {}", dir.display());
        removed.push(dir);
    }
    Ok(removed)
}

/// Echoes `$ <command>` and runs it in `cwd`, failing on a nonzero exit.
pub fn run_command(cwd: &Path, argv: &[&str]) -> anyhow::Result<()> {
    let Some((program, args)) = argv.split_first() else {
        anyhow::bail!("empty command");
    };
    let cmd_str = command_str(argv);
    println!("$ {cmd_str}");

    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .status()
        .with_context(|| format!("spawn `{cmd_str}`"))?;
    if !status.success() {
        anyhow::bail!("`{cmd_str}` failed with status {status}");
    }
    Ok(())
}

pub fn command_str(argv: &[&str]) -> String {
    shlex::try_join(argv.iter().copied()).unwrap_or_else(|_| argv.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_removes_only_build_dirs_and_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let project = dir.path();
        for name in ["build/lib", "dist", "ngs.egg-info", "ngs", "Utils/build"] {
            std::fs::create_dir_all(project.join(name)).expect("create dir");
        }
        std::fs::write(project.join("setup.py"), "").expect("write setup.py");
        // A plain file named like a build dir is not a directory and stays.
        std::fs::write(project.join("other.egg-info"), "").expect("write file");

        let removed = clean(project, "ngs.egg-info").expect("clean");
        assert_eq!(
            removed,
            vec![
                project.join("build"),
                project.join("dist"),
                project.join("ngs.egg-info"),
            ]
        );
        assert!(project.join("ngs").is_dir());
        assert!(project.join("Utils/build").is_dir());
        assert!(project.join("setup.py").is_file());
        assert!(project.join("other.egg-info").is_file());

        let removed_again = clean(project, "ngs.egg-info").expect("clean again");
        assert_eq!(removed_again, Vec::<PathBuf>::new());
    }

    #[test]
    fn command_str_quotes_arguments_with_spaces() {
        assert_eq!(
            command_str(&["git", "tag", "-a", "1.0", "-m", "Version 1.0"]),
            "git tag -a 1.0 -m 'Version 1.0'"
        );
    }

    #[test]
    fn run_command_rejects_empty_argv() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(run_command(dir.path(), &[]).is_err());
    }

    #[test]
    #[cfg(unix)]
    fn run_command_fails_on_nonzero_exit() {
        let dir = tempfile::tempdir().expect("tempdir");
        run_command(dir.path(), &["sh", "-c", "exit 0"]).expect("success");
        let err = run_command(dir.path(), &["sh", "-c", "exit 3"]).expect_err("failure");
        assert!(err.to_string().contains("failed with status"));
    }
}
