/// What one invocation does, picked from the last command-line token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Stamp the version, then create and push an annotated tag for it.
    Tag,
    /// Hand the source distribution to the configured upload command.
    Publish,
    /// Pull with submodules and fast-forward every submodule.
    Up,
    /// Remove build, dist and egg-info directories.
    Clean,
    /// Print the distribution manifest as JSON.
    Manifest,
    /// Stamp the version and acquire every bundled tool.
    Install,
    /// Unrecognised token; left to the packaging tool.
    PassThrough(String),
}

const INSTALL_TOKENS: &[&str] = &["install", "develop", "build", "build_ext"];

impl Action {
    /// Matches case-sensitively; a missing token means install.
    pub fn from_last_token(token: Option<&str>) -> Self {
        let Some(token) = token else {
            return Action::Install;
        };
        match token {
            "tag" => Action::Tag,
            "publish" => Action::Publish,
            "up" => Action::Up,
            "clean" => Action::Clean,
            "manifest" => Action::Manifest,
            _ if INSTALL_TOKENS.contains(&token) => Action::Install,
            other => Action::PassThrough(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn housekeeping_tokens_map_to_their_actions() {
        assert_eq!(Action::from_last_token(Some("tag")), Action::Tag);
        assert_eq!(Action::from_last_token(Some("publish")), Action::Publish);
        assert_eq!(Action::from_last_token(Some("up")), Action::Up);
        assert_eq!(Action::from_last_token(Some("clean")), Action::Clean);
        assert_eq!(Action::from_last_token(Some("manifest")), Action::Manifest);
    }

    #[test]
    fn build_style_tokens_and_no_token_install() {
        for token in ["install", "develop", "build", "build_ext"] {
            assert_eq!(Action::from_last_token(Some(token)), Action::Install);
        }
        assert_eq!(Action::from_last_token(None), Action::Install);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(
            Action::from_last_token(Some("Clean")),
            Action::PassThrough("Clean".to_string())
        );
        assert_eq!(
            Action::from_last_token(Some("sdist")),
            Action::PassThrough("sdist".to_string())
        );
    }
}
