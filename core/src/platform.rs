use std::path::Path;

/// Host families that get their own prebuilt sambamba binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    /// RHEL, CentOS, Fedora and derivatives.
    RedHat,
    Linux,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            return Platform::MacOs;
        }

        let os_release = std::fs::read_to_string("/etc/os-release").unwrap_or_default();
        if is_redhat_os_release(&os_release) || Path::new("/etc/redhat-release").exists() {
            Platform::RedHat
        } else {
            Platform::Linux
        }
    }

    /// File name of the bundled sambamba build for this platform.
    pub fn sambamba_binary(self) -> &'static str {
        match self {
            Platform::MacOs => "sambamba_osx",
            Platform::RedHat => "sambamba_centos",
            Platform::Linux => "sambamba_lnx",
        }
    }
}

const REDHAT_IDS: &[&str] = &["rhel", "centos", "fedora", "redhat"];

/// Whether an `/etc/os-release` body names a Red Hat family distribution in `ID` or `ID_LIKE`.
pub fn is_redhat_os_release(contents: &str) -> bool {
    contents.lines().any(|line| {
        let Some((key, value)) = line.split_once('=') else {
            return false;
        };
        if !matches!(key.trim(), "ID" | "ID_LIKE") {
            return false;
        }
        value
            .trim()
            .trim_matches(&['"', '\''][..])
            .split_whitespace()
            .any(|id| REDHAT_IDS.contains(&id.to_ascii_lowercase().as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn detects_redhat_family_from_id_or_id_like() {
        assert!(is_redhat_os_release(
            "NAME=\"CentOS Linux\"\nID=\"centos\"\nID_LIKE=\"rhel fedora\"\n"
        ));
        assert!(is_redhat_os_release(
            "NAME=\"Rocky Linux\"\nID=\"rocky\"\nID_LIKE=\"rhel centos fedora\"\n"
        ));
        assert!(is_redhat_os_release("ID=fedora\n"));

        assert!(!is_redhat_os_release(
            "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\n"
        ));
        assert!(!is_redhat_os_release("PRETTY_NAME=\"not rhel\"\n"));
        assert!(!is_redhat_os_release(""));
    }

    #[test]
    fn sambamba_binary_per_platform() {
        assert_eq!(Platform::MacOs.sambamba_binary(), "sambamba_osx");
        assert_eq!(Platform::RedHat.sambamba_binary(), "sambamba_centos");
        assert_eq!(Platform::Linux.sambamba_binary(), "sambamba_lnx");
    }
}
