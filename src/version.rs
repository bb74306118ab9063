//! Version and build information.

use std::fmt;

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: Option<&'static str>,
    pub build_date: Option<&'static str>,
    pub target: Option<&'static str>,
    pub rustc_version: Option<&'static str>,
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "campaign-audit {}", self.version)?;

        let optional = [
            ("Commit", self.commit),
            ("Built", self.build_date),
            ("Target", self.target),
            ("Rustc", self.rustc_version),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                write!(f, "\n{}: {}", label, value)?;
            }
        }
        Ok(())
    }
}

/// Get build information
pub fn get_build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("CAMPAIGN_AUDIT_GIT_HASH"),
        build_date: option_env!("CAMPAIGN_AUDIT_BUILD_DATE"),
        target: option_env!("CAMPAIGN_AUDIT_TARGET"),
        rustc_version: option_env!("CAMPAIGN_AUDIT_RUSTC_VERSION"),
    }
}
