//! Shell context capture for the generation prompt.
//!
//! The model writes better commands when it knows where it is running; the
//! prompt template embeds a small snapshot of the invoking shell session.

use std::path::PathBuf;

/// Snapshot of the shell session the command will run in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellContext {
    pub cwd: String,
    pub home: String,
    pub user: String,
    pub shell: String,
    pub path: String,
}

impl ShellContext {
    /// Capture the context of the current process.
    pub fn capture() -> Self {
        Self::capture_with(
            std::env::current_dir().ok(),
            dirs::home_dir(),
            |name| std::env::var(name).ok(),
        )
    }

    /// Testable capture core with injected cwd/home/env sources.
    pub(crate) fn capture_with<FEnv>(
        cwd: Option<PathBuf>,
        home: Option<PathBuf>,
        env_lookup: FEnv,
    ) -> Self
    where
        FEnv: Fn(&str) -> Option<String>,
    {
        Self {
            cwd: cwd.map(|p| p.display().to_string()).unwrap_or_default(),
            home: home.map(|p| p.display().to_string()).unwrap_or_default(),
            user: env_lookup("USER").unwrap_or_else(|| "unknown".to_string()),
            shell: env_lookup("SHELL").unwrap_or_else(|| "/bin/zsh".to_string()),
            path: env_lookup("PATH").unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_uses_provided_sources() {
        let ctx = ShellContext::capture_with(
            Some(PathBuf::from("/srv/project")),
            Some(PathBuf::from("/home/mo")),
            |name| match name {
                "USER" => Some("mo".to_string()),
                "SHELL" => Some("/bin/zsh".to_string()),
                "PATH" => Some("/usr/bin:/bin".to_string()),
                _ => None,
            },
        );
        assert_eq!(ctx.cwd, "/srv/project");
        assert_eq!(ctx.home, "/home/mo");
        assert_eq!(ctx.user, "mo");
        assert_eq!(ctx.path, "/usr/bin:/bin");
    }

    #[test]
    fn capture_falls_back_for_missing_env() {
        let ctx = ShellContext::capture_with(None, None, |_| None);
        assert_eq!(ctx.user, "unknown");
        assert_eq!(ctx.shell, "/bin/zsh");
        assert_eq!(ctx.path, "");
        assert_eq!(ctx.cwd, "");
    }
}
