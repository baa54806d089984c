//! Remote command construction
//!
//! Every shell command graft runs on the deploy host is built here, so the
//! orchestrator stays free of string formatting and tests can assert on
//! exact command text.

/// Quote for a POSIX shell: `'...'` with embedded quotes as `'\''`.
pub fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | ':' | '=' | '@' | '+' | ','))
    {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// The five best-effort prunes run by `graft host clean`, with a label each.
pub const HOST_CLEAN_STEPS: &[(&str, &str)] = &[
    ("stopped containers", "docker container prune -f"),
    ("dangling images", "docker image prune -f"),
    ("build cache", "docker builder prune -f"),
    ("unused volumes", "docker volume prune -f"),
    ("unused networks", "docker network prune -f"),
];

/// Compose invocations scoped to one remote project directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeCommands {
    remote_dir: String,
    use_sudo: bool,
}

impl ComposeCommands {
    pub fn new(remote_dir: impl Into<String>, use_sudo: bool) -> Self {
        Self {
            remote_dir: remote_dir.into(),
            use_sudo,
        }
    }

    pub fn remote_dir(&self) -> &str {
        &self.remote_dir
    }

    fn sudo(&self) -> &'static str {
        if self.use_sudo {
            "sudo "
        } else {
            ""
        }
    }

    fn compose(&self, args: &str) -> String {
        format!("{}docker compose {}", self.sudo(), args)
    }

    fn in_dir(&self, command: &str) -> String {
        format!("cd {} && {}", shell_quote(&self.remote_dir), command)
    }

    /// Create the project directory and hand it to the login user.
    pub fn ensure_project_dir(&self) -> String {
        let dir = shell_quote(&self.remote_dir);
        if self.use_sudo {
            format!("sudo mkdir -p {dir} && sudo chown $USER:$USER {dir}")
        } else {
            format!("mkdir -p {dir}")
        }
    }

    pub fn up_all(&self) -> String {
        self.in_dir(&self.compose("up -d --build --remove-orphans"))
    }

    pub fn build_all_no_cache(&self) -> String {
        self.in_dir(&format!(
            "{} && {}",
            self.compose("build --no-cache"),
            self.compose("up -d --remove-orphans")
        ))
    }

    /// Start with the uploaded manifest as-is, no image builds.
    pub fn up_without_build(&self) -> String {
        self.in_dir(&self.compose("up -d --remove-orphans"))
    }

    pub fn stop_and_remove(&self, service: &str) -> String {
        let service = shell_quote(service);
        self.in_dir(&format!(
            "{} && {}",
            self.compose(&format!("stop {}", service)),
            self.compose(&format!("rm -f {}", service))
        ))
    }

    pub fn up_service(&self, service: &str) -> String {
        self.in_dir(&self.compose(&format!("up -d --build {}", shell_quote(service))))
    }

    pub fn build_service_no_cache(&self, service: &str) -> String {
        let service = shell_quote(service);
        self.in_dir(&format!(
            "{} && {}",
            self.compose(&format!("build --no-cache {}", service)),
            self.compose(&format!("up -d {}", service))
        ))
    }

    pub fn builder_prune(&self) -> String {
        format!("{}docker builder prune -f", self.sudo())
    }

    pub fn image_prune(&self) -> String {
        format!("{}docker image prune -f", self.sudo())
    }

    pub fn logs(&self, service: &str) -> String {
        self.in_dir(&self.compose(&format!("logs -f --tail=100 {}", shell_quote(service))))
    }

    pub fn passthrough(&self, args: &[String]) -> String {
        let args: Vec<String> = args.iter().map(|a| shell_quote(a)).collect();
        self.in_dir(&self.compose(&args.join(" ")))
    }

    pub fn host_clean(&self) -> Vec<(&'static str, String)> {
        HOST_CLEAN_STEPS
            .iter()
            .map(|(label, command)| (*label, format!("{}{}", self.sudo(), command)))
            .collect()
    }
}
