//! Remote host access

mod ssh;

pub use ssh::{SshExecutor, SshTarget, DEFAULT_SSH_PORT, DEFAULT_SSH_USER};
