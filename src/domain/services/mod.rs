//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! The resolver reads the manifest and build contexts from local disk;
//! nothing here touches the remote host.

mod commands;
mod manifest;
mod resolver;
mod rewriter;

pub use commands::{shell_quote, ComposeCommands, HOST_CLEAN_STEPS};
pub use manifest::{parse_manifest, ParsedManifest};
pub use resolver::{Resolver, ValidationError};
pub use rewriter::ManifestRewriter;
