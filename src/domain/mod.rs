//! Domain Layer
//!
//! The sync engine's rules without direct network access.
//!
//! ## Structure
//!
//! - `entities/` - Project, Service, SyncPlan, registries
//! - `value_objects/` - DeployMode, SecretStore, IgnorePatterns
//! - `services/` - Manifest parsing, plan resolution, manifest rewriting, compose commands
//! - `ports/` - Interfaces implemented by infrastructure (remote executor, config store, events)
//!
//! ## Design Principles
//!
//! 1. **No remote I/O** - Everything that touches the remote host goes through `RemoteExecutor`
//! 2. **Pure resolution** - The same manifest and labels always resolve to the same plan
//! 3. **Ports & Adapters** - Local state goes through `ConfigStore` so tests can use fakes

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
