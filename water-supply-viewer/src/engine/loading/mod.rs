//! Startup loading of the optional model manifest.
//!
//! Requests the manifest, waits for it to load, fail or time out, then spawns
//! the infrastructure with models or placeholders.

/// Model manifest request and infrastructure spawning once it resolves.
pub mod manifest_loader;

/// Loading progress tracking resource for state transitions.
pub mod progress;
