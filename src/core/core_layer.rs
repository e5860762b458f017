// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "blacklist/mod.rs"]
pub mod blacklist;
