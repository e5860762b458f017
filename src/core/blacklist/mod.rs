// Core blacklist module - block-lists, interception policy, error scrubbing
// and the admin command router.
//
// NO Discord dependencies here. The Discord layer converts its own types
// into the views defined in `blacklist_models`.

pub mod blacklist_models;
pub mod blacklist_service;
pub mod blacklist_store;
pub mod command_router;
pub mod error_scrubber;

pub use blacklist_models::*;
pub use blacklist_service::*;
pub use blacklist_store::{BlacklistStore, StoreError};
pub use command_router::handle_command;
pub use error_scrubber::ErrorScrubber;
