pub mod events;
pub mod model;

pub use events::*;
pub use model::*;

use thiserror::Error;

/// Trait carried by anything the player can put on.
pub static WEARABLE_TRAIT: &str = "wearable";

pub static CAN_OPEN_TRAIT: &str = "can_open";

pub static OPENABLE_TRAIT: &str = "openable";

pub static IS_OPEN_TRAIT: &str = "is_open";

/// The worn item that gates carrying anything else.
pub static BACKPACK_NAME: &str = "backpack";

/// Where dropped items land, absent a named surface.
pub static DEFAULT_SURFACE: &str = "table";

/// Payload key a preventing handler answers with.
pub static MESSAGE_KEY: &str = "message";

/// Nested publishes beyond this depth abort the emission.
pub const MAXIMUM_EVENT_DEPTH: usize = 8;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("no such room `{0}`")]
    UnknownRoom(String),
    #[error("player is nowhere")]
    PlayerNowhere,
    #[error("handler failed for {kind}: {source}")]
    HandlerFailed {
        kind: EventKind,
        source: anyhow::Error,
    },
    #[error("event emission too deep")]
    EventOverflow,
}
