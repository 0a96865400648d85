//! Strictly Ladders server - shared multiplayer sessions with live updates
//!
//! Wraps the pure game rules from [`strictly_ladders`] in thread-safe
//! sessions, fans snapshots out to subscribers, and exposes both over HTTP.
//!
//! # Architecture
//!
//! - **Registry**: creates sessions under monotonically increasing ids
//! - **Session**: one board plus a locked game state; every mutation publishes
//! - **Hub**: bounded per-subscriber queues with drop-on-full delivery
//! - **HTTP**: REST routes and a Server-Sent Events stream per session
//! - **Config**: TOML file, environment, and CLI layers
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use strictly_ladders_server::SessionRegistry;
//!
//! # fn example() -> anyhow::Result<()> {
//! let registry = SessionRegistry::new(100, NonZeroUsize::new(8).unwrap());
//! let session = registry.create(10)?;
//!
//! let mut updates = session.subscribe()?;
//! session.add_player("Arun")?;
//! session.add_player("Megha")?;
//! session.roll_dice()?;
//!
//! let first = updates.try_recv().unwrap().snapshot()?;
//! assert_eq!(first.version, 0);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod error;
mod http;
mod hub;
mod registry;
mod session;
mod simulate;
mod sync;

// Crate-level exports - Configuration
pub use config::{HOST_ENV, PORT_ENV, ServerConfig};

// Crate-level exports - Errors
pub use error::{ConfigError, SessionError};

// Crate-level exports - HTTP surface
pub use http::{
    ApiError, AppState, CreateGameQuery, CreatedGame, ErrorBody, JoinRequest, RollResponse,
    SessionSummary, router,
};

// Crate-level exports - Fan-out
pub use hub::{
    BroadcastReport, DEFAULT_QUEUE_CAPACITY, DeliveryEnd, SubscriberHub, SubscriberId,
    Subscription, Update,
};

// Crate-level exports - Sessions
pub use registry::{SessionId, SessionRegistry};
pub use session::GameSession;
pub use simulate::{Playthrough, play_out};
