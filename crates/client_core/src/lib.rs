//! Client core for browsing a user's repository summary and paginated
//! activity feed without redundant network calls.

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod resolver;
pub mod state;

pub use cache::PaginationCache;
pub use config::{load_settings, Settings};
pub use controller::{ClientEvent, UserController};
pub use error::{GatewayError, SessionError};
pub use gateway::{ActivityGateway, HttpGateway};
pub use resolver::{resolve, EventDisplay, EventKind};
pub use state::{reduce, Action, Effect, Generation, Session, Tab, Transition, ViewState};

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;
