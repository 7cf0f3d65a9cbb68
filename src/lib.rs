//! Client for a REST collection of hero records: list, detail, add, rename,
//! delete and a debounced search, with every outcome recorded in a
//! user-visible message log.

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod message;
pub mod search;
pub mod types;
pub mod view;

pub use crate::config::HeroConfig;
pub use crate::core::HeroService;
pub use crate::error::HeroError;
pub use crate::message::MessageLog;
pub use crate::search::{spawn_search_pipeline, HeroSearch, SearchHandle, SearchState};
pub use crate::types::{Hero, HeroId, NewHero};
pub use crate::view::{Dashboard, HeroDetail, HeroesView, MessagesPanel};
