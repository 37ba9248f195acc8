//! Shared types for the rankmute client: backend wire format, the listing
//! store, the session store and the HTTP client.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod platform;
pub mod protocol;
pub mod session;

pub use api::ApiClient;
pub use error::ApiError;
pub use model::{Artist, ArtistId, EntityRef, Listing, ListingError, Track, TrackId, TrackView};
pub use session::{Session, SessionStore};
