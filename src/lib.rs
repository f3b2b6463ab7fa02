//! Ezma: find books in Tashkent libraries and the nearest library holding them.

pub mod catalog;
pub mod config;
pub mod geo;
pub mod ranker;
pub mod server;

pub use geo::{haversine_km, GeoPoint};
pub use ranker::{find_nearby, Located, NearbyError, RankedResult, DEFAULT_RADIUS_KM};
