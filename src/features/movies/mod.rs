//! Catalog feature: public browsing and genre listing, plus the authenticated
//! recommendation, movie detail and review calls.

pub mod client;
pub mod types;

pub use client::CatalogClient;
pub use types::{Genre, Movie, Ranking, ReviewResponse};
