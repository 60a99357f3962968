//! Catalog payloads. Field names follow the service's JSON contract.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub genre_id: i64,
    pub genre_name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ranking {
    #[serde(default)]
    pub ranking_value: i64,
    #[serde(default)]
    pub ranking_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movie {
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default)]
    pub youtube_id: String,
    #[serde(default)]
    pub genre: Vec<Genre>,
    #[serde(default)]
    pub admin_review: String,
    #[serde(default)]
    pub ranking: Ranking,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub admin_review: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewResponse {
    pub ranking_name: String,
    pub admin_review: String,
}
