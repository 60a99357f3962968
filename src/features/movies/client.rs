//! Client wrappers for catalog endpoints. Browsing and genre listing go over the
//! public channel; everything tied to the signed-in user goes over the authenticated
//! one, so an expired credential is renewed transparently and a review is sent once.

use crate::{
    app_lib::{AppError, AuthenticatedChannel, Body, PendingRequest, PublicChannel, RequestError},
    features::movies::types::{Genre, Movie, ReviewRequest, ReviewResponse},
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

#[derive(Clone)]
pub struct CatalogClient {
    public: PublicChannel,
    private: AuthenticatedChannel,
}

impl CatalogClient {
    #[must_use]
    pub fn new(public: PublicChannel, private: AuthenticatedChannel) -> Self {
        Self { public, private }
    }

    /// Lists the public catalog. An empty catalog is not an error.
    /// # Errors
    /// Returns the public channel's errors.
    #[instrument(skip(self))]
    pub async fn movies(&self) -> Result<Vec<Movie>, AppError> {
        let body = self.public.send(Method::GET, "/movies", None).await?;
        decode_list(body)
    }

    /// # Errors
    /// Returns the public channel's errors.
    #[instrument(skip(self))]
    pub async fn genres(&self) -> Result<Vec<Genre>, AppError> {
        let body = self.public.send(Method::GET, "/genres", None).await?;
        decode_list(body)
    }

    /// Movies picked for the signed-in user's favorite genres.
    /// # Errors
    /// Returns `AuthExpired` when the session cannot be renewed.
    #[instrument(skip(self))]
    pub async fn recommended(&self) -> Result<Vec<Movie>, AppError> {
        let body = self
            .private
            .dispatch(PendingRequest::get("/recommendedmovies"))
            .await?;
        decode_list(body)
    }

    /// # Errors
    /// `Validation` for an empty id, otherwise the authenticated channel's errors.
    #[instrument(skip(self))]
    pub async fn movie(&self, imdb_id: &str) -> Result<Movie, AppError> {
        let imdb_id = required_id(imdb_id)?;
        let body = self
            .private
            .dispatch(PendingRequest::get(format!("/movie/{imdb_id}")))
            .await?;
        decode(body)
    }

    /// Submits an admin review. The service ranks it and returns the ranking name.
    /// # Errors
    /// `Validation` for an empty id or review, `RemoteRejected` when the user lacks the
    /// admin role, otherwise the authenticated channel's errors.
    #[instrument(skip(self, review))]
    pub async fn submit_review(
        &self,
        imdb_id: &str,
        review: &str,
    ) -> Result<ReviewResponse, AppError> {
        let imdb_id = required_id(imdb_id)?;
        let review = review.trim();
        if review.is_empty() {
            return Err(AppError::validation("Review text is required."));
        }

        let payload = encode(&ReviewRequest {
            admin_review: review.to_string(),
        })?;
        let body = self
            .private
            .dispatch(PendingRequest::patch(format!("/updatereview/{imdb_id}"), payload))
            .await?;
        decode(body)
    }

    /// Adds a movie to the catalog.
    /// # Errors
    /// Returns the authenticated channel's errors.
    #[instrument(skip(self, movie), fields(imdb_id = %movie.imdb_id))]
    pub async fn add_movie(&self, movie: &Movie) -> Result<(), AppError> {
        required_id(&movie.imdb_id)?;
        let payload = encode(movie)?;
        self.private
            .dispatch(PendingRequest::post("/addmovie", payload))
            .await?;
        Ok(())
    }
}

fn required_id(imdb_id: &str) -> Result<&str, AppError> {
    let imdb_id = imdb_id.trim();
    if imdb_id.is_empty() {
        Err(AppError::validation("Movie ID is required."))
    } else {
        Ok(imdb_id)
    }
}

fn encode<T: serde::Serialize>(payload: &T) -> Result<Value, AppError> {
    serde_json::to_value(payload)
        .map_err(|err| RequestError::Serialization(format!("Failed to encode request: {err}")).into())
}

fn decode<T: DeserializeOwned>(body: Body) -> Result<T, AppError> {
    serde_json::from_value(body)
        .map_err(|err| RequestError::Parse(format!("Failed to decode response: {err}")).into())
}

/// Decodes a JSON list; `null` (an empty server-side slice) is an empty list.
fn decode_list<T: DeserializeOwned>(body: Body) -> Result<Vec<T>, AppError> {
    if body.is_null() {
        return Ok(Vec::new());
    }
    decode(body)
}
