//! Request and response types for identity calls. Descriptors carry access and refresh
//! tokens, so they must never be logged; [`Session`] keeps both behind `SecretString`.

use crate::{app_lib::RequestError, features::movies::Genre};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Session descriptor returned by `/login` and `/refresh` and cached across restarts.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionDescriptor {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub favorite_genres: Vec<Genre>,
}

impl std::fmt::Debug for SessionDescriptor {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SessionDescriptor")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// The authenticated identity held by the client.
///
/// Built only from a complete descriptor, so readers never observe a half-populated
/// session.
#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub favorite_genres: Vec<Genre>,
    access_token: SecretString,
    refresh_token: SecretString,
}

impl Session {
    #[must_use]
    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    #[must_use]
    pub fn refresh_token(&self) -> &SecretString {
        &self.refresh_token
    }

    /// True when the session identifies a user and carries an access credential.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.user_id.is_empty() && !self.access_token.expose_secret().is_empty()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// Converts back into the wire shape, used by the session cache.
    #[must_use]
    pub fn to_descriptor(&self) -> SessionDescriptor {
        SessionDescriptor {
            user_id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role: self.role,
            token: self.access_token.expose_secret().to_string(),
            refresh_token: self.refresh_token.expose_secret().to_string(),
            favorite_genres: self.favorite_genres.clone(),
        }
    }
}

impl TryFrom<SessionDescriptor> for Session {
    type Error = RequestError;

    fn try_from(descriptor: SessionDescriptor) -> Result<Self, Self::Error> {
        let user_id = descriptor.user_id.trim().to_string();
        if user_id.is_empty() {
            return Err(RequestError::Parse(
                "Session descriptor is missing user_id".to_string(),
            ));
        }

        Ok(Self {
            user_id,
            first_name: descriptor.first_name,
            last_name: descriptor.last_name,
            email: descriptor.email,
            role: descriptor.role,
            favorite_genres: descriptor.favorite_genres,
            access_token: SecretString::from(descriptor.token),
            refresh_token: SecretString::from(descriptor.refresh_token),
        })
    }
}

/// Login credentials. The password never leaves this struct except on the wire.
#[derive(Clone, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

impl LoginRequest {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Registration form as entered by the user, before local validation.
#[derive(Clone, Debug)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub favorite_genres: Vec<Genre>,
}

/// Wire payload for `POST /register`.
#[derive(Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
    pub favorite_genres: &'a [Genre],
}

/// Wire payload for `POST /login`.
#[derive(Serialize)]
pub(crate) struct LoginPayload<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct LogoutPayload<'a> {
    pub user_id: &'a str,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(value) => value,
        Id::Number(value) => value.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Genre>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Genre>>::deserialize(deserializer)?.unwrap_or_default())
}
