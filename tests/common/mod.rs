#![allow(dead_code)]

use magicstream::{features::auth::LoginRequest, AppConfig, MagicStream};
use serde_json::{json, Value};
use std::{net::TcpListener, path::PathBuf};
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const EMAIL: &str = "a@b.com";
pub const PASSWORD: &str = "x";

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn descriptor(token: &str, refresh_token: &str) -> Value {
    json!({
        "user_id": 1,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": EMAIL,
        "role": "USER",
        "token": token,
        "refresh_token": refresh_token,
        "favorite_genres": [{ "genre_id": 1, "genre_name": "Comedy" }],
    })
}

pub fn movies() -> Value {
    json!([
        {
            "imdb_id": "tt0111161",
            "title": "The Shawshank Redemption",
            "genre": [{ "genre_id": 2, "genre_name": "Drama" }],
            "ranking": { "ranking_value": 1, "ranking_name": "Excellent" }
        }
    ])
}

pub fn client(server: &MockServer) -> MagicStream {
    client_with_cache(server, None)
}

pub fn client_with_cache(server: &MockServer, session_file: Option<PathBuf>) -> MagicStream {
    let config = AppConfig {
        api_base_url: server.uri(),
        session_file,
        ..AppConfig::load()
    };
    MagicStream::new(config).expect("client")
}

/// Mounts `POST /login` answering with a session whose access token is `token`.
pub async fn mount_login(server: &MockServer, token: &str, refresh_token: &str) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "email": EMAIL, "password": PASSWORD })))
        .respond_with(ResponseTemplate::new(200).set_body_json(descriptor(token, refresh_token)))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn login(client: &MagicStream) -> String {
    client
        .identity()
        .login(&LoginRequest::new(EMAIL, PASSWORD))
        .await
        .expect("login")
        .destination
}
