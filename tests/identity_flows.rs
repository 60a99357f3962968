mod common;

use anyhow::Result;
use common::{
    can_bind_localhost, client, client_with_cache, descriptor, login, mount_login, EMAIL, PASSWORD,
};
use magicstream::{
    features::{
        auth::{
            guards::LOGIN_PATH, storage::SessionCache, LoginRequest, Navigation, RegisterForm,
            SessionSnapshot,
        },
        movies::{Genre, Movie, Ranking},
    },
    routes::Route,
    AppError, RequestError,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn register_form(password: &str, confirm_password: &str) -> RegisterForm {
    RegisterForm {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: EMAIL.to_string(),
        password: SecretString::from(password.to_string()),
        confirm_password: SecretString::from(confirm_password.to_string()),
        favorite_genres: vec![Genre {
            genre_id: 1,
            genre_name: "Comedy".to_string(),
        }],
    }
}

#[tokio::test]
async fn login_sets_session_and_allows_protected_routes() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_login(&server, "fresh", "r1").await;

    let client = client(&server);
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    client.session().observe(Arc::new(move |_: &SessionSnapshot| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let destination = login(&client).await;

    assert_eq!(destination, "/");
    assert_eq!(notified.load(Ordering::SeqCst), 1);
    let session = client.session().read().expect("session");
    assert_eq!(session.user_id, "1");
    assert_eq!(session.display_name(), "Ada Lovelace");

    let (route, navigation) = client.router().navigate("/recommended");
    assert_eq!(route, Route::Recommended);
    assert_eq!(
        navigation,
        Navigation::Allowed {
            destination: "/recommended".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn denied_destination_is_restored_once_after_login() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_login(&server, "fresh", "r1").await;

    let client = client(&server);

    let (_, navigation) = client.router().navigate("/recommended");
    assert_eq!(
        navigation,
        Navigation::Denied {
            requested: "/recommended".to_string(),
            redirect_to: LOGIN_PATH.to_string(),
        }
    );
    assert_eq!(client.guard().remembered(), Some("/recommended".to_string()));

    let destination = login(&client).await;
    assert_eq!(destination, "/recommended");
    assert_eq!(client.guard().remembered(), None);

    let (_, navigation) = client.router().navigate(&destination);
    assert!(navigation.is_allowed());
    Ok(())
}

#[tokio::test]
async fn rejected_login_leaves_store_untouched() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid email or password" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);
    let generation = client.session().generation();

    let err = client
        .identity()
        .login(&LoginRequest::new(EMAIL, "wrong"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AppError::RemoteRejected("Invalid email or password".to_string())
    );
    assert!(client.session().read().is_none());
    assert_eq!(client.session().generation(), generation);
    Ok(())
}

#[tokio::test]
async fn empty_credentials_never_reach_the_network() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client
        .identity()
        .login(&LoginRequest::new("", PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn mismatched_passwords_fail_locally() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client
        .identity()
        .register(&register_form("x", "y"))
        .await
        .unwrap_err();

    assert_eq!(err, AppError::Validation("Passwords do not match".to_string()));
    Ok(())
}

#[tokio::test]
async fn registration_sends_user_role_and_points_to_login() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_json(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": EMAIL,
            "password": "x",
            "role": "USER",
            "favorite_genres": [{ "genre_id": 1, "genre_name": "Comedy" }],
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "InsertedID": "64f0" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let next = client.identity().register(&register_form("x", "x")).await?;

    assert_eq!(next, LOGIN_PATH);
    assert!(client.session().read().is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_reported() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "error": "User already exists" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client
        .identity()
        .register(&register_form("x", "x"))
        .await
        .unwrap_err();

    assert_eq!(err, AppError::RemoteRejected("User already exists".to_string()));
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_even_when_remote_fails() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_login(&server, "fresh", "r1").await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .and(header("Authorization", "Bearer fresh"))
        .and(body_json(json!({ "user_id": "1" })))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    login(&client).await;

    let err = client.identity().logout().await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Request(RequestError::Http { status: 500, .. })
    ));
    assert!(client.session().read().is_none());

    let (_, navigation) = client.router().navigate("/review/tt0111161");
    assert_eq!(navigation.target(), LOGIN_PATH);
    Ok(())
}

#[tokio::test]
async fn logout_without_session_sends_nothing() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);
    client.identity().logout().await?;

    assert!(client.session().read().is_none());
    Ok(())
}

#[tokio::test]
async fn public_catalog_and_review_flow() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_login(&server, "fresh", "r1").await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/updatereview/tt0111161"))
        .and(header("Authorization", "Bearer fresh"))
        .and(body_json(json!({ "admin_review": "A stunning film" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ranking_name": "Excellent",
            "admin_review": "A stunning film",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client.catalog().movies().await?.is_empty());

    login(&client).await;
    let saved = client
        .catalog()
        .submit_review("tt0111161", "A stunning film")
        .await?;
    assert_eq!(saved.ranking_name, "Excellent");
    Ok(())
}

#[tokio::test]
async fn remembered_destination_survives_a_new_client() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let dir = tempfile::tempdir()?;
    let cache_path = dir.path().join("session.json");

    let server = MockServer::start().await;
    mount_login(&server, "fresh", "r1").await;

    let first = client_with_cache(&server, Some(cache_path.clone()));
    let (_, navigation) = first.router().navigate("/recommended");
    assert!(!navigation.is_allowed());
    drop(first);

    let second = client_with_cache(&server, Some(cache_path.clone()));
    assert_eq!(second.guard().remembered(), Some("/recommended".to_string()));

    let destination = login(&second).await;
    assert_eq!(destination, "/recommended");
    assert!(!SessionCache::new(&cache_path).destination_path().exists());
    drop(second);

    let third = client_with_cache(&server, Some(cache_path));
    assert_eq!(third.guard().remembered(), None);
    assert!(third.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn explicit_refresh_replaces_session() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_login(&server, "stale", "r1").await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .and(header("Authorization", "Bearer r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(descriptor("fresh", "r2")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    login(&client).await;
    let generation = client.session().generation();

    let session = client.identity().refresh().await?;

    assert_eq!(session.access_token().expose_secret(), "fresh");
    assert_eq!(session.refresh_token().expose_secret(), "r2");
    let stored = client.session().read().expect("session");
    assert_eq!(stored.access_token().expose_secret(), "fresh");
    assert!(client.session().generation() > generation);
    Ok(())
}

#[tokio::test]
async fn explicit_refresh_failure_clears_session() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    mount_login(&server, "stale", "r1").await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "refresh token expired" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    login(&client).await;

    let err = client.identity().refresh().await.unwrap_err();

    assert_eq!(err, AppError::AuthExpired);
    assert!(client.session().read().is_none());
    Ok(())
}

#[tokio::test]
async fn add_movie_posts_with_session_credential() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let movie = Movie {
        imdb_id: "tt0068646".to_string(),
        title: "The Godfather".to_string(),
        poster_path: "https://image.tmdb.org/godfather.jpg".to_string(),
        youtube_id: "sY1S34973zA".to_string(),
        genre: vec![Genre {
            genre_id: 2,
            genre_name: "Drama".to_string(),
        }],
        admin_review: String::new(),
        ranking: Ranking::default(),
    };

    let server = MockServer::start().await;
    mount_login(&server, "fresh", "r1").await;
    Mock::given(method("POST"))
        .and(path("/addmovie"))
        .and(header("Authorization", "Bearer fresh"))
        .and(body_json(serde_json::to_value(&movie)?))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "InsertedID": "65a1" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    login(&client).await;

    client.catalog().add_movie(&movie).await?;
    assert_eq!(client.refresh_attempts(), 0);
    Ok(())
}
