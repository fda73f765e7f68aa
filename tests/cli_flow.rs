//! End-to-end tests for the command runner: sign-in lifecycle, friends and
//! the dashboard, against a mock backend and in-memory storage.

use reelswipe::catalog::{fallback_movies, Movie, MovieId};
use reelswipe::cli::{Command, CommandRunner, DashboardArgs, FriendsCommand, ProfileCommand};
use reelswipe::config::Config;
use reelswipe::gesture::Rating;
use reelswipe::preferences::Preferences;
use reelswipe::session::UserSession;
use reelswipe::storage::Storage;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTH_JSON: &str = r#"{
    "user": {"id": "u1", "email": "ana@example.com", "name": "Ana", "provider": "email"},
    "token": "jwt-1"
}"#;

const FRIENDS_JSON: &str = r#"[{
    "id": "c1",
    "friend": {"id": "u2", "username": "bo", "displayName": "Bo", "isOnline": true},
    "status": "ACCEPTED",
    "createdAt": "2025-01-01T00:00:00Z"
}]"#;

fn config(server: &MockServer) -> Config {
    Config {
        tmdb_api_key: Some("test-key".to_string()),
        tmdb_base_url: server.uri(),
        backend_url: server.uri(),
        ..Config::default()
    }
}

async fn run(runner: &mut CommandRunner, command: Command) -> anyhow::Result<String> {
    let mut out = Vec::new();
    runner.run(command, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(AUTH_JSON))
        .mount(server)
        .await;
}

fn login() -> Command {
    Command::Login {
        email: "ana@example.com".to_string(),
        password: Some("secret1".to_string()),
    }
}

#[tokio::test]
async fn test_login_persists_across_runs_and_logout_clears() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let storage = Storage::in_memory();
    let config = config(&server);

    let mut runner = CommandRunner::open(&config, storage.clone()).await.unwrap();
    let guest = run(&mut runner, Command::Whoami).await.unwrap();
    assert!(guest.starts_with("guest (session session-"));

    let out = run(&mut runner, login()).await.unwrap();
    assert_eq!(out, "Signed in as Ana <ana@example.com>\n");

    // A fresh runner restores the sign-in from storage
    let mut runner = CommandRunner::open(&config, storage.clone()).await.unwrap();
    let out = run(&mut runner, Command::Whoami).await.unwrap();
    assert_eq!(out, "Ana <ana@example.com> (id u1)\n");

    run(&mut runner, Command::Logout).await.unwrap();
    let mut runner = CommandRunner::open(&config, storage.clone()).await.unwrap();
    let out = run(&mut runner, Command::Whoami).await.unwrap();
    assert_eq!(out, guest);
}

#[tokio::test]
async fn test_bad_credentials_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut runner = CommandRunner::open(&config(&server), Storage::in_memory())
        .await
        .unwrap();
    let err = run(&mut runner, login()).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password");
}

#[tokio::test]
async fn test_friends_require_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut runner = CommandRunner::open(&config(&server), Storage::in_memory())
        .await
        .unwrap();
    let err = run(&mut runner, Command::Friends(FriendsCommand::List))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Not signed in"));
}

#[tokio::test]
async fn test_friends_list_and_send_request() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/friends"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FRIENDS_JSON))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/friends/requests"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/friends/requests"))
        .and(body_json(serde_json::json!({"toUserId": "u3", "message": "hi"})))
        .respond_with(ResponseTemplate::new(201).set_body_string(
            r#"{"id":"r1","fromUser":{"id":"u1","username":"ana"},"toUser":{"id":"u3","username":"cy"},"message":"hi","status":"PENDING","createdAt":"2025-01-01T00:00:00Z"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut runner = CommandRunner::open(&config(&server), Storage::in_memory())
        .await
        .unwrap();
    run(&mut runner, login()).await.unwrap();

    let out = run(&mut runner, Command::Friends(FriendsCommand::List))
        .await
        .unwrap();
    assert_eq!(out, "● Bo (@bo) id u2\n");

    let out = run(&mut runner, Command::Friends(FriendsCommand::Requests))
        .await
        .unwrap();
    assert_eq!(out, "No pending requests\n");

    let out = run(
        &mut runner,
        Command::Friends(FriendsCommand::Add {
            user_id: "u3".to_string(),
            message: Some("hi".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(out, "Friend request sent to @cy\n");
}

#[tokio::test]
async fn test_other_profile_shows_friendship() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/profiles/u2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id":"u2","username":"bo","displayName":"Bo","movieCount":3,"joinedDate":"2025-01-01T00:00:00Z"}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/friends"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FRIENDS_JSON))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/friends/requests"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let mut runner = CommandRunner::open(&config(&server), Storage::in_memory())
        .await
        .unwrap();
    run(&mut runner, login()).await.unwrap();

    let out = run(
        &mut runner,
        Command::Profile(ProfileCommand::Show {
            user_id: Some("u2".to_string()),
        }),
    )
    .await
    .unwrap();
    assert!(out.starts_with("Bo (@bo)\n"));
    assert!(out.ends_with("Friendship: friends\n"));
}

#[tokio::test]
async fn test_profile_update_rejects_long_bio_locally() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("PUT"))
        .and(path("/profiles/me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut runner = CommandRunner::open(&config(&server), Storage::in_memory())
        .await
        .unwrap();
    run(&mut runner, login()).await.unwrap();

    let err = run(
        &mut runner,
        Command::Profile(ProfileCommand::Update {
            display_name: None,
            bio: Some("x".repeat(1000)),
            public: None,
            genres: None,
        }),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().to_lowercase().contains("bio"));
}

#[tokio::test]
async fn test_dashboard_joins_fallback_and_remote_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/550"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id":550,"title":"Fight Club","vote_average":8.4,"runtime":139,"genres":[{"id":18,"name":"Drama"}]}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/550/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"cast":[{"name":"Brad Pitt","order":0}],"crew":[{"name":"David Fincher","job":"Director"}]}"#,
        ))
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    let session = UserSession::load_or_create(&storage).await.unwrap();
    let mut preferences = Preferences::load(storage.clone(), session.identifier())
        .await
        .unwrap();

    let offline = fallback_movies().remove(0);
    let fight_club = Movie {
        id: MovieId::new(550),
        title: "Fight Club".to_string(),
        ..offline.clone()
    };
    let missing = Movie {
        id: MovieId::new(999_999),
        title: "Lost Film".to_string(),
        ..offline.clone()
    };
    preferences.add(&offline, Rating::SeenLiked).await.unwrap();
    preferences.add(&fight_club, Rating::NotSeenLiked).await.unwrap();
    preferences.add(&missing, Rating::SeenDisliked).await.unwrap();

    let mut runner = CommandRunner::open(&config(&server), storage).await.unwrap();

    let out = run(&mut runner, Command::Dashboard(DashboardArgs::default()))
        .await
        .unwrap();
    assert!(out.contains(&offline.title));
    assert!(out.contains("Fight Club"));
    assert!(out.contains("Lost Film"));

    let out = run(
        &mut runner,
        Command::Dashboard(DashboardArgs {
            search: Some("fincher".to_string()),
            ..DashboardArgs::default()
        }),
    )
    .await
    .unwrap();
    assert!(out.contains("Fight Club"));
    assert!(!out.contains("Lost Film"));
    assert!(out.contains("1 of 3 shown"));
}

#[tokio::test]
async fn test_dashboard_empty() {
    let server = MockServer::start().await;
    let mut runner = CommandRunner::open(&config(&server), Storage::in_memory())
        .await
        .unwrap();
    let out = run(&mut runner, Command::Dashboard(DashboardArgs::default()))
        .await
        .unwrap();
    assert_eq!(out, "Nothing rated yet\n");
}
