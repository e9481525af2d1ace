//! End-to-end tests for the account and session routes
//!
//! These drive the full router (middleware included) through
//! `axum_test::TestServer`, with cookies saved between requests so each
//! server behaves like one browser.

use axum::http::StatusCode;
use axum_test::TestServer;
use parlor::{
    auth::Argon2Hasher,
    core::{Broadcaster, GameRegistry, SessionRegistry, UserDirectory, UserStore},
    routes::build_router,
    state::AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;

struct TestApp {
    state: AppState,
    users: Arc<UserDirectory>,
    games: Arc<GameRegistry>,
}

impl TestApp {
    fn new() -> Self {
        let users = Arc::new(UserDirectory::new());
        let games = Arc::new(GameRegistry::new());
        let state = AppState {
            users: users.clone(),
            passwords: Arc::new(Argon2Hasher::with_cost(1024, 1).unwrap()),
            games: games.clone(),
            sessions: Arc::new(SessionRegistry::new()),
            broadcaster: Arc::new(Broadcaster::new()),
            secret_key: "test_secret_key_for_integration_tests".to_string(),
            secure_cookies: false,
        };
        Self {
            state,
            users,
            games,
        }
    }

    /// A client with its own cookie jar
    fn client(&self) -> TestServer {
        let app = build_router(
            self.state.clone(),
            &["http://localhost:8000".to_string()],
        );
        let mut server = TestServer::new(app).unwrap();
        server.do_save_cookies();
        server
    }

    /// Seat an existing user in a game
    async fn seat(&self, username: &str, game_id: u64) {
        let user = self
            .users
            .find_by_username(username)
            .await
            .unwrap()
            .unwrap();
        let p_num = self.games.seat_player(game_id, &user).await.unwrap();
        self.users.assign_game(user.id, game_id, p_num).await.unwrap();
    }
}

async fn signup(server: &TestServer, username: &str, password: &str) -> axum_test::TestResponse {
    server
        .post("/user/signup")
        .json(&json!({"username": username, "password": password}))
        .await
}

async fn login(server: &TestServer, username: &str, password: &str) -> axum_test::TestResponse {
    server
        .post("/user/login")
        .json(&json!({"username": username, "password": password}))
        .await
}

async fn status(server: &TestServer) -> Value {
    let response = server.get("/user/status").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()
}

mod signup_tests {
    use super::*;

    #[tokio::test]
    async fn test_signup_returns_id_and_logs_in() {
        let app = TestApp::new();
        let client = app.client();

        let response = signup(&client, "alice", "pw1").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<u64>(), 1);

        assert_eq!(
            status(&client).await,
            json!({"id": 1, "username": "alice", "authenticated": true, "gameId": null})
        );
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_bad_request() {
        let app = TestApp::new();
        let client = app.client();

        signup(&client, "alice", "pw1").await;
        let response = signup(&app.client(), "alice", "pw2").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "duplicate_username");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("already registered"));
        assert_eq!(app.users.len().await, 1);
    }

    #[tokio::test]
    async fn test_signup_stores_hashed_password() {
        let app = TestApp::new();
        signup(&app.client(), "alice", "pw1").await;

        let user = app.users.find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(user.encrypted_password, "pw1");
        assert!(user.encrypted_password.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_signup_requires_username() {
        let app = TestApp::new();

        let response = signup(&app.client(), "", "pw1").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "invalid_request");
    }
}

mod login_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_flow() {
        let app = TestApp::new();
        signup(&app.client(), "alice", "pw1").await;

        let client = app.client();

        let wrong = login(&client, "alice", "wrong").await;
        assert_eq!(wrong.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(wrong.json::<Value>()["error"], "invalid_password");
        assert_eq!(status(&client).await, json!({"authenticated": false}));

        let missing = login(&client, "bob", "pw1").await;
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.json::<Value>()["error"], "user_not_found");
        assert_eq!(status(&client).await, json!({"authenticated": false}));

        let ok = login(&client, "alice", "pw1").await;
        assert_eq!(ok.status_code(), StatusCode::OK);
        assert_eq!(ok.json::<u64>(), 1);
        assert_eq!(status(&client).await["authenticated"], true);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let app = TestApp::new();

        let response = app
            .client()
            .post("/user/login")
            .json(&json!({"username": "alice"}))
            .await;
        assert!(response.status_code().is_client_error());
    }
}

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_status_anonymous_is_single_field() {
        let app = TestApp::new();
        assert_eq!(status(&app.client()).await, json!({"authenticated": false}));
    }

    #[tokio::test]
    async fn test_logout_clears_authentication() {
        let app = TestApp::new();
        let client = app.client();
        signup(&client, "alice", "pw1").await;

        let response = client.post("/user/logout").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(status(&client).await, json!({"authenticated": false}));
    }

    #[tokio::test]
    async fn test_logout_without_session_succeeds() {
        let app = TestApp::new();

        let response = app.client().post("/user/logout").await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_for_deleted_user_logs_out() {
        let app = TestApp::new();
        let client = app.client();
        let id = signup(&client, "alice", "pw1").await.json::<u64>();

        app.users.remove(id).await;

        let response = client.get("/user/status").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(status(&client).await, json!({"authenticated": false}));
    }

    #[tokio::test]
    async fn test_login_moves_session_to_new_cookie() {
        let app = TestApp::new();
        signup(&app.client(), "alice", "pw1").await;
        let first = signup(&app.client(), "bob", "pw2").await.cookie("sid");

        let response = app
            .client()
            .post("/user/login")
            .add_cookie(first.clone())
            .json(&json!({"username": "alice", "password": "pw1"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_ne!(response.cookie("sid").value(), first.value());

        let stale = app.client().get("/user/status").add_cookie(first).await;
        assert_eq!(stale.json::<Value>(), json!({"authenticated": false}));
    }

    #[tokio::test]
    async fn test_planted_cookie_does_not_follow_victim_login() {
        let app = TestApp::new();
        signup(&app.client(), "victim", "pw2").await;

        let attacker = app.client();
        signup(&attacker, "mallory", "pw1").await;
        assert_eq!(status(&attacker).await["username"], "mallory");
        let planted = login(&attacker, "mallory", "pw1").await.cookie("sid");

        let victim = app.client();
        let response = victim
            .post("/user/login")
            .add_cookie(planted)
            .json(&json!({"username": "victim", "password": "pw2"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(status(&victim).await["username"], "victim");

        let seen_by_attacker = status(&attacker).await;
        assert_ne!(seen_by_attacker["username"], "victim");
        assert_eq!(seen_by_attacker, json!({"authenticated": false}));
    }

    #[tokio::test]
    async fn test_sessions_are_per_client() {
        let app = TestApp::new();
        let alice = app.client();
        let stranger = app.client();

        signup(&alice, "alice", "pw1").await;

        assert_eq!(status(&alice).await["username"], "alice");
        assert_eq!(status(&stranger).await, json!({"authenticated": false}));
    }
}

mod relogin_tests {
    use super::*;

    #[tokio::test]
    async fn test_relogin_restores_game_id_once_table_is_full() {
        let app = TestApp::new();
        signup(&app.client(), "alice", "pw1").await;
        signup(&app.client(), "bob", "pw2").await;

        let game_id = app.games.create_game("table").await;
        app.seat("alice", game_id).await;

        let client = app.client();
        let response = client
            .post("/user/reLogin")
            .json(&json!({"username": "alice", "password": "pw1"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.text().is_empty());

        // One player seated: no game id yet
        assert!(status(&client).await["gameId"].is_null());

        app.seat("bob", game_id).await;
        assert_eq!(status(&client).await["gameId"], game_id);
    }

    #[tokio::test]
    async fn test_relogin_wrong_password() {
        let app = TestApp::new();
        signup(&app.client(), "alice", "pw1").await;
        let game_id = app.games.create_game("table").await;
        app.seat("alice", game_id).await;

        let client = app.client();
        let response = client
            .post("/user/reLogin")
            .json(&json!({"username": "alice", "password": "wrong"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(status(&client).await, json!({"authenticated": false}));
    }

    #[tokio::test]
    async fn test_relogin_without_game_fails() {
        let app = TestApp::new();
        signup(&app.client(), "alice", "pw1").await;

        let response = app
            .client()
            .post("/user/reLogin")
            .json(&json!({"username": "alice", "password": "pw1"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "dependency_failure");
    }

    #[tokio::test]
    async fn test_relogin_unknown_user() {
        let app = TestApp::new();

        let response = app
            .client()
            .post("/user/reLogin")
            .json(&json!({"username": "ghost"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "user_not_found");
    }
}

mod email_tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_and_find_email() {
        let app = TestApp::new();
        let client = app.client();
        signup(&client, "alice", "pw1").await;

        let before = client
            .post("/user/findEmail")
            .json(&json!({"username": "alice"}))
            .await;
        assert_eq!(before.status_code(), StatusCode::OK);
        assert_eq!(before.json::<Value>(), Value::Null);

        let submitted = client
            .post("/user/submitEmail")
            .json(&json!({"username": "alice", "email": "alice@example.com"}))
            .await;
        assert_eq!(submitted.status_code(), StatusCode::OK);
        assert_eq!(submitted.json::<u64>(), 1);

        let after = client
            .post("/user/findEmail")
            .json(&json!({"username": "alice"}))
            .await;
        assert_eq!(after.json::<String>(), "alice@example.com");
    }

    #[tokio::test]
    async fn test_email_routes_for_unknown_user() {
        let app = TestApp::new();
        let client = app.client();

        let submitted = client
            .post("/user/submitEmail")
            .json(&json!({"username": "ghost", "email": "ghost@example.com"}))
            .await;
        assert_eq!(submitted.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(submitted.json::<Value>()["error"], "update_failed");

        let found = client
            .post("/user/findEmail")
            .json(&json!({"username": "ghost"}))
            .await;
        assert_eq!(found.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(found.json::<Value>()["error"], "user_not_found");
    }
}

mod routing_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let app = TestApp::new();

        let response = app.client().get("/health").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>(), json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let app = TestApp::new();

        let response = app.client().get("/user/status").await;
        assert_eq!(response.header("x-frame-options"), "DENY");
        assert_eq!(response.header("cache-control"), "no-store");
    }

    #[tokio::test]
    async fn test_websocket_requires_login() {
        let app = TestApp::new();

        let response = app.client().get("/ws").await;
        assert_ne!(response.status_code(), StatusCode::NOT_FOUND);
        assert_ne!(response.status_code(), StatusCode::SWITCHING_PROTOCOLS);
    }
}
