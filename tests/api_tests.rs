// tests/api_tests.rs
//
// End-to-end flows against a real Postgres. Skipped when DATABASE_URL is unset.

use reqwest::{Client, Response, StatusCode, header};
use serde_json::{Value, json};
use sqlx::{PgPool, postgres::PgPoolOptions};
use topichub::{config::Config, routes, state::AppState};

/// Spawns the app on a random port. Returns the base URL
/// (e.g. "http://127.0.0.1:12345"), or `None` without a database.
async fn spawn_app() -> Option<String> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        avatar_api_url: None,
        hot_window_hours: 72,
        cors_origins: Vec::new(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        rust_log: "error".to_string(),
    };

    let app = routes::create_router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Some(address)
}

/// A second pool for checking rows the API does not expose.
async fn db() -> PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.")
}

fn unique_email(prefix: &str) -> String {
    format!("{prefix}_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

/// The session cookie is `Secure`, so it is carried by hand over plain http.
struct Session {
    client: Client,
    address: String,
    cookie: String,
}

impl Session {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .header(header::COOKIE, &self.cookie)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn post(&self, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .header(header::COOKIE, &self.cookie)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn patch(&self, path: &str, body: Value) -> Response {
        self.client
            .patch(self.url(path))
            .header(header::COOKIE, &self.cookie)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn id(&self) -> String {
        let body: Value = self.get("/api/auth/current").await.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Every item of a paginated list, walking pages of 100.
    async fn collect(&self, path: &str) -> Vec<Value> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let body: Value = self
                .get(&format!("{path}{separator}limit=100&page={page}"))
                .await
                .json()
                .await
                .unwrap();
            items.extend(body["data"].as_array().unwrap().iter().cloned());
            if page >= body["pagination"]["totalPages"].as_i64().unwrap() {
                return items;
            }
            page += 1;
        }
    }

    async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .header(header::COOKIE, &self.cookie)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

async fn signup(client: &Client, address: &str, email: &str, password: &str) -> Response {
    client
        .post(format!("{address}/api/auth/signup"))
        .json(&json!({
            "firstName": "Test",
            "lastName": "User",
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to execute request")
}

async fn signin(client: &Client, address: &str, email: &str, password: &str) -> Response {
    client
        .post(format!("{address}/api/auth/signin"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to execute request")
}

async fn new_session(client: &Client, address: &str, prefix: &str) -> Session {
    let email = unique_email(prefix);
    let response = signup(client, address, &email, "password123").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = signin(client, address, &email, "password123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .expect("session cookie")
        .to_string();

    Session {
        client: client.clone(),
        address: address.to_string(),
        cookie,
    }
}

async fn create_topic(session: &Session, title: &str) -> String {
    let response = session
        .post("/api/topics", json!({ "title": title, "description": "about it" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn signup_signin_current_signout() {
    let Some(address) = spawn_app().await else { return };
    let client = Client::new();
    let email = unique_email("flow");

    let response = signup(&client, &address, &email.to_uppercase(), "password123").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "You have successfully signed up");

    // Emails are stored lowercased.
    let response = signup(&client, &address, &email, "password123").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "This account already exists");

    let response = signin(&client, &address, &email, "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid credentials");

    let response = signin(&client, &address, &unique_email("ghost"), "password123").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid credentials");

    let response = signin(&client, &address, &email, "password123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("topichub_session="));
    assert!(set_cookie.contains("HttpOnly"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["email"], email);
    assert!(body["data"].get("password").is_none());

    let session = Session {
        client: client.clone(),
        address: address.clone(),
        cookie: set_cookie.split(';').next().unwrap().to_string(),
    };

    let response = session.get("/api/auth/current").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["firstName"], "Test");

    let response = session.post("/api/auth/signout", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("topichub_session="));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn only_owners_change_topics_and_comments() {
    let Some(address) = spawn_app().await else { return };
    let client = Client::new();
    let owner = new_session(&client, &address, "owner").await;
    let other = new_session(&client, &address, "other").await;

    let topic_id = create_topic(&owner, "Owned topic").await;
    let topic_path = format!("/api/topics/{topic_id}");

    let response = other.patch(&topic_path, json!({ "title": "Hijacked" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "You are not allowed to update this topic");

    let response = other.delete(&topic_path).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = owner.patch(&topic_path, json!({ "title": "  Renamed  " })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = other.get(&topic_path).await.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Renamed");

    let response = other
        .post(&format!("{topic_path}/comments"), json!({ "content": "First!" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let comment_path = format!(
        "{topic_path}/comments/{}",
        body["data"]["id"].as_str().unwrap()
    );

    let response = owner.delete(&comment_path).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "You are not allowed to delete this comment");

    let response = other.patch(&comment_path, json!({ "content": "Edited" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = owner
        .get(&format!("{topic_path}/comments"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"][0]["content"], "Edited");
    assert_eq!(body["data"][0]["topicId"], topic_id.as_str());
    assert_eq!(body["pagination"], json!({ "page": 1, "totalPages": 1 }));

    // A comment addressed through the wrong topic is not found.
    let elsewhere = create_topic(&owner, "Elsewhere").await;
    let comment_id = comment_path.rsplit('/').next().unwrap();
    let response = other
        .delete(&format!("/api/topics/{elsewhere}/comments/{comment_id}"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = other.delete(&comment_path).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = owner.delete(&topic_path).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = owner.get(&topic_path).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn likes_toggle_per_user() {
    let Some(address) = spawn_app().await else { return };
    let client = Client::new();
    let alice = new_session(&client, &address, "alice").await;
    let bob = new_session(&client, &address, "bob").await;

    let topic_id = create_topic(&alice, "Likeable").await;
    let like_path = format!("/api/topics/{topic_id}/like");

    let body: Value = alice.post(&like_path, json!({})).await.json().await.unwrap();
    assert_eq!(body["data"], json!({ "liked": true, "likesCount": 1 }));

    let body: Value = bob.post(&like_path, json!({})).await.json().await.unwrap();
    assert_eq!(body["data"], json!({ "liked": true, "likesCount": 2 }));

    let body: Value = alice.post(&like_path, json!({})).await.json().await.unwrap();
    assert_eq!(body["data"], json!({ "liked": false, "likesCount": 1 }));

    let body: Value = alice
        .get(&format!("/api/topics/{topic_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["likesCount"], 1);
    assert_eq!(body["data"]["like"], false);

    // Comment likes are counted apart from the topic's.
    let body: Value = bob
        .post(
            &format!("/api/topics/{topic_id}/comments"),
            json!({ "content": "Nice" }),
        )
        .await
        .json()
        .await
        .unwrap();
    let comment_id = body["data"]["id"].as_str().unwrap();
    let body: Value = alice
        .post(
            &format!("/api/topics/{topic_id}/comments/{comment_id}/like"),
            json!({}),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"], json!({ "liked": true, "likesCount": 1 }));

    let body: Value = bob
        .get(&format!("/api/topics/{topic_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["likesCount"], 1);
    assert_eq!(body["data"]["commentsCount"], 1);
    assert_eq!(body["data"]["like"], true);

    // The public feed answers without a session and never flags likes.
    for sort in ["latest", "hot"] {
        let response = Client::new()
            .get(format!("{address}/api/topics?sortBy={sort}"))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        let items = body["data"].as_array().unwrap();
        assert!(items.iter().all(|item| item["like"] == false));
        assert!(body["pagination"]["totalPages"].as_i64().unwrap() >= 1);
    }
}

#[tokio::test]
async fn own_topics_paginate() {
    let Some(address) = spawn_app().await else { return };
    let client = Client::new();
    let session = new_session(&client, &address, "pager").await;

    let body: Value = session.get("/api/topics/me").await.json().await.unwrap();
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"], json!({ "page": 1, "totalPages": 0 }));

    for n in 1..=7 {
        create_topic(&session, &format!("Topic {n}")).await;
    }

    let body: Value = session.get("/api/topics/me").await.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"][0]["title"], "Topic 7");
    assert_eq!(body["pagination"], json!({ "page": 1, "totalPages": 2 }));

    let body: Value = session
        .get("/api/topics/me?page=2&limit=5")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][1]["title"], "Topic 1");

    let body: Value = session
        .get("/api/topics/me?page=9")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["totalPages"], 2);
}

#[tokio::test]
async fn profile_update_rules() {
    let Some(address) = spawn_app().await else { return };
    let client = Client::new();
    let session = new_session(&client, &address, "profile").await;

    let response = session
        .patch("/api/profile", json!({ "newPassword": "newpassword123" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = session
        .patch(
            "/api/profile",
            json!({ "oldPassword": "wrong-password", "newPassword": "newpassword123" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid password");

    let response = session
        .post(
            "/api/profile/update",
            json!({
                "firstName": "  Ada ",
                "lastName": "",
                "image": "https://img.example.com/ada.png",
                "oldPassword": "password123",
                "newPassword": "newpassword123",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["firstName"], "Ada");
    assert_eq!(body["data"]["lastName"], Value::Null);
    assert_eq!(body["data"]["image"], "https://img.example.com/ada.png");
    let email = body["data"]["email"].as_str().unwrap().to_string();

    let response = signin(&client, &address, &email, "password123").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = signin(&client, &address, &email, "newpassword123").await;
    assert_eq!(response.status(), StatusCode::OK);

    // Leaving the image out keeps it; an empty string clears it.
    let body: Value = session
        .patch("/api/profile", json!({ "firstName": "Ada" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["image"], "https://img.example.com/ada.png");
    let body: Value = session
        .patch("/api/profile", json!({ "firstName": "Ada", "image": "" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["image"], Value::Null);
}

#[tokio::test]
async fn deleting_account_cascades() {
    let Some(address) = spawn_app().await else { return };
    let client = Client::new();
    let leaving = new_session(&client, &address, "leaving").await;
    let staying = new_session(&client, &address, "staying").await;

    let topic_id = create_topic(&leaving, "Soon gone").await;
    let topic_path = format!("/api/topics/{topic_id}");
    let response = staying
        .post(&format!("{topic_path}/comments"), json!({ "content": "Bye" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = staying.get("/api/users?limit=100").await.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().iter().all(|u| u.get("password").is_none()));

    let response = leaving.delete("/api/profile").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "You have successfully deleted your account");

    let response = staying.get(&topic_path).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The token is still well-formed but its account is gone.
    let response = leaving.get("/api/auth/current").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signup_without_names_stores_nulls() {
    let Some(address) = spawn_app().await else { return };
    let client = Client::new();
    let email = unique_email("nameless");

    let response = client
        .post(format!("{address}/api/auth/signup"))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = signin(&client, &address, &email, "password123").await;
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let session = Session {
        client: client.clone(),
        address: address.clone(),
        cookie,
    };

    let body: Value = session.get("/api/auth/current").await.json().await.unwrap();
    assert_eq!(body["data"]["firstName"], Value::Null);
    assert_eq!(body["data"]["lastName"], Value::Null);
    assert_eq!(body["data"]["email"], email);
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn text_is_stored_as_typed() {
    let Some(address) = spawn_app().await else { return };
    let client = Client::new();
    let session = new_session(&client, &address, "verbatim").await;

    let response = session
        .post(
            "/api/topics",
            json!({ "title": "  Q&A  ", "description": "1 < 2 && <b>bold</b>" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let topic_path = format!("/api/topics/{}", body["data"]["id"].as_str().unwrap());

    let body: Value = session.get(&topic_path).await.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Q&A");
    assert_eq!(body["data"]["description"], "1 < 2 && <b>bold</b>");

    // The limit counts the characters that are stored.
    let ampersands = "&".repeat(100);
    let response = session.patch(&topic_path, json!({ "title": ampersands })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = session.get(&topic_path).await.json().await.unwrap();
    assert_eq!(body["data"]["title"], ampersands.as_str());

    let response = session
        .patch(&topic_path, json!({ "title": "&".repeat(101) }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = session
        .post(
            &format!("{topic_path}/comments"),
            json!({ "content": "  Fish & chips  " }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comments = session.collect(&format!("{topic_path}/comments")).await;
    assert_eq!(comments[0]["content"], "Fish & chips");

    let body: Value = session
        .patch("/api/profile", json!({ "firstName": " Tom & Jerry ", "lastName": "O'Brien" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["firstName"], "Tom & Jerry");
    assert_eq!(body["data"]["lastName"], "O'Brien");
}

#[tokio::test]
async fn hot_feed_puts_engaged_topics_first() {
    let Some(address) = spawn_app().await else { return };
    let client = Client::new();
    let alice = new_session(&client, &address, "hot_a").await;
    let bob = new_session(&client, &address, "hot_b").await;

    let engaged = create_topic(&alice, "Busy topic").await;
    let idle = create_topic(&alice, "Quiet topic").await;

    alice
        .post(&format!("/api/topics/{engaged}/like"), json!({}))
        .await;
    bob.post(&format!("/api/topics/{engaged}/like"), json!({}))
        .await;
    let response = bob
        .post(
            &format!("/api/topics/{engaged}/comments"),
            json!({ "content": "Lively" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let position = |items: &[Value], id: &str| {
        items
            .iter()
            .position(|item| item["id"] == id)
            .expect("topic in feed")
    };

    let latest = alice.collect("/api/topics?sortBy=latest").await;
    assert!(position(&latest, &idle) < position(&latest, &engaged));

    let hot = alice.collect("/api/topics?sortBy=hot").await;
    assert!(position(&hot, &engaged) < position(&hot, &idle));
}

#[tokio::test]
async fn leaderboard_orders_by_comment_count() {
    let Some(address) = spawn_app().await else { return };
    let client = Client::new();
    let talker = new_session(&client, &address, "talker").await;
    let lurker = new_session(&client, &address, "lurker").await;

    let topic_id = create_topic(&lurker, "Talk here").await;
    for n in 0..3 {
        let response = talker
            .post(
                &format!("/api/topics/{topic_id}/comments"),
                json!({ "content": format!("Comment {n}") }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let entries = lurker.collect("/api/users").await;
    let counts: Vec<i64> = entries
        .iter()
        .map(|entry| entry["commentsCount"].as_i64().unwrap())
        .collect();
    assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]));

    let talker_id = talker.id().await;
    let lurker_id = lurker.id().await;
    let talker_at = entries.iter().position(|e| e["id"] == talker_id.as_str()).unwrap();
    let lurker_at = entries.iter().position(|e| e["id"] == lurker_id.as_str()).unwrap();
    assert_eq!(entries[talker_at]["commentsCount"], 3);
    assert_eq!(entries[lurker_at]["commentsCount"], 0);
    assert!(talker_at < lurker_at);
    assert!(entries.iter().all(|e| e.get("password").is_none()));
}

#[tokio::test]
async fn deleting_topic_removes_comments_and_likes() {
    let Some(address) = spawn_app().await else { return };
    let client = Client::new();
    let owner = new_session(&client, &address, "topic_owner").await;
    let fan = new_session(&client, &address, "topic_fan").await;
    let pool = db().await;

    let topic_id = create_topic(&owner, "Short-lived").await;
    let topic_path = format!("/api/topics/{topic_id}");
    fan.post(&format!("{topic_path}/like"), json!({})).await;
    let body: Value = fan
        .post(&format!("{topic_path}/comments"), json!({ "content": "Hi" }))
        .await
        .json()
        .await
        .unwrap();
    let comment_id = body["data"]["id"].as_str().unwrap();
    owner
        .post(&format!("{topic_path}/comments/{comment_id}/like"), json!({}))
        .await;

    let topic_uuid: uuid::Uuid = topic_id.parse().unwrap();
    let rows = |table: &'static str| {
        let pool = pool.clone();
        async move {
            sqlx::query_scalar::<_, i64>(&format!(
                "SELECT COUNT(*) FROM {table} WHERE topic_id = $1"
            ))
            .bind(topic_uuid)
            .fetch_one(&pool)
            .await
            .unwrap()
        }
    };
    assert_eq!(rows("comments").await, 1);
    assert_eq!(rows("likes").await, 2);

    let response = owner.delete(&topic_path).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(rows("comments").await, 0);
    assert_eq!(rows("likes").await, 0);
    let response = fan.get(&format!("{topic_path}/comments")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
