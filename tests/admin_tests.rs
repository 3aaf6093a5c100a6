// tests/admin_tests.rs

use inkline::{config::Config, routes, state::AppState};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

struct TestApp {
    address: String,
    pool: SqlitePool,
}

async fn spawn_app() -> TestApp {
    let db_path = std::env::temp_dir().join(format!("inkline_test_{}.db", uuid::Uuid::new_v4()));
    let database_url = format!("sqlite://{}", db_path.display());

    let connect_options = SqliteConnectOptions::from_str(&database_url)
        .expect("Invalid test database URL")
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .expect("Failed to open test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let upload_dir = std::env::temp_dir().join(format!("inkline_uploads_{}", uuid::Uuid::new_v4()));
    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        upload_dir: upload_dir.to_string_lossy().into_owned(),
        admin_username: None,
        admin_password: None,
        admin_email: None,
    };

    let state = AppState::new(pool.clone(), config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp { address, pool }
}

async fn register_user(client: &reqwest::Client, address: &str, username: &str) -> i64 {
    let form = reqwest::multipart::Form::new()
        .text("username", username.to_string())
        .text("name", "Testname".to_string())
        .text("surname", "Testsurname".to_string())
        .text("email", format!("{}@example.com", username))
        .text("age", "30")
        .text("password", "password123");

    let response = client
        .post(format!("{}/api/auth/register", address))
        .multipart(form)
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    body["user"]["id"].as_i64().expect("Register returned no id")
}

/// Registers a user, promotes them to admin directly in the database, then
/// logs in again so the session token carries the admin role.
async fn register_admin(app: &TestApp, client: &reqwest::Client, username: &str) -> i64 {
    let id = register_user(client, &app.address, username).await;

    sqlx::query("UPDATE users SET role = 'admin' WHERE id = ?")
        .bind(id)
        .execute(&app.pool)
        .await
        .expect("Failed to promote user");

    let response = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&serde_json::json!({ "username": username, "password": "password123" }))
        .send()
        .await
        .expect("Login failed");
    assert_eq!(response.status().as_u16(), 200);

    id
}

async fn create_post(client: &reqwest::Client, address: &str, author_id: i64, title: &str) -> i64 {
    let response = client
        .post(format!("{}/api/post", address))
        .json(&serde_json::json!({
            "title": title,
            "content": "<p>body</p>",
            "authorId": author_id
        }))
        .send()
        .await
        .expect("Create post failed");
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    body["post"]["id"].as_i64().expect("Create post returned no id")
}

async fn add_comment(
    client: &reqwest::Client,
    address: &str,
    post_id: i64,
    user_id: i64,
    content: &str,
) -> i64 {
    let body = client
        .post(format!("{}/api/comment/{}", address, post_id))
        .json(&serde_json::json!({ "content": content, "userId": user_id }))
        .send()
        .await
        .expect("Comment failed")
        .json::<serde_json::Value>()
        .await
        .unwrap();
    body["comment"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn admin_surface_is_gated() {
    // Arrange
    let app = spawn_app().await;
    let anonymous = reqwest::Client::new();
    let user_client = reqwest::Client::builder().cookie_store(true).build().unwrap();
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    register_user(&user_client, &app.address, &username).await;

    // Act / Assert: no token at all
    let response = anonymous
        .get(format!("{}/api/admin/stats", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);

    // Act / Assert: a regular user's token is not enough
    for path in ["/api/admin/stats", "/api/admin/comment", "/api/user"] {
        let response = user_client
            .get(format!("{}{}", app.address, path))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 403, "expected 403 for {}", path);
    }
}

#[tokio::test]
async fn platform_stats_flatten_comment_counts() {
    // Arrange: one post, one comment, two replies
    let app = spawn_app().await;
    let admin_client = reqwest::Client::builder().cookie_store(true).build().unwrap();
    let admin_name = format!("adm_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let admin_id = register_admin(&app, &admin_client, &admin_name).await;

    let post_id = create_post(&admin_client, &app.address, admin_id, "Counted").await;
    let comment_id = add_comment(&admin_client, &app.address, post_id, admin_id, "one").await;
    for content in ["r1", "r2"] {
        admin_client
            .post(format!("{}/api/reply/{}", app.address, comment_id))
            .json(&serde_json::json!({ "content": content, "userId": admin_id }))
            .send()
            .await
            .expect("Reply failed");
    }

    // Act
    let stats = admin_client
        .get(format!("{}/api/admin/stats", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json::<serde_json::Value>()
        .await
        .unwrap();

    // Assert: comments are comment rows plus reply rows
    assert_eq!(stats["posts"], 1);
    assert_eq!(stats["users"], 1);
    assert_eq!(stats["comments"], 3);
}

#[tokio::test]
async fn comment_moderation_ranks_and_deletes() {
    // Arrange: two comments, one with two replies
    let app = spawn_app().await;
    let admin_client = reqwest::Client::builder().cookie_store(true).build().unwrap();
    let admin_name = format!("adm_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let admin_id = register_admin(&app, &admin_client, &admin_name).await;

    let post_id = create_post(&admin_client, &app.address, admin_id, "Moderated").await;
    let quiet_comment = add_comment(&admin_client, &app.address, post_id, admin_id, "quiet").await;
    let busy_comment = add_comment(&admin_client, &app.address, post_id, admin_id, "busy").await;
    for content in ["r1", "r2"] {
        admin_client
            .post(format!("{}/api/reply/{}", app.address, busy_comment))
            .json(&serde_json::json!({ "content": content, "userId": admin_id }))
            .send()
            .await
            .expect("Reply failed");
    }

    // Act
    let listing = admin_client
        .get(format!("{}/api/admin/comment", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json::<serde_json::Value>()
        .await
        .unwrap();

    // Assert: ranked by reply count, post title attached
    let comments = listing["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["id"].as_i64(), Some(busy_comment));
    assert_eq!(comments[0]["totalScore"], 2);
    assert_eq!(comments[0]["post"]["title"], "Moderated");
    assert_eq!(comments[1]["id"].as_i64(), Some(quiet_comment));
    assert_eq!(comments[1]["totalScore"], 0);

    // Act: delete the busy comment
    let response = admin_client
        .delete(format!("{}/api/admin/comment/{}", app.address, busy_comment))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 204);

    // Assert: its replies went with it
    let replies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM replies WHERE comment_id = ?")
        .bind(busy_comment)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(replies, 0);

    // Deleting a comment that is already gone is a 404
    let response = admin_client
        .delete(format!("{}/api/admin/comment/{}", app.address, busy_comment))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn user_listing_ranks_by_activity() {
    // Arrange: an active user and a silent one
    let app = spawn_app().await;
    let admin_client = reqwest::Client::builder().cookie_store(true).build().unwrap();
    let plain_client = reqwest::Client::new();
    let admin_name = format!("adm_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let active_name = format!("act_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let silent_name = format!("sil_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    let admin_id = register_admin(&app, &admin_client, &admin_name).await;
    let active_id = register_user(&plain_client, &app.address, &active_name).await;
    register_user(&plain_client, &app.address, &silent_name).await;

    let post_id = create_post(&admin_client, &app.address, admin_id, "Stage").await;
    // The active user likes, saves and comments -> score 3
    plain_client
        .post(format!("{}/api/like/{}", app.address, post_id))
        .json(&serde_json::json!({ "userId": active_id }))
        .send()
        .await
        .expect("Like failed");
    plain_client
        .post(format!("{}/api/save_post/{}", app.address, post_id))
        .json(&serde_json::json!({ "userId": active_id }))
        .send()
        .await
        .expect("Save failed");
    add_comment(&plain_client, &app.address, post_id, active_id, "present").await;

    // Act
    let listing = admin_client
        .get(format!("{}/api/user", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json::<serde_json::Value>()
        .await
        .unwrap();

    // Assert: the active user leads, scores add up, hashes stay hidden
    let users = listing["users"].as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["username"], active_name.as_str());
    assert_eq!(users[0]["totalScore"], 3);
    for user in users {
        assert!(user.get("password").is_none());
    }
}

#[tokio::test]
async fn admin_deletes_user_with_cascade() {
    // Arrange: a user with a post that someone else engaged with
    let app = spawn_app().await;
    let admin_client = reqwest::Client::builder().cookie_store(true).build().unwrap();
    let plain_client = reqwest::Client::new();
    let admin_name = format!("adm_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let victim_name = format!("vic_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    let admin_id = register_admin(&app, &admin_client, &admin_name).await;
    let victim_id = register_user(&plain_client, &app.address, &victim_name).await;

    let post_id = create_post(&plain_client, &app.address, victim_id, "Orphan-to-be").await;
    admin_client
        .post(format!("{}/api/like/{}", app.address, post_id))
        .json(&serde_json::json!({ "userId": admin_id }))
        .send()
        .await
        .expect("Like failed");
    add_comment(&admin_client, &app.address, post_id, admin_id, "from admin").await;

    // Act / Assert: self-deletion is refused
    let response = admin_client
        .delete(format!("{}/api/user/{}", app.address, admin_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    // Act: delete the other user
    let response = admin_client
        .delete(format!("{}/api/user/{}", app.address, victim_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 204);

    // Assert: the user, their posts and everything on them are gone
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(victim_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(users, 0);

    let response = plain_client
        .get(format!("{}/api/post/{}", app.address, post_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);

    for table in ["comments", "likes"] {
        let rows: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE post_id = ?", table))
                .bind(post_id)
                .fetch_one(&app.pool)
                .await
                .unwrap();
        assert_eq!(rows, 0, "orphan rows left in {}", table);
    }

    // A regular user cannot delete anyone
    let bystander_client = reqwest::Client::builder().cookie_store(true).build().unwrap();
    let bystander_name = format!("bys_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    register_user(&bystander_client, &app.address, &bystander_name).await;

    let response = bystander_client
        .delete(format!("{}/api/user/{}", app.address, admin_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn tags_roundtrip_through_admin_and_posts() {
    // Arrange
    let app = spawn_app().await;
    let admin_client = reqwest::Client::builder().cookie_store(true).build().unwrap();
    let admin_name = format!("adm_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let admin_id = register_admin(&app, &admin_client, &admin_name).await;

    // Act: create a tag
    let response = admin_client
        .post(format!("{}/api/admin/tags", app.address))
        .json(&serde_json::json!({ "label": "rustlang" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    let tag_id = body["tag"]["id"].as_i64().unwrap();

    // A duplicate label conflicts
    let response = admin_client
        .post(format!("{}/api/admin/tags", app.address))
        .json(&serde_json::json!({ "label": "rustlang" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 409);

    // The public listing shows it
    let tags = admin_client
        .get(format!("{}/api/tag", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(tags["tags"][0]["label"], "rustlang");

    // Act: attach it to a post
    let response = admin_client
        .post(format!("{}/api/post", app.address))
        .json(&serde_json::json!({
            "title": "Tagged",
            "content": "<p>body</p>",
            "authorId": admin_id,
            "tags": [tag_id]
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let created: serde_json::Value = response.json().await.unwrap();
    assert_eq!(created["post"]["tags"][0]["label"], "rustlang");

    // Assert: the tag page lists the post
    let tagged = admin_client
        .get(format!("{}/api/tag/{}", app.address, tag_id))
        .send()
        .await
        .expect("Failed to execute request")
        .json::<serde_json::Value>()
        .await
        .unwrap();
    let posts = tagged["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Tagged");

    // An unknown tag id in a post body is rejected
    let response = admin_client
        .post(format!("{}/api/post", app.address))
        .json(&serde_json::json!({
            "title": "Bad tag",
            "authorId": admin_id,
            "tags": [99999]
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
}
