// src/routes.rs

use axum::{
    Router, http::Method,
    middleware,
    routing::{delete, get, patch, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, comments, engagement, posts, profile, social, tags},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, posts, engagement, social, admin).
/// * Applies global middleware (Trace, CORS).
/// * Serves uploaded images under /blog.
/// * Injects global state (pool, config, services).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        // Protected: requires a valid session token
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let post_routes = Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route("/search", get(posts::search_posts))
        .route("/uploads", post(posts::upload_file))
        .route(
            "/views/{id}",
            get(engagement::get_views).post(engagement::increment_views),
        )
        .route("/{id}", get(posts::get_post).delete(posts::delete_post));

    let engagement_routes = Router::new()
        .route("/like/{post_id}", post(engagement::toggle_like))
        .route("/save_post/{post_id}", post(engagement::toggle_save))
        .route("/saved_posts", post(engagement::saved_posts));

    let comment_routes = Router::new().route(
        "/{post_id}",
        get(comments::list_comments).post(comments::create_comment),
    );

    let reply_routes = Router::new().route(
        "/{comment_id}",
        get(comments::list_replies).post(comments::create_reply),
    );

    let social_routes = Router::new()
        .route("/follow", post(social::follow))
        .route("/unfollow", post(social::unfollow))
        .route("/isfollowing", post(social::is_following))
        .route("/following_post", post(social::followed_feed));

    let tag_routes = Router::new()
        .route("/", get(tags::list_tags))
        .route("/{tag_id}", get(tags::posts_by_tag));

    let profile_routes = Router::new()
        .route("/profile/{user_id}", get(profile::profile))
        .route("/user_stats/{user_id}", get(profile::user_stats));

    // PATCH is open to the owner (checked in the handler); the admin user
    // listing sits behind the double middleware.
    let user_routes = Router::new()
        .route(
            "/{id}",
            patch(profile::update_user).delete(profile::delete_user),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .merge(
            Router::new()
                .route("/", get(admin::list_users))
                .layer(middleware::from_fn(admin_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let admin_routes = Router::new()
        .route("/stats", get(admin::platform_stats))
        .route("/comment", get(admin::list_comments))
        .route("/comment/{id}", delete(admin::delete_comment))
        .route("/tags", post(admin::create_tag))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/post", post_routes)
        .nest("/comment", comment_routes)
        .nest("/reply", reply_routes)
        .nest("/tag", tag_routes)
        .nest("/user", user_routes)
        .nest("/admin", admin_routes)
        .merge(engagement_routes)
        .merge(social_routes)
        .merge(profile_routes);

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/blog", ServeDir::new(&state.config.upload_dir))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
