use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::services::{
    CommentService, EngagementService, PostService, SocialGraphService, StatsService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub posts: PostService,
    pub social: SocialGraphService,
    pub engagement: EngagementService,
    pub comments: CommentService,
    pub stats: StatsService,
}

impl AppState {
    /// Wires every service over the shared pool.
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let posts = PostService::new(pool.clone());
        let social = SocialGraphService::new(pool.clone(), posts.clone());
        let engagement = EngagementService::new(pool.clone());
        let comments = CommentService::new(pool.clone());
        let stats = StatsService::new(pool.clone());

        Self {
            pool,
            config,
            posts,
            social,
            engagement,
            comments,
            stats,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for PostService {
    fn from_ref(state: &AppState) -> Self {
        state.posts.clone()
    }
}

impl FromRef<AppState> for SocialGraphService {
    fn from_ref(state: &AppState) -> Self {
        state.social.clone()
    }
}

impl FromRef<AppState> for EngagementService {
    fn from_ref(state: &AppState) -> Self {
        state.engagement.clone()
    }
}

impl FromRef<AppState> for CommentService {
    fn from_ref(state: &AppState) -> Self {
        state.comments.clone()
    }
}

impl FromRef<AppState> for StatsService {
    fn from_ref(state: &AppState) -> Self {
        state.stats.clone()
    }
}
