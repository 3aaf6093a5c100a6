// src/services/mod.rs

pub mod comments;
pub mod engagement;
pub mod posts;
pub mod social_graph;
pub mod stats;

pub use comments::CommentService;
pub use engagement::EngagementService;
pub use posts::PostService;
pub use social_graph::SocialGraphService;
pub use stats::StatsService;
