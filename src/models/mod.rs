// src/models/mod.rs

pub mod comment;
pub mod engagement;
pub mod follower;
pub mod post;
pub mod tag;
pub mod user;
