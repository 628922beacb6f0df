// src/models/mod.rs

pub mod comment;
pub mod like;
pub mod pagination;
pub mod response;
pub mod topic;
pub mod user;
