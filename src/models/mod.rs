// src/models/mod.rs
pub mod assignment;
pub mod file;
pub mod post;
pub mod user;
