// src/services/mod.rs
pub mod assignment_service;
pub mod auth_service;
pub mod file_service;
pub mod post_service;
pub mod user_service;
