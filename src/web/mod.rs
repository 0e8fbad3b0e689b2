// src/web/mod.rs
pub mod admin_handlers;
pub mod assignment_handlers;
pub mod auth_handlers;
pub mod board_handlers;
pub mod file_handlers;
pub mod flash;
pub mod mw_auth;
pub mod mw_role;
pub mod routes;
pub mod user_handlers;
