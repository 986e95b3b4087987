//! Ticketing backend: users with MANAGER, SUPPORT and USER roles file,
//! assign and discuss tickets over a JSON API.

pub mod api;
pub mod auth;
pub mod comment;
pub mod config;
pub mod db;
pub mod role;
pub mod ticket;
pub mod user;
