//! Catalog backend: account sign-in with stateless bearer tokens, product
//! CRUD and an image upload relay, served over a JSON REST API.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod memory;
pub mod products;
pub mod state;
pub mod storage;
pub mod store;
pub mod uploads;
