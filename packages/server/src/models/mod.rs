pub mod admin;
pub mod audit;
pub mod auth;
pub mod credential;
pub mod form_schema;
pub mod integration;
pub mod manage;
pub mod shared;
pub mod usage;
