//! HTTP route handlers

pub mod admin;
pub mod auth;
pub mod health;
pub mod movies;
pub mod pages;
pub mod streaming;
