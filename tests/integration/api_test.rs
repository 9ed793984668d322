//! API endpoint integration tests
//!
//! Drives the fully composed router (auth, CORS, body limit, routes) against
//! in-process storage and a scripted model client.

#![allow(dead_code)]

mod auth;
mod chat;
mod common;
mod conversations;
mod messages;
