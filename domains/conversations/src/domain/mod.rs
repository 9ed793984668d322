//! Domain layer for Conversations

pub mod entities;
