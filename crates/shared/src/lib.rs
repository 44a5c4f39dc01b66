//! Shared utilities for the wedding RSVP backend.
//!
//! This crate provides functionality used across the other crates:
//! - Session token generation and hashing
//! - Admin password hashing with Argon2id
//! - Invite code and guest name normalization

pub mod crypto;
pub mod password;
pub mod validation;
