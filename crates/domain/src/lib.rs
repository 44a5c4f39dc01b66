//! Domain layer for the wedding RSVP backend.
//!
//! This crate contains:
//! - Domain models (Invitation, RsvpStatus, admin accounts)
//! - RSVP resolution, a pure decision function
//! - The operator notification contract

pub mod models;
pub mod services;
