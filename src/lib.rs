//! Plant Assist — plant-care app backend core.
//!
//! Two workflows: the eggplant-disease chat conversation (canned responses,
//! remote completion fallback, realtime transcript mirroring) and the
//! email-OTP registration flow with its HTTP backend.

pub mod chat;
pub mod config;
pub mod error;
pub mod identity;
pub mod llm;
pub mod otp;
pub mod registration;
pub mod store;
