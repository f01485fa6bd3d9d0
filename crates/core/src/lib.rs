//! Core business logic for BizNetworQ.
//!
//! Services validate input, enforce channel permissions and translate
//! between API shapes and repository calls.

pub mod services;

pub use services::*;
