//! API Routes
//!
//! Route handlers organized by functionality.

pub mod chains;
pub mod export;
pub mod health;
