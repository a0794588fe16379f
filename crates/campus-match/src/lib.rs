//! Campus social-matching core.
//!
//! The library houses the domain logic behind the campus-match service:
//! compatibility scoring between student profiles, the friend-request
//! lifecycle and its derived relationship states, and direct/group
//! conversations with unread accounting. Storage sits behind repository
//! traits so services can be exercised against in-memory fakes.

pub mod config;
pub mod error;
pub mod social;
pub mod telemetry;
