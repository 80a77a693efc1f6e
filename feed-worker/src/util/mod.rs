//! Small shared helpers.

pub mod user_agent;
