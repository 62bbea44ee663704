//! Infrastructure layer - storage implementations and process concerns

pub mod logging;
pub mod user;
