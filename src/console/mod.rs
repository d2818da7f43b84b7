//! Manual-test console over the places and push SDKs.
//!
//! The console is what a demo screen binds to: buttons call its async
//! actions, labels read [`Console::snapshot`] (event-driven values) and
//! [`Console::status`] (query results), and failures surface through
//! [`Console::banner`] for a few seconds.

mod actions;
mod banner;
mod status;

pub use actions::Console;
pub use banner::ErrorBanner;
pub use status::StatusBoard;
