//! Shared utility functions.
//!
//! - `cancel`: racing futures and politeness sleeps against a cancellation token

mod cancel;

pub use cancel::{sleep_or_cancel, until_cancelled};
