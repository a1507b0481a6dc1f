//! User interface components
//!
//! This module provides the terminal event inspector for midishimrs: a
//! spinner that shows the most recent driver notification (inbound message,
//! port added, port removed) while `--monitor` runs.
//!
//! The UI is built using the indicatif library.

mod inspector;

pub use inspector::{create_event_spinner, run_event_inspector, EventFeed, SharedEventFeed};
