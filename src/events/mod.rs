//! # Events Module
//!
//! What a scan session reports while it runs.
//!
//! A session's coordinating thread emits through [`SessionEvents`]; the
//! `ScanController` owns the [`EventReceiver`], filters out anything from
//! sessions it no longer cares about, and hands the rest to the
//! presentation layer. Every event is serde-ready for a GUI bridge.
//!
//! ```rust,ignore
//! let (sender, receiver) = event_channel();
//! let events = sender.for_session(SessionId(1));
//! events.progress(1, 10, "/photos/a.jpg".into());
//! ```

mod channel;
mod types;

pub use channel::{event_channel, EventReceiver, EventSender, Recv, SessionEvents};
pub use types::*;
