//! # Events Module
//!
//! Progress reporting for the retagging pipeline.
//!
//! The pipeline emits events through a channel so the caller can display
//! progress on another thread.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Retag(RetagEvent::Tagged { path, timestamp }) => {
//!                 println!("{} -> {}", path.display(), timestamp)
//!             }
//!             Event::Retag(RetagEvent::MovedUndated { from, .. }) => {
//!                 println!("{} has no date", from.display())
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
