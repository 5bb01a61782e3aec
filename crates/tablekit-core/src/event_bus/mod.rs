//! # Event Bus Module
//!
//! Decoupled delivery of editor and storage events, including the transient
//! notifications shown to users when a load, save or click is rejected.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tablekit_core::event_bus::{event_bus, AppEvent, EventCategory, EventFilter, Notification};
//!
//! let subscription = event_bus().subscribe(
//!     EventFilter::Categories(vec![EventCategory::Notice]),
//!     |event| {
//!         if let AppEvent::Notice(notice) = event {
//!             println!("{}", notice.message);
//!         }
//!     },
//! );
//!
//! event_bus().publish(AppEvent::Notice(Notification::warning(
//!     "slot_outside_image",
//!     "Click inside the image to add a slot",
//! )));
//!
//! event_bus().unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
