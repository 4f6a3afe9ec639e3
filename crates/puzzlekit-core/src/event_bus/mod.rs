//! # Event Bus Module
//!
//! Typed change notifications emitted by a layout.
//!
//! Every layout owns its own [`EventBus`]. Presentation code subscribes with a
//! filter and receives events synchronously, in mutation order, on the thread
//! that performed the mutation. Polling consumers can take a broadcast
//! receiver instead.
//!
//! ## Usage
//!
//! ```rust
//! use puzzlekit_core::event_bus::{EventBus, EventCategory, EventFilter, LayoutEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Sheet]),
//!     |event| {
//!         if let LayoutEvent::SheetListChanged = event {
//!             println!("sheets changed");
//!         }
//!     },
//! );
//!
//! bus.publish(LayoutEvent::SheetListChanged).ok();
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
