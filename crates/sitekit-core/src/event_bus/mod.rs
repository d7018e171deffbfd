//! # Event Bus Module
//!
//! Publish/subscribe channel between the editing components and whatever
//! hosts them (UI, CLI, tests).
//!
//! - Publishers emit typed [`SceneEvent`]s without knowing subscribers
//! - Subscribers filter by [`EventCategory`]
//! - Async consumers poll a tokio broadcast receiver
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use sitekit_core::event_bus::{EventBus, EventCategory, EventFilter, SceneEvent, ValidationEvent};
//!
//! let bus = Arc::new(EventBus::new());
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Validation]),
//!     |event| {
//!         if let SceneEvent::Validation(v) = event {
//!             println!("validation: {:?}", v);
//!         }
//!     },
//! );
//!
//! bus.publish(SceneEvent::Validation(ValidationEvent::WarningCleared));
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
