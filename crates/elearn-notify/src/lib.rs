//! Push-notification handling.
//!
//! `route` maps a payload to a screen. `NotificationService` holds at most
//! one navigation waiting for a navigator (cold start, background open) and
//! hands it out once. `DeviceTokens` keeps the backend told which push
//! token this device has.

pub mod devices;
pub mod router;
pub mod service;

pub use devices::DeviceTokens;
pub use router::{Navigator, route};
pub use service::{ForegroundNotice, NotificationService};
