pub mod api;
pub mod events;
pub mod models;

pub use events::{Destination, NotificationData, PushMessage};
pub use models::{Session, UserProfile};
