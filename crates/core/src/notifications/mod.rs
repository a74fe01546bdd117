//! Notifications module.
//!
//! Notification delivery is a post-commit side effect: the quote service
//! dispatches after the state-changing write has been acknowledged, and
//! delivery failures never roll the transition back.

mod dispatcher;
mod notification;

pub use dispatcher::{
    MockNotificationDispatcher, NoOpNotificationDispatcher, NotificationDispatcherTrait,
};
pub use notification::{Notification, NotificationType};
