pub mod discord;
pub mod notification;
pub mod subscription;

pub use notification::{Destination, NotificationField, RenderedNotification};
pub use subscription::{
    CreateSubscriptionRequest, ListSubscriptionsResponse, RemoveSubscriptionQuery,
    SubscriptionEntry,
};
