// Customer notifications

pub mod dispatcher;
pub mod notifier;
pub mod smtp;
pub mod templates;

pub use dispatcher::NotificationDispatcher;
pub use notifier::{EmailMessage, LogNotifier, Notifier};
pub use smtp::SmtpNotifier;
