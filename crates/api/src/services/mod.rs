//! Outbound integrations.

pub mod email;
pub mod mail_queue;

pub use email::{EmailError, EmailMessage, EmailService};
pub use mail_queue::{MailQueue, MailWorker};
