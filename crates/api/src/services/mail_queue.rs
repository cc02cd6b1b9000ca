//! Background delivery of account notices.
//!
//! [`MailQueue`] is the production [`Mailer`]: `dispatch` pushes onto an
//! unbounded channel and returns immediately, and a single worker task
//! renders and sends each notice. Delivery failures are logged and counted.

use domain::services::{AccountNotice, Mailer};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::email::EmailService;

/// Sending half of the mail channel.
#[derive(Clone)]
pub struct MailQueue {
    tx: mpsc::UnboundedSender<AccountNotice>,
}

/// Handle to the delivery task.
pub struct MailWorker {
    handle: JoinHandle<()>,
}

impl MailQueue {
    /// Spawn the delivery worker. Must be called inside a Tokio runtime.
    pub fn start(email: EmailService) -> (Self, MailWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(deliver(email, rx));
        (Self { tx }, MailWorker { handle })
    }
}

impl Mailer for MailQueue {
    fn dispatch(&self, notice: AccountNotice) {
        if let Err(err) = self.tx.send(notice) {
            warn!(
                kind = %err.0.kind,
                recipient = %err.0.recipient_email,
                "Mail worker stopped, dropping notice"
            );
        }
    }
}

impl MailWorker {
    /// Wait for queued notices to go out. Returns once every [`MailQueue`]
    /// clone has been dropped and the channel is empty.
    pub async fn drain(self) {
        if let Err(e) = self.handle.await {
            error!(error = %e, "Mail worker panicked");
        }
    }
}

async fn deliver(email: EmailService, mut rx: mpsc::UnboundedReceiver<AccountNotice>) {
    while let Some(notice) = rx.recv().await {
        let kind = notice.kind.to_string();
        let message = email.render(&notice);

        match email.send(message).await {
            Ok(()) => {
                metrics::counter!("emails_sent_total", "kind" => kind).increment(1);
            }
            Err(e) => {
                metrics::counter!("emails_failed_total", "kind" => kind.clone()).increment(1);
                error!(
                    kind = %kind,
                    recipient = %notice.recipient_email,
                    error = %e,
                    "Failed to deliver notice"
                );
            }
        }
    }
    debug!("Mail worker stopped");
}
