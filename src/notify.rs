//! Best-effort outbound notifications for enrollment review outcomes.
//!
//! The status write always commits first; the email goes through a bounded
//! queue with at-most-once semantics. A full queue or a failing mailer is
//! logged and the message dropped — there is no retry channel.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct StatusEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, email: &StatusEmail) -> Result<()>;
}

/// Default delivery: the outbound message is written to the log and handed
/// to whatever ships mail out-of-band in the deployment.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &StatusEmail) -> Result<()> {
        info!(
            recipient = %email.to,
            sender = %email.from,
            subject = %email.subject,
            body = %email.body,
            "outbound status notification"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<StatusEmail>,
}

impl NotificationDispatcher {
    /// Spawns the drain task; must run inside a tokio runtime.
    pub fn start(mailer: Arc<dyn Mailer>, queue_size: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<StatusEmail>(queue_size.max(1));

        tokio::spawn(async move {
            while let Some(email) = receiver.recv().await {
                if let Err(err) = mailer.send(&email).await {
                    error!(
                        error = %err,
                        recipient = %email.to,
                        subject = %email.subject,
                        "status notification failed"
                    );
                }
            }
        });

        Self { sender }
    }

    /// Never blocks the calling request. A message that does not fit in the
    /// queue is dropped, not retried.
    pub fn dispatch(&self, email: StatusEmail) {
        if let Err(err) = self.sender.try_send(email) {
            warn!(error = %err, "dropping status notification");
        }
    }
}
