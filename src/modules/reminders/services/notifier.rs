use async_trait::async_trait;
use tracing::info;

use crate::core::Result;

/// Outbound notification seam.
///
/// The chat transport lives outside this crate; anything able to deliver a
/// text message to a chat id can carry reminders.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message to a chat
    async fn send(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Notifier that writes reminders to the log, used when no chat transport
/// is wired up (and by tests)
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        info!(chat_id, message = text, "Reminder dispatched");
        Ok(())
    }
}
