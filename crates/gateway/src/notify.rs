//! Reminder delivery.

use async_trait::async_trait;
use serde::Serialize;
use sg_domain::{Error, Result};

use crate::schedule::ReminderPayload;

/// A reminder ready for delivery.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub user_id: String,
    pub subject: String,
    pub message: String,
    pub payload: ReminderPayload,
}

impl Reminder {
    pub fn for_routine(payload: &ReminderPayload) -> Self {
        let steps = if payload.steps.is_empty() {
            String::new()
        } else {
            format!("\n\nSteps:\n{}", payload.steps.join("\n"))
        };
        Self {
            user_id: payload.user_id.clone(),
            subject: "Your Daily SheGlow Skincare Reminder".to_string(),
            message: format!(
                "Don't forget your skincare routine: {}{steps}\n\nConsistency is key to healthy, glowing skin!",
                payload.title
            ),
            payload: payload.clone(),
        }
    }
}

/// Outbound delivery seam. Publishing is per-reminder; email
/// subscription registers an address for future deliveries.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, reminder: &Reminder) -> Result<()>;
    async fn subscribe_email(&self, user_id: &str, email: &str) -> Result<()>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Implementations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Posts reminders as JSON to a configured webhook.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| Error::Notify(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn publish(&self, reminder: &Reminder) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .json(reminder)
            .send()
            .await
            .map_err(|e| Error::Notify(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Error::Notify(format!(
                "webhook returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    async fn subscribe_email(&self, user_id: &str, email: &str) -> Result<()> {
        let body = serde_json::json!({
            "action": "subscribe",
            "userId": user_id,
            "email": email,
        });
        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Notify(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Error::Notify(format!(
                "webhook returned {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

/// Logs reminders instead of delivering them. Used when no webhook is
/// configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, reminder: &Reminder) -> Result<()> {
        tracing::info!(
            user_id = %reminder.user_id,
            routine_id = %reminder.payload.routine_id,
            subject = %reminder.subject,
            "reminder (no webhook configured)"
        );
        Ok(())
    }

    async fn subscribe_email(&self, user_id: &str, email: &str) -> Result<()> {
        tracing::info!(user_id, email, "email subscription recorded (no webhook configured)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_message_includes_title_and_steps() {
        let payload = ReminderPayload::new(
            "u1",
            "r1",
            "Evening Glow",
            &["cleanse".into(), "serum".into()],
        );
        let reminder = Reminder::for_routine(&payload);
        assert!(reminder.message.contains("Evening Glow"));
        assert!(reminder.message.contains("cleanse\nserum"));
        assert_eq!(reminder.subject, "Your Daily SheGlow Skincare Reminder");
    }

    #[test]
    fn reminder_without_steps_omits_step_block() {
        let payload = ReminderPayload::new("u1", "r1", "Quick", &[]);
        let reminder = Reminder::for_routine(&payload);
        assert!(!reminder.message.contains("Steps:"));
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let n = LogNotifier;
        let payload = ReminderPayload::new("u1", "r1", "Quick", &[]);
        n.publish(&Reminder::for_routine(&payload)).await.unwrap();
        n.subscribe_email("u1", "a@b.co").await.unwrap();
    }
}
