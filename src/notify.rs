//! Order notification emails.
//!
//! Delivery is best-effort: [`dispatch`] runs the send on a detached task and
//! only logs failures, so callers never wait on or fail because of the mail
//! relay.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use thiserror::Error;

use crate::{
    config::{AppConfig, MailConfig},
    models::Order,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), NotifyError>;
}

#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, email: Email) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(email.to.clone()))?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)?;

        self.mailer.send(message).await?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Used when no mail relay is configured: the message is only logged.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, email: Email) -> Result<(), NotifyError> {
        tracing::info!(to = %email.to, subject = %email.subject, "mail relay not configured, email skipped");
        Ok(())
    }
}

pub fn from_config(config: &AppConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    match &config.mail {
        Some(mail) => Ok(Arc::new(SmtpNotifier::new(mail)?)),
        None => Ok(Arc::new(LogNotifier)),
    }
}

/// Sends `email` in the background. Errors are logged and dropped.
pub fn dispatch(notifier: Arc<dyn Notifier>, email: Email) {
    tokio::spawn(async move {
        let to = email.to.clone();
        if let Err(err) = notifier.send(email).await {
            tracing::warn!(error = %err, to = %to, "notification failed");
        }
    });
}

fn order_lines(order: &Order) -> String {
    order
        .items
        .iter()
        .map(|item| {
            format!(
                "- {} x{} @ ${:.2} = ${:.2}",
                item.name, item.quantity, item.price, item.total_price
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn new_order_for_store(order: &Order, store_email: &str) -> Email {
    let c = &order.customer;
    Email {
        to: store_email.to_string(),
        subject: format!("New order #{}", order.id),
        body: format!(
            "A new order was placed.\n\nOrder: {}\nDate: {}\nTotal: ${:.2}\nPayment: {}\n\nCustomer: {} <{}>\nPhone: {}\nShip to: {}, {}, {}\n\nItems:\n{}\n",
            order.id,
            order.date,
            order.total,
            order.payment_method.as_deref().unwrap_or("-"),
            c.name,
            c.email,
            c.phone,
            c.address,
            c.city,
            c.country,
            order_lines(order),
        ),
    }
}

pub fn order_confirmation(order: &Order) -> Email {
    Email {
        to: order.customer.email.clone(),
        subject: format!("Your order #{} was received", order.id),
        body: format!(
            "Hi {},\n\nThanks for your order. We will let you know when its status changes.\n\nOrder: {}\nTotal: ${:.2}\n\nItems:\n{}\n",
            order.customer.name,
            order.id,
            order.total,
            order_lines(order),
        ),
    }
}

pub fn status_changed(order: &Order) -> Email {
    Email {
        to: order.customer.email.clone(),
        subject: format!("Order #{} is now {}", order.id, order.status),
        body: format!(
            "Hi {},\n\nThe status of your order {} changed to {}.\n\nTotal: ${:.2}\n",
            order.customer.name, order.id, order.status, order.total,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerInfo, OrderLine, OrderStatus};

    fn order() -> Order {
        Order {
            id: "1700000000000".into(),
            user_id: None,
            date: "2026-10-18T10:00:00+00:00".into(),
            status: OrderStatus::Accepted,
            total: 12.5,
            items: vec![OrderLine {
                name: "Mug".into(),
                price: 6.25,
                quantity: 2,
                total_price: 12.5,
                image: String::new(),
            }],
            customer: CustomerInfo {
                name: "Alice".into(),
                email: "alice@x.com".into(),
                ..Default::default()
            },
            payment_method: None,
        }
    }

    #[test]
    fn status_email_goes_to_snapshot_customer() {
        let email = status_changed(&order());
        assert_eq!(email.to, "alice@x.com");
        assert!(email.subject.contains("Accepted"));
    }

    #[test]
    fn store_email_lists_items() {
        let email = new_order_for_store(&order(), "shop@x.com");
        assert_eq!(email.to, "shop@x.com");
        assert!(email.body.contains("Mug x2 @ $6.25 = $12.50"));
    }
}
