//! Outgoing email. Delivery problems are logged by callers and never fail
//! the request that triggered them.

pub mod smtp;
pub mod templates;

use async_trait::async_trait;
use thiserror::Error;

pub use smtp::SmtpMailer;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    #[error("Message could not be built: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;

    /// False for transports that accept messages without sending them
    fn transmits(&self) -> bool {
        true
    }
}

/// Used when mail is disabled: records what would have been sent
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        tracing::info!(to = %email.to, subject = %email.subject, "Mail disabled, message not sent");
        Ok(())
    }

    fn transmits(&self) -> bool {
        false
    }
}

/// Send and log the outcome. Returns true only when a real transport accepted the message.
/// Bodies may carry temporary passwords and are never logged.
pub async fn deliver(mailer: &dyn Mailer, email: Email) -> bool {
    let to = email.to.clone();
    let subject = email.subject.clone();
    match mailer.send(email).await {
        Ok(()) if mailer.transmits() => {
            tracing::info!(to = %to, subject = %subject, "Mail delivered");
            true
        }
        Ok(()) => false,
        Err(e) => {
            tracing::error!(to = %to, subject = %subject, "Mail delivery failed: {}", e);
            false
        }
    }
}

/// Pick the transport from configuration
pub fn from_config(config: &crate::config::MailConfig) -> Result<std::sync::Arc<dyn Mailer>, MailError> {
    if config.enabled {
        Ok(std::sync::Arc::new(SmtpMailer::new(config)?))
    } else {
        Ok(std::sync::Arc::new(LogMailer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FailingMailer {
        attempts: Mutex<u32>,
    }

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: Email) -> Result<(), MailError> {
            *self.attempts.lock().unwrap() += 1;
            Err(MailError::Transport("connection refused".into()))
        }
    }

    fn email() -> Email {
        Email {
            to: "ana@example.org".into(),
            to_name: None,
            subject: "Prueba".into(),
            body: "Hola".into(),
        }
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        assert!(LogMailer.send(email()).await.is_ok());
    }

    #[tokio::test]
    async fn delivery_failures_are_swallowed() {
        let mailer = FailingMailer::default();
        assert!(!deliver(&mailer, email()).await);
        assert_eq!(*mailer.attempts.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn log_mailer_does_not_count_as_delivered() {
        assert!(!deliver(&LogMailer, email()).await);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn temporary_passwords_never_reach_the_log() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("trace"))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let email = templates::password_reset("Ana Pérez", "ana@example.org", "Secr3tTemp99", "http://localhost:3000");
        deliver(&LogMailer, email).await;
        deliver(&FailingMailer::default(), templates::welcome("Ana Pérez", "ana@example.org", "Secr3tTemp99", "http://localhost:3000")).await;

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ana@example.org"), "{}", output);
        assert!(!output.contains("Secr3tTemp99"), "{}", output);
    }

    #[test]
    fn disabled_config_uses_log_mailer() {
        let mut config = crate::config::AppConfig::from_env().mail;
        config.enabled = false;
        assert!(from_config(&config).is_ok());
    }
}
