use crate::domain::model::{EmailFormat, OutgoingEmail};
use crate::domain::ports::MailTransport;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// The pieces the host's generic sending routine asks every transactional email for.
#[async_trait]
pub trait TransactionalEmail: Send + Sync {
    fn id(&self) -> &str;

    fn subject(&self) -> String;

    fn heading(&self) -> String;

    fn email_type(&self) -> EmailFormat;

    fn is_enabled(&self) -> bool;

    async fn content_html(&self) -> Result<String>;

    async fn content_plain(&self) -> Result<String>;

    fn headers(&self) -> Vec<String> {
        vec![format!("Content-Type: {}", self.email_type().content_type())]
    }

    fn attachments(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// Renders the bodies the email's format calls for and assembles the message.
pub async fn compose<E>(email: &E, recipient: &str) -> Result<OutgoingEmail>
where
    E: TransactionalEmail + ?Sized,
{
    let format = email.email_type();
    let html_body = match format {
        EmailFormat::Html | EmailFormat::Multipart => Some(email.content_html().await?),
        EmailFormat::Plain => None,
    };
    let text_body = match format {
        EmailFormat::Plain | EmailFormat::Multipart => Some(email.content_plain().await?),
        EmailFormat::Html => None,
    };

    Ok(OutgoingEmail {
        to: recipient.to_string(),
        subject: email.subject(),
        html_body,
        text_body,
        headers: email.headers(),
        attachments: email.attachments(),
    })
}

pub async fn send_transactional_email<E>(
    email: &E,
    recipient: &str,
    transport: &dyn MailTransport,
) -> Result<OutgoingEmail>
where
    E: TransactionalEmail + ?Sized,
{
    let outgoing = compose(email, recipient).await?;
    transport.send(&outgoing).await?;
    tracing::debug!(email = email.id(), to = recipient, "Transactional email handed to transport");
    Ok(outgoing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::GiftEmailError;
    use std::sync::Mutex;

    struct StaticEmail {
        format: EmailFormat,
        fail_html: bool,
    }

    #[async_trait]
    impl TransactionalEmail for StaticEmail {
        fn id(&self) -> &str {
            "static"
        }

        fn subject(&self) -> String {
            "Subject".to_string()
        }

        fn heading(&self) -> String {
            "Heading".to_string()
        }

        fn email_type(&self) -> EmailFormat {
            self.format
        }

        fn is_enabled(&self) -> bool {
            true
        }

        async fn content_html(&self) -> Result<String> {
            if self.fail_html {
                return Err(GiftEmailError::TemplateError {
                    template: "static.html".to_string(),
                    message: "boom".to_string(),
                });
            }
            Ok("<p>hi</p>".to_string())
        }

        async fn content_plain(&self) -> Result<String> {
            Ok("hi".to_string())
        }
    }

    #[derive(Default)]
    struct CapturingTransport {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl MailTransport for CapturingTransport {
        async fn send(&self, email: &OutgoingEmail) -> Result<()> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_compose_by_format() {
        let html = compose(&StaticEmail { format: EmailFormat::Html, fail_html: false }, "a@b.com")
            .await
            .unwrap();
        assert_eq!(html.html_body.as_deref(), Some("<p>hi</p>"));
        assert!(html.text_body.is_none());
        assert_eq!(html.headers, vec!["Content-Type: text/html".to_string()]);

        let plain = compose(&StaticEmail { format: EmailFormat::Plain, fail_html: true }, "a@b.com")
            .await
            .unwrap();
        assert!(plain.html_body.is_none());
        assert_eq!(plain.text_body.as_deref(), Some("hi"));

        let multipart =
            compose(&StaticEmail { format: EmailFormat::Multipart, fail_html: false }, "a@b.com")
                .await
                .unwrap();
        assert!(multipart.html_body.is_some() && multipart.text_body.is_some());
        assert!(multipart.attachments.is_empty());
    }

    #[tokio::test]
    async fn test_render_failure_sends_nothing() {
        let transport = CapturingTransport::default();
        let email = StaticEmail { format: EmailFormat::Html, fail_html: true };

        let result = send_transactional_email(&email, "a@b.com", &transport).await;
        assert!(matches!(result, Err(GiftEmailError::TemplateError { .. })));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_hands_message_to_transport() {
        let transport = CapturingTransport::default();
        let email = StaticEmail { format: EmailFormat::Html, fail_html: false };

        let sent = send_transactional_email(&email, "gift@example.com", &transport)
            .await
            .unwrap();
        assert_eq!(sent.to, "gift@example.com");
        assert_eq!(transport.sent.lock().unwrap().as_slice(), &[sent]);
    }
}
