use std::sync::Arc;
use tracing::{error, info};

use crate::app::ports::MailerPort;
use crate::config::MailSettings;
use crate::domain::{Attachment, OutgoingMail};
use crate::error::{ClerkError, Result};

/// Fields of the send form
#[derive(Debug, Clone, Default)]
pub struct SendRequest {
    pub recipients: String,
    pub body: String,
    pub sheet_name: String,
    pub sender_key: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub sender_address: String,
    pub recipients: Vec<String>,
    pub attachments: usize,
}

pub struct SendUseCase {
    mailer: Arc<dyn MailerPort>,
    mail: MailSettings,
}

impl SendUseCase {
    pub fn new(mailer: Arc<dyn MailerPort>, mail: MailSettings) -> Self {
        Self { mailer, mail }
    }

    pub async fn run(&self, request: SendRequest) -> Result<SendOutcome> {
        if [&request.recipients, &request.body, &request.sheet_name, &request.sender_key]
            .iter()
            .any(|v| v.trim().is_empty())
        {
            return Err(ClerkError::InvalidForm(
                "Missing email, body, sheet name, or sender selection.".to_string(),
            ));
        }

        let sender = self
            .mail
            .sender(request.sender_key.trim())
            .ok_or_else(|| ClerkError::InvalidForm("Invalid sender selected.".to_string()))?;
        if sender.password.is_empty() {
            return Err(ClerkError::MissingCredentials(sender.address.clone()));
        }

        let attachments: Vec<Attachment> = request
            .attachments
            .into_iter()
            .filter(|a| !(a.file_name.trim().is_empty() && a.bytes.is_empty()))
            .collect();

        let mail = OutgoingMail::compose(
            &request.recipients,
            &self.mail.oversight_address,
            sender,
            &self.mail.subject,
            &request.body,
            attachments,
        )?;

        info!(
            "Sending {} mail from {} to {} recipients with {} attachments",
            request.sheet_name,
            sender.address,
            mail.recipient_count(),
            mail.attachments.len()
        );
        self.mailer.send(sender, &mail).await.map_err(|e| {
            error!("Error during email send: {}", e);
            e
        })?;
        info!("Email sent successfully from {}", sender.address);

        Ok(SendOutcome {
            sender_address: sender.address.clone(),
            recipients: mail.all_recipients().cloned().collect(),
            attachments: mail.attachments.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SenderAccount;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, OutgoingMail)>>,
    }

    #[async_trait]
    impl MailerPort for RecordingMailer {
        async fn send(&self, sender: &SenderAccount, mail: &OutgoingMail) -> Result<()> {
            self.sent.lock().await.push((sender.address.clone(), mail.clone()));
            Ok(())
        }
    }

    fn settings(password: &str) -> MailSettings {
        MailSettings {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            subject: "Envío de póliza".to_string(),
            oversight_address: "office@example.com".to_string(),
            senders: vec![SenderAccount {
                key: "lorena".to_string(),
                display_name: "Lorena".to_string(),
                address: "lorena@example.com".to_string(),
                password: password.to_string(),
            }],
        }
    }

    fn request(recipients: &str, sender: &str) -> SendRequest {
        SendRequest {
            recipients: recipients.to_string(),
            body: "Estimado cliente".to_string(),
            sheet_name: "Autos".to_string(),
            sender_key: sender.to_string(),
            attachments: vec![
                Attachment { file_name: "poliza.pdf".to_string(), bytes: vec![1, 2, 3] },
                Attachment { file_name: String::new(), bytes: Vec::new() },
            ],
        }
    }

    #[tokio::test]
    async fn sends_to_client_oversight_and_sender() {
        let mailer = Arc::new(RecordingMailer::default());
        let case = SendUseCase::new(mailer.clone(), settings("pw"));

        let outcome = case.run(request("client@example.com", "lorena")).await.unwrap();
        assert_eq!(outcome.recipients, vec!["client@example.com", "office@example.com", "lorena@example.com"]);
        assert_eq!(outcome.attachments, 1);

        let sent = mailer.sent.lock().await;
        assert_eq!(sent[0].0, "lorena@example.com");
        assert_eq!(sent[0].1.subject, "Envío de póliza");
    }

    #[tokio::test]
    async fn unknown_sender_is_invalid() {
        let case = SendUseCase::new(Arc::new(RecordingMailer::default()), settings("pw"));
        let err = case.run(request("client@example.com", "nobody")).await.unwrap_err();
        assert!(matches!(err, ClerkError::InvalidForm(_)));
    }

    #[tokio::test]
    async fn missing_fields_are_invalid() {
        let case = SendUseCase::new(Arc::new(RecordingMailer::default()), settings("pw"));
        let mut req = request("client@example.com", "lorena");
        req.body = "  ".to_string();
        assert!(matches!(case.run(req).await, Err(ClerkError::InvalidForm(_))));
    }

    #[tokio::test]
    async fn empty_password_is_missing_credentials() {
        let case = SendUseCase::new(Arc::new(RecordingMailer::default()), settings(""));
        let err = case.run(request("client@example.com", "lorena")).await.unwrap_err();
        assert!(matches!(err, ClerkError::MissingCredentials(_)));
    }

    #[tokio::test]
    async fn too_many_recipients_never_reach_the_transport() {
        let mailer = Arc::new(RecordingMailer::default());
        let case = SendUseCase::new(mailer.clone(), settings("pw"));
        let err = case.run(request("a@x.com,b@x.com,c@x.com,d@x.com", "lorena")).await.unwrap_err();
        assert!(matches!(err, ClerkError::TooManyRecipients { count: 6, max: 5 }));
        assert!(mailer.sent.lock().await.is_empty());
    }
}
