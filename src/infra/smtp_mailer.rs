use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use crate::app::ports::MailerPort;
use crate::config::MailSettings;
use crate::domain::{OutgoingMail, SenderAccount};
use crate::error::{ClerkError, Result};

/// SMTP submission with STARTTLS, logging in as the sending account
pub struct SmtpMailer {
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(settings: &MailSettings) -> Self {
        Self { host: settings.smtp_host.clone(), port: settings.smtp_port }
    }
}

#[async_trait]
impl MailerPort for SmtpMailer {
    async fn send(&self, sender: &SenderAccount, mail: &OutgoingMail) -> Result<()> {
        let message = build_message(sender, mail)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| ClerkError::Mail(e.to_string()))?
            .port(self.port)
            .credentials(Credentials::new(sender.address.clone(), sender.password.clone()))
            .build();

        info!("Connecting to {}:{} as {}", self.host, self.port, sender.address);
        transport.send(message).await.map_err(|e| {
            error!("SMTP delivery failed: {}", e);
            ClerkError::Mail(e.to_string())
        })?;
        Ok(())
    }
}

fn mailbox(address: &str, name: Option<&str>) -> Result<Mailbox> {
    let parsed: Address = address.trim().parse().map_err(|e: lettre::address::AddressError| {
        ClerkError::InvalidAddress { address: address.to_string(), message: e.to_string() }
    })?;
    Ok(Mailbox::new(name.map(str::to_string), parsed))
}

/// Plain-text body plus one part per attachment, typed from its file name
pub fn build_message(sender: &SenderAccount, mail: &OutgoingMail) -> Result<Message> {
    let mut builder = Message::builder()
        .from(mailbox(&sender.address, Some(&sender.display_name))?)
        .subject(mail.subject.clone());
    for to in &mail.to {
        builder = builder.to(mailbox(to, None)?);
    }
    for cc in &mail.cc {
        builder = builder.cc(mailbox(cc, None)?);
    }

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(mail.body.clone()));
    for attachment in &mail.attachments {
        let mime = mime_guess::from_path(&attachment.file_name).first_or_octet_stream();
        let content_type = ContentType::parse(mime.as_ref()).map_err(|e| ClerkError::Mail(e.to_string()))?;
        parts = parts.singlepart(MailAttachment::new(attachment.file_name.clone()).body(attachment.bytes.clone(), content_type));
    }

    builder.multipart(parts).map_err(|e| ClerkError::Mail(e.to_string()))
}
