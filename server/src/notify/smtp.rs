use askama::Template;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

use super::{render_ticket_pdf, NotificationError, Notifier};
use crate::config::SmtpConfig;
use crate::models::Ticket;

#[derive(Template)]
#[template(path = "ticket_email.html")]
struct TicketEmail<'a> {
    name: &'a str,
    event: &'a str,
    organizer: &'a str,
}

pub struct SmtpNotifier {
    from: Mailbox,
    organizer: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotificationError> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.username)
            .parse()
            .map_err(|e| NotificationError::Address(format!("sender: {}", e)))?;

        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotificationError::Transport(format!("SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            from,
            organizer: config.from_name.clone(),
            transport,
        })
    }

    fn build_message(&self, ticket: &Ticket, pdf: Vec<u8>) -> Result<Message, NotificationError> {
        let to: Mailbox = ticket
            .email
            .parse()
            .map_err(|e| NotificationError::Address(format!("{}: {}", ticket.email, e)))?;

        let html = TicketEmail {
            name: &ticket.name,
            event: &ticket.event,
            organizer: &self.organizer,
        }
        .render()
        .map_err(|e| NotificationError::Render(format!("email body: {}", e)))?;

        let pdf_type = ContentType::parse("application/pdf")
            .map_err(|e| NotificationError::Render(e.to_string()))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(format!("Your Ticket for {}", ticket.event))
            .multipart(
                MultiPart::mixed()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    )
                    .singlepart(
                        Attachment::new(format!("ticket-{}.pdf", ticket.id)).body(pdf, pdf_type),
                    ),
            )
            .map_err(|e| NotificationError::Render(format!("message: {}", e)))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_ticket(&self, ticket: &Ticket) -> Result<(), NotificationError> {
        let pdf = render_ticket_pdf(ticket, &self.organizer)?;
        let message = self.build_message(ticket, pdf)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        tracing::info!(ticket_id = %ticket.id, to = %ticket.email, "Ticket email sent");
        Ok(())
    }
}
