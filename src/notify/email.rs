// src/notify/email.rs
//! SMTP digest: one HTML message per scan listing every new posting.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use html_escape::{encode_double_quoted_attribute, encode_text};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{display_location, headline, DigestNotifier};
use crate::config::EmailConfig;
use crate::ingest::types::Posting;

pub struct EmailDigest {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailDigest {
    /// `Ok(None)` when user, password or recipient is missing; `Err` when they
    /// are present but unusable (bad address, bad host).
    pub fn from_config(cfg: &EmailConfig) -> Result<Option<Self>> {
        let (Some(user), Some(pass), Some(to_addr)) =
            (&cfg.smtp_user, &cfg.smtp_pass, cfg.recipient())
        else {
            return Ok(None);
        };

        let from: Mailbox = user
            .parse()
            .with_context(|| format!("invalid sender address {user}"))?;
        let to: Mailbox = to_addr
            .parse()
            .with_context(|| format!("invalid recipient address {to_addr}"))?;

        let creds = Credentials::new(user.clone(), pass.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
            .with_context(|| format!("invalid SMTP_HOST {}", cfg.smtp_host))?
            .port(cfg.smtp_port)
            .credentials(creds)
            .build();

        Ok(Some(Self { mailer, from, to }))
    }
}

pub fn subject(n: usize) -> String {
    format!("{} - Apply now", headline(n))
}

/// HTML body. Every posting field is escaped.
pub fn render_digest(postings: &[Posting], at: DateTime<Local>) -> String {
    let n = postings.len();
    let mut html = String::with_capacity(512 + n * 640);
    html.push_str(
        "<html><body style='font-family:Arial,sans-serif;max-width:720px;margin:auto'>",
    );
    html.push_str(&format!(
        "<h2 style='color:#1a73e8'>{}</h2><p style='color:#666'>{}</p><hr>",
        headline(n),
        at.format("%Y-%m-%d %H:%M:%S")
    ));
    for p in postings {
        let href = encode_double_quoted_attribute(&p.url);
        html.push_str(&format!(
            "<div style=\"border-left:4px solid #1a73e8;padding:10px 16px;margin:14px 0;background:#f8f9fa\">\
             <h3 style=\"margin:0 0 4px\"><a href=\"{href}\" style=\"color:#1a73e8;text-decoration:none\">{title}</a></h3>\
             <p style=\"margin:2px 0\"><b>{company}</b></p>\
             <p style=\"margin:2px 0;color:#555\">{location}</p>\
             <p style=\"margin:2px 0;color:#888;font-size:.85em\">Source: {source}</p>\
             <a href=\"{href}\" style=\"display:inline-block;margin-top:8px;padding:6px 16px;background:#1a73e8;color:#fff;border-radius:4px;text-decoration:none\">Apply Now</a>\
             </div>",
            title = encode_text(&p.title),
            company = encode_text(&p.company),
            location = encode_text(display_location(p)),
            source = encode_text(&p.source),
        ));
    }
    html.push_str("</body></html>");
    html
}

#[async_trait::async_trait]
impl DigestNotifier for EmailDigest {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send_digest(&self, postings: &[Posting]) -> Result<()> {
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject(postings.len()))
            .header(header::ContentType::TEXT_HTML)
            .body(render_digest(postings, Local::now()))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        tracing::info!(to = %self.to, new = postings.len(), "email sent");
        Ok(())
    }
}
