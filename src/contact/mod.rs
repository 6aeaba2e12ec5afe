//! Contact Relay
//!
//! Validates contact form submissions and turns them into one outbound email
//! (HTML + plain text) for the operator inbox.

use askama::Template;
use serde::{Deserialize, Serialize};

pub mod mailer;

pub use mailer::{Mailer, MailerError, OutboundEmail, ResendMailer};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("failed to render email: {0}")]
    Render(String),
}

/// Raw form body as posted by the site
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub cultivar: Option<String>,
    pub timestamp: Option<String>,
}

/// A submission whose required fields are present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInquiry {
    pub name: String,
    pub email: String,
    pub message: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub cultivar: Option<String>,
    pub timestamp: String,
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ContactSubmission {
    /// Check required fields. Blank strings count as missing.
    pub fn validate(self) -> Result<ContactInquiry, ContactError> {
        let name = present(self.name);
        let email = present(self.email);
        let message = present(self.message);

        let missing: Vec<&'static str> = [("name", &name), ("email", &email), ("message", &message)]
            .into_iter()
            .filter(|(_, v)| v.is_none())
            .map(|(field, _)| field)
            .collect();

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) => Ok(ContactInquiry {
                name,
                email,
                message,
                company: present(self.company),
                phone: present(self.phone),
                region: present(self.region),
                cultivar: present(self.cultivar),
                timestamp: present(self.timestamp)
                    .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
            }),
            _ => Err(ContactError::MissingFields(missing)),
        }
    }
}

#[derive(Template)]
#[template(path = "emails/contact.html")]
struct ContactHtml<'a> {
    inquiry: &'a ContactInquiry,
    details: Vec<(&'static str, &'a str)>,
}

#[derive(Template)]
#[template(path = "emails/contact.txt")]
struct ContactText<'a> {
    inquiry: &'a ContactInquiry,
    details: Vec<(&'static str, &'a str)>,
}

impl ContactInquiry {
    pub fn subject(&self) -> String {
        let mut subject = format!("New inquiry from {}", self.name);
        if let Some(company) = &self.company {
            subject.push_str(&format!(" ({})", company));
        }
        if let Some(cultivar) = &self.cultivar {
            subject.push_str(&format!(" about {}", cultivar));
        }
        subject
    }

    /// Labelled optional fields that were filled in
    fn details(&self) -> Vec<(&'static str, &str)> {
        [
            ("Email", Some(&self.email)),
            ("Company", self.company.as_ref()),
            ("Phone", self.phone.as_ref()),
            ("Region", self.region.as_ref()),
            ("Cultivar", self.cultivar.as_ref()),
            ("Submitted", Some(&self.timestamp)),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v.as_str())))
        .collect()
    }

    pub fn compose(&self, from: &str, to: &str) -> Result<OutboundEmail, ContactError> {
        let html = ContactHtml {
            inquiry: self,
            details: self.details(),
        }
        .render()
        .map_err(|e| ContactError::Render(e.to_string()))?;
        let text = ContactText {
            inquiry: self,
            details: self.details(),
        }
        .render()
        .map_err(|e| ContactError::Render(e.to_string()))?;

        Ok(OutboundEmail {
            from: from.to_string(),
            to: vec![to.to_string()],
            reply_to: Some(self.email.clone()),
            subject: self.subject(),
            html,
            text,
        })
    }
}
