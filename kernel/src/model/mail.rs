use crate::model::library::Library;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    pub fn registration_received(library: &Library) -> Self {
        Self {
            to: library.owner.owner_email.clone(),
            subject: format!("We received your registration for {}", library.name),
            body: format!(
                "Hello {},\n\nThank you for registering \"{}\" ({}).\n\
                 Our team will review the application and notify you once it has been approved.\n",
                library.owner.owner_name, library.name, library.address
            ),
        }
    }

    pub fn library_approved(library: &Library) -> Self {
        Self {
            to: library.owner.owner_email.clone(),
            subject: format!("{} has been approved", library.name),
            body: format!(
                "Hello {},\n\n\"{}\" is now live. You can sign in to set up seat types, \
                 seats and membership plans.\n",
                library.owner.owner_name, library.name
            ),
        }
    }

    pub fn library_rejected(library: &Library) -> Self {
        let reason = library
            .rejection_reason
            .as_deref()
            .unwrap_or("No reason was given.");
        Self {
            to: library.owner.owner_email.clone(),
            subject: format!("Update on your registration for {}", library.name),
            body: format!(
                "Hello {},\n\nUnfortunately \"{}\" could not be approved.\nReason: {}\n",
                library.owner.owner_name, library.name, reason
            ),
        }
    }

    // RFC 822 形式のメッセージ本文を組み立てる
    pub fn to_rfc822(&self, from: &str) -> String {
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\n{}",
            from, self.to, self.subject, self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        id::{LibraryId, UserId},
        library::{LibraryOwner, LibraryStatus},
    };
    use chrono::Utc;

    fn rejected_library(reason: Option<&str>) -> Library {
        Library {
            library_id: LibraryId::new(),
            name: "Quiet Corner".into(),
            description: String::new(),
            address: "2 Elm St".into(),
            city: "Shelbyville".into(),
            phone: "000".into(),
            email: "quiet@example.com".into(),
            status: LibraryStatus::Rejected,
            is_active: false,
            rejection_reason: reason.map(String::from),
            approved_at: None,
            created_at: Utc::now(),
            owner: LibraryOwner {
                owner_id: UserId::new(),
                owner_name: "Pat".into(),
                owner_email: "pat@example.com".into(),
            },
            opening_hours: vec![],
        }
    }

    #[test]
    fn rejection_mail_carries_reason() {
        let mail = MailMessage::library_rejected(&rejected_library(Some("Missing permit")));
        assert_eq!(mail.to, "pat@example.com");
        assert!(mail.body.contains("Missing permit"));
    }

    #[test]
    fn rfc822_has_headers_then_body() {
        let mail = MailMessage::library_rejected(&rejected_library(None));
        let raw = mail.to_rfc822("no-reply@example.com");
        assert!(raw.starts_with("From: no-reply@example.com\r\nTo: pat@example.com\r\n"));
        assert!(raw.contains("\r\n\r\nHello Pat"));
        assert!(raw.contains("No reason was given."));
    }
}
