//! Notification template rendering.
//!
//! Pure functions from notification data to subject + plain-text body, kept
//! separate from the transport so wording is testable without SMTP.

use mealbridge_core::Role;

use crate::{Notification, Recipient, SessionDetails};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub body: String,
}

/// Render a notification to subject + body.
pub fn render(notification: &Notification) -> RenderedMail {
    match notification {
        Notification::AccountApproved { recipient } => account_approved(recipient),
        Notification::AccountBlocked { recipient } => account_blocked(recipient),
        Notification::SessionStartedDonor { recipient, session } => {
            session_started_donor(recipient, session)
        }
        Notification::SessionStartedReceiver { recipient, session } => {
            session_started_receiver(recipient, session)
        }
    }
}

fn role_text(role: Role) -> &'static str {
    match role {
        Role::Donor => "Food Donor",
        Role::Receiver => "Food Receiver",
        Role::Superadmin => "Administrator",
    }
}

fn account_approved(recipient: &Recipient) -> RenderedMail {
    let next_step = match recipient.role {
        Role::Donor => "browse nearby food receivers and start donating",
        Role::Receiver => "receive food donations for your organization",
        Role::Superadmin => "manage the platform",
    };

    RenderedMail {
        subject: format!(
            "Your {} account is approved",
            role_text(recipient.role)
        ),
        body: format!(
            "Dear {} {},\n\n\
             Your account as a {} has been approved and is now active. \
             You can log in with your email and password and {}.\n\n\
             Thank you for joining our mission to reduce food waste.\n",
            recipient.first_name,
            recipient.last_name,
            role_text(recipient.role),
            next_step,
        ),
    }
}

fn account_blocked(recipient: &Recipient) -> RenderedMail {
    RenderedMail {
        subject: "Account access temporarily suspended".into(),
        body: format!(
            "Dear {} {},\n\n\
             Your account access has been temporarily suspended. If you \
             believe this is an error, please contact our support team.\n",
            recipient.first_name, recipient.last_name,
        ),
    }
}

fn contact_line(name: &str, email: &str, phone: Option<&str>) -> String {
    match phone {
        Some(phone) => format!("{name} <{email}> | {phone}"),
        None => format!("{name} <{email}>"),
    }
}

fn session_block(session: &SessionDetails, counterpart: String) -> String {
    let mut block = format!(
        "Session reference: {}\nCounterpart: {}\n",
        session.session_reference, counterpart,
    );
    if let Some(food) = &session.food_description {
        block.push_str(&format!("Food: {food}\n"));
    }
    if let Some(quantity) = &session.quantity {
        block.push_str(&format!("Quantity: {quantity}\n"));
    }
    block
}

fn session_started_donor(recipient: &Recipient, session: &SessionDetails) -> RenderedMail {
    RenderedMail {
        subject: format!("Donation session started - {}", session.session_reference),
        body: format!(
            "Dear {},\n\n\
             Your food donation session is now in progress.\n\n{}\n\
             Please coordinate with the receiver to complete the donation, \
             quoting the session reference above.\n",
            recipient.first_name,
            session_block(
                session,
                contact_line(
                    &session.receiver_name,
                    &session.receiver_email,
                    session.receiver_phone.as_deref(),
                ),
            ),
        ),
    }
}

fn session_started_receiver(recipient: &Recipient, session: &SessionDetails) -> RenderedMail {
    RenderedMail {
        subject: format!("New donation available - {}", session.session_reference),
        body: format!(
            "Dear {},\n\n\
             A new food donation session has been started for your \
             organization.\n\n{}\n\
             Please coordinate with the donor to arrange pickup or delivery, \
             quoting the session reference above.\n",
            recipient.first_name,
            session_block(
                session,
                contact_line(
                    &session.donor_name,
                    &session.donor_email,
                    session.donor_phone.as_deref(),
                ),
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(role: Role) -> Recipient {
        Recipient {
            email: "dana@example.org".into(),
            first_name: "Dana".into(),
            last_name: "Prasai".into(),
            role,
        }
    }

    fn session() -> SessionDetails {
        SessionDetails {
            session_reference: "DS-TEST-ABC123".into(),
            donor_name: "Dana Prasai".into(),
            donor_email: "dana@example.org".into(),
            donor_phone: Some("+977-1-5555".into()),
            receiver_name: "City Shelter".into(),
            receiver_email: "shelter@example.org".into(),
            receiver_phone: None,
            food_description: Some("Cooked rice and lentils".into()),
            quantity: Some("20 servings".into()),
        }
    }

    #[test]
    fn approved_mail_names_the_role() {
        let mail = render(&Notification::AccountApproved {
            recipient: recipient(Role::Donor),
        });
        assert!(mail.subject.contains("Food Donor"));
        assert!(mail.body.contains("Dana Prasai"));
        assert!(mail.body.contains("approved"));
    }

    #[test]
    fn approved_mail_differs_per_role() {
        let donor = render(&Notification::AccountApproved {
            recipient: recipient(Role::Donor),
        });
        let receiver = render(&Notification::AccountApproved {
            recipient: recipient(Role::Receiver),
        });
        assert_ne!(donor.body, receiver.body);
    }

    #[test]
    fn blocked_mail_mentions_suspension() {
        let mail = render(&Notification::AccountBlocked {
            recipient: recipient(Role::Receiver),
        });
        assert!(mail.subject.to_lowercase().contains("suspended"));
    }

    #[test]
    fn session_mails_carry_the_reference_and_counterpart() {
        let donor_mail = render(&Notification::SessionStartedDonor {
            recipient: recipient(Role::Donor),
            session: session(),
        });
        assert!(donor_mail.subject.contains("DS-TEST-ABC123"));
        assert!(donor_mail.body.contains("City Shelter"));
        assert!(donor_mail.body.contains("20 servings"));

        let receiver_mail = render(&Notification::SessionStartedReceiver {
            recipient: recipient(Role::Receiver),
            session: session(),
        });
        assert!(receiver_mail.body.contains("dana@example.org"));
        assert!(receiver_mail.body.contains("+977-1-5555"));
    }

    #[test]
    fn generated_references_slot_into_session_subjects() {
        let mut details = session();
        details.session_reference = mealbridge_core::session::session_reference();

        let mail = render(&Notification::SessionStartedDonor {
            recipient: recipient(Role::Donor),
            session: details.clone(),
        });
        assert!(mail.subject.ends_with(&details.session_reference));
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let mut details = session();
        details.food_description = None;
        details.quantity = None;

        let mail = render(&Notification::SessionStartedDonor {
            recipient: recipient(Role::Donor),
            session: details,
        });
        assert!(!mail.body.contains("Food:"));
        assert!(!mail.body.contains("Quantity:"));
    }
}
