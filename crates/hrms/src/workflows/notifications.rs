//! In-app notifications and workflow mail composed on every status change.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::directory::{Employee, EmployeeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LeaveStatus,
    TourStatus,
    CompOffStatus,
    AttendanceRegularization,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::LeaveStatus => "Leave Status",
            Self::TourStatus => "Tour Status",
            Self::CompOffStatus => "Comp Off Status",
            Self::AttendanceRegularization => "Attendance Regularization",
        }
    }

    const fn route_prefix(self) -> &'static str {
        match self {
            Self::LeaveStatus => "/leave",
            Self::TourStatus => "/tour",
            Self::CompOffStatus => "/comp-off",
            Self::AttendanceRegularization => "/attendance/regularization",
        }
    }

    fn message(self, reference: &str, status: &str) -> String {
        match self {
            Self::LeaveStatus => format!("Leave application '{reference}' has been {status}."),
            Self::TourStatus => format!("Tour '{reference}' has been {status}."),
            Self::CompOffStatus => {
                format!("Compensatory off for {reference} has been {status}.")
            }
            Self::AttendanceRegularization => {
                format!("Attendance regularization for {reference} has been {status}.")
            }
        }
    }
}

/// In-app notification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub sender: EmployeeId,
    pub receiver: EmployeeId,
    pub message: String,
    pub kind: NotificationKind,
    pub related_id: String,
    pub target_url: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

/// Outbound mail rendered for a workflow event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Everything one status change fans out to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outbound {
    pub notification: Option<Notification>,
    pub emails: Vec<EmailMessage>,
}

/// Inputs describing one workflow status change.
#[derive(Debug, Clone)]
pub struct StatusNotice<'a> {
    pub kind: NotificationKind,
    pub related_id: &'a str,
    pub reference: &'a str,
    pub slug: &'a str,
    pub status: &'a str,
    pub actor: &'a Employee,
    pub applicant: &'a Employee,
    pub manager: Option<&'a Employee>,
    pub at: NaiveDateTime,
}

static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_notification_id() -> String {
    let id = NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("ntf-{id:06}")
}

/// The applicant's own actions notify the manager; everyone else's notify the applicant.
pub fn compose(notice: &StatusNotice<'_>) -> Outbound {
    let message = notice.kind.message(notice.reference, notice.status);
    let receiver = if notice.actor.id == notice.applicant.id {
        notice.manager.map(|manager| manager.id.clone())
    } else {
        Some(notice.applicant.id.clone())
    };

    let notification = receiver.map(|receiver| Notification {
        id: next_notification_id(),
        sender: notice.actor.id.clone(),
        receiver,
        message: message.clone(),
        kind: notice.kind,
        related_id: notice.related_id.to_string(),
        target_url: format!("{}/{}/", notice.kind.route_prefix(), notice.slug),
        is_read: false,
        created_at: notice.at,
    });

    let subject = format!("{} update: {}", notice.kind.label(), notice.reference);
    let mut emails = vec![render_email(notice, notice.applicant, &subject, &message)];
    if let Some(manager) = notice.manager {
        if manager.id != notice.applicant.id {
            emails.push(render_email(notice, manager, &subject, &message));
        }
    }

    Outbound {
        notification,
        emails,
    }
}

fn render_email(
    notice: &StatusNotice<'_>,
    recipient: &Employee,
    subject: &str,
    message: &str,
) -> EmailMessage {
    EmailMessage {
        to: recipient.mailbox().to_string(),
        subject: subject.to_string(),
        body: format!(
            "Hello {},\n\n{}\n\nActioned by {} on {}.",
            recipient.full_name,
            message,
            notice.actor.full_name,
            notice.at.format("%Y-%m-%d %H:%M")
        ),
    }
}

/// Trait describing outbound notification hooks (in-app inbox, SMTP relay, push gateway).
pub trait NotificationPublisher: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotificationError>;
    fn email(&self, message: EmailMessage) -> Result<(), NotificationError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

pub fn dispatch<N>(publisher: &N, outbound: Outbound) -> Result<(), NotificationError>
where
    N: NotificationPublisher + ?Sized,
{
    if let Some(notification) = outbound.notification {
        publisher.notify(notification)?;
    }
    for email in outbound.emails {
        publisher.email(email)?;
    }
    Ok(())
}
