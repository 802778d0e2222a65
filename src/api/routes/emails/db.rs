//! Database queries for the emails API
use anyhow::{Error, Result};
use chrono::Utc;
use rusqlite::OptionalExtension;
use tokio_rusqlite::{Connection, params};

use super::public::{
    EmailResponse, Mailbox, STORED_TIMESTAMP_FORMAT, UpdateEmailRequest, format_timestamp,
};

#[derive(Debug, PartialEq, Eq)]
pub enum ComposeOutcome {
    /// One copy was written per participant
    Sent { copies: usize },
    /// Nothing was written because this address has no account
    UnknownRecipient(String),
}

const EMAIL_COLUMNS: &str = r"
    e.id,
    sender.email,
    e.subject,
    e.body,
    e.timestamp,
    e.read,
    e.archived
";

fn email_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmailResponse> {
    let timestamp: String = row.get(4)?;
    Ok(EmailResponse {
        id: row.get(0)?,
        sender: row.get(1)?,
        recipients: vec![],
        subject: row.get(2)?,
        body: row.get(3)?,
        timestamp: format_timestamp(&timestamp),
        read: row.get(5)?,
        archived: row.get(6)?,
    })
}

fn attach_recipients(
    conn: &rusqlite::Connection,
    emails: &mut [EmailResponse],
) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(
        r"
        SELECT u.email
        FROM email_recipient r
        JOIN user_account u ON u.id = r.user_id
        WHERE r.email_id = ?1
        ORDER BY r.id
        ",
    )?;
    for email in emails.iter_mut() {
        email.recipients = stmt
            .query_map([email.id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
    }
    Ok(())
}

/// Write one copy of the message into the mailbox of the sender and
/// of every recipient. Recipients are resolved before anything is
/// written and the whole thing runs in a single transaction.
pub async fn send_email(
    db: &Connection,
    sender_id: i64,
    addresses: Vec<String>,
    subject: String,
    body: String,
) -> Result<ComposeOutcome, Error> {
    let outcome = db
        .call(move |conn| {
            let tx = conn.transaction()?;

            let mut recipient_ids: Vec<i64> = Vec::with_capacity(addresses.len());
            {
                let mut find_user = tx.prepare("SELECT id FROM user_account WHERE email = ?1")?;
                for address in &addresses {
                    let user_id: Option<i64> = find_user
                        .query_row([address], |row| row.get(0))
                        .optional()?;
                    match user_id {
                        Some(id) if !recipient_ids.contains(&id) => recipient_ids.push(id),
                        Some(_) => {}
                        None => return Ok(ComposeOutcome::UnknownRecipient(address.clone())),
                    }
                }
            }

            // Sender first, then each recipient exactly once
            let mut participants = vec![sender_id];
            for id in &recipient_ids {
                if !participants.contains(id) {
                    participants.push(*id);
                }
            }

            let timestamp = Utc::now().format(STORED_TIMESTAMP_FORMAT).to_string();
            {
                let mut insert_email = tx.prepare(
                    r"
                    INSERT INTO email (user_id, sender_id, subject, body, timestamp, read, archived)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
                    ",
                )?;
                let mut insert_recipient =
                    tx.prepare("INSERT INTO email_recipient (email_id, user_id) VALUES (?1, ?2)")?;

                for owner_id in &participants {
                    insert_email.execute(params![
                        owner_id,
                        sender_id,
                        &subject,
                        &body,
                        &timestamp,
                        *owner_id == sender_id,
                    ])?;
                    let email_id = tx.last_insert_rowid();
                    for recipient_id in &recipient_ids {
                        insert_recipient.execute(params![email_id, recipient_id])?;
                    }
                }
            }
            tx.commit()?;

            Ok(ComposeOutcome::Sent {
                copies: participants.len(),
            })
        })
        .await?;

    Ok(outcome)
}

/// Find an email in the owner's mailbox. Emails belonging to anyone
/// else are treated as missing.
pub async fn find_email(
    db: &Connection,
    owner_id: i64,
    email_id: i64,
) -> Result<Option<EmailResponse>, Error> {
    let email = db
        .call(move |conn| {
            let sql = format!(
                r"
                SELECT {EMAIL_COLUMNS}
                FROM email e
                JOIN user_account sender ON sender.id = e.sender_id
                WHERE e.user_id = ?1 AND e.id = ?2
                "
            );
            let email = conn
                .query_row(&sql, params![owner_id, email_id], email_from_row)
                .optional()?;
            let Some(email) = email else {
                return Ok(None);
            };
            let mut emails = [email];
            attach_recipients(conn, &mut emails)?;
            let [email] = emails;
            Ok(Some(email))
        })
        .await?;
    Ok(email)
}

/// Apply a partial flag update. Returns false when the email isn't in
/// the owner's mailbox.
pub async fn update_email_flags(
    db: &Connection,
    owner_id: i64,
    email_id: i64,
    update: UpdateEmailRequest,
) -> Result<bool, Error> {
    let found = db
        .call(move |conn| {
            let updated = conn.execute(
                r"
                UPDATE email
                SET read = COALESCE(?3, read),
                    archived = COALESCE(?4, archived)
                WHERE user_id = ?1 AND id = ?2
                ",
                params![owner_id, email_id, update.read, update.archived],
            )?;
            Ok(updated > 0)
        })
        .await?;
    Ok(found)
}

/// List a mailbox newest first.
pub async fn list_mailbox(
    db: &Connection,
    owner_id: i64,
    mailbox: Mailbox,
) -> Result<Vec<EmailResponse>, Error> {
    let filter = match mailbox {
        Mailbox::Inbox => {
            "e.archived = 0 AND EXISTS (SELECT 1 FROM email_recipient r WHERE r.email_id = e.id AND r.user_id = ?1)"
        }
        Mailbox::Archive => {
            "e.archived = 1 AND EXISTS (SELECT 1 FROM email_recipient r WHERE r.email_id = e.id AND r.user_id = ?1)"
        }
        Mailbox::Sent => "e.sender_id = ?1",
    };

    let emails = db
        .call(move |conn| {
            let sql = format!(
                r"
                SELECT {EMAIL_COLUMNS}
                FROM email e
                JOIN user_account sender ON sender.id = e.sender_id
                WHERE e.user_id = ?1 AND {filter}
                ORDER BY e.timestamp DESC, e.id DESC
                "
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut emails = stmt
                .query_map([owner_id], email_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            attach_recipients(conn, &mut emails)?;
            Ok(emails)
        })
        .await?;
    Ok(emails)
}
