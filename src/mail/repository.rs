//! Mail repository for Plaza.

use sqlx::SqlitePool;

use super::types::{Message, MessageRow, MessageWithParty, NewMessage};
use crate::db::UserSummary;
use crate::{PlazaError, Result};

/// Database row for a message joined with its counterparty.
#[derive(sqlx::FromRow)]
struct MessageWithPartyRow {
    id: i64,
    sender_id: i64,
    recipient_id: i64,
    subject: String,
    body: String,
    status: String,
    sent_at: String,
    read_at: Option<String>,
    party_id: i64,
    party_username: String,
}

impl From<MessageWithPartyRow> for MessageWithParty {
    fn from(row: MessageWithPartyRow) -> Self {
        let party = UserSummary {
            id: row.party_id,
            username: row.party_username,
        };
        let message = Message::from(MessageRow {
            id: row.id,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            subject: row.subject,
            body: row.body,
            status: row.status,
            sent_at: row.sent_at,
            read_at: row.read_at,
        });
        Self { message, party }
    }
}

/// Repository for mail operations.
pub struct MessageRepository;

impl MessageRepository {
    /// Create a new mail with status `sent`.
    pub async fn create(pool: &SqlitePool, message: &NewMessage) -> Result<Message> {
        let result = sqlx::query(
            "INSERT INTO messages (sender_id, recipient_id, subject, body, status)
             VALUES (?, ?, ?, ?, 'sent')",
        )
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.subject)
        .bind(&message.body)
        .execute(pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| PlazaError::NotFound("message".to_string()))
    }

    /// Get a mail by ID.
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Message>> {
        let result = sqlx::query_as::<_, MessageRow>(
            "SELECT id, sender_id, recipient_id, subject, body, status, sent_at, read_at
             FROM messages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.map(Message::from))
    }

    /// List received mails for a user, newest first, with the sender attached.
    pub async fn list_inbox(pool: &SqlitePool, user_id: i64) -> Result<Vec<MessageWithParty>> {
        let rows = sqlx::query_as::<_, MessageWithPartyRow>(
            "SELECT m.id, m.sender_id, m.recipient_id, m.subject, m.body, m.status,
                    m.sent_at, m.read_at, u.id AS party_id, u.username AS party_username
             FROM messages m
             JOIN users u ON u.id = m.sender_id
             WHERE m.recipient_id = ?
             ORDER BY m.sent_at DESC, m.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(MessageWithParty::from).collect())
    }

    /// List sent mails for a user, newest first, with the recipient attached.
    pub async fn list_outbox(pool: &SqlitePool, user_id: i64) -> Result<Vec<MessageWithParty>> {
        let rows = sqlx::query_as::<_, MessageWithPartyRow>(
            "SELECT m.id, m.sender_id, m.recipient_id, m.subject, m.body, m.status,
                    m.sent_at, m.read_at, u.id AS party_id, u.username AS party_username
             FROM messages m
             JOIN users u ON u.id = m.recipient_id
             WHERE m.sender_id = ?
             ORDER BY m.sent_at DESC, m.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(MessageWithParty::from).collect())
    }

    /// Transition a mail to `read`, setting `read_at` exactly once.
    ///
    /// The `status <> 'read'` guard makes the transition atomic: of two
    /// concurrent calls only one row update wins, and the stored
    /// `read_at` never changes afterwards. Returns true if this call
    /// performed the transition.
    pub async fn mark_read(pool: &SqlitePool, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE messages
             SET status = 'read', read_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             WHERE id = ? AND status <> 'read'",
        )
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count unread mails for a user.
    pub async fn count_unread(pool: &SqlitePool, user_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = ? AND status <> 'read'",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(count.0)
    }

    /// Count total mails in the database.
    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(pool)
            .await
            .map_err(|e| PlazaError::Database(e.to_string()))?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::mail::MessageStatus;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    async fn create_test_users(db: &Database) -> (i64, i64) {
        let repo = UserRepository::new(db.pool());
        let id1 = repo.create(&NewUser::new("alice", "hash")).await.unwrap().id;
        let id2 = repo.create(&NewUser::new("bob", "hash")).await.unwrap().id;
        (id1, id2)
    }

    #[tokio::test]
    async fn test_create_message() {
        let db = setup_db().await;
        let (sender_id, recipient_id) = create_test_users(&db).await;

        let new_message = NewMessage::new(sender_id, recipient_id, "Hello", "How are you?");
        let message = MessageRepository::create(db.pool(), &new_message)
            .await
            .unwrap();

        assert!(message.id > 0);
        assert_eq!(message.sender_id, sender_id);
        assert_eq!(message.recipient_id, recipient_id);
        assert_eq!(message.subject, "Hello");
        assert_eq!(message.body, "How are you?");
        assert_eq!(message.status, MessageStatus::Sent);
        assert!(message.read_at.is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = setup_db().await;
        let result = MessageRepository::get_by_id(db.pool(), 999).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_inbox_order_and_party() {
        let db = setup_db().await;
        let (sender_id, recipient_id) = create_test_users(&db).await;

        MessageRepository::create(
            db.pool(),
            &NewMessage::new(sender_id, recipient_id, "Mail 1", "Body 1"),
        )
        .await
        .unwrap();
        MessageRepository::create(
            db.pool(),
            &NewMessage::new(sender_id, recipient_id, "Mail 2", "Body 2"),
        )
        .await
        .unwrap();

        let inbox = MessageRepository::list_inbox(db.pool(), recipient_id)
            .await
            .unwrap();
        assert_eq!(inbox.len(), 2);
        // Most recent first
        assert_eq!(inbox[0].message.subject, "Mail 2");
        assert_eq!(inbox[1].message.subject, "Mail 1");
        // Inbox entries carry the sender
        assert_eq!(inbox[0].party.username, "alice");
    }

    #[tokio::test]
    async fn test_inbox_only_contains_received() {
        let db = setup_db().await;
        let (sender_id, recipient_id) = create_test_users(&db).await;

        MessageRepository::create(
            db.pool(),
            &NewMessage::new(sender_id, recipient_id, "Mail", "Body"),
        )
        .await
        .unwrap();

        let sender_inbox = MessageRepository::list_inbox(db.pool(), sender_id)
            .await
            .unwrap();
        assert!(sender_inbox.is_empty());

        let recipient_outbox = MessageRepository::list_outbox(db.pool(), recipient_id)
            .await
            .unwrap();
        assert!(recipient_outbox.is_empty());
    }

    #[tokio::test]
    async fn test_list_outbox_party_is_recipient() {
        let db = setup_db().await;
        let (sender_id, recipient_id) = create_test_users(&db).await;

        MessageRepository::create(
            db.pool(),
            &NewMessage::new(sender_id, recipient_id, "Sent Mail", "Body"),
        )
        .await
        .unwrap();

        let outbox = MessageRepository::list_outbox(db.pool(), sender_id)
            .await
            .unwrap();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].party.username, "bob");
    }

    #[tokio::test]
    async fn test_mark_read_sets_stable_read_at() {
        let db = setup_db().await;
        let (sender_id, recipient_id) = create_test_users(&db).await;

        let message = MessageRepository::create(
            db.pool(),
            &NewMessage::new(sender_id, recipient_id, "Mail", "Body"),
        )
        .await
        .unwrap();

        assert!(MessageRepository::mark_read(db.pool(), message.id)
            .await
            .unwrap());

        let read = MessageRepository::get_by_id(db.pool(), message.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read.status, MessageStatus::Read);
        let first_read_at = read.read_at.unwrap();

        // Second transition is a no-op and read_at stays put
        assert!(!MessageRepository::mark_read(db.pool(), message.id)
            .await
            .unwrap());
        let again = MessageRepository::get_by_id(db.pool(), message.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.read_at.unwrap(), first_read_at);
    }

    #[tokio::test]
    async fn test_count_unread() {
        let db = setup_db().await;
        let (sender_id, recipient_id) = create_test_users(&db).await;

        assert_eq!(
            MessageRepository::count_unread(db.pool(), recipient_id)
                .await
                .unwrap(),
            0
        );

        MessageRepository::create(
            db.pool(),
            &NewMessage::new(sender_id, recipient_id, "Mail 1", "Body"),
        )
        .await
        .unwrap();
        let mail2 = MessageRepository::create(
            db.pool(),
            &NewMessage::new(sender_id, recipient_id, "Mail 2", "Body"),
        )
        .await
        .unwrap();

        assert_eq!(
            MessageRepository::count_unread(db.pool(), recipient_id)
                .await
                .unwrap(),
            2
        );

        MessageRepository::mark_read(db.pool(), mail2.id).await.unwrap();

        assert_eq!(
            MessageRepository::count_unread(db.pool(), recipient_id)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_count() {
        let db = setup_db().await;
        let (sender_id, recipient_id) = create_test_users(&db).await;

        assert_eq!(MessageRepository::count(db.pool()).await.unwrap(), 0);

        MessageRepository::create(
            db.pool(),
            &NewMessage::new(sender_id, recipient_id, "Mail", "Body"),
        )
        .await
        .unwrap();

        assert_eq!(MessageRepository::count(db.pool()).await.unwrap(), 1);
    }
}
