//! Database operations for messaging
//!
//! PostgreSQL backend of the conversation store. Queries are plain SQL with
//! bound parameters; rows are mapped onto the shared wire types by hand.

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::store::{StoreError, StoreResult};
use crate::shared::messaging::{
    ChatMessage, ClientSummary, Conversation, ConversationStatus, ListingSummary, Role,
    SenderSnapshot,
};

const CONVERSATION_COLUMNS: &str = r#"
    c.id, c.client_id, c.client_name, c.client_email, c.listing_id,
    l.title AS listing_title, l.address AS listing_address,
    c.last_message_at, c.client_unread_count, c.admin_unread_count,
    c.status, c.created_at
"#;

const MESSAGE_COLUMNS: &str = r#"
    id, conversation_id, sender_id, sender_name, sender_role,
    content, is_read, read_at, created_at
"#;

/// Postgres stores microseconds; truncate so returned values round-trip
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Counter column owned by `role`
fn unread_column(role: Role) -> &'static str {
    match role {
        Role::Client => "client_unread_count",
        Role::Admin => "admin_unread_count",
    }
}

fn count(row: &PgRow, column: &str) -> StoreResult<u32> {
    let value: i32 = row.try_get(column)?;
    Ok(value.max(0) as u32)
}

fn conversation_from_row(row: &PgRow) -> StoreResult<Conversation> {
    let listing_id: Option<Uuid> = row.try_get("listing_id")?;
    let listing = match listing_id {
        Some(id) => Some(ListingSummary {
            id,
            title: row.try_get::<Option<String>, _>("listing_title")?.unwrap_or_default(),
            address: row.try_get::<Option<String>, _>("listing_address")?.unwrap_or_default(),
        }),
        None => None,
    };

    let status: String = row.try_get("status")?;
    let status: ConversationStatus = status
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("unknown conversation status '{}'", status)))?;

    Ok(Conversation {
        id: row.try_get("id")?,
        client: ClientSummary {
            id: row.try_get("client_id")?,
            name: row.try_get("client_name")?,
            email: row.try_get("client_email")?,
        },
        listing,
        last_message_at: row.try_get("last_message_at")?,
        client_unread_count: count(row, "client_unread_count")?,
        admin_unread_count: count(row, "admin_unread_count")?,
        status,
        created_at: row.try_get("created_at")?,
    })
}

fn message_from_row(row: &PgRow) -> StoreResult<ChatMessage> {
    let role: String = row.try_get("sender_role")?;
    let role: Role = role
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("unknown sender role '{}'", role)))?;

    Ok(ChatMessage {
        id: row.try_get("id")?,
        conversation_id: row.try_get("conversation_id")?,
        sender: SenderSnapshot {
            id: row.try_get("sender_id")?,
            name: row.try_get("sender_name")?,
            role,
        },
        content: row.try_get("content")?,
        is_read: row.try_get("is_read")?,
        read_at: row.try_get("read_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register_listing(&self, listing: ListingSummary) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO listings (id, title, address)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title, address = EXCLUDED.address
            "#,
        )
        .bind(listing.id)
        .bind(&listing.title)
        .bind(&listing.address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_conversations(&self, user_id: Uuid, role: Role) -> StoreResult<Vec<Conversation>> {
        // Admins see every conversation; clients only their own
        let client_filter = if role.is_admin() { None } else { Some(user_id) };

        let rows = sqlx::query(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations c
            LEFT JOIN listings l ON l.id = c.listing_id
            WHERE c.status = 'active' AND ($1::uuid IS NULL OR c.client_id = $1)
            ORDER BY c.last_message_at DESC, c.created_at DESC
            "#
        ))
        .bind(client_filter)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(conversation_from_row).collect()
    }

    pub async fn find_conversation(&self, conversation_id: Uuid) -> StoreResult<Conversation> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations c
            LEFT JOIN listings l ON l.id = c.listing_id
            WHERE c.id = $1
            "#
        ))
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("conversation"))?;

        conversation_from_row(&row)
    }

    pub async fn open_conversation(
        &self,
        client: ClientSummary,
        listing_id: Option<Uuid>,
    ) -> StoreResult<(Conversation, bool)> {
        if let Some(listing_id) = listing_id {
            let exists = sqlx::query("SELECT 1 FROM listings WHERE id = $1")
                .bind(listing_id)
                .fetch_optional(&self.pool)
                .await?;
            if exists.is_none() {
                return Err(StoreError::NotFound("listing"));
            }
        }

        let created_at = now();
        // The partial unique indexes turn a concurrent second insert into a no-op
        let inserted = sqlx::query(
            r#"
            INSERT INTO conversations (id, client_id, client_name, client_email, listing_id,
                                       last_message_at, client_unread_count, admin_unread_count,
                                       status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, 0, 'active', $6)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(listing_id)
        .bind(created_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        let row = sqlx::query(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations c
            LEFT JOIN listings l ON l.id = c.listing_id
            WHERE c.client_id = $1 AND c.listing_id IS NOT DISTINCT FROM $2
            "#
        ))
        .bind(client.id)
        .bind(listing_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("conversation"))?;

        Ok((conversation_from_row(&row)?, inserted == 0))
    }

    pub async fn list_messages(&self, conversation_id: Uuid) -> StoreResult<Vec<ChatMessage>> {
        // Distinguish "no messages" from "no conversation"
        self.find_conversation(conversation_id).await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, seq ASC
            "#
        ))
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(message_from_row).collect()
    }

    pub async fn read_messages(&self, conversation_id: Uuid, reader: Role) -> StoreResult<Vec<ChatMessage>> {
        let mut tx = self.pool.begin().await?;

        // Holding the row lock keeps appends out until the marks are committed
        let locked = sqlx::query("SELECT id FROM conversations WHERE id = $1 FOR UPDATE")
            .bind(conversation_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound("conversation"));
        }

        let rows = sqlx::query(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, seq ASC
            "#
        ))
        .bind(conversation_id)
        .fetch_all(&mut *tx)
        .await?;
        let snapshot = rows.iter().map(message_from_row).collect::<StoreResult<Vec<_>>>()?;

        let sender_role = reader.other();
        let seen: Vec<Uuid> = snapshot
            .iter()
            .filter(|m| m.sender.role == sender_role && !m.is_read)
            .map(|m| m.id)
            .collect();

        sqlx::query("UPDATE messages SET is_read = TRUE, read_at = $2 WHERE id = ANY($1)")
            .bind(&seen)
            .bind(now())
            .execute(&mut *tx)
            .await?;

        sqlx::query(&format!(
            r#"
            UPDATE conversations SET {} = (
                SELECT COUNT(*)::int FROM messages
                WHERE conversation_id = $1 AND NOT is_read AND sender_role = $2)
            WHERE id = $1
            "#,
            unread_column(reader)
        ))
        .bind(conversation_id)
        .bind(sender_role.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(snapshot)
    }

    pub async fn mark_read(&self, conversation_id: Uuid, reader: Role) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(&format!(
            "UPDATE conversations SET {} = 0 WHERE id = $1",
            unread_column(reader)
        ))
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StoreError::NotFound("conversation"));
        }

        sqlx::query(
            r#"
            UPDATE messages SET is_read = TRUE, read_at = $2
            WHERE conversation_id = $1 AND sender_role = $3 AND NOT is_read
            "#,
        )
        .bind(conversation_id)
        .bind(now())
        .bind(reader.other().as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn append_message(
        &self,
        conversation_id: Uuid,
        sender: SenderSnapshot,
        content: String,
    ) -> StoreResult<ChatMessage> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("SELECT id FROM conversations WHERE id = $1 FOR UPDATE")
            .bind(conversation_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound("conversation"));
        }

        let newest: Option<DateTime<Utc>> =
            sqlx::query("SELECT MAX(created_at) AS newest FROM messages WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_one(&mut *tx)
                .await?
                .try_get("newest")?;

        let mut message = ChatMessage::new_text(conversation_id, sender, content);
        // Timestamps stay monotonic per conversation even if the clock steps back
        message.created_at = match newest {
            Some(newest) => now().max(newest),
            None => now(),
        };

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, sender_name, sender_role,
                                  content, is_read, read_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, NULL, $7)
            "#,
        )
        .bind(message.id)
        .bind(conversation_id)
        .bind(message.sender.id)
        .bind(&message.sender.name)
        .bind(message.sender.role.as_str())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        let column = unread_column(message.sender.role.other());
        sqlx::query(&format!(
            "UPDATE conversations SET last_message_at = $2, {column} = {column} + 1 WHERE id = $1"
        ))
        .bind(conversation_id)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(message)
    }

    pub async fn delete_message(&self, message_id: Uuid) -> StoreResult<ChatMessage> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "DELETE FROM messages WHERE id = $1 RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(message_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound("message"))?;
        let removed = message_from_row(&row)?;

        sqlx::query(
            r#"
            UPDATE conversations SET
                client_unread_count = (
                    SELECT COUNT(*)::int FROM messages
                    WHERE conversation_id = $1 AND NOT is_read AND sender_role = 'admin'),
                admin_unread_count = (
                    SELECT COUNT(*)::int FROM messages
                    WHERE conversation_id = $1 AND NOT is_read AND sender_role = 'client'),
                last_message_at = COALESCE(
                    (SELECT MAX(created_at) FROM messages WHERE conversation_id = $1),
                    last_message_at)
            WHERE id = $1
            "#,
        )
        .bind(removed.conversation_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(removed)
    }

    pub async fn clear_messages(&self, conversation_id: Uuid) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE conversations
            SET client_unread_count = 0, admin_unread_count = 0, last_message_at = created_at
            WHERE id = $1
            "#,
        )
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StoreError::NotFound("conversation"));
        }

        let deleted = sqlx::query("DELETE FROM messages WHERE conversation_id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted)
    }

    pub async fn set_status(&self, conversation_id: Uuid, status: ConversationStatus) -> StoreResult<Conversation> {
        let updated = sqlx::query("UPDATE conversations SET status = $2 WHERE id = $1")
            .bind(conversation_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(StoreError::NotFound("conversation"));
        }

        self.find_conversation(conversation_id).await
    }
}
