use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Message entre deux utilisateurs, éventuellement rattaché à une annonce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewMessage {
    pub receiver_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    #[validate(length(min = 1, max = 2000, message = "Le message doit contenir entre 1 et 2000 caractères"))]
    pub content: String,
}

/// Résumé d'une conversation pour la boîte de réception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub counterpart_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub last_message: Message,
    pub unread_count: i64,
}

impl Message {
    pub fn new(sender_id: Uuid, request: NewMessage, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id: request.vehicle_id,
            sender_id,
            receiver_id: request.receiver_id,
            content: request.content.trim().to_string(),
            is_read: false,
            created_at: now,
        }
    }

    /// L'autre participant, vu depuis `user_id`
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// Appartient à la conversation (user, counterpart, vehicle)
    pub fn in_thread(&self, user_id: Uuid, counterpart_id: Uuid, vehicle_id: Option<Uuid>) -> bool {
        self.vehicle_id == vehicle_id
            && ((self.sender_id == user_id && self.receiver_id == counterpart_id)
                || (self.sender_id == counterpart_id && self.receiver_id == user_id))
    }
}

/// Regroupe les messages d'un utilisateur par conversation, la plus récente d'abord
pub fn summarize_conversations(user_id: Uuid, messages: &[Message]) -> Vec<ConversationSummary> {
    let mut conversations: HashMap<(Uuid, Option<Uuid>), ConversationSummary> = HashMap::new();

    for message in messages.iter().filter(|m| m.involves(user_id)) {
        let key = (message.counterpart(user_id), message.vehicle_id);
        let unread = i64::from(message.receiver_id == user_id && !message.is_read);

        conversations
            .entry(key)
            .and_modify(|summary| {
                summary.unread_count += unread;
                if message.created_at > summary.last_message.created_at {
                    summary.last_message = message.clone();
                }
            })
            .or_insert_with(|| ConversationSummary {
                counterpart_id: key.0,
                vehicle_id: key.1,
                last_message: message.clone(),
                unread_count: unread,
            });
    }

    let mut summaries: Vec<ConversationSummary> = conversations.into_values().collect();
    summaries.sort_by(|a, b| b.last_message.created_at.cmp(&a.last_message.created_at));
    summaries
}
