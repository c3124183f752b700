// core/message_service.rs
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::message::summarize_conversations;
use crate::domain::{ConversationSummary, Message, NewMessage, User};
use crate::infrastructure::repositories::{MessageRepository, UserRepository, VehicleRepository};
use crate::utils::error::{AppError, Result};

/// Messagerie simple entre acheteurs et vendeurs
pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    vehicles: Arc<dyn VehicleRepository>,
}

impl MessageService {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        vehicles: Arc<dyn VehicleRepository>,
    ) -> Self {
        Self {
            messages,
            users,
            vehicles,
        }
    }

    /// Envoi d'un message ; l'expéditeur doit être actif
    pub async fn send(&self, sender: &User, request: NewMessage) -> Result<Message> {
        request.validate()?;

        if sender.is_suspended {
            return Err(AppError::Forbidden("Compte suspendu".to_string()));
        }
        if request.receiver_id == sender.id {
            return Err(AppError::Validation(
                "Impossible de s'envoyer un message".to_string(),
            ));
        }
        if self.users.get(request.receiver_id).await?.is_none() {
            return Err(AppError::UserNotFound);
        }
        if let Some(vehicle_id) = request.vehicle_id {
            self.vehicles
                .get(vehicle_id)
                .await?
                .ok_or(AppError::VehicleNotFound)?;
        }
        if request.content.trim().is_empty() {
            return Err(AppError::Validation("Le message est vide".to_string()));
        }

        let message = Message::new(sender.id, request, Utc::now());
        self.messages.insert(&message).await?;
        Ok(message)
    }

    pub async fn conversations(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>> {
        let messages = self.messages.list_for_user(user_id).await?;
        Ok(summarize_conversations(user_id, &messages))
    }

    /// Messages d'une conversation, du plus ancien au plus récent
    pub async fn thread(
        &self,
        user_id: Uuid,
        counterpart_id: Uuid,
        vehicle_id: Option<Uuid>,
    ) -> Result<Vec<Message>> {
        Ok(self
            .messages
            .list_for_user(user_id)
            .await?
            .into_iter()
            .filter(|m| m.in_thread(user_id, counterpart_id, vehicle_id))
            .collect())
    }

    pub async fn mark_read(
        &self,
        user_id: Uuid,
        counterpart_id: Uuid,
        vehicle_id: Option<Uuid>,
    ) -> Result<u64> {
        self.messages
            .mark_thread_read(user_id, counterpart_id, vehicle_id)
            .await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        self.messages.count_unread(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::Repositories;

    async fn setup() -> (MessageService, User, User) {
        let repos = Repositories::in_memory();
        let now = Utc::now();
        let alice = User::from_identity(Uuid::new_v4(), "alice@example.com".into(), now);
        let bob = User::from_identity(Uuid::new_v4(), "bob@example.com".into(), now);
        repos.users.save(&alice).await.unwrap();
        repos.users.save(&bob).await.unwrap();

        let service = MessageService::new(
            repos.messages.clone(),
            repos.users.clone(),
            repos.vehicles.clone(),
        );
        (service, alice, bob)
    }

    fn to(receiver: &User, content: &str) -> NewMessage {
        NewMessage {
            receiver_id: receiver.id,
            vehicle_id: None,
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn test_cannot_message_self() {
        let (service, alice, _) = setup().await;
        assert!(matches!(
            service.send(&alice, to(&alice, "Coucou")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_suspended_sender_forbidden() {
        let (service, mut alice, bob) = setup().await;
        alice.suspend("Spam".into(), Utc::now());
        assert!(matches!(
            service.send(&alice, to(&bob, "Achetez !")).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_vehicle_rejected() {
        let (service, alice, bob) = setup().await;
        let mut request = to(&bob, "Dispo ?");
        request.vehicle_id = Some(Uuid::new_v4());
        assert!(matches!(
            service.send(&alice, request).await,
            Err(AppError::VehicleNotFound)
        ));
    }

    #[tokio::test]
    async fn test_read_flow() {
        let (service, alice, bob) = setup().await;
        service.send(&alice, to(&bob, "Bonjour")).await.unwrap();
        service.send(&alice, to(&bob, "Toujours dispo ?")).await.unwrap();
        service.send(&bob, to(&alice, "Oui")).await.unwrap();

        assert_eq!(service.unread_count(bob.id).await.unwrap(), 2);
        let conversations = service.conversations(bob.id).await.unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].unread_count, 2);

        let thread = service.thread(bob.id, alice.id, None).await.unwrap();
        assert_eq!(thread.len(), 3);
        assert_eq!(thread[0].content, "Bonjour");

        assert_eq!(service.mark_read(bob.id, alice.id, None).await.unwrap(), 2);
        assert_eq!(service.unread_count(bob.id).await.unwrap(), 0);
        assert_eq!(service.unread_count(alice.id).await.unwrap(), 1);
    }
}
