use crate::domain::{Notification, OperationType};
use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn add(&self, notification: Notification);
    async fn remove(&self, id: Uuid) -> Option<Notification>;
    async fn filter_by_kind(&self, kinds: &[OperationType]) -> Vec<Notification>;
}

#[derive(Default)]
pub struct MemoryNotificationStore {
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn add(&self, notification: Notification) {
        let mut notifications = self.notifications.lock().expect("notification store poisoned");
        notifications.push(notification);
    }

    async fn remove(&self, id: Uuid) -> Option<Notification> {
        let mut notifications = self.notifications.lock().expect("notification store poisoned");
        let index = notifications.iter().position(|n| n.id == id)?;
        Some(notifications.remove(index))
    }

    async fn filter_by_kind(&self, kinds: &[OperationType]) -> Vec<Notification> {
        let notifications = self.notifications.lock().expect("notification store poisoned");
        notifications
            .iter()
            .filter(|n| n.operation_type.map_or(false, |kind| kinds.contains(&kind)))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removal_is_functional_not_a_stub() {
        let store = MemoryNotificationStore::new();
        let notification = Notification::new(
            "cash-in rejected".to_string(),
            Some(OperationType::CashIn),
            None,
        );
        let id = notification.id;
        store.add(notification).await;

        assert!(store.remove(id).await.is_some());
        assert!(store.remove(id).await.is_none());
        assert!(store.filter_by_kind(&[OperationType::CashIn]).await.is_empty());
    }

    #[tokio::test]
    async fn filter_skips_untyped_notifications() {
        let store = MemoryNotificationStore::new();
        store
            .add(Notification::new("untyped".to_string(), None, Some(1234)))
            .await;
        store
            .add(Notification::new(
                "merchant".to_string(),
                Some(OperationType::MerchantPayment),
                None,
            ))
            .await;

        let merchant = store
            .filter_by_kind(&[OperationType::MerchantPayment])
            .await;
        assert_eq!(merchant.len(), 1);
        assert!(store.filter_by_kind(&[OperationType::CashIn]).await.is_empty());
    }
}
