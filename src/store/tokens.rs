use crate::domain::TokenRecord;
use async_trait::async_trait;
use std::sync::Mutex;

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, record: TokenRecord);
    async fn find_active_by_phone(&self, phone_number: &str) -> Option<TokenRecord>;
    /// Exact token match. Deliberately does not filter on `active`; callers
    /// must not assume a decoded token is still valid.
    async fn find_by_token(&self, token: &str) -> Option<TokenRecord>;
    async fn token_exists(&self, token: &str) -> bool;
    /// Flips `active` off for every row of the phone number. Returns how
    /// many rows were touched.
    async fn deactivate_by_phone(&self, phone_number: &str) -> usize;
}

#[derive(Default)]
pub struct MemoryTokenStore {
    records: Mutex<Vec<TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn insert(&self, record: TokenRecord) {
        let mut records = self.records.lock().expect("token store poisoned");
        records.push(record);
    }

    async fn find_active_by_phone(&self, phone_number: &str) -> Option<TokenRecord> {
        let records = self.records.lock().expect("token store poisoned");
        records
            .iter()
            .find(|record| record.active && record.phone_number == phone_number)
            .cloned()
    }

    async fn find_by_token(&self, token: &str) -> Option<TokenRecord> {
        let records = self.records.lock().expect("token store poisoned");
        records.iter().find(|record| record.token == token).cloned()
    }

    async fn token_exists(&self, token: &str) -> bool {
        let records = self.records.lock().expect("token store poisoned");
        records.iter().any(|record| record.token == token)
    }

    async fn deactivate_by_phone(&self, phone_number: &str) -> usize {
        let mut records = self.records.lock().expect("token store poisoned");
        let mut touched = 0;
        for record in records
            .iter_mut()
            .filter(|record| record.active && record.phone_number == phone_number)
        {
            record.active = false;
            touched += 1;
        }
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(phone: &str, token: &str) -> TokenRecord {
        TokenRecord::new(phone.to_string(), "+44".to_string(), token.to_string())
    }

    #[tokio::test]
    async fn active_lookup_skips_deactivated_rows() {
        let store = MemoryTokenStore::new();
        store.insert(record("+441632960067", "+44123456789")).await;

        assert!(store.find_active_by_phone("+441632960067").await.is_some());
        assert_eq!(store.deactivate_by_phone("+441632960067").await, 1);
        assert!(store.find_active_by_phone("+441632960067").await.is_none());
        assert_eq!(store.deactivate_by_phone("+441632960067").await, 0);
    }

    #[tokio::test]
    async fn token_lookup_ignores_active_flag() {
        let store = MemoryTokenStore::new();
        store.insert(record("+441632960067", "+44123456789")).await;
        store.deactivate_by_phone("+441632960067").await;

        // Invalidated rows still decode; validity is the caller's problem.
        let found = store.find_by_token("+44123456789").await.unwrap();
        assert!(!found.active);
        assert!(store.token_exists("+44123456789").await);
    }
}
