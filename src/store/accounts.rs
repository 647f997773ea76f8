use crate::domain::Account;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: Account);
    async fn find_by_phone(&self, phone_number: &str) -> Option<Account>;
    async fn find_by_otp(&self, otp: u32) -> Option<Account>;
    async fn otp_in_use(&self, otp: u32) -> bool;
    async fn remove_by_otp(&self, otp: u32) -> Option<Account>;
    /// Deletes every account. Returns how many were dropped.
    async fn clear(&self) -> usize;
}

/// Accounts keyed by OTP; the map key is what enforces the one-account-per-OTP
/// invariant.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<u32, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: Account) {
        let mut accounts = self.accounts.lock().expect("account store poisoned");
        accounts.insert(account.otp, account);
    }

    async fn find_by_phone(&self, phone_number: &str) -> Option<Account> {
        let accounts = self.accounts.lock().expect("account store poisoned");
        accounts
            .values()
            .find(|account| account.phone_number == phone_number)
            .cloned()
    }

    async fn find_by_otp(&self, otp: u32) -> Option<Account> {
        let accounts = self.accounts.lock().expect("account store poisoned");
        accounts.get(&otp).cloned()
    }

    async fn otp_in_use(&self, otp: u32) -> bool {
        let accounts = self.accounts.lock().expect("account store poisoned");
        accounts.contains_key(&otp)
    }

    async fn remove_by_otp(&self, otp: u32) -> Option<Account> {
        let mut accounts = self.accounts.lock().expect("account store poisoned");
        accounts.remove(&otp)
    }

    async fn clear(&self) -> usize {
        let mut accounts = self.accounts.lock().expect("account store poisoned");
        let dropped = accounts.len();
        accounts.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(phone: &str, otp: u32) -> Account {
        Account::new("Test".to_string(), phone.to_string(), "+44".to_string(), otp)
    }

    #[tokio::test]
    async fn insert_and_lookup() {
        let store = MemoryAccountStore::new();
        store.insert(account("+441632960067", 1234)).await;

        assert!(store.find_by_phone("+441632960067").await.is_some());
        assert!(store.find_by_otp(1234).await.is_some());
        assert!(store.otp_in_use(1234).await);
        assert!(store.find_by_phone("+441632960000").await.is_none());
    }

    #[tokio::test]
    async fn one_account_per_otp() {
        let store = MemoryAccountStore::new();
        store.insert(account("+441632960067", 1234)).await;
        store.insert(account("+441632960068", 1234)).await;

        let found = store.find_by_otp(1234).await.unwrap();
        assert_eq!(found.phone_number, "+441632960068");
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let store = MemoryAccountStore::new();
        store.insert(account("+441632960067", 1234)).await;
        store.insert(account("+441632960068", 5678)).await;

        assert!(store.remove_by_otp(1234).await.is_some());
        assert!(store.remove_by_otp(1234).await.is_none());
        assert_eq!(store.clear().await, 1);
        assert_eq!(store.clear().await, 0);
    }
}
