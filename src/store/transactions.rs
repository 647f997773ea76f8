use crate::domain::{Transaction, TransactionStatus};
use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, transaction: Transaction);
    async fn find_by_phone_and_status(
        &self,
        phone_number: &str,
        status: TransactionStatus,
    ) -> Option<Transaction>;
    async fn remove(&self, id: Uuid) -> Option<Transaction>;
    /// Cascading cleanup when an account is deleted: drops every transaction
    /// tagged with the OTP and returns them.
    async fn remove_by_otp(&self, otp: u32) -> Vec<Transaction>;
}

#[derive(Default)]
pub struct MemoryTransactionStore {
    transactions: Mutex<Vec<Transaction>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn insert(&self, transaction: Transaction) {
        let mut transactions = self.transactions.lock().expect("transaction store poisoned");
        transactions.push(transaction);
    }

    async fn find_by_phone_and_status(
        &self,
        phone_number: &str,
        status: TransactionStatus,
    ) -> Option<Transaction> {
        let transactions = self.transactions.lock().expect("transaction store poisoned");
        transactions
            .iter()
            .find(|tx| tx.phone_number == phone_number && tx.status == status)
            .cloned()
    }

    async fn remove(&self, id: Uuid) -> Option<Transaction> {
        let mut transactions = self.transactions.lock().expect("transaction store poisoned");
        let index = transactions.iter().position(|tx| tx.id == id)?;
        Some(transactions.remove(index))
    }

    async fn remove_by_otp(&self, otp: u32) -> Vec<Transaction> {
        let mut transactions = self.transactions.lock().expect("transaction store poisoned");
        let (dropped, kept): (Vec<Transaction>, Vec<Transaction>) = transactions
            .drain(..)
            .partition(|tx| tx.otp == Some(otp));
        *transactions = kept;
        dropped
    }
}
