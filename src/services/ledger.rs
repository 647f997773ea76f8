//! Transaction ledger: records money movements accepted by the orchestrator
//! and resolves them when the downstream MMO confirms.

use crate::clients::ProxyClient;
use crate::domain::{
    CreatedBy, OperationType, StartTransactionResponse, Transaction, TransactionRequest,
    TransactionStatus, TransactionType,
};
use crate::error::AppError;
use crate::store::TransactionStore;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct LedgerService {
    transactions: Arc<dyn TransactionStore>,
    proxy: ProxyClient,
}

impl LedgerService {
    pub fn new(transactions: Arc<dyn TransactionStore>, proxy: ProxyClient) -> Self {
        Self { transactions, proxy }
    }

    /// Records a new pending transaction. The phone number comes from the
    /// first msisdn party, credit side first.
    pub async fn start_transaction(
        &self,
        kind: TransactionType,
        callback_url: &str,
        request: TransactionRequest,
    ) -> Result<StartTransactionResponse, AppError> {
        let phone_number = request
            .msisdn()
            .ok_or_else(|| {
                AppError::UserFacing("creditParty or debitParty must carry an msisdn".to_string())
            })?
            .to_string();

        let transaction = Transaction::new(
            phone_number,
            kind,
            callback_url.to_string(),
            request.system,
            request.amount,
            request.merchant,
            request.identifier_type,
            request.otp,
            request.created_by,
            request.created_using,
        );
        let response = StartTransactionResponse {
            server_correlation_id: transaction.id,
            status: transaction.status,
        };
        tracing::info!(id = %transaction.id, %kind, "transaction recorded");
        self.transactions.insert(transaction).await;

        Ok(response)
    }

    pub async fn get_transaction(
        &self,
        phone_number: &str,
        status: TransactionStatus,
    ) -> Result<Transaction, AppError> {
        self.transactions
            .find_by_phone_and_status(phone_number, status)
            .await
            .ok_or_else(|| {
                AppError::NotFound(format!("{} transaction for {}", status, phone_number))
            })
    }

    /// Settles a transaction: drops it from the ledger and, unless the
    /// customer initiated it themselves, stages a notification for the
    /// channel that did. Removal wins even when the notification fails.
    pub async fn resolve_transaction(&self, id: Uuid) -> Result<Transaction, AppError> {
        let transaction = self
            .transactions
            .remove(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("transaction {}", id)))?;

        if transaction.created_by != CreatedBy::Customer {
            let message = format!(
                "The {} transaction of {} for {} was processed",
                transaction.kind, transaction.amount, transaction.phone_number
            );
            self.proxy
                .create_notification(&message, notification_kind(&transaction), transaction.otp)
                .await?;
        }

        Ok(transaction)
    }
}

/// Merchant payments keep their operation type; deposits and withdrawals
/// could have started as either cash direction, so they stay untyped.
fn notification_kind(transaction: &Transaction) -> Option<OperationType> {
    match transaction.kind {
        TransactionType::MerchantPayment => Some(OperationType::MerchantPayment),
        TransactionType::Deposit | TransactionType::Withdrawal => None,
    }
}
