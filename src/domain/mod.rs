pub mod account;
pub mod merchant;
pub mod notification;
pub mod operation;
pub mod token;
pub mod transaction;

pub use account::Account;
pub use merchant::Merchant;
pub use notification::Notification;
pub use operation::{
    Channel, CreatedBy, IdentifierType, ManageOperationResponse, Operation, OperationAction,
    OperationType, SystemKind,
};
pub use token::TokenRecord;
pub use transaction::{
    Party, StartTransactionResponse, Transaction, TransactionRequest, TransactionStatus,
    TransactionType,
};
