//! Store interfaces and their in-memory implementations.
//!
//! Orchestration logic only sees these traits, so the ephemeral demo
//! backends can be swapped for a persistent one without touching it. The
//! in-memory stores are process-local and lost on restart, which is the
//! intended behavior for the sandbox.

pub mod accounts;
pub mod notifications;
pub mod operations;
pub mod sessions;
pub mod tokens;
pub mod transactions;

pub use accounts::{AccountStore, MemoryAccountStore};
pub use notifications::{MemoryNotificationStore, NotificationStore};
pub use operations::{MemoryOperationStore, OperationStore};
pub use sessions::SessionTracker;
pub use tokens::{MemoryTokenStore, TokenStore};
pub use transactions::{MemoryTransactionStore, TransactionStore};
