use crate::domain::{Operation, OperationType};
use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

#[async_trait]
pub trait OperationStore: Send + Sync {
    async fn add(&self, operation: Operation);
    /// Removes and returns the operation. This is the atomic claim: two
    /// concurrent accept/reject calls for the same id cannot both win.
    async fn remove(&self, id: Uuid) -> Option<Operation>;
    async fn filter_by_kind(&self, kinds: &[OperationType]) -> Vec<Operation>;
}

#[derive(Default)]
pub struct MemoryOperationStore {
    operations: Mutex<Vec<Operation>>,
}

impl MemoryOperationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OperationStore for MemoryOperationStore {
    async fn add(&self, operation: Operation) {
        let mut operations = self.operations.lock().expect("operation store poisoned");
        operations.push(operation);
    }

    async fn remove(&self, id: Uuid) -> Option<Operation> {
        let mut operations = self.operations.lock().expect("operation store poisoned");
        let index = operations.iter().position(|op| op.id == id)?;
        Some(operations.remove(index))
    }

    async fn filter_by_kind(&self, kinds: &[OperationType]) -> Vec<Operation> {
        let operations = self.operations.lock().expect("operation store poisoned");
        operations
            .iter()
            .filter(|op| kinds.contains(&op.kind))
            .cloned()
            .collect()
    }
}
