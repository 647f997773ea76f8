pub mod directory;
pub mod ledger;
pub mod orchestrator;
pub mod router;
pub mod staging;
pub mod sweeper;
pub mod token;

pub use directory::AccountDirectory;
pub use ledger::LedgerService;
pub use orchestrator::Orchestrator;
pub use router::MessageRouter;
pub use staging::StagingService;
pub use token::TokenService;
