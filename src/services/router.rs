//! SMS/USSD message router: parses an inbound text, verifies its session and
//! dispatches the command against the token and staging services. The last
//! reply per session is kept for the polling endpoint.

use crate::clients::{DirectoryClient, TokensClient};
use crate::domain::{Channel, CreatedBy, OperationType};
use crate::error::AppError;
use crate::parser::{sms, ussd, Command};
use crate::services::staging::{CreateOperationRequest, StagingService};
use crate::store::SessionTracker;
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MessageRouter {
    sessions: Arc<SessionTracker>,
    directory: DirectoryClient,
    tokens: TokensClient,
    staging: StagingService,
    replies: Arc<Mutex<HashMap<u32, String>>>,
}

impl MessageRouter {
    pub fn new(
        sessions: Arc<SessionTracker>,
        directory: DirectoryClient,
        tokens: TokensClient,
        staging: StagingService,
    ) -> Self {
        Self {
            sessions,
            directory,
            tokens,
            staging,
            replies: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Routes one inbound message. The session is touched first so even a
    /// malformed text keeps it alive.
    pub async fn handle(
        &self,
        otp: u32,
        text: &str,
        channel: Channel,
    ) -> Result<String, AppError> {
        self.sessions.touch(otp);

        let command = match channel {
            Channel::Sms => sms::parse(text)?,
            Channel::Ussd => ussd::parse(text)?,
        };
        let account = self.directory.verify_otp(otp).await?;

        let reply = match command {
            Command::GetToken => {
                let token = self.tokens.encode(&account.phone_number).await?;
                format!("Your token is {}", token)
            }
            Command::DeleteToken => {
                self.tokens.invalidate(&account.phone_number).await?;
                "Your token has been deleted".to_string()
            }
            Command::RenewToken => {
                self.tokens.invalidate(&account.phone_number).await?;
                let token = self.tokens.encode(&account.phone_number).await?;
                format!("Your new token is {}", token)
            }
            Command::CashIn(amount) => {
                self.stage(OperationType::CashIn, amount, &account.phone_number, channel, otp)
                    .await?
            }
            Command::CashOut(amount) => {
                self.stage(OperationType::CashOut, amount, &account.phone_number, channel, otp)
                    .await?
            }
        };

        let mut replies = self.replies.lock().expect("reply log poisoned");
        replies.insert(otp, reply.clone());

        Ok(reply)
    }

    /// The last reply issued to the session, for the polling endpoint.
    pub fn latest_reply(&self, otp: u32) -> Result<String, AppError> {
        let replies = self.replies.lock().expect("reply log poisoned");
        replies
            .get(&otp)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("message for session {}", otp)))
    }

    async fn stage(
        &self,
        kind: OperationType,
        amount: BigDecimal,
        phone_number: &str,
        channel: Channel,
        otp: u32,
    ) -> Result<String, AppError> {
        let operation = self
            .staging
            .create_operation(
                CreateOperationRequest {
                    kind: kind.to_string(),
                    amount,
                    identifier: phone_number.to_string(),
                    system: "mock".to_string(),
                    merchant_code: None,
                    created_by: CreatedBy::Customer,
                    created_using: channel,
                },
                otp,
            )
            .await?;

        Ok(format!(
            "Your {} of {} is awaiting confirmation",
            operation.kind, operation.amount
        ))
    }
}
