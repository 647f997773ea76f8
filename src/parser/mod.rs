//! Inbound message grammars. SMS and USSD share the same five commands and
//! differ only in delimiter convention.

pub mod sms;
pub mod ussd;

use crate::error::AppError;
use bigdecimal::BigDecimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GetToken,
    DeleteToken,
    RenewToken,
    CashIn(BigDecimal),
    CashOut(BigDecimal),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("MISSING_OPERATION")]
    MissingOperation,
    #[error("INVALID_OPERATION")]
    InvalidOperation,
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::UserFacing(err.to_string())
    }
}

/// Builds a command from an operation keyword and its arguments. Both
/// grammars funnel through here once tokenized.
pub(crate) fn command_from_parts(code: &str, args: &[&str]) -> Result<Command, ParseError> {
    match code {
        "GET_TOKEN" | "DELETE_TOKEN" | "RENEW_TOKEN" if !args.is_empty() => {
            Err(ParseError::InvalidOperation)
        }
        "GET_TOKEN" => Ok(Command::GetToken),
        "DELETE_TOKEN" => Ok(Command::DeleteToken),
        "RENEW_TOKEN" => Ok(Command::RenewToken),
        "CASH_IN" | "CASH_OUT" => {
            // Exactly one argument: the amount.
            let [raw_amount] = args else {
                return Err(ParseError::InvalidOperation);
            };
            let amount: BigDecimal =
                raw_amount.parse().map_err(|_| ParseError::InvalidOperation)?;
            if code == "CASH_IN" {
                Ok(Command::CashIn(amount))
            } else {
                Ok(Command::CashOut(amount))
            }
        }
        _ => Err(ParseError::InvalidOperation),
    }
}
