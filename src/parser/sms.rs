//! SMS grammar: whitespace-delimited tokens, keyword first.
//!
//! `GET_TOKEN` / `DELETE_TOKEN` / `RENEW_TOKEN` take no argument;
//! `CASH_IN <amount>` / `CASH_OUT <amount>` take exactly one.

use super::{command_from_parts, Command, ParseError};

pub fn parse(text: &str) -> Result<Command, ParseError> {
    let mut parts = text.split_whitespace();
    let code = parts.next().ok_or(ParseError::MissingOperation)?;
    let args: Vec<&str> = parts.collect();

    command_from_parts(code, &args)
}
