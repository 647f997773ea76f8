//! USSD grammar: a `*...#` service-code envelope around `*`-separated
//! segments. The first segment is a numeric code 1-5 mapping to the same
//! five commands as the SMS grammar; codes 4 and 5 take one amount segment.

use super::{command_from_parts, Command, ParseError};

pub fn parse(text: &str) -> Result<Command, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::MissingOperation);
    }

    let interior = text
        .strip_prefix('*')
        .and_then(|rest| rest.strip_suffix('#'))
        .ok_or(ParseError::InvalidOperation)?;
    if interior.is_empty() {
        return Err(ParseError::MissingOperation);
    }

    // Empty segments count toward arity, so `*4**100#` is invalid.
    let mut segments = interior.split('*');
    let code = segments.next().ok_or(ParseError::MissingOperation)?;
    let args: Vec<&str> = segments.collect();

    let keyword = match code {
        "1" => "GET_TOKEN",
        "2" => "DELETE_TOKEN",
        "3" => "RENEW_TOKEN",
        "4" => "CASH_IN",
        "5" => "CASH_OUT",
        _ => return Err(ParseError::InvalidOperation),
    };

    command_from_parts(keyword, &args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    #[test]
    fn parses_token_commands() {
        assert_eq!(parse("*1#"), Ok(Command::GetToken));
        assert_eq!(parse("*2#"), Ok(Command::DeleteToken));
        assert_eq!(parse("*3#"), Ok(Command::RenewToken));
    }

    #[test]
    fn parses_cash_commands() {
        assert_eq!(parse("*4*100#"), Ok(Command::CashIn(BigDecimal::from(100))));
        assert_eq!(parse("*5*42#"), Ok(Command::CashOut(BigDecimal::from(42))));
    }

    #[test]
    fn envelope_is_required() {
        assert_eq!(parse("1#"), Err(ParseError::InvalidOperation));
        assert_eq!(parse("*1"), Err(ParseError::InvalidOperation));
        assert_eq!(parse("4*100"), Err(ParseError::InvalidOperation));
    }

    #[test]
    fn wrong_arity_is_invalid() {
        assert_eq!(parse("*4#"), Err(ParseError::InvalidOperation));
        assert_eq!(parse("*4*100*200#"), Err(ParseError::InvalidOperation));
        assert_eq!(parse("*1*9#"), Err(ParseError::InvalidOperation));
    }

    #[test]
    fn empty_segments_count_toward_arity() {
        assert_eq!(parse("*4**100#"), Err(ParseError::InvalidOperation));
        assert_eq!(parse("**4*100#"), Err(ParseError::InvalidOperation));
        assert_eq!(parse("*1*#"), Err(ParseError::InvalidOperation));
    }

    #[test]
    fn empty_message_is_missing_operation() {
        assert_eq!(parse(""), Err(ParseError::MissingOperation));
        assert_eq!(parse("*#"), Err(ParseError::MissingOperation));
    }

    #[test]
    fn unknown_code_is_invalid() {
        assert_eq!(parse("*9#"), Err(ParseError::InvalidOperation));
    }
}
