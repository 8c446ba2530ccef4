// Gastos Bot - Message Parser
// Turns free-text chat commands into validated financial commands

use crate::record::RecordKind;

// ============================================================================
// CORE TYPES
// ============================================================================

/// ParsedCommand - Output of parse_message()
///
/// A record minus its timestamp; the ledger writer stamps the time when the
/// row is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub kind: RecordKind,
    pub amount: f64,
    pub category: String,
}

/// ParseRejection - why a message is not a finance command
///
/// Rejections are recovered locally: the event is ignored, nothing is
/// surfaced to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseRejection {
    /// Fewer than 3 tokens
    TooShort,
    /// First token is not a kind keyword
    InvalidKind(String),
    /// Second token does not parse as a non-negative number
    InvalidAmount(String),
}

impl std::fmt::Display for ParseRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseRejection::TooShort => write!(f, "message too short to be a command"),
            ParseRejection::InvalidKind(word) => write!(f, "'{}' is not a record kind", word),
            ParseRejection::InvalidAmount(word) => write!(f, "'{}' is not a valid amount", word),
        }
    }
}

impl std::error::Error for ParseRejection {}

// ============================================================================
// PARSER
// ============================================================================

/// Parse a chat message like "gasto 45,90 mercado" into a command.
///
/// Total over strings: every input maps to either a command or a typed
/// rejection, never a partial record.
///
/// # Algorithm
/// 1. Lower-case the text and split on whitespace
/// 2. Token 0 is the kind keyword ("gasto"/"receita", or the English names)
/// 3. Token 1 is the amount; a decimal comma counts as a decimal point
/// 4. Remaining tokens joined with single spaces form the category
pub fn parse_message(text: &str) -> Result<ParsedCommand, ParseRejection> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    if tokens.len() < 3 {
        return Err(ParseRejection::TooShort);
    }

    let kind = RecordKind::from_keyword(tokens[0])
        .ok_or_else(|| ParseRejection::InvalidKind(tokens[0].to_string()))?;

    // "10,50" and "10.50" are the same amount
    let amount: f64 = tokens[1]
        .replace(',', ".")
        .parse()
        .map_err(|_| ParseRejection::InvalidAmount(tokens[1].to_string()))?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(ParseRejection::InvalidAmount(tokens[1].to_string()));
    }

    // Tokens are non-empty by construction, so the category is too
    let category = tokens[2..].join(" ");

    Ok(ParsedCommand {
        kind,
        amount,
        category,
    })
}
