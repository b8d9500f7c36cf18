//! Bet-slip parser.
//!
//! A slip is free text with one bet per line:
//!
//! - `123=100*80`: direct bet on `123`, stake `100`, multiplier `80` (must
//!   match the configured direct multiplier).
//! - `123r50` / `123R50`: rolled bet, stake `50` on every distinct
//!   permutation of the digits, at the rolled multiplier.
//!
//! Blank lines are skipped. The first bad line aborts the whole slip.

use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::{BetKind, MoneyCents, Rate, Settings, Wager};

/// Why a single line was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SlipFault {
    #[error("invalid bet format: {0}")]
    InvalidFormat(String),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid multiplier: {0}")]
    InvalidMultiplier(String),
    #[error("amount must be positive: {0}")]
    NonPositiveAmount(MoneyCents),
    #[error("direct multiplier must be {expected}, got {got}")]
    WrongMultiplier { expected: Rate, got: Rate },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SlipError {
    /// `line` is 1-based and counts blank lines.
    #[error("Line {line}: {fault}")]
    Line { line: usize, fault: SlipFault },
    #[error("no valid bets found")]
    NoValidBets,
}

/// A successfully parsed slip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParsedSlip {
    pub voucher_id: Uuid,
    pub wagers: Vec<Wager>,
    /// Sum of the per-line stakes. A rolled line counts once, however many
    /// permutations it expands into.
    pub total: MoneyCents,
}

impl ParsedSlip {
    /// Sum of every wager's stake, rolled permutations included. This is what
    /// a stored voucher carries as its total.
    pub fn staked(&self) -> Option<MoneyCents> {
        self.wagers
            .iter()
            .try_fold(MoneyCents::ZERO, |sum, wager| sum.checked_add(wager.stake))
    }
}

/// Flat `(valid, message)` view of a parse, for printing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlipReport {
    pub valid: bool,
    pub total: MoneyCents,
    pub wagers: Vec<Wager>,
    pub error: Option<String>,
}

impl From<Result<ParsedSlip, SlipError>> for SlipReport {
    fn from(result: Result<ParsedSlip, SlipError>) -> Self {
        match result {
            Ok(slip) => Self {
                valid: true,
                total: slip.total,
                wagers: slip.wagers,
                error: None,
            },
            Err(err) => Self {
                valid: false,
                total: MoneyCents::ZERO,
                wagers: Vec::new(),
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BetParser {
    direct_multiplier: Rate,
    rolled_multiplier: Rate,
}

impl Default for BetParser {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for BetParser {
    fn from(settings: &Settings) -> Self {
        Self::new(settings.direct_multiplier, settings.rolled_multiplier)
    }
}

impl BetParser {
    pub fn new(direct_multiplier: Rate, rolled_multiplier: Rate) -> Self {
        Self {
            direct_multiplier,
            rolled_multiplier,
        }
    }

    /// Parses `text` into wagers attached to `voucher_id`.
    ///
    /// Nothing is returned for a slip with any bad line.
    pub fn parse(&self, text: &str, voucher_id: Uuid) -> Result<ParsedSlip, SlipError> {
        let mut wagers = Vec::new();
        let mut total = MoneyCents::ZERO;
        let mut staked = MoneyCents::ZERO;
        let mut payout = MoneyCents::ZERO;

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fail = |fault| SlipError::Line {
                line: index + 1,
                fault,
            };
            let (stake, parsed) = self.parse_line(line, voucher_id).map_err(fail)?;
            let too_large = || fail(SlipFault::InvalidAmount(line.to_string()));
            total = total.checked_add(stake).ok_or_else(too_large)?;
            for wager in &parsed {
                staked = staked.checked_add(wager.stake).ok_or_else(too_large)?;
                payout = payout
                    .checked_add(wager.potential_payout)
                    .ok_or_else(too_large)?;
            }
            wagers.extend(parsed);
        }

        if wagers.is_empty() {
            return Err(SlipError::NoValidBets);
        }

        Ok(ParsedSlip {
            voucher_id,
            wagers,
            total,
        })
    }

    fn parse_line(
        &self,
        line: &str,
        voucher_id: Uuid,
    ) -> Result<(MoneyCents, Vec<Wager>), SlipFault> {
        if line.contains('=') && line.contains('*') {
            return self.parse_direct(line, voucher_id);
        }
        if line.contains(['r', 'R']) {
            return self.parse_rolled(line, voucher_id);
        }
        Err(SlipFault::InvalidFormat(line.to_string()))
    }

    fn parse_direct(
        &self,
        line: &str,
        voucher_id: Uuid,
    ) -> Result<(MoneyCents, Vec<Wager>), SlipFault> {
        let (number, bet) = split_once_exact(line, '=')
            .ok_or_else(|| SlipFault::InvalidFormat(line.to_string()))?;
        let number = validate_number(number)?;
        let (amount, multiplier) = split_once_exact(bet, '*')
            .ok_or_else(|| SlipFault::InvalidFormat(line.to_string()))?;

        let amount = parse_stake(amount)?;
        let multiplier = multiplier
            .trim()
            .parse::<Rate>()
            .map_err(|_| SlipFault::InvalidMultiplier(multiplier.trim().to_string()))?;
        if !amount.is_positive() {
            return Err(SlipFault::NonPositiveAmount(amount));
        }
        if multiplier != self.direct_multiplier {
            return Err(SlipFault::WrongMultiplier {
                expected: self.direct_multiplier,
                got: multiplier,
            });
        }

        let wager = Wager::new(voucher_id, number, BetKind::Direct, amount, multiplier)
            .ok_or_else(|| SlipFault::InvalidAmount(amount.to_string()))?;
        Ok((amount, vec![wager]))
    }

    fn parse_rolled(
        &self,
        line: &str,
        voucher_id: Uuid,
    ) -> Result<(MoneyCents, Vec<Wager>), SlipFault> {
        let (number, amount) = line
            .split_once(['r', 'R'])
            .ok_or_else(|| SlipFault::InvalidFormat(line.to_string()))?;
        let number = validate_number(number)?;
        let amount = parse_stake(amount)?;
        if !amount.is_positive() {
            return Err(SlipFault::NonPositiveAmount(amount));
        }

        let wagers = permutations(&number)
            .into_iter()
            .map(|perm| {
                Wager::new(
                    voucher_id,
                    perm,
                    BetKind::Rolled,
                    amount,
                    self.rolled_multiplier,
                )
                .ok_or_else(|| SlipFault::InvalidAmount(amount.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((amount, wagers))
    }
}

/// Splits on `sep`, requiring it to occur exactly once.
fn split_once_exact(value: &str, sep: char) -> Option<(&str, &str)> {
    let (left, right) = value.split_once(sep)?;
    (!right.contains(sep)).then_some((left, right))
}

fn validate_number(raw: &str) -> Result<String, SlipFault> {
    let number = raw.trim();
    if number.len() == 3 && number.bytes().all(|b| b.is_ascii_digit()) {
        Ok(number.to_string())
    } else {
        Err(SlipFault::InvalidNumber(number.to_string()))
    }
}

fn parse_stake(raw: &str) -> Result<MoneyCents, SlipFault> {
    let raw = raw.trim();
    raw.parse::<MoneyCents>()
        .map_err(|_| SlipFault::InvalidAmount(raw.to_string()))
}

/// Distinct orderings of a 3-digit number, ascending.
fn permutations(number: &str) -> Vec<String> {
    const ORDERS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    let digits = number.as_bytes();
    ORDERS
        .iter()
        .map(|order| order.iter().map(|&i| char::from(digits[i])).collect())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}
