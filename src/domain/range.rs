//! Batch tick targets
//!
//! A target is either an explicit list of IDs (`T001,T003 T007`) or a
//! contiguous numeric range (`T001-T005`, `T001-005`). Ranges expand by
//! incrementing the numeric suffix; the prefix and the zero-padding width
//! of the start ID are held fixed.

use thiserror::Error;

use super::id::TaskId;

/// Largest number of IDs a single range may expand to
pub const MAX_RANGE_LEN: u64 = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum RangeError {
    #[error("Empty tick target")]
    Empty,

    #[error("Invalid task ID in target: '{0}'")]
    InvalidId(String),

    #[error("Invalid range '{0}': expected '<ID>-<ID>' such as 'T001-T005'")]
    Malformed(String),

    #[error("Invalid range '{range}': prefixes differ ('{start}' vs '{end}')")]
    PrefixMismatch {
        range: String,
        start: String,
        end: String,
    },

    #[error("Invalid range '{0}': end comes before start")]
    Reversed(String),

    #[error("Invalid range '{0}': expands to more than {MAX_RANGE_LEN} IDs")]
    TooLarge(String),
}

/// What a batch tick applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickTarget {
    List(Vec<TaskId>),
    Range { start: TaskId, end: TaskId },
}

impl TickTarget {
    /// Parses a target expression
    ///
    /// A single token containing `-` between two ID-like halves is a range;
    /// anything else is a comma/whitespace separated list, in which range
    /// tokens are expanded in place.
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let tokens: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();

        match tokens.as_slice() {
            [] => Err(RangeError::Empty),
            [single] if is_range(single) => parse_range(single),
            _ => {
                let mut ids = Vec::new();
                for token in tokens {
                    if is_range(token) {
                        ids.extend(parse_range(token)?.ids());
                    } else {
                        ids.push(
                            token
                                .parse()
                                .map_err(|_| RangeError::InvalidId(token.to_string()))?,
                        );
                    }
                }
                Ok(TickTarget::List(ids))
            }
        }
    }

    /// Expands the target into IDs, in order, without duplicates
    pub fn ids(&self) -> Vec<TaskId> {
        match self {
            TickTarget::List(ids) => {
                let mut out: Vec<TaskId> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !out.contains(id) {
                        out.push(id.clone());
                    }
                }
                out
            }
            TickTarget::Range { start, end } => {
                let (prefix, start_digits) = start.split_numeric();
                let (_, end_digits) = end.split_numeric();
                let width = start_digits.len();
                let (Ok(from), Ok(to)) = (start_digits.parse::<u64>(), end_digits.parse::<u64>())
                else {
                    return Vec::new();
                };
                (from..=to)
                    .map(|n| TaskId::from_parts(prefix, n, width))
                    .collect()
            }
        }
    }
}

/// A token like `T001-T005` or `T001-005`
///
/// `API-12` is a plain ID: no split at a '-' leaves a complete ID on the
/// left. A token that is not a valid ID but contains '-' is treated as a
/// (malformed) range so the error names the range.
fn is_range(token: &str) -> bool {
    if !token.contains('-') {
        return false;
    }
    if !TaskId::is_valid(token) {
        return true;
    }
    token.match_indices('-').any(|(i, _)| {
        let (left, right) = (&token[..i], &token[i + 1..]);
        TaskId::is_valid(left)
            && !right.is_empty()
            && (right.chars().all(|c| c.is_ascii_digit()) || TaskId::is_valid(right))
    })
}

fn parse_range(token: &str) -> Result<TickTarget, RangeError> {
    let malformed = || RangeError::Malformed(token.to_string());

    // Split at the '-' whose left side is a complete ID
    let (start_str, end_str) = token
        .match_indices('-')
        .map(|(i, _)| (&token[..i], &token[i + 1..]))
        .find(|(left, right)| TaskId::is_valid(left) && !right.is_empty())
        .ok_or_else(malformed)?;

    let start: TaskId = start_str.parse().map_err(|_| malformed())?;
    let (prefix, start_digits) = start.split_numeric();

    let end: TaskId = if end_str.chars().all(|c| c.is_ascii_digit()) {
        TaskId::from_parts(prefix, end_str.parse().map_err(|_| malformed())?, start_digits.len())
    } else {
        end_str.parse().map_err(|_| malformed())?
    };

    let (end_prefix, end_digits) = end.split_numeric();
    if end_prefix != prefix {
        return Err(RangeError::PrefixMismatch {
            range: token.to_string(),
            start: prefix.to_string(),
            end: end_prefix.to_string(),
        });
    }

    let from: u64 = start_digits.parse().map_err(|_| malformed())?;
    let to: u64 = end_digits.parse().map_err(|_| malformed())?;
    if to < from {
        return Err(RangeError::Reversed(token.to_string()));
    }
    if to - from >= MAX_RANGE_LEN {
        return Err(RangeError::TooLarge(token.to_string()));
    }

    Ok(TickTarget::Range { start, end })
}
