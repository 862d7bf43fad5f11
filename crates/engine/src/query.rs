//! Filters and ordering for list operations.
//!
//! Ordering strings follow the `field,-other` convention: fields are comma
//! separated and a leading `-` means descending.

use uuid::Uuid;

use crate::{EngineError, Periodicity, ResultEngine, TransactionKind, TransactionStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortKey<F> {
    pub field: F,
    pub descending: bool,
}

impl<F> SortKey<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// Parses an ordering string against the fields allowed for a list.
///
/// Blank input yields an empty list (the caller applies its default order).
pub fn parse_ordering<F>(raw: &str) -> ResultEngine<Vec<SortKey<F>>>
where
    F: for<'a> TryFrom<&'a str, Error = EngineError>,
{
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (descending, name) = match part.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, part),
            };
            Ok(SortKey {
                field: F::try_from(name)?,
                descending,
            })
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionOrderField {
    Date,
    Amount,
    CreatedAt,
}

impl TryFrom<&str> for TransactionOrderField {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "date" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(EngineError::validation(
                "ordering",
                format!("cannot order transactions by {other}"),
            )),
        }
    }
}

/// Filters for listing transactions.
///
/// `wallet_id` matches transactions on either side of a transfer. `search` is
/// a case-insensitive substring of the name or the category.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub wallet_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub status: Option<TransactionStatus>,
    pub search: Option<String>,
    /// Empty means newest first (`-date,-created_at`).
    pub ordering: Vec<SortKey<TransactionOrderField>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixedExpenseOrderField {
    Amount,
    StartDate,
    CreatedAt,
}

impl TryFrom<&str> for FixedExpenseOrderField {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "amount" => Ok(Self::Amount),
            "start_date" => Ok(Self::StartDate),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(EngineError::validation(
                "ordering",
                format!("cannot order fixed expenses by {other}"),
            )),
        }
    }
}

/// Filters for listing fixed expenses.
#[derive(Clone, Debug, Default)]
pub struct FixedExpenseListFilter {
    pub periodicity: Option<Periodicity>,
    pub currency: Option<String>,
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    /// Empty means newest first (`-created_at`).
    pub ordering: Vec<SortKey<FixedExpenseOrderField>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_keys_with_direction() {
        let keys = parse_ordering::<TransactionOrderField>("-amount, date").unwrap();
        assert_eq!(
            keys,
            vec![
                SortKey::desc(TransactionOrderField::Amount),
                SortKey::asc(TransactionOrderField::Date),
            ]
        );
    }

    #[test]
    fn blank_ordering_is_empty() {
        assert!(
            parse_ordering::<FixedExpenseOrderField>(" , ")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert_eq!(
            parse_ordering::<TransactionOrderField>("name").unwrap_err(),
            EngineError::validation("ordering", "cannot order transactions by name")
        );
    }
}
