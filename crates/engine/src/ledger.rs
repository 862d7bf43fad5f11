//! Wallet balance effects.
//!
//! An [`Effect`] is the signed change a transaction applies to one wallet:
//! - income: `wallet += amount`
//! - expense: `wallet -= amount`
//! - transfer: `wallet -= amount`, `receiver_wallet += amount`
//!
//! Every change to a cached wallet balance goes through this module: creating
//! a transaction applies its effects, deleting it applies the exact negation,
//! and updating it applies [`net_change`] between the stored and the new
//! version. A wallet balance therefore always equals its opening balance plus
//! the sum of the effects of the transactions that reference it.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{EngineError, ResultEngine, TransactionKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Effect {
    pub wallet_id: Uuid,
    pub delta_minor: i64,
}

/// The wallets and amount a transaction touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Posting {
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub wallet_id: Uuid,
    pub receiver_wallet_id: Option<Uuid>,
}

impl Posting {
    /// Checks the wallet shape for the kind.
    ///
    /// A transfer needs a receiver distinct from the source; income and
    /// expense must not carry one.
    pub fn validate(&self) -> ResultEngine<()> {
        match (self.kind, self.receiver_wallet_id) {
            (TransactionKind::Transfer, None) => Err(EngineError::validation(
                "receiver_wallet",
                "a transfer requires a receiver wallet",
            )),
            (TransactionKind::Transfer, Some(receiver)) if receiver == self.wallet_id => {
                Err(EngineError::validation(
                    "receiver_wallet",
                    "a transfer cannot target its source wallet",
                ))
            }
            (TransactionKind::Income | TransactionKind::Expense, Some(_)) => {
                Err(EngineError::validation(
                    "receiver_wallet",
                    "only transfers have a receiver wallet",
                ))
            }
            _ => Ok(()),
        }
    }

    /// Effects applied when the transaction is recorded.
    pub fn effects(&self) -> ResultEngine<Vec<Effect>> {
        self.validate()?;
        let amount = self.amount_minor;
        let effects = match self.kind {
            TransactionKind::Income => vec![Effect {
                wallet_id: self.wallet_id,
                delta_minor: amount,
            }],
            TransactionKind::Expense => vec![Effect {
                wallet_id: self.wallet_id,
                delta_minor: -amount,
            }],
            TransactionKind::Transfer => {
                let receiver = self.receiver_wallet_id.ok_or_else(|| {
                    EngineError::validation("receiver_wallet", "a transfer requires a receiver wallet")
                })?;
                vec![
                    Effect {
                        wallet_id: self.wallet_id,
                        delta_minor: -amount,
                    },
                    Effect {
                        wallet_id: receiver,
                        delta_minor: amount,
                    },
                ]
            }
        };
        Ok(effects)
    }

    /// Effects that undo the transaction entirely.
    pub fn reversal(&self) -> ResultEngine<Vec<Effect>> {
        Ok(self
            .effects()?
            .into_iter()
            .map(|effect| Effect {
                wallet_id: effect.wallet_id,
                delta_minor: -effect.delta_minor,
            })
            .collect())
    }
}

/// Sums effects per wallet, dropping wallets whose net change is zero.
///
/// Output is ordered by wallet id so concurrent writers lock rows in the same
/// order.
pub fn merge(effects: impl IntoIterator<Item = Effect>) -> Vec<Effect> {
    let mut by_wallet: BTreeMap<Uuid, i64> = BTreeMap::new();
    for effect in effects {
        *by_wallet.entry(effect.wallet_id).or_default() += effect.delta_minor;
    }
    by_wallet
        .into_iter()
        .filter(|(_, delta)| *delta != 0)
        .map(|(wallet_id, delta_minor)| Effect {
            wallet_id,
            delta_minor,
        })
        .collect()
}

/// Net balance change when a stored transaction is replaced by a new version.
///
/// The previous effects are reversed against the previous wallets, the new
/// ones applied against the current wallets, and both merged per wallet.
pub fn net_change(previous: &Posting, current: &Posting) -> ResultEngine<Vec<Effect>> {
    let mut all = previous.reversal()?;
    all.extend(current.effects()?);
    Ok(merge(all))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn apply(balances: &mut BTreeMap<Uuid, i64>, effects: &[Effect]) {
        for effect in effects {
            *balances.entry(effect.wallet_id).or_default() += effect.delta_minor;
        }
    }

    #[test]
    fn income_credits_wallet() {
        let mut balances = BTreeMap::from([(id(1), 0)]);
        let posting = Posting {
            kind: TransactionKind::Income,
            amount_minor: 100,
            wallet_id: id(1),
            receiver_wallet_id: None,
        };
        apply(&mut balances, &posting.effects().unwrap());
        assert_eq!(balances[&id(1)], 100);
    }

    #[test]
    fn expense_debits_wallet() {
        let mut balances = BTreeMap::from([(id(1), 100)]);
        let posting = Posting {
            kind: TransactionKind::Expense,
            amount_minor: 40,
            wallet_id: id(1),
            receiver_wallet_id: None,
        };
        apply(&mut balances, &posting.effects().unwrap());
        assert_eq!(balances[&id(1)], 60);
    }

    #[test]
    fn transfer_moves_between_wallets_and_reversal_restores_both() {
        let mut balances = BTreeMap::from([(id(1), 100), (id(2), 0)]);
        let posting = Posting {
            kind: TransactionKind::Transfer,
            amount_minor: 30,
            wallet_id: id(1),
            receiver_wallet_id: Some(id(2)),
        };

        apply(&mut balances, &posting.effects().unwrap());
        assert_eq!(balances[&id(1)], 70);
        assert_eq!(balances[&id(2)], 30);

        // Deleting a transfer must debit the receiver, not only credit the
        // source.
        apply(&mut balances, &posting.reversal().unwrap());
        assert_eq!(balances[&id(1)], 100);
        assert_eq!(balances[&id(2)], 0);
    }

    #[test]
    fn net_change_moves_effect_to_new_wallet() {
        let previous = Posting {
            kind: TransactionKind::Expense,
            amount_minor: 40,
            wallet_id: id(1),
            receiver_wallet_id: None,
        };
        let current = Posting {
            wallet_id: id(2),
            amount_minor: 50,
            ..previous
        };
        let net = net_change(&previous, &current).unwrap();
        assert_eq!(
            net,
            vec![
                Effect {
                    wallet_id: id(1),
                    delta_minor: 40
                },
                Effect {
                    wallet_id: id(2),
                    delta_minor: -50
                },
            ]
        );
    }

    #[test]
    fn net_change_switching_kind_on_same_wallet_is_merged() {
        let previous = Posting {
            kind: TransactionKind::Expense,
            amount_minor: 40,
            wallet_id: id(1),
            receiver_wallet_id: None,
        };
        let current = Posting {
            kind: TransactionKind::Income,
            ..previous
        };
        assert_eq!(
            net_change(&previous, &current).unwrap(),
            vec![Effect {
                wallet_id: id(1),
                delta_minor: 80
            }]
        );
    }

    #[test]
    fn unchanged_posting_has_no_net_change() {
        let posting = Posting {
            kind: TransactionKind::Transfer,
            amount_minor: 10,
            wallet_id: id(1),
            receiver_wallet_id: Some(id(2)),
        };
        assert!(net_change(&posting, &posting).unwrap().is_empty());
    }

    #[test]
    fn transfer_shape_is_validated() {
        let mut posting = Posting {
            kind: TransactionKind::Transfer,
            amount_minor: 10,
            wallet_id: id(1),
            receiver_wallet_id: None,
        };
        assert!(posting.effects().is_err());

        posting.receiver_wallet_id = Some(id(1));
        assert!(posting.effects().is_err());

        posting.kind = TransactionKind::Income;
        posting.receiver_wallet_id = Some(id(2));
        assert!(posting.effects().is_err());
    }
}
