use crate::error::{LiasseError, Result};
use crate::mapping::MappingTable;
use crate::schema::{BalanceEntry, SignFilter, StatementFamily};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
struct AccountBalance {
    label: String,
    debit: f64,
    credit: f64,
}

impl AccountBalance {
    fn net(&self) -> f64 {
        self.debit - self.credit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceSummary {
    pub account_count: usize,
    pub total_debit: f64,
    pub total_credit: f64,
}

impl TrialBalanceSummary {
    pub fn difference(&self) -> f64 {
        self.total_debit - self.total_credit
    }

    pub fn is_balanced(&self, tolerance: f64) -> bool {
        self.difference().abs() <= tolerance
    }
}

/// An account whose balance no statement line picks up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnplacedAccount {
    pub account_code: String,
    pub label: String,
    pub net: f64,
}

/// Net-balance index over one trial balance.
///
/// Built once by [`BalanceAggregator::load`] and read-only afterwards; a new
/// import means a new aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceAggregator {
    index: BTreeMap<String, AccountBalance>,
}

impl BalanceAggregator {
    pub fn load(entries: &[BalanceEntry]) -> Result<Self> {
        let mut index = BTreeMap::new();

        for entry in entries {
            let code = entry.account_code.trim();
            validate_amount(code, "debit", entry.debit)?;
            validate_amount(code, "credit", entry.credit)?;

            let previous = index.insert(
                code.to_string(),
                AccountBalance {
                    label: entry.label.clone(),
                    debit: entry.debit,
                    credit: entry.credit,
                },
            );
            if previous.is_some() {
                warn!("Duplicate account code {} in trial balance, keeping the last row", code);
            }
        }

        debug!(
            "Loaded {} accounts from {} trial balance rows",
            index.len(),
            entries.len()
        );

        Ok(Self { index })
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Sums the filtered net balance of every account whose code equals or
    /// starts with one of `prefixes`. Each account is counted at most once.
    pub fn sum(&self, prefixes: &[&str], filter: SignFilter) -> f64 {
        self.index
            .iter()
            .filter(|(code, _)| matches_any(code, prefixes))
            .map(|(_, balance)| filter.apply(balance.net()))
            .fold(0.0, |acc, value| acc + value)
    }

    /// Signed net of a single normalized account code, zero when absent.
    pub fn net_of(&self, account_code: &str) -> f64 {
        self.index
            .get(account_code.trim())
            .map(AccountBalance::net)
            .unwrap_or(0.0)
    }

    pub fn summary(&self) -> TrialBalanceSummary {
        let (total_debit, total_credit) = self
            .index
            .values()
            .fold((0.0, 0.0), |(d, c), b| (d + b.debit, c + b.credit));

        TrialBalanceSummary {
            account_count: self.index.len(),
            total_debit,
            total_credit,
        }
    }

    /// Accounts of classes 1 to 8 carrying a non-zero balance that no rule
    /// of `table` captures with its sign filter.
    pub fn unplaced_accounts(&self, table: &MappingTable) -> Vec<UnplacedAccount> {
        self.index
            .iter()
            .filter_map(|(code, balance)| {
                let net = balance.net();
                if net == 0.0 {
                    return None;
                }
                let families: &[StatementFamily] = match code.chars().next() {
                    Some('1'..='5') => &[StatementFamily::Actif, StatementFamily::Passif],
                    Some('6'..='8') => &[StatementFamily::Charges, StatementFamily::Produits],
                    _ => return None,
                };
                if is_captured(table, families, code, net) {
                    None
                } else {
                    Some(UnplacedAccount {
                        account_code: code.clone(),
                        label: balance.label.clone(),
                        net,
                    })
                }
            })
            .collect()
    }
}

fn is_captured(table: &MappingTable, families: &[StatementFamily], code: &str, net: f64) -> bool {
    families.iter().any(|&family| {
        table.rules_for(family).iter().any(|rule| {
            let filter = table.filter_for(family, rule);
            let by_account = matches_any(code, rule.account_prefixes) && filter.apply(net) != 0.0;
            let by_contra = matches_any(code, rule.contra_prefixes)
                && SignFilter::NegativeOnlyAbs.apply(net) != 0.0;
            by_account || by_contra
        })
    })
}

fn matches_any(code: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| code.starts_with(p.trim()))
}

fn validate_amount(account: &str, column: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(LiasseError::InvalidEntry {
            account: account.to_string(),
            details: format!("{} must be finite and non-negative, got {}", column, value),
        });
    }
    Ok(())
}
