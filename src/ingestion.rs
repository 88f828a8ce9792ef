use crate::schema::BalanceEntry;
use serde::{Deserialize, Serialize};

/// One line of a six-column trial balance (balance à six colonnes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_code: String,
    pub label: String,
    #[serde(default)]
    pub opening_debit: f64,
    #[serde(default)]
    pub opening_credit: f64,
    #[serde(default)]
    pub movement_debit: f64,
    #[serde(default)]
    pub movement_credit: f64,
    pub closing_debit: f64,
    pub closing_credit: f64,
}

impl TrialBalanceRow {
    /// Closing balance recomputed from the opening balance and the period
    /// movements, debit-positive.
    pub fn computed_closing_net(&self) -> f64 {
        self.opening_debit - self.opening_credit + self.movement_debit - self.movement_credit
    }

    pub fn closing_net(&self) -> f64 {
        self.closing_debit - self.closing_credit
    }
}

pub fn closing_entries(rows: &[TrialBalanceRow]) -> Vec<BalanceEntry> {
    rows.iter()
        .map(|row| BalanceEntry::new(row.account_code.clone(), row.label.clone(), row.closing_debit, row.closing_credit))
        .collect()
}

/// Entries of the balance d'ouverture, for the cash-flow working-capital flows.
pub fn opening_entries(rows: &[TrialBalanceRow]) -> Vec<BalanceEntry> {
    rows.iter()
        .map(|row| BalanceEntry::new(row.account_code.clone(), row.label.clone(), row.opening_debit, row.opening_credit))
        .collect()
}

/// Rows whose closing columns disagree with opening + movements by more
/// than `tolerance`.
pub fn inconsistent_rows(rows: &[TrialBalanceRow], tolerance: f64) -> Vec<&TrialBalanceRow> {
    rows.iter()
        .filter(|row| (row.closing_net() - row.computed_closing_net()).abs() > tolerance)
        .collect()
}

/// Splits signed net balances (debit-positive) into debit/credit entries.
pub fn entries_from_signed_balances<S: AsRef<str>>(balances: &[(S, S, f64)]) -> Vec<BalanceEntry> {
    balances
        .iter()
        .map(|(code, label, net)| {
            let (debit, credit) = if *net >= 0.0 { (*net, 0.0) } else { (0.0, -*net) };
            BalanceEntry::new(code.as_ref(), label.as_ref(), debit, credit)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, opening: (f64, f64), movement: (f64, f64), closing: (f64, f64)) -> TrialBalanceRow {
        TrialBalanceRow {
            account_code: code.to_string(),
            label: format!("Compte {}", code),
            opening_debit: opening.0,
            opening_credit: opening.1,
            movement_debit: movement.0,
            movement_credit: movement.1,
            closing_debit: closing.0,
            closing_credit: closing.1,
        }
    }

    #[test]
    fn test_closing_and_opening_entries() {
        let rows = vec![
            row("5211", (100.0, 0.0), (500.0, 300.0), (300.0, 0.0)),
            row("4011", (0.0, 80.0), (50.0, 120.0), (0.0, 150.0)),
        ];

        let closing = closing_entries(&rows);
        let opening = opening_entries(&rows);

        assert_eq!(closing[0].net(), 300.0);
        assert_eq!(closing[1].net(), -150.0);
        assert_eq!(opening[0].net(), 100.0);
        assert_eq!(opening[1].credit, 80.0);
        assert!(inconsistent_rows(&rows, 0.0).is_empty());
    }

    #[test]
    fn test_inconsistent_rows() {
        let rows = vec![row("601", (0.0, 0.0), (1_000.0, 0.0), (900.0, 0.0))];
        let flagged = inconsistent_rows(&rows, 1.0);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].account_code, "601");
    }

    #[test]
    fn test_entries_from_signed_balances() {
        let entries = entries_from_signed_balances(&[("101", "Capital", -100.0), ("512", "Banque", 100.0)]);

        assert_eq!(entries[0].debit, 0.0);
        assert_eq!(entries[0].credit, 100.0);
        assert_eq!(entries[1].debit, 100.0);
        assert_eq!(entries[1].credit, 0.0);
    }
}
