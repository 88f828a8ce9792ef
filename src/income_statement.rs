use crate::aggregator::BalanceAggregator;
use crate::balance_sheet::credit_positive;
use crate::mapping::MappingTable;
use crate::schema::{AccountMappingRule, AmountLine, SignFilter, StatementFamily};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub charges: Vec<AmountLine>,
    pub produits: Vec<AmountLine>,
}

impl IncomeStatement {
    pub fn charge(&self, reference_code: &str) -> f64 {
        amount_in(&self.charges, reference_code)
    }

    pub fn produit(&self, reference_code: &str) -> f64 {
        amount_in(&self.produits, reference_code)
    }

    pub fn total_charges(&self) -> f64 {
        self.charges.iter().map(|l| l.amount).sum()
    }

    pub fn total_produits(&self) -> f64 {
        self.produits.iter().map(|l| l.amount).sum()
    }

    pub fn net_result(&self) -> f64 {
        self.total_produits() - self.total_charges()
    }
}

fn amount_in(lines: &[AmountLine], reference_code: &str) -> f64 {
    lines
        .iter()
        .find(|l| l.reference_code == reference_code)
        .map(|l| l.amount)
        .unwrap_or(0.0)
}

/// Amount of one charge or product rule. Variation and net lines stay
/// signed: debit-positive for charges, credit-positive for products.
pub fn income_line_amount(
    aggregator: &BalanceAggregator,
    table: &MappingTable,
    family: StatementFamily,
    rule: &AccountMappingRule,
) -> f64 {
    let filter = table.filter_for(family, rule);
    let raw = aggregator.sum(rule.account_prefixes, filter);
    if filter == SignFilter::Any && family.is_credit_side() {
        credit_positive(raw)
    } else {
        raw
    }
}

pub fn generate_income_statement(aggregator: &BalanceAggregator, table: &MappingTable) -> IncomeStatement {
    let lines = |family: StatementFamily| -> Vec<AmountLine> {
        table
            .rules_for(family)
            .iter()
            .map(|rule| AmountLine {
                reference_code: rule.reference_code.to_string(),
                label: rule.label.to_string(),
                amount: income_line_amount(aggregator, table, family, rule),
            })
            .collect()
    };

    IncomeStatement {
        charges: lines(StatementFamily::Charges),
        produits: lines(StatementFamily::Produits),
    }
}
