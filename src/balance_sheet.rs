use crate::aggregator::BalanceAggregator;
use crate::mapping::{MappingTable, SubtotalDefinition, INCOME_CLASSES};
use crate::schema::{AccountMappingRule, AmountLine, AssetLine, LineNature, SignFilter, StatementFamily};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtotalLine {
    pub reference_code: String,
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStatement {
    pub lines: Vec<AssetLine>,
    pub subtotals: Vec<SubtotalLine>,
}

impl AssetStatement {
    pub fn line(&self, reference_code: &str) -> Option<&AssetLine> {
        self.lines.iter().find(|l| l.reference_code == reference_code)
    }

    pub fn net_of(&self, reference_codes: &[&str]) -> f64 {
        self.lines
            .iter()
            .filter(|l| reference_codes.contains(&l.reference_code.as_str()))
            .map(|l| l.net)
            .sum()
    }

    pub fn gross_of(&self, reference_codes: &[&str]) -> f64 {
        self.lines
            .iter()
            .filter(|l| reference_codes.contains(&l.reference_code.as_str()))
            .map(|l| l.gross)
            .sum()
    }

    pub fn total_net(&self) -> f64 {
        self.lines.iter().map(|l| l.net).sum()
    }

    pub fn total_gross(&self) -> f64 {
        self.lines.iter().map(|l| l.gross).sum()
    }

    pub fn total_contra(&self) -> f64 {
        self.lines.iter().map(|l| l.contra).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityStatement {
    pub lines: Vec<AmountLine>,
    pub subtotals: Vec<SubtotalLine>,
}

impl LiabilityStatement {
    pub fn line(&self, reference_code: &str) -> Option<&AmountLine> {
        self.lines.iter().find(|l| l.reference_code == reference_code)
    }

    pub fn amount_of(&self, reference_codes: &[&str]) -> f64 {
        self.lines
            .iter()
            .filter(|l| reference_codes.contains(&l.reference_code.as_str()))
            .map(|l| l.amount)
            .sum()
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// The CJ line: net result carried on the liability side.
    pub fn net_result(&self) -> f64 {
        self.amount_of(&["CJ"])
    }
}

pub fn generate_assets(aggregator: &BalanceAggregator, table: &MappingTable) -> AssetStatement {
    let family = StatementFamily::Actif;
    let lines: Vec<AssetLine> = table
        .rules_for(family)
        .iter()
        .map(|rule| {
            let filter = table.filter_for(family, rule);
            let gross = aggregator.sum(rule.account_prefixes, filter);
            // Reciprocal lines borrow liability accounts and never carry depreciation.
            let contra = if rule.is_reciprocal() {
                0.0
            } else {
                aggregator.sum(rule.contra_prefixes, SignFilter::NegativeOnlyAbs)
            };
            AssetLine {
                reference_code: rule.reference_code.to_string(),
                label: rule.label.to_string(),
                gross,
                contra,
                net: gross - contra,
            }
        })
        .collect();

    let subtotals = table
        .subtotals(family)
        .iter()
        .map(|def| subtotal_line(def, |code| {
            lines
                .iter()
                .find(|l| l.reference_code == code)
                .map(|l| l.net)
                .unwrap_or(0.0)
        }))
        .collect();

    AssetStatement { lines, subtotals }
}

pub fn generate_liabilities(aggregator: &BalanceAggregator, table: &MappingTable) -> LiabilityStatement {
    let family = StatementFamily::Passif;
    let lines: Vec<AmountLine> = table
        .rules_for(family)
        .iter()
        .map(|rule| AmountLine {
            reference_code: rule.reference_code.to_string(),
            label: rule.label.to_string(),
            amount: liability_amount(aggregator, table, rule),
        })
        .collect();

    let subtotals = table
        .subtotals(family)
        .iter()
        .map(|def| subtotal_line(def, |code| {
            lines
                .iter()
                .find(|l| l.reference_code == code)
                .map(|l| l.amount)
                .unwrap_or(0.0)
        }))
        .collect();

    LiabilityStatement { lines, subtotals }
}

fn liability_amount(aggregator: &BalanceAggregator, table: &MappingTable, rule: &AccountMappingRule) -> f64 {
    let filter = table.filter_for(StatementFamily::Passif, rule);
    let raw = aggregator.sum(rule.account_prefixes, filter);
    match rule.nature {
        LineNature::Standard | LineNature::Reciprocal { .. } => raw,
        LineNature::Variation | LineNature::Net => credit_positive(raw),
        // Class 13 plus whatever classes 6-8 still hold.
        LineNature::NetResult => credit_positive(raw + aggregator.sum(INCOME_CLASSES, SignFilter::Any)),
    }
}

/// Flips a debit-positive net without producing `-0.0`.
pub(crate) fn credit_positive(net: f64) -> f64 {
    0.0 - net
}

fn subtotal_line(def: &SubtotalDefinition, value_of: impl Fn(&str) -> f64) -> SubtotalLine {
    SubtotalLine {
        reference_code: def.reference_code.to_string(),
        label: def.label.to_string(),
        amount: def.components.iter().map(|code| value_of(code)).sum(),
    }
}
