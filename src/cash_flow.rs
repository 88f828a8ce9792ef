use crate::aggregator::BalanceAggregator;
use crate::balance_sheet::{generate_assets, generate_liabilities};
use crate::income_statement::generate_income_statement;
use crate::mapping::{
    MappingTable, HAO_DOTATION_PREFIXES, HAO_REPRISE_PREFIXES, TRESORERIE_ACTIF_LINES, TRESORERIE_PASSIF_LINES,
};
use crate::schema::{SignFilter, StatementFamily};
use serde::{Deserialize, Serialize};

const CREANCES_LINES: &[&str] = &["BH", "BI", "BJ"];
const PASSIF_CIRCULANT_LINES: &[&str] = &["DI", "DJ", "DK", "DM"];

/// Flows that need the opening balance (balance d'ouverture) to be derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingCapitalFlows {
    /// FB: decrease of actif circulant HAO.
    pub actif_circulant_hao: f64,
    /// FC: decrease of stocks.
    pub stocks: f64,
    /// FD: decrease of créances.
    pub creances: f64,
    /// FE: increase of passif circulant.
    pub passif_circulant: f64,
    /// ZB = FA + FB + FC + FD + FE.
    pub operating_cash_flow: f64,
    /// ZA.
    pub opening_net_treasury: f64,
    pub treasury_variation: f64,
    /// Investment and financing flows taken together (ZC + ZD + ZE).
    pub investment_and_financing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub net_result: f64,
    /// RL + RN + dotations HAO.
    pub dotations: f64,
    /// TJ + TL + reprises HAO.
    pub reprises: f64,
    /// Dotations HAO (85), the non-cash share of RP.
    pub hao_dotations: f64,
    /// Reprises HAO (86), the non-cash share of TO.
    pub hao_reprises: f64,
    /// TN − RO.
    pub disposal_gains: f64,
    /// FA: capacité d'autofinancement globale.
    pub cafg: f64,
    /// ZH, from the treasury accounts themselves.
    pub closing_net_treasury: f64,
    pub working_capital: Option<WorkingCapitalFlows>,
}

pub fn generate_cash_flow(
    aggregator: &BalanceAggregator,
    table: &MappingTable,
    opening: Option<&BalanceAggregator>,
) -> CashFlowStatement {
    let income = generate_income_statement(aggregator, table);

    let net_result = income.net_result();
    let hao_dotations = aggregator.sum(HAO_DOTATION_PREFIXES, StatementFamily::Charges.default_filter());
    let hao_reprises = aggregator.sum(HAO_REPRISE_PREFIXES, StatementFamily::Produits.default_filter());
    let dotations = income.charge("RL") + income.charge("RN") + hao_dotations;
    let reprises = income.produit("TJ") + income.produit("TL") + hao_reprises;
    let disposal_gains = income.produit("TN") - income.charge("RO");
    let cafg = net_result + dotations - reprises - disposal_gains;

    let closing_net_treasury = net_treasury(aggregator, table);

    let working_capital = opening.map(|opening| {
        let (current_assets, current_liabilities) = (
            generate_assets(aggregator, table),
            generate_liabilities(aggregator, table),
        );
        let (opening_assets, opening_liabilities) = (
            generate_assets(opening, table),
            generate_liabilities(opening, table),
        );

        let actif_circulant_hao = opening_assets.net_of(&["BA"]) - current_assets.net_of(&["BA"]);
        let stocks = opening_assets.net_of(&["BB"]) - current_assets.net_of(&["BB"]);
        let creances = opening_assets.net_of(CREANCES_LINES) - current_assets.net_of(CREANCES_LINES);
        let passif_circulant = current_liabilities.amount_of(PASSIF_CIRCULANT_LINES)
            - opening_liabilities.amount_of(PASSIF_CIRCULANT_LINES);

        let operating_cash_flow = cafg + actif_circulant_hao + stocks + creances + passif_circulant;
        let opening_net_treasury = net_treasury(opening, table);
        let treasury_variation = closing_net_treasury - opening_net_treasury;

        WorkingCapitalFlows {
            actif_circulant_hao,
            stocks,
            creances,
            passif_circulant,
            operating_cash_flow,
            opening_net_treasury,
            treasury_variation,
            investment_and_financing: treasury_variation - operating_cash_flow,
        }
    });

    CashFlowStatement {
        net_result,
        dotations,
        reprises,
        hao_dotations,
        hao_reprises,
        disposal_gains,
        cafg,
        closing_net_treasury,
        working_capital,
    }
}

/// Signed net of every treasury account (overdrafts count negative), less
/// treasury depreciation.
pub fn net_treasury(aggregator: &BalanceAggregator, table: &MappingTable) -> f64 {
    let mut prefixes: Vec<&str> = Vec::new();
    let mut contra: Vec<&str> = Vec::new();

    for code in TRESORERIE_ACTIF_LINES {
        if let Some(rule) = table.rule(StatementFamily::Actif, code) {
            prefixes.extend_from_slice(rule.account_prefixes);
            contra.extend_from_slice(rule.contra_prefixes);
        }
    }
    for code in TRESORERIE_PASSIF_LINES {
        if let Some(rule) = table.rule(StatementFamily::Passif, code) {
            prefixes.extend_from_slice(rule.account_prefixes);
        }
    }

    aggregator.sum(&prefixes, SignFilter::Any) - aggregator.sum(&contra, SignFilter::NegativeOnlyAbs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BalanceEntry;

    fn load(entries: &[(&str, f64, f64)]) -> BalanceAggregator {
        let rows: Vec<BalanceEntry> = entries
            .iter()
            .map(|(code, d, c)| BalanceEntry::new(*code, "", *d, *c))
            .collect();
        BalanceAggregator::load(&rows).unwrap()
    }

    #[test]
    fn test_cafg_add_backs() {
        let aggregator = load(&[
            ("7011", 0.0, 1_000_000.0),
            ("6011", 400_000.0, 0.0),
            ("6813", 120_000.0, 0.0),
            ("6971", 30_000.0, 0.0),
            ("7911", 0.0, 20_000.0),
            ("8211", 0.0, 300_000.0),
            ("8121", 200_000.0, 0.0),
        ]);
        let tft = generate_cash_flow(&aggregator, &MappingTable::default(), None);

        // 1_000_000 + 20_000 + 300_000 - 400_000 - 120_000 - 30_000 - 200_000
        assert_eq!(tft.net_result, 570_000.0);
        assert_eq!(tft.dotations, 150_000.0);
        assert_eq!(tft.reprises, 20_000.0);
        assert_eq!(tft.disposal_gains, 100_000.0);
        assert_eq!(tft.cafg, 570_000.0 + 150_000.0 - 20_000.0 - 100_000.0);
        assert!(tft.working_capital.is_none());
    }

    #[test]
    fn test_cafg_adds_back_hao_and_financial_depreciation() {
        let aggregator = load(&[
            ("7011", 0.0, 1_000.0),
            ("851", 300.0, 0.0),
            ("861", 0.0, 50.0),
            ("6871", 40.0, 0.0),
            ("5211", 710.0, 0.0),
        ]);
        let table = MappingTable::default();
        let tft = generate_cash_flow(&aggregator, &table, None);

        assert_eq!(tft.net_result, 710.0);
        assert_eq!(tft.hao_dotations, 300.0);
        assert_eq!(tft.hao_reprises, 50.0);
        assert_eq!(tft.dotations, 340.0);
        assert_eq!(tft.reprises, 50.0);
        // Only the sale is a cash item.
        assert_eq!(tft.cafg, 1_000.0);
        assert!(aggregator.unplaced_accounts(&table).is_empty());
    }

    #[test]
    fn test_net_treasury_nets_overdrafts() {
        let aggregator = load(&[
            ("5211", 900.0, 0.0),
            ("5212", 0.0, 250.0),
            ("5611", 0.0, 100.0),
            ("571", 50.0, 0.0),
            ("5921", 0.0, 10.0),
        ]);
        let table = MappingTable::default();

        assert_eq!(net_treasury(&aggregator, &table), 900.0 - 250.0 - 100.0 + 50.0 - 10.0);
    }

    #[test]
    fn test_working_capital_flows_with_opening_balance() {
        let opening = load(&[
            ("311", 500.0, 0.0),
            ("4111", 300.0, 0.0),
            ("4011", 0.0, 200.0),
            ("5211", 100.0, 0.0),
        ]);
        let closing = load(&[
            ("311", 650.0, 0.0),
            ("4111", 250.0, 0.0),
            ("4011", 0.0, 260.0),
            ("5211", 400.0, 0.0),
            ("7011", 0.0, 1_000.0),
            ("6011", 600.0, 0.0),
        ]);
        let tft = generate_cash_flow(&closing, &MappingTable::default(), Some(&opening));
        let flows = tft.working_capital.unwrap();

        assert_eq!(tft.cafg, 400.0);
        assert_eq!(flows.stocks, -150.0);
        assert_eq!(flows.creances, 50.0);
        assert_eq!(flows.passif_circulant, 60.0);
        assert_eq!(flows.operating_cash_flow, 400.0 - 150.0 + 50.0 + 60.0);
        assert_eq!(flows.opening_net_treasury, 100.0);
        assert_eq!(flows.treasury_variation, 300.0);
        assert_eq!(flows.investment_and_financing, 300.0 - 360.0);
    }
}
