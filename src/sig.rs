//! Soldes intermédiaires de gestion: 27 terms read from the income
//! statement rules, folded into nine fixed linear subtotals.

use crate::aggregator::BalanceAggregator;
use crate::income_statement::income_line_amount;
use crate::mapping::MappingTable;
use crate::schema::StatementFamily;
use log::warn;
use serde::{Deserialize, Serialize};

use StatementFamily::{Charges as C, Produits as P};

struct TermDefinition {
    label: &'static str,
    sources: &'static [(StatementFamily, &'static str)],
}

const fn term(label: &'static str, sources: &'static [(StatementFamily, &'static str)]) -> TermDefinition {
    TermDefinition { label, sources }
}

/// T1..T27, in order.
static TERMS: [TermDefinition; 27] = [
    term("Ventes de marchandises", &[(P, "TA")]),
    term("Achats de marchandises", &[(C, "RA")]),
    term("Variation de stocks de marchandises", &[(C, "RB")]),
    term("Ventes de produits fabriqués", &[(P, "TB")]),
    term("Travaux, services vendus", &[(P, "TC")]),
    term("Produits accessoires", &[(P, "TD")]),
    term("Production stockée (ou déstockage)", &[(P, "TE")]),
    term("Production immobilisée", &[(P, "TF")]),
    term("Subventions d'exploitation", &[(P, "TG")]),
    term("Autres produits", &[(P, "TH")]),
    term("Transferts de charges d'exploitation", &[(P, "TI")]),
    term("Achats de matières premières et fournitures liées", &[(C, "RC")]),
    term("Variation de stocks de matières premières", &[(C, "RD")]),
    term("Autres achats", &[(C, "RE")]),
    term("Variation de stocks d'autres approvisionnements", &[(C, "RF")]),
    term("Transports", &[(C, "RG")]),
    term("Services extérieurs", &[(C, "RH")]),
    term("Impôts et taxes", &[(C, "RI")]),
    term("Autres charges", &[(C, "RJ")]),
    term("Charges de personnel", &[(C, "RK")]),
    term("Reprises d'amortissements, de provisions et dépréciations", &[(P, "TJ")]),
    term("Dotations aux amortissements, aux provisions et dépréciations", &[(C, "RL")]),
    term("Produits financiers", &[(P, "TK"), (P, "TL"), (P, "TM")]),
    term("Charges financières", &[(C, "RM"), (C, "RN")]),
    term("Produits HAO", &[(P, "TN"), (P, "TO")]),
    term("Charges HAO", &[(C, "RO"), (C, "RP")]),
    term("Participation des travailleurs et impôts sur le résultat", &[(C, "RQ"), (C, "RS")]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operand {
    /// 1-based term index.
    Term(usize),
    /// 1-based subtotal index, must precede the formula using it.
    Sig(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SigFormula {
    pub reference_code: &'static str,
    pub label: &'static str,
    pub inputs: &'static [(f64, Operand)],
}

use Operand::{Sig, Term};

pub static SIG_FORMULAS: [SigFormula; 9] = [
    SigFormula {
        reference_code: "XA",
        label: "Marge commerciale",
        inputs: &[(1.0, Term(1)), (-1.0, Term(2)), (-1.0, Term(3))],
    },
    SigFormula {
        reference_code: "XB",
        label: "Chiffre d'affaires",
        inputs: &[(1.0, Term(1)), (1.0, Term(4)), (1.0, Term(5)), (1.0, Term(6))],
    },
    SigFormula {
        reference_code: "XC",
        label: "Valeur ajoutée",
        inputs: &[
            (1.0, Sig(2)),
            (1.0, Term(7)),
            (1.0, Term(8)),
            (1.0, Term(9)),
            (1.0, Term(10)),
            (1.0, Term(11)),
            (-1.0, Term(2)),
            (-1.0, Term(3)),
            (-1.0, Term(12)),
            (-1.0, Term(13)),
            (-1.0, Term(14)),
            (-1.0, Term(15)),
            (-1.0, Term(16)),
            (-1.0, Term(17)),
            (-1.0, Term(18)),
            (-1.0, Term(19)),
        ],
    },
    SigFormula {
        reference_code: "XD",
        label: "Excédent brut d'exploitation",
        inputs: &[(1.0, Sig(3)), (-1.0, Term(20))],
    },
    SigFormula {
        reference_code: "XE",
        label: "Résultat d'exploitation",
        inputs: &[(1.0, Sig(4)), (1.0, Term(21)), (-1.0, Term(22))],
    },
    SigFormula {
        reference_code: "XF",
        label: "Résultat financier",
        inputs: &[(1.0, Term(23)), (-1.0, Term(24))],
    },
    SigFormula {
        reference_code: "XG",
        label: "Résultat des activités ordinaires",
        inputs: &[(1.0, Sig(5)), (1.0, Sig(6))],
    },
    SigFormula {
        reference_code: "XH",
        label: "Résultat hors activités ordinaires",
        inputs: &[(1.0, Term(25)), (-1.0, Term(26))],
    },
    SigFormula {
        reference_code: "XI",
        label: "Résultat net",
        inputs: &[(1.0, Sig(7)), (1.0, Sig(8)), (-1.0, Term(27))],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigTerm {
    pub code: String,
    pub label: String,
    pub sources: Vec<String>,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigSubtotal {
    pub code: String,
    pub reference_code: String,
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigCascade {
    pub terms: Vec<SigTerm>,
    pub soldes: Vec<SigSubtotal>,
}

impl SigCascade {
    /// `n` is 1-based, as in T1..T27.
    pub fn term(&self, n: usize) -> f64 {
        n.checked_sub(1)
            .and_then(|i| self.terms.get(i))
            .map(|t| t.amount)
            .unwrap_or(0.0)
    }

    /// `n` is 1-based, as in SIG1..SIG9.
    pub fn sig(&self, n: usize) -> f64 {
        n.checked_sub(1)
            .and_then(|i| self.soldes.get(i))
            .map(|s| s.amount)
            .unwrap_or(0.0)
    }

    pub fn by_reference(&self, reference_code: &str) -> Option<&SigSubtotal> {
        self.soldes.iter().find(|s| s.reference_code == reference_code)
    }

    pub fn chiffre_affaires(&self) -> f64 {
        self.sig(2)
    }

    pub fn net_result(&self) -> f64 {
        self.sig(9)
    }

    /// Recomputes every subtotal from its inputs and returns the codes whose
    /// stored amount differs. Comparison is exact.
    pub fn verify_formulas(&self) -> Vec<String> {
        SIG_FORMULAS
            .iter()
            .enumerate()
            .filter(|(i, formula)| {
                let expected = evaluate(formula, |n| self.term(n), |n| self.sig(n));
                self.sig(i + 1) != expected
            })
            .map(|(i, formula)| format!("SIG{} ({})", i + 1, formula.reference_code))
            .collect()
    }
}

fn evaluate(formula: &SigFormula, term: impl Fn(usize) -> f64, sig: impl Fn(usize) -> f64) -> f64 {
    formula
        .inputs
        .iter()
        .fold(0.0, |acc, (coefficient, operand)| {
            let value = match *operand {
                Operand::Term(n) => term(n),
                Operand::Sig(n) => sig(n),
            };
            acc + coefficient * value
        })
}

pub fn generate_sig(aggregator: &BalanceAggregator, table: &MappingTable) -> SigCascade {
    let terms: Vec<SigTerm> = TERMS
        .iter()
        .enumerate()
        .map(|(i, def)| {
            let amount = def
                .sources
                .iter()
                .map(|&(family, code)| match table.rule(family, code) {
                    Some(rule) => income_line_amount(aggregator, table, family, rule),
                    None => {
                        warn!("SIG term T{} refers to unknown {} line {}", i + 1, family, code);
                        0.0
                    }
                })
                .fold(0.0, |acc, value| acc + value);
            SigTerm {
                code: format!("T{}", i + 1),
                label: def.label.to_string(),
                sources: def.sources.iter().map(|(_, code)| code.to_string()).collect(),
                amount,
            }
        })
        .collect();

    let term_value = |n: usize| terms[n - 1].amount;
    let mut soldes: Vec<SigSubtotal> = Vec::with_capacity(SIG_FORMULAS.len());
    for (i, formula) in SIG_FORMULAS.iter().enumerate() {
        let amount = evaluate(formula, term_value, |n| soldes[n - 1].amount);
        soldes.push(SigSubtotal {
            code: format!("SIG{}", i + 1),
            reference_code: formula.reference_code.to_string(),
            label: formula.label.to_string(),
            amount,
        });
    }

    SigCascade { terms, soldes }
}
