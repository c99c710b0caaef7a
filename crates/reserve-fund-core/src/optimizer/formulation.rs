//! Linear-program construction for the investment-timing problem.
//!
//! The program is assembled in a solver-independent form: every variable is
//! continuous and non-negative, the objective is maximised, and every
//! constraint is `Σ coef·x (= | <=) rhs`. Period indices are 1-based and
//! term indices run 1..=5 throughout this module.

use serde::{Deserialize, Serialize};

use super::input::OptimizerInput;
use super::MINIMUM_BANK_BALANCE;
use crate::types::{to_f64, MONTHS_PER_YEAR, TERMS};
use crate::ReserveFundResult;

/// Which rate row prices the coupons of an investment made in period `k`
/// and paying in period `i`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLookup {
    /// Zero-based row `k`: the quote for the month after origination.
    /// Matches the figures produced by the legacy planner.
    #[default]
    SettlementMonth,
    /// Zero-based row `k - 1`: the quote for the origination month itself.
    OriginationMonth,
    /// Zero-based row `i - 1`: re-priced at the coupon date.
    PaymentMonth,
}

impl RateLookup {
    /// Zero-based `term_rates` row for a coupon paid in `period` on an
    /// investment originated in `origination`.
    pub fn row(self, origination: usize, period: usize) -> usize {
        match self {
            RateLookup::SettlementMonth => origination,
            RateLookup::OriginationMonth => origination - 1,
            RateLookup::PaymentMonth => period - 1,
        }
    }
}

/// Index of a variable in the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub usize);

/// Deterministic variable layout: two `periods × TERMS` blocks followed by
/// six per-period blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLayout {
    periods: usize,
}

impl VariableLayout {
    pub fn new(periods: usize) -> Self {
        Self { periods }
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    pub fn variable_count(&self) -> usize {
        self.periods * (2 * TERMS + 6)
    }

    /// Period a variable belongs to.
    pub fn period_of(&self, var: VarId) -> usize {
        let grid = 2 * self.periods * TERMS;
        if var.0 < grid {
            (var.0 % (self.periods * TERMS)) / TERMS + 1
        } else {
            (var.0 - grid) % self.periods + 1
        }
    }

    fn grid(&self, block: usize, period: usize, term: usize) -> VarId {
        debug_assert!((1..=self.periods).contains(&period));
        debug_assert!((1..=TERMS).contains(&term));
        VarId(block * self.periods * TERMS + (period - 1) * TERMS + (term - 1))
    }

    fn scalar(&self, block: usize, period: usize) -> VarId {
        debug_assert!((1..=self.periods).contains(&period));
        VarId(2 * self.periods * TERMS + block * self.periods + (period - 1))
    }

    /// New money placed in `term` during `period`.
    pub fn investment(&self, period: usize, term: usize) -> VarId {
        self.grid(0, period, term)
    }

    /// Coupon received in `period` from past placements in `term`.
    pub fn investment_interest(&self, period: usize, term: usize) -> VarId {
        self.grid(1, period, term)
    }

    pub fn total_investment(&self, period: usize) -> VarId {
        self.scalar(0, period)
    }

    /// Bank balance after this period's placements.
    pub fn balance(&self, period: usize) -> VarId {
        self.scalar(1, period)
    }

    /// Cash available before this period's placements.
    pub fn potential_balance(&self, period: usize) -> VarId {
        self.scalar(2, period)
    }

    pub fn maturities(&self, period: usize) -> VarId {
        self.scalar(3, period)
    }

    pub fn account_interest(&self, period: usize) -> VarId {
        self.scalar(4, period)
    }

    pub fn total_interest(&self, period: usize) -> VarId {
        self.scalar(5, period)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    LessOrEqual,
}

/// `Σ coef·x (relation) rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Coefficient of `var`, summing duplicates; zero when absent.
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms
            .iter()
            .filter(|(id, _)| *id == var)
            .map(|(_, c)| *c)
            .sum()
    }
}

/// A maximisation problem over non-negative continuous variables.
#[derive(Debug, Clone)]
pub struct LinearProgram {
    pub layout: VariableLayout,
    pub objective: Vec<(VarId, f64)>,
    pub constraints: Vec<LinearConstraint>,
}

impl LinearProgram {
    pub fn variable_count(&self) -> usize {
        self.layout.variable_count()
    }

    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }
}

/// Origination periods whose term-`term` placements pay their `n`-th annual
/// coupon in `period`, for `n = 1..=term`, paired with `n`.
fn coupon_sources(period: usize, term: usize) -> impl Iterator<Item = (usize, usize)> {
    (1..=term).filter_map(move |n| {
        let lag = MONTHS_PER_YEAR * n;
        (period > lag).then(|| (period - lag, n))
    })
}

/// Build the investment-timing program for `input`.
pub fn build_program(input: &OptimizerInput, lookup: RateLookup) -> ReserveFundResult<LinearProgram> {
    let n = input.period_count();
    let layout = VariableLayout::new(n);

    let bank_rates = input
        .bank_rates()
        .iter()
        .enumerate()
        .map(|(i, r)| to_f64(*r, &format!("bank_rates[{i}]")))
        .collect::<ReserveFundResult<Vec<f64>>>()?;
    let mut term_rates = Vec::with_capacity(n);
    for (i, row) in input.term_rates().iter().enumerate() {
        let mut converted = [0.0; TERMS];
        for (j, rate) in row.iter().enumerate() {
            converted[j] = to_f64(*rate, &format!("term_rates[{i}][{j}]"))?;
        }
        term_rates.push(converted);
    }
    let net_flows = input
        .net_flows()
        .into_iter()
        .enumerate()
        .map(|(i, f)| to_f64(f, &format!("net_flow[{}]", i + 1)))
        .collect::<ReserveFundResult<Vec<f64>>>()?;
    let opening = to_f64(input.opening_reserve_total(), "opening_reserve_total")?;
    let floor = to_f64(MINIMUM_BANK_BALANCE, "minimum_bank_balance")?;

    let mut constraints = Vec::with_capacity(n * (TERMS + 7));

    for i in 1..=n {
        // Coupons: a term-j placement made 12n periods ago pays its n-th
        // annual coupon now at the rate selected by `lookup`.
        for j in 1..=TERMS {
            let mut terms = vec![(layout.investment_interest(i, j), 1.0)];
            for (k, _) in coupon_sources(i, j) {
                let rate = term_rates[lookup.row(k, i)][j - 1];
                terms.push((layout.investment(k, j), -rate));
            }
            constraints.push(LinearConstraint {
                name: format!("investment_interest[{i},{j}]"),
                terms,
                relation: Relation::Equal,
                rhs: 0.0,
            });
        }

        // Bank interest accrues monthly on the prior period's balance.
        let mut account = vec![(layout.account_interest(i), 1.0)];
        if i > 1 {
            account.push((layout.balance(i - 1), -bank_rates[i - 1] / 12.0));
        }
        constraints.push(LinearConstraint {
            name: format!("account_interest[{i}]"),
            terms: account,
            relation: Relation::Equal,
            rhs: 0.0,
        });

        let mut total_interest = vec![
            (layout.total_interest(i), 1.0),
            (layout.account_interest(i), -1.0),
        ];
        total_interest.extend((1..=TERMS).map(|j| (layout.investment_interest(i, j), -1.0)));
        constraints.push(LinearConstraint {
            name: format!("total_interest[{i}]"),
            terms: total_interest,
            relation: Relation::Equal,
            rhs: to_f64(input.existing_interest_at(i), "existing_interest")?,
        });

        // A term-t placement returns its principal exactly 12t periods later.
        let mut maturities = vec![(layout.maturities(i), 1.0)];
        for t in 1..=TERMS {
            let lag = MONTHS_PER_YEAR * t;
            if i > lag {
                maturities.push((layout.investment(i - lag, t), -1.0));
            }
        }
        constraints.push(LinearConstraint {
            name: format!("maturities[{i}]"),
            terms: maturities,
            relation: Relation::Equal,
            rhs: to_f64(input.existing_maturity_at(i), "existing_maturities")?,
        });

        let mut floor_terms: Vec<(VarId, f64)> =
            (1..=TERMS).map(|j| (layout.investment(i, j), 1.0)).collect();
        floor_terms.push((layout.potential_balance(i), -1.0));
        constraints.push(LinearConstraint {
            name: format!("minimum_balance[{i}]"),
            terms: floor_terms,
            relation: Relation::LessOrEqual,
            rhs: -floor,
        });

        let mut total_investment = vec![(layout.total_investment(i), 1.0)];
        total_investment.extend((1..=TERMS).map(|j| (layout.investment(i, j), -1.0)));
        constraints.push(LinearConstraint {
            name: format!("total_investment[{i}]"),
            terms: total_investment,
            relation: Relation::Equal,
            rhs: 0.0,
        });

        let potential = if i == 1 {
            LinearConstraint {
                name: "potential_balance[1]".into(),
                terms: vec![(layout.potential_balance(1), 1.0)],
                relation: Relation::Equal,
                rhs: opening + net_flows[0],
            }
        } else {
            LinearConstraint {
                name: format!("potential_balance[{i}]"),
                terms: vec![
                    (layout.potential_balance(i), 1.0),
                    (layout.potential_balance(i - 1), -1.0),
                    (layout.total_investment(i - 1), 1.0),
                    (layout.total_interest(i), -1.0),
                    (layout.maturities(i), -1.0),
                ],
                relation: Relation::Equal,
                rhs: net_flows[i - 1],
            }
        };
        constraints.push(potential);

        constraints.push(LinearConstraint {
            name: format!("balance[{i}]"),
            terms: vec![
                (layout.balance(i), 1.0),
                (layout.potential_balance(i), -1.0),
                (layout.total_investment(i), 1.0),
            ],
            relation: Relation::Equal,
            rhs: 0.0,
        });
    }

    let objective = (1..=n).map(|i| (layout.total_interest(i), 1.0)).collect();

    Ok(LinearProgram {
        layout,
        objective,
        constraints,
    })
}
