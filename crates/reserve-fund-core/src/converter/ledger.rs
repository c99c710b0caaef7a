use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ReserveFundError;
use crate::types::{Money, Rate};
use crate::ReserveFundResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Purpose of a bank account held by the corporation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Operating,
    Reserve,
}

/// Dated balance observation for one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub date: NaiveDate,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub name: String,
    pub kind: AccountKind,
    /// Contractual spread below the reference (prime) rate
    pub spread: Rate,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub balances: Vec<AccountBalance>,
}

/// How often a holding pays its coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestFrequency {
    Annual,
    SemiAnnual,
    Quarterly,
    AtMaturity,
}

impl InterestFrequency {
    /// Months between coupons; `None` for a single payment at maturity.
    pub fn months(self) -> Option<u32> {
        match self {
            InterestFrequency::Annual => Some(12),
            InterestFrequency::SemiAnnual => Some(6),
            InterestFrequency::Quarterly => Some(3),
            InterestFrequency::AtMaturity => None,
        }
    }
}

/// Interest credited for an `AtMaturity` holding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtMaturityInterest {
    /// Simple interest over the issue-to-maturity months, paid at maturity.
    /// Zero when the holding has no issue date.
    #[default]
    Accrued,
    /// No interest; principal only. Reproduces the legacy planner's
    /// zero-month coupon interval.
    Zero,
}

/// A fixed-term investment bought before the plan starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    #[serde(default)]
    pub name: Option<String>,
    pub amount: Money,
    /// Annual coupon rate
    pub interest_rate: Rate,
    pub maturity_date: NaiveDate,
    pub interest_frequency: InterestFrequency,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub archived: bool,
}

impl Holding {
    /// Still on the books at `as_of`.
    pub fn is_current(&self, as_of: NaiveDate) -> bool {
        !self.archived && self.maturity_date >= as_of
    }

    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} maturing {}", self.amount, self.maturity_date))
    }
}

/// Everything the converter needs about one reserve-fund study and the
/// corporation's accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyLedger {
    pub first_year: i32,
    pub years: usize,
    /// One entry per study year; extra entries are ignored
    pub annual_contributions: Vec<Money>,
    pub annual_expenditures: Vec<Money>,
    #[serde(default)]
    pub bank_accounts: Vec<BankAccount>,
    #[serde(default)]
    pub holdings: Vec<Holding>,
    #[serde(default)]
    pub at_maturity_interest: AtMaturityInterest,
}

impl StudyLedger {
    /// The single active reserve account.
    pub fn reserve_account(&self) -> ReserveFundResult<&BankAccount> {
        let mut reserves = self
            .bank_accounts
            .iter()
            .filter(|a| a.kind == AccountKind::Reserve && !a.archived);
        let first = reserves.next().ok_or_else(|| {
            ReserveFundError::MissingLedgerData(
                "No reserve bank account; add the reserve account before planning".into(),
            )
        })?;
        if reserves.next().is_some() {
            return Err(ReserveFundError::InvalidInput {
                field: "bank_accounts".into(),
                reason: "more than one active reserve account".into(),
            });
        }
        Ok(first)
    }

    /// Latest balance entry of the reserve account.
    pub fn latest_reserve_balance(&self) -> ReserveFundResult<&AccountBalance> {
        let account = self.reserve_account()?;
        account
            .balances
            .iter()
            .max_by_key(|b| b.date)
            .ok_or_else(|| {
                ReserveFundError::MissingLedgerData(format!(
                    "No balance entry for reserve account '{}'",
                    account.name
                ))
            })
    }

    /// Holdings still on the books at `as_of`.
    pub fn current_holdings(&self, as_of: NaiveDate) -> impl Iterator<Item = &Holding> {
        self.holdings.iter().filter(move |h| h.is_current(as_of))
    }
}
