#![deny(warnings)]

//! Core domain models and invariants for Lemonade Tycoon.
//!
//! This crate defines the cost table, the financial state every ledger
//! update flows through, and validation helpers that guarantee the
//! accounting identities hold after each engine operation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Per-unit purchase prices plus the advertising campaign unit cost.
///
/// One prepared serving consumes one lemon, one sugar portion, and one
/// cup, so [`CostTable::cup_ingredient_cost`] is the plain sum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostTable {
    /// Cost of one lemon in EUR.
    pub lemon_eur: Decimal,
    /// Cost of one sugar portion in EUR.
    pub sugar_eur: Decimal,
    /// Cost of one disposable cup in EUR.
    pub cup_eur: Decimal,
    /// Cost of one advertising campaign unit in EUR.
    pub ad_campaign_eur: Decimal,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            lemon_eur: Decimal::new(50, 2),
            sugar_eur: Decimal::new(10, 2),
            cup_eur: Decimal::new(8, 2),
            ad_campaign_eur: Decimal::new(500, 2),
        }
    }
}

impl CostTable {
    /// Ingredient cost of a single prepared serving.
    pub fn cup_ingredient_cost(&self) -> Decimal {
        self.lemon_eur + self.sugar_eur + self.cup_eur
    }
}

/// Daily climate, the main driver of base customer demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    Hot,
    Mild,
    Cold,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Weather::Hot => "Hot",
            Weather::Mild => "Mild",
            Weather::Cold => "Cold",
        };
        f.write_str(label)
    }
}

/// Game-wide configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Length of a game in days.
    pub total_days: u32,
    /// Equity paid in at day one; also the opening cash balance.
    pub initial_capital_eur: Decimal,
    /// Seed for the weather/demand RNG.
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_days: 7,
            initial_capital_eur: Decimal::new(100, 0),
            rng_seed: 42,
        }
    }
}

/// Immutable record of one simulated day. Money fields carry the
/// presentation rounding (2 decimal places).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: u32,
    pub weather: Weather,
    /// Customers that showed up.
    pub demand: u32,
    /// Cups actually sold (capped by prepared stock).
    pub sold: u32,
    pub revenue_eur: Decimal,
    pub cogs_eur: Decimal,
    /// Revenue minus cost of goods sold for the day.
    pub profit_eur: Decimal,
    /// Cash balance after the day closed.
    pub cash_eur: Decimal,
}

/// Single source of truth for the business. Mutated only through the
/// simulation engine; every mutation leaves the identities in
/// [`validate_state`] intact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialState {
    /// Current day, starting at 1. Greater than `total_days` once the
    /// game has ended.
    pub day: u32,
    pub total_days: u32,
    /// Cash on hand. Never negative: spends are rejected, not clamped.
    pub cash_eur: Decimal,
    pub lemons: u32,
    pub sugar: u32,
    pub cups: u32,
    /// Unsold prepared servings.
    pub prepared: u32,
    /// Weighted-average cost basis of the unsold prepared servings.
    pub prepared_cost_eur: Decimal,
    pub sale_price_eur: Decimal,
    /// Servings produced since the last day close.
    pub produced_today: u32,
    /// Cumulative revenue recognized.
    pub revenue_eur: Decimal,
    /// Cumulative cost of goods sold.
    pub cogs_eur: Decimal,
    /// Cumulative operating expenses (advertising).
    pub operating_expenses_eur: Decimal,
    /// Cumulative cash collected.
    pub cash_receipts_eur: Decimal,
    /// Cumulative cash paid out.
    pub cash_payments_eur: Decimal,
    /// Retained result: revenue - COGS - operating expenses.
    pub retained_profit_eur: Decimal,
    pub initial_capital_eur: Decimal,
    /// Always zero today; kept so loans can be modeled later.
    pub debt_eur: Decimal,
    /// Persistent demand boost bought through advertising.
    pub quality_level: u32,
    /// Append-only day log. Snapshots expose the most recent entries.
    pub history: Vec<DaySummary>,
    /// Narration of the most recent action or day close.
    pub last_day_message: String,
}

impl FinancialState {
    /// Fresh opening state: cash equals paid-in capital, empty ledgers.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            day: 1,
            total_days: config.total_days,
            cash_eur: config.initial_capital_eur,
            lemons: 0,
            sugar: 0,
            cups: 0,
            prepared: 0,
            prepared_cost_eur: Decimal::ZERO,
            sale_price_eur: Decimal::new(100, 2),
            produced_today: 0,
            revenue_eur: Decimal::ZERO,
            cogs_eur: Decimal::ZERO,
            operating_expenses_eur: Decimal::ZERO,
            cash_receipts_eur: Decimal::ZERO,
            cash_payments_eur: Decimal::ZERO,
            retained_profit_eur: Decimal::ZERO,
            initial_capital_eur: config.initial_capital_eur,
            debt_eur: Decimal::ZERO,
            quality_level: 0,
            history: Vec::new(),
            last_day_message:
                "Welcome! Set a price, buy ingredients and produce, then simulate the day."
                    .to_string(),
        }
    }

    /// True once the final day has been simulated.
    pub fn ended(&self) -> bool {
        self.day > self.total_days
    }
}

/// Player-facing failures. All are recoverable game feedback, never
/// process faults.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    /// A spend would push cash below zero.
    #[error("not enough cash: need {needed} EUR but only {available} EUR available")]
    InsufficientFunds { needed: Decimal, available: Decimal },
    /// Sale price must be strictly positive.
    #[error("the sale price must be greater than zero")]
    InvalidPrice,
    /// Production request yields zero producible servings.
    #[error("not enough ingredients to produce anything")]
    NoIngredients,
    /// Day-advance requested after the horizon.
    #[error("the game has already ended")]
    GameEnded,
}

/// Violations of the accounting identities.
#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("cash is negative: {0}")]
    NegativeCash(Decimal),
    #[error("prepared inventory cost is negative: {0}")]
    NegativeInventoryCost(Decimal),
    #[error("cost basis {0} attached to an empty prepared inventory")]
    DanglingCostBasis(Decimal),
    #[error("profit identity violated: retained {retained} != {expected}")]
    ProfitIdentity { retained: Decimal, expected: Decimal },
    #[error("balance identity violated: assets {assets} != financing {financing}")]
    BalanceIdentity { assets: Decimal, financing: Decimal },
}

/// Value of the raw ingredient stock at purchase cost.
pub fn ingredient_value(state: &FinancialState, costs: &CostTable) -> Decimal {
    Decimal::from(state.lemons) * costs.lemon_eur
        + Decimal::from(state.sugar) * costs.sugar_eur
        + Decimal::from(state.cups) * costs.cup_eur
}

/// Check sign constraints and both accounting identities.
///
/// Comparisons are exact: every engine operation is closed under
/// `Decimal` arithmetic, so no tolerance is needed.
pub fn validate_state(state: &FinancialState, costs: &CostTable) -> Result<(), StateError> {
    if state.cash_eur < Decimal::ZERO {
        return Err(StateError::NegativeCash(state.cash_eur));
    }
    if state.prepared_cost_eur < Decimal::ZERO {
        return Err(StateError::NegativeInventoryCost(state.prepared_cost_eur));
    }
    if state.prepared == 0 && state.prepared_cost_eur != Decimal::ZERO {
        return Err(StateError::DanglingCostBasis(state.prepared_cost_eur));
    }
    let expected = state.revenue_eur - state.cogs_eur - state.operating_expenses_eur;
    if state.retained_profit_eur != expected {
        return Err(StateError::ProfitIdentity {
            retained: state.retained_profit_eur,
            expected,
        });
    }
    let assets = state.cash_eur + ingredient_value(state, costs) + state.prepared_cost_eur;
    let financing = state.debt_eur + state.initial_capital_eur + state.retained_profit_eur;
    if assets != financing {
        return Err(StateError::BalanceIdentity { assets, financing });
    }
    Ok(())
}
