#![deny(warnings)]

//! Simulation engine for Lemonade Tycoon.
//!
//! [`Game`] owns the financial state and advances it through the player
//! actions (purchasing, pricing, production, advertising) and the daily
//! sales cycle. Accounting views are recomputed from the ledgers on
//! every query; nothing here caches.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use sim_core::{
    ingredient_value, validate_state, CostTable, DaySummary, FinancialState, GameConfig,
    GameError, StateError, Weather,
};
use tracing::{debug, info};

/// Number of history entries exposed in public snapshots.
const HISTORY_WINDOW: usize = 10;

/// Round for presentation and pin the scale so money always renders
/// with two decimal places.
fn money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}

fn clamp_qty(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Outcome of a day-advance request. `summary` is absent when the game
/// had already ended.
#[derive(Clone, Debug, Serialize)]
pub struct DayReport {
    pub summary: Option<DaySummary>,
    pub message: String,
}

/// Asset side of the balance sheet, valued at cost.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Assets {
    pub cash_eur: Decimal,
    pub ingredient_stock_eur: Decimal,
    pub prepared_stock_eur: Decimal,
    /// Placeholder: the stand owns no equipment yet.
    pub fixed_assets_eur: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Liabilities {
    pub debt_eur: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Equity {
    pub initial_capital_eur: Decimal,
    pub retained_profit_eur: Decimal,
}

/// Simplified balance sheet. Both totals are reported and always equal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BalanceSheet {
    pub assets: Assets,
    pub total_assets_eur: Decimal,
    pub liabilities: Liabilities,
    pub equity: Equity,
    pub total_financing_eur: Decimal,
}

/// Cumulative income statement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IncomeStatement {
    pub revenue_eur: Decimal,
    pub cogs_eur: Decimal,
    pub operating_expenses_eur: Decimal,
    pub profit_eur: Decimal,
}

/// Cumulative cash movements and the resulting balance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CashFlow {
    pub receipts_eur: Decimal,
    pub payments_eur: Decimal,
    pub cash_eur: Decimal,
}

/// Everything a frontend needs to render the game.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub day: u32,
    pub total_days: u32,
    pub ended: bool,
    pub cash_eur: Decimal,
    pub lemons: u32,
    pub sugar: u32,
    pub cups: u32,
    pub prepared: u32,
    pub produced_today: u32,
    pub sale_price_eur: Decimal,
    pub quality_level: u32,
    pub weather: Weather,
    pub base_demand: u32,
    pub last_day_message: String,
    pub history: Vec<DaySummary>,
    pub balance_sheet: BalanceSheet,
    pub income_statement: IncomeStatement,
    pub cash_flow: CashFlow,
}

/// The running game: ledgers, price list, today's market conditions,
/// and the RNG driving weather and demand noise.
///
/// Callers serialize access externally (the HTTP facade holds one game
/// behind a mutex). Every action validates feasibility before touching
/// the state, so a rejected action leaves no partial writes.
pub struct Game {
    config: GameConfig,
    costs: CostTable,
    state: FinancialState,
    weather: Weather,
    base_demand: u32,
    rng: ChaCha8Rng,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self::with_costs(config, CostTable::default())
    }

    pub fn with_costs(config: GameConfig, costs: CostTable) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let state = FinancialState::new(&config);
        let (weather, base_demand) = sim_econ::roll_weather(&mut rng);
        info!(
            total_days = config.total_days,
            seed = config.rng_seed,
            %weather,
            "new game"
        );
        Self {
            config,
            costs,
            state,
            weather,
            base_demand,
            rng,
        }
    }

    /// Discard everything and start over with the same configuration.
    /// The RNG keeps running, so a reset game does not replay the
    /// previous weather sequence.
    pub fn reset(&mut self) {
        self.state = FinancialState::new(&self.config);
        self.state.last_day_message =
            "Game restarted. Start by buying ingredients.".to_string();
        let (weather, base_demand) = sim_econ::roll_weather(&mut self.rng);
        self.weather = weather;
        self.base_demand = base_demand;
        info!(%weather, base_demand, "game reset");
    }

    pub fn state(&self) -> &FinancialState {
        &self.state
    }

    pub fn costs(&self) -> &CostTable {
        &self.costs
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn base_demand(&self) -> u32 {
        self.base_demand
    }

    /// Buy raw ingredients for cash. Quantities below zero count as
    /// zero; the whole purchase is rejected if cash cannot cover it.
    pub fn purchase_ingredients(
        &mut self,
        lemons: i64,
        sugar: i64,
        cups: i64,
    ) -> Result<String, GameError> {
        let lemons = clamp_qty(lemons);
        let sugar = clamp_qty(sugar);
        let cups = clamp_qty(cups);
        let total = Decimal::from(lemons) * self.costs.lemon_eur
            + Decimal::from(sugar) * self.costs.sugar_eur
            + Decimal::from(cups) * self.costs.cup_eur;
        if total > self.state.cash_eur {
            return Err(GameError::InsufficientFunds {
                needed: money(total),
                available: money(self.state.cash_eur),
            });
        }
        self.state.cash_eur -= total;
        self.state.cash_payments_eur += total;
        self.state.lemons = self.state.lemons.saturating_add(lemons);
        self.state.sugar = self.state.sugar.saturating_add(sugar);
        self.state.cups = self.state.cups.saturating_add(cups);
        let message = format!(
            "Bought {lemons} lemons, {sugar} sugar, {cups} cups for {} EUR.",
            money(total)
        );
        self.state.last_day_message = message.clone();
        debug!(lemons, sugar, cups, cost = %total, "ingredients purchased");
        Ok(message)
    }

    /// Set the sale price per cup, stored at cent precision.
    pub fn set_sale_price(&mut self, price: Decimal) -> Result<String, GameError> {
        if price <= Decimal::ZERO {
            return Err(GameError::InvalidPrice);
        }
        self.state.sale_price_eur = price.round_dp(2);
        debug!(price = %self.state.sale_price_eur, "price set");
        Ok(format!(
            "Price set to {} EUR per cup.",
            money(self.state.sale_price_eur)
        ))
    }

    /// Prepare servings from raw ingredients. Production is capped by
    /// the scarcest ingredient and accumulates across same-day calls.
    pub fn produce(&mut self, qty: i64) -> Result<String, GameError> {
        let qty = clamp_qty(qty);
        let max_possible = self.state.lemons.min(self.state.sugar).min(self.state.cups);
        let produced = qty.min(max_possible);
        if produced == 0 {
            return Err(GameError::NoIngredients);
        }
        self.state.lemons -= produced;
        self.state.sugar -= produced;
        self.state.cups -= produced;
        let added_cost = Decimal::from(produced) * self.costs.cup_ingredient_cost();
        self.state.prepared += produced;
        self.state.prepared_cost_eur += added_cost;
        self.state.produced_today += produced;
        debug!(
            produced,
            total_today = self.state.produced_today,
            added_cost = %added_cost,
            "production run"
        );
        Ok(format!(
            "Produced {produced} cups, adding {} EUR of inventory cost.",
            money(added_cost)
        ))
    }

    /// Spend on advertising. Each full campaign unit raises the quality
    /// level, which keeps boosting demand for the rest of the game.
    /// Operating expenses debit retained profit the moment they are
    /// incurred.
    pub fn run_advertising_campaign(&mut self, spend: Decimal) -> Result<String, GameError> {
        let spend = spend.max(Decimal::ZERO);
        if spend > self.state.cash_eur {
            return Err(GameError::InsufficientFunds {
                needed: money(spend),
                available: money(self.state.cash_eur),
            });
        }
        self.state.cash_eur -= spend;
        self.state.cash_payments_eur += spend;
        self.state.operating_expenses_eur += spend;
        self.state.retained_profit_eur -= spend;
        let gained = (spend / self.costs.ad_campaign_eur)
            .floor()
            .to_u32()
            .unwrap_or(0);
        self.state.quality_level += gained;
        debug!(
            spend = %spend,
            gained,
            level = self.state.quality_level,
            "advertising campaign"
        );
        Ok(format!(
            "Campaign run for {} EUR. Visibility +{gained}.",
            money(spend)
        ))
    }

    /// Close out the current day: optional advertising first, then
    /// demand, sales, ledger updates, and the roll to the next morning.
    /// Calling this after the final day is a no-op.
    pub fn advance_day(&mut self, advertising_spend: Decimal) -> DayReport {
        if self.state.ended() {
            let message = format!(
                "The game ended after day {}. Reset to play again.",
                self.state.total_days
            );
            self.state.last_day_message = message.clone();
            return DayReport {
                summary: None,
                message,
            };
        }

        // A failed campaign is reported but never blocks the sales day.
        let ad_note = if advertising_spend > Decimal::ZERO {
            match self.run_advertising_campaign(advertising_spend) {
                Ok(note) => format!("{note} "),
                Err(err) => format!("{err}. "),
            }
        } else {
            String::new()
        };

        let demand = sim_econ::realized_demand(
            self.base_demand,
            self.state.sale_price_eur,
            self.costs.cup_ingredient_cost(),
            self.state.quality_level,
            &mut self.rng,
        );
        let sold = self.state.prepared.min(demand);
        let revenue = Decimal::from(sold) * self.state.sale_price_eur;

        // Weighted-average costing: every unsold serving carries the
        // same share of the accumulated cost basis.
        let cogs = if self.state.prepared > 0 {
            (self.state.prepared_cost_eur / Decimal::from(self.state.prepared))
                * Decimal::from(sold)
        } else {
            Decimal::ZERO
        };
        self.state.prepared -= sold;
        self.state.prepared_cost_eur = if self.state.prepared == 0 {
            Decimal::ZERO
        } else {
            (self.state.prepared_cost_eur - cogs).max(Decimal::ZERO)
        };

        self.state.cash_eur += revenue;
        self.state.cash_receipts_eur += revenue;
        self.state.revenue_eur += revenue;
        self.state.cogs_eur += cogs;
        let day_profit = revenue - cogs;
        self.state.retained_profit_eur += day_profit;

        let summary = DaySummary {
            day: self.state.day,
            weather: self.weather,
            demand,
            sold,
            revenue_eur: money(revenue),
            cogs_eur: money(cogs),
            profit_eur: money(day_profit),
            cash_eur: money(self.state.cash_eur),
        };
        let message = format!(
            "{ad_note}Day {}: {} weather, demand {demand}. Sold {sold} cups for {} EUR \
             (cost of sales {} EUR). Cash {} EUR.",
            summary.day, summary.weather, summary.revenue_eur, summary.cogs_eur, summary.cash_eur
        );
        info!(
            day = summary.day,
            weather = %summary.weather,
            demand,
            sold,
            revenue = %summary.revenue_eur,
            "day closed"
        );
        self.state.history.push(summary.clone());
        self.state.last_day_message = message.clone();

        self.state.produced_today = 0;
        self.state.day += 1;
        if !self.state.ended() {
            let (weather, base_demand) = sim_econ::roll_weather(&mut self.rng);
            self.weather = weather;
            self.base_demand = base_demand;
        }

        DayReport {
            summary: Some(summary),
            message,
        }
    }

    /// Balance sheet at cost, rounded for presentation.
    pub fn balance_sheet(&self) -> BalanceSheet {
        let assets = Assets {
            cash_eur: money(self.state.cash_eur),
            ingredient_stock_eur: money(ingredient_value(&self.state, &self.costs)),
            prepared_stock_eur: money(self.state.prepared_cost_eur),
            fixed_assets_eur: money(Decimal::ZERO),
        };
        let total_assets_eur = assets.cash_eur
            + assets.ingredient_stock_eur
            + assets.prepared_stock_eur
            + assets.fixed_assets_eur;
        let liabilities = Liabilities {
            debt_eur: money(self.state.debt_eur),
        };
        let equity = Equity {
            initial_capital_eur: money(self.state.initial_capital_eur),
            retained_profit_eur: money(self.state.retained_profit_eur),
        };
        let total_financing_eur =
            liabilities.debt_eur + equity.initial_capital_eur + equity.retained_profit_eur;
        BalanceSheet {
            assets,
            total_assets_eur,
            liabilities,
            equity,
            total_financing_eur,
        }
    }

    /// Cumulative income statement.
    pub fn income_statement(&self) -> IncomeStatement {
        let revenue_eur = money(self.state.revenue_eur);
        let cogs_eur = money(self.state.cogs_eur);
        let operating_expenses_eur = money(self.state.operating_expenses_eur);
        IncomeStatement {
            revenue_eur,
            cogs_eur,
            operating_expenses_eur,
            profit_eur: revenue_eur - cogs_eur - operating_expenses_eur,
        }
    }

    /// Cumulative cash receipts and payments plus the closing balance.
    pub fn cash_flow(&self) -> CashFlow {
        CashFlow {
            receipts_eur: money(self.state.cash_receipts_eur),
            payments_eur: money(self.state.cash_payments_eur),
            cash_eur: money(self.state.cash_eur),
        }
    }

    /// Public snapshot with the accounting views and the recent history
    /// window. Pure read: two calls without a mutation in between are
    /// identical.
    pub fn snapshot(&self) -> Snapshot {
        let history_start = self.state.history.len().saturating_sub(HISTORY_WINDOW);
        Snapshot {
            day: self.state.day,
            total_days: self.state.total_days,
            ended: self.state.ended(),
            cash_eur: money(self.state.cash_eur),
            lemons: self.state.lemons,
            sugar: self.state.sugar,
            cups: self.state.cups,
            prepared: self.state.prepared,
            produced_today: self.state.produced_today,
            sale_price_eur: money(self.state.sale_price_eur),
            quality_level: self.state.quality_level,
            weather: self.weather,
            base_demand: self.base_demand,
            last_day_message: self.state.last_day_message.clone(),
            history: self.state.history[history_start..].to_vec(),
            balance_sheet: self.balance_sheet(),
            income_statement: self.income_statement(),
            cash_flow: self.cash_flow(),
        }
    }

    /// Run the invariant suite against the current ledgers.
    pub fn check_invariants(&self) -> Result<(), StateError> {
        validate_state(&self.state, &self.costs)
    }
}
