#![deny(warnings)]

//! Headless scripted run of the lemonade stand, for demos and smoke
//! checks: plays a fixed strategy for the whole horizon, prints the day
//! lines, and fails if the books stop balancing.

use anyhow::{bail, Result};
use rust_decimal::Decimal;
use sim_core::GameConfig;
use sim_engine::Game;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn parse_args() -> (Option<u32>, Option<u64>) {
    let mut days: Option<u32> = None;
    let mut seed: Option<u64> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--days" => days = it.next().and_then(|s| s.parse().ok()),
            "--seed" => seed = it.next().and_then(|s| s.parse().ok()),
            _ => {}
        }
    }
    (days, seed)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let (days, seed) = parse_args();
    let config = GameConfig {
        total_days: days.unwrap_or(7),
        rng_seed: seed.unwrap_or(42),
        ..GameConfig::default()
    };
    info!(days = config.total_days, seed = config.rng_seed, "starting scripted run");

    let mut game = Game::new(config.clone());
    game.set_sale_price(Decimal::new(120, 2))?;
    for _ in 0..config.total_days {
        // Restock if cash allows; a failed buy just means selling from
        // whatever stock is left.
        if game.purchase_ingredients(40, 40, 40).is_err() {
            let _ = game.purchase_ingredients(10, 10, 10);
        }
        let _ = game.produce(40);
        let report = game.advance_day(Decimal::ZERO);
        println!("{}", report.message);
    }

    if let Err(err) = game.check_invariants() {
        bail!("books out of balance after the run: {err}");
    }

    let balance = game.balance_sheet();
    let income = game.income_statement();
    let cash = game.cash_flow();
    println!(
        "Run complete | days: {} | revenue: {} EUR | profit: {} EUR | cash: {} EUR",
        config.total_days, income.revenue_eur, income.profit_eur, cash.cash_eur
    );
    println!(
        "Balance | assets: {} EUR | financing: {} EUR (capital {} + retained {})",
        balance.total_assets_eur,
        balance.total_financing_eur,
        balance.equity.initial_capital_eur,
        balance.equity.retained_profit_eur
    );

    Ok(())
}
