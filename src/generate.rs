// ===============================
// src/generate.rs
// ===============================
//
// Satu generator per tabel. Semua draw lewat GenContext yang sama.
//
// 1) Sequential id (User, Security, Portfolio, Trade, Dividend, Import, ImportRow)
//    -> id 1..=n, FK di-draw uniform dari range id parent.
// 2) Composite key (Position, PriceDaily, PortfolioNAV, PortfolioReturn)
//    -> rejection sampling lewat unique::sample_unique.
//
// Catatan: parent count dikirim sebagai `u32` (id terbesar parent).
//
use chrono::Duration;

use crate::config::{DateTimeWindow, DateWindow};
use crate::context::{Categorical, GenContext};
use crate::domain::{
    ticker_for, Currency, Dividend, Exchange, Fixed, Import, ImportRow, ImportRowStatus,
    ImportStatus, Portfolio, PortfolioNav, PortfolioReturn, Position, PriceDaily,
    RawImportPayload, Security, Side, Trade, TradeSource, User,
};
use crate::error::Result;
use crate::unique::{key_space, sample_unique};

const PASSWORD_HASH_LEN: usize = 32;

fn ids(n: usize) -> impl Iterator<Item = u32> {
    (1..=n).map(|i| i as u32)
}

pub fn users(ctx: &mut GenContext, n: usize) -> Vec<User> {
    ids(n)
        .map(|user_id| User {
            user_id,
            email: format!("user{user_id}@example.com"),
            password_hash: format!("hash_{}", ctx.alphanumeric(PASSWORD_HASH_LEN)),
            username: format!("user_{user_id:03}"),
        })
        .collect()
}

pub fn securities(ctx: &mut GenContext, n: usize) -> Vec<Security> {
    ids(n)
        .map(|security_id| {
            let ticker = ticker_for(security_id);
            let exchange = ctx.pick(&Exchange::ALL);
            let currency = ctx.pick(&Currency::ALL);
            Security { security_id, name: format!("Company {ticker}"), ticker, exchange, currency }
        })
        .collect()
}

pub fn portfolios(ctx: &mut GenContext, n: usize, users: u32, ts: &DateTimeWindow) -> Vec<Portfolio> {
    ids(n)
        .map(|portfolio_id| Portfolio {
            portfolio_id,
            name: format!("Portfolio {portfolio_id:03}"),
            user_id: ctx.id(users),
            base_currency: ctx.pick(&Currency::ALL),
            creation_date: ctx.datetime(ts),
        })
        .collect()
}

pub fn trades(
    ctx: &mut GenContext,
    n: usize,
    portfolios: u32,
    securities: u32,
    ts: &DateTimeWindow,
) -> Vec<Trade> {
    ids(n)
        .map(|trade_id| Trade {
            trade_id,
            portfolio_id: ctx.id(portfolios),
            security_id: ctx.id(securities),
            side: ctx.pick(&Side::ALL),
            quantity: ctx.uniform(1.0, 1000.0),
            price: ctx.uniform(5.0, 500.0),
            settlement_currency: ctx.pick(&Currency::ALL),
            fees: ctx.uniform(0.0, 25.0),
            trade_time: ctx.datetime(ts),
            source: ctx.pick(&TradeSource::ALL),
            note: None,
        })
        .collect()
}

pub fn positions(
    ctx: &mut GenContext,
    n: usize,
    portfolios: u32,
    securities: u32,
    dates: &DateWindow,
    max_fill: f64,
) -> Result<Vec<Position>> {
    let space = key_space(&[u64::from(portfolios), u64::from(securities), dates.days()]);
    sample_unique(
        ctx,
        "Position",
        n,
        space,
        max_fill,
        |c| (c.id(portfolios), c.id(securities), c.date(dates)),
        |c, (portfolio_id, security_id, as_of_date)| Position {
            portfolio_id,
            security_id,
            as_of_date,
            quantity: c.uniform(1.0, 2000.0),
            avg_cost: c.uniform(5.0, 500.0),
        },
    )
}

pub fn prices(
    ctx: &mut GenContext,
    n: usize,
    securities: u32,
    dates: &DateWindow,
    max_fill: f64,
) -> Result<Vec<PriceDaily>> {
    let space = key_space(&[u64::from(securities), dates.days()]);
    sample_unique(
        ctx,
        "PriceDaily",
        n,
        space,
        max_fill,
        |c| (c.id(securities), c.date(dates)),
        |c, (security_id, price_date)| PriceDaily {
            security_id,
            price_date,
            close_price: c.uniform(5.0, 500.0),
        },
    )
}

pub fn dividends(ctx: &mut GenContext, n: usize, securities: u32, dates: &DateWindow) -> Vec<Dividend> {
    ids(n)
        .map(|dividend_id| {
            let security_id = ctx.id(securities);
            let ex_date = ctx.date(dates);
            // bayar 1-8 minggu setelah ex-date
            let pay_date = ex_date + Duration::days(ctx.int(7..=60));
            Dividend {
                dividend_id,
                security_id,
                ex_date,
                pay_date,
                amount_per_share: ctx.uniform(0.05, 3.00),
                dividend_currency: ctx.pick(&Currency::ALL),
            }
        })
        .collect()
}

pub fn navs(
    ctx: &mut GenContext,
    n: usize,
    portfolios: u32,
    dates: &DateWindow,
    max_fill: f64,
) -> Result<Vec<PortfolioNav>> {
    let space = key_space(&[u64::from(portfolios), dates.days()]);
    sample_unique(
        ctx,
        "PortfolioNAV",
        n,
        space,
        max_fill,
        |c| (c.id(portfolios), c.date(dates)),
        |c, (portfolio_id, nav_date)| {
            let cash: Fixed<2> = c.uniform(0.0, 1_000_000.0);
            let net_value = Fixed::new(cash.value() + c.raw_uniform(-200_000.0, 2_000_000.0));
            PortfolioNav { portfolio_id, nav_date, cash, net_value }
        },
    )
}

pub fn returns(
    ctx: &mut GenContext,
    n: usize,
    portfolios: u32,
    dates: &DateWindow,
    max_fill: f64,
) -> Result<Vec<PortfolioReturn>> {
    let space = key_space(&[u64::from(portfolios), dates.days()]);
    sample_unique(
        ctx,
        "PortfolioReturn",
        n,
        space,
        max_fill,
        |c| (c.id(portfolios), c.date(dates)),
        // -5% .. +5%
        |c, (portfolio_id, date)| PortfolioReturn { portfolio_id, date, daily_return: c.uniform(-0.05, 0.05) },
    )
}

pub fn imports(
    ctx: &mut GenContext,
    n: usize,
    portfolios: u32,
    ts: &DateTimeWindow,
    statuses: &Categorical<ImportStatus>,
) -> Vec<Import> {
    ids(n)
        .map(|import_id| {
            let portfolio_id = ctx.id(portfolios);
            let status = ctx.pick_weighted(statuses);
            Import {
                import_id,
                portfolio_id,
                filename: format!("import_{import_id:03}.csv"),
                status,
                created_at: ctx.datetime(ts),
                error_message: (status == ImportStatus::Failed).then_some(ImportStatus::FAILURE_MESSAGE),
            }
        })
        .collect()
}

pub fn import_rows(
    ctx: &mut GenContext,
    n: usize,
    imports: u32,
    securities: u32,
    dates: &DateWindow,
    normalized_prob: f64,
    statuses: &Categorical<ImportRowStatus>,
) -> Result<Vec<ImportRow>> {
    let mut rows = Vec::with_capacity(n);
    for import_row_id in ids(n) {
        let import_id = ctx.id(imports);
        // Sebagian ticker gagal dinormalisasi -> NULL di DB
        let normalized_security_id =
            if ctx.chance(normalized_prob) { Some(ctx.id(securities)) } else { None };
        let status = ctx.pick_weighted(statuses);

        let payload = RawImportPayload {
            raw_ticker: ticker_for(ctx.id(securities)),
            date: ctx.date(dates),
            quantity: ctx.uniform(1.0, 1000.0),
            price: ctx.uniform(5.0, 500.0),
        };

        rows.push(ImportRow {
            import_row_id,
            import_id,
            raw_data: serde_json::to_string(&payload)?,
            normalized_security_id,
            status,
            error_message: (status == ImportRowStatus::Failed).then_some(ImportRowStatus::FAILURE_MESSAGE),
        });
    }
    Ok(rows)
}
