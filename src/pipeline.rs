// ===============================
// src/pipeline.rs
// ===============================
//
// Urutan run:
//   1) preflight  : bangun distribusi status + cek key space (belum ada draw / file)
//   2) generate   : 11 tabel, urutan tetap (urutan draw = bagian dari output)
//   3) write      : satu CSV per tabel; error pertama menghentikan sisa tabel
//
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Settings;
use crate::context::{Categorical, GenContext};
use crate::domain::{
    Dividend, Import, ImportRow, ImportRowStatus, ImportStatus, Portfolio, PortfolioNav,
    PortfolioReturn, Position, PriceDaily, Security, Table, Trade, User,
};
use crate::error::{GenError, Result};
use crate::generate;
use crate::metrics;
use crate::unique::{allowed_rows, key_space};
use crate::writer::write_table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub table: &'static str,
    pub rows: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub users: Vec<User>,
    pub securities: Vec<Security>,
    pub portfolios: Vec<Portfolio>,
    pub trades: Vec<Trade>,
    pub positions: Vec<Position>,
    pub prices: Vec<PriceDaily>,
    pub dividends: Vec<Dividend>,
    pub navs: Vec<PortfolioNav>,
    pub returns: Vec<PortfolioReturn>,
    pub imports: Vec<Import>,
    pub import_rows: Vec<ImportRow>,
}

/// Refuse composite-key targets too close to their key space before any draw.
fn check_key_spaces(s: &Settings) -> Result<()> {
    let c = &s.counts;
    let days = s.dates.days();
    let (p, sec) = (c.portfolios as u64, c.securities as u64);
    let plan = [
        ("Position", c.positions, key_space(&[p, sec, days])),
        ("PriceDaily", c.prices, key_space(&[sec, days])),
        ("PortfolioNAV", c.nav_rows, key_space(&[p, days])),
        ("PortfolioReturn", c.return_rows, key_space(&[p, days])),
    ];
    for (table, requested, key_space) in plan {
        let allowed = allowed_rows(key_space, s.max_key_fill);
        if requested > allowed {
            return Err(GenError::KeySpace { table, requested, allowed, key_space });
        }
    }
    Ok(())
}

impl Dataset {
    pub fn generate(ctx: &mut GenContext, s: &Settings) -> Result<Self> {
        let import_status =
            Categorical::new("IMPORT_STATUS_WEIGHTS", &ImportStatus::ALL, &s.import_status_weights)?;
        let row_status = Categorical::new(
            "IMPORT_ROW_STATUS_WEIGHTS",
            &ImportRowStatus::ALL,
            &s.import_row_status_weights,
        )?;
        check_key_spaces(s)?;

        let c = &s.counts;
        // Batas id parent (sudah divalidasi muat di u32)
        let (users, securities, portfolios, imports) =
            (c.users as u32, c.securities as u32, c.portfolios as u32, c.imports as u32);
        let fill = s.max_key_fill;

        Ok(Dataset {
            users: generate::users(ctx, c.users),
            securities: generate::securities(ctx, c.securities),
            portfolios: generate::portfolios(ctx, c.portfolios, users, &s.timestamps),
            trades: generate::trades(ctx, c.trades, portfolios, securities, &s.timestamps),
            positions: generate::positions(ctx, c.positions, portfolios, securities, &s.dates, fill)?,
            prices: generate::prices(ctx, c.prices, securities, &s.dates, fill)?,
            dividends: generate::dividends(ctx, c.dividends, securities, &s.dates),
            navs: generate::navs(ctx, c.nav_rows, portfolios, &s.dates, fill)?,
            returns: generate::returns(ctx, c.return_rows, portfolios, &s.dates, fill)?,
            imports: generate::imports(ctx, c.imports, portfolios, &s.timestamps, &import_status),
            import_rows: generate::import_rows(
                ctx,
                c.import_rows,
                imports,
                securities,
                &s.dates,
                s.normalized_security_prob,
                &row_status,
            )?,
        })
    }

    pub fn write(&self, dir: &Path) -> Result<Vec<Written>> {
        let mut out = Vec::with_capacity(11);
        emit(dir, &self.users, &mut out)?;
        emit(dir, &self.securities, &mut out)?;
        emit(dir, &self.portfolios, &mut out)?;
        emit(dir, &self.trades, &mut out)?;
        emit(dir, &self.positions, &mut out)?;
        emit(dir, &self.prices, &mut out)?;
        emit(dir, &self.dividends, &mut out)?;
        emit(dir, &self.navs, &mut out)?;
        emit(dir, &self.returns, &mut out)?;
        emit(dir, &self.imports, &mut out)?;
        emit(dir, &self.import_rows, &mut out)?;
        Ok(out)
    }
}

fn emit<T: Table>(dir: &Path, rows: &[T], out: &mut Vec<Written>) -> Result<()> {
    let path = write_table(dir, rows)?;
    out.push(Written { table: T::NAME, rows: rows.len(), path });
    Ok(())
}

/// One full run: seed, generate every table, write every file.
pub fn run(seed: u64, out_dir: &Path, settings: &Settings) -> Result<Vec<Written>> {
    metrics::record_seed(seed);
    let mut ctx = GenContext::new(seed);
    let data = Dataset::generate(&mut ctx, settings)?;
    let written = data.write(out_dir)?;
    info!(seed, draws = ctx.draws(), tables = written.len(), "run complete");
    Ok(written)
}
