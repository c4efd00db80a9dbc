// ===============================
// src/domain.rs
// ===============================
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::config::{DATETIME_FMT, DATE_FMT};

/// One CSV file: rows serialize in header order.
pub trait Table: Serialize {
    const NAME: &'static str;
    const HEADER: &'static [&'static str];
}

/// Float rounded to `DP` decimals, always rendered with exactly `DP` digits.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Fixed<const DP: u32>(f64);

impl<const DP: u32> Fixed<DP> {
    pub fn new(x: f64) -> Self {
        let scale = 10f64.powi(DP as i32);
        Self((x * scale).round() / scale)
    }
    pub fn value(&self) -> f64 { self.0 }
}

impl<const DP: u32> fmt::Display for Fixed<DP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", DP as usize, self.0)
    }
}

impl<const DP: u32> Serialize for Fixed<DP> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

pub type Qty4 = Fixed<4>;
pub type Px4 = Fixed<4>;
pub type Money2 = Fixed<2>;
pub type Ratio6 = Fixed<6>;

fn ser_date<S: Serializer>(d: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&d.format(DATE_FMT))
}

fn ser_datetime<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&t.format(DATETIME_FMT))
}

// ----- enums (nama variant = teks di CSV) -----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Currency { USD, CAD, EUR }
impl Currency { pub const ALL: [Currency; 3] = [Currency::USD, Currency::CAD, Currency::EUR]; }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Exchange {
    #[serde(rename = "NYSE")] Nyse,
    #[serde(rename = "NASDAQ")] Nasdaq,
    #[serde(rename = "TSX")] Tsx,
}
impl Exchange { pub const ALL: [Exchange; 3] = [Exchange::Nyse, Exchange::Nasdaq, Exchange::Tsx]; }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side { Buy, Sell }
impl Side { pub const ALL: [Side; 2] = [Side::Buy, Side::Sell]; }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeSource {
    Manual,
    Import,
    #[serde(rename = "API")] Api,
}
impl TradeSource { pub const ALL: [TradeSource; 3] = [TradeSource::Manual, TradeSource::Import, TradeSource::Api]; }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportStatus { Pending, Processing, Failed, Completed }
impl ImportStatus {
    pub const ALL: [ImportStatus; 4] =
        [ImportStatus::Pending, ImportStatus::Processing, ImportStatus::Failed, ImportStatus::Completed];
    pub const FAILURE_MESSAGE: &'static str = "Random failure while processing file.";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportRowStatus { Pending, Processed, Failed }
impl ImportRowStatus {
    pub const ALL: [ImportRowStatus; 3] =
        [ImportRowStatus::Pending, ImportRowStatus::Processed, ImportRowStatus::Failed];
    pub const FAILURE_MESSAGE: &'static str = "Could not parse row.";
}

// ----- rows -----

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub user_id: u32,
    pub email: String,
    pub password_hash: String,
    pub username: String,
}
impl Table for User {
    const NAME: &'static str = "User";
    const HEADER: &'static [&'static str] = &["user_id", "email", "password_hash", "username"];
}

#[derive(Debug, Clone, Serialize)]
pub struct Security {
    pub security_id: u32,
    pub ticker: String,
    pub exchange: Exchange,
    pub name: String,
    pub currency: Currency,
}
impl Table for Security {
    const NAME: &'static str = "Security";
    const HEADER: &'static [&'static str] = &["security_id", "ticker", "exchange", "name", "currency"];
}

#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub portfolio_id: u32,
    pub name: String,
    pub user_id: u32,
    pub base_currency: Currency,
    #[serde(serialize_with = "ser_datetime")]
    pub creation_date: NaiveDateTime,
}
impl Table for Portfolio {
    const NAME: &'static str = "Portfolio";
    const HEADER: &'static [&'static str] =
        &["portfolio_id", "name", "user_id", "base_currency", "creation_date"];
}

#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    pub trade_id: u32,
    pub portfolio_id: u32,
    pub security_id: u32,
    pub side: Side,
    pub quantity: Qty4,
    pub price: Px4,
    pub settlement_currency: Currency,
    pub fees: Money2,
    #[serde(serialize_with = "ser_datetime")]
    pub trade_time: NaiveDateTime,
    pub source: TradeSource,
    pub note: Option<String>,
}
impl Table for Trade {
    const NAME: &'static str = "Trade";
    const HEADER: &'static [&'static str] = &[
        "trade_id",
        "portfolio_id",
        "security_id",
        "side",
        "quantity",
        "price",
        "settlement_currency",
        "fees",
        "trade_time",
        "source",
        "note",
    ];
}

#[derive(Debug, Clone, Serialize)]
pub struct Position {
    pub portfolio_id: u32,
    pub security_id: u32,
    #[serde(serialize_with = "ser_date")]
    pub as_of_date: NaiveDate,
    pub quantity: Qty4,
    pub avg_cost: Px4,
}
impl Table for Position {
    const NAME: &'static str = "Position";
    const HEADER: &'static [&'static str] =
        &["portfolio_id", "security_id", "as_of_date", "quantity", "avg_cost"];
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceDaily {
    pub security_id: u32,
    #[serde(serialize_with = "ser_date")]
    pub price_date: NaiveDate,
    pub close_price: Px4,
}
impl Table for PriceDaily {
    const NAME: &'static str = "PriceDaily";
    const HEADER: &'static [&'static str] = &["security_id", "price_date", "close_price"];
}

#[derive(Debug, Clone, Serialize)]
pub struct Dividend {
    pub dividend_id: u32,
    pub security_id: u32,
    #[serde(serialize_with = "ser_date")]
    pub ex_date: NaiveDate,
    #[serde(serialize_with = "ser_date")]
    pub pay_date: NaiveDate,
    pub amount_per_share: Px4,
    pub dividend_currency: Currency,
}
impl Table for Dividend {
    const NAME: &'static str = "Dividend";
    const HEADER: &'static [&'static str] = &[
        "dividend_id",
        "security_id",
        "ex_date",
        "pay_date",
        "amount_per_share",
        "dividend_currency",
    ];
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioNav {
    pub portfolio_id: u32,
    #[serde(serialize_with = "ser_date")]
    pub nav_date: NaiveDate,
    pub cash: Money2,
    pub net_value: Money2,
}
impl Table for PortfolioNav {
    const NAME: &'static str = "PortfolioNAV";
    const HEADER: &'static [&'static str] = &["portfolio_id", "nav_date", "cash", "net_value"];
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReturn {
    pub portfolio_id: u32,
    #[serde(serialize_with = "ser_date")]
    pub date: NaiveDate,
    pub daily_return: Ratio6,
}
impl Table for PortfolioReturn {
    const NAME: &'static str = "PortfolioReturn";
    const HEADER: &'static [&'static str] = &["portfolio_id", "date", "daily_return"];
}

#[derive(Debug, Clone, Serialize)]
pub struct Import {
    pub import_id: u32,
    pub portfolio_id: u32,
    pub filename: String,
    pub status: ImportStatus,
    #[serde(serialize_with = "ser_datetime")]
    pub created_at: NaiveDateTime,
    pub error_message: Option<&'static str>,
}
impl Table for Import {
    const NAME: &'static str = "Import";
    const HEADER: &'static [&'static str] =
        &["import_id", "portfolio_id", "filename", "status", "created_at", "error_message"];
}

/// Baris mentah dari file broker, disimpan sebagai JSON string di `raw_data`.
#[derive(Debug, Clone, Serialize)]
pub struct RawImportPayload {
    pub raw_ticker: String,
    #[serde(serialize_with = "ser_date")]
    pub date: NaiveDate,
    pub quantity: Money2,
    pub price: Money2,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportRow {
    pub import_row_id: u32,
    pub import_id: u32,
    pub raw_data: String,
    /// None = ticker could not be resolved; written as an empty field.
    pub normalized_security_id: Option<u32>,
    pub status: ImportRowStatus,
    pub error_message: Option<&'static str>,
}
impl Table for ImportRow {
    const NAME: &'static str = "ImportRow";
    const HEADER: &'static [&'static str] = &[
        "import_row_id",
        "import_id",
        "raw_data",
        "normalized_security_id",
        "status",
        "error_message",
    ];
}

pub fn ticker_for(security_id: u32) -> String {
    format!("STK{security_id:04}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rounds_then_pads() {
        assert_eq!(Fixed::<4>::new(12.345678).to_string(), "12.3457");
        assert_eq!(Fixed::<2>::new(3.0).to_string(), "3.00");
        assert_eq!(Fixed::<6>::new(-0.0123456789).to_string(), "-0.012346");
        assert_eq!(Fixed::<2>::new(0.125).value(), 0.13);
    }

    #[test]
    fn payload_serializes_as_string_fields() {
        let p = RawImportPayload {
            raw_ticker: ticker_for(7),
            date: NaiveDate::from_ymd_opt(2023, 2, 9).unwrap(),
            quantity: Fixed::new(10.5),
            price: Fixed::new(99.999),
        };
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(
            json,
            r#"{"raw_ticker":"STK0007","date":"2023-02-09","quantity":"10.50","price":"100.00"}"#
        );
    }
}
