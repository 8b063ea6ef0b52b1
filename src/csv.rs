use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::account::Account;
use crate::model::{Command, CustomerId, Listing, TitleId, TradeIn};
use crate::Amount;

/// Errors that can occur when reading commands or writing reports
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized command type '{kind}'")]
    UnrecognizedType { line: usize, kind: String },

    #[error("line {line}: {kind} missing {field}")]
    MissingField {
        line: usize,
        kind: String,
        field: &'static str,
    },

    #[error("line {line}: invalid price {value}")]
    InvalidPrice { line: usize, value: f64 },

    #[error("failed to write report: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    r#type: String,
    customer: Option<CustomerId>,
    title: Option<TitleId>,
    name: Option<String>,
    address: Option<String>,
    year: Option<u16>,
    console: Option<String>,
    price: Option<f64>,
    quantity: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ListingRow<'a> {
    title: TitleId,
    name: &'a str,
    year: u16,
    console: &'a str,
    price: String,
    stock: u32,
}

#[derive(Debug, Serialize)]
struct AccountRow<'a> {
    customer: CustomerId,
    name: &'a str,
    balance: String,
    purchases: usize,
    trade_ins: usize,
    discount_expires_on: String,
}

/// Pulls a required column out of a row, or reports which one is missing.
struct Fields {
    line: usize,
    kind: String,
}

impl Fields {
    fn price(&self, value: Option<f64>) -> Result<Amount, CsvError> {
        let value = self.require(value, "price")?;
        Amount::try_from_float(value).ok_or(CsvError::InvalidPrice {
            line: self.line,
            value,
        })
    }

    fn require<T>(&self, value: Option<T>, field: &'static str) -> Result<T, CsvError> {
        value.ok_or_else(|| CsvError::MissingField {
            line: self.line,
            kind: self.kind.clone(),
            field,
        })
    }
}

/// Read commands from a csv file
pub fn read_commands(
    path: &Path,
) -> Result<impl Iterator<Item = Result<Command, CsvError>> + use<>, CsvError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            parse_row(line, row)
        }))
}

fn parse_row(line: usize, row: InputRow) -> Result<Command, CsvError> {
    let fields = Fields {
        line,
        kind: row.r#type.clone(),
    };

    match row.r#type.as_str() {
        "open" => Ok(Command::OpenAccount {
            customer: fields.require(row.customer, "customer")?,
            name: fields.require(row.name, "name")?,
            address: row.address.unwrap_or_default(),
        }),
        "stock" => Ok(Command::Stock {
            listing: Listing::new(
                fields.require(row.title, "title")?,
                fields.require(row.name, "name")?,
                fields.require(row.year, "year")?,
                fields.require(row.console, "console")?,
                fields.price(row.price)?,
                fields.require(row.quantity, "quantity")?,
            ),
        }),
        "remove" => Ok(Command::Remove {
            title: fields.require(row.title, "title")?,
        }),
        "buy" => Ok(Command::Buy {
            customer: fields.require(row.customer, "customer")?,
            title: fields.require(row.title, "title")?,
        }),
        "trade_in" => Ok(Command::TradeIn {
            customer: fields.require(row.customer, "customer")?,
            trade: TradeIn {
                new_id: fields.require(row.title, "title")?,
                title: fields.require(row.name, "name")?,
                price: fields.price(row.price)?,
                console: fields.require(row.console, "console")?,
                release_year: fields.require(row.year, "year")?,
                quantity: row.quantity.unwrap_or(1),
            },
        }),
        other => Err(CsvError::UnrecognizedType {
            line,
            kind: other.to_string(),
        }),
    }
}

/// Write listings in csv format
pub fn write_listings<'a>(
    out: impl io::Write,
    listings: impl IntoIterator<Item = &'a Listing>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(out);

    for listing in listings {
        writer.serialize(ListingRow {
            title: listing.id(),
            name: listing.name(),
            year: listing.release_year(),
            console: listing.console(),
            price: listing.price().to_string(),
            stock: listing.stock(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Write account summaries in csv format
pub fn write_accounts<'a>(
    out: impl io::Write,
    accounts: impl IntoIterator<Item = &'a Account>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(out);

    for account in accounts {
        writer.serialize(AccountRow {
            customer: account.id(),
            name: account.name(),
            balance: account.balance().to_string(),
            purchases: account.purchases().len(),
            trade_ins: account.trade_ins().len(),
            discount_expires_on: account
                .discount()
                .expires_on()
                .map(|date| date.to_string())
                .unwrap_or_default(),
        })?;
    }

    writer.flush()?;
    Ok(())
}
