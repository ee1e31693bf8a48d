//! The report grid as handed over by the spreadsheet loader.
//!
//! Row-major, ragged rows allowed. The engine only ever reads it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

pub type Row = Vec<Cell>;
pub type Grid = Vec<Row>;

impl Cell {
    pub fn text(s: &str) -> Self {
        Cell::Text(s.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// A numeric cell, or text that reads as a currency amount
    /// ("1,234.50", "$80").
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_amount(s),
            Cell::Empty => None,
        }
    }

    pub fn is_populated(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Text(s) => !s.trim().is_empty(),
            Cell::Number(_) => true,
        }
    }

    /// Type a raw string cell the way the loader does: blank, amount, or text.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else if let Some(n) = parse_amount(trimmed) {
            Cell::Number(n)
        } else {
            Cell::Text(raw.to_string())
        }
    }
}

fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Text of the first cell of `row`, if it is a text cell.
pub fn first_text(row: &[Cell]) -> Option<&str> {
    row.first().and_then(Cell::as_text)
}

/// Numeric value at `column`, if present and numeric.
pub fn number_at(row: &[Cell], column: usize) -> Option<f64> {
    row.get(column).and_then(Cell::as_number)
}

/// The right-most populated cell of `row`.
pub fn last_populated(row: &[Cell]) -> Option<&Cell> {
    row.iter().rev().find(|c| c.is_populated())
}
