//! Bill records as the store returns them, the display copy the Bills page
//! renders, and the draft assembled by the NewBill form.

use serde::{Deserialize, Serialize};

/// Expense categories offered by the NewBill form.
pub const EXPENSE_TYPES: [&str; 7] = [
    "Transports",
    "Restaurants et bars",
    "Hôtel et logement",
    "Services en ligne",
    "IT et électronique",
    "Equipement et matériel",
    "Fournitures de bureau",
];

/// Default VAT percentage applied when the form leaves `pct` empty.
pub const DEFAULT_PCT: i64 = 20;

/// A bill record owned by the remote store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    pub id: String,
    /// Calendar date (YYYY-MM-DD). Kept as text: the store does not validate it.
    pub date: String,
    pub amount: f64,
    pub status: BillStatus,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type", default)]
    pub bill_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vat: Option<String>,
    #[serde(default)]
    pub pct: Option<i64>,
    #[serde(default)]
    pub commentary: Option<String>,
    #[serde(default)]
    pub comment_admin: Option<String>,
}

impl BillRecord {
    pub fn new(
        id: impl Into<String>,
        date: impl Into<String>,
        amount: f64,
        status: BillStatus,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            amount,
            status,
            file_url: None,
            file_name: None,
            email: email.into(),
            bill_type: None,
            name: None,
            vat: None,
            pct: None,
            commentary: None,
            comment_admin: None,
        }
    }
}

/// Review state of a bill
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BillStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "accepted")]
    Accepted,
    #[serde(rename = "refused")]
    Refused,
}

impl BillStatus {
    /// Human label shown in the Bills table
    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "En attente",
            BillStatus::Accepted => "Accepté",
            BillStatus::Refused => "Refused",
        }
    }
}

/// Display copy of a [`BillRecord`] with date and status already formatted.
///
/// `date` holds the raw record date when formatting failed.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBill {
    pub id: String,
    pub date: String,
    /// Record date as stored, used for ordering rows
    #[serde(skip)]
    pub raw_date: String,
    pub status: String,
    pub amount: f64,
    pub email: String,
    #[serde(rename = "type")]
    pub bill_type: Option<String>,
    pub name: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
}

impl DisplayBill {
    pub fn from_record(record: &BillRecord, date: String, status: impl Into<String>) -> Self {
        Self {
            id: record.id.clone(),
            date,
            raw_date: record.date.clone(),
            status: status.into(),
            amount: record.amount,
            email: record.email.clone(),
            bill_type: record.bill_type.clone(),
            name: record.name.clone(),
            file_url: record.file_url.clone(),
            file_name: record.file_name.clone(),
        }
    }

    /// Display copy keeping the raw date; the status still gets its label.
    pub fn unformatted(record: &BillRecord) -> Self {
        Self::from_record(record, record.date.clone(), record.status.label())
    }
}

/// A bill submission assembled from the NewBill form, not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBillDraft {
    pub email: String,
    #[serde(rename = "type")]
    pub bill_type: String,
    pub name: String,
    pub date: String,
    pub amount: i64,
    pub vat: String,
    pub pct: i64,
    pub commentary: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub status: BillStatus,
}

impl NewBillDraft {
    /// Build a draft from raw form values.
    ///
    /// `amount` falls back to 0 and `pct` to [`DEFAULT_PCT`] when not integers.
    pub fn from_form(fields: &DraftFields<'_>, email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            bill_type: fields.bill_type.to_string(),
            name: fields.name.to_string(),
            date: fields.date.to_string(),
            amount: parse_int(fields.amount).unwrap_or(0),
            vat: fields.vat.to_string(),
            pct: parse_int(fields.pct).unwrap_or(DEFAULT_PCT),
            commentary: fields.commentary.to_string(),
            file_url: None,
            file_name: None,
            status: BillStatus::Pending,
        }
    }
}

/// Raw text values read from the NewBill form inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct DraftFields<'a> {
    pub bill_type: &'a str,
    pub name: &'a str,
    pub date: &'a str,
    pub amount: &'a str,
    pub vat: &'a str,
    pub pct: &'a str,
    pub commentary: &'a str,
}

// Leading-integer parse: "348.5" -> 348, "" -> None
fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    raw[..end].parse().ok()
}
