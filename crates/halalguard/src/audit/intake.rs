use chrono::Local;
use serde_json::Value;

use super::domain::TransactionRecord;

const DEFAULT_DESCRIPTION: &str = "Transaksi Tanpa Keterangan";
const DEFAULT_KIND: &str = "Expense";

/// Errors raised at the input boundary. Parse failures are distinct from
/// validation failures so the UI can word them differently; neither reaches
/// network code.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("payload is not valid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
    #[error("payload must be a JSON array of transactions or a single transaction object")]
    UnsupportedShape,
    #[error("nothing to analyze: the payload is an empty array")]
    EmptyBatch,
    #[error("record '{id}' needs a description or an amount greater than zero")]
    MissingSubstance { id: String },
}

impl IntakeError {
    /// True for everything except malformed JSON syntax.
    pub fn is_validation(&self) -> bool {
        !matches!(self, IntakeError::Parse { .. })
    }
}

/// Turn a pasted JSON payload into canonical records.
///
/// A single object is promoted to a one-element array. Substance is checked
/// on the raw fields: an item must carry a non-empty description or a
/// positive amount before defaults paper over the gaps. All-or-nothing: a
/// single invalid item fails the whole batch and no records are emitted.
/// Surviving gaps get defaults (generated id, placeholder description, zero
/// amount, today's date, generic expense category).
pub fn parse_payload(raw: &str) -> Result<Vec<TransactionRecord>, IntakeError> {
    let parsed: Value =
        serde_json::from_str(raw).map_err(|source| IntakeError::Parse { source })?;

    let items = match parsed {
        Value::Array(items) => items,
        Value::Object(_) => vec![parsed],
        _ => return Err(IntakeError::UnsupportedShape),
    };

    if items.is_empty() {
        return Err(IntakeError::EmptyBatch);
    }

    let minted = Local::now().timestamp_millis();
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let id = text_field(item, "id").unwrap_or_else(|| format!("JSON-{minted}-{index}"));
        let description = text_field(item, "description");
        let amount = numeric_field(item, "amount");

        if description.is_none() && amount <= 0.0 {
            return Err(IntakeError::MissingSubstance { id });
        }

        records.push(TransactionRecord {
            id,
            description: description.unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            amount,
            date: text_field(item, "date").unwrap_or_else(today),
            kind: text_field(item, "type").unwrap_or_else(|| DEFAULT_KIND.to_string()),
        });
    }

    Ok(records)
}

/// Substance check for manually edited records, e.g. worksheet rows that
/// started blank. Same rule as the JSON path: description or positive
/// amount, first offender fails the batch.
pub fn validate_records(records: &[TransactionRecord]) -> Result<(), IntakeError> {
    for record in records {
        if record.description.trim().is_empty() && record.amount <= 0.0 {
            return Err(IntakeError::MissingSubstance {
                id: record.id.clone(),
            });
        }
    }
    Ok(())
}

fn text_field(item: &Value, key: &str) -> Option<String> {
    match item.get(key) {
        Some(Value::String(value)) if !value.is_empty() => Some(value.clone()),
        Some(Value::Number(value)) => Some(value.to_string()),
        _ => None,
    }
}

/// Coerce an amount the way loose JSON input arrives: numbers pass through,
/// numeric strings parse, anything else (including NaN) collapses to zero.
fn numeric_field(item: &Value, key: &str) -> f64 {
    let coerced = match item.get(key) {
        Some(Value::Number(value)) => value.as_f64(),
        Some(Value::String(value)) => value.trim().parse::<f64>().ok(),
        _ => None,
    };

    match coerced {
        Some(amount) if amount.is_finite() => amount,
        _ => 0.0,
    }
}

fn today() -> String {
    Local::now().date_naive().to_string()
}

/// Ordered in-memory working set for the manual-entry path.
///
/// Records keep insertion order for display; edits apply by identity match
/// on `id`. The sheet lives until an explicit [`Worksheet::clear`] or until
/// a fresh analysis run replaces the visible set.
#[derive(Debug, Default)]
pub struct Worksheet {
    records: Vec<TransactionRecord>,
}

impl Worksheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a blank row with a fresh unique id, today's date, and the
    /// generic expense category, returning a reference to it.
    pub fn add_blank(&mut self) -> &TransactionRecord {
        let record = TransactionRecord {
            id: self.mint_id(),
            description: String::new(),
            amount: 0.0,
            date: today(),
            kind: DEFAULT_KIND.to_string(),
        };
        self.records.push(record);
        self.records.last().expect("row just pushed")
    }

    /// Replace the record with a matching id, or append when none matches.
    pub fn upsert(&mut self, record: TransactionRecord) {
        match self.records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Remove by id; returns whether a record was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.records.len() != before
    }

    /// Replace the whole sheet, e.g. when loading the sample dataset.
    pub fn load(&mut self, records: Vec<TransactionRecord>) {
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn mint_id(&self) -> String {
        let mut stamp = Local::now().timestamp_millis();
        loop {
            let candidate = format!("TXN-{stamp}");
            if !self.records.iter().any(|record| record.id == candidate) {
                return candidate;
            }
            stamp += 1;
        }
    }
}
