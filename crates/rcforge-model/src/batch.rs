//! Applying one edit across many records.
//!
//! Each record is edited independently. A failing record is restored to its
//! state before the edit and reported; the others proceed.

use crate::error::ModelError;
use crate::record::Record;

/// Outcome for one record of a batch.
#[derive(Debug)]
pub struct BatchItem<T> {
    /// Caller-supplied label, typically a file path.
    pub label: String,
    /// What the edit returned.
    pub outcome: Result<T, ModelError>,
}

/// Per-record outcomes of a batch, in input order.
#[derive(Debug)]
pub struct BatchReport<T> {
    /// One entry per record.
    pub items: Vec<BatchItem<T>>,
}

impl<T> BatchReport<T> {
    /// Number of records the edit succeeded on.
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_ok()).count()
    }

    /// Items whose edit failed.
    pub fn failures(&self) -> impl Iterator<Item = &BatchItem<T>> {
        self.items.iter().filter(|i| i.outcome.is_err())
    }

    /// Whether every edit succeeded.
    pub fn all_ok(&self) -> bool {
        self.items.iter().all(|i| i.outcome.is_ok())
    }
}

/// Run `edit` on every record.
pub fn apply_each<'a, I, T, F>(records: I, mut edit: F) -> BatchReport<T>
where
    I: IntoIterator<Item = (&'a str, &'a mut Record)>,
    F: FnMut(&mut Record) -> Result<T, ModelError>,
{
    let mut items = Vec::new();
    for (label, record) in records {
        let snapshot = record.clone();
        let outcome = edit(record);
        if let Err(e) = &outcome {
            tracing::warn!(record = label, error = %e, "batch edit failed");
            *record = snapshot;
        }
        items.push(BatchItem {
            label: label.to_string(),
            outcome,
        });
    }
    BatchReport { items }
}
