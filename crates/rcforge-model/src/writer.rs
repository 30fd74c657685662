//! Writing records back to text.
//!
//! The writer never re-serializes from the model. It substitutes new scalar
//! text for changed fields into the baseline tree and emits every other byte
//! exactly as it was read.

use rcforge_core::{Document, SaveCounter};

use crate::error::WriteError;
use crate::record::Record;

/// Render the record, without touching the save counter.
///
/// An unmodified record must reproduce its source byte for byte; otherwise
/// [`WriteError::FidelityViolation`] is returned.
pub fn render(record: &Record) -> Result<String, WriteError> {
    let doc = substituted(record)?;
    let out = doc.emit();
    if !record.is_modified() {
        check_identical(&record.source, &out)?;
    }
    Ok(out)
}

/// Render the record with the save counter incremented by one.
///
/// The counter keeps its digit width. The output becomes the record's new
/// baseline: changes up to here can no longer be undone, and the next save
/// counts from the new value.
pub fn save(record: &mut Record) -> Result<String, WriteError> {
    let mut doc = substituted(record)?;
    let (index, trailer) = doc.trailer().ok_or(WriteError::NoCounter)?;
    let text = trailer.text().unwrap_or_default();
    let next = SaveCounter::parse(text)
        .and_then(|c| c.next())
        .ok_or_else(|| WriteError::BadCounter {
            text: text.to_string(),
        })?;
    doc.replace_scalar(&[index], next.format());
    let out = doc.emit();
    tracing::info!(counter = %next, changes = record.changes().count(), "saved record");
    record.mark_saved(doc, out.clone());
    Ok(out)
}

/// Check that the record's baseline tree reproduces its source.
pub fn verify(record: &Record) -> Result<(), WriteError> {
    check_identical(&record.source, &record.baseline.emit())
}

/// The save counter as last read or written.
pub fn counter(record: &Record) -> Option<SaveCounter> {
    let (_, trailer) = record.baseline.trailer()?;
    SaveCounter::parse(trailer.text()?)
}

fn substituted(record: &Record) -> Result<Document, WriteError> {
    let mut doc = record.baseline.clone();
    for (path, field) in record.fields() {
        if !field.is_dirty() {
            continue;
        }
        for (addr, text) in field.addrs.iter().zip(field.encoded()) {
            if doc.replace_scalar(addr, text).is_none() {
                return Err(WriteError::NotScalar { path });
            }
        }
    }
    Ok(doc)
}

fn check_identical(expected: &str, actual: &str) -> Result<(), WriteError> {
    if expected == actual {
        return Ok(());
    }
    let offset = expected
        .bytes()
        .zip(actual.bytes())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| expected.len().min(actual.len()));
    Err(WriteError::FidelityViolation { offset })
}

impl Record {
    /// See [`render`].
    pub fn render(&self) -> Result<String, WriteError> {
        render(self)
    }

    /// See [`save`].
    pub fn save(&mut self) -> Result<String, WriteError> {
        save(self)
    }
}
