//! Track audio geometry.
//!
//! Sample data lives outside the record; the record carries its shape as
//! read-only track fields. After audio is replaced, [`Record::link_track_audio`]
//! updates them in one step.

use rcforge_registry::Value;

use crate::error::ModelError;
use crate::history::Change;
use crate::path::AttrPath;
use crate::record::Record;

/// Device sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44_100;
/// Beats per measure.
pub const BEATS_PER_MEASURE: u32 = 4;

/// Track field holding the tempo in tenths of a BPM.
pub const TEMPO_FIELD: &str = "tempo_x10";
/// Track field holding the loop length in measures.
pub const MEASURE_FIELD: &str = "measure";
/// Track field holding the samples per measure.
pub const SAMPLES_PER_MEASURE_FIELD: &str = "samples_per_measure";
/// Track field flagging recorded audio.
pub const HAS_AUDIO_FIELD: &str = "has_audio";
/// Track field holding the total sample count.
pub const TOTAL_SAMPLES_FIELD: &str = "total_samples";

/// Samples in one measure at `tempo_x10` tenths of a BPM, truncated.
pub fn samples_per_measure(tempo_x10: i64) -> Option<i64> {
    if tempo_x10 <= 0 {
        return None;
    }
    let bpm = tempo_x10 as f64 / 10.0;
    let per_beat = f64::from(SAMPLE_RATE) * 60.0 / bpm;
    Some((per_beat * f64::from(BEATS_PER_MEASURE)) as i64)
}

/// Loop length in whole measures, at least one.
pub fn measures(total_samples: i64, samples_per_measure: i64) -> i64 {
    if samples_per_measure <= 0 {
        return 1;
    }
    (total_samples as f64 / samples_per_measure as f64)
        .round_ties_even()
        .max(1.0) as i64
}

impl Record {
    /// Record that track `track` now holds `total_samples` samples of audio.
    ///
    /// Sets the sample count and audio flag; when the track tempo decodes,
    /// also the samples per measure and the measure count. All changes form
    /// one undo step.
    pub fn link_track_audio(
        &mut self,
        track: usize,
        total_samples: u64,
    ) -> Result<Vec<Change>, ModelError> {
        let section = self
            .track(track)
            .map(|s| s.name().to_string())
            .ok_or_else(|| ModelError::NotFound {
                path: AttrPath::named(&format!("TRACK{track}"), TOTAL_SAMPLES_FIELD),
            })?;
        let total = i64::try_from(total_samples).map_err(|_| {
            ModelError::invalid(
                &AttrPath::named(&section, TOTAL_SAMPLES_FIELD),
                rcforge_registry::ValidationError::OutOfRange {
                    value: i64::MAX,
                    min: 0,
                    max: i64::MAX,
                },
            )
        })?;
        let path = |attr: &str| AttrPath::named(&section, attr);

        let mut values = vec![
            (path(HAS_AUDIO_FIELD), Value::Bool(true)),
            (path(TOTAL_SAMPLES_FIELD), Value::Int(total)),
        ];
        let tempo = self.get(&path(TEMPO_FIELD)).and_then(Value::as_int);
        if let Some(spm) = tempo.and_then(samples_per_measure) {
            values.push((path(SAMPLES_PER_MEASURE_FIELD), Value::Int(spm)));
            values.push((path(MEASURE_FIELD), Value::Int(measures(total, spm))));
        }
        let changes = self.set_derived_all(values)?;
        tracing::debug!(track, total_samples, "linked track audio");
        Ok(changes)
    }
}
