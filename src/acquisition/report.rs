//! Batch summary.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::model::{AcquisitionOutcome, FailedTrack, TrackList, TrackState};

/// Aggregate result of one run over a track list.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    /// Delivered by a backend during this run
    pub downloaded: usize,
    /// Already on disk (exact path or ISRC scan)
    pub found: usize,
    /// Already marked downloaded before the run
    pub skipped: usize,
    /// Absent in a check-only run
    pub missing: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// `(title, artists, last error)` for every exhausted track, in list order
    pub failures: Vec<FailedTrack>,
    pub outcomes: Vec<AcquisitionOutcome>,
    pub elapsed: Duration,
    pub check_only: bool,
}

impl BatchReport {
    /// Summarize the outcomes of a run over `batch`.
    pub fn from_outcomes(
        batch: &TrackList,
        outcomes: Vec<AcquisitionOutcome>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        check_only: bool,
    ) -> Self {
        let tracks: HashMap<&str, _> = batch.tracks.iter().map(|t| (t.id.as_str(), t)).collect();
        let count = |state: TrackState| outcomes.iter().filter(|o| o.state == state).count();

        let failures = outcomes
            .iter()
            .filter(|o| o.state == TrackState::ExhaustedFailed)
            .map(|o| {
                let track = tracks.get(o.track_id.as_str());
                FailedTrack {
                    title: track.map(|t| t.title.clone()).unwrap_or_default(),
                    artists: track.map(|t| t.artists.clone()).unwrap_or_default(),
                    error: o.last_error().unwrap_or("Unknown error").to_string(),
                }
            })
            .collect();

        Self {
            started_at,
            total: batch.len(),
            downloaded: count(TrackState::Succeeded),
            found: count(TrackState::Found),
            skipped: count(TrackState::Resolved),
            missing: count(TrackState::Missing),
            failed: count(TrackState::ExhaustedFailed),
            cancelled: count(TrackState::Cancelled),
            failures,
            outcomes,
            elapsed,
            check_only,
        }
    }

    /// Whether every track is present on disk after the run.
    pub fn is_complete(&self) -> bool {
        self.outcomes.len() == self.total && self.outcomes.iter().all(AcquisitionOutcome::succeeded)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heading = if self.check_only { "Check completed" } else { "Download completed" };
        writeln!(f, "{} in {}", heading, format_seconds(self.elapsed.as_secs_f64()))?;
        writeln!(f, "  Total:      {}", self.total)?;
        if !self.check_only {
            writeln!(f, "  Downloaded: {}", self.downloaded)?;
        }
        writeln!(f, "  Present:    {}", self.found + self.skipped)?;
        if self.check_only {
            writeln!(f, "  Missing:    {}", self.missing)?;
        } else {
            writeln!(f, "  Failed:     {}", self.failed)?;
        }
        if self.cancelled > 0 {
            writeln!(f, "  Cancelled:  {}", self.cancelled)?;
        }

        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed tracks:")?;
            for (i, failure) in self.failures.iter().enumerate() {
                writeln!(f, "{}. {} - {}", i + 1, failure.title, failure.artists)?;
                writeln!(f, "   Error: {}", failure.error)?;
            }
        }
        Ok(())
    }
}

/// Elapsed time as `1d 2h 3m 4s`, omitting zero parts (`0s` minimum).
pub fn format_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let mins = (total % 3_600) / 60;
    let secs = total % 60;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if mins > 0 {
        parts.push(format!("{}m", mins));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{}s", secs));
    }
    parts.join(" ")
}

/// Loop delay as `N minutes`, `H hours M minutes` or `D days H hours M minutes`.
pub fn format_minutes(minutes: u64) -> String {
    if minutes < 60 {
        format!("{} minutes", minutes)
    } else if minutes < 1_440 {
        format!("{} hours {} minutes", minutes / 60, minutes % 60)
    } else {
        format!(
            "{} days {} hours {} minutes",
            minutes / 1_440,
            (minutes % 1_440) / 60,
            minutes % 60
        )
    }
}
