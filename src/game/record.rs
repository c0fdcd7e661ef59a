// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::GameId;
use crate::GameOutcome;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Cannot record a game that is still in progress")]
    InProgress,
    #[error("Malformed match record on line {0}")]
    Malformed(usize),
}

/// A finished match as stored by a `MatchRecorder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub game_id: GameId,
    pub game_name: String,
    /// "White", "Black" or "Draw".
    pub winner: String,
    /// e.g. "White wins by checkmate" or "Draw by stalemate".
    pub result: String,
    /// Elapsed time as `MM:SS`.
    pub duration: String,
    /// RFC 3339 local time.
    pub timestamp: String,
}

impl MatchRecord {
    pub fn new(
        game_id: GameId,
        game_name: &str,
        outcome: GameOutcome,
        elapsed: Duration,
    ) -> Result<Self, RecordError> {
        if !outcome.is_over() {
            return Err(RecordError::InProgress);
        }
        let winner = match outcome.winner() {
            Some(color) => color.to_string(),
            None => "Draw".to_string(),
        };
        Ok(Self {
            game_id,
            game_name: game_name.to_string(),
            winner,
            result: outcome.to_string(),
            duration: format_duration(elapsed),
            timestamp: Local::now().to_rfc3339(),
        })
    }
}

/// Formats whole seconds as `MM:SS`. Minutes keep counting past 99.
pub fn format_duration(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Somewhere finished matches are kept.
pub trait MatchRecorder {
    fn record_match(&mut self, record: &MatchRecord) -> Result<()>;
}

impl<R: MatchRecorder + ?Sized> MatchRecorder for &mut R {
    fn record_match(&mut self, record: &MatchRecord) -> Result<()> {
        (**self).record_match(record)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    records: Vec<MatchRecord>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded matches, newest first.
    pub fn matches(&self) -> impl Iterator<Item = &MatchRecord> {
        self.records.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl MatchRecorder for MemoryRecorder {
    fn record_match(&mut self, record: &MatchRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Appends one JSON object per line to a file.
#[derive(Debug, Clone)]
pub struct JsonLinesRecorder {
    path: PathBuf,
}

impl JsonLinesRecorder {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads back every record in the file, oldest first. A missing
    /// file holds no records.
    pub fn load(&self) -> Result<Vec<MatchRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record =
                serde_json::from_str(&line).map_err(|_| RecordError::Malformed(index + 1))?;
            records.push(record);
        }
        Ok(records)
    }
}

impl MatchRecorder for JsonLinesRecorder {
    fn record_match(&mut self, record: &MatchRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use std::fs;

    fn record(outcome: GameOutcome, seconds: u64) -> MatchRecord {
        MatchRecord::new(GameId::new(1), "Chess", outcome, Duration::from_secs(seconds)).unwrap()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00");
        assert_eq!(format_duration(Duration::from_millis(59_999)), "00:59");
        assert_eq!(format_duration(Duration::from_secs(754)), "12:34");
        assert_eq!(format_duration(Duration::from_secs(6000)), "100:00");
    }
    #[test]
    fn test_checkmate_record() {
        let record = record(GameOutcome::Checkmate(Color::Black), 95);
        assert_eq!(record.winner, "Black");
        assert_eq!(record.result, "Black wins by checkmate");
        assert_eq!(record.duration, "01:35");
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }
    #[test]
    fn test_stalemate_record() {
        let record = record(GameOutcome::Stalemate, 5);
        assert_eq!(record.winner, "Draw");
        assert_eq!(record.result, "Draw by stalemate");
    }
    #[test]
    fn test_in_progress_cannot_be_recorded() {
        let result = MatchRecord::new(
            GameId::new(1),
            "Chess",
            GameOutcome::InProgress,
            Duration::ZERO,
        );
        assert!(matches!(result, Err(RecordError::InProgress)));
    }
    #[test]
    fn test_memory_recorder_newest_first() {
        let mut recorder = MemoryRecorder::new();
        recorder.record_match(&record(GameOutcome::Stalemate, 1)).unwrap();
        recorder
            .record_match(&record(GameOutcome::Checkmate(Color::White), 2))
            .unwrap();
        assert_eq!(recorder.len(), 2);
        let first = recorder.matches().next().unwrap();
        assert_eq!(first.winner, "White");
        recorder.clear();
        assert!(recorder.is_empty());
    }
    #[test]
    fn test_json_lines_recorder() {
        let path = std::env::temp_dir().join(format!(
            "chess-rules-record-{}.jsonl",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        let mut recorder = JsonLinesRecorder::new(&path);
        assert!(recorder.load().unwrap().is_empty());
        let first = record(GameOutcome::Checkmate(Color::White), 61);
        let second = record(GameOutcome::Stalemate, 3);
        recorder.record_match(&first).unwrap();
        recorder.record_match(&second).unwrap();
        assert_eq!(recorder.load().unwrap(), vec![first, second]);
        fs::write(&path, "not json\n").unwrap();
        let err = recorder.load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecordError>(),
            Some(RecordError::Malformed(1))
        ));
        let _ = fs::remove_file(&path);
    }
}
