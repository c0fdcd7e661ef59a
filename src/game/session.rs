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

use log::{info, warn};
use std::time::{Duration, Instant};

use super::record::{MatchRecord, MatchRecorder};
use super::{GameId, SessionConfig};
use crate::{Board, GameOutcome, Mask, Move, MoveError, Pos, Square};

/// What became of a finished match's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingStatus {
    Recorded,
    Failed(String),
}

/// The effect of a click on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickResult {
    /// A piece was picked up; its legal destinations should be shown.
    Selected { from: Square, destinations: Mask },
    Deselected,
    Moved {
        mv: Move,
        outcome: GameOutcome,
        /// Set once the move ends the game.
        recording: Option<RecordingStatus>,
    },
    Ignored,
}

/// One game of chess driven by square clicks, as a front end sees it.
///
/// The session owns the board, times the game and hands the result to
/// its recorder once the game ends. A recorder failure is reported but
/// never stops play.
pub struct ChessSession<R> {
    id: GameId,
    config: SessionConfig,
    board: Board,
    recorder: R,
    started: Instant,
    selected: Option<Square>,
    destinations: Mask,
}

impl<R: MatchRecorder> ChessSession<R> {
    pub fn new(id: GameId, config: SessionConfig, recorder: R) -> Self {
        info!("starting {} session {}", config.game_name, id);
        Self {
            id,
            config,
            board: Board::standard(),
            recorder,
            started: Instant::now(),
            selected: None,
            destinations: Mask::empty(),
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    /// Destinations highlighted for the current selection.
    pub fn highlights(&self) -> Mask {
        self.destinations
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn reset(&mut self) {
        info!("resetting session {}", self.id);
        self.board.reset();
        self.started = Instant::now();
        self.clear_selection();
    }

    pub fn status_line(&self) -> String {
        match self.board.outcome() {
            GameOutcome::InProgress => format!("{} to move", self.board.current_turn()),
            outcome => outcome.to_string(),
        }
    }

    /// Handles a click on `(row, col)`.
    pub fn click(&mut self, row: usize, col: usize) -> Result<ClickResult, MoveError> {
        let square = Square::at(row, col)?;
        if self.board.outcome().is_over() {
            return Ok(ClickResult::Ignored);
        }
        let Some(from) = self.selected else {
            return Ok(self.select(square));
        };
        if from == square {
            self.clear_selection();
            return Ok(ClickResult::Deselected);
        }
        if self.destinations.contains(square) {
            return self.play(Move::new(from, square));
        }
        Ok(self.select(square))
    }

    /// Applies `mv` directly, bypassing the selection.
    pub fn play(&mut self, mv: Move) -> Result<ClickResult, MoveError> {
        let outcome = self.board.submit_move(mv)?;
        self.clear_selection();
        let recording = outcome.is_over().then(|| self.record(outcome));
        Ok(ClickResult::Moved {
            mv,
            outcome,
            recording,
        })
    }

    fn select(&mut self, square: Square) -> ClickResult {
        match self.board.contents(square) {
            Some(piece) if piece.color() == self.board.current_turn() => {
                self.selected = Some(square);
                self.destinations = self.board.legal_destinations(square);
                ClickResult::Selected {
                    from: square,
                    destinations: self.destinations,
                }
            }
            _ => ClickResult::Ignored,
        }
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.destinations = Mask::empty();
    }

    fn record(&mut self, outcome: GameOutcome) -> RecordingStatus {
        let result = MatchRecord::new(self.id, &self.config.game_name, outcome, self.elapsed())
            .map_err(anyhow::Error::from)
            .and_then(|record| self.recorder.record_match(&record));
        match result {
            Ok(()) => {
                info!("recorded session {}: {}", self.id, outcome);
                RecordingStatus::Recorded
            }
            Err(err) => {
                warn!("failed to record session {}: {:#}", self.id, err);
                RecordingStatus::Failed(format!("{:#}", err))
            }
        }
    }
}
