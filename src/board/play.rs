// Copyright 2023 Tobin Edwards
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
use serde::{Deserialize, Serialize};
use std::fmt;

use super::check::Checks;
use super::material::Color;
use super::moves::{LegalMoves, Move, MoveError};
use super::position::{Pos, Position};
use super::square::{Mask, Square};
use super::Turn;

use MoveError::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameOutcome {
    #[default]
    InProgress,
    Checkmate(Color),
    Stalemate,
}

impl GameOutcome {
    /// Classifies `pos` for the side to move.
    pub fn evaluate(pos: &Position) -> Self {
        let turn = pos.turn();
        if pos.can_move(turn) {
            GameOutcome::InProgress
        } else if pos.is_check(turn) {
            GameOutcome::Checkmate(!turn)
        } else {
            GameOutcome::Stalemate
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }

    pub fn winner(&self) -> Option<Color> {
        match *self {
            GameOutcome::Checkmate(color) => Some(color),
            _ => None,
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::InProgress => write!(f, "In progress"),
            GameOutcome::Checkmate(winner) => write!(f, "{} wins by checkmate", winner),
            GameOutcome::Stalemate => write!(f, "Draw by stalemate"),
        }
    }
}

/// A position together with the outcome reached so far. All changes
/// go through `submit_move`, which validates before touching anything.
#[derive(Debug, Clone)]
pub struct PlayState {
    position: Position,
    outcome: GameOutcome,
}

impl Default for PlayState {
    fn default() -> Self {
        Self::new(Position::default())
    }
}

impl PlayState {
    /// Starts play from `position`, which may already be finished.
    pub fn new(position: Position) -> Self {
        let outcome = GameOutcome::evaluate(&position);
        Self { position, outcome }
    }

    #[inline]
    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    /// Legal destinations for the piece on `from`. Empty unless it
    /// belongs to the side to move.
    pub fn move_destinations(&self, from: Square) -> Mask {
        match self.contents(from) {
            Some(piece) if piece.color() == self.turn() => self.position.legal_moves(from),
            _ => Mask::empty(),
        }
    }

    pub fn validate_move(&self, mv: Move) -> Result<Move, MoveError> {
        if self.outcome.is_over() {
            return Err(GameAlreadyOver);
        }
        let piece = self.contents(mv.from).ok_or(NoPieceToMove(mv.from))?;
        if piece.color() != self.turn() {
            return Err(WrongSideToMove(mv.from));
        }
        if !self.position.legal_moves(mv.from).contains(mv.to) {
            return Err(IllegalMove(mv));
        }
        Ok(mv)
    }

    pub fn submit_move(&mut self, mv: Move) -> Result<GameOutcome, MoveError> {
        let mv = self.validate_move(mv).map_err(|err| {
            warn!("rejected {}: {}", mv, err);
            err
        })?;
        let mover = self.turn();
        let captured = self.position.apply_move(mv);
        match captured {
            Some(piece) => info!("{} plays {} capturing {}", mover, mv, piece.kind()),
            None => info!("{} plays {}", mover, mv),
        }
        self.outcome = GameOutcome::evaluate(&self.position);
        if self.outcome.is_over() {
            info!("game over: {}", self.outcome);
        }
        Ok(self.outcome)
    }
}

impl Turn for PlayState {
    fn turn(&self) -> Color {
        self.position.turn()
    }
}

impl AsRef<Position> for PlayState {
    fn as_ref(&self) -> &Position {
        &self.position
    }
}

impl Pos for PlayState {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::material::Piece;
    use Color::*;
    use Square::*;

    fn play(state: &mut PlayState, moves: &[(Square, Square)]) -> GameOutcome {
        let mut outcome = state.outcome();
        for &(from, to) in moves {
            outcome = state.submit_move(Move::new(from, to)).unwrap();
        }
        outcome
    }

    #[test]
    fn test_white_moves_first() {
        let state = PlayState::default();
        assert!(!state.move_destinations(E2).is_empty());
        assert!(state.move_destinations(E7).is_empty());
    }
    #[test]
    fn test_turn_alternates() {
        let mut state = PlayState::default();
        assert_eq!(play(&mut state, &[(E2, E4)]), GameOutcome::InProgress);
        assert_eq!(state.turn(), Black);
        assert!(state.move_destinations(E4).is_empty());
        assert!(!state.move_destinations(E7).is_empty());
    }
    #[test]
    fn test_rejections_leave_state_untouched() {
        let mut state = PlayState::default();
        let before = state.position.clone();
        assert_eq!(
            state.submit_move(Move::new(E4, E5)),
            Err(NoPieceToMove(E4))
        );
        assert_eq!(
            state.submit_move(Move::new(E7, E5)),
            Err(WrongSideToMove(E7))
        );
        assert_eq!(
            state.submit_move(Move::new(E2, E5)),
            Err(IllegalMove(Move::new(E2, E5)))
        );
        assert_eq!(state.position, before);
        assert_eq!(state.turn(), White);
    }
    #[test]
    fn test_fools_mate() {
        let mut state = PlayState::default();
        let outcome = play(&mut state, &[(F2, F3), (E7, E5), (G2, G4), (D8, H4)]);
        assert_eq!(outcome, GameOutcome::Checkmate(Black));
        assert_eq!(state.outcome().winner(), Some(Black));
        assert_eq!(
            state.submit_move(Move::new(E2, E4)),
            Err(GameAlreadyOver)
        );
    }
    #[test]
    fn test_stalemate_position() {
        let position = Position::empty(Black)
            .with(A8, Some(Piece::BK))
            .with(B6, Some(Piece::WK))
            .with(C7, Some(Piece::WQ));
        let state = PlayState::new(position);
        assert_eq!(state.outcome(), GameOutcome::Stalemate);
        assert!(!state.position.is_check(Black));
        assert!(state.move_destinations(A8).is_empty());
    }
    #[test]
    fn test_move_into_stalemate() {
        let position = Position::empty(White)
            .with(A8, Some(Piece::BK))
            .with(B6, Some(Piece::WK))
            .with(D7, Some(Piece::WQ));
        let mut state = PlayState::new(position);
        assert_eq!(state.outcome(), GameOutcome::InProgress);
        assert_eq!(play(&mut state, &[(D7, C7)]), GameOutcome::Stalemate);
        assert_eq!(state.submit_move(Move::new(B6, B5)), Err(GameAlreadyOver));
    }
    #[test]
    fn test_kingless_side_is_mated() {
        let position = Position::empty(White)
            .with(A1, Some(Piece::WR))
            .with(H8, Some(Piece::BK));
        let state = PlayState::new(position);
        assert_eq!(state.outcome(), GameOutcome::Checkmate(Black));
    }
    #[test]
    fn test_outcome_text() {
        assert_eq!(
            GameOutcome::Checkmate(White).to_string(),
            "White wins by checkmate"
        );
        assert_eq!(GameOutcome::Stalemate.to_string(), "Draw by stalemate");
        assert!(!GameOutcome::InProgress.is_over());
        assert_eq!(GameOutcome::Stalemate.winner(), None);
    }
}
