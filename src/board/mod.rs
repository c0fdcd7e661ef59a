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

//! Chess rules engine
//!
//! A _board_ holds the state of a single game and enforces the rules
//! of chess for it. The following features are supported:
//!
//! [x] Standard movement for all six piece kinds
//! [x] Moves that would leave the mover's king attacked are rejected
//! [x] Checkmate and stalemate detection
//! [x] Automatic promotion to a queen
//! [ ] Castling
//! [ ] En passant
//! [ ] Under-promotion
//! [ ] Repetition and fifty-move draws
//! [ ] Take backs
//! [ ] Time controls
//!
//! Some of the key abstractions include:
//!
//! * A `Square` is one of the 64 squares, addressed either by name
//!   (`A8` .. `H1`) or by `(row, column)` coordinates. Row 0 is the
//!   black back rank and row 7 is the white back rank.
//!
//! * A `Mask` is a set of squares packed into a `u64`. Destination
//!   sets are returned as masks and can be iterated in row order.
//!
//! * A `Piece` is a `PieceKind` of a given `Color`. A square holds a
//!   `Cell`, which is `None` when it is empty.
//!
//! * A `Position` holds the contents of every square and the side to
//!   move. Positions are plain values, so `simulate` can try a move on
//!   a copy without any risk of disturbing the original.
//!
//! * `PseudoMoves`, `Checks` and `LegalMoves` are layered traits over
//!   anything that wraps a position: movement geometry, attacked
//!   squares, and moves that keep the mover's own king safe.
//!
//! * `Board` is the entry point for a game in progress. It hands out
//!   legal destinations for a square, validates and applies moves, and
//!   reports a `GameOutcome` after each one. Once the game is over it
//!   refuses further moves.
//!

mod check;
mod material;
mod moves;
mod play;
mod position;
mod square;

pub use check::*;
pub use material::*;
pub use moves::*;
pub use play::*;
pub use position::*;
pub use square::*;

pub trait Turn {
    fn turn(&self) -> Color;
}

#[derive(Debug, Clone, Default)]
pub struct Board {
    state: PlayState,
}

impl Board {
    /// A new game from the standard starting position.
    pub fn standard() -> Self {
        Self::default()
    }

    /// A game continuing from an arbitrary position.
    pub fn from_position(position: Position) -> Self {
        Self {
            state: PlayState::new(position),
        }
    }

    /// Discards the current game and sets up a fresh one.
    pub fn reset(&mut self) {
        self.state = PlayState::default();
    }

    /// Legal destinations for the piece on `from`. Empty if the square
    /// is vacant or the piece belongs to the side not on move.
    pub fn legal_destinations(&self, from: Square) -> Mask {
        self.state.move_destinations(from)
    }

    /// Validates and applies a move, returning the outcome it leads to.
    /// On error the board is unchanged.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<GameOutcome, MoveError> {
        self.submit_move(Move::new(from, to))
    }

    pub fn submit_move(&mut self, mv: Move) -> Result<GameOutcome, MoveError> {
        self.state.submit_move(mv)
    }

    #[inline]
    pub fn current_turn(&self) -> Color {
        self.state.turn()
    }

    #[inline]
    pub fn outcome(&self) -> GameOutcome {
        self.state.outcome()
    }

    /// Whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        let pos: &Position = self.as_ref();
        pos.is_check(self.turn())
    }

    pub fn position(&self) -> &Position {
        self.state.as_ref()
    }
}

impl Turn for Board {
    #[inline]
    fn turn(&self) -> Color {
        self.state.turn()
    }
}

impl AsRef<Position> for Board {
    fn as_ref(&self) -> &Position {
        self.state.as_ref()
    }
}

impl Pos for Board {}
