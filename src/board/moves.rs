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

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::check::Checks;
use super::material::{Color, Pair, Piece, PieceKind};
use super::position::Position;
use super::square::{Direction, Mask, Offset, Rank, Square};

use Color::*;
use PieceKind::*;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveError {
    #[error("Square ({row}, {col}) is off the board")]
    InvalidSquare { row: usize, col: usize },
    #[error("There is no piece on {0}")]
    NoPieceToMove(Square),
    #[error("The piece on {0} belongs to the side not on move")]
    WrongSideToMove(Square),
    #[error("Not a legal move: {0}")]
    IllegalMove(Move),
    #[error("The game is already over")]
    GameAlreadyOver,
}

/// An origin and destination. Captures and promotion are worked out
/// from the position when the move is applied.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// Parses coordinate notation such as `e2e4`.
    pub fn try_from_string(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.len() != 4 || !text.is_ascii() {
            return None;
        }
        let from = Square::try_from_string(&text[..2])?;
        let to = Square::try_from_string(&text[2..])?;
        Some(Self::new(from, to))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Movement geometry for a single piece, ignoring the safety of the
/// mover's own king.
pub trait PseudoMoves: AsRef<Position> {
    fn pseudo_moves(&self, from: Square) -> Mask {
        let pos: &Position = self.as_ref();
        match pos.contents(from) {
            Some(piece) => match piece.kind() {
                King => self.step_moves(piece, &KING_MOVES[from]),
                Knight => self.step_moves(piece, &KNIGHT_MOVES[from]),
                Queen => self.line_moves(from, piece, Direction::iter()),
                Rook => self.line_moves(from, piece, Direction::horizontals()),
                Bishop => self.line_moves(from, piece, Direction::diagonals()),
                Pawn => self.pawn_moves(from, piece.color()),
            },
            None => Mask::empty(),
        }
    }

    fn step_moves(&self, piece: Piece, targets: &Mask) -> Mask {
        let pos: &Position = self.as_ref();
        Mask::from_squares(targets.iter().filter(|&to| {
            !matches!(pos.contents(to), Some(other) if other.color() == piece.color())
        }))
    }

    fn line_moves<I>(&self, from: Square, piece: Piece, directions: I) -> Mask
    where
        I: Iterator<Item = Direction>,
    {
        let pos: &Position = self.as_ref();
        let mut result = Mask::empty();
        for dir in directions {
            let mut next = from + dir;
            while let Some(to) = next {
                match pos.contents(to) {
                    None => result |= to,
                    Some(other) => {
                        if other.color() != piece.color() {
                            result |= to;
                        }
                        break;
                    }
                }
                next = to + dir;
            }
        }
        result
    }

    fn pawn_moves(&self, from: Square, color: Color) -> Mask {
        const ADVANCE: Pair<Offset> = Pair::new(Offset::new(0, -1), Offset::new(0, 1));
        let pos: &Position = self.as_ref();
        let mut result = Mask::empty();
        let advance = ADVANCE[color];
        if let Some(single) = from + advance {
            if pos.contents(single).is_none() {
                result |= single;
                if from.rank() == Rank::pawn_rank(color) {
                    // Safety: a pawn on its starting rank always has two
                    // ranks in front of it
                    let double = (single + advance).unwrap();
                    if pos.contents(double).is_none() {
                        result |= double;
                    }
                }
            }
        }
        for to in PAWN_ATTACKS[color][from].iter() {
            if matches!(pos.contents(to), Some(other) if other.color() != color) {
                result |= to;
            }
        }
        result
    }
}

/// Moves that do not leave the mover's own king attacked.
pub trait LegalMoves: Checks {
    /// Legal destinations for the piece on `from`, whichever side it
    /// belongs to. Each candidate is tried on a scratch copy of the
    /// position and kept only if the mover is not left in check.
    fn legal_moves(&self, from: Square) -> Mask {
        let pos: &Position = self.as_ref();
        let Some(piece) = pos.contents(from) else {
            return Mask::empty();
        };
        Mask::from_squares(self.pseudo_moves(from).iter().filter(|&to| {
            let trial = pos.simulate(Move::new(from, to));
            !trial.is_check(piece.color())
        }))
    }

    /// Stops at the first piece that can move.
    fn can_move(&self, color: Color) -> bool {
        let pos: &Position = self.as_ref();
        pos.occupied_by(color)
            .iter()
            .any(|from| !self.legal_moves(from).is_empty())
    }

    fn all_legal_moves(&self, color: Color) -> Vec<Move> {
        let pos: &Position = self.as_ref();
        pos.occupied_by(color)
            .iter()
            .flat_map(|from| self.legal_moves(from).iter().map(move |to| Move::new(from, to)))
            .collect()
    }
}

impl PseudoMoves for Position {}

impl LegalMoves for Position {}

static KING_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = Mask::from_squares(Direction::iter().filter_map(|dir| square + dir));
    }
    array
});

static KNIGHT_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    const OFFSETS: [Offset; 8] = [
        Offset::new(-2, -1),
        Offset::new(-2, 1),
        Offset::new(2, -1),
        Offset::new(2, 1),
        Offset::new(-1, -2),
        Offset::new(-1, 2),
        Offset::new(1, -2),
        Offset::new(1, 2),
    ];
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] =
            Mask::from_squares(OFFSETS.into_iter().filter_map(|offset| square + offset));
    }
    array
});

/// Diagonal-forward squares for each color's pawns. These are the only
/// squares a pawn threatens.
pub(super) static PAWN_ATTACKS: Lazy<Pair<[Mask; 64]>> = Lazy::new(|| {
    fn attacks(offsets: [Offset; 2]) -> [Mask; 64] {
        let mut array = [Mask::default(); 64];
        for square in Square::iter() {
            array[square] =
                Mask::from_squares(offsets.into_iter().filter_map(|offset| square + offset));
        }
        array
    }
    Pair::new(
        attacks([Offset::new(-1, -1), Offset::new(1, -1)]),
        attacks([Offset::new(-1, 1), Offset::new(1, 1)]),
    )
});

#[cfg(test)]
mod tests {
    use super::*;
    use Square::*;

    fn black_to_move() -> Position {
        Position::new().with_turn(Black)
    }

    #[test]
    fn test_move_notation() {
        let mv = Move::try_from_string("e2e4").unwrap();
        assert_eq!(mv, Move::new(E2, E4));
        assert_eq!(mv.to_string(), "e2e4");
        assert_eq!(Move::try_from_string(" g8f6\n"), Some(Move::new(G8, F6)));
        assert_eq!(Move::try_from_string("e2e9"), None);
        assert_eq!(Move::try_from_string("e2"), None);
        assert_eq!(Move::try_from_string("e2é4"), None);
    }
    #[test]
    fn test_empty_square_has_no_moves() {
        let pos = Position::new();
        assert!(pos.pseudo_moves(E4).is_empty());
        assert!(pos.legal_moves(E4).is_empty());
    }
    #[test]
    fn test_white_pawn_advance() {
        let pos = Position::new();
        let destinations = pos.legal_moves(E2);
        assert_eq!(destinations, Mask::from_squares([E3, E4]));
    }
    #[test]
    fn test_black_pawn_advance() {
        let pos = black_to_move();
        let destinations = pos.legal_moves(E7);
        assert_eq!(destinations, Mask::from_squares([E6, E5]));
    }
    #[test]
    fn test_pawn_advance_blocked() {
        let pos = Position::new().with(E3, Some(Piece::BB));
        let destinations = pos.pseudo_moves(E2);
        assert!(!destinations.contains(E3));
        assert!(!destinations.contains(E4));
    }
    #[test]
    fn test_pawn_double_advance_blocked() {
        let pos = black_to_move().with(E5, Some(Piece::WB));
        let destinations = pos.pseudo_moves(E7);
        assert!(destinations.contains(E6));
        assert!(!destinations.contains(E5));
    }
    #[test]
    fn test_no_double_advance_off_starting_rank() {
        let pos = Position::empty(White).with(D3, Some(Piece::WP));
        assert_eq!(pos.pseudo_moves(D3), Mask::from_squares([D4]));
    }
    #[test]
    fn test_pawn_captures_only_opponents() {
        let pos = Position::new()
            .with(D3, Some(Piece::BB))
            .with(F3, Some(Piece::WN));
        let destinations = pos.pseudo_moves(E2);
        assert!(destinations.contains(D3));
        assert!(!destinations.contains(F3));
        // Diagonals are never reachable without a capture
        let destinations = pos.pseudo_moves(A2);
        assert!(!destinations.contains(B3));
    }
    #[test]
    fn test_pawn_cannot_capture_straight_ahead() {
        let pos = Position::empty(White)
            .with(C4, Some(Piece::WP))
            .with(C5, Some(Piece::BP));
        assert!(pos.pseudo_moves(C4).is_empty());
    }
    #[test]
    fn test_knight_destinations() {
        let pos = Position::new();
        assert_eq!(pos.legal_moves(G1), Mask::from_squares([F3, H3]));
        let pos = Position::empty(White).with(D4, Some(Piece::WN));
        assert_eq!(pos.pseudo_moves(D4).len(), 8);
        let pos = Position::empty(White).with(A1, Some(Piece::WN));
        assert_eq!(pos.pseudo_moves(A1), Mask::from_squares([B3, C2]));
    }
    #[test]
    fn test_knight_blocked() {
        let pos = Position::new()
            .with(F3, Some(Piece::WP))
            .with(H3, Some(Piece::WP));
        assert!(pos.legal_moves(G1).is_empty());
    }
    #[test]
    fn test_king_steps() {
        let pos = Position::empty(White)
            .with(E4, Some(Piece::WK))
            .with(E5, Some(Piece::WP))
            .with(D5, Some(Piece::BP));
        let destinations = pos.pseudo_moves(E4);
        assert_eq!(destinations.len(), 7);
        assert!(!destinations.contains(E5));
        assert!(destinations.contains(D5));
    }
    #[test]
    fn test_rook_rays_stop_at_pieces() {
        let pos = Position::empty(White)
            .with(A1, Some(Piece::WR))
            .with(A4, Some(Piece::BP))
            .with(D1, Some(Piece::WB));
        let destinations = pos.pseudo_moves(A1);
        assert_eq!(destinations, Mask::from_squares([A2, A3, A4, B1, C1]));
    }
    #[test]
    fn test_bishop_rays() {
        let pos = Position::new().with(C2, None).with(D2, None);
        let destinations = pos.legal_moves(C1);
        assert_eq!(destinations, Mask::from_squares([D2, E3, F4, G5, H6]));
    }
    #[test]
    fn test_queen_destinations() {
        let pos = Position::new()
            .with(C1, None)
            .with(C2, None)
            .with(D2, None);
        let destinations = pos.legal_moves(D1);
        assert_eq!(destinations.len(), 10);
        assert!(destinations.contains(C1));
        assert!(!destinations.contains(B1));
        assert!(destinations.contains(B3));
        assert!(destinations.contains(D7));
        assert!(!destinations.contains(D8));
        assert!(!destinations.contains(E2));
    }
    #[test]
    fn test_pinned_piece_keeps_to_the_pin() {
        let pos = Position::empty(White)
            .with(E1, Some(Piece::WK))
            .with(E4, Some(Piece::WR))
            .with(E8, Some(Piece::BQ))
            .with(A8, Some(Piece::BK));
        let destinations = pos.legal_moves(E4);
        assert_eq!(destinations, Mask::from_squares([E8, E7, E6, E5, E3, E2]));
        let pos = pos.with(E4, Some(Piece::WN));
        assert!(pos.legal_moves(E4).is_empty());
    }
    #[test]
    fn test_king_cannot_step_into_attack() {
        let pos = Position::empty(White)
            .with(E1, Some(Piece::WK))
            .with(D8, Some(Piece::BR))
            .with(H8, Some(Piece::BK));
        let destinations = pos.legal_moves(E1);
        assert_eq!(destinations, Mask::from_squares([E2, F2, F1]));
    }
    #[test]
    fn test_king_cannot_retreat_along_check_ray() {
        let pos = Position::empty(White)
            .with(E4, Some(Piece::WK))
            .with(E8, Some(Piece::BR))
            .with(A1, Some(Piece::BK));
        let destinations = pos.legal_moves(E4);
        assert!(!destinations.contains(E3));
        assert!(!destinations.contains(E5));
        assert!(destinations.contains(D4));
    }
    #[test]
    fn test_check_must_be_answered() {
        // Black rook on e8 checks the king on e1; only blocks, captures
        // and king moves survive
        let pos = Position::empty(White)
            .with(E1, Some(Piece::WK))
            .with(E8, Some(Piece::BR))
            .with(A8, Some(Piece::BK))
            .with(B5, Some(Piece::WB))
            .with(A4, Some(Piece::WR));
        assert_eq!(pos.legal_moves(B5), Mask::from_squares([E8, E2]));
        assert_eq!(pos.legal_moves(A4), Mask::from_squares([E4]));
        assert!(pos.can_move(White));
    }
    #[test]
    fn test_initial_mobility() {
        let pos = Position::new();
        let moves = pos.all_legal_moves(White);
        assert_eq!(moves.len(), 20);
        let pawn_moves = moves
            .iter()
            .filter(|mv| pos.contents(mv.from) == Some(Piece::WP))
            .count();
        assert_eq!(pawn_moves, 16);
        for mv in moves {
            assert!(!pos.occupied_by(White).contains(mv.to));
        }
        assert_eq!(black_to_move().all_legal_moves(Black).len(), 20);
    }
    #[test]
    fn test_can_move_false_when_boxed_in() {
        let pos = Position::empty(Black)
            .with(A8, Some(Piece::BK))
            .with(B6, Some(Piece::WK))
            .with(C7, Some(Piece::WQ));
        assert!(!pos.can_move(Black));
        assert!(pos.can_move(White));
    }
}
