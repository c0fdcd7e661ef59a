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

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use strum::IntoEnumIterator;
use thiserror::Error;

use super::material::{Cell, Color, Pair, Piece, PieceKind};
use super::moves::Move;
use super::square::{File, Mask, Rank, Square};
use super::Turn;

use Color::*;
use PieceKind::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PositionError {
    #[error("Expecting 8 ranks separated by '/', found {0}")]
    RankCount(usize),
    #[error("Rank {0} does not describe exactly 8 squares")]
    RankLength(usize),
    #[error("Unknown piece letter '{0}'")]
    UnknownPiece(char),
    #[error("At most 32 pieces fit on a board, found {0}")]
    TooManyPieces(usize),
}

const MAX_PIECES: usize = 32;

const BACK_RANK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Squares([Cell; 64]);

impl Squares {
    fn empty() -> Self {
        Self([None; 64])
    }
}

impl Index<Square> for Squares {
    type Output = Cell;
    fn index(&self, index: Square) -> &Self::Output {
        &self.0[index.to_index()]
    }
}

impl IndexMut<Square> for Squares {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.0[index.to_index()]
    }
}

/// The contents of every square plus the side to move.
///
/// A position is a plain value: cloning it copies every square, so a
/// clone can be mutated freely without touching the original. Legality
/// checks rely on this when they try a move out on a scratch copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    squares: Squares,
    turn: Color,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for Position {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.placement())?;
        tuple.serialize_element(&self.turn)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct PositionVisitor;
        impl<'de> serde::de::Visitor<'de> for PositionVisitor {
            type Value = (String, Color);
            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a (placement, turn) tuple")
            }
            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let placement = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::custom("Missing placement"))?;
                let turn = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::custom("Missing turn"))?;
                Ok((placement, turn))
            }
        }
        let (placement, turn) = deserializer.deserialize_tuple(2, PositionVisitor)?;
        Position::from_placement(&placement, turn).map_err(serde::de::Error::custom)
    }
}

impl Position {
    /// The standard starting arrangement with white to move.
    pub fn new() -> Self {
        let mut position = Self::empty(White);
        for (file, kind) in File::iter().zip(BACK_RANK) {
            position.init_file(file, kind);
        }
        position
    }

    fn init_file(&mut self, file: File, kind: PieceKind) {
        const PAWN_RANKS: Pair<Rank> = Pair::new(Rank::pawn_rank(White), Rank::pawn_rank(Black));
        const BACK_RANKS: Pair<Rank> = Pair::new(Rank::back_rank(White), Rank::back_rank(Black));
        for color in Color::iter() {
            self.place(Square::new(file, PAWN_RANKS[color]), Piece::new(color, Pawn));
            self.place(Square::new(file, BACK_RANKS[color]), Piece::new(color, kind));
        }
    }

    /// A board with no pieces on it.
    pub fn empty(turn: Color) -> Self {
        Self {
            squares: Squares::empty(),
            turn,
        }
    }

    /// Builder used to lay out arbitrary boards.
    pub fn with(mut self, square: Square, cell: Cell) -> Self {
        self.squares[square] = cell;
        self
    }

    pub fn with_turn(mut self, turn: Color) -> Self {
        self.turn = turn;
        self
    }

    /// Parses the piece placement field of a FEN record, e.g.
    /// `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`.
    pub fn from_placement(placement: &str, turn: Color) -> Result<Self, PositionError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(PositionError::RankCount(ranks.len()));
        }
        let mut position = Self::empty(turn);
        for (row, text) in ranks.into_iter().enumerate() {
            let mut col = 0;
            for c in text.chars() {
                if let Some(run) = c.to_digit(10) {
                    col += run as usize;
                } else {
                    let piece = Piece::try_from_char(c).ok_or(PositionError::UnknownPiece(c))?;
                    if col < 8 {
                        position.squares.0[row * 8 + col] = Some(piece);
                    }
                    col += 1;
                }
                if col > 8 {
                    return Err(PositionError::RankLength(8 - row));
                }
            }
            if col != 8 {
                return Err(PositionError::RankLength(8 - row));
            }
        }
        let count = position.squares.0.iter().filter(|cell| cell.is_some()).count();
        if count > MAX_PIECES {
            return Err(PositionError::TooManyPieces(count));
        }
        Ok(position)
    }

    pub fn placement(&self) -> String {
        let mut result = String::new();
        for row in 0..8 {
            if row > 0 {
                result.push('/');
            }
            let mut run = 0;
            for col in 0..8 {
                match self.squares.0[row * 8 + col] {
                    Some(piece) => {
                        if run > 0 {
                            result.push_str(&run.to_string());
                            run = 0;
                        }
                        result.push(piece.to_char());
                    }
                    None => run += 1,
                }
            }
            if run > 0 {
                result.push_str(&run.to_string());
            }
        }
        result
    }

    #[inline]
    pub fn contents(&self, square: Square) -> Cell {
        self.squares[square]
    }

    /// The square holding `color`'s king, if there is one.
    pub fn king(&self, color: Color) -> Option<Square> {
        let king = Some(Piece::new(color, King));
        Square::iter().find(|&square| self.squares[square] == king)
    }

    pub fn occupied_by(&self, color: Color) -> Mask {
        Mask::from_squares(
            Square::iter().filter(|&square| {
                matches!(self.squares[square], Some(piece) if piece.color() == color)
            }),
        )
    }

    /// Applies a move that has already been validated: the piece moves,
    /// anything on the destination is captured, a pawn reaching the far
    /// rank becomes a queen and the turn passes to the other side.
    /// Returns the captured piece, if any.
    pub(crate) fn apply_move(&mut self, mv: Move) -> Cell {
        let captured = self.relocate(mv);
        if let Some(piece) = &mut self.squares[mv.to] {
            if piece.kind().is_pawn() && mv.to.rank() == Rank::far_rank(piece.color()) {
                piece.promote();
            }
        }
        self.turn = !self.turn;
        captured
    }

    /// Returns an independent copy of the position with the piece on
    /// `mv.from` relocated to `mv.to`. Promotion and the turn are left
    /// alone since neither changes whether the mover's king is attacked.
    pub fn simulate(&self, mv: Move) -> Position {
        let mut trial = self.clone();
        trial.relocate(mv);
        trial
    }

    fn relocate(&mut self, mv: Move) -> Cell {
        let piece = self.remove(mv.from);
        match piece {
            Some(piece) => self.place(mv.to, piece),
            None => None,
        }
    }

    fn place(&mut self, square: Square, piece: Piece) -> Cell {
        self.squares[square].replace(piece)
    }

    fn remove(&mut self, square: Square) -> Cell {
        self.squares[square].take()
    }
}

impl Turn for Position {
    #[inline]
    fn turn(&self) -> Color {
        self.turn
    }
}

impl Index<Square> for Position {
    type Output = Cell;
    #[inline]
    fn index(&self, index: Square) -> &Self::Output {
        &self.squares[index]
    }
}

impl AsRef<Self> for Position {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl Pos for Position {}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter() {
            write!(f, "{} ", rank)?;
            for file in File::iter() {
                let c = match self.squares[Square::new(file, rank)] {
                    Some(piece) => piece.to_char(),
                    None => '.',
                };
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, " ")?;
        for file in File::iter() {
            write!(f, " {}", file)?;
        }
        writeln!(f)
    }
}

/// Read access shared by everything that wraps a position.
pub trait Pos: Turn + AsRef<Position> {
    #[inline]
    fn contents(&self, square: Square) -> Cell {
        let pos: &Position = self.as_ref();
        pos.squares[square]
    }
    #[inline]
    fn is_vacant(&self, square: Square) -> bool {
        self.contents(square).is_none()
    }
    #[inline]
    fn is_occupied(&self, square: Square) -> bool {
        self.contents(square).is_some()
    }
    #[inline]
    fn ours(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.occupied_by(self.turn())
    }
    #[inline]
    fn theirs(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.occupied_by(!self.turn())
    }
    #[inline]
    fn our_king(&self) -> Option<Square> {
        let pos: &Position = self.as_ref();
        pos.king(self.turn())
    }
}
