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

use serde::{Deserialize, Serialize};
use std::ops::{Index, Not};
use strum_macros::Display;
use strum_macros::EnumIter;

/// A piece of a specific color. The contents of a square is a `Cell`,
/// which is `None` when the square is empty.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    color: Color,
    kind: PieceKind,
}

pub type Cell = Option<Piece>;

impl Piece {
    pub const WK: Self = Self::white(King);
    pub const WQ: Self = Self::white(Queen);
    pub const WR: Self = Self::white(Rook);
    pub const WB: Self = Self::white(Bishop);
    pub const WN: Self = Self::white(Knight);
    pub const WP: Self = Self::white(Pawn);

    pub const BK: Self = Self::black(King);
    pub const BQ: Self = Self::black(Queen);
    pub const BR: Self = Self::black(Rook);
    pub const BB: Self = Self::black(Bishop);
    pub const BN: Self = Self::black(Knight);
    pub const BP: Self = Self::black(Pawn);

    #[inline]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    #[inline]
    pub const fn white(kind: PieceKind) -> Self {
        Self::new(White, kind)
    }

    #[inline]
    pub const fn black(kind: PieceKind) -> Self {
        Self::new(Black, kind)
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline]
    pub fn promote(&mut self) {
        self.kind = Queen;
    }

    /// Placement letter: uppercase for white, lowercase for black.
    pub fn to_char(&self) -> char {
        let c = self.kind.to_char();
        match self.color {
            White => c.to_ascii_uppercase(),
            Black => c,
        }
    }

    pub fn try_from_char(c: char) -> Option<Self> {
        let kind = PieceKind::try_from_char(c.to_ascii_lowercase())?;
        let color = if c.is_ascii_uppercase() { White } else { Black };
        Some(Self::new(color, kind))
    }
}

use Color::{Black, White};

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Color {
    White,
    Black,
}

impl Not for Color {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        match self {
            White => Black,
            Black => White,
        }
    }
}

/// One value per side, indexed by `Color`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pair<T>((T, T));

impl<T> Pair<T> {
    pub const fn new(white: T, black: T) -> Self {
        Self((white, black))
    }
    pub fn white(&self) -> &T {
        &self.0 .0
    }
    pub fn black(&self) -> &T {
        &self.0 .1
    }
}

impl<T> Index<Color> for Pair<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: Color) -> &Self::Output {
        match index {
            White => self.white(),
            Black => self.black(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
use PieceKind::{Bishop, King, Knight, Pawn, Queen, Rook};

impl PieceKind {
    pub fn is_pawn(&self) -> bool {
        matches!(*self, Pawn)
    }
    pub const fn to_char(&self) -> char {
        match *self {
            Pawn => 'p',
            Knight => 'n',
            Bishop => 'b',
            Rook => 'r',
            Queen => 'q',
            King => 'k',
        }
    }
    pub const fn try_from_char(c: char) -> Option<Self> {
        match c {
            'p' => Some(Pawn),
            'n' => Some(Knight),
            'b' => Some(Bishop),
            'r' => Some(Rook),
            'q' => Some(Queen),
            'k' => Some(King),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_letters() {
        assert_eq!(Piece::WK.to_char(), 'K');
        assert_eq!(Piece::BN.to_char(), 'n');
        assert_eq!(Piece::try_from_char('Q'), Some(Piece::WQ));
        assert_eq!(Piece::try_from_char('p'), Some(Piece::BP));
        assert_eq!(Piece::try_from_char('x'), None);
    }
    #[test]
    fn test_promote_keeps_color() {
        let mut piece = Piece::BP;
        piece.promote();
        assert_eq!(piece, Piece::BQ);
    }
    #[test]
    fn test_pair_index() {
        let pair = Pair::new(1, 2);
        assert_eq!(pair[White], 1);
        assert_eq!(pair[!White], 2);
    }
}
