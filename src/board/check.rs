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

use log::debug;

use super::material::Color;
use super::moves::{PseudoMoves, PAWN_ATTACKS};
use super::position::Position;
use super::square::{Mask, Square};

pub trait Checks: PseudoMoves {
    /// Squares threatened by the piece on `from`. A pawn only threatens
    /// its diagonals; every other piece threatens wherever it could move.
    fn attacks(&self, from: Square) -> Mask {
        let pos: &Position = self.as_ref();
        match pos.contents(from) {
            Some(piece) if piece.kind().is_pawn() => PAWN_ATTACKS[piece.color()][from],
            Some(_) => self.pseudo_moves(from),
            None => Mask::empty(),
        }
    }

    /// Pieces of color `by` that threaten `square`.
    fn attackers(&self, square: Square, by: Color) -> Mask {
        let pos: &Position = self.as_ref();
        Mask::from_squares(
            pos.occupied_by(by)
                .iter()
                .filter(|&from| self.attacks(from).contains(square)),
        )
    }

    fn is_attacked(&self, square: Square, by: Color) -> bool {
        let pos: &Position = self.as_ref();
        pos.occupied_by(by)
            .iter()
            .any(|from| self.attacks(from).contains(square))
    }

    /// Opposing pieces giving check to `color`'s king.
    fn checkers(&self, color: Color) -> Mask {
        let pos: &Position = self.as_ref();
        match pos.king(color) {
            Some(king) => self.attackers(king, !color),
            None => Mask::empty(),
        }
    }

    /// Whether `color`'s king is attacked. A side without a king is
    /// reported as being in check.
    fn is_check(&self, color: Color) -> bool {
        let pos: &Position = self.as_ref();
        match pos.king(color) {
            Some(king) => self.is_attacked(king, !color),
            None => {
                debug!("no {} king on the board, treating as check", color);
                true
            }
        }
    }
}

impl Checks for Position {}
