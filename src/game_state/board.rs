//! The board: a sparse square-to-piece map over the padded grid, plus the
//! derived indices that must stay consistent with it (commander locations
//! and per-color air-defense coverage).

use tracing::trace;

use crate::board_square::{Square, GRID_SIZE};
use crate::errors::EngineError;
use crate::pieces::piece::{Piece, PieceColor, PieceType};
use crate::rules::air_defense::AirDefenseMap;
use crate::rules::move_table::rule_for;
use crate::rules::terrain::{can_occupy, terrain_at};

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    squares: Vec<Option<Piece>>,
    commander_square: [Option<Square>; 2],
    air_defense: [AirDefenseMap; 2],
}

impl Board {
    pub fn empty() -> Self {
        Board {
            squares: vec![None; GRID_SIZE],
            commander_square: [None, None],
            air_defense: [AirDefenseMap::empty(), AirDefenseMap::empty()],
        }
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.squares[square.index()].as_ref()
    }

    /// Location of a color's commander, whether standing alone or carried
    /// inside a stack. `None` once captured.
    #[inline]
    pub fn commander_square(&self, color: PieceColor) -> Option<Square> {
        self.commander_square[color.index()]
    }

    /// Air-defense coverage map of a color.
    #[inline]
    pub fn air_defense(&self, color: PieceColor) -> &AirDefenseMap {
        &self.air_defense[color.index()]
    }

    /// Iterates occupied squares.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, &Piece)> {
        Square::all().filter_map(move |square| {
            self.squares[square.index()]
                .as_ref()
                .map(|piece| (square, piece))
        })
    }

    /// Places a piece on an empty, terrain-compatible square and refreshes
    /// the derived indices.
    pub fn place_piece(&mut self, square: Square, piece: Piece) -> Result<(), EngineError> {
        if self.squares[square.index()].is_some() {
            return Err(EngineError::SquareOccupied(square.to_algebraic()));
        }
        if !can_occupy(piece.piece_type, square) {
            return Err(EngineError::TerrainViolation {
                piece: format!("{:?}", piece.piece_type),
                terrain: format!("{:?}", terrain_at(square)),
                square: square.to_algebraic(),
            });
        }
        let color = piece.color;
        let touches_air_defense = projects_air_defense(&piece);
        if stack_contains_commander(&piece) {
            self.commander_square[color.index()] = Some(square);
        }
        self.squares[square.index()] = Some(piece);
        if touches_air_defense {
            self.rebuild_air_defense(color);
        }
        Ok(())
    }

    /// Removes and returns the piece on a square, refreshing the derived
    /// indices.
    pub fn remove_piece(&mut self, square: Square) -> Result<Piece, EngineError> {
        let piece = self.squares[square.index()]
            .take()
            .ok_or_else(|| EngineError::EmptySquare(square.to_algebraic()))?;
        if stack_contains_commander(&piece) {
            self.commander_square[piece.color.index()] = None;
        }
        if projects_air_defense(&piece) {
            self.rebuild_air_defense(piece.color);
        }
        Ok(piece)
    }

    /// Swaps the piece on a square for another, returning the old one. Used
    /// by stack splits and combinations where the square never goes empty.
    /// Atomic: a rejected replacement puts the old piece back.
    pub fn replace_piece(&mut self, square: Square, piece: Piece) -> Result<Piece, EngineError> {
        let old = self.remove_piece(square)?;
        if let Err(error) = self.place_piece(square, piece) {
            self.place_piece(square, old)
                .expect("restoring the removed piece cannot fail");
            return Err(error);
        }
        Ok(old)
    }

    /// Flips the heroic flag of one constituent (outer piece or cargo) on a
    /// square. Returns the previous flag value.
    pub fn set_heroic(
        &mut self,
        square: Square,
        piece_type: PieceType,
        heroic: bool,
    ) -> Result<bool, EngineError> {
        let slot = self.squares[square.index()]
            .as_mut()
            .ok_or_else(|| EngineError::EmptySquare(square.to_algebraic()))?;
        let color = slot.color;
        let constituent = if slot.piece_type == piece_type {
            slot
        } else {
            slot.carried
                .iter_mut()
                .find(|piece| piece.piece_type == piece_type)
                .ok_or_else(|| EngineError::EmptySquare(square.to_algebraic()))?
        };
        let previous = constituent.heroic;
        constituent.heroic = heroic;
        if previous != heroic && rule_for(piece_type, false).air_defense_level > 0 {
            self.rebuild_air_defense(color);
        }
        Ok(previous)
    }

    fn rebuild_air_defense(&mut self, color: PieceColor) {
        let defenders: Vec<(Square, u8)> = self
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .flat_map(|(square, piece)| {
                piece
                    .flattened()
                    .into_iter()
                    .map(move |constituent| {
                        let level =
                            rule_for(constituent.piece_type, constituent.heroic).air_defense_level;
                        (square, level)
                    })
                    .filter(|(_, level)| *level > 0)
                    .collect::<Vec<_>>()
            })
            .collect();
        trace!(?color, defenders = defenders.len(), "air defense map rebuilt");
        self.air_defense[color.index()] = AirDefenseMap::rebuild(defenders.into_iter());
    }
}

fn stack_contains_commander(piece: &Piece) -> bool {
    piece
        .flattened()
        .iter()
        .any(|constituent| constituent.piece_type == PieceType::Commander)
}

fn projects_air_defense(piece: &Piece) -> bool {
    piece
        .flattened()
        .iter()
        .any(|constituent| rule_for(constituent.piece_type, false).air_defense_level > 0)
}
