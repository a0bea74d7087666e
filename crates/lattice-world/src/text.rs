//! ASCII layouts: measuring them and stamping them onto a grid.

use std::collections::BTreeMap;

use lattice_core::{Error, Orientation, Piece, Position, Result, Size, State, Transform};
use tracing::debug;

use crate::grid::Grid;
use crate::world::World;

/// Strips newlines from both ends; interior newlines are kept.
pub fn remove_leading_and_trailing_new_lines(text: &str) -> &str {
    text.trim_matches('\n')
}

/// Width of the longest line and number of lines after trimming. Empty text
/// measures 0x0.
pub fn size_of_text(text: &str) -> Size {
    let text = remove_leading_and_trailing_new_lines(text);
    if text.is_empty() {
        return Size::new(0, 0);
    }
    let (height, width) = text
        .split('\n')
        .fold((0, 0), |(height, width), line| (height + 1, width.max(line.len())));
    Size::new(width as i32, height)
}

/// State for each byte value. Unmapped bytes hold the empty state.
#[derive(Clone)]
pub struct CharMap {
    states: [State; 256],
}

impl Default for CharMap {
    fn default() -> Self {
        Self {
            states: [State::EMPTY; 256],
        }
    }
}

impl std::fmt::Debug for CharMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.states
                    .iter()
                    .enumerate()
                    .filter(|(_, state)| !state.is_empty())
                    .map(|(byte, state)| (byte as u8 as char, state)),
            )
            .finish()
    }
}

impl CharMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a character-to-state-name table against `world`.
    ///
    /// Every key must be exactly one byte and every name a known state.
    pub fn from_names(world: &World, names: &BTreeMap<String, String>) -> Result<Self> {
        let mut map = Self::new();
        for (key, name) in names {
            let &[byte] = key.as_bytes() else {
                return Err(Error::Validation(format!(
                    "state map key must be a single character, found '{}'",
                    key
                )));
            };
            let state = world.states().to_handle(name);
            if state.is_empty() {
                return Err(Error::NotFound(format!("state '{}'", name)));
            }
            map.set(byte, state);
        }
        Ok(map)
    }

    pub fn get(&self, byte: u8) -> State {
        self.states[byte as usize]
    }

    pub fn set(&mut self, byte: u8, state: State) {
        self.states[byte as usize] = state;
    }
}

impl Grid {
    /// Creates one piece per mapped character of `layout`, with the first
    /// character of the first line at `offset`. Leading and trailing
    /// newlines are ignored. Returns the pieces actually created, in reading
    /// order.
    pub fn create_layout(
        &mut self,
        char_map: &CharMap,
        layout: &str,
        offset: Position,
        orientation: Orientation,
    ) -> Vec<Piece> {
        let layout = remove_leading_and_trailing_new_lines(layout);
        let mut pieces = Vec::new();
        for (row, line) in layout.split('\n').enumerate() {
            for (col, byte) in line.bytes().enumerate() {
                let state = char_map.get(byte);
                if state.is_empty() {
                    continue;
                }
                let position = Position::new(offset.x + col as i32, offset.y + row as i32);
                let piece = self.create_instance(state, Transform::new(position, orientation));
                if !piece.is_empty() {
                    pieces.push(piece);
                }
            }
        }
        debug!(pieces = pieces.len(), "Layout placed");
        pieces
    }
}
