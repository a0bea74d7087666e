//! Rigid connections. Connected pieces form a ring through
//! `connect_next`/`connect_prev` and move as one body.

use lattice_core::Piece;

use super::Grid;

impl Grid {
    /// `piece` followed by every piece connected to it, in ring order.
    /// Empty for a dead piece.
    pub fn connected_pieces(&self, piece: Piece) -> Vec<Piece> {
        let Some(data) = self.piece_data(piece) else {
            return Vec::new();
        };
        let mut result = vec![piece];
        let mut next = data.connect_next;
        while !next.is_empty() && next != piece {
            result.push(next);
            next = self.pieces[next].connect_next;
        }
        result
    }

    /// Joins the rings of `first` and `second`.
    pub(super) fn connect_actual(&mut self, first: Piece, second: Piece) {
        if first == second || !self.is_live(second) {
            return;
        }
        let first_next = self.pieces[first].connect_next;
        let second_next = self.pieces[second].connect_next;
        match (first_next.is_empty(), second_next.is_empty()) {
            (true, true) => {
                let a = &mut self.pieces[first];
                a.connect_next = second;
                a.connect_prev = second;
                let b = &mut self.pieces[second];
                b.connect_next = first;
                b.connect_prev = first;
            }
            (true, false) => {
                // Insert `first` before `second`.
                let before = self.pieces[second].connect_prev;
                let a = &mut self.pieces[first];
                a.connect_next = second;
                a.connect_prev = before;
                self.pieces[second].connect_prev = first;
                self.pieces[before].connect_next = first;
            }
            (false, true) => {
                // Insert `second` after `first`.
                let b = &mut self.pieces[second];
                b.connect_prev = first;
                b.connect_next = first_next;
                self.pieces[first].connect_next = second;
                self.pieces[first_next].connect_prev = second;
            }
            (false, false) => {
                if self.connected_pieces(first).contains(&second) {
                    return;
                }
                // Splice the ring of `second` in before `first`.
                let first_prev = self.pieces[first].connect_prev;
                self.pieces[first_prev].connect_next = second_next;
                self.pieces[second_next].connect_prev = first_prev;
                self.pieces[first].connect_prev = second;
                self.pieces[second].connect_next = first;
            }
        }
    }

    /// Takes `piece` out of its ring; the rest stay connected.
    pub(super) fn disconnect_actual(&mut self, piece: Piece) {
        let prev = self.pieces[piece].connect_prev;
        if prev.is_empty() {
            return;
        }
        let next = self.pieces[piece].connect_next;
        if next != prev {
            self.pieces[prev].connect_next = next;
            self.pieces[next].connect_prev = prev;
        } else {
            self.pieces[prev].connect_next = Piece::EMPTY;
            self.pieces[prev].connect_prev = Piece::EMPTY;
        }
        let data = &mut self.pieces[piece];
        data.connect_next = Piece::EMPTY;
        data.connect_prev = Piece::EMPTY;
    }

    /// Dissolves the whole ring containing `piece`.
    pub(super) fn disconnect_all_actual(&mut self, piece: Piece) {
        for handle in self.connected_pieces(piece) {
            let data = &mut self.pieces[handle];
            data.connect_next = Piece::EMPTY;
            data.connect_prev = Piece::EMPTY;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{at, test_world};
    use super::super::Perspective;
    use super::*;
    use lattice_core::{Orientation, Position, Size, Topology};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sorted(mut pieces: Vec<Piece>) -> Vec<Piece> {
        pieces.sort();
        pieces
    }

    #[test]
    fn test_connect_builds_ring() {
        let world = test_world();
        let wall = world.states().to_handle("Wall");
        let mut grid = Grid::new(world, Size::new(4, 1), Topology::Bounded).unwrap();
        let pieces: Vec<Piece> = (0..4).map(|x| grid.create_instance(wall, at(x, 0))).collect();

        grid.connect_actual(pieces[0], pieces[1]);
        grid.connect_actual(pieces[2], pieces[3]);
        assert_eq!(grid.connected_pieces(pieces[0]), vec![pieces[0], pieces[1]]);
        grid.connect_actual(pieces[1], pieces[2]);
        assert_eq!(sorted(grid.connected_pieces(pieces[3])), pieces);
        // Already connected.
        grid.connect_actual(pieces[0], pieces[3]);
        assert_eq!(grid.connected_pieces(pieces[0]).len(), 4);
    }

    #[test]
    fn test_disconnect_leaves_rest_connected() {
        let world = test_world();
        let wall = world.states().to_handle("Wall");
        let mut grid = Grid::new(world, Size::new(3, 1), Topology::Bounded).unwrap();
        let pieces: Vec<Piece> = (0..3).map(|x| grid.create_instance(wall, at(x, 0))).collect();
        grid.connect_actual(pieces[0], pieces[1]);
        grid.connect_actual(pieces[0], pieces[2]);

        grid.disconnect_actual(pieces[1]);
        assert_eq!(grid.connected_pieces(pieces[1]), vec![pieces[1]]);
        assert_eq!(sorted(grid.connected_pieces(pieces[2])), vec![pieces[0], pieces[2]]);
        grid.disconnect_actual(pieces[2]);
        assert_eq!(grid.connected_pieces(pieces[0]), vec![pieces[0]]);
    }

    #[test]
    fn test_disconnect_all() {
        let world = test_world();
        let wall = world.states().to_handle("Wall");
        let mut grid = Grid::new(world, Size::new(3, 1), Topology::Bounded).unwrap();
        let pieces: Vec<Piece> = (0..3).map(|x| grid.create_instance(wall, at(x, 0))).collect();
        grid.connect_actual(pieces[0], pieces[1]);
        grid.connect_actual(pieces[1], pieces[2]);
        grid.disconnect_all_actual(pieces[2]);
        for piece in &pieces {
            assert_eq!(grid.connected_pieces(*piece), vec![*piece]);
        }
    }

    #[test]
    fn test_release_splices_ring() {
        let world = test_world();
        let wall = world.states().to_handle("Wall");
        let mut grid = Grid::new(world, Size::new(3, 1), Topology::Bounded).unwrap();
        let pieces: Vec<Piece> = (0..3).map(|x| grid.create_instance(wall, at(x, 0))).collect();
        grid.connect_actual(pieces[0], pieces[1]);
        grid.connect_actual(pieces[1], pieces[2]);
        grid.release_instance(pieces[1]);
        assert_eq!(sorted(grid.connected_pieces(pieces[0])), vec![pieces[0], pieces[2]]);
    }

    #[test]
    fn test_connected_pieces_move_together() {
        let world = test_world();
        let player = world.states().to_handle("Player");
        let wall = world.states().to_handle("Wall");
        let mut grid = Grid::new(world, Size::new(4, 2), Topology::Bounded).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let a = grid.create_instance(player, at(0, 0));
        let b = grid.create_instance(wall, at(1, 0));
        grid.connect(a, b);
        grid.push_piece(a, Orientation::East, Perspective::Grid);
        grid.do_update(&mut rng, 128);
        assert_eq!(grid.get_piece_transform(a).position, Position::new(1, 0));
        assert_eq!(grid.get_piece_transform(b).position, Position::new(2, 0));
        assert_eq!(grid.to_string(), " PW \n    \n");

        grid.disconnect(b);
        grid.push_piece(a, Orientation::South, Perspective::Grid);
        grid.do_update(&mut rng, 128);
        assert_eq!(grid.to_string(), "  W \n P  \n");
    }
}
