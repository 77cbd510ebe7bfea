//! Closed direction enums for the pointy-top hex lattice.
//!
//! Vertices are indexed clockwise from the top: N=0, NE=1, SE=2, S=3,
//! SW=4, NW=5. Each edge connects two consecutive vertices; each corner
//! direction names a single vertex.

use serde::{Deserialize, Serialize};

/// The six edges of a pointy-top hexagon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeDirection {
    W,
    NW,
    NE,
    E,
    SE,
    SW,
}

impl EdgeDirection {
    pub const ALL: [EdgeDirection; 6] = [
        EdgeDirection::W,
        EdgeDirection::NW,
        EdgeDirection::NE,
        EdgeDirection::E,
        EdgeDirection::SE,
        EdgeDirection::SW,
    ];

    /// Vertex index pair `(a, b)` this edge spans, clockwise.
    pub fn vertex_indices(self) -> (usize, usize) {
        match self {
            EdgeDirection::W => (4, 5),
            EdgeDirection::NW => (5, 0),
            EdgeDirection::NE => (0, 1),
            EdgeDirection::E => (1, 2),
            EdgeDirection::SE => (2, 3),
            EdgeDirection::SW => (3, 4),
        }
    }

    /// The same edge as seen from the neighbouring tile.
    pub fn opposite(self) -> EdgeDirection {
        match self {
            EdgeDirection::W => EdgeDirection::E,
            EdgeDirection::E => EdgeDirection::W,
            EdgeDirection::NW => EdgeDirection::SE,
            EdgeDirection::SE => EdgeDirection::NW,
            EdgeDirection::NE => EdgeDirection::SW,
            EdgeDirection::SW => EdgeDirection::NE,
        }
    }
}

/// The six vertices of a pointy-top hexagon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CornerDirection {
    N,
    NE,
    SE,
    S,
    SW,
    NW,
}

impl CornerDirection {
    pub const ALL: [CornerDirection; 6] = [
        CornerDirection::N,
        CornerDirection::NE,
        CornerDirection::SE,
        CornerDirection::S,
        CornerDirection::SW,
        CornerDirection::NW,
    ];

    /// Index of this vertex in the clockwise-from-top convention.
    pub fn vertex_index(self) -> usize {
        match self {
            CornerDirection::N => 0,
            CornerDirection::NE => 1,
            CornerDirection::SE => 2,
            CornerDirection::S => 3,
            CornerDirection::SW => 4,
            CornerDirection::NW => 5,
        }
    }

    /// The two edges meeting at this vertex, counterclockwise side first.
    pub fn touching_edges(self) -> [EdgeDirection; 2] {
        match self {
            CornerDirection::N => [EdgeDirection::NW, EdgeDirection::NE],
            CornerDirection::NE => [EdgeDirection::NE, EdgeDirection::E],
            CornerDirection::SE => [EdgeDirection::E, EdgeDirection::SE],
            CornerDirection::S => [EdgeDirection::SE, EdgeDirection::SW],
            CornerDirection::SW => [EdgeDirection::SW, EdgeDirection::W],
            CornerDirection::NW => [EdgeDirection::W, EdgeDirection::NW],
        }
    }
}

/// Maps a `(vertex, edge)` pair of one tile to the same topological vertex
/// and edge as seen from the neighbour across that edge.
///
/// Only the 12 pairs where the edge touches the vertex are legal; the
/// mapping is involutive (applying it twice through the shared edge returns
/// the original pair).
pub fn opposite_corner(
    corner: CornerDirection,
    edge: EdgeDirection,
) -> (CornerDirection, EdgeDirection) {
    use CornerDirection as C;
    use EdgeDirection as E;
    match (corner, edge) {
        (C::N, E::NW) => (C::SE, E::SE),
        (C::N, E::NE) => (C::SW, E::SW),
        (C::NE, E::NE) => (C::S, E::SW),
        (C::NE, E::E) => (C::NW, E::W),
        (C::SE, E::E) => (C::SW, E::W),
        (C::SE, E::SE) => (C::N, E::NW),
        (C::S, E::SE) => (C::NW, E::NW),
        (C::S, E::SW) => (C::NE, E::NE),
        (C::SW, E::SW) => (C::N, E::NE),
        (C::SW, E::W) => (C::SE, E::E),
        (C::NW, E::W) => (C::NE, E::E),
        (C::NW, E::NW) => (C::S, E::SE),
        // An edge that does not touch the vertex has no shared-corner image;
        // the resolver only ever asks about touching pairs.
        (c, e) => unreachable!("edge {e:?} does not touch corner {c:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_opposite_is_involution() {
        for e in EdgeDirection::ALL {
            assert_eq!(e.opposite().opposite(), e);
            assert_ne!(e.opposite(), e);
        }
    }

    #[test]
    fn test_touching_edges_contain_vertex() {
        for c in CornerDirection::ALL {
            let v = c.vertex_index();
            for e in c.touching_edges() {
                let (a, b) = e.vertex_indices();
                assert!(a == v || b == v, "{c:?} vertex {v} not on edge {e:?}");
            }
        }
    }

    #[test]
    fn test_opposite_corner_is_involution() {
        for c in CornerDirection::ALL {
            for e in c.touching_edges() {
                let (nc, ne) = opposite_corner(c, e);
                assert_eq!(ne, e.opposite());
                assert_eq!(opposite_corner(nc, ne), (c, e));
            }
        }
    }

    #[test]
    fn test_opposite_corner_known_entries() {
        assert_eq!(
            opposite_corner(CornerDirection::NE, EdgeDirection::E),
            (CornerDirection::NW, EdgeDirection::W)
        );
        assert_eq!(
            opposite_corner(CornerDirection::NW, EdgeDirection::NW),
            (CornerDirection::S, EdgeDirection::SE)
        );
        assert_eq!(
            opposite_corner(CornerDirection::N, EdgeDirection::NW),
            (CornerDirection::SE, EdgeDirection::SE)
        );
    }
}
