//! Typed arena indices for the volumetric half-edge kernel.

use std::fmt;

/// Index of a [`Vertex`](super::Vertex) in its mesh arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VertexId(u32);

/// Index of a [`HalfEdge`](super::HalfEdge) in its mesh arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HalfEdgeId(u32);

/// Index of a [`Face`](super::Face) in its mesh arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FaceId(u32);

/// Index of a [`Cell`](super::Cell) in its mesh arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CellId(u32);

macro_rules! impl_arena_id {
    ($name:ident, $display:literal) => {
        impl $name {
            /// # Panics
            /// Debug builds panic when `index` does not fit in `u32`.
            #[inline]
            #[must_use]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < u32::MAX as usize, "arena index {index} too large");
                Self(index as u32)
            }

            #[inline]
            #[must_use]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }
    };
}

impl_arena_id!(VertexId, "V");
impl_arena_id!(HalfEdgeId, "HE");
impl_arena_id!(FaceId, "F");
impl_arena_id!(CellId, "C");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_print_compactly() {
        assert_eq!(format!("{:?}", VertexId::new(42)), "V(42)");
        assert_eq!(HalfEdgeId::new(7).to_string(), "HE(7)");
        assert_eq!(FaceId::new(3).index(), 3);
        assert!(CellId::new(1) < CellId::new(2));
    }
}
