//! Scoped scratch memory. Per-ray estimators allocate their sample
//! patterns from a **MemoryArena** owned by the caller; everything is
//! released at once when the arena is dropped (or replaced with a
//! fresh one after each tile).

// others
use typed_arena::Arena;
// fluo
use crate::core::geometry::Point2f;
use crate::core::pbrt::Float;

// see memory.h

pub struct MemoryArena {
    floats: Arena<Float>,
    points: Arena<Point2f>,
}

impl Default for MemoryArena {
    fn default() -> Self {
        MemoryArena::new()
    }
}

impl MemoryArena {
    pub fn new() -> Self {
        MemoryArena {
            floats: Arena::new(),
            points: Arena::new(),
        }
    }
    /// Zero-initialized slice of `n` floats living as long as the arena.
    pub fn alloc_floats(&self, n: usize) -> &mut [Float] {
        self.floats.alloc_extend(std::iter::repeat(0.0 as Float).take(n))
    }
    pub fn alloc_points(&self, n: usize) -> &mut [Point2f] {
        self.points.alloc_extend(std::iter::repeat(Point2f::default()).take(n))
    }
    /// Number of values handed out so far.
    pub fn len(&self) -> usize {
        self.floats.len() + self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slices_are_independent() {
        let arena = MemoryArena::new();
        let a = arena.alloc_floats(4);
        let b = arena.alloc_floats(2);
        a[0] = 1.0;
        b[1] = 2.0;
        assert_eq!(a, &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(b, &[0.0, 2.0]);
        assert_eq!(arena.alloc_points(3).len(), 3);
        assert_eq!(arena.len(), 9);
    }
}
