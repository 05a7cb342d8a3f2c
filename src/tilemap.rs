use rayon::prelude::*;

/// A dense row-major 2D grid. Borders are hard edges: nothing wraps.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap an existing row-major buffer. Returns `None` if the length does not
    /// match `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self { width, height, data })
    }

    /// Row-major index of `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Inverse of [`Tilemap::index`].
    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// 4-connected neighbors (left, right, up, down) that lie inside the grid.
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        self.offset_neighbors(x, y, &CARDINAL_OFFSETS)
    }

    /// 8-connected neighbors inside the grid, in `DIR_OFFSETS` order.
    pub fn neighbors_8(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        self.offset_neighbors(x, y, &DIR_OFFSETS)
    }

    fn offset_neighbors(
        &self,
        x: usize,
        y: usize,
        offsets: &'static [(i32, i32)],
    ) -> impl Iterator<Item = (usize, usize)> {
        let width = self.width as i32;
        let height = self.height as i32;
        offsets.iter().filter_map(move |&(dx, dy)| {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= width || ny >= height {
                None
            } else {
                Some((nx as usize, ny as usize))
            }
        })
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            (idx % width, idx / width, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            (idx % width, idx / width, val)
        })
    }
}

impl<T: Clone + Default + Send> Tilemap<T> {
    /// Build a map by evaluating `f(x, y)` for every cell, rows in parallel.
    ///
    /// `f` must be a pure function of its coordinates (and of data it only
    /// reads), so the result does not depend on scheduling.
    pub fn from_fn_par<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> T + Sync,
    {
        let mut map = Self::new(width, height);
        map.fill_par(f);
        map
    }

    /// Overwrite every cell with `f(x, y)`, rows in parallel.
    pub fn fill_par<F>(&mut self, f: F)
    where
        F: Fn(usize, usize) -> T + Sync,
    {
        if self.width == 0 {
            return;
        }
        self.data
            .par_chunks_mut(self.width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell = f(x, y);
                }
            });
    }
}

impl Tilemap<f32> {
    /// Minimum and maximum value, or `None` for an empty map.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Clamp every value into `[lo, hi]`.
    pub fn clamp_all(&mut self, lo: f32, hi: f32) {
        self.data.par_iter_mut().for_each(|v| *v = v.clamp(lo, hi));
    }
}

/// Direction offsets for 8-neighbor analysis (dx, dy).
/// Order: N, NE, E, SE, S, SW, W, NW
pub const DIR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),  // N
    (1, -1),  // NE
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
];

/// Left, right, up, down.
pub const CARDINAL_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
