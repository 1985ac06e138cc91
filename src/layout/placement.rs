use super::random::RandomSource;
use super::{Borders, Point, Viewport, WordDataPoint};

const SPIRAL_STEP: f64 = 0.1;

/// Bit-packed occupancy of the working viewport, 32 pixels per cell, most
/// significant bit leftmost.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    stride: usize,
    rows: usize,
    cells: Vec<u32>,
}

impl OccupancyGrid {
    pub fn new(viewport: Viewport) -> Self {
        // Two spare cells per row absorb the shifted tail of a sprite row.
        let stride = ((viewport.width.ceil().max(0.0) as usize) >> 5) + 2;
        let rows = viewport.height.ceil().max(0.0) as usize + 1;
        Self {
            stride,
            rows,
            cells: vec![0; stride * rows],
        }
    }

    pub fn reset(&mut self) {
        self.cells.fill(0);
    }

    pub fn is_set(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        if y >= self.rows || (x >> 5) >= self.stride {
            return false;
        }
        self.cells[y * self.stride + (x >> 5)] & (1 << (31 - (x & 31))) != 0
    }

    fn cell(&self, row: i32, column: i32) -> u32 {
        self.index(row, column).map_or(0, |index| self.cells[index])
    }

    fn index(&self, row: i32, column: i32) -> Option<usize> {
        if row < 0 || column < 0 {
            return None;
        }
        let (row, column) = (row as usize, column as usize);
        (row < self.rows && column < self.stride).then(|| row * self.stride + column)
    }

    /// Walks the word's sprite at its current position, yielding the grid
    /// cell and the shifted sprite bits that land in it.
    fn for_each_shifted(word: &WordDataPoint, mut visit: impl FnMut(i32, i32, u32) -> bool) {
        let Some(sprite) = word.sprite.as_deref() else {
            return;
        };
        let columns = word.columns();
        let left = word.x - (columns << 4);
        let shift = (left & 31) as u32;
        let first_column = left >> 5;
        let top = word.y + word.y0;

        for row in 0..word.sprite_rows() {
            let mut previous = 0u32;
            for column in 0..=columns {
                let carried = if shift == 0 { 0 } else { previous << (32 - shift) };
                let current = if column < columns {
                    previous = sprite[(row * columns + column) as usize];
                    previous >> shift
                } else {
                    0
                };
                if !visit(top + row, first_column + column, carried | current) {
                    return;
                }
            }
        }
    }

    /// True when any inked sprite bit of `word` at its current position is
    /// already set.
    pub fn intersects(&self, word: &WordDataPoint) -> bool {
        let mut hit = false;
        Self::for_each_shifted(word, |row, column, bits| {
            hit = bits & self.cell(row, column) != 0;
            !hit
        });
        hit
    }

    /// ORs the word's sprite into the grid at its current position.
    pub fn stamp(&mut self, word: &WordDataPoint) {
        Self::for_each_shifted(word, |row, column, bits| {
            if let Some(index) = self.index(row, column) {
                self.cells[index] |= bits;
            }
            true
        });
    }
}

/// Point on the Archimedean spiral at step `t`, stretched by the viewport
/// aspect ratio.
pub fn archimedean_spiral(t: f64, aspect: f64) -> (f64, f64) {
    let value = t * SPIRAL_STEP;
    (aspect * value * value.cos(), value * value.sin())
}

/// Start-point divisor for a pass over `word_count` words; small clouds
/// start further from the origin corner.
pub fn density_ratio(word_count: usize) -> f64 {
    match word_count {
        0..=10 => 5.0,
        11..=25 => 3.0,
        26..=75 => 1.5,
        76..=100 => 1.25,
        _ => 1.0,
    }
}

/// Whether the word's box at its current position overlaps the union
/// rectangle of everything placed so far.
pub fn rectangles_intersect(word: &WordDataPoint, borders: &Borders) -> bool {
    word.x + word.x1 > borders.left.x
        && word.x + word.x0 < borders.right.x
        && word.y + word.y1 > borders.left.y
        && word.y + word.y0 < borders.right.y
}

pub fn update_borders(word: &WordDataPoint, borders: Option<Borders>) -> Borders {
    let left = Point {
        x: word.x + word.x0,
        y: word.y + word.y0,
    };
    let right = Point {
        x: word.x + word.x1,
        y: word.y + word.y1,
    };
    match borders {
        Some(borders) => Borders {
            left: Point {
                x: borders.left.x.min(left.x),
                y: borders.left.y.min(left.y),
            },
            right: Point {
                x: borders.right.x.max(right.x),
                y: borders.right.y.max(right.y),
            },
        },
        None => Borders { left, right },
    }
}

/// Spiral search state for one pass over the working viewport.
pub struct Placer<'a> {
    pub viewport: Viewport,
    pub grid: OccupancyGrid,
    pub borders: Option<Borders>,
    random: &'a dyn RandomSource,
    ratio: f64,
}

impl<'a> Placer<'a> {
    pub fn new(viewport: Viewport, word_count: usize, random: &'a dyn RandomSource) -> Self {
        Self {
            viewport,
            grid: OccupancyGrid::new(viewport),
            borders: None,
            random,
            ratio: density_ratio(word_count),
        }
    }

    /// Seeds `(word.x, word.y)` for the word at rank `index`.
    pub fn start_position(&self, word: &mut WordDataPoint, index: usize) {
        let width = self.viewport.width as f64;
        let height = self.viewport.height as f64;
        word.x = ((width / self.ratio * (self.random.next(index) + 0.5)) as i32) >> 1;
        word.y = ((height / self.ratio * (self.random.next(index + 1) + 0.5)) as i32) >> 1;
    }

    /// Walks the spiral from the word's start position until a free spot is
    /// found. On success the sprite is stamped, borders grow and the sprite
    /// is released.
    pub fn find_position(&mut self, word: &mut WordDataPoint, index: usize) -> bool {
        if word.sprite.is_none() {
            return false;
        }
        let start = Point {
            x: word.x,
            y: word.y,
        };
        let diagonal = self.viewport.diagonal();
        let aspect = self.viewport.width as f64 / self.viewport.height as f64;
        let dt = if self.random.next(index) < 0.5 { 1.0 } else { -1.0 };
        let width = self.viewport.width;
        let height = self.viewport.height;

        let mut t = -dt;
        loop {
            t += dt;
            let (px, py) = archimedean_spiral(t, aspect);
            let dx = px.floor();
            let dy = py.floor();
            if dx.abs().min(dy.abs()) >= diagonal || !dx.is_finite() || !dy.is_finite() {
                return false;
            }

            word.x = start.x + dx as i32;
            word.y = start.y + dy as i32;
            if word.x + word.x0 < 0
                || word.y + word.y0 < 0
                || (word.x + word.x1) as f32 > width
                || (word.y + word.y1) as f32 > height
            {
                continue;
            }

            let free = match &self.borders {
                None => true,
                Some(borders) => {
                    !rectangles_intersect(word, borders) || !self.grid.intersects(word)
                }
            };
            if free {
                self.grid.stamp(word);
                self.borders = Some(update_borders(word, self.borders));
                word.sprite = None;
                return true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::WordGroup;
    use crate::layout::random::CycledSequence;

    fn solid_word(width: i32, rows: i32) -> WordDataPoint {
        let group = WordGroup {
            text: "w".to_string(),
            total_weight: 1.0,
            source_refs: vec![0],
            representative_index: 0,
            seen_order: 0,
        };
        let mut word = WordDataPoint::new(&group, 10.0, 0.0, 0);
        word.width = width;
        word.height = rows;
        word.x1 = width >> 1;
        word.x0 = -word.x1;
        word.y1 = rows >> 1;
        word.y0 = -word.y1;
        word.ink_x0 = word.x0;
        word.ink_x1 = word.x1;
        word.sprite = Some(vec![u32::MAX; ((width >> 5) * rows) as usize]);
        word
    }

    #[test]
    fn stamp_handles_unaligned_offsets() {
        let mut grid = OccupancyGrid::new(Viewport::new(256.0, 64.0));
        let mut word = solid_word(32, 2);
        word.x = 16 + 5;
        word.y = 10;
        grid.stamp(&word);
        for x in 0..80 {
            assert_eq!(grid.is_set(x, 9), (5..37).contains(&x), "x = {x}");
        }
        assert!(!grid.is_set(10, 11));
    }

    #[test]
    fn aligned_stamp_does_not_leak_into_next_cell() {
        let mut grid = OccupancyGrid::new(Viewport::new(256.0, 64.0));
        let mut word = solid_word(32, 2);
        word.x = 16 + 32;
        word.y = 10;
        grid.stamp(&word);
        assert!(grid.is_set(32, 9));
        assert!(grid.is_set(63, 9));
        assert!(!grid.is_set(64, 9));
        assert!(!grid.is_set(31, 9));
    }

    #[test]
    fn intersects_detects_stamped_bits() {
        let mut grid = OccupancyGrid::new(Viewport::new(256.0, 64.0));
        let mut placed = solid_word(32, 4);
        placed.x = 40;
        placed.y = 20;
        grid.stamp(&placed);

        let mut probe = solid_word(32, 4);
        probe.x = 40 + 31;
        probe.y = 20;
        assert!(grid.intersects(&probe));
        probe.x = 40 + 32;
        assert!(!grid.intersects(&probe));
        probe.x = 40;
        probe.y = 24;
        assert!(!grid.intersects(&probe));
    }

    #[test]
    fn density_ratio_steps() {
        assert_eq!(density_ratio(1), 5.0);
        assert_eq!(density_ratio(10), 5.0);
        assert_eq!(density_ratio(25), 3.0);
        assert_eq!(density_ratio(75), 1.5);
        assert_eq!(density_ratio(100), 1.25);
        assert_eq!(density_ratio(101), 1.0);
    }

    #[test]
    fn spiral_starts_at_origin_and_grows() {
        assert_eq!(archimedean_spiral(0.0, 1.5), (0.0, 0.0));
        let (x, y) = archimedean_spiral(1000.0, 1.0);
        assert!((x * x + y * y).sqrt() > 99.0);
    }

    #[test]
    fn borders_accumulate_extent() {
        let mut a = solid_word(32, 10);
        a.x = 100;
        a.y = 100;
        let mut b = solid_word(64, 4);
        b.x = 10;
        b.y = 300;
        let borders = update_borders(&b, Some(update_borders(&a, None)));
        assert_eq!(borders.left, Point { x: -22, y: 95 });
        assert_eq!(borders.right, Point { x: 116, y: 302 });
    }

    #[test]
    fn second_word_never_overlaps_first() {
        let random = CycledSequence::constant(0.25);
        let viewport = Viewport::new(400.0, 200.0);
        let mut placer = Placer::new(viewport, 2, &random);

        let mut first = solid_word(64, 20);
        placer.start_position(&mut first, 0);
        assert!(placer.find_position(&mut first, 0));
        assert!(first.sprite.is_none());

        let mut second = solid_word(64, 20);
        placer.start_position(&mut second, 1);
        assert!(placer.find_position(&mut second, 1));
        assert!(!first.rect().intersects(&second.rect()));
    }

    #[test]
    fn spiral_gives_up_when_nothing_fits() {
        let random = CycledSequence::constant(0.5);
        let mut placer = Placer::new(Viewport::new(64.0, 32.0), 1, &random);
        let mut word = solid_word(96, 8);
        placer.start_position(&mut word, 0);
        assert!(!placer.find_position(&mut word, 0));
        assert!(word.sprite.is_some());
    }
}
