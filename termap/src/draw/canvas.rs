//! Dot canvas rendered to braille or ASCII text.
//!
//! Each terminal cell covers a 2x4 block of dots. In braille mode the block
//! becomes one glyph from the U+2800 range; in ASCII mode it is approximated
//! by a line-drawing character.

/// Braille dot bit for `[row][col]` inside a cell.
const BRAILLE_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

const BRAILLE_BASE: u32 = 0x2800;

#[derive(Debug, Clone)]
pub struct Canvas {
    cols: usize,
    rows: usize,
    /// Dot bits per cell, in braille bit layout.
    cells: Vec<u8>,
    /// Text overlay; wins over dots.
    text: Vec<Option<char>>,
}

impl Canvas {
    /// Create a canvas of `width` x `height` dots, rounded up to whole cells.
    pub fn new(width: u32, height: u32) -> Self {
        let cols = (width as usize).div_ceil(2);
        let rows = (height as usize).div_ceil(4);
        Self {
            cols,
            rows,
            cells: vec![0; cols * rows],
            text: vec![None; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Set one dot; out-of-range dots are dropped.
    pub fn set(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let (col, row) = (x / 2, y / 4);
        if col >= self.cols || row >= self.rows {
            return;
        }
        self.cells[row * self.cols + col] |= BRAILLE_BITS[y % 4][x % 2];
    }

    /// Draw a line between two dots (Bresenham), clipped to the canvas.
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64) {
        let x_lo = x0.min(x1).max(-1);
        let x_hi = x0.max(x1).min(self.cols as i64 * 2);
        let y_lo = y0.min(y1).max(-1);
        let y_hi = y0.max(y1).min(self.rows as i64 * 4);

        // Axis-aligned lines are clipped up front so huge tiles stay cheap.
        if x0 == x1 {
            for y in y_lo..=y_hi {
                self.set(x0, y);
            }
            return;
        }
        if y0 == y1 {
            for x in x_lo..=x_hi {
                self.set(x, y0);
            }
            return;
        }

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Write text starting at a cell, clipped at the right edge.
    pub fn text(&mut self, col: i64, row: i64, text: &str) {
        if row < 0 || row as usize >= self.rows {
            return;
        }
        let row = row as usize;
        for (i, ch) in text.chars().enumerate() {
            let c = col + i as i64;
            if c < 0 {
                continue;
            }
            if c as usize >= self.cols {
                break;
            }
            self.text[row * self.cols + c as usize] = Some(ch);
        }
    }

    /// Render to one string per cell row.
    pub fn to_lines(&self, braille: bool) -> Vec<String> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| {
                        let idx = row * self.cols + col;
                        match self.text[idx] {
                            Some(ch) => ch,
                            None if braille => braille_char(self.cells[idx]),
                            None => ascii_char(self.cells[idx]),
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

fn braille_char(bits: u8) -> char {
    if bits == 0 {
        return ' ';
    }
    char::from_u32(BRAILLE_BASE + bits as u32).unwrap_or(' ')
}

/// Approximates a cell's dots with a line-drawing character.
fn ascii_char(bits: u8) -> char {
    if bits == 0 {
        return ' ';
    }
    let mut dot_cols = 0;
    let mut dot_rows = 0;
    for (row, row_bits) in BRAILLE_BITS.iter().enumerate() {
        for (col, bit) in row_bits.iter().enumerate() {
            if bits & bit != 0 {
                dot_cols |= 1 << col;
                dot_rows |= 1 << row;
            }
        }
    }
    let tall = (dot_rows as u8).count_ones() >= 3;
    let wide = dot_cols == 0b11;
    match (tall, wide) {
        (true, true) => '+',
        (true, false) => '|',
        (false, true) => '-',
        (false, false) => '.',
    }
}
