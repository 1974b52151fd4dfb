use serde::Serialize;

/// Per-cell agreement marker in a comparison matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellClass {
    Reference,
    Match,
    Mismatch,
    Neutral,
}

impl CellClass {
    /// Colour code consumed by table renderers.
    pub fn color(self) -> &'static str {
        match self {
            CellClass::Reference => "cyan",
            CellClass::Match => "g",
            CellClass::Mismatch => "r",
            CellClass::Neutral => "w",
        }
    }
}

/// Row-major grid of cell markers, same shape as the table it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassMatrix {
    pub n_rows: usize,
    pub n_cols: usize,
    pub cells: Vec<CellClass>,
}

impl ClassMatrix {
    pub fn filled(n_rows: usize, n_cols: usize, class: CellClass) -> Self {
        Self {
            n_rows,
            n_cols,
            cells: vec![class; n_rows * n_cols],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn get(&self, row: usize, col: usize) -> CellClass {
        self.cells[row * self.n_cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, class: CellClass) {
        self.cells[row * self.n_cols + col] = class;
    }

    pub fn row(&self, row: usize) -> &[CellClass] {
        &self.cells[row * self.n_cols..(row + 1) * self.n_cols]
    }

    pub fn count(&self, class: CellClass) -> usize {
        self.cells.iter().filter(|&&c| c == class).count()
    }

    /// Keeps only the listed columns, in the given order.
    pub fn select_columns(&self, cols: &[usize]) -> Self {
        let mut cells = Vec::with_capacity(self.n_rows * cols.len());
        for r in 0..self.n_rows {
            for &c in cols {
                cells.push(self.get(r, c));
            }
        }
        Self {
            n_rows: self.n_rows,
            n_cols: cols.len(),
            cells,
        }
    }

    /// Appends `extra` columns of one marker to every row.
    pub fn extend_columns(&self, extra: usize, class: CellClass) -> Self {
        let n_cols = self.n_cols + extra;
        let mut cells = Vec::with_capacity(self.n_rows * n_cols);
        for r in 0..self.n_rows {
            cells.extend_from_slice(self.row(r));
            cells.extend(std::iter::repeat_n(class, extra));
        }
        Self {
            n_rows: self.n_rows,
            n_cols,
            cells,
        }
    }

    /// Stacks matrices vertically. All inputs must share a column count.
    pub fn stack(parts: &[ClassMatrix]) -> Option<Self> {
        let n_cols = parts.first()?.n_cols;
        if parts.iter().any(|p| p.n_cols != n_cols) {
            return None;
        }
        let n_rows = parts.iter().map(|p| p.n_rows).sum();
        let mut cells = Vec::with_capacity(n_rows * n_cols);
        for p in parts {
            cells.extend_from_slice(&p.cells);
        }
        Some(Self {
            n_rows,
            n_cols,
            cells,
        })
    }
}
