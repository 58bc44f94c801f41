use rand::rngs::StdRng;
use rand::seq::index;

use super::symbol::Symbol;

/// Board variant. Fixes the side length, the win-line set, and the strategic
/// zone partitions used by feature extraction and the action catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Classic 3x3 board, no wildcard cells by default.
    Classic3,
    /// 4x4 board played with wildcard cells that count for both symbols.
    Dual4,
}

impl Variant {
    /// Side length of the square grid.
    pub fn side(self) -> usize {
        match self {
            Variant::Classic3 => 3,
            Variant::Dual4 => 4,
        }
    }

    /// Total number of cells.
    pub fn cell_count(self) -> usize {
        self.side() * self.side()
    }

    /// Wildcard count used when the caller does not override it.
    pub fn default_wildcards(self) -> usize {
        match self {
            Variant::Classic3 => 0,
            Variant::Dual4 => 2,
        }
    }

    /// Center-zone positions (the single center on 3x3, the inner 2x2 on 4x4).
    pub fn center_zone(self) -> &'static [usize] {
        match self {
            Variant::Classic3 => &[4],
            Variant::Dual4 => &[5, 6, 9, 10],
        }
    }

    /// Corner positions.
    pub fn corners(self) -> &'static [usize] {
        match self {
            Variant::Classic3 => &[0, 2, 6, 8],
            Variant::Dual4 => &[0, 3, 12, 15],
        }
    }

    /// Edge-middle positions (non-corner border cells).
    pub fn edge_mids(self) -> &'static [usize] {
        match self {
            Variant::Classic3 => &[1, 3, 5, 7],
            Variant::Dual4 => &[1, 2, 4, 7, 8, 11, 13, 14],
        }
    }

    /// Winning lines in a fixed order: rows top to bottom, columns left to
    /// right, then the two diagonals.
    pub fn win_lines(self) -> Vec<Vec<usize>> {
        let n = self.side();
        let mut lines = Vec::with_capacity(2 * n + 2);
        for row in 0..n {
            lines.push((0..n).map(|col| row * n + col).collect());
        }
        for col in 0..n {
            lines.push((0..n).map(|row| col + row * n).collect());
        }
        lines.push((0..n).map(|i| i * (n + 1)).collect());
        lines.push((1..=n).map(|i| i * (n - 1)).collect());
        lines
    }

    /// Variant name for display
    pub fn name(self) -> &'static str {
        match self {
            Variant::Classic3 => "3x3",
            Variant::Dual4 => "4x4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Owned(Symbol),
    Wildcard,
}

impl Cell {
    /// Whether this cell counts toward `symbol`'s win lines. Wildcards count
    /// for both symbols.
    pub fn counts_for(self, symbol: Symbol) -> bool {
        matches!(self, Cell::Wildcard) || self == Cell::Owned(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    OutOfRange,
    Occupied,
    WildcardCell,
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            MoveError::OutOfRange => "position out of range",
            MoveError::Occupied => "cell already occupied",
            MoveError::WildcardCell => "cell is a wildcard",
        };
        f.write_str(msg)
    }
}

/// Square grid of cells with wildcard support. Created per game; wildcard
/// positions are assigned once at game start and never written to again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    variant: Variant,
    cells: Vec<Cell>,
    win_lines: Vec<Vec<usize>>,
    wildcards: Vec<usize>,
}

impl Board {
    /// Create a new empty board for the given variant.
    pub fn new(variant: Variant) -> Self {
        Board {
            variant,
            cells: vec![Cell::Empty; variant.cell_count()],
            win_lines: variant.win_lines(),
            wildcards: Vec::new(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Get the cell at a position.
    pub fn cell(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn win_lines(&self) -> &[Vec<usize>] {
        &self.win_lines
    }

    /// Positions holding wildcard cells, in ascending order.
    pub fn wildcard_positions(&self) -> &[usize] {
        &self.wildcards
    }

    /// Choose `count` distinct positions uniformly at random and mark them as
    /// wildcards. Called once per game, before any move.
    pub fn assign_wildcards(&mut self, count: usize, rng: &mut StdRng) {
        assert!(
            self.wildcards.is_empty(),
            "wildcards are assigned once per game"
        );
        assert!(
            count < self.cells.len(),
            "wildcard count must leave playable cells"
        );
        if count == 0 {
            return;
        }
        let mut positions: Vec<usize> =
            index::sample(rng, self.cells.len(), count).into_iter().collect();
        positions.sort_unstable();
        for &pos in &positions {
            self.cells[pos] = Cell::Wildcard;
        }
        self.wildcards = positions;
    }

    /// Check if a move is valid: in range and targeting an empty cell.
    /// Wildcard cells are never valid targets.
    pub fn is_valid_move(&self, pos: usize) -> bool {
        pos < self.cells.len() && self.cells[pos] == Cell::Empty
    }

    /// Place `symbol` at `pos`, rejecting out-of-range, occupied, and
    /// wildcard targets.
    pub fn apply_move(&mut self, pos: usize, symbol: Symbol) -> Result<(), MoveError> {
        match self.cells.get(pos) {
            None => Err(MoveError::OutOfRange),
            Some(Cell::Empty) => {
                self.cells[pos] = Cell::Owned(symbol);
                Ok(())
            }
            Some(Cell::Wildcard) => Err(MoveError::WildcardCell),
            Some(Cell::Owned(_)) => Err(MoveError::Occupied),
        }
    }

    /// All empty cell indices, ascending.
    pub fn available_positions(&self) -> Vec<usize> {
        (0..self.cells.len())
            .filter(|&pos| self.cells[pos] == Cell::Empty)
            .collect()
    }

    /// Check if there's a winner. A line wins for a symbol when every cell
    /// counts for that symbol and at least one cell is actually owned by it;
    /// an all-wildcard line wins for nobody. Lines are scanned in generation
    /// order and the first satisfied one decides.
    pub fn check_winner(&self) -> Option<Symbol> {
        for line in &self.win_lines {
            if line.iter().any(|&pos| self.cells[pos] == Cell::Empty) {
                continue;
            }
            for symbol in [Symbol::X, Symbol::O] {
                if line.iter().all(|&pos| self.cells[pos].counts_for(symbol))
                    && line.iter().any(|&pos| self.cells[pos] == Cell::Owned(symbol))
                {
                    return Some(symbol);
                }
            }
        }
        None
    }

    /// First position (line scan order) that would complete a win line for
    /// `symbol`: the line has exactly one empty cell and every other cell
    /// counts for `symbol`.
    pub fn completing_move(&self, symbol: Symbol) -> Option<usize> {
        'lines: for line in &self.win_lines {
            let mut gap = None;
            for &pos in line {
                match self.cells[pos] {
                    Cell::Empty if gap.is_none() => gap = Some(pos),
                    Cell::Empty => continue 'lines,
                    cell if cell.counts_for(symbol) => {}
                    _ => continue 'lines,
                }
            }
            if gap.is_some() {
                return gap;
            }
        }
        None
    }

    /// Check if the board has no empty cells left.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != Cell::Empty)
    }

    /// Check if the game is over (winner or full board).
    pub fn is_terminal(&self) -> bool {
        self.check_winner().is_some() || self.is_full()
    }
}
