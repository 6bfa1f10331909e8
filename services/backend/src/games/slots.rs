//! 3x3 slot machine: five pay lines over a six-symbol alphabet.

use rand::Rng;

/// Symbols on the reel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSymbol {
    Cherry,
    Orange,
    Lemon,
    Grape,
    Diamond,
    Seven,
}

pub const SYMBOLS: [SlotSymbol; 6] = [
    SlotSymbol::Cherry,
    SlotSymbol::Orange,
    SlotSymbol::Lemon,
    SlotSymbol::Grape,
    SlotSymbol::Diamond,
    SlotSymbol::Seven,
];

impl SlotSymbol {
    /// Multiplier paid when three of this symbol line up.
    pub fn line_multiplier(self) -> u32 {
        match self {
            SlotSymbol::Cherry => 2,
            SlotSymbol::Orange => 3,
            SlotSymbol::Lemon => 4,
            SlotSymbol::Grape => 5,
            SlotSymbol::Diamond => 10,
            SlotSymbol::Seven => 20,
        }
    }
}

/// A 3x3 reel window, rows first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid(pub [[SlotSymbol; 3]; 3]);

/// Draw a grid with each cell independently uniform over the alphabet.
pub fn spin<R: Rng + ?Sized>(rng: &mut R) -> SlotGrid {
    let mut grid = [[SlotSymbol::Cherry; 3]; 3];
    for row in &mut grid {
        for cell in row.iter_mut() {
            *cell = SYMBOLS[rng.gen_range(0..SYMBOLS.len())];
        }
    }
    SlotGrid(grid)
}

/// Sum of multipliers over the five pay lines (three rows plus the two
/// diagonals); a line pays when its three symbols match. Winning lines
/// are additive.
pub fn line_total(grid: &SlotGrid) -> u32 {
    let g = &grid.0;
    let mut total = 0;
    for row in g {
        if row[0] == row[1] && row[1] == row[2] {
            total += row[0].line_multiplier();
        }
    }
    if g[0][0] == g[1][1] && g[1][1] == g[2][2] {
        total += g[0][0].line_multiplier();
    }
    if g[0][2] == g[1][1] && g[1][1] == g[2][0] {
        total += g[0][2].line_multiplier();
    }
    total
}

/// Whether a line total can come out of a real grid.
///
/// The three rows are cell-disjoint, so up to three winning lines may carry
/// any mix of symbols. Both diagonals cross every row and share the center
/// cell, so a fourth or fifth winning line forces the whole grid to a
/// single symbol: totals beyond three lines are only 4*v or 5*v.
pub fn total_is_achievable(total: u32) -> bool {
    if total == 0 {
        return true;
    }
    let values = SYMBOLS.map(SlotSymbol::line_multiplier);
    for a in values {
        if total == a || total == 4 * a || total == 5 * a {
            return true;
        }
        for b in values {
            if total == a + b {
                return true;
            }
            for c in values {
                if total == a + b + c {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use SlotSymbol::*;

    fn grid(rows: [[SlotSymbol; 3]; 3]) -> SlotGrid {
        SlotGrid(rows)
    }

    #[test]
    fn test_no_win_pays_zero() {
        let g = grid([
            [Cherry, Orange, Lemon],
            [Grape, Diamond, Seven],
            [Orange, Cherry, Grape],
        ]);
        assert_eq!(line_total(&g), 0);
    }

    #[test]
    fn test_single_row_pays_its_multiplier() {
        let g = grid([
            [Cherry, Cherry, Cherry],
            [Grape, Diamond, Seven],
            [Orange, Cherry, Grape],
        ]);
        assert_eq!(line_total(&g), 2);
    }

    #[test]
    fn test_diagonal_pays() {
        let g = grid([
            [Diamond, Orange, Lemon],
            [Grape, Diamond, Seven],
            [Orange, Cherry, Diamond],
        ]);
        assert_eq!(line_total(&g), 10);
    }

    #[test]
    fn test_anti_diagonal_pays() {
        let g = grid([
            [Cherry, Orange, Seven],
            [Grape, Seven, Lemon],
            [Seven, Cherry, Grape],
        ]);
        assert_eq!(line_total(&g), 20);
    }

    #[test]
    fn test_winning_lines_are_additive() {
        let g = grid([
            [Cherry, Cherry, Cherry],
            [Grape, Grape, Grape],
            [Orange, Cherry, Lemon],
        ]);
        assert_eq!(line_total(&g), 7);
    }

    #[test]
    fn test_uniform_grid_pays_five_lines() {
        let g = grid([
            [Seven, Seven, Seven],
            [Seven, Seven, Seven],
            [Seven, Seven, Seven],
        ]);
        assert_eq!(line_total(&g), 100);
    }

    #[test]
    fn test_achievable_totals() {
        for total in [0, 2, 7, 12, 45, 60, 80, 100] {
            assert!(total_is_achievable(total), "{} should be achievable", total);
        }
    }

    #[test]
    fn test_unachievable_totals() {
        for total in [1, 99, 101, 73] {
            assert!(
                !total_is_achievable(total),
                "{} should not be achievable",
                total
            );
        }
    }

    #[test]
    fn test_every_spun_grid_total_is_achievable() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let g = spin(&mut rng);
            assert!(total_is_achievable(line_total(&g)));
        }
    }
}
