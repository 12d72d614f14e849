//! Stop position selection
//!
//! The backend decides which symbol each reel shows; a symbol can sit at
//! several positions on a reel, so one of them is picked at random.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::ReelError;
use crate::symbols::Symbol;

/// Supplies committed stop segments before a spin starts
pub trait OutcomeProvider {
    /// 1-indexed stop segment per reel
    fn next_stops(&mut self) -> Result<Vec<u32>, ReelError>;
}

/// Pick a 1-indexed position on `layout` for each reel's outcome symbol
pub fn stop_indexes<S, R>(layout: &[S], stops: &[S], rng: &mut R) -> Result<Vec<u32>, ReelError>
where
    S: PartialEq + std::fmt::Display,
    R: Rng,
{
    stops
        .iter()
        .enumerate()
        .map(|(reel, symbol)| {
            let positions: Vec<usize> = layout
                .iter()
                .enumerate()
                .filter(|(_, s)| *s == symbol)
                .map(|(i, _)| i)
                .collect();

            if positions.is_empty() {
                return Err(ReelError::SymbolNotOnReel {
                    reel,
                    symbol: symbol.to_string(),
                });
            }

            let pick = positions[rng.random_range(0..positions.len())];
            Ok(pick as u32 + 1)
        })
        .collect()
}

/// Deterministic random outcomes over a fixed layout
#[derive(Debug, Clone)]
pub struct SeededOutcome {
    layout: Vec<Symbol>,
    reel_count: usize,
    rng: Pcg32,
}

impl SeededOutcome {
    pub fn new(layout: Vec<Symbol>, reel_count: usize, seed: u64) -> Self {
        Self {
            layout,
            reel_count,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn layout(&self) -> &[Symbol] {
        &self.layout
    }

    /// Roll one symbol per reel
    pub fn roll_symbols(&mut self) -> Vec<Symbol> {
        (0..self.reel_count)
            .map(|_| self.layout[self.rng.random_range(0..self.layout.len())])
            .collect()
    }
}

impl OutcomeProvider for SeededOutcome {
    fn next_stops(&mut self) -> Result<Vec<u32>, ReelError> {
        if self.layout.is_empty() {
            return Err(ReelError::InvalidConfig("empty reel layout".into()));
        }
        let symbols = self.roll_symbols();
        log::debug!("Rolled {:?}", symbols);
        stop_indexes(&self.layout, &symbols, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::DEFAULT_LAYOUT;

    #[test]
    fn test_single_position_is_exact() {
        let mut rng = Pcg32::seed_from_u64(7);
        let stops = stop_indexes(
            &DEFAULT_LAYOUT,
            &[Symbol::Cherry, Symbol::Seven, Symbol::GrandJackpot],
            &mut rng,
        )
        .unwrap();
        assert_eq!(stops, vec![1, 3, 8]);
    }

    #[test]
    fn test_repeated_symbol_picks_a_match() {
        let layout = [Symbol::Bar, Symbol::Cherry, Symbol::Bar, Symbol::Bar];
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..50 {
            let stops = stop_indexes(&layout, &[Symbol::Bar], &mut rng).unwrap();
            assert!([1, 3, 4].contains(&stops[0]));
        }
    }

    #[test]
    fn test_missing_symbol() {
        let layout = [Symbol::Bar, Symbol::Cherry];
        let mut rng = Pcg32::seed_from_u64(1);
        let err = stop_indexes(&layout, &[Symbol::Bar, Symbol::Seven], &mut rng).unwrap_err();
        assert!(matches!(err, ReelError::SymbolNotOnReel { reel: 1, .. }));
    }

    #[test]
    fn test_seeded_outcome_is_deterministic() {
        let mut a = SeededOutcome::new(DEFAULT_LAYOUT.to_vec(), 3, 99);
        let mut b = SeededOutcome::new(DEFAULT_LAYOUT.to_vec(), 3, 99);
        for _ in 0..10 {
            let stops = a.next_stops().unwrap();
            assert_eq!(stops, b.next_stops().unwrap());
            assert_eq!(stops.len(), 3);
            assert!(stops.iter().all(|&s| (1..=8).contains(&s)));
        }
    }
}
