//! Reel symbols
//!
//! The symbol set the outcome backend reports. Which art a symbol gets is
//! up to a [`crate::renderer::SymbolResolver`].

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Cherry,
    Bar,
    DoubleBar,
    TripleBar,
    Seven,
    /// Has different art on every reel
    MinorJackpot,
    MajorJackpot,
    GrandJackpot,
}

impl Symbol {
    pub const ALL: [Symbol; 8] = [
        Symbol::Cherry,
        Symbol::Bar,
        Symbol::DoubleBar,
        Symbol::TripleBar,
        Symbol::Seven,
        Symbol::MinorJackpot,
        Symbol::MajorJackpot,
        Symbol::GrandJackpot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Cherry => "Cherry",
            Symbol::Bar => "Bar",
            Symbol::DoubleBar => "DoubleBar",
            Symbol::TripleBar => "TripleBar",
            Symbol::Seven => "Seven",
            Symbol::MinorJackpot => "MinorJackpot",
            Symbol::MajorJackpot => "MajorJackpot",
            Symbol::GrandJackpot => "GrandJackpot",
        }
    }

    /// Whether the art for this symbol depends on which reel it is on
    pub fn varies_per_reel(&self) -> bool {
        matches!(self, Symbol::MinorJackpot)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default reel layout, top of the strip first
pub const DEFAULT_LAYOUT: [Symbol; 8] = [
    Symbol::Cherry,
    Symbol::Bar,
    Symbol::Seven,
    Symbol::DoubleBar,
    Symbol::MinorJackpot,
    Symbol::TripleBar,
    Symbol::MajorJackpot,
    Symbol::GrandJackpot,
];
