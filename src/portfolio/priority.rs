//! Blockchain display priority.
//!
//! Static, total lookup from a chain identifier to an integer weight.
//! Higher weights sort first; unknown chains get [`DEFAULT_PRIORITY`],
//! which also marks a balance as not displayable.

use std::fmt;
use std::str::FromStr;

/// Priority for any chain not in the table.
pub const DEFAULT_PRIORITY: i32 = -99;

/// Exclusive lower bound: a balance is valid only if its priority is above this.
pub const MIN_VALID_PRIORITY: i32 = -99;

/// Chains with a known display priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blockchain {
    Osmosis,
    Ethereum,
    Arbitrum,
    Zilliqa,
    Neo,
}

impl Blockchain {
    pub const ALL: [Blockchain; 5] = [
        Blockchain::Osmosis,
        Blockchain::Ethereum,
        Blockchain::Arbitrum,
        Blockchain::Zilliqa,
        Blockchain::Neo,
    ];

    pub fn priority(self) -> i32 {
        match self {
            Blockchain::Osmosis => 100,
            Blockchain::Ethereum => 50,
            Blockchain::Arbitrum => 30,
            Blockchain::Zilliqa | Blockchain::Neo => 20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Blockchain::Osmosis => "Osmosis",
            Blockchain::Ethereum => "Ethereum",
            Blockchain::Arbitrum => "Arbitrum",
            Blockchain::Zilliqa => "Zilliqa",
            Blockchain::Neo => "Neo",
        }
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Blockchain {
    type Err = ();

    /// Exact, case-sensitive match on the chain name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Osmosis" => Ok(Blockchain::Osmosis),
            "Ethereum" => Ok(Blockchain::Ethereum),
            "Arbitrum" => Ok(Blockchain::Arbitrum),
            "Zilliqa" => Ok(Blockchain::Zilliqa),
            "Neo" => Ok(Blockchain::Neo),
            _ => Err(()),
        }
    }
}

/// Priority of a chain identifier. Never fails.
pub fn priority_of(blockchain: &str) -> i32 {
    blockchain
        .parse::<Blockchain>()
        .map(Blockchain::priority)
        .unwrap_or(DEFAULT_PRIORITY)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
