//! # Blackjack — Exact Combinatorial Blackjack Solver
//!
//! Computes exact win/loss/draw probabilities and expected values for every
//! reachable player hand against every dealer up-card, by **backward
//! induction** over canonical card-count states. No simulation anywhere:
//! every probability is a ratio of exact card counts.
//!
//! ## Pipeline overview
//!
//! | Phase | Rust module | Description |
//! |-------|-------------|-------------|
//! | 1 | [`dealer`] | Exact dealer outcome distribution per up-card (8 terminal buckets: ≤16, 17..21, Blackjack, Bust) |
//! | 2 | [`player`] | Backward induction over all player hands: stand/hit/double EVs, children solved before parents |
//! | 3 | [`strategy`] | Frequency-weighted aggregation into the (total, softness) × up-card strategy table |
//! | 4 | [`storage`] | Binary persistence (header + packed records) and JSON export |
//!
//! ## State representation
//!
//! A hand is a canonical count vector `[u8; 10]`: `counts[v - 1]` copies of
//! card value `v` (1 = Ace, 10 = ten/Jack/Queen/King, 16 per deck). The
//! vector is order-independent, so it doubles as the memoization key; the
//! order information lost by sorting is restored by the multinomial
//! frequency in [`combinatorics`].
//!
//! ## Rules solved
//!
//! Dealer stands on all 17s (soft 17 included), blackjack pays 3:2, double
//! is one card then stand at twice the stake. An exact stand/hit EV tie
//! stands. Splitting is recognized (`can_split`) but not solved.

pub mod combinatorics;
pub mod constants;
pub mod dealer;
pub mod deck;
pub mod env_config;
pub mod hand;
pub mod player;
pub mod solve;
pub mod storage;
pub mod strategy;
pub mod types;
