//! Deck as a multiset of card-value counts.
//!
//! A deck carries two count vectors: the mutable *working* counts that
//! `remove`/`restore` touch, and the immutable *reference* counts of the
//! fresh shoe. Missing cards and combinatorial weights are always computed
//! against the reference, so the baseline survives arbitrary removals.
//!
//! `remove` and `restore` must stay balanced within one call stack; the
//! solvers avoid the pairing problem entirely by cloning the deck per
//! recursive branch (the working state is two small arrays, so a clone is
//! a flat copy).

use crate::constants::*;
use crate::types::{Card, CardCounts, Result, SolverError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    counts: [u16; NUM_CARD_VALUES],
    reference: [u16; NUM_CARD_VALUES],
    num_decks: u32,
    total: u32,
}

#[inline(always)]
fn idx(card: Card) -> usize {
    debug_assert!((1..=NUM_CARD_VALUES as u8).contains(&card), "card {card} out of range");
    (card - 1) as usize
}

impl Deck {
    /// Fresh shoe of `num_decks` decks: 4·N of each value 1..=9, 16·N tens.
    pub fn new(num_decks: u32) -> Self {
        let mut counts = [LOW_CARD_COPIES * num_decks as u16; NUM_CARD_VALUES];
        counts[NUM_CARD_VALUES - 1] = TEN_CARD_COPIES * num_decks as u16;
        Deck {
            counts,
            reference: counts,
            num_decks,
            total: CARDS_PER_DECK * num_decks,
        }
    }

    pub fn num_decks(&self) -> u32 {
        self.num_decks
    }

    /// Remaining copies of `card` in the working deck.
    pub fn count(&self, card: Card) -> u16 {
        self.counts[idx(card)]
    }

    /// Copies of `card` in the untouched reference shoe.
    pub fn reference_count(&self, card: Card) -> u16 {
        self.reference[idx(card)]
    }

    pub fn reference_counts(&self) -> &[u16; NUM_CARD_VALUES] {
        &self.reference
    }

    /// Snapshot of the working counts.
    pub fn remaining_counts(&self) -> [u16; NUM_CARD_VALUES] {
        self.counts
    }

    /// Total cards remaining in the working deck.
    pub fn total_cards(&self) -> u32 {
        self.total
    }

    /// Remove one copy of `card`. Failing because the count is already 0
    /// means the caller's recursive bookkeeping is broken.
    pub fn remove(&mut self, card: Card) -> Result<()> {
        let i = idx(card);
        if self.counts[i] == 0 {
            return Err(SolverError::CardUnavailable(card));
        }
        self.counts[i] -= 1;
        self.total -= 1;
        Ok(())
    }

    /// Exact inverse of [`remove`](Self::remove). Callers are responsible
    /// for never restoring more than they removed.
    pub fn restore(&mut self, card: Card) {
        let i = idx(card);
        debug_assert!(
            self.counts[i] < self.reference[i],
            "restore({card}) would exceed the reference count"
        );
        self.counts[i] += 1;
        self.total += 1;
    }

    /// Remove one copy of each listed card (missing-card seeding).
    pub fn remove_all(&mut self, cards: &[Card]) -> Result<()> {
        for &card in cards {
            self.remove(card)?;
        }
        Ok(())
    }

    /// Card values with at least one copy remaining, ascending.
    pub fn available_cards(&self) -> impl Iterator<Item = Card> + '_ {
        (1..=NUM_CARD_VALUES as u8).filter(move |&c| self.counts[idx(c)] > 0)
    }

    /// Cards missing from the working deck relative to the reference shoe,
    /// one entry per removed copy, ascending by value.
    pub fn missing_cards(&self) -> Vec<Card> {
        let mut missing = Vec::new();
        for v in 1..=NUM_CARD_VALUES as u8 {
            let gone = self.reference[idx(v)] - self.counts[idx(v)];
            for _ in 0..gone {
                missing.push(v);
            }
        }
        missing
    }

    /// Draw probability per card value: count / total remaining. All zeros
    /// when the deck is exhausted: a valid terminal state, not an error.
    pub fn next_card_probabilities(&self) -> [f64; NUM_CARD_VALUES] {
        let mut probs = [0.0; NUM_CARD_VALUES];
        if self.total == 0 {
            return probs;
        }
        let total = self.total as f64;
        for i in 0..NUM_CARD_VALUES {
            probs[i] = self.counts[i] as f64 / total;
        }
        probs
    }

    /// Working deck after additionally removing a whole hand, or an error
    /// if the hand is not covered by the remaining counts.
    pub fn without_hand(&self, hand_counts: &CardCounts) -> Result<Deck> {
        let mut deck = self.clone();
        for v in 1..=NUM_CARD_VALUES as u8 {
            for _ in 0..hand_counts[idx(v)] {
                deck.remove(v)?;
            }
        }
        Ok(deck)
    }
}
