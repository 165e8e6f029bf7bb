//! Hand valuation: hard/soft totals over canonical card-count vectors.
//!
//! A hand is an ordered draw sequence, but only the order-independent count
//! vector (and the two-card start property) matters for solving. The free
//! functions here operate directly on [`CardCounts`] so the solvers never
//! materialize card lists on the hot path.

use crate::constants::*;
use crate::types::{Card, CardCounts};

/// Hand total with the Ace-reduction rule: one Ace counts as 11 whenever
/// that keeps the total at or below 21.
pub fn total_of(counts: &CardCounts) -> u32 {
    let min = minimum_total_of(counts);
    if counts[0] > 0 && min + 10 <= BLACKJACK_TOTAL {
        min + 10
    } else {
        min
    }
}

/// Minimum possible total: every Ace counts as 1.
pub fn minimum_total_of(counts: &CardCounts) -> u32 {
    let mut sum = 0u32;
    for (i, &c) in counts.iter().enumerate() {
        sum += (i as u32 + 1) * c as u32;
    }
    sum
}

/// True when an Ace is currently counted as 11.
pub fn is_soft(counts: &CardCounts) -> bool {
    counts[0] > 0 && minimum_total_of(counts) + 10 <= BLACKJACK_TOTAL
}

/// Number of cards in the hand.
pub fn num_cards(counts: &CardCounts) -> u32 {
    counts.iter().map(|&c| c as u32).sum()
}

/// An ordered hand: the draw sequence plus its canonical count vector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
    counts: CardCounts,
}

impl Hand {
    pub fn new() -> Self {
        Hand::default()
    }

    pub fn from_cards(cards: &[Card]) -> Self {
        let mut hand = Hand::new();
        for &c in cards {
            hand.push(c);
        }
        hand
    }

    pub fn push(&mut self, card: Card) {
        debug_assert!((1..=NUM_CARD_VALUES as u8).contains(&card));
        self.cards.push(card);
        self.counts[(card - 1) as usize] += 1;
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// The first drawn card, semantically significant for the dealer
    /// up-card and for blackjack eligibility, unlike later draw order.
    pub fn first_card(&self) -> Option<Card> {
        self.cards.first().copied()
    }

    pub fn counts(&self) -> &CardCounts {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn total(&self) -> u32 {
        total_of(&self.counts)
    }

    pub fn minimum_total(&self) -> u32 {
        minimum_total_of(&self.counts)
    }

    pub fn is_soft(&self) -> bool {
        is_soft(&self.counts)
    }

    /// Two cards totaling 21.
    pub fn is_blackjack(&self) -> bool {
        self.len() == 2 && self.total() == BLACKJACK_TOTAL
    }

    pub fn is_starthand(&self) -> bool {
        self.len() == 2
    }

    /// Minimum total over 21: certain bust regardless of Ace values.
    pub fn is_busted(&self) -> bool {
        self.minimum_total() > BLACKJACK_TOTAL
    }

    /// Any start hand short of 21 may double.
    pub fn can_double(&self) -> bool {
        self.is_starthand() && self.total() < BLACKJACK_TOTAL
    }

    /// Start hand of two equal values.
    pub fn can_split(&self) -> bool {
        self.is_starthand() && self.cards[0] == self.cards[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts_of(cards: &[Card]) -> CardCounts {
        *Hand::from_cards(cards).counts()
    }

    #[test]
    fn test_hard_totals() {
        assert_eq!(total_of(&counts_of(&[5, 7])), 12);
        assert_eq!(total_of(&counts_of(&[10, 9, 2])), 21);
        assert_eq!(total_of(&counts_of(&[10, 10, 5])), 25);
        assert_eq!(minimum_total_of(&counts_of(&[10, 10, 5])), 25);
    }

    #[test]
    fn test_ace_reduction() {
        // A,6 is soft 17.
        assert_eq!(total_of(&counts_of(&[1, 6])), 17);
        assert!(is_soft(&counts_of(&[1, 6])));
        // A,A: one ace counts as 11, the other as 1.
        assert_eq!(total_of(&counts_of(&[1, 1])), 12);
        assert!(is_soft(&counts_of(&[1, 1])));
        // A,6,10: the ace drops back to 1.
        assert_eq!(total_of(&counts_of(&[1, 6, 10])), 17);
        assert!(!is_soft(&counts_of(&[1, 6, 10])));
        assert_eq!(minimum_total_of(&counts_of(&[1, 6, 10])), 17);
    }

    #[test]
    fn test_blackjack_and_start_hand() {
        let bj = Hand::from_cards(&[1, 10]);
        assert!(bj.is_blackjack());
        assert!(bj.is_starthand());
        assert!(!bj.can_double());
        assert!(!bj.can_split());

        // 21 in three cards is not a blackjack.
        let twenty_one = Hand::from_cards(&[7, 7, 7]);
        assert_eq!(twenty_one.total(), 21);
        assert!(!twenty_one.is_blackjack());
    }

    #[test]
    fn test_double_and_split_predicates() {
        let pair = Hand::from_cards(&[8, 8]);
        assert!(pair.can_double());
        assert!(pair.can_split());

        let mixed = Hand::from_cards(&[10, 6]);
        assert!(mixed.can_double());
        assert!(!mixed.can_split());

        let three = Hand::from_cards(&[2, 3, 4]);
        assert!(!three.can_double());
        assert!(!three.can_split());
    }

    #[test]
    fn test_bust_detection() {
        assert!(Hand::from_cards(&[10, 10, 2]).is_busted());
        // 22 with an ace is not a certain bust (minimum 12).
        assert!(!Hand::from_cards(&[1, 1, 10]).is_busted());
        assert_eq!(Hand::from_cards(&[1, 1, 10]).total(), 12);
    }

    #[test]
    fn test_first_card_and_order() {
        let hand = Hand::from_cards(&[10, 1]);
        assert_eq!(hand.first_card(), Some(10));
        // Canonical counts are order-independent.
        assert_eq!(hand.counts(), Hand::from_cards(&[1, 10]).counts());
    }
}
