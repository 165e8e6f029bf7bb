//! Exact combinatorial weights and one-card probability queries.
//!
//! `hand_frequency` is the combinatorial weight that keeps the whole solve
//! honest: hands are generated once per sorted multiset, and the frequency
//! (distinct card combinations forming that multiset in the reference deck)
//! restores the weight the sorted enumeration dropped. Enumerating card
//! sequences separately and weighting them uniformly would give the same
//! totals at far greater cost.

use crate::constants::*;
use crate::deck::Deck;
use crate::hand::{minimum_total_of, num_cards, total_of};
use crate::types::{Card, CardCounts, OutcomeDistribution};

fn factorial(n: u8) -> u64 {
    (1..=n as u64).product::<u64>().max(1)
}

/// Number of distinct ways to draw this multiset from a deck with the given
/// reference counts: the falling-factorial product per card value, divided
/// by the factorial of the value's multiplicity in the hand.
///
/// Zero when the hand needs more copies of a value than the reference holds.
pub fn hand_frequency(counts: &CardCounts, reference: &[u16; NUM_CARD_VALUES]) -> u64 {
    let mut frequency = 1u64;
    for (i, &k) in counts.iter().enumerate() {
        if k == 0 {
            continue;
        }
        if (k as u16) > reference[i] {
            return 0;
        }
        let mut falling = 1u64;
        for step in 0..k as u64 {
            falling *= reference[i] as u64 - step;
        }
        frequency *= falling / factorial(k);
    }
    frequency
}

/// Order-respecting draw frequency for an explicit card sequence, skipping
/// the first `skip` cards (a dealer up-card is fixed, not drawn).
///
/// Zero for sequences shorter than `skip + 1` or sequences the reference
/// cannot supply.
pub fn ordered_hand_frequency(
    cards: &[Card],
    reference: &[u16; NUM_CARD_VALUES],
    skip: usize,
) -> u64 {
    if cards.len() <= skip {
        return 0;
    }
    let mut remaining = *reference;
    let mut frequency = 1u64;
    for &card in &cards[skip..] {
        let i = (card - 1) as usize;
        if remaining[i] == 0 {
            return 0;
        }
        frequency *= remaining[i] as u64;
        remaining[i] -= 1;
    }
    frequency
}

/// Probability that one more card busts the hand, with remaining counts
/// derived from the deck's reference minus the hand itself.
///
/// Minimum totals of 11 or less can never bust (an Ace always fits);
/// totals of 21 or more bust on any card.
pub fn bust_probability(counts: &CardCounts, deck: &Deck) -> f64 {
    let minimum = minimum_total_of(counts);
    if minimum <= 11 {
        return 0.0;
    }
    if minimum >= BLACKJACK_TOTAL {
        return 1.0;
    }

    let mut total_left = 0u32;
    let mut bust_count = 0u32;
    for v in 1..=NUM_CARD_VALUES as u8 {
        let i = (v - 1) as usize;
        let left = deck.reference_count(v).saturating_sub(counts[i] as u16) as u32;
        total_left += left;
        if minimum + v as u32 > BLACKJACK_TOTAL {
            bust_count += left;
        }
    }
    if total_left == 0 {
        return 0.0;
    }
    bust_count as f64 / total_left as f64
}

/// One-card lookahead distribution: for each card still in the working
/// deck, bucket the resulting hand total. A second card completing 21 on a
/// one-card hand lands in the Blackjack bucket; 21 on a longer hand is a
/// plain 21.
///
/// Hands already certain to bust return all mass on Bust; an exhausted deck
/// returns the all-zero distribution (terminal, not an error).
pub fn next_card_distribution(hand_counts: &CardCounts, deck: &Deck) -> OutcomeDistribution {
    if minimum_total_of(hand_counts) > BLACKJACK_TOTAL {
        return OutcomeDistribution::singleton(OUTCOME_BUST);
    }

    let total_left = deck.total_cards();
    if total_left == 0 {
        return OutcomeDistribution::zero();
    }

    let n = num_cards(hand_counts);
    let mut dist = OutcomeDistribution::zero();
    for v in deck.available_cards() {
        let p = deck.count(v) as f64 / total_left as f64;
        let mut child = *hand_counts;
        child[(v - 1) as usize] += 1;
        let total = total_of(&child);
        let natural = total == BLACKJACK_TOTAL && n == 1;
        dist.probs[standing_outcome(total, natural)] += p;
    }
    dist
}
