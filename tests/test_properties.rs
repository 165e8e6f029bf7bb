//! Property-based tests for deck bookkeeping, hand evaluation, and the
//! combinatorial primitives.

use proptest::prelude::*;

use blackjack::combinatorics::{bust_probability, hand_frequency, next_card_distribution};
use blackjack::constants::*;
use blackjack::deck::Deck;
use blackjack::hand::{is_soft, minimum_total_of, num_cards, total_of};
use blackjack::player::stand_outcome;
use blackjack::types::{Card, CardCounts, OutcomeDistribution};

/// Strategy: a valid card value 1..=10.
fn card_strategy() -> impl Strategy<Value = Card> {
    1..=NUM_CARD_VALUES as Card
}

/// Strategy: a hand of 1..=8 cards that a single deck can supply.
fn hand_strategy() -> impl Strategy<Value = CardCounts> {
    prop::collection::vec(card_strategy(), 1..=8).prop_filter_map(
        "hand not drawable from one deck",
        |cards| {
            let mut counts = [0u8; NUM_CARD_VALUES];
            for &c in &cards {
                counts[(c - 1) as usize] += 1;
            }
            let deck = Deck::new(1);
            let drawable = (1..=NUM_CARD_VALUES as u8)
                .all(|v| counts[(v - 1) as usize] as u16 <= deck.count(v));
            drawable.then_some(counts)
        },
    )
}

/// Strategy: a normalized dealer-style outcome distribution. The dealer
/// never stands below 17, so the `<=16` bucket stays empty.
fn distribution_strategy() -> impl Strategy<Value = OutcomeDistribution> {
    prop::array::uniform7(0.001f64..1.0).prop_map(|raw| {
        let sum: f64 = raw.iter().sum();
        let mut dist = OutcomeDistribution::zero();
        for (i, &r) in raw.iter().enumerate() {
            dist.probs[OUTCOME_SEVENTEEN + i] = r / sum;
        }
        dist
    })
}

proptest! {
    // 1. remove followed by restore is the identity on the deck.
    #[test]
    fn remove_restore_identity(cards in prop::collection::vec(card_strategy(), 1..=10)) {
        let mut deck = Deck::new(1);
        let mut removed = Vec::new();
        for &c in &cards {
            if deck.remove(c).is_ok() {
                removed.push(c);
            }
        }
        for &c in removed.iter().rev() {
            deck.restore(c);
        }
        prop_assert_eq!(deck, Deck::new(1));
    }

    // 2. Hand totals: total never below minimum, excess is exactly the one
    //    promoted Ace, and a promoted Ace means the hand is soft.
    #[test]
    fn total_dominates_minimum(counts in hand_strategy()) {
        let total = total_of(&counts);
        let minimum = minimum_total_of(&counts);
        prop_assert!(total >= minimum);
        prop_assert!(total == minimum || total == minimum + 10);
        prop_assert_eq!(total > minimum, is_soft(&counts));
        if total > minimum {
            prop_assert!(counts[0] > 0);
            prop_assert!(total <= BLACKJACK_TOTAL);
        }
    }

    // 3. Bust probability is a probability, and zero whenever an extra card
    //    provably fits.
    #[test]
    fn bust_probability_in_range(counts in hand_strategy()) {
        let deck = Deck::new(1);
        let p = bust_probability(&counts, &deck);
        prop_assert!((0.0..=1.0).contains(&p));
        if minimum_total_of(&counts) <= 11 {
            prop_assert_eq!(p, 0.0);
        }
    }

    // 4. One-card lookahead mass is 1 for any hand a single deck can still
    //    draw against.
    #[test]
    fn next_card_distribution_is_normalized(counts in hand_strategy()) {
        let deck = Deck::new(1).without_hand(&counts).unwrap();
        let dist = next_card_distribution(&counts, &deck);
        prop_assert!((dist.total_mass() - 1.0).abs() < 1e-9);
        for &p in &dist.probs {
            prop_assert!((0.0..=1.0 + 1e-12).contains(&p));
        }
    }

    // 5. Frequencies are positive exactly for drawable hands, and shrink or
    //    hold when the hand grows.
    #[test]
    fn frequency_positive_and_monotone(counts in hand_strategy(), extra in card_strategy()) {
        let deck = Deck::new(1);
        let f = hand_frequency(&counts, deck.reference_counts());
        prop_assert!(f > 0);

        let mut grown = counts;
        grown[(extra - 1) as usize] += 1;
        let g = hand_frequency(&grown, deck.reference_counts());
        // Adding a card multiplies by (copies left) / (multiplicity), which
        // can only be zero when the deck runs out of that value.
        if g > 0 {
            prop_assert!(num_cards(&grown) == num_cards(&counts) + 1);
        } else {
            prop_assert!(grown[(extra - 1) as usize] as u16 > deck.reference_count(extra));
        }
    }

    // 6. Stand outcomes against any normalized dealer distribution form a
    //    probability triple, and never lose to a certain dealer bust.
    #[test]
    fn stand_outcome_is_a_probability_triple(
        total in 4..=21u32,
        dist in distribution_strategy(),
    ) {
        let t = stand_outcome(total, false, &dist);
        prop_assert!(t.win >= 0.0 && t.loss >= 0.0 && t.draw >= 0.0);
        prop_assert!((t.total_mass() - 1.0).abs() < 1e-9);

        let bust_only = OutcomeDistribution::singleton(OUTCOME_BUST);
        let sure = stand_outcome(total, false, &bust_only);
        prop_assert_eq!(sure.win, 1.0);
        prop_assert_eq!(sure.loss, 0.0);
    }

    // 7. A blackjack holder never loses a stand showdown.
    #[test]
    fn blackjack_never_loses_standing(dist in distribution_strategy()) {
        let t = stand_outcome(BLACKJACK_TOTAL, true, &dist);
        prop_assert_eq!(t.loss, 0.0);
        prop_assert!((t.draw - dist.blackjack()).abs() < 1e-12);
    }
}
