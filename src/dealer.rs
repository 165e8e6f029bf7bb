//! Dealer outcome distributions: exact enumeration of every draw sequence.
//!
//! From a given up-card the dealer draws until the total reaches 17
//! (soft 17 stands) or busts over 21. Each draw carries its exact
//! probability count/remaining, so the terminal buckets form an exact
//! distribution; nothing is sampled.
//!
//! Blackjack is only reachable from the two-card starting hand; a 21 made
//! with three or more cards lands in the plain `21` bucket.
//!
//! Memoization is keyed by the canonical dealer-hand count vector. That
//! vector determines the current total, the start-hand flag, and (given the
//! base deck of the invocation) the remaining-deck signature, so the key is
//! independent of draw order by construction.

use std::collections::HashMap;

use crate::constants::*;
use crate::deck::Deck;
use crate::hand::{num_cards, total_of};
use crate::types::{Card, CardCounts, OutcomeDistribution, Result, SolverError};

/// Memo key: canonical count vector of the dealer's cards so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct DealerStateKey {
    counts: CardCounts,
}

impl DealerStateKey {
    fn new(counts: CardCounts) -> Self {
        DealerStateKey { counts }
    }
}

/// Exact dealer solver over an explicitly supplied deck.
///
/// The deck passed in is the configured shoe (missing cards already
/// applied by the caller); each solve works on private copies, so one
/// solver value can serve any number of sequential solves.
pub struct DealerSolver {
    deck: Deck,
}

impl DealerSolver {
    pub fn new(deck: Deck) -> Self {
        DealerSolver { deck }
    }

    /// Outcome distribution for one dealer up-card over the configured deck.
    pub fn solve(&self, up_card: Card) -> Result<OutcomeDistribution> {
        self.solve_conditional(up_card, &[])
    }

    /// Like [`solve`](Self::solve), with additional cards known to be out
    /// of the deck (a seen hole card, burns, partial information). The
    /// conditional deck genuinely perturbs every draw probability below.
    pub fn solve_conditional(
        &self,
        up_card: Card,
        missing: &[Card],
    ) -> Result<OutcomeDistribution> {
        if !(1..=NUM_CARD_VALUES as u8).contains(&up_card) {
            return Err(SolverError::InvalidUpCard(up_card));
        }

        let mut deck = self.deck.clone();
        deck.remove_all(missing)?;
        deck.remove(up_card)?;

        let mut hand = [0u8; NUM_CARD_VALUES];
        hand[(up_card - 1) as usize] = 1;

        // The memo is valid only for this invocation's base deck, so each
        // top-level solve starts fresh.
        let mut memo: HashMap<DealerStateKey, OutcomeDistribution> = HashMap::new();
        let dist = explore(&hand, &deck, &mut memo)?;

        debug_assert!(
            dist.total_mass().is_finite() && dist.total_mass() <= 1.0 + 1e-9,
            "dealer distribution mass {} out of range",
            dist.total_mass()
        );
        Ok(dist)
    }
}

fn explore(
    counts: &CardCounts,
    deck: &Deck,
    memo: &mut HashMap<DealerStateKey, OutcomeDistribution>,
) -> Result<OutcomeDistribution> {
    let total = total_of(counts);
    if total > BLACKJACK_TOTAL {
        return Ok(OutcomeDistribution::singleton(OUTCOME_BUST));
    }
    if total >= DEALER_STAND_TOTAL {
        let natural = total == BLACKJACK_TOTAL && num_cards(counts) == 2;
        return Ok(OutcomeDistribution::singleton(standing_outcome(
            total, natural,
        )));
    }

    let key = DealerStateKey::new(*counts);
    if let Some(dist) = memo.get(&key) {
        return Ok(*dist);
    }

    let total_left = deck.total_cards();
    if total_left == 0 {
        // Exhausted deck: this branch's mass stays unterminated.
        return Ok(OutcomeDistribution::zero());
    }

    let mut dist = OutcomeDistribution::zero();
    for card in deck.available_cards() {
        let p = deck.count(card) as f64 / total_left as f64;
        let mut child_deck = deck.clone();
        child_deck.remove(card)?;
        let mut child = *counts;
        child[(card - 1) as usize] += 1;
        let child_dist = explore(&child, &child_deck, memo)?;
        dist.accumulate(&child_dist, p);
    }

    memo.insert(key, dist);
    Ok(dist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_sums_to_one_for_every_up_card() {
        let solver = DealerSolver::new(Deck::new(1));
        for up in 1..=10u8 {
            let dist = solver.solve(up).unwrap();
            assert!(
                (dist.total_mass() - 1.0).abs() < 1e-9,
                "up-card {} mass {}",
                up,
                dist.total_mass()
            );
            // Dealer never stands below 17.
            assert_eq!(dist.probs[OUTCOME_SIXTEEN_OR_LESS], 0.0);
            for &p in &dist.probs {
                assert!(p.is_finite() && p >= 0.0);
            }
        }
    }

    #[test]
    fn test_blackjack_mass_is_exactly_the_hole_card_draw() {
        let solver = DealerSolver::new(Deck::new(1));
        // Up-card ten: only an ace as second card makes blackjack.
        let dist = solver.solve(10).unwrap();
        assert!((dist.blackjack() - 4.0 / 51.0).abs() < 1e-12);
        // Up-card ace: any of the 16 tens completes it.
        let dist = solver.solve(1).unwrap();
        assert!((dist.blackjack() - 16.0 / 51.0).abs() < 1e-12);
        // Up-card 5 can never make a two-card 21.
        let dist = solver.solve(5).unwrap();
        assert_eq!(dist.blackjack(), 0.0);
    }

    #[test]
    fn test_invalid_up_card_rejected_at_entry() {
        let solver = DealerSolver::new(Deck::new(1));
        assert!(matches!(solver.solve(0), Err(SolverError::InvalidUpCard(0))));
        assert!(matches!(
            solver.solve(11),
            Err(SolverError::InvalidUpCard(11))
        ));
    }

    #[test]
    fn test_conditional_solve_perturbs_the_distribution() {
        let solver = DealerSolver::new(Deck::new(1));
        let unconditional = solver.solve(1).unwrap();
        // A ten known to be gone makes dealer blackjack less likely.
        let conditional = solver.solve_conditional(1, &[10]).unwrap();
        assert!(conditional.blackjack() < unconditional.blackjack());
        assert!((conditional.total_mass() - 1.0).abs() < 1e-9);
        assert_ne!(unconditional, conditional);
    }

    #[test]
    fn test_conditional_solve_with_unavailable_card_fails() {
        let solver = DealerSolver::new(Deck::new(1));
        assert!(matches!(
            solver.solve_conditional(7, &[1, 1, 1, 1, 1]),
            Err(SolverError::CardUnavailable(1))
        ));
    }

    #[test]
    fn test_multi_deck_changes_composition() {
        let one = DealerSolver::new(Deck::new(1)).solve(6).unwrap();
        let six = DealerSolver::new(Deck::new(6)).solve(6).unwrap();
        assert_ne!(one, six);
        assert!((six.total_mass() - 1.0).abs() < 1e-9);
    }
}
