//! Player EV solver: backward induction over canonical hand states.
//!
//! One solver instance covers one dealer up-card. Hand states are
//! enumerated in non-decreasing card order (so every multiset is generated
//! exactly once) and pruned as soon as the minimum total (all Aces as 1)
//! exceeds 21, because such a branch is a certain bust.
//!
//! For each state the solver computes:
//!
//! - the stand win/loss/draw triple, straight from the dealer's outcome
//!   distribution via the comparison matrix;
//! - the hit triple by backward induction: every child state is fully
//!   solved before its value enters the parent's weighted sum, and a card
//!   that busts immediately contributes its whole mass as a loss without
//!   recursing;
//! - the double EV for entry two-card states: twice the EV of exactly one
//!   forced draw followed by a stand.
//!
//! Action selection: Double when it strictly beats both stand and hit,
//! otherwise Hit iff hit-EV strictly exceeds stand-EV; an exact tie
//! stands.
//!
//! A natural blackjack is an automatic win at 3:2 against any non-blackjack
//! dealer; no further action is evaluated for it.

use std::collections::HashMap;

use crate::combinatorics::hand_frequency;
use crate::constants::*;
use crate::deck::Deck;
use crate::hand::{is_soft, minimum_total_of, num_cards, total_of};
use crate::types::{
    Action, Card, CardCounts, HandStateKey, OutcomeDistribution, OutcomeTriple, Result,
    SolvedHand, SolvedState, SolverError,
};

/// Stand outcome triple for a (non-busted) player total against a dealer
/// outcome distribution.
///
/// Comparison matrix: dealer bust loses to any standing player; a player
/// blackjack beats everything except a dealer blackjack (draw); a dealer
/// blackjack beats any non-blackjack player; numeric totals compare
/// directly, with totals of 16 or less losing to every standing dealer.
pub fn stand_outcome(
    total: u32,
    is_blackjack: bool,
    dealer: &OutcomeDistribution,
) -> OutcomeTriple {
    let mut triple = OutcomeTriple::default();
    for (bucket, &p) in dealer.probs.iter().enumerate() {
        if p == 0.0 {
            continue;
        }
        if bucket == OUTCOME_BUST {
            triple.win += p;
        } else if is_blackjack {
            if bucket == OUTCOME_BLACKJACK {
                triple.draw += p;
            } else {
                triple.win += p;
            }
        } else if bucket == OUTCOME_BLACKJACK {
            triple.loss += p;
        } else if let Some(dealer_total) = outcome_total(bucket) {
            if total > dealer_total {
                triple.win += p;
            } else if total < dealer_total {
                triple.loss += p;
            } else {
                triple.draw += p;
            }
        }
    }
    triple
}

/// Backward-induction solver for all player hands against one up-card.
pub struct PlayerSolver {
    /// Configured deck with the up-card removed; the pool player draws
    /// come from.
    pool: Deck,
    up_card: Card,
    dealer_dist: OutcomeDistribution,
    memo: HashMap<HandStateKey, SolvedHand>,
}

impl PlayerSolver {
    /// `deck` is the configured shoe (missing cards applied); the up-card
    /// is removed here, at the solver boundary.
    pub fn new(deck: &Deck, up_card: Card, dealer_dist: OutcomeDistribution) -> Result<Self> {
        if !(1..=NUM_CARD_VALUES as u8).contains(&up_card) {
            return Err(SolverError::InvalidUpCard(up_card));
        }
        let mut pool = deck.clone();
        pool.remove(up_card)?;
        Ok(PlayerSolver {
            pool,
            up_card,
            dealer_dist,
            memo: HashMap::new(),
        })
    }

    pub fn up_card(&self) -> Card {
        self.up_card
    }

    /// Solve every reachable hand state with two or more cards, in sorted
    /// enumeration order (deterministic across runs).
    pub fn solve_all(&mut self) -> Result<Vec<SolvedState>> {
        let mut out = Vec::new();
        let mut counts = [0u8; NUM_CARD_VALUES];
        self.enumerate(&mut counts, 0, 1, &mut out)?;
        Ok(out)
    }

    /// Solve a single hand given as explicit cards (entry point for tests
    /// and ad-hoc queries).
    pub fn solve_hand(&mut self, cards: &[Card]) -> Result<SolvedHand> {
        let mut counts = [0u8; NUM_CARD_VALUES];
        for &c in cards {
            counts[(c - 1) as usize] += 1;
        }
        self.solve(counts)
    }

    fn enumerate(
        &mut self,
        counts: &mut CardCounts,
        n: u32,
        min_card: Card,
        out: &mut Vec<SolvedState>,
    ) -> Result<()> {
        if minimum_total_of(counts) > BLACKJACK_TOTAL {
            return Ok(());
        }
        if n >= 2 {
            let solved = self.solve(*counts)?;
            out.push(self.make_state(*counts, solved));
        }
        for card in min_card..=NUM_CARD_VALUES as u8 {
            let i = (card - 1) as usize;
            if (counts[i] as u16) < self.pool.count(card) {
                counts[i] += 1;
                self.enumerate(counts, n + 1, card, out)?;
                counts[i] -= 1;
            }
        }
        Ok(())
    }

    fn make_state(&self, counts: CardCounts, solved: SolvedHand) -> SolvedState {
        let total = total_of(&counts);
        let minimum = minimum_total_of(&counts);
        let n = num_cards(&counts);
        let starthand = n == 2;
        SolvedState {
            key: HandStateKey::new(counts, self.up_card),
            total: total as u8,
            minimum_total: minimum as u8,
            is_soft: is_soft(&counts),
            is_blackjack: starthand && total == BLACKJACK_TOTAL,
            is_starthand: starthand,
            is_busted: minimum > BLACKJACK_TOTAL,
            can_double: starthand && total < BLACKJACK_TOTAL,
            can_split: starthand && counts.iter().any(|&c| c == 2),
            frequency: hand_frequency(&counts, &self.pool.remaining_counts()),
            solved,
        }
    }

    /// Solve one canonical state. Callers guarantee the minimum total is
    /// at most 21; certain busts are handled inline by the parent.
    fn solve(&mut self, counts: CardCounts) -> Result<SolvedHand> {
        let key = HandStateKey::new(counts, self.up_card);
        if let Some(solved) = self.memo.get(&key) {
            return Ok(*solved);
        }

        let total = total_of(&counts);
        let n = num_cards(&counts);
        let natural = total == BLACKJACK_TOTAL && n == 2;

        let stand = stand_outcome(total, natural, &self.dealer_dist);
        let stand_ev = if natural {
            BLACKJACK_PAYOUT * stand.win - stand.loss
        } else {
            stand.win - stand.loss
        };

        // Automatic 3:2 win against any non-blackjack dealer; hit and
        // double are never on the table.
        if natural {
            let solved = SolvedHand {
                stand,
                hit: stand,
                stand_ev,
                hit_ev: stand_ev,
                double_ev: None,
                action: Action::Stand,
            };
            self.memo.insert(key, solved);
            return Ok(solved);
        }

        let remaining = self.pool.without_hand(&counts)?;
        let total_left = remaining.total_cards();

        let solved = if total_left == 0 {
            // Exhausted deck: hitting is impossible, the state is forced to
            // stand.
            SolvedHand {
                stand,
                hit: stand,
                stand_ev,
                hit_ev: stand_ev,
                double_ev: None,
                action: Action::Stand,
            }
        } else {
            let mut hit = OutcomeTriple::default();
            for card in remaining.available_cards() {
                let p = remaining.count(card) as f64 / total_left as f64;
                let mut child = counts;
                child[(card - 1) as usize] += 1;
                if minimum_total_of(&child) > BLACKJACK_TOTAL {
                    // Immediate bust: terminal loss, no recursion.
                    hit.loss += p;
                } else {
                    let child_solved = self.solve(child)?;
                    hit.accumulate(&child_solved.best_triple(), p);
                }
            }
            let hit_ev = hit.win - hit.loss;

            let double_ev = if n == 2 && total < BLACKJACK_TOTAL {
                Some(2.0 * self.forced_draw_stand_ev(&counts, &remaining))
            } else {
                None
            };

            let action = match double_ev {
                Some(dev) if dev > stand_ev && dev > hit_ev => Action::Double,
                _ if hit_ev > stand_ev => Action::Hit,
                _ => Action::Stand,
            };

            debug_assert!(
                hit.total_mass() <= 1.0 + 1e-9 && hit_ev.is_finite(),
                "hit accumulation out of range for {:?}",
                counts
            );

            SolvedHand {
                stand,
                hit,
                stand_ev,
                hit_ev,
                double_ev,
                action,
            }
        };

        self.memo.insert(key, solved);
        Ok(solved)
    }

    /// EV of drawing exactly one card and standing on the result, the
    /// single-card half of the double-down evaluation.
    fn forced_draw_stand_ev(&self, counts: &CardCounts, remaining: &Deck) -> f64 {
        let total_left = remaining.total_cards();
        let mut ev = 0.0;
        for card in remaining.available_cards() {
            let p = remaining.count(card) as f64 / total_left as f64;
            let mut child = *counts;
            child[(card - 1) as usize] += 1;
            if minimum_total_of(&child) > BLACKJACK_TOTAL {
                ev -= p;
            } else {
                // Three cards can never be a natural.
                let triple = stand_outcome(total_of(&child), false, &self.dealer_dist);
                ev += p * (triple.win - triple.loss);
            }
        }
        ev
    }
}
