//! Strategy table derivation from solved player states.
//!
//! Distinct card-count vectors can share a (total, softness) cell (hard 16
//! is 10+6, 9+7, 2+4+10, and so on), and their solved recommendations need
//! not agree, because the cards composing the hand also deplete the deck.
//! The aggregate decision per cell is resolved by frequency-weighted
//! average EV across all contributing vectors. When the vectors strictly
//! disagree in the *sign* of hit-EV minus stand-EV, the cell is flagged
//! [`Action::Undecided`] instead of silently picking a side.

use std::collections::BTreeMap;

use crate::types::{Action, SolvedState, StrategyEntry};

#[derive(Default)]
struct CellAccumulator {
    weight: f64,
    stand_ev: f64,
    hit_ev: f64,
    best_ev: f64,
    win: f64,
    loss: f64,
    draw: f64,
    double_weight: f64,
    double_ev: f64,
    any_hit_better: bool,
    any_stand_better: bool,
}

impl CellAccumulator {
    fn add(&mut self, state: &SolvedState) {
        let w = state.frequency as f64;
        self.weight += w;
        self.stand_ev += w * state.solved.stand_ev;
        self.hit_ev += w * state.solved.hit_ev;
        self.best_ev += w * state.solved.best_ev();
        let triple = state.solved.best_triple();
        self.win += w * triple.win;
        self.loss += w * triple.loss;
        self.draw += w * triple.draw;
        if let Some(dev) = state.solved.double_ev {
            self.double_weight += w;
            self.double_ev += w * dev;
        }
        if state.solved.hit_ev > state.solved.stand_ev {
            self.any_hit_better = true;
        }
        if state.solved.hit_ev < state.solved.stand_ev {
            self.any_stand_better = true;
        }
    }

    fn resolve(&self, total: u8, is_soft: bool, up_card: u8) -> StrategyEntry {
        let w = self.weight;
        let stand_ev = self.stand_ev / w;
        let hit_ev = self.hit_ev / w;
        let double_ev = if self.double_weight > 0.0 {
            Some(self.double_ev / self.double_weight)
        } else {
            None
        };

        let (action, ev) = if self.any_hit_better && self.any_stand_better {
            // Contributing vectors strictly disagree; surface it.
            (Action::Undecided, self.best_ev / w)
        } else {
            match double_ev {
                Some(dev) if dev > stand_ev && dev > hit_ev => (Action::Double, dev),
                _ if hit_ev > stand_ev => (Action::Hit, hit_ev),
                _ => (Action::Stand, stand_ev),
            }
        };

        StrategyEntry {
            player_total: total,
            is_soft,
            dealer_up_card: up_card,
            action,
            win_prob: self.win / w,
            loss_prob: self.loss / w,
            draw_prob: self.draw / w,
            ev,
        }
    }
}

/// Aggregate solved states (any number of up-cards) into the final table,
/// sorted by (up-card, softness, total). Deterministic: the grouping is an
/// ordered map and the inputs arrive in enumeration order.
pub fn build_strategy_table(states: &[SolvedState]) -> Vec<StrategyEntry> {
    let mut cells: BTreeMap<(u8, bool, u8), CellAccumulator> = BTreeMap::new();
    for state in states {
        if state.frequency == 0 {
            continue;
        }
        cells
            .entry((state.key.up_card, state.is_soft, state.total))
            .or_default()
            .add(state);
    }

    cells
        .iter()
        .map(|(&(up_card, is_soft, total), acc)| acc.resolve(total, is_soft, up_card))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HandStateKey, OutcomeTriple, SolvedHand};

    fn state(
        counts: [u8; 10],
        up_card: u8,
        total: u8,
        frequency: u64,
        stand_ev: f64,
        hit_ev: f64,
        double_ev: Option<f64>,
    ) -> SolvedState {
        let triple = OutcomeTriple {
            win: 0.4,
            loss: 0.5,
            draw: 0.1,
        };
        let action = match double_ev {
            Some(d) if d > stand_ev && d > hit_ev => Action::Double,
            _ if hit_ev > stand_ev => Action::Hit,
            _ => Action::Stand,
        };
        SolvedState {
            key: HandStateKey::new(counts, up_card),
            total,
            minimum_total: total,
            is_soft: false,
            is_blackjack: false,
            is_starthand: true,
            is_busted: false,
            can_double: double_ev.is_some(),
            can_split: false,
            frequency,
            solved: SolvedHand {
                stand: triple,
                hit: triple,
                stand_ev,
                hit_ev,
                double_ev,
                action,
            },
        }
    }

    fn counts_16_a() -> [u8; 10] {
        let mut c = [0u8; 10];
        c[9] = 1;
        c[5] = 1; // 10 + 6
        c
    }

    fn counts_16_b() -> [u8; 10] {
        let mut c = [0u8; 10];
        c[8] = 1;
        c[6] = 1; // 9 + 7
        c
    }

    #[test]
    fn test_agreeing_vectors_use_weighted_average() {
        let states = vec![
            state(counts_16_a(), 10, 16, 3, -0.5, -0.4, None),
            state(counts_16_b(), 10, 16, 1, -0.5, -0.3, None),
        ];
        let table = build_strategy_table(&states);
        assert_eq!(table.len(), 1);
        let entry = &table[0];
        assert_eq!(entry.action, Action::Hit);
        // (3·−0.4 + 1·−0.3) / 4
        assert!((entry.ev - (-0.375)).abs() < 1e-12);
    }

    #[test]
    fn test_strict_sign_disagreement_is_undecided() {
        let states = vec![
            state(counts_16_a(), 10, 16, 2, -0.5, -0.6, None),
            state(counts_16_b(), 10, 16, 2, -0.5, -0.4, None),
        ];
        let table = build_strategy_table(&states);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].action, Action::Undecided);
    }

    #[test]
    fn test_double_needs_strict_dominance() {
        // Double EV equal to hit EV: not strictly better, so Hit wins.
        let tied = vec![state(counts_16_a(), 6, 11, 1, 0.1, 0.3, Some(0.3))];
        assert_eq!(build_strategy_table(&tied)[0].action, Action::Hit);

        let dominant = vec![state(counts_16_a(), 6, 11, 1, 0.1, 0.3, Some(0.5))];
        let entry = &build_strategy_table(&dominant)[0];
        assert_eq!(entry.action, Action::Double);
        assert!((entry.ev - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_exact_tie_stands() {
        let tied = vec![state(counts_16_a(), 4, 16, 1, -0.2, -0.2, None)];
        assert_eq!(build_strategy_table(&tied)[0].action, Action::Stand);
    }

    #[test]
    fn test_cells_are_split_by_up_card() {
        let states = vec![
            state(counts_16_a(), 10, 16, 1, -0.5, -0.4, None),
            state(counts_16_a(), 6, 16, 1, -0.1, -0.3, None),
        ];
        let table = build_strategy_table(&states);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].dealer_up_card, 6);
        assert_eq!(table[0].action, Action::Stand);
        assert_eq!(table[1].dealer_up_card, 10);
        assert_eq!(table[1].action, Action::Hit);
    }
}
