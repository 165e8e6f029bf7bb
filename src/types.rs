//! Core data structures: solver keys, outcome distributions, records, errors.
//!
//! The memoization invariant lives here: two hands with identical canonical
//! card counts and identical dealer context are interchangeable, so
//! [`HandStateKey`] is exactly (count vector, up-card) with a canonical
//! constructor, never an ad-hoc tuple.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

/// A card value in 1..=10 (1 = Ace, 10 = ten/Jack/Queen/King).
pub type Card = u8;

/// Canonical order-independent hand representation: count per card value,
/// `counts[v - 1]` = copies of value `v` in the hand.
pub type CardCounts = [u8; NUM_CARD_VALUES];

/// Solver errors. `CardUnavailable` indicates broken recursive bookkeeping
/// and is treated as fatal by callers; `InvalidUpCard` is rejected at the
/// solver entry point before any recursion.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("card {0} is no longer available in the deck")]
    CardUnavailable(Card),

    #[error("dealer up-card {0} is outside 1..=10")]
    InvalidUpCard(Card),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("malformed table file: {0}")]
    MalformedTable(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Recommended action for a player state.
///
/// `Undecided` marks a strategy-table aggregate where distinct card-count
/// vectors with the same (total, softness) strictly disagree on the sign of
/// hit-EV minus stand-EV; the ambiguity is surfaced, never silently resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Stand,
    Hit,
    Double,
    Undecided,
}

impl Action {
    pub fn as_u8(self) -> u8 {
        match self {
            Action::Stand => 0,
            Action::Hit => 1,
            Action::Double => 2,
            Action::Undecided => 3,
        }
    }

    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(Action::Stand),
            1 => Ok(Action::Hit),
            2 => Ok(Action::Double),
            3 => Ok(Action::Undecided),
            other => Err(SolverError::MalformedTable(format!(
                "unknown action code {other}"
            ))),
        }
    }
}

/// Memoization key for a player hand state: canonical counts + dealer context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandStateKey {
    pub counts: CardCounts,
    pub up_card: Card,
}

impl HandStateKey {
    /// Canonical constructor; keys are built nowhere else.
    pub fn new(counts: CardCounts, up_card: Card) -> Self {
        HandStateKey { counts, up_card }
    }
}

/// Exact probability distribution over the 8 terminal outcome buckets.
///
/// For a dealer solve over a non-empty deck the mass sums to 1; branches
/// that exhaust the deck contribute only the mass already terminated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDistribution {
    pub probs: [f64; NUM_OUTCOMES],
}

impl OutcomeDistribution {
    pub fn zero() -> Self {
        OutcomeDistribution {
            probs: [0.0; NUM_OUTCOMES],
        }
    }

    /// All mass on one bucket.
    pub fn singleton(bucket: usize) -> Self {
        let mut d = Self::zero();
        d.probs[bucket] = 1.0;
        d
    }

    /// Accumulate `weight × other` into self.
    pub fn accumulate(&mut self, other: &OutcomeDistribution, weight: f64) {
        for (p, q) in self.probs.iter_mut().zip(other.probs.iter()) {
            *p += weight * q;
        }
    }

    pub fn total_mass(&self) -> f64 {
        self.probs.iter().sum()
    }

    /// Probability mass in the bust bucket.
    pub fn bust(&self) -> f64 {
        self.probs[OUTCOME_BUST]
    }

    /// Probability mass in the blackjack bucket.
    pub fn blackjack(&self) -> f64 {
        self.probs[OUTCOME_BLACKJACK]
    }
}

/// Win/loss/draw probability triple for one player action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeTriple {
    pub win: f64,
    pub loss: f64,
    pub draw: f64,
}

impl OutcomeTriple {
    pub fn accumulate(&mut self, other: &OutcomeTriple, weight: f64) {
        self.win += weight * other.win;
        self.loss += weight * other.loss;
        self.draw += weight * other.draw;
    }

    pub fn total_mass(&self) -> f64 {
        self.win + self.loss + self.draw
    }
}

/// Fully solved EV data for one canonical player hand state.
#[derive(Clone, Copy, Debug)]
pub struct SolvedHand {
    pub stand: OutcomeTriple,
    pub hit: OutcomeTriple,
    pub stand_ev: f64,
    pub hit_ev: f64,
    /// 2 × (one forced draw, then stand). Entry two-card states only.
    pub double_ev: Option<f64>,
    pub action: Action,
}

impl SolvedHand {
    /// EV of the better of stand and hit: the value a parent state sees
    /// when weighting this state in its own hit induction.
    pub fn best_ev(&self) -> f64 {
        if self.hit_ev > self.stand_ev {
            self.hit_ev
        } else {
            self.stand_ev
        }
    }

    /// Outcome triple of the better of stand and hit.
    pub fn best_triple(&self) -> OutcomeTriple {
        if self.hit_ev > self.stand_ev {
            self.hit
        } else {
            self.stand
        }
    }

    /// EV of the recommended action (double included).
    pub fn action_ev(&self) -> f64 {
        match self.action {
            Action::Double => self.double_ev.unwrap_or_else(|| self.best_ev()),
            _ => self.best_ev(),
        }
    }
}

/// One solved player state together with the hand properties that go into
/// the persisted record and the strategy aggregation.
#[derive(Clone, Copy, Debug)]
pub struct SolvedState {
    pub key: HandStateKey,
    pub total: u8,
    pub minimum_total: u8,
    pub is_soft: bool,
    pub is_blackjack: bool,
    pub is_starthand: bool,
    pub is_busted: bool,
    pub can_double: bool,
    pub can_split: bool,
    /// Number of distinct card combinations forming this multiset.
    pub frequency: u64,
    pub solved: SolvedHand,
}

impl SolvedState {
    pub fn to_record(&self) -> HandRecord {
        HandRecord {
            card_counts: self.key.counts,
            total: self.total,
            minimum_total: self.minimum_total,
            is_blackjack: self.is_blackjack,
            is_starthand: self.is_starthand,
            is_busted: self.is_busted,
            can_double: self.can_double,
            can_split: self.can_split,
            frequency: self.frequency,
            dealer_up_card: self.key.up_card,
            action: self.solved.action,
            win_prob: self.solved.best_triple().win,
            loss_prob: self.solved.best_triple().loss,
            draw_prob: self.solved.best_triple().draw,
            ev: self.solved.action_ev(),
        }
    }
}

/// Persisted row for one player hand state (fixed schema, independent of
/// the deck configuration).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    pub card_counts: CardCounts,
    pub total: u8,
    pub minimum_total: u8,
    pub is_blackjack: bool,
    pub is_starthand: bool,
    pub is_busted: bool,
    pub can_double: bool,
    pub can_split: bool,
    pub frequency: u64,
    pub dealer_up_card: Card,
    pub action: Action,
    pub win_prob: f64,
    pub loss_prob: f64,
    pub draw_prob: f64,
    pub ev: f64,
}

/// One row of the final strategy table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyEntry {
    pub player_total: u8,
    pub is_soft: bool,
    pub dealer_up_card: Card,
    pub action: Action,
    pub win_prob: f64,
    pub loss_prob: f64,
    pub draw_prob: f64,
    pub ev: f64,
}

/// Solve configuration: deck size plus cards known to be out of play.
///
/// Every solver takes its deck explicitly; nothing default-constructs a
/// fresh deck internally.
#[derive(Clone, Debug, Default)]
pub struct SolveConfig {
    pub num_decks: u32,
    /// Cards pre-removed before solving (partial information, e.g. a known
    /// burn or hole card in a conditional scenario).
    pub missing_cards: Vec<Card>,
}

impl SolveConfig {
    pub fn new(num_decks: u32) -> Self {
        SolveConfig {
            num_decks,
            missing_cards: Vec::new(),
        }
    }
}

/// Summary of one full solve run.
#[derive(Clone, Debug)]
pub struct SolveReport {
    pub dealer_rows: usize,
    pub player_records: usize,
    pub strategy_entries: usize,
    pub elapsed_secs: f64,
}
