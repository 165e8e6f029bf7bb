//! Full solve pipeline: dealer pass, player pass, strategy aggregation,
//! persistence.
//!
//! The ten up-cards are independent, so both solver passes fan out with
//! rayon; `collect` preserves the up-card order, keeping every output
//! identical across runs and thread counts. Solving an already-solved
//! configuration rewrites the same files with the same bytes.

use std::time::Instant;

use rayon::prelude::*;

use crate::constants::*;
use crate::dealer::DealerSolver;
use crate::deck::Deck;
use crate::player::PlayerSolver;
use crate::storage::SolverStore;
use crate::strategy::build_strategy_table;
use crate::types::{
    Card, HandRecord, OutcomeDistribution, Result, SolveConfig, SolveReport, SolvedState,
};

/// Build the configured shoe: `num_decks` fresh decks minus the cards known
/// to be out of play.
pub fn build_deck(config: &SolveConfig) -> Result<Deck> {
    let mut deck = Deck::new(config.num_decks);
    deck.remove_all(&config.missing_cards)?;
    Ok(deck)
}

/// Exact dealer distribution per up-card, in up-card order.
pub fn solve_dealer_rows(deck: &Deck) -> Result<Vec<(Card, OutcomeDistribution)>> {
    let up_cards: Vec<Card> = (1..=NUM_CARD_VALUES as u8).collect();
    up_cards
        .into_par_iter()
        .map(|up_card| {
            let solver = DealerSolver::new(deck.clone());
            solver.solve(up_card).map(|dist| (up_card, dist))
        })
        .collect()
}

/// All solved player states for all up-cards, in (up-card, enumeration)
/// order.
pub fn solve_player_states(
    deck: &Deck,
    dealer_rows: &[(Card, OutcomeDistribution)],
) -> Result<Vec<SolvedState>> {
    let per_up_card: Vec<Vec<SolvedState>> = dealer_rows
        .par_iter()
        .map(|&(up_card, dist)| {
            let start_time = Instant::now();
            let mut solver = PlayerSolver::new(deck, up_card, dist)?;
            let states = solver.solve_all()?;
            println!(
                "  up-card {:>2}: {} states in {:.2} s",
                up_card,
                states.len(),
                start_time.elapsed().as_secs_f64()
            );
            Ok(states)
        })
        .collect::<Result<_>>()?;
    Ok(per_up_card.into_iter().flatten().collect())
}

/// Run the whole pipeline for one deck configuration and persist every
/// stage through `store`.
pub fn solve_all(config: &SolveConfig, store: &dyn SolverStore) -> Result<SolveReport> {
    let start_time = Instant::now();
    let deck = build_deck(config)?;
    println!(
        "Solving {} deck(s), {} cards removed, {} cards in play",
        config.num_decks,
        config.missing_cards.len(),
        deck.total_cards()
    );

    let phase_start = Instant::now();
    let dealer_rows = solve_dealer_rows(&deck)?;
    println!(
        "Dealer pass: {} up-cards in {:.2} ms",
        dealer_rows.len(),
        phase_start.elapsed().as_secs_f64() * 1000.0
    );
    store.save_dealer_distributions(&dealer_rows)?;

    let phase_start = Instant::now();
    let states = solve_player_states(&deck, &dealer_rows)?;
    println!(
        "Player pass: {} states in {:.2} s",
        states.len(),
        phase_start.elapsed().as_secs_f64()
    );
    let records: Vec<HandRecord> = states.iter().map(SolvedState::to_record).collect();
    store.save_player_states(&records)?;

    let entries = build_strategy_table(&states);
    println!("Strategy table: {} rows", entries.len());
    store.save_strategy_table(&entries)?;

    Ok(SolveReport {
        dealer_rows: dealer_rows.len(),
        player_records: records.len(),
        strategy_entries: entries.len(),
        elapsed_secs: start_time.elapsed().as_secs_f64(),
    })
}
