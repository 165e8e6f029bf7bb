//! Game constants and outcome-bucket indexing.
//!
//! Card values are 1..=10. Value 1 is the Ace; value 10 aggregates the
//! 10/Jack/Queen/King ranks, so a single 52-card deck holds 16 tens and
//! 4 of every other value.
//!
//! Terminal outcomes live in a fixed 8-slot bucket array shared by the
//! dealer distribution and the player one-card lookahead:
//!
//! | Index | Bucket |
//! |-------|--------|
//! | 0     | 16 or less (player lookahead only; always 0 for the dealer) |
//! | 1..=5 | exact totals 17..=21 |
//! | 6     | Blackjack (two-card 21) |
//! | 7     | Bust (over 21) |

/// Number of distinct card values (1..=10).
pub const NUM_CARD_VALUES: usize = 10;

/// Cards in a single deck: 4 × 9 low values + 16 tens.
pub const CARDS_PER_DECK: u32 = 52;

/// Copies of each value 1..=9 per deck.
pub const LOW_CARD_COPIES: u16 = 4;

/// Copies of value 10 per deck (10, Jack, Queen, King).
pub const TEN_CARD_COPIES: u16 = 16;

/// The dealer stands on any total of 17 or more (soft 17 included).
pub const DEALER_STAND_TOTAL: u32 = 17;

/// The target total; anything above is a bust.
pub const BLACKJACK_TOTAL: u32 = 21;

/// Net payout for a natural blackjack win (3:2).
pub const BLACKJACK_PAYOUT: f64 = 1.5;

/// Number of outcome buckets.
pub const NUM_OUTCOMES: usize = 8;

/// Bucket index: total 16 or less after one more card.
pub const OUTCOME_SIXTEEN_OR_LESS: usize = 0;
/// Bucket index for exact total 17. Totals 18..=21 follow contiguously.
pub const OUTCOME_SEVENTEEN: usize = 1;
/// Bucket index: two-card 21.
pub const OUTCOME_BLACKJACK: usize = 6;
/// Bucket index: total over 21.
pub const OUTCOME_BUST: usize = 7;

/// Human-readable bucket names, in index order.
pub const OUTCOME_NAMES: [&str; NUM_OUTCOMES] = [
    "<=16", "17", "18", "19", "20", "21", "Blackjack", "Bust",
];

/// Bucket index for a standing total. `is_natural` marks a two-card 21.
///
/// Totals below 17 map to the `<=16` bucket; only the player's one-card
/// lookahead ever produces that bucket (the dealer never stands below 17).
#[inline(always)]
pub fn standing_outcome(total: u32, is_natural: bool) -> usize {
    if total > BLACKJACK_TOTAL {
        OUTCOME_BUST
    } else if is_natural {
        OUTCOME_BLACKJACK
    } else if total >= DEALER_STAND_TOTAL {
        OUTCOME_SEVENTEEN + (total - DEALER_STAND_TOTAL) as usize
    } else {
        OUTCOME_SIXTEEN_OR_LESS
    }
}

/// Numeric total for a bucket in 17..=21, or None for the non-numeric buckets.
#[inline(always)]
pub fn outcome_total(bucket: usize) -> Option<u32> {
    if (OUTCOME_SEVENTEEN..OUTCOME_BLACKJACK).contains(&bucket) {
        Some(DEALER_STAND_TOTAL + (bucket - OUTCOME_SEVENTEEN) as u32)
    } else {
        None
    }
}
