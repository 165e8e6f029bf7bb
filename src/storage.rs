//! Binary I/O for solver outputs.
//!
//! Three files under one base directory, each with a 16-byte header
//! (magic + version + entry count) followed by packed fixed-size records:
//!
//! | file                      | magic  | record                        |
//! |---------------------------|--------|-------------------------------|
//! | `dealer_distributions.bin`| "BJDL" | up-card + 8 × f64 buckets     |
//! | `player_states.bin`       | "BJPS" | canonical hand record         |
//! | `strategy_table.bin`      | "BJST" | (total, soft, up-card) row    |
//!
//! The schema is fixed: the same record layout regardless of deck count or
//! missing cards. Loading the strategy table goes through a zero-copy
//! memory map via `memmap2`, with packed fields read via `read_unaligned`.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use memmap2::Mmap;

use crate::constants::*;
use crate::types::{
    Action, Card, HandRecord, OutcomeDistribution, Result, SolverError, StrategyEntry,
};

/// Where a solve run persists its outputs.
///
/// The solve pipeline only talks to this trait; [`BinaryStore`] is the
/// on-disk implementation, and tests substitute in-memory stores.
pub trait SolverStore {
    fn save_dealer_distributions(&self, rows: &[(Card, OutcomeDistribution)]) -> Result<()>;
    fn save_player_states(&self, records: &[HandRecord]) -> Result<()>;
    fn save_strategy_table(&self, entries: &[StrategyEntry]) -> Result<()>;
    fn fetch_strategy_table(&self) -> Result<Vec<StrategyEntry>>;
}

const DEALER_MAGIC: u32 = 0x4C444A42; // "BJDL"
const PLAYER_MAGIC: u32 = 0x53504A42; // "BJPS"
const STRATEGY_MAGIC: u32 = 0x54534A42; // "BJST"
const FILE_VERSION: u32 = 1;

/// Common header for all three binary files.
#[repr(C)]
struct TableFileHeader {
    magic: u32,
    version: u32,
    num_entries: u64,
}

#[repr(C, packed)]
struct DealerFileRecord {
    up_card: u8,
    probs: [f64; NUM_OUTCOMES],
}

#[repr(C, packed)]
struct PlayerFileRecord {
    card_counts: [u8; NUM_CARD_VALUES],
    total: u8,
    minimum_total: u8,
    is_blackjack: u8,
    is_starthand: u8,
    is_busted: u8,
    can_double: u8,
    can_split: u8,
    dealer_up_card: u8,
    action: u8,
    frequency: u64,
    win_prob: f64,
    loss_prob: f64,
    draw_prob: f64,
    ev: f64,
}

#[repr(C, packed)]
struct StrategyFileRecord {
    player_total: u8,
    is_soft: u8,
    dealer_up_card: u8,
    action: u8,
    win_prob: f64,
    loss_prob: f64,
    draw_prob: f64,
    ev: f64,
}

/// On-disk store rooted at a base directory.
pub struct BinaryStore {
    base: PathBuf,
}

impl BinaryStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        BinaryStore { base: base.into() }
    }

    pub fn dealer_path(&self) -> PathBuf {
        self.base.join("dealer_distributions.bin")
    }

    pub fn player_path(&self) -> PathBuf {
        self.base.join("player_states.bin")
    }

    pub fn strategy_path(&self) -> PathBuf {
        self.base.join("strategy_table.bin")
    }

    /// Human-readable export of the strategy table next to the binary file.
    pub fn export_strategy_json(&self, entries: &[StrategyEntry]) -> Result<PathBuf> {
        let path = self.base.join("strategy_table.json");
        ensure_parent(&path)?;
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| SolverError::MalformedTable(e.to_string()))?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// JSON mirror of the dealer distributions, keyed by bucket name.
    fn write_dealer_json(&self, rows: &[(Card, OutcomeDistribution)]) -> Result<()> {
        let mirror: Vec<serde_json::Value> = rows
            .iter()
            .map(|&(up_card, dist)| {
                let buckets: serde_json::Map<String, serde_json::Value> = OUTCOME_NAMES
                    .iter()
                    .zip(dist.probs.iter())
                    .map(|(name, &p)| (name.to_string(), p.into()))
                    .collect();
                serde_json::json!({ "up_card": up_card, "outcomes": buckets })
            })
            .collect();
        let json = serde_json::to_string_pretty(&mirror)
            .map_err(|e| SolverError::MalformedTable(e.to_string()))?;
        fs::write(self.base.join("dealer_distributions.json"), json)?;
        Ok(())
    }

    fn write_table<R>(&self, path: &Path, magic: u32, records: &[R]) -> Result<()> {
        let start_time = Instant::now();
        ensure_parent(path)?;
        let mut f = File::create(path)?;

        let header = TableFileHeader {
            magic,
            version: FILE_VERSION,
            num_entries: records.len() as u64,
        };
        f.write_all(struct_bytes(&header))?;
        for record in records {
            f.write_all(struct_bytes(record))?;
        }

        let elapsed = start_time.elapsed().as_secs_f64() * 1000.0;
        println!(
            "Saved {} entries to {} in {:.2} ms",
            records.len(),
            path.display(),
            elapsed
        );
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn struct_bytes<T>(value: &T) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(value as *const T as *const u8, std::mem::size_of::<T>())
    }
}

/// Validate a mapped file's header and length against its record size.
fn check_header(mmap: &Mmap, path: &Path, magic: u32, record_size: usize) -> Result<u64> {
    let header_size = std::mem::size_of::<TableFileHeader>();
    if mmap.len() < header_size {
        return Err(SolverError::MalformedTable(format!(
            "{}: file shorter than the header",
            path.display()
        )));
    }
    let header = unsafe { &*(mmap.as_ptr() as *const TableFileHeader) };
    if header.magic != magic || header.version != FILE_VERSION {
        return Err(SolverError::MalformedTable(format!(
            "{}: bad header (magic=0x{:08x} version={})",
            path.display(),
            header.magic,
            header.version
        )));
    }
    let expected = header_size + header.num_entries as usize * record_size;
    if mmap.len() != expected {
        return Err(SolverError::MalformedTable(format!(
            "{}: size mismatch, expected {} got {}",
            path.display(),
            expected,
            mmap.len()
        )));
    }
    Ok(header.num_entries)
}

impl SolverStore for BinaryStore {
    fn save_dealer_distributions(&self, rows: &[(Card, OutcomeDistribution)]) -> Result<()> {
        let records: Vec<DealerFileRecord> = rows
            .iter()
            .map(|&(up_card, dist)| DealerFileRecord {
                up_card,
                probs: dist.probs,
            })
            .collect();
        self.write_table(&self.dealer_path(), DEALER_MAGIC, &records)?;
        self.write_dealer_json(rows)
    }

    fn save_player_states(&self, records: &[HandRecord]) -> Result<()> {
        let file_records: Vec<PlayerFileRecord> = records
            .iter()
            .map(|r| PlayerFileRecord {
                card_counts: r.card_counts,
                total: r.total,
                minimum_total: r.minimum_total,
                is_blackjack: r.is_blackjack as u8,
                is_starthand: r.is_starthand as u8,
                is_busted: r.is_busted as u8,
                can_double: r.can_double as u8,
                can_split: r.can_split as u8,
                dealer_up_card: r.dealer_up_card,
                action: r.action.as_u8(),
                frequency: r.frequency,
                win_prob: r.win_prob,
                loss_prob: r.loss_prob,
                draw_prob: r.draw_prob,
                ev: r.ev,
            })
            .collect();
        self.write_table(&self.player_path(), PLAYER_MAGIC, &file_records)
    }

    fn save_strategy_table(&self, entries: &[StrategyEntry]) -> Result<()> {
        let records: Vec<StrategyFileRecord> = entries
            .iter()
            .map(|e| StrategyFileRecord {
                player_total: e.player_total,
                is_soft: e.is_soft as u8,
                dealer_up_card: e.dealer_up_card,
                action: e.action.as_u8(),
                win_prob: e.win_prob,
                loss_prob: e.loss_prob,
                draw_prob: e.draw_prob,
                ev: e.ev,
            })
            .collect();
        self.write_table(&self.strategy_path(), STRATEGY_MAGIC, &records)
    }

    fn fetch_strategy_table(&self) -> Result<Vec<StrategyEntry>> {
        let path = self.strategy_path();
        let file = File::open(&path)?;
        let mmap = unsafe { Mmap::map(&file) }?;

        let record_size = std::mem::size_of::<StrategyFileRecord>();
        let num_entries = check_header(&mmap, &path, STRATEGY_MAGIC, record_size)?;

        let base_ptr = unsafe { mmap.as_ptr().add(std::mem::size_of::<TableFileHeader>()) };
        let mut entries = Vec::with_capacity(num_entries as usize);
        for i in 0..num_entries as usize {
            let record_ptr = unsafe { base_ptr.add(i * record_size) as *const StrategyFileRecord };
            // Packed records are read field-wise via read_unaligned.
            let player_total =
                unsafe { std::ptr::addr_of!((*record_ptr).player_total).read_unaligned() };
            let is_soft = unsafe { std::ptr::addr_of!((*record_ptr).is_soft).read_unaligned() };
            let dealer_up_card =
                unsafe { std::ptr::addr_of!((*record_ptr).dealer_up_card).read_unaligned() };
            let action = unsafe { std::ptr::addr_of!((*record_ptr).action).read_unaligned() };
            let win_prob = unsafe { std::ptr::addr_of!((*record_ptr).win_prob).read_unaligned() };
            let loss_prob =
                unsafe { std::ptr::addr_of!((*record_ptr).loss_prob).read_unaligned() };
            let draw_prob =
                unsafe { std::ptr::addr_of!((*record_ptr).draw_prob).read_unaligned() };
            let ev = unsafe { std::ptr::addr_of!((*record_ptr).ev).read_unaligned() };

            entries.push(StrategyEntry {
                player_total,
                is_soft: is_soft != 0,
                dealer_up_card,
                action: Action::from_u8(action)?,
                win_prob,
                loss_prob,
                draw_prob,
                ev,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> BinaryStore {
        let dir = std::env::temp_dir().join(format!("blackjack_storage_{tag}_{}", std::process::id()));
        BinaryStore::new(dir)
    }

    fn sample_entries() -> Vec<StrategyEntry> {
        vec![
            StrategyEntry {
                player_total: 16,
                is_soft: false,
                dealer_up_card: 10,
                action: Action::Hit,
                win_prob: 0.23,
                loss_prob: 0.69,
                draw_prob: 0.08,
                ev: -0.46,
            },
            StrategyEntry {
                player_total: 18,
                is_soft: true,
                dealer_up_card: 6,
                action: Action::Double,
                win_prob: 0.54,
                loss_prob: 0.36,
                draw_prob: 0.10,
                ev: 0.36,
            },
        ]
    }

    #[test]
    fn test_strategy_table_round_trip() {
        let store = temp_store("strategy");
        let entries = sample_entries();
        store.save_strategy_table(&entries).unwrap();
        let loaded = store.fetch_strategy_table().unwrap();
        assert_eq!(loaded, entries);
        let _ = fs::remove_dir_all(store.base);
    }

    #[test]
    fn test_fetch_missing_file_is_a_storage_error() {
        let store = BinaryStore::new("/tmp/blackjack_storage_missing_dir_xyz");
        assert!(matches!(
            store.fetch_strategy_table(),
            Err(SolverError::Storage(_))
        ));
    }

    #[test]
    fn test_fetch_rejects_corrupt_header() {
        let store = temp_store("corrupt");
        ensure_parent(&store.strategy_path()).unwrap();
        fs::write(store.strategy_path(), b"not a table file, far too short to matter").unwrap();
        assert!(matches!(
            store.fetch_strategy_table(),
            Err(SolverError::MalformedTable(_))
        ));
        let _ = fs::remove_dir_all(store.base);
    }

    #[test]
    fn test_dealer_and_player_files_are_written() {
        let store = temp_store("dealer_player");
        let dist = OutcomeDistribution::singleton(OUTCOME_BUST);
        store.save_dealer_distributions(&[(6, dist)]).unwrap();
        let mirror = fs::read_to_string(store.base.join("dealer_distributions.json")).unwrap();
        assert!(mirror.contains("\"Bust\": 1.0"));

        let record = HandRecord {
            card_counts: {
                let mut c = [0u8; NUM_CARD_VALUES];
                c[7] = 2;
                c
            },
            total: 16,
            minimum_total: 16,
            is_blackjack: false,
            is_starthand: true,
            is_busted: false,
            can_double: true,
            can_split: true,
            frequency: 6,
            dealer_up_card: 10,
            action: Action::Hit,
            win_prob: 0.2,
            loss_prob: 0.7,
            draw_prob: 0.1,
            ev: -0.5,
        };
        store.save_player_states(&[record]).unwrap();

        let header = std::mem::size_of::<TableFileHeader>();
        let dealer_len = fs::metadata(store.dealer_path()).unwrap().len() as usize;
        assert_eq!(header + std::mem::size_of::<DealerFileRecord>(), dealer_len);
        let player_len = fs::metadata(store.player_path()).unwrap().len() as usize;
        assert_eq!(header + std::mem::size_of::<PlayerFileRecord>(), player_len);
        let _ = fs::remove_dir_all(store.base);
    }

    #[test]
    fn test_json_export() {
        let store = temp_store("json");
        let path = store.export_strategy_json(&sample_entries()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"player_total\": 16"));
        assert!(text.contains("\"Double\""));
        let _ = fs::remove_dir_all(store.base);
    }
}
