//! Directory walking: long-name reassembly plus the cluster-chain /
//! fixed-region iteration that visits every live entry in a directory.
//!
//! On-disk layout of one directory's entries (low address to high):
//! ```text
//! fileA_long_n
//! fileA_long_n-1
//! ...
//! fileA_long_1
//! fileA_short
//! fileB_short          (fileB has no long name)
//! ...
//! ```
//! Long entries always immediately precede, and are contiguous with, the
//! short entry they alias, stored in descending ordinal order (the entry
//! carrying the highest sequence number -- and the [`crate::LAST_LONG_ENTRY`]
//! bit -- comes first on disk).
use crate::bpb::BiosParameterBlock;
use crate::entry::{shortname_checksum, LongDirEntry, ShortDirEntry};
use crate::error::FatError;
use crate::fat::{self, FatEntry};
use crate::{is_valid_filename_byte, DIRENT_SIZE};

/// Maximum long name length this crate will reassemble, in bytes. 20 long
/// entries (13 UTF-16 units each) comfortably covers the 255-character
/// ceiling the FAT specification itself imposes on long names.
pub const MAX_NAME_LEN: usize = 255;

/// Tell [`walk_directory`] whether to keep visiting entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    Stop,
}

/// Where a directory's entries live on the volume.
#[derive(Debug, Clone, Copy)]
pub enum DirSource {
    /// FAT12/16 root directory: a flat run of entries outside any cluster
    /// chain, `entry_count` slots starting at byte `offset`.
    Fixed { offset: usize, entry_count: usize },
    /// Any other directory (including the FAT32 root): an ordinary cluster
    /// chain starting at `start_cluster`.
    Chain { start_cluster: u32 },
}

/// One live, fully decoded directory entry handed to a [`walk_directory`]
/// callback. `name` and `short_name` both borrow caller-owned scratch
/// buffers for the duration of the callback only.
pub struct DirEntryView<'a> {
    /// The long name if one was reassembled, otherwise the same as
    /// `short_name`. This is the name to display.
    pub name: &'a str,
    /// The decoded 8.3 name, always present regardless of whether a long
    /// name was also reassembled.
    pub short_name: &'a str,
    /// Whether `name` came from a reassembled long-name chain rather than
    /// being a copy of `short_name`. A path resolver needs this explicitly
    /// -- `name == short_name` can happen even when a long name really was
    /// present (a plain uppercase long name over a short entry with no
    /// NT_Res case bits set reassembles identically to the short name) --
    /// see [`crate::path::resolve_path`].
    pub has_long_name: bool,
    pub attr: u8,
    pub first_cluster: u32,
    pub file_size: u32,
}

/// Accumulates a long-name chain across consecutive long-entry slots.
/// Reset whenever the chain breaks: an out-of-sequence ordinal, a checksum
/// that stops matching, or a non-ASCII / disallowed byte.
struct LongNameAccumulator {
    buf: [u8; MAX_NAME_LEN],
    len: usize,
    checksum: u8,
    expected_seq: u8,
    valid: bool,
    active: bool,
}

impl LongNameAccumulator {
    fn new() -> Self {
        LongNameAccumulator {
            buf: [0; MAX_NAME_LEN],
            len: 0,
            checksum: 0,
            expected_seq: 0,
            valid: false,
            active: false,
        }
    }

    fn reset(&mut self) {
        self.active = false;
        self.valid = false;
        self.len = 0;
    }

    /// Folds one long-entry slot into the accumulator. Slots arrive in
    /// descending sequence order (highest first), each carrying a 13-unit
    /// chunk placed at `(sequence_number - 1) * 13`.
    fn feed(&mut self, long: LongDirEntry) {
        let seq = long.sequence_number();
        if seq == 0 {
            self.reset();
            return;
        }

        if long.is_last_logical_entry() {
            self.reset();
            self.active = true;
            self.valid = true;
            self.checksum = long.checksum();
            self.expected_seq = seq;
        } else if !self.active || seq != self.expected_seq.wrapping_sub(1) || long.checksum() != self.checksum {
            // Out-of-sequence or orphaned continuation: the whole chain is
            // suspect, discard it. The short entry will still decode fine
            // from its own short name.
            self.reset();
            return;
        } else {
            self.expected_seq = seq;
        }

        let mut units = [0u16; 13];
        long.name_units(&mut units);
        let base = (seq as usize - 1) * 13;
        for (i, &unit) in units.iter().enumerate() {
            let pos = base + i;
            if unit == 0x0000 {
                break;
            }
            if unit == 0xFFFF || unit > 0x7F || pos >= MAX_NAME_LEN {
                self.valid = false;
                continue;
            }
            let byte = unit as u8;
            if !is_valid_filename_byte(byte) {
                self.valid = false;
                continue;
            }
            if pos >= self.len {
                self.len = pos + 1;
            }
            self.buf[pos] = byte;
        }
    }

    /// Returns the reassembled name if the chain is both complete and
    /// checksum-bound to `short`, `None` otherwise (caller falls back to
    /// the short name).
    fn take(&mut self, short: &ShortDirEntry) -> Option<&str> {
        let ok = self.active
            && self.valid
            && self.expected_seq == 1
            && self.checksum == shortname_checksum(short.raw_name11());
        self.active = false;
        if ok {
            core::str::from_utf8(&self.buf[..self.len]).ok()
        } else {
            None
        }
    }
}

/// Walks every live entry of a directory, calling `on_entry` for each one
/// until it returns [`WalkControl::Stop`] or the directory is exhausted.
///
/// Deleted slots (`DIR_Name[0] == 0xE5`), the volume label entry, and `.`/
/// `..` are all skipped silently by design: a path resolver has no use for
/// them, and a directory listing that wants them can be built as a thin
/// wrapper that doesn't filter. Filtering `.`/`..` here, rather than leaving
/// it to every caller, matters beyond convenience: `.` is a directory entry
/// that points back at the cluster currently being walked, so a caller that
/// recurses into every `ATTR_DIRECTORY` entry it sees (a naive recursive
/// tree size, for instance) would recurse into the same cluster forever if
/// this walker ever delivered it.
///
/// Walking a [`DirSource::Chain`] is capped at [`fat::max_chain_length`]
/// clusters and aborts with [`FatError::BrokenClusterChain`] if that bound
/// is exceeded or if a cluster number repeats -- a self-referential or
/// looping FAT is corruption, not an unusually large directory.
pub fn walk_directory(
    bytes: &[u8],
    bpb: &BiosParameterBlock,
    source: DirSource,
    mut on_entry: impl FnMut(DirEntryView) -> WalkControl,
) -> Result<(), FatError> {
    let mut acc = LongNameAccumulator::new();

    match source {
        DirSource::Fixed { offset, entry_count } => {
            for i in 0..entry_count {
                let slot_off = offset + i * DIRENT_SIZE;
                if slot_off + DIRENT_SIZE > bytes.len() {
                    return Err(FatError::OutOfBounds);
                }
                if visit_slot(&bytes[slot_off..slot_off + DIRENT_SIZE], &mut acc, &mut on_entry)?
                    == WalkControl::Stop
                {
                    return Ok(());
                }
            }
            Ok(())
        }
        DirSource::Chain { start_cluster } => {
            let cap = fat::max_chain_length(bpb);
            let mut cluster = start_cluster;
            let mut visited = 0usize;
            let mut prev = [0u32; 2]; // cheap cycle guard for the common case
            loop {
                if visited >= cap {
                    return Err(FatError::BrokenClusterChain);
                }
                if prev[0] == cluster || prev[1] == cluster {
                    return Err(FatError::BrokenClusterChain);
                }
                prev[1] = prev[0];
                prev[0] = cluster;
                visited += 1;

                let cluster_off = bpb.cluster_offset(cluster);
                let slots = bpb.cluster_size() / DIRENT_SIZE;
                for i in 0..slots {
                    let slot_off = cluster_off + i * DIRENT_SIZE;
                    if slot_off + DIRENT_SIZE > bytes.len() {
                        return Err(FatError::OutOfBounds);
                    }
                    let slot = &bytes[slot_off..slot_off + DIRENT_SIZE];
                    if ShortDirEntry::new(slot).is_end_of_directory() {
                        return Ok(());
                    }
                    if visit_slot(slot, &mut acc, &mut on_entry)? == WalkControl::Stop {
                        return Ok(());
                    }
                }

                match fat::read_entry(bytes, bpb, cluster) {
                    FatEntry::Next(next) => cluster = next,
                    FatEntry::EndOfChain => return Ok(()),
                    FatEntry::Bad => return Err(FatError::BadCluster),
                }
            }
        }
    }
}

/// Processes one 32-byte slot: feeds long-name accumulation, or decodes and
/// reports a short entry. Returns `Stop` early only when `on_entry` does;
/// an end-of-directory marker is the caller's responsibility to detect
/// (fixed regions rely on `entry_count` instead, since there's no "next
/// cluster" to stop early from).
fn visit_slot(
    slot: &[u8],
    acc: &mut LongNameAccumulator,
    on_entry: &mut impl FnMut(DirEntryView) -> WalkControl,
) -> Result<WalkControl, FatError> {
    let short = ShortDirEntry::new(slot);

    if short.is_end_of_directory() {
        return Ok(WalkControl::Stop);
    }
    if short.is_free() {
        acc.reset();
        return Ok(WalkControl::Continue);
    }
    if short.is_long_name_slot() {
        acc.feed(LongDirEntry::new(slot));
        return Ok(WalkControl::Continue);
    }
    if short.is_volume_id() {
        acc.reset();
        return Ok(WalkControl::Continue);
    }

    let long_name = acc.take(&short);
    let mut short_buf = [0u8; 12];
    let n = short.short_name(&mut short_buf);
    // The whitelist is ASCII-only, so this is always valid UTF-8.
    let short_name = core::str::from_utf8(&short_buf[..n]).map_err(|_| FatError::OutOfBounds)?;
    if short_name == "." || short_name == ".." {
        return Ok(WalkControl::Continue);
    }
    let has_long_name = long_name.is_some();
    let name = long_name.unwrap_or(short_name);
    let control = on_entry(DirEntryView {
        name,
        short_name,
        has_long_name,
        attr: short.attr(),
        first_cluster: short.first_cluster(),
        file_size: short.file_size(),
    });
    Ok(control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bpb::BiosParameterBlock;
    use crate::testimage::{fat16_image, fat32_image};
    use std::vec::Vec;

    fn collect_names(bytes: &[u8], bpb: &BiosParameterBlock, source: DirSource) -> Vec<std::string::String> {
        let mut names = Vec::new();
        walk_directory(bytes, bpb, source, |e| {
            names.push(std::string::String::from(e.name));
            WalkControl::Continue
        })
        .unwrap();
        names
    }

    #[test]
    fn fat16_root_lists_expected_entries() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        let names = collect_names(
            &image,
            &bpb,
            DirSource::Fixed {
                offset: bpb.root_dir_offset(),
                entry_count: bpb.root_entry_count(),
            },
        );
        assert!(names.contains(&"HELLO.TXT".into()));
        assert!(names.contains(&"SUBDIR".into()));
        assert!(names.contains(&"long-name-file.txt".into()));
        // the checksum-mismatch chain falls back to its short alias
        assert!(names.contains(&"BADSUM~1.TXT".into()));
        assert!(!names.iter().any(|n| n == "checksum-mismatch.txt"));
        // a live entry immediately after a deleted slot is still reached
        assert!(names.contains(&"TRAILING.TXT".into()));
    }

    #[test]
    fn fat32_root_is_a_multi_cluster_chain() {
        let image = fat32_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        let names = collect_names(
            &image,
            &bpb,
            DirSource::Chain {
                start_cluster: bpb.root_cluster(),
            },
        );
        assert!(names.contains(&"HELLO.TXT".into()));
        assert!(names.contains(&"SUBDIR".into()));
    }

    #[test]
    fn detects_cluster_chain_cycle() {
        let mut image = fat32_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        let fat_start = bpb.fat_offset(0);
        // Point cluster 4 back at cluster 2: 2 -> 3 -> 4 -> 2 -> ...
        image[fat_start + 4 * 4..fat_start + 4 * 4 + 4].copy_from_slice(&2u32.to_le_bytes());
        let err = walk_directory(
            &image,
            &bpb,
            DirSource::Chain {
                start_cluster: bpb.root_cluster(),
            },
            |_| WalkControl::Continue,
        )
        .unwrap_err();
        assert_eq!(err, FatError::BrokenClusterChain);
    }
}
