//! [`Volume`]: the top-level handle wrapping a borrowed FAT image.
//!
//! Everything else in this crate is a free function taking borrowed bytes
//! plus a decoded [`BiosParameterBlock`]; `Volume` exists purely to carry
//! those two together and expose the handful of operations a caller
//! actually wants: what FAT type is this, what's in the root directory,
//! what does this path resolve to, what's in this file.
use crate::bpb::{BiosParameterBlock, FatType};
use crate::error::FatError;
use crate::fat::{self, FatEntry};
use crate::file;
use crate::path::{self, Entry};
use crate::walk::{self, DirEntryView, WalkControl};

/// A read-only view over a FAT volume image.
///
/// `Volume` borrows its bytes for `'a` and never copies them; every method
/// is a thin dispatch into [`crate::bpb`], [`crate::walk`], [`crate::path`],
/// or [`crate::file`].
pub struct Volume<'a> {
    bytes: &'a [u8],
    bpb: BiosParameterBlock,
}

impl<'a> Volume<'a> {
    /// Decodes the BPB out of the start of `bytes` and wraps the volume.
    ///
    /// `bytes` must contain the entire volume, boot sector through the end
    /// of the data region -- this is the one validation step that happens
    /// up front; every other operation trusts the geometry it derives.
    pub fn open(bytes: &'a [u8]) -> Result<Self, FatError> {
        let bpb = BiosParameterBlock::parse(bytes)?;
        Ok(Volume { bytes, bpb })
    }

    /// Which of FAT12/16/32 this volume is, determined purely from its
    /// data cluster count.
    pub fn fat_type(&self) -> FatType {
        self.bpb.fat_type()
    }

    /// Read-only access to the decoded BPB, for callers that want raw
    /// geometry (the inspection binary, mainly).
    pub fn bpb(&self) -> &BiosParameterBlock {
        &self.bpb
    }

    /// The root directory's entry: always a directory, always resolvable.
    pub fn root(&self) -> Entry {
        Entry::root()
    }

    /// Resolves an absolute path to the entry it names.
    ///
    /// See [`crate::path::resolve_path`] for the exact matching rules
    /// (case-sensitive, no relative paths, trailing-slash-means-directory).
    pub fn search_entry(&self, path: &str) -> Result<Entry, FatError> {
        path::resolve_path(self.bytes, &self.bpb, path)
    }

    /// Walks every live entry of `entry`'s directory, in on-disk order.
    ///
    /// Returns [`FatError::NotADirectory`] if `entry` isn't one.
    pub fn walk_directory(
        &self,
        entry: &Entry,
        on_entry: impl FnMut(DirEntryView) -> WalkControl,
    ) -> Result<(), FatError> {
        if !entry.is_directory() {
            return Err(FatError::NotADirectory);
        }
        walk::walk_directory(self.bytes, &self.bpb, entry.dir_source(&self.bpb), on_entry)
    }

    /// Convenience: resolve a directory path, then walk it.
    pub fn list_dir(
        &self,
        path: &str,
        on_entry: impl FnMut(DirEntryView) -> WalkControl,
    ) -> Result<(), FatError> {
        let entry = self.search_entry(path)?;
        self.walk_directory(&entry, on_entry)
    }

    /// Copies the full contents of `entry` into `out`. `out` must be at
    /// least `entry.file_size` bytes. Reading a directory entry this way
    /// simply copies zero bytes, since `DIR_FileSize` is always 0 for
    /// directories.
    pub fn read_whole_file(&self, entry: &Entry, out: &mut [u8]) -> Result<usize, FatError> {
        let first_cluster = match entry.location {
            crate::path::EntryLocation::Root => 0,
            crate::path::EntryLocation::Cluster(c) => c,
        };
        file::read_whole_file(self.bytes, &self.bpb, first_cluster, entry.file_size as usize, out)
    }

    /// Convenience: resolve a file path, then read it whole.
    pub fn read_file(&self, path: &str, out: &mut [u8]) -> Result<usize, FatError> {
        let entry = self.search_entry(path)?;
        if entry.is_directory() {
            return Err(FatError::NotADirectory);
        }
        self.read_whole_file(&entry, out)
    }

    /// A rough estimate of bytes in use on the volume: scans FAT entries for
    /// data clusters in order starting at cluster 2, and reports the byte
    /// offset of the first cluster whose FAT entry reads back as zero
    /// (unallocated). This is a "high water mark" for a volume whose
    /// clusters were handed out linearly, not a true free-space count -- a
    /// volume with a cluster freed and not reused earlier in the range will
    /// over-report. There is no directory walk involved: a deleted file's
    /// clusters are freed in the FAT itself regardless of what its
    /// directory entry still says, so the FAT is the only source of truth
    /// for which clusters are spoken for.
    pub fn used_bytes(&self) -> Result<u64, FatError> {
        let total_clusters = self.bpb.data_cluster_count() as u32;
        let mut cluster = 2u32;
        while cluster < total_clusters + 2 {
            if let FatEntry::Next(0) = fat::read_entry(self.bytes, &self.bpb, cluster) {
                return Ok(self.bpb.cluster_offset(cluster) as u64);
            }
            cluster += 1;
        }
        // Every data cluster is allocated.
        Ok(self.bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testimage::{fat16_image, fat32_image};

    #[test]
    fn opens_and_classifies_fat16() {
        let image = fat16_image();
        let volume = Volume::open(&image).unwrap();
        assert_eq!(volume.fat_type(), FatType::Fat16);
    }

    #[test]
    fn reads_a_file_end_to_end() {
        let image = fat16_image();
        let volume = Volume::open(&image).unwrap();
        let entry = volume.search_entry("/HELLO.TXT").unwrap();
        let mut out = [0u8; 32];
        let n = volume.read_whole_file(&entry, &mut out).unwrap();
        assert_eq!(&out[..n], b"hello fat16\n");
    }

    #[test]
    fn read_file_convenience_rejects_directories() {
        let image = fat16_image();
        let volume = Volume::open(&image).unwrap();
        let mut out = [0u8; 4];
        assert_eq!(
            volume.read_file("/SUBDIR", &mut out).unwrap_err(),
            FatError::NotADirectory
        );
    }

    #[test]
    fn lists_root_directory() {
        let image = fat32_image();
        let volume = Volume::open(&image).unwrap();
        let mut seen = 0;
        volume
            .list_dir("/", |_| {
                seen += 1;
                WalkControl::Continue
            })
            .unwrap();
        assert!(seen >= 2);
    }

    #[test]
    fn used_bytes_finds_first_free_cluster_fat16() {
        // fat16_image() allocates clusters 2..=6 and leaves cluster 7 free.
        let image = fat16_image();
        let volume = Volume::open(&image).unwrap();
        let expected = volume.bpb().cluster_offset(7) as u64;
        assert_eq!(volume.used_bytes().unwrap(), expected);
    }

    #[test]
    fn used_bytes_finds_first_free_cluster_fat32() {
        // fat32_image() allocates clusters 2..=7 and leaves cluster 8 free.
        let image = fat32_image();
        let volume = Volume::open(&image).unwrap();
        let expected = volume.bpb().cluster_offset(8) as u64;
        assert_eq!(volume.used_bytes().unwrap(), expected);
    }
}
