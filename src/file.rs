//! Whole-file reads: copy a file's bytes out of its cluster chain into a
//! caller-owned buffer.
//!
//! Like the rest of this crate, there is no write path: a FAT directory or
//! file is always a cluster chain whose length is implied by `DIR_FileSize`
//! (for files) or by the chain itself running to an end-of-chain marker
//! (for directories), and this module only ever copies bytes out.
use crate::bpb::BiosParameterBlock;
use crate::error::FatError;
use crate::fat::{self, FatEntry};

/// Copies the full contents of a file into `out`.
///
/// `out` must be at least `file_size` bytes; `first_cluster == 0` is a
/// zero-length file (nothing is copied, `Ok(0)` is returned) per the FAT
/// specification's rule that an empty file has no cluster allocated to it
/// at all.
///
/// The number of clusters visited is capped at
/// `ceil(file_size / cluster_size)` plus one: a chain that runs longer than
/// that before reaching end-of-chain, or that repeats a cluster number, is
/// corruption, not a legitimately larger file, and is reported as
/// [`FatError::BrokenClusterChain`] rather than silently truncated or read
/// past `out`'s bound.
pub fn read_whole_file(
    bytes: &[u8],
    bpb: &BiosParameterBlock,
    first_cluster: u32,
    file_size: usize,
    out: &mut [u8],
) -> Result<usize, FatError> {
    if file_size == 0 || first_cluster == 0 {
        return Ok(0);
    }
    if out.len() < file_size {
        return Err(FatError::OutOfBounds);
    }

    let cluster_size = bpb.cluster_size();
    let expected_clusters = (file_size + cluster_size - 1) / cluster_size;
    let cap = expected_clusters + 1;

    let mut cluster = first_cluster;
    let mut written = 0usize;
    let mut visited = 0usize;
    let mut prev = [0u32; 2];

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

        let remaining = file_size - written;
        let take = remaining.min(cluster_size);
        let src_off = bpb.cluster_offset(cluster);
        if src_off + take > bytes.len() {
            return Err(FatError::OutOfBounds);
        }
        out[written..written + take].copy_from_slice(&bytes[src_off..src_off + take]);
        written += take;

        if written == file_size {
            return Ok(written);
        }

        match fat::read_entry(bytes, bpb, cluster) {
            FatEntry::Next(next) => cluster = next,
            FatEntry::EndOfChain => return Err(FatError::BrokenClusterChain),
            FatEntry::Bad => return Err(FatError::BadCluster),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bpb::BiosParameterBlock;
    use crate::path::{resolve_path, EntryLocation};
    use crate::testimage::{fat16_image, fat32_image};

    #[test]
    fn reads_a_small_top_level_file() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        let entry = resolve_path(&image, &bpb, "/HELLO.TXT").unwrap();
        let EntryLocation::Cluster(cluster) = entry.location else {
            panic!("expected a cluster")
        };
        let mut out = [0u8; 32];
        let n = read_whole_file(&image, &bpb, cluster, entry.file_size as usize, &mut out).unwrap();
        assert_eq!(&out[..n], b"hello fat16\n");
    }

    #[test]
    fn reads_a_nested_file_on_fat32() {
        let image = fat32_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        let entry = resolve_path(&image, &bpb, "/SUBDIR/NESTED.BIN").unwrap();
        let EntryLocation::Cluster(cluster) = entry.location else {
            panic!("expected a cluster")
        };
        let mut out = [0u8; 32];
        let n = read_whole_file(&image, &bpb, cluster, entry.file_size as usize, &mut out).unwrap();
        assert_eq!(&out[..n], b"nested data\n");
    }

    #[test]
    fn zero_length_file_reads_nothing() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        let mut out = [0u8; 4];
        let n = read_whole_file(&image, &bpb, 0, 0, &mut out).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn undersized_buffer_is_rejected() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        let entry = resolve_path(&image, &bpb, "/HELLO.TXT").unwrap();
        let EntryLocation::Cluster(cluster) = entry.location else {
            panic!("expected a cluster")
        };
        let mut out = [0u8; 2];
        assert_eq!(
            read_whole_file(&image, &bpb, cluster, entry.file_size as usize, &mut out).unwrap_err(),
            FatError::OutOfBounds
        );
    }
}
