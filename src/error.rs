//! Error type returned by the fallible operations of this crate.
//!
//! `no_std` rules out `thiserror`'s derive, so [`FatError`] gets a hand
//! written [`core::fmt::Display`] and [`core::error::Error`] impl, the way
//! the host-side pieces of this crate use `thiserror` only once `std` is
//! available.

use core::fmt;

/// Everything that can go wrong resolving a path, walking a directory, or
/// reading a file's contents.
///
/// This does not cover malformed BPB fields; a volume whose BPB fails its
/// own sanity checks is rejected at construction time by
/// [`crate::bpb::BiosParameterBlock::parse`], which returns this same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatError {
    /// No entry exists at the given path.
    NotFound,
    /// A path component that is not the last one named a file, not a
    /// directory.
    NotADirectory,
    /// The volume's BPB failed a sanity check (bad signature, zero bytes per
    /// sector, FAT12 declared where FAT16/32 geometry is required, etc).
    InvalidBpb,
    /// A cluster chain ran into a value outside the valid data-cluster range
    /// without ever hitting an end-of-chain marker, or exceeded the
    /// iteration cap derived from the volume's own cluster count.
    BrokenClusterChain,
    /// A FAT entry reads back as the reserved "bad cluster" sentinel.
    BadCluster,
    /// The byte slice backing the volume is too small to hold the region
    /// being addressed (truncated image, corrupt geometry).
    OutOfBounds,
}

impl fmt::Display for FatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FatError::NotFound => "no such file or directory",
            FatError::NotADirectory => "not a directory",
            FatError::InvalidBpb => "invalid BIOS parameter block",
            FatError::BrokenClusterChain => "cluster chain is broken or too long",
            FatError::BadCluster => "cluster marked bad",
            FatError::OutOfBounds => "volume image is too small for its own geometry",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for FatError {}
