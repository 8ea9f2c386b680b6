//! Host-backed volume source: load a FAT image from disk into an owned
//! buffer.
//!
//! The core crate only ever borrows `&[u8]`; this module is the one place
//! that owns bytes, standing in for the teacher's `BlockDevice` trait
//! (`device.rs`) with a single upfront read rather than per-sector caching,
//! since there is no cluster-chain cache to feed here. No `memmap2` or
//! similar: nothing in the surrounding example pack uses a real mmap crate,
//! so a volume image is read into a `Vec<u8>` instead, which every
//! [`Volume`](crate::Volume) operation treats identically to a mapped
//! region -- it only ever sees a borrowed slice.
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::vec::Vec;

use thiserror::Error;

use crate::error::FatError;
use crate::Volume;

/// Errors specific to getting a volume image's bytes off disk, distinct
/// from [`FatError`], which covers the bytes themselves once read.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to read volume image: {0}")]
    Io(#[from] io::Error),
    #[error("volume image is invalid: {0}")]
    Fat(#[from] FatError),
}

/// A FAT volume image read fully into memory.
pub struct OwnedVolume {
    bytes: Vec<u8>,
}

impl OwnedVolume {
    /// Reads the whole file at `path` into memory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let mut file = File::open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        log::debug!("loaded volume image ({} bytes)", bytes.len());
        Ok(OwnedVolume { bytes })
    }

    /// Borrows a [`Volume`] over the loaded bytes.
    pub fn volume(&self) -> Result<Volume<'_>, FatError> {
        Volume::open(&self.bytes)
    }
}
