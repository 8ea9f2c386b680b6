//! Read-only FAT12/16/32 directory and file access over a memory-mapped
//! volume image.
//!
//! A [`Volume`] borrows the raw bytes of a FAT image (BPB, reserved sectors,
//! FATs, and data region all contiguous, exactly as they sit on a block
//! device) and answers the five questions a caller needs of a filesystem:
//! what FAT width is this, where's the root directory, what entry does this
//! path resolve to, what are this file's bytes, and what's in this
//! directory. There is no write path, no cluster-chain cache, and no
//! allocation anywhere in this crate: every operation is a pure function of
//! the borrowed bytes plus caller-owned scratch space.
//!
//! FAT12 is deliberately unsupported: [`FatType::Fat12`] is only ever
//! reported by [`BiosParameterBlock::fat_type`] for classification purposes;
//! every other entry point that reads an actual directory or FAT table
//! treats a FAT12 volume as a programming error (panics), not a recoverable
//! [`FatError`].
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod bpb;
pub mod entry;
pub mod error;
pub mod fat;
pub mod file;
pub mod path;
pub mod volume;
pub mod walk;

#[cfg(feature = "std")]
pub mod host;

pub use bpb::{BiosParameterBlock, FatType};
pub use entry::{LongDirEntry, ShortDirEntry};
pub use error::FatError;
pub use volume::Volume;
pub use walk::WalkControl;

/// Size in bytes of any directory entry slot, short or long.
pub const DIRENT_SIZE: usize = 32;

// Attribute bits, `DIR_Attr`.
pub const ATTR_READ_ONLY: u8 = 0x01;
pub const ATTR_HIDDEN: u8 = 0x02;
pub const ATTR_SYSTEM: u8 = 0x04;
pub const ATTR_VOLUME_ID: u8 = 0x08;
pub const ATTR_DIRECTORY: u8 = 0x10;
pub const ATTR_ARCHIVE: u8 = 0x20;
/// A long-name slot masquerades as a file with all four of these bits set;
/// no real short entry ever has this exact combination.
pub const ATTR_LONG_NAME: u8 = ATTR_READ_ONLY | ATTR_HIDDEN | ATTR_SYSTEM | ATTR_VOLUME_ID;

/// `DIR_NTRes` bit indicating the basename is stored upper-case on disk but
/// should be presented lower-case.
pub const NT_RES_NAME_LOWER: u8 = 0x08;
/// `DIR_NTRes` bit, same idea for the extension.
pub const NT_RES_EXT_LOWER: u8 = 0x10;

/// `DIR_Name[0]`: no further entries in this directory.
pub const DIR_ENTRY_LAST_AND_UNUSED: u8 = 0x00;
/// `DIR_Name[0]`: this slot is free (deleted).
pub const DIR_ENTRY_UNUSED: u8 = 0xE5;
/// `LDIR_Ord` bit marking the highest-ordinal ("first written", since slots
/// are stored in descending order) slot of a long-name chain.
pub const LAST_LONG_ENTRY: u8 = 0x40;

/// Below this cluster count the volume is FAT12 (unsupported for I/O).
pub const MAX_CLUSTER_FAT12: u32 = 4085;
/// Below this cluster count (and at/above [`MAX_CLUSTER_FAT12`]) the volume
/// is FAT16.
pub const MAX_CLUSTER_FAT16: u32 = 65525;

/// Byte whitelist shared by long-name validation and user-facing path
/// component acceptance. Deliberately stricter than the FAT spec itself --
/// notably it rejects the space character and `!`, both legal in a VFAT
/// long name -- in order to provide UNIX-friendly names.
pub fn is_valid_filename_byte(b: u8) -> bool {
    matches!(b,
        b'#' | b'$' | b'%' | b'&' | b'\'' | b'(' | b')' | b'+' | b','
        | b'-' | b'.' | b'0'..=b'9' | b';' | b'=' | b'@' | b'A'..=b'Z'
        | b'[' | b']' | b'^' | b'_' | b'`' | b'a'..=b'z' | b'{' | b'}' | b'~'
    )
}

pub(crate) fn read_le_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

pub(crate) fn read_le_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

#[cfg(test)]
pub(crate) mod testimage;
