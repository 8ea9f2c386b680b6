//! Absolute path resolution: walk a `/`-separated UNIX-style path down
//! through directories until the final component is reached.
//!
//! There is no current-directory concept and no relative paths -- every
//! path accepted here is rooted, exactly the way [`crate::volume::Volume`]
//! exposes it to callers. Resolution never allocates: each component is
//! compared against directory entries as they stream out of
//! [`crate::walk::walk_directory`], one callback invocation at a time.
use crate::bpb::BiosParameterBlock;
use crate::error::FatError;
use crate::walk::{walk_directory, DirEntryView, DirSource, WalkControl};
use crate::ATTR_DIRECTORY;

/// Where a resolved entry's contents live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryLocation {
    /// The volume root -- a [`DirSource::Fixed`] region on FAT12/16, a
    /// [`DirSource::Chain`] on FAT32.
    Root,
    /// An ordinary file or subdirectory's first data cluster.
    Cluster(u32),
}

/// A resolved path: enough to tell what it is and, if it's a directory,
/// where to keep walking, or if it's a file, where to start reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub attr: u8,
    pub file_size: u32,
    pub location: EntryLocation,
}

impl Entry {
    pub fn is_directory(&self) -> bool {
        self.attr & ATTR_DIRECTORY != 0
    }

    /// The root directory is always a directory, with a zero nominal size
    /// (its real size is however long its cluster chain or fixed region
    /// happens to be).
    pub fn root() -> Self {
        Entry {
            attr: ATTR_DIRECTORY,
            file_size: 0,
            location: EntryLocation::Root,
        }
    }

    /// The [`DirSource`] to walk if this entry is a directory.
    pub fn dir_source(&self, bpb: &BiosParameterBlock) -> DirSource {
        match self.location {
            EntryLocation::Root => root_dir_source(bpb),
            EntryLocation::Cluster(c) => DirSource::Chain { start_cluster: c },
        }
    }
}

/// The [`DirSource`] of the volume root: a fixed region on FAT12/16, a
/// cluster chain anchored at `BPB_RootClus` on FAT32.
pub fn root_dir_source(bpb: &BiosParameterBlock) -> DirSource {
    if bpb.root_entry_count() != 0 {
        DirSource::Fixed {
            offset: bpb.root_dir_offset(),
            entry_count: bpb.root_entry_count(),
        }
    } else {
        DirSource::Chain {
            start_cluster: bpb.root_cluster(),
        }
    }
}

/// Resolves an absolute, `/`-separated path to the entry it names.
///
/// Repeated slashes are collapsed and a trailing slash is treated as a
/// requirement that the final component be a directory (mirroring shell
/// and POSIX `open()` conventions: `/a/b/` demands `b` be a directory even
/// if a file of the same name also somehow matched, which on FAT it
/// cannot). The root path (`""` or `"/"`) always resolves to
/// [`Entry::root`].
///
/// Name comparison is deliberately asymmetric, matching the two kinds of
/// name FAT actually stores: a long name (when present) is matched
/// byte-exact and case-sensitive, giving UNIX-style semantics for the name
/// a file was actually created with; the 8.3 short name is matched
/// case-insensitively, since short names are themselves case-folded to
/// uppercase on disk and have no case of their own to be exact about.
pub fn resolve_path(bytes: &[u8], bpb: &BiosParameterBlock, path: &str) -> Result<Entry, FatError> {
    let trailing_slash = path.len() > 1 && path.ends_with('/');
    let mut components = path.split('/').filter(|c| !c.is_empty()).peekable();

    if components.peek().is_none() {
        return Ok(Entry::root());
    }

    let mut current = Entry::root();
    while let Some(component) = components.next() {
        if !current.is_directory() {
            return Err(FatError::NotADirectory);
        }
        let source = current.dir_source(bpb);
        let found = search_one(bytes, bpb, source, component)?;
        let entry = found.ok_or(FatError::NotFound)?;

        let is_last = components.peek().is_none();
        if is_last && trailing_slash && !entry.is_directory() {
            return Err(FatError::NotADirectory);
        }
        current = entry;
    }
    Ok(current)
}

/// Scans one directory for a single name, stopping as soon as it's found.
fn search_one(
    bytes: &[u8],
    bpb: &BiosParameterBlock,
    source: DirSource,
    name: &str,
) -> Result<Option<Entry>, FatError> {
    let mut found: Option<Entry> = None;
    walk_directory(bytes, bpb, source, |view: DirEntryView| {
        let is_match = if view.has_long_name {
            view.name == name
        } else {
            view.short_name.eq_ignore_ascii_case(name)
        };
        if is_match {
            found = Some(Entry {
                attr: view.attr,
                file_size: view.file_size,
                location: EntryLocation::Cluster(view.first_cluster),
            });
            WalkControl::Stop
        } else {
            WalkControl::Continue
        }
    })?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testimage::{fat16_image, fat32_image};

    #[test]
    fn resolves_root() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        let entry = resolve_path(&image, &bpb, "/").unwrap();
        assert_eq!(entry, Entry::root());
        let entry = resolve_path(&image, &bpb, "").unwrap();
        assert_eq!(entry, Entry::root());
    }

    #[test]
    fn resolves_top_level_file() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        let entry = resolve_path(&image, &bpb, "/HELLO.TXT").unwrap();
        assert!(!entry.is_directory());
        assert_eq!(entry.file_size, 12);
    }

    #[test]
    fn resolves_nested_file_through_subdirectory() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        let entry = resolve_path(&image, &bpb, "/SUBDIR/NESTED.BIN").unwrap();
        assert!(!entry.is_directory());
        assert_eq!(entry.file_size, 12);
    }

    #[test]
    fn missing_component_is_not_found() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        assert_eq!(
            resolve_path(&image, &bpb, "/NOPE.TXT").unwrap_err(),
            FatError::NotFound
        );
    }

    #[test]
    fn walking_through_a_file_is_not_a_directory() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        assert_eq!(
            resolve_path(&image, &bpb, "/HELLO.TXT/NOPE").unwrap_err(),
            FatError::NotADirectory
        );
    }

    #[test]
    fn trailing_slash_requires_a_directory() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        assert_eq!(
            resolve_path(&image, &bpb, "/HELLO.TXT/").unwrap_err(),
            FatError::NotADirectory
        );
        assert!(resolve_path(&image, &bpb, "/SUBDIR/").unwrap().is_directory());
    }

    #[test]
    fn case_sensitive_long_name_lookup() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        assert!(resolve_path(&image, &bpb, "/long-name-file.txt").is_ok());
        assert_eq!(
            resolve_path(&image, &bpb, "/LONG-NAME-FILE.TXT").unwrap_err(),
            FatError::NotFound
        );
    }

    #[test]
    fn short_alias_is_matched_case_insensitively() {
        let image = fat16_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        // long-name-file.txt is aliased to LONG-N~1.TXT; unlike the long
        // name itself, the short alias folds case.
        assert!(resolve_path(&image, &bpb, "/LONG-N~1.TXT").is_ok());
        assert!(resolve_path(&image, &bpb, "/long-n~1.txt").is_ok());
    }

    #[test]
    fn fat32_resolves_through_multi_cluster_root() {
        let image = fat32_image();
        let bpb = BiosParameterBlock::parse(&image[..512]).unwrap();
        let entry = resolve_path(&image, &bpb, "/SUBDIR/NESTED.BIN").unwrap();
        assert_eq!(entry.file_size, 12);
    }
}
