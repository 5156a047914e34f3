//! Deterministic zip archives of a release's pages.
//!
//! Entries are written in ascending page-name order, deflated, with a fixed
//! modification time and no extra fields. The same set of pages therefore
//! always produces byte-identical output, so a CRC32 over the archive is a
//! stable content checksum.

use std::io::{Cursor, Write};

use ims_store::StoreError;
use ims_types::{Page, Release};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{ArchiveError, ArchiveResult};

/// A freshly assembled archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltArchive {
    pub bytes: Vec<u8>,
    /// CRC32 of `bytes`, 8 lowercase hex characters.
    pub checksum: String,
    pub page_count: usize,
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
}

/// Build the archive for `pages`, reading each page's bytes through
/// `resolve`.
///
/// Pages are sorted by name before writing regardless of input order. The
/// first resolver failure aborts the build; no partial archive is returned.
pub fn build_archive<F>(pages: &[Page], mut resolve: F) -> ArchiveResult<BuiltArchive>
where
    F: FnMut(&Page) -> Result<Vec<u8>, StoreError>,
{
    let mut ordered: Vec<&Page> = pages.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for page in &ordered {
        let data = resolve(page).map_err(|source| ArchiveError::PageUnavailable {
            page: page.name.clone(),
            source,
        })?;
        zip.start_file(page.name.as_str(), entry_options())?;
        zip.write_all(&data)?;
        tracing::debug!(page = %page.name, bytes = data.len(), "archived page");
    }
    let bytes = zip.finish()?.into_inner();
    let checksum = checksum(&bytes);

    Ok(BuiltArchive {
        bytes,
        checksum,
        page_count: ordered.len(),
    })
}

/// CRC32 of `bytes`, big-endian, hex encoded.
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(crc32fast::hash(bytes).to_be_bytes())
}

/// Whether the checksum cached on `release` no longer describes `archive`.
pub fn is_stale(release: &Release, archive: &BuiltArchive) -> bool {
    release.checksum != archive.checksum
}
