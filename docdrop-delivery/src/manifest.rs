//! Delivery manifest: which files of a triggered directory get uploaded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::DeliveryError;
use crate::glob::FileListing;

/// Absolute paths of the files in `directory` matching any `filter_in`
/// pattern and no `filter_out` pattern.
///
/// An empty `filter_in` yields an empty manifest; there is no implicit
/// "everything". The directory is listed once for both pattern sets.
pub fn resolve(
    directory: &Path,
    filter_in: &[String],
    filter_out: &[String],
) -> Result<Vec<PathBuf>, DeliveryError> {
    if filter_in.is_empty() {
        return Ok(Vec::new());
    }

    let all_patterns: Vec<String> = filter_in.iter().chain(filter_out).cloned().collect();
    let listing = FileListing::read(directory, &all_patterns)?;
    let included = listing.matching_any(filter_in)?;

    let kept = if filter_out.is_empty() {
        included
    } else {
        let excluded: HashSet<String> = listing.matching_any(filter_out)?.into_iter().collect();
        included
            .into_iter()
            .filter(|rel| !excluded.contains(rel))
            .collect()
    };

    Ok(kept.into_iter().map(|rel| directory.join(rel)).collect())
}
