use super::open_repository;
use crate::core::{
    accessor::QueryBlobBytesParameters, blob_cache::BlobCache, error::Result,
    process::GitProcess,
};
use std::io::Write;

/// Writes the blob at `treeish:path` to stdout, or extracts it into the blob cache and
/// prints where it went.
pub fn execute_blob(process: &GitProcess, treeish: &str, path: &str, extract: bool) -> Result<()> {
    let git_repo = open_repository(process)?;
    let accessor = git_repo.accessor()?;

    if extract {
        let cache = BlobCache::for_repository(&git_repo.get_repo_path())?;
        let target = cache.extract(&accessor, treeish, path)?;
        println!("{}", target.display());
        return Ok(());
    }

    let blob = accessor.query_blob_bytes(&QueryBlobBytesParameters::new(treeish, path))?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(blob.bytes())?;
    stdout.flush()?;
    Ok(())
}
