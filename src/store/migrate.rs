//! ログイン時のローカルデータ統合
//!
//! On first login, guest wordbooks found on the device are appended to the
//! user's remote collection as new documents, then the local wordbooks
//! blob is removed. The local review list never migrates and is left on
//! the device. At-most-once per login and not transactional: a failure
//! mid-batch leaves already-uploaded books remote while local data stays
//! in place, and a re-confirmed merge appends again.

use crate::store::{LocalStore, RemoteStore, StoreResult};

/// Uploads every guest wordbook, removes the local wordbooks blob, and
/// returns how many books were migrated. The caller is responsible for
/// asking the user first.
pub async fn merge_into_remote(local: &LocalStore, remote: &RemoteStore) -> StoreResult<usize> {
    let books = local.load_wordbooks()?;
    if books.is_empty() {
        return Ok(0);
    }

    for book in &books {
        remote.insert_wordbook(&book.name, &book.words).await?;
        tracing::debug!(name = %book.name, words = book.words.len(), "migrated wordbook");
    }

    local.clear_wordbooks()?;
    tracing::info!(count = books.len(), user = %remote.user_id(), "guest data merged into account");
    Ok(books.len())
}
