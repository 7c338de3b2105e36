//! Contribution inspection commands.
//!
//! # Usage
//!
//! ```bash
//! patron contributions list
//! patron contributions list --unread
//! ```

use patron_site::db::ContributionRepository;
use patron_site::store::StoreError;
use thiserror::Error;

use super::{StoreSetupError, open_store};

/// Errors that can occur listing contributions.
#[derive(Debug, Error)]
pub enum ContributionsError {
    /// The store could not be opened.
    #[error(transparent)]
    Setup(#[from] StoreSetupError),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Print contributions newest first, optionally only the unread ones.
#[allow(clippy::print_stdout)]
pub async fn list(unread_only: bool) -> Result<(), ContributionsError> {
    let store = open_store()?;
    let contributions = ContributionRepository::new(&store).list_newest_first().await?;

    let total = contributions.len();
    let mut shown = 0;
    for c in contributions.iter().filter(|c| !unread_only || !c.read) {
        let mark = if c.read { ' ' } else { '*' };
        println!(
            "{mark} {:<24} {:<20} {:<24} {} {} {}  [{}]",
            c.submitted_at(),
            c.name,
            c.contact,
            c.day,
            c.time,
            c.amount,
            c.id
        );
        shown += 1;
    }

    tracing::info!("{shown} of {total} contributions shown");
    Ok(())
}
