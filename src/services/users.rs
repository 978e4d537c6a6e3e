// src/services/users.rs

//! User extraction: the author key set and per-user detail records.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{Item, User};
use crate::services::parse::parse_user;
use crate::storage::cell::decode;
use crate::storage::{LocalStorage, TempCsv, USERS_DATA_FILE, USERS_FILE};
use crate::utils::http::Fetch;
use crate::utils::user_url;

/// Collect every non-empty author from one partition file.
pub fn read_authors(path: &Path) -> Result<BTreeSet<String>> {
    let mut reader = csv::Reader::from_path(path)?;
    let position = reader
        .headers()?
        .iter()
        .position(|name| name == Item::AUTHOR_COLUMN)
        .ok_or_else(|| {
            AppError::decode(
                path.display().to_string(),
                format!("no '{}' column", Item::AUTHOR_COLUMN),
            )
        })?;

    let mut authors = BTreeSet::new();
    for record in reader.records() {
        let record = record?;
        let author = record.get(position).and_then(decode);
        if let Some(author) = author.filter(|a| !a.is_empty()) {
            authors.insert(author);
        }
    }
    Ok(authors)
}

/// Union of the authors of every published partition.
///
/// Files that cannot be read or lack the author column are skipped.
pub fn derive_user_keys(storage: &LocalStorage) -> Result<BTreeSet<String>> {
    let mut users = BTreeSet::new();
    for partition in storage.published_partitions()? {
        log::info!("Reading file {}", partition.path.display());
        match read_authors(&partition.path) {
            Ok(authors) => users.extend(authors),
            Err(e) => log::warn!("Skipping {}: {}", partition.path.display(), e),
        }
    }
    Ok(users)
}

/// Rebuild the `users` file from the published partitions.
pub fn create_users_file(storage: &LocalStorage) -> Result<usize> {
    let users = derive_user_keys(storage)?;
    storage.write_lines(USERS_FILE, &users)?;
    log::info!(
        "Written names of {} users to {}",
        users.len(),
        storage.path(USERS_FILE).display()
    );
    Ok(users.len())
}

/// Service fetching one detail record per known user.
pub struct UserCrawler<'a, F: Fetch + ?Sized> {
    fetcher: &'a F,
    users_url: &'a str,
    storage: &'a LocalStorage,
}

impl<'a, F: Fetch + ?Sized> UserCrawler<'a, F> {
    pub fn new(fetcher: &'a F, users_url: &'a str, storage: &'a LocalStorage) -> Self {
        Self {
            fetcher,
            users_url,
            storage,
        }
    }

    /// Fetch every user named in the `users` file into `users.data.csv`.
    ///
    /// An empty `users` file makes no requests and writes nothing.
    ///
    /// Any failure aborts the run; the previous `users.data.csv` is left
    /// untouched and the temporary file is removed.
    pub async fn fetch_all(&self) -> Result<usize> {
        let names = self.storage.read_lines(USERS_FILE)?;
        if names.is_empty() {
            log::warn!(
                "{} lists no users; {} left as it is",
                self.storage.path(USERS_FILE).display(),
                USERS_DATA_FILE
            );
            return Ok(0);
        }

        let tmp_path = self.storage.path(&format!("{USERS_DATA_FILE}.tmp"));
        let mut csv = TempCsv::create(tmp_path, &User::HEADER)?;

        if let Err(error) = self.fetch_into(&names, &mut csv).await {
            if let Err(discard_error) = csv.discard() {
                log::warn!("Failed to remove partial user data: {}", discard_error);
            }
            return Err(error);
        }

        let count = csv.rows();
        let final_path = self.storage.path(USERS_DATA_FILE);
        csv.commit(&final_path)?;
        log::info!("Written {} users to {}", count, final_path.display());
        Ok(count)
    }

    async fn fetch_into(&self, names: &[String], csv: &mut TempCsv) -> Result<()> {
        let total = names.len();
        for (i, name) in names.iter().enumerate() {
            log::info!("[{}/{}] {}", i + 1, total, name);
            let user = self.fetch_user(name).await?;
            csv.write_row(&user.to_record())?;
        }
        Ok(())
    }

    /// Fetch and decode one user.
    pub async fn fetch_user(&self, username: &str) -> Result<User> {
        let url = user_url(self.users_url, username)?;
        let body = self.fetcher.fetch(&url).await?;
        parse_user(&body).map_err(|e| AppError::decode(format!("user '{username}'"), e))
    }
}
