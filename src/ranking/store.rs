// Key-value access to the ratings that were already retrieved, one entry per game.

use crate::ranking::{
    io_csv::{read_ratings_csv, write_ratings_csv},
    io_json::{read_ratings_json, write_ratings_json},
    *,
};

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum StoreFormat {
    Csv,
    Json,
}

impl StoreFormat {
    pub fn from_provider(provider: &str) -> RankResult<StoreFormat> {
        match provider {
            CSV_PROVIDER => Ok(StoreFormat::Csv),
            JSON_PROVIDER => Ok(StoreFormat::Json),
            x => {
                whatever!("unknown ratings provider: {:?}", x)
            }
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            StoreFormat::Csv => "csv",
            StoreFormat::Json => "json",
        }
    }
}

pub trait RatingStore {
    /// The ratings of a game, if they were stored.
    fn get(&self, key: &str) -> RankResult<Option<RatingCollection>>;
    fn put(&mut self, key: &str, ratings: &RatingCollection) -> RankResult<()>;
    /// All the stored keys, in increasing numerical order. Only catalog ids count as keys.
    fn keys(&self) -> RankResult<Vec<String>>;
}

/// One file per game in a directory, named after the game id.
pub struct FileRatingStore {
    directory: PathBuf,
    format: StoreFormat,
}

impl FileRatingStore {
    pub fn new(directory: PathBuf, format: StoreFormat) -> FileRatingStore {
        FileRatingStore { directory, format }
    }

    pub fn directory(&self) -> &Path {
        self.directory.as_path()
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}", key, self.format.extension()))
    }
}

impl RatingStore for FileRatingStore {
    fn get(&self, key: &str) -> RankResult<Option<RatingCollection>> {
        let path = self.path_for(key);
        if !path.is_file() {
            debug!("FileRatingStore: no entry for {} at {:?}", key, path);
            return Ok(None);
        }
        info!("Attempting to read ratings file {:?}", path);
        let ratings = match self.format {
            StoreFormat::Csv => read_ratings_csv(&path)?,
            StoreFormat::Json => read_ratings_json(&path)?,
        };
        Ok(Some(ratings))
    }

    fn put(&mut self, key: &str, ratings: &RatingCollection) -> RankResult<()> {
        fs::create_dir_all(&self.directory).context(WritingFileSnafu {
            path: self.directory.display().to_string(),
        })?;
        let path = self.path_for(key);
        debug!("FileRatingStore: writing {} ratings to {:?}", ratings.len(), path);
        match self.format {
            StoreFormat::Csv => write_ratings_csv(&path, ratings),
            StoreFormat::Json => write_ratings_json(&path, ratings),
        }
    }

    fn keys(&self) -> RankResult<Vec<String>> {
        let dir_path = self.directory.display().to_string();
        let entries = fs::read_dir(&self.directory).context(ListingDirectorySnafu {
            path: dir_path.clone(),
        })?;
        let mut keys: Vec<String> = Vec::new();
        for entry in entries {
            let path = entry
                .context(ListingDirectorySnafu {
                    path: dir_path.clone(),
                })?
                .path();
            let is_rating_file = path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(self.format.extension());
            if let (true, Some(stem)) = (is_rating_file, path.file_stem().and_then(|s| s.to_str())) {
                if is_catalog_key(stem) {
                    keys.push(stem.to_string());
                } else {
                    warn!(
                        "FileRatingStore: ignoring {:?}, its name is not a catalog id",
                        path
                    );
                }
            }
        }
        sort_keys(&mut keys);
        Ok(keys)
    }
}

// A catalog id written without leading zeros, so that two files never name the same game.
fn is_catalog_key(stem: &str) -> bool {
    !stem.is_empty()
        && stem.chars().all(|c| c.is_ascii_digit())
        && (stem == "0" || !stem.starts_with('0'))
}

// Numerical order for numerical keys: shorter first, then lexicographic.
fn sort_keys(keys: &mut [String]) {
    keys.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryRatingStore {
    entries: std::collections::HashMap<String, RatingCollection>,
}

#[cfg(test)]
impl RatingStore for MemoryRatingStore {
    fn get(&self, key: &str) -> RankResult<Option<RatingCollection>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, ratings: &RatingCollection) -> RankResult<()> {
        self.entries.insert(key.to_string(), ratings.clone());
        Ok(())
    }

    fn keys(&self) -> RankResult<Vec<String>> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        sort_keys(&mut keys);
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_data(lpath: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(lpath)
    }

    #[test]
    fn lists_cached_games() {
        let store = FileRatingStore::new(test_data("cycle/ratings"), StoreFormat::Csv);
        assert_eq!(store.keys().unwrap(), vec!["1001", "1002", "1003"]);
        let json_store = FileRatingStore::new(test_data("transitive/ratings"), StoreFormat::Json);
        assert_eq!(json_store.keys().unwrap(), vec!["7", "13", "822"]);
    }

    #[test]
    fn ignores_files_not_named_by_catalog_id() {
        let dir = tempdir().unwrap();
        for name in ["13.csv", "2024-notes.csv", "013.csv", "notes.csv", "822.json", "5.csv"] {
            fs::write(dir.path().join(name), "alice,7\n").unwrap();
        }
        fs::create_dir(dir.path().join("42.csv")).unwrap();
        let store = FileRatingStore::new(dir.path().to_path_buf(), StoreFormat::Csv);
        assert_eq!(store.keys().unwrap(), vec!["5", "13"]);
        assert!(is_catalog_key("0"));
        assert!(!is_catalog_key(""));
        assert!(!is_catalog_key("00"));
    }

    #[test]
    fn missing_entry() {
        let store = FileRatingStore::new(test_data("cycle/ratings"), StoreFormat::Csv);
        assert_eq!(store.get("999").unwrap(), None);
    }

    #[test]
    fn reads_and_writes_both_formats() {
        let source = FileRatingStore::new(test_data("cycle/ratings"), StoreFormat::Csv);
        let ratings = source.get("1001").unwrap().unwrap();
        assert_eq!(ratings.len(), 3);
        assert_eq!(ratings.get("alice"), Some(9.0));

        for format in [StoreFormat::Json, StoreFormat::Csv] {
            let dir = tempdir().unwrap();
            // The store creates its directory on the first write.
            let mut store = FileRatingStore::new(dir.path().join("cache"), format);
            store.put("1001", &ratings).unwrap();
            assert_eq!(store.keys().unwrap(), vec!["1001"]);
            assert_eq!(store.get("1001").unwrap(), Some(ratings.clone()));
        }
    }

    #[test]
    fn unknown_provider() {
        assert!(StoreFormat::from_provider("xml").is_err());
        assert_eq!(
            StoreFormat::from_provider("json").unwrap(),
            StoreFormat::Json
        );
    }
}
