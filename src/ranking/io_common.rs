// Primitives shared by the ratings readers.

use crate::ranking::*;

/// The marker left by the provider when a user commented on a game without rating it.
pub const NOT_RATED: &str = "N/A";

pub fn path_str(path: &Path) -> String {
    path.display().to_string()
}

/// Creates the parent directory of a file about to be written, if there is one.
pub fn create_parent_dir(path: &Path) -> RankResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WritingFileSnafu {
                path: path_str(parent),
            })?;
        }
    }
    Ok(())
}

/// Parses one rating. Returns None when the voter did not actually rate the game.
pub fn parse_rating(path: &Path, voter: &str, content: &str) -> RankResult<Option<f64>> {
    let trimmed = content.trim();
    if trimmed.is_empty() || trimmed == NOT_RATED {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(Some(x)),
        _ => InvalidRatingSnafu {
            path: path_str(path),
            voter,
            content: trimmed,
        }
        .fail(),
    }
}

pub fn insert_rating(ratings: &mut RatingCollection, voter: &str, rating: f64) -> RankResult<()> {
    if let Some(previous) = ratings.insert(voter, rating).context(RankingSnafu {})? {
        warn!(
            "insert_rating: voter {} has two ratings, replacing {} with {}",
            voter, previous, rating
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ratings() {
        let p = Path::new("13.csv");
        assert_eq!(parse_rating(p, "alice", " 7.5 ").unwrap(), Some(7.5));
        assert_eq!(parse_rating(p, "alice", "10").unwrap(), Some(10.0));
        assert_eq!(parse_rating(p, "alice", NOT_RATED).unwrap(), None);
        assert_eq!(parse_rating(p, "alice", "").unwrap(), None);
        assert!(parse_rating(p, "alice", "great").is_err());
        assert!(parse_rating(p, "alice", "NaN").is_err());
    }

    #[test]
    fn replaces_duplicate_voters() {
        let mut ratings = RatingCollection::new();
        insert_rating(&mut ratings, "alice", 6.0).unwrap();
        insert_rating(&mut ratings, "alice", 8.0).unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings.get("alice"), Some(8.0));
    }
}
