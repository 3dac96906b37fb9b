// Ratings stored as a single JSON object per game: {"voter": rating}

use crate::ranking::{
    io_common::{insert_rating, parse_rating, path_str},
    *,
};

use serde_json::Map as JSMap;

pub fn read_ratings_json(path: &Path) -> RankResult<RatingCollection> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path_str(path),
    })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    let obj = match js {
        JSValue::Object(m) => m,
        _ => {
            whatever!("{}: expected an object of ratings", path_str(path))
        }
    };

    let mut res = RatingCollection::new();
    for (voter, value) in obj.iter() {
        let rating = match value {
            JSValue::Number(n) => n.as_f64(),
            JSValue::String(s) => parse_rating(path, voter, s)?,
            JSValue::Null => None,
            x => {
                return InvalidRatingSnafu {
                    path: path_str(path),
                    voter,
                    content: x.to_string(),
                }
                .fail();
            }
        };
        if let Some(r) = rating {
            insert_rating(&mut res, voter, r)?;
        }
    }
    debug!("read_ratings_json: {:?}: {} ratings", path, res.len());
    Ok(res)
}

pub fn write_ratings_json(path: &Path, ratings: &RatingCollection) -> RankResult<()> {
    let mut obj: JSMap<String, JSValue> = JSMap::new();
    for (voter, rating) in ratings.iter() {
        obj.insert(voter.clone(), json!(rating));
    }
    let pretty =
        serde_json::to_string_pretty(&JSValue::Object(obj)).context(ParsingJsonSnafu {})?;
    fs::write(path, pretty).context(WritingFileSnafu {
        path: path_str(path),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn scratch_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, contents).unwrap();
        p
    }

    #[test]
    fn reads_numbers_and_strings() {
        let dir = tempdir().unwrap();
        let p = scratch_file(
            &dir,
            "13.json",
            r#"{"alice": 7, "bob": "8.5", "carol": "N/A", "dave": null}"#,
        );
        let ratings = read_ratings_json(&p).unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings.get("alice"), Some(7.0));
        assert_eq!(ratings.get("bob"), Some(8.5));
    }

    #[test]
    fn rejects_other_values() {
        let dir = tempdir().unwrap();
        let p = scratch_file(&dir, "nested.json", r#"{"alice": [7]}"#);
        assert!(matches!(
            read_ratings_json(&p),
            Err(RankError::InvalidRating { .. })
        ));
        let q = scratch_file(&dir, "array.json", r#"[7, 8]"#);
        assert!(read_ratings_json(&q).is_err());
    }
}
