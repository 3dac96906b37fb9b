// Primitives for reading and writing CSV files.

use crate::ranking::{
    io_common::{create_parent_dir, insert_rating, parse_rating, path_str},
    *,
};

/// Reads a ratings file: one `voter,rating` row per rating, without header.
pub fn read_ratings_csv(path: &Path) -> RankResult<RatingCollection> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {
            path: path_str(path),
        })?;

    let mut res = RatingCollection::new();
    let mut skipped: usize = 0;
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu {
            path: path_str(path),
            lineno,
        })?;
        let voter = line.get(0).context(CsvLineTooShortSnafu {
            path: path_str(path),
            lineno,
        })?;
        let content = line.get(1).context(CsvLineTooShortSnafu {
            path: path_str(path),
            lineno,
        })?;
        match parse_rating(path, voter, content)? {
            Some(rating) => insert_rating(&mut res, voter, rating)?,
            None => {
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        debug!(
            "read_ratings_csv: {:?}: skipped {} entries without rating",
            path, skipped
        );
    }
    debug!("read_ratings_csv: {:?}: {} ratings", path, res.len());
    Ok(res)
}

pub fn write_ratings_csv(path: &Path, ratings: &RatingCollection) -> RankResult<()> {
    let mut sorted: Vec<(&String, f64)> = ratings.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let rows: Vec<Vec<String>> = sorted
        .into_iter()
        .map(|(voter, rating)| vec![voter.clone(), rating.to_string()])
        .collect();
    write_csv(path, None, &rows)
}

/// Writes a table with a header row.
pub fn write_table_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> RankResult<()> {
    write_csv(path, Some(header), rows)
}

fn write_csv(path: &Path, header: Option<&[&str]>, rows: &[Vec<String>]) -> RankResult<()> {
    create_parent_dir(path)?;
    let mut wtr = csv::Writer::from_path(path).context(CsvOpenSnafu {
        path: path_str(path),
    })?;
    if let Some(h) = header {
        wtr.write_record(h).context(CsvWriteSnafu {})?;
    }
    for row in rows.iter() {
        wtr.write_record(row).context(CsvWriteSnafu {})?;
    }
    wtr.flush().context(WritingFileSnafu {
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
    fn skips_unrated_rows() {
        let dir = tempdir().unwrap();
        let p = scratch_file(&dir, "13.csv", "alice,7\nbob,N/A\ncarol,8.5\ndave,\n");
        let ratings = read_ratings_csv(&p).unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings.get("carol"), Some(8.5));
        assert!(!ratings.contains("bob"));
    }

    #[test]
    fn rejects_bad_rows() {
        let dir = tempdir().unwrap();
        let short = scratch_file(&dir, "short.csv", "alice,7\nbob\n");
        match read_ratings_csv(&short) {
            Err(RankError::CsvLineTooShort { lineno, .. }) => assert_eq!(lineno, 2),
            x => panic!("unexpected result {:?}", x),
        }
        let bad = scratch_file(&dir, "bad.csv", "alice,seven\n");
        assert!(matches!(
            read_ratings_csv(&bad),
            Err(RankError::InvalidRating { .. })
        ));
    }

    #[test]
    fn writes_table() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("table.csv");
        let rows = vec![vec!["1".to_string(), "13".to_string(), "Catan".to_string()]];
        write_table_csv(&p, &["Rank", "ID", "Game"], &rows).unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "Rank,ID,Game\n1,13,Catan\n");
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("out").join("nested").join("ranking.csv");
        write_table_csv(&p, &["Rank"], &[vec!["1".to_string()]]).unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "Rank\n1\n");

        let ratings = RatingCollection::from_pairs(vec![("bob", 6.5), ("alice", 7.0)]).unwrap();
        let q = dir.path().join("cache").join("13.csv");
        write_ratings_csv(&q, &ratings).unwrap();
        assert_eq!(fs::read_to_string(&q).unwrap(), "alice,7\nbob,6.5\n");
    }
}
