//! Properties of the tally and the ranking that hold for any set of ratings.

use condorcet_irv::*;
use proptest::prelude::*;

// One row per voter, one column per candidate. Ratings are half points between 0 and 5, so
// ties are frequent, and voters skip some candidates.
fn rating_grid() -> impl Strategy<Value = Vec<Vec<Option<f64>>>> {
    (1usize..7, 2usize..12)
        .prop_flat_map(|(num_candidates, num_voters)| {
            prop::collection::vec(
                prop::collection::vec(
                    prop::option::weighted(0.8, (0u8..=10).prop_map(|r| r as f64 / 2.0)),
                    num_candidates,
                ),
                num_voters,
            )
        })
        .prop_filter("every candidate has a rating", |grid| {
            (0..grid[0].len()).all(|c| grid.iter().any(|row| row[c].is_some()))
        })
}

fn collections(grid: &[Vec<Option<f64>>]) -> Vec<RatingCollection> {
    let mut res = vec![RatingCollection::new(); grid[0].len()];
    for (voter, row) in grid.iter().enumerate() {
        for (coll, rating) in res.iter_mut().zip(row.iter()) {
            if let Some(r) = rating {
                coll.insert(format!("voter{}", voter), *r).unwrap();
            }
        }
    }
    res
}

fn candidates(grid: &[Vec<Option<f64>>]) -> Vec<Candidate> {
    collections(grid)
        .into_iter()
        .enumerate()
        .map(|(idx, ratings)| Candidate {
            id: format!("{}", idx + 100),
            name: format!("Game {}", idx),
            publication_year: 2000 + (idx as i32 % 3),
            catalog_id: idx as u64 + 100,
            ratings,
        })
        .collect()
}

proptest! {
    #[test]
    fn differential_is_antisymmetric(grid in rating_grid()) {
        let colls = collections(&grid);
        let refs: Vec<&RatingCollection> = colls.iter().collect();
        let tally = build_pairwise_tally(&refs).unwrap();
        let rows = tally.differential.rows();
        prop_assert_eq!(rows.len(), colls.len());
        for i in 0..colls.len() {
            prop_assert_eq!(rows[i][i], DIAGONAL_SENTINEL);
            for j in 0..colls.len() {
                if i == j {
                    continue;
                }
                prop_assert_eq!(rows[i][j], -rows[j][i]);
                // Voters who rated both either prefer one side or are tied.
                let both = grid
                    .iter()
                    .filter(|row| row[i].is_some() && row[j].is_some())
                    .count() as u64;
                let tied = grid
                    .iter()
                    .filter(|row| matches!((row[i], row[j]), (Some(a), Some(b)) if a == b))
                    .count() as u64;
                prop_assert_eq!(tally.pairwise[i][j] + tally.pairwise[j][i] + tied, both);
            }
        }
    }

    #[test]
    fn common_average_stays_within_common_ratings(grid in rating_grid()) {
        let colls = collections(&grid);
        let refs: Vec<&RatingCollection> = colls.iter().collect();
        let common: Vec<&Vec<Option<f64>>> = grid
            .iter()
            .filter(|row| row.iter().all(|r| r.is_some()))
            .collect();
        match common_rater_averages(&refs) {
            Err(e) => {
                prop_assert!(common.is_empty());
                prop_assert_eq!(e, RankingErrors::EmptyIntersection);
            }
            Ok(res) => {
                prop_assert_eq!(res.common_raters, common.len());
                prop_assert_eq!(res.averages.len(), colls.len());
                for (idx, avg) in res.averages.iter().enumerate() {
                    let values: Vec<f64> = common.iter().filter_map(|row| row[idx]).collect();
                    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
                    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                    prop_assert!(
                        min - 1e-9 <= *avg && *avg <= max + 1e-9,
                        "{} not in [{}, {}]", avg, min, max
                    );
                }
            }
        }
    }

    #[test]
    fn ranking_is_a_permutation(grid in rating_grid()) {
        let cands = candidates(&grid);
        let res = run_condorcet_irv(&cands).unwrap();
        let mut ranked = res.ranking.clone();
        ranked.sort();
        let mut expected: Vec<String> = cands.iter().map(|c| c.id.clone()).collect();
        expected.sort();
        prop_assert_eq!(ranked, expected);
        for (idx, rs) in res.rank_stats.iter().enumerate() {
            prop_assert_eq!(rs.rank as usize, idx + 1);
            prop_assert!(!rs.set_aside.contains(&rs.id));
        }
    }

    #[test]
    fn ranking_is_idempotent(grid in rating_grid()) {
        let cands = candidates(&grid);
        let first = run_condorcet_irv(&cands).unwrap();
        let second = run_condorcet_irv(&cands).unwrap();
        prop_assert_eq!(first, second);
    }
}
