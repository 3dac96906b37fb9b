// ********* Input data structures ***********

use std::collections::hash_map;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

/// The ratings given to a single candidate, keyed by voter.
///
/// Ratings are finite real numbers. No range is enforced: a scale from 1 to 10
/// and a scale from 0 to 100 are treated the same way since only the order
/// between the ratings of one voter matters to the ranking.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RatingCollection {
    ratings: HashMap<String, f64>,
}

impl RatingCollection {
    pub fn new() -> RatingCollection {
        RatingCollection {
            ratings: HashMap::new(),
        }
    }

    /// Builds a collection from (voter, rating) pairs.
    ///
    /// A voter appearing twice keeps the last rating.
    pub fn from_pairs<I, S>(pairs: I) -> Result<RatingCollection, RankingErrors>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut res = RatingCollection::new();
        for (voter, rating) in pairs {
            res.insert(voter, rating)?;
        }
        Ok(res)
    }

    /// Records the rating of a voter, returning the rating it replaces if any.
    pub fn insert<S: Into<String>>(
        &mut self,
        voter: S,
        rating: f64,
    ) -> Result<Option<f64>, RankingErrors> {
        let voter = voter.into();
        if !rating.is_finite() {
            return Err(RankingErrors::InvalidRating { voter, rating });
        }
        Ok(self.ratings.insert(voter, rating))
    }

    /// Adds all the ratings of another collection. Ratings from `other` win.
    pub fn extend_from(&mut self, other: &RatingCollection) {
        for (voter, rating) in other.iter() {
            self.ratings.insert(voter.clone(), rating);
        }
    }

    pub fn get(&self, voter: &str) -> Option<f64> {
        self.ratings.get(voter).cloned()
    }

    pub fn contains(&self, voter: &str) -> bool {
        self.ratings.contains_key(voter)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn voters(&self) -> hash_map::Keys<'_, String, f64> {
        self.ratings.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, f64)> {
        self.ratings.iter().map(|(voter, rating)| (voter, *rating))
    }
}

/// A candidate (a board game) and all the ratings it received.
#[derive(PartialEq, Debug, Clone)]
pub struct Candidate {
    /// The identifier reported in the rankings.
    pub id: String,
    /// Display name, not used by the algorithms.
    pub name: String,
    pub publication_year: i32,
    /// Orderable identifier in the catalog of the data provider.
    /// Only used as the last resort of the tiebreak: a larger id is harder to eliminate.
    pub catalog_id: u64,
    pub ratings: RatingCollection,
}

// ******** Output data structures *********

/// The value forced on the diagonal of a differential matrix.
///
/// It makes a single remaining candidate undefeated.
pub const DIAGONAL_SENTINEL: i64 = 1;

/// Head-to-head margins between candidates.
///
/// `get(i, j)` is the number of voters who preferred `i` over `j` minus the number of voters
/// who preferred `j` over `i`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DifferentialMatrix {
    rows: Vec<Vec<i64>>,
}

impl DifferentialMatrix {
    /// Computes the margins from a pairwise preference matrix.
    ///
    /// The pairwise matrix is assumed to be square.
    pub fn from_pairwise(pairwise: &[Vec<u64>]) -> DifferentialMatrix {
        let size = pairwise.len();
        let rows = (0..size)
            .map(|i| {
                (0..size)
                    .map(|j| {
                        if i == j {
                            DIAGONAL_SENTINEL
                        } else {
                            pairwise[i][j] as i64 - pairwise[j][i] as i64
                        }
                    })
                    .collect()
            })
            .collect();
        DifferentialMatrix { rows }
    }

    /// Uses margins computed elsewhere. The diagonal is replaced by the sentinel.
    ///
    /// The margins are not checked for antisymmetry: an inconsistent matrix is only detected
    /// while ranking.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<DifferentialMatrix, RankingErrors> {
        let size = rows.len();
        let mut rows = rows;
        for (idx, row) in rows.iter_mut().enumerate() {
            if row.len() != size {
                return Err(RankingErrors::DimensionMismatch {
                    expected: size,
                    found: row.len(),
                });
            }
            row[idx] = DIAGONAL_SENTINEL;
        }
        Ok(DifferentialMatrix { rows })
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.rows[i][j]
    }

    pub fn rows(&self) -> &[Vec<i64>] {
        &self.rows
    }
}

/// The result of tallying the ratings, with candidates in input order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairwiseTally {
    /// `pairwise[i][j]`: number of voters who rated both and gave `i` a strictly higher rating.
    pub pairwise: Vec<Vec<u64>>,
    pub differential: DifferentialMatrix,
    /// Number of voters for whom the candidate is (or is tied for) their highest rating.
    pub top_choice_counts: Vec<u64>,
    /// Number of voters who rated the candidate.
    pub vote_counts: Vec<u64>,
}

/// Statistics used to pick the candidate to set aside when no Condorcet winner exists.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct TiebreakRecord {
    pub top_choice_count: u64,
    pub vote_count: u64,
    pub publication_year: i32,
    pub catalog_id: u64,
}

impl TiebreakRecord {
    /// Composite key compared in ascending order: the smallest key is the plurality loser.
    ///
    /// Fewer top choices, then fewer votes, then an older publication, then a smaller catalog id
    /// make a candidate easier to eliminate.
    pub fn elimination_key(&self) -> (u64, u64, i32, u64) {
        (
            self.top_choice_count,
            self.vote_count,
            self.publication_year,
            self.catalog_id,
        )
    }
}

/// How one rank was decided. Candidates are designated by their position in the input.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankStep {
    pub winner: usize,
    /// The candidates set aside, in order, before the winner was undefeated.
    pub set_aside: Vec<usize>,
}

/// Statistics for one rank
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankStats {
    pub rank: u32,
    pub id: String,
    pub name: String,
    pub set_aside: Vec<String>,
    pub tiebreak: TiebreakRecord,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankingResult {
    /// Candidate ids from first to last place.
    pub ranking: Vec<String>,
    pub rank_stats: Vec<RankStats>,
}

/// Averages restricted to the voters who rated every candidate, in input order.
#[derive(PartialEq, Debug, Clone)]
pub struct CommonAverages {
    pub common_raters: usize,
    pub averages: Vec<f64>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct AverageResult {
    pub common_raters: usize,
    pub averages: Vec<(String, f64)>,
}

#[derive(PartialEq, Debug, Clone)]
pub enum RankingOutcome {
    Condorcet(RankingResult),
    Average(AverageResult),
}

/// Errors that prevent the algorithms from completing successfully.
#[derive(PartialEq, Debug, Clone)]
pub enum RankingErrors {
    /// No candidate to rank.
    EmptyElection,
    /// The candidate at this position has no rating at all.
    NoRatings { position: usize },
    /// Ratings must be finite numbers.
    InvalidRating { voter: String, rating: f64 },
    /// No voter rated every candidate, the common average is not defined.
    EmptyIntersection,
    /// More than one candidate is undefeated among the contested candidates.
    /// This can only happen with a differential matrix that is not antisymmetric.
    MultipleWinners {
        contested: Vec<usize>,
        winners: Vec<usize>,
    },
    DimensionMismatch { expected: usize, found: usize },
    DuplicateCandidate(String),
    UnknownCandidate(String),
}

impl Error for RankingErrors {}

impl Display for RankingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingErrors::EmptyElection => write!(f, "no candidate to rank"),
            RankingErrors::NoRatings { position } => {
                write!(f, "candidate at position {} has no ratings", position)
            }
            RankingErrors::InvalidRating { voter, rating } => {
                write!(f, "invalid rating {} from voter {}", rating, voter)
            }
            RankingErrors::EmptyIntersection => {
                write!(f, "no voter rated all the candidates")
            }
            RankingErrors::MultipleWinners { contested, winners } => write!(
                f,
                "inconsistent pairwise margins: candidates {:?} are all undefeated among {:?}",
                winners, contested
            ),
            RankingErrors::DimensionMismatch { expected, found } => {
                write!(f, "expected {} entries, found {}", expected, found)
            }
            RankingErrors::DuplicateCandidate(id) => write!(f, "duplicate candidate {}", id),
            RankingErrors::UnknownCandidate(id) => write!(f, "unknown candidate {}", id),
        }
    }
}

// ********* Configuration **********

/// The ranking method to apply.
///
/// - CondorcetIrv produces a total order of the candidates.
///
/// - CommonRaterAverage only compares the average ratings among the voters who rated every
/// candidate. It discards all the other ratings.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RankingMethod {
    CondorcetIrv,
    CommonRaterAverage,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankingRules {
    pub method: RankingMethod,
    /// If set, only the first candidates (in input order) are ranked.
    pub max_candidates: Option<u32>,
}

impl RankingRules {
    pub const DEFAULT_RULES: RankingRules = RankingRules {
        method: RankingMethod::CondorcetIrv,
        max_candidates: None,
    };
}
