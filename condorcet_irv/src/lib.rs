mod config;

pub mod builder;
pub mod manual;

use log::{debug, error, info};

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    ops::AddAssign,
};

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateId(usize);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
    const ONE: VoteCount = VoteCount(1);
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

// All the ratings of one voter, regrouped across candidates.
// Invariant: a candidate appears at most once.
#[derive(PartialEq, Debug, Clone)]
struct ScoreBallot {
    scores: Vec<(CandidateId, f64)>,
}

impl ScoreBallot {
    fn max_rating(&self) -> Option<f64> {
        self.scores.iter().map(|(_, r)| *r).reduce(f64::max)
    }
}

// The outcome of one step of the search for a winner.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum SearchOutcome {
    // Undefeated among the active candidates.
    Winner(CandidateId),
    // No winner: this candidate leaves the active set for the rest of the search.
    SetAside(CandidateId),
}

/// Runs the ranking method selected by the rules.
///
/// Arguments:
/// * `candidates` the candidates to rank, with their ratings
/// * `rules` the method and the limits that apply to this ranking
pub fn run_ranking(
    candidates: &[Candidate],
    rules: &RankingRules,
) -> Result<RankingOutcome, RankingErrors> {
    let selected: &[Candidate] = match rules.max_candidates {
        Some(k) if (k as usize) < candidates.len() => {
            info!(
                "run_ranking: keeping the first {} of {} candidates",
                k,
                candidates.len()
            );
            &candidates[..k as usize]
        }
        _ => candidates,
    };
    match rules.method {
        RankingMethod::CondorcetIrv => run_condorcet_irv(selected).map(RankingOutcome::Condorcet),
        RankingMethod::CommonRaterAverage => {
            run_common_average(selected).map(RankingOutcome::Average)
        }
    }
}

/// Ranks all the candidates with the Condorcet method, using instant-runoff eliminations to
/// break the cycles.
pub fn run_condorcet_irv(candidates: &[Candidate]) -> Result<RankingResult, RankingErrors> {
    check_candidates(candidates)?;
    let collections: Vec<&RatingCollection> = candidates.iter().map(|c| &c.ratings).collect();
    let tally = build_pairwise_tally(&collections)?;
    let tiebreaks = tally.tiebreak_records(candidates)?;

    let steps = match rank_condorcet_irv(&tally.differential, &tiebreaks) {
        Ok(steps) => steps,
        Err(RankingErrors::MultipleWinners { contested, winners }) => {
            let ids = |positions: &[usize]| -> Vec<String> {
                positions
                    .iter()
                    .map(|idx| candidates[*idx].id.clone())
                    .collect()
            };
            error!(
                "run_condorcet_irv: aborting, candidates {:?} are all undefeated among {:?}",
                ids(&winners),
                ids(&contested)
            );
            return Err(RankingErrors::MultipleWinners { contested, winners });
        }
        Err(e) => return Err(e),
    };

    let mut rank_stats: Vec<RankStats> = Vec::new();
    for (idx, step) in steps.iter().enumerate() {
        let c = &candidates[step.winner];
        rank_stats.push(RankStats {
            rank: (idx + 1) as u32,
            id: c.id.clone(),
            name: c.name.clone(),
            set_aside: step
                .set_aside
                .iter()
                .map(|pos| candidates[*pos].id.clone())
                .collect(),
            tiebreak: tiebreaks[step.winner],
        });
    }
    Ok(RankingResult {
        ranking: rank_stats.iter().map(|rs| rs.id.clone()).collect(),
        rank_stats,
    })
}

/// Compares the candidates by their average rating among the voters who rated all of them.
pub fn run_common_average(candidates: &[Candidate]) -> Result<AverageResult, RankingErrors> {
    check_candidates(candidates)?;
    let collections: Vec<&RatingCollection> = candidates.iter().map(|c| &c.ratings).collect();
    let ca = common_rater_averages(&collections)?;
    Ok(AverageResult {
        common_raters: ca.common_raters,
        averages: candidates
            .iter()
            .zip(ca.averages.iter())
            .map(|(c, avg)| (c.id.clone(), *avg))
            .collect(),
    })
}

// Candidates must be distinguishable, both for the output and for the tiebreak.
fn check_candidates(candidates: &[Candidate]) -> Result<(), RankingErrors> {
    info!("Processing {:?} candidates", candidates.len());
    let mut ids: HashSet<&str> = HashSet::new();
    let mut catalog_ids: HashSet<u64> = HashSet::new();
    for c in candidates.iter() {
        info!(
            "Candidate: {}: {} ({}), {} ratings",
            c.id,
            c.name,
            c.publication_year,
            c.ratings.len()
        );
        if !ids.insert(c.id.as_str()) || !catalog_ids.insert(c.catalog_id) {
            return Err(RankingErrors::DuplicateCandidate(c.id.clone()));
        }
    }
    Ok(())
}

fn check_collections(collections: &[&RatingCollection]) -> Result<(), RankingErrors> {
    if collections.is_empty() {
        return Err(RankingErrors::EmptyElection);
    }
    if let Some(position) = collections.iter().position(|c| c.is_empty()) {
        return Err(RankingErrors::NoRatings { position });
    }
    Ok(())
}

/// Average rating of each candidate, restricted to the voters who rated every candidate.
///
/// This is a like-for-like comparison, not a ranking method: all the ratings from the voters
/// who skipped a candidate are ignored.
pub fn common_rater_averages(
    collections: &[&RatingCollection],
) -> Result<CommonAverages, RankingErrors> {
    check_collections(collections)?;
    // Sorted, so that the floating point sums do not depend on the hashing order.
    let common: BTreeSet<&String> = collections[0]
        .voters()
        .filter(|voter| collections[1..].iter().all(|c| c.contains(voter)))
        .collect();
    info!(
        "common_rater_averages: {} voters rated all of the {} candidates",
        common.len(),
        collections.len()
    );
    if common.is_empty() {
        return Err(RankingErrors::EmptyIntersection);
    }

    let num_common = common.len() as f64;
    let averages: Vec<f64> = collections
        .iter()
        .map(|c| common.iter().filter_map(|voter| c.get(voter)).sum::<f64>() / num_common)
        .collect();
    debug!("common_rater_averages: averages: {:?}", averages);
    Ok(CommonAverages {
        common_raters: common.len(),
        averages,
    })
}

/// Tallies the head-to-head preferences and the tiebreak statistics of the candidates.
///
/// Each voter contributes to `pairwise[i][j]` for every pair of candidates they both rated,
/// when they gave `i` a strictly higher rating. Equal ratings count for neither side.
pub fn build_pairwise_tally(
    collections: &[&RatingCollection],
) -> Result<PairwiseTally, RankingErrors> {
    check_collections(collections)?;
    let num_candidates = collections.len();
    let ballots = regroup_by_voter(collections);
    debug!(
        "build_pairwise_tally: {} candidates, {} voters",
        num_candidates,
        ballots.len()
    );

    let mut pairwise: Vec<Vec<VoteCount>> =
        vec![vec![VoteCount::EMPTY; num_candidates]; num_candidates];
    let mut top_choices: Vec<VoteCount> = vec![VoteCount::EMPTY; num_candidates];
    for ballot in ballots.values() {
        for (cid_i, rating_i) in ballot.scores.iter() {
            for (cid_j, rating_j) in ballot.scores.iter() {
                if rating_i > rating_j {
                    pairwise[cid_i.0][cid_j.0] += VoteCount::ONE;
                }
            }
        }
        // Every candidate tied for the highest rating is a top choice.
        if let Some(max_rating) = ballot.max_rating() {
            for (cid, rating) in ballot.scores.iter() {
                if *rating == max_rating {
                    top_choices[cid.0] += VoteCount::ONE;
                }
            }
        }
    }

    let pairwise: Vec<Vec<u64>> = pairwise
        .iter()
        .map(|row| row.iter().map(|vc| vc.0).collect())
        .collect();
    debug!("build_pairwise_tally: pairwise: {:?}", pairwise);
    let differential = DifferentialMatrix::from_pairwise(&pairwise);
    Ok(PairwiseTally {
        pairwise,
        differential,
        top_choice_counts: top_choices.iter().map(|vc| vc.0).collect(),
        vote_counts: collections.iter().map(|c| c.len() as u64).collect(),
    })
}

fn regroup_by_voter<'a>(collections: &[&'a RatingCollection]) -> HashMap<&'a str, ScoreBallot> {
    let mut ballots: HashMap<&str, ScoreBallot> = HashMap::new();
    for (idx, coll) in collections.iter().enumerate() {
        for (voter, rating) in coll.iter() {
            ballots
                .entry(voter.as_str())
                .or_insert_with(|| ScoreBallot { scores: Vec::new() })
                .scores
                .push((CandidateId(idx), rating));
        }
    }
    ballots
}

impl PairwiseTally {
    pub fn num_candidates(&self) -> usize {
        self.vote_counts.len()
    }

    /// Completes the tiebreak statistics with the publication year and the catalog id of the
    /// candidates, given in the same order as the tallied ratings.
    pub fn tiebreak_records(
        &self,
        candidates: &[Candidate],
    ) -> Result<Vec<TiebreakRecord>, RankingErrors> {
        if candidates.len() != self.num_candidates() {
            return Err(RankingErrors::DimensionMismatch {
                expected: self.num_candidates(),
                found: candidates.len(),
            });
        }
        Ok(candidates
            .iter()
            .enumerate()
            .map(|(idx, c)| TiebreakRecord {
                top_choice_count: self.top_choice_counts[idx],
                vote_count: self.vote_counts[idx],
                publication_year: c.publication_year,
                catalog_id: c.catalog_id,
            })
            .collect())
    }
}

/// Orders all the candidates, one rank at a time.
///
/// Each rank goes to the candidate who beats every other remaining candidate head-to-head.
/// When the remaining candidates form a cycle, the plurality losers (smallest
/// [`TiebreakRecord::elimination_key`]) are set aside one by one until a candidate is undefeated
/// among the others. The candidates set aside are back in contention for the next rank.
pub fn rank_condorcet_irv(
    differential: &DifferentialMatrix,
    tiebreaks: &[TiebreakRecord],
) -> Result<Vec<RankStep>, RankingErrors> {
    if tiebreaks.len() != differential.size() {
        return Err(RankingErrors::DimensionMismatch {
            expected: differential.size(),
            found: tiebreaks.len(),
        });
    }
    if tiebreaks.is_empty() {
        return Err(RankingErrors::EmptyElection);
    }

    // The candidates that do not have a rank yet.
    let mut pool: Vec<CandidateId> = (0..tiebreaks.len()).map(CandidateId).collect();
    let mut steps: Vec<RankStep> = Vec::new();
    while !pool.is_empty() {
        let rank = steps.len() + 1;
        let mut active: Vec<CandidateId> = pool.clone();
        let mut set_aside: Vec<CandidateId> = Vec::new();
        let winner = loop {
            match search_step(differential, tiebreaks, &active)? {
                SearchOutcome::Winner(cid) => break cid,
                SearchOutcome::SetAside(cid) => {
                    debug!(
                        "rank_condorcet_irv: rank {}: no winner among {:?}, setting aside {:?} {:?}",
                        rank, active, cid, tiebreaks[cid.0]
                    );
                    active.retain(|c| *c != cid);
                    set_aside.push(cid);
                }
            }
        };
        info!(
            "Rank {}: candidate {} (set aside: {:?})",
            rank, winner.0, set_aside
        );
        pool.retain(|c| *c != winner);
        steps.push(RankStep {
            winner: winner.0,
            set_aside: set_aside.iter().map(|c| c.0).collect(),
        });
    }
    Ok(steps)
}

// Only looks at the active candidates. Nothing is mutated, the caller decides what to do with
// the outcome.
fn search_step(
    differential: &DifferentialMatrix,
    tiebreaks: &[TiebreakRecord],
    active: &[CandidateId],
) -> Result<SearchOutcome, RankingErrors> {
    // The diagonal sentinel is positive: a candidate alone is undefeated.
    let winners: Vec<CandidateId> = active
        .iter()
        .filter(|cid_i| {
            active
                .iter()
                .all(|cid_j| differential.get(cid_i.0, cid_j.0) > 0)
        })
        .cloned()
        .collect();

    match winners.as_slice() {
        [winner] => Ok(SearchOutcome::Winner(*winner)),
        [] => {
            let loser = active
                .iter()
                .min_by_key(|cid| tiebreaks[cid.0].elimination_key())
                .ok_or(RankingErrors::EmptyElection)?;
            Ok(SearchOutcome::SetAside(*loser))
        }
        _ => Err(RankingErrors::MultipleWinners {
            contested: active.iter().map(|c| c.0).collect(),
            winners: winners.iter().map(|c| c.0).collect(),
        }),
    }
}
