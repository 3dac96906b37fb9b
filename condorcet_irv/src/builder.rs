pub use crate::config::*;

use crate::run_ranking;

/// A builder for declaring candidates and adding their ratings.
///
/// ```
/// pub use condorcet_irv::builder::Builder;
/// pub use condorcet_irv::{RankingOutcome, RankingRules};
/// # use condorcet_irv::RankingErrors;
///
/// let mut builder = Builder::new(&RankingRules::DEFAULT_RULES)?;
/// builder.candidate("13", "Catan", 1995, 13)?;
/// builder.candidate("822", "Carcassonne", 2000, 822)?;
///
/// builder.add_rating("13", "alice", 7.0)?;
/// builder.add_rating("822", "alice", 8.5)?;
///
/// if let RankingOutcome::Condorcet(res) = builder.run()? {
///     assert_eq!(res.ranking, vec!["822".to_string(), "13".to_string()]);
/// }
/// # Ok::<(), RankingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: RankingRules,
    pub(crate) _candidates: Vec<Candidate>,
}

impl Builder {
    pub fn new(rules: &RankingRules) -> Result<Builder, RankingErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _candidates: Vec::new(),
        })
    }

    /// Declares a candidate, without any rating yet.
    ///
    /// Candidates are ranked in declaration order when the rules limit their number.
    pub fn candidate(
        &mut self,
        id: &str,
        name: &str,
        publication_year: i32,
        catalog_id: u64,
    ) -> Result<(), RankingErrors> {
        if self
            ._candidates
            .iter()
            .any(|c| c.id == id || c.catalog_id == catalog_id)
        {
            return Err(RankingErrors::DuplicateCandidate(id.to_string()));
        }
        self._candidates.push(Candidate {
            id: id.to_string(),
            name: name.to_string(),
            publication_year,
            catalog_id,
            ratings: RatingCollection::new(),
        });
        Ok(())
    }

    /// Adds the rating of one voter for a declared candidate.
    pub fn add_rating(&mut self, id: &str, voter: &str, rating: f64) -> Result<(), RankingErrors> {
        self.find_mut(id)?.ratings.insert(voter, rating)?;
        Ok(())
    }

    /// Adds all the ratings of a declared candidate at once.
    pub fn add_ratings(&mut self, id: &str, ratings: &RatingCollection) -> Result<(), RankingErrors> {
        self.find_mut(id)?.ratings.extend_from(ratings);
        Ok(())
    }

    pub fn rules(&self) -> &RankingRules {
        &self._rules
    }

    pub fn build(self) -> Result<Vec<Candidate>, RankingErrors> {
        if self._candidates.is_empty() {
            return Err(RankingErrors::EmptyElection);
        }
        Ok(self._candidates)
    }

    /// Runs the ranking method of the rules on the candidates added so far.
    pub fn run(&self) -> Result<RankingOutcome, RankingErrors> {
        run_ranking(&self._candidates, &self._rules)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Candidate, RankingErrors> {
        self._candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RankingErrors::UnknownCandidate(id.to_string()))
    }
}
