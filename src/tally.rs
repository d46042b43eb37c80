use num::bigint::BigInt;
use num::traits::Zero;

use crate::errors::TallyError;

/// The merit profile of one proposal: the amounts of judgments received per
/// grade, from "worst" grade (index 0) to "best" grade.
///
/// Counts are big integers because the LCM-based normalization of
/// [`crate::normalized`] can push them far beyond machine-word range.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ProposalTally {
    merit_profile: Vec<BigInt>,
}

impl ProposalTally {
    /// Builds a profile from the given per-grade judgment counts.
    /// The slice is copied; later mutations on the caller side have no effect.
    pub fn new(merit_profile: &[BigInt]) -> ProposalTally {
        ProposalTally {
            merit_profile: merit_profile.to_vec(),
        }
    }

    /// Convenience constructor from plain unsigned counts.
    pub fn from_counts(counts: &[u64]) -> ProposalTally {
        ProposalTally {
            merit_profile: counts.iter().map(|&count| BigInt::from(count)).collect(),
        }
    }

    pub fn merit_profile(&self) -> &[BigInt] {
        &self.merit_profile
    }

    /// The size of the grade scale this proposal was judged on.
    pub fn grade_count(&self) -> usize {
        self.merit_profile.len()
    }

    /// Sum of the judgments received, across all grades.
    pub fn total_judgments(&self) -> BigInt {
        self.merit_profile.iter().sum()
    }

    /// Moves all the judgments of one grade into another grade.
    ///
    /// The scoring pass uses this to merge a decided median grade into the
    /// second-median grade, always on a private clone of the profile.
    /// Moving a grade onto itself is a net no-op.
    pub fn move_judgments(&mut self, from: usize, into: usize) -> Result<(), TallyError> {
        let grades = self.grade_count();
        for index in [from, into] {
            if index >= grades {
                return Err(TallyError::GradeOutOfRange { index, grades });
            }
        }
        let moved = std::mem::replace(&mut self.merit_profile[from], BigInt::zero());
        self.merit_profile[into] += moved;
        Ok(())
    }

    /// Adds `amount` judgments to one grade. Callers validate the index.
    pub(crate) fn add_judgments(&mut self, grade: usize, amount: BigInt) {
        self.merit_profile[grade] += amount;
    }

    /// Multiplies every per-grade count by `factor`, exactly.
    pub(crate) fn scale(&mut self, factor: &BigInt) {
        for count in &mut self.merit_profile {
            *count *= factor;
        }
    }
}

/// An ordered collection of merit profiles, plus the judge amount.
///
/// The order of the proposals is the canonical submission order: it is
/// preserved all the way to the [`crate::DeliberationResult`].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Tally {
    proposals: Vec<ProposalTally>,
    judge_count: BigInt,
}

impl Tally {
    /// Builds a tally with a known electorate size; the judge amount is
    /// taken verbatim, whether or not the proposals' totals agree with it.
    pub fn new(proposals: Vec<ProposalTally>, judge_count: BigInt) -> Tally {
        Tally {
            proposals,
            judge_count,
        }
    }

    /// Builds a tally and infers the judge amount as the largest judgment
    /// total across proposals. A conservative guess, mostly useful before
    /// balancing.
    pub fn with_inferred_judges(proposals: Vec<ProposalTally>) -> Tally {
        let judge_count = guess_judge_count(&proposals);
        Tally {
            proposals,
            judge_count,
        }
    }

    pub fn proposals(&self) -> &[ProposalTally] {
        &self.proposals
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    pub fn judge_count(&self) -> &BigInt {
        &self.judge_count
    }

    /// The grade scale size, read off the first proposal. The deliberation
    /// rejects tallies whose proposals disagree on it.
    pub fn grade_count(&self) -> usize {
        self.proposals
            .first()
            .map_or(0, |proposal| proposal.grade_count())
    }
}

pub(crate) fn guess_judge_count(proposals: &[ProposalTally]) -> BigInt {
    proposals
        .iter()
        .map(|proposal| proposal.total_judgments())
        .max()
        .unwrap_or_else(BigInt::zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_judgments_sums_the_profile() {
        let proposal = ProposalTally::from_counts(&[4, 2, 0, 1, 2, 2, 3]);
        assert_eq!(proposal.total_judgments(), BigInt::from(14u64));
        assert_eq!(proposal.grade_count(), 7);
    }

    #[test]
    fn move_judgments_conserves_the_total() {
        let mut proposal = ProposalTally::from_counts(&[3, 5, 2]);
        let total_before = proposal.total_judgments();
        proposal.move_judgments(1, 2).unwrap();
        assert_eq!(proposal.merit_profile()[1], BigInt::zero());
        assert_eq!(proposal.merit_profile()[2], BigInt::from(7u64));
        assert_eq!(proposal.total_judgments(), total_before);
    }

    #[test]
    fn move_judgments_onto_itself_is_a_no_op() {
        let mut proposal = ProposalTally::from_counts(&[3, 5]);
        proposal.move_judgments(1, 1).unwrap();
        assert_eq!(proposal, ProposalTally::from_counts(&[3, 5]));
    }

    #[test]
    fn move_judgments_rejects_bad_indices() {
        let mut proposal = ProposalTally::from_counts(&[3, 5]);
        assert_eq!(
            proposal.move_judgments(0, 2),
            Err(TallyError::GradeOutOfRange {
                index: 2,
                grades: 2
            })
        );
        assert_eq!(
            proposal.move_judgments(7, 0),
            Err(TallyError::GradeOutOfRange {
                index: 7,
                grades: 2
            })
        );
        // The profile is untouched after a failed move.
        assert_eq!(proposal, ProposalTally::from_counts(&[3, 5]));
    }

    #[test]
    fn inferred_judge_count_is_the_largest_total() {
        let tally = Tally::with_inferred_judges(vec![
            ProposalTally::from_counts(&[31, 72]),
            ProposalTally::from_counts(&[42, 42]),
        ]);
        assert_eq!(tally.judge_count(), &BigInt::from(103u64));
        assert_eq!(tally.proposal_count(), 2);
        assert_eq!(tally.grade_count(), 2);
    }

    #[test]
    fn explicit_judge_count_is_taken_verbatim() {
        let tally = Tally::new(
            vec![ProposalTally::from_counts(&[1, 2])],
            BigInt::from(999u64),
        );
        assert_eq!(tally.judge_count(), &BigInt::from(999u64));
    }

    #[test]
    fn constructor_copies_the_profile() {
        let mut counts = vec![BigInt::from(1), BigInt::from(2)];
        let proposal = ProposalTally::new(&counts);
        counts[0] = BigInt::from(9);
        assert_eq!(proposal.merit_profile()[0], BigInt::from(1));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn move_judgments_always_conserves_mass(
                counts in proptest::collection::vec(0u64..10_000, 1..9),
                from in 0usize..9,
                into in 0usize..9,
            ) {
                let mut proposal = ProposalTally::from_counts(&counts);
                let total_before = proposal.total_judgments();
                // Out-of-range moves must leave the profile untouched.
                let before = proposal.clone();
                match proposal.move_judgments(from, into) {
                    Ok(()) => prop_assert_eq!(proposal.total_judgments(), total_before),
                    Err(_) => prop_assert_eq!(proposal, before),
                }
            }
        }
    }
}
