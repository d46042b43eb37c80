use num::bigint::BigInt;
use num::traits::One;

use crate::errors::TallyError;
use crate::tally::{guess_judge_count, ProposalTally, Tally};

/// Collects individual judgments, one ballot cell at a time.
///
/// This is the in-memory producer of the [`Tally`] the deliberator consumes:
/// every call to [`TallyCollector::collect`] increments one grade of one
/// proposal by one judgment.
///
/// ```
/// use majority_judgment::{MajorityJudgmentDeliberator, TallyCollector};
///
/// let mut collector = TallyCollector::new(2, 3)?;
/// collector.collect(0, 2)?;
/// collector.collect(1, 0)?;
/// let result = MajorityJudgmentDeliberator::default().deliberate(&collector.into_tally())?;
/// assert_eq!(result.proposal_results[0].rank, 1);
/// # Ok::<(), majority_judgment::TallyError>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyCollector {
    proposals: Vec<ProposalTally>,
}

impl TallyCollector {
    /// Creates a collector for `proposal_count` proposals judged on a scale
    /// of `grade_count` grades, every count starting at zero.
    ///
    /// Rejects degenerate sizes: a poll needs at least one proposal and at
    /// least two grades.
    pub fn new(proposal_count: usize, grade_count: usize) -> Result<TallyCollector, TallyError> {
        if proposal_count < 1 || grade_count < 2 {
            return Err(TallyError::Construction {
                proposals: proposal_count,
                grades: grade_count,
            });
        }
        let blank = ProposalTally::from_counts(&vec![0; grade_count]);
        Ok(TallyCollector {
            proposals: vec![blank; proposal_count],
        })
    }

    /// Registers one judge's grade for one proposal.
    pub fn collect(&mut self, proposal: usize, grade: usize) -> Result<(), TallyError> {
        if proposal >= self.proposal_count() {
            return Err(TallyError::ProposalOutOfRange {
                index: proposal,
                proposals: self.proposal_count(),
            });
        }
        if grade >= self.grade_count() {
            return Err(TallyError::GradeOutOfRange {
                index: grade,
                grades: self.grade_count(),
            });
        }
        self.proposals[proposal].add_judgments(grade, BigInt::one());
        Ok(())
    }

    pub fn proposals(&self) -> &[ProposalTally] {
        &self.proposals
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    pub fn grade_count(&self) -> usize {
        self.proposals[0].grade_count()
    }

    /// The judge amount collected so far: the largest judgment total across
    /// proposals, since a judge may not have graded every proposal yet.
    pub fn judge_count(&self) -> BigInt {
        guess_judge_count(&self.proposals)
    }

    /// Yields the collected profiles as a tally, inferring the judge count.
    pub fn into_tally(self) -> Tally {
        Tally::with_inferred_judges(self.proposals)
    }
}
