/*!
Majority Judgment deliberation.

Each proposal of a poll is judged by the whole electorate on an ordinal
grade scale (index `0` is the "worst", most conservative grade). The
deliberator ranks the proposals by their median grade, iteratively peeling
the median to break ties, as described in
<https://en.wikipedia.org/wiki/Majority_judgment>.

All arithmetic is exact: judgment counts are big integers, because the
LCM-based [`normalized`] balancing can produce judge amounts far beyond
machine-word range.

```
use majority_judgment::{MajorityJudgmentDeliberator, ProposalTally, Tally};

let tally = Tally::with_inferred_judges(vec![
    ProposalTally::from_counts(&[1, 9]),
    ProposalTally::from_counts(&[9, 1]),
]);
let deliberator = MajorityJudgmentDeliberator::default();
let result = deliberator.deliberate(&tally)?;
assert_eq!(result.proposal_results[0].rank, 1);
assert_eq!(result.proposal_results[1].rank, 2);
# Ok::<(), majority_judgment::TallyError>(())
```
*/

mod analysis;
mod balancing;
mod collector;
mod errors;
mod tally;

pub use crate::analysis::ProposalAnalysis;
pub use crate::balancing::{median_default, normalized, static_default, DefaultGradeStrategy};
pub use crate::collector::TallyCollector;
pub use crate::errors::TallyError;
pub use crate::tally::{ProposalTally, Tally};

use log::{debug, info};
use num::bigint::BigInt;
use num::traits::Zero;

// **** Output structures ****

/// The outcome for one proposal: its 1-based rank (tied proposals share a
/// rank), its score, and the analysis of its profile as submitted.
///
/// Scores are fixed-width strings compared lexicographically; a higher
/// score means a better rank.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ProposalResult {
    pub rank: usize,
    pub score: String,
    pub analysis: ProposalAnalysis,
}

/// One [`ProposalResult`] per input proposal, in the original submission
/// order, not in rank order. Callers wanting rank order sort explicitly.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DeliberationResult {
    pub proposal_results: Vec<ProposalResult>,
}

/// Deliberates using Majority Judgment.
///
/// Sorts proposals by their median grade. When two proposals share the same
/// median grade, gives reason to the largest group of judges that did not
/// give the median grade.
///
/// The algorithm is score-based: each proposal independently gets a string
/// score, built by repeatedly analyzing its profile and merging the median
/// grade away, so that plain lexicographic comparison of scores yields the
/// majority-judgment order.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct MajorityJudgmentDeliberator {
    favor_contestation: bool,
    numerize_score: bool,
}

impl Default for MajorityJudgmentDeliberator {
    /// Favors contestation (the lower median), with human-readable scores.
    fn default() -> MajorityJudgmentDeliberator {
        MajorityJudgmentDeliberator {
            favor_contestation: true,
            numerize_score: false,
        }
    }
}

impl MajorityJudgmentDeliberator {
    /// `favor_contestation` biases median picks and second-median ties
    /// toward the more conservative grade. `numerize_score` drops the
    /// separators from scores so they match `^[0-9]+$`, for storage in
    /// systems that only compare digit strings.
    pub fn new(favor_contestation: bool, numerize_score: bool) -> MajorityJudgmentDeliberator {
        MajorityJudgmentDeliberator {
            favor_contestation,
            numerize_score,
        }
    }

    /// Runs the deliberation on a coherent, balanced tally.
    ///
    /// Validation is eager: an incoherent tally (negative counts) or an
    /// unbalanced one (unequal judgment totals) fails before any scoring
    /// work, so callers never see a partially-computed result. Unbalanced
    /// tallies are recoverable through [`static_default`],
    /// [`median_default`] or [`normalized`].
    pub fn deliberate(&self, tally: &Tally) -> Result<DeliberationResult, TallyError> {
        check_tally(tally)?;

        let judge_count = tally.judge_count();
        info!(
            "deliberate: {} proposals on {} grades, {} judges",
            tally.proposal_count(),
            tally.grade_count(),
            judge_count
        );

        // I. Compute the score of each proposal. No cross-proposal state:
        // each score only reads the proposal's own profile.
        let mut scored: Vec<(String, ProposalAnalysis)> =
            Vec::with_capacity(tally.proposal_count());
        for (index, proposal) in tally.proposals().iter().enumerate() {
            let score = compute_score(
                proposal,
                judge_count,
                self.favor_contestation,
                self.numerize_score,
            )?;
            let analysis = ProposalAnalysis::new(proposal, self.favor_contestation);
            debug!("deliberate: proposal {} scored {:?}", index, score);
            scored.push((score, analysis));
        }

        // II. Sort by score, lexicographical inverse.
        let mut order: Vec<usize> = (0..scored.len()).collect();
        order.sort_by(|&left, &right| scored[right].0.cmp(&scored[left].0));

        // III. Attribute a rank to each proposal. Standard competition
        // ranking: tied scores share a rank, the next distinct score takes
        // its sorted position plus one (1, 2, 2, 4).
        let mut ranks = vec![0usize; scored.len()];
        for (position, &index) in order.iter().enumerate() {
            let previous = if position > 0 {
                Some(order[position - 1])
            } else {
                None
            };
            ranks[index] = match previous {
                Some(before) if scored[index].0 == scored[before].0 => ranks[before],
                _ => position + 1,
            };
        }

        // IV. Assemble, in submission order.
        let proposal_results = scored
            .into_iter()
            .zip(ranks)
            .map(|((score, analysis), rank)| ProposalResult {
                rank,
                score,
                analysis,
            })
            .collect();
        Ok(DeliberationResult { proposal_results })
    }
}

/// Coherence first (no negative counts, one shared grade scale), then
/// balance (every total equals the judge amount). A tally without any
/// proposal is degenerate, like a zero-proposal collector.
fn check_tally(tally: &Tally) -> Result<(), TallyError> {
    if tally.proposal_count() == 0 {
        return Err(TallyError::Construction {
            proposals: 0,
            grades: tally.grade_count(),
        });
    }
    let grades = tally.grade_count();
    for proposal in tally.proposals() {
        if proposal.grade_count() != grades {
            return Err(TallyError::MismatchedGradeCounts {
                expected: grades,
                found: proposal.grade_count(),
            });
        }
        if proposal
            .merit_profile()
            .iter()
            .any(|count| count < &BigInt::zero())
        {
            return Err(TallyError::Incoherent);
        }
    }
    for proposal in tally.proposals() {
        if &proposal.total_judgments() != tally.judge_count() {
            return Err(TallyError::Unbalanced);
        }
    }
    Ok(())
}

/// Builds the score of one proposal: `grade_count` fields, each holding the
/// current median grade left-padded to the width of the grade count, then
/// the judge amount adjusted by the signed second-median group size,
/// left-padded to one digit more than the judge amount. After each field
/// the median grade's judgments are merged into the second-median grade,
/// removing that median from contention for the next field.
///
/// Works on a private clone; the submitted profile is never mutated.
fn compute_score(
    proposal: &ProposalTally,
    judge_count: &BigInt,
    favor_contestation: bool,
    only_numbers: bool,
) -> Result<String, TallyError> {
    let grade_count = proposal.grade_count();
    let digits_for_grade = count_digits(grade_count);
    let digits_for_group = count_digits(judge_count) + 1;

    let mut current = proposal.clone();
    let mut analysis = ProposalAnalysis::default();
    let mut score = String::new();

    for turn in 0..grade_count {
        analysis.update(&current, favor_contestation);

        if turn > 0 && !only_numbers {
            score.push('/');
        }
        score.push_str(&format!(
            "{:0>width$}",
            analysis.median_grade(),
            width = digits_for_grade
        ));
        if !only_numbers {
            score.push('_');
        }
        let sign = BigInt::from(analysis.second_median_group_sign());
        let adjusted_group = judge_count + analysis.second_median_group_size() * &sign;
        score.push_str(&format!(
            "{:0>width$}",
            adjusted_group,
            width = digits_for_group
        ));

        current.move_judgments(analysis.median_grade(), analysis.second_median_grade())?;
    }

    Ok(score)
}

fn count_digits(value: impl ToString) -> usize {
    value.to_string().len()
}
