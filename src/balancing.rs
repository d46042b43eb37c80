//! Balancing strategies for tallies whose proposals received unequal
//! amounts of judgments.
//!
//! The deliberator expects every proposal to hold the same amount of
//! judgments and refuses to guess otherwise. These constructors each turn a
//! possibly-unbalanced set of merit profiles into a balanced [`Tally`]:
//! two of them top proposals up to the judge amount with a default grade,
//! the third rescales the profiles to the least common multiple of their
//! totals, which amounts to using percentages, except without any
//! floating-point arithmetic.

use log::debug;
use num::bigint::BigInt;
use num::integer::lcm;
use num::traits::{One, Zero};

use crate::analysis::ProposalAnalysis;
use crate::errors::TallyError;
use crate::tally::{ProposalTally, Tally};

/// Chooses, per proposal, the grade that absorbs the missing judgments.
pub trait DefaultGradeStrategy {
    fn choose_default_grade(&self, proposal: &ProposalTally) -> usize;
}

struct StaticGrade(usize);

impl DefaultGradeStrategy for StaticGrade {
    fn choose_default_grade(&self, _proposal: &ProposalTally) -> usize {
        self.0
    }
}

struct MedianGrade;

impl DefaultGradeStrategy for MedianGrade {
    fn choose_default_grade(&self, proposal: &ProposalTally) -> usize {
        ProposalAnalysis::new(proposal, true).median_grade()
    }
}

/// Balances by topping every proposal up to `judge_count` judgments, all of
/// the shortfall going into the single caller-chosen `default_grade`.
///
/// Fails if `default_grade` is not on the grade scale of every proposal, or
/// if a proposal already holds more judgments than `judge_count`.
pub fn static_default(
    proposals: &[ProposalTally],
    judge_count: BigInt,
    default_grade: usize,
) -> Result<Tally, TallyError> {
    for proposal in proposals {
        if default_grade >= proposal.grade_count() {
            return Err(TallyError::GradeOutOfRange {
                index: default_grade,
                grades: proposal.grade_count(),
            });
        }
    }
    fill_with_default_grade(proposals, judge_count, &StaticGrade(default_grade))
}

/// Balances by topping every proposal up with its own current median grade:
/// the missing judgments are assumed to agree with the judgments already
/// expressed, a neutral assumption.
pub fn median_default(
    proposals: &[ProposalTally],
    judge_count: BigInt,
) -> Result<Tally, TallyError> {
    fill_with_default_grade(proposals, judge_count, &MedianGrade)
}

fn fill_with_default_grade(
    proposals: &[ProposalTally],
    judge_count: BigInt,
    strategy: &dyn DefaultGradeStrategy,
) -> Result<Tally, TallyError> {
    let mut filled = Vec::with_capacity(proposals.len());

    for (index, proposal) in proposals.iter().enumerate() {
        let missing = &judge_count - proposal.total_judgments();
        if missing < BigInt::zero() {
            return Err(TallyError::ExcessJudgments { proposal: index });
        }

        let mut topped_up = proposal.clone();
        if missing > BigInt::zero() {
            let default_grade = strategy.choose_default_grade(proposal);
            debug!(
                "fill_with_default_grade: proposal {} gets {} judgments on grade {}",
                index, missing, default_grade
            );
            topped_up.add_judgments(default_grade, missing);
        }
        filled.push(topped_up);
    }

    Ok(Tally::new(filled, judge_count))
}

/// Balances by rescaling every profile to the least common multiple of the
/// judgment totals, elementwise and exactly. Any judge amount supplied
/// elsewhere is ignored; the LCM becomes the judge amount.
///
/// Fails if a proposal received no judgments at all, since the LCM would
/// collapse to zero.
pub fn normalized(proposals: &[ProposalTally]) -> Result<Tally, TallyError> {
    let mut judge_count = BigInt::one();
    for (index, proposal) in proposals.iter().enumerate() {
        let total = proposal.total_judgments();
        if total.is_zero() {
            return Err(TallyError::Normalization { proposal: index });
        }
        judge_count = lcm(judge_count, total);
    }
    debug!("normalized: least common multiple of totals is {}", judge_count);

    let mut rescaled = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        let factor = &judge_count / proposal.total_judgments();
        let mut normalized_proposal = proposal.clone();
        normalized_proposal.scale(&factor);
        rescaled.push(normalized_proposal);
    }

    Ok(Tally::new(rescaled, judge_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_default_tops_up_to_the_judge_amount() {
        let tally = static_default(
            &[
                ProposalTally::from_counts(&[2, 1]),
                ProposalTally::from_counts(&[1, 1]),
            ],
            BigInt::from(3u64),
            0,
        )
        .unwrap();
        assert_eq!(tally.proposals()[0], ProposalTally::from_counts(&[2, 1]));
        assert_eq!(tally.proposals()[1], ProposalTally::from_counts(&[2, 1]));
        for proposal in tally.proposals() {
            assert_eq!(&proposal.total_judgments(), tally.judge_count());
        }
    }

    #[test]
    fn static_default_rejects_excess_judgments() {
        let result = static_default(
            &[ProposalTally::from_counts(&[2, 3])],
            BigInt::from(4u64),
            0,
        );
        assert_eq!(result, Err(TallyError::ExcessJudgments { proposal: 0 }));
    }

    #[test]
    fn static_default_rejects_a_grade_off_the_scale() {
        let result = static_default(
            &[ProposalTally::from_counts(&[2, 3])],
            BigInt::from(9u64),
            2,
        );
        assert_eq!(
            result,
            Err(TallyError::GradeOutOfRange {
                index: 2,
                grades: 2
            })
        );
    }

    #[test]
    fn median_default_tops_up_with_each_proposal_median() {
        let tally = median_default(
            &[
                ProposalTally::from_counts(&[0, 3, 1]),
                ProposalTally::from_counts(&[4, 0, 1]),
            ],
            BigInt::from(6u64),
        )
        .unwrap();
        // [0, 3, 1] has median grade 1, [4, 0, 1] has median grade 0.
        assert_eq!(tally.proposals()[0], ProposalTally::from_counts(&[0, 5, 1]));
        assert_eq!(tally.proposals()[1], ProposalTally::from_counts(&[5, 0, 1]));
    }

    #[test]
    fn normalization_rescales_to_the_lcm_of_totals() {
        let tally = normalized(&[
            ProposalTally::from_counts(&[31, 72]),
            ProposalTally::from_counts(&[42, 42]),
        ])
        .unwrap();
        // lcm(103, 84) = 8652
        assert_eq!(tally.judge_count(), &BigInt::from(8652u64));
        assert_eq!(
            tally.proposals()[0],
            ProposalTally::from_counts(&[2604, 6048])
        );
        assert_eq!(
            tally.proposals()[1],
            ProposalTally::from_counts(&[4326, 4326])
        );
    }

    #[test]
    fn normalization_is_idempotent_on_equal_totals() {
        let proposals = [
            ProposalTally::from_counts(&[1, 2]),
            ProposalTally::from_counts(&[2, 1]),
        ];
        let tally = normalized(&proposals).unwrap();
        assert_eq!(tally.judge_count(), &BigInt::from(3u64));
        assert_eq!(tally.proposals(), &proposals);
    }

    #[test]
    fn normalization_rejects_a_judgeless_proposal() {
        let result = normalized(&[
            ProposalTally::from_counts(&[1, 2]),
            ProposalTally::from_counts(&[0, 0]),
        ]);
        assert_eq!(result, Err(TallyError::Normalization { proposal: 1 }));
    }

    #[test]
    fn gcd_and_lcm_are_exact() {
        use num::integer::gcd;
        assert_eq!(
            gcd(BigInt::from(12u64), BigInt::from(18u64)),
            BigInt::from(6u64)
        );
        assert_eq!(
            lcm(BigInt::from(12u64), BigInt::from(18u64)),
            BigInt::from(36u64)
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn proposals_strategy() -> impl Strategy<Value = Vec<Vec<u64>>> {
            (2usize..=5).prop_flat_map(|grades| {
                proptest::collection::vec(
                    proptest::collection::vec(0u64..50, grades),
                    1..=5,
                )
            })
        }

        proptest! {
            #[test]
            fn top_up_strategies_always_balance(profiles in proposals_strategy()) {
                let proposals: Vec<ProposalTally> =
                    profiles.iter().map(|p| ProposalTally::from_counts(p)).collect();
                let judge_count = crate::tally::guess_judge_count(&proposals);

                let on_static =
                    static_default(&proposals, judge_count.clone(), 0).unwrap();
                let on_median =
                    median_default(&proposals, judge_count.clone()).unwrap();
                for tally in [&on_static, &on_median] {
                    for proposal in tally.proposals() {
                        prop_assert_eq!(&proposal.total_judgments(), tally.judge_count());
                    }
                }
            }

            #[test]
            fn normalization_always_balances(profiles in proposals_strategy()) {
                let proposals: Vec<ProposalTally> = profiles
                    .iter()
                    // Give every proposal at least one judgment so the LCM is defined.
                    .map(|p| {
                        let mut counts = p.clone();
                        counts[0] += 1;
                        ProposalTally::from_counts(&counts)
                    })
                    .collect();
                let tally = normalized(&proposals).unwrap();
                for proposal in tally.proposals() {
                    prop_assert_eq!(&proposal.total_judgments(), tally.judge_count());
                }
            }
        }
    }
}
