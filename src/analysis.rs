use num::bigint::BigInt;
use num::traits::Zero;

use crate::tally::ProposalTally;

/// Statistical snapshot of one merit profile.
///
/// Locates the median grade, the contestation group (all judgments strictly
/// below the median) and the adhesion group (all judgments strictly above),
/// and decides which of the two is the "second median" group. Does NOT
/// compute a rank; the deliberator derives its scores from these fields.
///
/// Group sizes are big integers because in a normalization scenario the
/// judge amount is the least common multiple of the proposals' judgment
/// totals. It makes the code a bit harder to read, but it sidesteps the
/// floating-point nightmare of normalizing merit profiles.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ProposalAnalysis {
    total_size: BigInt,
    median_grade: usize,
    median_group_size: BigInt,
    contestation_grade: usize,
    contestation_group_size: BigInt,
    adhesion_grade: usize,
    adhesion_group_size: BigInt,
    second_median_grade: usize,
    second_median_group_size: BigInt,
    second_median_group_sign: i8,
}

impl ProposalAnalysis {
    /// Analyzes one merit profile. `favor_contestation` biases both the
    /// median pick (lower median) and the second-median tie toward the more
    /// conservative grade; it is a policy choice, not a derived fact.
    pub fn new(proposal: &ProposalTally, favor_contestation: bool) -> ProposalAnalysis {
        let mut analysis = ProposalAnalysis::default();
        analysis.update(proposal, favor_contestation);
        analysis
    }

    /// Recomputes every field from the given profile. Each call starts from
    /// scratch; there is no incremental maintenance.
    pub fn update(&mut self, proposal: &ProposalTally, favor_contestation: bool) {
        *self = ProposalAnalysis::default();

        let merit_profile = proposal.merit_profile();
        for grade_tally in merit_profile {
            self.total_size += grade_tally;
        }

        let adjusted_total = if favor_contestation {
            self.total_size.clone() - 1
        } else {
            self.total_size.clone()
        };
        let median_index: BigInt = adjusted_total / 2;

        // Walk the grades worst to best, classifying each grade's half-open
        // mass interval [start, cursor) against the median index.
        let mut cursor = BigInt::zero();
        let mut adhesion_grade_found = false;

        for (grade, grade_tally) in merit_profile.iter().enumerate() {
            if grade_tally.is_zero() {
                continue;
            }

            let start = cursor.clone();
            cursor += grade_tally;

            if start < median_index && cursor <= median_index {
                // Wholly below the median.
                self.contestation_group_size += grade_tally;
                self.contestation_grade = grade;
            } else if start <= median_index && median_index < cursor {
                // Straddles the median: this grade IS the median.
                self.median_group_size = grade_tally.clone();
                self.median_grade = grade;
            } else if start > median_index && median_index < cursor {
                // Wholly above the median. Keep the first such grade.
                self.adhesion_group_size += grade_tally;
                if !adhesion_grade_found {
                    self.adhesion_grade = grade;
                    adhesion_grade_found = true;
                }
            }
        }

        let contestation_is_biggest = if favor_contestation {
            self.adhesion_group_size <= self.contestation_group_size
        } else {
            self.adhesion_group_size < self.contestation_group_size
        };

        if contestation_is_biggest {
            self.second_median_grade = self.contestation_grade;
            self.second_median_group_size = self.contestation_group_size.clone();
            if !self.second_median_group_size.is_zero() {
                self.second_median_group_sign = -1;
            }
        } else {
            self.second_median_grade = self.adhesion_grade;
            self.second_median_group_size = self.adhesion_group_size.clone();
            if !self.second_median_group_size.is_zero() {
                self.second_median_group_sign = 1;
            }
        }
    }

    /// The total amount of judgments in the profile.
    pub fn total_size(&self) -> &BigInt {
        &self.total_size
    }

    /// The grade holding the statistical median of all judgments.
    pub fn median_grade(&self) -> usize {
        self.median_grade
    }

    pub fn median_group_size(&self) -> &BigInt {
        &self.median_group_size
    }

    /// The "best" grade of the contestation group.
    pub fn contestation_grade(&self) -> usize {
        self.contestation_grade
    }

    pub fn contestation_group_size(&self) -> &BigInt {
        &self.contestation_group_size
    }

    /// The "worst" grade of the adhesion group.
    pub fn adhesion_grade(&self) -> usize {
        self.adhesion_grade
    }

    pub fn adhesion_group_size(&self) -> &BigInt {
        &self.adhesion_group_size
    }

    /// The grade of the biggest group outside the median.
    pub fn second_median_grade(&self) -> usize {
        self.second_median_grade
    }

    pub fn second_median_group_size(&self) -> &BigInt {
        &self.second_median_group_size
    }

    /// `-1` when the second-median group is the contestation group, `+1`
    /// when it is the adhesion group, `0` when both groups are empty.
    pub fn second_median_group_sign(&self) -> i8 {
        self.second_median_group_sign
    }
}
