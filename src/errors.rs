use thiserror::Error;

/// Errors raised while collecting, balancing or deliberating a tally.
///
/// All of these are detected eagerly and none of them is auto-corrected:
/// an unbalanced tally in particular is recoverable only by resubmitting
/// through one of the balancing constructors.
#[derive(Eq, PartialEq, Debug, Clone, Error)]
pub enum TallyError {
    /// The tally holds at least one negative judgment count.
    #[error("the provided tally holds negative judgment counts")]
    Incoherent,
    /// The proposals did not all receive the same amount of judgments.
    #[error(
        "the provided tally is unbalanced, as some proposals received more judgments \
         than others; balance it first with `static_default`, `median_default` or `normalized`"
    )]
    Unbalanced,
    /// Normalization is undefined when a proposal received no judgments.
    #[error("cannot normalize: proposal {proposal} received no judgments")]
    Normalization { proposal: usize },
    /// A grade index outside of the `0..grades` scale.
    #[error("grade index {index} is out of range ({grades} grades)")]
    GradeOutOfRange { index: usize, grades: usize },
    /// A proposal index outside of the `0..proposals` range.
    #[error("proposal index {index} is out of range ({proposals} proposals)")]
    ProposalOutOfRange { index: usize, proposals: usize },
    /// A poll needs at least one proposal and at least two grades.
    #[error("degenerate poll: {proposals} proposal(s) on {grades} grade(s)")]
    Construction { proposals: usize, grades: usize },
    /// A proposal already holds more judgments than the judge amount it
    /// should be topped up to.
    #[error("proposal {proposal} received more judgments than there are judges")]
    ExcessJudgments { proposal: usize },
    /// All proposals of a tally must be judged on the same grade scale.
    #[error("proposals disagree on the grade scale: expected {expected} grades, found {found}")]
    MismatchedGradeCounts { expected: usize, found: usize },
}
