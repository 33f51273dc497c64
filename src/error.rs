use thiserror::Error;

/// Errors surfaced by model construction, standardization, and the simplex
/// engine. Every variant is recoverable at the caller's discretion; none
/// aborts the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// A shape contract was violated (matrix/vector sizes disagree).
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A referenced variable is absent from the model's variable list.
    #[error("variable \"{name}\" is not in the model's variable list")]
    VariableNotFound { name: String },

    /// The basis sub-matrix could not be inverted. Carries the names of the
    /// variables that formed the basis so a bad pivot choice can be diagnosed.
    #[error("singular basis formed by [{}]", basis.join(", "))]
    SingularBasis { basis: Vec<String> },

    /// A constraint sense or shape the standard-form transformer cannot
    /// normalize.
    #[error("unsupported constraint form: {reason}")]
    UnsupportedConstraintForm { reason: String },

    /// Only continuous variables are supported by the solver.
    #[error("variable \"{name}\" is not continuous")]
    UnsupportedVariableDomain { name: String },
}
