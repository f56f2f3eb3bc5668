use serde::{Deserialize, Serialize};

/// A similarity metric supported by the distance kernels and the graph
/// search state machine.
///
/// `Cosine` is defined in terms of `InnerProduct`: the kernels normalize at
/// query-fix time rather than carrying a separate code path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceFunction {
    Euclidean,
    InnerProduct,
    Cosine,
}

impl DistanceFunction {
    /// Whether smaller values of this metric mean "more similar".
    ///
    /// `Euclidean` is a true distance (smaller is closer). `InnerProduct`
    /// and `Cosine` are similarities in the algebraic sense but this
    /// workspace follows the teacher convention of returning `1 - sim` so
    /// every metric orders the same way: smaller is better.
    pub fn smaller_is_better(&self) -> bool {
        true
    }

    pub fn name(&self) -> &'static str {
        match self {
            DistanceFunction::Euclidean => "l2",
            DistanceFunction::InnerProduct => "ip",
            DistanceFunction::Cosine => "cosine",
        }
    }
}

impl std::fmt::Display for DistanceFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
