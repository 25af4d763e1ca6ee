/// Counters accumulated across one solving invocation.
///
/// Written on success and on controlled failure (timeout, exhausted
/// candidates); reset at the start of every public solving call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SolveStats {
    /// AC-3 runs: full passes plus incremental propagations.
    pub ac3_calls: u64,
    /// Values pruned from domains by `revise`.
    pub values_eliminated: u64,
    /// Tentative assignments made by the search.
    pub cells_assigned: u64,
    /// Candidates undone after a dead end or timeout.
    pub total_backtracks: u64,
    /// Deepest recursion frame reached.
    pub max_depth: u32,
    /// Wall-clock time of the invocation.
    pub time_ms: u64,
}

impl SolveStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
