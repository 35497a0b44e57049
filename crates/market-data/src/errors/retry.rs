/// Classification for retry policy.
///
/// Used by the fetchers to decide what to do with a failed provider call.
///
/// | Class | Sleep and try again? | Counts toward the attempt budget? |
/// |-------|----------------------|-----------------------------------|
/// | `WithBackoff` | Yes, until the budget is spent | Yes |
/// | `Never` | No, give up immediately | n/a |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Transient failure: throttling, timeout, transport or server error.
    WithBackoff,

    /// The request is fundamentally invalid or cannot be served this run.
    Never,
}
