/// Verdict for one candidate in a newest-first scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan<T> {
    /// Emit this value and keep scanning
    Yield(T),

    /// Nothing to emit here, keep scanning
    Skip,

    /// This candidate and everything after it is out of the window
    Stop,
}

impl<T> Scan<T> {
    pub fn into_yielded(self) -> Option<T> {
        match self {
            Self::Yield(value) => Some(value),
            Self::Skip | Self::Stop => None,
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Lazily evaluates candidates until the first `Stop`
///
/// Candidates after a `Stop` are never evaluated.
pub fn scan_until_stop<I, T, F>(candidates: I, evaluate: F) -> impl Iterator<Item = T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Scan<T>,
{
    candidates
        .into_iter()
        .map(evaluate)
        .take_while(|verdict| !verdict.is_stop())
        .filter_map(Scan::into_yielded)
}
