//! Validity of an open generation against the current time.

/// Condition under which an open generation file remains the right target.
///
/// Window rule: with `lo < hi` the window covers `[lo, hi)`. With
/// `lo >= hi` the window wraps past the end of the 32-bit era and covers
/// `[lo, 2^32)` plus `[0, hi)`; the degenerate `lo == hi` case therefore
/// covers the whole era.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Never rotates on time; the single file is always current.
    Always,
    /// Current while the recorded process id is the live one.
    Pid(u32),
    /// Current within a half-open, possibly wrapping stamp window.
    Window { lo: u32, hi: u32 },
}

impl Validity {
    /// Whether the generation opened under this validity is still the right
    /// target at stamp `now` for process `pid`.
    pub fn is_current(&self, now: u32, pid: u32) -> bool {
        match *self {
            Validity::Always => true,
            Validity::Pid(opened_by) => opened_by == pid,
            Validity::Window { lo, hi } => {
                if lo < hi {
                    lo <= now && now < hi
                } else {
                    now >= lo || now < hi
                }
            }
        }
    }
}
