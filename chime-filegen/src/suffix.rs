//! Generation suffix text and the validity that goes with it.
//!
//! A suffix names the generation that covers a given stamp under a rotation
//! policy, and carries the [`Validity`] under which a file opened with that
//! suffix remains the right target. The two are always built together so a
//! caller cannot pair a name with the wrong window.

use chime_calendar::{
    civil_date, day_bounds, iso_week, month_bounds, week_bounds, year_bounds, CalendarError,
    SECS_PER_DAY,
};
use chrono::Datelike;

use crate::generation::RotationPolicy;
use crate::validity::Validity;

/// Separator between the bare file name and a generation suffix.
pub const SUFFIX_SEP: char = '.';

/// Suffix for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenSuffix {
    /// Text appended to the bare name, separator included. Empty when the
    /// policy keeps a single file.
    pub text: String,
    /// Condition under which the generation stays current.
    pub validity: Validity,
}

/// Build the suffix naming the generation that covers `stamp` under `policy`.
///
/// `pivot` (Unix seconds) disambiguates which 136-year era the 32-bit stamp
/// falls in; `pid` names per-process generations. Calendar-based policies
/// fail only when the unfolded instant lands outside the representable
/// calendar.
pub fn build_suffix(
    policy: RotationPolicy,
    stamp: u32,
    pivot: i64,
    pid: u32,
) -> Result<GenSuffix, CalendarError> {
    match policy {
        RotationPolicy::None => Ok(GenSuffix {
            text: String::new(),
            validity: Validity::Always,
        }),
        RotationPolicy::ByProcessId => Ok(GenSuffix {
            text: format!("{}#{}", SUFFIX_SEP, pid),
            validity: Validity::Pid(pid),
        }),
        RotationPolicy::ByDay => {
            let date = civil_date(stamp, pivot)?;
            let (lo, hi) = day_bounds(stamp, pivot)?;
            Ok(GenSuffix {
                text: format!(
                    "{}{:04}{:02}{:02}",
                    SUFFIX_SEP,
                    date.year(),
                    date.month(),
                    date.day()
                ),
                validity: Validity::Window { lo, hi },
            })
        }
        RotationPolicy::ByWeek => {
            // ISO numbering year, not the civil year: 2024-12-30 is 2025w01.
            let week = iso_week(stamp, pivot)?;
            let (lo, hi) = week_bounds(stamp, pivot)?;
            Ok(GenSuffix {
                text: format!("{}{:04}w{:02}", SUFFIX_SEP, week.year(), week.week()),
                validity: Validity::Window { lo, hi },
            })
        }
        RotationPolicy::ByMonth => {
            let date = civil_date(stamp, pivot)?;
            let (lo, hi) = month_bounds(stamp, pivot)?;
            Ok(GenSuffix {
                text: format!("{}{:04}{:02}", SUFFIX_SEP, date.year(), date.month()),
                validity: Validity::Window { lo, hi },
            })
        }
        RotationPolicy::ByYear => {
            let date = civil_date(stamp, pivot)?;
            let (lo, hi) = year_bounds(stamp, pivot)?;
            Ok(GenSuffix {
                text: format!("{}{:04}", SUFFIX_SEP, date.year()),
                validity: Validity::Window { lo, hi },
            })
        }
        RotationPolicy::ByAge => {
            // Fixed 24-hour buckets aligned to the stamp space, no calendar.
            let lo = stamp - stamp % SECS_PER_DAY;
            Ok(GenSuffix {
                text: format!("{}a{:08}", SUFFIX_SEP, lo),
                validity: Validity::Window {
                    lo,
                    hi: lo.wrapping_add(SECS_PER_DAY),
                },
            })
        }
    }
}
