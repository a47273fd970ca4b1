//! Human-readable labor time formatting
//!
//! Totals are carried as whole minutes; screens show them as hours plus
//! remaining minutes (`2h 5m`).

/// Split whole minutes into `(hours, minutes)`
///
/// Negative input is treated as zero.
///
/// # Examples
///
/// ```
/// use fq_common::human_time::split_minutes;
///
/// assert_eq!(split_minutes(125), (2, 5));
/// assert_eq!(split_minutes(59), (0, 59));
/// ```
pub fn split_minutes(total_minutes: i64) -> (i64, i64) {
    let total = total_minutes.max(0);
    (total / 60, total % 60)
}

/// Format whole minutes as `Hh Mm`
///
/// # Examples
///
/// ```
/// use fq_common::human_time::format_minutes;
///
/// assert_eq!(format_minutes(0), "0h 0m");
/// assert_eq!(format_minutes(125), "2h 5m");
/// ```
pub fn format_minutes(total_minutes: i64) -> String {
    let (hours, minutes) = split_minutes(total_minutes);
    format!("{}h {}m", hours, minutes)
}
