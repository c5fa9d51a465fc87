//! Report generation timestamps.
//!
//! Reports carry their generation time as a Unix epoch. Headers show it in the
//! viewer's local time; the host supplies its UTC offset since the core has no
//! access to the browser's time zone.

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::{ModelError, ModelResult};

/// Format `epoch` as `YYYY-MM-DD HH:MM` at `utc_offset_seconds` east of UTC.
///
/// Out-of-range offsets are clamped to UTC.
pub fn format_local(epoch: i64, utc_offset_seconds: i32) -> ModelResult<String> {
    let offset = UtcOffset::from_whole_seconds(utc_offset_seconds).unwrap_or(UtcOffset::UTC);
    let at = OffsetDateTime::from_unix_timestamp(epoch)
        .map_err(|_| ModelError::EpochOutOfRange(epoch))?
        .to_offset(offset);
    at.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .map_err(|_| ModelError::EpochOutOfRange(epoch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_in_utc() {
        assert_eq!(format_local(1_637_552_520, 0).unwrap(), "2021-11-22 03:42");
    }

    #[test]
    fn applies_host_offset() {
        // UTC-8
        assert_eq!(
            format_local(1_637_552_520, -8 * 3600).unwrap(),
            "2021-11-21 19:42"
        );
    }

    #[test]
    fn invalid_offset_falls_back_to_utc() {
        assert_eq!(
            format_local(1_637_552_520, 100 * 3600).unwrap(),
            "2021-11-22 03:42"
        );
    }

    #[test]
    fn rejects_unrepresentable_epoch() {
        assert!(matches!(
            format_local(i64::MAX, 0),
            Err(ModelError::EpochOutOfRange(_))
        ));
    }
}
