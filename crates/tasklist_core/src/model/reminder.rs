//! Reminder value type.
//!
//! # Responsibility
//! - Hold the date/time pair a user attached to a task.
//! - Derive the absolute local instant a reminder refers to.
//!
//! # Invariants
//! - A `Reminder` always carries both a non-blank date and a non-blank time.
//!   Partial input collapses to "no reminder" instead of an error.
//! - Raw strings are kept verbatim (trimmed) so persisted data round-trips
//!   even when it does not parse as a calendar instant.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];
const DISPLAY_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

/// Date/time reminder attached to a task.
///
/// Serialized as `{"date":"YYYY-MM-DD","time":"HH:MM"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reminder {
    date: String,
    time: String,
}

impl Reminder {
    /// Builds a reminder from raw date and time strings.
    ///
    /// Returns `None` when either part is blank after trimming.
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Option<Self> {
        ReminderDraft {
            date: Some(date.into()),
            time: Some(time.into()),
        }
        .normalize()
    }

    /// ISO calendar date, e.g. `2026-12-25`.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// 24h wall-clock time, e.g. `14:00`.
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Parses the reminder into a naive local date-time.
    ///
    /// Accepts `HH:MM` and `HH:MM:SS` time strings.
    pub fn naive_datetime(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()?;
        let time = TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(&self.time, format).ok())?;
        Some(date.and_time(time))
    }

    /// Resolves the reminder to an absolute instant in the local timezone.
    ///
    /// Returns `None` for unparseable strings and for local times skipped by
    /// a DST transition. Ambiguous local times resolve to the earlier instant.
    pub fn instant(&self) -> Option<DateTime<Local>> {
        let naive = self.naive_datetime()?;
        Local.from_local_datetime(&naive).earliest()
    }

    /// Human-readable label such as `Jan 15, 2026 2:30 PM`.
    pub fn display_label(&self) -> Option<String> {
        self.naive_datetime()
            .map(|value| value.format(DISPLAY_FORMAT).to_string())
    }
}

impl<'de> Deserialize<'de> for Reminder {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let draft = ReminderDraft::deserialize(deserializer)?;
        draft
            .normalize()
            .ok_or_else(|| serde::de::Error::custom("reminder requires both date and time"))
    }
}

/// Possibly-partial reminder input as it arrives from storage or UI fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReminderDraft {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

impl ReminderDraft {
    /// Collapses the draft into a complete reminder, or `None` when partial.
    pub fn normalize(self) -> Option<Reminder> {
        let date = non_blank(self.date)?;
        let time = non_blank(self.time)?;
        Some(Reminder { date, time })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Serde helper for optional reminders that tolerates partial payloads.
///
/// `null`, a missing field and a reminder lacking date or time all load as
/// `None`.
pub(crate) fn deserialize_optional_reminder<'de, D>(
    deserializer: D,
) -> Result<Option<Reminder>, D::Error>
where
    D: Deserializer<'de>,
{
    let draft = Option::<ReminderDraft>::deserialize(deserializer)?;
    Ok(draft.and_then(ReminderDraft::normalize))
}

#[cfg(test)]
mod tests {
    use super::{Reminder, ReminderDraft};
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn new_rejects_partial_reminders() {
        assert!(Reminder::new("2026-01-15", "").is_none());
        assert!(Reminder::new("   ", "14:30").is_none());
        assert!(Reminder::new("2026-01-15", "14:30").is_some());
    }

    #[test]
    fn new_trims_raw_parts() {
        let reminder = Reminder::new(" 2026-01-15 ", "14:30\n").expect("complete reminder");
        assert_eq!(reminder.date(), "2026-01-15");
        assert_eq!(reminder.time(), "14:30");
    }

    #[test]
    fn naive_datetime_parses_minutes_and_seconds() {
        let minutes = Reminder::new("2026-01-15", "14:30").unwrap();
        let expected = NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(minutes.naive_datetime(), Some(expected));

        let seconds = Reminder::new("2026-01-15", "14:30:45").unwrap();
        assert_eq!(seconds.naive_datetime().map(|value| value.second()), Some(45));
    }

    #[test]
    fn unparseable_reminder_has_no_instant() {
        let reminder = Reminder::new("next tuesday", "noon").unwrap();
        assert!(reminder.naive_datetime().is_none());
        assert!(reminder.instant().is_none());
        assert!(reminder.display_label().is_none());
    }

    #[test]
    fn display_label_uses_twelve_hour_clock() {
        let reminder = Reminder::new("2026-01-15", "14:30").unwrap();
        let label = reminder.display_label().unwrap();
        assert_eq!(label, "Jan 15, 2026 2:30 PM");
    }

    #[test]
    fn deserialize_rejects_partial_but_draft_normalizes_to_none() {
        let err = serde_json::from_str::<Reminder>(r#"{"date":"2026-01-15"}"#);
        assert!(err.is_err());

        let draft: ReminderDraft = serde_json::from_str(r#"{"date":"2026-01-15"}"#).unwrap();
        assert!(draft.normalize().is_none());
    }
}
