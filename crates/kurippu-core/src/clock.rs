use anyhow::anyhow;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Source of wall-clock time for task ids and creation dates.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Next id from `now` in epoch milliseconds. Falls forward to
/// `highest + 1` when the clock has not moved past the newest id.
pub fn next_task_id(now: DateTime<Local>, highest: Option<u64>) -> u64 {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    match highest {
        Some(max) if millis <= max => max.saturating_add(1),
        _ => millis,
    }
}

/// Rejects strftime patterns chrono cannot render, which would otherwise
/// panic at format time.
pub fn validate_date_format(format: &str) -> anyhow::Result<()> {
    if format.trim().is_empty() {
        return Err(anyhow!("date format cannot be empty"));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(anyhow!("invalid date format: {format}"));
    }
    Ok(())
}

pub fn format_created_at(now: DateTime<Local>, format: &str) -> String {
    now.format(format).to_string()
}
