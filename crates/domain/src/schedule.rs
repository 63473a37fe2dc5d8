//! Schedule: when something should run: a start/end window plus either an
//! ISO-8601 frequency or a Quartz-style cron expression.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{MetacatError, ValidationError};
use crate::id::ScheduleId;
use crate::patch::{Identity, merge};
use crate::time::Audit;

/// Format of `start` and `end`, e.g. `20240101T000000`.
pub const TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub id: ScheduleId,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub cron: String,
    #[serde(default)]
    pub run_once: bool,
}

impl Schedule {
    /// A schedule repeating at `frequency`, without window or cron.
    #[must_use]
    pub fn every(name: impl Into<String>, frequency: impl Into<String>) -> Self {
        Self {
            id: ScheduleId::new(),
            name: name.into(),
            audit: Audit::default(),
            start: String::new(),
            end: String::new(),
            frequency: frequency.into(),
            cron: String::new(),
            run_once: false,
        }
    }

    /// Check name, window, frequency and cron.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] naming the malformed part.
    pub fn validate(&self) -> Result<(), MetacatError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        check_times([&self.start, &self.end])?;
        check_frequency(&self.frequency)?;
        check_cron(&self.cron)?;
        Ok(())
    }
}

/// Partial update for a [`Schedule`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulePatch {
    #[serde(flatten)]
    pub identity: Identity,
    pub start: Option<String>,
    pub end: Option<String>,
    pub frequency: Option<String>,
    pub cron: Option<String>,
    pub run_once: Option<bool>,
}

impl SchedulePatch {
    /// Check the present window, frequency and cron, before any lookup.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] naming the malformed part.
    pub fn validate(&self) -> Result<(), MetacatError> {
        check_times(self.start.iter().chain(self.end.iter()))?;
        check_frequency(self.frequency.as_deref().unwrap_or_default())?;
        check_cron(self.cron.as_deref().unwrap_or_default())
    }

    /// Merge every present field into `target`, excluding the name.
    pub fn apply(self, target: &mut Schedule) {
        merge(&mut target.start, self.start);
        merge(&mut target.end, self.end);
        merge(&mut target.frequency, self.frequency);
        merge(&mut target.cron, self.cron);
        merge(&mut target.run_once, self.run_once);
    }
}

fn check_times<'a>(times: impl IntoIterator<Item = &'a String>) -> Result<(), MetacatError> {
    for time in times {
        if !time.is_empty() && NaiveDateTime::parse_from_str(time, TIME_FORMAT).is_err() {
            return Err(ValidationError::InvalidScheduleTime(time.clone()).into());
        }
    }
    Ok(())
}

fn check_frequency(frequency: &str) -> Result<(), MetacatError> {
    if !frequency.is_empty() && !is_valid_frequency(frequency) {
        return Err(ValidationError::InvalidFrequency(frequency.to_owned()).into());
    }
    Ok(())
}

fn check_cron(cron: &str) -> Result<(), MetacatError> {
    if !cron.is_empty() && !is_valid_cron(cron) {
        return Err(ValidationError::InvalidCron(cron.to_owned()).into());
    }
    Ok(())
}

/// `P[nY][nM][nW][nD][T[nH][nM][n[.n]S]]` with at least one component.
#[must_use]
pub fn is_valid_frequency(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('P') else {
        return false;
    };
    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return false;
            }
            (date, Some(time))
        }
        None => (rest, None),
    };
    let Some(date_parts) = duration_components(date, &['Y', 'M', 'W', 'D'], false) else {
        return false;
    };
    let time_parts = match time {
        Some(time) => match duration_components(time, &['H', 'M', 'S'], true) {
            Some(parts) => parts,
            None => return false,
        },
        None => 0,
    };
    date_parts + time_parts > 0
}

/// Count `<number><designator>` pairs, designators in the given order.
fn duration_components(
    part: &str,
    designators: &[char],
    fractional_seconds: bool,
) -> Option<usize> {
    let mut count = 0;
    let mut next = 0;
    let mut number = String::new();
    for c in part.chars() {
        if c.is_ascii_digit() || (c == '.' && fractional_seconds) {
            number.push(c);
            continue;
        }
        let position = designators[next..].iter().position(|d| *d == c)? + next;
        if number.is_empty() || number.starts_with('.') || number.ends_with('.') {
            return None;
        }
        if number.contains('.') && c != 'S' {
            return None;
        }
        number.clear();
        next = position + 1;
        count += 1;
    }
    number.is_empty().then_some(count)
}

const CRON_FIELDS: [(u32, u32); 7] = [
    (0, 59),
    (0, 59),
    (0, 23),
    (1, 31),
    (1, 12),
    (1, 7),
    (1970, 2099),
];

/// Quartz-style cron: six or seven fields (seconds first, optional year).
#[must_use]
pub fn is_valid_cron(value: &str) -> bool {
    let fields: Vec<&str> = value.split_whitespace().collect();
    if !(6..=7).contains(&fields.len()) {
        return false;
    }
    fields
        .iter()
        .zip(CRON_FIELDS)
        .enumerate()
        .all(|(index, (field, range))| is_valid_cron_field(index, field, range))
}

fn is_valid_cron_field(index: usize, field: &str, (min, max): (u32, u32)) -> bool {
    // `?` is only meaningful for day-of-month and day-of-week.
    if field == "?" {
        return index == 3 || index == 5;
    }
    field.split(',').all(|item| {
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => (range, Some(step)),
            None => (item, None),
        };
        if let Some(step) = step {
            if step.parse::<u32>().map_or(true, |s| s == 0) {
                return false;
            }
        }
        if range == "*" {
            return true;
        }
        let bounds: Vec<&str> = range.split('-').collect();
        !bounds.is_empty()
            && bounds.len() <= 2
            && bounds
                .iter()
                .all(|bound| is_valid_cron_value(index, bound, min, max))
    })
}

fn is_valid_cron_value(index: usize, value: &str, min: u32, max: u32) -> bool {
    if let Ok(number) = value.parse::<u32>() {
        return (min..=max).contains(&number);
    }
    let upper = value.to_ascii_uppercase();
    match index {
        3 => {
            upper == "L"
                || upper == "LW"
                || upper
                    .strip_suffix('W')
                    .is_some_and(|d| is_number_in(d, min, max))
        }
        4 => MONTHS.contains(&upper.as_str()),
        5 => {
            DAYS.contains(&upper.as_str())
                || upper.strip_suffix('L').is_some_and(|d| is_number_in(d, min, max))
                || upper
                    .split_once('#')
                    .is_some_and(|(d, n)| is_number_in(d, min, max) && is_number_in(n, 1, 5))
        }
        _ => false,
    }
}

fn is_number_in(value: &str, min: u32, max: u32) -> bool {
    value.parse::<u32>().is_ok_and(|n| (min..=max).contains(&n))
}

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const DAYS: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];
