//! Weekly schedule view: the four duty days of a week joined against the
//! roster and history, and the announcement text built from it.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::calendar::{date_key, display_date, previous_weekday, DUTY_DAYS};
use crate::guide::Guide;
use crate::history::HistoryStore;
use crate::roster::Roster;

pub const DEFAULT_HEADER: &str = "Planning pédibus :";
pub const DEFAULT_FOOTER: &str = "Bon pédibus à tous !";

/// One duty day of a [`ScheduleWeek`].
#[derive(Debug, Clone, Serialize)]
pub struct DutyDay {
    pub weekday: Weekday,
    pub date: NaiveDate,
    /// `yyyy/mm/dd`
    pub date_key: String,
    /// `dd/mm`
    pub display: String,
    /// Roster position of the assigned guide (0 when unassigned).
    pub guide_index: usize,
    pub guide: Guide,
    /// Assignments of `guide` at or before this day, this day included.
    pub duty_count: usize,
}

impl DutyDay {
    pub fn is_assigned(&self) -> bool {
        !self.guide.is_none()
    }
}

/// Derived view of one week. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleWeek {
    pub reference_friday: NaiveDate,
    /// ISO week number, shown as the week label.
    pub week_number: u32,
    pub days: Vec<DutyDay>,
}

impl ScheduleWeek {
    pub fn day(&self, weekday: Weekday) -> Option<&DutyDay> {
        self.days.iter().find(|d| d.weekday == weekday)
    }

    pub fn label(&self) -> String {
        format!("Semaine {}", self.week_number)
    }
}

/// Header and footer lines framing the announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub header: String,
    pub footer: String,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

/// Resolve the four duty days of the week ending on `reference_friday`.
pub fn build_week(
    reference_friday: NaiveDate,
    roster: &Roster,
    history: &HistoryStore,
) -> ScheduleWeek {
    let days = DUTY_DAYS
        .iter()
        .map(|&weekday| {
            let date = previous_weekday(weekday, reference_friday);
            let key = date_key(date);
            let guide_index = roster.position_of(history.get(&key));
            let guide = roster.resolve(history.get(&key)).clone();
            let duty_count = history.count_up_to(guide.name(), &key);
            DutyDay {
                weekday,
                date,
                display: display_date(date),
                date_key: key,
                guide_index,
                guide,
                duty_count,
            }
        })
        .collect();

    ScheduleWeek {
        reference_friday,
        week_number: reference_friday.iso_week().week(),
        days,
    }
}

/// Announcement text: header, one line per assigned day, blank line, footer.
pub fn compose_message(week: &ScheduleWeek, template: &MessageTemplate) -> String {
    let mut message = format!("{}\n", template.header);
    for day in week.days.iter().filter(|d| d.is_assigned()) {
        message.push_str(&format!(
            "- {} : {} ({})\n",
            day.display,
            day.guide.name(),
            day.duty_count
        ));
    }
    message.push('\n');
    message.push_str(&template.footer);
    message
}
