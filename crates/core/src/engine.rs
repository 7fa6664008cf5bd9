//! [`SchedulingEngine`]: the session state behind every scheduling action.
//!
//! Owns the roster, the in-memory history, the message template and the
//! currently selected week. Single-threaded: a caller serving several
//! clients must wrap it in a mutex or single-writer queue.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Weekday};
use tracing::{debug, info, warn};

use crate::calendar::{
    self, checked_next_weekday, date_key, is_duty_day, next_weekday, shift_weeks,
};
use crate::config::Config;
use crate::error::{PedibusError, Result};
use crate::guide::Guide;
use crate::history::HistoryStore;
use crate::recipients::{outbound_messages, OutboundMessage, PhonePolicy};
use crate::report::{notify, Reporter};
use crate::roster::Roster;
use crate::schedule::{build_week, compose_message, MessageTemplate, ScheduleWeek};

/// One scheduling session over a roster and its assignment history.
pub struct SchedulingEngine {
    roster: Roster,
    history: HistoryStore,
    template: MessageTemplate,
    history_path: PathBuf,
    reference_friday: NaiveDate,
}

impl SchedulingEngine {
    /// Load roster and history from the configured files.
    ///
    /// Load failures never abort: they are reported through `reporter` and
    /// the engine starts with an empty roster and/or history.
    pub fn open(config: &Config, today: NaiveDate, reporter: &dyn Reporter) -> Self {
        let guides_path = config.storage.guides_path();
        let history_path = config.storage.history_path();

        let roster = Roster::load_file(&guides_path).unwrap_or_else(|e| {
            warn!(path = %guides_path.display(), error = %e, "roster unavailable");
            notify(reporter, &e.to_string());
            Roster::empty()
        });

        let history = HistoryStore::load_file(&history_path).unwrap_or_else(|e| {
            warn!(path = %history_path.display(), error = %e, "history unavailable");
            notify(reporter, &e.to_string());
            HistoryStore::new()
        });

        Self::with_state(roster, history, config.message.template(), history_path, today)
    }

    /// Build an engine from already-loaded state. The initial week is the
    /// one ending on the next Friday (today if today is a Friday).
    pub fn with_state(
        roster: Roster,
        history: HistoryStore,
        template: MessageTemplate,
        history_path: PathBuf,
        today: NaiveDate,
    ) -> Self {
        Self {
            roster,
            history,
            template,
            history_path,
            reference_friday: next_weekday(Weekday::Fri, today),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    pub fn reference_friday(&self) -> NaiveDate {
        self.reference_friday
    }

    /// Select the week containing `date` (its Friday, or the next one).
    pub fn set_reference_friday(&mut self, date: NaiveDate) -> Result<()> {
        self.reference_friday = checked_next_weekday(Weekday::Fri, date)?;
        Ok(())
    }

    /// Move the selected week; the selection is unchanged on failure.
    pub fn shift_weeks(&mut self, delta_weeks: i64) -> Result<()> {
        self.reference_friday = shift_weeks(self.reference_friday, delta_weeks)?;
        Ok(())
    }

    pub fn previous_week(&mut self) -> Result<()> {
        self.shift_weeks(-1)
    }

    pub fn next_week(&mut self) -> Result<()> {
        self.shift_weeks(1)
    }

    pub fn current_week(&self) -> ScheduleWeek {
        build_week(self.reference_friday, &self.roster, &self.history)
    }

    /// Announcement text for the selected week.
    pub fn message(&self) -> String {
        compose_message(&self.current_week(), &self.template)
    }

    /// `(dd/mm, roster position)` for each duty day of the selected week.
    pub fn selections(&self) -> Vec<(String, usize)> {
        self.current_week()
            .days
            .into_iter()
            .map(|d| (d.display, d.guide_index))
            .collect()
    }

    /// Guide currently shown for `date` (the sentinel when unassigned or
    /// when the stored name is not in the roster).
    pub fn assigned_guide(&self, date: NaiveDate) -> &Guide {
        self.roster.resolve(self.history.get(&date_key(date)))
    }

    /// Assign `guide` to `date`; the sentinel clears the day.
    ///
    /// Returns `false` without touching history when `guide` is already the
    /// one shown for that date.
    pub fn assign(&mut self, date: NaiveDate, guide: &Guide) -> Result<bool> {
        if !is_duty_day(date) {
            return Err(PedibusError::NotADutyDay(date_key(date)));
        }
        if self.assigned_guide(date).same_as(guide) {
            debug!(date = %date_key(date), guide = %guide, "assignment unchanged");
            return Ok(false);
        }

        let key = date_key(date);
        if guide.is_none() {
            self.history.remove(&key);
        } else {
            self.history.put(key, guide.name());
        }
        Ok(true)
    }

    /// Assign by roster position, as sent back by a selector.
    pub fn assign_index(&mut self, date: NaiveDate, index: usize) -> Result<bool> {
        let guide = self.roster.at(index)?.clone();
        self.assign(date, &guide)
    }

    /// Assign by guide name; the sentinel name clears the day.
    pub fn assign_name(&mut self, date: NaiveDate, guide_name: &str) -> Result<bool> {
        let guide = if guide_name == self.roster.sentinel().name() {
            self.roster.sentinel().clone()
        } else {
            let index = self.roster.position_of(Some(guide_name));
            if index == 0 {
                return Err(PedibusError::UnknownGuide(guide_name.to_string()));
            }
            self.roster.at(index)?.clone()
        };
        self.assign(date, &guide)
    }

    /// Duty count of `guide_name` as of `date`, inclusive.
    pub fn duty_count(&self, guide_name: &str, date: NaiveDate) -> usize {
        self.history.count_up_to(guide_name, &date_key(date))
    }

    /// Persist the history. Failures are reported; memory is kept as is.
    pub fn save(&self, reporter: &dyn Reporter) -> Result<()> {
        match self.history.save_file(&self.history_path) {
            Ok(()) => {
                info!(path = %self.history_path.display(), "history saved");
                Ok(())
            }
            Err(e) => {
                notify(reporter, &e.to_string());
                Err(e)
            }
        }
    }

    /// Messages for every guide with a valid mobile number.
    pub fn outbound(&self, text: &str, policy: &PhonePolicy) -> Vec<OutboundMessage> {
        outbound_messages(&self.roster, policy, text)
    }
}

/// Parse a user-supplied date and check it is a walking-bus day.
pub fn parse_duty_date(input: &str) -> Result<NaiveDate> {
    let date = calendar::parse_date_key(input)?;
    if !is_duty_day(date) {
        return Err(PedibusError::NotADutyDay(date_key(date)));
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Collect(RefCell<Vec<String>>);

    impl Reporter for Collect {
        fn report(&self, message: &str) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine(history: HistoryStore) -> SchedulingEngine {
        let roster = Roster::from_guides([
            Guide::new("Alice", "0611111111"),
            Guide::new("Bob", "0622222222"),
        ]);
        SchedulingEngine::with_state(
            roster,
            history,
            MessageTemplate::default(),
            PathBuf::from("histo.txt"),
            ymd(2024, 3, 13),
        )
    }

    #[test]
    fn starts_on_next_friday() {
        let e = engine(HistoryStore::new());
        assert_eq!(e.reference_friday(), ymd(2024, 3, 15));
    }

    #[test]
    fn navigation() {
        let mut e = engine(HistoryStore::new());
        e.previous_week().unwrap();
        assert_eq!(e.reference_friday(), ymd(2024, 3, 8));
        e.next_week().unwrap();
        e.next_week().unwrap();
        assert_eq!(e.reference_friday(), ymd(2024, 3, 22));
        e.set_reference_friday(ymd(2024, 1, 2)).unwrap();
        assert_eq!(e.reference_friday(), ymd(2024, 1, 5));
    }

    #[test]
    fn huge_week_offset_is_rejected_and_selection_kept() {
        let mut e = engine(HistoryStore::new());
        assert!(matches!(
            e.shift_weeks(i64::MIN),
            Err(PedibusError::DateOutOfRange(_))
        ));
        assert!(e.shift_weeks(20_000_000).is_err());
        assert!(e.set_reference_friday(NaiveDate::MAX).is_err());
        assert_eq!(e.reference_friday(), ymd(2024, 3, 15));
        assert_eq!(e.current_week().days.len(), 4);
    }

    #[test]
    fn assign_then_unassign() {
        let mut e = engine(HistoryStore::new());
        let friday = ymd(2024, 3, 15);
        let alice = e.roster().at(1).unwrap().clone();

        assert!(e.assign(friday, &alice).unwrap());
        assert_eq!(e.history().get("2024/03/15"), Some("Alice"));

        assert!(e.assign(friday, &Guide::none()).unwrap());
        assert_eq!(e.history().get("2024/03/15"), None);
    }

    #[test]
    fn same_guide_is_a_no_op() {
        let mut history = HistoryStore::new();
        history.put("2024/03/15", "Alice");
        let mut e = engine(history);
        let before = e.history().clone();

        // Different phone, same name: same guide.
        let changed = e
            .assign(ymd(2024, 3, 15), &Guide::new("Alice", "0699999999"))
            .unwrap();
        assert!(!changed);
        assert_eq!(e.history(), &before);
    }

    #[test]
    fn clearing_an_unknown_stored_guide_keeps_the_entry() {
        let mut history = HistoryStore::new();
        history.put("2024/03/14", "Zed");
        let mut e = engine(history);

        assert!(e.assigned_guide(ymd(2024, 3, 14)).is_none());
        assert!(!e.assign_index(ymd(2024, 3, 14), 0).unwrap());
        assert_eq!(e.history().get("2024/03/14"), Some("Zed"));
    }

    #[test]
    fn assign_rejects_wednesday_and_bad_index() {
        let mut e = engine(HistoryStore::new());
        assert!(matches!(
            e.assign_index(ymd(2024, 3, 13), 1),
            Err(PedibusError::NotADutyDay(_))
        ));
        assert!(matches!(
            e.assign_index(ymd(2024, 3, 15), 7),
            Err(PedibusError::GuideIndex { index: 7, len: 3 })
        ));
    }

    #[test]
    fn assign_name_resolves_roster_and_sentinel() {
        let mut e = engine(HistoryStore::new());
        let monday = ymd(2024, 3, 11);
        assert!(e.assign_name(monday, "Bob").unwrap());
        assert_eq!(e.selections()[0], ("11/03".to_string(), 2));
        assert!(matches!(
            e.assign_name(monday, "Zed"),
            Err(PedibusError::UnknownGuide(_))
        ));
        assert!(e.assign_name(monday, "Aucun").unwrap());
        assert_eq!(e.selections()[0], ("11/03".to_string(), 0));
    }

    #[test]
    fn message_follows_assignments() {
        let mut e = engine(HistoryStore::new());
        e.assign_index(ymd(2024, 3, 15), 1).unwrap();
        assert_eq!(e.duty_count("Alice", ymd(2024, 3, 15)), 1);
        assert!(e.message().contains("- 15/03 : Alice (1)\n"));
    }

    #[test]
    fn open_with_missing_files_reports_both() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::for_profile("");
        config.storage.data_dir = dir.path().to_path_buf();

        let reporter = Collect::default();
        let e = SchedulingEngine::open(&config, ymd(2024, 3, 13), &reporter);
        assert!(e.roster().is_empty());
        assert!(e.history().is_empty());

        let notices = reporter.0.borrow();
        assert_eq!(notices.len(), 2);
        assert!(notices[0].contains("guides.txt: cannot be read"));
        assert!(notices[1].contains("histo.txt: cannot be read"));
    }

    #[test]
    fn missing_history_is_created_on_save() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("guides.txt"), "Alice 0611111111\n").unwrap();
        let mut config = Config::for_profile("");
        config.storage.data_dir = dir.path().to_path_buf();

        let reporter = Collect::default();
        let mut e = SchedulingEngine::open(&config, ymd(2024, 3, 13), &reporter);
        assert_eq!(reporter.0.borrow().len(), 1);

        assert!(e.assign_name(ymd(2024, 3, 15), "Alice").unwrap());
        e.save(&reporter).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("histo.txt")).unwrap(),
            "2024/03/15 Alice\n"
        );
    }

    #[test]
    fn open_with_malformed_history_starts_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("guides.txt"), "Alice 0611111111\n").unwrap();
        std::fs::write(dir.path().join("histo.txt"), "2024/03/15 Alice\n2024/03/14\n").unwrap();
        let mut config = Config::for_profile("");
        config.storage.data_dir = dir.path().to_path_buf();

        let reporter = Collect::default();
        let e = SchedulingEngine::open(&config, ymd(2024, 3, 13), &reporter);
        assert_eq!(e.roster().len(), 2);
        assert!(e.history().is_empty());
        let notices = reporter.0.borrow();
        assert_eq!(notices.len(), 1);
        assert_eq!(
            notices[0],
            format!(
                "{}: cannot be read (error at line 2)",
                dir.path().join("histo.txt").display()
            )
        );
    }

    #[test]
    fn save_failure_is_reported_and_memory_kept() {
        let dir = tempfile::TempDir::new().unwrap();
        let roster = Roster::from_guides([Guide::new("Alice", "")]);
        let mut e = SchedulingEngine::with_state(
            roster,
            HistoryStore::new(),
            MessageTemplate::default(),
            dir.path().join("nope").join("histo.txt"),
            ymd(2024, 3, 13),
        );
        e.assign_index(ymd(2024, 3, 15), 1).unwrap();

        let reporter = Collect::default();
        assert!(e.save(&reporter).is_err());
        assert_eq!(reporter.0.borrow().len(), 1);
        assert_eq!(e.history().get("2024/03/15"), Some("Alice"));
    }

    #[test]
    fn parse_duty_date_checks_weekday() {
        assert_eq!(parse_duty_date("2024/03/14").unwrap(), ymd(2024, 3, 14));
        assert!(matches!(
            parse_duty_date("2024/03/13"),
            Err(PedibusError::NotADutyDay(_))
        ));
        assert!(matches!(
            parse_duty_date("14/03/2024"),
            Err(PedibusError::InvalidDate(_))
        ));
    }
}
