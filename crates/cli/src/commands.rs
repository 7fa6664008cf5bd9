//! Subcommand handlers. Each run is one session: load, act, save if needed.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Weekday};
use tracing::{info, warn};

use pedibus_core::calendar::{date_key, parse_date_key};
use pedibus_core::engine::parse_duty_date;
use pedibus_core::{Config, Reporter, ScheduleWeek, SchedulingEngine};
use pedibus_notify::{Dispatcher, DryRunNotifier, Notifier, SmsWebhookNotifier};

use crate::cli::{Command, WeekSelector};

/// Prints notices to stderr.
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&self, message: &str) {
        eprintln!("{message}");
    }
}

pub async fn run(
    command: Command,
    engine: &mut SchedulingEngine,
    config: &Config,
    today: NaiveDate,
    reporter: &dyn Reporter,
) -> Result<()> {
    match command {
        Command::Week { week, json } => {
            select_week(engine, &week)?;
            if json {
                println!("{}", week_json(&engine.current_week())?);
            } else {
                println!("{}", render_week(&engine.current_week()));
                println!();
                println!("{}", engine.message());
            }
        }
        Command::Message(sel) => {
            select_week(engine, &sel)?;
            println!("{}", engine.message());
        }
        Command::Assign { date, guide } => {
            let date = parse_duty_date(&date)?;
            let changed = engine.assign_name(date, &guide)?;
            save_if_changed(engine, changed, reporter)?;
        }
        Command::Unassign { date } => {
            let date = parse_duty_date(&date)?;
            let sentinel = engine.roster().sentinel().clone();
            let changed = engine.assign(date, &sentinel)?;
            save_if_changed(engine, changed, reporter)?;
        }
        Command::Guides => {
            println!("{}", render_guides(engine, today));
        }
        Command::Count { guide, until } => {
            let until = match until {
                Some(s) => parse_date_key(&s)?,
                None => today,
            };
            println!("{}", engine.duty_count(&guide, until));
        }
        Command::Send { week, message, dry_run } => {
            select_week(engine, &week)?;
            send(engine, config, message, dry_run, reporter).await?;
        }
    }
    Ok(())
}

fn select_week(engine: &mut SchedulingEngine, sel: &WeekSelector) -> Result<()> {
    if let Some(ref day) = sel.friday {
        engine.set_reference_friday(parse_date_key(day)?)?;
    }
    engine
        .shift_weeks(sel.weeks)
        .with_context(|| format!("cannot move {} weeks", sel.weeks))?;
    Ok(())
}

fn save_if_changed(
    engine: &SchedulingEngine,
    changed: bool,
    reporter: &dyn Reporter,
) -> Result<()> {
    if !changed {
        println!("No change.");
        return Ok(());
    }
    engine.save(reporter).context("history not saved")?;
    reporter.report("Fichier historique sauvegardé");
    Ok(())
}

/// Save, then hand the message to the SMS transport.
///
/// A failed save is reported but does not stop the send.
async fn send(
    engine: &SchedulingEngine,
    config: &Config,
    message: Option<String>,
    dry_run: bool,
    reporter: &dyn Reporter,
) -> Result<()> {
    if let Err(e) = engine.save(reporter) {
        warn!(error = %e, "sending despite failed save");
    }

    let text = message.unwrap_or_else(|| engine.message());
    let policy = config.sms.phone_policy()?;
    let outbound = engine.outbound(&text, &policy);

    let channel: Box<dyn Notifier> = match (&config.sms.webhook_url, dry_run) {
        (Some(url), false) => Box::new(
            SmsWebhookNotifier::new(url.clone(), config.sms.webhook_token.clone())
                .context("invalid SMS gateway configuration")?,
        ),
        (None, false) => {
            warn!("SMS_WEBHOOK_URL not set, falling back to dry run");
            Box::new(DryRunNotifier::new())
        }
        (_, true) => Box::new(DryRunNotifier::new()),
    };

    let dispatcher = Dispatcher::new(channel);
    info!(channel = dispatcher.channel_name(), recipients = outbound.len(), "sending planning");
    let report = dispatcher.dispatch(&outbound).await;

    for failure in report.failed() {
        reporter.report(&format!(
            "{}: {}",
            failure.guide_name,
            failure.error.as_deref().unwrap_or("unknown error")
        ));
    }
    reporter.report(&report.summary());
    Ok(())
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Lundi",
        Weekday::Tue => "Mardi",
        Weekday::Wed => "Mercredi",
        Weekday::Thu => "Jeudi",
        Weekday::Fri => "Vendredi",
        Weekday::Sat => "Samedi",
        Weekday::Sun => "Dimanche",
    }
}

pub fn render_week(week: &ScheduleWeek) -> String {
    let mut out = format!("{} ({})\n", week.label(), date_key(week.reference_friday));
    for day in &week.days {
        let guide = if day.is_assigned() {
            format!("{} ({})", day.guide.name(), day.duty_count)
        } else {
            day.guide.name().to_string()
        };
        out.push_str(&format!(
            "  {:<9} {}  {}\n",
            weekday_label(day.weekday),
            day.display,
            guide
        ));
    }
    out.trim_end().to_string()
}

pub fn week_json(week: &ScheduleWeek) -> Result<String> {
    serde_json::to_string_pretty(week).context("cannot serialize week")
}

pub fn render_guides(engine: &SchedulingEngine, today: NaiveDate) -> String {
    let mut out = String::new();
    for (index, guide) in engine.roster().iter().enumerate().skip(1) {
        out.push_str(&format!(
            "{:>3}  {:<16} {:<12} {}\n",
            index,
            guide.name(),
            guide.phone_number(),
            engine.duty_count(guide.name(), today)
        ));
    }
    if out.is_empty() {
        out.push_str("(no guides)");
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedibus_core::{Guide, HistoryStore, MessageTemplate, Roster};
    use std::path::PathBuf;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine() -> SchedulingEngine {
        let roster = Roster::from_guides([
            Guide::new("Alice", "0611111111"),
            Guide::new("Bob", ""),
        ]);
        let mut history = HistoryStore::new();
        history.put("2024/03/11", "Alice");
        history.put("2024/03/14", "Bob");
        SchedulingEngine::with_state(
            roster,
            history,
            MessageTemplate::default(),
            PathBuf::from("histo.txt"),
            ymd(2024, 3, 15),
        )
    }

    #[test]
    fn render_week_lists_four_days() {
        let out = render_week(&engine().current_week());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Semaine 11 (2024/03/15)");
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("Lundi"));
        assert!(lines[1].contains("11/03"));
        assert!(lines[1].ends_with("Alice (1)"));
        assert!(lines[2].ends_with("Aucun"));
        assert!(lines[3].contains("Jeudi") && lines[3].ends_with("Bob (1)"));
    }

    #[test]
    fn render_guides_skips_sentinel() {
        let out = render_guides(&engine(), ymd(2024, 3, 31));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("1  Alice"));
        assert!(lines[0].ends_with('1'));
    }

    #[test]
    fn week_json_carries_days_and_counts() {
        let json = week_json(&engine().current_week()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["week_number"], 11);
        assert_eq!(value["reference_friday"], "2024-03-15");
        let days = value["days"].as_array().unwrap();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0]["date_key"], "2024/03/11");
        assert_eq!(days[0]["guide"]["name"], "Alice");
        assert_eq!(days[0]["duty_count"], 1);
        assert_eq!(days[1]["guide_index"], 0);
    }

    #[test]
    fn select_week_rejects_huge_offset() {
        let mut e = engine();
        let sel = WeekSelector {
            friday: None,
            weeks: i64::MAX,
        };
        assert!(select_week(&mut e, &sel).is_err());
        assert_eq!(e.reference_friday(), ymd(2024, 3, 15));
    }

    #[test]
    fn select_week_applies_date_then_offset() {
        let mut e = engine();
        select_week(
            &mut e,
            &WeekSelector {
                friday: Some("2024/03/12".to_string()),
                weeks: -1,
            },
        )
        .unwrap();
        assert_eq!(e.reference_friday(), ymd(2024, 3, 8));
    }
}
