use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use domain::alert::entity::LoggedAlert;
use domain::format::locale::DEFAULT_TZ;
use ports::secondary::alert_log::AlertLog;
use ports::secondary::notifier::Notifier;
use tokio_util::sync::CancellationToken;

use crate::error_reporter::ErrorReporter;

const SUMMARY_TITLE: &str = "🌩️ Daily Weather Alert Summary";
const SUMMARY_COLOR: u32 = 0x00B7_EB;
/// Sleep bound while waiting for the send window; keeps the task
/// responsive to clock changes and shutdown.
const WAIT_SLICE: Duration = Duration::from_secs(60);

/// Emits one activity summary per day at 23:59 local time.
///
/// The wake-up time is reached by sleeping in bounded slices and
/// rechecking the wall clock, so host suspends and clock drift cannot
/// skip a day silently.
pub struct DailySummaryTask {
    alert_log: Arc<dyn AlertLog>,
    notifier: Arc<dyn Notifier>,
    webhook_url: String,
    reporter: Arc<ErrorReporter>,
}

impl DailySummaryTask {
    pub fn new(
        alert_log: Arc<dyn AlertLog>,
        notifier: Arc<dyn Notifier>,
        webhook_url: String,
        reporter: Arc<ErrorReporter>,
    ) -> Self {
        Self {
            alert_log,
            notifier,
            webhook_url,
            reporter,
        }
    }

    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            let now = Utc::now().with_timezone(&DEFAULT_TZ);
            let pause = match now.date_naive().and_hms_opt(23, 59, 0) {
                Some(target) if now.naive_local() >= target => {
                    if now.naive_local() < target + chrono::Duration::seconds(59) {
                        self.emit(now.date_naive()).await;
                    }
                    // Past today's window; idle into tomorrow.
                    WAIT_SLICE
                }
                Some(target) => {
                    let remaining = (target - now.naive_local())
                        .to_std()
                        .unwrap_or(WAIT_SLICE);
                    remaining.min(WAIT_SLICE)
                }
                None => WAIT_SLICE,
            };
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("daily summary task stopping");
                    break;
                }
                () = tokio::time::sleep(pause.max(Duration::from_secs(1))) => {}
            }
        }
    }

    async fn emit(&self, today: NaiveDate) {
        let entries = match self.alert_log.entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "failed to read alert log for summary");
                Vec::new()
            }
        };
        let text = build_summary(&entries, today);
        match self
            .notifier
            .publish_card(&self.webhook_url, SUMMARY_TITLE, &text, SUMMARY_COLOR)
            .await
        {
            Ok(()) => tracing::info!(date = %today, "daily summary sent"),
            Err(e) => {
                self.reporter
                    .report(&format!("Error sending daily summary: {e}"))
                    .await;
            }
        }
    }
}

/// Render the summary text for one day from the full alert log.
pub fn build_summary(entries: &[LoggedAlert], today: NaiveDate) -> String {
    let date = today.format("%Y-%m-%d").to_string();
    let todays: Vec<&LoggedAlert> = entries
        .iter()
        .filter(|e| e.timestamp.starts_with(&date))
        .collect();

    let mut text = format!(
        "**Stormwatch Daily Summary - {date}**\nTotal Alerts: {}\n",
        todays.len()
    );
    if todays.is_empty() {
        text.push_str("No alerts recorded today.\n");
        return text;
    }

    let mut event_counts: Vec<(String, usize)> = Vec::new();
    let mut hour_counts: Vec<(String, usize)> = Vec::new();
    let mut area_counts: Vec<(String, usize)> = Vec::new();
    let critical_markers = ["Tornado Emergency", "PDS Tornado Warning", "Tornado Observed"];
    let mut critical = 0usize;

    for entry in &todays {
        bump(&mut event_counts, &entry.event);
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&entry.timestamp, "%Y-%m-%d %H:%M:%S") {
            bump(&mut hour_counts, &parsed.format("%H:00").to_string());
        }
        bump(&mut area_counts, &entry.location);
        if critical_markers.iter().any(|m| entry.event.contains(m)) {
            critical += 1;
        }
    }

    let total = todays.len();
    text.push_str("**Alert Frequency:**\n");
    for (event, count) in &event_counts {
        let share = *count as f64 * 100.0 / total as f64;
        text.push_str(&format!("{event}: {count} ({share:.1}%)\n"));
    }
    if let Some((hour, count)) = peak(&hour_counts) {
        text.push_str(&format!("**Peak Hour:** {hour} ({count} alerts)\n"));
    }
    if let Some((area, count)) = peak(&area_counts) {
        text.push_str(&format!("**Most Active Region:** {area} ({count} alerts)\n"));
    }
    text.push_str(&format!(
        "**Critical Alerts:** {critical} (Tornado Emergency, PDS, Observed)\n"
    ));
    text
}

fn bump(counts: &mut Vec<(String, usize)>, key: &str) {
    match counts.iter_mut().find(|(k, _)| k == key) {
        Some((_, count)) => *count += 1,
        None => counts.push((key.to_string(), 1)),
    }
}

/// First-seen entry with the highest count.
fn peak(counts: &[(String, usize)]) -> Option<(&str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    for (key, count) in counts {
        if best.is_none_or(|(_, b)| *count > b) {
            best = Some((key, *count));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged(timestamp: &str, event: &str, location: &str) -> LoggedAlert {
        LoggedAlert {
            timestamp: timestamp.to_string(),
            event: event.to_string(),
            location: location.to_string(),
            details: String::new(),
            url: String::new(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()
    }

    #[test]
    fn empty_day_reports_no_alerts() {
        let text = build_summary(&[], day());
        assert!(text.contains("Total Alerts: 0"));
        assert!(text.contains("No alerts recorded today."));
    }

    #[test]
    fn other_days_excluded() {
        let entries = [logged("2024-07-03 10:00:00", "Tornado Warning", "Wayne, MI")];
        let text = build_summary(&entries, day());
        assert!(text.contains("Total Alerts: 0"));
    }

    #[test]
    fn breakdown_peak_and_region() {
        let entries = [
            logged("2024-07-04 14:05:00", "Tornado Warning", "Wayne, MI"),
            logged("2024-07-04 14:40:00", "Tornado Warning", "Wayne, MI"),
            logged("2024-07-04 16:10:00", "Heat Advisory", "Oakland, MI"),
            logged("2024-07-04 17:20:00", "PDS Tornado Warning", "Wayne, MI"),
        ];
        let text = build_summary(&entries, day());
        assert!(text.contains("Total Alerts: 4"));
        assert!(text.contains("Tornado Warning: 2 (50.0%)"));
        assert!(text.contains("Heat Advisory: 1 (25.0%)"));
        assert!(text.contains("**Peak Hour:** 14:00 (2 alerts)"));
        assert!(text.contains("**Most Active Region:** Wayne, MI (3 alerts)"));
        assert!(text.contains("**Critical Alerts:** 1"));
    }

    #[test]
    fn critical_count_covers_escalated_categories() {
        let entries = [
            logged("2024-07-04 01:00:00", "Tornado Emergency", "Wayne, MI"),
            logged("2024-07-04 02:00:00", "Tornado Observed", "Wayne, MI"),
            logged("2024-07-04 03:00:00", "Tornado Watch", "Wayne, MI"),
        ];
        let text = build_summary(&entries, day());
        assert!(text.contains("**Critical Alerts:** 2"));
    }
}
