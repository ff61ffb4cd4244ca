use chrono::{DateTime, Local};

use super::dispatch::DispatchOutcome;

/// How many failed recipients are listed by name; the rest collapse into an
/// "and N more" line.
const MAX_LISTED_FAILURES: usize = 5;

/// Context metadata shown alongside the counters.
#[derive(Clone, Debug)]
pub struct ReportMeta {
    pub scope_label: String,
    pub initiator_label: String,
    pub completed_at: DateTime<Local>,
}

/// Format a completed dispatch into the admin-facing summary.
pub fn render(outcome: &DispatchOutcome, meta: &ReportMeta) -> String {
    let mut out = format!(
        "✅ *Broadcast complete*\n\n\
         🏢 *Scope:* {}\n\
         👤 *Sent by:* {}\n\
         📅 *Finished:* {}\n\n\
         📊 *Statistics:*\n\
         • Targeted: {}\n\
         • Delivered: {}\n\
         • Failed: {}\n\
         • Success rate: {:.1}%\n",
        meta.scope_label,
        meta.initiator_label,
        meta.completed_at.format("%d.%m.%Y %H:%M"),
        outcome.total_targeted,
        outcome.succeeded,
        outcome.failed,
        outcome.success_rate(),
    );

    if outcome.failed > 0 {
        out.push_str(&format!("\n❌ *Not delivered ({}):*\n", outcome.failed));
        for (i, entry) in outcome
            .failed_entries
            .iter()
            .take(MAX_LISTED_FAILURES)
            .enumerate()
        {
            out.push_str(&format!(
                "{}. {} (ID: {})\n",
                i + 1,
                entry.display_name,
                entry.id.0
            ));
        }
        if outcome.failed > MAX_LISTED_FAILURES {
            out.push_str(&format!(
                "… and {} more\n",
                outcome.failed - MAX_LISTED_FAILURES
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::dispatch::FailedRecipient;
    use crate::domain::ActorId;
    use chrono::TimeZone;

    fn meta() -> ReportMeta {
        ReportMeta {
            scope_label: "Northside FC".to_string(),
            initiator_label: "Dana".to_string(),
            completed_at: Local.with_ymd_and_hms(2026, 8, 6, 19, 0, 0).unwrap(),
        }
    }

    fn failures(n: usize) -> Vec<FailedRecipient> {
        (0..n)
            .map(|i| FailedRecipient {
                display_name: format!("user-{i}"),
                id: ActorId(i as i64),
            })
            .collect()
    }

    #[test]
    fn renders_counts_and_one_decimal_rate() {
        let outcome = DispatchOutcome {
            total_targeted: 3,
            succeeded: 2,
            failed: 1,
            failed_entries: failures(1),
        };

        let text = render(&outcome, &meta());
        assert!(text.contains("Targeted: 3"));
        assert!(text.contains("Delivered: 2"));
        assert!(text.contains("Failed: 1"));
        assert!(text.contains("66.7%"));
        assert!(text.contains("Northside FC"));
        assert!(text.contains("Dana"));
        assert!(text.contains("06.08.2026 19:00"));
        assert!(text.contains("user-0 (ID: 0)"));
    }

    #[test]
    fn caps_the_failure_list_at_five() {
        let outcome = DispatchOutcome {
            total_targeted: 10,
            succeeded: 3,
            failed: 7,
            failed_entries: failures(7),
        };

        let text = render(&outcome, &meta());
        assert!(text.contains("5. user-4"));
        assert!(!text.contains("user-5"));
        assert!(text.contains("and 2 more"));
    }

    #[test]
    fn no_failure_section_when_everything_delivered() {
        let outcome = DispatchOutcome {
            total_targeted: 2,
            succeeded: 2,
            failed: 0,
            failed_entries: Vec::new(),
        };

        let text = render(&outcome, &meta());
        assert!(text.contains("100.0%"));
        assert!(!text.contains("Not delivered"));
    }

    #[test]
    fn zero_targeted_renders_zero_rate() {
        let text = render(&DispatchOutcome::default(), &meta());
        assert!(text.contains("0.0%"));
    }
}
