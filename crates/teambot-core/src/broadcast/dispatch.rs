use std::{sync::Arc, time::Duration};

use tokio::time::sleep;

use crate::{
    domain::{ActorId, Recipient},
    messaging::port::{FormattingMode, MessagingPort},
};

#[derive(Clone, Copy, Debug)]
pub struct DispatcherConfig {
    /// Pause between consecutive sends (outbound flood control).
    pub send_interval: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            send_interval: Duration::from_millis(100),
        }
    }
}

/// A recipient the transport rejected, as listed in the report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedRecipient {
    pub display_name: String,
    pub id: ActorId,
}

/// Aggregated result of one dispatch run.
///
/// Mutated only inside the send loop; frozen once `dispatch` returns and
/// handed to the report builder as-is. `failed_entries` is unbounded here;
/// the report caps what it lists.
#[derive(Clone, Debug, Default)]
pub struct DispatchOutcome {
    pub total_targeted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failed_entries: Vec<FailedRecipient>,
}

impl DispatchOutcome {
    /// Percentage of targeted recipients that were delivered to.
    /// Defined as 0 for an empty target set.
    pub fn success_rate(&self) -> f64 {
        if self.total_targeted == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.total_targeted as f64 * 100.0
    }
}

/// Executes an approved broadcast: strictly sequential sends, per-recipient
/// failure isolation, a fixed pause between sends.
pub struct Dispatcher {
    transport: Arc<dyn MessagingPort>,
    cfg: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn MessagingPort>, cfg: DispatcherConfig) -> Self {
        Self { transport, cfg }
    }

    /// Send `text` to every recipient, in the given order, one at a time.
    ///
    /// A rejected send is counted and logged, never propagated: the run
    /// always covers the full recipient set, and this method never fails.
    /// An empty set short-circuits without touching the transport so
    /// callers can render a distinct "no recipients" notice instead of a
    /// 0/0 report.
    pub async fn dispatch(
        &self,
        recipients: &[Recipient],
        text: &str,
        mode: FormattingMode,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome {
            total_targeted: recipients.len(),
            ..Default::default()
        };
        if recipients.is_empty() {
            return outcome;
        }

        for (i, recipient) in recipients.iter().enumerate() {
            match self.transport.send_text(recipient.chat_id, text, mode).await {
                Ok(()) => outcome.succeeded += 1,
                Err(err) => {
                    outcome.failed += 1;
                    outcome.failed_entries.push(FailedRecipient {
                        display_name: recipient.display_name.clone(),
                        id: recipient.id,
                    });
                    tracing::warn!(
                        recipient = recipient.id.0,
                        error = %err,
                        "broadcast send failed, skipping recipient"
                    );
                }
            }

            if i + 1 < recipients.len() {
                sleep(self.cfg.send_interval).await;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatId, Role};
    use crate::messaging::port::SendError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeTransport {
        sent: Mutex<Vec<(ChatId, String)>>,
        reject: Vec<ChatId>,
    }

    #[async_trait]
    impl MessagingPort for FakeTransport {
        async fn send_text(
            &self,
            to: ChatId,
            text: &str,
            _mode: FormattingMode,
        ) -> Result<(), SendError> {
            if self.reject.contains(&to) {
                return Err(SendError("blocked by recipient".to_string()));
            }
            self.sent.lock().unwrap().push((to, text.to_string()));
            Ok(())
        }
    }

    fn recipient(id: i64) -> Recipient {
        Recipient {
            id: ActorId(id),
            chat_id: ChatId(id * 10),
            display_name: format!("user-{id}"),
            role: Role::Member,
        }
    }

    fn dispatcher(transport: Arc<FakeTransport>) -> Dispatcher {
        Dispatcher::new(
            transport,
            DispatcherConfig {
                send_interval: Duration::ZERO,
            },
        )
    }

    #[tokio::test]
    async fn empty_set_short_circuits_without_sends() {
        let transport = Arc::new(FakeTransport::default());
        let out = dispatcher(transport.clone())
            .dispatch(&[], "hi", FormattingMode::Plain)
            .await;

        assert_eq!(out.total_targeted, 0);
        assert_eq!(out.succeeded, 0);
        assert_eq!(out.failed, 0);
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn counters_always_sum_to_the_target_count() {
        let transport = Arc::new(FakeTransport {
            reject: vec![ChatId(20), ChatId(40)],
            ..Default::default()
        });
        let recipients: Vec<Recipient> = (1..=4).map(recipient).collect();

        let out = dispatcher(transport.clone())
            .dispatch(&recipients, "hi", FormattingMode::Markdown)
            .await;

        assert_eq!(out.total_targeted, 4);
        assert_eq!(out.succeeded + out.failed, 4);
        assert_eq!(out.failed, 2);
        assert_eq!(
            out.failed_entries,
            vec![
                FailedRecipient {
                    display_name: "user-2".to_string(),
                    id: ActorId(2),
                },
                FailedRecipient {
                    display_name: "user-4".to_string(),
                    id: ActorId(4),
                },
            ]
        );
    }

    #[tokio::test]
    async fn sends_in_the_given_order() {
        let transport = Arc::new(FakeTransport::default());
        let recipients: Vec<Recipient> = [3, 1, 2].into_iter().map(recipient).collect();

        dispatcher(transport.clone())
            .dispatch(&recipients, "hi", FormattingMode::Plain)
            .await;

        let chats: Vec<i64> = transport
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|(c, _)| c.0)
            .collect();
        assert_eq!(chats, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn a_failure_never_aborts_the_run() {
        let transport = Arc::new(FakeTransport {
            reject: vec![ChatId(10)],
            ..Default::default()
        });
        let recipients: Vec<Recipient> = (1..=3).map(recipient).collect();

        let out = dispatcher(transport.clone())
            .dispatch(&recipients, "hi", FormattingMode::Plain)
            .await;

        assert_eq!(out.succeeded, 2);
        // The two after the failing one were still attempted.
        let chats: Vec<i64> = transport
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|(c, _)| c.0)
            .collect();
        assert_eq!(chats, vec![20, 30]);
    }

    #[test]
    fn success_rate_is_zero_for_empty_runs() {
        assert_eq!(DispatchOutcome::default().success_rate(), 0.0);
    }
}
