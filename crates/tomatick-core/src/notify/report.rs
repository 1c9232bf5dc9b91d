//! Per-channel dispatch outcomes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::capability::Channel;
use super::content::CycleEvent;

/// Why a channel was not invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Turned off in the user's notification settings
    Disabled,
    /// Host has no such facility
    Unavailable,
    /// Push permission never requested
    PermissionPending,
    PermissionDenied,
}

/// What happened to one channel during a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelOutcome {
    Delivered,
    Skipped { reason: SkipReason },
    Failed { reason: String },
}

impl ChannelOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ChannelOutcome::Delivered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelReport {
    pub channel: Channel,
    pub outcome: ChannelOutcome,
}

/// Log of one fan-out, in the order channels were visited.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub event: CycleEvent,
    pub dispatched_at: DateTime<Utc>,
    pub results: Vec<ChannelReport>,
}

impl DispatchReport {
    pub fn new(event: CycleEvent, results: Vec<ChannelReport>) -> Self {
        Self {
            event,
            dispatched_at: Utc::now(),
            results,
        }
    }

    pub fn outcome(&self, channel: Channel) -> Option<&ChannelOutcome> {
        self.results
            .iter()
            .find(|report| report.channel == channel)
            .map(|report| &report.outcome)
    }

    pub fn delivered(&self, channel: Channel) -> bool {
        self.outcome(channel)
            .is_some_and(ChannelOutcome::is_delivered)
    }

    pub fn delivered_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.is_delivered())
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, ChannelOutcome::Failed { .. }))
            .count()
    }

    /// Channel name → success, the shape returned by diagnostic tests.
    pub fn success_map(&self) -> BTreeMap<Channel, bool> {
        self.results
            .iter()
            .map(|r| (r.channel, r.outcome.is_delivered()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_lookup() {
        let report = DispatchReport::new(
            CycleEvent::EndFocus,
            vec![
                ChannelReport {
                    channel: Channel::Visual,
                    outcome: ChannelOutcome::Delivered,
                },
                ChannelReport {
                    channel: Channel::Sound,
                    outcome: ChannelOutcome::Failed {
                        reason: "device busy".into(),
                    },
                },
                ChannelReport {
                    channel: Channel::Push,
                    outcome: ChannelOutcome::Skipped {
                        reason: SkipReason::PermissionPending,
                    },
                },
            ],
        );

        assert_eq!(report.delivered_count(), 1);
        assert_eq!(report.failure_count(), 1);
        assert!(report.delivered(Channel::Visual));
        assert!(!report.delivered(Channel::Push));
        assert!(report.outcome(Channel::Vibration).is_none());
        assert_eq!(report.success_map().len(), 3);
    }
}
