//! Mount barrier
//!
//! [`SettleGate`] decides when section registration has stabilized. It is
//! armed with the ids of the sections expected to mount and opens once all
//! of them report ready. Ids outside the armed set are ignored. If some never report, the settle deadline opens it
//! anyway so snapping is not held up by a section that failed to mount.

use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

use crate::registry::SectionId;

/// Deadline after arming at which the gate opens regardless
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Why an open gate opened
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenReason {
    /// Every expected section reported ready
    AllReady,
    /// The settle deadline passed first
    Deadline,
}

/// Observable state of a [`SettleGate`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateStatus {
    /// Not armed
    Disarmed,
    /// Armed, waiting on sections
    Waiting { ready: usize, expected: usize },
    /// Registration has settled
    Open(OpenReason),
}

impl GateStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, GateStatus::Open(_))
    }
}

/// Barrier over an expected set of mounting sections
#[derive(Debug)]
pub struct SettleGate {
    settle_delay: Duration,
    expected: FxHashSet<SectionId>,
    ready: FxHashSet<SectionId>,
    deadline: Option<Instant>,
    opened: Option<OpenReason>,
}

impl Default for SettleGate {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

impl SettleGate {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            settle_delay,
            expected: FxHashSet::default(),
            ready: FxHashSet::default(),
            deadline: None,
            opened: None,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Arm for the `expected` sections; call before any of them mount
    ///
    /// Any readiness recorded by an earlier arming is discarded.
    pub fn arm(&mut self, expected: impl IntoIterator<Item = SectionId>, now: Instant) {
        self.expected = expected.into_iter().collect();
        self.ready.clear();
        self.deadline = Some(now + self.settle_delay);
        self.opened = None;
        tracing::debug!(expected = self.expected.len(), delay_ms = self.settle_delay.as_millis() as u64, "settle gate armed");
    }

    pub fn disarm(&mut self) {
        self.expected.clear();
        self.ready.clear();
        self.deadline = None;
        self.opened = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Record that `id` finished mounting
    pub fn mark_ready(&mut self, id: SectionId) {
        if !self.is_armed() {
            tracing::trace!(%id, "ready reported to a disarmed gate");
            return;
        }
        if !self.expected.contains(&id) {
            tracing::debug!(%id, "ready reported for a section the gate is not waiting on");
            return;
        }
        self.ready.insert(id);
    }

    /// Check the gate at time `now`
    ///
    /// Once open the gate stays open until it is re-armed or disarmed.
    pub fn poll(&mut self, now: Instant) -> GateStatus {
        let Some(deadline) = self.deadline else {
            return GateStatus::Disarmed;
        };
        if let Some(reason) = self.opened {
            return GateStatus::Open(reason);
        }

        let ready = self.ready.len();
        let expected = self.expected.len();
        let reason = if ready >= expected {
            OpenReason::AllReady
        } else if now >= deadline {
            tracing::warn!(
                ready,
                expected,
                "settle deadline passed before every section mounted"
            );
            OpenReason::Deadline
        } else {
            return GateStatus::Waiting { ready, expected };
        };

        tracing::debug!(?reason, ready, "settle gate open");
        self.opened = Some(reason);
        GateStatus::Open(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<SectionId> {
        names.iter().map(|name| SectionId::from(*name)).collect()
    }

    #[test]
    fn test_disarmed_by_default() {
        let mut gate = SettleGate::default();
        assert_eq!(gate.poll(Instant::now()), GateStatus::Disarmed);
        assert_eq!(gate.settle_delay(), DEFAULT_SETTLE_DELAY);
    }

    #[test]
    fn test_opens_when_all_ready() {
        let now = Instant::now();
        let mut gate = SettleGate::default();
        gate.arm(ids(&["hero", "about"]), now);

        gate.mark_ready("hero".into());
        assert_eq!(
            gate.poll(now),
            GateStatus::Waiting {
                ready: 1,
                expected: 2
            }
        );

        gate.mark_ready("about".into());
        assert_eq!(gate.poll(now), GateStatus::Open(OpenReason::AllReady));
    }

    #[test]
    fn test_duplicate_ready_counts_once() {
        let now = Instant::now();
        let mut gate = SettleGate::default();
        gate.arm(ids(&["hero", "about"]), now);
        gate.mark_ready("hero".into());
        gate.mark_ready("hero".into());
        assert!(!gate.poll(now).is_open());
    }

    #[test]
    fn test_deadline_fallback() {
        let now = Instant::now();
        let mut gate = SettleGate::new(Duration::from_millis(100));
        gate.arm(ids(&["hero", "about", "contact"]), now);
        gate.mark_ready("hero".into());

        assert!(!gate.poll(now + Duration::from_millis(99)).is_open());
        assert_eq!(
            gate.poll(now + Duration::from_millis(100)),
            GateStatus::Open(OpenReason::Deadline)
        );
        // Stays open
        assert!(gate.poll(now + Duration::from_millis(500)).is_open());
    }

    #[test]
    fn test_zero_expected_opens_immediately() {
        let now = Instant::now();
        let mut gate = SettleGate::default();
        gate.arm([], now);
        assert_eq!(gate.poll(now), GateStatus::Open(OpenReason::AllReady));
    }

    #[test]
    fn test_rearm_discards_readiness() {
        let now = Instant::now();
        let mut gate = SettleGate::default();
        gate.arm(ids(&["hero"]), now);
        gate.mark_ready("hero".into());
        assert!(gate.poll(now).is_open());

        gate.arm(ids(&["hero"]), now);
        assert!(!gate.poll(now).is_open());

        gate.disarm();
        gate.mark_ready("hero".into());
        assert_eq!(gate.poll(now), GateStatus::Disarmed);
    }

    #[test]
    fn test_unexpected_ids_do_not_count() {
        let now = Instant::now();
        let mut gate = SettleGate::default();
        gate.arm(ids(&["hero", "about"]), now);
        gate.mark_ready("hero".into());
        gate.mark_ready("not-a-section".into());
        assert_eq!(
            gate.poll(now),
            GateStatus::Waiting {
                ready: 1,
                expected: 2
            }
        );

        gate.mark_ready("about".into());
        assert_eq!(gate.poll(now), GateStatus::Open(OpenReason::AllReady));
    }
}
