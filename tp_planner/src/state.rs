//! Executor run-state machine.
//!
//! `Idle` and `Done` both mean "no motion pending"; they are
//! distinguished only by whether an abort drained the planner.

/// Planner run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PlannerState {
    /// No motion pending; never run or explicitly cleared.
    Idle = 0,
    /// A segment is queued or mid-execution.
    Running = 1,
    /// Decelerating the active segment to rest; queue already drained.
    Aborting = 2,
    /// No motion pending; all segments finished or abort completed.
    Done = 3,
}

impl PlannerState {
    /// Whether no motion is pending.
    #[inline]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Idle | Self::Done)
    }
}

impl Default for PlannerState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Events that drive the run-state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerEvent {
    /// A segment was accepted into the queue.
    SegmentAccepted,
    /// A cycle advanced the active segment without finishing the plan.
    CycleAdvanced,
    /// The last segment finished and the queue is empty.
    AllSegmentsDone,
    /// Abort requested; queued segments discarded.
    AbortRequested,
    /// Abort deceleration reached zero velocity.
    AbortComplete,
    /// Queue forcibly emptied and velocity state zeroed.
    Cleared,
}

/// Result of a transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerTransition {
    /// State changed (or legally stayed).
    Ok(PlannerState),
    /// Transition rejected.
    Rejected(&'static str),
}

/// Run-state machine for the executor.
#[derive(Debug, Clone, Default)]
pub struct PlannerStateMachine {
    state: PlannerState,
}

impl PlannerStateMachine {
    pub const fn new() -> Self {
        Self {
            state: PlannerState::Idle,
        }
    }

    #[inline]
    pub const fn state(&self) -> PlannerState {
        self.state
    }

    /// Handle an event.
    pub fn handle_event(&mut self, event: PlannerEvent) -> PlannerTransition {
        use PlannerEvent as E;
        use PlannerState as S;

        let next = match (self.state, event) {
            // First enqueue starts motion; enqueue after Done restarts.
            (S::Idle | S::Done | S::Running, E::SegmentAccepted) => S::Running,

            // Advance in place.
            (S::Running, E::CycleAdvanced) => S::Running,
            // A cycle while idle is a no-op, not an error.
            (S::Idle, E::CycleAdvanced) => S::Idle,
            (S::Done, E::CycleAdvanced) => S::Done,

            (S::Running, E::AllSegmentsDone) => S::Done,

            (S::Running, E::AbortRequested) => S::Aborting,
            // Abort with nothing in flight completes immediately.
            (S::Idle | S::Done, E::AbortRequested) => S::Done,
            // Idempotent while already aborting.
            (S::Aborting, E::AbortRequested) => S::Aborting,
            (S::Aborting, E::CycleAdvanced) => S::Aborting,
            (S::Aborting, E::AbortComplete) => S::Done,

            // Clear is legal from any state.
            (_, E::Cleared) => S::Idle,

            (S::Aborting, E::SegmentAccepted) => {
                return PlannerTransition::Rejected("segments cannot be added while aborting");
            }

            _ => return PlannerTransition::Rejected("invalid planner transition"),
        };

        self.state = next;
        PlannerTransition::Ok(next)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use PlannerEvent as E;
    use PlannerState as S;

    #[test]
    fn initial_state_is_idle() {
        assert_eq!(PlannerStateMachine::new().state(), S::Idle);
        assert!(S::Idle.is_done());
    }

    #[test]
    fn add_run_finish_cycle() {
        let mut sm = PlannerStateMachine::new();
        assert_eq!(sm.handle_event(E::SegmentAccepted), PlannerTransition::Ok(S::Running));
        assert_eq!(sm.handle_event(E::CycleAdvanced), PlannerTransition::Ok(S::Running));
        assert_eq!(sm.handle_event(E::AllSegmentsDone), PlannerTransition::Ok(S::Done));
        assert!(sm.state().is_done());
    }

    #[test]
    fn add_after_done_restarts() {
        let mut sm = PlannerStateMachine { state: S::Done };
        assert_eq!(sm.handle_event(E::SegmentAccepted), PlannerTransition::Ok(S::Running));
    }

    #[test]
    fn abort_sequence() {
        let mut sm = PlannerStateMachine { state: S::Running };
        assert_eq!(sm.handle_event(E::AbortRequested), PlannerTransition::Ok(S::Aborting));
        assert_eq!(sm.handle_event(E::CycleAdvanced), PlannerTransition::Ok(S::Aborting));
        assert_eq!(sm.handle_event(E::AbortComplete), PlannerTransition::Ok(S::Done));
    }

    #[test]
    fn abort_when_idle_completes_immediately() {
        let mut sm = PlannerStateMachine::new();
        assert_eq!(sm.handle_event(E::AbortRequested), PlannerTransition::Ok(S::Done));
    }

    #[test]
    fn add_while_aborting_is_rejected() {
        let mut sm = PlannerStateMachine { state: S::Aborting };
        assert!(matches!(
            sm.handle_event(E::SegmentAccepted),
            PlannerTransition::Rejected(_)
        ));
        assert_eq!(sm.state(), S::Aborting);
    }

    #[test]
    fn clear_from_any_state() {
        for state in [S::Idle, S::Running, S::Aborting, S::Done] {
            let mut sm = PlannerStateMachine { state };
            assert_eq!(sm.handle_event(E::Cleared), PlannerTransition::Ok(S::Idle), "from {state:?}");
        }
    }
}
