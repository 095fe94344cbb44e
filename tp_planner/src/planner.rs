//! Per-cycle executor and command surface.
//!
//! A [`Planner`] owns the segment queue, the active segment, and the
//! scalar kinematic state (velocity, acceleration, jerk along the
//! path). Producers enqueue lines and arcs between cycles; the host
//! calls [`Planner::run_cycle`] once per control period. The cycle
//! path performs no allocation and no logging; all hardware and status
//! traffic goes through the bound [`MotionInterface`].

use tp_common::cart::CART_FUZZ;
use tp_common::enables::AxisEnables;
use tp_common::interface::MotionInterface;
use tp_common::types::{MotionType, PlannerType, SourceTag};
use tp_common::{Cart, Pose};

use crate::blend::{BlendParams, Kink, evaluate_kink};
use crate::config::PlannerConfig;
use crate::error::TpError;
use crate::profile::{
    PROFILE_EPS, distance_to_change_speed, max_reachable_speed_to_end_speed,
};
use crate::queue::SegmentQueue;
use crate::segment::{Segment, SegmentLimits};
use crate::state::{PlannerEvent, PlannerState, PlannerStateMachine, PlannerTransition};

/// Cumulative executor counters, reset on [`Planner::init`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleStats {
    /// Cycles executed.
    pub cycle_count: u64,
    /// Segments run to completion.
    pub segments_completed: u64,
    /// High-water mark of queue depth (queued + active).
    pub peak_depth: usize,
}

/// Trajectory planner bound to one motion interface.
#[derive(Debug)]
pub struct Planner<M: MotionInterface> {
    iface: M,
    queue: SegmentQueue,
    active: Option<Segment>,
    sm: PlannerStateMachine,

    /// Control cycle period [s].
    cycle_time: f64,
    /// Nominal velocity limit [uu/s].
    vmax: f64,
    /// Absolute machine velocity ceiling [uu/s].
    vlimit: f64,
    /// Machine acceleration limit [uu/s²].
    amax: f64,
    /// Jerk fallback for segments that carry none; zero means "ask the
    /// interface" [uu/s³].
    jerk_fallback: f64,

    /// Commanded pose as of the last cycle.
    current_pose: Pose,
    /// End pose of the most recently queued segment; start pose for the
    /// next enqueue.
    goal_pose: Pose,
    /// Path velocity [uu/s].
    current_vel: f64,
    /// Path acceleration [uu/s²].
    current_acc: f64,
    /// Path jerk [uu/s³].
    current_jerk: f64,

    spindle_sync: bool,
    blend: BlendParams,
    next_id: u32,
    initialized: bool,
    stats: CycleStats,
}

impl<M: MotionInterface> Planner<M> {
    /// Bind a planner to an interface with a freshly allocated queue.
    ///
    /// The only allocation in this type. Call [`Planner::init`] before
    /// enqueueing or cycling.
    pub fn create(iface: M, queue_capacity: usize) -> Result<Self, TpError> {
        Ok(Self {
            iface,
            queue: SegmentQueue::with_capacity(queue_capacity)?,
            active: None,
            sm: PlannerStateMachine::new(),
            cycle_time: 0.001,
            vmax: f64::INFINITY,
            vlimit: f64::INFINITY,
            amax: f64::INFINITY,
            jerk_fallback: 0.0,
            current_pose: Pose::ZERO,
            goal_pose: Pose::ZERO,
            current_vel: 0.0,
            current_acc: 0.0,
            current_jerk: 0.0,
            spindle_sync: false,
            blend: BlendParams::default(),
            next_id: 1,
            initialized: false,
            stats: CycleStats::default(),
        })
    }

    /// Bind a planner configured from a loaded [`PlannerConfig`].
    pub fn from_config(iface: M, config: &PlannerConfig) -> Result<Self, TpError> {
        let mut planner = Self::create(iface, config.queue_capacity)?;
        planner.set_cycle_time(config.cycle_time)?;
        planner.set_velocity_limits(config.max_velocity, config.abs_max_velocity)?;
        planner.set_accel_limit(config.max_acceleration)?;
        planner.jerk_fallback = config.max_jerk;
        planner.blend = BlendParams {
            enable: config.blend.enable,
            tangent_kink_ratio: config.blend.tangent_kink_ratio,
            parallel_tol: config.blend.parallel_tol,
        };
        Ok(planner)
    }

    /// Reset to a known-good idle state. Must be called once before
    /// any enqueue or cycle; may be called again to reinitialize.
    pub fn init(&mut self) {
        self.queue.reset();
        self.active = None;
        self.sm = PlannerStateMachine::new();
        self.current_vel = 0.0;
        self.current_acc = 0.0;
        self.current_jerk = 0.0;
        self.goal_pose = self.current_pose;
        self.spindle_sync = false;
        self.next_id = 1;
        self.stats = CycleStats::default();
        self.initialized = true;
        tracing::debug!(capacity = self.queue.capacity(), "planner initialized");
    }

    // ─── Configuration setters ──────────────────────────────────────

    pub fn set_cycle_time(&mut self, cycle_time: f64) -> Result<(), TpError> {
        if !(cycle_time > 0.0) || !cycle_time.is_finite() {
            return Err(TpError::InvalidLimit {
                name: "cycle_time",
                value: cycle_time,
            });
        }
        self.cycle_time = cycle_time;
        Ok(())
    }

    /// Set the nominal velocity limit and the absolute machine ceiling.
    pub fn set_velocity_limits(&mut self, vmax: f64, vlimit: f64) -> Result<(), TpError> {
        if !(vmax > 0.0) {
            return Err(TpError::InvalidLimit {
                name: "vmax",
                value: vmax,
            });
        }
        if vlimit < vmax {
            return Err(TpError::InvalidLimit {
                name: "vlimit",
                value: vlimit,
            });
        }
        self.vmax = vmax;
        self.vlimit = vlimit;
        Ok(())
    }

    pub fn set_accel_limit(&mut self, amax: f64) -> Result<(), TpError> {
        if !(amax > 0.0) {
            return Err(TpError::InvalidLimit {
                name: "amax",
                value: amax,
            });
        }
        self.amax = amax;
        Ok(())
    }

    /// Teleport the planner to a pose. Legal only while no motion is
    /// pending; also retargets the enqueue start pose.
    pub fn set_position(&mut self, pose: Pose) -> Result<(), TpError> {
        if matches!(self.sm.state(), PlannerState::Running | PlannerState::Aborting) {
            return Err(TpError::InvalidState("cannot set position while moving"));
        }
        self.current_pose = pose;
        self.goal_pose = pose;
        Ok(())
    }

    /// Spindle-synchronization flag, echoed to the interface every
    /// cycle. Carried, never interpreted.
    pub fn set_spindle_sync(&mut self, sync: bool) {
        self.spindle_sync = sync;
    }

    // ─── Introspection ──────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> PlannerState {
        self.sm.state()
    }

    /// Segments pending, counting the active one.
    #[inline]
    pub fn queue_depth(&self) -> usize {
        self.queue.len() + usize::from(self.active.is_some())
    }

    /// Whether no motion is pending.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.sm.state().is_done()
    }

    #[inline]
    pub fn current_pose(&self) -> Pose {
        self.current_pose
    }

    #[inline]
    pub fn current_vel(&self) -> f64 {
        self.current_vel
    }

    #[inline]
    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    #[inline]
    pub fn interface(&self) -> &M {
        &self.iface
    }

    #[inline]
    pub fn interface_mut(&mut self) -> &mut M {
        &mut self.iface
    }

    // ─── Enqueue ────────────────────────────────────────────────────

    /// Queue a linear move from the current goal pose to `end`.
    ///
    /// `ini_maxjerk ≤ 0` falls back to the configured (or interface)
    /// jerk limit. A full queue fails without mutating any state.
    #[allow(clippy::too_many_arguments)]
    pub fn add_line(
        &mut self,
        end: Pose,
        motion_type: MotionType,
        vel: f64,
        ini_maxvel: f64,
        acc: f64,
        ini_maxjerk: f64,
        enables: AxisEnables,
        at_speed: bool,
        rotary_index: Option<u8>,
        tag: SourceTag,
    ) -> Result<(), TpError> {
        self.check_can_enqueue()?;

        let start = self.goal_pose;
        let mut limits = SegmentLimits {
            req_vel: vel,
            max_vel: ini_maxvel,
            max_acc: acc.min(self.amax),
            max_jerk: self.resolve_jerk(ini_maxjerk),
        };
        self.cap_limits_per_axis(&start, &end, &mut limits);

        let segment = Segment::line(
            self.next_id,
            start,
            end,
            motion_type,
            limits,
            enables,
            at_speed,
            rotary_index,
            tag,
        )?;
        self.enqueue(segment)?;
        tracing::debug!(
            id = self.next_id - 1,
            ?motion_type,
            vel,
            depth = self.queue_depth(),
            "line queued"
        );
        Ok(())
    }

    /// Queue a circular/helical move from the current goal pose to
    /// `end` about `center`/`normal`, with `turn` extra full
    /// revolutions.
    #[allow(clippy::too_many_arguments)]
    pub fn add_circle(
        &mut self,
        end: Pose,
        center: Cart,
        normal: Cart,
        turn: i32,
        motion_type: MotionType,
        vel: f64,
        ini_maxvel: f64,
        acc: f64,
        ini_maxjerk: f64,
        enables: AxisEnables,
        at_speed: bool,
        tag: SourceTag,
    ) -> Result<(), TpError> {
        self.check_can_enqueue()?;

        let start = self.goal_pose;
        let limits = SegmentLimits {
            req_vel: vel,
            max_vel: ini_maxvel,
            max_acc: acc.min(self.amax),
            max_jerk: self.resolve_jerk(ini_maxjerk),
        };

        let segment = Segment::arc(
            self.next_id,
            start,
            end,
            center,
            normal,
            turn,
            motion_type,
            limits,
            enables,
            at_speed,
            tag,
        )?;
        self.enqueue(segment)?;
        tracing::debug!(
            id = self.next_id - 1,
            turn,
            vel,
            depth = self.queue_depth(),
            "circle queued"
        );
        Ok(())
    }

    fn check_can_enqueue(&self) -> Result<(), TpError> {
        if !self.initialized {
            return Err(TpError::NotInitialized);
        }
        if self.sm.state() == PlannerState::Aborting {
            return Err(TpError::InvalidState("segments cannot be added while aborting"));
        }
        Ok(())
    }

    fn resolve_jerk(&self, ini_maxjerk: f64) -> f64 {
        if ini_maxjerk > 0.0 {
            ini_maxjerk
        } else if self.jerk_fallback > 0.0 {
            self.jerk_fallback
        } else {
            self.iface.jerk_limit()
        }
    }

    /// Scale velocity/acceleration bounds so that no Cartesian axis
    /// exceeds its host limit along this line's direction.
    fn cap_limits_per_axis(&self, start: &Pose, end: &Pose, limits: &mut SegmentLimits) {
        if let Some(dir) = (end.tran - start.tran).unit() {
            for axis in 0..3 {
                let component = dir.component(axis).abs();
                if component > CART_FUZZ {
                    limits.max_vel = limits.max_vel.min(self.iface.axis_vel_limit(axis) / component);
                    limits.max_acc = limits.max_acc.min(self.iface.axis_acc_limit(axis) / component);
                }
            }
        }
    }

    /// Evaluate the join against the predecessor, push, and propagate
    /// the blend velocity backwards.
    fn enqueue(&mut self, mut segment: Segment) -> Result<(), TpError> {
        let kink = match self.predecessor() {
            Some(prev) => {
                let incoming = prev.end_direction();
                let outgoing = segment.start_direction();
                if incoming == Cart::ZERO || outgoing == Cart::ZERO {
                    // Rotary-only neighbour: no shared path direction.
                    Kink::stop()
                } else {
                    evaluate_kink(
                        &incoming,
                        &outgoing,
                        segment.limits.max_acc,
                        self.cycle_time,
                        &self.blend,
                    )
                }
            }
            None => Kink::stop(),
        };
        segment.kink = kink;

        let end = segment.end_pose();
        let req_vel = segment.limits.req_vel;
        self.queue.push_back(segment)?;

        if let PlannerTransition::Rejected(reason) = self.sm.handle_event(PlannerEvent::SegmentAccepted)
        {
            let _ = self.queue.pop_back();
            return Err(TpError::InvalidState(reason));
        }

        // The predecessor may now carry velocity into this segment.
        let carried = if kink.blendable {
            kink.vel_limit.min(req_vel)
        } else {
            0.0
        };
        if self.queue.len() >= 2 {
            let index = self.queue.len() - 2;
            if let Some(prev) = self.queue.item_mut(index) {
                prev.final_vel = carried.min(prev.limits.req_vel);
            }
        } else if let Some(active) = self.active.as_mut() {
            active.final_vel = carried.min(active.limits.req_vel);
        }

        self.goal_pose = end;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.stats.peak_depth = self.stats.peak_depth.max(self.queue_depth());
        Ok(())
    }

    /// Last segment in command order: newest queued, else the active
    /// one.
    fn predecessor(&self) -> Option<&Segment> {
        self.queue.last().or(self.active.as_ref())
    }

    // ─── Abort / clear ──────────────────────────────────────────────

    /// Discard queued segments and decelerate the active one to rest.
    /// Idempotent; with nothing in flight it completes immediately.
    pub fn abort(&mut self) -> Result<(), TpError> {
        if !self.initialized {
            return Err(TpError::NotInitialized);
        }
        self.queue.reset();
        self.sm.handle_event(PlannerEvent::AbortRequested);
        if self.active.is_none() && self.sm.state() == PlannerState::Aborting {
            self.sm.handle_event(PlannerEvent::AbortComplete);
        }
        tracing::debug!(state = ?self.sm.state(), "abort requested");
        Ok(())
    }

    /// Hard reset: drop all motion and kinematic state immediately.
    /// Unlike [`Planner::abort`] there is no deceleration.
    pub fn clear(&mut self) -> Result<(), TpError> {
        if !self.initialized {
            return Err(TpError::NotInitialized);
        }
        if let Some(active) = self.active.take()
            && let Some(axis) = active.rotary_index
        {
            self.iface.set_rotary_unlock(axis, false);
        }
        self.queue.reset();
        self.current_vel = 0.0;
        self.current_acc = 0.0;
        self.current_jerk = 0.0;
        self.goal_pose = self.current_pose;
        self.sm.handle_event(PlannerEvent::Cleared);
        tracing::debug!("planner cleared");
        Ok(())
    }

    // ─── Cycle ──────────────────────────────────────────────────────

    /// Advance one control cycle.
    ///
    /// Allocation-free and log-free; bounded work per call.
    pub fn run_cycle(&mut self) -> Result<(), TpError> {
        if !self.initialized {
            return Err(TpError::NotInitialized);
        }
        self.stats.cycle_count += 1;

        match self.sm.state() {
            PlannerState::Idle | PlannerState::Done => {
                self.sm.handle_event(PlannerEvent::CycleAdvanced);
                self.write_rest_status();
                Ok(())
            }
            PlannerState::Aborting => {
                self.cycle_aborting();
                Ok(())
            }
            PlannerState::Running => {
                self.cycle_running();
                Ok(())
            }
        }
    }

    fn cycle_running(&mut self) {
        self.sm.handle_event(PlannerEvent::CycleAdvanced);

        if self.active.is_none() {
            match self.queue.pop_front() {
                Some(segment) => self.activate(segment),
                None => {
                    // Running with nothing queued: the plan is done.
                    self.sm.handle_event(PlannerEvent::AllSegmentsDone);
                    self.write_rest_status();
                    return;
                }
            }
        }

        // Indexing rotary moves hold at zero velocity until the axis
        // confirms unlock.
        if let Some(active) = self.active.as_mut()
            && active.rotary_pending
        {
            let axis = active.rotary_index.unwrap_or(0);
            if self.iface.rotary_is_unlocked(axis) {
                active.rotary_pending = false;
            } else {
                let remaining = active.remaining();
                let req_vel = active.limits.req_vel;
                let end_pose = active.end_pose();
                self.current_vel = 0.0;
                self.current_acc = 0.0;
                self.current_jerk = 0.0;
                let enables = active.enables;
                self.write_motion_status(remaining, req_vel, &end_pose, enables, Cart::ZERO);
                return;
            }
        }

        let Some(mut active) = self.active.take() else {
            return;
        };
        let dt = self.cycle_time;
        let limits = active.limits;
        let remaining = active.remaining();
        let scurve = self.iface.planner_type() == PlannerType::SCurve;

        // Peak speed still reachable while honoring the exit velocity,
        // clamped to every ceiling that applies.
        let target = max_reachable_speed_to_end_speed(
            remaining,
            active.final_vel,
            limits.max_acc,
            limits.max_jerk,
        )
        .unwrap_or(active.final_vel)
        .min(limits.req_vel)
        .min(limits.max_vel)
        .min(self.vmax)
        .min(self.vlimit);
        let exit_vel = active.final_vel.min(target);

        // Brake as soon as the remaining distance no longer covers the
        // transition to the exit velocity (one cycle of margin).
        let braking = remaining
            <= distance_to_change_speed(
                self.current_vel,
                exit_vel,
                self.current_acc,
                limits.max_acc,
                limits.max_jerk,
            ) + self.current_vel * dt;

        let desired_acc = if braking {
            -limits.max_acc
        } else if self.current_vel < target - PROFILE_EPS {
            limits.max_acc
        } else if self.current_vel > target + PROFILE_EPS {
            -limits.max_acc
        } else {
            0.0
        };

        // Jerk-limit the acceleration change; trapezoidal profiles jump
        // straight to the commanded acceleration.
        let mut new_acc = if scurve {
            let max_delta = limits.max_jerk * dt;
            desired_acc.clamp(self.current_acc - max_delta, self.current_acc + max_delta)
        } else {
            desired_acc
        };
        new_acc = new_acc.clamp(-limits.max_acc, limits.max_acc);

        let mut new_vel = self.current_vel + new_acc * dt;
        let floor = if braking { exit_vel } else { 0.0 };
        new_vel = new_vel.max(floor);
        if new_vel > self.current_vel {
            new_vel = new_vel.min(target.max(self.current_vel));
        }

        // Re-derive the applied acceleration after velocity clamping so
        // the reported kinematics stay consistent.
        let applied_acc = (new_vel - self.current_vel) / dt;
        let ds = 0.5 * (self.current_vel + new_vel) * dt;
        active.progress = (active.progress + ds).min(active.length);

        self.current_jerk = (applied_acc - self.current_acc) / dt;
        self.current_acc = applied_acc;
        self.current_vel = new_vel;
        self.current_pose = active.pose_at(active.progress);

        let direction = active.direction_at(active.progress);
        let remaining_after = active.remaining();
        let req_vel = limits.req_vel;
        let end_pose = active.end_pose();
        let enables = active.enables;
        self.write_motion_status(remaining_after, req_vel, &end_pose, enables, direction);

        if active.is_complete() {
            if let Some(axis) = active.rotary_index {
                self.iface.set_rotary_unlock(axis, false);
            }
            self.stats.segments_completed += 1;
            // Velocity carries across a blendable join; the successor
            // activates next cycle.
            if self.queue.is_empty() {
                self.current_vel = 0.0;
                self.current_acc = 0.0;
                self.current_jerk = 0.0;
                self.sm.handle_event(PlannerEvent::AllSegmentsDone);
            }
        } else {
            self.active = Some(active);
        }
    }

    /// Decelerate the active segment to rest along its own path.
    fn cycle_aborting(&mut self) {
        self.sm.handle_event(PlannerEvent::CycleAdvanced);

        let Some(mut active) = self.active.take() else {
            self.finish_abort();
            return;
        };
        let dt = self.cycle_time;
        let limits = active.limits;
        let scurve = self.iface.planner_type() == PlannerType::SCurve;

        let mut new_acc = if scurve {
            let max_delta = limits.max_jerk * dt;
            (-limits.max_acc).clamp(self.current_acc - max_delta, self.current_acc + max_delta)
        } else {
            -limits.max_acc
        };
        new_acc = new_acc.max(-limits.max_acc);

        let new_vel = (self.current_vel + new_acc * dt).max(0.0);
        let ds = 0.5 * (self.current_vel + new_vel) * dt;
        active.progress = (active.progress + ds).min(active.length);

        let applied_acc = (new_vel - self.current_vel) / dt;
        self.current_jerk = (applied_acc - self.current_acc) / dt;
        self.current_acc = applied_acc;
        self.current_vel = new_vel;
        self.current_pose = active.pose_at(active.progress);

        let direction = active.direction_at(active.progress);
        let remaining = active.remaining();
        let req_vel = limits.req_vel;
        let end_pose = active.end_pose();
        let enables = active.enables;
        self.write_motion_status(remaining, req_vel, &end_pose, enables, direction);

        if self.current_vel <= PROFILE_EPS || active.is_complete() {
            if let Some(axis) = active.rotary_index {
                self.iface.set_rotary_unlock(axis, false);
            }
            self.finish_abort();
        } else {
            self.active = Some(active);
        }
    }

    fn finish_abort(&mut self) {
        self.current_vel = 0.0;
        self.current_acc = 0.0;
        self.current_jerk = 0.0;
        self.goal_pose = self.current_pose;
        self.sm.handle_event(PlannerEvent::AbortComplete);
    }

    /// Status set written while no segment is in flight.
    fn write_rest_status(&mut self) {
        let enables = self.iface.enables_new();
        self.iface.set_distance_to_go(0.0);
        self.iface.set_current_vel(0.0);
        self.iface.set_current_acc(0.0);
        self.iface.set_current_jerk(0.0);
        self.iface.set_requested_vel(0.0);
        self.iface.set_dtg_pose(&Pose::ZERO);
        self.iface.set_enables_queued(enables);
        self.iface.set_spindle_sync(self.spindle_sync);
        self.iface.set_current_dir(&Cart::ZERO);
    }

    /// Status set written while a segment is in flight.
    fn write_motion_status(
        &mut self,
        distance_to_go: f64,
        requested_vel: f64,
        end_pose: &Pose,
        enables: AxisEnables,
        direction: Cart,
    ) {
        let dtg_pose = end_pose.delta(&self.current_pose);
        self.iface.set_distance_to_go(distance_to_go);
        self.iface.set_current_vel(self.current_vel);
        self.iface.set_current_acc(self.current_acc);
        self.iface.set_current_jerk(self.current_jerk);
        self.iface.set_requested_vel(requested_vel);
        self.iface.set_dtg_pose(&dtg_pose);
        self.iface.set_enables_queued(enables);
        self.iface.set_spindle_sync(self.spindle_sync);
        self.iface.set_current_dir(&direction);
    }

    fn activate(&mut self, segment: Segment) {
        self.iface.set_enables_queued(segment.enables);
        if let Some(axis) = segment.rotary_index {
            self.iface.set_rotary_unlock(axis, true);
        }
        self.active = Some(segment);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
