//! End-to-end planner scenarios driven through the public API, with a
//! recording interface standing in for the motion controller.

use tp_common::enables::AxisEnables;
use tp_common::interface::MotionInterface;
use tp_common::types::{MotionType, PlannerType, SourceTag};
use tp_common::{Cart, Pose};
use tp_planner::planner::Planner;
use tp_planner::state::PlannerState;

/// Captures every status write so tests can assert on what the host
/// would have seen.
#[derive(Debug, Clone)]
struct RecordingInterface {
    planner_type: PlannerType,
    jerk_limit: f64,
    cycle_time: f64,
    enables_new: AxisEnables,

    distance_to_go: f64,
    current_vel: f64,
    current_acc: f64,
    current_jerk: f64,
    requested_vel: f64,
    dtg_pose: Pose,
    enables_queued: AxisEnables,
    spindle_sync: bool,
    current_dir: Cart,

    vel_history: Vec<f64>,
    dtg_history: Vec<f64>,

    /// (axis, unlock) rotary requests in call order.
    rotary_calls: Vec<(u8, bool)>,
    /// Cycles remaining until the rotary axis reports unlocked.
    rotary_delay: std::cell::Cell<u32>,

    axis_vel_limits: [f64; 3],
    axis_acc_limits: [f64; 3],
}

impl Default for RecordingInterface {
    fn default() -> Self {
        Self {
            planner_type: PlannerType::SCurve,
            jerk_limit: 5000.0,
            cycle_time: 0.001,
            enables_new: AxisEnables::from_mask(0xFF),
            distance_to_go: 0.0,
            current_vel: 0.0,
            current_acc: 0.0,
            current_jerk: 0.0,
            requested_vel: 0.0,
            dtg_pose: Pose::ZERO,
            enables_queued: AxisEnables::empty(),
            spindle_sync: false,
            current_dir: Cart::ZERO,
            vel_history: Vec::new(),
            dtg_history: Vec::new(),
            rotary_calls: Vec::new(),
            rotary_delay: std::cell::Cell::new(0),
            axis_vel_limits: [f64::INFINITY; 3],
            axis_acc_limits: [f64::INFINITY; 3],
        }
    }
}

impl MotionInterface for RecordingInterface {
    fn planner_type(&self) -> PlannerType {
        self.planner_type
    }

    fn jerk_limit(&self) -> f64 {
        self.jerk_limit
    }

    fn cycle_time(&self) -> f64 {
        self.cycle_time
    }

    fn enables_new(&self) -> AxisEnables {
        self.enables_new
    }

    fn set_distance_to_go(&mut self, distance: f64) {
        self.distance_to_go = distance;
        self.dtg_history.push(distance);
    }

    fn set_current_vel(&mut self, vel: f64) {
        self.current_vel = vel;
        self.vel_history.push(vel);
    }

    fn set_current_acc(&mut self, acc: f64) {
        self.current_acc = acc;
    }

    fn set_current_jerk(&mut self, jerk: f64) {
        self.current_jerk = jerk;
    }

    fn set_requested_vel(&mut self, vel: f64) {
        self.requested_vel = vel;
    }

    fn set_dtg_pose(&mut self, dtg: &Pose) {
        self.dtg_pose = *dtg;
    }

    fn set_enables_queued(&mut self, enables: AxisEnables) {
        self.enables_queued = enables;
    }

    fn set_spindle_sync(&mut self, sync: bool) {
        self.spindle_sync = sync;
    }

    fn set_current_dir(&mut self, dir: &Cart) {
        self.current_dir = *dir;
    }

    fn set_rotary_unlock(&mut self, axis: u8, unlock: bool) {
        self.rotary_calls.push((axis, unlock));
    }

    fn rotary_is_unlocked(&self, _axis: u8) -> bool {
        let remaining = self.rotary_delay.get();
        if remaining == 0 {
            true
        } else {
            self.rotary_delay.set(remaining - 1);
            false
        }
    }

    fn axis_vel_limit(&self, axis: usize) -> f64 {
        self.axis_vel_limits.get(axis).copied().unwrap_or(f64::INFINITY)
    }

    fn axis_acc_limit(&self, axis: usize) -> f64 {
        self.axis_acc_limits.get(axis).copied().unwrap_or(f64::INFINITY)
    }
}

fn init_tracing() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn planner_with(iface: RecordingInterface) -> Planner<RecordingInterface> {
    init_tracing();
    let mut p = Planner::create(iface, 32).unwrap();
    p.set_velocity_limits(100.0, 200.0).unwrap();
    p.set_accel_limit(1000.0).unwrap();
    p.init();
    p
}

fn planner() -> Planner<RecordingInterface> {
    planner_with(RecordingInterface::default())
}

fn add_feed_line(p: &mut Planner<RecordingInterface>, x: f64, y: f64, z: f64, tag: u64) {
    p.add_line(
        Pose::from_tran(Cart::new(x, y, z)),
        MotionType::Feed,
        50.0,
        100.0,
        500.0,
        5000.0,
        AxisEnables::from_mask(0xFF),
        false,
        None,
        SourceTag(tag),
    )
    .unwrap();
}

fn run_to_done(p: &mut Planner<RecordingInterface>, max_cycles: usize) {
    for _ in 0..max_cycles {
        p.run_cycle().unwrap();
        if p.is_done() {
            return;
        }
    }
    panic!("planner did not finish within {max_cycles} cycles");
}

#[test]
fn single_line_reports_monotone_distance_to_go() {
    let mut p = planner();
    add_feed_line(&mut p, 50.0, 0.0, 0.0, 1);
    run_to_done(&mut p, 100_000);

    let iface = p.interface();
    assert!(p.current_pose().tran.distance_to(&Cart::new(50.0, 0.0, 0.0)) < 1e-6);
    // Distance-to-go shrinks every in-flight cycle and ends at zero.
    let dtg = &iface.dtg_history;
    assert!(dtg.windows(2).all(|w| w[1] <= w[0] + 1e-9));
    assert_eq!(*dtg.last().unwrap(), 0.0);
    // Requested velocity echoed while in flight.
    assert_eq!(iface.requested_vel, 50.0);
}

#[test]
fn velocity_profile_respects_request_and_ends_at_rest() {
    let mut p = planner();
    add_feed_line(&mut p, 50.0, 0.0, 0.0, 1);
    run_to_done(&mut p, 100_000);

    let hist = &p.interface().vel_history;
    let peak = hist.iter().cloned().fold(0.0f64, f64::max);
    assert!(peak <= 50.0 + 1e-6, "peak = {peak}");
    assert!(peak > 40.0, "never approached the requested velocity: {peak}");
    assert!(hist.iter().all(|&v| v >= 0.0));
    assert_eq!(*hist.last().unwrap(), 0.0);
}

#[test]
fn quarter_circle_tracks_the_arc() {
    let mut p = planner();
    p.set_position(Pose::from_tran(Cart::new(10.0, 0.0, 0.0))).unwrap();
    p.add_circle(
        Pose::from_tran(Cart::new(0.0, 10.0, 0.0)),
        Cart::ZERO,
        Cart::new(0.0, 0.0, 1.0),
        0,
        MotionType::Arc,
        50.0,
        100.0,
        500.0,
        5000.0,
        AxisEnables::from_mask(0xFF),
        false,
        SourceTag(2),
    )
    .unwrap();

    let mut max_radius_err = 0.0f64;
    for _ in 0..100_000 {
        p.run_cycle().unwrap();
        if !p.is_done() {
            let r = p.current_pose().tran.distance_to(&Cart::ZERO);
            max_radius_err = max_radius_err.max((r - 10.0).abs());
        } else {
            break;
        }
    }
    assert!(p.is_done());
    assert!(max_radius_err < 1e-6, "radius error {max_radius_err}");
    assert!(p.current_pose().tran.distance_to(&Cart::new(0.0, 10.0, 0.0)) < 1e-6);
}

#[test]
fn square_corner_slows_into_the_join() {
    let mut p = planner();
    add_feed_line(&mut p, 20.0, 0.0, 0.0, 1);
    add_feed_line(&mut p, 20.0, 20.0, 0.0, 2);

    // Track the velocity at the moment travel direction flips to +Y.
    let mut vel_at_corner = None;
    for _ in 0..200_000 {
        p.run_cycle().unwrap();
        let iface = p.interface();
        if vel_at_corner.is_none() && iface.current_dir.y > 0.5 {
            vel_at_corner = Some(iface.current_vel);
        }
        if p.is_done() {
            break;
        }
    }
    assert!(p.is_done());
    // A right-angle kink under a 0.5 uu/s per-cycle acceleration
    // budget permits well under 1 uu/s across the corner.
    let v = vel_at_corner.expect("never turned the corner");
    assert!(v < 2.0, "carried {v} through a square corner");
}

#[test]
fn enables_and_spindle_sync_are_echoed() {
    let mut p = planner();
    p.set_spindle_sync(true);
    p.add_line(
        Pose::from_tran(Cart::new(5.0, 0.0, 0.0)),
        MotionType::Feed,
        50.0,
        100.0,
        500.0,
        5000.0,
        AxisEnables::from_mask(0x0F),
        true,
        None,
        SourceTag(3),
    )
    .unwrap();
    for _ in 0..10 {
        p.run_cycle().unwrap();
    }
    let iface = p.interface();
    assert_eq!(iface.enables_queued.mask(), 0x0F);
    assert!(iface.spindle_sync);
}

#[test]
fn rotary_move_holds_until_unlock_confirms_then_relocks() {
    let mut iface = RecordingInterface::default();
    iface.rotary_delay = std::cell::Cell::new(5);
    let mut p = planner_with(iface);

    p.add_line(
        Pose {
            a: 90.0,
            ..Pose::ZERO
        },
        MotionType::IndexRotary,
        50.0,
        100.0,
        500.0,
        5000.0,
        AxisEnables::from_mask(0x08),
        false,
        Some(3),
        SourceTag(4),
    )
    .unwrap();

    // Cycle 1 activates and requests unlock; cycles 2-5 still hold.
    for _ in 0..5 {
        p.run_cycle().unwrap();
        assert_eq!(p.interface().current_vel, 0.0);
    }
    assert_eq!(p.interface().rotary_calls, vec![(3, true)]);

    run_to_done(&mut p, 200_000);
    assert_eq!(p.interface().rotary_calls, vec![(3, true), (3, false)]);
    assert!((p.current_pose().a - 90.0).abs() < 1e-6);
}

#[test]
fn trapezoidal_profile_reaches_cruise_faster_than_scurve() {
    let cycles_to_cruise = |ptype: PlannerType| {
        let mut iface = RecordingInterface::default();
        iface.planner_type = ptype;
        let mut p = planner_with(iface);
        add_feed_line(&mut p, 200.0, 0.0, 0.0, 1);
        for cycle in 0..100_000 {
            p.run_cycle().unwrap();
            if p.interface().current_vel >= 49.9 {
                return cycle;
            }
        }
        panic!("never reached cruise");
    };

    let trap = cycles_to_cruise(PlannerType::Trapezoidal);
    let scurve = cycles_to_cruise(PlannerType::SCurve);
    assert!(trap < scurve, "trapezoidal {trap} vs s-curve {scurve}");
}

#[test]
fn per_axis_velocity_limit_caps_the_move() {
    let mut iface = RecordingInterface::default();
    iface.axis_vel_limits[0] = 10.0;
    let mut p = planner_with(iface);
    add_feed_line(&mut p, 50.0, 0.0, 0.0, 1);
    run_to_done(&mut p, 200_000);

    let peak = p
        .interface()
        .vel_history
        .iter()
        .cloned()
        .fold(0.0f64, f64::max);
    assert!(peak <= 10.0 + 1e-6, "peak = {peak}");
}

#[test]
fn abort_drains_queue_and_comes_to_rest() {
    let mut p = planner();
    add_feed_line(&mut p, 100.0, 0.0, 0.0, 1);
    add_feed_line(&mut p, 100.0, 100.0, 0.0, 2);
    for _ in 0..300 {
        p.run_cycle().unwrap();
    }
    assert!(p.interface().current_vel > 0.0);

    p.abort().unwrap();
    assert_eq!(p.state(), PlannerState::Aborting);
    assert_eq!(p.queue_depth(), 1);

    run_to_done(&mut p, 100_000);
    assert_eq!(p.interface().current_vel, 0.0);
    assert_eq!(p.stats().segments_completed, 0);
    // The second segment never ran.
    assert!(p.current_pose().tran.y.abs() < 1e-9);
    assert!(p.current_pose().tran.x < 100.0);
}

#[test]
fn planner_restarts_after_done() {
    let mut p = planner();
    add_feed_line(&mut p, 5.0, 0.0, 0.0, 1);
    run_to_done(&mut p, 100_000);

    add_feed_line(&mut p, 10.0, 0.0, 0.0, 2);
    assert_eq!(p.state(), PlannerState::Running);
    run_to_done(&mut p, 100_000);
    assert!(p.current_pose().tran.distance_to(&Cart::new(10.0, 0.0, 0.0)) < 1e-6);
    assert_eq!(p.stats().segments_completed, 2);
}

#[test]
fn startup_sequence_accepts_first_line() {
    let mut p = Planner::create(RecordingInterface::default(), 50).unwrap();
    p.init();
    p.set_cycle_time(0.001).unwrap();
    p.set_velocity_limits(100.0, 200.0).unwrap();
    p.set_accel_limit(1000.0).unwrap();
    p.set_position(Pose::ZERO).unwrap();
    p.add_line(
        Pose::from_tran(Cart::new(10.0, 5.0, 2.0)),
        MotionType::Feed,
        50.0,
        100.0,
        500.0,
        5000.0,
        AxisEnables::from_mask(0xFF),
        false,
        None,
        SourceTag(1),
    )
    .unwrap();
    assert_eq!(p.queue_depth(), 1);
    assert!(!p.is_done());
}

#[test]
fn chained_right_angle_path_cycles_then_clears() {
    let mut p = planner();
    add_feed_line(&mut p, 10.0, 0.0, 0.0, 1);
    add_feed_line(&mut p, 10.0, 10.0, 0.0, 2);
    add_feed_line(&mut p, 0.0, 10.0, 0.0, 3);
    for _ in 0..10 {
        p.run_cycle().unwrap();
    }
    p.clear().unwrap();
    assert_eq!(p.queue_depth(), 0);
    assert_eq!(p.state(), PlannerState::Idle);
}

#[test]
fn full_turn_arc_is_accepted_and_cycles() {
    let mut p = planner();
    p.set_position(Pose::from_tran(Cart::new(10.0, 0.0, 0.0))).unwrap();
    p.add_circle(
        Pose::from_tran(Cart::new(0.0, 10.0, 0.0)),
        Cart::ZERO,
        Cart::new(0.0, 0.0, 1.0),
        1,
        MotionType::Arc,
        50.0,
        100.0,
        500.0,
        5000.0,
        AxisEnables::from_mask(0xFF),
        false,
        SourceTag(5),
    )
    .unwrap();
    for _ in 0..100 {
        p.run_cycle().unwrap();
    }
    assert!(!p.is_done());
    // Quarter sweep plus one full revolution.
    let expected = 10.0 * (std::f64::consts::FRAC_PI_2 + 2.0 * std::f64::consts::PI);
    let dtg = p.interface().distance_to_go;
    assert!(dtg > 0.0 && dtg < expected, "dtg = {dtg}");
}

#[test]
fn idle_cycles_write_rest_status() {
    let mut p = planner();
    p.run_cycle().unwrap();
    let iface = p.interface();
    assert_eq!(iface.distance_to_go, 0.0);
    assert_eq!(iface.current_vel, 0.0);
    assert_eq!(iface.current_dir, Cart::ZERO);
    // Host-side enables are echoed back while idle.
    assert_eq!(iface.enables_queued.mask(), 0xFF);
}
