use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Rotation axis of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// One segment of the tumble cycle. Each phase rotates a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// x: 0 -> π/2
    TiltForward,
    /// y: 0 -> π
    TurnHalf,
    /// x: π/2 -> 0
    TiltBack,
    /// y: π -> 3π/2
    TurnOnward,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::TiltForward,
        Phase::TurnHalf,
        Phase::TiltBack,
        Phase::TurnOnward,
    ];

    pub fn index(self) -> u8 {
        match self {
            Phase::TiltForward => 0,
            Phase::TurnHalf => 1,
            Phase::TiltBack => 2,
            Phase::TurnOnward => 3,
        }
    }

    pub fn next(self) -> Phase {
        match self {
            Phase::TiltForward => Phase::TurnHalf,
            Phase::TurnHalf => Phase::TiltBack,
            Phase::TiltBack => Phase::TurnOnward,
            Phase::TurnOnward => Phase::TiltForward,
        }
    }

    pub fn axis(self) -> Axis {
        self.sweep().axis
    }

    /// Angle the active axis is pinned to when the phase ends.
    pub fn boundary(self) -> f64 {
        self.sweep().to
    }

    fn sweep(self) -> Sweep {
        match self {
            Phase::TiltForward => Sweep {
                axis: Axis::X,
                from: 0.0,
                to: FRAC_PI_2,
            },
            Phase::TurnHalf => Sweep {
                axis: Axis::Y,
                from: 0.0,
                to: PI,
            },
            Phase::TiltBack => Sweep {
                axis: Axis::X,
                from: FRAC_PI_2,
                to: 0.0,
            },
            Phase::TurnOnward => Sweep {
                axis: Axis::Y,
                from: PI,
                to: 1.5 * PI,
            },
        }
    }
}

/// Angular span covered by a phase.
#[derive(Debug, Clone, Copy)]
struct Sweep {
    axis: Axis,
    from: f64,
    to: f64,
}

impl Sweep {
    fn forward(&self) -> bool {
        self.to >= self.from
    }

    fn angle_at(&self, delta: f64, rate: f64) -> f64 {
        if self.forward() {
            self.from + delta * rate
        } else {
            self.from - delta * rate
        }
    }

    fn reached(&self, angle: f64) -> bool {
        if self.forward() {
            angle >= self.to
        } else {
            angle <= self.to
        }
    }

    fn duration(&self, rate: f64) -> f64 {
        (self.to - self.from).abs() / rate
    }
}

/// What happens to the time past a phase boundary in the frame that crosses it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OvershootPolicy {
    /// The next phase starts at the frame's elapsed time. The overshoot is
    /// lost, so each cycle drifts by up to one frame per phase.
    #[default]
    Discard,
    /// The next phase starts at the exact boundary instant, keeping the cycle
    /// period exact.
    Carry,
}

/// Rotation state. Only [`Tumbler::update`] writes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub phase: Phase,
    /// Elapsed seconds at which the current phase began.
    pub phase_start_time: f64,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            phase: Phase::TiltForward,
            phase_start_time: 0.0,
        }
    }
}

/// Cube rotation in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationAngles {
    pub x: f64,
    pub y: f64,
}

impl RotationAngles {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    fn set(&mut self, axis: Axis, angle: f64) {
        match axis {
            Axis::X => self.x = angle,
            Axis::Y => self.y = angle,
        }
    }
}

/// Result of one frame's update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TumbleStep {
    pub angles: RotationAngles,
    /// Phase after the update.
    pub phase: Phase,
    /// Set when this frame crossed a boundary and entered a new phase.
    pub entered: Option<Phase>,
}

/// Four-phase rotation state machine.
///
/// # Invariants
/// - Exactly one axis advances per phase; the other keeps its last value.
/// - The active angle never passes the phase boundary; it is pinned to the
///   boundary in the frame that crosses it.
/// - Phases are visited in order 0, 1, 2, 3, 0, ... with at most one
///   transition per update.
/// - The active angle only moves in its phase's direction, even when the
///   clock runs backwards.
#[derive(Debug, Clone)]
pub struct Tumbler {
    state: AnimationState,
    angles: RotationAngles,
    rate: f64,
    policy: OvershootPolicy,
    /// Latest elapsed time seen by [`Tumbler::update`].
    last_elapsed: f64,
}

impl Default for Tumbler {
    fn default() -> Self {
        Self::new(PI)
    }
}

impl Tumbler {
    /// Start at phase 0 with both angles at zero, rotating at `rate` rad/s.
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 {
            rate
        } else {
            tracing::warn!(rate, "rotation rate must be positive, using π rad/s");
            PI
        };
        Self {
            state: AnimationState::default(),
            angles: RotationAngles::default(),
            rate,
            policy: OvershootPolicy::default(),
            last_elapsed: 0.0,
        }
    }

    pub fn with_policy(mut self, policy: OvershootPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn angles(&self) -> RotationAngles {
        self.angles
    }

    pub fn policy(&self) -> OvershootPolicy {
        self.policy
    }

    /// Seconds for one full 0 -> 1 -> 2 -> 3 -> 0 traversal, ignoring overshoot.
    pub fn cycle_duration(&self) -> f64 {
        Phase::ALL
            .iter()
            .map(|p| p.sweep().duration(self.rate))
            .sum()
    }

    /// Advance to `elapsed` seconds and return the angles for this frame.
    ///
    /// An `elapsed` earlier than any previously seen time is treated as that
    /// time, so the pose holds instead of rewinding. Under
    /// [`OvershootPolicy::Carry`] whole cycles missed during a stall are
    /// skipped before stepping.
    pub fn update(&mut self, elapsed: f64) -> TumbleStep {
        let elapsed = elapsed.max(self.last_elapsed);
        self.last_elapsed = elapsed;

        if self.policy == OvershootPolicy::Carry {
            let cycle = self.cycle_duration();
            let behind = elapsed - self.state.phase_start_time;
            if behind >= cycle {
                self.state.phase_start_time += behind.div_euclid(cycle) * cycle;
            }
        }

        let sweep = self.state.phase.sweep();
        let delta = (elapsed - self.state.phase_start_time).max(0.0);
        let mut angle = sweep.angle_at(delta, self.rate);
        let mut entered = None;

        if sweep.reached(angle) {
            angle = sweep.to;
            let next = self.state.phase.next();
            self.state.phase_start_time = match self.policy {
                OvershootPolicy::Discard => elapsed.max(self.state.phase_start_time),
                OvershootPolicy::Carry => self.state.phase_start_time + sweep.duration(self.rate),
            };
            self.state.phase = next;
            entered = Some(next);
        }

        self.angles.set(sweep.axis, angle);
        TumbleStep {
            angles: self.angles,
            phase: self.state.phase,
            entered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    /// Drive a tumbler at a fixed frame rate, returning (elapsed, phase before, step).
    fn run(tumbler: &mut Tumbler, fps: f64, seconds: f64) -> Vec<(f64, Phase, TumbleStep)> {
        let frames = (seconds * fps).round() as usize;
        (0..=frames)
            .map(|i| {
                let t = i as f64 / fps;
                let before = tumbler.state().phase;
                (t, before, tumbler.update(t))
            })
            .collect()
    }

    #[test]
    fn starts_at_rest() {
        let t = Tumbler::default();
        assert_eq!(t.state().phase, Phase::TiltForward);
        assert_eq!(t.state().phase_start_time, 0.0);
        assert_eq!(t.angles(), RotationAngles::default());
    }

    #[test]
    fn quarter_second_then_half_second() {
        let mut t = Tumbler::default();

        let step = t.update(0.25);
        assert!((step.angles.x - PI * 0.25).abs() < EPS);
        assert_eq!(step.phase, Phase::TiltForward);
        assert_eq!(step.entered, None);

        let step = t.update(0.5);
        assert_eq!(step.angles.x, FRAC_PI_2);
        assert_eq!(step.phase, Phase::TurnHalf);
        assert_eq!(step.entered, Some(Phase::TurnHalf));
        assert_eq!(t.state().phase_start_time, 0.5);
        assert_eq!(step.angles.y, 0.0);
    }

    #[test]
    fn phases_visited_in_order() {
        let mut t = Tumbler::default();
        let mut expected = Phase::TiltForward;
        let mut transitions = 0;
        for (_, before, step) in run(&mut t, 60.0, 20.0) {
            assert_eq!(before, expected);
            if let Some(entered) = step.entered {
                assert_eq!(entered, before.next());
                expected = entered;
                transitions += 1;
            }
        }
        // Cycle is 2.5s plus frame quantization, so 20s sees at least 24 transitions.
        assert!(transitions >= 24, "only {transitions} transitions");
    }

    #[test]
    fn active_angle_stays_within_phase_bounds() {
        let mut t = Tumbler::default();
        let mut prev: Option<(Phase, f64)> = None;
        for (_, before, step) in run(&mut t, 60.0, 12.0) {
            let angle = step.angles.get(before.axis());
            match before {
                Phase::TiltForward => assert!((0.0..=FRAC_PI_2).contains(&angle)),
                Phase::TurnHalf => assert!((0.0..=PI).contains(&angle)),
                Phase::TiltBack => assert!((0.0..=FRAC_PI_2).contains(&angle)),
                Phase::TurnOnward => assert!((PI..=1.5 * PI).contains(&angle)),
            }
            if let Some((p, last)) = prev {
                if p == before {
                    match before {
                        Phase::TiltBack => assert!(angle <= last),
                        _ => assert!(angle >= last),
                    }
                }
            }
            if step.entered.is_some() {
                assert_eq!(angle, before.boundary());
                prev = None;
            } else {
                prev = Some((before, angle));
            }
        }
    }

    #[test]
    fn inactive_axis_is_pinned() {
        let mut t = Tumbler::default();
        for (_, before, step) in run(&mut t, 60.0, 9.0) {
            match before {
                Phase::TurnHalf => assert_eq!(step.angles.x, FRAC_PI_2),
                Phase::TiltBack => assert_eq!(step.angles.y, PI),
                Phase::TurnOnward => assert_eq!(step.angles.x, 0.0),
                Phase::TiltForward => {}
            }
        }
    }

    #[test]
    fn cycle_returns_to_cube_symmetric_pose() {
        let mut t = Tumbler::default();
        let mut cycles = 0;
        for (_, _, step) in run(&mut t, 60.0, 10.0) {
            if step.entered == Some(Phase::TiltForward) {
                cycles += 1;
                assert_eq!(step.angles.x, 0.0);
                assert_eq!(step.angles.y, 1.5 * PI);
            }
        }
        assert!(cycles >= 3);
    }

    #[test]
    fn turn_half_restarts_y_from_zero() {
        let mut t = Tumbler::default().with_policy(OvershootPolicy::Carry);
        t.update(0.5);
        t.update(1.5);
        t.update(2.0);
        t.update(2.5);
        assert_eq!(t.state().phase, Phase::TiltForward);
        assert_eq!(t.angles().y, 1.5 * PI);
        t.update(3.0);
        assert_eq!(t.state().phase, Phase::TurnHalf);
        let step = t.update(3.1);
        assert!((step.angles.y - 0.1 * PI).abs() < 1e-6);
    }

    #[test]
    fn carry_policy_is_exactly_periodic() {
        let mut t = Tumbler::default().with_policy(OvershootPolicy::Carry);
        let samples = run(&mut t, 50.0, 9.0);
        let frames_per_cycle = (t.cycle_duration() * 50.0).round() as usize;
        assert_eq!(frames_per_cycle, 125);
        for (i, (time, _, step)) in samples.iter().enumerate() {
            if *time <= 0.5 || i + frames_per_cycle >= samples.len() {
                continue;
            }
            let later = &samples[i + frames_per_cycle].2;
            assert!((step.angles.x - later.angles.x).abs() < 1e-6, "x differs at t={time}");
            assert!((step.angles.y - later.angles.y).abs() < 1e-6, "y differs at t={time}");
        }
    }

    #[test]
    fn overshoot_is_discarded_by_default() {
        let mut t = Tumbler::default();
        let step = t.update(0.6);
        assert_eq!(step.angles.x, FRAC_PI_2);
        assert_eq!(t.state().phase_start_time, 0.6);

        let mut c = Tumbler::default().with_policy(OvershootPolicy::Carry);
        c.update(0.6);
        assert!((c.state().phase_start_time - 0.5).abs() < EPS);
        let step = c.update(0.7);
        assert!((step.angles.y - 0.2 * PI).abs() < 1e-6);
    }

    #[test]
    fn clock_going_backwards_holds_the_pose() {
        let mut t = Tumbler::default();
        t.update(0.5);
        t.update(0.75);
        let y = t.angles().y;
        assert!((y - 0.25 * PI).abs() < 1e-6);

        let step = t.update(0.6);
        assert_eq!(step.phase, Phase::TurnHalf);
        assert_eq!(step.angles.y, y);
        let step = t.update(0.1);
        assert_eq!(step.angles.y, y);
        assert_eq!(step.angles.x, FRAC_PI_2);

        // Resumes from the latest time seen, not the rewound one.
        let step = t.update(0.85);
        assert!((step.angles.y - 0.35 * PI).abs() < 1e-6);
    }

    #[test]
    fn carry_skips_whole_cycles_after_a_stall() {
        let mut t = Tumbler::default().with_policy(OvershootPolicy::Carry);
        t.update(0.2);
        let step = t.update(100.2);
        assert_eq!(step.phase, Phase::TiltForward);
        assert_eq!(step.entered, None);
        assert!((step.angles.x - 0.2 * PI).abs() < 1e-9);

        let step = t.update(100.3);
        assert_eq!(step.entered, None);
        assert!((step.angles.x - 0.3 * PI).abs() < 1e-9);
    }

    #[test]
    fn carry_stall_mid_cycle_lands_in_the_right_phase() {
        let mut t = Tumbler::default().with_policy(OvershootPolicy::Carry);
        t.update(0.5);
        t.update(1.0);
        // 1.0 s into the cycle is halfway through TurnHalf; 40 cycles later too.
        let step = t.update(101.0);
        assert_eq!(step.phase, Phase::TurnHalf);
        assert!((step.angles.y - 0.5 * PI).abs() < 1e-9);
    }

    #[test]
    fn at_most_one_transition_per_update() {
        let mut t = Tumbler::default();
        let step = t.update(100.0);
        assert_eq!(step.entered, Some(Phase::TurnHalf));
        let step = t.update(100.0);
        assert_eq!(step.phase, Phase::TurnHalf);
        assert_eq!(step.angles.y, 0.0);
    }

    #[test]
    fn bad_rate_falls_back_to_pi() {
        let mut t = Tumbler::new(-1.0);
        let step = t.update(0.25);
        assert!((step.angles.x - PI * 0.25).abs() < EPS);
    }

    #[test]
    fn cycle_takes_two_and_a_half_seconds_at_pi() {
        assert!((Tumbler::default().cycle_duration() - 2.5).abs() < EPS);
        assert!((Tumbler::new(2.0 * PI).cycle_duration() - 1.25).abs() < EPS);
    }

    #[test]
    fn phase_indices_cycle() {
        let mut p = Phase::TiltForward;
        for i in 0..8u8 {
            assert_eq!(p.index(), i % 4);
            p = p.next();
        }
        assert_eq!(Phase::ALL.len(), 4);
    }
}
