//! Gate pool and spawner
//!
//! A fixed set of gate slots addressed by index. Slots cycle
//! `Inactive -> Active -> (Dissolving ->) Inactive`:
//! - only [`GatePool::spawn_at`] activates a slot
//! - only the crossing test marks a gate judged or starts a dissolve
//! - only the advance step frees a slot (dissolve finished, or past despawn)
//!
//! Depth grows toward the craft: gates spawn at a negative depth, the craft
//! plane is depth 0, and gates are recycled once they are well behind it.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::scoring::{PassOutcome, classify_pass};
use crate::consts::POOL_SIZE;
use crate::rgb_from_hex;
use crate::tuning::GateTuning;

/// Lifecycle of one slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GatePhase {
    /// Free for reuse
    Inactive,
    /// Travelling toward (or past) the craft. `verdict` is set exactly once,
    /// when the gate crosses the collision band.
    Active { verdict: Option<PassOutcome> },
    /// Clean pass animation; the gate stops moving
    Dissolving { timer: f32 },
}

/// One reusable gate slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub phase: GatePhase,
    /// Position along the travel axis
    pub depth: f32,
    /// Lateral (x) and vertical (y) spawn offset
    pub offset: Vec2,
    pub opacity: f32,
    pub scale: f32,
    pub color: Vec3,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            phase: GatePhase::Inactive,
            depth: 0.0,
            offset: Vec2::ZERO,
            opacity: 0.0,
            scale: 1.0,
            color: Vec3::ZERO,
        }
    }
}

impl Gate {
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, GatePhase::Inactive)
    }

    /// Whether the crossing test has already run for this activation
    pub fn is_passed(&self) -> bool {
        matches!(
            self.phase,
            GatePhase::Active { verdict: Some(_) } | GatePhase::Dissolving { .. }
        )
    }

    pub fn is_dissolving(&self) -> bool {
        matches!(self.phase, GatePhase::Dissolving { .. })
    }

    /// Render-facing snapshot. Frame sizes come from the pool tuning.
    pub fn view(&self, tuning: &GateTuning) -> GateView {
        GateView {
            position: Vec3::new(self.offset.x, self.offset.y, self.depth),
            scale: Vec3::new(self.scale, self.scale, 1.0),
            inner_size: tuning.inner_size,
            outer_size: tuning.outer_size,
            opacity: self.opacity,
            color: self.color,
            visible: self.is_active(),
        }
    }

    fn deactivate(&mut self) {
        self.phase = GatePhase::Inactive;
    }
}

/// What the renderer needs to draw one slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateView {
    pub position: Vec3,
    pub scale: Vec3,
    /// Square aperture and frame edge before `scale` is applied
    pub inner_size: f32,
    pub outer_size: f32,
    pub opacity: f32,
    pub color: Vec3,
    pub visible: bool,
}

/// Discrete things that happened during one pool update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateEvent {
    Spawned { slot: usize },
    /// Spawn requested with every slot in use; retried next interval
    PoolExhausted,
    Passed {
        slot: usize,
        outcome: PassOutcome,
        dx: f32,
        dy: f32,
    },
    Dissolved { slot: usize },
    /// Slot freed after travelling past the despawn depth. `tested` is false
    /// when the gate jumped over the collision band in a single frame.
    Recycled { slot: usize, tested: bool },
}

/// Running totals for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateStats {
    pub spawned: u32,
    pub clean: u32,
    pub missed: u32,
    pub untested: u32,
    pub exhausted: u32,
}

/// Fixed-capacity gate pool with spawn scheduling and crossing tests
#[derive(Debug, Clone)]
pub struct GatePool {
    tuning: GateTuning,
    slots: [Gate; POOL_SIZE],
    rng: Pcg32,
    /// Spawner is running (throttle above the activation threshold)
    armed: bool,
    spawn_timer: f32,
    flash_timer: f32,
    spawn_color: Vec3,
    events: Vec<GateEvent>,
    stats: GateStats,
}

impl GatePool {
    pub fn new(tuning: GateTuning, seed: u64) -> Self {
        let spawn_color = rgb_from_hex(tuning.gate_color);
        Self {
            tuning,
            slots: [Gate::default(); POOL_SIZE],
            rng: Pcg32::seed_from_u64(seed),
            armed: false,
            spawn_timer: 0.0,
            flash_timer: 0.0,
            spawn_color,
            events: Vec::with_capacity(POOL_SIZE * 2),
            stats: GateStats::default(),
        }
    }

    pub fn tuning(&self) -> &GateTuning {
        &self.tuning
    }

    pub fn slots(&self) -> &[Gate] {
        &self.slots
    }

    pub fn views(&self) -> impl Iterator<Item = GateView> + '_ {
        self.slots.iter().map(|gate| gate.view(&self.tuning))
    }

    /// Events from the most recent [`GatePool::update`]
    pub fn events(&self) -> &[GateEvent] {
        &self.events
    }

    pub fn stats(&self) -> GateStats {
        self.stats
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|g| g.is_active()).count()
    }

    /// Screen flash after a miss: 1.0 right after the miss, linear to 0
    pub fn flash_intensity(&self) -> f32 {
        (self.flash_timer / self.tuning.flash_duration).clamp(0.0, 1.0)
    }

    /// Activate the first free slot at a random offset
    pub fn spawn(&mut self) -> Option<usize> {
        let x = self.tuning.range_x.abs();
        let y = self.tuning.range_y.abs();
        let offset = Vec2::new(
            self.rng.random_range(-x..=x),
            self.rng.random_range(-y..=y),
        );
        self.spawn_at(offset)
    }

    /// Activate the first free slot at the given offset. Returns `None` (and
    /// does nothing else) when the pool is full.
    pub fn spawn_at(&mut self, offset: Vec2) -> Option<usize> {
        let Some(slot) = self.slots.iter().position(|g| !g.is_active()) else {
            log::debug!("Gate pool exhausted, skipping spawn");
            self.stats.exhausted += 1;
            self.events.push(GateEvent::PoolExhausted);
            return None;
        };

        let gate = &mut self.slots[slot];
        gate.phase = GatePhase::Active { verdict: None };
        gate.depth = self.tuning.spawn_depth;
        gate.offset = offset;
        gate.opacity = self.tuning.base_opacity;
        gate.scale = 1.0;
        gate.color = self.spawn_color;

        self.stats.spawned += 1;
        self.events.push(GateEvent::Spawned { slot });
        log::debug!(
            "Gate {} spawned at ({:.2}, {:.2})",
            slot,
            offset.x,
            offset.y
        );
        Some(slot)
    }

    /// Advance spawning, travel, crossing tests and animations by one frame.
    ///
    /// `craft` must be this frame's craft offset (after the flight update).
    pub fn update(&mut self, dt: f32, throttle: f32, craft: Vec2) {
        self.events.clear();

        if self.flash_timer > 0.0 {
            self.flash_timer = (self.flash_timer - dt).max(0.0);
        }

        if throttle < self.tuning.activation_throttle {
            if self.armed {
                log::debug!("Spawner dormant (throttle {:.3})", throttle);
            }
            self.armed = false;
            return;
        }

        if !self.armed {
            self.armed = true;
            // Prime so the first gate shows up quickly
            self.spawn_timer = self.tuning.base_interval * self.tuning.first_spawn_fraction;
            log::info!("Spawner active (throttle {:.3})", throttle);
        }

        self.spawn_timer += dt;
        if self.spawn_timer >= self.tuning.spawn_interval(throttle) {
            self.spawn();
            self.spawn_timer = 0.0;
        }

        let travel = self.tuning.base_speed * throttle * dt;
        for slot in 0..POOL_SIZE {
            match self.slots[slot].phase {
                GatePhase::Inactive => {}
                GatePhase::Dissolving { timer } => self.advance_dissolve(slot, timer + dt),
                GatePhase::Active { .. } => self.advance_active(slot, travel, craft),
            }
        }
    }

    fn advance_dissolve(&mut self, slot: usize, timer: f32) {
        let tuning = &self.tuning;
        let gate = &mut self.slots[slot];
        let t = (timer / tuning.dissolve_duration).min(1.0);

        gate.phase = GatePhase::Dissolving { timer };
        gate.scale = 1.0 + t * tuning.dissolve_growth;
        gate.opacity = (tuning.base_opacity * (1.0 - t * t)).clamp(0.0, 1.0);
        // Alert red washes toward a pale success hue
        gate.color = Vec3::new(1.0, 0.6 + t * 0.4, 0.3 + t * 0.7);

        if t >= 1.0 {
            gate.deactivate();
            self.events.push(GateEvent::Dissolved { slot });
        }
    }

    fn advance_active(&mut self, slot: usize, travel: f32, craft: Vec2) {
        let tuning = &self.tuning;
        let gate = &mut self.slots[slot];
        gate.depth += travel;

        let in_band = gate.depth > tuning.band_near && gate.depth < tuning.band_far;
        if in_band && matches!(gate.phase, GatePhase::Active { verdict: None }) {
            let outcome = classify_pass(gate.offset, craft, tuning.inner_half());
            let dx = (gate.offset.x - craft.x).abs();
            let dy = (gate.offset.y - craft.y).abs();

            match outcome {
                PassOutcome::Clean => {
                    gate.phase = GatePhase::Dissolving { timer: 0.0 };
                    self.stats.clean += 1;
                    log::debug!("Gate {} clean pass (dx {:.2}, dy {:.2})", slot, dx, dy);
                }
                PassOutcome::Missed => {
                    gate.phase = GatePhase::Active {
                        verdict: Some(PassOutcome::Missed),
                    };
                    self.flash_timer = tuning.flash_duration;
                    self.stats.missed += 1;
                    log::debug!("Gate {} missed (dx {:.2}, dy {:.2})", slot, dx, dy);
                }
            }
            self.events.push(GateEvent::Passed {
                slot,
                outcome,
                dx,
                dy,
            });
        }

        // Trailing fade and recycling only apply while the gate is travelling
        let GatePhase::Active { verdict } = gate.phase else {
            return;
        };

        if gate.depth > tuning.fade_start {
            gate.opacity =
                (tuning.base_opacity - (gate.depth - tuning.fade_start) / tuning.fade_distance)
                    .clamp(0.0, 1.0);
        }

        if gate.depth > tuning.despawn_depth {
            let tested = verdict.is_some();
            if !tested {
                self.stats.untested += 1;
                log::debug!(
                    "Gate {} recycled without a crossing test (jumped the band)",
                    slot
                );
            }
            gate.deactivate();
            self.events.push(GateEvent::Recycled { slot, tested });
        }
    }
}
