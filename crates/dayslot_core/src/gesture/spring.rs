//! Damped spring used by settle, re-snap and reorder animations.
//!
//! Semi-implicit Euler integration of
//! `F = -stiffness * (position - target) - damping * velocity`.
//!
//! # Invariants
//! - A spring at rest stays at rest until `set_target` or `jump_to` wakes it.
//! - Large `dt` values are subdivided into steps of at most 4ms.
//! - Stiffness is clamped to a positive minimum; damping to >= 0.

use std::time::Duration;

const MAX_STEP_SECS: f64 = 0.004;
const REST_THRESHOLD: f64 = 0.05;
const VELOCITY_THRESHOLD: f64 = 0.5;
const MIN_STIFFNESS: f64 = 0.1;

/// One-dimensional damped harmonic oscillator in screen points.
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    stiffness: f64,
    damping: f64,
    at_rest: bool,
}

impl Spring {
    /// Spring resting at `position`.
    #[must_use]
    pub fn at(position: f64, stiffness: f64, damping: f64) -> Self {
        Self {
            position,
            velocity: 0.0,
            target: position,
            stiffness: stiffness.max(MIN_STIFFNESS),
            damping: damping.max(0.0),
            at_rest: true,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Retargets the spring, keeping current position and velocity.
    ///
    /// Replacing the target cancels the previous animation toward the old one.
    pub fn set_target(&mut self, target: f64) {
        if (self.target - target).abs() <= f64::EPSILON && self.at_rest {
            return;
        }
        self.target = target;
        self.at_rest = (self.position - target).abs() < REST_THRESHOLD
            && self.velocity.abs() < VELOCITY_THRESHOLD;
        if self.at_rest {
            self.position = target;
            self.velocity = 0.0;
        }
    }

    /// Teleports to `position` with zero velocity and no pending target.
    pub fn jump_to(&mut self, position: f64) {
        self.position = position;
        self.target = position;
        self.velocity = 0.0;
        self.at_rest = true;
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advances the simulation by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }
        if (self.position - self.target).abs() < REST_THRESHOLD
            && self.velocity.abs() < VELOCITY_THRESHOLD
        {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

/// Two springs animating an (x, y) offset together.
#[derive(Debug, Clone)]
pub struct Spring2 {
    pub x: Spring,
    pub y: Spring,
}

impl Spring2 {
    pub fn at(x: f64, y: f64, stiffness: f64, damping: f64) -> Self {
        Self {
            x: Spring::at(x, stiffness, damping),
            y: Spring::at(y, stiffness, damping),
        }
    }

    pub fn set_target(&mut self, x: f64, y: f64) {
        self.x.set_target(x);
        self.y.set_target(y);
    }

    pub fn advance(&mut self, dt: Duration) {
        self.x.advance(dt);
        self.y.advance(dt);
    }

    pub fn is_at_rest(&self) -> bool {
        self.x.is_at_rest() && self.y.is_at_rest()
    }
}
