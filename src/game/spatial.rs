//! Positions, distances and travel times.
//!
//! Planets never move, so every pairwise distance is computed once per map
//! and shared by the game state and every player view.

// Travel times are small positive integers; the casts are range-checked.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use serde::{Deserialize, Serialize};

use crate::game::{Planet, PlanetId};

/// Distance a fleet covers in one turn.
pub const FLEET_SPEED: f64 = 1.0;

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Number of turns a fleet needs to cover `distance`.
///
/// The distance is divided by [`FLEET_SPEED`] and rounded to the nearest
/// whole turn (halves round up). A fleet always spends at least one turn in
/// flight, even between planets that share a position.
#[must_use]
pub fn travel_turns(distance: f64) -> u32 {
    let turns = (distance / FLEET_SPEED).round();
    if turns.is_nan() || turns < 1.0 {
        1
    } else if turns >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        turns as u32
    }
}

/// Precomputed distances and travel times for every pair of planets.
///
/// Stored as a flat upper triangle, indexed by unordered pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Distances {
    /// Number of planets covered.
    count: usize,
    /// Distance per unordered pair (diagonal excluded).
    distance: Vec<f64>,
    /// Travel turns per unordered pair (diagonal excluded).
    turns: Vec<u32>,
}

impl Distances {
    /// Build the table for a planet list whose ids are `0..planets.len()`.
    #[must_use]
    pub fn new(planets: &[Planet]) -> Self {
        let count = planets.len();
        let pairs = count * count.saturating_sub(1) / 2;
        let mut distance = Vec::with_capacity(pairs);
        let mut turns = Vec::with_capacity(pairs);

        for (i, a) in planets.iter().enumerate() {
            for b in &planets[i + 1..] {
                let d = a.position.distance(b.position);
                distance.push(d);
                turns.push(travel_turns(d));
            }
        }

        Self {
            count,
            distance,
            turns,
        }
    }

    /// Number of planets in the table.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether the table covers no planets.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn index(&self, a: PlanetId, b: PlanetId) -> Option<usize> {
        if a >= self.count || b >= self.count || a == b {
            return None;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        // Row `lo` starts after all pairs of the rows before it.
        let row_start = lo * (2 * self.count - lo - 1) / 2;
        Some(row_start + (hi - lo - 1))
    }

    /// Distance between two planets, `None` if either id is unknown.
    #[must_use]
    pub fn distance(&self, a: PlanetId, b: PlanetId) -> Option<f64> {
        if a == b && a < self.count {
            return Some(0.0);
        }
        self.index(a, b).map(|i| self.distance[i])
    }

    /// Travel time between two planets, `None` if either id is unknown.
    #[must_use]
    pub fn travel_turns(&self, a: PlanetId, b: PlanetId) -> Option<u32> {
        if a == b && a < self.count {
            return Some(travel_turns(0.0));
        }
        self.index(a, b).map(|i| self.turns[i])
    }
}
