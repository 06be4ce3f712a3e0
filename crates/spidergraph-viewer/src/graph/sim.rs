use bevy::prelude::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub charge: f32,
    pub link_distance: f32,
    pub link_strength: f32,
    pub center_strength: f32,
    /// Added to both radii when resolving overlaps.
    pub collide_padding: f32,
    pub velocity_decay: f32,
    /// Fraction of `alpha` lost per frame.
    pub alpha_decay: f32,
    /// Below this the simulation stops stepping.
    pub alpha_min: f32,
    pub min_dt: f32,
    pub max_dt: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            charge: 420.0,
            link_distance: 120.0,
            link_strength: 0.18,
            center_strength: 0.0006,
            collide_padding: 10.0,
            velocity_decay: 0.92,
            alpha_decay: 0.02,
            alpha_min: 0.02,
            min_dt: 0.001,
            max_dt: 0.03,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimBody {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub fixed: bool,
}

/// Energy-driven force simulation for flat graphs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousSim {
    pub alpha: f32,
    alpha_min: f32,
}

impl Default for ContinuousSim {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            alpha_min: SimParams::default().alpha_min,
        }
    }
}

impl ContinuousSim {
    pub fn reheat(&mut self) {
        self.alpha = 1.0;
    }

    pub fn is_frozen(&self) -> bool {
        self.alpha < self.alpha_min
    }

    /// Advances one frame. `dt` is in seconds and clamped to the configured
    /// range. Returns false once the simulation has cooled down.
    pub fn step(
        &mut self,
        bodies: &mut [SimBody],
        links: &[(usize, usize)],
        center: Vec2,
        params: &SimParams,
        dt: f32,
    ) -> bool {
        self.alpha_min = params.alpha_min;
        if self.is_frozen() || bodies.is_empty() {
            return false;
        }
        let dt = dt.clamp(params.min_dt, params.max_dt.max(params.min_dt));
        // Forces are tuned per 60Hz frame.
        let frames = dt * 60.0;
        let alpha = self.alpha;
        let n = bodies.len();

        for body in bodies.iter_mut() {
            body.vel *= params.velocity_decay;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let delta = bodies[i].pos - bodies[j].pos;
                let d2 = delta.length_squared().max(25.0);
                let push = delta / d2.sqrt() * (params.charge * alpha / d2.sqrt()) * frames;
                bodies[i].vel += push;
                bodies[j].vel -= push;
            }
        }

        for &(a, b) in links {
            if a == b || a >= n || b >= n {
                continue;
            }
            let delta = bodies[b].pos - bodies[a].pos;
            let d = delta.length().max(0.001);
            let pull = delta / d
                * ((d - params.link_distance) * params.link_strength * alpha)
                * frames;
            bodies[a].vel += pull * 0.5;
            bodies[b].vel -= pull * 0.5;
        }

        for body in bodies.iter_mut() {
            body.vel += (center - body.pos) * params.center_strength * frames;
        }

        for body in bodies.iter_mut().filter(|b| !b.fixed) {
            body.pos += body.vel * frames;
        }

        // Overlap resolution works on positions directly.
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = bodies[j].pos - bodies[i].pos;
                let min = bodies[i].radius + bodies[j].radius + params.collide_padding;
                let d = delta.length();
                if d >= min || d <= f32::EPSILON {
                    continue;
                }
                let fix = delta / d * ((min - d) * 0.5);
                match (bodies[i].fixed, bodies[j].fixed) {
                    (false, false) => {
                        bodies[i].pos -= fix;
                        bodies[j].pos += fix;
                    }
                    (true, false) => bodies[j].pos += fix * 2.0,
                    (false, true) => bodies[i].pos -= fix * 2.0,
                    (true, true) => {}
                }
            }
        }

        self.alpha *= 1.0 - params.alpha_decay;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f32, y: f32) -> SimBody {
        SimBody {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            radius: 8.0,
            fixed: false,
        }
    }

    #[test]
    fn cools_down_and_reheats() {
        let params = SimParams::default();
        let mut sim = ContinuousSim::default();
        let mut bodies = vec![body(0.0, 0.0), body(30.0, 0.0)];
        let mut frames = 0;
        while sim.step(&mut bodies, &[(0, 1)], Vec2::ZERO, &params, 1.0 / 60.0) {
            frames += 1;
            assert!(frames < 1000, "simulation never froze");
        }
        assert!(sim.is_frozen());
        // 0.98^n < 0.02 first holds at n = 194.
        assert_eq!(frames, 194);

        sim.reheat();
        assert!(!sim.is_frozen());
        assert!(bodies.iter().all(|b| b.pos.is_finite()));
    }

    #[test]
    fn collision_separates_overlapping_nodes() {
        let params = SimParams::default();
        let mut sim = ContinuousSim::default();
        let mut bodies = vec![body(0.0, 0.0), body(1.0, 0.0)];
        sim.step(&mut bodies, &[], Vec2::ZERO, &params, 1.0 / 60.0);
        let gap = (bodies[1].pos - bodies[0].pos).length();
        assert!(gap >= 8.0 + 8.0 + params.collide_padding - 1e-3);
    }

    #[test]
    fn fixed_bodies_stay_put() {
        let params = SimParams::default();
        let mut sim = ContinuousSim::default();
        let mut anchor = body(5.0, 5.0);
        anchor.fixed = true;
        let mut bodies = vec![anchor, body(6.0, 5.0)];
        for _ in 0..20 {
            sim.step(&mut bodies, &[(0, 1)], Vec2::ZERO, &params, 0.5);
        }
        assert_eq!(bodies[0].pos, Vec2::new(5.0, 5.0));
    }
}
