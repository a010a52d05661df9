//! Fixed-size pool of pulsing billboard particles.
//!
//! Particles are created once and recycled in place: when a particle's phase
//! runs past `LIFE_LIMIT` it restarts at `-LIFE_LIMIT` on a fresh spot around
//! the current world point.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{ParticleConfig, LIFE_LIMIT};

/// Billboard description shared by every particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    /// Quad edge length in world units at scale 1.
    pub size: f32,
    /// Z offset that keeps the sprites above the planes.
    pub depth: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in the world XY plane.
    pub position: Vec2,
    /// Phase in `[-LIFE_LIMIT, LIFE_LIMIT]`.
    pub life: f32,
    /// Number of respawns since creation.
    pub generation: u32,
}

impl Particle {
    /// Uniform visual scale; negative values mirror the quad, zero hides it.
    #[inline]
    pub fn scale(&self) -> f32 {
        (0.5 * self.life).sin()
    }
}

pub struct ParticlePool {
    particles: Box<[Particle]>,
    sprite: Sprite,
    config: ParticleConfig,
    rng: StdRng,
}

impl ParticlePool {
    /// Creates `config.count` particles seeded from the OS RNG.
    pub fn initialize(config: ParticleConfig, sprite: Sprite) -> Self {
        Self::with_rng(config, sprite, StdRng::from_os_rng())
    }

    /// Deterministic pool for reproducible runs.
    pub fn with_seed(config: ParticleConfig, sprite: Sprite, seed: u64) -> Self {
        Self::with_rng(config, sprite, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ParticleConfig, sprite: Sprite, mut rng: StdRng) -> Self {
        let particles = (0..config.count)
            .map(|_| Particle {
                position: sample_annulus(&mut rng, Vec2::ZERO, config.spawn_radius),
                life: rng.random_range(-LIFE_LIMIT..LIFE_LIMIT),
                generation: 0,
            })
            .collect();

        log::debug!("particle pool initialized with {} particles", config.count);

        Self {
            particles,
            sprite,
            config,
            rng,
        }
    }

    /// Advances every particle by one fixed phase step.
    ///
    /// Particles whose phase passes `LIFE_LIMIT` restart at `-LIFE_LIMIT` on
    /// the spawn annulus centred at `world_point`.
    pub fn advance(&mut self, world_point: Vec3) {
        let centre = world_point.truncate();
        let mut respawned = 0usize;

        for p in self.particles.iter_mut() {
            p.life += self.config.phase_step;

            if p.life > LIFE_LIMIT {
                p.life = -LIFE_LIMIT;
                p.generation = p.generation.wrapping_add(1);
                p.position = sample_annulus(&mut self.rng, centre, self.config.spawn_radius);
                respawned += 1;
            }
        }

        if respawned > 0 {
            log::trace!("respawned {respawned} particles around ({:.3}, {:.3})", centre.x, centre.y);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn sprite(&self) -> Sprite {
        self.sprite
    }

}

/// Uniform radius in `[min, max)` and uniform angle in `[0, 2π)`, so points
/// cluster toward the inner edge (not area-uniform).
fn sample_annulus(rng: &mut impl Rng, centre: Vec2, (min, max): (f32, f32)) -> Vec2 {
    let theta = rng.random_range(0.0..TAU);
    let radius = if max > min { rng.random_range(min..max) } else { min };
    centre + Vec2::new(radius * theta.sin(), radius * theta.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPRITE: Sprite = Sprite {
        size: 0.2,
        depth: 0.1,
    };

    fn pool(seed: u64) -> ParticlePool {
        ParticlePool::with_seed(ParticleConfig::default(), SPRITE, seed)
    }

    fn in_annulus(p: Vec2, centre: Vec2) -> bool {
        let d = p.distance(centre);
        d >= 0.04 - 1e-5 && d <= 0.14 + 1e-5
    }

    // ── initialize ────────────────────────────────────────────────────────

    #[test]
    fn initialize_creates_requested_count() {
        assert_eq!(pool(1).particles().len(), 50);
    }

    #[test]
    fn initial_state_is_in_range() {
        let pool = pool(2);
        for p in pool.particles() {
            assert!((-LIFE_LIMIT..=LIFE_LIMIT).contains(&p.life));
            assert!(in_annulus(p.position, Vec2::ZERO));
            assert_eq!(p.generation, 0);
        }
    }

    #[test]
    fn same_seed_same_pool() {
        assert_eq!(pool(7).particles(), pool(7).particles());
    }

    // ── advance ───────────────────────────────────────────────────────────

    #[test]
    fn life_stays_in_range_over_many_steps() {
        let mut pool = pool(3);
        for i in 0..1000 {
            pool.advance(Vec3::new((i as f32 * 0.01).sin() * 0.3, 0.1, 0.0));
            for p in pool.particles() {
                assert!((-LIFE_LIMIT..=LIFE_LIMIT).contains(&p.life), "life {} out of range", p.life);
            }
        }
    }

    #[test]
    fn scale_is_sine_of_half_life() {
        let mut pool = pool(4);
        for _ in 0..100 {
            pool.advance(Vec3::ZERO);
            for p in pool.particles() {
                assert_eq!(p.scale(), (0.5 * p.life).sin());
            }
        }
    }

    #[test]
    fn wrapped_particles_land_around_world_point() {
        let mut pool = pool(5);
        let point = Vec3::new(0.3, -0.2, 0.0);

        for _ in 0..200 {
            let before: Vec<u32> = pool.particles().iter().map(|p| p.generation).collect();
            pool.advance(point);
            for (p, gen_before) in pool.particles().iter().zip(before) {
                if p.generation != gen_before {
                    assert_eq!(p.life, -LIFE_LIMIT);
                    assert!(in_annulus(p.position, point.truncate()));
                }
            }
        }
    }

    #[test]
    fn particles_that_do_not_wrap_keep_position() {
        let mut pool = pool(6);
        let before: Vec<Particle> = pool.particles().to_vec();
        pool.advance(Vec3::new(5.0, 5.0, 0.0));
        for (p, b) in pool.particles().iter().zip(before) {
            if p.generation == b.generation {
                assert_eq!(p.position, b.position);
            }
        }
    }

    #[test]
    fn sixty_three_steps_wrap_exactly_the_expected_particles() {
        let mut pool = pool(8);
        let initial: Vec<f32> = pool.particles().iter().map(|p| p.life).collect();

        for _ in 0..63 {
            pool.advance(Vec3::ZERO);
        }

        // Accumulated f32 steps differ from 6.3 by far less than this margin.
        const MARGIN: f32 = 1e-3;
        for (p, life0) in pool.particles().iter().zip(initial) {
            let target = life0 + 6.3;
            if target > LIFE_LIMIT + MARGIN {
                assert_eq!(p.generation, 1, "life0 {life0} should have wrapped once");
            } else if target < LIFE_LIMIT - MARGIN {
                assert_eq!(p.generation, 0, "life0 {life0} should not have wrapped");
            }
        }
    }

    #[test]
    fn degenerate_annulus_uses_min_radius() {
        let mut rng = StdRng::seed_from_u64(9);
        let p = sample_annulus(&mut rng, Vec2::ZERO, (0.1, 0.1));
        assert!((p.length() - 0.1).abs() < 1e-6);
    }
}
