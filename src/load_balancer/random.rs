//! Uniform random load balancing strategy.

use rand::Rng;

use crate::load_balancer::LoadBalancer;

/// Picks every candidate with probability 1/n.
///
/// Draws from the thread-local generator, so concurrent requests never
/// contend on shared RNG state.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformRandom;

impl UniformRandom {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for UniformRandom {
    fn pick(&self, candidates: usize) -> Option<usize> {
        match candidates {
            0 => None,
            1 => Some(0),
            n => Some(rand::thread_rng().gen_range(0..n)),
        }
    }
}
