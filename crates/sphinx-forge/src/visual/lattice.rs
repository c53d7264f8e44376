//! Gradient lattice for Perlin-style coherent noise.
//!
//! The lattice is 256 random gradients (1-D, 2-D and 3-D) plus a shuffled
//! permutation table, each duplicated to `B + B + 2` entries so neighbour
//! lookups never wrap. It is immutable once built.

use std::sync::{Arc, OnceLock};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

const B: usize = 0x100;
const BM: i64 = 0xff;
const N: f32 = 4096.0;
const LEN: usize = B + B + 2;

const NOISE1_SCALE: f32 = 2.3;
const NOISE_SCALE: f32 = 1.5;

/// Precomputed gradients and permutation table
pub struct NoiseLattice {
    p: Vec<usize>,
    g1: Vec<f32>,
    g2: Vec<[f32; 2]>,
    g3: Vec<[f32; 3]>,
}

impl NoiseLattice {
    /// The process-wide lattice, built on first use
    pub fn shared() -> Arc<NoiseLattice> {
        Self::global().clone()
    }

    pub(crate) fn global() -> &'static Arc<NoiseLattice> {
        static SHARED: OnceLock<Arc<NoiseLattice>> = OnceLock::new();
        SHARED.get_or_init(|| {
            let seed = rand::random();
            tracing::debug!(seed, "Building shared noise lattice");
            Arc::new(NoiseLattice::from_seed(seed))
        })
    }

    pub fn from_seed(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let mut p = vec![0usize; LEN];
        let mut g1 = vec![0f32; LEN];
        let mut g2 = vec![[0f32; 2]; LEN];
        let mut g3 = vec![[0f32; 3]; LEN];

        for i in 0..B {
            p[i] = i;
            g1[i] = gradient(&mut rng);
            let mut v2 = [gradient(&mut rng), gradient(&mut rng)];
            normalize(&mut v2);
            g2[i] = v2;
            let mut v3 = [gradient(&mut rng), gradient(&mut rng), gradient(&mut rng)];
            normalize(&mut v3);
            g3[i] = v3;
        }

        for i in (0..B).rev() {
            let j = next_index(&mut rng) % B;
            p.swap(i, j);
        }

        for i in 0..B + 2 {
            p[B + i] = p[i];
            g1[B + i] = g1[i];
            g2[B + i] = g2[i];
            g3[B + i] = g3[i];
        }

        Self { p, g1, g2, g3 }
    }

    /// 1-D coherent noise, roughly in [-1, 1]
    pub fn noise1(&self, x: f32) -> f32 {
        let (bx0, bx1, rx0, rx1) = setup(x);
        let sx = s_curve(rx0);
        let u = rx0 * self.g1[self.p[bx0]];
        let v = rx1 * self.g1[self.p[bx1]];
        NOISE1_SCALE * lerp(sx, u, v)
    }

    /// 2-D coherent noise
    pub fn noise2(&self, x: f32, y: f32) -> f32 {
        let (bx0, bx1, rx0, rx1) = setup(x);
        let (by0, by1, ry0, ry1) = setup(y);

        let i = self.p[bx0];
        let j = self.p[bx1];
        let b00 = self.p[i + by0];
        let b10 = self.p[j + by0];
        let b01 = self.p[i + by1];
        let b11 = self.p[j + by1];

        let sx = s_curve(rx0);
        let sy = s_curve(ry0);

        let dot = |g: [f32; 2], rx: f32, ry: f32| rx * g[0] + ry * g[1];
        let a = lerp(sx, dot(self.g2[b00], rx0, ry0), dot(self.g2[b10], rx1, ry0));
        let b = lerp(sx, dot(self.g2[b01], rx0, ry1), dot(self.g2[b11], rx1, ry1));
        NOISE_SCALE * lerp(sy, a, b)
    }

    /// 3-D coherent noise
    pub fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        let (bx0, bx1, rx0, rx1) = setup(x);
        let (by0, by1, ry0, ry1) = setup(y);
        let (bz0, bz1, rz0, rz1) = setup(z);

        let i = self.p[bx0];
        let j = self.p[bx1];
        let b00 = self.p[i + by0];
        let b10 = self.p[j + by0];
        let b01 = self.p[i + by1];
        let b11 = self.p[j + by1];

        let t = s_curve(rx0);
        let sy = s_curve(ry0);
        let sz = s_curve(rz0);

        let dot = |g: [f32; 3], rx: f32, ry: f32, rz: f32| rx * g[0] + ry * g[1] + rz * g[2];

        let a = lerp(
            t,
            dot(self.g3[b00 + bz0], rx0, ry0, rz0),
            dot(self.g3[b10 + bz0], rx1, ry0, rz0),
        );
        let b = lerp(
            t,
            dot(self.g3[b01 + bz0], rx0, ry1, rz0),
            dot(self.g3[b11 + bz0], rx1, ry1, rz0),
        );
        let c = lerp(sy, a, b);

        let a = lerp(
            t,
            dot(self.g3[b00 + bz1], rx0, ry0, rz1),
            dot(self.g3[b10 + bz1], rx1, ry0, rz1),
        );
        let b = lerp(
            t,
            dot(self.g3[b01 + bz1], rx0, ry1, rz1),
            dot(self.g3[b11 + bz1], rx1, ry1, rz1),
        );
        let d = lerp(sy, a, b);

        NOISE_SCALE * lerp(sz, c, d)
    }
}

impl std::fmt::Debug for NoiseLattice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseLattice").field("size", &B).finish()
    }
}

/// Lattice cell indices and offsets for one axis
fn setup(x: f32) -> (usize, usize, f32, f32) {
    let t = x + N;
    let cell = t.floor();
    let b0 = (cell as i64 & BM) as usize;
    let b1 = (b0 + 1) & BM as usize;
    let r0 = t - cell;
    (b0, b1, r0, r0 - 1.0)
}

/// Non-negative 31-bit draw
fn next_index(rng: &mut Pcg32) -> usize {
    (rng.random::<u32>() & 0x7fff_ffff) as usize
}

/// Gradient component in [-1, 1)
fn gradient(rng: &mut Pcg32) -> f32 {
    ((next_index(rng) % (B + B)) as f32 - B as f32) / B as f32
}

fn s_curve(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

fn normalize<const D: usize>(v: &mut [f32; D]) {
    let len = v.iter().map(|c| c * c).sum::<f32>().sqrt();
    if len > 0.0 {
        for c in v.iter_mut() {
            *c /= len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_is_stable() {
        let lattice = NoiseLattice::from_seed(42);
        for x in [-3.7f32, 0.0, 0.25, 12.5, 300.1] {
            assert_eq!(lattice.noise1(x), lattice.noise1(x));
            assert_eq!(lattice.noise2(x, 1.0 - x), lattice.noise2(x, 1.0 - x));
        }
    }

    #[test]
    fn test_same_seed_same_lattice() {
        let a = NoiseLattice::from_seed(9);
        let b = NoiseLattice::from_seed(9);
        for i in 0..50 {
            let x = i as f32 * 0.37;
            assert_eq!(a.noise1(x), b.noise1(x));
            assert_eq!(a.noise3(x, x * 0.5, -x), b.noise3(x, x * 0.5, -x));
        }
    }

    #[test]
    fn test_zero_at_integer_lattice_points() {
        let lattice = NoiseLattice::from_seed(5);
        for x in [0.0f32, 1.0, 7.0, -12.0] {
            assert_eq!(lattice.noise1(x), 0.0);
            assert_eq!(lattice.noise2(x, 3.0), 0.0);
        }
    }

    #[test]
    fn test_noise1_bounded() {
        let lattice = NoiseLattice::from_seed(1);
        for i in -400..400 {
            let v = lattice.noise1(i as f32 * 0.113);
            assert!(v.abs() <= NOISE1_SCALE, "{}", v);
        }
    }

    #[test]
    fn test_permutation_is_duplicated() {
        let lattice = NoiseLattice::from_seed(3);
        let mut head: Vec<usize> = lattice.p[..B].to_vec();
        head.sort_unstable();
        assert_eq!(head, (0..B).collect::<Vec<_>>());
        assert_eq!(&lattice.p[B..B + B], &lattice.p[..B]);
        assert_eq!(lattice.g1[B + 1], lattice.g1[1]);
    }

    #[test]
    fn test_shared_is_single_instance() {
        assert!(Arc::ptr_eq(&NoiseLattice::shared(), &NoiseLattice::shared()));
    }
}
