//! Relativistic kinematics over `nalgebra` vectors.
//!
//! Units: GeV, GeV/c, GeV/c², c = 1.

use nalgebra::{Unit, Vector3};

/// Invariant mass of a set of momenta under a mass hypothesis per prong.
pub fn invariant_mass(momenta: &[Vector3<f64>], masses: &[f64]) -> f64 {
    let (energy, momentum) = momenta.iter().zip(masses).fold(
        (0.0, Vector3::zeros()),
        |(e, p): (f64, Vector3<f64>), (pi, mi)| (e + (pi.norm_squared() + mi * mi).sqrt(), p + pi),
    );
    (energy * energy - momentum.norm_squared()).max(0.0).sqrt()
}

/// Rapidity of a particle with momentum `p` and mass `m`.
pub fn rapidity(p: &Vector3<f64>, m: f64) -> f64 {
    let energy = (p.norm_squared() + m * m).sqrt();
    0.5 * ((energy + p.z) / (energy - p.z)).ln()
}

/// Momentum of either daughter in the rest frame of a two-body decay `M -> m1 m2`.
///
/// `None` when the decay is kinematically closed.
pub fn breakup_momentum(mother: f64, m1: f64, m2: f64) -> Option<f64> {
    if mother < m1 + m2 {
        return None;
    }
    let sum = mother * mother - (m1 + m2) * (m1 + m2);
    let diff = mother * mother - (m1 - m2) * (m1 - m2);
    Some((sum * diff).sqrt() / (2.0 * mother))
}

/// Energy-momentum four-vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LorentzVector {
    pub momentum: Vector3<f64>,
    pub energy: f64,
}

impl LorentzVector {
    pub fn new(momentum: Vector3<f64>, energy: f64) -> Self {
        Self { momentum, energy }
    }

    /// On-shell vector for a particle of mass `mass`.
    pub fn from_mass(momentum: Vector3<f64>, mass: f64) -> Self {
        Self {
            momentum,
            energy: (momentum.norm_squared() + mass * mass).sqrt(),
        }
    }

    /// Particle at rest.
    pub fn at_rest(mass: f64) -> Self {
        Self::from_mass(Vector3::zeros(), mass)
    }

    pub fn mass(&self) -> f64 {
        (self.energy * self.energy - self.momentum.norm_squared())
            .max(0.0)
            .sqrt()
    }

    /// Velocity vector β = p / E.
    pub fn beta(&self) -> Vector3<f64> {
        if self.energy > 0.0 {
            self.momentum / self.energy
        } else {
            Vector3::zeros()
        }
    }

    /// Active boost by velocity `beta`.
    pub fn boosted(&self, beta: &Vector3<f64>) -> Self {
        let b2 = beta.norm_squared();
        if b2 <= 0.0 || b2 >= 1.0 {
            return *self;
        }
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let bp = beta.dot(&self.momentum);
        let gamma2 = (gamma - 1.0) / b2;
        Self {
            momentum: self.momentum + beta * (gamma2 * bp + gamma * self.energy),
            energy: gamma * (self.energy + bp),
        }
    }
}

impl std::ops::Add for LorentzVector {
    type Output = LorentzVector;

    fn add(self, rhs: LorentzVector) -> LorentzVector {
        LorentzVector::new(self.momentum + rhs.momentum, self.energy + rhs.energy)
    }
}

/// Decays `parent` into two daughters of masses `m1`, `m2`.
///
/// `direction` is the first daughter's flight direction in the parent rest frame;
/// both daughters are returned in the lab frame.
pub fn two_body_decay(
    parent: &LorentzVector,
    m1: f64,
    m2: f64,
    direction: &Unit<Vector3<f64>>,
) -> Option<(LorentzVector, LorentzVector)> {
    let q = breakup_momentum(parent.mass(), m1, m2)?;
    let p1 = direction.into_inner() * q;
    let beta = parent.beta();
    let d1 = LorentzVector::from_mass(p1, m1).boosted(&beta);
    let d2 = LorentzVector::from_mass(-p1, m2).boosted(&beta);
    Some((d1, d2))
}
