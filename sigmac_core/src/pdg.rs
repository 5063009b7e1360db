//! PDG species codes, masses and decay-channel bits.

/// Species codes used by the builder, the matcher and the generator.
pub mod code {
    pub const PROTON: i32 = 2212;
    pub const KAON_PLUS: i32 = 321;
    pub const PION_PLUS: i32 = 211;
    pub const PION_MINUS: i32 = -211;

    pub const LAMBDA_C_PLUS: i32 = 4122;
    pub const SIGMA_C_0: i32 = 4112;
    pub const SIGMA_C_PLUS_PLUS: i32 = 4222;

    // Λc resonant channels
    pub const K_STAR_0: i32 = 313;
    pub const DELTA_PLUS_PLUS: i32 = 2224;
    pub const LAMBDA_1520: i32 = 3124;

    // Beauty parents (feed-down)
    pub const B_ZERO: i32 = 511;
    pub const B_PLUS: i32 = 521;
    pub const LAMBDA_B_0: i32 = 5122;
}

/// Nominal mass in GeV/c² for the species this crate knows about.
pub fn mass(pdg: i32) -> Option<f64> {
    let m = match pdg.abs() {
        code::PROTON => 0.938_272,
        code::KAON_PLUS => 0.493_677,
        code::PION_PLUS => 0.139_570,
        code::LAMBDA_C_PLUS => 2.286_46,
        code::SIGMA_C_0 => 2.453_75,
        code::SIGMA_C_PLUS_PLUS => 2.453_97,
        code::K_STAR_0 => 0.895_55,
        code::DELTA_PLUS_PLUS => 1.232,
        code::LAMBDA_1520 => 1.519_5,
        code::B_ZERO => 5.279_65,
        code::B_PLUS => 5.279_34,
        code::LAMBDA_B_0 => 5.619_60,
        _ => return None,
    };
    Some(m)
}

/// Electric charge in units of e, sign-flipped for antiparticles.
pub fn charge(pdg: i32) -> Option<i8> {
    let q = match pdg.abs() {
        code::PROTON | code::KAON_PLUS | code::PION_PLUS | code::LAMBDA_C_PLUS | code::B_PLUS => 1,
        code::SIGMA_C_PLUS_PLUS | code::DELTA_PLUS_PLUS => 2,
        code::SIGMA_C_0 | code::K_STAR_0 | code::LAMBDA_1520 | code::B_ZERO | code::LAMBDA_B_0 => 0,
        _ => return None,
    };
    Some(if pdg < 0 { -q } else { q })
}

/// Beauty meson (5xx) or beauty baryon (5xxx).
#[inline]
pub fn is_beauty_hadron(pdg: i32) -> bool {
    let a = pdg.abs();
    a / 100 == 5 || a / 1000 == 5
}

pub const MASS_LAMBDA_C: f64 = 2.286_46;
pub const MASS_PROTON: f64 = 0.938_272;
pub const MASS_KAON: f64 = 0.493_677;
pub const MASS_PION: f64 = 0.139_570;

/// Three-prong decay channels, bit positions in the vertexer's `hf_flag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ThreeProngDecay {
    DplusToPiKPi = 0,
    LcToPKPi = 1,
    DsToKKPi = 2,
    XicToPKPi = 3,
}

impl ThreeProngDecay {
    #[inline]
    pub fn bit(self) -> u8 {
        1 << self as u8
    }

    /// True when `hf_flag` carries this hypothesis.
    #[inline]
    pub fn is_set_in(self, hf_flag: u8) -> bool {
        hf_flag & self.bit() != 0
    }
}

/// Σc decay channels, bit positions in the match flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SigmacDecay {
    Sc0ToPKPiPi = 0,
    ScPlusPlusToPKPiPi = 1,
}

impl SigmacDecay {
    #[inline]
    pub fn bit(self) -> i8 {
        1 << self as u8
    }

    /// Channel for a candidate of the given net charge, if physical.
    pub fn for_charge(charge: i8) -> Option<Self> {
        match i16::from(charge).abs() {
            0 => Some(Self::Sc0ToPKPiPi),
            2 => Some(Self::ScPlusPlusToPKPiPi),
            _ => None,
        }
    }

    /// Channel encoded in a signed match flag.
    pub fn from_flag(flag: i8) -> Option<Self> {
        match i16::from(flag).abs() {
            1 => Some(Self::Sc0ToPKPiPi),
            2 => Some(Self::ScPlusPlusToPKPiPi),
            _ => None,
        }
    }

    /// PDG code of the Σc state.
    pub fn mother_pdg(self) -> i32 {
        match self {
            Self::Sc0ToPKPiPi => code::SIGMA_C_0,
            Self::ScPlusPlusToPKPiPi => code::SIGMA_C_PLUS_PLUS,
        }
    }

    /// Charged pion accompanying the Λc+ in the particle (not antiparticle) decay.
    pub fn soft_pion_pdg(self) -> i32 {
        match self {
            Self::Sc0ToPKPiPi => code::PION_MINUS,
            Self::ScPlusPlusToPKPiPi => code::PION_PLUS,
        }
    }

    /// Final state p K- π+ π∓ of the particle decay.
    pub fn final_state(self) -> [i32; 4] {
        [code::PROTON, -code::KAON_PLUS, code::PION_PLUS, self.soft_pion_pdg()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sc0ToPKPiPi => "Sc0",
            Self::ScPlusPlusToPKPiPi => "Sc++",
        }
    }
}
