//! Particle flavor codes and the classification predicates built on them

/// Reserved flavor code magnitude of the bottom quark
pub const BOTTOM_CODE: i32 = 5;

/// Reserved flavor code of the gluon
pub const GLUON_CODE: i32 = 21;

/// Largest flavor code magnitude that denotes a quark
const MAX_QUARK_CODE: i32 = 6;

/// Signed particle flavor code, following the numbering scheme of the event
/// generator: quarks carry small positive magnitudes ordered by mass
/// (negative for antiquarks), and the gluon has its own reserved code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Flavor(pub i32);
//
impl Flavor {
    /// Unsigned flavor code magnitude
    pub fn kf_code(self) -> i32 {
        self.0.abs()
    }

    /// Truth that this is a bottom quark or antiquark
    pub fn is_bottom(self) -> bool {
        self.kf_code() == BOTTOM_CODE
    }

    /// Truth that this is a quark of any flavor
    pub fn is_quark(self) -> bool {
        (1..=MAX_QUARK_CODE).contains(&self.kf_code())
    }

    /// Truth that this is a quark lighter than the bottom
    pub fn is_light_quark(self) -> bool {
        self.is_quark() && self.kf_code() < BOTTOM_CODE
    }

    /// Truth that this is a gluon
    pub fn is_gluon(self) -> bool {
        self.0 == GLUON_CODE
    }

    /// Truth that this particle takes part in the QCD shower
    ///
    /// Particles outside the shower (leptons, electroweak bosons...) only
    /// appear and disappear across decay steps, which is what lets the
    /// engine tell decays apart from shower emissions.
    pub fn is_qcd(self) -> bool {
        self.is_quark() || self.is_gluon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quark_codes_are_classified_by_magnitude() {
        assert!(Flavor(5).is_bottom());
        assert!(Flavor(-5).is_bottom());
        assert!(!Flavor(5).is_light_quark());
        assert!(Flavor(1).is_light_quark());
        assert!(Flavor(-4).is_light_quark());
        assert!(Flavor(6).is_quark());
        assert!(!Flavor(6).is_light_quark());
    }

    #[test]
    fn non_quarks_are_told_apart() {
        assert!(Flavor(GLUON_CODE).is_gluon());
        assert!(!Flavor(GLUON_CODE).is_quark());
        assert!(Flavor(GLUON_CODE).is_qcd());
        // Leptons and electroweak bosons sit outside the QCD shower
        assert!(!Flavor(11).is_qcd());
        assert!(!Flavor(-24).is_qcd());
    }
}
