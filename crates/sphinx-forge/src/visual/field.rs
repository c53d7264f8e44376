//! Periodic displacement fields for inverse-mapped distortion.

use std::sync::Arc;

use sphinx_common::constants::ripple;
use sphinx_common::{SphinxError, SphinxResult, WaveType};

use super::lattice::NoiseLattice;

/// Where each destination pixel samples the source.
///
/// Horizontal displacement is driven by the row and vertical displacement
/// by the column: `nx = y / x_wavelength`, `ny = x / y_wavelength`.
#[derive(Debug, Clone)]
pub struct DisplacementField {
    wave: WaveType,
    x_amplitude: f32,
    y_amplitude: f32,
    x_wavelength: f32,
    y_wavelength: f32,
    lattice: Option<Arc<NoiseLattice>>,
}

impl DisplacementField {
    pub fn new(
        wave: WaveType,
        x_amplitude: f32,
        y_amplitude: f32,
        x_wavelength: f32,
        y_wavelength: f32,
    ) -> SphinxResult<Self> {
        for (name, amplitude) in [("x_amplitude", x_amplitude), ("y_amplitude", y_amplitude)] {
            if !(0.0..=ripple::MAX_AMPLITUDE).contains(&amplitude) {
                return Err(SphinxError::InvalidArgument(format!(
                    "{} must be within 0..={}, got {}",
                    name,
                    ripple::MAX_AMPLITUDE,
                    amplitude
                )));
            }
        }
        for (name, wavelength) in [("x_wavelength", x_wavelength), ("y_wavelength", y_wavelength)] {
            if !wavelength.is_finite() || wavelength == 0.0 {
                return Err(SphinxError::InvalidArgument(format!(
                    "{} must be finite and non-zero, got {}",
                    name, wavelength
                )));
            }
        }

        Ok(Self {
            wave,
            x_amplitude,
            y_amplitude,
            x_wavelength,
            y_wavelength,
            lattice: None,
        })
    }

    /// Sine ripple with amplitudes 2.6/1.7 and wavelengths 15/5
    pub fn ripple() -> Self {
        Self {
            wave: WaveType::Sine,
            x_amplitude: ripple::X_AMPLITUDE,
            y_amplitude: ripple::Y_AMPLITUDE,
            x_wavelength: ripple::X_WAVELENGTH,
            y_wavelength: ripple::Y_WAVELENGTH,
            lattice: None,
        }
    }

    /// Use this lattice for `WaveType::Noise` instead of the shared one
    pub fn with_lattice(mut self, lattice: Arc<NoiseLattice>) -> Self {
        self.lattice = Some(lattice);
        self
    }

    pub fn wave(&self) -> WaveType {
        self.wave
    }

    pub fn amplitudes(&self) -> (f32, f32) {
        (self.x_amplitude, self.y_amplitude)
    }

    pub fn wavelengths(&self) -> (f32, f32) {
        (self.x_wavelength, self.y_wavelength)
    }

    /// Source coordinate for destination `(x, y)`
    pub fn source_of(&self, x: i32, y: i32) -> (f32, f32) {
        let nx = y as f32 / self.x_wavelength;
        let ny = x as f32 / self.y_wavelength;
        let (fx, fy) = match self.wave {
            WaveType::Sine => (nx.sin(), ny.sin()),
            WaveType::Sawtooth => (sawtooth(nx), sawtooth(ny)),
            WaveType::Triangle => (triangle(nx), triangle(ny)),
            WaveType::Noise => {
                let lattice = self.lattice.as_ref().unwrap_or_else(|| NoiseLattice::global());
                (lattice.noise1(nx), lattice.noise1(ny))
            }
        };
        (
            x as f32 + self.x_amplitude * fx,
            y as f32 + self.y_amplitude * fy,
        )
    }
}

impl Default for DisplacementField {
    fn default() -> Self {
        Self::ripple()
    }
}

/// Fractional part wrapped into [0, 1)
pub fn sawtooth(n: f32) -> f32 {
    let r = n - n.trunc();
    if r < 0.0 { r + 1.0 } else { r }
}

/// Period-1 tent: rises 0 -> 1 over the first half and falls back
pub fn triangle(n: f32) -> f32 {
    let r = sawtooth(n);
    2.0 * if r < 0.5 { r } else { 1.0 - r }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sawtooth_is_non_negative_fraction() {
        assert_eq!(sawtooth(2.25), 0.25);
        assert_eq!(sawtooth(-0.25), 0.75);
        assert_eq!(sawtooth(3.0), 0.0);
    }

    #[test]
    fn test_triangle_shape() {
        assert_eq!(triangle(0.0), 0.0);
        assert_eq!(triangle(0.25), 0.5);
        assert_eq!(triangle(0.5), 1.0);
        assert_eq!(triangle(0.75), 0.5);
        assert_eq!(triangle(-0.25), 0.5);
        for i in 0..100 {
            let v = triangle(i as f32 * 0.173);
            assert!((0.0..2.0).contains(&v));
        }
    }

    #[test]
    fn test_axis_swap() {
        let field = DisplacementField::new(WaveType::Sawtooth, 1.0, 1.0, 4.0, 8.0).unwrap();
        // Row 1 drives x: 1/4; column 2 drives y: 2/8
        assert_eq!(field.source_of(2, 1), (2.25, 1.25));
    }

    #[test]
    fn test_zero_amplitude_is_identity() {
        for wave in [WaveType::Sine, WaveType::Sawtooth, WaveType::Triangle, WaveType::Noise] {
            let field = DisplacementField::new(wave, 0.0, 0.0, 15.0, 5.0)
                .unwrap()
                .with_lattice(Arc::new(NoiseLattice::from_seed(1)));
            assert_eq!(field.source_of(7, 3), (7.0, 3.0));
        }
    }

    #[test]
    fn test_noise_field_uses_injected_lattice() {
        let lattice = Arc::new(NoiseLattice::from_seed(77));
        let field = DisplacementField::new(WaveType::Noise, 2.0, 2.0, 3.0, 3.0)
            .unwrap()
            .with_lattice(lattice.clone());
        let (sx, sy) = field.source_of(5, 4);
        assert_eq!(sx, 5.0 + 2.0 * lattice.noise1(4.0 / 3.0));
        assert_eq!(sy, 4.0 + 2.0 * lattice.noise1(5.0 / 3.0));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(DisplacementField::new(WaveType::Sine, -1.0, 0.0, 1.0, 1.0).is_err());
        assert!(DisplacementField::new(WaveType::Sine, 1.0, f32::NAN, 1.0, 1.0).is_err());
        assert!(DisplacementField::new(WaveType::Sine, 1.0, 1.0, 0.0, 1.0).is_err());
        assert!(DisplacementField::new(WaveType::Sawtooth, 3.0e9, 0.0, 1.3, 5.0).is_err());
        assert!(DisplacementField::new(WaveType::Sine, 0.0, f32::INFINITY, 1.0, 1.0).is_err());
        let widest = DisplacementField::new(WaveType::Sine, ripple::MAX_AMPLITUDE, 0.0, 1.0, 1.0);
        assert!(widest.is_ok());
    }
}
