//! Peak-to-Watts conversion.
//!
//! Turns the peak millivolt sample captured over a window into an
//! approximate Watts-RMS value for a sinusoidal waveform. The accuracy of
//! the derived metric rests on the true waveform peak having been captured
//! within the window.

/// Gain applied after the burden division. The deployed calibration treats
/// this as a fixed constant, not a physical mV-to-A conversion; recorded
/// series depend on it staying exactly 1000.
const CURRENT_GAIN: f64 = 1000.0;

/// Single-sample peak-to-RMS factor, 1/sqrt(2) for the lazy.
const PEAK_TO_RMS: f64 = 0.7071;

/// Convert a window's peak millivolt sample into Watts-RMS.
///
/// A burden of 0 ohms means the input is already a current and the division
/// is skipped entirely; the conversion never divides by zero.
pub fn watts_from_peak(peak_mv: f64, burden_ohms: f64, ac_volts: f64) -> f64 {
    let mut current = peak_mv;

    // If we have a burden, convert the sensed voltage to a current.
    if burden_ohms != 0.0 {
        current /= burden_ohms;
    }

    current *= CURRENT_GAIN;
    current *= PEAK_TO_RMS;

    current * ac_volts
}
