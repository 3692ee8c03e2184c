// src/units/mod.rs

//! Unit conventions of the remote simulation service.
//! Lengths are in micrometres, times in seconds, frequencies in hertz.

use ndarray::Array1;

/// Speed of light in vacuum, in micrometres per second.
pub const C_0: f64 = 2.99792458e14;

/// Extent used for geometry that is unbounded along an axis.
pub const INF: f64 = f64::INFINITY;

/// Converts a vacuum wavelength (µm) into a frequency (Hz).
pub fn wavelength_to_freq(wavelength: f64) -> f64 {
    C_0 / wavelength
}

/// Evenly spaced samples over `[start, stop]`, both endpoints included.
///
/// A single sample yields `[start]`; zero samples yield an empty array.
pub fn linspace(start: f64, stop: f64, count: usize) -> Array1<f64> {
    Array1::linspace(start, stop, count)
}
