//! Offline analysis of 16-bit sample data: spectra, pitch detection,
//! resampling and normalization.
//!
//! These run when a sample is loaded, never on the audio thread, so they are
//! free to allocate.

use rustfft::{num_complex::Complex, FftPlanner};

/// Number of samples taken from the centre of the data for a spectrum.
pub const DEFAULT_FFT_LENGTH: usize = 1024;

/// True if `value` is a power of two. Zero is not.
pub fn is_pow2(value: usize) -> bool {
    value.is_power_of_two()
}

/// Magnitude spectrum of `data`.
///
/// The centre `length` samples are used, truncated to the largest power of
/// two. The DC bin and the top of the spectrum are dropped, so entry `i`
/// holds FFT bin `i + 1`. With `log` set the magnitudes are natural logs.
///
/// Returns `None` for fewer than two samples.
pub fn spectrum(data: &[i16], log: bool, length: usize) -> Option<Vec<f32>> {
    let data = if data.len() > length {
        let offset = (data.len() - length) / 2;
        &data[offset..offset + length]
    } else {
        data
    };

    if data.len() < 2 {
        return None;
    }

    // Largest power of two that fits
    let size = 1usize << (usize::BITS - 1 - data.len().leading_zeros());

    let mut buffer: Vec<Complex<f32>> = data[..size]
        .iter()
        .map(|&s| Complex::new(s as f32, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(size);
    fft.process(&mut buffer);

    let end = (size / 2).saturating_sub(1);
    let bins = buffer
        .get(1..end.max(1))
        .unwrap_or(&[])
        .iter()
        .map(|c| {
            let magnitude = c.norm();
            if log {
                magnitude.max(f32::MIN_POSITIVE).ln()
            } else {
                magnitude
            }
        })
        .collect();

    Some(bins)
}

/// Frequency in Hz of the strongest spectral peak, excluding DC.
///
/// Resolution is `sample_rate / N` where `N` is the analysed power-of-two
/// length, so short or noisy data gives a coarse answer.
pub fn peak_frequency(data: &[i16], sample_rate: u32) -> Option<f32> {
    let bins = spectrum(data, false, DEFAULT_FFT_LENGTH)?;

    let (index, _) = bins
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))?;

    // bins hold FFT indices 1..N/2-1, so N = 2 * (len + 2)
    let size = 2 * (bins.len() + 2);
    Some((index + 1) as f32 * sample_rate as f32 / size as f32)
}

/// Linearly interpolate `data` from `in_rate` to `out_rate`.
pub fn resample(data: &[i16], in_rate: u32, out_rate: u32) -> Vec<i16> {
    if in_rate == out_rate || data.is_empty() || out_rate == 0 {
        return data.to_vec();
    }

    let step = in_rate as f64 / out_rate as f64;
    let out_len = (data.len() as f64 / step).ceil() as usize;
    let last = data.len() - 1;

    (0..out_len)
        .map(|i| {
            let position = i as f64 * step;
            let index = (position as usize).min(last);
            let next = (index + 1).min(last);
            let frac = position - index as f64;
            let a = data[index] as f64;
            let b = data[next] as f64;
            (a + (b - a) * frac).round() as i16
        })
        .collect()
}

/// Scale `data` so its loudest sample reaches full scale.
///
/// Silent data is returned unchanged.
pub fn normalize(data: &[i16]) -> Vec<i16> {
    let peak = data.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
    if peak == 0 || peak >= i16::MAX as u16 {
        return data.to_vec();
    }

    let gain = i16::MAX as f32 / peak as f32;
    data.iter()
        .map(|&s| (s as f32 * gain).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn tone(freq: f32, sample_rate: u32, len: usize) -> Vec<i16> {
        (0..len)
            .map(|i| ((TAU * freq * i as f32 / sample_rate as f32).sin() * 16_000.0) as i16)
            .collect()
    }

    #[test]
    fn pow2() {
        assert!(is_pow2(1));
        assert!(is_pow2(1024));
        assert!(!is_pow2(0));
        assert!(!is_pow2(1000));
    }

    #[test]
    fn spectrum_drops_dc_and_top_half() {
        let bins = spectrum(&tone(1_000.0, 48_000, 1500), false, 1024).unwrap_or_default();
        assert_eq!(bins.len(), 1024 / 2 - 2);
    }

    #[test]
    fn spectrum_needs_two_samples() {
        assert!(spectrum(&[1], true, 1024).is_none());
        assert!(spectrum(&[], false, 1024).is_none());
    }

    #[test]
    fn peak_frequency_finds_tone() {
        let sample_rate = 44_100;
        let found = peak_frequency(&tone(441.0, sample_rate, 4096), sample_rate);
        let resolution = sample_rate as f32 / 1024.0;
        let found = found.unwrap_or(0.0);
        assert!((found - 441.0).abs() <= resolution, "found {found}");
    }

    #[test]
    fn resample_halves_length() {
        let data: Vec<i16> = (0..100).map(|i| i * 10).collect();
        let out = resample(&data, 48_000, 24_000);
        assert_eq!(out.len(), 50);
        assert_eq!(out[1], 20);
    }

    #[test]
    fn resample_same_rate_is_copy() {
        let data = vec![1, 2, 3];
        assert_eq!(resample(&data, 44_100, 44_100), data);
    }

    #[test]
    fn normalize_reaches_full_scale() {
        let out = normalize(&[100, -200, 50]);
        assert_eq!(out[1], -32767);
        assert!((out[0] - 16384).abs() <= 1);
    }

    #[test]
    fn normalize_leaves_silence() {
        assert_eq!(normalize(&[0, 0, 0]), vec![0, 0, 0]);
    }
}
