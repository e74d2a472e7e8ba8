// Range, Doppler and angle extraction over one radar frame
//
// All scratch lives in WorkArrays, sized once from the frame geometry.
// Processing never allocates, and every reduction runs in a fixed order so
// a given frame always produces the same bits.

use super::fft::{cfft_in_place, fft_shift, magnitude};
use super::windows::{hann_into, kaiser_into, KAISER_BETA};
use super::{
    Detection, FrameConfig, RadarOptions, ADC_NORMALIZATION, ANTENNA_DISTANCE_M,
    FREQ_CENTER_HZ, SPEED_OF_LIGHT,
};

/// Feature normalization for the gesture model, one mean and scale per
/// entry of [range, doppler, azimuth, elevation, value]. Values come from
/// the model's training dataset statistics.
pub const GESTURE_FEATURE_MEAN: [f32; 5] = [
    9.268_145_5,
    4.391_583_2,
    0.273_324_63,
    -0.028_382_132,
    0.000_266_686_14,
];
pub const GESTURE_FEATURE_SCALE: [f32; 5] = [
    5.801_363,
    7.547_439_5,
    0.562_940_2,
    0.415_025_13,
    0.000_747_411_14,
];

/// Scratch buffers reused across frames. Allocated once at pipeline init.
pub struct WorkArrays {
    // Complex range image and range-Doppler image, [ch][chirp][bin]
    range_re: Vec<f32>,
    range_im: Vec<f32>,
    rdi_re: Vec<f32>,
    rdi_im: Vec<f32>,
    // Channel-averaged magnitude image, [chirp][bin]
    mag: Vec<f32>,
    range_profile: Vec<f32>,
    // Per-row FFT scratch
    row_re: Vec<f32>,
    row_im: Vec<f32>,
    chirp_re: Vec<f32>,
    chirp_im: Vec<f32>,
    // Window tables, filled once
    range_window: Vec<f32>,
    doppler_window: Vec<f32>,
}

impl WorkArrays {
    pub fn new(cfg: &FrameConfig) -> Self {
        let mut range_window = vec![0.0f32; cfg.n_samples];
        hann_into(&mut range_window);
        let mut doppler_window = vec![0.0f32; cfg.n_chirps];
        kaiser_into(&mut doppler_window, KAISER_BETA);

        Self {
            range_re: vec![0.0; cfg.range_image_len()],
            range_im: vec![0.0; cfg.range_image_len()],
            rdi_re: vec![0.0; cfg.range_image_len()],
            rdi_im: vec![0.0; cfg.range_image_len()],
            mag: vec![0.0; cfg.image_len()],
            range_profile: vec![0.0; cfg.n_range_bins],
            row_re: vec![0.0; cfg.n_samples],
            row_im: vec![0.0; cfg.n_samples],
            chirp_re: vec![0.0; cfg.n_chirps],
            chirp_im: vec![0.0; cfg.n_chirps],
            range_window,
            doppler_window,
        }
    }

    /// Total scratch footprint, for the init log line.
    pub fn bytes(&self) -> usize {
        core::mem::size_of::<f32>()
            * (self.range_re.len()
                + self.range_im.len()
                + self.rdi_re.len()
                + self.rdi_im.len()
                + self.mag.len()
                + self.range_profile.len()
                + self.row_re.len()
                + self.row_im.len()
                + self.chirp_re.len()
                + self.chirp_im.len()
                + self.range_window.len()
                + self.doppler_window.len())
    }
}

/// The per-frame detector. Owns its geometry, options and scratch.
pub struct RadarPipeline {
    cfg: FrameConfig,
    opts: RadarOptions,
    work: WorkArrays,
}

impl RadarPipeline {
    pub fn new(cfg: FrameConfig, opts: RadarOptions) -> Self {
        let work = WorkArrays::new(&cfg);
        Self { cfg, opts, work }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.cfg
    }

    pub fn scratch_bytes(&self) -> usize {
        self.work.bytes()
    }

    /// Process one de-interleaved frame into a detection.
    pub fn process(&mut self, frame: &[f32]) -> Detection {
        assert_eq!(frame.len(), self.cfg.frame_len(), "frame length mismatch");

        self.range_transform(frame);
        if self.opts.remove_mean {
            self.remove_chirp_mean();
        }
        if self.opts.super_slim {
            return self.detect_range_only();
        }

        self.doppler_transform();
        self.magnitude_image();
        self.build_range_profile();

        let (range_bin, doppler_bin) = self.peak_pick();
        let (azimuth, elevation) =
            self.cell_angles(&self.work.rdi_re, &self.work.rdi_im, doppler_bin, range_bin);
        let value =
            self.work.mag[doppler_bin * self.cfg.n_range_bins + range_bin] / ADC_NORMALIZATION;

        Detection {
            range_bin: range_bin as u16,
            doppler_bin: doppler_bin as u16,
            azimuth,
            elevation,
            value,
        }
    }

    /// Hann window plus real FFT per (channel, chirp) row, keeping the
    /// lower half of the spectrum.
    fn range_transform(&mut self, frame: &[f32]) {
        let cfg = self.cfg;
        for ch in 0..cfg.n_channels {
            for chirp in 0..cfg.n_chirps {
                let row_base = (ch * cfg.n_chirps + chirp) * cfg.n_samples;
                let row = &frame[row_base..row_base + cfg.n_samples];
                for s in 0..cfg.n_samples {
                    self.work.row_re[s] = row[s] * self.work.range_window[s];
                    self.work.row_im[s] = 0.0;
                }
                cfft_in_place(&mut self.work.row_re, &mut self.work.row_im, false);

                let out_base = (ch * cfg.n_chirps + chirp) * cfg.n_range_bins;
                self.work.range_re[out_base..out_base + cfg.n_range_bins]
                    .copy_from_slice(&self.work.row_re[..cfg.n_range_bins]);
                self.work.range_im[out_base..out_base + cfg.n_range_bins]
                    .copy_from_slice(&self.work.row_im[..cfg.n_range_bins]);
            }
        }
    }

    /// Static clutter removal: subtract the across-chirp mean per
    /// (channel, range bin).
    fn remove_chirp_mean(&mut self) {
        let cfg = self.cfg;
        let inv = 1.0 / cfg.n_chirps as f32;
        for ch in 0..cfg.n_channels {
            for bin in 0..cfg.n_range_bins {
                let mut mean_re = 0.0f32;
                let mut mean_im = 0.0f32;
                for chirp in 0..cfg.n_chirps {
                    let idx = (ch * cfg.n_chirps + chirp) * cfg.n_range_bins + bin;
                    mean_re += self.work.range_re[idx];
                    mean_im += self.work.range_im[idx];
                }
                mean_re *= inv;
                mean_im *= inv;
                for chirp in 0..cfg.n_chirps {
                    let idx = (ch * cfg.n_chirps + chirp) * cfg.n_range_bins + bin;
                    self.work.range_re[idx] -= mean_re;
                    self.work.range_im[idx] -= mean_im;
                }
            }
        }
    }

    /// Kaiser window plus complex FFT across chirps per (channel, bin),
    /// shifted so zero Doppler lands at n_chirps / 2.
    fn doppler_transform(&mut self) {
        let cfg = self.cfg;
        for ch in 0..cfg.n_channels {
            for bin in 0..cfg.n_range_bins {
                for chirp in 0..cfg.n_chirps {
                    let idx = (ch * cfg.n_chirps + chirp) * cfg.n_range_bins + bin;
                    let w = self.work.doppler_window[chirp];
                    self.work.chirp_re[chirp] = self.work.range_re[idx] * w;
                    self.work.chirp_im[chirp] = self.work.range_im[idx] * w;
                }
                cfft_in_place(&mut self.work.chirp_re, &mut self.work.chirp_im, false);
                fft_shift(&mut self.work.chirp_re, &mut self.work.chirp_im);
                for chirp in 0..cfg.n_chirps {
                    let idx = (ch * cfg.n_chirps + chirp) * cfg.n_range_bins + bin;
                    self.work.rdi_re[idx] = self.work.chirp_re[chirp];
                    self.work.rdi_im[idx] = self.work.chirp_im[chirp];
                }
            }
        }
    }

    /// Magnitude of the range-Doppler image averaged over channels.
    /// Channel is the innermost loop so the reduction order is fixed.
    fn magnitude_image(&mut self) {
        let cfg = self.cfg;
        let inv_ch = 1.0 / cfg.n_channels as f32;
        for chirp in 0..cfg.n_chirps {
            for bin in 0..cfg.n_range_bins {
                let mut acc = 0.0f32;
                for ch in 0..cfg.n_channels {
                    let idx = (ch * cfg.n_chirps + chirp) * cfg.n_range_bins + bin;
                    acc += magnitude(self.work.rdi_re[idx], self.work.rdi_im[idx]);
                }
                self.work.mag[chirp * cfg.n_range_bins + bin] = acc * inv_ch;
            }
        }
    }

    /// Sum the magnitude image over the Doppler axis, blanking the bins
    /// below the minimum range.
    fn build_range_profile(&mut self) {
        let cfg = self.cfg;
        for bin in 0..cfg.n_range_bins {
            if bin < self.opts.min_range_bin {
                self.work.range_profile[bin] = 0.0;
                continue;
            }
            let mut acc = 0.0f32;
            for chirp in 0..cfg.n_chirps {
                acc += self.work.mag[chirp * cfg.n_range_bins + bin];
            }
            self.work.range_profile[bin] = acc;
        }
    }

    /// Argmax over the range profile, then over the Doppler column at the
    /// detected range. Ties keep the first index.
    fn peak_pick(&self) -> (usize, usize) {
        let cfg = self.cfg;
        let mut best_bin = 0usize;
        let mut best = -1.0f32;
        for (bin, &v) in self.work.range_profile.iter().enumerate() {
            if v > best {
                best = v;
                best_bin = bin;
            }
        }

        let mut best_chirp = 0usize;
        let mut best_mag = -1.0f32;
        for chirp in 0..cfg.n_chirps {
            let v = self.work.mag[chirp * cfg.n_range_bins + best_bin];
            if v > best_mag {
                best_mag = v;
                best_chirp = chirp;
            }
        }
        (best_bin, best_chirp)
    }

    /// Azimuth and elevation from the per-channel complex values at one
    /// image cell. RX 0 and RX 2 form the horizontal pair, RX 1 and RX 2
    /// the vertical pair.
    fn cell_angles(
        &self,
        re: &[f32],
        im: &[f32],
        chirp: usize,
        range_bin: usize,
    ) -> (f32, f32) {
        let cfg = self.cfg;
        let phase = |ch: usize| {
            let idx = (ch * cfg.n_chirps + chirp) * cfg.n_range_bins + range_bin;
            libm::atan2f(im[idx], re[idx])
        };
        let azimuth = phase_monopulse(phase(0) - phase(2));
        let elevation = phase_monopulse(phase(1) - phase(2));
        (azimuth, elevation)
    }

    /// Doppler-free detector: range image magnitudes only. Angles come
    /// from the range image at the strongest chirp.
    fn detect_range_only(&mut self) -> Detection {
        let cfg = self.cfg;
        let inv_ch = 1.0 / cfg.n_channels as f32;
        for chirp in 0..cfg.n_chirps {
            for bin in 0..cfg.n_range_bins {
                let mut acc = 0.0f32;
                for ch in 0..cfg.n_channels {
                    let idx = (ch * cfg.n_chirps + chirp) * cfg.n_range_bins + bin;
                    acc += magnitude(self.work.range_re[idx], self.work.range_im[idx]);
                }
                self.work.mag[chirp * cfg.n_range_bins + bin] = acc * inv_ch;
            }
        }
        self.build_range_profile();

        let (range_bin, chirp) = self.peak_pick();
        let (azimuth, elevation) =
            self.cell_angles(&self.work.range_re, &self.work.range_im, chirp, range_bin);
        let value = self.work.mag[chirp * cfg.n_range_bins + range_bin] / ADC_NORMALIZATION;

        Detection {
            range_bin: range_bin as u16,
            doppler_bin: 0,
            azimuth,
            elevation,
            value,
        }
    }
}

/// Wrap a phase difference into (-pi, +pi].
pub fn wrap_phase(mut phi: f32) -> f32 {
    use core::f32::consts::PI;
    while phi > PI {
        phi -= 2.0 * PI;
    }
    while phi <= -PI {
        phi += 2.0 * PI;
    }
    phi
}

/// Angle of arrival from the wrapped phase difference of one antenna
/// pair: asin(dphi / (2 pi d / lambda)).
pub fn phase_monopulse(delta_phi: f32) -> f32 {
    let wavelength = SPEED_OF_LIGHT / FREQ_CENTER_HZ;
    let factor = (2.0 * core::f64::consts::PI * ANTENNA_DISTANCE_M / wavelength) as f32;
    let arg = (wrap_phase(delta_phi) / factor).clamp(-1.0, 1.0);
    libm::asinf(arg)
}

/// Normalized gesture feature vector in the order the model was trained
/// with: [range, doppler, azimuth, elevation, value]. Doppler is the
/// signed offset from the zero-velocity bin.
pub fn gesture_features(detection: &Detection, cfg: &FrameConfig) -> [f32; 5] {
    let doppler = detection.doppler_bin as f32 - (cfg.n_chirps / 2) as f32;
    let raw = [
        detection.range_bin as f32,
        doppler,
        detection.azimuth,
        detection.elevation,
        detection.value,
    ];
    let mut out = [0.0f32; 5];
    for i in 0..5 {
        out[i] = (raw[i] - GESTURE_FEATURE_MEAN[i]) / GESTURE_FEATURE_SCALE[i];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::{deinterleave_frame, DEFAULT_MIN_RANGE_BIN};
    use super::*;
    use std::f64::consts::PI;

    /// Synthesize a frame with one target: a tone at `range_bin` whose
    /// phase advances by `doppler_cycles` full turns across the chirp
    /// sequence, with a fixed phase offset per antenna channel.
    fn synthetic_frame(
        cfg: &FrameConfig,
        amp: f64,
        range_bin: usize,
        doppler_cycles: i32,
        channel_phases: [f64; 3],
    ) -> Vec<f32> {
        let mut frame = vec![0.0f32; cfg.frame_len()];
        for ch in 0..cfg.n_channels {
            for chirp in 0..cfg.n_chirps {
                for s in 0..cfg.n_samples {
                    let phase = 2.0 * PI * range_bin as f64 * s as f64 / cfg.n_samples as f64
                        + 2.0 * PI * doppler_cycles as f64 * chirp as f64
                            / cfg.n_chirps as f64
                        + channel_phases[ch];
                    let idx = (ch * cfg.n_chirps + chirp) * cfg.n_samples + s;
                    // Mid-scale ADC offset plus the echo
                    frame[idx] = (2048.0 + amp * phase.cos()) as f32;
                }
            }
        }
        frame
    }

    fn pipeline(remove_mean: bool) -> RadarPipeline {
        let cfg = FrameConfig::bgt60tr13c();
        let opts = RadarOptions {
            remove_mean,
            ..Default::default()
        };
        RadarPipeline::new(cfg, opts)
    }

    #[test]
    fn stationary_tone_lands_on_its_range_bin() {
        let cfg = FrameConfig::bgt60tr13c();
        let frame = synthetic_frame(&cfg, 1024.0, 9, 0, [0.0; 3]);
        // Mean removal would erase a zero-Doppler target
        let mut p = pipeline(false);
        let det = p.process(&frame);

        assert!(
            (det.range_bin as i32 - 9).abs() <= 1,
            "range_bin = {}",
            det.range_bin
        );
        // Zero Doppler sits at the center after the shift
        assert_eq!(det.doppler_bin as usize, cfg.n_chirps / 2);
    }

    #[test]
    fn peak_magnitude_reaches_the_window_gain() {
        let cfg = FrameConfig::bgt60tr13c();
        let amp = 1024.0;
        let frame = synthetic_frame(&cfg, amp, 12, 0, [0.0; 3]);
        let mut p = pipeline(false);
        let det = p.process(&frame);

        // Expected peak: amp/2 times the range window sum, times the
        // Doppler window sum (all chirps in phase at zero Doppler).
        let mut range_window = vec![0.0f32; cfg.n_samples];
        hann_into(&mut range_window);
        let mut doppler_window = vec![0.0f32; cfg.n_chirps];
        kaiser_into(&mut doppler_window, KAISER_BETA);
        let gain = (amp as f32 / 2.0)
            * range_window.iter().sum::<f32>()
            * doppler_window.iter().sum::<f32>();

        let measured = det.value * ADC_NORMALIZATION;
        assert!(
            measured >= 0.9 * gain,
            "measured {measured}, window gain {gain}"
        );
        assert!(measured <= 1.1 * gain);
    }

    #[test]
    fn moving_target_shows_up_off_center() {
        let cfg = FrameConfig::bgt60tr13c();
        let frame = synthetic_frame(&cfg, 1024.0, 7, 4, [0.0; 3]);
        // A moving target survives mean removal: its across-chirp mean is
        // zero for a whole number of cycles.
        let mut p = pipeline(true);
        let det = p.process(&frame);

        assert!((det.range_bin as i32 - 7).abs() <= 1);
        let expected_doppler = (cfg.n_chirps / 2) as i32 + 4;
        assert!(
            (det.doppler_bin as i32 - expected_doppler).abs() <= 1,
            "doppler_bin = {}",
            det.doppler_bin
        );
    }

    #[test]
    fn close_in_clutter_is_blanked() {
        let cfg = FrameConfig::bgt60tr13c();
        // Strong reflection below the minimum range bin, weak real target.
        // Bin 1 keeps the clutter's spectral skirt inside the blanked zone.
        let mut frame = synthetic_frame(&cfg, 2000.0, 1, 0, [0.0; 3]);
        let weak = synthetic_frame(&cfg, 300.0, 9, 0, [0.0; 3]);
        for (dst, src) in frame.iter_mut().zip(weak.iter()) {
            *dst += src - 2048.0;
        }
        let mut p = pipeline(false);
        let det = p.process(&frame);

        assert!(det.range_bin as usize >= DEFAULT_MIN_RANGE_BIN);
        assert!((det.range_bin as i32 - 9).abs() <= 1, "range_bin = {}", det.range_bin);
    }

    #[test]
    fn antenna_phase_offsets_become_angles() {
        let cfg = FrameConfig::bgt60tr13c();
        let az_phase = 0.8f64;
        let el_phase = 0.3f64;
        // Channel 2 is the reference antenna for both pairs
        let frame = synthetic_frame(&cfg, 1024.0, 10, 3, [az_phase, el_phase, 0.0]);
        let mut p = pipeline(true);
        let det = p.process(&frame);

        let expected_az = phase_monopulse(az_phase as f32);
        let expected_el = phase_monopulse(el_phase as f32);
        assert!(
            (det.azimuth - expected_az).abs() < 0.02,
            "azimuth {} vs {}",
            det.azimuth,
            expected_az
        );
        assert!((det.elevation - expected_el).abs() < 0.02);
    }

    #[test]
    fn angle_grows_with_phase_slope() {
        // Monotonic up to the unambiguous range
        let mut last = -10.0f32;
        for step in 0..7 {
            let dphi = step as f32 * 0.4;
            let angle = phase_monopulse(dphi);
            assert!(angle > last, "not monotonic at dphi = {dphi}");
            last = angle;
        }
    }

    #[test]
    fn wrap_phase_stays_in_half_open_interval() {
        use core::f32::consts::PI;
        for i in -20..=20 {
            let phi = i as f32 * 0.7;
            let w = wrap_phase(phi);
            assert!(w > -PI && w <= PI, "wrap({phi}) = {w}");
        }
        // The boundary maps to +pi, not -pi
        assert!((wrap_phase(-PI) - PI).abs() < 1e-6);
        assert!((wrap_phase(PI) - PI).abs() < 1e-6);
    }

    #[test]
    fn identical_frames_give_identical_bits() {
        let cfg = FrameConfig::bgt60tr13c();
        let frame = synthetic_frame(&cfg, 700.0, 6, 2, [0.4, 0.1, 0.0]);
        let mut p = pipeline(true);
        let a = p.process(&frame);
        let b = p.process(&frame);
        assert_eq!(a.range_bin, b.range_bin);
        assert_eq!(a.doppler_bin, b.doppler_bin);
        assert_eq!(a.azimuth.to_bits(), b.azimuth.to_bits());
        assert_eq!(a.elevation.to_bits(), b.elevation.to_bits());
        assert_eq!(a.value.to_bits(), b.value.to_bits());
    }

    #[test]
    fn super_slim_matches_range_and_skips_doppler() {
        let cfg = FrameConfig::bgt60tr13c();
        let frame = synthetic_frame(&cfg, 1024.0, 11, 0, [0.0; 3]);

        let opts = RadarOptions {
            remove_mean: false,
            super_slim: true,
            ..Default::default()
        };
        let mut slim = RadarPipeline::new(cfg, opts);
        let det = slim.process(&frame);

        assert_eq!(det.doppler_bin, 0);
        assert!((det.range_bin as i32 - 11).abs() <= 1);
    }

    #[test]
    fn deinterleaved_capture_feeds_the_pipeline() {
        // End to end from the raw FIFO ordering
        let cfg = FrameConfig::bgt60tr13c();
        let contiguous = synthetic_frame(&cfg, 900.0, 8, 0, [0.0; 3]);

        // Re-interleave the synthetic frame the way the FIFO would emit it
        let per_channel = cfg.n_chirps * cfg.n_samples;
        let mut raw = vec![0u16; cfg.frame_len()];
        for (i, slot) in raw.iter_mut().enumerate() {
            let antenna = i % cfg.n_channels;
            let index = i / cfg.n_channels;
            *slot = contiguous[antenna * per_channel + index] as u16;
        }

        let mut frame = vec![0.0f32; cfg.frame_len()];
        deinterleave_frame(&raw, &cfg, &mut frame);
        let mut p = pipeline(false);
        let det = p.process(&frame);
        assert!((det.range_bin as i32 - 8).abs() <= 1);
    }

    #[test]
    fn gesture_features_are_z_scores() {
        let cfg = FrameConfig::bgt60tr13c();
        let det = Detection {
            range_bin: 9,
            doppler_bin: 20,
            azimuth: 0.27,
            elevation: -0.03,
            value: 0.000_27,
        };
        let f = gesture_features(&det, &cfg);

        // doppler feature is the offset from center: 20 - 16 = 4
        assert!((f[0] - (9.0 - GESTURE_FEATURE_MEAN[0]) / GESTURE_FEATURE_SCALE[0]).abs() < 1e-6);
        assert!((f[1] - (4.0 - GESTURE_FEATURE_MEAN[1]) / GESTURE_FEATURE_SCALE[1]).abs() < 1e-6);
        // A detection near the training means normalizes close to zero
        for (i, v) in f.iter().enumerate() {
            assert!(v.abs() < 1.0, "feature {i} = {v}");
        }
    }

    #[test]
    fn scratch_is_sized_once_from_the_geometry() {
        let cfg = FrameConfig::bgt60tr13c();
        let p = RadarPipeline::new(cfg, RadarOptions::default());
        // Four complex images dominate; just pin the exact total so an
        // accidental resize shows up.
        let floats = 4 * cfg.range_image_len()
            + cfg.image_len()
            + cfg.n_range_bins
            + 2 * cfg.n_samples
            + 2 * cfg.n_chirps
            + cfg.n_samples
            + cfg.n_chirps;
        assert_eq!(p.scratch_bytes(), floats * 4);
    }
}
