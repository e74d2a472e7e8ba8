// 60 GHz FMCW radar feature extraction
//
// The capture path hands over one de-interleaved float frame per FIFO
// high-water event; the pipeline turns it into a single detection:
// range bin, Doppler bin, azimuth, elevation and normalized magnitude.

pub mod fft;
pub mod pipeline;
pub mod windows;

pub use pipeline::{gesture_features, RadarPipeline, WorkArrays};

/// ADC resolution of the radar front end.
pub const ADC_RESOLUTION_BITS: u32 = 12;

/// Full-scale ADC code, used to normalize detection magnitudes.
pub const ADC_NORMALIZATION: f32 = ((1u32 << ADC_RESOLUTION_BITS) - 1) as f32;

/// Center frequency of the chirp ramp.
pub const FREQ_CENTER_HZ: f64 = 60.0e9;

/// Receive antenna spacing in meters.
pub const ANTENNA_DISTANCE_M: f64 = 0.0025;

pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Range bins below this index are blanked in the range profile. The
/// closest bins carry TX leakage and enclosure reflections.
pub const DEFAULT_MIN_RANGE_BIN: usize = 3;

/// Geometry of one radar frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    pub n_channels: usize,
    pub n_chirps: usize,
    pub n_samples: usize,
    pub n_range_bins: usize,
}

impl FrameConfig {
    pub fn new(n_channels: usize, n_chirps: usize, n_samples: usize) -> Self {
        Self {
            n_channels,
            n_chirps,
            n_samples,
            n_range_bins: n_samples / 2,
        }
    }

    /// The production sensor: three RX antennas, 32 chirps of 64 samples.
    pub fn bgt60tr13c() -> Self {
        Self::new(3, 32, 64)
    }

    /// Samples per interleaved frame as read from the FIFO.
    pub fn frame_len(&self) -> usize {
        self.n_channels * self.n_chirps * self.n_samples
    }

    /// Complex cells per channel-resolved image.
    pub fn range_image_len(&self) -> usize {
        self.n_channels * self.n_chirps * self.n_range_bins
    }

    /// Cells in the channel-averaged magnitude image.
    pub fn image_len(&self) -> usize {
        self.n_chirps * self.n_range_bins
    }
}

/// Pipeline knobs. `remove_mean` subtracts the per-bin mean across chirps
/// before the Doppler stage (static clutter removal). `super_slim` skips
/// the Doppler stage entirely and detects on the range image alone.
#[derive(Debug, Clone, Copy)]
pub struct RadarOptions {
    pub remove_mean: bool,
    pub super_slim: bool,
    pub min_range_bin: usize,
}

impl Default for RadarOptions {
    fn default() -> Self {
        Self {
            remove_mean: true,
            super_slim: false,
            min_range_bin: DEFAULT_MIN_RANGE_BIN,
        }
    }
}

/// One detection per processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Detection {
    pub range_bin: u16,
    pub doppler_bin: u16,
    pub azimuth: f32,
    pub elevation: f32,
    pub value: f32,
}

/// Spread the interleaved FIFO readout into contiguous per-antenna data.
///
/// The FIFO emits samples round-robin across antennas; the output layout
/// is `[channel][chirp][sample]`. The normalization factor is 1.0, so the
/// float value is the raw ADC code.
pub fn deinterleave_frame(raw: &[u16], cfg: &FrameConfig, out: &mut [f32]) {
    debug_assert_eq!(raw.len(), cfg.frame_len());
    debug_assert_eq!(out.len(), cfg.frame_len());
    let per_channel = cfg.n_chirps * cfg.n_samples;
    for (i, &code) in raw.iter().enumerate() {
        let antenna = i % cfg.n_channels;
        let index = i / cfg.n_channels;
        out[antenna * per_channel + index] = code as f32;
    }
}
