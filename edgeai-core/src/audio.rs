// PDM audio capture constants and per-sample conditioning

/// Samples per audio frame handed to the classifier loop.
pub const FRAME_SIZE: usize = 1024;

/// PDM decimated output rate.
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Depth of the receive FIFO in hardware.
pub const FIFO_DEPTH: usize = 64;

/// Samples drained per data-ready event (half the FIFO).
pub const RX_FIFO_TRIG_LEVEL: usize = FIFO_DEPTH / 2;

/// Data-ready events needed to complete one frame.
pub const EVENTS_PER_FRAME: usize = FRAME_SIZE / RX_FIFO_TRIG_LEVEL;

/// Convert one signed 16-bit sample to the classifier's float range,
/// apply the model's software boost and saturate to [-1.0, +1.0].
#[inline]
pub fn normalize_sample(raw: i16, boost: f32) -> f32 {
    let scaled = (raw as f32 / 32768.0) * boost;
    scaled.clamp(-1.0, 1.0)
}

/// Condition a whole captured frame into the output slice.
pub fn condition_frame(raw: &[i16], boost: f32, out: &mut [f32]) {
    debug_assert_eq!(raw.len(), out.len());
    for (dst, &src) in out.iter_mut().zip(raw.iter()) {
        *dst = normalize_sample(src, boost);
    }
}
