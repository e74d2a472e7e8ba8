// Accelerometer sample scaling and axis mapping

/// Raw LSB per g at the configured +/-8g range, after the sensor's
/// internal shift. Raw counts divide by this to give g units.
pub const ACCEL_DIVISOR: f32 = 4096.0;

/// Milliseconds between model samples (50 Hz effective input rate).
pub const SAMPLE_PERIOD_MS: u32 = 20;

/// Map one raw accelerometer reading to the model input order.
///
/// The model was trained with the board mounted so that its first input
/// is the sensor's Y axis, the second is X and the third is inverted Z.
#[inline]
pub fn model_input(raw_x: i16, raw_y: i16, raw_z: i16) -> [f32; 3] {
    [
        raw_y as f32 / ACCEL_DIVISOR,
        raw_x as f32 / ACCEL_DIVISOR,
        -(raw_z as f32) / ACCEL_DIVISOR,
    ]
}
