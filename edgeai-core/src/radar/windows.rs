// Window functions for the range and Doppler transforms
//
// Coefficients are generated once into the pipeline's work arrays at init
// and reused for every frame. Generation runs in double precision so the
// stored single-precision tables are exact for a given length.

/// Shape parameter of the Doppler window.
pub const KAISER_BETA: f64 = 25.0;

/// Periodic Hann window, applied per chirp before the range FFT.
pub fn hann_into(out: &mut [f32]) {
    let n = out.len();
    for (i, w) in out.iter_mut().enumerate() {
        let x = 2.0 * core::f64::consts::PI * i as f64 / n as f64;
        *w = (0.5 * (1.0 - libm::cos(x))) as f32;
    }
}

/// Kaiser window, applied per chirp vector before the Doppler FFT.
pub fn kaiser_into(out: &mut [f32], beta: f64) {
    let n = out.len();
    if n == 1 {
        out[0] = 1.0;
        return;
    }
    let denom = bessel_i0(beta);
    for (i, w) in out.iter_mut().enumerate() {
        let x = 2.0 * i as f64 / (n - 1) as f64 - 1.0;
        let arg = beta * libm::sqrt((1.0 - x * x).max(0.0));
        *w = (bessel_i0(arg) / denom) as f32;
    }
}

/// Modified Bessel function of the first kind, order zero. Power series,
/// converges in well under 64 terms for the beta range used here.
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = 1.0f64;
    let mut sum = 1.0f64;
    for k in 1..64u32 {
        let factor = half / k as f64;
        term *= factor * factor;
        sum += term;
        if term < sum * 1e-16 {
            break;
        }
    }
    sum
}
