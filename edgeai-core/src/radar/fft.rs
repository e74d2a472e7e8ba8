// In-place radix-2 FFT on split real/imaginary slices
//
// Single-precision throughout, software math via libm, so identical input
// produces identical bits on the host and on the target. Lengths are the
// frame geometry's powers of two (16 through 256).

use core::f32::consts::PI;

/// In-place complex FFT, decimation in time. `inverse` applies the
/// conjugate transform and the 1/n scale.
pub fn cfft_in_place(re: &mut [f32], im: &mut [f32], inverse: bool) {
    let n = re.len();
    debug_assert_eq!(re.len(), im.len());
    debug_assert!(n.is_power_of_two(), "FFT length must be a power of two");
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    // Butterfly stages
    let sign = if inverse { 1.0f32 } else { -1.0f32 };
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let angle = sign * 2.0 * PI / len as f32;
        let wn_re = libm::cosf(angle);
        let wn_im = libm::sinf(angle);

        let mut start = 0;
        while start < n {
            let mut w_re = 1.0f32;
            let mut w_im = 0.0f32;
            for k in 0..half {
                let even = start + k;
                let odd = start + k + half;
                let t_re = w_re * re[odd] - w_im * im[odd];
                let t_im = w_re * im[odd] + w_im * re[odd];
                re[odd] = re[even] - t_re;
                im[odd] = im[even] - t_im;
                re[even] += t_re;
                im[even] += t_im;
                let new_w_re = w_re * wn_re - w_im * wn_im;
                let new_w_im = w_re * wn_im + w_im * wn_re;
                w_re = new_w_re;
                w_im = new_w_im;
            }
            start += len;
        }
        len *= 2;
    }

    if inverse {
        let inv_n = 1.0 / n as f32;
        for i in 0..n {
            re[i] *= inv_n;
            im[i] *= inv_n;
        }
    }
}

/// Rotate the spectrum by half its length so the zero bin sits at n/2.
pub fn fft_shift(re: &mut [f32], im: &mut [f32]) {
    let n = re.len();
    debug_assert_eq!(n % 2, 0);
    let half = n / 2;
    for i in 0..half {
        re.swap(i, i + half);
        im.swap(i, i + half);
    }
}

#[inline]
pub fn magnitude(re: f32, im: f32) -> f32 {
    libm::sqrtf(re * re + im * im)
}
