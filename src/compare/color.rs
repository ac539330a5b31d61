//! Perceptual color distance
//!
//! Pixels are blended against a white background using their alpha, then
//! converted to YIQ. The squared distance weights luma above the two chroma
//! axes (0.5053 / 0.299 / 0.1957). The result is normalized so that black
//! versus white is exactly `1.0` and clamped into `[0, 1]`, then square-rooted
//! so a tolerance of `t` corresponds to the familiar `delta > max * t²` rule.

/// Normalized distance between two RGBA pixels in `[0, 1]`
///
/// Symmetric, zero for identical inputs, `1.0` for opaque black vs white.
///
/// # Examples
///
/// ```
/// use pixel_parity::compare::color::distance;
///
/// assert_eq!(distance([10, 20, 30, 255], [10, 20, 30, 255]), 0.0);
/// assert_eq!(distance([0, 0, 0, 255], [255, 255, 255, 255]), 1.0);
/// ```
pub fn distance(a: [u8; 4], b: [u8; 4]) -> f64 {
    if a == b {
        return 0.0;
    }
    let delta = yiq_delta(blend(a), blend(b));
    (delta / BLACK_WHITE_DELTA).clamp(0.0, 1.0).sqrt()
}

/// Squared YIQ delta between opaque black and opaque white
const BLACK_WHITE_DELTA: f64 = 0.5053 * 255.0 * 255.0;

/// Composite a pixel over white, returning RGB in `0.0..=255.0`
fn blend(px: [u8; 4]) -> [f64; 3] {
    let alpha = f64::from(px[3]) / 255.0;
    let over_white = |c: u8| 255.0 + (f64::from(c) - 255.0) * alpha;
    [over_white(px[0]), over_white(px[1]), over_white(px[2])]
}

fn to_y(rgb: [f64; 3]) -> f64 {
    rgb[0] * 0.298_895_31 + rgb[1] * 0.586_622_47 + rgb[2] * 0.114_482_23
}

fn to_i(rgb: [f64; 3]) -> f64 {
    rgb[0] * 0.595_977_99 - rgb[1] * 0.274_176_10 - rgb[2] * 0.321_801_89
}

fn to_q(rgb: [f64; 3]) -> f64 {
    rgb[0] * 0.211_470_17 - rgb[1] * 0.522_617_11 + rgb[2] * 0.311_146_94
}

fn yiq_delta(a: [f64; 3], b: [f64; 3]) -> f64 {
    let y = to_y(a) - to_y(b);
    let i = to_i(a) - to_i(b);
    let q = to_q(a) - to_q(b);
    0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q
}

/// True when `candidate` is darker than `reference` once both are over white
///
/// # Examples
///
/// ```
/// use pixel_parity::compare::color::is_darker;
///
/// assert!(is_darker([255, 255, 255, 255], [0, 0, 0, 255]));
/// assert!(!is_darker([0, 0, 0, 255], [255, 255, 255, 255]));
/// ```
pub fn is_darker(reference: [u8; 4], candidate: [u8; 4]) -> bool {
    to_y(blend(candidate)) < to_y(blend(reference))
}

/// Grayscale value of a pixel over white, faded toward white
///
/// Used for the "faded" diff style so unchanged regions stay recognizable
/// without competing with the highlight color.
pub fn faded_gray(px: [u8; 4], fade: f64) -> u8 {
    let y = to_y(blend(px));
    (255.0 + (y - 255.0) * fade).round().clamp(0.0, 255.0) as u8
}
