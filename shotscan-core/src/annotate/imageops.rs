//! Pixel-level helpers for the annotators: HSV conversion, downsampling,
//! and per-channel histograms.
//!
//! HSV follows the 8-bit OpenCV convention the signal thresholds were
//! calibrated against: H in [0, 180), S and V in [0, 256).

/// Converts one RGB pixel to HSV in the 8-bit OpenCV value ranges.
pub(crate) fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [f64; 3] {
    let r = f64::from(r);
    let g = f64::from(g);
    let b = f64::from(b);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max * 255.0 } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else {
        let deg = if max == r {
            60.0 * (g - b) / delta
        } else if max == g {
            120.0 + 60.0 * (b - r) / delta
        } else {
            240.0 + 60.0 * (r - g) / delta
        };
        let deg = if deg < 0.0 { deg + 360.0 } else { deg };
        deg / 2.0
    };

    [h, s, v]
}

/// Downsamples an RGB24 frame to `size` x `size` with nearest-neighbor
/// sampling and converts it to HSV. Returns `size * size * 3` values in
/// pixel-major order.
pub(crate) fn downsample_hsv(frame: &[u8], width: u32, height: u32, size: u32) -> Vec<f64> {
    let mut out = Vec::with_capacity((size * size * 3) as usize);
    for y in 0..size {
        let sy = (y as usize * height as usize) / size as usize;
        for x in 0..size {
            let sx = (x as usize * width as usize) / size as usize;
            let off = (sy * width as usize + sx) * 3;
            let hsv = rgb_to_hsv(frame[off], frame[off + 1], frame[off + 2]);
            out.extend_from_slice(&hsv);
        }
    }
    out
}

/// Histogram of an RGB24 frame in HSV space: `bins` uniform bins over
/// [0, 256) per channel, concatenated H then S then V (`3 * bins` counts).
pub(crate) fn hsv_histogram(frame: &[u8], bins: usize) -> Vec<f64> {
    let mut hist = vec![0.0; bins * 3];
    for px in frame.chunks_exact(3) {
        let hsv = rgb_to_hsv(px[0], px[1], px[2]);
        for (channel, &value) in hsv.iter().enumerate() {
            let bin = ((value / 256.0) * bins as f64) as usize;
            hist[channel * bins + bin.min(bins - 1)] += 1.0;
        }
    }
    hist
}
