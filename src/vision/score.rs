//! Correlation scoring of a template against every offset of an image

use super::config::ScoreMethod;
use image::GrayImage;
use imageproc::template_matching::{MatchTemplateMethod, find_extremes, match_template};
use log::debug;

/// Best-scoring top-left offset of a template in an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub x: u32,
    pub y: u32,
    /// Similarity in [0, 1]
    pub score: f32,
}

/// Find the peak of the score surface, if it reaches `min_score`.
///
/// Returns `None` when no meaningful score exists: the template is larger
/// than the image or has no intensity variation. Offsets that provably
/// cannot reach `min_score` are abandoned early, so a peak that is returned
/// is always exact. Pass `f32::NEG_INFINITY` for the unconditional peak.
pub fn best_match_above(
    image: &GrayImage,
    template: &GrayImage,
    method: ScoreMethod,
    min_score: f32,
) -> Option<Peak> {
    let (iw, ih) = image.dimensions();
    let (tw, th) = template.dimensions();
    if tw == 0 || th == 0 || tw > iw || th > ih {
        debug!("⚠️ Template {tw}x{th} cannot be matched in image {iw}x{ih}");
        return None;
    }
    match method {
        ScoreMethod::ZeroMeanNormalized => zncc_peak(image, template, min_score as f64),
        ScoreMethod::CrossCorrelationNormalized => {
            ncc_peak(image, template).filter(|p| p.score >= min_score)
        }
    }
}

fn clamp_score(raw: f64) -> f32 {
    if raw.is_finite() {
        raw.clamp(0.0, 1.0) as f32
    } else {
        0.0
    }
}

fn ncc_peak(image: &GrayImage, template: &GrayImage) -> Option<Peak> {
    let surface = match_template(
        image,
        template,
        MatchTemplateMethod::CrossCorrelationNormalized,
    );
    let extremes = find_extremes(&surface);
    let (x, y) = extremes.max_value_location;
    Some(Peak {
        x,
        y,
        score: clamp_score(extremes.max_value as f64),
    })
}

/// Summed-area tables of pixel values and squared pixel values.
struct Integral {
    stride: usize,
    sums: Vec<u64>,
    squares: Vec<u64>,
}

impl Integral {
    fn new(image: &GrayImage) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 1;
        let mut sums = vec![0u64; stride * (h + 1)];
        let mut squares = vec![0u64; stride * (h + 1)];
        let raw = image.as_raw();
        for y in 0..h {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for x in 0..w {
                let v = raw[y * w + x] as u64;
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sums[idx] = sums[idx - stride] + row_sum;
                squares[idx] = squares[idx - stride] + row_sq;
            }
        }
        Self {
            stride,
            sums,
            squares,
        }
    }

    /// (sum, sum of squares) over the `w x h` window at `(x, y)`
    fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (u64, u64) {
        let at = |table: &[u64], xx: usize, yy: usize| table[yy * self.stride + xx];
        let rect = |table: &[u64]| {
            at(table, x + w, y + h) + at(table, x, y) - at(table, x + w, y) - at(table, x, y + h)
        };
        (rect(&self.sums), rect(&self.squares))
    }
}

/// Zero-mean normalized cross-correlation.
///
/// The template is centered once so the numerator is a plain dot product;
/// window statistics come from summed-area tables. After each template row
/// the score is bounded from above (Cauchy-Schwarz on the rows left) and the
/// offset is dropped once the bound falls below both `min_score` and the
/// best score so far.
fn zncc_peak(image: &GrayImage, template: &GrayImage, min_score: f64) -> Option<Peak> {
    let (iw, ih) = (image.width() as usize, image.height() as usize);
    let (tw, th) = (template.width() as usize, template.height() as usize);
    let n = (tw * th) as f64;

    let mean_t = template.as_raw().iter().map(|&v| v as f64).sum::<f64>() / n;
    let t_prime: Vec<f64> = template
        .as_raw()
        .iter()
        .map(|&v| v as f64 - mean_t)
        .collect();
    let var_t: f64 = t_prime.iter().map(|v| v * v).sum();
    if var_t <= 1e-8 {
        debug!("⚠️ Flat template has no correlation signal");
        return None;
    }

    // t_sum_head[k]: sum of t' over rows < k; t_sq_tail[k]: sum of t'^2 over rows >= k
    let mut t_sum_head = vec![0.0f64; th + 1];
    let mut t_sq_tail = vec![0.0f64; th + 1];
    for ty in 0..th {
        let row = &t_prime[ty * tw..(ty + 1) * tw];
        t_sum_head[ty + 1] = t_sum_head[ty] + row.iter().sum::<f64>();
    }
    for ty in (0..th).rev() {
        let row = &t_prime[ty * tw..(ty + 1) * tw];
        t_sq_tail[ty] = t_sq_tail[ty + 1] + row.iter().map(|v| v * v).sum::<f64>();
    }

    let integral = Integral::new(image);
    let raw = image.as_raw();
    let n_int = (tw * th) as u128;

    let mut best: Option<(f64, usize, usize)> = None;
    for y in 0..=(ih - th) {
        'offset: for x in 0..=(iw - tw) {
            let floor = best.map_or(min_score, |(s, _, _)| s.max(min_score));
            let (sum_i, sum_i2) = integral.window(x, y, tw, th);
            // n * var_i, exact in integers
            let spread = n_int * sum_i2 as u128 - (sum_i as u128) * (sum_i as u128);
            let score = if spread == 0 {
                0.0
            } else {
                let var_i = spread as f64 / n;
                let mean_i = sum_i as f64 / n;
                let denom = (var_t * var_i).sqrt();
                let mut dot = 0.0f64;
                for ty in 0..th {
                    let img_row = &raw[(y + ty) * iw + x..(y + ty) * iw + x + tw];
                    let tpl_row = &t_prime[ty * tw..(ty + 1) * tw];
                    dot += img_row
                        .iter()
                        .zip(tpl_row)
                        .map(|(&i, &t)| i as f64 * t)
                        .sum::<f64>();
                    let done = ty + 1;
                    if done < th {
                        let centered = dot - mean_i * t_sum_head[done];
                        let bound = (centered + (t_sq_tail[done] * var_i).sqrt()) / denom;
                        if bound + 1e-9 < floor {
                            continue 'offset;
                        }
                    }
                }
                dot / denom
            };
            if score >= min_score && best.is_none_or(|(s, _, _)| score > s) {
                best = Some((score, x, y));
            }
        }
    }

    best.map(|(score, x, y)| Peak {
        x: x as u32,
        y: y as u32,
        score: clamp_score(score),
    })
}
