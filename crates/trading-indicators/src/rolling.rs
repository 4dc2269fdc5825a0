//! Rolling-window primitives over possibly undefined values.
//!
//! A window is defined only when it is full and every value in it is
//! defined. The first `window - 1` outputs are therefore always `None`.

fn rolling_by(
    values: &[Option<f64>],
    window: usize,
    reduce: impl Fn(&[f64]) -> f64,
) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut result = Vec::with_capacity(values.len());
    let mut buf = Vec::with_capacity(window);

    for i in 0..values.len() {
        if i + 1 < window {
            result.push(None);
            continue;
        }

        buf.clear();
        for v in &values[i + 1 - window..=i] {
            match v {
                Some(x) => buf.push(*x),
                None => break,
            }
        }

        result.push((buf.len() == window).then(|| reduce(&buf)));
    }

    result
}

/// Simple moving average over `window` values.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let window_f64 = window as f64;
    rolling_by(values, window, |w| w.iter().sum::<f64>() / window_f64)
}

/// Rolling minimum over `window` values.
pub fn rolling_min(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_by(values, window, |w| w.iter().cloned().fold(f64::INFINITY, f64::min))
}

/// Rolling maximum over `window` values.
pub fn rolling_max(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_by(values, window, |w| {
        w.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    })
}
