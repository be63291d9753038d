//! Stateless numeric primitives used by the pilot's forward pass.

use crate::ActivationError;

/// Element-wise `max(0, x)`.
///
/// # Examples
///
/// ```
/// use spaceai_pilot::activation::relu;
///
/// assert_eq!(relu(&[-1.0, 0.0, 2.5]), vec![0.0, 0.0, 2.5]);
/// ```
#[must_use]
pub fn relu(values: &[f32]) -> Vec<f32> {
    let mut out = values.to_vec();
    relu_in_place(&mut out);
    out
}

/// In-place variant of [`relu`].
pub fn relu_in_place(values: &mut [f32]) {
    for v in values {
        *v = v.max(0.0);
    }
}

/// Exponential normalization over the whole input vector.
///
/// The maximum is subtracted before exponentiating, so large inputs do not overflow.
/// For finite input every component lies in `[0, 1]` and the components sum to 1.
///
/// # Errors
///
/// Returns [`ActivationError::DegenerateInput`] if `values` is empty.
///
/// # Examples
///
/// ```
/// use spaceai_pilot::activation::softmax;
///
/// let probs = softmax(&[1.0, 1.0]).unwrap();
/// assert_eq!(probs, vec![0.5, 0.5]);
/// assert!(softmax(&[]).is_err());
/// ```
pub fn softmax(values: &[f32]) -> Result<Vec<f32>, ActivationError> {
    let max = values
        .iter()
        .copied()
        .reduce(f32::max)
        .ok_or(ActivationError::DegenerateInput)?;
    let exps = values.iter().map(|v| (v - max).exp()).collect::<Vec<_>>();
    let sum = exps.iter().sum::<f32>();
    Ok(exps.into_iter().map(|e| e / sum).collect())
}

/// Index of the largest value; the lowest index wins ties.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
