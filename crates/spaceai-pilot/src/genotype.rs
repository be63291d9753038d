//! Network parameters of a pilot.
//!
//! A [`Genotype`] is two fully connected [`Layer`]s:
//!
//! - `hidden`: `NEURONS × 3` weights (`W_in_hidden`) and `NEURONS` biases (`b_hidden`)
//! - `output`: `3 × NEURONS` weights (`W_hidden_out`) and 3 biases (`b_out`)
//!
//! Layer shapes are fixed for the lifetime of a run. Arithmetic between mismatched
//! shapes is a programming error and panics; shape problems in persisted data are
//! reported by [`genome_store`](crate::genome_store) instead.
//!
//! # Initialization
//!
//! Weights are drawn from the standard normal distribution, biases from the standard
//! normal distribution scaled by 0.5.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::activation;

/// Number of observation inputs (ship x, gap left, gap right).
pub const INPUTS: usize = 3;

/// Number of output units, one per action.
pub const OUTPUTS: usize = spaceai_engine::Action::LEN;

const BIAS_SCALE: f32 = 0.5;

/// Dense row-major matrix of `f32`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRepr")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

#[derive(Deserialize)]
struct MatrixRepr {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("matrix declared as {rows}x{cols} holds {len} values")]
pub struct MatrixDataError {
    rows: usize,
    cols: usize,
    len: usize,
}

impl TryFrom<MatrixRepr> for Matrix {
    type Error = MatrixDataError;

    fn try_from(repr: MatrixRepr) -> Result<Self, Self::Error> {
        Matrix::from_vec(repr.rows, repr.cols, repr.data)
    }
}

impl Matrix {
    /// Builds a matrix from row-major data.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, MatrixDataError> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(MatrixDataError {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a matrix by evaluating `f(row, col)` for every cell.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f32,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_fn(rows, cols, |_, _| 0.0)
    }

    /// Samples every cell from `N(0, 1) * scale`.
    pub fn random_normal<R>(rng: &mut R, rows: usize, cols: usize, scale: f32) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::from_fn(rows, cols, |_, _| rng.sample::<f32, _>(StandardNormal) * scale)
    }

    /// `(rows, cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    /// Row-major cell values.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Matrix-vector product `self · v`.
    #[must_use]
    pub fn mul_vec(&self, v: &[f32]) -> Vec<f32> {
        assert_eq!(v.len(), self.cols, "vector length must match column count");
        self.data
            .chunks_exact(self.cols)
            .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
            .collect()
    }

    /// Cell-wise `w * a + (1 - w) * b`.
    #[must_use]
    pub fn blend(a: &Matrix, b: &Matrix, w: f32) -> Matrix {
        assert_eq!(a.shape(), b.shape(), "blended matrices must share a shape");
        Matrix {
            rows: a.rows,
            cols: a.cols,
            data: blend_values(&a.data, &b.data, w),
        }
    }

    /// Multiplies every cell by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.data {
            *v *= factor;
        }
    }
}

fn blend_values(a: &[f32], b: &[f32], w: f32) -> Vec<f32> {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| w * x + (1.0 - w) * y).collect()
}

/// Fully connected layer with ReLU activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    weights: Matrix,
    bias: Vec<f32>,
}

impl Layer {
    /// Creates a layer from its weight matrix (`outputs × inputs`) and bias vector.
    ///
    /// # Panics
    ///
    /// Panics if the bias length differs from the number of weight rows.
    #[must_use]
    pub fn new(weights: Matrix, bias: Vec<f32>) -> Self {
        assert_eq!(
            weights.rows,
            bias.len(),
            "bias length must match weight rows"
        );
        Self { weights, bias }
    }

    /// Randomly initialized layer mapping `inputs` values to `outputs` values.
    pub fn random<R>(rng: &mut R, inputs: usize, outputs: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let weights = Matrix::random_normal(rng, outputs, inputs, 1.0);
        let bias = Matrix::random_normal(rng, outputs, 1, BIAS_SCALE).data;
        Self { weights, bias }
    }

    #[must_use]
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    #[must_use]
    pub fn bias(&self) -> &[f32] {
        &self.bias
    }

    #[must_use]
    pub fn inputs(&self) -> usize {
        self.weights.cols
    }

    #[must_use]
    pub fn outputs(&self) -> usize {
        self.weights.rows
    }

    /// `relu(W · input + b)`.
    #[must_use]
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut out = self.weights.mul_vec(input);
        for (o, b) in out.iter_mut().zip(&self.bias) {
            *o += b;
        }
        activation::relu_in_place(&mut out);
        out
    }

    fn blend(a: &Layer, b: &Layer, w: f32) -> Layer {
        Layer {
            weights: Matrix::blend(&a.weights, &b.weights, w),
            bias: blend_values(&a.bias, &b.bias, w),
        }
    }

    fn scale(&mut self, factor: f32) {
        self.weights.scale(factor);
        for b in &mut self.bias {
            *b *= factor;
        }
    }
}

/// Complete parameter set of one pilot network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genotype {
    hidden: Layer,
    output: Layer,
}

impl Genotype {
    /// Freshly randomized genotype with `neurons` hidden units.
    pub fn random<R>(rng: &mut R, neurons: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            hidden: Layer::random(rng, INPUTS, neurons),
            output: Layer::random(rng, neurons, OUTPUTS),
        }
    }

    /// Assembles a genotype from its two layers.
    ///
    /// # Panics
    ///
    /// Panics unless `hidden` maps 3 inputs to `n` units and `output` maps `n` units
    /// to 3 outputs.
    #[must_use]
    pub fn from_layers(hidden: Layer, output: Layer) -> Self {
        assert_eq!(hidden.inputs(), INPUTS, "hidden layer must take 3 inputs");
        assert_eq!(output.outputs(), OUTPUTS, "output layer must have 3 units");
        assert_eq!(
            hidden.outputs(),
            output.inputs(),
            "layer widths must agree"
        );
        Self { hidden, output }
    }

    /// Hidden-layer width (`NEURONS`).
    #[must_use]
    pub fn neurons(&self) -> usize {
        self.hidden.outputs()
    }

    /// Input → hidden layer (`W_in_hidden`, `b_hidden`).
    #[must_use]
    pub fn hidden(&self) -> &Layer {
        &self.hidden
    }

    /// Hidden → output layer (`W_hidden_out`, `b_out`).
    #[must_use]
    pub fn output(&self) -> &Layer {
        &self.output
    }

    /// Post-ReLU output activations for a normalized input.
    #[must_use]
    pub fn forward(&self, input: &[f32; INPUTS]) -> Vec<f32> {
        let hidden = self.hidden.forward(input);
        self.output.forward(&hidden)
    }

    /// Parameter-wise `w * a + (1 - w) * b`, with one `w` shared by every weight and bias.
    #[must_use]
    pub fn blend(a: &Genotype, b: &Genotype, w: f32) -> Genotype {
        Genotype {
            hidden: Layer::blend(&a.hidden, &b.hidden, w),
            output: Layer::blend(&a.output, &b.output, w),
        }
    }

    /// Multiplies every weight and bias by `factor`.
    pub fn scale(&mut self, factor: f32) {
        self.hidden.scale(factor);
        self.output.scale(factor);
    }

    /// Iterates over every parameter (weights then biases, hidden layer first).
    pub fn parameters(&self) -> impl Iterator<Item = f32> + '_ {
        [&self.hidden, &self.output]
            .into_iter()
            .flat_map(|l| l.weights.data.iter().chain(&l.bias).copied())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_random_shapes() {
        let mut rng = Pcg32::seed_from_u64(1);
        let genotype = Genotype::random(&mut rng, 8);
        assert_eq!(genotype.neurons(), 8);
        assert_eq!(genotype.hidden().weights().shape(), (8, 3));
        assert_eq!(genotype.hidden().bias().len(), 8);
        assert_eq!(genotype.output().weights().shape(), (3, 8));
        assert_eq!(genotype.output().bias().len(), 3);
        assert_eq!(genotype.parameters().count(), 8 * 3 + 8 + 3 * 8 + 3);
    }

    #[test]
    fn test_random_is_reproducible() {
        let a = Genotype::random(&mut Pcg32::seed_from_u64(42), 4);
        let b = Genotype::random(&mut Pcg32::seed_from_u64(42), 4);
        let c = Genotype::random(&mut Pcg32::seed_from_u64(43), 4);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_mul_vec() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, -1.0, 0.0, 1.0]).unwrap();
        assert_eq!(m.mul_vec(&[1.0, 1.0, 2.0]), vec![9.0, 1.0]);
        assert_eq!(m.get(1, 2), 1.0);
    }

    #[test]
    #[should_panic(expected = "vector length")]
    fn test_mul_vec_rejects_wrong_length() {
        let _ = Matrix::zeros(2, 3).mul_vec(&[1.0, 2.0]);
    }

    #[test]
    fn test_from_vec_rejects_inconsistent_data() {
        assert!(Matrix::from_vec(2, 2, vec![1.0; 3]).is_err());
    }

    #[test]
    fn test_layer_forward_applies_bias_and_relu() {
        let weights = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let layer = Layer::new(weights, vec![0.5, -2.0]);
        assert_eq!(layer.forward(&[1.0, 1.0]), vec![1.5, 0.0]);
    }

    #[test]
    fn test_blend_endpoints_and_midpoint() {
        let mut rng = Pcg32::seed_from_u64(3);
        let a = Genotype::random(&mut rng, 5);
        let b = Genotype::random(&mut rng, 5);

        assert_eq!(Genotype::blend(&a, &b, 1.0), a);
        assert_eq!(Genotype::blend(&a, &b, 0.0), b);

        let mid = Genotype::blend(&a, &b, 0.5);
        for ((m, x), y) in mid.parameters().zip(a.parameters()).zip(b.parameters()) {
            assert!((m - (x + y) / 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_scale_multiplies_every_parameter() {
        let mut rng = Pcg32::seed_from_u64(9);
        let original = Genotype::random(&mut rng, 3);
        let mut scaled = original.clone();
        scaled.scale(2.0);
        for (s, o) in scaled.parameters().zip(original.parameters()) {
            assert_eq!(s, o * 2.0);
        }
    }

    #[test]
    #[should_panic(expected = "layer widths")]
    fn test_from_layers_rejects_mismatched_widths() {
        let mut rng = Pcg32::seed_from_u64(0);
        let hidden = Layer::random(&mut rng, INPUTS, 8);
        let output = Layer::random(&mut rng, 16, OUTPUTS);
        let _ = Genotype::from_layers(hidden, output);
    }

    #[test]
    fn test_matrix_deserialization_checks_data_length() {
        let ok: Matrix = serde_json::from_str(r#"{"rows":1,"cols":2,"data":[1.0,2.0]}"#).unwrap();
        assert_eq!(ok.shape(), (1, 2));

        let err = serde_json::from_str::<Matrix>(r#"{"rows":2,"cols":2,"data":[1.0]}"#);
        assert!(err.unwrap_err().to_string().contains("holds 1 values"));
    }
}
