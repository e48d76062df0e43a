//! Feed-forward regressor: one ReLU hidden layer and a linear output unit.
//!
//! Trained with Adam on mean-squared error for a fixed number of epochs,
//! without early stopping or a validation split.
//!
//! The network sees each window relative to its last value and predicts the
//! step to the next value, both divided by the standard deviation of the
//! framed series. A window that only differs by a level shift therefore maps
//! to the same step, which keeps long rollouts on trend. L2 weight decay on
//! the dense weights keeps the response flat outside the training windows.

use crate::error::{ForecastError, Result};
use crate::models::Regressor;
use crate::transform::{Standardizer, TrainingSet};
use crate::utils::{all_finite, CancellationToken};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Hyperparameters for [`MlpRegressor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlpConfig {
    /// Units in the hidden ReLU layer.
    pub hidden_units: usize,
    /// Full passes over the training set.
    pub epochs: usize,
    /// Examples per gradient step.
    pub batch_size: usize,
    /// Adam step size.
    pub learning_rate: f64,
    /// L2 penalty added to the weight gradients (biases are not decayed).
    pub weight_decay: f64,
    /// Seed for weight initialization and batch shuffling.
    pub seed: u64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_units: 50,
            epochs: 80,
            batch_size: 32,
            learning_rate: 0.01,
            weight_decay: 0.01,
            seed: 42,
        }
    }
}

impl MlpConfig {
    pub fn with_hidden_units(mut self, hidden_units: usize) -> Self {
        self.hidden_units = hidden_units;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_weight_decay(mut self, weight_decay: f64) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hidden_units == 0 {
            return Err(ForecastError::InvalidParameter(
                "hidden_units must be positive".to_string(),
            ));
        }
        if self.epochs == 0 {
            return Err(ForecastError::InvalidParameter(
                "epochs must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "batch_size must be positive".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "weight_decay must be non-negative, got {}",
                self.weight_decay
            )));
        }
        Ok(())
    }
}

/// Weights of the two dense layers. Also used for gradients and Adam moments.
#[derive(Debug, Clone)]
struct Layers {
    inputs: usize,
    /// hidden x inputs, row-major
    w1: Vec<f64>,
    b1: Vec<f64>,
    w2: Vec<f64>,
    b2: Vec<f64>,
}

impl Layers {
    fn zeros(inputs: usize, hidden: usize) -> Self {
        Self {
            inputs,
            w1: vec![0.0; hidden * inputs],
            b1: vec![0.0; hidden],
            w2: vec![0.0; hidden],
            b2: vec![0.0; 1],
        }
    }

    /// Glorot-uniform weights, zero biases.
    fn glorot(inputs: usize, hidden: usize, rng: &mut impl Rng) -> Self {
        let mut layers = Self::zeros(inputs, hidden);
        let limit1 = (6.0 / (inputs + hidden) as f64).sqrt();
        let limit2 = (6.0 / (hidden + 1) as f64).sqrt();
        for w in layers.w1.iter_mut() {
            *w = rng.gen_range(-limit1..limit1);
        }
        for w in layers.w2.iter_mut() {
            *w = rng.gen_range(-limit2..limit2);
        }
        layers
    }

    fn hidden(&self) -> usize {
        self.b1.len()
    }

    fn reset(&mut self) {
        for slice in self.slices_mut() {
            slice.fill(0.0);
        }
    }

    fn slices(&self) -> [&[f64]; 4] {
        [&self.w1, &self.b1, &self.w2, &self.b2]
    }

    fn slices_mut(&mut self) -> [&mut [f64]; 4] {
        [&mut self.w1, &mut self.b1, &mut self.w2, &mut self.b2]
    }

    /// Forward pass; writes hidden pre-activations into `pre`.
    fn forward(&self, x: &[f64], pre: &mut [f64]) -> f64 {
        let mut out = self.b2[0];
        for (j, a) in pre.iter_mut().enumerate() {
            let row = &self.w1[j * self.inputs..(j + 1) * self.inputs];
            *a = self.b1[j] + row.iter().zip(x).map(|(w, xi)| w * xi).sum::<f64>();
            out += self.w2[j] * a.max(0.0);
        }
        out
    }

    /// Add `decay * w` to the weight gradients.
    fn decay_into(&self, decay: f64, grads: &mut Layers) {
        for (g, w) in grads.w1.iter_mut().zip(&self.w1) {
            *g += decay * w;
        }
        for (g, w) in grads.w2.iter_mut().zip(&self.w2) {
            *g += decay * w;
        }
    }

    /// Accumulate gradients of `grad_out * output` for one example.
    fn accumulate(&self, x: &[f64], pre: &[f64], grad_out: f64, grads: &mut Layers) {
        grads.b2[0] += grad_out;
        for (j, &a) in pre.iter().enumerate() {
            if a <= 0.0 {
                continue;
            }
            grads.w2[j] += grad_out * a;
            let da = grad_out * self.w2[j];
            grads.b1[j] += da;
            let row = &mut grads.w1[j * self.inputs..(j + 1) * self.inputs];
            for (g, xi) in row.iter_mut().zip(x) {
                *g += da * xi;
            }
        }
    }
}

/// Adam optimizer state.
struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    step: i32,
    m: Layers,
    v: Layers,
}

impl Adam {
    fn new(learning_rate: f64, shape: &Layers) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            step: 0,
            m: Layers::zeros(shape.inputs, shape.hidden()),
            v: Layers::zeros(shape.inputs, shape.hidden()),
        }
    }

    fn update(&mut self, params: &mut Layers, grads: &Layers) {
        self.step += 1;
        let lr_t = self.learning_rate * (1.0 - self.beta2.powi(self.step)).sqrt()
            / (1.0 - self.beta1.powi(self.step));
        let (b1, b2, eps) = (self.beta1, self.beta2, self.epsilon);

        let params = params.slices_mut();
        let grads = grads.slices();
        let m = self.m.slices_mut();
        let v = self.v.slices_mut();

        for (((p, g), m), v) in params.into_iter().zip(grads).zip(m).zip(v) {
            for i in 0..p.len() {
                m[i] = b1 * m[i] + (1.0 - b1) * g[i];
                v[i] = b2 * v[i] + (1.0 - b2) * g[i] * g[i];
                p[i] -= lr_t * m[i] / (v[i].sqrt() + eps);
            }
        }
    }
}

/// Two-layer perceptron regressor mapping a window to the next value.
#[derive(Debug, Clone)]
pub struct MlpRegressor {
    config: MlpConfig,
    layers: Option<Layers>,
    scaler: Standardizer,
    loss_history: Vec<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl Default for MlpRegressor {
    fn default() -> Self {
        Self::new(MlpConfig::default())
    }
}

impl MlpRegressor {
    pub fn new(config: MlpConfig) -> Self {
        Self {
            config,
            layers: None,
            scaler: Standardizer::default(),
            loss_history: Vec::new(),
            fitted: None,
            residuals: None,
        }
    }

    pub fn config(&self) -> &MlpConfig {
        &self.config
    }

    /// Mean training loss (standardized units) recorded after each epoch.
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    fn predict_scaled(layers: &Layers, scaler: &Standardizer, input: &[f64], pre: &mut [f64]) -> f64 {
        let last = last_value(input);
        let step = layers.forward(&relative_window(scaler, input), pre);
        last + step * scaler.scale
    }
}

fn last_value(window: &[f64]) -> f64 {
    window.last().copied().unwrap_or(0.0)
}

/// Window offsets from its last value, in units of the series spread.
fn relative_window(scaler: &Standardizer, window: &[f64]) -> Vec<f64> {
    let last = last_value(window);
    window.iter().map(|x| (x - last) / scaler.scale).collect()
}

impl Regressor for MlpRegressor {
    fn fit(&mut self, training: &TrainingSet, cancel: &CancellationToken) -> Result<()> {
        self.config.validate()?;
        if training.is_empty() {
            return Err(ForecastError::EmptyData);
        }

        let window = training.window();
        let n = training.len();
        let scaler = Standardizer::fit(&training.observed_values());
        if !(scaler.center.is_finite() && scaler.scale.is_finite()) {
            return Err(ForecastError::TrainingDiverged {
                epoch: 1,
                loss: f64::INFINITY,
            });
        }
        let xs: Vec<Vec<f64>> = training
            .inputs()
            .map(|x| relative_window(&scaler, x))
            .collect();
        let ys: Vec<f64> = training
            .examples()
            .iter()
            .map(|e| (e.target - last_value(&e.input)) / scaler.scale)
            .collect();

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut layers = Layers::glorot(window, self.config.hidden_units, &mut rng);
        let mut grads = Layers::zeros(window, self.config.hidden_units);
        let mut adam = Adam::new(self.config.learning_rate, &layers);
        let mut pre = vec![0.0; self.config.hidden_units];
        let mut order: Vec<usize> = (0..n).collect();
        let mut history = Vec::with_capacity(self.config.epochs);

        for epoch in 1..=self.config.epochs {
            cancel.check()?;
            order.shuffle(&mut rng);

            let mut epoch_loss = 0.0;
            for batch in order.chunks(self.config.batch_size) {
                grads.reset();
                let scale = 2.0 / batch.len() as f64;
                for &i in batch {
                    let err = layers.forward(&xs[i], &mut pre) - ys[i];
                    epoch_loss += err * err;
                    layers.accumulate(&xs[i], &pre, scale * err, &mut grads);
                }
                if self.config.weight_decay > 0.0 {
                    layers.decay_into(self.config.weight_decay, &mut grads);
                }
                adam.update(&mut layers, &grads);
            }
            epoch_loss /= n as f64;

            if !epoch_loss.is_finite() {
                return Err(ForecastError::TrainingDiverged {
                    epoch,
                    loss: epoch_loss,
                });
            }
            trace!(epoch, loss = epoch_loss, "mlp epoch");
            history.push(epoch_loss);
        }

        let fitted: Vec<f64> = training
            .inputs()
            .map(|x| Self::predict_scaled(&layers, &scaler, x, &mut pre))
            .collect();
        if !all_finite(&fitted) {
            return Err(ForecastError::TrainingDiverged {
                epoch: self.config.epochs,
                loss: f64::NAN,
            });
        }
        let residuals = training
            .targets()
            .iter()
            .zip(&fitted)
            .map(|(y, f)| y - f)
            .collect();

        debug!(
            examples = n,
            epochs = self.config.epochs,
            final_loss = history.last().copied().unwrap_or(f64::NAN),
            "mlp fitted"
        );

        self.layers = Some(layers);
        self.scaler = scaler;
        self.loss_history = history;
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, input: &[f64]) -> Result<f64> {
        let layers = self.layers.as_ref().ok_or(ForecastError::FitRequired)?;
        if input.len() != layers.inputs {
            return Err(ForecastError::DimensionMismatch {
                expected: layers.inputs,
                got: input.len(),
            });
        }
        let mut pre = vec![0.0; layers.hidden()];
        Ok(Self::predict_scaled(layers, &self.scaler, input, &mut pre))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "MLP"
    }
}
