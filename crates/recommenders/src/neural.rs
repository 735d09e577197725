//! Neural collaborative filtering.
//!
//! Learns a user embedding table and a destination embedding table, combined
//! through a small feed-forward network ending in a sigmoid affinity score
//! in [0, 1]. Training data is every (user, destination) pair with a binary
//! implicit label derived from the interaction matrix (nonzero engagement =
//! positive), optimized with per-sample SGD on binary cross-entropy.
//!
//! All randomness (initialization, epoch shuffling) flows through one seeded
//! `StdRng`, so training is reproducible for a given config.
//!
//! The learned state lives in [`NeuralCfArtifact`], which serializes with
//! metadata (user count, destination count, embedding dim, hidden widths)
//! and round-trips to an equivalent scoring function.

use crate::error::{RecommendError, Result};
use crate::traits::Recommender;
use data_loader::{DataError, InteractionMatrix, TravelIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Hyperparameters for the neural CF model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralCfConfig {
    pub embedding_dim: usize,
    pub hidden_layers: Vec<usize>,
    pub epochs: usize,
    pub learning_rate: f32,
    pub seed: u64,
}

impl Default for NeuralCfConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 32,
            hidden_layers: vec![64, 32],
            epochs: 20,
            learning_rate: 0.001,
            seed: 42,
        }
    }
}

/// One fully connected layer: z = Wx + b.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DenseLayer {
    /// weights[out][in]
    weights: Vec<Vec<f32>>,
    biases: Vec<f32>,
}

impl DenseLayer {
    /// Xavier-uniform initialization
    fn new(rng: &mut StdRng, in_dim: usize, out_dim: usize) -> Self {
        let limit = (6.0 / (in_dim + out_dim) as f32).sqrt();
        let weights = (0..out_dim)
            .map(|_| (0..in_dim).map(|_| rng.gen_range(-limit..limit)).collect())
            .collect();
        Self {
            weights,
            biases: vec![0.0; out_dim],
        }
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, &bias)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + bias)
            .collect()
    }
}

/// The complete learned state of a neural CF model, including the metadata
/// needed to rebuild an equivalent scoring function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralCfArtifact {
    pub num_users: usize,
    pub num_destinations: usize,
    pub embedding_dim: usize,
    pub hidden_layers: Vec<usize>,
    user_embeddings: Vec<Vec<f32>>,
    dest_embeddings: Vec<Vec<f32>>,
    /// Hidden layers in order, then the single-unit output layer
    layers: Vec<DenseLayer>,
}

impl NeuralCfArtifact {
    fn init(
        num_users: usize,
        num_destinations: usize,
        config: &NeuralCfConfig,
        rng: &mut StdRng,
    ) -> Self {
        let embed = |rng: &mut StdRng, count: usize, dim: usize| {
            (0..count)
                .map(|_| (0..dim).map(|_| rng.gen_range(-0.05..0.05)).collect())
                .collect()
        };
        let user_embeddings = embed(rng, num_users, config.embedding_dim);
        let dest_embeddings = embed(rng, num_destinations, config.embedding_dim);

        let mut layers = Vec::new();
        let mut in_dim = config.embedding_dim * 2;
        for &width in &config.hidden_layers {
            layers.push(DenseLayer::new(rng, in_dim, width));
            in_dim = width;
        }
        layers.push(DenseLayer::new(rng, in_dim, 1));

        Self {
            num_users,
            num_destinations,
            embedding_dim: config.embedding_dim,
            hidden_layers: config.hidden_layers.clone(),
            user_embeddings,
            dest_embeddings,
            layers,
        }
    }
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

/// Cached intermediate values of one forward pass, kept for backprop.
struct ForwardPass {
    /// activations[0] is the concatenated embedding input, then the post-ReLU
    /// output of each hidden layer
    activations: Vec<Vec<f32>>,
    /// pre-activation z of each hidden layer
    pre_activations: Vec<Vec<f32>>,
    output: f32,
}

fn forward(artifact: &NeuralCfArtifact, user_idx: usize, dest_idx: usize) -> ForwardPass {
    let mut input = Vec::with_capacity(artifact.embedding_dim * 2);
    input.extend_from_slice(&artifact.user_embeddings[user_idx]);
    input.extend_from_slice(&artifact.dest_embeddings[dest_idx]);

    let mut activations = vec![input];
    let mut pre_activations = Vec::new();

    let hidden_count = artifact.layers.len() - 1;
    for layer in &artifact.layers[..hidden_count] {
        let z = layer.forward(activations.last().unwrap());
        let a: Vec<f32> = z.iter().map(|&v| v.max(0.0)).collect();
        pre_activations.push(z);
        activations.push(a);
    }

    let z_out = artifact.layers[hidden_count].forward(activations.last().unwrap())[0];
    ForwardPass {
        activations,
        pre_activations,
        output: sigmoid(z_out),
    }
}

/// One SGD step on a single (user, destination, label) sample. Returns the
/// BCE loss before the update.
fn train_step(
    artifact: &mut NeuralCfArtifact,
    user_idx: usize,
    dest_idx: usize,
    label: f32,
    learning_rate: f32,
) -> f32 {
    let pass = forward(artifact, user_idx, dest_idx);
    let y = pass.output;

    const EPS: f32 = 1e-7;
    let loss = -(label * (y + EPS).ln() + (1.0 - label) * (1.0 - y + EPS).ln());

    // BCE through a sigmoid collapses to (y - t) at the output pre-activation
    let mut delta = vec![y - label];

    for layer_idx in (0..artifact.layers.len()).rev() {
        let input_activation = &pass.activations[layer_idx];
        let layer = &mut artifact.layers[layer_idx];

        let mut grad_input = vec![0.0f32; input_activation.len()];
        for (out_idx, &d) in delta.iter().enumerate() {
            for (slot, &w) in grad_input.iter_mut().zip(&layer.weights[out_idx]) {
                *slot += w * d;
            }
            for (w, &x) in layer.weights[out_idx].iter_mut().zip(input_activation) {
                *w -= learning_rate * d * x;
            }
            layer.biases[out_idx] -= learning_rate * d;
        }

        delta = if layer_idx > 0 {
            // Gate the gradient through the preceding ReLU
            grad_input
                .iter()
                .zip(&pass.pre_activations[layer_idx - 1])
                .map(|(&g, &z)| if z > 0.0 { g } else { 0.0 })
                .collect()
        } else {
            grad_input
        };
    }

    // delta is now the gradient at the embedding concat
    let dim = artifact.embedding_dim;
    for (slot, &g) in artifact.user_embeddings[user_idx]
        .iter_mut()
        .zip(&delta[..dim])
    {
        *slot -= learning_rate * g;
    }
    for (slot, &g) in artifact.dest_embeddings[dest_idx]
        .iter_mut()
        .zip(&delta[dim..])
    {
        *slot -= learning_rate * g;
    }

    loss
}

/// Neural collaborative-filtering strategy.
pub struct NeuralCfRecommender {
    index: Arc<TravelIndex>,
    config: NeuralCfConfig,
    model: Option<NeuralCfArtifact>,
}

impl NeuralCfRecommender {
    pub fn new(index: Arc<TravelIndex>) -> Self {
        Self::with_config(index, NeuralCfConfig::default())
    }

    pub fn with_config(index: Arc<TravelIndex>, config: NeuralCfConfig) -> Self {
        Self {
            index,
            config,
            model: None,
        }
    }

    /// Rebuild a recommender from a persisted artifact. The artifact must
    /// match the catalog's table shapes.
    pub fn restore(index: Arc<TravelIndex>, artifact: NeuralCfArtifact) -> Result<Self> {
        if artifact.num_users != index.num_users()
            || artifact.num_destinations != index.num_destinations()
        {
            return Err(RecommendError::Data(DataError::Validation(format!(
                "model shape {}x{} does not match catalog {}x{}",
                artifact.num_users,
                artifact.num_destinations,
                index.num_users(),
                index.num_destinations()
            ))));
        }
        let config = NeuralCfConfig {
            embedding_dim: artifact.embedding_dim,
            hidden_layers: artifact.hidden_layers.clone(),
            ..NeuralCfConfig::default()
        };
        Ok(Self {
            index,
            config,
            model: Some(artifact),
        })
    }

    /// The learned state, available after `fit`.
    pub fn artifact(&self) -> Result<&NeuralCfArtifact> {
        self.model.as_ref().ok_or(RecommendError::ModelNotTrained)
    }

    /// Persist the trained model (weights + metadata) as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let artifact = self.artifact()?;
        let file = File::create(path).map_err(DataError::Io)?;
        serde_json::to_writer(BufWriter::new(file), artifact).map_err(|e| {
            RecommendError::Data(DataError::Parse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(())
    }

    /// Load a persisted model and bind it to the given catalog.
    pub fn load(index: Arc<TravelIndex>, path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|_| DataError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let artifact: NeuralCfArtifact =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                RecommendError::Data(DataError::Parse {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                })
            })?;
        Self::restore(index, artifact)
    }
}

impl Recommender for NeuralCfRecommender {
    fn name(&self) -> &str {
        "neural"
    }

    fn index(&self) -> &Arc<TravelIndex> {
        &self.index
    }

    #[instrument(skip(self))]
    fn fit(&mut self) -> Result<()> {
        let interactions = self.index.interactions();
        let num_users = interactions.num_users();
        let num_destinations = interactions.num_destinations();

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut artifact = NeuralCfArtifact::init(num_users, num_destinations, &self.config, &mut rng);

        // Every (user, destination) pair with a binary implicit label
        let mut samples: Vec<(usize, usize, f32)> = Vec::with_capacity(num_users * num_destinations);
        for user_idx in 0..num_users {
            for dest_idx in 0..num_destinations {
                let label = if interactions.get(user_idx, dest_idx) > 0.0 {
                    1.0
                } else {
                    0.0
                };
                samples.push((user_idx, dest_idx, label));
            }
        }

        for epoch in 0..self.config.epochs {
            samples.shuffle(&mut rng);
            let mut total_loss = 0.0f32;
            for &(user_idx, dest_idx, label) in &samples {
                total_loss +=
                    train_step(&mut artifact, user_idx, dest_idx, label, self.config.learning_rate);
            }
            if !samples.is_empty() {
                debug!(
                    "epoch {}: mean BCE {:.4}",
                    epoch + 1,
                    total_loss / samples.len() as f32
                );
            }
        }

        info!(
            "Trained neural CF: {} users x {} destinations, {} epochs over {} samples",
            num_users,
            num_destinations,
            self.config.epochs,
            samples.len()
        );
        self.model = Some(artifact);
        Ok(())
    }

    fn score_destinations(
        &self,
        user_idx: usize,
        _interactions: &InteractionMatrix,
    ) -> Result<Vec<f32>> {
        let model = self.model.as_ref().ok_or(RecommendError::ModelNotTrained)?;
        if user_idx >= model.num_users {
            return Err(RecommendError::Data(DataError::Validation(format!(
                "user index {} outside trained model ({} users)",
                user_idx, model.num_users
            ))));
        }

        // One batched forward pass over every destination
        Ok((0..model.num_destinations)
            .into_par_iter()
            .map(|dest_idx| forward(model, user_idx, dest_idx).output)
            .collect())
    }
}
