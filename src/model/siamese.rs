use candle_core::{DType, Device, Module, Tensor, Var};
use candle_nn::rnn::{LSTM, LSTMConfig, RNN, lstm};
use candle_nn::{Linear, VarBuilder, VarMap, linear, ops::sigmoid};
use tracing::{debug, info};

use super::attention::AttentionBlock;
use super::config::SiameseConfig;
use super::error::ModelError;
use super::graph::{
    ATTENTION_LAYER, BRANCH_HEADS, ENCODER_LAYER, FUSION_HEAD, INPUT_NAMES, Topology,
};

/// One batch of padded inputs, each shaped `(batch, max_len, embedding_dim)`.
///
/// `answer` is the anchor branch; the other three are compared against it.
#[derive(Debug, Clone, Copy)]
pub struct SiameseInputs<'a> {
    pub answer: &'a Tensor,
    pub reference: &'a Tensor,
    pub aux_first: &'a Tensor,
    pub aux_second: &'a Tensor,
}

impl<'a> SiameseInputs<'a> {
    pub fn new(
        answer: &'a Tensor,
        reference: &'a Tensor,
        aux_first: &'a Tensor,
        aux_second: &'a Tensor,
    ) -> Self {
        Self {
            answer,
            reference,
            aux_first,
            aux_second,
        }
    }

    /// Inputs in topology order (`input_1` .. `input_4`).
    pub fn as_array(&self) -> [&'a Tensor; 4] {
        [self.answer, self.reference, self.aux_first, self.aux_second]
    }
}

/// Siamese LSTM-with-attention similarity model.
///
/// All parameters live in one [`VarMap`]; the encoder and attention block are created once
/// and applied to every branch, so branch weights are shared by construction.
pub struct SiameseModel {
    config: SiameseConfig,
    topology: Topology,
    device: Device,
    pub(super) varmap: VarMap,
    encoder: LSTM,
    attention: AttentionBlock,
    branch_heads: Vec<Linear>,
    fusion_head: Linear,
    encoder_kernel: Tensor,
}

impl std::fmt::Debug for SiameseModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiameseModel")
            .field("config", &self.config)
            .field("device", &self.device)
            .field("parameters", &self.parameter_count())
            .finish()
    }
}

impl SiameseModel {
    /// Builds a freshly initialized model. The topology is shape-checked before any
    /// parameter is allocated.
    pub fn new(config: SiameseConfig, device: &Device) -> Result<Self, ModelError> {
        let topology = Topology::build(&config)?;

        let mut varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);

        let lstm_config = LSTMConfig {
            w_ih_init: candle_nn::init::DEFAULT_KAIMING_NORMAL,
            ..Default::default()
        };
        let encoder_vb = vb.pp(ENCODER_LAYER);
        let encoder = lstm(
            config.embedding_dim,
            config.hidden_size,
            lstm_config,
            encoder_vb.clone(),
        )?;
        let encoder_kernel = encoder_vb.get(
            (4 * config.hidden_size, config.embedding_dim),
            "weight_ih_l0",
        )?;

        let attention = AttentionBlock::new(config.max_len, vb.pp(ATTENTION_LAYER))?;

        let branch_heads = BRANCH_HEADS
            .iter()
            .map(|name| linear(config.flattened_len(), 1, vb.pp(*name)))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let fusion_head = linear(BRANCH_HEADS.len(), 1, vb.pp(FUSION_HEAD))?;

        init_forget_gate_bias(&mut varmap, config.hidden_size, device)?;

        let model = Self {
            config,
            topology,
            device: device.clone(),
            varmap,
            encoder,
            attention,
            branch_heads,
            fusion_head,
            encoder_kernel,
        };

        info!(
            max_len = model.config.max_len,
            embedding_dim = model.config.embedding_dim,
            hidden_size = model.config.hidden_size,
            parameters = model.parameter_count(),
            "Siamese model initialized"
        );

        Ok(model)
    }

    pub fn config(&self) -> &SiameseConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Every trainable variable, for handing to an optimizer.
    pub fn trainable_vars(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }

    pub fn parameter_count(&self) -> usize {
        self.varmap.all_vars().iter().map(|v| v.elem_count()).sum()
    }

    /// The shared encoder's input kernel, `(4 * hidden_size, embedding_dim)`.
    pub fn encoder_kernel(&self) -> &Tensor {
        &self.encoder_kernel
    }

    /// `l2_penalty * sum(encoder_kernel²)` as a scalar tensor.
    pub fn regularization(&self) -> Result<Tensor, ModelError> {
        let penalty = self.encoder_kernel.sqr()?.sum_all()?;
        Ok(penalty.affine(self.config.l2_penalty, 0.0)?)
    }

    /// Similarity probabilities, shaped `(batch, 1)`, each in `[0, 1]`.
    pub fn forward(&self, inputs: &SiameseInputs<'_>) -> Result<Tensor, ModelError> {
        let scores = self.branch_scores(inputs)?;
        let fused = self.fusion_head.forward(&scores)?;
        Ok(sigmoid(&fused)?)
    }

    /// Forward pass flattened to one probability per example.
    pub fn predict(&self, inputs: &SiameseInputs<'_>) -> Result<Vec<f32>, ModelError> {
        Ok(self.forward(inputs)?.flatten_all()?.to_vec1::<f32>()?)
    }

    /// Per-branch sigmoid scores before fusion, shaped `(batch, 3)`.
    pub fn branch_scores(&self, inputs: &SiameseInputs<'_>) -> Result<Tensor, ModelError> {
        let diffs = self.branch_differences(inputs)?;
        let scores = self
            .branch_heads
            .iter()
            .zip(diffs.iter())
            .map(|(head, diff)| sigmoid(&head.forward(diff)?))
            .collect::<candle_core::Result<Vec<_>>>()?;
        Ok(Tensor::cat(&scores, 1)?)
    }

    /// Anchor minus each comparison branch after encoding, attention and flattening.
    ///
    /// Each difference is shaped `(batch, max_len * hidden_size)`. Identical inputs on a
    /// branch give an all-zero difference.
    pub fn branch_differences(
        &self,
        inputs: &SiameseInputs<'_>,
    ) -> Result<[Tensor; 3], ModelError> {
        let batch = self.check_inputs(inputs)?;
        debug!(batch, "Encoding siamese branches");

        let [answer, reference, aux_first, aux_second] = inputs.as_array();
        let anchor = self.encode(answer)?;
        Ok([
            anchor.sub(&self.encode(reference)?)?,
            anchor.sub(&self.encode(aux_first)?)?,
            anchor.sub(&self.encode(aux_second)?)?,
        ])
    }

    /// Shared encoder, attention and flatten for one branch: `(b, L, D) -> (b, L * H)`.
    fn encode(&self, xs: &Tensor) -> Result<Tensor, ModelError> {
        let states = self.encoder.seq(xs)?;
        let hidden = self.encoder.states_to_tensor(&states)?;
        let attended = self.attention.forward(&hidden)?;
        Ok(attended.flatten_from(1)?)
    }

    /// Checks all four inputs share one batch size and the configured `(L, D)`.
    fn check_inputs(&self, inputs: &SiameseInputs<'_>) -> Result<usize, ModelError> {
        let batch = inputs.answer.dims().first().copied().unwrap_or(0);
        let expected = vec![batch, self.config.max_len, self.config.embedding_dim];

        for (name, tensor) in INPUT_NAMES.iter().zip(inputs.as_array()) {
            if tensor.dims() != expected.as_slice() {
                return Err(ModelError::ShapeMismatch {
                    node: (*name).to_string(),
                    expected,
                    actual: tensor.dims().to_vec(),
                });
            }
        }

        if batch == 0 {
            return Err(ModelError::ShapeMismatch {
                node: INPUT_NAMES[0].to_string(),
                expected: vec![1, self.config.max_len, self.config.embedding_dim],
                actual: inputs.answer.dims().to_vec(),
            });
        }

        Ok(batch)
    }
}

/// Sets the forget-gate slice of the input bias to one (gate order i, f, g, o).
fn init_forget_gate_bias(
    varmap: &mut VarMap,
    hidden_size: usize,
    device: &Device,
) -> Result<(), ModelError> {
    let bias = Tensor::cat(
        &[
            Tensor::zeros(hidden_size, DType::F32, device)?,
            Tensor::ones(hidden_size, DType::F32, device)?,
            Tensor::zeros(2 * hidden_size, DType::F32, device)?,
        ],
        0,
    )?;
    varmap.set_one(format!("{ENCODER_LAYER}.bias_ih_l0"), &bias)?;
    Ok(())
}
