//! Explicit, shape-checked description of the siamese network.
//!
//! Shared layers appear once per call site: the node `encoder_2` is the `encoder` layer
//! applied to `input_2`. Shapes exclude the batch dimension.

use serde::{Deserialize, Serialize};

use super::config::SiameseConfig;
use super::error::ModelError;

/// Layer applied at a node, with the parameters that determine its output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Input,
    Lstm { units: usize },
    Attention { time_steps: usize },
    Flatten,
    Subtract,
    Dense { units: usize },
    Concatenate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique node name.
    pub name: String,
    /// Name of the layer owning this node's parameters. Nodes of a shared layer repeat it.
    pub layer: String,
    pub kind: NodeKind,
    pub inputs: Vec<String>,
    pub output_shape: Vec<usize>,
}

/// Ordered node list plus the configuration it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub config: SiameseConfig,
    pub nodes: Vec<GraphNode>,
}

/// Names of the four inputs, anchor first.
pub const INPUT_NAMES: [&str; 4] = ["input_1", "input_2", "input_3", "input_4"];

pub const ENCODER_LAYER: &str = "encoder";
pub const ATTENTION_LAYER: &str = "attention";
pub const BRANCH_HEADS: [&str; 3] = ["similarity_layer1", "similarity_layer2", "similarity_layer3"];
pub const FUSION_HEAD: &str = "similarity_layer";
pub const OUTPUT_NODE: &str = FUSION_HEAD;

impl Topology {
    /// Builds the siamese topology for `config`, checking every edge.
    pub fn build(config: &SiameseConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let mut graph = GraphBuilder::default();

        let mut flattened = Vec::with_capacity(INPUT_NAMES.len());
        for (i, input) in INPUT_NAMES.iter().enumerate() {
            let branch = i + 1;
            graph.input(input, vec![config.max_len, config.embedding_dim]);
            let encoded = graph.apply(
                &format!("{ENCODER_LAYER}_{branch}"),
                ENCODER_LAYER,
                NodeKind::Lstm {
                    units: config.hidden_size,
                },
                &[*input],
            )?;
            let attended = graph.apply(
                &format!("{ATTENTION_LAYER}_{branch}"),
                ATTENTION_LAYER,
                NodeKind::Attention {
                    time_steps: config.max_len,
                },
                &[encoded.as_str()],
            )?;
            let flat_name = format!("flatten_{branch}");
            let flat = graph.apply(&flat_name, &flat_name, NodeKind::Flatten, &[attended.as_str()])?;
            flattened.push(flat);
        }

        let mut scores = Vec::with_capacity(BRANCH_HEADS.len());
        for (i, head) in BRANCH_HEADS.iter().enumerate() {
            let diff_name = format!("subtract_{}", i + 1);
            let diff = graph.apply(
                &diff_name,
                &diff_name,
                NodeKind::Subtract,
                &[flattened[0].as_str(), flattened[i + 1].as_str()],
            )?;
            scores.push(graph.apply(head, head, NodeKind::Dense { units: 1 }, &[diff.as_str()])?);
        }

        let score_refs: Vec<&str> = scores.iter().map(String::as_str).collect();
        let merged = graph.apply("concatenate", "concatenate", NodeKind::Concatenate, &score_refs)?;
        graph.apply(FUSION_HEAD, FUSION_HEAD, NodeKind::Dense { units: 1 }, &[merged.as_str()])?;

        Ok(Self {
            config: config.clone(),
            nodes: graph.nodes,
        })
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Output shape of the final node, `[1]` for a well-formed topology.
    pub fn output_shape(&self) -> Option<&[usize]> {
        self.node(OUTPUT_NODE).map(|n| n.output_shape.as_slice())
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a stored topology and verifies it matches a fresh build from its own config.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let stored: Topology = serde_json::from_str(json)?;
        let rebuilt = Self::build(&stored.config)?;
        if rebuilt.nodes != stored.nodes {
            return Err(ModelError::TopologyMismatch {
                reason: format!(
                    "stored graph has {} nodes, expected {} for max_len={} embedding_dim={}",
                    stored.nodes.len(),
                    rebuilt.nodes.len(),
                    stored.config.max_len,
                    stored.config.embedding_dim
                ),
            });
        }
        Ok(rebuilt)
    }
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<GraphNode>,
}

impl GraphBuilder {
    fn input(&mut self, name: &str, shape: Vec<usize>) {
        self.nodes.push(GraphNode {
            name: name.to_string(),
            layer: name.to_string(),
            kind: NodeKind::Input,
            inputs: Vec::new(),
            output_shape: shape,
        });
    }

    fn shape_of(&self, node: &str, input: &str) -> Result<&[usize], ModelError> {
        self.nodes
            .iter()
            .find(|n| n.name == input)
            .map(|n| n.output_shape.as_slice())
            .ok_or_else(|| ModelError::UnknownInput {
                node: node.to_string(),
                input: input.to_string(),
            })
    }

    /// Appends a node and returns its name. Fails if an input is unknown or its shape
    /// does not fit `kind`.
    fn apply(
        &mut self,
        name: &str,
        layer: &str,
        kind: NodeKind,
        inputs: &[&str],
    ) -> Result<String, ModelError> {
        let shapes = inputs
            .iter()
            .map(|input| self.shape_of(name, input).map(<[usize]>::to_vec))
            .collect::<Result<Vec<_>, _>>()?;
        let output_shape = infer_shape(name, kind, &shapes)?;

        self.nodes.push(GraphNode {
            name: name.to_string(),
            layer: layer.to_string(),
            kind,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output_shape,
        });
        Ok(name.to_string())
    }
}

fn mismatch(node: &str, expected: Vec<usize>, actual: &[usize]) -> ModelError {
    ModelError::ShapeMismatch {
        node: node.to_string(),
        expected,
        actual: actual.to_vec(),
    }
}

fn single<'a>(node: &str, shapes: &'a [Vec<usize>]) -> Result<&'a [usize], ModelError> {
    match shapes {
        [shape] => Ok(shape),
        _ => Err(ModelError::InvalidConfig {
            reason: format!("node '{node}' takes one input, got {}", shapes.len()),
        }),
    }
}

fn infer_shape(node: &str, kind: NodeKind, shapes: &[Vec<usize>]) -> Result<Vec<usize>, ModelError> {
    match kind {
        NodeKind::Input => Err(ModelError::InvalidConfig {
            reason: format!("input node '{node}' cannot be applied to other nodes"),
        }),
        NodeKind::Lstm { units } => match single(node, shapes)? {
            [steps, _features] => Ok(vec![*steps, units]),
            other => Err(mismatch(node, vec![0, 0], other)),
        },
        NodeKind::Attention { time_steps } => match single(node, shapes)? {
            [steps, hidden] if *steps == time_steps => Ok(vec![*steps, *hidden]),
            [_, hidden] => Err(mismatch(node, vec![time_steps, *hidden], &shapes[0])),
            other => Err(mismatch(node, vec![time_steps, 0], other)),
        },
        NodeKind::Flatten => Ok(vec![single(node, shapes)?.iter().product()]),
        NodeKind::Subtract => match shapes {
            [a, b] if a == b => Ok(a.clone()),
            [a, b] => Err(mismatch(node, a.clone(), b)),
            _ => Err(ModelError::InvalidConfig {
                reason: format!("node '{node}' takes two inputs, got {}", shapes.len()),
            }),
        },
        NodeKind::Dense { units } => match single(node, shapes)? {
            [_features] => Ok(vec![units]),
            other => Err(mismatch(node, vec![0], other)),
        },
        NodeKind::Concatenate => {
            let mut width = 0;
            for shape in shapes {
                match shape.as_slice() {
                    [w] => width += w,
                    other => return Err(mismatch(node, vec![0], other)),
                }
            }
            Ok(vec![width])
        }
    }
}
