use candle_core::backprop::GradStore;
use candle_core::{Result, Tensor, Var};
use candle_nn::{AdamW, Optimizer, ParamsAdamW};

use crate::constants::EPSILON;

use super::config::OptimizerKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamsAdadelta {
    pub lr: f64,
    pub rho: f64,
    pub eps: f64,
}

impl Default for ParamsAdadelta {
    fn default() -> Self {
        Self {
            lr: 1.0,
            rho: 0.95,
            eps: EPSILON,
        }
    }
}

#[derive(Debug)]
struct AdadeltaVar {
    var: Var,
    grad_sq: Var,
    update_sq: Var,
}

/// Adadelta: per-parameter step sizes from running averages of squared gradients and
/// squared updates.
#[derive(Debug)]
pub struct Adadelta {
    vars: Vec<AdadeltaVar>,
    params: ParamsAdadelta,
}

impl Optimizer for Adadelta {
    type Config = ParamsAdadelta;

    fn new(vars: Vec<Var>, params: ParamsAdadelta) -> Result<Self> {
        let vars = vars
            .into_iter()
            .filter(|var| var.dtype().is_float())
            .map(|var| {
                let grad_sq = Var::zeros(var.shape(), var.dtype(), var.device())?;
                let update_sq = Var::zeros(var.shape(), var.dtype(), var.device())?;
                Ok(AdadeltaVar {
                    var,
                    grad_sq,
                    update_sq,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { vars, params })
    }

    fn learning_rate(&self) -> f64 {
        self.params.lr
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.params.lr = lr;
    }

    fn step(&mut self, grads: &GradStore) -> Result<()> {
        let ParamsAdadelta { lr, rho, eps } = self.params;
        for state in &self.vars {
            let theta = state.var.as_tensor();
            let Some(g) = grads.get(theta) else {
                continue;
            };

            let grad_sq = state
                .grad_sq
                .as_tensor()
                .affine(rho, 0.0)?
                .add(&g.sqr()?.affine(1.0 - rho, 0.0)?)?;
            let update = state
                .update_sq
                .as_tensor()
                .affine(1.0, eps)?
                .sqrt()?
                .div(&grad_sq.affine(1.0, eps)?.sqrt()?)?
                .mul(g)?;
            let update_sq = state
                .update_sq
                .as_tensor()
                .affine(rho, 0.0)?
                .add(&update.sqr()?.affine(1.0 - rho, 0.0)?)?;

            state.var.set(&theta.sub(&update.affine(lr, 0.0)?)?)?;
            state.grad_sq.set(&grad_sq)?;
            state.update_sq.set(&update_sq)?;
        }
        Ok(())
    }
}

/// The optimizer selected by [`OptimizerKind`].
pub enum ModelOptimizer {
    Adadelta(Adadelta),
    AdamW(AdamW),
}

impl ModelOptimizer {
    pub fn new(kind: OptimizerKind, learning_rate: f64, vars: Vec<Var>) -> Result<Self> {
        match kind {
            OptimizerKind::Adadelta => Ok(Self::Adadelta(Adadelta::new(
                vars,
                ParamsAdadelta {
                    lr: learning_rate,
                    ..Default::default()
                },
            )?)),
            OptimizerKind::AdamW => Ok(Self::AdamW(AdamW::new(
                vars,
                ParamsAdamW {
                    lr: learning_rate,
                    ..Default::default()
                },
            )?)),
        }
    }

    pub fn kind(&self) -> OptimizerKind {
        match self {
            Self::Adadelta(_) => OptimizerKind::Adadelta,
            Self::AdamW(_) => OptimizerKind::AdamW,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        match self {
            Self::Adadelta(opt) => opt.learning_rate(),
            Self::AdamW(opt) => opt.learning_rate(),
        }
    }

    /// Backpropagates `loss` and applies one update.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::Adadelta(opt) => opt.backward_step(loss),
            Self::AdamW(opt) => opt.backward_step(loss),
        }
    }
}
