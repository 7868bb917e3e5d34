//! Siamese model properties observable through the public API.

use candle_core::{DType, Device, Tensor};

use asag::model::{SiameseConfig, SiameseInputs, SiameseModel};
use asag::training::binary_cross_entropy;

fn input(batch: usize, config: &SiameseConfig, offset: f32) -> Tensor {
    let n = batch * config.max_len * config.embedding_dim;
    let values: Vec<f32> = (0..n).map(|i| (i as f32 * 0.37 + offset).sin()).collect();
    Tensor::from_vec(values, (batch, config.max_len, config.embedding_dim), &Device::Cpu).unwrap()
}

#[test]
fn test_duplicate_branch_gives_zero_difference_wherever_placed() {
    let config = SiameseConfig::new(5, 4);
    let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
    let anchor = input(2, &config, 0.0);
    let other = input(2, &config, 1.5);

    let placements = [
        SiameseInputs::new(&anchor, &anchor, &other, &other),
        SiameseInputs::new(&anchor, &other, &anchor, &other),
        SiameseInputs::new(&anchor, &other, &other, &anchor),
    ];

    for (branch, inputs) in placements.iter().enumerate() {
        let diffs = model.branch_differences(inputs).unwrap();
        let zero = diffs[branch]
            .abs()
            .unwrap()
            .sum_all()
            .unwrap()
            .to_scalar::<f32>()
            .unwrap();
        assert_eq!(zero, 0.0, "branch {branch}");
    }
}

#[test]
fn test_forward_is_deterministic() {
    let config = SiameseConfig::new(3, 4);
    let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
    let a = input(3, &config, 0.0);
    let b = input(3, &config, 0.7);
    let inputs = SiameseInputs::new(&a, &b, &b, &a);

    assert_eq!(model.predict(&inputs).unwrap(), model.predict(&inputs).unwrap());
}

#[test]
fn test_all_padding_rows_still_score() {
    let config = SiameseConfig::new(4, 3);
    let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
    let zeros = Tensor::zeros((1, 4, 3), DType::F32, &Device::Cpu).unwrap();

    let p = model
        .predict(&SiameseInputs::new(&zeros, &zeros, &zeros, &zeros))
        .unwrap();
    assert_eq!(p.len(), 1);
    assert!((0.0..=1.0).contains(&p[0]));
}

#[test]
fn test_shared_encoder_receives_gradient_from_every_branch() {
    let config = SiameseConfig::new(3, 2);
    let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
    let live = input(2, &config, 0.3);
    let zeros = Tensor::zeros((2, 3, 2), DType::F32, &Device::Cpu).unwrap();
    let labels = Tensor::new(&[[1.0f32], [0.0]], &Device::Cpu).unwrap();

    // zero inputs contribute nothing to the input-kernel gradient, so each run isolates
    // the contribution of one branch
    for branch in 0..4 {
        let mut slots = [&zeros, &zeros, &zeros, &zeros];
        slots[branch] = &live;
        let inputs = SiameseInputs::new(slots[0], slots[1], slots[2], slots[3]);

        let probs = model.forward(&inputs).unwrap();
        let loss = binary_cross_entropy(&probs, &labels).unwrap();
        let grads = loss.backward().unwrap();

        let kernel_grad = grads
            .get(model.encoder_kernel())
            .expect("encoder kernel gradient");
        assert_eq!(kernel_grad.dims(), model.encoder_kernel().dims());
        let magnitude = kernel_grad
            .abs()
            .unwrap()
            .sum_all()
            .unwrap()
            .to_scalar::<f32>()
            .unwrap();
        assert!(magnitude > 0.0, "branch {branch} sent no gradient to the encoder");
    }

    // one shared parameter set, not one per branch
    let names: Vec<String> = model.varmap().data().lock().unwrap().keys().cloned().collect();
    let kernels: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| n.ends_with("weight_ih_l0"))
        .collect();
    assert_eq!(kernels, vec!["encoder.weight_ih_l0"]);
    assert_eq!(model.trainable_vars().len(), 14);
}

#[test]
fn test_mismatched_length_is_rejected() {
    let config = SiameseConfig::new(4, 3);
    let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
    let good = input(1, &config, 0.0);
    let long = Tensor::zeros((1, 6, 3), DType::F32, &Device::Cpu).unwrap();

    assert!(model.forward(&SiameseInputs::new(&long, &good, &good, &good)).is_err());
}
