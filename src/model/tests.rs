use super::*;
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{VarBuilder, VarMap};

fn small_config() -> SiameseConfig {
    SiameseConfig::new(4, 6)
}

fn random_input(batch: usize, config: &SiameseConfig) -> Tensor {
    Tensor::randn(
        0f32,
        1.0,
        (batch, config.max_len, config.embedding_dim),
        &Device::Cpu,
    )
    .unwrap()
}

mod config_tests {
    use super::*;

    #[test]
    fn test_hidden_size_defaults_to_max_len() {
        let config = SiameseConfig::new(7, 300);
        assert_eq!(config.hidden_size, 7);
        assert_eq!(config.flattened_len(), 49);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(SiameseConfig::new(0, 300).validate().is_err());
        assert!(SiameseConfig::new(5, 0).validate().is_err());
        assert!(SiameseConfig::new(5, 3).with_hidden_size(0).validate().is_err());
    }

    #[test]
    fn test_negative_penalty_rejected() {
        let config = SiameseConfig::new(5, 3).with_l2_penalty(-0.1);
        assert!(matches!(
            config.validate(),
            Err(ModelError::InvalidConfig { .. })
        ));
    }
}

mod topology_tests {
    use super::*;

    #[test]
    fn test_node_inventory() {
        let topology = Topology::build(&small_config()).unwrap();
        assert_eq!(topology.nodes.len(), 24);

        let encoders = topology
            .nodes
            .iter()
            .filter(|n| n.layer == "encoder")
            .count();
        assert_eq!(encoders, 4);

        for name in ["similarity_layer1", "similarity_layer2", "similarity_layer3"] {
            assert_eq!(topology.node(name).unwrap().output_shape, vec![1]);
        }
        assert_eq!(topology.output_shape(), Some(&[1usize][..]));
    }

    #[test]
    fn test_shapes_propagate() {
        let config = SiameseConfig::new(5, 8).with_hidden_size(3);
        let topology = Topology::build(&config).unwrap();

        assert_eq!(topology.node("input_2").unwrap().output_shape, vec![5, 8]);
        assert_eq!(topology.node("encoder_2").unwrap().output_shape, vec![5, 3]);
        assert_eq!(topology.node("attention_2").unwrap().output_shape, vec![5, 3]);
        assert_eq!(topology.node("flatten_2").unwrap().output_shape, vec![15]);
        assert_eq!(topology.node("subtract_3").unwrap().output_shape, vec![15]);
        assert_eq!(topology.node("concatenate").unwrap().output_shape, vec![3]);
    }

    #[test]
    fn test_subtract_inputs_are_anchor_and_branch() {
        let topology = Topology::build(&small_config()).unwrap();
        let node = topology.node("subtract_2").unwrap();
        assert_eq!(node.inputs, vec!["flatten_1", "flatten_3"]);
        assert_eq!(node.kind, NodeKind::Subtract);
    }

    #[test]
    fn test_json_round_trip() {
        let topology = Topology::build(&small_config()).unwrap();
        let json = topology.to_json().unwrap();
        assert_eq!(Topology::from_json(&json).unwrap(), topology);
    }

    #[test]
    fn test_tampered_json_rejected() {
        let mut topology = Topology::build(&small_config()).unwrap();
        topology.nodes.pop();
        let json = topology.to_json().unwrap();
        assert!(matches!(
            Topology::from_json(&json),
            Err(ModelError::TopologyMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_config_fails_build() {
        assert!(Topology::build(&SiameseConfig::new(0, 4)).is_err());
    }
}

mod attention_tests {
    use super::*;

    fn block(time_steps: usize) -> AttentionBlock {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        AttentionBlock::new(time_steps, vb).unwrap()
    }

    #[test]
    fn test_output_shape_matches_input() {
        let attention = block(4);
        let xs = Tensor::randn(0f32, 1.0, (2, 4, 3), &Device::Cpu).unwrap();
        assert_eq!(attention.forward(&xs).unwrap().dims(), &[2, 4, 3]);
    }

    #[test]
    fn test_weights_sum_to_one_over_time() {
        let attention = block(5);
        let xs = Tensor::randn(0f32, 1.0, (3, 5, 2), &Device::Cpu).unwrap();
        let sums = attention
            .weights(&xs)
            .unwrap()
            .sum(1)
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1::<f32>()
            .unwrap();
        assert_eq!(sums.len(), 6);
        for s in sums {
            assert!((s - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_wrong_time_steps_rejected() {
        let attention = block(4);
        let xs = Tensor::zeros((1, 3, 2), DType::F32, &Device::Cpu).unwrap();
        assert!(attention.forward(&xs).is_err());
    }
}

mod siamese_tests {
    use super::*;

    #[test]
    fn test_forward_produces_probabilities() {
        let config = small_config();
        let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
        let (a, b, c, d) = (
            random_input(3, &config),
            random_input(3, &config),
            random_input(3, &config),
            random_input(3, &config),
        );

        let out = model.forward(&SiameseInputs::new(&a, &b, &c, &d)).unwrap();
        assert_eq!(out.dims(), &[3, 1]);

        let probs = model.predict(&SiameseInputs::new(&a, &b, &c, &d)).unwrap();
        assert_eq!(probs.len(), 3);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_identical_branches_have_zero_difference() {
        let config = small_config();
        let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
        let x = random_input(2, &config);
        let other = random_input(2, &config);

        let diffs = model
            .branch_differences(&SiameseInputs::new(&x, &x, &other, &x))
            .unwrap();

        for (i, diff) in diffs.iter().enumerate() {
            assert_eq!(diff.dims(), &[2, config.flattened_len()]);
            let max = diff.abs().unwrap().max_all().unwrap().to_scalar::<f32>().unwrap();
            if i == 1 {
                assert!(max > 0.0);
            } else {
                assert_eq!(max, 0.0);
            }
        }
    }

    #[test]
    fn test_branch_scores_shape() {
        let config = small_config();
        let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
        let x = random_input(2, &config);
        let scores = model
            .branch_scores(&SiameseInputs::new(&x, &x, &x, &x))
            .unwrap();
        assert_eq!(scores.dims(), &[2, 3]);
    }

    #[test]
    fn test_shape_mismatch_names_input() {
        let config = small_config();
        let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
        let good = random_input(2, &config);
        let short = Tensor::zeros((2, 3, config.embedding_dim), DType::F32, &Device::Cpu).unwrap();

        let err = model
            .forward(&SiameseInputs::new(&good, &good, &short, &good))
            .unwrap_err();
        match err {
            ModelError::ShapeMismatch { node, actual, .. } => {
                assert_eq!(node, "input_3");
                assert_eq!(actual, vec![2, 3, config.embedding_dim]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parameter_inventory() {
        let config = small_config();
        let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
        assert_eq!(model.trainable_vars().len(), 14);

        let (l, d, h) = (config.max_len, config.embedding_dim, config.hidden_size);
        let lstm = 4 * h * d + 4 * h * h + 8 * h;
        let attention = l * l + l;
        let heads = 3 * (l * h + 1);
        let fusion = 3 + 1;
        assert_eq!(model.parameter_count(), lstm + attention + heads + fusion);
        assert_eq!(model.encoder_kernel().dims(), &[4 * h, d]);
    }

    #[test]
    fn test_forget_gate_bias_is_one() {
        let config = small_config();
        let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
        let data = model.varmap().data().lock().unwrap();
        let bias = data["encoder.bias_ih_l0"].to_vec1::<f32>().unwrap();
        let h = config.hidden_size;

        assert!(bias[..h].iter().all(|&v| v == 0.0));
        assert!(bias[h..2 * h].iter().all(|&v| v == 1.0));
        assert!(bias[2 * h..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_regularization_scales_with_penalty() {
        let config = small_config().with_l2_penalty(0.0);
        let model = SiameseModel::new(config, &Device::Cpu).unwrap();
        let reg = model.regularization().unwrap().to_scalar::<f32>().unwrap();
        assert_eq!(reg, 0.0);

        let model = SiameseModel::new(small_config(), &Device::Cpu).unwrap();
        let reg = model.regularization().unwrap().to_scalar::<f32>().unwrap();
        let expected = 0.01
            * model
                .encoder_kernel()
                .sqr()
                .unwrap()
                .sum_all()
                .unwrap()
                .to_scalar::<f32>()
                .unwrap();
        assert!((reg - expected).abs() < 1e-5);
    }
}

mod persistence_tests {
    use super::*;

    #[test]
    fn test_save_and_load_reproduce_predictions() {
        let config = small_config();
        let model = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
        let x = random_input(2, &config);
        let y = random_input(2, &config);
        let inputs = SiameseInputs::new(&x, &y, &y, &x);
        let before = model.predict(&inputs).unwrap();

        let dir = tempfile::tempdir().unwrap();
        model.save(dir.path()).unwrap();
        assert!(dir.path().join(TOPOLOGY_FILENAME).exists());
        assert!(dir.path().join(WEIGHTS_FILENAME).exists());

        let restored = SiameseModel::load(dir.path(), &Device::Cpu).unwrap();
        assert_eq!(restored.config(), &config);
        assert_eq!(restored.predict(&inputs).unwrap(), before);
    }

    #[test]
    fn test_load_weights_into_fresh_model() {
        let config = small_config();
        let source = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.safetensors");
        source.save_weights(&path).unwrap();

        let mut target = SiameseModel::new(config.clone(), &Device::Cpu).unwrap();
        target.load_weights(&path).unwrap();

        let x = random_input(1, &config);
        let inputs = SiameseInputs::new(&x, &x, &x, &x);
        assert_eq!(
            target.predict(&inputs).unwrap(),
            source.predict(&inputs).unwrap()
        );
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SiameseModel::load(dir.path().join("absent"), &Device::Cpu),
            Err(ModelError::MissingArtifact { .. })
        ));
    }
}
