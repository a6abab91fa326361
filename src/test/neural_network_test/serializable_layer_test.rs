use super::*;
use crate::IoError;

#[test]
fn test_dense_snapshot_rebuilds_same_layer() {
    let original = Dense::seeded(4, 3, 17)
        .unwrap()
        .with_update_scheme(UpdateScheme::BatchAveraged);
    let input: Tensor = array![0.1, -0.4, 0.9, 2.0];

    let mut rebuilt = original.to_serializable().into_layer().unwrap();
    let mut original = original;

    assert_eq!(rebuilt.layer_type(), "Dense");
    assert_eq!(rebuilt.param_count(), 15);
    assert!(!rebuilt.is_forwarded());
    assert_eq!(
        rebuilt.forward(&input).unwrap(),
        original.forward(&input).unwrap()
    );
    match rebuilt.to_serializable() {
        SerializableLayer::Dense(dense) => {
            assert_eq!(dense.update_scheme, UpdateScheme::BatchAveraged);
            assert_eq!(dense.weights.len(), 3);
            assert_eq!(dense.weights[0].len(), 4);
        }
        other => panic!("expected a dense snapshot, got {:?}", other),
    }
}

#[test]
fn test_activation_snapshots() {
    let relu = ReLU::new(6).unwrap().to_serializable();
    let softmax = Softmax::new(4).unwrap().to_serializable();

    assert_eq!(relu, SerializableLayer::ReLU { size: 6 });
    assert_eq!(softmax, SerializableLayer::Softmax { size: 4 });

    let json = serde_json::to_string(&relu).unwrap();
    assert_eq!(json, r#"{"type":"ReLU","size":6}"#);
    let parsed: SerializableLayer = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.into_layer().unwrap().output_size(), 6);
}

#[test]
fn test_snapshot_reports_non_finite_parameters() {
    let finite = Dense::seeded(3, 2, 4).unwrap().to_serializable();
    let nan_weight = Dense::from_parameters(array![[f32::NAN, 0.0]], None)
        .unwrap()
        .to_serializable();
    let bias: Tensor = array![f32::NEG_INFINITY];
    let infinite_bias = Dense::from_parameters(array![[1.0, 0.0]], Some(bias))
        .unwrap()
        .to_serializable();

    assert!(finite.has_finite_parameters());
    assert!(!nan_weight.has_finite_parameters());
    assert!(!infinite_bias.has_finite_parameters());
    assert!(SerializableLayer::Softmax { size: 2 }.has_finite_parameters());
}

#[test]
fn test_dense_snapshot_with_ragged_weights_is_rejected() {
    let snapshot = SerializableLayer::Dense(SerializableDenseLayer {
        input_size: 2,
        output_size: 2,
        weights: vec![vec![1.0, 2.0], vec![3.0]],
        bias: None,
        update_scheme: UpdateScheme::PerExample,
    });

    assert!(matches!(snapshot.into_layer(), Err(IoError::FormatError(_))));
}

#[test]
fn test_dense_snapshot_with_wrong_bias_is_rejected() {
    let snapshot = SerializableLayer::Dense(SerializableDenseLayer {
        input_size: 1,
        output_size: 2,
        weights: vec![vec![1.0], vec![2.0]],
        bias: Some(vec![0.0, 0.0, 0.0]),
        update_scheme: UpdateScheme::PerExample,
    });

    assert!(matches!(
        snapshot.into_layer(),
        Err(IoError::Model(ModelError::ShapeMismatch(_)))
    ));
}

#[test]
fn test_zero_sized_snapshot_is_rejected() {
    let snapshot = SerializableLayer::ReLU { size: 0 };

    assert!(matches!(
        snapshot.into_layer(),
        Err(IoError::Model(ModelError::ConfigurationError(_)))
    ));
}

#[test]
fn test_update_scheme_defaults_when_missing() {
    let json = r#"{
        "type": "Dense",
        "input_size": 1,
        "output_size": 1,
        "weights": [[0.5]],
        "bias": null
    }"#;

    let parsed: SerializableLayer = serde_json::from_str(json).unwrap();

    match parsed {
        SerializableLayer::Dense(dense) => {
            assert_eq!(dense.update_scheme, UpdateScheme::PerExample)
        }
        other => panic!("expected a dense snapshot, got {:?}", other),
    }
}

#[test]
fn test_sequential_snapshot_round_trip() {
    let mut network = Sequential::builder()
        .add(Dense::seeded(5, 4, 1).unwrap())
        .add(ReLU::new(4).unwrap())
        .add(Dense::seeded(4, 3, 2).unwrap().without_bias())
        .add(Softmax::new(3).unwrap())
        .compile(MeanSquaredError::new(3).unwrap(), 0.05)
        .unwrap();

    let snapshot = network.to_serializable();
    assert_eq!(snapshot.cost, SerializableCost::MeanSquaredError { size: 3 });

    let mut restored = Sequential::from_serializable(snapshot.clone()).unwrap();
    assert_eq!(restored.to_serializable(), snapshot);

    let input: Tensor = array![1.0, 0.5, -0.5, 0.25, 2.0];
    assert_eq!(
        restored.compute(&input).unwrap(),
        network.compute(&input).unwrap()
    );
}

#[test]
fn test_sequential_snapshot_with_broken_chain_is_rejected() {
    let snapshot = SerializableSequential {
        learning_rate: 0.01,
        cost: SerializableCost::MeanSquaredError { size: 3 },
        layers: vec![
            SerializableLayer::ReLU { size: 4 },
            SerializableLayer::Softmax { size: 3 },
        ],
    };

    assert!(matches!(
        Sequential::from_serializable(snapshot),
        Err(IoError::FormatError(_))
    ));
}
