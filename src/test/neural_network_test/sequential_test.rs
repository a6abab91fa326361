use super::*;
use crate::dataset::{
    BatchSource, DataPair, IMAGE_SIZE, InMemoryDataset, MnistImage, NUM_CLASSES,
};

fn dense_layer(input: usize, output: usize) -> Box<dyn Layer> {
    Box::new(Dense::from_parameters(Array2::ones((output, input)), None).unwrap())
}

/// A digit that lights a block of 20 pixels chosen by its label
fn labeled_pair(label: usize) -> DataPair {
    let lit = label * 20..(label + 1) * 20;
    let pixels = (0..IMAGE_SIZE)
        .map(|i| if lit.contains(&i) { 255 } else { 0 })
        .collect();
    DataPair::new(label, MnistImage::new(pixels).unwrap())
}

fn linear_network(seed: u64) -> Sequential {
    Sequential::builder()
        .add(Dense::seeded(IMAGE_SIZE, NUM_CLASSES, seed).unwrap())
        .add(Softmax::new(NUM_CLASSES).unwrap())
        .compile(MeanSquaredError::new(NUM_CLASSES).unwrap(), 0.01)
        .unwrap()
}

fn digit_network(seed: u64) -> Sequential {
    Sequential::builder()
        .add(Dense::seeded(IMAGE_SIZE, 16, seed).unwrap())
        .add(ReLU::new(16).unwrap())
        .add(Dense::seeded(16, NUM_CLASSES, seed + 1).unwrap())
        .add(ReLU::new(NUM_CLASSES).unwrap())
        .add(Softmax::new(NUM_CLASSES).unwrap())
        .compile(MeanSquaredError::new(NUM_CLASSES).unwrap(), 0.01)
        .unwrap()
}

#[test]
fn test_check_layer_connection() {
    let connected = vec![dense_layer(3, 5), dense_layer(5, 1)];
    assert!(check_layer_connection(&connected).is_ok());

    let broken = vec![dense_layer(3, 4), dense_layer(5, 1)];
    match check_layer_connection(&broken) {
        Err(ModelError::ConfigurationError(msg)) => {
            assert!(msg.contains("layer 0"));
            assert!(msg.contains("layer 1"));
        }
        other => panic!("expected a configuration error, got {:?}", other.err()),
    }

    assert!(matches!(
        check_layer_connection(&[]),
        Err(ModelError::ConfigurationError(_))
    ));
}

#[test]
fn test_sequential_construction_errors() {
    let mse = || Box::new(MeanSquaredError::new(1).unwrap()) as Box<dyn CostFunction>;

    assert!(matches!(
        Sequential::new(Vec::new(), mse(), 0.01),
        Err(ModelError::ConfigurationError(_))
    ));
    assert!(matches!(
        Sequential::new(vec![dense_layer(3, 4), dense_layer(5, 1)], mse(), 0.01),
        Err(ModelError::ConfigurationError(_))
    ));
    for lr in [0.0_f32, -1.0, f32::NAN, f32::INFINITY] {
        assert!(matches!(
            Sequential::new(vec![dense_layer(3, 1)], mse(), lr),
            Err(ModelError::ConfigurationError(_))
        ));
    }
    // Cost size must match the final layer
    assert!(matches!(
        Sequential::new(
            vec![dense_layer(3, 2)],
            Box::new(MeanSquaredError::new(3).unwrap()),
            0.01
        ),
        Err(ModelError::ConfigurationError(_))
    ));
}

#[test]
fn test_sequential_accessors() {
    let network = digit_network(3);

    assert_eq!(network.layers().len(), 5);
    assert_eq!(network.input_size(), IMAGE_SIZE);
    assert_eq!(network.output_size(), NUM_CLASSES);
    assert_eq!(network.cost().cost_type(), "MeanSquaredError");
    assert_relative_eq!(network.learning_rate(), 0.01);
    assert!(network.check_connection().is_ok());
}

#[test]
fn test_sequential_compute_chains_layers() {
    let mut network = Sequential::builder()
        .add(Dense::from_parameters(array![[1.0, -1.0], [2.0, 0.5]], None).unwrap())
        .add(ReLU::new(2).unwrap())
        .compile(MeanSquaredError::new(2).unwrap(), 0.1)
        .unwrap();

    let output = network.compute(&array![1.0, 3.0]).unwrap();

    // [1 - 3, 2 + 1.5] through ReLU
    assert_vec_close(&output, &array![0.0, 3.5], 1e-6);
    assert_eq!(network.predict(&array![1.0, 3.0]).unwrap(), 1);
    assert!(network.layers().iter().all(|l| l.is_forwarded()));
}

#[test]
fn test_sequential_compute_shape_mismatch() {
    let mut network = digit_network(1);

    assert!(matches!(
        network.compute(&Tensor::zeros(IMAGE_SIZE - 1)),
        Err(ModelError::ShapeMismatch(_))
    ));
}

#[test]
fn test_digit_network_outputs_distribution() {
    let mut network = digit_network(11);

    let output = network.compute(&labeled_pair(4).input()).unwrap();

    assert_eq!(output.len(), NUM_CLASSES);
    assert_relative_eq!(output.sum(), 1.0, epsilon = 1e-5);
    assert!(output.iter().all(|&p| p >= 0.0));
}

#[test]
fn test_train_batch_reduces_loss() {
    let mut network = linear_network(5);
    let batch: Vec<DataPair> = (0..4).map(labeled_pair).collect();

    let first = network.train_batch(&batch).unwrap();
    let mut last = first;
    for _ in 0..200 {
        last = network.train_batch(&batch).unwrap();
    }

    assert!(first > 0.0);
    assert!(last < first, "loss did not decrease: {} -> {}", first, last);
    for pair in &batch {
        assert_eq!(network.predict(&pair.input()).unwrap(), pair.label);
    }
    assert_eq!(network.train_batch(&[]).unwrap(), 0.0);
}

#[test]
fn test_train_batch_rejects_out_of_range_label() {
    let mut network = digit_network(2);
    let mut pair = labeled_pair(1);
    pair.label = NUM_CLASSES;

    assert!(matches!(
        network.train_batch(&[pair]),
        Err(ModelError::ShapeMismatch(_))
    ));
}

#[test]
fn test_failed_batch_leaves_no_pending_gradients() {
    let build = || {
        Sequential::builder()
            .add(
                Dense::from_parameters(Array2::zeros((NUM_CLASSES, IMAGE_SIZE)), None)
                    .unwrap()
                    .with_update_scheme(UpdateScheme::BatchAveraged),
            )
            .compile(MeanSquaredError::new(NUM_CLASSES).unwrap(), 0.01)
            .unwrap()
    };
    let good = labeled_pair(3);
    let mut bad = labeled_pair(5);
    bad.label = NUM_CLASSES;

    let mut interrupted = build();
    assert!(interrupted.train_batch(&[good.clone(), bad]).is_err());
    let interrupted_loss = interrupted.train_batch(std::slice::from_ref(&good)).unwrap();

    let mut clean = build();
    let clean_loss = clean.train_batch(std::slice::from_ref(&good)).unwrap();

    assert_eq!(interrupted_loss, clean_loss);
    assert_eq!(interrupted.to_serializable(), clean.to_serializable());
}

#[test]
fn test_train_one_epoch_is_mean_of_batch_losses() {
    let pairs: Vec<DataPair> = (0..7).map(|i| labeled_pair(i % NUM_CLASSES)).collect();

    let mut by_epoch = digit_network(9);
    let mut data = InMemoryDataset::new(pairs.clone(), 3).unwrap();
    let epoch_loss = by_epoch.train_one_epoch(&mut data).unwrap();

    let mut by_batch = digit_network(9);
    let losses: Vec<f32> = pairs
        .chunks(3)
        .map(|chunk| by_batch.train_batch(chunk).unwrap())
        .collect();
    let expected = losses.iter().sum::<f32>() / losses.len() as f32;

    assert_eq!(losses.len(), 3);
    assert_relative_eq!(epoch_loss, expected, epsilon = 1e-7);

    // The source is exhausted until reset
    assert_eq!(by_epoch.train_one_epoch(&mut data).unwrap(), 0.0);
    assert_eq!(by_epoch.evaluate(&mut data).unwrap(), 0.0);

    data.reset();
    assert_eq!(data.next_batch().len(), 3);
}

#[test]
fn test_evaluate_counts_correct_predictions() {
    // Two outputs: the first weight row reads pixel 0, the second reads pixel 1
    let mut weights = Array2::<f32>::zeros((2, IMAGE_SIZE));
    weights[[0, 0]] = 1.0;
    weights[[1, 1]] = 1.0;
    let mut network = Sequential::builder()
        .add(Dense::from_parameters(weights, None).unwrap())
        .compile(MeanSquaredError::new(2).unwrap(), 0.01)
        .unwrap();

    let image = |first: i64, second: i64| {
        let mut pixels = vec![0i64; IMAGE_SIZE];
        pixels[0] = first;
        pixels[1] = second;
        MnistImage::new(pixels).unwrap()
    };
    let pairs = vec![
        DataPair::new(0, image(200, 10)),
        DataPair::new(1, image(5, 90)),
        DataPair::new(1, image(255, 0)),
        DataPair::new(0, image(30, 20)),
    ];
    let mut data = InMemoryDataset::new(pairs, 3).unwrap();

    assert_relative_eq!(network.evaluate(&mut data).unwrap(), 0.75);
}

#[test]
fn test_one_hot_and_argmax() {
    assert_eq!(one_hot(3, 5).unwrap(), array![0.0_f32, 0.0, 0.0, 1.0, 0.0]);
    assert!(matches!(one_hot(5, 5), Err(ModelError::ShapeMismatch(_))));

    assert_eq!(argmax(&array![0.1, 0.7, 0.2]), Some(1));
    assert_eq!(argmax(&array![0.5, 0.2, 0.5]), Some(0));
    assert_eq!(argmax(&Tensor::zeros(0)), None);
}
