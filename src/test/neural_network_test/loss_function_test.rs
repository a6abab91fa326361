use super::*;

#[test]
fn test_mse_loss_and_gradient() {
    let mse = MeanSquaredError::new(4).unwrap();
    let output: Tensor = array![0.5, 0.0, 1.0, -2.0];
    let expected: Tensor = array![0.0, 0.0, 1.0, 1.0];

    let (gradient, loss) = mse.compute_cost(&output, &expected, 1.0).unwrap();

    // (0.25 + 0 + 0 + 9) / 4
    assert_relative_eq!(loss, 2.3125, epsilon = 1e-6);
    let diff = &output - &expected;
    assert_vec_close(&gradient, &(diff * 2.0 / 4.0), 1e-6);
    assert_vec_close(&gradient, &array![0.25, 0.0, 0.0, -1.5], 1e-6);
}

#[test]
fn test_mse_learning_rate_only_scales_loss() {
    let mse = MeanSquaredError::new(2).unwrap();
    let output: Tensor = array![1.0, 3.0];
    let expected: Tensor = array![0.0, 1.0];

    let (grad_a, loss_a) = mse.compute_cost(&output, &expected, 1.0).unwrap();
    let (grad_b, loss_b) = mse.compute_cost(&output, &expected, 0.01).unwrap();

    assert_eq!(grad_a, grad_b);
    assert_relative_eq!(loss_a, 2.5, epsilon = 1e-6);
    assert_relative_eq!(loss_b, 0.025, epsilon = 1e-6);
}

#[test]
fn test_mse_perfect_prediction() {
    let mse = MeanSquaredError::new(3).unwrap();
    let target: Tensor = array![0.0, 1.0, 0.0];

    let (gradient, loss) = mse.compute_cost(&target, &target, 0.5).unwrap();

    assert_eq!(loss, 0.0);
    assert_eq!(gradient, Tensor::zeros(3));
}

#[test]
fn test_mse_rejects_bad_learning_rate() {
    let mse = MeanSquaredError::new(2).unwrap();
    let v: Tensor = array![1.0, 2.0];

    for lr in [0.0_f32, -0.01, f32::NAN] {
        assert!(matches!(
            mse.compute_cost(&v, &v, lr),
            Err(ModelError::ConfigurationError(_))
        ));
    }
}

#[test]
fn test_mse_rejects_wrong_lengths() {
    let mse = MeanSquaredError::new(3).unwrap();
    let right: Tensor = array![1.0, 2.0, 3.0];
    let wrong: Tensor = array![1.0, 2.0];

    assert!(matches!(
        mse.compute_cost(&wrong, &right, 0.1),
        Err(ModelError::ConfigurationError(_))
    ));
    assert!(matches!(
        mse.compute_cost(&right, &wrong, 0.1),
        Err(ModelError::ConfigurationError(_))
    ));
    assert!(matches!(
        MeanSquaredError::new(0),
        Err(ModelError::ConfigurationError(_))
    ));
}
