//! End-to-end tests: build tensors, compose expressions, materialize them.

use approx::assert_relative_eq;
use ftl_tensor::{
    add, contract, coords_to_linear, label, linear_to_coords, materialize, sub, CoordIter,
    EvalConfig, Label, RangeTarget, Shape, Tensor, TensorError,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn tensor<T: ftl_tensor::Element>(dims: &[usize], data: Vec<T>) -> Tensor<T> {
    Tensor::from_data(Shape::dynamic(dims).unwrap(), data).unwrap()
}

#[test]
fn test_round_trip_every_offset() {
    for dims in [vec![4], vec![3, 3, 3], vec![2, 5, 1, 3], vec![6, 2]] {
        let shape = Shape::dynamic(dims).unwrap();
        for k in 0..shape.size() {
            let coords = linear_to_coords(&shape, k).unwrap();
            assert_eq!(coords_to_linear(&shape, &coords).unwrap(), k);
        }
    }
}

#[test]
fn test_elementwise_laws() {
    init_tracing();
    let shape = Shape::dynamic(vec![4, 3, 2]).unwrap();
    let a = Tensor::<f32>::random_uniform(shape.clone(), -10.0, 10.0).unwrap();
    let b = Tensor::<f32>::random_uniform(shape.clone(), -10.0, 10.0).unwrap();
    let c = Tensor::<f32>::random_uniform(shape, -10.0, 10.0).unwrap();

    let sum = Tensor::from_expression(add(&a, &b).unwrap());
    let diff = Tensor::from_expression(((&a - &b).unwrap() - &c).unwrap());

    for i in 0..a.size() {
        let (x, y, z) = (a.data()[i], b.data()[i], c.data()[i]);
        assert_relative_eq!(sum.get_linear(i).unwrap(), x + y);
        assert_relative_eq!(diff.get_linear(i).unwrap(), (x - y) - z);
    }
}

#[test]
fn test_shape_mismatch_builds_nothing() {
    let a = Tensor::<i32>::new(Shape::fixed([2, 3]).unwrap());
    let b = Tensor::<i32>::new(Shape::fixed([3, 2]).unwrap());
    let err = add(&a, &b).unwrap_err();
    assert!(matches!(err, TensorError::ShapeMismatch { op: "add", .. }));
    assert!(sub(&b, &a).is_err());
    assert!(a.data().iter().chain(b.data()).all(|&v| v == 0));
}

#[test]
fn test_out_of_range_access() {
    let t = Tensor::<f64>::new(Shape::dynamic(vec![3, 3, 3]).unwrap());
    assert_eq!(
        t.get(&[3, 0, 0]).unwrap_err(),
        TensorError::OutOfRange {
            target: RangeTarget::Coordinate { axis: 0 },
            index: 3,
            bound: 3,
        }
    );
    assert!(matches!(
        t.dim_size(3),
        Err(TensorError::OutOfRange {
            target: RangeTarget::Axis,
            ..
        })
    ));
}

#[test]
fn test_matrix_contraction() {
    init_tracing();
    let a = tensor(&[3, 2], vec![1, 2, 3, 4, 5, 6]);
    let b = tensor(&[2, 3], vec![7, 8, 9, 10, 11, 12]);

    let expr = contract(label(&a, ["i", "j"]).unwrap(), label(&b, ["j", "k"]).unwrap()).unwrap();
    assert_eq!(expr.rank(), 2);

    let c = Tensor::from_expression(expr);
    assert_eq!(c.shape().dims(), &[3, 3]);
    assert_eq!(c.data(), &[39, 54, 69, 49, 68, 87, 59, 82, 105]);
}

#[test]
fn test_matrix_contraction_f32() {
    let a = tensor(&[3, 2], vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let b = tensor(&[2, 3], vec![7.0f32, 8.0, 9.0, 10.0, 11.0, 12.0]);
    let c = Tensor::from_expression(
        contract(a.labeled(["i", "j"]).unwrap(), b.labeled(["j", "k"]).unwrap()).unwrap(),
    );
    let expected = [39.0, 54.0, 69.0, 49.0, 68.0, 87.0, 59.0, 82.0, 105.0];
    for (got, want) in c.data().iter().zip(expected) {
        assert_relative_eq!(*got, want);
    }
}

#[test]
fn test_matrix_against_stack_of_matrices() {
    // m: [2, 3] labelled (i, j); stack: [3, 2, 4] labelled (j, k, s).
    let m = tensor(&[2, 3], (1..=6).collect::<Vec<i64>>());
    let stack = tensor(&[3, 2, 4], (1..=24).collect::<Vec<i64>>());
    let c = Tensor::from_expression(
        contract(m.labeled(["i", "j"]).unwrap(), stack.labeled(["j", "k", "s"]).unwrap())
            .unwrap(),
    );
    assert_eq!(c.shape().dims(), &[2, 2, 4]);

    for coords in CoordIter::new(c.shape()) {
        let (i, k, s) = (coords[0], coords[1], coords[2]);
        let expected: i64 = (0..3)
            .map(|j| m.get(&[i, j]).unwrap() * stack.get(&[j, k, s]).unwrap())
            .sum();
        assert_eq!(c.get(&coords).unwrap(), expected, "at {:?}", coords);
    }
}

#[test]
fn test_duplicate_label_rejected_before_evaluation() {
    let t = tensor(&[2, 2], vec![1, 2, 3, 4]);
    assert_eq!(
        t.labeled(["i", "i"]).unwrap_err(),
        TensorError::DuplicateLabel {
            label: Label::from("i"),
            first: 0,
            second: 1,
        }
    );
}

#[test]
fn test_contracted_size_mismatch() {
    let a = tensor(&[3, 2], vec![0.0f64; 6]);
    let b = tensor(&[3, 3], vec![0.0f64; 9]);
    let err = contract(a.labeled(["i", "j"]).unwrap(), b.labeled(["j", "k"]).unwrap())
        .unwrap_err();
    assert!(matches!(err, TensorError::DimensionSizeMismatch { .. }));
}

#[test]
fn test_dot_product_is_rank_zero() {
    let a = tensor(&[4], vec![1, 2, 3, 4]);
    let b = tensor(&[4], vec![4, 3, 2, 1]);
    let c = Tensor::from_expression(
        contract(a.labeled(['n']).unwrap(), b.labeled(['n']).unwrap()).unwrap(),
    );
    assert_eq!(c.rank(), 0);
    assert_eq!(c.get(&[]).unwrap(), 20);
}

#[test]
fn test_fixed_and_dynamic_mix() {
    let a = Tensor::from_data(Shape::fixed([2, 2]).unwrap(), vec![1, 2, 3, 4]).unwrap();
    let mut b = Tensor::new(Shape::dynamic(vec![2, 2]).unwrap());
    b.fill_uniform(10, 10, &mut rand::thread_rng()).unwrap();

    let c = Tensor::from_expression((&a + &b).unwrap());
    assert_eq!(c.data(), &[11, 12, 13, 14]);
    let d = Tensor::from_expression((&b + &a).unwrap());
    assert_eq!(c.data(), d.data());
}

#[test]
fn test_large_parallel_materialization() {
    init_tracing();
    let a = tensor(&[64, 32], (0..64 * 32).map(|v| v as i64 % 7).collect());
    let b = tensor(&[32, 48], (0..32 * 48).map(|v| v as i64 % 5).collect());
    let expr = contract(a.labeled(["i", "j"]).unwrap(), b.labeled(["j", "k"]).unwrap()).unwrap();

    let serial = materialize(&expr, &EvalConfig::serial()).unwrap();
    let parallel = materialize(
        &expr,
        &EvalConfig {
            parallel_threshold: 64,
            chunk_size: 100,
            num_threads: Some(4),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(serial, parallel);
    assert_eq!(Tensor::from_expression(expr), serial);
}
