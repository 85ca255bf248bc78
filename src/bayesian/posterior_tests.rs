use super::*;
use crate::bayesian::spec::Grouping;
use crate::primitives::Matrix;

fn names() -> Vec<String> {
    vec!["a".to_string(), "b".to_string()]
}

fn posterior() -> Posterior {
    let chain = |offset: f64| Chain {
        draws: (0..100)
            .map(|t| vec![offset + (t % 10) as f64, 2.0 * t as f64])
            .collect(),
    };
    Posterior::new(names(), vec![chain(0.0), chain(1.0)]).expect("valid posterior")
}

#[test]
fn test_new_rejects_empty_and_ragged() {
    assert!(Posterior::new(names(), vec![]).is_err());
    assert!(Posterior::new(names(), vec![Chain { draws: vec![] }]).is_err());

    let ragged = Chain {
        draws: vec![vec![1.0, 2.0], vec![1.0]],
    };
    assert!(Posterior::new(names(), vec![ragged]).is_err());

    let short = Chain {
        draws: vec![vec![1.0, 2.0]],
    };
    let long = Chain {
        draws: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
    };
    assert!(Posterior::new(names(), vec![short, long]).is_err());
}

#[test]
fn test_accessors() {
    let post = posterior();
    assert_eq!(post.n_chains(), 2);
    assert_eq!(post.draws_per_chain(), 100);
    assert_eq!(post.parameter_index("b"), Some(1));
    assert_eq!(post.parameter_index("c"), None);
    assert_eq!(post.pooled(0).len(), 200);

    let draws = post.parameter_draws("a").expect("monitored");
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[1][0], 1.0);
    assert!(post.parameter_draws("zeta").is_err());
}

#[test]
fn test_posterior_means() {
    let means = posterior().posterior_means();
    // chain 0 averages 4.5, chain 1 averages 5.5
    assert!((means[0] - 5.0).abs() < 1e-12);
    assert!((means[1] - 99.0).abs() < 1e-12);
}

#[test]
fn test_summary_fields() {
    let summary = posterior().summary().expect("summary");
    assert_eq!(summary.len(), 2);
    let a = &summary[0];
    assert_eq!(a.name, "a");
    assert!(a.q2_5 <= a.q25 && a.q25 <= a.q50 && a.q50 <= a.q75 && a.q75 <= a.q97_5);
    assert!(a.sd > 0.0);
    assert!((a.naive_se - a.sd / 200f64.sqrt()).abs() < 1e-12);
    assert!(a.time_series_se >= a.naive_se * 0.5);
    assert!(a.r_hat.is_some());
    assert!(a.ess > 0.0 && a.ess <= 200.0);
}

#[test]
fn test_convergence_reports() {
    let reports = posterior().convergence();
    assert_eq!(reports.len(), 2);
    // b is a deterministic trend shared by both chains
    assert_eq!(reports[1].parameter, "b");
}

fn design(groups: Option<Grouping>) -> Design {
    Design {
        response: "y".to_string(),
        predictors: vec!["x".to_string()],
        y: Vector::from_slice(&[3.0, 5.0, 10.0]),
        x: Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("valid matrix"),
        centers: vec![0.0],
        groups,
    }
}

#[test]
fn test_coefficients_length_is_predictors_plus_one() {
    let layout = ParameterLayout {
        intercepts: 0..1,
        slopes: 1..2,
        precision: 2,
    };
    let post = Posterior::new(
        vec!["(Intercept)".to_string(), "x".to_string(), "tau".to_string()],
        vec![Chain {
            draws: vec![vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 6.0]],
        }],
    )
    .expect("valid posterior");
    let est = PointEstimate::from_posterior(&post, &layout);
    assert_eq!(est.coefficients(), vec![1.0, 2.0]);
    assert_eq!(est.precision, 5.0);
}

#[test]
fn test_predict_and_residuals_flat() {
    let est = PointEstimate {
        intercepts: vec![1.0],
        slopes: vec![2.0],
        precision: 1.0,
    };
    let d = design(None);
    let fitted = est.predict(&d).expect("shapes agree");
    assert_eq!(fitted.as_slice(), &[3.0, 5.0, 7.0]);
    let resid = est.residuals(&d).expect("shapes agree");
    assert_eq!(resid.as_slice(), &[0.0, 0.0, 3.0]);
    for i in 0..3 {
        assert_eq!(resid[i], d.y[i] - fitted[i]);
    }
}

#[test]
fn test_intercepts_at_origin() {
    let est = PointEstimate {
        intercepts: vec![10.0, 12.0],
        slopes: vec![2.0, -1.0],
        precision: 1.0,
    };
    // shift = 2·3 − 1·4 = 2
    assert_eq!(est.intercepts_at_origin(&[3.0, 4.0]), vec![8.0, 10.0]);
    assert_eq!(est.intercepts_at_origin(&[0.0, 0.0]), vec![10.0, 12.0]);
}

#[test]
fn test_predict_grouped() {
    let groups = Grouping::from_values("g", &[1.0, 2.0, 1.0]).expect("valid groups");
    let est = PointEstimate {
        intercepts: vec![0.0, 10.0],
        slopes: vec![1.0],
        precision: 1.0,
    };
    let fitted = est.predict(&design(Some(groups))).expect("shapes agree");
    assert_eq!(fitted.as_slice(), &[1.0, 12.0, 3.0]);
}

#[test]
fn test_predict_shape_mismatch() {
    let est = PointEstimate {
        intercepts: vec![0.0, 1.0],
        slopes: vec![1.0],
        precision: 1.0,
    };
    assert!(est.predict(&design(None)).is_err());

    let est = PointEstimate {
        intercepts: vec![0.0],
        slopes: vec![1.0, 2.0],
        precision: 1.0,
    };
    assert!(est.predict(&design(None)).is_err());
}
