//! Worked examples from the design-of-experiments textbook chapters.

use approx::assert_abs_diff_eq;
use factorial::{
    expand_grid, lm, main_effects, pareto_rank, predict_surface, Error, ExperimentTable, Factor,
    GridOrder, Sign,
};

fn two_level(names: &[&str]) -> ExperimentTable {
    let factors: Vec<(&str, [f64; 2])> = names.iter().map(|&n| (n, [-1.0, 1.0])).collect();
    expand_grid(&factors, GridOrder::Standard).unwrap()
}

fn screening() -> ExperimentTable {
    let base = two_level(&["A", "B", "C"]);
    let a = base.factor("A").unwrap().clone();
    let b = base.factor("B").unwrap().clone();
    let c = base.factor("C").unwrap().clone();

    let d = (&a * &b).unwrap().with_name("D");
    let e = (&a * &c).unwrap().with_name("E");
    let f = (&b * &c).unwrap().with_name("F");
    let g = (&(&a * &b).unwrap() * &c).unwrap().with_name("G");
    let y = Factor::coded(
        "y",
        &[320.0, 276.0, 306.0, 290.0, 272.0, 274.0, 290.0, 255.0],
    );
    ExperimentTable::gather([a, b, c, d, e, f, g, y]).unwrap()
}

#[test]
fn test_popcorn() {
    let table = ExperimentTable::gather([
        Factor::coded("A", &[-1.0, 1.0, -1.0, 1.0]),
        Factor::coded("B", &[-1.0, -1.0, 1.0, 1.0]),
        Factor::coded("y", &[52.0, 74.0, 62.0, 80.0]),
    ])
    .unwrap();

    // "A + B + A*B" repeats A and B; each term appears once.
    let model = lm("y ~ A + B + A*B", &table).unwrap();
    assert_eq!(model.spec().labels(), ["Intercept", "A", "B", "A:B"]);

    let expected = [67.0, 10.0, 4.0, -1.0];
    for (c, e) in model.coefficients().iter().zip(expected) {
        assert_abs_diff_eq!(c.estimate, e, epsilon = 1e-12);
    }
    assert!(model.is_saturated());
    assert_eq!(
        model.residual_line().to_string(),
        "Residual standard error: --- on 0 degrees of freedom."
    );
}

#[test]
fn test_water_treatment() {
    let mut table = two_level(&["C", "T", "S"]);
    table
        .insert(Factor::coded(
            "y",
            &[5.0, 30.0, 6.0, 33.0, 4.0, 3.0, 5.0, 4.0],
        ))
        .unwrap();

    let model = lm("y ~ C * T * S", &table).unwrap();
    assert_eq!(
        model.spec().labels(),
        ["Intercept", "C", "T", "S", "C:T", "C:S", "T:S", "C:T:S"]
    );

    let expected = [11.25, 6.25, 0.75, -7.25, 0.25, -6.75, -0.25, -0.25];
    for (c, e) in model.coefficients().iter().zip(expected) {
        assert_abs_diff_eq!(c.estimate, e, epsilon = 1e-12);
    }

    let ranked = pareto_rank(&model);
    let top: Vec<&str> = ranked.iter().rev().take(3).map(|e| e.label.as_str()).collect();
    assert_eq!(top, ["S", "C:S", "C"]);
    assert_eq!(ranked.last().unwrap().sign, Sign::Negative);

    // Saturated model reproduces every run.
    let c = table.column("C").unwrap();
    let t = table.column("T").unwrap();
    let s = table.column("S").unwrap();
    let y = table.column("y").unwrap();
    for run in 0..8 {
        let z = predict_surface(&model, "C", "T", &[c[run]], &[t[run]], &[("S", s[run])]).unwrap();
        assert_abs_diff_eq!(z[[0, 0]], y[run], epsilon = 1e-10);
    }
}

#[test]
fn test_water_main_effects_match_coefficients() {
    let mut table = two_level(&["C", "T", "S"]);
    table
        .insert(Factor::coded(
            "y",
            &[5.0, 30.0, 6.0, 33.0, 4.0, 3.0, 5.0, 4.0],
        ))
        .unwrap();
    let model = lm("y ~ C + T + S", &table).unwrap();

    let effects = main_effects(&table, "y", &["C", "T", "S"]).unwrap();
    let most_important = effects.iter().find(|e| e.rank == 1).unwrap();
    assert_eq!(most_important.factor, "S");
    for effect in &effects {
        let half = effect.half_effect.unwrap();
        assert_abs_diff_eq!(
            model.coefficient(&effect.factor).unwrap().estimate,
            half,
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_screening_design() {
    let table = screening();

    // Generators make the columns products of A, B and C.
    let abc = table.column("A").unwrap() * table.column("B").unwrap() * table.column("C").unwrap();
    assert_eq!(table.column("G").unwrap(), &abc);

    // 128 terms cannot be estimated from 8 runs.
    match lm("y ~ A*B*C*D*E*F*G", &table) {
        Err(Error::SingularDesign { runs, terms, .. }) => {
            assert_eq!(runs, 8);
            assert_eq!(terms, 128);
        }
        other => panic!("expected SingularDesign, got {other:?}"),
    }

    let model = lm("y ~ A + B + C + D + E + F + G", &table).unwrap();
    assert!(model.is_saturated());
    let expected = [
        ("Intercept", 285.375),
        ("A", -11.625),
        ("B", -0.125),
        ("C", -12.625),
        ("D", -1.125),
        ("E", 3.375),
        ("F", -0.125),
        ("G", -8.125),
    ];
    for (label, value) in expected {
        assert_abs_diff_eq!(model.coefficient(label).unwrap().estimate, value, epsilon = 1e-10);
    }

    let top: Vec<String> = pareto_rank(&model)
        .into_iter()
        .rev()
        .take(4)
        .map(|e| e.label)
        .collect();
    assert_eq!(top, ["C", "A", "G", "E"]);
}

#[test]
fn test_screening_reduced_model() {
    let table = screening();
    let model = lm("y ~ A + C + E + G", &table).unwrap();

    assert_eq!(model.df_resid(), 3);
    assert_abs_diff_eq!(model.coefficient("A").unwrap().estimate, -11.625, epsilon = 1e-10);
    assert_abs_diff_eq!(model.coefficient("G").unwrap().estimate, -8.125, epsilon = 1e-10);

    // Dropped effects B, D and F make up the residual sum of squares.
    let rss: f64 = model.residuals().iter().map(|e| e * e).sum();
    let dropped = 8.0 * (0.125_f64.powi(2) + 1.125_f64.powi(2) + 0.125_f64.powi(2));
    assert_abs_diff_eq!(rss, dropped, epsilon = 1e-9);
    assert_abs_diff_eq!(model.scale().unwrap(), dropped / 3.0, epsilon = 1e-9);

    let intervals = model.confidence_intervals(0.95).unwrap();
    assert_eq!(intervals.len(), 5);
    assert!(intervals.iter().all(|ci| ci.lower < ci.upper));
}
