//! Worked examples for the factorial library.
//!
//! Fits the popcorn, water treatment and seven-factor screening experiments,
//! printing coefficients, the residual line and the Pareto order of effects.
//!
//! Run with `RUST_LOG=debug cargo run --example analysis` to see the fitting
//! log.

use factorial::{
    expand_grid, lm, pareto_rank, ContourConfig, ContourData, Error, ExperimentTable, Factor,
    FittedModel, GridOrder, ParetoChart, ParetoConfig,
};

fn report(title: &str, model: &FittedModel) {
    println!("== {title}: {} ==", model.spec());
    println!("{:<12} {:>10} {:>10} {:>10}", "term", "estimate", "std.err", "p");
    for c in model.coefficients() {
        let se = c.std_error.map_or("---".to_string(), |v| format!("{v:.4}"));
        let p = c.p_value.map_or("---".to_string(), |v| format!("{v:.4}"));
        println!("{:<12} {:>10.4} {:>10} {:>10}", c.label(), c.estimate, se, p);
    }
    println!("{}", model.residual_line());
    if let Some(r2) = model.r_squared() {
        println!("R-squared: {r2:.4}");
    }

    let largest_first: Vec<String> = pareto_rank(model)
        .into_iter()
        .rev()
        .map(|e| format!("{} ({})", e.label, e.signed_label()))
        .collect();
    println!("Pareto: {}", largest_first.join(", "));
    println!();
}

fn main() -> Result<(), Error> {
    env_logger::init();

    println!("Factorial Library - Worked Examples\n");

    // Popcorn: two factors, no replicates
    let popcorn = ExperimentTable::gather([
        Factor::coded("A", &[-1.0, 1.0, -1.0, 1.0]),
        Factor::coded("B", &[-1.0, -1.0, 1.0, 1.0]),
        Factor::coded("y", &[52.0, 74.0, 62.0, 80.0]),
    ])?;
    let popped_corn = lm("y ~ A + B + A*B", &popcorn)?;
    report("Popcorn", &popped_corn);

    // Water treatment: 2^3 in standard order
    let mut water = expand_grid(
        &[("C", [-1.0, 1.0]), ("T", [-1.0, 1.0]), ("S", [-1.0, 1.0])],
        GridOrder::Standard,
    )?;
    water.insert(Factor::coded("y", &[5.0, 30.0, 6.0, 33.0, 4.0, 3.0, 5.0, 4.0]))?;
    println!("{water}");
    let water_model = lm("y ~ C * T * S", &water)?;
    report("Water treatment", &water_model);

    let chart = ParetoChart::new(&water_model, &ParetoConfig::default());
    println!(
        "Pareto chart: {} bars, {} x {} px, axis to {:.3}\n",
        chart.entries.len(),
        chart.width,
        chart.height,
        chart.x_max
    );

    let contour = ContourData::new(
        &water_model,
        Some("C"),
        Some("T"),
        &[("S", -1.0)],
        &ContourConfig::default(),
    )?;
    println!(
        "Contour of '{}' against '{}' at S = -1: z from {:.2} to {:.2}\n",
        contour.x_factor,
        contour.y_factor,
        contour.levels[0],
        contour.levels[contour.levels.len() - 1]
    );

    // Screening: 2^(7-4) built from three base factors
    let base = expand_grid(
        &[("A", [-1.0, 1.0]), ("B", [-1.0, 1.0]), ("C", [-1.0, 1.0])],
        GridOrder::Standard,
    )?;
    let a = base.factor("A").cloned().ok_or_else(|| Error::unknown_factor("A", base.names()))?;
    let b = base.factor("B").cloned().ok_or_else(|| Error::unknown_factor("B", base.names()))?;
    let c = base.factor("C").cloned().ok_or_else(|| Error::unknown_factor("C", base.names()))?;
    let d = (&a * &b)?.with_name("D");
    let e = (&a * &c)?.with_name("E");
    let f = (&b * &c)?.with_name("F");
    let g = (&(&a * &b)? * &c)?.with_name("G");
    let y = Factor::coded("y", &[320.0, 276.0, 306.0, 290.0, 272.0, 274.0, 290.0, 255.0]);
    let screening = ExperimentTable::gather([a, b, c, d, e, f, g, y])?;

    match lm("y ~ A*B*C*D*E*F*G", &screening) {
        Ok(model) => report("Screening, all interactions", &model),
        Err(err) => println!("Screening, all interactions: {err}\n"),
    }
    let screening_model = lm("y ~ A + B + C + D + E + F + G", &screening)?;
    report("Screening, main effects", &screening_model);
    let reduced = lm("y ~ A + C + E + G", &screening)?;
    report("Screening, reduced", &reduced);

    Ok(())
}
