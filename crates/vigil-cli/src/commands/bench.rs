use super::helpers::format_duration;
use anyhow::Result;
use chrono::Utc;
use tabled::{Table, Tabled};
use vigil_core::benchmark::Expectation;
use vigil_core::{run_benchmark, Strictness};

#[derive(Tabled)]
struct ScenarioRow {
    #[tabled(rename = "Scenario")]
    name: String,
    #[tabled(rename = "Expected")]
    expected: String,
    #[tabled(rename = "Length")]
    length: String,
    #[tabled(rename = "Fired")]
    fired: String,
    #[tabled(rename = "Latency")]
    latency: String,
    #[tabled(rename = "Result")]
    result: String,
}

/// Run the built-in scenarios and print a scorecard
///
/// # Errors
///
/// Returns an error if the report cannot be serialized
#[allow(clippy::cast_precision_loss)]
pub fn bench_command(strictness: Strictness, json: bool) -> Result<()> {
    let report = run_benchmark(strictness, Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let rows: Vec<ScenarioRow> = report
        .results
        .iter()
        .map(|r| {
            let mut kinds = r.fired.clone();
            kinds.dedup();
            ScenarioRow {
                name: r.name.clone(),
                expected: match r.expectation {
                    Expectation::Quiet => "quiet".to_string(),
                    Expectation::Fires(category) => category.to_string(),
                },
                length: format_duration(r.ticks as f64),
                fired: if kinds.is_empty() {
                    "-".to_string()
                } else {
                    kinds
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                },
                latency: format!("{}us", r.avg_latency.as_micros()),
                result: if r.passed { "PASS" } else { "FAIL" }.to_string(),
            }
        })
        .collect();

    println!("Benchmark at strictness {}\n", report.strictness);
    let table = Table::new(rows).to_string();
    println!("{table}");
    println!(
        "\nAccuracy: {}/{} ({:.0}%)",
        report.passed,
        report.results.len(),
        report.accuracy * 100.0
    );
    println!(
        "Average latency: {}us ({})",
        report.avg_latency.as_micros(),
        report.latency_grade
    );

    if report.passed < report.results.len() {
        anyhow::bail!(
            "{} scenario(s) failed",
            report.results.len() - report.passed
        );
    }
    Ok(())
}
