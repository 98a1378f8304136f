use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// Firmware target for every `no_std` crate
const TARGET: &str = "thumbv7em-none-eabihf";

/// One cargo invocation
struct Step {
    label: &'static str,
    args: &'static [&'static str],
    /// Abort the run on failure; advisory steps only warn
    fatal: bool,
}

const STEPS: &[Step] = &[
    Step {
        label: "noos (no_std)",
        args: &["check", "-p", "noos", "--target", TARGET, "--no-default-features"],
        fatal: true,
    },
    Step {
        label: "capi (no_std, NVIC backend)",
        args: &["check", "-p", "capi", "--target", TARGET, "--features", "cortex-m,defmt"],
        fatal: true,
    },
    Step {
        label: "adi-drivers (no_std)",
        args: &["check", "-p", "adi-drivers", "--target", TARGET, "--features", "defmt"],
        fatal: true,
    },
    Step {
        label: "pmod-console library (no_std)",
        args: &["check", "-p", "pmod-console", "--lib", "--target", TARGET],
        fatal: true,
    },
    Step {
        label: "pmod-console host binary",
        args: &["check", "-p", "pmod-console", "--features", "host"],
        fatal: true,
    },
    Step {
        label: "clippy lints",
        args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        fatal: false,
    },
    Step {
        label: "code formatting",
        args: &["fmt", "--all", "--check"],
        fatal: false,
    },
];

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking workspace builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    for step in STEPS {
        println!("{}", format!("  Checking {}...", step.label).cyan());
        let start = Instant::now();

        let output = Command::new("cargo")
            .args(step.args)
            .output()
            .with_context(|| format!("Failed to run cargo for {}", step.label))?;

        if output.status.success() {
            println!(
                "{}",
                format!(
                    "  ✓ {} passed in {:.2}s",
                    step.label,
                    start.elapsed().as_secs_f64()
                )
                .green()
            );
        } else if step.fatal {
            eprintln!("{}", format!("  ✗ {} failed", step.label).red().bold());
            eprintln!();
            eprintln!("{}", String::from_utf8_lossy(&output.stderr));
            anyhow::bail!("{} failed", step.label);
        } else {
            eprintln!("{}", format!("  ⚠ {} reported issues", step.label).yellow().bold());
            eprintln!();
            eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        }
        println!();
    }

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
