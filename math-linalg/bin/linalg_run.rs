use clap::{Parser, ValueEnum};
use math_linalg::{MethodTag, ProblemFile, RunReport};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "linalg-run",
    about = "Run a direct solver, stationary iteration or eigenvalue iteration on a JSON problem file"
)]
struct Cli {
    /// Problem file (JSON with matrix, rhs, method and optional config blocks)
    #[arg(required_unless_present = "list_methods")]
    problem: Option<PathBuf>,

    /// Override the method given in the problem file (e.g. gauss, sor, qr-transform)
    #[arg(long)]
    method: Option<String>,

    /// Override the SOR relaxation parameter
    #[arg(long)]
    omega: Option<f64>,

    /// Override the iteration cap of the selected method
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Override the tolerance of the selected method
    #[arg(long)]
    tol: Option<f64>,

    /// Print the per-iteration trace
    #[arg(long)]
    trace: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// List all available methods and exit
    #[arg(long)]
    list_methods: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn apply_overrides(problem: &mut ProblemFile, args: &Cli) {
    if let Some(omega) = args.omega {
        problem.omega = Some(omega);
    }
    if let Some(max) = args.max_iterations {
        problem.stationary.max_iterations = max;
        problem.eigen.max_iterations = max;
        problem.rotation.max_iterations = max;
        problem.power.max_iterations = max;
    }
    if let Some(tol) = args.tol {
        problem.stationary.tolerance = tol;
        problem.eigen.tolerance = tol;
        problem.rotation.tolerance = tol;
        problem.power.tolerance = tol;
    }
    if args.trace {
        problem.gauss.trace = true;
        problem.stationary.trace = true;
        problem.eigen.trace = true;
        problem.rotation.trace = true;
        problem.power.trace = true;
    }
}

fn print_table(report: &RunReport, show_trace: bool) {
    println!("method:     {}", report.method);
    let values: Vec<String> = report.values.iter().map(|v| format!("{v:.10}")).collect();
    println!("result:     [{}]", values.join(", "));
    if let Some(iterations) = report.iterations {
        println!("iterations: {iterations}");
    }
    if let Some(error) = report.error {
        println!("error:      {error:.6e}");
    }
    println!("converged:  {}", report.converged);

    if show_trace {
        for swap in &report.swaps {
            println!("  step {}: {swap}", swap.step);
        }
        let rows = report.trace.rows();
        if !rows.is_empty() {
            println!();
            println!("{:>6}  {:>14}  value", "iter", "error");
            for (iteration, error, value) in rows {
                let error = error.map_or_else(|| "-".to_string(), |e| format!("{e:.6e}"));
                println!("{iteration:>6}  {error:>14}  {value}");
            }
        }
    }
}

fn main() {
    env_logger::init();
    let args = Cli::parse();

    if args.list_methods {
        println!("Available methods:");
        for method in MethodTag::ALL {
            let kind = if method.needs_rhs() {
                "solver"
            } else {
                "eigenvalues"
            };
            println!("  {:<16} ({kind})", method.as_str());
        }
        return;
    }

    let Some(path) = &args.problem else {
        eprintln!("Error: a problem file is required unless --list-methods is given");
        process::exit(2);
    };
    let mut problem = ProblemFile::from_file(path).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        process::exit(2);
    });

    if let Some(name) = &args.method {
        problem.method = MethodTag::from_str(name).unwrap_or_else(|err| {
            eprintln!("Error: {err}");
            process::exit(2);
        });
    }
    apply_overrides(&mut problem, &args);

    let start = Instant::now();
    let report = problem.run().unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        process::exit(1);
    });
    let elapsed = start.elapsed();

    match args.format {
        OutputFormat::Table => {
            print_table(&report, args.trace);
            println!("elapsed:    {:.3} ms", elapsed.as_secs_f64() * 1e3);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).unwrap_or_else(|err| {
                eprintln!("Error: failed to serialize report: {err}");
                process::exit(1);
            });
            println!("{json}");
        }
    }
}
