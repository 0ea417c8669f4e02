use clap::{Parser, Subcommand};
use multipole_core::{
    check_equivalent_with_passes, derivative_tensor, eval_scalar, generate_pairings,
    multipole_tensor, pairing_count, potential, recommended_passes, trace_over, EvalPoint,
    IndexLabel, TensorError, TensorExpression,
};

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo => run_demo(),
        Command::Moments { n } => run_moments(n),
        Command::Derivative { n } => run_derivative(n),
        Command::Potential { n, passes } => run_potential(n, passes),
        Command::Pairings { n, k } => run_pairings(n, k),
        Command::Verify { max_order, passes } => run_verify(max_order, passes),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "multipole",
    about = "Symmetric traceless multipole tensor explorer"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Small demo: quadrupole and octupole moment tensors
    Demo,

    /// Print the moment tensor Q for one order
    Moments {
        /// Tensor order (number of legs)
        #[arg(long, default_value_t = 2)]
        n: u32,
    },

    /// Print the derivative tensor of 1/r for one order
    Derivative {
        /// Tensor order (number of derivatives)
        #[arg(long, default_value_t = 2)]
        n: u32,
    },

    /// Print the contracted potential term from both constructions
    Potential {
        /// Tensor order
        #[arg(long, default_value_t = 2)]
        n: u32,

        /// Contraction pass budget (default: max(5, n + 2))
        #[arg(long)]
        passes: Option<u32>,
    },

    /// List the index pairings for (n, k)
    Pairings {
        /// Number of legs
        #[arg(long)]
        n: u32,

        /// Number of disjoint pairs
        #[arg(long)]
        k: u32,
    },

    /// Sweep orders 0..=max-order: traceless + equivalence regression
    Verify {
        /// Highest order to check
        #[arg(long, default_value_t = 6)]
        max_order: u32,

        /// Contraction pass budget (default: per-order max(5, n + 2))
        #[arg(long)]
        passes: Option<u32>,
    },
}

fn build_moment(n: u32) -> TensorExpression {
    match multipole_tensor(n) {
        Ok(tensor) => tensor,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn build_derivative(n: u32) -> TensorExpression {
    match derivative_tensor(n) {
        Ok(tensor) => tensor,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn expected_term_total(n: u32) -> String {
    let mut total = pairing_count(n, 0).expect("k = 0 is always valid");
    for k in 1..=(n / 2) {
        total += pairing_count(n, k).expect("k <= n/2");
    }
    total.to_string()
}

fn run_demo() {
    for n in [2u32, 3] {
        let q = build_moment(n);
        println!("Q (n={}) = {}", n, q.expr);
        println!("phi(n={}) = {}", n, potential(&q));
        println!();
    }
}

fn run_moments(n: u32) {
    let q = build_moment(n);
    println!("Moment tensor Q, n={} (terms={})", n, q.expr.len());
    for (i, term) in q.expr.terms().iter().enumerate() {
        println!("  {:>3}) {}", i + 1, term);
    }
    let expected = expected_term_total(n);
    println!(
        "\n[Sanity] expected term count={}{}",
        expected,
        if expected == q.expr.len().to_string() {
            "  (OK)"
        } else {
            "  (MISMATCH)"
        }
    );
}

fn run_derivative(n: u32) {
    let d = build_derivative(n);
    println!(
        "Derivative tensor of 1/r (times r^{}), n={} (terms={})",
        2 * n + 1,
        n,
        d.expr.len()
    );
    for (i, term) in d.expr.terms().iter().enumerate() {
        println!("  {:>3}) {}", i + 1, term);
    }
    let expected = expected_term_total(n);
    println!(
        "\n[Sanity] expected term count={}{}",
        expected,
        if expected == d.expr.len().to_string() {
            "  (OK)"
        } else {
            "  (MISMATCH)"
        }
    );
}

fn run_potential(n: u32, passes: Option<u32>) {
    let q = build_moment(n);
    let d = build_derivative(n);
    let phi_q = potential(&q);
    let phi_d = potential(&d);
    println!("phi(n={}) from moments:     {}", n, phi_q);
    println!("phi(n={}) from derivatives: {}", n, phi_d);

    let budget = passes.unwrap_or_else(|| recommended_passes(n));
    match check_equivalent_with_passes(&q, &d, budget) {
        Ok(true) => println!("\n[Regression] constructions agree (passes={})  (OK)", budget),
        Ok(false) => println!(
            "\n[Regression] constructions disagree (passes={})  (MISMATCH)",
            budget
        ),
        Err(TensorError::NotReduced { passes }) => println!(
            "\n[Regression] unresolved after {} passes; retry with --passes {}",
            passes,
            passes * 2
        ),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }

    // Numeric spot check at a fixed far-field point.
    let point = EvalPoint::new(
        nalgebra_vec(0.3, -0.1, 0.2),
        nalgebra_vec(5.0, 2.0, -7.0),
    );
    if let (Ok(via_q), Ok(via_d)) = (eval_scalar(&phi_q, &point), eval_scalar(&phi_d, &point)) {
        println!("[Numeric] moments={:+.9e}  derivatives={:+.9e}", via_q, via_d);
    }
}

fn nalgebra_vec(x: f64, y: f64, z: f64) -> nalgebra::Vector3<f64> {
    nalgebra::Vector3::new(x, y, z)
}

fn run_pairings(n: u32, k: u32) {
    let pairings = match generate_pairings(n, k) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    println!("Pairings (n={}, k={}) count={}", n, k, pairings.len());
    for (i, p) in pairings.iter().enumerate() {
        let pairs: Vec<String> = p
            .pairs
            .iter()
            .map(|(a, b)| format!("({},{})", a, b))
            .collect();
        let rest: Vec<String> = p.leftovers.iter().map(|l| l.to_string()).collect();
        println!("  {:>4}) [{}] free: [{}]", i + 1, pairs.join(" "), rest.join(" "));
    }
    let expected = pairing_count(n, k).map(|c| c.to_string()).unwrap_or_default();
    println!(
        "\n[Sanity] n!/(2^k k! (n-2k)!) = {}{}",
        expected,
        if expected == pairings.len().to_string() {
            "  (OK)"
        } else {
            "  (MISMATCH)"
        }
    );
}

fn run_verify(max_order: u32, passes: Option<u32>) {
    let mut failures = 0u32;
    for n in 0..=max_order {
        let q = build_moment(n);
        let d = build_derivative(n);

        if n >= 2 {
            let traced = trace_over(&q, IndexLabel(1), IndexLabel(2));
            let ok = traced.is_zero();
            println!(
                "[Regression] n={}: trace over (1,2) = {}  {}",
                n,
                traced,
                if ok { "(OK)" } else { "(MISMATCH)" }
            );
            if !ok {
                failures += 1;
            }
        } else {
            println!("[Regression] n={}: traceless check skipped (rank < 2)", n);
        }

        let budget = passes.unwrap_or_else(|| recommended_passes(n));
        match check_equivalent_with_passes(&q, &d, budget) {
            Ok(true) => println!("[Regression] n={}: constructions agree  (OK)", n),
            Ok(false) => {
                println!("[Regression] n={}: constructions disagree  (MISMATCH)", n);
                failures += 1;
            }
            Err(TensorError::NotReduced { passes }) => {
                println!(
                    "[Regression] n={}: unresolved after {} passes; rerun with --passes {}",
                    n,
                    passes,
                    passes * 2
                );
                failures += 1;
            }
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    }
    println!(
        "\nVerification finished: {} order(s), {} failure(s)",
        max_order + 1,
        failures
    );
    if failures > 0 {
        std::process::exit(1);
    }
}
