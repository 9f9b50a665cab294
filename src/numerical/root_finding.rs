//! # Scalar root finding
//!
//! Four iterative methods for f(x) = 0 working directly on expression trees, plus a
//! bracket scan that looks for sign changes of f on a grid.
//!
//! | method        | iteration                                   | stop when              |
//! |---------------|---------------------------------------------|------------------------|
//! | `FixedPoint`  | x = x + c(x) f(x)                           | abs(x_k+1 - x_k) < tol |
//! | `Accelerated` | x = x - c f^2 / (f - f(x - c f))            | abs(x_k+1 - x_k) < tol |
//! | `Newton`      | x = x - f(x) / f'(x)                        | abs(f(x_k+1)) < tol    |
//! | `Bisection`   | halve the bracket, keep the sign change     | abs(f(mid)) < tol      |
//!
//! `tol = 10^-precision`. Every method gives up after `MAX_ITERATIONS` steps.
//!
//! # Example
//! ```
//! use RustedEquationSolver::numerical::root_finding::newton;
//! use RustedEquationSolver::symbolic::symbolic_engine::Expr;
//! let f = Expr::parse_expression("x^2-2").unwrap();
//! let df = f.differentiate();
//! let result = newton(&f, &df, 1.0, 2.0, 10).unwrap();
//! assert!((result.root - 2f64.sqrt()).abs() < 1e-9);
//! ```
use crate::numerical::interval::IntervalSet;
use crate::symbolic::symbolic_engine::Expr;
use log::{debug, info, warn};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// hard cap shared by all iterative methods
pub const MAX_ITERATIONS: usize = 100_000;

/// Enum to represent the root finding methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum RootFindingMethod {
    #[strum(to_string = "fixed_point", serialize = "simple")]
    FixedPoint,
    #[strum(to_string = "accelerated", serialize = "fast")]
    Accelerated,
    #[strum(to_string = "newton")]
    Newton,
    #[strum(to_string = "bisection", serialize = "dichotomy")]
    Bisection,
}

impl RootFindingMethod {
    /// methods that need the iteration function c(x)
    pub fn needs_iteration_function(&self) -> bool {
        matches!(
            self,
            RootFindingMethod::FixedPoint | RootFindingMethod::Accelerated
        )
    }
}

/// Error types for root finding methods
#[derive(Debug, Clone, PartialEq)]
pub enum RootFindingError {
    MaxIterationsReached { iterations: usize },
    InvalidInput(String),
}

impl fmt::Display for RootFindingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RootFindingError::MaxIterationsReached { iterations } => {
                write!(f, "Maximum iterations reached ({})", iterations)
            }
            RootFindingError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for RootFindingError {}

/// Result structure for root finding methods
#[derive(Debug, Clone, PartialEq)]
pub struct RootFindingResult {
    pub root: f64,
    /// f(root)
    pub function_value: f64,
    /// steps taken before the stop criterion held
    pub iterations: usize,
    pub method: RootFindingMethod,
}

/// 10^-precision
pub fn tolerance(precision: i32) -> f64 {
    10f64.powi(-precision)
}

fn converged(
    equation: &Expr,
    root: f64,
    iterations: usize,
    method: RootFindingMethod,
) -> Result<RootFindingResult, RootFindingError> {
    let function_value = equation.eval_at(root);
    info!(
        "{}: root {} found after {} iterations, f(root) = {:e}",
        method, root, iterations, function_value
    );
    Ok(RootFindingResult {
        root,
        function_value,
        iterations,
        method,
    })
}

fn exhausted(method: RootFindingMethod) -> Result<RootFindingResult, RootFindingError> {
    warn!("{}: no convergence after {} iterations", method, MAX_ITERATIONS);
    Err(RootFindingError::MaxIterationsReached {
        iterations: MAX_ITERATIONS,
    })
}

/////////////////////////////////////////METHODS///////////////////////////////////////////

/// Simple iterations x_k+1 = φ(x_k) with φ(x) = x + c(x)·f(x), started from `a`.
/// `c` has to be chosen so that |φ'| < 1 near the root.
pub fn fixed_point(
    equation: &Expr,
    c_function: &Expr,
    a: f64,
    b: f64,
    precision: i32,
) -> Result<RootFindingResult, RootFindingError> {
    let method = RootFindingMethod::FixedPoint;
    let phi = Expr::Var + c_function.copy() * equation.copy();
    debug!("{} on [{}, {}], phi(x) = {}", method, a, b, phi);
    let tol = tolerance(precision);

    let mut xk = a;
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        let xk1 = phi.eval_at(xk);
        if (xk1 - xk).abs() < tol {
            return converged(equation, xk1, iterations, method);
        }
        xk = xk1;
        iterations += 1;
    }
    exhausted(method)
}

/// Accelerated iterations x_k+1 = x_k - c·f² / (f - f(x_k - c·f)), with c and f taken at x_k.
pub fn accelerated(
    equation: &Expr,
    c_function: &Expr,
    a: f64,
    b: f64,
    precision: i32,
) -> Result<RootFindingResult, RootFindingError> {
    let method = RootFindingMethod::Accelerated;
    debug!("{} on [{}, {}], c(x) = {}", method, a, b, c_function);
    let tol = tolerance(precision);

    let mut xk = a;
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        let cx = c_function.eval_at(xk);
        let fx = equation.eval_at(xk);
        if fx == 0.0 {
            return converged(equation, xk, iterations, method);
        }
        let xk1 = xk - cx * fx * fx / (fx - equation.eval_at(xk - cx * fx));
        if (xk1 - xk).abs() < tol {
            return converged(equation, xk1, iterations, method);
        }
        xk = xk1;
        iterations += 1;
    }
    exhausted(method)
}

/// Newton's method ψ(x) = x - f(x)/f'(x) started from `a`; stops on the residual.
pub fn newton(
    equation: &Expr,
    derivative: &Expr,
    a: f64,
    b: f64,
    precision: i32,
) -> Result<RootFindingResult, RootFindingError> {
    let method = RootFindingMethod::Newton;
    let psi = Expr::Var - equation.copy() / derivative.copy();
    debug!("{} on [{}, {}], psi(x) = {}", method, a, b, psi);
    let tol = tolerance(precision);

    let mut xk = a;
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        let xk1 = psi.eval_at(xk);
        if equation.eval_at(xk1).abs() < tol {
            return converged(equation, xk1, iterations, method);
        }
        xk = xk1;
        iterations += 1;
    }
    exhausted(method)
}

/// Bisection of `[a, b]`. The bracket is oriented so that f(right) > 0, then the half
/// whose endpoint has the sign of f(mid) is replaced by mid.
pub fn bisection(
    equation: &Expr,
    a: f64,
    b: f64,
    precision: i32,
) -> Result<RootFindingResult, RootFindingError> {
    let method = RootFindingMethod::Bisection;
    let (mut left, mut right) = if equation.eval_at(b) > 0.0 {
        (a, b)
    } else {
        (b, a)
    };
    debug!("{}: left = {}, right = {}", method, left, right);
    let tol = tolerance(precision);

    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        let x = (left + right) / 2.0;
        let f = equation.eval_at(x);
        if f > 0.0 {
            right = x;
        } else {
            left = x;
        }
        if f.abs() < tol {
            return converged(equation, x, iterations, method);
        }
        iterations += 1;
    }
    exhausted(method)
}

/// Walks every entry of `set` from a to b in increments of `step` and records
/// `[x, x + step]` wherever f changes sign. A zero value counts as positive.
/// Returns the brackets found and the number of samples taken.
/// An entry needing more than `MAX_ITERATIONS` samples, or a step lost to float rounding,
/// is rejected as `InvalidInput`.
pub fn split_interval(
    equation: &Expr,
    set: &IntervalSet,
    step: f64,
) -> Result<(IntervalSet, usize), RootFindingError> {
    if step.is_nan() || step <= 0.0 {
        return Err(RootFindingError::InvalidInput(format!(
            "search step must be positive, got {}",
            step
        )));
    }
    let mut brackets = IntervalSet::new();
    let mut samples = 0;
    for pair in set {
        let needed = (pair.width() / step).ceil();
        if needed > MAX_ITERATIONS as f64 {
            return Err(RootFindingError::InvalidInput(format!(
                "step {} needs {} samples on {}, more than {}",
                step, needed, pair, MAX_ITERATIONS
            )));
        }
        let mut k = 0;
        loop {
            let x = pair.a() + k as f64 * step;
            if x >= pair.b() {
                break;
            }
            let next = x + step;
            if next <= x {
                return Err(RootFindingError::InvalidInput(format!(
                    "step {} is below the float resolution at x = {}",
                    step, x
                )));
            }
            let fa = equation.eval_at(x);
            let fb = equation.eval_at(next);
            if fa.signum() * fb.signum() == -1.0 {
                debug!("sign change in [{}, {}]", x, next);
                brackets.push(x, next);
            }
            samples += 1;
            k += 1;
        }
    }
    info!(
        "bracket scan with step {}: {} brackets, {} samples",
        step,
        brackets.len(),
        samples
    );
    Ok((brackets, samples))
}

///////////////////////////////////////////DISPATCH///////////////////////////////////////////

/// Main structure for scalar root finding: keeps the precision and dispatches on the method
#[derive(Debug, Clone)]
pub struct ScalarRootFinder {
    precision: i32,
}

impl ScalarRootFinder {
    /// Create a new ScalarRootFinder; `precision` is the number of decimal digits
    pub fn new(precision: i32) -> Self {
        Self { precision }
    }

    pub fn set_precision(&mut self, precision: i32) {
        self.precision = precision;
    }

    pub fn precision(&self) -> i32 {
        self.precision
    }

    pub fn tolerance(&self) -> f64 {
        tolerance(self.precision)
    }

    /// Solve with specific method on the bracket `[a, b]`.
    ///
    /// `aux` is the iteration function c(x) for `FixedPoint`/`Accelerated` (required) and
    /// the derivative for `Newton` (computed from `equation` when absent); `Bisection`
    /// ignores it.
    pub fn solve_with(
        &self,
        method: RootFindingMethod,
        equation: &Expr,
        aux: Option<&Expr>,
        a: f64,
        b: f64,
    ) -> Result<RootFindingResult, RootFindingError> {
        match method {
            RootFindingMethod::FixedPoint | RootFindingMethod::Accelerated => {
                let c_function = aux.ok_or_else(|| {
                    RootFindingError::InvalidInput(format!(
                        "{} requires the iteration function c(x)",
                        method
                    ))
                })?;
                if method == RootFindingMethod::FixedPoint {
                    fixed_point(equation, c_function, a, b, self.precision)
                } else {
                    accelerated(equation, c_function, a, b, self.precision)
                }
            }
            RootFindingMethod::Newton => match aux {
                Some(derivative) => newton(equation, derivative, a, b, self.precision),
                None => newton(equation, &equation.differentiate(), a, b, self.precision),
            },
            RootFindingMethod::Bisection => bisection(equation, a, b, self.precision),
        }
    }
}

impl Default for ScalarRootFinder {
    fn default() -> Self {
        Self::new(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn parse(input: &str) -> Expr {
        Expr::parse_expression(input).unwrap()
    }

    #[test]
    fn test_fixed_point_sqrt2() {
        let f = parse("x^2-2");
        let c = parse("-0.25");
        let result = fixed_point(&f, &c, 1.0, 2.0, 8).unwrap();
        assert_relative_eq!(result.root, 2f64.sqrt(), epsilon = 1e-6);
        assert_eq!(result.method, RootFindingMethod::FixedPoint);
        assert!(result.iterations > 0);
    }

    #[test]
    fn test_fixed_point_oscillation_hits_cap() {
        // phi(x) = x - 2x = -x jumps between 1 and -1 forever
        let f = parse("x");
        let c = parse("-2");
        let result = fixed_point(&f, &c, 1.0, 2.0, 6);
        assert_eq!(
            result,
            Err(RootFindingError::MaxIterationsReached { iterations: 100_000 })
        );
    }

    #[test]
    fn test_accelerated_sqrt2() {
        let f = parse("x^2-2");
        let c = parse("1");
        let result = accelerated(&f, &c, 1.0, 2.0, 8).unwrap();
        assert_relative_eq!(result.root, 2f64.sqrt(), epsilon = 1e-6);
        // converges much faster than the plain iteration
        let plain = fixed_point(&f, &parse("-0.25"), 1.0, 2.0, 8).unwrap();
        assert!(result.iterations < plain.iterations);
    }

    #[test]
    fn test_newton_sqrt2() {
        let f = parse("x^2-2");
        let df = parse("2*x");
        let result = newton(&f, &df, 1.0, 2.0, 10).unwrap();
        assert_relative_eq!(result.root, 1.41421356, epsilon = 1e-8);
        assert!(result.function_value.abs() < 1e-10);
    }

    #[test]
    fn test_newton_with_symbolic_derivative() {
        let f = parse("\\cos{x}-x");
        let result = newton(&f, &f.differentiate(), 0.5, 1.0, 12).unwrap();
        assert_relative_eq!(result.root, 0.7390851332151607, epsilon = 1e-10);
    }

    #[test]
    fn test_bisection_linear() {
        let f = parse("x-2");
        let result = bisection(&f, 0.0, 10.0, 6).unwrap();
        assert_relative_eq!(result.root, 2.0, epsilon = 1e-6);
        assert_eq!(result.method, RootFindingMethod::Bisection);
    }

    #[test]
    fn test_bisection_reversed_orientation() {
        // f(b) < 0, so the bracket is flipped
        let f = parse("2-x");
        let result = bisection(&f, 0.0, 10.0, 6).unwrap();
        assert_relative_eq!(result.root, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bisection_trigonometric() {
        let f = parse("\\sin{x}");
        let result = bisection(&f, 3.0, 4.0, 10).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::PI, epsilon = 1e-9);
    }

    #[test]
    fn test_split_interval_finds_crossing() {
        let f = parse("x");
        let set = IntervalSet::from_str("(-1;1)").unwrap();
        let (brackets, samples) = split_interval(&f, &set, 0.5).unwrap();
        assert_eq!(brackets.len(), 1);
        assert!(brackets.contains(0.0));
        assert_eq!(brackets.get(0).map(|pair| (pair.a(), pair.b())), Some((-0.5, 0.0)));
        assert_eq!(samples, 4);
    }

    #[test]
    fn test_split_interval_several_entries() {
        let f = parse("x^2-2");
        let set = IntervalSet::from_str("(-2;0)&(1;2)").unwrap();
        let (brackets, samples) = split_interval(&f, &set, 0.25).unwrap();
        assert_eq!(brackets.len(), 2);
        assert!(brackets.contains(-(2f64.sqrt())));
        assert!(brackets.contains(2f64.sqrt()));
        assert_eq!(samples, 12);
    }

    #[test]
    fn test_split_interval_rejects_bad_step() {
        let f = parse("x");
        let set = IntervalSet::from_str("(-1;1)").unwrap();
        assert!(matches!(
            split_interval(&f, &set, 0.0),
            Err(RootFindingError::InvalidInput(_))
        ));
        assert!(split_interval(&f, &set, -0.1).is_err());
        assert!(split_interval(&f, &set, f64::NAN).is_err());
    }

    #[test]
    fn test_split_interval_step_below_float_resolution() {
        // at 1e17 adjacent floats are 16 apart, so x + 1 == x
        let f = parse("x");
        let set = IntervalSet::from_str("(100000000000000000;100000000000001000)").unwrap();
        assert_eq!(set.len(), 1);
        assert!(matches!(
            split_interval(&f, &set, 1.0),
            Err(RootFindingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_split_interval_too_many_samples() {
        let f = parse("x-1");
        let set = IntervalSet::from_str("(0;1000000000000000)").unwrap();
        assert!(matches!(
            split_interval(&f, &set, 1e-3),
            Err(RootFindingError::InvalidInput(_))
        ));
        // exactly at the cap is still scanned
        let set = IntervalSet::from_str("(0;100000)").unwrap();
        let (brackets, samples) = split_interval(&f, &set, 1.0).unwrap();
        assert_eq!(samples, MAX_ITERATIONS);
        // f(0) < 0 and f(1) = 0 counts as positive
        assert_eq!(brackets.len(), 1);
    }

    #[test]
    fn test_accelerated_starting_on_root() {
        let f = parse("x-1");
        let c = parse("1");
        let result = accelerated(&f, &c, 1.0, 2.0, 6).unwrap();
        assert_eq!(result.root, 1.0);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.function_value, 0.0);
    }

    #[test]
    fn test_solve_with_dispatch() {
        let f = parse("x^2-2");
        let solver = ScalarRootFinder::new(8);
        let c = parse("-0.25");
        for method in RootFindingMethod::iter() {
            let result = solver.solve_with(method, &f, Some(&c), 1.0, 2.0).unwrap();
            assert_relative_eq!(result.root, 2f64.sqrt(), epsilon = 1e-6);
            assert_eq!(result.method, method);
        }
        // Newton derives f' itself
        let result = solver
            .solve_with(RootFindingMethod::Newton, &f, None, 1.0, 2.0)
            .unwrap();
        assert_relative_eq!(result.root, 2f64.sqrt(), epsilon = 1e-6);
        assert!(matches!(
            solver.solve_with(RootFindingMethod::FixedPoint, &f, None, 1.0, 2.0),
            Err(RootFindingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_method_names() {
        assert_eq!(RootFindingMethod::FixedPoint.to_string(), "fixed_point");
        assert_eq!(
            RootFindingMethod::from_str("Newton"),
            Ok(RootFindingMethod::Newton)
        );
        assert_eq!(
            RootFindingMethod::from_str("fast"),
            Ok(RootFindingMethod::Accelerated)
        );
        assert_eq!(
            RootFindingMethod::from_str("dichotomy"),
            Ok(RootFindingMethod::Bisection)
        );
        assert!(RootFindingMethod::from_str("secant").is_err());
        assert!(RootFindingMethod::Accelerated.needs_iteration_function());
        assert!(!RootFindingMethod::Newton.needs_iteration_function());
    }

    #[test]
    fn test_tolerance() {
        assert_eq!(tolerance(0), 1.0);
        assert_relative_eq!(tolerance(6), 1e-6, epsilon = 1e-15);
        assert_relative_eq!(ScalarRootFinder::default().tolerance(), 1e-6, epsilon = 1e-15);
    }
}
