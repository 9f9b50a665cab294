//! # Symbolic Engine Derivatives Module
//!
//! Analytical differentiation of `Expr` trees with respect to the free variable, plus
//! sampling helpers used to tabulate a function and to check an analytical derivative
//! against a numerical one.
//!
//! ## Key Methods
//! - `differentiate()` - analytical derivative, always a brand-new tree
//! - `tabulate()` - `(x, f(x))` pairs on a linspace, e.g. for graphing
//! - `compare_num1D()` - max deviation between analytical and central-difference derivative
//!
//! ## Interesting Code Features
//!
//! 1. **Rules per kind**: every operator kind has its own rule; rules that need exactly
//!    two arguments fall back to `Const(0)` when the node is malformed
//!
//! 2. **Constant-side shortcuts**: product, quotient and power rules only differentiate the
//!    sides that actually depend on `x`; when no side does, the result is `Const(0)`

use crate::symbolic::symbolic_engine::{Expr, OperatorKind};
use crate::symbolic::utils::{linspace, max_deviation, numerical_derivative};

impl Expr {
    /// DIFFERENTIATION

    /// Computes d/dx of the expression.
    ///
    /// Never evaluates the tree. Subtrees reused in the result are deep copies, so the
    /// derivative is independent of `self`.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::Var.pow(Expr::Const(2.0)); // x^2
    /// let df_dx = f.differentiate(); // (2 * 1) * x^(2 - 1)
    /// assert_eq!(df_dx.eval_at(3.0), 6.0);
    /// ```
    pub fn differentiate(&self) -> Expr {
        match self {
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Var => Expr::Const(1.0),
            Expr::Op { kind, args } => differentiate_op(*kind, args),
        }
    }

    /// SAMPLING

    /// `(x, f(x))` pairs for `num_values` evenly spaced points of `[start, end]`
    pub fn tabulate(&self, start: f64, end: f64, num_values: usize) -> Vec<(f64, f64)> {
        linspace(start, end, num_values)
            .into_iter()
            .map(|x| (x, self.eval_at(x)))
            .collect()
    }

    /// Compares the analytical derivative with a central-difference estimate on a linspace.
    /// Returns the largest deviation and whether it is below `max_norm`.
    pub fn compare_num1D(
        &self,
        start: f64,
        end: f64,
        num_values: usize,
        max_norm: f64,
    ) -> (f64, bool) {
        let derivative = self.differentiate();
        let domain = linspace(start, end, num_values);
        let analytical: Vec<f64> = domain.iter().map(|&x| derivative.eval_at(x)).collect();
        let numerical = numerical_derivative(|x| self.eval_at(x), domain, 1e-6);
        let deviation = max_deviation(&analytical, &numerical);
        (deviation, deviation < max_norm)
    }
}

fn differentiate_op(kind: OperatorKind, args: &[Expr]) -> Expr {
    match (kind, args) {
        (OperatorKind::Add, args) if args.len() >= 2 => Expr::Op {
            kind: OperatorKind::Add,
            args: args.iter().map(|arg| arg.differentiate()).collect(),
        },
        (OperatorKind::Subtract, [f, g]) => f.differentiate() - g.differentiate(),
        (OperatorKind::Subtract, [f]) => -f.differentiate(),
        (OperatorKind::Multiply, [f, g]) => product_rule(f, g),
        (OperatorKind::Divide, [f, g]) => quotient_rule(f, g),
        (OperatorKind::Power, [f, g]) => power_rule(f, g),
        (OperatorKind::Sign, _) => Expr::Const(0.0),
        (OperatorKind::Log, [base, f]) => log_rule(base, f),
        // unary functions, extra arguments are ignored the same way evaluation ignores them
        (kind, [f, ..]) => unary_rule(kind, f),
        _ => Expr::Const(0.0),
    }
}

// (f*g)' = f'g + fg'
fn product_rule(f: &Expr, g: &Expr) -> Expr {
    match (f.is_variable(), g.is_variable()) {
        (true, true) => f.differentiate() * g.copy() + f.copy() * g.differentiate(),
        (true, false) => f.differentiate() * g.copy(),
        (false, true) => g.differentiate() * f.copy(),
        (false, false) => Expr::Const(0.0),
    }
}

// (f/g)' = (f'g - fg')/g^2
fn quotient_rule(f: &Expr, g: &Expr) -> Expr {
    match (f.is_variable(), g.is_variable()) {
        (true, true) => {
            (f.differentiate() * g.copy() - f.copy() * g.differentiate())
                / g.copy().pow(Expr::Const(2.0))
        }
        (true, false) => f.differentiate() / g.copy(),
        // f * d/dx[g^-1]
        (false, true) => g.copy().pow(Expr::Const(-1.0)).differentiate() * f.copy(),
        (false, false) => Expr::Const(0.0),
    }
}

// (f^g)' = f^g * (g ln f)'
fn power_rule(f: &Expr, g: &Expr) -> Expr {
    match (f.is_variable(), g.is_variable()) {
        (true, true) => {
            let exponent_log = g.copy() * f.copy().ln();
            f.copy().pow(g.copy()) * exponent_log.differentiate()
        }
        (true, false) => {
            (g.copy() * f.differentiate()) * f.copy().pow(g.copy() - Expr::Const(1.0))
        }
        (false, true) => (f.copy().pow(g.copy()) * f.copy().ln()) * g.differentiate(),
        (false, false) => Expr::Const(0.0),
    }
}

// log_b(f) = ln f / ln b
fn log_rule(base: &Expr, f: &Expr) -> Expr {
    if base.is_variable() {
        let ln_f = f.copy().ln();
        let ln_b = base.copy().ln();
        (ln_f.differentiate() * ln_b.copy() - ln_f * ln_b.differentiate())
            / ln_b.pow(Expr::Const(2.0))
    } else {
        f.differentiate() / (f.copy() * base.copy().ln())
    }
}

fn unary_rule(kind: OperatorKind, f: &Expr) -> Expr {
    match kind {
        OperatorKind::Abs => f.copy().sign() * f.differentiate(),
        OperatorKind::Sqrt => f.copy().pow(Expr::Const(0.5)).differentiate(),
        OperatorKind::Sin => f.copy().cos() * f.differentiate(),
        OperatorKind::Cos => (f.copy().sin() * Expr::Const(-1.0)) * f.differentiate(),
        OperatorKind::Tan => f.differentiate() / f.copy().cos().pow(Expr::Const(2.0)),
        OperatorKind::Cot => {
            (f.differentiate() / f.copy().sin().pow(Expr::Const(2.0))) * Expr::Const(-1.0)
        }
        OperatorKind::Ln => f.differentiate() / f.copy(),
        // binary kinds and Sign never reach here with a well-formed node
        _ => Expr::Const(0.0),
    }
}
