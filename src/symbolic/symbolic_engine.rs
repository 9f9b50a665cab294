//! # Symbolic Engine Module
//!
//! This module provides the expression tree used throughout the crate: a formula parsed
//! from a string becomes an `Expr`, which can be evaluated at a point, copied and
//! differentiated (see `symbolic_engine_derivatives`).
//!
//! ## Main Structures and Methods
//!
//! ### `OperatorKind` Enum
//! The closed set of operator/function kinds. Every kind knows
//! - its minimum number of arguments (`arity`)
//! - whether it is resolved before the additive operators (`binds_tighter`)
//! - its numeric function (`function`)
//!
//! ### `Expr` Enum
//! - **Constants**: `Const(f64)`
//! - **Variable**: `Var` - the single free variable `x`
//! - **Operators**: `Op { kind, args }` - n-ary node exclusively owning its children
//!
//! ### Key Methods
//! - `evaluate(x)` - evaluate the tree at `x`, returning a fresh `Const`
//! - `value()` - scalar held by a `Const`
//! - `eval_at(x)` - shortcut for `evaluate(x).value()`
//! - `is_variable()` - does the subtree contain `x`
//! - `copy()` - deep independent clone
//!
//! ## Interesting Code Features
//!
//! 1. **Owned children**: operators keep their arguments in a `Vec<Expr>`, so a tree is
//!    never shared and `Clone` is a structural deep copy
//!
//! 2. **Operator Overloading**: `std::ops` traits (Add, Sub, Mul, Div, Neg) build new
//!    operator nodes, which keeps the differentiation rules readable
//!
//! 3. **Degraded evaluation**: an operator with fewer arguments than it requires evaluates
//!    to zero and logs a warning instead of failing

#![allow(non_camel_case_types)]

use log::warn;
use std::fmt;
use strum_macros::{Display, EnumIter};

/// Kind tag of an operator node.
///
/// `Display` gives the canonical function name, which is also the name the kind is
/// registered under in the default `Registry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum OperatorKind {
    #[strum(serialize = "add")]
    Add,
    #[strum(serialize = "sub")]
    Subtract,
    #[strum(serialize = "mul")]
    Multiply,
    #[strum(serialize = "div")]
    Divide,
    #[strum(serialize = "pow")]
    Power,
    #[strum(serialize = "sign")]
    Sign,
    #[strum(serialize = "abs")]
    Abs,
    #[strum(serialize = "sqrt")]
    Sqrt,
    #[strum(serialize = "sin")]
    Sin,
    #[strum(serialize = "cos")]
    Cos,
    #[strum(serialize = "tan")]
    Tan,
    #[strum(serialize = "cot")]
    Cot,
    #[strum(serialize = "ln")]
    Ln,
    #[strum(serialize = "log")]
    Log,
}

impl OperatorKind {
    /// Minimum number of arguments accepted
    pub fn arity(&self) -> usize {
        match self {
            OperatorKind::Add
            | OperatorKind::Multiply
            | OperatorKind::Divide
            | OperatorKind::Power
            | OperatorKind::Log => 2,
            _ => 1,
        }
    }

    /// Multiplicative tier: collapsed with its neighbours before the additive fold
    pub fn binds_tighter(&self) -> bool {
        matches!(self, OperatorKind::Multiply | OperatorKind::Divide)
    }

    /// Numeric function of the node. The caller guarantees `input.len() >= self.arity()`.
    pub fn function(&self, input: &[f64]) -> f64 {
        match self {
            OperatorKind::Add => input.iter().sum(),
            OperatorKind::Multiply => input.iter().product(),
            OperatorKind::Subtract => match input {
                [a, b, ..] => a - b,
                [a] => -a,
                [] => 0.0,
            },
            OperatorKind::Divide => input[0] / input[1],
            OperatorKind::Power => input[0].powf(input[1]),
            OperatorKind::Sign => sign(input[0]),
            OperatorKind::Abs => input[0].abs(),
            OperatorKind::Sqrt => input[0].sqrt(),
            OperatorKind::Sin => input[0].sin(),
            OperatorKind::Cos => input[0].cos(),
            OperatorKind::Tan => input[0].tan(),
            OperatorKind::Cot => 1.0 / input[0].tan(),
            OperatorKind::Ln => input[0].ln(),
            // log_{base}(value)
            OperatorKind::Log => input[1].ln() / input[0].ln(),
        }
    }

    fn infix_symbol(&self) -> Option<&'static str> {
        match self {
            OperatorKind::Add => Some(" + "),
            OperatorKind::Subtract => Some(" - "),
            OperatorKind::Multiply => Some(" * "),
            OperatorKind::Divide => Some(" / "),
            OperatorKind::Power => Some(" ^ "),
            _ => None,
        }
    }
}

/// -1, 0 or 1
pub fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Expression tree node.
///
/// # Examples
/// ```rust, ignore
/// use symbolic_engine::{Expr, OperatorKind};
/// let expr = Expr::Var + Expr::Const(2.0);
/// assert_eq!(expr.eval_at(1.0), 3.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numerical constant value
    Const(f64),
    /// The free variable x
    Var,
    /// Operator or function applied to its (owned) arguments
    Op { kind: OperatorKind, args: Vec<Expr> },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Var => write!(f, "x"),
            Expr::Op { kind, args } if args.is_empty() => write!(f, "{}", kind),
            Expr::Op {
                kind: OperatorKind::Subtract,
                args,
            } if args.len() == 1 => write!(f, "-({})", args[0]),
            Expr::Op { kind, args } => match kind.infix_symbol() {
                Some(symbol) if args.len() > 1 => {
                    write!(f, "(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, "{}", symbol)?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ")")
                }
                _ => {
                    write!(f, "{}(", kind)?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ")")
                }
            },
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::binary(OperatorKind::Add, self, rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::binary(OperatorKind::Subtract, self, rhs)
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::binary(OperatorKind::Multiply, self, rhs)
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::binary(OperatorKind::Divide, self, rhs)
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::unary(OperatorKind::Subtract, self)
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Operator node without arguments, arguments are attached later with `add_input`
    pub fn op(kind: OperatorKind) -> Expr {
        Expr::Op {
            kind,
            args: Vec::new(),
        }
    }

    pub fn unary(kind: OperatorKind, arg: Expr) -> Expr {
        Expr::Op {
            kind,
            args: vec![arg],
        }
    }

    pub fn binary(kind: OperatorKind, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Op {
            kind,
            args: vec![lhs, rhs],
        }
    }

    pub fn pow(self, exponent: Expr) -> Expr {
        Expr::binary(OperatorKind::Power, self, exponent)
    }

    pub fn ln(self) -> Expr {
        Expr::unary(OperatorKind::Ln, self)
    }

    pub fn sin(self) -> Expr {
        Expr::unary(OperatorKind::Sin, self)
    }

    pub fn cos(self) -> Expr {
        Expr::unary(OperatorKind::Cos, self)
    }

    pub fn sign(self) -> Expr {
        Expr::unary(OperatorKind::Sign, self)
    }

    /// Appends an argument to an operator node. Leaves have no arguments, so for them
    /// the call is logged and ignored.
    pub fn add_input(&mut self, input: Expr) {
        match self {
            Expr::Op { args, .. } => args.push(input),
            leaf => warn!("cannot attach argument {} to leaf node {}", input, leaf),
        }
    }

    pub fn kind(&self) -> Option<OperatorKind> {
        match self {
            Expr::Op { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn args(&self) -> &[Expr] {
        match self {
            Expr::Op { args, .. } => args,
            _ => &[],
        }
    }

    /// EVALUATION

    /// Evaluates the tree at `x` and returns a freshly allocated constant holding the result.
    /// An operator with fewer arguments than its arity evaluates to `Const(0)`.
    pub fn evaluate(&self, x: f64) -> Expr {
        match self {
            Expr::Const(value) => Expr::Const(*value),
            Expr::Var => Expr::Const(x),
            Expr::Op { kind, args } => {
                if args.len() < kind.arity() {
                    warn!(
                        "function {} got {} arguments which is less than {}",
                        kind,
                        args.len(),
                        kind.arity()
                    );
                    return Expr::Const(0.0);
                }
                let input: Vec<f64> = args.iter().map(|arg| arg.evaluate(x).value()).collect();
                Expr::Const(kind.function(&input))
            }
        }
    }

    /// Scalar held by a constant. An unevaluated variable or operator holds 0.
    pub fn value(&self) -> f64 {
        match self {
            Expr::Const(value) => *value,
            _ => 0.0,
        }
    }

    pub fn eval_at(&self, x: f64) -> f64 {
        self.evaluate(x).value()
    }

    /// true if the subtree contains the free variable anywhere
    pub fn is_variable(&self) -> bool {
        match self {
            Expr::Const(_) => false,
            Expr::Var => true,
            Expr::Op { args, .. } => args.iter().any(|arg| arg.is_variable()),
        }
    }

    /// full independent copy of the tree
    pub fn copy(&self) -> Expr {
        self.clone()
    }
}
