#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a LaTeX-like String formula into an expression tree
///
///# Example
/// ```
/// use RustedEquationSolver::symbolic::symbolic_engine::Expr;
/// let input = "\\sqrt{x}*\\ln{x}+x^2";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// println!("{}, value at x = 1: {}  \n", input, parsed_expression.eval_at(1.0));
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// name -> operator kind lookup consulted by the parser
pub mod registry;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) holds the expression tree and evaluates it at a point
/// 2) computes the analytical derivative of a tree
/// 3) turns a tree into a string for printing and control results
///# Example#
/// ```
/// use RustedEquationSolver::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("\\sin{x}*x").unwrap();
/// // differentiate with respect to x
/// let df_dx = f.differentiate();
/// println!("df_dx = {}", df_dx);
/// // compare numerical and analytical derivatives on a linspace
/// let (deviation, ok) = f.compare_num1D(-2.0, 2.0, 50, 1e-3);
/// println!("max deviation = {}, passed = {}", deviation, ok);
/// assert!(ok);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
///______________________________________________________________________________________________________________________________________________
/// the collection of utility functions mainly for bracket parsing and proceeding
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
