/// Brackets for the root search: `IntervalSet` parsed from "(a;b)&(c;d)"
/// Example#1
/// ```
/// use RustedEquationSolver::numerical::interval::IntervalSet;
/// let set: IntervalSet = "(1;2)&(3;4)&(5;1)".parse().unwrap();
/// // (5;1) is not an interval and is dropped
/// assert_eq!(set.len(), 2);
/// assert!(set.contains(3.5));
/// ```
pub mod interval;
/// Scalar root finding: fixed-point iterations, accelerated iterations, Newton's method, bisection
/// and the bracket scan looking for sign changes
/// Example#1
/// ```
/// use RustedEquationSolver::numerical::interval::IntervalSet;
/// use RustedEquationSolver::numerical::root_finding::{split_interval, bisection};
/// use RustedEquationSolver::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("x^2-2").unwrap();
/// let set: IntervalSet = "(-3;3)".parse().unwrap();
/// // find brackets with a sign change, then refine each of them
/// let (brackets, samples) = split_interval(&f, &set, 0.5).unwrap();
/// println!("{} brackets after {} samples", brackets.len(), samples);
/// for bracket in &brackets {
///     let result = bisection(&f, bracket.a(), bracket.b(), 8).unwrap();
///     println!("root = {}, iterations = {}", result.root, result.iterations);
/// }
/// ```
pub mod root_finding;
/// Complete solve workflow: equation and interval as strings, chosen method, logging setup and a
/// printable report
/// Example#1
/// ```
/// use RustedEquationSolver::numerical::root_finding::RootFindingMethod;
/// use RustedEquationSolver::numerical::solve_task::SolveTask;
/// let mut task = SolveTask::new("x^2-2", "(0;3)", RootFindingMethod::Newton);
/// task.set_precision(10);
/// // Newton starts from the left end of a bracket, f'(0) = 0 so look for brackets first
/// task.set_search_step(Some(0.5));
/// task.set_loglevel(Some("off".to_string()));
/// let report = task.solve().unwrap();
/// println!("{}", report);
/// assert_eq!(report.roots.len(), 1);
/// ```
/// Example#2
/// ```
/// // or from a task document
/// use RustedEquationSolver::numerical::solve_task::SolveTask;
/// let document = r#"
///     equation
///       f: "\cos{x} - x"
///       c: 0.5
///     solver
///       method: fixed_point
///       precision: 8
///       loglevel: off
///     interval
///       range: "(0;1)"
/// "#;
/// let task = SolveTask::from_document(document).unwrap();
/// let report = task.solve().unwrap();
/// assert!((report.roots[0].root - 0.7390851).abs() < 1e-6);
/// ```
pub mod solve_task;
