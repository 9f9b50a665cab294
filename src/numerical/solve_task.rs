//! # Solve task
//!
//! End-to-end root search: parse the equation and its derivative, read the interval,
//! optionally scan it for sign changes, then run the chosen method on every bracket.
//!
//! A task is built with `SolveTask::new` and setters or read from a task document:
//! ```text
//! equation
//!   f: "x^2 - 2"
//!   c: -0.25
//! solver
//!   method: fixed_point
//!   precision: 8
//!   loglevel: info
//!   log_to_file: false
//! interval
//!   range: "(-3;3)"
//!   search_step: 0.5
//! ```
//! `c` is the iteration function c(x) used by `fixed_point` and `accelerated`.
use crate::Utils::task_parser::{DocumentMap, Value, first_value, parse_document_as, template};
use crate::numerical::interval::{IntervalSet, NumericPair};
use crate::numerical::root_finding::{
    RootFindingError, RootFindingMethod, ScalarRootFinder, split_interval,
};
use crate::symbolic::parse_expr::{DEFAULT_DEPTH, ParseError, parse_expression};
use crate::symbolic::registry::Registry;
use crate::symbolic::symbolic_engine::Expr;
use chrono::Local;
use log::{debug, error, info, warn};
use simplelog::*;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use tabled::{Table, Tabled, settings::Style};

#[derive(Debug)]
pub enum TaskError {
    Parse(ParseError),
    Solver(RootFindingError),
    /// the interval text holds no valid (a;b) entry
    EmptyInterval(String),
    /// fixed_point and accelerated need c(x)
    MissingIterationFunction(RootFindingMethod),
    Config(String),
    Io(std::io::Error),
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskError::Parse(e) => write!(f, "Error parsing formula: {}", e),
            TaskError::Solver(e) => write!(f, "Solver error: {}", e),
            TaskError::EmptyInterval(text) => {
                write!(f, "Entered interval '{}' is either empty or malformed", text)
            }
            TaskError::MissingIterationFunction(method) => {
                write!(f, "Method {} needs the iteration function c(x)", method)
            }
            TaskError::Config(msg) => write!(f, "Configuration error: {}", msg),
            TaskError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for TaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaskError::Parse(e) => Some(e),
            TaskError::Solver(e) => Some(e),
            TaskError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for TaskError {
    fn from(e: ParseError) -> Self {
        TaskError::Parse(e)
    }
}

impl From<RootFindingError> for TaskError {
    fn from(e: RootFindingError) -> Self {
        TaskError::Solver(e)
    }
}

impl From<std::io::Error> for TaskError {
    fn from(e: std::io::Error) -> Self {
        TaskError::Io(e)
    }
}

/// one converged bracket
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct FoundRoot {
    #[tabled(rename = "root")]
    pub root: f64,
    #[tabled(rename = "f(root)")]
    pub function_value: f64,
    #[tabled(rename = "iterations")]
    pub iterations: usize,
    #[tabled(rename = "bracket")]
    pub bracket: NumericPair,
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    pub equation: String,
    pub derivative: String,
    pub method: RootFindingMethod,
    /// number of function samples of the bracket scan, `None` when no scan was done
    pub scan_samples: Option<usize>,
    pub brackets: IntervalSet,
    pub roots: Vec<FoundRoot>,
}

impl fmt::Display for SolveReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "equation: {} = 0", self.equation)?;
        writeln!(f, "derivative: {}", self.derivative)?;
        if let Some(samples) = self.scan_samples {
            writeln!(
                f,
                "Searching for roots took {} samples, brackets: {}",
                samples, self.brackets
            )?;
        }
        if self.roots.is_empty() {
            return writeln!(f, "{}: no roots found", self.method);
        }
        writeln!(f, "method: {}", self.method)?;
        let mut table = Table::new(&self.roots);
        table.with(Style::modern_rounded());
        writeln!(f, "{}", table)
    }
}

#[derive(Debug, Clone)]
pub struct SolveTask {
    pub equation: String,
    pub iteration_function: Option<String>,
    pub method: RootFindingMethod,
    pub interval: String,
    pub precision: i32,
    pub search_step: Option<f64>,
    pub loglevel: Option<String>,
    pub log_to_file: bool,
}

impl SolveTask {
    pub fn new(equation: &str, interval: &str, method: RootFindingMethod) -> SolveTask {
        SolveTask {
            equation: equation.to_string(),
            iteration_function: None,
            method,
            interval: interval.to_string(),
            precision: 6,
            search_step: None,
            loglevel: None,
            log_to_file: false,
        }
    }
    ///////////////////////////////////SETTERS///////////////////////////////////
    pub fn set_iteration_function(&mut self, c_function: &str) {
        self.iteration_function = Some(c_function.to_string());
    }

    pub fn set_precision(&mut self, precision: i32) {
        self.precision = precision;
    }

    /// a positive step turns on the bracket scan
    pub fn set_search_step(&mut self, search_step: Option<f64>) {
        self.search_step = search_step;
    }

    /// "debug", "info", "warn", "error" or "off"/"none"; `None` means info
    pub fn set_loglevel(&mut self, loglevel: Option<String>) {
        self.loglevel = loglevel;
    }

    pub fn set_log_to_file(&mut self, log_to_file: bool) {
        self.log_to_file = log_to_file;
    }

    ///////////////////////////////////TASK DOCUMENT///////////////////////////////////
    fn document_template() -> DocumentMap {
        template(&[
            ("equation", &["f", "c"][..]),
            (
                "solver",
                &["method", "precision", "loglevel", "log_to_file"][..],
            ),
            ("interval", &["range", "search_step"][..]),
        ])
    }

    /// builds a task from a task document, see the module docs for the layout
    pub fn from_document(document: &str) -> Result<SolveTask, TaskError> {
        let template = Self::document_template();
        let doc = parse_document_as(document, Some(&template)).map_err(TaskError::Config)?;
        let text = |title: &str, key: &str| first_value(&doc, title, key).map(Value::to_string_value);

        let equation = text("equation", "f")
            .ok_or_else(|| TaskError::Config("equation f is missing".to_string()))?;
        let interval = text("interval", "range")
            .ok_or_else(|| TaskError::Config("interval range is missing".to_string()))?;
        let method = match text("solver", "method") {
            Some(name) => RootFindingMethod::from_str(&name)
                .map_err(|_| TaskError::Config(format!("unknown method '{}'", name)))?,
            None => RootFindingMethod::Newton,
        };

        let mut task = SolveTask::new(&equation, &interval, method);
        task.iteration_function = text("equation", "c");
        task.loglevel = text("solver", "loglevel");
        if let Some(value) = first_value(&doc, "solver", "precision") {
            task.precision = value
                .as_integer()
                .and_then(|p| i32::try_from(p).ok())
                .ok_or_else(|| TaskError::Config(format!("precision must be an integer, got {}", value)))?;
        }
        if let Some(value) = first_value(&doc, "solver", "log_to_file") {
            task.log_to_file = value
                .as_boolean()
                .ok_or_else(|| TaskError::Config(format!("log_to_file must be true or false, got {}", value)))?;
        }
        if let Some(value) = first_value(&doc, "interval", "search_step") {
            task.search_step = Some(value.as_float().ok_or_else(|| {
                TaskError::Config(format!("search_step must be a number, got {}", value))
            })?);
        }
        Ok(task)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SolveTask, TaskError> {
        let document = std::fs::read_to_string(path)?;
        Self::from_document(&document)
    }

    ///////////////////////////////////SOLVING///////////////////////////////////
    fn level_filter(&self) -> Result<LevelFilter, TaskError> {
        match self.loglevel.as_deref() {
            None | Some("info") => Ok(LevelFilter::Info),
            Some("debug") => Ok(LevelFilter::Debug),
            Some("warn") => Ok(LevelFilter::Warn),
            Some("error") => Ok(LevelFilter::Error),
            Some("off") | Some("none") => Ok(LevelFilter::Off),
            Some(other) => Err(TaskError::Config(format!(
                "loglevel must be debug, info, warn, error or off, got '{}'",
                other
            ))),
        }
    }

    fn init_logger(&self, level: LevelFilter) {
        if level == LevelFilter::Off {
            return;
        }
        let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )];
        let mut file_error = None;
        if self.log_to_file {
            let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
            let name = format!("log_{}.txt", date_and_time);
            match create_log_file(&name) {
                Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
                Err(e) => file_error = Some(e),
            }
        }
        // a logger installed earlier in the process stays in place
        let _ = CombinedLogger::init(loggers);
        if let Some(message) = file_error {
            warn!("{}", message);
        }
    }

    /// wrapper around the solver function to set up logging
    pub fn solve(&self) -> Result<SolveReport, TaskError> {
        let level = self.level_filter()?;
        self.init_logger(level);
        let result = self.solver();
        match &result {
            Ok(report) => {
                info!("{} roots found with {}", report.roots.len(), report.method);
                debug!("\n{}", report);
            }
            Err(e) => error!("{}", e),
        }
        result
    }

    fn solver(&self) -> Result<SolveReport, TaskError> {
        let registry = Registry::global();
        let equation = parse_expression(&self.equation, DEFAULT_DEPTH, registry)?;
        let derivative = equation.differentiate();
        info!("f(x) = {}, f'(x) = {}", equation, derivative);

        let user_interval: IntervalSet = self.interval.parse().unwrap_or_default();
        if user_interval.is_empty() {
            return Err(TaskError::EmptyInterval(self.interval.clone()));
        }

        let c_function = if self.method.needs_iteration_function() {
            let text = self
                .iteration_function
                .as_deref()
                .ok_or(TaskError::MissingIterationFunction(self.method))?;
            Some(parse_expression(text, DEFAULT_DEPTH, registry)?)
        } else {
            None
        };

        let (brackets, scan_samples) = match self.search_step {
            Some(step) if step > 0.0 => {
                let (brackets, samples) = split_interval(&equation, &user_interval, step)?;
                (brackets, Some(samples))
            }
            _ => (user_interval, None),
        };

        let aux: Option<&Expr> = match self.method {
            RootFindingMethod::Newton => Some(&derivative),
            RootFindingMethod::FixedPoint | RootFindingMethod::Accelerated => c_function.as_ref(),
            RootFindingMethod::Bisection => None,
        };
        let finder = ScalarRootFinder::new(self.precision);
        let mut roots = Vec::new();
        for bracket in &brackets {
            match finder.solve_with(self.method, &equation, aux, bracket.a(), bracket.b()) {
                Ok(result) => roots.push(FoundRoot {
                    root: result.root,
                    function_value: result.function_value,
                    iterations: result.iterations,
                    bracket: *bracket,
                }),
                Err(e) => warn!("no root in {}: {}", bracket, e),
            }
        }

        Ok(SolveReport {
            equation: equation.to_string(),
            derivative: derivative.to_string(),
            method: self.method,
            scan_samples,
            brackets,
            roots,
        })
    }
}

/// log file for the `WriteLogger`; the error is reported once the terminal logger is up
fn create_log_file(name: &str) -> Result<File, TaskError> {
    File::create(name).map_err(|e| {
        TaskError::Config(format!(
            "cannot create log file {}: {}, logging to the terminal only",
            name, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn quiet(mut task: SolveTask) -> SolveTask {
        task.set_loglevel(Some("off".to_string()));
        task
    }

    #[test]
    fn test_newton_after_scan() {
        let mut task = quiet(SolveTask::new("x^2-2", "(0;3)", RootFindingMethod::Newton));
        task.set_precision(10);
        task.set_search_step(Some(0.5));
        let report = task.solve().unwrap();
        assert_eq!(report.scan_samples, Some(6));
        assert_eq!(report.brackets.len(), 1);
        assert_eq!(report.roots.len(), 1);
        assert_relative_eq!(report.roots[0].root, 2f64.sqrt(), epsilon = 1e-9);
        assert_eq!(report.roots[0].bracket, report.brackets.get(0).copied().unwrap());
    }

    #[test]
    fn test_two_roots_with_bisection() {
        let mut task = quiet(SolveTask::new("x^2-2", "(-3;3)", RootFindingMethod::Bisection));
        task.set_search_step(Some(0.5));
        let report = task.solve().unwrap();
        let roots: Vec<f64> = report.roots.iter().map(|found| found.root).collect();
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots[0], -(2f64.sqrt()), epsilon = 1e-6);
        assert_relative_eq!(roots[1], 2f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_user_interval_without_scan() {
        let task = quiet(SolveTask::new("x-2", "(0;10)", RootFindingMethod::Bisection));
        let report = task.solve().unwrap();
        assert_eq!(report.scan_samples, None);
        assert_relative_eq!(report.roots[0].root, 2.0, epsilon = 1e-6);
        // zero step means no scan
        let mut task = task.clone();
        task.set_search_step(Some(0.0));
        assert_eq!(task.solve().unwrap().scan_samples, None);
    }

    #[test]
    fn test_fixed_point_and_accelerated() {
        for method in [RootFindingMethod::FixedPoint, RootFindingMethod::Accelerated] {
            let mut task = quiet(SolveTask::new("\\cos{x}-x", "(0;1)", method));
            task.set_iteration_function("0.5");
            task.set_precision(8);
            let report = task.solve().unwrap();
            assert_relative_eq!(report.roots[0].root, 0.7390851332, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_missing_iteration_function() {
        let task = quiet(SolveTask::new("x-1", "(0;2)", RootFindingMethod::Accelerated));
        assert!(matches!(
            task.solve(),
            Err(TaskError::MissingIterationFunction(RootFindingMethod::Accelerated))
        ));
    }

    #[test]
    fn test_failed_bracket_is_skipped() {
        // no sign change, bisection runs into the iteration cap
        let task = quiet(SolveTask::new("x^2+1", "(0;1)", RootFindingMethod::Bisection));
        let report = task.solve().unwrap();
        assert!(report.roots.is_empty());
        assert!(report.to_string().contains("no roots found"));
    }

    #[test]
    fn test_task_errors() {
        let task = quiet(SolveTask::new("x", "(5;1)", RootFindingMethod::Newton));
        assert!(matches!(task.solve(), Err(TaskError::EmptyInterval(_))));

        let task = quiet(SolveTask::new("\\foo{x}", "(0;1)", RootFindingMethod::Newton));
        assert!(matches!(
            task.solve(),
            Err(TaskError::Parse(ParseError::UnknownFunction(_)))
        ));

        let mut task = SolveTask::new("x", "(0;1)", RootFindingMethod::Newton);
        task.set_loglevel(Some("loud".to_string()));
        assert!(matches!(task.solve(), Err(TaskError::Config(_))));
    }

    #[test]
    fn test_report_table() {
        let mut task = quiet(SolveTask::new("x-1", "(0;4)", RootFindingMethod::Newton));
        task.set_search_step(Some(1.5));
        let report = task.solve().unwrap();
        let text = report.to_string();
        assert!(text.contains("equation: (x - 1) = 0"));
        assert!(text.contains("f(root)"));
        assert!(text.contains("Searching for roots took 3 samples"));
    }

    const DOCUMENT: &str = r#"
        // sqrt(2) with simple iterations
        equation
          f: "x^2 - 2"
          c: -0.25
        solver
          method: fixed_point
          precision: 8
          loglevel: off
        interval
          range: "(-3;0)&(0;3)"
          search_step: 0.5
    "#;

    #[test]
    fn test_from_document() {
        let task = SolveTask::from_document(DOCUMENT).unwrap();
        assert_eq!(task.equation, "x^2 - 2");
        assert_eq!(task.iteration_function.as_deref(), Some("-0.25"));
        assert_eq!(task.method, RootFindingMethod::FixedPoint);
        assert_eq!(task.precision, 8);
        assert_eq!(task.interval, "(-3;0)&(0;3)");
        assert_eq!(task.search_step, Some(0.5));
        assert!(!task.log_to_file);

        let report = task.solve().unwrap();
        assert_eq!(report.brackets.len(), 2);
        // phi(x) = x - 0.25 (x^2 - 2) repels from -sqrt(2), so only the positive root converges
        assert_eq!(report.roots.len(), 1);
        assert_relative_eq!(report.roots[0].root, 2f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_from_document_defaults_and_errors() {
        let task = SolveTask::from_document("equation f: x interval range: \"(0;1)\"").unwrap();
        assert_eq!(task.method, RootFindingMethod::Newton);
        assert_eq!(task.precision, 6);
        assert_eq!(task.search_step, None);
        assert_eq!(task.iteration_function, None);

        let result = SolveTask::from_document("equation f: x solver method: secant interval range: \"(0;1)\"");
        assert!(matches!(result, Err(TaskError::Config(msg)) if msg.contains("secant")));

        let result = SolveTask::from_document("interval range: \"(0;1)\"");
        assert!(matches!(result, Err(TaskError::Config(_))));

        let result = SolveTask::from_document("equation f: x solver precision: 0.5 interval range: \"(0;1)\"");
        assert!(matches!(result, Err(TaskError::Config(_))));

        let result = SolveTask::from_document("equation f: x interval range: \"(0;1)\" search_step: fast");
        assert!(matches!(result, Err(TaskError::Config(_))));
    }

    #[test]
    fn test_log_file_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("no_such_dir").join("log.txt");
        let err = create_log_file(name.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, TaskError::Config(_)));
        assert!(err.to_string().contains("cannot create log file"));

        let name = dir.path().join("log.txt");
        assert!(create_log_file(name.to_str().unwrap()).is_ok());
        assert!(name.exists());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", DOCUMENT).unwrap();
        let task = SolveTask::from_file(file.path()).unwrap();
        assert_eq!(task.method, RootFindingMethod::FixedPoint);

        let missing = file.path().with_extension("missing");
        assert!(matches!(SolveTask::from_file(missing), Err(TaskError::Io(_))));
    }
}
