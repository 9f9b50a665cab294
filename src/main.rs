#![allow(non_snake_case)]
use RustedEquationSolver::numerical::root_finding::RootFindingMethod;
use RustedEquationSolver::numerical::solve_task::{SolveTask, TaskError};
use RustedEquationSolver::symbolic::parse_expr::prepare_for_display;
use RustedEquationSolver::symbolic::registry::Registry;
use std::process::ExitCode;

/// x^2-2 on (0;3) with Newton's method
fn demo_task() -> SolveTask {
    let mut task = SolveTask::new("x^2-2", "(0;3)", RootFindingMethod::Newton);
    task.set_precision(10);
    task.set_search_step(Some(0.5));
    task.set_loglevel(Some("warn".to_string()));
    task
}

fn run(argument: Option<String>) -> Result<(), TaskError> {
    let task = match argument.as_deref() {
        Some("--functions") => {
            println!("{}", Registry::global().names().join(" "));
            return Ok(());
        }
        Some(path) => SolveTask::from_file(path)?,
        None => {
            println!("usage: RustedEquationSolver <task-file> | --functions, running the demo task");
            demo_task()
        }
    };
    println!("formula for display: {}", prepare_for_display(&task.equation));
    let report = task.solve()?;
    println!("{}", report);
    Ok(())
}

fn main() -> ExitCode {
    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
