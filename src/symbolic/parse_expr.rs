//! a module turns a LaTeX-like string into an expression tree
//!# Example
//! ```
//! use RustedEquationSolver::symbolic::symbolic_engine::Expr;
//! let parsed_expression = Expr::parse_expression("\\frac{x^2}{2}+\\sin{x}*3").unwrap();
//! println!(" parsed_expression {}", parsed_expression);
//! assert_eq!(parsed_expression.eval_at(0.0), 0.0);
//! ```
use crate::symbolic::registry::Registry;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{
    find_brace, find_char_position_outside_brackets, find_end_of_name, strip_braces,
};
use log::{debug, warn};
use regex::Regex;
use std::f64::consts::{E, PI};
use std::fmt;
use std::sync::OnceLock;
//                  scan diagram for "2*x+\frac{1}{x}-3/x"
//                |  operands (deferred)    | operators |
//                |_________________________|___________|
//                |  2 , x , \frac{1}{x} ,  |  * + - /  |
//                |  3 , x                  |           |
//                |_________________________|___________|
//                | pass 1: collapse * and /            |
//                |   (2*x) + \frac{1}{x} - (3/x)       |
//                |_____________________________________|
//                | pass 2: left fold                   |
//                |   ((2*x) + frac) - (3/x)            |
//                |_____________________________________|

/// recursion budget used when none is given explicitly
pub const DEFAULT_DEPTH: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// nesting of groups/function arguments is deeper than the budget
    DepthExhausted,
    /// `\name` without a registry entry
    UnknownFunction(String),
    /// a term that is neither a function, a group, `e`, `x` nor a number
    InvalidNumber(String),
    /// empty formula or empty operand (`1+`)
    EmptyInput,
    /// a function is missing its `{...}` argument
    MissingArgument(String),
    /// text left after a complete term, e.g. `(x)(x)`
    TrailingInput(String),
    /// `(` without its matching `)`
    UnbalancedBrackets(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::DepthExhausted => write!(f, "Reached depth limit, invalid input!"),
            ParseError::UnknownFunction(name) => write!(f, "No such function found: {}", name),
            ParseError::InvalidNumber(term) => write!(f, "Cannot parse term '{}'", term),
            ParseError::EmptyInput => write!(f, "Empty expression or operand"),
            ParseError::MissingArgument(name) => {
                write!(f, "Function {} is missing its {{...}} argument", name)
            }
            ParseError::TrailingInput(rest) => write!(f, "Unexpected input '{}'", rest),
            ParseError::UnbalancedBrackets(term) => write!(f, "Unbalanced brackets in '{}'", term),
        }
    }
}

impl std::error::Error for ParseError {}

/// Operand text split off during the operator scan, parsed right away. Only lives inside
/// a single `parse_expression` call.
#[derive(Debug)]
struct DeferredText {
    text: String,
    parsed: Expr,
}

impl DeferredText {
    fn new(text: &str, depth: usize, registry: &Registry) -> Result<DeferredText, ParseError> {
        let parsed = parse_expression(text, depth, registry)?;
        Ok(DeferredText {
            text: text.to_string(),
            parsed,
        })
    }
}

#[derive(Debug)]
enum Token {
    Deferred(DeferredText),
    Resolved(Expr),
    Operator(Expr),
}

impl Token {
    fn into_expr(self) -> Expr {
        match self {
            Token::Deferred(deferred) => deferred.parsed,
            Token::Resolved(expr) | Token::Operator(expr) => expr,
        }
    }

    fn binds_tighter(&self) -> bool {
        match self {
            Token::Operator(op) => op.kind().is_some_and(|kind| kind.binds_tighter()),
            _ => false,
        }
    }
}

impl Expr {
    /// parses with the default registry and depth budget
    pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
        parse_expression(input, DEFAULT_DEPTH, Registry::global())
    }
}

fn descend(depth: usize) -> Result<usize, ParseError> {
    depth.checked_sub(1).ok_or_else(|| {
        warn!("Depth limit reached, can't parse string!");
        ParseError::DepthExhausted
    })
}

fn construct(registry: &Registry, name: &str) -> Result<Expr, ParseError> {
    registry
        .construct(name)
        .ok_or_else(|| ParseError::UnknownFunction(name.to_string()))
}

/// `-` (or `+`) that belongs to a number or a negation instead of being a binary operator:
/// nothing to its left in the current operand, right after `^`, or the exponent sign of `1e-5`
/// (also `2.e-3`)
fn is_prefix_sign(input: &str, last_op: usize, i: usize) -> bool {
    let left = input[last_op..i].trim_end();
    if left.is_empty() || left.ends_with('^') {
        return true;
    }
    let bytes = left.as_bytes();
    let n = bytes.len();
    n >= 2
        && (bytes[n - 1] == b'e' || bytes[n - 1] == b'E')
        && (bytes[n - 2].is_ascii_digit()
            || (n >= 3 && bytes[n - 2] == b'.' && bytes[n - 3].is_ascii_digit()))
        && left.len() == i - last_op
        && input.as_bytes().get(i + 1).is_some_and(u8::is_ascii_digit)
}

/// Main recursive parsing function.
///
/// `depth` is decremented for every nested group, function argument or power operand;
/// going below zero fails with `ParseError::DepthExhausted`.
pub fn parse_expression(input: &str, depth: usize, registry: &Registry) -> Result<Expr, ParseError> {
    let mut tokens: Vec<Token> = Vec::new();
    let bytes = input.as_bytes();
    // start with +-*/ and \div, \times
    let mut level = 0i32;
    let mut last_op = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'{' => level += 1,
            b')' | b'}' => level -= 1,
            b'\\' if level == 0 => {
                let end = find_end_of_name(input, i + 1);
                let name = &input[i + 1..end];
                if name == "times" || name == "div" {
                    tokens.push(Token::Deferred(DeferredText::new(
                        &input[last_op..i],
                        depth,
                        registry,
                    )?));
                    tokens.push(Token::Operator(construct(registry, name)?));
                    last_op = end;
                }
                i = end.max(i + 1);
                continue;
            }
            b'-' | b'+' if level == 0 && is_prefix_sign(input, last_op, i) => {}
            b'+' | b'-' | b'*' | b'/' if level == 0 => {
                tokens.push(Token::Deferred(DeferredText::new(
                    &input[last_op..i],
                    depth,
                    registry,
                )?));
                tokens.push(Token::Operator(construct(registry, &input[i..i + 1])?));
                last_op = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    // if found none, the whole input is a single term
    if tokens.is_empty() {
        return parse_term(input, depth, registry);
    }

    tokens.push(Token::Deferred(DeferredText::new(
        &input[last_op..],
        depth,
        registry,
    )?));
    debug!(
        "operands of '{}': {:?}",
        input,
        tokens
            .iter()
            .filter_map(|token| match token {
                Token::Deferred(deferred) => Some(deferred.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
    );

    // first pass: multiply/divide with their neighbours
    let mut i = 1;
    while i < tokens.len() {
        if tokens[i].binds_tighter() {
            let right = tokens.remove(i + 1).into_expr();
            let mut op = tokens.remove(i).into_expr();
            let left = tokens.remove(i - 1).into_expr();
            op.add_input(left);
            op.add_input(right);
            tokens.insert(i - 1, Token::Resolved(op));
        } else {
            i += 2;
        }
    }

    // second pass: left fold of what remains
    let mut tokens = tokens.into_iter();
    let mut left = match tokens.next() {
        Some(token) => token.into_expr(),
        None => return Err(ParseError::EmptyInput),
    };
    while let (Some(op), Some(right)) = (tokens.next(), tokens.next()) {
        let mut op = op.into_expr();
        op.add_input(left);
        op.add_input(right.into_expr());
        left = op;
    }
    Ok(left)
}

fn parse_term(input: &str, depth: usize, registry: &Registry) -> Result<Expr, ParseError> {
    let term = input.trim();
    if term.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    // negation binds looser than ^, so -x^2 is -(x^2)
    if let Some(rest) = term.strip_prefix('-') {
        if let Ok(number) = term.parse::<f64>() {
            return Ok(Expr::Const(number));
        }
        let mut negation = construct(registry, "-")?;
        negation.add_input(parse_expression(rest, depth, registry)?);
        return Ok(negation);
    }
    if let Some(rest) = term.strip_prefix('+') {
        return parse_expression(rest, depth, registry);
    }

    // ^ outside of any group: base and exponent, each optionally wrapped in {}
    if let Some(pos) = find_char_position_outside_brackets(term, b'^') {
        let depth = descend(depth)?;
        let mut pow = construct(registry, "pow")?;
        pow.add_input(parse_expression(strip_braces(&term[..pos]), depth, registry)?);
        pow.add_input(parse_expression(strip_braces(&term[pos + 1..]), depth, registry)?);
        return Ok(pow);
    }

    // contents of () braces
    if term.starts_with('(') {
        let (inner, end) = find_brace(term, 0, b'(', b')');
        if end == 0 {
            return Err(ParseError::UnbalancedBrackets(term.to_string()));
        }
        if end != term.len() {
            return Err(ParseError::TrailingInput(term[end..].to_string()));
        }
        return parse_expression(inner, descend(depth)?, registry);
    }
    if term.starts_with('{') {
        let (inner, end) = find_brace(term, 0, b'{', b'}');
        if end == term.len() {
            return parse_expression(inner, descend(depth)?, registry);
        }
    }

    if term.starts_with('\\') {
        return parse_function(term, depth, registry);
    }

    match term {
        "e" => Ok(Expr::Const(E)),
        "x" => Ok(Expr::Var),
        _ => term
            .parse::<f64>()
            .map(Expr::Const)
            .map_err(|_| ParseError::InvalidNumber(term.to_string())),
    }
}

fn parse_function(term: &str, depth: usize, registry: &Registry) -> Result<Expr, ParseError> {
    let name_end = find_end_of_name(term, 1);
    let name = &term[1..name_end];
    if name == "pi" {
        let rest = term[name_end..].trim();
        if !rest.is_empty() {
            return Err(ParseError::TrailingInput(rest.to_string()));
        }
        return Ok(Expr::Const(PI));
    }

    // case of frac and log: two brace groups
    let (registry_name, groups) = match name {
        "frac" => ("frac", 2),
        "log_" => ("log", 2),
        other => (other, 1),
    };
    let mut function = construct(registry, registry_name)?;
    let depth = descend(depth)?;
    let mut position = name_end;
    for _ in 0..groups {
        let (argument, end) = find_brace(term, position, b'{', b'}');
        if end == position {
            return Err(ParseError::MissingArgument(name.to_string()));
        }
        let skipped = term[position..end - argument.len() - 2].trim();
        if !skipped.is_empty() {
            return Err(ParseError::TrailingInput(skipped.to_string()));
        }
        function.add_input(parse_expression(argument, depth, registry)?);
        position = end;
    }
    let rest = term[position..].trim();
    if !rest.is_empty() {
        return Err(ParseError::TrailingInput(rest.to_string()));
    }
    Ok(function)
}

fn display_function_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\(sin|cos|tan|cot|ln)").expect("valid function pattern"))
}

/// Prepares a formula for the formula-display collaborator: function names get a `\brac`
/// marker (after the base group for `\log_{..}`), then every backslash is doubled.
/// One-way and cosmetic, the result is not meant to be parsed again.
pub fn prepare_for_display(input: &str) -> String {
    let marked = display_function_regex().replace_all(input, r"\${1}\brac");
    let mut output = marked.into_owned();

    let mut pos = 0;
    while let Some(found) = output[pos..].find("\\log_") {
        let start = pos + found;
        let (_, end) = find_brace(&output, start, b'{', b'}');
        if end != start {
            output.insert_str(end, "\\brac");
        }
        pos = start + 5;
    }

    output.replace('\\', "\\\\")
}

/// parses a list of formulas with the default registry
pub fn parse_vector_expression(inputs: &[&str]) -> Result<Vec<Expr>, ParseError> {
    inputs.iter().map(|input| Expr::parse_expression(input)).collect()
}
