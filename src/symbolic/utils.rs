
// the collection of utility functions mainly for bracket parsing and proceeding

/// Finds the first `open` at or after `start` and its matching `close`, skipping nested
/// pairs of the same type. Returns the text strictly between them and the position just
/// past the close. Without an opener (or without a matching close) the input is returned
/// unchanged together with `start`.
pub fn find_brace(input: &str, start: usize, open: u8, close: u8) -> (&str, usize) {
    let bytes = input.as_bytes();
    for i in start..bytes.len() {
        if bytes[i] != open {
            continue;
        }
        let mut brace_ignore_count = 0;
        for j in i + 1..bytes.len() {
            if bytes[j] == close {
                if brace_ignore_count == 0 {
                    return (&input[i + 1..j], j + 1);
                }
                brace_ignore_count -= 1;
            } else if bytes[j] == open {
                brace_ignore_count += 1;
            }
        }
        break;
    }
    (input, start)
}

/// position right after a `\name`: letters and `_` starting from `start`
pub fn find_end_of_name(input: &str, start: usize) -> usize {
    input.as_bytes()[start.min(input.len())..]
        .iter()
        .position(|c| !(c.is_ascii_alphabetic() || *c == b'_'))
        .map_or(input.len(), |pos| start + pos)
}

// find position of the first given char that is outside () and {} brackets
pub fn find_char_position_outside_brackets(s: &str, c: u8) -> Option<usize> {
    let mut level = 0i32;
    for (i, ch) in s.bytes().enumerate() {
        match ch {
            b'(' | b'{' => level += 1,
            b')' | b'}' => level -= 1,
            _ if ch == c && level == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// if the whole string is a single `{...}` group returns its content
pub fn strip_braces(s: &str) -> &str {
    let s = s.trim();
    if s.starts_with('{') {
        let (inner, end) = find_brace(s, 0, b'{', b'}');
        if end == s.len() {
            return inner;
        }
    }
    s
}

pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    if num_values < 2 {
        return vec![start; num_values];
    }
    let mut values = Vec::with_capacity(num_values);
    let step = (end - start) / (num_values as f64 - 1.0);

    for i in 0..num_values {
        let value = start + (i as f64 * step);
        values.push(value);
    }

    values
}

// central difference
pub fn numerical_derivative<F>(f: F, x_values: Vec<f64>, h: f64) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    let mut derivatives = Vec::with_capacity(x_values.len());

    for &x in &x_values {
        let f_x_plus_h = f(x + h);
        let f_x_minus_h = f(x - h);
        let derivative = (f_x_plus_h - f_x_minus_h) / (2.0 * h);
        derivatives.push(derivative);
    }

    derivatives
}

pub fn max_deviation(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}
