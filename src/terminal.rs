use log::{debug, warn};
use rcalc::{evaluate_in, format_float, Function, Mode};
use std::collections::BTreeMap;

/// Front-end session: active mode plus in-memory variables
pub(crate) struct Session {
    pub(crate) mode: Mode,
    pub(crate) vars: BTreeMap<String, f64>,
}

impl Session {
    pub(crate) fn new(mode: Mode) -> Self {
        Session {
            mode,
            vars: BTreeMap::new(),
        }
    }

    /// Execute a single line: `name = expr` or a bare expression
    ///
    /// Returns the text to print. The value is also stored as `ans`.
    pub(crate) fn execute_line(&mut self, input: &str) -> Result<String, String> {
        match input.split_once('=') {
            Some((name, expr)) => {
                let name = assignment_target(name)?;
                let text = self.evaluate(expr)?;
                self.store(&name, &text);
                Ok(format!("{} = {}", name, text))
            }
            None => self.evaluate(input),
        }
    }

    fn evaluate(&mut self, expr: &str) -> Result<String, String> {
        let text = evaluate_in(self.mode, expr, &self.vars).map_err(|e| e.to_string())?;
        self.store("ans", &text);
        Ok(text)
    }

    /// Store a rendered result as an f64 variable
    fn store(&mut self, name: &str, text: &str) {
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                debug!("{} <- {}", name, text);
                self.vars.insert(name.to_string(), value);
            }
            _ => warn!("'{}' not stored: {} is outside the f64 range", name, text),
        }
    }

    /// Variable listing for `:vars`
    pub(crate) fn describe_vars(&self) -> String {
        self.vars
            .iter()
            .map(|(name, value)| format!("{} = {}", name, format_float(*value)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Validate the left side of an assignment, folded to lowercase
fn assignment_target(raw: &str) -> Result<String, String> {
    let name = raw.trim().to_ascii_lowercase();
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(format!("invalid variable name '{}'", raw.trim()));
    }
    if Function::from_name(&name).is_some() {
        return Err(format!("'{}' is a function name and cannot be assigned", name));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_then_use() {
        let mut session = Session::new(Mode::Float);
        assert_eq!(session.execute_line("Rate = 1/4").unwrap(), "rate = 0.25");
        assert_eq!(session.execute_line("rate * 8").unwrap(), "2");
        assert_eq!(session.vars.get("ans"), Some(&2.0));
    }

    #[test]
    fn ans_carries_across_lines() {
        let mut session = Session::new(Mode::BigInt);
        session.execute_line("6 * 7").unwrap();
        assert_eq!(session.execute_line("ans + 1").unwrap(), "43");
    }

    #[test]
    fn failed_line_keeps_previous_ans() {
        let mut session = Session::new(Mode::Float);
        session.execute_line("10").unwrap();
        assert!(session.execute_line("1/0").is_err());
        assert_eq!(session.vars.get("ans"), Some(&10.0));
    }

    #[test]
    fn rejects_bad_targets() {
        let mut session = Session::new(Mode::Float);
        assert!(session.execute_line("2x = 3").is_err());
        assert!(session.execute_line("sin = 3").is_err());
        assert!(session.execute_line(" = 3").is_err());
    }

    #[test]
    fn describe_vars_is_sorted() {
        let mut session = Session::new(Mode::Float);
        session.execute_line("b = 2").unwrap();
        session.execute_line("a = 1.5").unwrap();
        assert_eq!(session.describe_vars(), "a = 1.5\nans = 1.5\nb = 2");
    }
}
