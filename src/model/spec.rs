//! Model formulas.
//!
//! A [`ModelSpec`] is the ordered set of terms of a linear model plus an
//! optional intercept. It is usually parsed from a formula:
//!
//! ```text
//! formula   := [ response '~' ] rhs
//! rhs       := ['-'] summand ( ('+' | '-') summand )*
//! summand   := product | '1' | '0'
//! product   := interact ( '*' interact )*
//! interact  := NAME ( ':' NAME )*
//! ```
//!
//! - `A + B` adds main effects.
//! - `A:B` is exactly the interaction term {A, B}.
//! - `A*B*C` is every non-empty subset of {A, B, C}.
//! - `- 1`, `+ 0` or a leading `0` remove the intercept.
//!
//! Terms are unique (`A:B` and `B:A` are the same term) and are laid out by
//! interaction order, then by first appearance.
//!
//! ```
//! use factorial::ModelSpec;
//!
//! let spec = ModelSpec::parse("y ~ A*B*C", ["A", "B", "C", "y"]).unwrap();
//! assert_eq!(
//!     spec.labels(),
//!     vec!["Intercept", "A", "B", "C", "A:B", "A:C", "B:C", "A:B:C"]
//! );
//! assert_eq!(spec.response(), Some("y"));
//! ```

use log::debug;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::factor::INTERACTION_SEPARATOR;

/// Label used for the intercept column.
pub const INTERCEPT_LABEL: &str = "Intercept";

/// Upper bound on the operands of one `*` product (2^n - 1 terms).
const MAX_PRODUCT_OPERANDS: usize = 16;

/// One model term: the product of the named factors.
///
/// The empty term is the intercept. Equality ignores factor order.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Term {
    factors: Vec<String>,
}

impl Term {
    /// The intercept term (column of ones).
    #[must_use]
    pub fn intercept() -> Self {
        Self {
            factors: Vec::new(),
        }
    }

    /// A term over the given factors. Repeated names collapse.
    #[must_use]
    pub fn new<I, S>(factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut term = Self::intercept();
        for name in factors {
            term.push(name.into());
        }
        term
    }

    fn push(&mut self, name: String) {
        if !self.factors.contains(&name) {
            self.factors.push(name);
        }
    }

    /// Whether this is the intercept.
    #[must_use]
    pub fn is_intercept(&self) -> bool {
        self.factors.is_empty()
    }

    /// Factor names, in the order they were written.
    #[must_use]
    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    /// Interaction order (0 for the intercept, 1 for a main effect, ...).
    #[must_use]
    pub fn order(&self) -> usize {
        self.factors.len()
    }

    /// Display label, e.g. `"A:B"` or `"Intercept"`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.is_intercept() {
            INTERCEPT_LABEL.to_string()
        } else {
            self.factors.join(&INTERACTION_SEPARATOR.to_string())
        }
    }

    /// Evaluate the term for one run, looking each factor's value up.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `value_of`.
    pub fn evaluate<F>(&self, mut value_of: F) -> Result<f64>
    where
        F: FnMut(&str) -> Result<f64>,
    {
        let mut product = 1.0;
        for name in &self.factors {
            product *= value_of(name)?;
        }
        Ok(product)
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.factors.len() == other.factors.len()
            && self.factors.iter().all(|f| other.factors.contains(f))
    }
}

impl Eq for Term {}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// The terms of a linear model.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModelSpec {
    response: Option<String>,
    intercept: bool,
    terms: Vec<Term>,
}

impl ModelSpec {
    /// Build a spec from explicit terms, kept in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSpec`] if a term is repeated or is the
    /// intercept, or if the model would have no columns.
    pub fn new(terms: Vec<Term>, intercept: bool) -> Result<Self> {
        for (i, term) in terms.iter().enumerate() {
            if term.is_intercept() {
                return Err(Error::malformed_spec(
                    0,
                    "the intercept is controlled by the `intercept` flag",
                ));
            }
            if terms[..i].contains(term) {
                return Err(Error::malformed_spec(
                    0,
                    format!("term '{term}' appears more than once"),
                ));
            }
        }
        if terms.is_empty() && !intercept {
            return Err(Error::malformed_spec(0, "model has no terms"));
        }
        Ok(Self {
            response: None,
            intercept,
            terms,
        })
    }

    /// Parse a formula, checking every name against `available_factors`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSpec`] on empty or invalid input and
    /// [`Error::UnknownFactor`] if a name is not available.
    pub fn parse<I, S>(formula: &str, available_factors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let available: Vec<String> = available_factors
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let tokens = tokenize(formula)?;
        let spec = Parser::new(formula, &tokens, &available).parse()?;

        debug!(
            "parsed formula '{}' into {} columns: {}",
            formula.trim(),
            spec.n_columns(),
            spec
        );
        Ok(spec)
    }

    /// Attach a response name.
    #[must_use]
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Response name written left of `~`, if any.
    #[must_use]
    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    /// Whether the model has an intercept column.
    #[must_use]
    pub fn has_intercept(&self) -> bool {
        self.intercept
    }

    /// Non-intercept terms.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// All design-matrix columns: the intercept (if any) followed by the terms.
    #[must_use]
    pub fn columns(&self) -> Vec<Term> {
        let mut columns = Vec::with_capacity(self.n_columns());
        if self.intercept {
            columns.push(Term::intercept());
        }
        columns.extend(self.terms.iter().cloned());
        columns
    }

    /// Number of design-matrix columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.terms.len() + usize::from(self.intercept)
    }

    /// Column labels in design-matrix order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.columns().iter().map(Term::label).collect()
    }

    /// Distinct factor names used by the terms, in first-appearance order.
    #[must_use]
    pub fn factors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for term in &self.terms {
            for name in term.factors() {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(response) = &self.response {
            write!(f, "{response} ~ ")?;
        }
        if self.terms.is_empty() {
            return f.write_str(if self.intercept { "1" } else { "0" });
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{term}")?;
        }
        if !self.intercept {
            f.write_str(" - 1")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String),
    Number(String),
    Plus,
    Minus,
    Star,
    Colon,
    Tilde,
}

fn tokenize(formula: &str) -> Result<Vec<(usize, Token)>> {
    let mut tokens = Vec::new();
    let mut chars = formula.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        let token = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            ':' => Token::Colon,
            '~' => Token::Tilde,
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((pos, Token::Name(name)));
                continue;
            }
            c if c.is_ascii_digit() => {
                let mut number = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() {
                        number.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((pos, Token::Number(number)));
                continue;
            }
            other => {
                return Err(Error::malformed_spec(
                    pos,
                    format!("unexpected character '{other}'"),
                ))
            }
        };
        tokens.push((pos, token));
        chars.next();
    }

    Ok(tokens)
}

struct Parser<'a> {
    formula: &'a str,
    tokens: &'a [(usize, Token)],
    available: &'a [String],
    cursor: usize,
    intercept: bool,
    terms: Vec<Term>,
}

impl<'a> Parser<'a> {
    fn new(formula: &'a str, tokens: &'a [(usize, Token)], available: &'a [String]) -> Self {
        Self {
            formula,
            tokens,
            available,
            cursor: 0,
            intercept: true,
            terms: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<ModelSpec> {
        if self.tokens.is_empty() {
            return Err(Error::malformed_spec(0, "empty formula"));
        }

        let response = self.parse_response()?;
        self.parse_rhs()?;

        // Main effects first, then two-factor interactions, and so on.
        self.terms.sort_by_key(Term::order);

        let mut spec = ModelSpec::new(self.terms, self.intercept)
            .map_err(|_| Error::malformed_spec(self.formula.len(), "model has no terms"))?;
        spec.response = response;
        Ok(spec)
    }

    fn parse_response(&mut self) -> Result<Option<String>> {
        let tilde = self
            .tokens
            .iter()
            .position(|(_, token)| *token == Token::Tilde);
        let Some(tilde) = tilde else {
            return Ok(None);
        };

        let response = match &self.tokens[..tilde] {
            [] => None,
            [(_, Token::Name(name))] => {
                self.check_available(name)?;
                Some(name.clone())
            }
            [(pos, _), ..] => {
                return Err(Error::malformed_spec(
                    *pos,
                    "left-hand side must be a single response name",
                ))
            }
        };
        self.cursor = tilde + 1;
        Ok(response)
    }

    fn parse_rhs(&mut self) -> Result<()> {
        if self.cursor >= self.tokens.len() {
            return Err(Error::malformed_spec(
                self.formula.len(),
                "no terms after '~'",
            ));
        }

        let mut positive = true;
        if let Some((_, Token::Minus)) = self.peek() {
            positive = false;
            self.cursor += 1;
        }
        self.parse_summand(positive)?;

        while let Some((pos, token)) = self.next() {
            positive = match token {
                Token::Plus => true,
                Token::Minus => false,
                Token::Tilde => return Err(Error::malformed_spec(pos, "more than one '~'")),
                _ => return Err(Error::malformed_spec(pos, "expected '+' or '-'")),
            };
            self.parse_summand(positive)?;
        }
        Ok(())
    }

    fn parse_summand(&mut self, positive: bool) -> Result<()> {
        match self.next() {
            Some((pos, Token::Number(number))) => match number.as_str() {
                // "+ 1" keeps the intercept, "- 1" and "+ 0" remove it.
                "1" => self.intercept = positive,
                "0" => self.intercept = !positive,
                _ => {
                    return Err(Error::malformed_spec(
                        pos,
                        format!("only 0 or 1 may appear in a formula, found {number}"),
                    ))
                }
            },
            Some((pos, Token::Name(_))) => {
                if !positive {
                    return Err(Error::malformed_spec(
                        pos,
                        "only the intercept can be removed with '-'",
                    ));
                }
                self.cursor -= 1;
                let operands = self.parse_product()?;
                for term in expand_product(&operands, pos)? {
                    if !self.terms.contains(&term) {
                        self.terms.push(term);
                    }
                }
            }
            Some((pos, _)) => {
                return Err(Error::malformed_spec(pos, "expected a factor name, 0 or 1"))
            }
            None => {
                return Err(Error::malformed_spec(
                    self.formula.len(),
                    "formula ends with an operator",
                ))
            }
        }
        Ok(())
    }

    /// `interact ('*' interact)*`, returning one term per `*` operand.
    fn parse_product(&mut self) -> Result<Vec<Term>> {
        let mut operands = vec![self.parse_interaction()?];
        while let Some((_, Token::Star)) = self.peek() {
            self.cursor += 1;
            operands.push(self.parse_interaction()?);
        }
        Ok(operands)
    }

    /// `NAME (':' NAME)*`
    fn parse_interaction(&mut self) -> Result<Term> {
        let mut term = Term::intercept();
        loop {
            match self.next() {
                Some((_, Token::Name(name))) => {
                    self.check_available(&name)?;
                    term.push(name);
                }
                Some((pos, _)) => return Err(Error::malformed_spec(pos, "expected a factor name")),
                None => {
                    return Err(Error::malformed_spec(
                        self.formula.len(),
                        "formula ends with an operator",
                    ))
                }
            }
            match self.peek() {
                Some((_, Token::Colon)) => self.cursor += 1,
                _ => return Ok(term),
            }
        }
    }

    fn check_available(&self, name: &str) -> Result<()> {
        if self.available.iter().any(|a| a == name) {
            Ok(())
        } else {
            Err(Error::unknown_factor(name, self.available))
        }
    }

    fn peek(&self) -> Option<(usize, Token)> {
        self.tokens.get(self.cursor).cloned()
    }

    fn next(&mut self) -> Option<(usize, Token)> {
        let token = self.peek();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }
}

/// Every non-empty subset of the operands, by subset size then position.
fn expand_product(operands: &[Term], pos: usize) -> Result<Vec<Term>> {
    let n = operands.len();
    if n > MAX_PRODUCT_OPERANDS {
        return Err(Error::malformed_spec(
            pos,
            format!("a '*' product may have at most {MAX_PRODUCT_OPERANDS} operands, found {n}"),
        ));
    }

    let mut terms = Vec::with_capacity((1 << n) - 1);
    for size in 1..=n {
        let mut indices: Vec<usize> = (0..size).collect();
        loop {
            let mut term = Term::intercept();
            for &i in &indices {
                for name in operands[i].factors() {
                    term.push(name.clone());
                }
            }
            if !terms.contains(&term) {
                terms.push(term);
            }

            // Advance to the next combination in lexicographic order.
            let Some(i) = (0..size).rev().find(|&i| indices[i] != i + n - size) else {
                break;
            };
            indices[i] += 1;
            for j in i + 1..size {
                indices[j] = indices[j - 1] + 1;
            }
        }
    }
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC: [&str; 4] = ["A", "B", "C", "y"];

    fn labels(formula: &str) -> Vec<String> {
        ModelSpec::parse(formula, ABC).unwrap().labels()
    }

    #[test]
    fn test_main_effects() {
        assert_eq!(labels("y ~ A + B"), vec!["Intercept", "A", "B"]);
        assert_eq!(labels("A + B + C"), vec!["Intercept", "A", "B", "C"]);
    }

    #[test]
    fn test_star_expands_power_set() {
        assert_eq!(labels("y ~ A*B"), vec!["Intercept", "A", "B", "A:B"]);
        assert_eq!(
            labels("y ~ A*B*C"),
            vec!["Intercept", "A", "B", "C", "A:B", "A:C", "B:C", "A:B:C"]
        );
    }

    #[test]
    fn test_colon_is_explicit_interaction() {
        assert_eq!(labels("y ~ A:B"), vec!["Intercept", "A:B"]);
        assert_eq!(labels("y ~ A + A:B:C"), vec!["Intercept", "A", "A:B:C"]);
    }

    #[test]
    fn test_deduplication() {
        let explicit = ModelSpec::parse("y ~ A + B + A:B", ABC).unwrap();
        let star = ModelSpec::parse("y ~ A*B", ABC).unwrap();
        let both = ModelSpec::parse("y ~ A + B + A*B + B:A", ABC).unwrap();
        assert_eq!(explicit, star);
        assert_eq!(both, star);
        assert_eq!(both.n_columns(), 4);
    }

    #[test]
    fn test_first_spelling_wins() {
        assert_eq!(labels("y ~ B:A + A*B"), vec!["Intercept", "A", "B", "B:A"]);
    }

    #[test]
    fn test_star_of_interactions() {
        assert_eq!(
            labels("y ~ A*B:C"),
            vec!["Intercept", "A", "B:C", "A:B:C"]
        );
    }

    #[test]
    fn test_intercept_suppression() {
        let spec = ModelSpec::parse("y ~ A + B - 1", ABC).unwrap();
        assert!(!spec.has_intercept());
        assert_eq!(spec.labels(), vec!["A", "B"]);

        assert!(!ModelSpec::parse("y ~ 0 + A", ABC).unwrap().has_intercept());
        assert!(!ModelSpec::parse("y ~ A + 0", ABC).unwrap().has_intercept());
        assert!(!ModelSpec::parse("y ~ -1 + A", ABC).unwrap().has_intercept());
        assert!(ModelSpec::parse("y ~ 1 + A", ABC).unwrap().has_intercept());
        assert!(ModelSpec::parse("y ~ A - 1 + 1", ABC).unwrap().has_intercept());
    }

    #[test]
    fn test_intercept_only() {
        let spec = ModelSpec::parse("y ~ 1", ABC).unwrap();
        assert_eq!(spec.labels(), vec!["Intercept"]);
    }

    #[test]
    fn test_response() {
        assert_eq!(ModelSpec::parse("y ~ A", ABC).unwrap().response(), Some("y"));
        assert_eq!(ModelSpec::parse("A", ABC).unwrap().response(), None);
        assert_eq!(ModelSpec::parse("~ A", ABC).unwrap().response(), None);
    }

    #[test]
    fn test_unknown_factor() {
        match ModelSpec::parse("y ~ A + D", ABC) {
            Err(Error::UnknownFactor { name, .. }) => assert_eq!(name, "D"),
            other => panic!("expected UnknownFactor, got {other:?}"),
        }
        assert!(matches!(
            ModelSpec::parse("z ~ A", ABC),
            Err(Error::UnknownFactor { .. })
        ));
    }

    #[test]
    fn test_malformed() {
        for formula in [
            "",
            "   ",
            "y ~",
            "y ~ A +",
            "y ~ A + + B",
            "y ~ A * ",
            "y ~ A B",
            "y ~ A:",
            "y ~ (A + B)",
            "y ~ A - B",
            "y ~ A + 2",
            "y A ~ B",
            "y ~ A ~ B",
            "y ~ 0",
            "y ~ -1",
        ] {
            assert!(
                matches!(
                    ModelSpec::parse(formula, ABC),
                    Err(Error::MalformedSpec { .. })
                ),
                "'{formula}' should be malformed"
            );
        }
    }

    #[test]
    fn test_malformed_position() {
        match ModelSpec::parse("y ~ A + $", ABC) {
            Err(Error::MalformedSpec { position, .. }) => assert_eq!(position, 8),
            other => panic!("expected MalformedSpec, got {other:?}"),
        }
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let terms = vec![Term::new(["A", "B"]), Term::new(["B", "A"])];
        assert!(matches!(
            ModelSpec::new(terms, true),
            Err(Error::MalformedSpec { .. })
        ));
        assert!(ModelSpec::new(vec![], false).is_err());
        assert!(ModelSpec::new(vec![Term::intercept()], false).is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for formula in ["y ~ A + B + A:B", "y ~ A + C - 1", "y ~ 1"] {
            let spec = ModelSpec::parse(formula, ABC).unwrap();
            assert_eq!(spec.to_string(), formula);
            assert_eq!(ModelSpec::parse(&spec.to_string(), ABC).unwrap(), spec);
        }
    }

    #[test]
    fn test_factors_and_evaluate() {
        let spec = ModelSpec::parse("y ~ C*A", ABC).unwrap();
        assert_eq!(spec.factors(), vec!["C", "A"]);

        let term = Term::new(["A", "B"]);
        let value = term
            .evaluate(|name| Ok(if name == "A" { 2.0 } else { -3.0 }))
            .unwrap();
        assert_eq!(value, -6.0);
        assert_eq!(Term::intercept().evaluate(|_| Ok(5.0)).unwrap(), 1.0);
    }

    #[test]
    fn test_seven_factor_product() {
        let names = ["A", "B", "C", "D", "E", "F", "G", "y"];
        let spec = ModelSpec::parse("y ~ A*B*C*D*E*F*G", names).unwrap();
        assert_eq!(spec.n_columns(), 128);
        assert_eq!(spec.terms().last().unwrap().label(), "A:B:C:D:E:F:G");
    }
}
