use super::CompileError;

use std::collections::HashMap;
use std::fmt;

/// Expression tree of the rule language
///
/// Infix operators are already turned into calls of the canonical operator functions, so the
/// tree consists only of bare names, numbers and function calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Name(String),
    Number(i64),
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Expr::Name(n) => write!(f, "{}", n),
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i != 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Named expressions of a script, substituted into each other on demand
///
/// Every bare name equal to a binding is substituted, whatever argument it stands for. A binding
/// thus shadows a piece identifier with the same name.
pub struct Bindings<'a> {
    exprs: HashMap<&'a str, &'a Expr>,
    resolved: HashMap<&'a str, Expr>,
    stack: Vec<&'a str>,
}

impl<'a> Bindings<'a> {
    pub fn new(exprs: impl IntoIterator<Item = (&'a str, &'a Expr)>) -> Bindings<'a> {
        Bindings {
            exprs: exprs.into_iter().collect(),
            resolved: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Returns the expression bound to `name` with all the references expanded
    pub fn resolve(&mut self, name: &'a str) -> Result<Expr, CompileError> {
        if let Some(e) = self.resolved.get(name) {
            return Ok(e.clone());
        }
        if self.stack.contains(&name) {
            return Err(CompileError::Cycle(name.to_string()));
        }
        let Some(&body) = self.exprs.get(name) else {
            return Ok(Expr::Name(name.to_string()));
        };
        self.stack.push(name);
        let res = self.expand(body);
        self.stack.pop();
        let res = res?;
        self.resolved.insert(name, res.clone());
        Ok(res)
    }

    /// Expands references inside `e`
    pub fn expand(&mut self, e: &'a Expr) -> Result<Expr, CompileError> {
        match e {
            Expr::Name(n) if self.exprs.contains_key(n.as_str()) => self.resolve(n),
            Expr::Name(_) | Expr::Number(_) => Ok(e.clone()),
            Expr::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.expand(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::call(name.clone(), args))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Expr {
        Expr::Name(s.into())
    }

    #[test]
    fn test_display() {
        let e = Expr::call(
            "has_rank",
            vec![
                Expr::call(
                    "relative",
                    vec![Expr::Number(0), Expr::Number(-1), name("to")],
                ),
                Expr::Number(8),
            ],
        );
        assert_eq!(e.to_string(), "has_rank(relative(0,-1,to),8)");
    }

    #[test]
    fn test_expand() {
        let a = Expr::call("AND", vec![name("b"), name("c")]);
        let b = Expr::call("has_rank", vec![name("sq"), name("n")]);
        let c = name("true");
        let sq = Expr::call("relative", vec![Expr::Number(0), Expr::Number(1), name("to")]);
        let n = Expr::Number(8);
        let mut bindings =
            Bindings::new([("a", &a), ("b", &b), ("c", &c), ("sq", &sq), ("n", &n)]);
        assert_eq!(
            bindings.resolve("a").unwrap().to_string(),
            "AND(has_rank(relative(0,1,to),8),true)"
        );
    }

    #[test]
    fn test_cycle() {
        let a = Expr::call("NOT", vec![name("b")]);
        let b = Expr::call("OR", vec![name("true"), name("a")]);
        let mut bindings = Bindings::new([("a", &a), ("b", &b)]);
        assert_eq!(bindings.resolve("a"), Err(CompileError::Cycle("a".into())));

        let s = name("s");
        let mut bindings = Bindings::new([("s", &s)]);
        assert_eq!(bindings.resolve("s"), Err(CompileError::Cycle("s".into())));
    }
}
