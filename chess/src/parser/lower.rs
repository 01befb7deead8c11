//! Registration table of the rule language functions

use super::expr::Expr;
use crate::position::{Anchor, Position};
use crate::predicate::{BinaryOp, Predicate};
use crate::types::{BoardState, Comparator, MoveState, PieceMatch};

use chessrules_base::{Color, Coord};

use arrayvec::ArrayVec;
use thiserror::Error;

/// Maximum number of function arguments
pub const MAX_ARITY: usize = 4;

/// Error turning an expression into a predicate
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum BuildError {
    /// No function with such name
    #[error("unknown function {0:?}")]
    UnknownFunction(String),
    /// Bare name which is neither a constant nor a binding
    #[error("unknown name {0:?}")]
    UnknownName(String),
    /// Literal where a predicate is expected
    #[error("expected predicate, got {0:?}")]
    NotPredicate(String),
    /// Wrong number of arguments
    #[error("{function} takes {expected} arguments, got {got}")]
    Arity {
        function: String,
        expected: usize,
        got: usize,
    },
    /// Argument does not fit the parameter
    #[error("argument #{} of {}: expected {}, got {:?}", .index + 1, .function, .expected, .found)]
    BadArgument {
        function: String,
        index: usize,
        expected: &'static str,
        found: String,
    },
}

/// Kind of a function parameter, which defines the literal grammar of the argument
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Param {
    Predicate,
    BoardState,
    MoveState,
    Piece,
    Comparator,
    Number,
    Position,
    Side,
}

impl Param {
    pub fn describe(self) -> &'static str {
        match self {
            Param::Predicate => "predicate",
            Param::BoardState => "board state",
            Param::MoveState => "move state",
            Param::Piece => "piece identifier",
            Param::Comparator => "comparator",
            Param::Number => "non-negative number",
            Param::Position => "position",
            Param::Side => "side",
        }
    }
}

enum Arg {
    Predicate(Predicate),
    BoardState(BoardState),
    MoveState(MoveState),
    Piece(PieceMatch),
    Comparator(Comparator),
    Number(usize),
    Position(Position),
    Side(Color),
}

/// Converted arguments, consumed in order by the constructors
struct Args(arrayvec::IntoIter<Arg, MAX_ARITY>);

macro_rules! take_arg {
    ($name:ident, $var:ident, $ty:ty) => {
        fn $name(&mut self) -> Option<$ty> {
            match self.0.next()? {
                Arg::$var(v) => Some(v),
                _ => None,
            }
        }
    };
}

impl Args {
    take_arg!(predicate, Predicate, Predicate);
    take_arg!(board, BoardState, BoardState);
    take_arg!(moves, MoveState, MoveState);
    take_arg!(piece, Piece, PieceMatch);
    take_arg!(cmp, Comparator, Comparator);
    take_arg!(number, Number, usize);
    take_arg!(pos, Position, Position);
    take_arg!(side, Side, Color);

    fn boxed(&mut self) -> Option<Box<Predicate>> {
        self.predicate().map(Box::new)
    }
}

/// Function of the rule language
pub struct FunctionSpec {
    /// Canonical name; lookup ignores case
    pub name: &'static str,
    pub params: &'static [Param],
    build: fn(&mut Args) -> Option<Predicate>,
}

use Param as P;

const BINARY: &[Param] = &[P::Predicate, P::Predicate];

macro_rules! binary {
    ($name:literal, $op:ident) => {
        FunctionSpec {
            name: $name,
            params: BINARY,
            build: |a| Some(Predicate::Binary(BinaryOp::$op, a.boxed()?, a.boxed()?)),
        }
    };
}

static FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "NOT",
        params: &[P::Predicate],
        build: |a| Some(Predicate::Not(a.boxed()?)),
    },
    binary!("AND", And),
    binary!("OR", Or),
    binary!("IMPLIES", Implies),
    binary!("XOR", Xor),
    binary!("EQUALS", Equals),
    FunctionSpec {
        name: "attacked",
        params: &[P::BoardState, P::Piece],
        build: |a| {
            Some(Predicate::Attacked {
                state: a.board()?,
                target: a.piece()?,
            })
        },
    },
    FunctionSpec {
        name: "pieces_left",
        params: &[P::Piece, P::Comparator, P::Number, P::BoardState],
        build: |a| {
            Some(Predicate::PiecesLeft {
                target: a.piece()?,
                cmp: a.cmp()?,
                value: a.number()?,
                state: a.board()?,
            })
        },
    },
    FunctionSpec {
        name: "piece_moved",
        params: &[P::Piece, P::MoveState],
        build: |a| {
            Some(Predicate::PieceMoved {
                target: a.piece()?,
                which: a.moves()?,
            })
        },
    },
    FunctionSpec {
        name: "piece_captured",
        params: &[P::Piece, P::MoveState],
        build: |a| {
            Some(Predicate::PieceCaptured {
                target: a.piece()?,
                which: a.moves()?,
            })
        },
    },
    FunctionSpec {
        name: "has_moved",
        params: &[P::Position, P::BoardState],
        build: |a| {
            Some(Predicate::HasMoved {
                pos: a.pos()?,
                state: a.board()?,
            })
        },
    },
    FunctionSpec {
        name: "has_rank",
        params: &[P::Position, P::Number],
        build: |a| {
            Some(Predicate::HasRank {
                pos: a.pos()?,
                value: a.number()?,
            })
        },
    },
    FunctionSpec {
        name: "has_file",
        params: &[P::Position, P::Number],
        build: |a| {
            Some(Predicate::HasFile {
                pos: a.pos()?,
                value: a.number()?,
            })
        },
    },
    FunctionSpec {
        name: "square_attacked",
        params: &[P::Position, P::BoardState, P::Piece],
        build: |a| {
            Some(Predicate::SquareAttacked {
                pos: a.pos()?,
                state: a.board()?,
                attacker: a.piece()?,
            })
        },
    },
    FunctionSpec {
        name: "square_empty",
        params: &[P::Position, P::BoardState],
        build: |a| {
            Some(Predicate::SquareEmpty {
                pos: a.pos()?,
                state: a.board()?,
            })
        },
    },
    FunctionSpec {
        name: "piece_at",
        params: &[P::Position, P::Piece, P::BoardState],
        build: |a| {
            Some(Predicate::PieceAt {
                pos: a.pos()?,
                target: a.piece()?,
                state: a.board()?,
            })
        },
    },
    FunctionSpec {
        name: "move_was",
        params: &[P::Position, P::Position, P::MoveState],
        build: |a| {
            Some(Predicate::MoveWas {
                from: a.pos()?,
                to: a.pos()?,
                which: a.moves()?,
            })
        },
    },
    FunctionSpec {
        name: "first_move",
        params: &[P::MoveState],
        build: |a| Some(Predicate::FirstMove { which: a.moves()? }),
    },
    FunctionSpec {
        name: "for_every",
        params: &[P::Predicate, P::Side],
        build: |a| {
            Some(Predicate::ForEvery {
                rule: a.boxed()?,
                side: a.side()?,
            })
        },
    },
];

/// Finds the function by name, ignoring case
pub fn lookup(name: &str) -> Option<&'static FunctionSpec> {
    FUNCTIONS.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

/// Names of all the functions in the table
pub fn function_names() -> impl Iterator<Item = &'static str> {
    FUNCTIONS.iter().map(|f| f.name)
}

fn keyword<T: std::str::FromStr>(e: &Expr) -> Option<T> {
    match e {
        Expr::Name(n) => n.to_ascii_lowercase().parse().ok(),
        _ => None,
    }
}

fn position(e: &Expr) -> Option<Position> {
    let Expr::Call { name, args } = e else {
        return None;
    };
    match (name.to_ascii_lowercase().as_str(), &args[..]) {
        ("absolute", [Expr::Name(c)]) => c.parse::<Coord>().ok().map(Position::Absolute),
        ("relative", [Expr::Number(dx), Expr::Number(dy), anchor]) => Some(Position::Relative {
            dx: i8::try_from(*dx).ok()?,
            dy: i8::try_from(*dy).ok()?,
            anchor: keyword::<Anchor>(anchor)?,
        }),
        _ => None,
    }
}

fn convert(param: Param, e: &Expr) -> Result<Option<Arg>, BuildError> {
    Ok(match param {
        Param::Predicate => Some(Arg::Predicate(lower(e)?)),
        Param::BoardState => keyword(e).map(Arg::BoardState),
        Param::MoveState => keyword(e).map(Arg::MoveState),
        Param::Comparator => keyword(e).map(Arg::Comparator),
        Param::Side => keyword(e).map(Arg::Side),
        Param::Piece => match e {
            Expr::Name(n) => n.parse().ok().map(Arg::Piece),
            _ => None,
        },
        Param::Number => match e {
            Expr::Number(n) => usize::try_from(*n).ok().map(Arg::Number),
            _ => None,
        },
        Param::Position => position(e).map(Arg::Position),
    })
}

/// Turns the expression into a predicate
///
/// All the bindings must be already substituted. The only bare names allowed are `true` and
/// `false`.
pub fn lower(e: &Expr) -> Result<Predicate, BuildError> {
    match e {
        Expr::Name(n) if n.eq_ignore_ascii_case("true") => Ok(Predicate::TRUE),
        Expr::Name(n) if n.eq_ignore_ascii_case("false") => Ok(Predicate::FALSE),
        Expr::Name(n) => Err(BuildError::UnknownName(n.clone())),
        Expr::Number(n) => Err(BuildError::NotPredicate(n.to_string())),
        Expr::Call { name, args } => {
            let spec = lookup(name).ok_or_else(|| BuildError::UnknownFunction(name.clone()))?;
            if args.len() != spec.params.len() {
                return Err(BuildError::Arity {
                    function: spec.name.to_string(),
                    expected: spec.params.len(),
                    got: args.len(),
                });
            }
            let mut values = ArrayVec::<Arg, MAX_ARITY>::new();
            for (index, (&param, arg)) in spec.params.iter().zip(args).enumerate() {
                let bad = || BuildError::BadArgument {
                    function: spec.name.to_string(),
                    index,
                    expected: param.describe(),
                    found: arg.to_string(),
                };
                let value = convert(param, arg)?.ok_or_else(bad)?;
                values.try_push(value).map_err(|_| bad())?;
            }
            (spec.build)(&mut Args(values.into_iter())).ok_or_else(|| BuildError::Arity {
                function: spec.name.to_string(),
                expected: spec.params.len(),
                got: args.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Expr {
        Expr::Name(s.into())
    }

    fn num(n: i64) -> Expr {
        Expr::Number(n)
    }

    fn rel(dx: i64, dy: i64, anchor: &str) -> Expr {
        Expr::call("relative", vec![num(dx), num(dy), name(anchor)])
    }

    #[test]
    fn test_table() {
        for f in function_names() {
            let spec = lookup(&f.to_ascii_uppercase()).unwrap();
            assert_eq!(spec.name, f);
            assert!(spec.params.len() <= MAX_ARITY);
        }
        assert!(lookup("absolute").is_none());
    }

    #[test]
    fn test_lower() {
        let e = Expr::call(
            "and",
            vec![
                Expr::call("HAS_RANK", vec![rel(0, -1, "To"), num(8)]),
                Expr::call(
                    "piece_at",
                    vec![
                        Expr::call("absolute", vec![name("e4")]),
                        name("ROYAL_WHITE"),
                        name("NEXT_STATE"),
                    ],
                ),
            ],
        );
        let p = lower(&e).unwrap();
        assert_eq!(
            p.to_string(),
            "AND(has_rank(relative(0,-1,to),8),piece_at(absolute(e4),ROYAL_WHITE,next_state))"
        );
        assert_eq!(lower(&name("TRUE")), Ok(Predicate::TRUE));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            lower(&Expr::call("checkmate", vec![])),
            Err(BuildError::UnknownFunction("checkmate".into()))
        );
        assert_eq!(
            lower(&name("mate")),
            Err(BuildError::UnknownName("mate".into()))
        );
        assert_eq!(
            lower(&Expr::call("first_move", vec![])),
            Err(BuildError::Arity {
                function: "first_move".into(),
                expected: 1,
                got: 0
            })
        );
        assert_eq!(
            lower(&Expr::call("has_rank", vec![rel(0, 200, "to"), num(8)])),
            Err(BuildError::BadArgument {
                function: "has_rank".into(),
                index: 0,
                expected: "position",
                found: "relative(0,200,to)".into(),
            })
        );
        assert_eq!(
            lower(&Expr::call("has_file", vec![rel(0, 0, "to"), num(-1)])),
            Err(BuildError::BadArgument {
                function: "has_file".into(),
                index: 1,
                expected: "non-negative number",
                found: "-1".into(),
            })
        );
        assert_eq!(
            lower(&Expr::call("first_move", vec![name("now")])),
            Err(BuildError::BadArgument {
                function: "first_move".into(),
                index: 0,
                expected: "move state",
                found: "now".into(),
            })
        );
        assert_eq!(
            lower(&Expr::call("NOT", vec![num(1)])),
            Err(BuildError::NotPredicate("1".into()))
        );
    }
}
