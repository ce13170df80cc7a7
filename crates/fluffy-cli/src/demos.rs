use fluffy::{BuildError, Callable, EvalError, Expr, MonadKind, StepSequence, Value};

/// A bundled do-block runnable from the command line.
pub struct Demo {
    pub name: &'static str,
    pub monad: MonadKind,
    pub summary: &'static str,
    build: fn() -> Result<StepSequence, BuildError>,
}

impl Demo {
    pub fn sequence(&self) -> Result<StepSequence, BuildError> {
        (self.build)()
    }
}

pub const DEMOS: &[Demo] = &[
    Demo {
        name: "ratio",
        monad: MonadKind::Maybe,
        summary: "2 * sqrt(x / y), Nothing when y is zero or the ratio is negative",
        build: ratio,
    },
    Demo {
        name: "triples",
        monad: MonadKind::List,
        summary: "Pythagorean triples (a, b, c) with a <= b <= c <= n",
        build: triples,
    },
    Demo {
        name: "pairs",
        monad: MonadKind::List,
        summary: "every pair (x, y) with x and y in 1..n",
        build: pairs,
    },
    Demo {
        name: "checked",
        monad: MonadKind::Result,
        summary: "2 * (a / b), failing on division by zero or a quotient over 100",
        build: checked,
    },
    Demo {
        name: "scaled",
        monad: MonadKind::Function,
        summary: "x * env + env / 2, run against --env",
        build: scaled,
    },
];

pub fn find(name: &str) -> Option<&'static Demo> {
    DEMOS.iter().find(|demo| demo.name == name)
}

fn number(value: &Value) -> Result<f64, EvalError> {
    value
        .as_float()
        .ok_or_else(|| EvalError::type_mismatch("Int or Float", value.type_name()))
}

fn integer(value: &Value) -> Result<i64, EvalError> {
    value
        .as_int()
        .ok_or_else(|| EvalError::type_mismatch("Int", value.type_name()))
}

fn sqrt() -> Callable {
    Callable::new("sqrt", 1, |args| {
        let x = number(&args[0])?;
        Ok(if x < 0.0 {
            Value::nothing()
        } else {
            Value::just(Value::Float(x.sqrt()))
        })
    })
}

fn divide() -> Callable {
    Callable::new("divide", 2, |args| {
        let (a, b) = (integer(&args[0])?, integer(&args[1])?);
        if b == 0 {
            return Err(EvalError::DivisionByZero);
        }
        a.checked_div(b)
            .map(Value::Int)
            .ok_or(EvalError::Overflow { op: "/" })
    })
}

fn halve() -> Callable {
    Callable::new("halve", 1, |args| Ok(Value::Int(integer(&args[0])? / 2)))
}

fn ratio() -> Result<StepSequence, BuildError> {
    StepSequence::builder("ratio")
        .param("x")
        .param("y")
        .bind(
            "q",
            Expr::if_(
                Expr::var("y").equals(Expr::lit(0)),
                Expr::Nothing,
                Expr::just(Expr::var("x") * Expr::lit(1.0) / Expr::var("y")),
            ),
        )
        .bind("r", Expr::call(Expr::lit(sqrt()), [Expr::var("q")]))
        .ret(Expr::lit(2.0) * Expr::var("r"))
        .build()
}

fn triples() -> Result<StepSequence, BuildError> {
    let square = |name: &str| Expr::var(name) * Expr::var(name);
    StepSequence::builder("triples")
        .param("n")
        .bind("a", Expr::range(Expr::lit(1), Expr::var("n")))
        .bind("b", Expr::range(Expr::var("a"), Expr::var("n")))
        .bind("c", Expr::range(Expr::var("b"), Expr::var("n")))
        .then(Expr::if_(
            (square("a") + square("b")).equals(square("c")),
            Expr::list([Expr::lit(())]),
            Expr::list([]),
        ))
        .ret(Expr::tuple([Expr::var("a"), Expr::var("b"), Expr::var("c")]))
        .build()
}

fn pairs() -> Result<StepSequence, BuildError> {
    StepSequence::builder("pairs")
        .param("n")
        .bind("x", Expr::range(Expr::lit(1), Expr::var("n")))
        .bind("y", Expr::range(Expr::lit(1), Expr::var("n")))
        .ret(Expr::tuple([Expr::var("x"), Expr::var("y")]))
        .build()
}

fn checked() -> Result<StepSequence, BuildError> {
    StepSequence::builder("checked")
        .param("a")
        .param("b")
        .bind(
            "q",
            Expr::call(Expr::lit(divide().safe()), [Expr::var("a"), Expr::var("b")]),
        )
        .bind(
            "bounded",
            Expr::if_(
                Expr::var("q").gt(Expr::lit(100)),
                Expr::failure(Expr::lit("quotient exceeds 100")),
                Expr::success(Expr::var("q")),
            ),
        )
        .ret(Expr::var("bounded") * Expr::lit(2))
        .build()
}

fn scaled() -> Result<StepSequence, BuildError> {
    StepSequence::builder("scaled")
        .param("x")
        .bind("env", Expr::Ask)
        .bind("half", Expr::asks(Expr::lit(halve())))
        .ret(Expr::var("x") * Expr::var("env") + Expr::var("half"))
        .build()
}
