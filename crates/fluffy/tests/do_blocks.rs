use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fluffy::{
    BuildError, Callable, EvalError, EvalOptions, Evaluator, Expr, Fallible, InvalidRange, List,
    MonadKind, MonadicFn, Step, StepSequence, Value, evaluate, parse_fluffy_toml,
};

/// A callable that counts how often it runs.
fn counted<F>(name: &str, arity: usize, f: F) -> (Callable, Arc<AtomicUsize>)
where
    F: Fn(Vec<Value>) -> Fallible + Send + Sync + 'static,
{
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let callable = Callable::new(name, arity, move |args| {
        counter.fetch_add(1, Ordering::SeqCst);
        f(args)
    });
    (callable, calls)
}

fn int(value: &Value) -> Result<i64, EvalError> {
    value.as_int().ok_or_else(|| EvalError::type_mismatch("Int", value.type_name()))
}

fn ints(values: &[i64]) -> Value {
    Value::list(values.iter().copied().map(Value::Int))
}

fn pair(a: i64, b: i64) -> Value {
    Value::tuple([Value::Int(a), Value::Int(b)])
}

fn triples() -> StepSequence {
    StepSequence::builder("triples")
        .param("n")
        .bind("a", Expr::range(Expr::lit(1), Expr::var("n")))
        .bind("b", Expr::range(Expr::var("a"), Expr::var("n")))
        .bind("c", Expr::range(Expr::var("b"), Expr::var("n")))
        .then(Expr::if_(
            (Expr::var("a") * Expr::var("a") + Expr::var("b") * Expr::var("b"))
                .equals(Expr::var("c") * Expr::var("c")),
            Expr::list([Expr::lit(())]),
            Expr::list([]),
        ))
        .ret(Expr::tuple([Expr::var("a"), Expr::var("b"), Expr::var("c")]))
        .build()
        .expect("triples is well formed")
}

#[test]
fn progressions_follow_their_step() {
    assert_eq!(
        Value::from(List::range(1, 5)),
        ints(&[1, 2, 3, 4, 5])
    );
    assert_eq!(
        Value::from(List::progression(1, 3, 9).expect("valid range")),
        ints(&[1, 3, 5, 7, 9])
    );
    assert_eq!(
        List::progression(1, 1, 5),
        Err(InvalidRange::ZeroStep { start: 1, end: 5 })
    );
}

#[test]
fn maybe_block_adds_bound_values() {
    let (triple, calls) = counted("triple", 1, |args| {
        Ok(Value::just(Value::Int(int(&args[0])? * 3)))
    });
    let sequence = StepSequence::builder("sum")
        .param("m1")
        .bind("a", Expr::var("m1"))
        .bind("b", Expr::call(Expr::lit(triple), [Expr::var("a")]))
        .ret(Expr::var("a") + Expr::var("b"))
        .build()
        .expect("valid");

    let result = evaluate(&sequence, MonadKind::Maybe, vec![Value::just(Value::Int(2))]);
    assert_eq!(result, Ok(Value::just(Value::Int(8))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let result = evaluate(&sequence, MonadKind::Maybe, vec![Value::nothing()]);
    assert_eq!(result, Ok(Value::nothing()));
    assert_eq!(calls.load(Ordering::SeqCst), 1, "continuation ran after Nothing");
}

#[test]
fn list_binds_enumerate_in_row_major_order() {
    let sequence = StepSequence::builder("pairs")
        .bind("x", Expr::range(Expr::lit(1), Expr::lit(3)))
        .bind("y", Expr::range(Expr::lit(1), Expr::lit(3)))
        .ret(Expr::tuple([Expr::var("x"), Expr::var("y")]))
        .build()
        .expect("valid");
    let expected = Value::list(
        (1..=3).flat_map(|x| (1..=3).map(move |y| pair(x, y))),
    );
    assert_eq!(evaluate(&sequence, MonadKind::List, vec![]), Ok(expected));
}

#[test]
fn list_bind_reruns_only_later_steps() {
    let (first, first_calls) = counted("first", 0, |_| Ok(ints(&[1, 2, 3])));
    let (second, second_calls) = counted("second", 1, |args| {
        let x = int(&args[0])?;
        Ok(ints(&[x, x * 10]))
    });
    let sequence = StepSequence::builder("fan_out")
        .bind("x", Expr::call(Expr::lit(first), []))
        .bind("y", Expr::call(Expr::lit(second), [Expr::var("x")]))
        .ret(Expr::var("y"))
        .build()
        .expect("valid");
    assert_eq!(
        evaluate(&sequence, MonadKind::List, vec![]),
        Ok(ints(&[1, 10, 2, 20, 3, 30]))
    );
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 3);
}

#[test]
fn result_error_short_circuits() {
    let (finish, calls) = counted("finish", 1, |args| Ok(args[0].clone()));
    let sequence = StepSequence::builder("checked")
        .bind("a", Expr::success(Expr::lit(1)))
        .bind("b", Expr::failure(Expr::lit("boom")))
        .ret(Expr::call(
            Expr::lit(finish),
            [Expr::var("a") + Expr::var("b")],
        ))
        .build()
        .expect("valid");
    let result = evaluate(&sequence, MonadKind::Result, vec![]).expect("evaluates");
    assert_eq!(result, Value::error("boom"));
    assert_eq!(result.to_string(), "Error \"boom\"");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn safe_callables_feed_result_blocks() {
    let divide = Callable::new("divide", 2, |args| {
        let (a, b) = (int(&args[0])?, int(&args[1])?);
        a.checked_div(b).map(Value::Int).ok_or(EvalError::DivisionByZero)
    })
    .safe();
    let sequence = StepSequence::builder("ratio")
        .param("a")
        .param("b")
        .bind(
            "q",
            Expr::call(Expr::lit(divide), [Expr::var("a"), Expr::var("b")]),
        )
        .ret(Expr::var("q") + Expr::lit(1))
        .build()
        .expect("valid");
    let checked = MonadicFn::new(MonadKind::Result, sequence);
    assert_eq!(
        checked.call(vec![Value::Int(9), Value::Int(3)]),
        Ok(Value::success(Value::Int(4)))
    );
    assert_eq!(
        checked.call(vec![Value::Int(9), Value::Int(0)]),
        Ok(Value::error("division by zero"))
    );
}

#[test]
fn duplicate_names_fail_at_build() {
    let err = StepSequence::build(
        vec![
            Step::bind("a", Expr::just(Expr::lit(1))),
            Step::bind("a", Expr::just(Expr::lit(2))),
            Step::ret(Expr::var("a")),
        ],
        vec![],
    )
    .expect_err("duplicate binding");
    assert_eq!(err, BuildError::DuplicateBinding("a".to_string()));
}

#[test]
fn arity_is_checked_before_any_step_runs() {
    let (probe, calls) = counted("probe", 0, |_| Ok(Value::just(Value::Unit)));
    let sequence = StepSequence::builder("needs_two")
        .param("x")
        .param("y")
        .bind("p", Expr::call(Expr::lit(probe), []))
        .ret(Expr::var("x"))
        .build()
        .expect("valid");
    let err = evaluate(&sequence, MonadKind::Maybe, vec![Value::Int(1)])
        .expect_err("one argument is missing");
    assert_eq!(
        err,
        EvalError::ArityMismatch {
            name: "needs_two".to_string(),
            expected: 2,
            found: 1,
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn bound_values_must_belong_to_the_target_monad() {
    let sequence = StepSequence::builder("mixed")
        .bind("a", Expr::just(Expr::lit(1)))
        .ret(Expr::var("a"))
        .build()
        .expect("valid");
    assert_eq!(
        evaluate(&sequence, MonadKind::List, vec![]),
        Err(EvalError::type_mismatch("List", "Maybe"))
    );
}

#[test]
fn identity_block_is_plain_sequencing() {
    let sequence = StepSequence::builder("plain")
        .bind("a", Expr::identity(Expr::lit(20)))
        .let_("b", Expr::var("a") + Expr::lit(1))
        .bind("c", Expr::identity(Expr::var("b") * Expr::lit(2)))
        .ret(Expr::var("c"))
        .build()
        .expect("valid");
    let result = evaluate(&sequence, MonadKind::Identity, vec![]).expect("evaluates");
    assert_eq!(result.to_string(), "Identity 42");
}

#[test]
fn reader_block_runs_against_the_supplied_environment() {
    let halve = Callable::new("halve", 1, |args| Ok(Value::Int(int(&args[0])? / 2)));
    let sequence = StepSequence::builder("scaled")
        .param("x")
        .bind("env", Expr::Ask)
        .bind("half", Expr::asks(Expr::lit(halve)))
        .ret(Expr::var("x") * Expr::var("env") + Expr::var("half"))
        .build()
        .expect("valid");
    let reader = evaluate(&sequence, MonadKind::Function, vec![Value::Int(3)]).expect("reader");
    assert_eq!(reader.run_reader(Value::Int(10)), Ok(Value::Int(35)));
    assert_eq!(reader.run_reader(Value::Int(2)), Ok(Value::Int(7)));
}

#[test]
fn reader_failures_surface_when_run() {
    let sequence = StepSequence::builder("divide_env")
        .bind("env", Expr::Ask)
        .ret(Expr::lit(100) / Expr::var("env"))
        .build()
        .expect("valid");
    let reader = evaluate(&sequence, MonadKind::Function, vec![]).expect("reader");
    assert_eq!(reader.run_reader(Value::Int(4)), Ok(Value::Int(25)));
    assert_eq!(
        reader.run_reader(Value::Int(0)),
        Err(EvalError::DivisionByZero)
    );
}

#[test]
fn invalid_range_aborts_evaluation() {
    let sequence = StepSequence::builder("stuck")
        .bind(
            "x",
            Expr::progression(Expr::lit(1), Expr::lit(1), Expr::lit(5)),
        )
        .ret(Expr::var("x"))
        .build()
        .expect("valid");
    assert_eq!(
        evaluate(&sequence, MonadKind::List, vec![]),
        Err(EvalError::InvalidRange(InvalidRange::ZeroStep {
            start: 1,
            end: 5
        }))
    );
}

#[test]
fn pythagorean_triples_up_to_fifteen() {
    let result = evaluate(&triples(), MonadKind::List, vec![Value::Int(15)]).expect("evaluates");
    insta::assert_snapshot!(
        result.to_string(),
        @"List[(3, 4, 5), (5, 12, 13), (6, 8, 10), (9, 12, 15)]"
    );
}

#[test]
fn million_element_bind_completes() {
    let sequence = StepSequence::builder("wide")
        .bind("x", Expr::range(Expr::lit(1), Expr::lit(1_000_000)))
        .ret(Expr::var("x"))
        .build()
        .expect("valid");
    let result = evaluate(&sequence, MonadKind::List, vec![]).expect("evaluates");
    let list = result.as_list().expect("a list");
    assert_eq!(list.len(), 1_000_000);
    assert_eq!(list.iter().last(), Some(&Value::Int(1_000_000)));
    assert_eq!(result.clone(), result);
}

#[test]
fn parallel_list_bind_matches_sequential() {
    let sequential = evaluate(&triples(), MonadKind::List, vec![Value::Int(30)]).expect("sequential");
    let parallel = Evaluator::new(EvalOptions::parallel(2))
        .evaluate(&triples(), MonadKind::List, vec![Value::Int(30)])
        .expect("parallel");
    assert_eq!(sequential, parallel);
    assert_eq!(sequential.as_list().map(List::len), Some(11));
}

#[test]
fn configured_options_reach_the_evaluator() {
    let config = parse_fluffy_toml(
        "[eval]\nparallel_list_bind = true\nparallel_threshold = 4\n",
    )
    .expect("config");
    let evaluator = Evaluator::new(config.eval);
    assert!(evaluator.options().parallel_list_bind);
    let result = evaluator
        .evaluate(&triples(), MonadKind::List, vec![Value::Int(15)])
        .expect("evaluates");
    assert_eq!(
        result.to_string(),
        "List[(3, 4, 5), (5, 12, 13), (6, 8, 10), (9, 12, 15)]"
    );
}
