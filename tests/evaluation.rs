use calc::error::ErrorKind;
use calc::{evaluate, is_matched, Calculator, Limits, Number, Output};
use std::str::FromStr;

fn number(text: &str) -> Number {
    Number::from_str(text).unwrap()
}

/// Value of the last statement of `program`.
fn eval(program: &str) -> Number {
    let outputs = evaluate(program).unwrap_or_else(|e| panic!("{:?} failed: {}", program, e));
    outputs.last().expect("program produced no output").value().clone()
}

fn eval_error(program: &str) -> ErrorKind {
    match evaluate(program) {
        Ok(outputs) => panic!("{:?} unexpectedly produced {:?}", program, outputs),
        Err(error) => error.kind,
    }
}

fn approx(program: &str, expected: f64) {
    let actual = eval(program).to_f64();
    assert!(
        (actual - expected).abs() < 1e-9,
        "{:?} gave {}, expected about {}",
        program,
        actual,
        expected
    );
}

#[test]
fn thirds_add_up_to_exactly_one() {
    assert_eq!(eval("1/3 + 1/3 + 1/3"), Number::from(1));
    assert_eq!(eval("1/3 + 1/3 + 1/3").to_string(), "1");
}

#[test]
fn decimal_arithmetic_is_exact() {
    assert_eq!(eval("0.1 + 0.2"), number("0.3"));
    assert_eq!(eval("1.1 * 1.1"), number("1.21"));
    assert_eq!(eval("10 - 0.01"), number("9.99"));
    assert_eq!(eval("1 / 8"), number("0.125"));
}

#[test]
fn non_terminating_results_are_rounded_for_display() {
    assert_eq!(eval("2 / 3"), number("0.6666666666666666666666666667"));

    let outputs = Calculator::with_limits(Limits::default().with_precision(5))
        .parse("1/3")
        .unwrap();
    assert_eq!(outputs[0].value(), &number("0.33333"));
}

#[test]
fn precedence_follows_the_table() {
    assert_eq!(eval("2 + 3 * 4"), Number::from(14));
    assert_eq!(eval("(2 + 3) * 4"), Number::from(20));
    assert_eq!(eval("10 - 4 - 3"), Number::from(3));
    assert_eq!(eval("2 * 3 ^ 2"), Number::from(18));
    // '^' is left-associative
    assert_eq!(eval("2 ^ 3 ^ 2"), Number::from(64));
    // prefix minus binds tighter than '^'
    assert_eq!(eval("-2 ^ 2"), Number::from(4));
    // '!' binds tighter than '^'
    assert_eq!(eval("2 ^ 3!"), Number::from(64));
    // prefix minus binds tighter than '!'
    assert!(eval("-3!").is_nan());
}

#[test]
fn modulo_keeps_the_sign_of_the_dividend() {
    assert_eq!(eval("10 % 3"), Number::from(1));
    assert_eq!(eval("-7 % 3"), Number::from(-1));
    assert_eq!(eval("7 % -3"), Number::from(1));
    assert_eq!(eval("5.5 % 2"), number("1.5"));
}

#[test]
fn power_overflow_compares_raw_operands() {
    assert_eq!(eval_error("2^201"), ErrorKind::Overflow);
    assert_eq!(eval_error("201^2"), ErrorKind::Overflow);
    assert_eq!(eval_error("200.5^1"), ErrorKind::Overflow);
    // (-201)^2: the base is below 200, so the guard does not trip
    assert_eq!(eval("-201^2"), Number::from(40401));
    assert!(evaluate("2^-201").is_ok());
}

#[test]
fn powers_are_exact_for_integer_exponents() {
    assert_eq!(
        eval("2^200"),
        number("1606938044258990275541962092341162602522202993782792835301376")
    );
    assert_eq!(eval("2^-2"), number("0.25"));
    assert_eq!(eval("1.5^2"), number("2.25"));
    assert_eq!(eval("7^0"), Number::from(1));
    assert_eq!(eval("4^0.5"), Number::from(2));
    assert_eq!(eval_error("0^-1"), ErrorKind::DivisionByZero);
    assert!(eval("(-8)^(1/3)").is_nan());
}

#[test]
fn factorial_limits_and_values() {
    assert_eq!(eval_error("51!"), ErrorKind::Overflow);
    assert_eq!(
        eval("50!"),
        number("30414093201713378043612608166064768844377641568960512000000000000")
    );
    assert!(eval("50!").is_integer());
    assert_eq!(eval("0!"), Number::from(1));
    assert_eq!(eval("5!"), Number::from(120));
    assert_eq!(eval("3!!"), Number::from(720));
    assert!(eval("(-1)!").is_nan());
    approx("0.5!", 0.886226925452758);
    approx("(-0.5)!", 1.772453850905516);
    assert!(evaluate("49.5!").is_ok());
    assert_eq!(eval_error("50.5!"), ErrorKind::Overflow);
    assert_eq!(eval_error("inf!"), ErrorKind::Overflow);
}

#[test]
fn reserved_names_cannot_be_assigned() {
    assert_eq!(eval_error("pi = 3"), ErrorKind::Reserved("pi".to_string()));
    assert_eq!(eval_error("e = 3"), ErrorKind::Reserved("e".to_string()));
    assert_eq!(eval_error("round = 1"), ErrorKind::Reserved("round".to_string()));
    // checked before the value is evaluated
    assert_eq!(eval_error("tau = 1/0"), ErrorKind::Reserved("tau".to_string()));
}

#[test]
fn failed_assignment_leaves_variables_untouched() {
    let mut calculator = Calculator::new();
    assert!(calculator.parse("x = 1").is_ok());
    assert!(calculator.parse("x = 1/0").is_err());
    assert_eq!(calculator.variable("x"), Some(&Number::from(1)));
    assert!(calculator.parse("pi = 2").is_err());
    assert_eq!(calculator.variable("pi"), None);
}

#[test]
fn assignment_then_use() {
    let outputs = evaluate("x = 3\nx + 1").unwrap();
    assert_eq!(
        outputs,
        vec![
            Output::Assignment {
                name: "x".to_string(),
                value: Number::from(3),
            },
            Output::Value(Number::from(4)),
        ]
    );
    assert_eq!(outputs[0].to_string(), "x = 3");
    assert_eq!(outputs[1].to_string(), "4");
}

#[test]
fn reassignment_uses_the_latest_value() {
    let outputs = evaluate("x = 1; x = x + 1; x * 10").unwrap();
    let lines: Vec<String> = outputs.iter().map(ToString::to_string).collect();
    assert_eq!(lines, vec!["x = 1", "x = 2", "20"]);
}

#[test]
fn variables_keep_full_precision() {
    // the stored value is not the rounded one that was displayed
    assert_eq!(eval("x = 1/3; x * 3"), Number::from(1));
}

#[test]
fn undefined_names() {
    assert_eq!(eval_error("y + 1"), ErrorKind::UndefinedVariable("y".to_string()));
    assert_eq!(
        eval_error("unknownfunc(1)"),
        ErrorKind::UndefinedVariable("unknownfunc".to_string())
    );
    // the function name is looked up before its argument is evaluated
    assert_eq!(
        eval_error("unknownfunc(y)"),
        ErrorKind::UndefinedVariable("unknownfunc".to_string())
    );
}

#[test]
fn constants() {
    approx("pi", std::f64::consts::PI);
    approx("π", std::f64::consts::PI);
    approx("e", std::f64::consts::E);
    approx("tau", std::f64::consts::TAU);
    approx("τ / 2 - π", 0.0);
    assert_eq!(eval("inf"), Number::INFINITY);
    assert_eq!(eval("∞"), Number::INFINITY);
    assert!(eval("nan").is_nan());
    assert!(eval("NaN").is_nan());
}

#[test]
fn functions() {
    assert_eq!(eval("sqrt(16)"), Number::from(4));
    assert_eq!(eval("sqrt(16)").to_string(), "4");
    approx("sqrt(2)", std::f64::consts::SQRT_2);
    assert!(eval("sqrt(-1)").is_nan());
    assert_eq!(eval("abs(-3.5)"), number("3.5"));
    assert_eq!(eval("round(2.5)"), Number::from(2));
    assert_eq!(eval("round(3.5)"), Number::from(4));
    assert_eq!(eval("round(-2.7)"), Number::from(-3));
    assert_eq!(eval("sin(0)"), Number::from(0));
    assert_eq!(eval("cos(0)"), Number::from(1));
    approx("sin(pi)", 0.0);
    approx("tan(pi / 4)", 1.0);
}

#[test]
fn non_finite_arithmetic() {
    assert_eq!(eval("inf + 1"), Number::INFINITY);
    assert_eq!(eval("-inf"), Number::NEG_INFINITY);
    assert_eq!(eval("∞ * -1"), Number::NEG_INFINITY);
    assert!(eval("inf - inf").is_nan());
    assert!(eval("inf * 0").is_nan());
    assert!(eval("nan + 1").is_nan());
    assert_eq!(eval("1 / inf"), Number::from(0));
    assert_eq!(eval("inf / 0"), Number::INFINITY);
    assert_eq!(eval("abs(-inf)"), Number::INFINITY);
    assert_eq!(eval_error("inf ^ 2"), ErrorKind::Overflow);
    assert_eq!(eval_error("2 ^ inf"), ErrorKind::Overflow);
    assert_eq!(eval("2 ^ -inf"), Number::from(0));
    assert_eq!(eval("inf").to_string(), "Infinity");
    assert_eq!(eval("-inf").to_string(), "-Infinity");
}

#[test]
fn division_by_zero() {
    assert_eq!(eval_error("1 / 0"), ErrorKind::DivisionByZero);
    assert_eq!(eval_error("0 / 0"), ErrorKind::DivisionByZero);
    assert_eq!(eval_error("3 % 0"), ErrorKind::DivisionByZero);
}

#[test]
fn errors_discard_earlier_results() {
    let error = evaluate("1\n2\ny").unwrap_err();
    assert_eq!(error.kind, ErrorKind::UndefinedVariable("y".to_string()));
    assert_eq!(error.line(), 3);
}

#[test]
fn error_lines_count_every_separator() {
    assert_eq!(evaluate("1;;;\ny").unwrap_err().line(), 5);
    assert_eq!(evaluate("x = 1\n\n(2").unwrap_err().line(), 3);
    assert_eq!(evaluate("2 ^ 300").unwrap_err().line(), 1);
}

#[test]
fn fresh_instances_give_identical_results() {
    let program = "a = 2\nb = a ^ 10 / 3\nb % 7; sqrt(a) * pi";
    let first = Calculator::new().parse(program).unwrap();
    let second = Calculator::new().parse(program).unwrap();
    assert_eq!(first, second);
}

#[test]
fn instances_do_not_share_variables() {
    let mut first = Calculator::new();
    first.parse("a = 5").unwrap();
    assert_eq!(first.parse("a * 2").unwrap(), vec![Output::Value(Number::from(10))]);

    let mut second = Calculator::new();
    assert_eq!(
        second.parse("a * 2").unwrap_err().kind,
        ErrorKind::UndefinedVariable("a".to_string())
    );
}

#[test]
fn empty_programs_have_no_results() {
    assert!(evaluate("").unwrap().is_empty());
    assert!(evaluate(" \t\n;\n ").unwrap().is_empty());
}

#[test]
fn operator_chains_at_the_length_limit() {
    let sum = "1+".repeat(999) + "1";
    assert_eq!(sum.len(), 1999);
    assert_eq!(eval(&sum), Number::from(1000));

    let product = "1*".repeat(999) + "2";
    assert_eq!(eval(&product), Number::from(2));

    let powers = "2".to_string() + &"^1".repeat(999);
    assert_eq!(eval(&powers), Number::from(2));

    let factorials = "0".to_string() + &"!".repeat(1999);
    assert_eq!(factorials.len(), 2000);
    assert_eq!(eval(&factorials), Number::from(1));

    // an error at the end of a long chain is still an ordinary error
    let unfinished = "1+".repeat(999);
    assert_eq!(eval_error(&unfinished), ErrorKind::Parsing("EOF".to_string()));
}

#[test]
fn chained_powers_stay_bounded() {
    // -9^199 is below 200, so it may be raised again, but the result is refused
    assert_eq!(eval_error("a = -9^199; b = a^199; b^199"), ErrorKind::Overflow);
    assert!(evaluate("a = -9^199; a^2").is_ok());
    // the reciprocal of a power that large is below the smallest kept place
    assert_eq!(eval("a = -(10^100); a^-199"), Number::from(0));
}

#[test]
fn repeated_squaring_stays_bounded() {
    let program = "a = 9^200".to_string() + &"; a = a*a".repeat(24);
    assert_eq!(eval_error(&program), ErrorKind::Overflow);

    assert_eq!(eval("a = 10^200; a*a*a*a*a*a*a*a*a"), number("1e1800"));
    assert_eq!(
        eval_error("a = 10^200; a*a*a*a*a*a*a*a*a*a"),
        ErrorKind::Overflow
    );
}

#[test]
fn tiny_magnitudes_round_to_zero() {
    let program = "a = 0.1^200".to_string() + &"; a = a*a".repeat(24) + "; a + 1";
    assert_eq!(eval(&program), Number::from(1));

    let huge = "a = 10^200; b = a*a*a*a*a*a*a*a*a";
    assert_eq!(eval(&format!("{}; -b^-2", huge)), number("1e-3600"));
    assert_eq!(eval(&format!("{}; -b^-3", huge)), Number::from(0));
}

#[test]
fn custom_limits() {
    let limits = Limits::default().with_max_depth(2).with_max_input_len(10);
    let mut calculator = Calculator::with_limits(limits);
    assert!(calculator.parse("((1))").is_ok());
    assert_eq!(calculator.parse("(((1)))").unwrap_err().kind, ErrorKind::TooDeep(2));
    assert_eq!(calculator.parse("1+2+3+4+5+6").unwrap_err().kind, ErrorKind::TooLong(10));
}

#[test]
fn bracket_matching() {
    assert!(!is_matched("[]()()(((([])))"));
    assert!(is_matched("[](){{{[]}}}"));
    assert!(is_matched(""));
    assert!(!is_matched("(]"));
    assert!(!is_matched(")("));
    assert!(is_matched("sqrt((1 + 2) * [3])"));
}

#[test]
fn user_messages_name_the_problem() {
    let error = evaluate("y + 1").unwrap_err();
    assert!(error.user_message().contains("'y'"));
    assert_eq!(error.to_string(), "'y' is not defined");

    let error = evaluate("1 +").unwrap_err();
    assert!(error.user_message().contains("ended too early"));
    assert!(error.help.is_some());
}
