use texmath::{parse, CommandRegistry, ParseError, ParseOptions, Parser, Symbolic};
use texmath_algebra::AlgebraError;
use texmath_syntax::SyntaxError;

fn syntax(input: &str) -> SyntaxError {
    match parse(input) {
        Err(ParseError::Syntax(err)) => err,
        other => panic!("expected a syntax error for {input:?}, got {other:?}"),
    }
}

#[test]
fn test_unmatched_delimiters() {
    assert_eq!(
        parse("(x + y"),
        Err(ParseError::UnmatchedDelimiter {
            delimiter: "(".into(),
            offset: 0,
        })
    );
    assert_eq!(
        parse("x)"),
        Err(ParseError::UnmatchedDelimiter {
            delimiter: ")".into(),
            offset: 1,
        })
    );
    assert_eq!(
        parse(r"\left( x"),
        Err(ParseError::UnmatchedDelimiter {
            delimiter: r"\left".into(),
            offset: 0,
        })
    );
    assert!(matches!(
        parse(r"x \right)"),
        Err(ParseError::UnmatchedDelimiter { offset: 2, .. })
    ));
}

#[test]
fn test_missing_operands() {
    assert_eq!(
        parse("x +"),
        Err(ParseError::MissingOperand {
            operator: "+".into(),
            offset: 2,
        })
    );
    assert_eq!(
        parse("* y"),
        Err(ParseError::MissingOperand {
            operator: "*".into(),
            offset: 0,
        })
    );
    assert_eq!(
        parse(r"\int x \mathrm{d}"),
        Err(ParseError::MissingOperand {
            operator: r"\mathrm{d}".into(),
            offset: 7,
        })
    );
}

#[test]
fn test_integral_needs_differential() {
    assert_eq!(
        parse(r"\int x"),
        Err(ParseError::MissingTerminator {
            construct: r"\int".into(),
            expected: r"\mathrm{d}".into(),
            offset: 0,
        })
    );
}

#[test]
fn test_sum_needs_bounds() {
    let invalid = Err(ParseError::InvalidBounds {
        construct: r"\sum".into(),
        offset: 0,
    });
    assert_eq!(parse(r"\sum x"), invalid);
    assert_eq!(parse(r"\sum_{i}^{n} x"), invalid);
    assert_eq!(parse(r"\sum_{i=1} x"), invalid);
}

#[test]
fn test_stray_comma() {
    assert_eq!(
        parse("x, y"),
        Err(ParseError::UnexpectedToken {
            token: ",".into(),
            offset: 1,
        })
    );
}

#[test]
fn test_unsupported_environment() {
    assert_eq!(
        parse(r"\begin{cases} x \end{cases}"),
        Err(ParseError::UnsupportedEnvironment {
            name: "cases".into(),
            offset: 0,
        })
    );
}

#[test]
fn test_matrix_shape_errors() {
    assert_eq!(
        parse(r"\begin{matrix} 1 & 2 \\ 3 \end{matrix}"),
        Err(ParseError::Algebra(AlgebraError::JaggedMatrix {
            row: 2,
            expected: 2,
            found: 1,
        }))
    );
    assert_eq!(
        parse(r"\begin{vmatrix} 1 & 2 \end{vmatrix}"),
        Err(ParseError::Algebra(AlgebraError::NotSquare { rows: 1, cols: 2 }))
    );
}

#[test]
fn test_syntax_errors() {
    assert_eq!(
        syntax("{x"),
        SyntaxError::UnterminatedStructure {
            construct: "group".into(),
            offset: 0,
        }
    );
    assert_eq!(
        syntax(r"\begin{a} x \end{b}"),
        SyntaxError::EnvironmentNameMismatch {
            begin: "a".into(),
            end: "b".into(),
            offset: 0,
        }
    );
    assert_eq!(syntax(r"x \"), SyntaxError::Lex { offset: 2 });
    assert!(matches!(
        syntax(r"\frac{x}"),
        SyntaxError::MissingArgument { ref command, .. } if command == r"\frac"
    ));
    assert!(matches!(
        syntax("x^"),
        SyntaxError::MissingArgument { ref command, offset: 1, .. } if command == "^"
    ));
}

#[test]
fn test_tree_depth_is_bounded() {
    let input = format!("{}x{}", "{".repeat(200), "}".repeat(200));
    assert!(matches!(
        syntax(&input),
        SyntaxError::NestingTooDeep { limit: 128, .. }
    ));
}

#[test]
fn test_argument_chains_are_bounded() {
    let input = format!("{}x", r"\sqrt".repeat(200_000));
    assert!(matches!(
        syntax(&input),
        SyntaxError::NestingTooDeep { limit: 128, .. }
    ));
    let input = format!("x{}2", "^".repeat(200_000));
    assert!(matches!(
        syntax(&input),
        SyntaxError::NestingTooDeep { limit: 128, .. }
    ));
}

#[test]
fn test_reduction_depth_is_bounded() {
    let input = format!("{}x{}", "(".repeat(200), ")".repeat(200));
    assert_eq!(parse(&input), Err(ParseError::NestingTooDeep { limit: 128 }));

    let options = ParseOptions {
        max_depth: 256,
        ..Default::default()
    };
    let parser = Parser::new(&Symbolic).with_options(options);
    let input = format!("{}x{}", "(".repeat(140), ")".repeat(140));
    assert!(parser.parse(&input).is_ok());
}

#[test]
fn test_strict_commands() {
    let registry = CommandRegistry::builtin();
    let options = ParseOptions {
        strict_commands: true,
        ..Default::default()
    };
    let parser = Parser::new(&Symbolic)
        .with_registry(&registry)
        .with_options(options);
    assert_eq!(
        parser.parse(r"x + \alpha"),
        Err(ParseError::Syntax(SyntaxError::UnknownCommand {
            name: "alpha".into(),
            offset: 4,
        }))
    );
    assert!(parser.parse(r"\frac{x}{2}").is_ok());
}

#[test]
fn test_offsets_and_messages() {
    let err = parse("x +").unwrap_err();
    assert_eq!(err.offset(), Some(2));
    assert_eq!(err.to_string(), "`+` at offset 2 is missing an operand");

    let err = parse("(x").unwrap_err();
    assert_eq!(err.to_string(), "`(` at offset 0 has no counterpart");

    let err = parse(r"\begin{vmatrix} 1 & 2 \end{vmatrix}").unwrap_err();
    assert_eq!(err.offset(), None);
}
