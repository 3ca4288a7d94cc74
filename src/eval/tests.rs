#[cfg(test)]
mod tests {
    use crate::eval::*;
    use crate::lexer::{tokenize, Capabilities, Function};
    use crate::number::{BigIntBackend, FloatBackend};
    use crate::parser::to_postfix;
    use num_bigint::BigInt;

    fn num(s: &str) -> Token {
        Token::Number(s.to_string())
    }

    fn op(o: Operator) -> Token {
        Token::Operator(o)
    }

    fn eval_str(input: &str) -> Result<f64, EvalError> {
        let tokens = tokenize(input, Capabilities::ALL).expect("lex failed");
        let rpn = to_postfix(tokens).expect("parse failed");
        evaluate_rpn(&mut FloatBackend, &rpn, &())
    }

    fn eval_with(input: &str, vars: &HashMap<String, f64>) -> Result<f64, EvalError> {
        let tokens = tokenize(input, Capabilities::ALL).expect("lex failed");
        let rpn = to_postfix(tokens).expect("parse failed");
        evaluate_rpn(&mut FloatBackend, &rpn, vars)
    }

    #[test]
    fn eval_single_literal() {
        assert_eq!(eval_str("42").unwrap(), 42.0);
    }

    #[test]
    fn eval_hand_built_rpn() {
        // 2 3 4 * +
        let rpn = vec![num("2"), num("3"), num("4"), op(Operator::Mul), op(Operator::Add)];
        assert_eq!(evaluate_rpn(&mut FloatBackend, &rpn, &()).unwrap(), 14.0);
    }

    #[test]
    fn eval_operand_order() {
        // 10 4 - => 6, not -6
        let rpn = vec![num("10"), num("4"), op(Operator::Sub)];
        assert_eq!(evaluate_rpn(&mut FloatBackend, &rpn, &()).unwrap(), 6.0);
        let rpn = vec![num("1"), num("4"), op(Operator::Div)];
        assert_eq!(evaluate_rpn(&mut FloatBackend, &rpn, &()).unwrap(), 0.25);
    }

    #[test]
    fn eval_precedence() {
        assert_eq!(eval_str("2+3*4").unwrap(), 14.0);
        assert_eq!(eval_str("(2+3)*4").unwrap(), 20.0);
        assert_eq!(eval_str("2^3^2").unwrap(), 512.0);
    }

    #[test]
    fn eval_neg_binds_below_power() {
        let mut vars = HashMap::new();
        vars.insert("x".to_string(), 3.0);
        assert_eq!(eval_with("-x^2", &vars).unwrap(), -9.0);
        assert_eq!(eval_with("2*-x", &vars).unwrap(), -6.0);
        assert_eq!(eval_with("-x!", &vars).unwrap(), -6.0);
        assert_eq!(eval_with("2^-x", &vars).unwrap(), 0.125);
        assert_eq!(eval_str("-(3+2)").unwrap(), -5.0);
    }

    #[test]
    fn eval_signed_literal_binds_tighter_than_power() {
        assert_eq!(eval_str("-2^2").unwrap(), 4.0);
        assert!(matches!(eval_str("-1!"), Err(EvalError::Domain(_))));
    }

    #[test]
    fn eval_function_call() {
        let v = eval_str("sqrt(16) + exp(0)").unwrap();
        assert_eq!(v, 5.0);
    }

    #[test]
    fn eval_missing_operand() {
        let rpn = vec![num("2"), op(Operator::Add)];
        assert_eq!(
            evaluate_rpn(&mut FloatBackend, &rpn, &()),
            Err(EvalError::StackUnderflow("+".to_string()))
        );
        let rpn = vec![Token::Function(Function::Sin)];
        assert!(matches!(
            evaluate_rpn(&mut FloatBackend, &rpn, &()),
            Err(EvalError::StackUnderflow(_))
        ));
    }

    #[test]
    fn eval_leftover_operands() {
        let rpn = vec![num("1"), num("2")];
        assert_eq!(
            evaluate_rpn(&mut FloatBackend, &rpn, &()),
            Err(EvalError::LeftoverOperands(2))
        );
        assert_eq!(
            evaluate_rpn(&mut FloatBackend, &[], &()),
            Err(EvalError::LeftoverOperands(0))
        );
    }

    #[test]
    fn eval_stray_paren() {
        let rpn = vec![num("1"), Token::LeftParen];
        assert!(matches!(
            evaluate_rpn(&mut FloatBackend, &rpn, &()),
            Err(EvalError::StrayToken(_))
        ));
    }

    #[test]
    fn eval_unknown_variable() {
        let vars: HashMap<String, f64> = HashMap::new();
        assert_eq!(
            eval_with("y+1", &vars),
            Err(EvalError::UnknownVariable("y".to_string()))
        );
    }

    #[test]
    fn eval_btreemap_variables() {
        let mut vars = BTreeMap::new();
        vars.insert("rate".to_string(), 0.5);
        let rpn = vec![Token::Variable("rate".to_string()), num("4"), op(Operator::Mul)];
        assert_eq!(evaluate_rpn(&mut FloatBackend, &rpn, &vars).unwrap(), 2.0);
    }

    #[test]
    fn eval_generic_over_backend() {
        let tokens = tokenize("99999999999999999999 * 10 + 1", Capabilities::INTEGER).unwrap();
        let rpn = to_postfix(tokens).unwrap();
        let value = evaluate_rpn(&mut BigIntBackend, &rpn, &()).unwrap();
        assert_eq!(value, "999999999999999999991".parse::<BigInt>().unwrap());
    }

    #[test]
    fn error_kinds() {
        assert_eq!(EvalError::DivisionByZero.kind(), ErrorKind::Arithmetic);
        assert_eq!(EvalError::LeftoverOperands(3).kind(), ErrorKind::Structural);
        assert_eq!(EvalError::UnknownVariable("q".into()).kind(), ErrorKind::UnknownIdentifier);
        assert_eq!(EvalError::InvalidLiteral("1.2.3".into()).kind(), ErrorKind::Syntax);
    }
}
