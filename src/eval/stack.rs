use super::{EvalError, Evaluator, Variables};
use crate::number::Backend;

impl<'a, B: Backend, V: Variables + ?Sized> Evaluator<'a, B, V> {
    /// Pop the operand of a unary operator or function
    pub(crate) fn pop_operand(&mut self, op: &str) -> Result<B::Value, EvalError> {
        self.stack
            .pop()
            .ok_or_else(|| EvalError::StackUnderflow(op.into()))
    }

    /// Pop (lhs, rhs) for a binary operator; rhs was pushed last
    pub(crate) fn pop_pair(&mut self, op: &str) -> Result<(B::Value, B::Value), EvalError> {
        if self.stack.len() < 2 {
            return Err(EvalError::StackUnderflow(op.into()));
        }
        let rhs = self.pop_operand(op)?;
        let lhs = self.pop_operand(op)?;
        Ok((lhs, rhs))
    }
}
