//! Statement execution

use crate::ast::*;
use crate::interpreter::{types, ControlFlow, Evaluator, Locals};
use crate::value::{RuntimeError, Value};

impl<'a> Evaluator<'a> {
    /// Execute a block in a fresh lexical scope
    pub(super) fn execute_block(
        &mut self,
        block: &'a Block,
        locals: &mut Locals<'a>,
    ) -> Result<ControlFlow, RuntimeError> {
        locals.push_scope();
        for stmt in &block.statements {
            let flow = self.execute_statement(stmt, locals)?;
            if flow != ControlFlow::None {
                locals.pop_scope();
                return Ok(flow);
            }
        }
        locals.pop_scope();
        Ok(ControlFlow::None)
    }

    fn execute_statement(
        &mut self,
        stmt: &'a Stmt,
        locals: &mut Locals<'a>,
    ) -> Result<ControlFlow, RuntimeError> {
        self.set_line(stmt.line());

        match stmt {
            Stmt::VarDecl(decl) => {
                let value = match &decl.init {
                    Some(init) => {
                        let value = self.eval_expr(init, locals)?;
                        types::coerce(&decl.type_ref, value).map_err(|found| {
                            RuntimeError::type_mismatch(format!(
                                "cannot initialize {} '{}' with {}",
                                decl.type_ref, decl.name.name, found
                            ))
                        })?
                    }
                    None => types::zero_value(&decl.type_ref),
                };
                locals.declare(&decl.name.name, &decl.type_ref, value);
                Ok(ControlFlow::None)
            }
            Stmt::Assign(assign) => {
                self.execute_assign(assign, locals)?;
                Ok(ControlFlow::None)
            }
            Stmt::Return(ret) => {
                let value = match &ret.value {
                    Some(expr) => self.eval_expr(expr, locals)?,
                    None => Value::Null,
                };
                Ok(ControlFlow::Return(value))
            }
            Stmt::If(if_stmt) => {
                if self.eval_condition(&if_stmt.cond, locals)? {
                    self.execute_block(&if_stmt.then_block, locals)
                } else if let Some(else_block) = &if_stmt.else_block {
                    self.execute_block(else_block, locals)
                } else {
                    Ok(ControlFlow::None)
                }
            }
            Stmt::While(while_stmt) => {
                loop {
                    self.set_line(while_stmt.span.line);
                    if !self.eval_condition(&while_stmt.cond, locals)? {
                        break;
                    }
                    match self.execute_block(&while_stmt.body, locals)? {
                        ControlFlow::Break => break,
                        flow @ ControlFlow::Return(_) => return Ok(flow),
                        ControlFlow::None => {}
                    }
                }
                Ok(ControlFlow::None)
            }
            Stmt::Break(_) => Ok(ControlFlow::Break),
            Stmt::Expr(expr_stmt) => {
                self.eval_expr(&expr_stmt.expr, locals)?;
                Ok(ControlFlow::None)
            }
        }
    }

    fn execute_assign(&mut self, assign: &'a Assign, locals: &mut Locals<'a>) -> Result<(), RuntimeError> {
        match &assign.target {
            AssignTarget::Name(name) => {
                let value = self.eval_expr(&assign.value, locals)?;
                let slot = locals
                    .get_mut(&name.name)
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        name: name.name.clone(),
                    })?;
                slot.value = types::coerce(slot.ty, value).map_err(|found| {
                    RuntimeError::type_mismatch(format!(
                        "cannot assign {} to {} '{}'",
                        found, slot.ty, name.name
                    ))
                })?;
                Ok(())
            }
            AssignTarget::Index { name, index } => {
                let index = self.eval_index_value(index, locals)?;
                let value = self.eval_expr(&assign.value, locals)?;
                self.set_line(assign.span.line);

                let slot = locals
                    .get_mut(&name.name)
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        name: name.name.clone(),
                    })?;
                let declared: &'a TypeRef = slot.ty;
                let element_ty = match declared {
                    TypeRef::Array(inner, _) => inner.as_ref(),
                    other => {
                        return Err(RuntimeError::type_mismatch(format!(
                            "cannot index into {} '{}'",
                            other, name.name
                        )))
                    }
                };
                let value = types::coerce(element_ty, value).map_err(|found| {
                    RuntimeError::type_mismatch(format!(
                        "cannot store {} in {} '{}'",
                        found, declared, name.name
                    ))
                })?;

                match &mut slot.value {
                    Value::Array(items) => {
                        let size = items.len();
                        let in_range = usize::try_from(index).is_ok_and(|i| items.set(i, value));
                        if in_range {
                            Ok(())
                        } else {
                            Err(RuntimeError::IndexOutOfRange { index, size })
                        }
                    }
                    other => Err(RuntimeError::type_mismatch(format!(
                        "cannot index into {}",
                        other.type_name()
                    ))),
                }
            }
        }
    }

    /// Evaluate an `if`/`while` condition, which must be boolean
    fn eval_condition(&mut self, cond: &'a Expr, locals: &mut Locals<'a>) -> Result<bool, RuntimeError> {
        match self.eval_expr(cond, locals)? {
            Value::Boolean(b) => Ok(b),
            other => Err(RuntimeError::type_mismatch(format!(
                "condition must be boolean, found {}",
                other.type_name()
            ))),
        }
    }
}
