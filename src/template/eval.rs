use super::error::{TemplateError, TemplateErrorKind};
use super::funcs::Value;
use super::parser::{Command, Node, Operand, Pipeline};
use crate::context::TemplateContext;

pub(crate) fn render_nodes(
    nodes: &[Node],
    ctx: &TemplateContext,
    out: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Action(pipeline) => {
                let value = eval_pipeline(pipeline, ctx)?;
                out.push_str(&value.to_string());
            }
            Node::If {
                branches,
                otherwise,
            } => {
                let mut taken = None;
                for (condition, body) in branches {
                    if eval_pipeline(condition, ctx)?.is_truthy() {
                        taken = Some(body);
                        break;
                    }
                }
                render_nodes(taken.unwrap_or(otherwise), ctx, out)?;
            }
        }
    }
    Ok(())
}

fn eval_pipeline(pipeline: &Pipeline, ctx: &TemplateContext) -> Result<Value, TemplateError> {
    let mut piped = None;
    for command in &pipeline.commands {
        piped = Some(eval_command(command, piped, ctx)?);
    }
    // The parser never produces an empty pipeline.
    piped.ok_or_else(|| TemplateError::new(TemplateErrorKind::Execution, "empty pipeline"))
}

/// Evaluates one command; `piped` is the previous stage's result, passed as the final argument.
fn eval_command(
    command: &Command,
    piped: Option<Value>,
    ctx: &TemplateContext,
) -> Result<Value, TemplateError> {
    let (head, rest) = command
        .operands
        .split_first()
        .ok_or_else(|| TemplateError::syntax(command.pos, "empty command"))?;

    match head {
        Operand::Function(function, pos) => {
            let mut args = rest
                .iter()
                .map(|operand| eval_operand(operand, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            args.extend(piped);
            function
                .call(ctx, args)
                .map_err(|err| with_position(err, *pos))
        }
        _ if !rest.is_empty() || piped.is_some() => Err(TemplateError::new(
            TemplateErrorKind::Execution,
            "can't give argument to non-function",
        )
        .at(command.pos)),
        operand => eval_operand(operand, ctx),
    }
}

fn eval_operand(operand: &Operand, ctx: &TemplateContext) -> Result<Value, TemplateError> {
    match operand {
        Operand::Field(field) => Ok(Value::Str(ctx.field(*field).to_string())),
        // A bare function name in argument position is a zero-argument call.
        Operand::Function(function, pos) => function
            .call(ctx, Vec::new())
            .map_err(|err| with_position(err, *pos)),
        Operand::Str(s) => Ok(Value::Str(s.clone())),
        Operand::Int(i) => Ok(Value::Int(*i)),
        Operand::Bool(b) => Ok(Value::Bool(*b)),
        Operand::Pipeline(pipeline) => eval_pipeline(pipeline, ctx),
    }
}

fn with_position(err: TemplateError, pos: usize) -> TemplateError {
    if err.position().is_some() {
        err
    } else {
        err.at(pos)
    }
}
