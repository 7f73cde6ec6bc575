// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use crate::value::Value;
use crate::vm::arena::InstrId;
use crate::vm::errors::VmError;
use crate::vm::instructions::InstrKind;
use crate::vm::program::Program;

/// One evaluation context's aggregate accumulator state: a zero-initialized
/// buffer of exactly the program's declared dynamic storage size.
///
/// Programs never touch this buffer themselves; each concurrent evaluation
/// context (row batch, aggregation group, window) needs its own instance.
#[derive(Debug, Clone)]
pub struct Instance {
    scratch: Vec<u8>,
}

impl Instance {
    pub fn scratch(&self) -> &[u8] {
        &self.scratch
    }

    fn scratch_mut(&mut self) -> &mut [u8] {
        &mut self.scratch
    }
}

/// The instruction-graph interpreter.
///
/// `evaluate` computes a scalar result for one row. Aggregation runs in two
/// phases: `accumulate` folds each row of a group into an [`Instance`], and
/// `result` reads the finished aggregate values back out. `merge` folds one
/// instance into another, which is how partial aggregates computed on
/// different servers are combined.
pub struct Vm;

impl Vm {
    /// Allocate a fresh, zero-initialized evaluation context for `program`.
    pub fn new_instance(program: &Program) -> Instance {
        Instance {
            scratch: vec![0; program.dynamic_storage_size()],
        }
    }

    /// Evaluate a purely scalar program against one input row. Reaching an
    /// aggregate instruction is an error: there is no accumulator state.
    pub fn evaluate(program: &Program, input: &[Value]) -> Result<Value, VmError> {
        eval_instruction(program, program.entry(), input, None)
    }

    /// Fold one row into the group's accumulator state.
    pub fn accumulate(
        program: &Program,
        instance: &mut Instance,
        input: &[Value],
    ) -> Result<(), VmError> {
        check_scratch_size(program, instance)?;
        accumulate_instruction(program, program.entry(), instance, input)
    }

    /// Read the aggregate result for a finished (or in-flight) group.
    pub fn result(program: &Program, instance: &Instance) -> Result<Value, VmError> {
        check_scratch_size(program, instance)?;
        eval_instruction(program, program.entry(), &[], Some(instance.scratch()))
    }

    /// Return every aggregate call site in `instance` to its empty state so
    /// the buffer can be reused for the next group.
    pub fn reset(program: &Program, instance: &mut Instance) -> Result<(), VmError> {
        check_scratch_size(program, instance)?;
        for ins in program.storage().instructions() {
            if let InstrKind::CallAggregate { offset, fcn } = ins.kind {
                (fcn.reset)(&mut instance.scratch_mut()[offset..offset + fcn.scratch_size]);
            }
        }
        Ok(())
    }

    /// Fold `src`'s partial aggregate state into `dst`, site by site.
    pub fn merge(program: &Program, dst: &mut Instance, src: &Instance) -> Result<(), VmError> {
        check_scratch_size(program, dst)?;
        check_scratch_size(program, src)?;
        for ins in program.storage().instructions() {
            if let InstrKind::CallAggregate { offset, fcn } = ins.kind {
                let range = offset..offset + fcn.scratch_size;
                (fcn.merge)(&mut dst.scratch[range.clone()], &src.scratch[range])
                    .map_err(VmError::function)?;
            }
        }
        Ok(())
    }
}

fn check_scratch_size(program: &Program, instance: &Instance) -> Result<(), VmError> {
    let expected = program.dynamic_storage_size();
    let actual = instance.scratch.len();
    if expected != actual {
        return Err(VmError::ScratchSizeMismatch { expected, actual });
    }
    Ok(())
}

fn eval_instruction(
    program: &Program,
    id: InstrId,
    input: &[Value],
    scratch: Option<&[u8]>,
) -> Result<Value, VmError> {
    let storage = program.storage();
    let ins = *storage.instruction(id);

    match ins.kind {
        InstrKind::Literal(vid) => Ok(storage.value(vid).clone()),

        InstrKind::Input(index) => {
            input
                .get(index)
                .cloned()
                .ok_or(VmError::InputColumnOutOfBounds {
                    index,
                    width: input.len(),
                })
        }

        InstrKind::CallPure(fcn) => {
            let args = eval_arguments(program, ins.child, input, scratch)?;
            fcn(&args).map_err(VmError::function)
        }

        InstrKind::CallAggregate { offset, fcn } => {
            let Some(scratch) = scratch else {
                return Err(VmError::AggregateWithoutInstance);
            };
            (fcn.get)(&scratch[offset..offset + fcn.scratch_size]).map_err(VmError::function)
        }

        InstrKind::If => {
            let mut branches = storage.children(id);
            let (Some(condition), Some(then_id), Some(else_id)) =
                (branches.next(), branches.next(), branches.next())
            else {
                return Err(VmError::Internal {
                    detail: "if instruction without three branches".to_string(),
                });
            };
            let condition = eval_instruction(program, condition, input, scratch)?;
            let taken = if condition.is_true() { then_id } else { else_id };
            eval_instruction(program, taken, input, scratch)
        }

        InstrKind::Regex(pid) => {
            let Some(child) = ins.child else {
                return Err(VmError::Internal {
                    detail: "regex instruction without a subject".to_string(),
                });
            };
            let subject = eval_instruction(program, child, input, scratch)?;
            if subject.is_null() {
                return Ok(Value::Null);
            }
            Ok(Value::Bool(storage.regex(pid).is_match(&subject.to_string())))
        }

        InstrKind::Like(lid) => {
            let Some(child) = ins.child else {
                return Err(VmError::Internal {
                    detail: "like instruction without a subject".to_string(),
                });
            };
            let subject = eval_instruction(program, child, input, scratch)?;
            if subject.is_null() {
                return Ok(Value::Null);
            }
            Ok(Value::Bool(
                storage.like_pattern(lid).matches(&subject.to_string()),
            ))
        }
    }
}

fn eval_arguments(
    program: &Program,
    first: Option<InstrId>,
    input: &[Value],
    scratch: Option<&[u8]>,
) -> Result<Vec<Value>, VmError> {
    let mut args = Vec::new();
    let mut cur = first;
    while let Some(id) = cur {
        args.push(eval_instruction(program, id, input, scratch)?);
        cur = program.storage().instruction(id).next;
    }
    Ok(args)
}

// Accumulation visits every aggregate call site in the tree, including
// sites inside untaken conditional branches; branch selection is an
// evaluation-time concern only.
fn accumulate_instruction(
    program: &Program,
    id: InstrId,
    instance: &mut Instance,
    input: &[Value],
) -> Result<(), VmError> {
    let ins = *program.storage().instruction(id);

    if let InstrKind::CallAggregate { offset, fcn } = ins.kind {
        let args = eval_arguments(program, ins.child, input, Some(instance.scratch()))?;
        let region = &mut instance.scratch_mut()[offset..offset + fcn.scratch_size];
        return (fcn.accumulate)(region, &args).map_err(VmError::function);
    }

    let mut cur = ins.child;
    while let Some(child) = cur {
        accumulate_instruction(program, child, instance, input)?;
        cur = program.storage().instruction(child).next;
    }
    Ok(())
}
