//! Runtime execution state: operand stack, call stack, and frames.
//!
//! This crate defines the layout and invariants; the mutation logic beyond
//! push/pop belongs to the execution engine. All buffers are owned by one
//! module instance and sized from its [`LoaderConfig`](crate::LoaderConfig).

use crate::config::LoaderConfig;
use crate::prelude::*;
use crate::values::Value;

/// What a call-stack frame executes: a function, or a control construct
/// identified by its opening-opcode offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTarget {
    /// A function, by index
    Function(u32),
    /// A `block`/`loop`/`if` construct, by its opening offset
    Block(u32),
}

impl Default for FrameTarget {
    fn default() -> Self {
        FrameTarget::Function(0)
    }
}

/// Saved caller-side state, pushed when entering a function-kind block.
///
/// Restoring `sp`/`fp`/`ret_addr` on return gives the caller back its exact
/// view of the operand stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    /// What this frame executes
    pub target: FrameTarget,
    /// Caller's operand-stack pointer
    pub sp: i32,
    /// Caller's frame pointer
    pub fp: i32,
    /// Return address: the instruction after the call
    pub ret_addr: u32,
}

/// The mutable execution state of one module instance.
///
/// `sp`, `fp`, and `call_stack_ptr` use `-1` as the empty sentinel. The
/// operand stack, call stack, and branch-table scratch buffer are allocated
/// once per instance; the engine indexes them through the pointers.
#[derive(Debug)]
pub struct RuntimeState {
    /// Program counter: offset of the next instruction
    pub pc: u32,
    /// Operand-stack top index (`-1` when empty)
    pub sp: i32,
    /// Current frame's operand-stack base index
    pub fp: i32,
    /// Call-stack top index (`-1` when empty)
    pub call_stack_ptr: i32,
    operand_stack: Vec<Value>,
    call_stack: Vec<Frame>,
    br_table: Vec<u32>,
}

impl RuntimeState {
    /// Allocate the state buffers for one instance.
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        let mut operand_stack = Vec::new();
        operand_stack
            .try_reserve_exact(config.operand_stack_capacity)
            .map_err(|_| {
                kinds::allocation_failed("operand stack", config.operand_stack_capacity)
            })?;
        operand_stack.resize(config.operand_stack_capacity, Value::default());

        let mut call_stack = Vec::new();
        call_stack
            .try_reserve_exact(config.call_stack_capacity)
            .map_err(|_| kinds::allocation_failed("call stack", config.call_stack_capacity))?;
        call_stack.resize(config.call_stack_capacity, Frame::default());

        let mut br_table = Vec::new();
        br_table
            .try_reserve_exact(config.br_table_capacity)
            .map_err(|_| kinds::allocation_failed("branch table", config.br_table_capacity))?;
        br_table.resize(config.br_table_capacity, 0);

        Ok(Self {
            pc: 0,
            sp: -1,
            fp: -1,
            call_stack_ptr: -1,
            operand_stack,
            call_stack,
            br_table,
        })
    }

    /// Push a value onto the operand stack.
    pub fn push_value(&mut self, value: Value) -> Result<()> {
        let next = self.sp + 1;
        if next as usize >= self.operand_stack.len() {
            return Err(kinds::stack_overflow());
        }
        self.sp = next;
        self.operand_stack[next as usize] = value;
        Ok(())
    }

    /// Pop the top value off the operand stack.
    pub fn pop_value(&mut self) -> Result<Value> {
        if self.sp < 0 {
            return Err(kinds::stack_underflow());
        }
        let value = self.operand_stack[self.sp as usize];
        self.sp -= 1;
        Ok(value)
    }

    /// Push a call frame.
    pub fn push_frame(&mut self, frame: Frame) -> Result<()> {
        let next = self.call_stack_ptr + 1;
        if next as usize >= self.call_stack.len() {
            return Err(Error::new(
                ErrorCategory::Runtime,
                codes::CALL_STACK_EXHAUSTED,
                format!("call stack exhausted at {} frames", self.call_stack.len()),
            ));
        }
        self.call_stack_ptr = next;
        self.call_stack[next as usize] = frame;
        Ok(())
    }

    /// Pop the top call frame.
    pub fn pop_frame(&mut self) -> Result<Frame> {
        if self.call_stack_ptr < 0 {
            return Err(kinds::stack_underflow());
        }
        let frame = self.call_stack[self.call_stack_ptr as usize];
        self.call_stack_ptr -= 1;
        Ok(frame)
    }

    /// The operand stack buffer
    pub fn operand_stack(&self) -> &[Value] {
        &self.operand_stack
    }

    /// The operand stack buffer, mutably
    pub fn operand_stack_mut(&mut self) -> &mut [Value] {
        &mut self.operand_stack
    }

    /// The call stack buffer
    pub fn call_stack(&self) -> &[Frame] {
        &self.call_stack
    }

    /// The branch-table scratch buffer, mutably
    pub fn br_table_mut(&mut self) -> &mut [u32] {
        &mut self.br_table
    }
}
