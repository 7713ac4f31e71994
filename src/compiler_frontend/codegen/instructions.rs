use crate::codegen_log;
use crate::compiler_frontend::datatypes::TypeId;
use crate::compiler_frontend::optimizers::constant_folding::{ConstValue, Operator, UnaryOperator};
use std::fmt::Display;

/// Stack machine instructions. Only the shape matters here,
/// encoding and execution belong to later stages.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Nop,
    Goto(usize),

    PushConst(ConstValue),
    PushGlobalPtr(usize),
    PushLocalPtr(i64),

    /// Replaces the pointer on top of the stack with the value it points at
    Deref(TypeId),

    /// Pops a value then a pointer, stores the value through the pointer
    Assign(TypeId),

    /// Same as Assign with the pointer on top instead
    SwapAssign(TypeId),

    Unary(UnaryOperator),
    Binary(Operator),

    /// Integer to real conversion of the value on top of the stack
    Convert { from: TypeId, to: TypeId },

    CallExtern(String),
    Return { params_size: i64 },
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Nop => write!(f, "NOP"),
            Instruction::Goto(target) => write!(f, "GOTO {target}"),
            Instruction::PushConst(value) => write!(f, "PUSH {value}"),
            Instruction::PushGlobalPtr(slot) => write!(f, "PUSH_GLOBAL_PTR {slot}"),
            Instruction::PushLocalPtr(offset) => write!(f, "PUSH_LOCAL_PTR {offset}"),
            Instruction::Deref(data_type) => write!(f, "DEREF #{}", data_type.index()),
            Instruction::Assign(data_type) => write!(f, "ASSIGN #{}", data_type.index()),
            Instruction::SwapAssign(data_type) => write!(f, "SWAP_ASSIGN #{}", data_type.index()),
            Instruction::Unary(UnaryOperator::Negate) => write!(f, "UNARY -"),
            Instruction::Unary(UnaryOperator::Not) => write!(f, "UNARY !"),
            Instruction::Binary(op) => write!(f, "BINARY {}", op.to_str()),
            Instruction::Convert { from, to } => {
                write!(f, "CONVERT #{} #{}", from.index(), to.index())
            }
            Instruction::CallExtern(name) => write!(f, "CALL_EXTERN {name}"),
            Instruction::Return { params_size } => write!(f, "RETURN {params_size}"),
        }
    }
}

/// Append-only instruction buffer.
/// The only thing ever rewritten after the fact is a reserved slot
/// (the entry stub and external prototypes).
#[derive(Clone, Debug, Default)]
pub struct CodeGen {
    code: Vec<Instruction>,
    pub main_defined: bool,
}

impl CodeGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address of the next instruction to be emitted
    pub fn ip(&self) -> usize {
        self.code.len()
    }

    pub fn emit(&mut self, instruction: Instruction) -> usize {
        let address = self.ip();
        codegen_log!(Bright Black address, "  ", {instruction.to_string()});
        self.code.push(instruction);
        address
    }

    /// Returns false if the address was never emitted
    pub fn patch(&mut self, address: usize, instruction: Instruction) -> bool {
        match self.code.get_mut(address) {
            Some(slot) => {
                codegen_log!(Yellow "patch ", address, "  ", {instruction.to_string()});
                *slot = instruction;
                true
            }
            None => false,
        }
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }
}
