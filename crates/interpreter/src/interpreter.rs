//! The interpreter driver: program counter, stack, memory, gas, and the
//! dispatch loop.

mod contract;
mod shared_memory;
mod stack;

pub use contract::Contract;
pub use shared_memory::{num_words, SharedMemory, EMPTY_SHARED_MEMORY};
pub use stack::{Stack, STACK_LIMIT};

use crate::{
    gas, return_ok, return_revert, table::InstructionTable, CallOutcome, CreateOutcome, Gas, Host,
    InstructionResult, InterpreterAction,
};
use core::cmp::min;
use primitives::{Bytes, SpecId, U256};

/// The default gas limit when none is configured.
pub const DEFAULT_GAS_LIMIT: u64 = 30_000_000;

/// An EVM interpreter for a single call frame.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interpreter {
    /// Contract information and invoking data.
    pub contract: Contract,
    /// The current position in the (padded) bytecode.
    pub program_counter: usize,
    /// The gas state.
    pub gas: Gas,
    /// Shared memory.
    ///
    /// When the frame surrenders to a sub-call the driver takes the memory
    /// with [`Interpreter::take_memory`] and restores it before resuming.
    pub shared_memory: SharedMemory,
    /// The stack.
    pub stack: Stack,
    /// The return data buffer of the last finished sub-call.
    pub return_data_buffer: Bytes,
    /// The result of the current instruction; `Continue` while running.
    pub instruction_result: InstructionResult,
    /// Whether the interpreter is in a static context, where state changes are
    /// not allowed.
    pub is_static: bool,
    /// The hardfork the interpreter runs under.
    pub spec_id: SpecId,
    /// Action that the interpreter requests from its driver, filled by the
    /// call- and create-family instructions and by frame returns.
    pub next_action: InterpreterAction,
}

impl Interpreter {
    /// Creates a new interpreter for the given contract.
    ///
    /// The contract bytecode is analyzed if it was still raw.
    pub fn new(contract: Contract, gas_limit: u64, is_static: bool, spec_id: SpecId) -> Self {
        Self {
            contract,
            program_counter: 0,
            gas: Gas::new(gas_limit),
            shared_memory: SharedMemory::new(),
            stack: Stack::new(),
            return_data_buffer: Bytes::new(),
            instruction_result: InstructionResult::Continue,
            is_static,
            spec_id,
            next_action: InterpreterAction::None,
        }
    }

    /// Creates a new interpreter with the default options: a gas limit of
    /// [`DEFAULT_GAS_LIMIT`], non-static, latest spec.
    pub fn new_simple(contract: Contract) -> Self {
        Self::new(contract, DEFAULT_GAS_LIMIT, false, SpecId::LATEST)
    }

    /// Returns the current gas state.
    #[inline]
    pub fn gas(&self) -> &Gas {
        &self.gas
    }

    /// Moves the shared memory out of the interpreter, leaving an empty
    /// placeholder.
    #[inline]
    pub fn take_memory(&mut self) -> SharedMemory {
        core::mem::replace(&mut self.shared_memory, EMPTY_SHARED_MEMORY)
    }

    /// Executes the instruction at the current program counter.
    ///
    /// Internally it will increment the program counter by one; bytecode
    /// analysis padding guarantees the read is always in bounds and that
    /// advancing past the end keeps landing on `STOP`.
    #[inline]
    pub fn step<H: Host + ?Sized>(&mut self, instruction_table: &InstructionTable<H>, host: &mut H) {
        let opcode = self.contract.bytecode.bytecode_slice()[self.program_counter];
        self.program_counter += 1;
        (instruction_table[opcode as usize])(self, host);
    }

    /// Executes the interpreter until it returns or stops, producing the next
    /// action for the driver.
    pub fn run<H: Host + ?Sized>(
        &mut self,
        instruction_table: &InstructionTable<H>,
        host: &mut H,
    ) -> InterpreterAction {
        self.next_action = InterpreterAction::None;

        while self.instruction_result == InstructionResult::Continue {
            self.step(instruction_table, host);
        }

        // Return the action if the instruction set one, otherwise the frame
        // halted without output.
        if self.next_action.is_some() {
            return core::mem::take(&mut self.next_action);
        }
        InterpreterAction::Return {
            result: InterpreterResult {
                result: self.instruction_result,
                output: Bytes::new(),
                gas: self.gas,
            },
        }
    }

    /// Inserts the outcome of a finished sub-call into this frame: writes the
    /// return data into the reserved memory window, credits back unused gas,
    /// and pushes the success flag. Resumes execution.
    pub fn insert_call_outcome(&mut self, call_outcome: CallOutcome) {
        self.instruction_result = InstructionResult::Continue;

        let out_offset = call_outcome.memory_start();
        let out_len = call_outcome.memory_length();
        let out_ins_result = *call_outcome.instruction_result();
        let out_gas = call_outcome.gas();

        match out_ins_result {
            return_ok!() => {
                self.return_data_buffer = call_outcome.result.output;
                let target_len = min(out_len, self.return_data_buffer.len());
                self.gas.erase_cost(out_gas.remaining());
                self.gas.record_refund(out_gas.refunded());
                self.shared_memory
                    .set(out_offset, &self.return_data_buffer[..target_len]);
                self.push_stack(U256::from(1));
            }
            return_revert!() => {
                self.return_data_buffer = call_outcome.result.output;
                let target_len = min(out_len, self.return_data_buffer.len());
                self.gas.erase_cost(out_gas.remaining());
                self.shared_memory
                    .set(out_offset, &self.return_data_buffer[..target_len]);
                self.push_stack(U256::ZERO);
            }
            InstructionResult::FatalExternalError => {
                self.instruction_result = InstructionResult::FatalExternalError;
            }
            _ => {
                self.return_data_buffer = Bytes::new();
                self.push_stack(U256::ZERO);
            }
        }
    }

    /// Inserts the outcome of a finished sub-create into this frame: pushes
    /// the created address or zero and credits back unused gas. Resumes
    /// execution.
    pub fn insert_create_outcome(&mut self, create_outcome: CreateOutcome) {
        self.instruction_result = InstructionResult::Continue;

        let instruction_result = *create_outcome.instruction_result();

        self.return_data_buffer = if instruction_result.is_revert() {
            // Save data to return data buffer if the create reverted.
            create_outcome.output().to_owned()
        } else {
            // Otherwise clear it. Note that RETURN opcode should abort.
            Bytes::new()
        };

        match instruction_result {
            return_ok!() => {
                let address = create_outcome.address.unwrap_or_default();
                self.push_stack(U256::from_be_bytes(address.into_word().0));
                self.gas.erase_cost(create_outcome.gas().remaining());
                self.gas.record_refund(create_outcome.gas().refunded());
            }
            return_revert!() => {
                self.push_stack(U256::ZERO);
                self.gas.erase_cost(create_outcome.gas().remaining());
            }
            InstructionResult::FatalExternalError => {
                self.instruction_result = InstructionResult::FatalExternalError;
            }
            _ => {
                self.push_stack(U256::ZERO);
            }
        }
    }

    /// Pushes a value onto the stack, recording overflow in the instruction
    /// result.
    #[inline]
    fn push_stack(&mut self, value: U256) {
        if !self.stack.push(value) {
            self.instruction_result = InstructionResult::StackOverflow;
        }
    }
}

/// Resizes the memory to fit `offset + len`, charging memory expansion gas.
///
/// Returns `Continue` when nothing had to grow or the growth was paid for.
#[inline(never)]
#[cold]
pub fn resize_memory(
    memory: &mut SharedMemory,
    gas: &mut Gas,
    offset: usize,
    len: usize,
) -> InstructionResult {
    let new_size = offset.saturating_add(len);
    if new_size > memory.len() {
        if memory.limit_reached(new_size) {
            return InstructionResult::MemoryLimitOOG;
        }

        let new_words = num_words(new_size as u64) as usize;
        match gas.record_memory_expansion(new_words) {
            gas::MemoryExtensionResult::Extended => memory.resize(new_words * 32),
            gas::MemoryExtensionResult::OutOfGas => return InstructionResult::MemoryOOG,
            gas::MemoryExtensionResult::Same => (),
        }
    }
    InstructionResult::Continue
}

/// The result of an interpreter frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterpreterResult {
    /// The result of the instruction execution.
    pub result: InstructionResult,
    /// The output of the instruction execution.
    pub output: Bytes,
    /// The gas usage information.
    pub gas: Gas,
}

impl InterpreterResult {
    /// Returns a new [`InterpreterResult`] with the given values.
    pub fn new(result: InstructionResult, output: Bytes, gas: Gas) -> Self {
        Self {
            result,
            output,
            gas,
        }
    }

    /// Returns a new [`InterpreterResult`] with the given result, all gas of
    /// `gas_limit` unspent, and no output.
    pub fn new_with_gas_limit(result: InstructionResult, gas_limit: u64) -> Self {
        Self::new(result, Bytes::new(), Gas::new(gas_limit))
    }

    /// Returns whether the instruction result is a success.
    #[inline]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns whether the instruction result is a revert.
    #[inline]
    pub const fn is_revert(&self) -> bool {
        self.result.is_revert()
    }

    /// Returns whether the instruction result is an error.
    #[inline]
    pub const fn is_error(&self) -> bool {
        self.result.is_error()
    }
}
