//! The transaction driver: validation, the depth-first frame loop, and the
//! gas settlement around it.

use crate::frame::{Frame, FrameData, FrameOrResult, FrameResult};
use bytecode::Bytecode;
use context::{JournalCheckpoint, JournaledHost, JournaledState};
use database::{Database, DatabaseCommit};
use interpreter::{
    gas, make_instruction_table, return_ok, return_revert, CallInputs, CallOutcome, CallValue,
    Contract, CreateInputs, CreateOutcome, CreateScheme, Gas, InstructionResult, Interpreter,
    InterpreterAction, InterpreterResult, SharedMemory, SuccessOrHalt, CALL_STACK_LIMIT,
};
use primitives::{
    keccak256, Address, AnalysisKind, Bytes, EVMError, Env, ExecutionResult, InvalidTransaction,
    Output, ResultAndState, SpecId, B256, U256,
};
use state::EvmState;

/// The EVM: owns the environment, the journaled state over a database, and
/// the depth-first call tree of a transaction.
#[derive(Debug)]
pub struct Evm<DB: Database> {
    /// The host every frame runs against.
    pub host: JournaledHost<DB>,
    /// The hardfork the EVM runs under.
    pub spec_id: SpecId,
}

impl<DB: Database> Evm<DB> {
    /// Creates a new EVM over the given database, running the latest spec.
    pub fn new(env: Env, database: DB) -> Self {
        Self::new_with_spec(env, database, SpecId::LATEST)
    }

    /// Creates a new EVM over the given database and hardfork.
    pub fn new_with_spec(env: Env, database: DB, spec_id: SpecId) -> Self {
        Self {
            host: JournaledHost::new(env, JournaledState::new(spec_id, database)),
            spec_id,
        }
    }

    /// Returns a reference to the environment.
    pub fn env(&self) -> &Env {
        &self.host.env
    }

    /// Returns a mutable reference to the environment.
    pub fn env_mut(&mut self) -> &mut Env {
        &mut self.host.env
    }

    /// Returns a mutable reference to the backing database.
    pub fn db_mut(&mut self) -> &mut DB {
        &mut self.host.journaled_state.database
    }

    /// Consumes the EVM, returning the backing database.
    pub fn into_db(self) -> DB {
        self.host.journaled_state.database
    }

    /// Transacts the configured transaction, returning the execution result
    /// together with the state delta to apply.
    pub fn transact(&mut self) -> Result<ResultAndState<EvmState>, EVMError<DB::Error>> {
        let spec_id = self.spec_id;

        // Validate the environment.
        self.host.env.validate_block_env(spec_id)?;
        self.host.env.validate_tx(spec_id)?;

        let tx_gas_limit = self.host.env.tx.gas_limit;
        let is_create = self.host.env.tx.transact_to.is_create();

        // Intrinsic gas.
        let initial_gas = gas::validate_initial_tx_gas(
            spec_id,
            &self.host.env.tx.data,
            is_create,
            &self.host.env.tx.access_list,
        );
        if initial_gas > tx_gas_limit {
            return Err(InvalidTransaction::CallGasCostMoreThanGasLimit.into());
        }

        // EIP-3651: Warm COINBASE
        if spec_id.is_enabled_in(SpecId::SHANGHAI) {
            let coinbase = self.host.env.block.coinbase;
            self.host
                .journaled_state
                .warm_preloaded_addresses
                .insert(coinbase);
        }

        // EIP-2930: prewarm the access list.
        let access_list: Vec<(Address, Vec<U256>)> = self
            .host
            .env
            .tx
            .access_list
            .iter()
            .map(|item| {
                (
                    item.address,
                    item.storage_keys
                        .iter()
                        .map(|key| U256::from_be_bytes(key.0))
                        .collect(),
                )
            })
            .collect();
        for (address, keys) in access_list {
            self.host
                .journaled_state
                .initial_account_load(address, keys)
                .map_err(EVMError::Database)?;
        }

        // Validate the transaction against the caller account.
        let caller = self.host.env.tx.caller;
        let caller_account = self
            .host
            .journaled_state
            .load_account(caller)
            .map_err(EVMError::Database)?;
        let caller_nonce = caller_account.data.info.nonce;
        let caller_balance = caller_account.data.info.balance;
        let caller_has_code = !caller_account.data.info.is_empty_code_hash();
        self.host.env.validate_tx_against_state(
            spec_id,
            caller_nonce,
            caller_balance,
            caller_has_code,
        )?;

        self.deduct_caller()?;

        // The first frame gets whatever the intrinsic gas left over.
        let gas_limit = tx_gas_limit - initial_gas;
        let first_frame = if is_create {
            let inputs = CreateInputs::new_boxed(&self.host.env.tx, gas_limit)
                .expect("transact_to is checked to be a create");
            self.make_create_frame(spec_id, &inputs)?
        } else {
            let inputs = CallInputs::new_boxed(&self.host.env.tx, gas_limit)
                .expect("transact_to is checked to be a call");
            self.make_call_frame(&inputs)?
        };

        let result = match first_frame {
            FrameOrResult::Frame(frame) => self.run_the_loop(frame)?,
            FrameOrResult::Result(result) => result,
        };

        // Settle the gas of the first frame against the transaction limit.
        let mut tx_gas = Gas::new_spent(tx_gas_limit);
        let frame_result = result.interpreter_result();
        match frame_result.result {
            return_ok!() => {
                tx_gas.erase_cost(frame_result.gas.remaining());
                tx_gas.record_refund(frame_result.gas.refunded());
            }
            return_revert!() => {
                tx_gas.erase_cost(frame_result.gas.remaining());
            }
            _ => {}
        }

        // Calculate the final refund and cap it (EIP-3529 quotient after
        // London).
        if self.host.env.cfg.is_gas_refund_disabled() {
            tx_gas.set_refund(0);
        } else {
            tx_gas.set_final_refund(spec_id.is_enabled_in(SpecId::LONDON));
        }

        self.reimburse_caller(&tx_gas)?;
        self.reward_beneficiary(&tx_gas)?;

        self.output(result, tx_gas, is_create)
    }

    /// Deducts the maximum gas fee from the caller and bumps the nonce of
    /// call transactions. Create transactions bump the nonce when the create
    /// frame is made.
    fn deduct_caller(&mut self) -> Result<(), EVMError<DB::Error>> {
        let mut gas_cost =
            U256::from(self.host.env.tx.gas_limit).saturating_mul(self.host.env.effective_gas_price());

        // EIP-4844 blob data fee.
        if let Some(data_fee) = self.host.env.calc_data_fee() {
            gas_cost = gas_cost.saturating_add(data_fee);
        }

        let is_call = self.host.env.tx.transact_to.is_call();
        let caller = self.host.env.tx.caller;
        let caller_account = self
            .host
            .journaled_state
            .load_account(caller)
            .map_err(EVMError::Database)?;

        caller_account.data.info.balance =
            caller_account.data.info.balance.saturating_sub(gas_cost);

        if is_call {
            // Nonce is already validated.
            caller_account.data.info.nonce = caller_account.data.info.nonce.saturating_add(1);
        }

        // Touch the account so we know it is changed.
        caller_account.data.mark_touch();
        Ok(())
    }

    /// Reimburses the caller with the gas that was not spent, plus the
    /// capped refund.
    fn reimburse_caller(&mut self, tx_gas: &Gas) -> Result<(), EVMError<DB::Error>> {
        let caller = self.host.env.tx.caller;
        let effective_gas_price = self.host.env.effective_gas_price();
        let reimbursement = effective_gas_price
            .saturating_mul(U256::from(tx_gas.remaining() + tx_gas.refunded() as u64));

        let caller_account = self
            .host
            .journaled_state
            .load_account(caller)
            .map_err(EVMError::Database)?;
        caller_account.data.info.balance = caller_account
            .data
            .info
            .balance
            .saturating_add(reimbursement);
        Ok(())
    }

    /// Rewards the block beneficiary with the priority portion of the spent
    /// gas.
    fn reward_beneficiary(&mut self, tx_gas: &Gas) -> Result<(), EVMError<DB::Error>> {
        if self.host.env.cfg.is_beneficiary_reward_disabled() {
            return Ok(());
        }
        let beneficiary = self.host.env.block.coinbase;
        let effective_gas_price = self.host.env.effective_gas_price();

        // EIP-1559: burn the base fee.
        let coinbase_gas_price = if self.spec_id.is_enabled_in(SpecId::LONDON) {
            effective_gas_price.saturating_sub(self.host.env.block.basefee)
        } else {
            effective_gas_price
        };
        let reward = coinbase_gas_price
            .saturating_mul(U256::from(tx_gas.spent() - tx_gas.refunded() as u64));

        let coinbase_account = self
            .host
            .journaled_state
            .load_account(beneficiary)
            .map_err(EVMError::Database)?;
        coinbase_account.data.mark_touch();
        coinbase_account.data.info.balance =
            coinbase_account.data.info.balance.saturating_add(reward);
        Ok(())
    }

    /// Builds the typed outcome and finalizes the journal.
    fn output(
        &mut self,
        result: FrameResult,
        tx_gas: Gas,
        is_create: bool,
    ) -> Result<ResultAndState<EvmState>, EVMError<DB::Error>> {
        let instruction_result = result.interpreter_result().result;
        let created_address = result.created_address();
        let output = result.into_interpreter_result().output;

        let journal_output = self.host.journaled_state.finalize();
        let gas_refunded = tx_gas.refunded() as u64;
        let gas_used = tx_gas.spent() - gas_refunded;

        let result = match SuccessOrHalt::from(instruction_result) {
            SuccessOrHalt::Success(reason) => ExecutionResult::Success {
                reason,
                gas_used,
                gas_refunded,
                logs: journal_output.logs,
                output: if is_create {
                    Output::Create(output, created_address)
                } else {
                    Output::Call(output)
                },
            },
            SuccessOrHalt::Revert => ExecutionResult::Revert { gas_used, output },
            SuccessOrHalt::Halt(reason) => ExecutionResult::Halt { reason, gas_used },
            SuccessOrHalt::FatalExternalError => {
                return Err(match self.host.take_error() {
                    Some(err) => EVMError::Database(err),
                    None => EVMError::Custom("fatal external error".to_string()),
                })
            }
            SuccessOrHalt::Internal(result) => {
                return Err(EVMError::Custom(format!(
                    "internal instruction result escaped the frame loop: {result:?}"
                )))
            }
        };

        Ok(ResultAndState {
            result,
            state: journal_output.state,
        })
    }

    /// Runs the depth-first frame loop until the first frame produces its
    /// result.
    fn run_the_loop(&mut self, first_frame: Frame) -> Result<FrameResult, EVMError<DB::Error>> {
        let instruction_table = make_instruction_table::<JournaledHost<DB>>();

        let mut call_stack: Vec<Frame> = Vec::with_capacity(1025);

        let mut shared_memory =
            SharedMemory::new_with_memory_limit(self.host.env.cfg.memory_limit);
        shared_memory.new_context();
        let mut first_frame = first_frame;
        first_frame.interpreter.shared_memory = shared_memory;
        call_stack.push(first_frame);

        loop {
            let frame = call_stack.last_mut().unwrap();
            let action = frame.interpreter.run(&instruction_table, &mut self.host);

            match action {
                InterpreterAction::Call { inputs } => match self.make_call_frame(&inputs)? {
                    FrameOrResult::Frame(mut new_frame) => {
                        let mut memory = call_stack.last_mut().unwrap().interpreter.take_memory();
                        memory.new_context();
                        new_frame.interpreter.shared_memory = memory;
                        call_stack.push(new_frame);
                    }
                    FrameOrResult::Result(FrameResult::Call(outcome)) => {
                        call_stack
                            .last_mut()
                            .unwrap()
                            .interpreter
                            .insert_call_outcome(outcome);
                    }
                    FrameOrResult::Result(FrameResult::Create(_)) => {
                        unreachable!("call inputs produce call results")
                    }
                },
                InterpreterAction::Create { inputs } => {
                    match self.make_create_frame(self.spec_id, &inputs)? {
                        FrameOrResult::Frame(mut new_frame) => {
                            let mut memory =
                                call_stack.last_mut().unwrap().interpreter.take_memory();
                            memory.new_context();
                            new_frame.interpreter.shared_memory = memory;
                            call_stack.push(new_frame);
                        }
                        FrameOrResult::Result(FrameResult::Create(outcome)) => {
                            call_stack
                                .last_mut()
                                .unwrap()
                                .interpreter
                                .insert_create_outcome(outcome);
                        }
                        FrameOrResult::Result(FrameResult::Call(_)) => {
                            unreachable!("create inputs produce create results")
                        }
                    }
                }
                InterpreterAction::Return { result } => {
                    let mut returned_frame = call_stack.pop().unwrap();
                    let mut memory = returned_frame.interpreter.take_memory();
                    memory.free_context();

                    let frame_result = match returned_frame.frame_data {
                        FrameData::Call {
                            return_memory_range,
                        } => {
                            self.call_return(&result, returned_frame.checkpoint);
                            FrameResult::Call(CallOutcome::new(result, return_memory_range))
                        }
                        FrameData::Create { created_address } => {
                            let mut result = result;
                            self.create_return(
                                &mut result,
                                created_address,
                                returned_frame.checkpoint,
                            );
                            FrameResult::Create(CreateOutcome::new(
                                result,
                                Some(created_address),
                            ))
                        }
                    };

                    let Some(parent) = call_stack.last_mut() else {
                        return Ok(frame_result);
                    };
                    parent.interpreter.shared_memory = memory;
                    match frame_result {
                        FrameResult::Call(outcome) => parent.interpreter.insert_call_outcome(outcome),
                        FrameResult::Create(outcome) => {
                            parent.interpreter.insert_create_outcome(outcome)
                        }
                    }
                }
                InterpreterAction::None => {
                    unreachable!("interpreter frames always set an action")
                }
            }
        }
    }

    /// Makes a call frame, or an immediate result when the callee cannot run.
    fn make_call_frame(
        &mut self,
        inputs: &CallInputs,
    ) -> Result<FrameOrResult, EVMError<DB::Error>> {
        let gas = Gas::new(inputs.gas_limit);
        let return_result = |instruction_result: InstructionResult| {
            Ok(FrameOrResult::new_call_result(
                InterpreterResult {
                    result: instruction_result,
                    gas,
                    output: Bytes::new(),
                },
                inputs.return_memory_offset.clone(),
            ))
        };

        // Frames beyond the EIP-150 depth cap never start.
        if self.host.journaled_state.depth() > CALL_STACK_LIMIT {
            return return_result(InstructionResult::CallTooDeep);
        }

        let account = self
            .host
            .journaled_state
            .load_code(inputs.bytecode_address)
            .map_err(EVMError::Database)?;
        let code_hash = account.data.info.code_hash;
        let bytecode = account.data.info.code.clone().unwrap_or_default();

        let checkpoint = self.host.journaled_state.checkpoint();

        // Move the value, or at least touch the callee: a called account is
        // written back (or state-cleared if empty) even with nothing sent.
        if let CallValue::Transfer(value) = inputs.value {
            if value.is_zero() {
                self.host
                    .journaled_state
                    .load_account(inputs.target_address)
                    .map_err(EVMError::Database)?;
                self.host.journaled_state.touch(&inputs.target_address);
            } else if let Some(e) = self
                .host
                .journaled_state
                .transfer(&inputs.caller, &inputs.target_address, value)
                .map_err(EVMError::Database)?
            {
                self.host.journaled_state.checkpoint_revert(checkpoint);
                return return_result(e.into());
            }
        }

        if bytecode.is_empty() {
            // Nothing to run; the call succeeds on the spot.
            self.host.journaled_state.checkpoint_commit();
            return return_result(InstructionResult::Stop);
        }

        let contract =
            Contract::new_with_context(inputs.input.clone(), bytecode, Some(code_hash), inputs);
        Ok(FrameOrResult::new_call_frame(
            inputs.return_memory_offset.clone(),
            checkpoint,
            Interpreter::new(contract, inputs.gas_limit, inputs.is_static, self.spec_id),
        ))
    }

    /// Makes a create frame, or an immediate result when the create cannot
    /// start.
    fn make_create_frame(
        &mut self,
        spec_id: SpecId,
        inputs: &CreateInputs,
    ) -> Result<FrameOrResult, EVMError<DB::Error>> {
        let return_error = |e: InstructionResult| {
            Ok(FrameOrResult::new_create_result(
                InterpreterResult {
                    result: e,
                    gas: Gas::new(inputs.gas_limit),
                    output: Bytes::new(),
                },
                None,
            ))
        };

        // Frames beyond the EIP-150 depth cap never start.
        if self.host.journaled_state.depth() > CALL_STACK_LIMIT {
            return return_error(InstructionResult::CallTooDeep);
        }

        // The endowment must be covered before anything is spent.
        let caller_balance = self
            .host
            .journaled_state
            .load_account(inputs.caller)
            .map_err(EVMError::Database)?
            .data
            .info
            .balance;
        if caller_balance < inputs.value {
            return return_error(InstructionResult::OutOfFunds);
        }

        // A caller at the nonce ceiling cannot derive a new address; give the
        // gas back and move on.
        let Some(new_nonce) = self.host.journaled_state.inc_nonce(inputs.caller) else {
            return return_error(InstructionResult::Return);
        };

        // CREATE addresses come from the pre-increment nonce, CREATE2 from
        // the salted initcode hash, which the new contract also records.
        let (created_address, init_code_hash) = match inputs.scheme {
            CreateScheme::Create => (inputs.caller.create(new_nonce - 1), B256::ZERO),
            CreateScheme::Create2 { salt } => {
                let hash = keccak256(&inputs.init_code);
                (inputs.caller.create2(salt.to_be_bytes(), hash), hash)
            }
        };

        // The target joins the state warm, like an access-list entry.
        self.host
            .journaled_state
            .load_account(created_address)
            .map_err(EVMError::Database)?;

        let checkpoint = match self.host.journaled_state.create_account_checkpoint(
            inputs.caller,
            created_address,
            inputs.value,
            spec_id,
        ) {
            Ok(checkpoint) => checkpoint,
            Err(e) => return return_error(e.into()),
        };

        let bytecode = Bytecode::new_raw(inputs.init_code.clone());
        let contract = Contract::new(
            Bytes::new(),
            bytecode,
            Some(init_code_hash),
            created_address,
            None,
            inputs.caller,
            inputs.value,
        );

        Ok(FrameOrResult::new_create_frame(
            created_address,
            checkpoint,
            Interpreter::new(contract, inputs.gas_limit, false, spec_id),
        ))
    }

    /// Settles the journal checkpoint of a finished call frame.
    fn call_return(&mut self, result: &InterpreterResult, checkpoint: JournalCheckpoint) {
        match result.result {
            return_ok!() => self.host.journaled_state.checkpoint_commit(),
            _ => self.host.journaled_state.checkpoint_revert(checkpoint),
        }
    }

    /// Settles a finished create frame: either the deployment sticks — code
    /// deposited, checkpoint committed, result rewritten to `Return` — or the
    /// whole create unwinds to its checkpoint.
    fn create_return(
        &mut self,
        result: &mut InterpreterResult,
        address: Address,
        checkpoint: JournalCheckpoint,
    ) {
        let deposit = if matches!(result.result, return_ok!()) {
            self.check_deposited_code(result)
        } else {
            // The init code itself failed; its own result stands.
            Err(result.result)
        };

        match deposit {
            Err(failure) => {
                self.host.journaled_state.checkpoint_revert(checkpoint);
                result.result = failure;
            }
            Ok(()) => {
                self.host.journaled_state.checkpoint_commit();

                let raw = Bytecode::new_raw(result.output.clone());
                let bytecode = match self.host.env.cfg.perf_analyse_created_bytecodes {
                    AnalysisKind::Raw => raw,
                    AnalysisKind::Analyse => raw.into_analyzed(),
                };
                self.host.journaled_state.set_code(address, bytecode);

                result.result = InstructionResult::Return;
            }
        }
    }

    /// Applies the deployment rules to the code an init frame returned and
    /// charges the deposit, mutating `result`'s gas (and, for the Frontier
    /// special case, its output).
    fn check_deposited_code(
        &mut self,
        result: &mut InterpreterResult,
    ) -> Result<(), InstructionResult> {
        let spec_id = self.spec_id;

        // EIP-3541 reserves the 0xEF lead byte for a future format.
        if spec_id.is_enabled_in(SpecId::LONDON) && result.output.first() == Some(&0xEF) {
            return Err(InstructionResult::CreateContractStartingWithEF);
        }

        // Deployed code is capped at 24576 bytes (EIP-170) unless
        // reconfigured.
        if spec_id.is_enabled_in(SpecId::SPURIOUS_DRAGON)
            && result.output.len() > self.host.env.cfg.max_code_size()
        {
            return Err(InstructionResult::CreateContractSizeLimit);
        }

        // 200 gas per deposited byte. An unpayable deposit fails the whole
        // create from Homestead on (EIP-2); Frontier instead deployed an
        // empty contract.
        let deposit_gas = result.output.len() as u64 * gas::CODEDEPOSIT;
        if !result.gas.record_cost(deposit_gas) {
            if spec_id.is_enabled_in(SpecId::HOMESTEAD) {
                return Err(InstructionResult::OutOfGas);
            }
            result.output = Bytes::new();
        }

        Ok(())
    }
}

impl<DB: Database + DatabaseCommit> Evm<DB> {
    /// Transacts the configured transaction and commits the state delta to
    /// the database.
    pub fn transact_commit(&mut self) -> Result<ExecutionResult, EVMError<DB::Error>> {
        let ResultAndState { result, state } = self.transact()?;
        self.host.journaled_state.database.commit(state);
        Ok(result)
    }
}
