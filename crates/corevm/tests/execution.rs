//! End-to-end execution scenarios through the transaction driver.

use corevm::{
    database::CacheDB,
    primitives::{
        hex, Address, Bytes, ExecutionResult, HaltReason, Output, OutOfGasError, SuccessReason,
        TransactTo, U256,
    },
    state::{AccountInfo, Bytecode},
    Evm, EmptyDB, Env, InMemoryDB,
};

const CALLER: Address = Address::new([0xee; 20]);

fn db_with_contract(address: Address, code: &[u8]) -> InMemoryDB {
    let mut db = CacheDB::new(EmptyDB::default());
    db.insert_account_info(
        address,
        AccountInfo::from_bytecode(Bytecode::new_raw(Bytes::copy_from_slice(code))),
    );
    db
}

fn call_env(to: Address, gas_limit: u64) -> Env {
    let mut env = Env::default();
    env.tx.caller = CALLER;
    env.tx.transact_to = TransactTo::Call(to);
    env.tx.gas_limit = gas_limit;
    env
}

#[test]
fn simple_add_program_stops() {
    let to = Address::with_last_byte(0xaa);
    // PUSH1 1, PUSH1 2, ADD
    let db = db_with_contract(to, &hex!("6001600201"));
    let mut evm = Evm::new(call_env(to, 1_000_000), db);

    let result = evm.transact().unwrap().result;
    let ExecutionResult::Success {
        reason, gas_used, ..
    } = result
    else {
        panic!("expected success, got {result:?}");
    };
    assert_eq!(reason, SuccessReason::Stop);
    // intrinsic gas + PUSH1 + PUSH1 + ADD
    assert_eq!(gas_used, 21_000 + 9);
}

#[test]
fn jump_loop_exhausts_gas() {
    let to = Address::with_last_byte(0xaa);
    // JUMPDEST, PUSH1 0, JUMP
    let db = db_with_contract(to, &hex!("5b600056"));
    let mut evm = Evm::new(call_env(to, 30_000), db);

    let result = evm.transact().unwrap().result;
    let ExecutionResult::Halt { reason, gas_used } = result else {
        panic!("expected halt, got {result:?}");
    };
    assert_eq!(reason, HaltReason::OutOfGas(OutOfGasError::Basic));
    // out of gas consumes everything
    assert_eq!(gas_used, 30_000);
}

#[test]
fn return_copies_memory_to_output() {
    let to = Address::with_last_byte(0xaa);
    // PUSH1 0xff, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
    let db = db_with_contract(to, &hex!("60ff60005260206000f3"));
    let mut evm = Evm::new(call_env(to, 1_000_000), db);

    let result = evm.transact().unwrap().result;
    let ExecutionResult::Success {
        reason,
        gas_used,
        output,
        ..
    } = result
    else {
        panic!("expected success, got {result:?}");
    };
    assert_eq!(reason, SuccessReason::Return);
    let mut expected = [0u8; 32];
    expected[31] = 0xff;
    assert_eq!(output, Output::Call(Bytes::copy_from_slice(&expected)));
    // intrinsic + 2 pushes + (MSTORE + one word of memory) + 2 pushes
    assert_eq!(gas_used, 21_000 + 3 + 3 + 6 + 3 + 3);
}

#[test]
fn sstore_persists_through_commit() {
    let to = Address::with_last_byte(0xaa);
    // PUSH1 1, PUSH1 0, SSTORE
    let db = db_with_contract(to, &hex!("6001600055"));
    let mut evm = Evm::new(call_env(to, 1_000_000), db);

    let result = evm.transact_commit().unwrap();
    let ExecutionResult::Success { gas_used, .. } = result else {
        panic!("expected success, got {result:?}");
    };
    // intrinsic + 2 pushes + SSTORE_SET + cold slot surcharge
    assert_eq!(gas_used, 21_000 + 6 + 20_000 + 2_100);

    let db = evm.into_db();
    let account = &db.accounts[&to];
    assert_eq!(account.storage.get(&U256::ZERO), Some(&U256::from(1)));
}

#[test]
fn revert_discards_writes_and_returns_remaining_gas() {
    let to = Address::with_last_byte(0xaa);
    // PUSH1 1, PUSH1 0, SSTORE, PUSH1 0, PUSH1 0, REVERT
    let db = db_with_contract(to, &hex!("600160005560006000fd"));
    let mut evm = Evm::new(call_env(to, 1_000_000), db);

    let result = evm.transact().unwrap();
    let ExecutionResult::Revert { gas_used, output } = result.result else {
        panic!("expected revert, got {:?}", result.result);
    };
    assert!(output.is_empty());
    // the reverted SSTORE still consumed its gas, the remainder is returned
    assert_eq!(gas_used, 21_000 + 6 + 20_000 + 2_100 + 6);
    // no storage write survives
    assert!(result
        .state
        .get(&to)
        .map_or(true, |account| !account.is_touched()));
}

#[test]
fn inner_revert_rolls_back_only_the_inner_frame() {
    let outer_address = Address::with_last_byte(0xaa);
    let inner_address = Address::with_last_byte(0xcb);

    // outer: SSTORE(0, 7), CALL(inner), STOP
    let outer_code = hex!(
        "6007600055"                                 // PUSH1 7, PUSH1 0, SSTORE
        "60006000600060006000"                       // out/in ranges and value
        "7300000000000000000000000000000000000000cb" // PUSH20 inner
        "61ffff"                                     // PUSH2 gas
        "f1"                                         // CALL
        "00"                                         // STOP
    );
    // inner: SSTORE(0, 9), REVERT
    let inner_code = hex!("600960005560006000fd");

    let mut db = db_with_contract(outer_address, &outer_code);
    db.insert_account_info(
        inner_address,
        AccountInfo::from_bytecode(Bytecode::new_raw(Bytes::copy_from_slice(&inner_code))),
    );
    let mut evm = Evm::new(call_env(outer_address, 1_000_000), db);

    let result = evm.transact().unwrap();
    assert!(result.result.is_success(), "outer frame should succeed");

    // the outer write survives
    let outer_account = &result.state[&outer_address];
    assert_eq!(
        outer_account.storage.get(&U256::ZERO).map(|s| s.present_value),
        Some(U256::from(7))
    );
    // the inner write was rolled back
    let inner_account = &result.state[&inner_address];
    assert_eq!(
        inner_account
            .storage
            .get(&U256::ZERO)
            .map(|s| s.present_value)
            .unwrap_or_default(),
        U256::ZERO
    );
    assert!(!inner_account.is_touched());
}

#[test]
fn transfer_to_empty_account() {
    let to = Address::with_last_byte(0xaa);
    let mut db = CacheDB::new(EmptyDB::default());
    db.insert_account_info(CALLER, AccountInfo::from_balance(U256::from(100)));

    let mut env = call_env(to, 1_000_000);
    env.tx.value = U256::from(40);
    let mut evm = Evm::new(env, db);

    let result = evm.transact().unwrap();
    let ExecutionResult::Success {
        reason, gas_used, ..
    } = result.result
    else {
        panic!("expected success, got {:?}", result.result);
    };
    // an empty callee is a plain stop, costing only the intrinsic gas
    assert_eq!(reason, SuccessReason::Stop);
    assert_eq!(gas_used, 21_000);

    assert_eq!(result.state[&to].info.balance, U256::from(40));
    assert_eq!(result.state[&CALLER].info.balance, U256::from(60));
    // the caller nonce was consumed
    assert_eq!(result.state[&CALLER].info.nonce, 1);
}

#[test]
fn create_deploys_runtime_code() {
    let db = CacheDB::new(EmptyDB::default());
    let mut env = Env::default();
    env.tx.caller = CALLER;
    env.tx.transact_to = TransactTo::Create;
    // PUSH1 0xfe, PUSH1 0, MSTORE8, PUSH1 1, PUSH1 0, RETURN
    env.tx.data = Bytes::from_static(&hex!("60fe60005360016000f3"));
    env.tx.gas_limit = 1_000_000;
    let mut evm = Evm::new(env, db);

    let result = evm.transact_commit().unwrap();
    let ExecutionResult::Success {
        reason,
        gas_used,
        output: Output::Create(runtime, Some(created)),
        ..
    } = result
    else {
        panic!("expected successful create, got {result:?}");
    };
    assert_eq!(reason, SuccessReason::Return);
    assert_eq!(created, CALLER.create(0));
    assert_eq!(runtime.as_ref(), &[0xfe]);
    // create stipend + initcode word + calldata + execution + code deposit
    let data_gas = 2 * 4 + 8 * 16;
    assert_eq!(gas_used, 53_000 + 2 + data_gas + 18 + 200);

    let db = evm.into_db();
    let created_account = &db.accounts[&created];
    assert_eq!(created_account.info.nonce, 1);
    let code = db.contracts[&created_account.info.code_hash].clone();
    assert_eq!(code.original_byte_slice(), &[0xfe]);
}

#[test]
fn create_rejects_ef_prefixed_code() {
    let db = CacheDB::new(EmptyDB::default());
    let mut env = Env::default();
    env.tx.caller = CALLER;
    env.tx.transact_to = TransactTo::Create;
    // stores 0xEF and returns it as runtime code
    env.tx.data = Bytes::from_static(&hex!("60ef60005360016000f3"));
    env.tx.gas_limit = 1_000_000;
    let mut evm = Evm::new(env, db);

    let result = evm.transact().unwrap().result;
    let ExecutionResult::Halt { reason, .. } = result else {
        panic!("expected halt, got {result:?}");
    };
    assert_eq!(reason, HaltReason::CreateContractStartingWithEF);
}

#[test]
fn gas_fees_flow_to_the_beneficiary() {
    let to = Address::with_last_byte(0xaa);
    let coinbase = Address::with_last_byte(0xcc);
    let db = db_with_contract(to, &hex!("6001600201"));

    let mut env = call_env(to, 1_000_000);
    env.tx.gas_price = U256::from(2);
    env.block.coinbase = coinbase;
    let mut db = db;
    db.insert_account_info(CALLER, AccountInfo::from_balance(U256::from(10_000_000)));
    let mut evm = Evm::new(env, db);

    let result = evm.transact().unwrap();
    let gas_used = result.result.gas_used();
    assert_eq!(gas_used, 21_009);

    // basefee is zero, so the whole fee goes to the coinbase
    assert_eq!(
        result.state[&coinbase].info.balance,
        U256::from(2 * gas_used)
    );
    assert_eq!(
        result.state[&CALLER].info.balance,
        U256::from(10_000_000 - 2 * gas_used)
    );
}

#[test]
fn nonce_too_low_is_rejected() {
    let to = Address::with_last_byte(0xaa);
    let mut db = CacheDB::new(EmptyDB::default());
    db.insert_account_info(
        CALLER,
        AccountInfo {
            nonce: 5,
            ..AccountInfo::from_balance(U256::from(100))
        },
    );
    let mut env = call_env(to, 1_000_000);
    env.tx.nonce = Some(4);
    let mut evm = Evm::new(env, db);

    let err = evm.transact().unwrap_err();
    assert!(matches!(
        err,
        corevm::primitives::EVMError::Transaction(
            corevm::primitives::InvalidTransaction::NonceTooLow { tx: 4, state: 5 }
        )
    ));
}
