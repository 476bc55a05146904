use soroban_sdk::{Address, Env, IntoVal, Symbol};

use crate::events::ExternalCallFailed;

/// `a * b / c` with a checked product.
pub fn mul_div(a: u128, b: u128, c: u128) -> u128 {
    if c == 0 {
        panic!("division by zero");
    }
    match a.checked_mul(b) {
        Some(product) => product / c,
        None => panic!("math overflow"),
    }
}

pub fn to_i128(amount: u128) -> i128 {
    if amount > i128::MAX as u128 {
        panic!("amount exceeds i128");
    }
    amount as i128
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CallErrorKind {
    ContractRevert,
    HostError,
}

impl CallErrorKind {
    pub fn as_code(&self) -> u32 {
        match self {
            CallErrorKind::ContractRevert => 0,
            CallErrorKind::HostError => 1,
        }
    }
}

pub(crate) struct CallError {
    pub function: Symbol,
    pub kind: CallErrorKind,
}

pub(crate) fn emit_external_call_failure(
    env: &Env,
    contract: &Address,
    error: &CallError,
    recoverable: bool,
) {
    ExternalCallFailed {
        contract: contract.clone(),
        function: error.function.clone(),
        recoverable,
        failure_kind: error.kind.as_code(),
    }
    .publish(env);
}

pub(crate) fn try_call_contract<T, A>(
    env: &Env,
    contract: &Address,
    func: &str,
    args: A,
) -> Result<T, CallError>
where
    T: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
    A: IntoVal<Env, soroban_sdk::Vec<soroban_sdk::Val>>,
{
    use soroban_sdk::{InvokeError, Val, Vec};
    let symbol = Symbol::new(env, func);
    let args_val: Vec<Val> = args.into_val(env);
    match env.try_invoke_contract::<T, InvokeError>(contract, &symbol, args_val) {
        Ok(Ok(val)) => Ok(val),
        Ok(Err(_)) => Err(CallError {
            function: symbol,
            kind: CallErrorKind::HostError,
        }),
        Err(_) => Err(CallError {
            function: symbol,
            kind: CallErrorKind::ContractRevert,
        }),
    }
}

pub(crate) fn call_contract_or_panic<T, A>(
    env: &Env,
    contract: &Address,
    func: &str,
    args: A,
) -> T
where
    T: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
    A: IntoVal<Env, soroban_sdk::Vec<soroban_sdk::Val>>,
{
    match try_call_contract(env, contract, func, args) {
        Ok(val) => val,
        Err(err) => {
            emit_external_call_failure(env, contract, &err, false);
            panic!("{} call failed", func);
        }
    }
}
