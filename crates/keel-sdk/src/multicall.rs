//! Batching bound calls through the Multicall3 contract

use bytes::Bytes;
use keel_primitives::{Address, U256};

use crate::abi::{Args, Fields, Type, Value};
use crate::contract::BoundMethodCall;
use crate::error::AbiError;
use crate::interface::{Method, Mutability, Output};

/// Multicall3 deployment address, identical on most EVM chains
pub const MULTICALL3_ADDRESS: Address = Address::from_bytes([
    0xca, 0x11, 0xbd, 0xe0, 0x59, 0x77, 0xb3, 0x63, 0x11, 0x67, 0x02, 0x88, 0x62, 0xbe, 0x2a, 0x17,
    0x39, 0x76, 0xca, 0x11,
]);

struct Entry<'a> {
    call: BoundMethodCall<'a>,
    allow_failure: bool,
    value: U256,
}

/// Collects bound calls into one `aggregate3` (or `aggregate3Value`) call
#[derive(Default)]
pub struct Multicall<'a> {
    entries: Vec<Entry<'a>>,
}

impl<'a> Multicall<'a> {
    /// Empty batch
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add a call; the whole batch reverts if it fails
    pub fn call(self, call: BoundMethodCall<'a>) -> Self {
        self.push(call, false, U256::zero())
    }

    /// Add a call whose failure is reported instead of reverting the batch
    pub fn try_call(self, call: BoundMethodCall<'a>) -> Self {
        self.push(call, true, U256::zero())
    }

    /// Add a payable call forwarding `value`
    pub fn call_with_value(self, call: BoundMethodCall<'a>, allow_failure: bool, value: U256) -> Self {
        self.push(call, allow_failure, value)
    }

    fn push(mut self, call: BoundMethodCall<'a>, allow_failure: bool, value: U256) -> Self {
        self.entries.push(Entry {
            call,
            allow_failure,
            value,
        });
        self
    }

    /// Number of batched calls
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode the batch as a call to the Multicall3 contract
    pub fn build(self) -> Result<MulticallCall<'a>, AbiError> {
        let with_value = self.entries.iter().any(|e| !e.value.is_zero());
        let method = aggregate_method(with_value)?;

        let calls = self
            .entries
            .iter()
            .map(|entry| {
                let mut fields = vec![
                    Value::Address(entry.call.address()),
                    Value::Bool(entry.allow_failure),
                ];
                if with_value {
                    fields.push(Value::from(entry.value));
                }
                fields.push(Value::Bytes(entry.call.data().to_vec()));
                Value::tuple(fields)
            })
            .collect::<Vec<_>>();
        let data = method.call(&Args::new().arg(Value::Array(calls)))?.into_data();

        let total_value = self
            .entries
            .iter()
            .fold(U256::zero(), |total, entry| total.saturating_add(entry.value));
        let mutating = self.entries.iter().any(|e| e.call.mutating());
        let payable = with_value || self.entries.iter().any(|e| e.call.payable());

        Ok(MulticallCall {
            method,
            data,
            calls: self.entries.into_iter().map(|e| e.call).collect(),
            mutating,
            payable,
            value: total_value,
        })
    }
}

/// An encoded Multicall3 batch
#[derive(Debug, Clone)]
pub struct MulticallCall<'a> {
    method: Method,
    data: Bytes,
    calls: Vec<BoundMethodCall<'a>>,
    mutating: bool,
    payable: bool,
    value: U256,
}

impl<'a> MulticallCall<'a> {
    /// Multicall3 contract address
    pub fn address(&self) -> Address {
        MULTICALL3_ADDRESS
    }

    /// Calldata for the aggregate call
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// True if any batched call modifies state
    pub fn mutating(&self) -> bool {
        self.mutating
    }

    /// True if any batched call accepts a value transfer
    pub fn payable(&self) -> bool {
        self.payable
    }

    /// Sum of the values forwarded to the batched calls
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Decode the aggregate result; successful entries are decoded by their own method
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<CallResult>, AbiError> {
        let results = self.method.decode_output(data)?.into_value();
        let results = results
            .field("returnData")
            .and_then(Value::as_array)
            .ok_or_else(|| AbiError::value(RESULTS_TYPE, "expected an array of results"))?;
        if results.len() != self.calls.len() {
            return Err(AbiError::value(
                RESULTS_TYPE,
                format!("expected {} results, got {}", self.calls.len(), results.len()),
            ));
        }

        results
            .iter()
            .zip(&self.calls)
            .map(|(result, call)| {
                let success = result.field("success").and_then(Value::as_bool);
                let data = result.field("returnData").and_then(Value::as_bytes);
                match (success, data) {
                    (Some(true), Some(data)) => Ok(CallResult::Success(call.decode_output(data)?)),
                    (Some(false), Some(data)) => Ok(CallResult::Failure(Bytes::copy_from_slice(data))),
                    _ => Err(AbiError::value(RESULTS_TYPE, "malformed result entry")),
                }
            })
            .collect()
    }
}

/// Outcome of one batched call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResult {
    /// Decoded return value
    Success(Output),
    /// Raw revert data
    Failure(Bytes),
}

const RESULTS_TYPE: &str = "(bool,bytes)[]";

fn aggregate_method(with_value: bool) -> Result<Method, AbiError> {
    let mut call_fields = vec![("target", Type::address()), ("allowFailure", Type::bool())];
    if with_value {
        call_fields.push(("value", Type::uint256()));
    }
    call_fields.push(("callData", Type::dynamic_bytes()));
    let calls = Type::dynamic_array(Type::structure(call_fields)?);

    let result = Type::structure([("success", Type::bool()), ("returnData", Type::dynamic_bytes())])?;
    let outputs = Fields::named([("returnData", Type::dynamic_array(result))])?;

    let name = if with_value { "aggregate3Value" } else { "aggregate3" };
    Ok(Method::new(name, Mutability::Payable, Fields::named([("calls", calls)])?, outputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode;
    use crate::abi::Token;
    use crate::contract::DeployedContract;
    use crate::interface::ContractAbi;
    use serde_json::json;

    fn counter() -> DeployedContract {
        let abi = ContractAbi::from_json(&json!([
            {"type": "function", "name": "get", "stateMutability": "view",
             "inputs": [], "outputs": [{"name": "", "type": "uint256"}]},
            {"type": "function", "name": "set", "stateMutability": "nonpayable",
             "inputs": [{"name": "x", "type": "uint256"}], "outputs": []}
        ]))
        .unwrap();
        DeployedContract::new(abi, Address::from([7u8; 20]))
    }

    #[test]
    fn test_aggregate3_selector() {
        let contract = counter();
        let batch = Multicall::new()
            .call(contract.method("get", &Args::new()).unwrap())
            .build()
            .unwrap();
        assert_eq!(&batch.data()[..4], &[0x82, 0xad, 0x56, 0xcb]);
        assert_eq!(batch.address(), MULTICALL3_ADDRESS);
        assert!(!batch.mutating());
    }

    #[test]
    fn test_aggregate3_value_selector() {
        let contract = counter();
        let batch = Multicall::new()
            .call_with_value(contract.method("get", &Args::new()).unwrap(), false, U256::from(5))
            .build()
            .unwrap();
        assert_eq!(&batch.data()[..4], &[0x17, 0x4d, 0xea, 0x71]);
        assert!(batch.payable());
        assert_eq!(batch.value(), U256::from(5));
    }

    #[test]
    fn test_mutating_if_any_call_mutates() {
        let contract = counter();
        let batch = Multicall::new()
            .call(contract.method("get", &Args::new()).unwrap())
            .try_call(contract.method("set", &Args::new().arg(1u8)).unwrap())
            .build()
            .unwrap();
        assert!(batch.mutating());
    }

    #[test]
    fn test_decode_results() {
        let contract = counter();
        let batch = Multicall::new()
            .call(contract.method("get", &Args::new()).unwrap())
            .try_call(contract.method("get", &Args::new()).unwrap())
            .build()
            .unwrap();

        let mut value = vec![0u8; 32];
        value[31] = 42;
        let returned = encode(&[Token::Array(vec![
            Token::Tuple(vec![Token::Bool(true), Token::Bytes(value)]),
            Token::Tuple(vec![Token::Bool(false), Token::Bytes(vec![0xde, 0xad])]),
        ])]);

        let results = batch.decode_output(&returned).unwrap();
        assert_eq!(
            results,
            vec![
                CallResult::Success(Output::Value(Value::from(42u8))),
                CallResult::Failure(Bytes::from_static(&[0xde, 0xad])),
            ]
        );
    }

    #[test]
    fn test_result_count_mismatch() {
        let contract = counter();
        let batch = Multicall::new()
            .call(contract.method("get", &Args::new()).unwrap())
            .build()
            .unwrap();
        let returned = encode(&[Token::Array(vec![])]);
        assert!(batch.decode_output(&returned).is_err());
    }
}
