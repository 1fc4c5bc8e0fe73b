//! Contracts bound to bytecode or to a deployed address
//!
//! These types only produce and consume payloads; sending them is up to the
//! caller's provider.

use bytes::Bytes;
use keel_primitives::{Address, LogEntry, H256};

use crate::abi::{Args, FieldValues, Value};
use crate::error::{AbiError, DecodeError};
use crate::interface::{ContractAbi, Error, Event, EventFilter, FilterValue, Method, MethodCall, Output};

/// A compiled contract: ABI and deployment bytecode
#[derive(Debug, Clone)]
pub struct CompiledContract {
    abi: ContractAbi,
    bytecode: Bytes,
}

impl CompiledContract {
    /// Create from an assembled ABI and bytecode
    pub fn new(abi: ContractAbi, bytecode: impl Into<Bytes>) -> Self {
        Self {
            abi,
            bytecode: bytecode.into(),
        }
    }

    /// Create from a JSON ABI and hex bytecode (with or without `0x`)
    pub fn from_compiler_output(abi: &serde_json::Value, bytecode: &str) -> Result<Self, AbiError> {
        Ok(Self::new(ContractAbi::from_json(abi)?, decode_bytecode(bytecode)?))
    }

    /// Create from a compiler artifact: `{"abi": [...], "bytecode": "0x..."}`.
    ///
    /// The bytecode may also be nested as `{"object": "0x..."}`.
    pub fn from_artifact_json(artifact: &serde_json::Value) -> Result<Self, AbiError> {
        let abi = artifact
            .get("abi")
            .ok_or_else(|| AbiError::declaration("artifact has no `abi` key"))?;
        let bytecode = match artifact.get("bytecode") {
            Some(serde_json::Value::String(code)) => code.as_str(),
            Some(serde_json::Value::Object(map)) => map
                .get("object")
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| AbiError::declaration("artifact bytecode has no `object` string"))?,
            _ => return Err(AbiError::declaration("artifact has no `bytecode` key")),
        };
        Self::from_compiler_output(abi, bytecode)
    }

    /// Contract ABI
    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    /// Deployment bytecode
    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Deployment payload: `bytecode ++ encoded constructor arguments`
    pub fn deploy(&self, args: &Args) -> Result<DeployCall, AbiError> {
        let constructor = self.abi.constructor();
        let call = constructor.call(args)?;
        let mut data = Vec::with_capacity(self.bytecode.len() + call.input().len());
        data.extend_from_slice(&self.bytecode);
        data.extend_from_slice(call.input());
        Ok(DeployCall {
            data: Bytes::from(data),
            payable: constructor.payable(),
        })
    }
}

fn decode_bytecode(code: &str) -> Result<Bytes, AbiError> {
    let code = code.trim();
    let code = code.strip_prefix("0x").unwrap_or(code);
    hex::decode(code)
        .map(Bytes::from)
        .map_err(|e| AbiError::declaration(format!("invalid bytecode hex: {e}")))
}

/// Contract creation payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployCall {
    data: Bytes,
    payable: bool,
}

impl DeployCall {
    /// Bytecode followed by the encoded constructor arguments
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Whether the constructor accepts a value transfer
    pub fn payable(&self) -> bool {
        self.payable
    }

    /// Address this payload lands at when `factory` deploys it with `CREATE2`
    pub fn create2_address(&self, factory: &Address, salt: &H256) -> Address {
        keel_crypto::create2_address(factory, salt, &self.data)
    }
}

/// A contract ABI bound to a deployed address
#[derive(Debug, Clone)]
pub struct DeployedContract {
    abi: ContractAbi,
    address: Address,
}

impl DeployedContract {
    /// Bind an ABI to an address
    pub fn new(abi: ContractAbi, address: Address) -> Self {
        Self { abi, address }
    }

    /// Contract ABI
    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    /// Contract address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Prepare a call of the named method (resolving overloads)
    pub fn method(&self, name: &str, args: &Args) -> Result<BoundMethodCall<'_>, AbiError> {
        let method = self.abi.method(name).ok_or_else(|| AbiError::UnknownEntry {
            kind: "method",
            name: name.to_string(),
        })?;
        Ok(BoundMethodCall {
            address: self.address,
            call: method.call(args)?,
        })
    }

    /// Prepare a log filter for the named event
    pub fn event(&self, name: &str, args: &Args<FilterValue>) -> Result<BoundEventFilter<'_>, AbiError> {
        let event = self.abi.event(name).ok_or_else(|| AbiError::UnknownEntry {
            kind: "event",
            name: name.to_string(),
        })?;
        Ok(BoundEventFilter {
            address: self.address,
            event,
            filter: event.filter(args)?,
        })
    }

    /// Custom error by name
    pub fn error(&self, name: &str) -> Result<&Error, AbiError> {
        self.abi.error(name).ok_or_else(|| AbiError::UnknownEntry {
            kind: "error",
            name: name.to_string(),
        })
    }
}

/// A method call addressed to a deployed contract
#[derive(Debug, Clone)]
pub struct BoundMethodCall<'a> {
    address: Address,
    call: MethodCall<'a>,
}

impl<'a> BoundMethodCall<'a> {
    /// Target contract
    pub fn address(&self) -> Address {
        self.address
    }

    /// The resolved method
    pub fn method(&self) -> &'a Method {
        self.call.method()
    }

    /// Calldata: `selector ++ encoded arguments`
    pub fn data(&self) -> &Bytes {
        self.call.data()
    }

    /// Whether a value transfer may be attached
    pub fn payable(&self) -> bool {
        self.method().payable()
    }

    /// Whether this needs a transaction rather than a read-only call
    pub fn mutating(&self) -> bool {
        self.method().mutating()
    }

    /// Decode the returned bytes
    pub fn decode_output(&self, data: &[u8]) -> Result<Output, AbiError> {
        self.call.decode_output(data)
    }
}

/// An event filter restricted to a deployed contract
#[derive(Debug, Clone)]
pub struct BoundEventFilter<'a> {
    address: Address,
    event: &'a Event,
    filter: EventFilter,
}

impl<'a> BoundEventFilter<'a> {
    /// Emitting contract
    pub fn address(&self) -> Address {
        self.address
    }

    /// The filtered event
    pub fn event(&self) -> &'a Event {
        self.event
    }

    /// Topic positions for a log query
    pub fn topics(&self) -> &[Option<Vec<H256>>] {
        self.filter.topics()
    }

    /// Whether a log entry passes the filter
    pub fn matches(&self, entry: &LogEntry) -> bool {
        entry.address == self.address && self.filter.matches(&entry.topics)
    }

    /// Decode a log entry, rejecting entries from other contracts
    pub fn decode_log_entry(&self, entry: &LogEntry) -> Result<FieldValues<Option<Value>>, AbiError> {
        if entry.address != self.address {
            return Err(AbiError::decode(
                format!("{}{}", self.event.name(), self.event.fields().canonical_form()),
                DecodeError::ForeignContract(entry.address.to_hex()),
            ));
        }
        self.event.decode_log_entry(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_primitives::U256;
    use serde_json::json;

    fn token_abi() -> serde_json::Value {
        json!([
            {"type": "constructor", "stateMutability": "nonpayable",
             "inputs": [{"name": "supply", "type": "uint256"}]},
            {"type": "function", "name": "balanceOf", "stateMutability": "view",
             "inputs": [{"name": "owner", "type": "address"}],
             "outputs": [{"name": "", "type": "uint256"}]},
            {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
             "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
             "outputs": [{"name": "", "type": "bool"}]},
            {"type": "event", "name": "Transfer", "anonymous": false,
             "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
             ]}
        ])
    }

    fn token_address() -> Address {
        Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap()
    }

    fn deployed() -> DeployedContract {
        DeployedContract::new(ContractAbi::from_json(&token_abi()).unwrap(), token_address())
    }

    // ==================== Compiled ====================

    #[test]
    fn test_deploy_payload() {
        let compiled = CompiledContract::from_compiler_output(&token_abi(), "0x6080").unwrap();
        assert_eq!(&compiled.bytecode()[..], &[0x60, 0x80]);

        let deploy = compiled.deploy(&Args::new().arg(1000u64)).unwrap();
        assert!(!deploy.payable());
        assert_eq!(deploy.data().len(), 2 + 32);
        assert_eq!(&deploy.data()[..2], &[0x60, 0x80]);
        assert_eq!(U256::from_big_endian(&deploy.data()[2..]), U256::from(1000));
    }

    #[test]
    fn test_deploy_create2_address() {
        let compiled = CompiledContract::from_compiler_output(&token_abi(), "0xdeadbeef").unwrap();
        let deploy = compiled.deploy(&Args::new().arg(1000u64)).unwrap();
        let factory = Address::from_hex("0x00000000000000000000000000000000deadbeef").unwrap();
        let salt = H256::from_bytes([0x11; 32]);

        let predicted = deploy.create2_address(&factory, &salt);
        assert_eq!(predicted, keel_crypto::create2_address(&factory, &salt, deploy.data()));
        // constructor arguments are part of the init code
        let bare = keel_crypto::create2_address(&factory, &salt, &[0xde, 0xad, 0xbe, 0xef]);
        assert_ne!(predicted, bare);
    }

    #[test]
    fn test_from_artifact_json() {
        let artifact = json!({"abi": token_abi(), "bytecode": {"object": "6080"}});
        let compiled = CompiledContract::from_artifact_json(&artifact).unwrap();
        assert_eq!(compiled.bytecode().len(), 2);

        let artifact = json!({"abi": token_abi(), "bytecode": "0xzz"});
        assert!(CompiledContract::from_artifact_json(&artifact).is_err());
        assert!(CompiledContract::from_artifact_json(&json!({"abi": []})).is_err());
    }

    // ==================== Deployed ====================

    #[test]
    fn test_bound_method_call() {
        let contract = deployed();
        let to = Address::from_hex("0x1234567890123456789012345678901234567890").unwrap();

        let call = contract
            .method("transfer", &Args::new().arg(to).arg(1000u64))
            .unwrap();
        assert_eq!(call.address(), token_address());
        assert_eq!(&call.data()[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(call.data().len(), 68);
        assert!(call.mutating());
        assert!(!call.payable());

        let mut ret = [0u8; 32];
        ret[31] = 1;
        assert_eq!(call.decode_output(&ret).unwrap(), Output::Value(Value::Bool(true)));
    }

    #[test]
    fn test_read_only_call() {
        let contract = deployed();
        let call = contract
            .method("balanceOf", &Args::new().kwarg("owner", Address::ZERO))
            .unwrap();
        assert!(!call.mutating());
        assert_eq!(call.data().len(), 36);
    }

    #[test]
    fn test_unknown_entries() {
        let contract = deployed();
        assert!(matches!(
            contract.method("unknown", &Args::new()),
            Err(AbiError::UnknownEntry { kind: "method", .. })
        ));
        assert!(matches!(
            contract.event("Approval", &Args::new()),
            Err(AbiError::UnknownEntry { kind: "event", .. })
        ));
        assert!(contract.error("Oops").is_err());
    }

    #[test]
    fn test_bound_event_filter() {
        let contract = deployed();
        let from = Address::from([1u8; 20]);
        let filter = contract
            .event("Transfer", &Args::new().kwarg("from", from))
            .unwrap();
        assert_eq!(filter.topics().len(), 2);

        let mut from_word = [0u8; 32];
        from_word[12..].copy_from_slice(from.as_bytes());
        let mut value = vec![0u8; 32];
        value[31] = 5;
        let topics = vec![filter.event().topic(), H256::from(from_word), H256::ZERO];

        let entry = LogEntry::new(token_address(), topics.clone(), value.clone());
        assert!(filter.matches(&entry));
        let values = filter.decode_log_entry(&entry).unwrap();
        assert_eq!(values["from"], Some(Value::Address(from)));
        assert_eq!(values["to"], Some(Value::Address(Address::ZERO)));
        assert_eq!(values["value"], Some(Value::from(5u8)));

        let foreign = LogEntry::new(Address::ZERO, topics, value);
        assert!(!filter.matches(&foreign));
        match filter.decode_log_entry(&foreign).unwrap_err() {
            AbiError::Decode { source, .. } => {
                assert!(matches!(source, DecodeError::ForeignContract(_)))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
