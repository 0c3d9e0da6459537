//! Contract interface descriptors and the ABI codec for the ledger's calls.
//!
//! Only the shapes the ledger contract actually uses are supported: static
//! `address` / `uint256` words, dynamic `string`s, and the `TransferStruct[]`
//! returned by `getAllTransactions()`.

use num_bigint::BigUint;
use serde::Deserialize;
use sha3::Digest;
use sha3::Keccak256;
use thiserror::Error;

use crate::address::Address;
use crate::address::ADDRESS_LEN;
use crate::transfer::RawTransfer;

const WORD: usize = 32;

pub const RECORD_TRANSFER_FN: &str = "addToBlockChain";
pub const ALL_TRANSFERS_FN: &str = "getAllTransactions";
pub const TRANSFER_COUNT_FN: &str = "getTransactionCount";

const RECORD_TRANSFER_INPUTS: &str = "(address,uint256,string,string)";
const ALL_TRANSFERS_OUTPUTS: &str = "((address,address,uint256,string,uint256,string)[])";
const TRANSFER_COUNT_OUTPUTS: &str = "(uint256)";

/// The interface descriptor bundled with the application.
pub const DEFAULT_DESCRIPTOR: &str = include_str!("../assets/Transactions.json");

#[derive(Error, Debug)]
pub enum AbiError {
    #[error("invalid contract interface descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),
    #[error("contract interface has no function `{0}`")]
    MissingFunction(String),
    #[error("function `{name}` is declared as `{found}`, expected `{expected}`")]
    SignatureMismatch {
        name: String,
        found: String,
        expected: String,
    },
    #[error("return data truncated: need {needed} bytes, have {len}")]
    Truncated { needed: usize, len: usize },
    #[error("offset or length word does not fit in memory")]
    BadOffset,
    #[error("value exceeds 256 bits")]
    Overflow,
    #[error("string is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Deserialize, Debug, Clone)]
struct AbiParam {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    components: Vec<AbiParam>,
}

impl AbiParam {
    /// Canonical type as used in signatures: tuples are spelled out.
    fn canonical_type(&self) -> String {
        match self.kind.strip_prefix("tuple") {
            Some(array_suffix) => format!("{}{}", canonical_list(&self.components), array_suffix),
            None => self.kind.clone(),
        }
    }
}

fn canonical_list(params: &[AbiParam]) -> String {
    let types: Vec<String> = params.iter().map(AbiParam::canonical_type).collect();
    format!("({})", types.join(","))
}

#[derive(Deserialize, Debug)]
struct AbiEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
}

/// Accepts a bare ABI array or a build artifact with an `abi` field.
#[derive(Deserialize)]
#[serde(untagged)]
enum Descriptor {
    Bare(Vec<AbiEntry>),
    Artifact { abi: Vec<AbiEntry> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiFunction {
    pub name: String,
    inputs: String,
    outputs: String,
}

impl AbiFunction {
    /// e.g. `addToBlockChain(address,uint256,string,string)`
    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.inputs)
    }

    pub fn selector(&self) -> [u8; 4] {
        selector(&self.signature())
    }
}

/// The functions declared by a contract interface descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInterface {
    functions: Vec<AbiFunction>,
}

impl ContractInterface {
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let entries = match serde_json::from_str::<Descriptor>(json)? {
            Descriptor::Bare(entries) => entries,
            Descriptor::Artifact { abi } => abi,
        };

        let functions = entries
            .into_iter()
            .filter(|e| e.kind == "function")
            .filter_map(|e| {
                let name = e.name?;
                Some(AbiFunction {
                    name,
                    inputs: canonical_list(&e.inputs),
                    outputs: canonical_list(&e.outputs),
                })
            })
            .collect();

        Ok(Self { functions })
    }

    pub fn function(&self, name: &str) -> Result<&AbiFunction, AbiError> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| AbiError::MissingFunction(name.to_string()))
    }
}

impl Default for ContractInterface {
    fn default() -> Self {
        // the bundled descriptor is covered by tests
        Self::from_json(DEFAULT_DESCRIPTOR).unwrap_or(Self { functions: vec![] })
    }
}

/// First four bytes of the Keccak-256 hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Selectors for the three ledger calls, checked against the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerAbi {
    record_transfer: [u8; 4],
    all_transfers: [u8; 4],
    transfer_count: [u8; 4],
}

impl LedgerAbi {
    pub fn from_interface(interface: &ContractInterface) -> Result<Self, AbiError> {
        let check = |name: &str, inputs: &str, outputs: Option<&str>| {
            let function = interface.function(name)?;
            let found = match outputs {
                Some(_) => format!("{} returns {}", function.signature(), function.outputs),
                None => function.signature(),
            };
            let expected = match outputs {
                Some(out) => format!("{}{} returns {}", name, inputs, out),
                None => format!("{}{}", name, inputs),
            };
            if found != expected {
                return Err(AbiError::SignatureMismatch {
                    name: name.to_string(),
                    found,
                    expected,
                });
            }
            Ok(function.selector())
        };

        Ok(Self {
            record_transfer: check(RECORD_TRANSFER_FN, RECORD_TRANSFER_INPUTS, None)?,
            all_transfers: check(ALL_TRANSFERS_FN, "()", Some(ALL_TRANSFERS_OUTPUTS))?,
            transfer_count: check(TRANSFER_COUNT_FN, "()", Some(TRANSFER_COUNT_OUTPUTS))?,
        })
    }

    /// Calldata for `addToBlockChain(receiver, amount, message, keyword)`.
    pub fn encode_record_transfer(
        &self,
        receiver: &Address,
        amount: &BigUint,
        message: &str,
        keyword: &str,
    ) -> Result<Vec<u8>, AbiError> {
        let message_tail = encode_string(message);
        let keyword_tail = encode_string(keyword);
        let head_len = 4 * WORD;

        let mut data = Vec::with_capacity(4 + head_len + message_tail.len() + keyword_tail.len());
        data.extend_from_slice(&self.record_transfer);
        data.extend_from_slice(&encode_address(receiver));
        data.extend_from_slice(&encode_uint(amount)?);
        data.extend_from_slice(&encode_usize(head_len));
        data.extend_from_slice(&encode_usize(head_len + message_tail.len()));
        data.extend_from_slice(&message_tail);
        data.extend_from_slice(&keyword_tail);
        Ok(data)
    }

    pub fn encode_all_transfers(&self) -> Vec<u8> {
        self.all_transfers.to_vec()
    }

    pub fn encode_transfer_count(&self) -> Vec<u8> {
        self.transfer_count.to_vec()
    }

    /// Decodes the `TransferStruct[]` returned by `getAllTransactions()`.
    pub fn decode_all_transfers(&self, data: &[u8]) -> Result<Vec<RawTransfer>, AbiError> {
        let reader = Reader { data };
        let array_start = reader.usize_at(0)?;
        let len = reader.usize_at(array_start)?;
        let elements_start = add(array_start, WORD)?;

        // every element needs at least its offset word
        if len > data.len() / WORD {
            return Err(AbiError::Truncated {
                needed: len.saturating_mul(WORD),
                len: data.len(),
            });
        }

        (0..len)
            .map(|i| {
                let offset = reader.usize_at(add(elements_start, i * WORD)?)?;
                let tuple = add(elements_start, offset)?;
                let message_offset = reader.usize_at(add(tuple, 3 * WORD)?)?;
                let keyword_offset = reader.usize_at(add(tuple, 5 * WORD)?)?;
                Ok(RawTransfer {
                    sender: reader.address_at(tuple)?,
                    receiver: reader.address_at(add(tuple, WORD)?)?,
                    amount: reader.uint_at(add(tuple, 2 * WORD)?)?,
                    message: reader.string_at(add(tuple, message_offset)?)?,
                    timestamp: reader.uint_at(add(tuple, 4 * WORD)?)?,
                    keyword: reader.string_at(add(tuple, keyword_offset)?)?,
                })
            })
            .collect()
    }

    pub fn decode_transfer_count(&self, data: &[u8]) -> Result<BigUint, AbiError> {
        Reader { data }.uint_at(0)
    }
}

fn add(a: usize, b: usize) -> Result<usize, AbiError> {
    a.checked_add(b).ok_or(AbiError::BadOffset)
}

fn encode_address(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - ADDRESS_LEN..].copy_from_slice(address.as_bytes());
    word
}

fn encode_uint(value: &BigUint) -> Result<[u8; WORD], AbiError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > WORD {
        return Err(AbiError::Overflow);
    }
    let mut word = [0u8; WORD];
    word[WORD - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

fn encode_usize(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

/// Length word followed by the bytes, right-padded to a whole word.
fn encode_string(value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded_len);
    out.extend_from_slice(&encode_usize(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(WORD + padded_len, 0);
    out
}

struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn slice(&self, at: usize, len: usize) -> Result<&'a [u8], AbiError> {
        let end = add(at, len)?;
        self.data.get(at..end).ok_or(AbiError::Truncated {
            needed: end,
            len: self.data.len(),
        })
    }

    fn word(&self, at: usize) -> Result<&'a [u8], AbiError> {
        self.slice(at, WORD)
    }

    fn uint_at(&self, at: usize) -> Result<BigUint, AbiError> {
        Ok(BigUint::from_bytes_be(self.word(at)?))
    }

    fn usize_at(&self, at: usize) -> Result<usize, AbiError> {
        let word = self.word(at)?;
        if word[..WORD - 8].iter().any(|b| *b != 0) {
            return Err(AbiError::BadOffset);
        }
        let mut be = [0u8; 8];
        be.copy_from_slice(&word[WORD - 8..]);
        usize::try_from(u64::from_be_bytes(be)).map_err(|_| AbiError::BadOffset)
    }

    fn address_at(&self, at: usize) -> Result<Address, AbiError> {
        let word = self.word(at)?;
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&word[WORD - ADDRESS_LEN..]);
        Ok(Address::from_bytes(bytes))
    }

    fn string_at(&self, at: usize) -> Result<String, AbiError> {
        let len = self.usize_at(at)?;
        let bytes = self.slice(add(at, WORD)?, len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_abi() -> LedgerAbi {
        LedgerAbi::from_interface(&ContractInterface::from_json(DEFAULT_DESCRIPTOR).unwrap())
            .unwrap()
    }

    fn addr(last: u8) -> Address {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 1] = last;
        Address::from_bytes(bytes)
    }

    fn word_usize(v: usize) -> Vec<u8> {
        encode_usize(v).to_vec()
    }

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
    }

    #[test]
    fn test_bundled_descriptor_matches_codec() {
        let interface = ContractInterface::from_json(DEFAULT_DESCRIPTOR).unwrap();
        let record = interface.function(RECORD_TRANSFER_FN).unwrap();
        assert_eq!(
            record.signature(),
            "addToBlockChain(address,uint256,string,string)"
        );
        assert!(LedgerAbi::from_interface(&interface).is_ok());
    }

    #[test]
    fn test_artifact_and_bare_descriptors() {
        let bare = r#"[{"type":"function","name":"getTransactionCount","inputs":[],"outputs":[{"type":"uint256"}]}]"#;
        let artifact = format!(r#"{{"contractName":"Transactions","abi":{bare}}}"#);
        let a = ContractInterface::from_json(bare).unwrap();
        let b = ContractInterface::from_json(&artifact).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.function(TRANSFER_COUNT_FN).unwrap().signature(),
            "getTransactionCount()"
        );
    }

    #[test]
    fn test_missing_function_is_rejected() {
        let json = r#"[{"type":"function","name":"getTransactionCount","inputs":[],"outputs":[{"type":"uint256"}]}]"#;
        let interface = ContractInterface::from_json(json).unwrap();
        assert!(matches!(
            LedgerAbi::from_interface(&interface),
            Err(AbiError::MissingFunction(name)) if name == RECORD_TRANSFER_FN
        ));
    }

    #[test]
    fn test_signature_mismatch_is_rejected() {
        let json = r#"[
            {"type":"function","name":"addToBlockChain","inputs":[{"type":"address"},{"type":"uint256"},{"type":"string"}],"outputs":[]},
            {"type":"function","name":"getAllTransactions","inputs":[],"outputs":[{"type":"tuple[]","components":[{"type":"address"},{"type":"address"},{"type":"uint256"},{"type":"string"},{"type":"uint256"},{"type":"string"}]}]},
            {"type":"function","name":"getTransactionCount","inputs":[],"outputs":[{"type":"uint256"}]}
        ]"#;
        let interface = ContractInterface::from_json(json).unwrap();
        assert!(matches!(
            LedgerAbi::from_interface(&interface),
            Err(AbiError::SignatureMismatch { .. })
        ));
    }

    #[test]
    fn test_encode_record_transfer_layout() {
        let abi = ledger_abi();
        let data = abi
            .encode_record_transfer(&addr(0xde), &BigUint::from(5u32), "hi", "wave")
            .unwrap();

        assert_eq!(data[..4], selector("addToBlockChain(address,uint256,string,string)"));
        let body = &data[4..];
        assert_eq!(body.len(), 4 * WORD + 2 * (2 * WORD));
        assert_eq!(body[WORD - 1], 0xde);
        assert_eq!(body[2 * WORD - 1], 5);
        assert_eq!(body[2 * WORD..3 * WORD], word_usize(4 * WORD)[..]);
        assert_eq!(body[3 * WORD..4 * WORD], word_usize(6 * WORD)[..]);
        assert_eq!(body[4 * WORD..5 * WORD], word_usize(2)[..]);
        assert_eq!(&body[5 * WORD..5 * WORD + 2], b"hi");
        assert_eq!(body[6 * WORD..7 * WORD], word_usize(4)[..]);
        assert_eq!(&body[7 * WORD..7 * WORD + 4], b"wave");
    }

    #[test]
    fn test_encode_rejects_oversized_amount() {
        let abi = ledger_abi();
        let too_big = BigUint::from(1u8) << 256;
        assert!(matches!(
            abi.encode_record_transfer(&addr(1), &too_big, "", ""),
            Err(AbiError::Overflow)
        ));
    }

    /// Builds `getAllTransactions()` return data the way the contract does.
    fn encode_transfers(records: &[RawTransfer]) -> Vec<u8> {
        let tuples: Vec<Vec<u8>> = records
            .iter()
            .map(|r| {
                let message = encode_string(&r.message);
                let mut t = Vec::new();
                t.extend_from_slice(&encode_address(&r.sender));
                t.extend_from_slice(&encode_address(&r.receiver));
                t.extend_from_slice(&encode_uint(&r.amount).unwrap());
                t.extend_from_slice(&encode_usize(6 * WORD));
                t.extend_from_slice(&encode_uint(&r.timestamp).unwrap());
                t.extend_from_slice(&encode_usize(6 * WORD + message.len()));
                t.extend_from_slice(&message);
                t.extend_from_slice(&encode_string(&r.keyword));
                t
            })
            .collect();

        let mut out = word_usize(WORD);
        out.extend(word_usize(records.len()));
        let mut offset = records.len() * WORD;
        for t in &tuples {
            out.extend(word_usize(offset));
            offset += t.len();
        }
        for t in tuples {
            out.extend(t);
        }
        out
    }

    #[test]
    fn test_decode_all_transfers() {
        let records = vec![
            RawTransfer {
                sender: addr(0xab),
                receiver: addr(0xde),
                amount: BigUint::from(1_000_000_000_000_000_000u64),
                message: "hi".to_string(),
                timestamp: BigUint::from(1_700_000_000u64),
                keyword: "wave".to_string(),
            },
            RawTransfer {
                sender: addr(0xab),
                receiver: addr(0xef),
                amount: BigUint::from(42u32),
                message: "a message longer than one thirty-two byte word".to_string(),
                timestamp: BigUint::from(1_700_000_100u64),
                keyword: "".to_string(),
            },
        ];

        let decoded = ledger_abi()
            .decode_all_transfers(&encode_transfers(&records))
            .unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_decode_empty_list() {
        let decoded = ledger_abi().decode_all_transfers(&encode_transfers(&[])).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_truncated_data() {
        let mut data = encode_transfers(&[RawTransfer {
            sender: addr(1),
            receiver: addr(2),
            amount: BigUint::from(3u32),
            message: "m".to_string(),
            timestamp: BigUint::from(4u32),
            keyword: "k".to_string(),
        }]);
        data.truncate(data.len() - WORD);
        assert!(matches!(
            ledger_abi().decode_all_transfers(&data),
            Err(AbiError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_absurd_length_is_rejected() {
        let mut data = word_usize(WORD);
        data.extend(word_usize(usize::MAX >> 8));
        assert!(ledger_abi().decode_all_transfers(&data).is_err());
    }

    #[test]
    fn test_decode_transfer_count() {
        let data = word_usize(7);
        assert_eq!(
            ledger_abi().decode_transfer_count(&data).unwrap(),
            BigUint::from(7u32)
        );
    }
}
