//! Local secp256k1 signer and EIP-1559 transaction envelope.

use std::fmt;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{Encodable, Header};
use k256::ecdsa::SigningKey;

use crate::error::{OracleError, Result};

const EIP1559_TX_TYPE: u8 = 0x02;

pub struct LocalSigner {
    key: SigningKey,
    address: Address,
}

impl LocalSigner {
    /// Loads a raw 32-byte key given as 64 hex chars, with or without `0x`.
    pub fn from_hex(secret: &str) -> Result<Self> {
        let secret = secret.trim();
        let secret = secret.strip_prefix("0x").unwrap_or(secret);
        if secret.len() != 64 {
            return Err(OracleError::config(
                "PRIVATE_KEY must be a 64-char hex string",
            ));
        }
        let bytes = hex::decode(secret)
            .map_err(|e| OracleError::config(format!("invalid PRIVATE_KEY hex: {e}")))?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| OracleError::config(format!("invalid secp256k1 key: {e}")))?;
        let address = address_of(&key);
        Ok(Self { key, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Signs the transaction and returns the raw envelope with its hash.
    pub fn sign(&self, tx: &Eip1559Transaction) -> Result<(Bytes, B256)> {
        let digest = tx.signing_hash();
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest.as_slice())
            .map_err(|e| OracleError::config(format!("signing failed: {e}")))?;
        let rs = signature.to_bytes();
        let raw = tx.encode_signed(
            recovery_id.is_y_odd(),
            U256::from_be_slice(&rs[..32]),
            U256::from_be_slice(&rs[32..]),
        );
        let hash = keccak256(&raw);
        Ok((raw, hash))
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

fn address_of(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&digest[12..])
}

/// Type-2 transaction with an empty access list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip1559Transaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
}

impl Eip1559Transaction {
    fn fields_length(&self) -> usize {
        self.chain_id.length()
            + self.nonce.length()
            + self.max_priority_fee_per_gas.length()
            + self.max_fee_per_gas.length()
            + self.gas_limit.length()
            + self.to.length()
            + self.value.length()
            + self.input.length()
            + empty_list_header().length()
    }

    fn encode_fields(&self, out: &mut Vec<u8>) {
        self.chain_id.encode(out);
        self.nonce.encode(out);
        self.max_priority_fee_per_gas.encode(out);
        self.max_fee_per_gas.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
        empty_list_header().encode(out);
    }

    pub fn signing_hash(&self) -> B256 {
        let mut out = vec![EIP1559_TX_TYPE];
        Header {
            list: true,
            payload_length: self.fields_length(),
        }
        .encode(&mut out);
        self.encode_fields(&mut out);
        keccak256(&out)
    }

    fn encode_signed(&self, y_parity: bool, r: U256, s: U256) -> Bytes {
        let payload_length =
            self.fields_length() + y_parity.length() + r.length() + s.length();
        let mut out = vec![EIP1559_TX_TYPE];
        Header {
            list: true,
            payload_length,
        }
        .encode(&mut out);
        self.encode_fields(&mut out);
        y_parity.encode(&mut out);
        r.encode(&mut out);
        s.encode(&mut out);
        out.into()
    }
}

fn empty_list_header() -> Header {
    Header {
        list: true,
        payload_length: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

    // Well-known development key (first account of the default test mnemonic).
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn sample_tx() -> Eip1559Transaction {
        Eip1559Transaction {
            chain_id: 80002,
            nonce: 7,
            max_priority_fee_per_gas: U256::from(1_000_000_000u64),
            max_fee_per_gas: U256::from(1_000_000_000u64),
            gas_limit: 120_000,
            to: Address::repeat_byte(0x56),
            value: U256::from(1_250u64),
            input: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        }
    }

    #[test]
    fn derives_address_from_key() {
        let signer = LocalSigner::from_hex(DEV_KEY).unwrap();
        assert_eq!(
            signer.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse::<Address>().unwrap()
        );
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(LocalSigner::from_hex("0x1234").is_err());
        assert!(LocalSigner::from_hex(&"zz".repeat(32)).is_err());
        assert!(LocalSigner::from_hex(&"00".repeat(32)).is_err());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let signer = LocalSigner::from_hex(DEV_KEY).unwrap();
        let debug = format!("{signer:?}");
        assert!(!debug.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"));
    }

    #[test]
    fn signed_envelope_recovers_to_sender() {
        let signer = LocalSigner::from_hex(DEV_KEY).unwrap();
        let tx = sample_tx();
        let (raw, hash) = signer.sign(&tx).unwrap();

        assert_eq!(raw[0], EIP1559_TX_TYPE);
        assert_eq!(hash, keccak256(&raw));

        // RFC 6979 nonces make signing deterministic.
        let (again, _) = signer.sign(&tx).unwrap();
        assert_eq!(raw, again);

        let mut payload = &raw[1..];
        let header = Header::decode(&mut payload).unwrap();
        assert!(header.list);
        assert_eq!(header.payload_length, payload.len());

        // skip the nine unsigned fields
        let mut fields = payload;
        for _ in 0..9 {
            let item = Header::decode(&mut fields).unwrap();
            fields = &fields[item.payload_length..];
        }
        let y_parity = <bool as alloy_rlp::Decodable>::decode(&mut fields).unwrap();
        let r = <U256 as alloy_rlp::Decodable>::decode(&mut fields).unwrap();
        let s = <U256 as alloy_rlp::Decodable>::decode(&mut fields).unwrap();
        assert!(fields.is_empty());

        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(&r.to_be_bytes::<32>());
        rs[32..].copy_from_slice(&s.to_be_bytes::<32>());
        let signature = Signature::from_slice(&rs).unwrap();
        let recovery_id = RecoveryId::new(y_parity, false);
        let recovered = VerifyingKey::recover_from_prehash(
            tx.signing_hash().as_slice(),
            &signature,
            recovery_id,
        )
        .unwrap();
        assert_eq!(address_of_verifying(&recovered), signer.address());
    }

    fn address_of_verifying(key: &VerifyingKey) -> Address {
        let point = key.to_encoded_point(false);
        let digest = keccak256(&point.as_bytes()[1..]);
        Address::from_slice(&digest[12..])
    }
}
