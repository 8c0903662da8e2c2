//! Version 0 transaction messages, signing and wire encoding

use super::instruction::Instruction;
use super::keypair::Keypair;
use super::pubkey::{Hash, Pubkey, Signature};
use crate::{Result, X402Error};
use base64::{engine::general_purpose, Engine as _};

const MESSAGE_VERSION_PREFIX: u8 = 0x80;
const MAX_ACCOUNT_KEYS: usize = 256;

/// Counts describing how the leading account keys are used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction whose program and accounts refer to positions in the key list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// A v0 message without address lookup tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

struct KeyEntry {
    pubkey: Pubkey,
    is_signer: bool,
    is_writable: bool,
}

impl KeyEntry {
    fn group(&self) -> u8 {
        match (self.is_signer, self.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        }
    }
}

fn upsert_key(keys: &mut Vec<KeyEntry>, pubkey: Pubkey, is_signer: bool, is_writable: bool) {
    match keys.iter_mut().find(|entry| entry.pubkey == pubkey) {
        Some(entry) => {
            entry.is_signer |= is_signer;
            entry.is_writable |= is_writable;
        }
        None => keys.push(KeyEntry {
            pubkey,
            is_signer,
            is_writable,
        }),
    }
}

impl Message {
    /// Compile instructions into a message paid for by `payer`
    ///
    /// Instruction order is preserved. Keys are grouped as writable signers,
    /// readonly signers, writable non-signers and readonly non-signers, with the
    /// payer always first.
    pub fn compile(payer: &Pubkey, instructions: &[Instruction], recent_blockhash: Hash) -> Result<Self> {
        let mut keys = vec![KeyEntry {
            pubkey: *payer,
            is_signer: true,
            is_writable: true,
        }];

        for instruction in instructions {
            for meta in &instruction.accounts {
                upsert_key(&mut keys, meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert_key(&mut keys, instruction.program_id, false, false);
        }

        if keys.len() > MAX_ACCOUNT_KEYS {
            return Err(X402Error::invalid_payment_payload(format!(
                "transaction references {} accounts, limit is {}",
                keys.len(),
                MAX_ACCOUNT_KEYS
            )));
        }

        // Stable sort keeps the payer ahead of the other writable signers
        keys.sort_by_key(KeyEntry::group);

        let header = MessageHeader {
            num_required_signatures: keys.iter().filter(|k| k.is_signer).count() as u8,
            num_readonly_signed_accounts: keys.iter().filter(|k| k.group() == 1).count() as u8,
            num_readonly_unsigned_accounts: keys.iter().filter(|k| k.group() == 3).count() as u8,
        };
        let account_keys: Vec<Pubkey> = keys.iter().map(|k| k.pubkey).collect();

        let index_of = |pubkey: &Pubkey| -> u8 {
            // Every key was inserted above and the list holds at most 256 entries
            account_keys.iter().position(|k| k == pubkey).unwrap_or_default() as u8
        };

        let instructions = instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&ix.program_id),
                accounts: ix.accounts.iter().map(|meta| index_of(&meta.pubkey)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }

    /// Keys whose signatures the transaction must carry, in signature order
    pub fn signer_keys(&self) -> &[Pubkey] {
        let count = usize::from(self.header.num_required_signatures).min(self.account_keys.len());
        &self.account_keys[..count]
    }

    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }

    /// Program invoked by each instruction, in execution order
    pub fn program_ids(&self) -> Vec<Pubkey> {
        self.instructions
            .iter()
            .filter_map(|ix| self.account_keys.get(usize::from(ix.program_id_index)).copied())
            .collect()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256);
        out.push(MESSAGE_VERSION_PREFIX);
        out.push(self.header.num_required_signatures);
        out.push(self.header.num_readonly_signed_accounts);
        out.push(self.header.num_readonly_unsigned_accounts);

        encode_length(&mut out, self.account_keys.len());
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }

        out.extend_from_slice(self.recent_blockhash.as_bytes());

        encode_length(&mut out, self.instructions.len());
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            encode_length(&mut out, ix.accounts.len());
            out.extend_from_slice(&ix.accounts);
            encode_length(&mut out, ix.data.len());
            out.extend_from_slice(&ix.data);
        }

        // No address table lookups
        encode_length(&mut out, 0);
        out
    }
}

/// A message plus one signature slot per required signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    /// Every signature slot starts zeroed
    pub fn new_unsigned(message: Message) -> Self {
        let slots = message.signer_keys().len();
        Self {
            signatures: vec![Signature::default(); slots],
            message,
        }
    }

    /// Fill in the slots belonging to `signers`, leaving the others untouched
    pub fn partial_sign(&mut self, signers: &[&Keypair]) -> Result<()> {
        let message_bytes = self.message.serialize();

        for signer in signers {
            let pubkey = signer.pubkey();
            let slot = self
                .message
                .signer_keys()
                .iter()
                .position(|key| *key == pubkey)
                .ok_or_else(|| {
                    X402Error::invalid_signature(format!("{} is not a required signer", pubkey))
                })?;
            self.signatures[slot] = signer.sign_message(&message_bytes);
        }

        Ok(())
    }

    /// Sign and require that no slot is left empty
    pub fn sign(&mut self, signers: &[&Keypair]) -> Result<()> {
        self.partial_sign(signers)?;
        if !self.is_fully_signed() {
            return Err(X402Error::invalid_signature(
                "transaction is missing required signatures",
            ));
        }
        Ok(())
    }

    pub fn is_fully_signed(&self) -> bool {
        self.signatures.iter().all(|s| *s != Signature::default())
    }

    /// The fee payer's signature, which identifies the transaction on chain
    pub fn signature(&self) -> Signature {
        self.signatures.first().copied().unwrap_or_default()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let message = self.message.serialize();
        let mut out = Vec::with_capacity(1 + self.signatures.len() * Signature::LEN + message.len());
        encode_length(&mut out, self.signatures.len());
        for signature in &self.signatures {
            out.extend_from_slice(signature.as_bytes());
        }
        out.extend_from_slice(&message);
        out
    }

    /// Base64 wire form accepted by `sendTransaction` and the exact scheme payload
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.serialize())
    }
}

/// Compact-u16 length prefix: seven bits per byte, high bit marks continuation
fn encode_length(out: &mut Vec<u8>, len: usize) {
    let mut remaining = len;
    loop {
        let mut byte = (remaining & 0x7f) as u8;
        remaining >>= 7;
        if remaining == 0 {
            out.push(byte);
            break;
        }
        byte |= 0x80;
        out.push(byte);
    }
}
