//! Instructions for the native programs used by the wrap and payment transactions

use super::pubkey::Pubkey;
use crate::Result;

/// System program, all zero bytes
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    6, 221, 246, 225, 215, 101, 161, 147, 217, 203, 225, 70, 206, 235, 121, 172, 28, 180, 133,
    237, 95, 91, 55, 145, 58, 140, 245, 133, 126, 255, 0, 169,
]);

/// `TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb`
pub const TOKEN_2022_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    6, 221, 246, 225, 238, 117, 143, 222, 24, 66, 93, 188, 228, 108, 205, 218, 182, 26, 252, 77,
    131, 185, 13, 39, 254, 189, 249, 40, 216, 161, 139, 252,
]);

/// `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    140, 151, 37, 143, 78, 36, 137, 241, 187, 61, 16, 41, 20, 142, 13, 131, 11, 90, 19, 153, 218,
    255, 16, 132, 4, 142, 123, 216, 219, 233, 248, 89,
]);

/// `ComputeBudget111111111111111111111111111111`
pub const COMPUTE_BUDGET_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    3, 6, 70, 111, 229, 33, 23, 50, 255, 236, 173, 186, 114, 195, 155, 231, 188, 140, 229, 187,
    197, 247, 18, 107, 44, 67, 155, 58, 64, 0, 0, 0,
]);

/// Wrapped SOL mint, `So11111111111111111111111111111111111111112`
pub const NATIVE_MINT: Pubkey = Pubkey::new_from_array([
    6, 155, 136, 87, 254, 171, 129, 132, 251, 104, 127, 99, 70, 24, 192, 53, 218, 196, 57, 220,
    26, 235, 59, 85, 152, 160, 240, 0, 0, 0, 0, 1,
]);

/// An account referenced by an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A single program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// System program instructions
pub mod system {
    use super::*;

    const TRANSFER: u32 = 2;

    /// Move `lamports` of native value from `from` to `to`
    pub fn transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&TRANSFER.to_le_bytes());
        data.extend_from_slice(&lamports.to_le_bytes());

        Instruction {
            program_id: SYSTEM_PROGRAM_ID,
            accounts: vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
            data,
        }
    }
}

/// SPL token program instructions
pub mod token {
    use super::*;

    const TRANSFER_CHECKED: u8 = 12;
    const SYNC_NATIVE: u8 = 17;

    /// Bring a native token account's token balance in line with its lamports
    pub fn sync_native(token_program_id: &Pubkey, account: &Pubkey) -> Instruction {
        Instruction {
            program_id: *token_program_id,
            accounts: vec![AccountMeta::new(*account, false)],
            data: vec![SYNC_NATIVE],
        }
    }

    /// Transfer `amount` base units, asserting the mint and its decimals
    pub fn transfer_checked(
        token_program_id: &Pubkey,
        source: &Pubkey,
        mint: &Pubkey,
        destination: &Pubkey,
        authority: &Pubkey,
        amount: u64,
        decimals: u8,
    ) -> Instruction {
        let mut data = Vec::with_capacity(10);
        data.push(TRANSFER_CHECKED);
        data.extend_from_slice(&amount.to_le_bytes());
        data.push(decimals);

        Instruction {
            program_id: *token_program_id,
            accounts: vec![
                AccountMeta::new(*source, false),
                AccountMeta::new_readonly(*mint, false),
                AccountMeta::new(*destination, false),
                AccountMeta::new_readonly(*authority, true),
            ],
            data,
        }
    }
}

/// Associated token account program
pub mod associated_token {
    use super::*;

    const CREATE_IDEMPOTENT: u8 = 1;

    /// Derive the holding account of `owner` for `mint`
    pub fn get_associated_token_address(
        owner: &Pubkey,
        mint: &Pubkey,
        token_program_id: &Pubkey,
    ) -> Result<Pubkey> {
        let (address, _bump) = Pubkey::find_program_address(
            &[owner.as_bytes(), token_program_id.as_bytes(), mint.as_bytes()],
            &ASSOCIATED_TOKEN_PROGRAM_ID,
        )?;
        Ok(address)
    }

    /// Create the holding account unless it already exists
    pub fn create_idempotent(
        payer: &Pubkey,
        owner: &Pubkey,
        mint: &Pubkey,
        token_program_id: &Pubkey,
    ) -> Result<Instruction> {
        let address = get_associated_token_address(owner, mint, token_program_id)?;

        Ok(Instruction {
            program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
            accounts: vec![
                AccountMeta::new(*payer, true),
                AccountMeta::new(address, false),
                AccountMeta::new_readonly(*owner, false),
                AccountMeta::new_readonly(*mint, false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                AccountMeta::new_readonly(*token_program_id, false),
            ],
            data: vec![CREATE_IDEMPOTENT],
        })
    }
}

/// Compute budget program
pub mod compute_budget {
    use super::*;

    const SET_COMPUTE_UNIT_LIMIT: u8 = 2;
    const SET_COMPUTE_UNIT_PRICE: u8 = 3;

    pub fn set_compute_unit_limit(units: u32) -> Instruction {
        let mut data = vec![SET_COMPUTE_UNIT_LIMIT];
        data.extend_from_slice(&units.to_le_bytes());
        Instruction {
            program_id: COMPUTE_BUDGET_PROGRAM_ID,
            accounts: Vec::new(),
            data,
        }
    }

    pub fn set_compute_unit_price(micro_lamports: u64) -> Instruction {
        let mut data = vec![SET_COMPUTE_UNIT_PRICE];
        data.extend_from_slice(&micro_lamports.to_le_bytes());
        Instruction {
            program_id: COMPUTE_BUDGET_PROGRAM_ID,
            accounts: Vec::new(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_ids_match_base58() {
        assert_eq!(
            TOKEN_PROGRAM_ID.to_string(),
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        );
        assert_eq!(
            TOKEN_2022_PROGRAM_ID.to_string(),
            "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb"
        );
        assert_eq!(
            ASSOCIATED_TOKEN_PROGRAM_ID.to_string(),
            "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"
        );
        assert_eq!(
            COMPUTE_BUDGET_PROGRAM_ID.to_string(),
            "ComputeBudget111111111111111111111111111111"
        );
        assert_eq!(
            NATIVE_MINT.to_string(),
            "So11111111111111111111111111111111111111112"
        );
        assert_eq!(
            SYSTEM_PROGRAM_ID.to_string(),
            "11111111111111111111111111111111"
        );
    }

    #[test]
    fn test_associated_token_address() {
        let owner: Pubkey = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".parse().unwrap();
        let ata =
            associated_token::get_associated_token_address(&owner, &NATIVE_MINT, &TOKEN_PROGRAM_ID)
                .unwrap();
        assert_eq!(ata.to_string(), "8LjUgMjzZuHj8VdyxzkmLLQVmW4C3gd56md1nLd76TNW");
    }

    #[test]
    fn test_transfer_layout() {
        let from = Pubkey::new_from_array([1u8; 32]);
        let to = Pubkey::new_from_array([2u8; 32]);
        let ix = system::transfer(&from, &to, 5_000_000);

        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(u64::from_le_bytes(ix.data[4..].try_into().unwrap()), 5_000_000);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
    }

    #[test]
    fn test_transfer_checked_layout() {
        let key = Pubkey::new_from_array([3u8; 32]);
        let ix = token::transfer_checked(&TOKEN_PROGRAM_ID, &key, &NATIVE_MINT, &key, &key, 4_200_000, 9);

        assert_eq!(ix.data.len(), 10);
        assert_eq!(ix.data[0], 12);
        assert_eq!(ix.data[9], 9);
        assert_eq!(ix.accounts.len(), 4);
        assert!(ix.accounts[3].is_signer);
    }

    #[test]
    fn test_compute_budget_layout() {
        let limit = compute_budget::set_compute_unit_limit(20_000);
        assert_eq!(limit.data, vec![2, 0x20, 0x4e, 0, 0]);

        let price = compute_budget::set_compute_unit_price(1);
        assert_eq!(price.data, vec![3, 1, 0, 0, 0, 0, 0, 0, 0]);
    }
}
