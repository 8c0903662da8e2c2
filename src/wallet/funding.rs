//! Wrapping native SOL into the WSOL holding account

use super::poll::{wait_for_confirmation, PollPolicy, Sleeper};
use crate::solana::instruction::{associated_token, system, token, NATIVE_MINT, TOKEN_PROGRAM_ID};
use crate::solana::{Instruction, Keypair, Message, Pubkey, Signature, SolanaRpc, Transaction};
use crate::Result;
use tracing::info;

/// The three wrap instructions, always in this order:
/// create the holding account if absent, move lamports into it, sync its token balance.
pub fn wrap_instructions(owner: &Pubkey, lamports: u64) -> Result<Vec<Instruction>> {
    let ata = associated_token::get_associated_token_address(owner, &NATIVE_MINT, &TOKEN_PROGRAM_ID)?;

    Ok(vec![
        associated_token::create_idempotent(owner, owner, &NATIVE_MINT, &TOKEN_PROGRAM_ID)?,
        system::transfer(owner, &ata, lamports),
        token::sync_native(&TOKEN_PROGRAM_ID, &ata),
    ])
}

/// Submit a wrap of `lamports` and wait until it is confirmed.
///
/// The transaction is sent once and never re-signed or resubmitted; running out of
/// poll attempts yields [`crate::X402Error::ConfirmationTimeout`].
pub async fn wrap_sol(
    rpc: &dyn SolanaRpc,
    owner: &Keypair,
    lamports: u64,
    policy: &PollPolicy,
    sleeper: &dyn Sleeper,
) -> Result<Signature> {
    let payer = owner.pubkey();
    let instructions = wrap_instructions(&payer, lamports)?;
    let blockhash = rpc.get_latest_blockhash().await?;

    let message = Message::compile(&payer, &instructions, blockhash)?;
    let mut transaction = Transaction::new_unsigned(message);
    transaction.sign(&[owner])?;

    let signature = rpc.send_transaction(&transaction).await?;
    info!(%signature, lamports, "Wrap transaction submitted");

    wait_for_confirmation(rpc, &signature, policy, sleeper).await?;
    info!(%signature, "Wrap transaction confirmed");
    Ok(signature)
}
