//! The `exact` scheme on Solana: an SPL `TransferChecked` of exactly the price
//!
//! The client builds and partially signs the transfer; the facilitator named in
//! `extra.feePayer` co-signs as fee payer and submits it during settlement.

use super::client::{SchemeClient, SchemeRegistry};
use super::server::{ResourceServer, SchemeServer};
use crate::solana::instruction::{
    associated_token, compute_budget, token, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use crate::solana::{Keypair, Message, Pubkey, SolanaRpc, Transaction};
use crate::types::{networks, schemes, PaymentRequirements, SupportedKind};
use crate::{Result, X402Error};
use serde_json::{json, Value};
use std::sync::Arc;

/// Compute units requested for the transfer
pub const COMPUTE_UNIT_LIMIT: u32 = 20_000;
/// Priority fee in micro-lamports per compute unit
pub const COMPUTE_UNIT_PRICE: u64 = 1;

/// Pays `exact` requirements with a partially signed transfer
pub struct ExactSvmClient {
    signer: Arc<Keypair>,
    rpc: Arc<dyn SolanaRpc>,
}

impl ExactSvmClient {
    pub fn new(signer: Arc<Keypair>, rpc: Arc<dyn SolanaRpc>) -> Self {
        Self { signer, rpc }
    }

    /// Token program owning the mint and the mint's decimals
    async fn mint_details(&self, mint: &Pubkey) -> Result<(Pubkey, u8)> {
        let account = self.rpc.get_account_info(mint).await?.ok_or_else(|| {
            X402Error::invalid_payment_requirements(format!("Mint {} does not exist", mint))
        })?;

        if account.owner != TOKEN_PROGRAM_ID && account.owner != TOKEN_2022_PROGRAM_ID {
            return Err(X402Error::invalid_payment_requirements(format!(
                "Asset {} is not owned by a token program",
                mint
            )));
        }

        let decimals = account.mint_decimals().ok_or_else(|| {
            X402Error::invalid_payment_requirements(format!("Asset {} is not a mint account", mint))
        })?;

        Ok((account.owner, decimals))
    }

    /// Build the partially signed transfer transaction
    pub async fn build_transaction(&self, requirements: &PaymentRequirements) -> Result<Transaction> {
        let fee_payer: Pubkey = requirements
            .fee_payer()
            .ok_or_else(|| {
                X402Error::invalid_payment_requirements("feePayer is required in extra for SVM payments")
            })?
            .parse()?;
        let mint: Pubkey = requirements.asset.parse()?;
        let pay_to: Pubkey = requirements.pay_to.parse()?;
        let amount = requirements.amount_as_u64()?;

        let (token_program, decimals) = self.mint_details(&mint).await?;
        let authority = self.signer.pubkey();
        let source = associated_token::get_associated_token_address(&authority, &mint, &token_program)?;
        let destination =
            associated_token::get_associated_token_address(&pay_to, &mint, &token_program)?;

        let instructions = [
            compute_budget::set_compute_unit_limit(COMPUTE_UNIT_LIMIT),
            compute_budget::set_compute_unit_price(COMPUTE_UNIT_PRICE),
            token::transfer_checked(
                &token_program,
                &source,
                &mint,
                &destination,
                &authority,
                amount,
                decimals,
            ),
        ];

        let blockhash = self.rpc.get_latest_blockhash().await?;
        let message = Message::compile(&fee_payer, &instructions, blockhash)?;
        let mut transaction = Transaction::new_unsigned(message);
        transaction.partial_sign(&[self.signer.as_ref()])?;
        Ok(transaction)
    }
}

#[async_trait::async_trait]
impl SchemeClient for ExactSvmClient {
    fn scheme(&self) -> &str {
        schemes::EXACT
    }

    async fn create_payload(&self, requirements: &PaymentRequirements) -> Result<Value> {
        let transaction = self.build_transaction(requirements).await?;
        Ok(json!({ "transaction": transaction.to_base64() }))
    }
}

/// Register the exact SVM client for every Solana network
pub fn register_exact_svm(
    registry: &mut SchemeRegistry,
    signer: Arc<Keypair>,
    rpc: Arc<dyn SolanaRpc>,
) -> &mut SchemeRegistry {
    registry.register(networks::SOLANA_ANY, Arc::new(ExactSvmClient::new(signer, rpc)))
}

/// Server half: advertises the facilitator's fee payer to clients
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSvmServerScheme;

impl SchemeServer for ExactSvmServerScheme {
    fn scheme(&self) -> &str {
        schemes::EXACT
    }

    fn enhance_requirements(&self, requirements: &mut PaymentRequirements, kind: &SupportedKind) {
        let fee_payer = kind
            .extra
            .as_ref()
            .and_then(|extra| extra.get("feePayer"))
            .and_then(Value::as_str);

        match fee_payer {
            Some(fee_payer) => requirements.set_fee_payer(fee_payer),
            None => tracing::warn!(
                network = %requirements.network,
                "Facilitator did not advertise a feePayer"
            ),
        }
    }
}

/// Register the exact SVM server scheme for every Solana network
pub fn register_exact_svm_server(server: ResourceServer) -> ResourceServer {
    server.register(networks::SOLANA_ANY, Arc::new(ExactSvmServerScheme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facilitator::FacilitatorClient;
    use crate::solana::instruction::COMPUTE_BUDGET_PROGRAM_ID;
    use crate::solana::testing::{mint_account, FakeRpc, BLOCKHASH};
    use crate::solana::Signature;
    use crate::types::{assets, FacilitatorConfig, PaymentRequired, ResourceInfo};
    use base64::{engine::general_purpose, Engine as _};
    use mockito::Server;

    const PAYEE: &str = "GsbwXfJraMomNxBcjYLcG3mxkBUiyWXAB32fGbSMQRdW";
    const FEE_PAYER: &str = "2wKupLR9q6wXYppw8Gr2NvWxKBUqm4PPJKkQfoxHDBg4";

    fn requirements() -> PaymentRequirements {
        let mut req = PaymentRequirements::new(
            schemes::EXACT,
            networks::SOLANA_MAINNET,
            "4200000",
            assets::WSOL_MINT,
            PAYEE,
        );
        req.set_fee_payer(FEE_PAYER);
        req
    }

    fn client(rpc: FakeRpc) -> (Arc<Keypair>, ExactSvmClient) {
        let signer = Arc::new(Keypair::from_seed(&[9u8; 32]));
        let client = ExactSvmClient::new(signer.clone(), Arc::new(rpc));
        (signer, client)
    }

    fn wsol_mint() -> Pubkey {
        assets::WSOL_MINT.parse().unwrap()
    }

    #[tokio::test]
    async fn test_builds_transfer_paid_by_facilitator() {
        let rpc = FakeRpc::default().with_account(wsol_mint(), mint_account(TOKEN_PROGRAM_ID, 9));
        let (signer, client) = client(rpc);

        let tx = client.build_transaction(&requirements()).await.unwrap();
        let message = &tx.message;

        assert_eq!(message.fee_payer().unwrap().to_string(), FEE_PAYER);
        assert_eq!(message.recent_blockhash.to_string(), BLOCKHASH);
        assert_eq!(message.header.num_required_signatures, 2);

        // fee payer slot stays empty for the facilitator, authority slot is signed
        assert_eq!(tx.signatures[0], Signature::default());
        assert_eq!(message.account_keys[1], signer.pubkey());
        assert_ne!(tx.signatures[1], Signature::default());
        assert!(!tx.is_fully_signed());

        let programs: Vec<Pubkey> = message
            .instructions
            .iter()
            .map(|ix| message.account_keys[ix.program_id_index as usize])
            .collect();
        assert_eq!(
            programs,
            vec![COMPUTE_BUDGET_PROGRAM_ID, COMPUTE_BUDGET_PROGRAM_ID, TOKEN_PROGRAM_ID]
        );

        let transfer = &message.instructions[2];
        assert_eq!(transfer.data[0], 12);
        assert_eq!(&transfer.data[1..9], &4_200_000u64.to_le_bytes());
        assert_eq!(transfer.data[9], 9);

        let payee: Pubkey = PAYEE.parse().unwrap();
        let destination =
            associated_token::get_associated_token_address(&payee, &wsol_mint(), &TOKEN_PROGRAM_ID)
                .unwrap();
        assert_eq!(
            message.account_keys[transfer.accounts[2] as usize],
            destination
        );
    }

    #[tokio::test]
    async fn test_payload_is_base64_transaction() {
        let rpc = FakeRpc::default().with_account(wsol_mint(), mint_account(TOKEN_PROGRAM_ID, 9));
        let (_, client) = client(rpc);

        let payload = client.create_payload(&requirements()).await.unwrap();
        let encoded = payload["transaction"].as_str().unwrap();
        let bytes = general_purpose::STANDARD.decode(encoded).unwrap();
        // two signature slots, then the v0 message prefix
        assert_eq!(bytes[0], 2);
        assert_eq!(bytes[1 + 2 * 64], 0x80);
    }

    #[tokio::test]
    async fn test_missing_fee_payer_is_an_error() {
        let rpc = FakeRpc::default().with_account(wsol_mint(), mint_account(TOKEN_PROGRAM_ID, 9));
        let (_, client) = client(rpc);

        let mut req = requirements();
        req.extra = None;
        let err = client.create_payload(&req).await.unwrap_err();
        assert!(err.to_string().contains("feePayer"));
    }

    #[tokio::test]
    async fn test_rejects_asset_not_owned_by_token_program() {
        let rpc = FakeRpc::default().with_account(wsol_mint(), mint_account(Pubkey::default(), 9));
        let (_, client) = client(rpc);

        let err = client.create_payload(&requirements()).await.unwrap_err();
        assert!(matches!(err, X402Error::InvalidPaymentRequirements { .. }));
    }

    #[tokio::test]
    async fn test_registry_pays_solana_offer() {
        let rpc = FakeRpc::default().with_account(wsol_mint(), mint_account(TOKEN_PROGRAM_ID, 9));
        let signer = Arc::new(Keypair::from_seed(&[9u8; 32]));
        let mut registry = SchemeRegistry::new();
        register_exact_svm(&mut registry, signer, Arc::new(rpc));

        let required = PaymentRequired::new(
            "Payment required",
            ResourceInfo::new("http://localhost:4021/meaning-of-life", "", "application/json"),
            vec![requirements()],
        );
        let payload = registry.create_payment_payload(&required).await.unwrap();
        assert!(payload.payload["transaction"].is_string());
        assert_eq!(payload.accepted.fee_payer(), Some(FEE_PAYER));
    }

    #[tokio::test]
    async fn test_sync_copies_fee_payer() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/supported")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "kinds": [{
                        "x402Version": 2,
                        "scheme": "exact",
                        "network": networks::SOLANA_MAINNET,
                        "extra": { "feePayer": FEE_PAYER }
                    }]
                })
                .to_string(),
            )
            .create();

        let facilitator = FacilitatorClient::new(FacilitatorConfig::new(server.url())).unwrap();
        let resource_server = register_exact_svm_server(ResourceServer::new(facilitator));

        let mut req = requirements();
        req.extra = None;
        let synced = resource_server.sync_requirements(vec![req]).await;
        assert_eq!(synced[0].fee_payer(), Some(FEE_PAYER));
    }

    #[tokio::test]
    async fn test_sync_failure_keeps_requirements() {
        let mut server = Server::new_async().await;
        let _mock = server.mock("GET", "/supported").with_status(500).create();

        let facilitator = FacilitatorClient::new(FacilitatorConfig::new(server.url())).unwrap();
        let resource_server = register_exact_svm_server(ResourceServer::new(facilitator));

        let mut req = requirements();
        req.extra = None;
        let synced = resource_server.sync_requirements(vec![req.clone()]).await;
        assert_eq!(synced, vec![req]);
    }
}
