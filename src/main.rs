mod config;
mod error;
mod ledger;
mod nlu;
mod routes;
mod schema;
mod services;
mod state;
mod survey;
mod tokens;
mod wallet;

use std::sync::Arc;

use crate::config::{AppConfig, PROGRAM_ID};
use crate::ledger::{LedgerRpc, SolanaRpcClient};
use crate::nlu::{IntentParser, WitClient};
use crate::schema::AnchorCoder;
use crate::services::assistant::Assistant;
use crate::services::banks::{BANK_SCHEMA, BankReader};
use crate::survey::RelevanceClient;
use crate::wallet::{ConfiguredWallet, Wallet};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let http = config::http_client(config.request_timeout).expect("http client init failed");

    let rpc = SolanaRpcClient::new(http.clone(), config.rpc_url.clone());
    tracing::info!(endpoint = rpc.endpoint(), "ledger client initialized");
    let ledger: Arc<dyn LedgerRpc> = Arc::new(rpc);

    let decoder = match &config.idl_path {
        Some(path) => AnchorCoder::from_idl_file(PROGRAM_ID, path).expect("IDL load failed"),
        None => AnchorCoder::builtin(PROGRAM_ID),
    };
    tracing::info!(
        program = decoder.program_id(),
        bank_fields = decoder.layout(BANK_SCHEMA).map_or(0, |layout| layout.fields.len()),
        "account decoder ready"
    );

    let wallet: Option<Arc<dyn Wallet>> = match config.wallet_pubkey.clone() {
        Some(key) => Some(Arc::new(ConfiguredWallet::new(key))),
        None => {
            tracing::warn!("WALLET_PUBKEY not set; bank reads will fail until a wallet is configured");
            None
        }
    };

    // NLU is non-fatal: without a token every non-shortcut message gets the apology.
    let nlu: Option<Arc<dyn IntentParser>> = match config.nlu.clone() {
        Some(nlu_config) => {
            tracing::info!(version = %nlu_config.version, "NLU client initialized");
            Some(Arc::new(WitClient::new(http.clone(), nlu_config)))
        }
        None => {
            tracing::warn!("WIT_AI_TOKEN not set; NLU features disabled");
            None
        }
    };

    let reader = BankReader::new(ledger.clone(), Arc::new(decoder), wallet);
    let assistant = Assistant::new(ledger, nlu, config.token_accounts.clone());
    let survey = Arc::new(RelevanceClient::new(http, config.survey.clone()));
    let state = state::AppState::new(reader, assistant, survey);

    // Initial bank read, once per process start.
    let _initial_read = {
        let state = state.clone();
        tokio::spawn(async move {
            state.reader.refresh(&state.banks).await;
        })
    };

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "orbitlen listening");
    axum::serve(listener, app).await.expect("server failed");
}
