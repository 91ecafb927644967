//! Session state machine transitions against a scripted extension.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use common::{FakeExtension, FAKE_ADDRESS, TEST_PASSPHRASE};
use nft_lottery_client::config::NetworkConfig;
use nft_lottery_client::envelope::ScArg;
use nft_lottery_client::session::{SessionManager, SessionState};
use nft_lottery_client::types::SubmissionStatus;
use nft_lottery_client::{ChainClient, LotteryContract, PipelineError};

fn chain_for(server: &mockito::ServerGuard) -> Arc<ChainClient> {
    Arc::new(
        ChainClient::new(&NetworkConfig {
            rpc_url: server.url(),
            horizon_url: server.url(),
            network_passphrase: TEST_PASSPHRASE.to_string(),
            contract_id: "CCONTRACT".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap(),
    )
}

async fn offline_chain() -> Arc<ChainClient> {
    // Endpoints that are never contacted in these tests.
    Arc::new(
        ChainClient::new(&NetworkConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            horizon_url: "http://127.0.0.1:1".to_string(),
            network_passphrase: TEST_PASSPHRASE.to_string(),
            contract_id: "CCONTRACT".to_string(),
            request_timeout_secs: 1,
        })
        .unwrap(),
    )
}

#[tokio::test]
async fn refresh_derives_each_partial_state_in_order() {
    let extension = Arc::new(FakeExtension::unauthorized());
    let manager = SessionManager::new(extension.clone(), offline_chain().await);

    assert_eq!(manager.snapshot().await.state, SessionState::Unknown);

    // Reachable, unlocked, unauthorized.
    let session = manager.refresh().await;
    assert_eq!(session.state, SessionState::ConnectedUnauthorized);
    assert_eq!(session.network.as_deref(), Some("TESTNET"));
    assert!(session.address.is_none());
    assert!(session.last_error.is_some());

    // Locked: network details unavailable.
    extension.unlocked.store(false, Ordering::SeqCst);
    let session = manager.refresh().await;
    assert_eq!(session.state, SessionState::Disconnected);

    // Gone entirely.
    extension.uninstall();
    let session = manager.refresh().await;
    assert_eq!(session.state, SessionState::Unavailable);
    assert!(session.address.is_none());
}

#[tokio::test(start_paused = true)]
async fn uninstall_mid_poll_transitions_to_unavailable_and_clears_address() {
    let extension = Arc::new(FakeExtension::authorized());
    let manager = Arc::new(SessionManager::new(
        extension.clone(),
        offline_chain().await,
    ));

    let poller = manager.spawn_polling(Duration::from_secs(3));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(manager.snapshot().await.state, SessionState::ConnectedAuthorized);
    assert_eq!(manager.snapshot().await.address.as_deref(), Some(FAKE_ADDRESS));

    extension.uninstall();
    tokio::time::sleep(Duration::from_secs(4)).await;

    let session = manager.snapshot().await;
    assert_eq!(session.state, SessionState::Unavailable);
    assert!(session.address.is_none());
    poller.abort();
}

#[tokio::test]
async fn connect_refusal_records_reason_and_stays_unauthorized() {
    let extension = Arc::new(FakeExtension::unauthorized());
    extension.grant_access.store(false, Ordering::SeqCst);
    let manager = SessionManager::new(extension.clone(), offline_chain().await);

    let session = manager.connect().await;
    assert_eq!(session.state, SessionState::ConnectedUnauthorized);
    assert!(session
        .last_error
        .as_deref()
        .unwrap()
        .contains("user rejected connection"));
}

#[tokio::test]
async fn connect_approval_authorizes_with_address_and_network() {
    let extension = Arc::new(FakeExtension::unauthorized());
    let manager = SessionManager::new(extension.clone(), offline_chain().await);

    let session = manager.connect().await;
    assert_eq!(session.state, SessionState::ConnectedAuthorized);
    assert_eq!(session.address.as_deref(), Some(FAKE_ADDRESS));
    assert_eq!(session.network_passphrase.as_deref(), Some(TEST_PASSPHRASE));
    assert!(session.last_error.is_none());
}

#[tokio::test]
async fn sign_and_submit_requires_authorization() {
    let mut server = mockito::Server::new_async().await;
    let chain = chain_for(&server);
    account_and_sim_mocks(&mut server).await;

    let manager = SessionManager::new(Arc::new(FakeExtension::unauthorized()), Arc::clone(&chain));
    manager.refresh().await;

    let prepared = prepare_buy(&chain).await;
    let err = manager.sign_and_submit(prepared).await.unwrap_err();
    assert!(matches!(err, PipelineError::NotConnected));
}

#[tokio::test]
async fn write_from_unauthorized_session_is_not_connected_and_frees_the_gate() {
    let chain = offline_chain().await;
    let extension = Arc::new(FakeExtension::unauthorized());
    let manager = SessionManager::new(extension.clone(), Arc::clone(&chain));
    manager.refresh().await;

    let contract = LotteryContract::new(Arc::clone(&chain), "CCONTRACT");
    let err = contract.buy_ticket(&manager, 1, 1).await.unwrap_err();

    // The address is read under the permit, so the failure is NotConnected,
    // and the permit must release on that exit path.
    assert!(matches!(err, PipelineError::NotConnected));
    assert!(!manager.gate().is_busy());
}

#[tokio::test]
async fn signing_refusal_aborts_without_submission() {
    let mut server = mockito::Server::new_async().await;
    let chain = chain_for(&server);
    account_and_sim_mocks(&mut server).await;
    let submit = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::PartialJson(
            json!({"method": "sendTransaction"}),
        ))
        .expect(0)
        .create_async()
        .await;

    let extension = Arc::new(FakeExtension::authorized());
    extension.refuse_signing.store(true, Ordering::SeqCst);
    let manager = SessionManager::new(extension.clone(), Arc::clone(&chain));
    manager.refresh().await;

    let prepared = prepare_buy(&chain).await;
    let err = manager.sign_and_submit(prepared).await.unwrap_err();
    assert!(matches!(err, PipelineError::Signing(_)));
    submit.assert_async().await;
}

#[tokio::test]
async fn signed_envelope_is_forwarded_and_outcome_returned_verbatim() {
    let mut server = mockito::Server::new_async().await;
    let chain = chain_for(&server);
    account_and_sim_mocks(&mut server).await;
    server
        .mock("POST", "/")
        .match_body(mockito::Matcher::PartialJson(
            json!({"method": "sendTransaction"}),
        ))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 9,
                "result": {"status": "PENDING", "hash": "feed"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let manager = SessionManager::new(Arc::new(FakeExtension::authorized()), Arc::clone(&chain));
    manager.refresh().await;

    let prepared = prepare_buy(&chain).await;
    let outcome = manager.sign_and_submit(prepared).await.unwrap();
    assert_eq!(outcome.status, SubmissionStatus::Pending);
    assert_eq!(outcome.hash.as_deref(), Some("feed"));
}

#[tokio::test]
async fn poll_refresh_does_not_disturb_the_action_gate() {
    let manager = SessionManager::new(
        Arc::new(FakeExtension::authorized()),
        offline_chain().await,
    );
    let permit = manager.gate().try_begin().unwrap();
    manager.refresh().await;
    assert!(manager.gate().is_busy());
    drop(permit);
    assert!(!manager.gate().is_busy());
}

// ---------------------------------------------------------------------------

async fn account_and_sim_mocks(server: &mut mockito::ServerGuard) {
    server
        .mock("GET", format!("/accounts/{FAKE_ADDRESS}").as_str())
        .with_body(json!({"sequence": "200"}).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/")
        .match_body(mockito::Matcher::PartialJson(
            json!({"method": "simulateTransaction"}),
        ))
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "results": [{"retval": null}],
                    "minResourceFee": "900",
                    "latestLedger": 7
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
}

async fn prepare_buy(chain: &Arc<ChainClient>) -> nft_lottery_client::PreparedEnvelope {
    nft_lottery_client::envelope::TxPipeline::new(chain)
        .prepare(
            FAKE_ADDRESS,
            "CCONTRACT",
            "buy_ticket",
            vec![
                ScArg::Address(FAKE_ADDRESS.to_string()),
                ScArg::U64(1),
                ScArg::U32(1),
            ],
        )
        .await
        .unwrap()
}
