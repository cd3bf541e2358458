//! Multi-replica flows: one request ordered and executed by every replica,
//! with results routed through the primary of the current view.

use super::cluster::TestCluster;
use chrono::Utc;
use pbft_execution::{verify_response, CommitOutcome, ReplicaApi, ReplicaConfig, ReplicaError};
use shared_types::messages::{DEFAULT_PROTOCOL_ID, DEFAULT_RESULT_CHANNEL};
use shared_types::{ExecuteRequest, ExecuteResponse, PeerId, ResultCode};
use std::time::Duration;

fn client() -> PeerId {
    PeerId::new("client-1")
}

fn payload() -> ExecuteRequest {
    ExecuteRequest::new("bafy-hello-world", "hello.wasm").with_parameter("name", "world")
}

#[tokio::test]
async fn test_replicas_agree_on_digest() {
    let cluster = TestCluster::new(4);

    cluster
        .submit_all(&client(), "req-1", Utc::now(), &payload())
        .await;

    for member in &cluster.members {
        assert_eq!(member.service.pending_count(), 1);
        assert!(member.service.timer_running());
    }
}

#[tokio::test]
async fn test_commit_routes_results_through_primary() {
    let mut cluster = TestCluster::new(4);
    let mut results = cluster.bus.subscribe(DEFAULT_RESULT_CHANNEL);

    let digest = cluster
        .submit_all(&client(), "req-1", Utc::now(), &payload())
        .await;
    let outcomes = cluster.commit_all(0, 1, digest).await;

    for outcome in outcomes {
        assert!(matches!(
            outcome,
            Ok(CommitOutcome::Executed { sequence: 1, code: ResultCode::Ok, .. })
        ));
    }

    let keys = cluster.public_keys();
    let primary = cluster.members[0].id().clone();

    // Primary publishes its own result on the cluster channel.
    let published: ExecuteResponse = results.recv_json().await.unwrap();
    assert_eq!(published.pbft.replica, primary);
    assert_eq!(published.request_id, "req-1");
    verify_response(&published, &keys[&primary]).unwrap();
    assert_eq!(results.try_recv().unwrap(), None);

    // Every other replica sends to the primary.
    let inbox = &mut cluster.members[0].inbox;
    let mut senders = Vec::new();
    while let Ok(delivered) = inbox.try_recv() {
        assert_eq!(delivered.protocol, DEFAULT_PROTOCOL_ID);
        assert_eq!(delivered.from, delivered.message.pbft.replica);
        verify_response(&delivered.message, &keys[&delivered.from]).unwrap();
        assert_eq!(
            delivered.message.results[&delivered.from].result.stdout,
            "bafy-hello-world(name=world)"
        );
        senders.push(delivered.from);
    }
    senders.sort();
    let mut expected: Vec<PeerId> = cluster.replicas()[1..].to_vec();
    expected.sort();
    assert_eq!(senders, expected);

    for member in &cluster.members {
        assert_eq!(member.service.last_executed().await, 1);
        assert_eq!(member.executor.calls(), vec!["req-1".to_string()]);
        assert!(!member.service.timer_running());
    }
}

#[tokio::test]
async fn test_view_change_moves_primary() {
    let mut cluster = TestCluster::new(3);
    let mut results = cluster.bus.subscribe(DEFAULT_RESULT_CHANNEL);
    cluster.set_view(1);

    let digest = cluster
        .submit_all(&client(), "req-1", Utc::now(), &payload())
        .await;
    cluster.commit_all(1, 1, digest).await;

    let new_primary = cluster.members[1].id().clone();
    assert!(cluster.members[1].service.is_primary());

    let published: ExecuteResponse = results.recv_json().await.unwrap();
    assert_eq!(published.pbft.replica, new_primary);
    assert_eq!(published.pbft.view, 1);

    let mut delivered = 0;
    while let Ok(message) = cluster.members[1].inbox.try_recv() {
        assert_eq!(message.message.pbft.view, 1);
        delivered += 1;
    }
    assert_eq!(delivered, 2);
    assert!(cluster.members[0].inbox.try_recv().is_err());
}

#[tokio::test]
async fn test_unreachable_primary_still_consumes_sequence() {
    let cluster = TestCluster::new(3);
    let primary = cluster.members[0].id().clone();
    cluster.network.unregister(&primary);

    let digest = cluster
        .submit_all(&client(), "req-1", Utc::now(), &payload())
        .await;
    let outcomes = cluster.commit_all(0, 1, digest).await;

    assert!(outcomes[0].is_ok());
    for outcome in &outcomes[1..] {
        match outcome {
            Err(ReplicaError::Dissemination { target, request_id, .. }) => {
                assert_eq!(target, &primary);
                assert_eq!(request_id, "req-1");
            }
            other => panic!("expected dissemination error, got {other:?}"),
        }
    }

    for member in &cluster.members {
        assert_eq!(member.service.last_executed().await, 1);
        let cached = member.service.cached_result("req-1").await.unwrap();
        assert_eq!(&cached.pbft.replica, member.id());
    }
}

#[tokio::test]
async fn test_early_commit_redelivered_in_order() {
    let cluster = TestCluster::new(3);

    let first = cluster
        .submit_all(&client(), "req-1", Utc::now(), &payload())
        .await;
    let second = cluster
        .submit_all(
            &client(),
            "req-2",
            Utc::now(),
            &payload().with_parameter("round", "2"),
        )
        .await;

    for outcome in cluster.commit_all(0, 2, second).await {
        assert!(matches!(
            outcome,
            Ok(CommitOutcome::SequenceGap { expected: 1, received: 2 })
        ));
    }

    cluster.commit_all(0, 1, first).await;
    cluster.commit_all(0, 2, second).await;

    for member in &cluster.members {
        assert_eq!(member.service.last_executed().await, 2);
        assert_eq!(member.executor.calls(), vec!["req-1", "req-2"]);
        assert_eq!(member.service.pending_count(), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn test_stalled_cluster_signals_view_change() {
    let config = ReplicaConfig::default().with_request_timeout(Duration::from_secs(5));
    let cluster = TestCluster::with_config(3, config);

    let digest = cluster
        .submit_all(&client(), "req-1", Utc::now(), &payload())
        .await;

    tokio::time::sleep(Duration::from_secs(6)).await;

    for member in &cluster.members {
        let signals = member.signals.signals();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].current_view, 0);
        assert_eq!(signals[0].proposed_view, 1);
        assert_eq!(signals[0].pending, vec![digest]);
    }
}

#[tokio::test]
async fn test_commits_exported_as_metrics() {
    replica_telemetry::register_metrics().unwrap();

    let cluster = TestCluster::new(1);
    let digest = cluster
        .submit_all(&client(), "req-1", Utc::now(), &payload())
        .await;
    cluster.commit_all(0, 1, digest).await;

    let exported = replica_telemetry::encode_metrics().unwrap();
    assert!(exported.contains("rp_commit_total"));
    assert!(exported.contains("rp_intake_requests_journaled_total"));
}
