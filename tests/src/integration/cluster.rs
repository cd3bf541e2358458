//! # In-Process Cluster
//!
//! A fixed set of replicas wired to one in-memory peer network and one
//! cluster bus, each with its own Ed25519 identity. Replica `i` in
//! [`TestCluster::replicas`] is primary in every view `v` with
//! `v % size == i`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pbft_execution::adapters::DeliveredMessage;
use pbft_execution::{
    CommitOutcome, Ed25519ResultSigner, ExecutorError, InMemoryNetwork, InMemoryTransport,
    ReplicaApi, ReplicaConfig, ReplicaDependencies, ReplicaResult, ReplicaService, ResultSigner,
    ViewChangeSignal, ViewChangeTrigger, WorkloadExecutor,
};
use shared_bus::ClusterBus;
use shared_crypto::ReplicaPublicKey;
use shared_types::{Digest, ExecuteRequest, ExecutionResult, PeerId, ResultCode, RuntimeOutput};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Deterministic executor: echoes the function id and parameters.
#[derive(Default)]
pub struct EchoExecutor {
    calls: Mutex<Vec<String>>,
}

impl EchoExecutor {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl WorkloadExecutor for EchoExecutor {
    async fn execute_function(
        &self,
        request_id: &str,
        request: &ExecuteRequest,
    ) -> Result<ExecutionResult, ExecutorError> {
        self.calls.lock().push(request_id.to_string());

        let args: Vec<String> = request
            .parameters
            .iter()
            .map(|p| format!("{}={}", p.name, p.value))
            .collect();

        Ok(ExecutionResult {
            code: ResultCode::Ok,
            result: RuntimeOutput {
                stdout: format!("{}({})", request.function_id, args.join(",")),
                ..Default::default()
            },
            request_id: request_id.to_string(),
        })
    }
}

/// Collects view-change signals.
#[derive(Default)]
pub struct SignalLog {
    signals: Mutex<Vec<ViewChangeSignal>>,
}

impl SignalLog {
    pub fn signals(&self) -> Vec<ViewChangeSignal> {
        self.signals.lock().clone()
    }
}

impl ViewChangeTrigger for SignalLog {
    fn request_view_change(&self, signal: ViewChangeSignal) {
        self.signals.lock().push(signal);
    }
}

pub type ClusterReplica =
    ReplicaService<EchoExecutor, InMemoryTransport, ClusterBus, Ed25519ResultSigner>;

/// One cluster member and its test-side handles.
pub struct Member {
    pub service: Arc<ClusterReplica>,
    pub executor: Arc<EchoExecutor>,
    pub signals: Arc<SignalLog>,
    pub public_key: ReplicaPublicKey,
    pub inbox: mpsc::UnboundedReceiver<DeliveredMessage>,
}

impl Member {
    pub fn id(&self) -> &PeerId {
        self.service.identity()
    }
}

pub struct TestCluster {
    pub members: Vec<Member>,
    pub network: Arc<InMemoryNetwork>,
    pub bus: Arc<ClusterBus>,
}

impl TestCluster {
    pub fn new(size: usize) -> Self {
        Self::with_config(size, ReplicaConfig::default())
    }

    pub fn with_config(size: usize, config: ReplicaConfig) -> Self {
        let network = InMemoryNetwork::new();
        let bus = Arc::new(ClusterBus::new());

        let signers: Vec<Arc<Ed25519ResultSigner>> = (0..size)
            .map(|_| Arc::new(Ed25519ResultSigner::generate()))
            .collect();
        let replicas: Vec<PeerId> = signers.iter().map(|s| s.identity()).collect();

        let members = signers
            .into_iter()
            .map(|signer| {
                let id = signer.identity();
                let public_key = signer.public_key();
                let executor = Arc::new(EchoExecutor::default());
                let signals = Arc::new(SignalLog::default());
                let inbox = network.register(id.clone());

                let service = ReplicaService::new(ReplicaDependencies {
                    executor: Arc::clone(&executor),
                    transport: Arc::new(network.transport(id)),
                    publisher: Arc::clone(&bus),
                    signer,
                    view_change: Arc::clone(&signals) as Arc<dyn ViewChangeTrigger>,
                    replicas: replicas.clone(),
                    config: config.clone(),
                });

                Member {
                    service: Arc::new(service),
                    executor,
                    signals,
                    public_key,
                    inbox,
                }
            })
            .collect();

        Self {
            members,
            network,
            bus,
        }
    }

    pub fn replicas(&self) -> Vec<PeerId> {
        self.members.iter().map(|m| m.id().clone()).collect()
    }

    pub fn public_keys(&self) -> HashMap<PeerId, ReplicaPublicKey> {
        self.members
            .iter()
            .map(|m| (m.id().clone(), m.public_key))
            .collect()
    }

    pub fn set_view(&self, view: u64) {
        for member in &self.members {
            member.service.set_view(view);
        }
    }

    /// Submit the same request to every replica; returns the agreed digest.
    pub async fn submit_all(
        &self,
        origin: &PeerId,
        request_id: &str,
        timestamp: DateTime<Utc>,
        payload: &ExecuteRequest,
    ) -> Digest {
        let mut digests = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let ack = member
                .service
                .submit(
                    origin.clone(),
                    request_id.to_string(),
                    timestamp,
                    payload.clone(),
                )
                .await
                .expect("submit");
            digests.push(ack.digest);
        }

        let first = digests[0];
        assert!(digests.iter().all(|d| *d == first), "replicas disagree on digest");
        first
    }

    /// Deliver the same commit to every replica.
    pub async fn commit_all(
        &self,
        view: u64,
        sequence: u64,
        digest: Digest,
    ) -> Vec<ReplicaResult<CommitOutcome>> {
        let mut outcomes = Vec::with_capacity(self.members.len());
        for member in &self.members {
            outcomes.push(member.service.commit(view, sequence, digest).await);
        }
        outcomes
    }
}
