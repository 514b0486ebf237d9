use async_trait::async_trait;
use meshcall_client::SignalingChannel;
use meshcall_core::{PeerName, SessionDescription, SignalAction, SignalBody};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Mock SignalingChannel that captures every outgoing body.
#[derive(Clone)]
pub struct MockSignalingChannel {
    tx: mpsc::UnboundedSender<SignalBody>,
    sent: Arc<Mutex<Vec<SignalBody>>>,
}

impl MockSignalingChannel {
    /// Create a mock and a receiver for live consumption of sent bodies.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SignalBody>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
        };
        (channel, rx)
    }

    pub fn new_stored_only() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn sent(&self) -> Vec<SignalBody> {
        self.sent.lock().await.clone()
    }

    pub async fn count(&self, action: SignalAction) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|body| body.action() == action)
            .count()
    }

    pub async fn offers_to(&self, peer: &PeerName) -> Vec<SessionDescription> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|body| match body {
                SignalBody::Offer { offer, to } if to == peer => Some(offer.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn answers_to(&self, peer: &PeerName) -> Vec<SessionDescription> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|body| match body {
                SignalBody::Answer { answer, to } if to == peer => Some(answer.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockSignalingChannel {
    fn default() -> Self {
        Self::new_stored_only()
    }
}

#[async_trait]
impl SignalingChannel for MockSignalingChannel {
    async fn send_signal(&self, body: SignalBody) {
        tracing::debug!("[MockSignaling] {}", body.action());
        self.sent.lock().await.push(body.clone());
        let _ = self.tx.send(body);
    }
}
