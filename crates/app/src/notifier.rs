//! Change notifier: fire-and-forget callbacks to owning device services.
//!
//! Notices go into a bounded queue drained by a fixed pool of workers. The
//! request path only ever calls [`ChangeNotifier::notify`], which never
//! blocks and never fails: a full queue drops the notice, a failed or timed
//! out delivery is logged and forgotten.

use std::sync::Arc;
use std::time::Duration;

use metacat_domain::addressable::Addressable;
use metacat_domain::notification::{ChangeAction, ChangeNotice, SubjectType};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::ports::CallbackSender;

/// Sizing of the notifier pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierConfig {
    pub workers: usize,
    pub queue_depth: usize,
    pub timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_depth: 256,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Handle used by catalogs to enqueue notices. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ChangeNotifier {
    queue: Option<mpsc::Sender<ChangeNotice>>,
}

impl ChangeNotifier {
    /// A notifier that drops every notice.
    #[must_use]
    pub fn disabled() -> Self {
        Self { queue: None }
    }

    /// Start the worker pool. Workers stop once every handle is dropped and
    /// the queue is drained.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<C: CallbackSender>(
        sender: Arc<C>,
        config: NotifierConfig,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let (tx, rx) = mpsc::channel(config.queue_depth.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let workers = (0..config.workers.max(1))
            .map(|worker| {
                let rx = Arc::clone(&rx);
                let sender = Arc::clone(&sender);
                tokio::spawn(run_worker(worker, rx, sender, config.timeout))
            })
            .collect();
        tracing::info!(
            workers = config.workers,
            queue_depth = config.queue_depth,
            "change notifier started"
        );
        (Self { queue: Some(tx) }, workers)
    }

    /// Queue a notice for the service reachable at `owner`.
    ///
    /// Without an owner addressable nothing is attempted.
    pub fn notify(
        &self,
        owner: Option<&Addressable>,
        subject_id: impl ToString,
        action: ChangeAction,
        subject: SubjectType,
    ) {
        let Some(target) = owner else {
            tracing::debug!(%action, %subject, "no owning service, notification skipped");
            return;
        };
        let Some(queue) = &self.queue else {
            return;
        };
        let notice = ChangeNotice {
            target: target.clone(),
            subject_id: subject_id.to_string(),
            action,
            subject,
        };
        if let Err(err) = queue.try_send(notice) {
            let notice = match err {
                mpsc::error::TrySendError::Full(notice)
                | mpsc::error::TrySendError::Closed(notice) => notice,
            };
            tracing::warn!(
                subject_id = %notice.subject_id,
                %action,
                %subject,
                "notification queue unavailable, notice dropped"
            );
        }
    }
}

async fn run_worker<C: CallbackSender>(
    worker: usize,
    rx: Arc<Mutex<mpsc::Receiver<ChangeNotice>>>,
    sender: Arc<C>,
    timeout: Duration,
) {
    loop {
        let next = rx.lock().await.recv().await;
        let Some(notice) = next else {
            tracing::debug!(worker, "change notifier worker stopped");
            return;
        };
        let url = notice.target.url();
        match tokio::time::timeout(timeout, sender.deliver(&notice)).await {
            Ok(Ok(())) => {
                tracing::debug!(worker, %url, action = %notice.action, id = %notice.subject_id, "notification delivered");
            }
            Ok(Err(err)) => {
                tracing::warn!(worker, %url, action = %notice.action, id = %notice.subject_id, error = %err, "notification failed");
            }
            Err(_) => {
                tracing::warn!(worker, %url, action = %notice.action, id = %notice.subject_id, "notification timed out");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{RecordingSender, fixtures};

    async fn drain(handles: Vec<JoinHandle<()>>) {
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn should_deliver_notice_to_owner() {
        let sender = Arc::new(RecordingSender::default());
        let (notifier, workers) = ChangeNotifier::spawn(Arc::clone(&sender), NotifierConfig::default());
        let owner = fixtures::addressable("A1");

        notifier.notify(Some(&owner), "d-1", ChangeAction::Create, SubjectType::Device);
        drop(notifier);
        drain(workers).await;

        let delivered = sender.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].target, owner);
        assert_eq!(delivered[0].subject_id, "d-1");
        assert_eq!(delivered[0].action, ChangeAction::Create);
    }

    #[tokio::test]
    async fn should_skip_notice_without_owner() {
        let sender = Arc::new(RecordingSender::default());
        let (notifier, workers) = ChangeNotifier::spawn(Arc::clone(&sender), NotifierConfig::default());

        notifier.notify(None, "d-1", ChangeAction::Delete, SubjectType::Device);
        drop(notifier);
        drain(workers).await;

        assert!(sender.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_swallow_delivery_failures() {
        let sender = Arc::new(RecordingSender {
            failing: true,
            ..RecordingSender::default()
        });
        let (notifier, workers) = ChangeNotifier::spawn(Arc::clone(&sender), NotifierConfig::default());
        let owner = fixtures::addressable("A1");

        notifier.notify(Some(&owner), "m-1", ChangeAction::Update, SubjectType::Manager);
        notifier.notify(Some(&owner), "m-2", ChangeAction::Update, SubjectType::Manager);
        drop(notifier);
        drain(workers).await;

        assert_eq!(sender.delivered.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_drop_notices_beyond_queue_depth() {
        let sender = Arc::new(RecordingSender::default());
        let config = NotifierConfig {
            workers: 1,
            queue_depth: 1,
            timeout: Duration::from_secs(1),
        };
        let (notifier, workers) = ChangeNotifier::spawn(Arc::clone(&sender), config);
        let owner = fixtures::addressable("A1");

        // The current-thread runtime does not run the worker until we yield,
        // so the second and third notices find the queue full.
        for id in ["d-1", "d-2", "d-3"] {
            notifier.notify(Some(&owner), id, ChangeAction::Create, SubjectType::Device);
        }
        drop(notifier);
        drain(workers).await;

        let delivered = sender.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].subject_id, "d-1");
    }

    #[test]
    fn should_ignore_notices_when_disabled() {
        let notifier = ChangeNotifier::disabled();
        notifier.notify(
            Some(&fixtures::addressable("A1")),
            "d-1",
            ChangeAction::Create,
            SubjectType::Device,
        );
    }
}
