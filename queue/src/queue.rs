//! The redemption queue state machine.

use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::request::RedemptionRequest;
use serde::{Deserialize, Serialize};
use sova_types::{
    blake2b_256_multi, AccessControl, AccessError, Address, AssetId, EventLog, EventRecord,
    ProtocolEvent, RedemptionKind, RedemptionStatus, RequestId, Timestamp,
};
use sova_utils::{format_window, ReentrancyGuard};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Snapshot returned by [`RedemptionQueue::queue_status`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub enabled: bool,
    pub window_duration_secs: u64,
    /// Always zero: the queue-wide pending count is not tracked here.
    /// Use [`RedemptionQueue::active_requests`] per user instead.
    pub pending_requests: u64,
}

/// Derive a request id from its content and the queue counter.
///
/// The counter makes ids unique even for identical requests opened by the
/// same user in the same second.
pub fn derive_request_id(
    user: &Address,
    kind: RedemptionKind,
    amount: u128,
    now: Timestamp,
    nonce: u64,
) -> RequestId {
    RequestId::new(blake2b_256_multi(&[
        b"sova-redemption",
        user.as_bytes(),
        &[kind.tag()],
        &amount.to_be_bytes(),
        &now.as_secs().to_be_bytes(),
        &nonce.to_be_bytes(),
    ]))
}

/// Deferred redemption requests and their lifecycle.
///
/// Requests are stored once by id. Each user has an append-only history
/// (every request ever opened, in order) and a pending index holding only the
/// requests still `Pending`, so listing active requests never scans history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedemptionQueue {
    address: Address,
    access: AccessControl,
    config: QueueConfig,
    processors: BTreeSet<Address>,
    requests: HashMap<RequestId, RedemptionRequest>,
    history: HashMap<Address, Vec<RequestId>>,
    /// user → nonce → id, for `Pending` requests only.
    pending: HashMap<Address, BTreeMap<u64, RequestId>>,
    next_nonce: u64,
    #[serde(default)]
    guard: ReentrancyGuard,
    events: EventLog,
}

impl RedemptionQueue {
    pub fn new(address: Address, admin: Address, config: QueueConfig) -> Result<Self, QueueError> {
        config.validate()?;
        Ok(Self {
            address,
            access: AccessControl::new(admin)?,
            config,
            processors: BTreeSet::new(),
            requests: HashMap::new(),
            history: HashMap::new(),
            pending: HashMap::new(),
            next_nonce: 0,
            guard: ReentrancyGuard::new(),
            events: EventLog::new(),
        })
    }

    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, QueueError>) -> Result<T, QueueError> {
        self.guard.enter()?;
        let result = f(self);
        self.guard.exit();
        result
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn admin(&self) -> &Address {
        self.access.admin()
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    // ── Administration ────────────────────────────────────────────────────

    pub fn set_config(&mut self, caller: &Address, config: QueueConfig) -> Result<(), QueueError> {
        self.guarded(|q| {
            q.access.ensure_admin(caller)?;
            config.validate()?;
            tracing::info!(
                window_secs = config.window_duration_secs,
                enabled = config.enabled,
                "queue config updated"
            );
            q.config = config;
            Ok(())
        })
    }

    /// Allow `processor` to open and fulfil requests. Returns `false` if it was
    /// already authorized.
    pub fn add_processor(&mut self, caller: &Address, processor: Address) -> Result<bool, QueueError> {
        self.guarded(|q| {
            q.access.ensure_admin(caller)?;
            let added = q.processors.insert(processor);
            if added {
                tracing::info!(processor = %processor, "processor authorized");
            }
            Ok(added)
        })
    }

    pub fn remove_processor(&mut self, caller: &Address, processor: &Address) -> Result<bool, QueueError> {
        self.guarded(|q| {
            q.access.ensure_admin(caller)?;
            let removed = q.processors.remove(processor);
            if removed {
                tracing::info!(processor = %processor, "processor revoked");
            }
            Ok(removed)
        })
    }

    pub fn is_processor(&self, address: &Address) -> bool {
        self.processors.contains(address)
    }

    pub fn processors(&self) -> impl Iterator<Item = &Address> {
        self.processors.iter()
    }

    pub fn transfer_admin(&mut self, caller: &Address, new_admin: Address) -> Result<(), QueueError> {
        self.guarded(|q| Ok(q.access.transfer_admin(caller, new_admin)?))
    }

    fn ensure_processor(&self, caller: &Address) -> Result<(), QueueError> {
        if self.is_processor(caller) {
            Ok(())
        } else {
            Err(AccessError::NotProcessor(*caller).into())
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Open a `Pending` request on behalf of `user`.
    ///
    /// The processor must already hold whatever the request refers to.
    #[allow(clippy::too_many_arguments)]
    pub fn request_redemption(
        &mut self,
        processor: &Address,
        user: &Address,
        kind: RedemptionKind,
        amount: u128,
        target_asset: AssetId,
        estimated_out: u128,
        now: Timestamp,
    ) -> Result<RequestId, QueueError> {
        self.guarded(|q| {
            q.ensure_processor(processor)?;
            if !q.config.enabled {
                return Err(QueueError::Disabled);
            }
            if amount == 0 {
                return Err(QueueError::ZeroAmount);
            }
            if user.is_zero() {
                return Err(QueueError::NullUser);
            }
            let fulfillable_at = now
                .checked_add_secs(q.config.window_duration_secs)
                .ok_or(QueueError::Overflow)?;
            let nonce = q.next_nonce;
            let next_nonce = nonce.checked_add(1).ok_or(QueueError::Overflow)?;
            let id = derive_request_id(user, kind, amount, now, nonce);

            q.requests.insert(
                id,
                RedemptionRequest {
                    id,
                    user: *user,
                    kind,
                    amount,
                    requested_at: now,
                    fulfillable_at,
                    status: RedemptionStatus::Pending,
                    target_asset,
                    estimated_out,
                    actual_out: None,
                    closed_at: None,
                    processor: *processor,
                    nonce,
                },
            );
            q.history.entry(*user).or_default().push(id);
            q.pending.entry(*user).or_default().insert(nonce, id);
            q.next_nonce = next_nonce;

            q.events.emit(
                now,
                ProtocolEvent::RedemptionRequested {
                    id,
                    user: *user,
                    kind,
                    amount,
                    fulfillable_at,
                },
            );
            tracing::info!(
                %id,
                user = %user,
                ?kind,
                amount,
                fulfillable_at = fulfillable_at.as_secs(),
                window = %format_window(q.config.window_duration_secs),
                "redemption requested"
            );
            Ok(id)
        })
    }

    /// Check, without changing anything, that `processor` may fulfil `id` now.
    pub fn check_fulfillable(
        &self,
        processor: &Address,
        id: &RequestId,
        now: Timestamp,
    ) -> Result<&RedemptionRequest, QueueError> {
        self.ensure_processor(processor)?;
        let request = self.pending_request(id)?;
        if now < request.fulfillable_at {
            return Err(QueueError::TooEarly {
                id: *id,
                fulfillable_at: request.fulfillable_at,
                now,
            });
        }
        Ok(request)
    }

    /// Mark a request fulfilled, recording the output actually paid.
    ///
    /// No funds move here: the calling processor pays out in the same call.
    pub fn fulfill_redemption(
        &mut self,
        processor: &Address,
        id: &RequestId,
        actual_out: u128,
        now: Timestamp,
    ) -> Result<RedemptionRequest, QueueError> {
        self.guarded(|q| {
            q.check_fulfillable(processor, id, now)?;
            let request = q.close(id, RedemptionStatus::Fulfilled, Some(actual_out), now)?;
            q.events.emit(
                now,
                ProtocolEvent::RedemptionFulfilled {
                    id: *id,
                    user: request.user,
                    kind: request.kind,
                    amount: request.amount,
                    amount_out: actual_out,
                },
            );
            tracing::info!(%id, user = %request.user, actual_out, "redemption fulfilled");
            Ok(request)
        })
    }

    /// Check, without changing anything, that `caller` may cancel `id`.
    ///
    /// The request owner, the admin and the processor that opened the request
    /// may cancel. Other processors may not.
    pub fn check_cancellable(&self, caller: &Address, id: &RequestId) -> Result<&RedemptionRequest, QueueError> {
        let request = self.requests.get(id).ok_or(QueueError::RequestNotFound(*id))?;
        if *caller != request.processor {
            self.access.ensure_owner_or_admin(caller, &request.user)?;
        }
        self.pending_request(id)
    }

    /// Mark a request cancelled.
    ///
    /// Returning the reserved funds is the processor's job.
    pub fn cancel_redemption(
        &mut self,
        caller: &Address,
        id: &RequestId,
        now: Timestamp,
    ) -> Result<RedemptionRequest, QueueError> {
        self.guarded(|q| {
            q.check_cancellable(caller, id)?;
            let request = q.close(id, RedemptionStatus::Cancelled, None, now)?;
            q.events.emit(
                now,
                ProtocolEvent::RedemptionCancelled {
                    id: *id,
                    user: request.user,
                    kind: request.kind,
                    amount: request.amount,
                },
            );
            tracing::info!(%id, user = %request.user, by = %caller, "redemption cancelled");
            Ok(request)
        })
    }

    fn pending_request(&self, id: &RequestId) -> Result<&RedemptionRequest, QueueError> {
        let request = self.requests.get(id).ok_or(QueueError::RequestNotFound(*id))?;
        if !request.is_pending() {
            return Err(QueueError::NotPending {
                id: *id,
                status: request.status,
            });
        }
        Ok(request)
    }

    fn close(
        &mut self,
        id: &RequestId,
        status: RedemptionStatus,
        actual_out: Option<u128>,
        now: Timestamp,
    ) -> Result<RedemptionRequest, QueueError> {
        let request = self
            .requests
            .get_mut(id)
            .ok_or(QueueError::RequestNotFound(*id))?;
        request.status = status;
        request.actual_out = actual_out;
        request.closed_at = Some(now);
        let closed = request.clone();

        if let Some(index) = self.pending.get_mut(&closed.user) {
            index.remove(&closed.nonce);
            if index.is_empty() {
                self.pending.remove(&closed.user);
            }
        }
        Ok(closed)
    }

    // ── Views ─────────────────────────────────────────────────────────────

    pub fn request(&self, id: &RequestId) -> Option<&RedemptionRequest> {
        self.requests.get(id)
    }

    /// Every request `user` ever opened, oldest first.
    pub fn user_requests(&self, user: &Address) -> Vec<&RedemptionRequest> {
        self.history
            .get(user)
            .map(|ids| ids.iter().filter_map(|id| self.requests.get(id)).collect())
            .unwrap_or_default()
    }

    /// `user`'s requests that are still `Pending`, oldest first.
    pub fn active_requests(&self, user: &Address) -> Vec<&RedemptionRequest> {
        self.pending
            .get(user)
            .map(|index| index.values().filter_map(|id| self.requests.get(id)).collect())
            .unwrap_or_default()
    }

    /// Queue-wide status.
    ///
    /// `pending_requests` is a placeholder that always reads zero.
    pub fn queue_status(&self) -> QueueStatus {
        QueueStatus {
            enabled: self.config.enabled,
            window_duration_secs: self.config.window_duration_secs,
            pending_requests: 0,
        }
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }
}
