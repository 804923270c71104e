//! Queue-specific errors.

use sova_types::{AccessError, RedemptionStatus, RequestId, Timestamp};
use sova_utils::Reentered;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("redemption queue is disabled")]
    Disabled,

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("request owner cannot be the null address")]
    NullUser,

    #[error("window duration must be greater than zero")]
    InvalidWindow,

    #[error("request {0} not found")]
    RequestNotFound(RequestId),

    #[error("request {id} is {status}, not pending")]
    NotPending { id: RequestId, status: RedemptionStatus },

    #[error("request {id} is not fulfillable until {fulfillable_at} (now {now})")]
    TooEarly {
        id: RequestId,
        fulfillable_at: Timestamp,
        now: Timestamp,
    },

    #[error("arithmetic overflow in queue bookkeeping")]
    Overflow,

    #[error(transparent)]
    Reentrancy(#[from] Reentered),
}
