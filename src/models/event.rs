use serde::{Deserialize, Serialize};

use super::BookingStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingEventKind {
    Created,
    Approved,
    Rejected,
    DepositRecorded,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookingEvent {
    pub kind: BookingEventKind,
    pub booking_id: String,
    pub status: BookingStatus,
    pub at: String,
}
