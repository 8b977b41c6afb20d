use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    ComplaintCategory, DocumentSlot, Identity, MealType, PaymentType, RenewalStatus, Role, Room,
    RoomType,
};

// ── Auth ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by both login and register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ── Rooms ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRoomRequest {
    pub room_number: String,
    pub capacity: u32,
    pub room_type: RoomType,
    pub floor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roommate {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetails {
    #[serde(flatten)]
    pub room: Room,
    pub roommates: Vec<Roommate>,
}

/// GET /api/my-room. `room` is None when no room has been assigned yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyRoomResponse {
    pub room: Option<RoomDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ── Complaints ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateComplaintRequest {
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
}

// ── Payments ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePaymentRequest {
    pub student_id: Uuid,
    pub amount: f64,
    pub month: String,
    pub year: String,
    pub payment_type: PaymentType,
    pub due_date: String,
}

// ── Mess menu ───────────────────────────────────────────────────────────

/// Creates the menu for a (day, meal) pair, or replaces its items if one
/// already exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpsertMessMenuRequest {
    pub day: String,
    pub meal_type: MealType,
    pub items: Vec<String>,
}

// ── Renewal forms ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRenewalFormRequest {
    pub files: BTreeMap<DocumentSlot, String>,
}

/// Admin review update: status transition and/or comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenewalReviewRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RenewalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_comments: Option<String>,
}

// ── File transfer ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFileResponse {
    pub message: String,
    pub file_id: Uuid,
    pub filename: String,
    pub file_type: DocumentSlot,
    pub file_path: String,
}

// ── Generic ─────────────────────────────────────────────────────────────

/// Plain acknowledgement body used by most mutation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
