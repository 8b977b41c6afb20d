use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The signed-in user as returned by login/register. Immutable for the
/// lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub room_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Single,
    Double,
    Triple,
    Quad,
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RoomType::Single => "single",
            RoomType::Double => "double",
            RoomType::Triple => "triple",
            RoomType::Quad => "quad",
        })
    }
}

impl FromStr for RoomType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(RoomType::Single),
            "double" => Ok(RoomType::Double),
            "triple" => Ok(RoomType::Triple),
            "quad" => Ok(RoomType::Quad),
            other => Err(format!("unknown room type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    Full,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_number: String,
    pub capacity: u32,
    pub occupied: u32,
    pub students: Vec<Uuid>,
    pub room_type: RoomType,
    pub floor: String,
    pub status: RoomStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintCategory {
    Maintenance,
    Cleanliness,
    Electrical,
    Plumbing,
    Other,
}

impl fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComplaintCategory::Maintenance => "maintenance",
            ComplaintCategory::Cleanliness => "cleanliness",
            ComplaintCategory::Electrical => "electrical",
            ComplaintCategory::Plumbing => "plumbing",
            ComplaintCategory::Other => "other",
        })
    }
}

impl FromStr for ComplaintCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maintenance" => Ok(ComplaintCategory::Maintenance),
            "cleanliness" => Ok(ComplaintCategory::Cleanliness),
            "electrical" => Ok(ComplaintCategory::Electrical),
            "plumbing" => Ok(ComplaintCategory::Plumbing),
            "other" => Ok(ComplaintCategory::Other),
            other => Err(format!("unknown complaint category: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Resolved => "resolved",
        })
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ComplaintStatus::Pending),
            "in_progress" => Ok(ComplaintStatus::InProgress),
            "resolved" => Ok(ComplaintStatus::Resolved),
            other => Err(format!("unknown complaint status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub room_number: String,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    HostelFee,
    MessFee,
    SecurityDeposit,
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentType::HostelFee => "hostel_fee",
            PaymentType::MessFee => "mess_fee",
            PaymentType::SecurityDeposit => "security_deposit",
        })
    }
}

impl FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hostel_fee" => Ok(PaymentType::HostelFee),
            "mess_fee" => Ok(PaymentType::MessFee),
            "security_deposit" => Ok(PaymentType::SecurityDeposit),
            other => Err(format!("unknown payment type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub amount: f64,
    pub month: String,
    pub year: String,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub due_date: String,
    pub paid_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        })
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        })
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            other => Err(format!("unknown meal type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessMenu {
    pub id: Uuid,
    pub day: String,
    pub meal_type: MealType,
    pub items: Vec<String>,
}

// ── Renewal forms ───────────────────────────────────────────────────────

/// Named document category a renewal form collects.
///
/// `caste_cert` is the only optional slot; the rest must be present
/// before a form can be finalized under the strict submit policy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSlot {
    Aadhar,
    Result,
    CasteCert,
    Photo,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 4] = [
        DocumentSlot::Aadhar,
        DocumentSlot::Result,
        DocumentSlot::CasteCert,
        DocumentSlot::Photo,
    ];

    pub const REQUIRED: [DocumentSlot; 3] =
        [DocumentSlot::Aadhar, DocumentSlot::Result, DocumentSlot::Photo];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSlot::Aadhar => "aadhar",
            DocumentSlot::Result => "result",
            DocumentSlot::CasteCert => "caste_cert",
            DocumentSlot::Photo => "photo",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, DocumentSlot::CasteCert)
    }

    /// Accepted file extensions, lowercase with leading dot. Advisory on
    /// the client side; the backend enforces the same list.
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            DocumentSlot::Photo => &[".jpg", ".jpeg", ".png"],
            _ => &[".jpg", ".jpeg", ".png", ".pdf"],
        }
    }
}

impl fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aadhar" => Ok(DocumentSlot::Aadhar),
            "result" => Ok(DocumentSlot::Result),
            "caste_cert" => Ok(DocumentSlot::CasteCert),
            "photo" => Ok(DocumentSlot::Photo),
            other => Err(format!("unknown document slot: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl RenewalStatus {
    /// Terminal forms are immutable: no file edits, no further review.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RenewalStatus::Approved | RenewalStatus::Rejected)
    }

    /// Legality table for admin review transitions.
    ///
    /// Submitted and UnderReview may move between each other and into
    /// either terminal state. Terminal states accept nothing.
    pub fn can_review_transition(&self, to: RenewalStatus) -> bool {
        match self {
            RenewalStatus::Submitted => to != RenewalStatus::Submitted,
            RenewalStatus::UnderReview => to != RenewalStatus::UnderReview,
            RenewalStatus::Approved | RenewalStatus::Rejected => false,
        }
    }
}

impl fmt::Display for RenewalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenewalStatus::Submitted => "submitted",
            RenewalStatus::UnderReview => "under_review",
            RenewalStatus::Approved => "approved",
            RenewalStatus::Rejected => "rejected",
        })
    }
}

impl FromStr for RenewalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(RenewalStatus::Submitted),
            "under_review" => Ok(RenewalStatus::UnderReview),
            "approved" => Ok(RenewalStatus::Approved),
            "rejected" => Ok(RenewalStatus::Rejected),
            other => Err(format!("unknown renewal status: {other}")),
        }
    }
}

/// A room-renewal application. At most one non-terminal form exists per
/// student; historical (terminal) forms are retained forever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalForm {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub room_number: String,
    pub status: RenewalStatus,
    pub files: BTreeMap<DocumentSlot, String>,
    pub admin_comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
}

impl RenewalForm {
    pub fn missing_required_slots(&self) -> Vec<DocumentSlot> {
        DocumentSlot::REQUIRED
            .into_iter()
            .filter(|slot| !self.files.contains_key(slot))
            .collect()
    }
}
