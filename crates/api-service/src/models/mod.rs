//! Data models for the Convene API.
//!
//! Contains database row types, the membership status enumeration, and the
//! request/response schemas used by the handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum rows returned by unbounded list endpoints.
pub const LIST_LIMIT: i64 = 1000;

// ============================================================================
// Membership status
// ============================================================================

/// Status of a user's membership in a meeting.
///
/// `NeedsAcceptance` marks a pending invite; the other values are responses
/// to an existing invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Invite issued, not yet answered.
    NeedsAcceptance,

    /// Invite accepted.
    Accepted,

    /// Invite declined.
    Declined,
}

impl MembershipStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::NeedsAcceptance => "needs_acceptance",
            MembershipStatus::Accepted => "accepted",
            MembershipStatus::Declined => "declined",
        }
    }

    /// Parse a client-supplied status string into a typed value.
    ///
    /// Returns `None` for unrecognized values; callers surface that as a
    /// validation error.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "needs_acceptance" => Some(MembershipStatus::NeedsAcceptance),
            "accepted" => Some(MembershipStatus::Accepted),
            "declined" => Some(MembershipStatus::Declined),
            _ => None,
        }
    }

    /// Whether this status marks a new invite rather than a response.
    pub fn is_pending_invite(&self) -> bool {
        *self == MembershipStatus::NeedsAcceptance
    }
}

// ============================================================================
// Database rows
// ============================================================================

/// User row (maps to the users table).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Group row (maps to the groups table).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GroupRow {
    pub group_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Meeting row (maps to the meetings table).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MeetingRow {
    pub meeting_id: Uuid,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub description: String,
    pub group_id: Uuid,
    pub admin_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership row (maps to the meeting_members relation).
///
/// This relation is the single source of truth for both the "user's
/// meetings" and "meeting's participants" views.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MembershipRow {
    pub meeting_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub invited_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Time slot row (maps to the time_slots table).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TimeSlotRow {
    pub user_id: Uuid,
    pub slot_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Auth schemas
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Account summary returned by GET /me.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
}

// ============================================================================
// User schemas
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.user_id,
            email: row.email,
            username: row.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserCollection {
    pub users: Vec<UserResponse>,
}

/// Partial user update; only non-null fields overwrite stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn has_changes(&self) -> bool {
        self.email.is_some() || self.username.is_some() || self.password.is_some()
    }
}

// ============================================================================
// Time slot schemas
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTimeSlotRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TimeSlotResponse {
    pub id: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<TimeSlotRow> for TimeSlotResponse {
    fn from(row: TimeSlotRow) -> Self {
        Self {
            id: row.slot_id,
            start: row.start_time,
            end: row.end_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TimeSlotCollection {
    pub time_slots: Vec<TimeSlotResponse>,
}

/// Partial time slot update; only non-null fields overwrite stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateTimeSlotRequest {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl UpdateTimeSlotRequest {
    pub fn has_changes(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

// ============================================================================
// Meeting schemas
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateMeetingRequest {
    pub title: String,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    pub group_id: Uuid,
}

impl CreateMeetingRequest {
    /// Validate the request, returning a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Meeting title cannot be empty".to_string());
        }
        Ok(())
    }
}

/// A participant entry in a meeting's participant view.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantEntry {
    pub user_id: Uuid,
    pub status: MembershipStatus,
}

#[derive(Debug, Serialize)]
pub struct MeetingResponse {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub description: String,
    pub group_id: Uuid,
    pub admin_id: Uuid,
    pub participants: Vec<ParticipantEntry>,
}

impl MeetingResponse {
    pub fn from_row(row: MeetingRow, participants: Vec<ParticipantEntry>) -> Self {
        Self {
            id: row.meeting_id,
            title: row.title,
            start: row.start_time,
            description: row.description,
            group_id: row.group_id,
            admin_id: row.admin_id,
            participants,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeetingCollection {
    pub meetings: Vec<MeetingResponse>,
}

/// Compact per-user meeting listing entry: the "user's meetings" view.
#[derive(Debug, Serialize)]
pub struct MeetingTile {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub group_id: Uuid,
    pub status: MembershipStatus,
}

#[derive(Debug, Serialize)]
pub struct MeetingTileCollection {
    pub meetings: Vec<MeetingTile>,
}

/// A participant joined with their user record for the details view.
#[derive(Debug, Serialize)]
pub struct ParticipantDetail {
    pub user_id: Uuid,
    pub username: String,
    pub status: MembershipStatus,
}

/// Full meeting view including the requesting user's own status.
#[derive(Debug, Serialize)]
pub struct MeetingDetailsResponse {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub group_id: Uuid,
    pub admin_id: Uuid,
    pub description: String,
    pub participants: Vec<ParticipantDetail>,
    pub status: MembershipStatus,
}

/// Partial meeting update; only non-null fields overwrite stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateMeetingRequest {
    pub title: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl UpdateMeetingRequest {
    pub fn has_changes(&self) -> bool {
        self.title.is_some() || self.start.is_some() || self.description.is_some()
    }
}

/// Body of PATCH /meetings/{id}/change_participant_status.
#[derive(Debug, Deserialize)]
pub struct UpdateParticipantStatusRequest {
    /// The participant whose status is being changed.
    pub id: Uuid,
    pub status: String,
}

/// Body of PATCH /invites/{id}.
#[derive(Debug, Deserialize)]
pub struct UpdateInviteStatusRequest {
    pub status: String,
}

/// Echo of an applied (meeting, user, status) transition.
#[derive(Debug, Serialize)]
pub struct ParticipantInviteResponse {
    pub meeting_id: Uuid,
    pub user_id: Uuid,
    pub status: MembershipStatus,
}

/// Echo of the caller's own invite transition.
#[derive(Debug, Serialize)]
pub struct InviteStatusResponse {
    pub meeting_id: Uuid,
    pub status: MembershipStatus,
}

// ============================================================================
// Group schemas
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CreateGroupRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Group name cannot be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl From<GroupRow> for GroupResponse {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.group_id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupCollection {
    pub groups: Vec<GroupResponse>,
}

/// Partial group update; only non-null fields overwrite stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateGroupRequest {
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.description.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str_roundtrip() {
        for status in [
            MembershipStatus::NeedsAcceptance,
            MembershipStatus::Accepted,
            MembershipStatus::Declined,
        ] {
            assert_eq!(MembershipStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!(MembershipStatus::parse("maybe"), None);
        assert_eq!(MembershipStatus::parse(""), None);
        assert_eq!(MembershipStatus::parse("NEEDS_ACCEPTANCE"), None);
        assert_eq!(MembershipStatus::parse("accepted "), None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&MembershipStatus::NeedsAcceptance).unwrap();
        assert_eq!(json, "\"needs_acceptance\"");
    }

    #[test]
    fn test_pending_invite_flag() {
        assert!(MembershipStatus::NeedsAcceptance.is_pending_invite());
        assert!(!MembershipStatus::Accepted.is_pending_invite());
        assert!(!MembershipStatus::Declined.is_pending_invite());
    }

    #[test]
    fn test_create_meeting_validate() {
        let mut request = CreateMeetingRequest {
            title: "Standup".to_string(),
            start: Utc::now(),
            description: String::new(),
            group_id: Uuid::new_v4(),
        };
        assert!(request.validate().is_ok());

        request.title = "   ".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_requests_has_changes() {
        let empty = UpdateMeetingRequest {
            title: None,
            start: None,
            description: None,
        };
        assert!(!empty.has_changes());

        let partial = UpdateMeetingRequest {
            title: Some("Renamed".to_string()),
            start: None,
            description: None,
        };
        assert!(partial.has_changes());

        let empty_slot = UpdateTimeSlotRequest {
            start: None,
            end: None,
        };
        assert!(!empty_slot.has_changes());
    }
}
