use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default preview length in seconds for premium video without an explicit value.
pub const DEFAULT_PREVIEW_SECS: u32 = 30;

/// The single authoritative discriminant for how a content item is consumed.
///
/// `External` means "open in a new context" semantics; everything else is
/// rendered in-app. The legacy `is_external` boolean is derived from this
/// enum in API response shapes and never stored, so the two can't disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Video,
    Pdf,
    Image,
    External,
}

impl FileType {
    /// Derive a file type from an uploaded file's declared media type.
    ///
    /// `video/*` and `image/*` match on prefix, PDF requires the exact
    /// `application/pdf` type, and everything else falls back to `External`.
    pub fn from_media_type(media_type: &str) -> Self {
        if media_type.starts_with("video/") {
            FileType::Video
        } else if media_type.starts_with("image/") {
            FileType::Image
        } else if media_type == "application/pdf" {
            FileType::Pdf
        } else {
            FileType::External
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, FileType::External)
    }
}

/// A top-level content grouping with a display name and routing slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// URL-safe key used for lookup. Treated as unique by the lookup
    /// logic; uniqueness is not validated on save.
    pub slug: String,
    /// Symbolic glyph name; unknown names fall back to a default at render time.
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

/// A single consumable item (video, PDF, image, or external link).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub category_id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub content_url: String,
    pub file_type: FileType,
    pub is_premium: bool,
    #[serde(default)]
    pub file_size: Option<u64>,
    /// Seconds of unpaid video playback allowed; `None` means the default.
    #[serde(default)]
    pub preview_duration: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentRecord {
    pub fn preview_duration_secs(&self) -> u32 {
        self.preview_duration.unwrap_or(DEFAULT_PREVIEW_SECS)
    }
}

/// An auth account. The password hash uses PBKDF2-HMAC-SHA256 in the
/// `salt:key` base64 format produced by the auth module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A bearer session issued on sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Profile row keyed by the account id. Absence is non-fatal: the user is
/// treated as an authenticated non-admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Read-only subscription record from the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub provider_session_id: String,
    #[serde(default)]
    pub provider_customer_id: String,
    pub status: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == "active" && self.expires_at > now
    }
}

/// A ledger entry granting one user access to one content item.
/// Created by an out-of-scope payment flow; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPurchase {
    pub id: String,
    pub user_id: String,
    pub content_id: String,
    pub amount: u64,
    pub status: String,
    pub purchase_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
