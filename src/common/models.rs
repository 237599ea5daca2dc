// Common models shared by the REST wrappers, the real-time layer and the views.
// The backend owns these shapes; the client passes them through unchanged.
use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Recruiter,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Candidate => write!(f, "candidate"),
            Role::Recruiter => write!(f, "recruiter"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "candidate" => Ok(Role::Candidate),
            "recruiter" => Ok(Role::Recruiter),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub profile_photo: Option<String>,
}

/// Authenticated identity cached on the client. The backend stays the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    /// Ordered participant pair.
    pub members: [String; 2],
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    /// The participant that is not `user_id`, if `user_id` is a member.
    pub fn other_member(&self, user_id: &str) -> Option<&str> {
        match (&self.members[0], &self.members[1]) {
            (a, b) if a == user_id => Some(b.as_str()),
            (a, b) if b == user_id => Some(a.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl ChatMessage {
    /// A message belongs to exactly one conversation and its sender is one of the two members.
    pub fn is_valid_for(&self, conversation: &Conversation) -> bool {
        self.conversation_id == conversation.id && conversation.has_member(&self.sender_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub recruiter_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub job_type: Option<String>,
    pub company_id: String,
    pub recruiter_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub candidate_id: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub cover_letter: Option<String>,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub text: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
}
