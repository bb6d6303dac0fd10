//! Core types for the Facebook Quantifier pipeline
//!
//! This module defines the data that flows between the pipeline stages:
//! raw records produced by the extractors, normalized activity events, and
//! the soft warnings attached to a run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Tracked activity kind
///
/// Closed enumeration; declaration order is the column order of the output
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AddedFriend,
    ReceivedFriendRequest,
    RejectedFriendRequest,
    RemovedFriend,
    InstalledApp,
    AppsPosts,
    Commented,
    Reactions,
    LikedPage,
    CreatedPage,
    LikedExternalPages,
    OthersPostsTimeline,
    CreatedNote,
    RespondedEvent,
    EventInvitation,
    GroupMembershipActivity,
    GroupPosts,
    ProfileUpdated,
    Searched,
    AdInteraction,
    Poked,
    Voted,
    SavedItem,
    FollowedSbSt,
    AddressbookEntry,
    MenuClicked,
    OwnPostsAll,
    OwnPostsMedia,
    OwnPostsTextOnly,
    OwnPostsLinks,
    MessageSent,
    MessageReceived,
    MessageReceivedOrSent,
    ViewedVideo,
    ViewedArticle,
    ViewedMarketplaceItem,
    VisitedProfile,
    VisitedPage,
    VisitedEventPage,
    VisitedGroupPage,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 40] = [
        Category::AddedFriend,
        Category::ReceivedFriendRequest,
        Category::RejectedFriendRequest,
        Category::RemovedFriend,
        Category::InstalledApp,
        Category::AppsPosts,
        Category::Commented,
        Category::Reactions,
        Category::LikedPage,
        Category::CreatedPage,
        Category::LikedExternalPages,
        Category::OthersPostsTimeline,
        Category::CreatedNote,
        Category::RespondedEvent,
        Category::EventInvitation,
        Category::GroupMembershipActivity,
        Category::GroupPosts,
        Category::ProfileUpdated,
        Category::Searched,
        Category::AdInteraction,
        Category::Poked,
        Category::Voted,
        Category::SavedItem,
        Category::FollowedSbSt,
        Category::AddressbookEntry,
        Category::MenuClicked,
        Category::OwnPostsAll,
        Category::OwnPostsMedia,
        Category::OwnPostsTextOnly,
        Category::OwnPostsLinks,
        Category::MessageSent,
        Category::MessageReceived,
        Category::MessageReceivedOrSent,
        Category::ViewedVideo,
        Category::ViewedArticle,
        Category::ViewedMarketplaceItem,
        Category::VisitedProfile,
        Category::VisitedPage,
        Category::VisitedEventPage,
        Category::VisitedGroupPage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::AddedFriend => "added_friend",
            Category::ReceivedFriendRequest => "received_friend_request",
            Category::RejectedFriendRequest => "rejected_friend_request",
            Category::RemovedFriend => "removed_friend",
            Category::InstalledApp => "installed_app",
            Category::AppsPosts => "apps_posts",
            Category::Commented => "commented",
            Category::Reactions => "reactions",
            Category::LikedPage => "liked_page",
            Category::CreatedPage => "created_page",
            Category::LikedExternalPages => "liked_external_pages",
            Category::OthersPostsTimeline => "others_posts_timeline",
            Category::CreatedNote => "created_note",
            Category::RespondedEvent => "responded_event",
            Category::EventInvitation => "event_invitation",
            Category::GroupMembershipActivity => "group_membership_activity",
            Category::GroupPosts => "group_posts",
            Category::ProfileUpdated => "profile_updated",
            Category::Searched => "searched",
            Category::AdInteraction => "ad_interaction",
            Category::Poked => "poked",
            Category::Voted => "voted",
            Category::SavedItem => "saved_item",
            Category::FollowedSbSt => "followed_sb_st",
            Category::AddressbookEntry => "addressbook_entry",
            Category::MenuClicked => "menu_clicked",
            Category::OwnPostsAll => "own_posts_all",
            Category::OwnPostsMedia => "own_posts_media",
            Category::OwnPostsTextOnly => "own_posts_text_only",
            Category::OwnPostsLinks => "own_posts_links",
            Category::MessageSent => "message_sent",
            Category::MessageReceived => "message_received",
            Category::MessageReceivedOrSent => "message_received_or_sent",
            Category::ViewedVideo => "viewed_video",
            Category::ViewedArticle => "viewed_article",
            Category::ViewedMarketplaceItem => "viewed_marketplace_item",
            Category::VisitedProfile => "visited_profile",
            Category::VisitedPage => "visited_page",
            Category::VisitedEventPage => "visited_event_page",
            Category::VisitedGroupPage => "visited_group_page",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of a numeric timestamp, fixed per registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampUnit {
    Seconds,
    Milliseconds,
}

/// A timestamp value as found inside an export document
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    Integer(i64),
    Float(f64),
    Text(String),
    /// Any other JSON value (null, bool, object, ...), kept for diagnostics
    Unsupported(String),
}

impl From<&Value> for RawTimestamp {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawTimestamp::Integer(i),
                None => RawTimestamp::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => RawTimestamp::Text(s.clone()),
            other => RawTimestamp::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawTimestamp::Integer(i) => write!(f, "{}", i),
            RawTimestamp::Float(x) => write!(f, "{}", x),
            RawTimestamp::Text(s) => write!(f, "{:?}", s),
            RawTimestamp::Unsupported(s) => f.write_str(s),
        }
    }
}

/// One extracted (sub-category, raw timestamp) pair
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub category: Category,
    pub timestamp: RawTimestamp,
    pub unit: TimestampUnit,
}

impl RawRecord {
    pub fn new(category: Category, timestamp: RawTimestamp, unit: TimestampUnit) -> Self {
        Self {
            category,
            timestamp,
            unit,
        }
    }
}

/// Normalized unit of activity: one occurrence of a category on a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivityEvent {
    pub category: Category,
    pub date: NaiveDate,
}

/// Non-fatal problem found while extracting a registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionWarning {
    /// Registry entry name (e.g. "reactions", "messages", "viewed")
    pub entry: String,
    /// Offending file, when one was involved
    pub path: Option<PathBuf>,
    pub reason: String,
}

/// How messages were attributed for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageAttribution {
    /// No message threads were found
    NoMessages,
    /// The identity matched at least one sender
    SentReceived,
    /// The identity never matched; everything counted as received-or-sent
    Fallback,
}
