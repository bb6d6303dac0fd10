//! Schema registry
//!
//! Static table describing where each activity lives inside an export and
//! which extraction rule reads it. Adding a platform category means adding a
//! row here, plus a rule variant if the document shape is new.

use crate::types::{Category, TimestampUnit};

/// Where the documents for a registry entry are found, relative to the export root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFiles {
    /// Candidate paths probed in order; the first existing file is used
    Candidates(&'static [&'static str]),
    /// Every file with the given extension below a directory
    Recursive {
        dir: &'static str,
        extension: &'static str,
    },
}

/// How a section of a sectioned document holds its entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionShape {
    /// `section.entries` is the list of timestamped entries
    Entries,
    /// Each array-valued field of the section is a group of sub-lists;
    /// `group[sub_list].entries` holds the entries
    Grouped { sub_list: usize },
}

/// One sub-category inside a sectioned document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub category: Category,
    pub index: usize,
    pub shape: SectionShape,
}

/// Extraction rule, one variant per document shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionRule {
    /// List of entries each carrying one timestamp field
    SimpleList {
        category: Category,
        field: &'static str,
    },
    /// Own timeline posts, classified as media, links or text only
    ClassifiedPosts { field: &'static str },
    /// Message threads attributed by sender name
    SenderMatchedMessages {
        sender_field: &'static str,
        timestamp_field: &'static str,
    },
    /// Array of sections under `root_key`, one sub-category per section
    SectionedList {
        root_key: &'static str,
        sections: &'static [Section],
    },
}

impl ExtractionRule {
    /// Categories this rule can produce
    pub fn categories(&self) -> Vec<Category> {
        match self {
            ExtractionRule::SimpleList { category, .. } => vec![*category],
            ExtractionRule::ClassifiedPosts { .. } => vec![
                Category::OwnPostsAll,
                Category::OwnPostsMedia,
                Category::OwnPostsTextOnly,
                Category::OwnPostsLinks,
            ],
            ExtractionRule::SenderMatchedMessages { .. } => vec![
                Category::MessageSent,
                Category::MessageReceived,
                Category::MessageReceivedOrSent,
            ],
            ExtractionRule::SectionedList { sections, .. } => {
                sections.iter().map(|s| s.category).collect()
            }
        }
    }

    /// Unit of numeric timestamps read by this rule
    pub fn unit(&self) -> TimestampUnit {
        match self {
            ExtractionRule::SenderMatchedMessages { .. } => TimestampUnit::Milliseconds,
            _ => TimestampUnit::Seconds,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionRule::SimpleList { .. } => "simple_list",
            ExtractionRule::ClassifiedPosts { .. } => "classified_posts",
            ExtractionRule::SenderMatchedMessages { .. } => "sender_matched_messages",
            ExtractionRule::SectionedList { .. } => "sectioned_list",
        }
    }
}

/// A registry row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: &'static str,
    pub sources: SourceFiles,
    pub rule: ExtractionRule,
}

const fn simple(
    name: &'static str,
    category: Category,
    paths: &'static [&'static str],
    field: &'static str,
) -> RegistryEntry {
    RegistryEntry {
        name,
        sources: SourceFiles::Candidates(paths),
        rule: ExtractionRule::SimpleList { category, field },
    }
}

const VIEWED_SECTIONS: &[Section] = &[
    // Videos are listed three times per group; the third list is "time viewed"
    Section {
        category: Category::ViewedVideo,
        index: 0,
        shape: SectionShape::Grouped { sub_list: 2 },
    },
    Section {
        category: Category::ViewedArticle,
        index: 1,
        shape: SectionShape::Entries,
    },
    Section {
        category: Category::ViewedMarketplaceItem,
        index: 2,
        shape: SectionShape::Grouped { sub_list: 0 },
    },
];

const VISITED_SECTIONS: &[Section] = &[
    Section {
        category: Category::VisitedProfile,
        index: 0,
        shape: SectionShape::Entries,
    },
    Section {
        category: Category::VisitedPage,
        index: 1,
        shape: SectionShape::Entries,
    },
    Section {
        category: Category::VisitedEventPage,
        index: 2,
        shape: SectionShape::Entries,
    },
    Section {
        category: Category::VisitedGroupPage,
        index: 3,
        shape: SectionShape::Entries,
    },
];

static REGISTRY: &[RegistryEntry] = &[
    simple(
        "added_friend",
        Category::AddedFriend,
        &["friends/friends.json", "friends_and_followers/friends.json"],
        "timestamp",
    ),
    simple(
        "received_friend_request",
        Category::ReceivedFriendRequest,
        &[
            "friends/received_friend_requests.json",
            "friends_and_followers/friend_requests_received.json",
        ],
        "timestamp",
    ),
    simple(
        "rejected_friend_request",
        Category::RejectedFriendRequest,
        &[
            "friends/rejected_friend_requests.json",
            "friends_and_followers/rejected_friend_requests.json",
        ],
        "timestamp",
    ),
    simple(
        "removed_friend",
        Category::RemovedFriend,
        &[
            "friends/removed_friends.json",
            "friends_and_followers/removed_friends.json",
        ],
        "timestamp",
    ),
    simple(
        "installed_app",
        Category::InstalledApp,
        &["apps_and_websites/apps_and_websites.json"],
        "added_timestamp",
    ),
    simple(
        "apps_posts",
        Category::AppsPosts,
        &["apps_and_websites/posts_from_apps_and_websites.json"],
        "timestamp",
    ),
    simple(
        "commented",
        Category::Commented,
        &["comments/comments.json", "comments_and_reactions/comments.json"],
        "timestamp",
    ),
    simple(
        "reactions",
        Category::Reactions,
        &[
            "likes_and_reactions/posts_and_comments.json",
            "comments_and_reactions/posts_and_comments.json",
        ],
        "timestamp",
    ),
    simple(
        "liked_page",
        Category::LikedPage,
        &["likes_and_reactions/pages.json"],
        "timestamp",
    ),
    simple(
        "created_page",
        Category::CreatedPage,
        &["pages/your_pages.json"],
        "timestamp",
    ),
    simple(
        "liked_external_pages",
        Category::LikedExternalPages,
        &["likes_and_reactions/likes_on_external_sites.json"],
        "timestamp",
    ),
    simple(
        "others_posts_timeline",
        Category::OthersPostsTimeline,
        &["posts/other_people's_posts_to_your_timeline.json"],
        "timestamp",
    ),
    simple(
        "created_note",
        Category::CreatedNote,
        &["posts/notes.json"],
        "created_timestamp",
    ),
    simple(
        "responded_event",
        Category::RespondedEvent,
        &["events/your_event_responses.json"],
        "start_timestamp",
    ),
    simple(
        "event_invitation",
        Category::EventInvitation,
        &["events/event_invitations.json"],
        "start_timestamp",
    ),
    simple(
        "group_membership_activity",
        Category::GroupMembershipActivity,
        &["groups/your_group_membership_activity.json"],
        "timestamp",
    ),
    simple(
        "group_posts",
        Category::GroupPosts,
        &["groups/your_posts_and_comments_in_groups.json"],
        "timestamp",
    ),
    simple(
        "profile_updated",
        Category::ProfileUpdated,
        &["profile_information/profile_update_history.json"],
        "timestamp",
    ),
    simple(
        "searched",
        Category::Searched,
        &["search_history/your_search_history.json"],
        "timestamp",
    ),
    simple(
        "ad_interaction",
        Category::AdInteraction,
        &[
            "ads/advertisers_you've_interacted_with.json",
            "ads_and_businesses/advertisers_you've_interacted_with.json",
        ],
        "timestamp",
    ),
    simple(
        "poked",
        Category::Poked,
        &["other_activity/pokes.json"],
        "timestamp",
    ),
    simple(
        "voted",
        Category::Voted,
        &["other_activity/polls_you_voted_on.json"],
        "timestamp",
    ),
    simple(
        "saved_item",
        Category::SavedItem,
        &["saved_items_and_collections/saved_items_and_collections.json"],
        "timestamp",
    ),
    simple(
        "followed_sb_st",
        Category::FollowedSbSt,
        &[
            "following_and_followers/following.json",
            "friends_and_followers/following.json",
        ],
        "timestamp",
    ),
    simple(
        "addressbook_entry",
        Category::AddressbookEntry,
        &["about_you/your_address_books.json"],
        "created_timestamp",
    ),
    simple(
        "menu_clicked",
        Category::MenuClicked,
        &["about_you/menu_items.json", "other_activity/menu_items.json"],
        "timestamp",
    ),
    RegistryEntry {
        name: "own_posts",
        sources: SourceFiles::Candidates(&["posts/your_posts_1.json", "posts/your_posts.json"]),
        rule: ExtractionRule::ClassifiedPosts { field: "timestamp" },
    },
    RegistryEntry {
        name: "messages",
        sources: SourceFiles::Recursive {
            dir: "messages",
            extension: "json",
        },
        rule: ExtractionRule::SenderMatchedMessages {
            sender_field: "sender_name",
            timestamp_field: "timestamp_ms",
        },
    },
    RegistryEntry {
        name: "viewed",
        sources: SourceFiles::Candidates(&["about_you/viewed.json"]),
        rule: ExtractionRule::SectionedList {
            root_key: "viewed_things",
            sections: VIEWED_SECTIONS,
        },
    },
    RegistryEntry {
        name: "visited",
        sources: SourceFiles::Candidates(&["about_you/visited.json"]),
        rule: ExtractionRule::SectionedList {
            root_key: "visited_things",
            sections: VISITED_SECTIONS,
        },
    },
];

/// The full registry, in extraction order
pub fn registry() -> &'static [RegistryEntry] {
    REGISTRY
}

/// Look up an entry by name
pub fn entry(name: &str) -> Option<&'static RegistryEntry> {
    REGISTRY.iter().find(|e| e.name == name)
}

/// Every category the registry can produce, in table column order
pub fn registered_categories() -> Vec<Category> {
    let mut categories: Vec<Category> = REGISTRY
        .iter()
        .flat_map(|e| e.rule.categories())
        .collect();
    categories.sort();
    categories.dedup();
    categories
}
