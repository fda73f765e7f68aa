//! Backend client and state for accounts, friends and profiles.

mod client;
mod friends;
mod profile;
mod types;

pub use client::{SocialClient, DEFAULT_BACKEND_URL, MAX_AVATAR_SIZE};
pub use friends::{FriendsState, FriendshipStatus};
pub use profile::{
    days_since, joined_label, search_users, ProfileError, ProfileState, DEFAULT_SEARCH_PAGE_SIZE,
};
pub use types::{
    AuthProvider, AuthResponse, ConnectionStatus, FriendRequest, RequestStatus, UpdateProfile,
    User, UserConnection, UserProfile, UserSearchResult, UserSummary,
};
