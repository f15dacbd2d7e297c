//! Authorization policy
//!
//! A single decision function gates every handler: given an action, the
//! acting user (if any), and the owning user of the target entity (if any),
//! it answers with one of three outcomes. `MustAuthenticate` and `Forbidden`
//! are distinct so callers can redirect anonymous visitors to login while
//! telling authenticated-but-unauthorized users "no".

use quill_core::{User, UserId};
use serde::{Deserialize, Serialize};

/// Actions a request can attempt
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    CreatePost,
    EditPost,
    DeletePost,
    CreateComment,
    DeleteComment,
    ViewPost,
    ListPosts,
    ViewProfile,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::CreatePost => write!(f, "create_post"),
            Action::EditPost => write!(f, "edit_post"),
            Action::DeletePost => write!(f, "delete_post"),
            Action::CreateComment => write!(f, "create_comment"),
            Action::DeleteComment => write!(f, "delete_comment"),
            Action::ViewPost => write!(f, "view_post"),
            Action::ListPosts => write!(f, "list_posts"),
            Action::ViewProfile => write!(f, "view_profile"),
        }
    }
}

/// Policy mode determines how mutations of existing entities are gated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicyMode {
    /// Pre-hardening behavior: any authenticated user may edit or delete any
    /// post or comment
    Legacy,
    /// Hardened default: edit/delete requires the actor to be the entity's
    /// author, or an admin
    OwnerOnly,
}

impl std::fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyMode::Legacy => write!(f, "legacy"),
            PolicyMode::OwnerOnly => write!(f, "owner_only"),
        }
    }
}

impl std::str::FromStr for PolicyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(PolicyMode::Legacy),
            "owner_only" | "owner-only" | "owner" => Ok(PolicyMode::OwnerOnly),
            _ => Err(format!("Unknown policy mode: {}", s)),
        }
    }
}

/// Outcome of a policy decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Granted,
    /// The action requires a logged-in actor and none was presented
    MustAuthenticate,
    /// The actor is authenticated but not permitted to touch this target
    Forbidden,
}

/// The access policy applied to every request
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    mode: PolicyMode,
}

impl AccessPolicy {
    pub fn new(mode: PolicyMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    /// Decide whether `actor` may perform `action` against a target owned by
    /// `owner`
    ///
    /// `owner` is only consulted for edit/delete actions; creation and view
    /// actions ignore it.
    pub fn decide(&self, action: Action, actor: Option<&User>, owner: Option<UserId>) -> Decision {
        match action {
            Action::ViewPost | Action::ListPosts | Action::ViewProfile => Decision::Granted,

            Action::CreatePost | Action::CreateComment => match actor {
                Some(_) => Decision::Granted,
                None => Decision::MustAuthenticate,
            },

            Action::EditPost | Action::DeletePost | Action::DeleteComment => match actor {
                None => Decision::MustAuthenticate,
                Some(user) => match self.mode {
                    PolicyMode::Legacy => Decision::Granted,
                    PolicyMode::OwnerOnly => {
                        if user.is_admin || owner == Some(user.id) {
                            Decision::Granted
                        } else {
                            Decision::Forbidden
                        }
                    }
                },
            },
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(PolicyMode::OwnerOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: UserId, is_admin: bool) -> User {
        User {
            id,
            name: format!("user-{}", id),
            email: format!("user{}@example.com", id),
            password_hash: String::new(),
            is_admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn view_actions_are_open_to_anyone() {
        let policy = AccessPolicy::default();
        for action in [Action::ViewPost, Action::ListPosts, Action::ViewProfile] {
            assert_eq!(policy.decide(action, None, None), Decision::Granted);
        }
    }

    #[test]
    fn anonymous_mutation_requires_authentication() {
        let policy = AccessPolicy::default();
        for action in [
            Action::CreatePost,
            Action::EditPost,
            Action::DeletePost,
            Action::CreateComment,
            Action::DeleteComment,
        ] {
            assert_eq!(policy.decide(action, None, Some(1)), Decision::MustAuthenticate);
        }
    }

    #[test]
    fn owner_only_mode_rejects_non_owners() {
        // user 2 may not edit user 1's post
        let policy = AccessPolicy::new(PolicyMode::OwnerOnly);
        let owner = user(1, false);
        let other = user(2, false);

        assert_eq!(
            policy.decide(Action::EditPost, Some(&owner), Some(1)),
            Decision::Granted
        );
        assert_eq!(
            policy.decide(Action::EditPost, Some(&other), Some(1)),
            Decision::Forbidden
        );
        assert_eq!(
            policy.decide(Action::DeleteComment, Some(&other), Some(1)),
            Decision::Forbidden
        );
    }

    #[test]
    fn legacy_mode_skips_ownership_checks() {
        // Legacy deployments let any authenticated user mutate any entity
        let policy = AccessPolicy::new(PolicyMode::Legacy);
        let other = user(2, false);

        assert_eq!(
            policy.decide(Action::EditPost, Some(&other), Some(1)),
            Decision::Granted
        );
        assert_eq!(
            policy.decide(Action::DeletePost, Some(&other), Some(1)),
            Decision::Granted
        );
    }

    #[test]
    fn admins_pass_the_ownership_check() {
        let policy = AccessPolicy::new(PolicyMode::OwnerOnly);
        let admin = user(3, true);

        assert_eq!(
            policy.decide(Action::DeletePost, Some(&admin), Some(1)),
            Decision::Granted
        );
    }

    #[test]
    fn mode_parses_from_config_strings() {
        assert_eq!("legacy".parse::<PolicyMode>().unwrap(), PolicyMode::Legacy);
        assert_eq!("owner_only".parse::<PolicyMode>().unwrap(), PolicyMode::OwnerOnly);
        assert!("open".parse::<PolicyMode>().is_err());
    }
}
