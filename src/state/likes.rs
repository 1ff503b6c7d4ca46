#[cfg(test)]
#[path = "likes_test.rs"]
mod likes_test;

use tracing::{debug, error};

use crate::net::api::LikesApi;
use crate::net::types::LikeAction;

/// Like counter for one subject as seen by one user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonLikes {
    subject: String,
    likes: u32,
    has_liked: bool,
}

impl LessonLikes {
    /// Fetch the count. A failed fetch is logged and reads as zero.
    pub async fn load(api: &dyn LikesApi, subject: &str, user_id: Option<i64>) -> Self {
        let (likes, has_liked) = match api.like_status(subject, user_id).await {
            Ok(status) => (status.likes, status.has_liked),
            Err(e) => {
                error!(error = %e, subject, "failed to fetch likes");
                (0, false)
            }
        };
        Self { subject: subject.to_owned(), likes, has_liked }
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn likes(&self) -> u32 {
        self.likes
    }

    #[must_use]
    pub fn has_liked(&self) -> bool {
        self.has_liked
    }

    #[must_use]
    pub fn label(&self) -> String {
        likes_label(self.likes)
    }

    /// Like or unlike, adopting the server's count.
    ///
    /// Returns `false` without a request when there is no user, and `false`
    /// with state unchanged when the request fails.
    pub async fn toggle(&mut self, api: &dyn LikesApi, user_id: Option<i64>) -> bool {
        let Some(user_id) = user_id else {
            debug!(subject = %self.subject, "like toggle ignored: signed out");
            return false;
        };
        let action = if self.has_liked { LikeAction::Unlike } else { LikeAction::Like };
        match api.toggle_like(user_id, &self.subject, action).await {
            Ok(likes) => {
                self.likes = likes;
                self.has_liked = !self.has_liked;
                true
            }
            Err(e) => {
                error!(error = %e, subject = %self.subject, %user_id, "failed to toggle like");
                false
            }
        }
    }
}

/// `"1 лайк"`, `"3 лайка"`, `"11 лайков"`.
#[must_use]
pub fn likes_label(count: u32) -> String {
    let word = match (count % 10, count % 100) {
        (_, 11..=14) => "лайков",
        (1, _) => "лайк",
        (2..=4, _) => "лайка",
        _ => "лайков",
    };
    format!("{count} {word}")
}
