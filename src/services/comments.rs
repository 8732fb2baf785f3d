//! Comments: free-text feedback any signed-in user can read; only the author
//! may delete one.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{Comment, CommentId, NewComment, User, UserId};
use crate::AppState;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Author {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<User> for Author {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

/// A comment with its author resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CommentEntry {
    pub id: CommentId,
    pub user: Author,
    pub text: String,
}

async fn author(state: &AppState, user_id: UserId) -> AppResult<Author> {
    state
        .store
        .user(user_id)
        .await?
        .map(Author::from)
        .ok_or_else(|| AppError::not_found("user", user_id))
}

async fn entry(state: &AppState, comment: Comment) -> AppResult<CommentEntry> {
    Ok(CommentEntry {
        id: comment.id,
        user: author(state, comment.user_id).await?,
        text: comment.text,
    })
}

/// Stores `text` authored by `caller`.
pub async fn create_comment(state: &AppState, caller: UserId, text: &str) -> AppResult<CommentEntry> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("comment text must not be empty".to_string()));
    }
    let comment = state
        .store
        .create_comment(NewComment {
            user_id: caller,
            text: text.to_string(),
        })
        .await?;
    info!(comment_id = comment.id, user_id = caller, "comment posted");
    entry(state, comment).await
}

pub async fn get_comment(state: &AppState, comment_id: CommentId) -> AppResult<CommentEntry> {
    let comment = state.store.comment(comment_id).await?;
    entry(state, comment).await
}

pub async fn list_comments(state: &AppState) -> AppResult<Vec<CommentEntry>> {
    let comments = state.store.comments().await?;
    let mut authors: BTreeMap<UserId, Author> = BTreeMap::new();
    let mut entries = Vec::with_capacity(comments.len());
    for comment in comments {
        let user = match authors.get(&comment.user_id) {
            Some(user) => user.clone(),
            None => {
                let user = author(state, comment.user_id).await?;
                authors.insert(comment.user_id, user.clone());
                user
            }
        };
        entries.push(CommentEntry {
            id: comment.id,
            user,
            text: comment.text,
        });
    }
    Ok(entries)
}

pub async fn delete_comment(state: &AppState, caller: UserId, comment_id: CommentId) -> AppResult<()> {
    let comment = state.store.comment(comment_id).await?;
    if comment.user_id != caller {
        warn!(comment_id, caller, "delete of another user's comment refused");
        return Err(AppError::Forbidden(
            "you cannot delete another user's comment".to_string(),
        ));
    }
    state.store.delete_comment(comment_id).await?;
    info!(comment_id, "comment deleted");
    Ok(())
}
