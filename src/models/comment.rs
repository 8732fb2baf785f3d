use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{CommentId, UserId};

/// Free-text feedback left by a registered user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub user_id: UserId,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: UserId,
    pub text: String,
}
