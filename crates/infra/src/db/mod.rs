pub mod comments_repo;
pub mod migrations;
pub mod pool;
pub mod posts_repo;
pub mod replies_repo;
pub mod users_repo;

pub use comments_repo::{
    count_published_comments, daily_published_counts, delete_comment, find_comment_by_id,
    insert_comment, list_published_comments, update_comment_body, CommentRecord,
    CommentsRepoError, NewComment,
};
pub use migrations::run_migrations;
pub use pool::{connect_lazy, ping, DbPool, DbPoolError};
pub use posts_repo::{
    delete_post, find_post_by_id, insert_post, list_posts, update_post, NewPost, PostRecord,
    PostUpdate, PostsRepoError,
};
pub use replies_repo::{
    cancel_pending_for_comment, claim_due_replies, enqueue_reply, mark_reply_cancelled,
    RepliesRepoError, ReplyStatus, ScheduledReplyRecord,
};
pub use users_repo::{
    find_user_by_email, find_user_by_id, insert_user, NewUser, UserRecord, UsersRepoError,
};
