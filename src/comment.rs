use anyhow::Result;

use crate::github::CommentStore;
use crate::pr::RepoRef;

/// Hidden marker identifying the one comment this tool owns on a PR.
pub const COMMENT_MARKER: &str = "<!-- qa-instructions-action -->";

const FOOTER: &str = "<sub>Generated by QA Instructions Action</sub>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Created,
    Updated(u64),
}

pub fn render_comment_body(instructions: &str) -> String {
    format!("{COMMENT_MARKER}\n## QA Instructions\n\n{instructions}\n\n---\n{FOOTER}")
}

/// Replace the managed comment on the PR, or create it if there is none yet.
///
/// This is a read-then-write with no locking on GitHub's side: two runs racing
/// on the same PR can still end up with two managed comments.
pub fn post_or_update_comment(
    store: &dyn CommentStore,
    repo: &RepoRef,
    issue_number: u64,
    instructions: &str,
) -> Result<CommentAction> {
    let body = render_comment_body(instructions);

    let existing = store
        .list_comments(repo, issue_number)?
        .into_iter()
        .find(|c| c.body.as_deref().is_some_and(|b| b.contains(COMMENT_MARKER)));

    match existing {
        Some(comment) => {
            log::info!("Updating existing QA instructions comment {}", comment.id);
            store.update_comment(repo, comment.id, &body)?;
            Ok(CommentAction::Updated(comment.id))
        }
        None => {
            log::info!("Creating QA instructions comment on #{issue_number}");
            store.create_comment(repo, issue_number, &body)?;
            Ok(CommentAction::Created)
        }
    }
}
