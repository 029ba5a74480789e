use anyhow::{anyhow, Context, Result};
use indicatif::ProgressBar;
use std::thread::{self, ScopedJoinHandle};
use std::time::Duration;

use crate::comment::{post_or_update_comment, CommentAction};
use crate::github::{CommentStore, PullRequestSource};
use crate::llm::prompt_builder::qa_instructions_prompt;
use crate::llm::{ContextLimits, LlmClient};
use crate::pr::{PrData, RepoRef};

/// What a single run operates on.
pub struct RunContext<'a> {
    pub repo: &'a RepoRef,
    pub pr_number: u64,
    pub custom_prompt: &'a str,
    pub limits: ContextLimits,
    pub dry_run: bool,
}

/// Fetch → assemble → generate → comment. Returns the generated instructions.
pub fn run(
    ctx: &RunContext<'_>,
    source: &dyn PullRequestSource,
    comments: &dyn CommentStore,
    llm: &dyn LlmClient,
) -> Result<String> {
    log::info!("Fetching data for {}#{}", ctx.repo, ctx.pr_number);
    let data = fetch_pr_data(source, ctx.repo, ctx.pr_number)?;
    log::info!(
        "Fetched {} changed file(s), {} commit(s), {} tree entries, {} chars of diff",
        data.changed_files.len(),
        data.commits.len(),
        data.file_tree.len(),
        data.diff.chars().count()
    );

    let prompts = qa_instructions_prompt(&data, ctx.custom_prompt, &ctx.limits);
    log::info!("Prompt context is {} chars", prompts.user.chars().count());
    log::trace!("Prompt context:\n{}", prompts.user);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Generating QA instructions...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    let generated = llm.generate_qa_instructions(&prompts.system, &prompts.user);
    spinner.finish_and_clear();
    let instructions = generated.context("failed to generate QA instructions")?;

    if ctx.dry_run {
        log::info!("Dry run: not commenting on #{}", ctx.pr_number);
        return Ok(instructions);
    }

    match post_or_update_comment(comments, ctx.repo, ctx.pr_number, &instructions)? {
        CommentAction::Created => log::info!("Posted QA instructions"),
        CommentAction::Updated(id) => log::info!("Updated QA instructions comment {id}"),
    }

    Ok(instructions)
}

/// Metadata first (the head commit drives the other lookups), then the
/// remaining four fetches in parallel.
pub fn fetch_pr_data(source: &dyn PullRequestSource, repo: &RepoRef, number: u64) -> Result<PrData> {
    let metadata = source.get_metadata(repo, number)?;
    let head_sha = metadata.head_sha.as_str();

    thread::scope(|s| {
        let diff = s.spawn(|| source.get_diff(repo, number));
        let files = s.spawn(|| source.get_changed_files(repo, number, head_sha));
        let tree = s.spawn(|| source.get_file_tree(repo, head_sha));
        let commits = s.spawn(|| source.get_commits(repo, number));

        Ok(PrData {
            diff: join(diff, "diff")?,
            changed_files: join(files, "changed files")?,
            file_tree: join(tree, "file tree")?,
            commits: join(commits, "commits")?,
            metadata: metadata.clone(),
        })
    })
}

fn join<T>(handle: ScopedJoinHandle<'_, Result<T>>, what: &str) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow!("fetching {what} panicked"))?
}
