use crate::llm::{prompts, ContextLimits};
use crate::pr::{FileContent, PrData};

/// Appended wherever a section had to be cut to fit its budget.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated]";

pub struct PromptPair {
    pub system: String,
    pub user: String,
}

pub fn qa_instructions_prompt(
    data: &PrData,
    custom_prompt: &str,
    limits: &ContextLimits,
) -> PromptPair {
    PromptPair {
        system: prompts::QA_INSTRUCTIONS.to_owned(),
        user: build_prompt_context(data, custom_prompt, limits),
    }
}

/// Cut `text` to at most `max_chars` characters, preferring the last line
/// break inside the limit, and mark the cut.
///
/// Text that already fits is returned unchanged. Lengths count `char`s so a
/// cut never lands inside a multi-byte character.
pub fn truncate_at_line_break(text: &str, max_chars: usize) -> String {
    let Some((limit, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let head = &text[..limit];
    let cut = match head.rfind('\n') {
        Some(idx) if idx > 0 => idx,
        _ => limit,
    };

    format!("{}{}", &text[..cut], TRUNCATION_MARKER)
}

/// Render the PR into one bounded block of markdown for the model.
///
/// Sections appear in a fixed order and are skipped when they have nothing
/// to show. Title, description, commits and custom instructions are never cut
/// on their own; the diff, changed files and file tree each have a budget,
/// and the joined result is capped once more at `max_total_chars`.
pub fn build_prompt_context(data: &PrData, custom_prompt: &str, limits: &ContextLimits) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push(format!("## Pull Request\n\n**Title:** {}", data.metadata.title));
    if !data.metadata.body.is_empty() {
        sections.push(format!("**Description:**\n{}", data.metadata.body));
    }

    if !data.commits.is_empty() {
        let lines = data
            .commits
            .iter()
            .map(|c| {
                let short = c.sha.chars().take(7).collect::<String>();
                format!("- {short} {}", c.message)
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("## Commits\n\n{lines}"));
    }

    if !data.diff.is_empty() {
        let diff = truncate_at_line_break(&data.diff, limits.max_diff_chars);
        sections.push(format!("## Diff\n\n```diff\n{diff}\n```"));
    }

    if !data.changed_files.is_empty() {
        sections.push(render_changed_files(data, limits));
    }

    if !data.file_tree.is_empty() {
        let tree = truncate_at_line_break(&data.file_tree.join("\n"), limits.max_file_tree_chars);
        sections.push(format!("## Repository File Tree\n\n```\n{tree}\n```"));
    }

    if !custom_prompt.is_empty() {
        sections.push(format!("## Additional Instructions\n\n{custom_prompt}"));
    }

    let result = sections.join("\n\n");

    if result.chars().count() > limits.max_total_chars {
        log::debug!(
            "Prompt context exceeds {} chars, truncating",
            limits.max_total_chars
        );
        return truncate_at_line_break(&result, limits.max_total_chars);
    }

    result
}

/// Largest files first. Once the shared budget is spent the remaining files
/// are dropped entirely rather than shown as empty blocks.
fn render_changed_files(data: &PrData, limits: &ContextLimits) -> String {
    let mut sorted: Vec<(usize, &FileContent)> = data
        .changed_files
        .iter()
        .map(|f| (f.content.chars().count(), f))
        .collect();
    // Stable, so equal sizes keep their original order.
    sorted.sort_by(|a, b| b.0.cmp(&a.0));

    let mut blocks: Vec<String> = Vec::new();
    let mut total = 0usize;

    for (_, file) in sorted {
        if total >= limits.max_changed_files_chars {
            log::debug!(
                "Changed-file budget of {} chars spent, dropping {} and smaller files",
                limits.max_changed_files_chars,
                file.filename
            );
            break;
        }

        let remaining = limits.max_changed_files_chars - total;
        let per_file = limits.max_file_chars.min(remaining);
        let content = truncate_at_line_break(&file.content, per_file);

        total += content.chars().count();
        blocks.push(format!("### {}\n\n```\n{content}\n```", file.filename));
    }

    format!("## Changed File Contents\n\n{}", blocks.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ANTHROPIC_CONTEXT_LIMITS, GITHUB_MODELS_CONTEXT_LIMITS};
    use crate::pr::{CommitInfo, FileContent, PrMetadata};

    const LIMITS: ContextLimits = ANTHROPIC_CONTEXT_LIMITS;

    fn pr_data() -> PrData {
        PrData {
            metadata: PrMetadata {
                title: "Test PR".into(),
                body: "Test body".into(),
                head_sha: "abc123".into(),
            },
            diff: "diff content".into(),
            changed_files: vec![],
            file_tree: vec![],
            commits: vec![],
        }
    }

    fn file(name: &str, content: String) -> FileContent {
        FileContent {
            filename: name.into(),
            content,
        }
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate_at_line_break("abc", 3), "abc");
        assert_eq!(truncate_at_line_break("abc\ndef", 100), "abc\ndef");
        assert_eq!(truncate_at_line_break("", 0), "");
    }

    #[test]
    fn truncate_cuts_at_last_newline() {
        let out = truncate_at_line_break("line one\nline two\nline three", 15);
        assert_eq!(out, "line one\n\n[Content truncated]");
    }

    #[test]
    fn truncate_cuts_at_limit_without_newline() {
        let out = truncate_at_line_break("abcdefghij", 4);
        assert_eq!(out, "abcd\n\n[Content truncated]");
    }

    #[test]
    fn truncate_ignores_newline_at_position_zero() {
        let out = truncate_at_line_break("\nabcdefghij", 5);
        assert_eq!(out, "\nabcd\n\n[Content truncated]");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let out = truncate_at_line_break("héllo wörld", 5);
        assert_eq!(out, "héllo\n\n[Content truncated]");
    }

    #[test]
    fn truncated_head_never_exceeds_cap() {
        let text = (0..500).map(|i| format!("row {i}")).collect::<Vec<_>>().join("\n");
        for cap in [1, 7, 64, 333, 1000] {
            let out = truncate_at_line_break(&text, cap);
            assert!(out.ends_with(TRUNCATION_MARKER));
            let head = out.strip_suffix(TRUNCATION_MARKER).unwrap();
            assert!(head.chars().count() <= cap);
            assert!(text.starts_with(head));
        }
    }

    #[test]
    fn builds_documented_example() {
        let data = PrData {
            metadata: PrMetadata {
                title: "Fix login bug".into(),
                body: String::new(),
                head_sha: "abc1234567".into(),
            },
            diff: "+fix\n-bug".into(),
            changed_files: vec![file("auth.ts", "export function login() {}".into())],
            file_tree: vec!["src/auth.ts".into()],
            commits: vec![CommitInfo {
                sha: "abc1234567".into(),
                message: "Fix login".into(),
            }],
        };

        let result = build_prompt_context(&data, "", &GITHUB_MODELS_CONTEXT_LIMITS);

        assert!(result.contains("## Pull Request"));
        assert!(result.contains("**Title:** Fix login bug"));
        assert!(!result.contains("**Description:**"));
        assert!(result.contains("## Commits\n\n- abc1234 Fix login"));
        assert!(result.contains("## Diff\n\n```diff\n+fix\n-bug\n```"));
        assert!(result.contains("## Changed File Contents"));
        assert!(result.contains("### auth.ts\n\n```\nexport function login() {}\n```"));
        assert!(result.contains("## Repository File Tree\n\n```\nsrc/auth.ts\n```"));
        assert!(!result.contains("## Additional Instructions"));
        assert!(!result.contains("[Content truncated]"));
    }

    #[test]
    fn includes_title_and_description() {
        let result = build_prompt_context(&pr_data(), "", &LIMITS);
        assert!(result.starts_with("## Pull Request\n\n**Title:** Test PR"));
        assert!(result.contains("**Description:**\nTest body"));
    }

    #[test]
    fn includes_commits_with_short_sha() {
        let mut data = pr_data();
        data.commits = vec![
            CommitInfo {
                sha: "abcdef1234567".into(),
                message: "Initial commit".into(),
            },
            CommitInfo {
                sha: "1234567abcdef".into(),
                message: "Fix bug".into(),
            },
        ];
        let result = build_prompt_context(&data, "", &LIMITS);
        assert!(result.contains("## Commits\n\n- abcdef1 Initial commit\n- 1234567 Fix bug"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let mut data = pr_data();
        data.metadata.body.clear();
        data.diff.clear();

        let result = build_prompt_context(&data, "", &LIMITS);

        assert_eq!(result, "## Pull Request\n\n**Title:** Test PR");
        for header in [
            "**Description:**",
            "## Commits",
            "## Diff",
            "## Changed File Contents",
            "## Repository File Tree",
            "## Additional Instructions",
        ] {
            assert!(!result.contains(header), "unexpected {header}");
        }
    }

    #[test]
    fn truncates_long_diff() {
        let mut data = pr_data();
        data.diff = (0..10_000).map(|i| format!("+line {i}")).collect::<Vec<_>>().join("\n");
        assert!(data.diff.len() > LIMITS.max_diff_chars);

        let result = build_prompt_context(&data, "", &LIMITS);
        assert!(result.contains("[Content truncated]\n```"));
        assert!(result.contains("+line 0\n"));
        assert!(!result.contains("+line 9999"));
    }

    #[test]
    fn orders_changed_files_largest_first() {
        let mut data = pr_data();
        data.changed_files = vec![
            file("small.ts", "small".into()),
            file("big.ts", "x".repeat(500)),
            file("medium.ts", "y".repeat(50)),
        ];
        let result = build_prompt_context(&data, "", &LIMITS);

        let big = result.find("### big.ts").unwrap();
        let medium = result.find("### medium.ts").unwrap();
        let small = result.find("### small.ts").unwrap();
        assert!(big < medium && medium < small);
    }

    #[test]
    fn equal_sized_files_keep_their_order() {
        let mut data = pr_data();
        data.changed_files = vec![
            file("first.ts", "aaaa".into()),
            file("second.ts", "bbbb".into()),
            file("third.ts", "cccc".into()),
        ];
        let result = build_prompt_context(&data, "", &LIMITS);

        let first = result.find("### first.ts").unwrap();
        let second = result.find("### second.ts").unwrap();
        let third = result.find("### third.ts").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn truncates_file_over_per_file_cap() {
        let mut data = pr_data();
        data.changed_files = vec![file(
            "huge.ts",
            (0..2000).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n"),
        )];
        assert!(data.changed_files[0].content.len() > LIMITS.max_file_chars);

        let result = build_prompt_context(&data, "", &LIMITS);
        assert!(result.contains("### huge.ts"));
        assert!(result.contains("[Content truncated]"));
    }

    #[test]
    fn stops_adding_files_once_budget_is_spent() {
        let mut data = pr_data();
        data.changed_files = (0..20)
            .map(|i| file(&format!("file{i}.ts"), "x".repeat(LIMITS.max_file_chars - 100)))
            .collect();

        let result = build_prompt_context(&data, "", &LIMITS);
        let included = result.matches("### file").count();

        assert!(included > 0);
        assert!(included < 20);
    }

    #[test]
    fn single_oversized_file_consumes_whole_budget() {
        let limits = ContextLimits {
            max_diff_chars: 1_000,
            max_changed_files_chars: 100,
            max_file_chars: 500,
            max_file_tree_chars: 1_000,
            max_total_chars: 10_000,
        };
        let mut data = pr_data();
        data.changed_files = vec![
            file("big.ts", "b".repeat(300)),
            file("small.ts", "s".repeat(10)),
        ];

        let result = build_prompt_context(&data, "", &limits);

        assert!(result.contains(&format!("### big.ts\n\n```\n{}{TRUNCATION_MARKER}\n```", "b".repeat(100))));
        assert!(!result.contains("### small.ts"));
    }

    #[test]
    fn later_files_get_remaining_budget() {
        let limits = ContextLimits {
            max_diff_chars: 1_000,
            max_changed_files_chars: 100,
            max_file_chars: 80,
            max_file_tree_chars: 1_000,
            max_total_chars: 10_000,
        };
        let mut data = pr_data();
        data.changed_files = vec![
            file("a.ts", "a".repeat(60)),
            file("b.ts", "b".repeat(50)),
        ];

        let result = build_prompt_context(&data, "", &limits);

        assert!(result.contains(&format!("### a.ts\n\n```\n{}\n```", "a".repeat(60))));
        assert!(result.contains(&format!("### b.ts\n\n```\n{}{TRUNCATION_MARKER}\n```", "b".repeat(40))));
    }

    #[test]
    fn includes_file_tree() {
        let mut data = pr_data();
        data.file_tree = vec!["src/index.ts".into(), "src/utils.ts".into(), "package.json".into()];
        let result = build_prompt_context(&data, "", &LIMITS);
        assert!(result.contains("## Repository File Tree\n\n```\nsrc/index.ts\nsrc/utils.ts\npackage.json\n```"));
    }

    #[test]
    fn custom_prompt_goes_last() {
        let mut data = pr_data();
        data.file_tree = vec!["src/index.ts".into()];
        let result = build_prompt_context(&data, "Focus on accessibility testing", &LIMITS);
        assert!(result.ends_with("## Additional Instructions\n\nFocus on accessibility testing"));
    }

    #[test]
    fn caps_overall_length() {
        let mut data = pr_data();
        data.diff = "x".repeat(80_000);
        data.changed_files = vec![file("big.ts", "y".repeat(60_000))];
        data.file_tree = (0..5000).map(|i| format!("path/{i}.ts")).collect();

        let limits = ContextLimits {
            max_diff_chars: 1_000,
            max_changed_files_chars: 1_000,
            max_file_chars: 1_000,
            max_file_tree_chars: 1_000,
            max_total_chars: 500,
        };
        let result = build_prompt_context(&data, "", &limits);

        assert!(result.ends_with(TRUNCATION_MARKER));
        assert!(result.chars().count() <= limits.max_total_chars + TRUNCATION_MARKER.len());
        // Later sections fall off the end entirely.
        assert!(!result.contains("## Repository File Tree"));
    }

    #[test]
    fn qa_prompt_pairs_system_and_context() {
        let prompts = qa_instructions_prompt(&pr_data(), "", &LIMITS);
        assert_eq!(prompts.system, prompts::QA_INSTRUCTIONS);
        assert_eq!(prompts.user, build_prompt_context(&pr_data(), "", &LIMITS));
    }
}
