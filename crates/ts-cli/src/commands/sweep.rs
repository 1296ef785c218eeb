//! Sweep command
//!
//! Load every comment of a video, classify them, let the operator review the
//! flagged ones and remove what is left.

use super::list::load_with_spinner;
use super::{authenticate, credentials_path, load_classifier, AppContext};
use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use ts_core::api::CommentApi;
use ts_core::comment::FlaggedSet;
use ts_core::error::ErrorKind;
use ts_core::pipeline::{Sweep, SweepState};
use ts_core::session::Session;
use ts_core::types::{CommentId, VideoId};

/// Arguments for the sweep command
#[derive(Debug, Args)]
pub struct SweepArgs {
    /// Video URL
    pub video_url: String,

    /// Ban the authors as well
    #[arg(long)]
    pub ban_author: bool,

    /// Remove every flagged comment without review
    #[arg(long, short)]
    pub yes: bool,

    /// OAuth client secret file
    #[arg(long)]
    pub credentials: Option<PathBuf>,
}

/// Operator decision on a flagged set
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decision {
    /// Comments to keep
    pub dismiss: Vec<CommentId>,
    /// Go ahead with the rest
    pub confirm: bool,
}

impl Decision {
    /// Remove everything that was flagged
    pub fn all() -> Self {
        Self {
            dismiss: Vec::new(),
            confirm: true,
        }
    }
}

/// Execute the sweep command
pub fn execute(args: SweepArgs, ctx: &AppContext) -> Result<()> {
    use colored::Colorize;

    let video_id = VideoId::from_url(&args.video_url)?;
    let Some(classifier) = load_classifier(ctx) else {
        bail!(
            "No classifier model loaded from {}",
            ctx.paths.model_file(&ctx.config).display()
        );
    };
    let credentials = credentials_path(&ctx.config, args.credentials)?;
    let api = authenticate(&ctx.config, &credentials)?;

    let comments = load_with_spinner(api.as_ref(), &video_id, ctx.config.api.page_size)?;
    if comments.is_empty() {
        println!("No comment found.");
        return Ok(());
    }
    println!("Classifying {} comment(s)...", comments.len().to_string().cyan());

    let mut session = Session::new(Some(classifier));
    session.replace_comments(comments);
    session.ban_author = args.ban_author;
    session.ai_assisted = true;

    let yes = args.yes;
    let state = run_pipeline(&session, api.as_ref(), |flagged| {
        if yes {
            Ok(Decision::all())
        } else {
            prompt_review(flagged, session.ban_author)
        }
    })?;

    finish(state)
}

/// Drive one sweep from prediction to outcome.
///
/// Returns the terminal state, or `Idle` when there was nothing to classify.
pub(crate) fn run_pipeline<R>(
    session: &Session,
    api: &dyn CommentApi,
    review: R,
) -> Result<SweepState>
where
    R: FnOnce(&FlaggedSet) -> Result<Decision>,
{
    let mut sweep = Sweep::new();
    let Some(job) = sweep.begin(session) else {
        return Ok(SweepState::Idle);
    };
    sweep.finish_prediction(job.run());

    let decision = match sweep.flagged() {
        Some(flagged) => review(flagged)?,
        None => return Ok(sweep.state().clone()),
    };

    for id in &decision.dismiss {
        sweep.dismiss(id);
    }
    if !decision.confirm {
        sweep.cancel();
    }

    if let Some(batch) = sweep.confirm(session.ban_author) {
        info!(
            "Removing {} flagged comment(s) (ban author: {})",
            batch.len(),
            if session.ban_author { "yes" } else { "no" }
        );
        sweep.finish_apply(batch.apply(api));
    }
    Ok(sweep.state().clone())
}

/// Ask which flagged comments to remove, all pre-selected
fn prompt_review(flagged: &FlaggedSet, ban_author: bool) -> Result<Decision> {
    use dialoguer::{theme::ColorfulTheme, Confirm, MultiSelect};

    let theme = ColorfulTheme::default();
    let items: Vec<String> = flagged
        .iter()
        .map(|c| {
            let text: String = c.text.split_whitespace().collect::<Vec<_>>().join(" ");
            format!("{}  {}  {}", c.id, c.author, truncate(&text, 80))
        })
        .collect();
    let defaults = vec![true; items.len()];

    let selected = MultiSelect::with_theme(&theme)
        .with_prompt("Flagged comments (space to keep one, enter to continue)")
        .items(&items)
        .defaults(&defaults)
        .interact()?;

    let dismiss: Vec<CommentId> = flagged
        .iter()
        .enumerate()
        .filter(|(i, _)| !selected.contains(i))
        .map(|(_, c)| c.id.clone())
        .collect();

    if selected.is_empty() {
        return Ok(Decision {
            dismiss,
            confirm: false,
        });
    }

    let prompt = if ban_author {
        format!("Remove {} comment(s) and ban their authors?", selected.len())
    } else {
        format!("Remove {} comment(s)?", selected.len())
    };
    let confirm = Confirm::with_theme(&theme)
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    Ok(Decision { dismiss, confirm })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Report a terminal state
fn finish(state: SweepState) -> Result<()> {
    use colored::Colorize;

    match state {
        SweepState::Idle => println!("No comment found."),
        SweepState::NoneFlagged => println!("No flagged comment to remove."),
        SweepState::Cancelled => {
            info!("Removal of flagged comments cancelled");
            println!("Removal cancelled.");
        }
        SweepState::Done { removed } => {
            info!("Removed {} comments", removed);
            println!("{} Removed {} comments", "✓".green(), removed);
        }
        SweepState::PredictionFailed { message } => bail!("AI {}", message),
        SweepState::Failed {
            applied,
            total,
            kind,
            message,
        } => {
            if kind == ErrorKind::Transport {
                bail!(
                    "Failed to remove comments: {} ({} of {} removed)",
                    message,
                    applied,
                    total
                );
            }
            bail!("{} ({} of {} removed)", message, applied, total);
        }
        other => bail!("Sweep stopped in state {}", other.name()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use ts_core::comment::{Comment, CommentSet};
    use ts_core::testing::{FakeApi, KeywordClassifier};

    fn session(keywords: &[&str]) -> Session {
        let classifier = Arc::new(KeywordClassifier::new(keywords.iter().copied()));
        let mut session = Session::new(Some(classifier));
        session.replace_comments(CommentSet::new(
            VideoId::from_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            vec![
                Comment::new("Ugx1", "@a", "great video"),
                Comment::new("Ugx2", "@b", "SLOT GACOR hari ini"),
                Comment::new("Ugx3", "@c", "main slot di sini"),
            ],
        ));
        session
    }

    fn rejected(api: &FakeApi) -> Vec<String> {
        api.moderation_calls()
            .into_iter()
            .map(|c| c.comment_id.to_string())
            .collect()
    }

    #[test]
    fn test_confirm_all() {
        let api = FakeApi::default();
        let mut session = session(&["slot"]);
        session.ban_author = true;

        let state = run_pipeline(&session, &api, |flagged| {
            assert_eq!(flagged.len(), 2);
            Ok(Decision::all())
        })
        .unwrap();

        assert!(matches!(state, SweepState::Done { removed: 2 }));
        assert_eq!(rejected(&api), vec!["Ugx2", "Ugx3"]);
        assert!(api.moderation_calls().iter().all(|c| c.ban_author));
    }

    #[test]
    fn test_dismissed_comment_is_kept() {
        let api = FakeApi::default();
        let state = run_pipeline(&session(&["slot"]), &api, |_| {
            Ok(Decision {
                dismiss: vec![CommentId::from_string("Ugx2")],
                confirm: true,
            })
        })
        .unwrap();

        assert!(matches!(state, SweepState::Done { removed: 1 }));
        assert_eq!(rejected(&api), vec!["Ugx3"]);
    }

    #[test]
    fn test_declined_review_touches_nothing() {
        let api = FakeApi::default();
        let state = run_pipeline(&session(&["slot"]), &api, |_| {
            Ok(Decision {
                dismiss: Vec::new(),
                confirm: false,
            })
        })
        .unwrap();

        assert!(matches!(state, SweepState::Cancelled));
        assert!(api.moderation_calls().is_empty());
    }

    #[test]
    fn test_nothing_flagged_skips_review() {
        let api = FakeApi::default();
        let state = run_pipeline(&session(&["casino"]), &api, |_| {
            panic!("review must not run")
        })
        .unwrap();
        assert!(matches!(state, SweepState::NoneFlagged));
    }

    #[test]
    fn test_failure_stops_batch() {
        let api = FakeApi::default().fail_moderation_at(0);
        let state = run_pipeline(&session(&["slot"]), &api, |_| Ok(Decision::all())).unwrap();

        assert_eq!(api.moderation_calls().len(), 1);
        let err = finish(state).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to remove comments: API error 403 (forbidden): The caller does not have permission (0 of 2 removed)"
        );
    }

    #[test]
    fn test_prediction_failure_message() {
        let api = FakeApi::default();
        let mut session = Session::new(Some(Arc::new(KeywordClassifier::failing("bad input"))));
        session.replace_comments(CommentSet::new(
            VideoId::from_url("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            vec![Comment::new("Ugx1", "@a", "hi")],
        ));

        let state = run_pipeline(&session, &api, |_| Ok(Decision::all())).unwrap();
        let err = finish(state).unwrap_err();
        assert_eq!(err.to_string(), "AI Prediction failed: bad input");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
