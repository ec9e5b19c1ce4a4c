//! The engine (spec §9): the single owning value that replaces the
//! original program's global mutable state, holding configuration, the
//! context stack, and the running pipeline.

use crate::cli::Cli;
use crate::config::{self, ConfigFile, FilterSet};
use crate::context::ContextStack;
use crate::error::{AppError, PatternResult};
use crate::matcher::{MatchMode, Matcher};
use crate::pipeline::{self, PipelineHandle};
use crate::subsearch;
use std::sync::Arc;

/// Resolves the root search's effective pattern text and match mode from
/// the CLI flags. `-e` and `-i` compose: a case-insensitive regex search
/// compiles the user's pattern with a `(?i)` prefix rather than needing a
/// fourth [`MatchMode`] variant.
fn resolve_mode(cli: &Cli) -> (String, MatchMode) {
    if cli.regex {
        let pattern = if cli.insensitive {
            format!("(?i){}", cli.pattern)
        } else {
            cli.pattern.clone()
        };
        (pattern, MatchMode::Regex)
    } else if cli.insensitive {
        (cli.pattern.clone(), MatchMode::LiteralCaseInsensitive)
    } else {
        (cli.pattern.clone(), MatchMode::LiteralCaseSensitive)
    }
}

/// Compiles the root matcher once per call; invoked twice at startup
/// since the root [`SearchContext`](crate::context::SearchContext) and
/// the pipeline each need their own owned [`Matcher`].
fn build_root_matcher(cli: &Cli) -> PatternResult<(Matcher, MatchMode)> {
    let (pattern, mode) = resolve_mode(cli);
    Ok((Matcher::compile(&pattern, mode)?, mode))
}

/// Owns configuration, the context stack, and the pipeline for one run.
pub struct Engine {
    pub filters: FilterSet,
    pub editor_template: String,
    pub contexts: ContextStack,
    pipeline: Option<PipelineHandle>,
}

impl Engine {
    /// Builds the engine from parsed CLI flags and a loaded config file,
    /// and starts the root search pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if the root pattern fails to compile or an
    /// excluded directory cannot be resolved.
    pub fn start(cli: &Cli, config_file: &ConfigFile) -> Result<Self, AppError> {
        let (matcher, mode) = build_root_matcher(cli)?;
        let filters = config::build_filter_set(cli, config_file)?;
        let root = cli.root();

        let root_context =
            crate::context::SearchContext::new(cli.pattern.clone(), mode, matcher, root.clone());
        let (pipeline_matcher, _) = build_root_matcher(cli)?;
        let matcher_for_pipeline = Arc::new(pipeline_matcher);
        let store = Arc::clone(&root_context.store);

        let pipeline = pipeline::spawn(
            root,
            matcher_for_pipeline,
            Arc::new(filters.clone()),
            store,
        );

        Ok(Self {
            filters,
            editor_template: config_file.editor_template.clone(),
            contexts: ContextStack::new(root_context),
            pipeline: Some(pipeline),
        })
    }

    #[must_use]
    pub fn active(&self) -> &crate::context::SearchContext {
        self.contexts.active()
    }

    /// Runs a subsearch over the active context's store and pushes it,
    /// making it the new active context (spec §4.G, §4.F).
    ///
    /// # Errors
    ///
    /// Returns the pattern compile error without altering the context
    /// stack.
    pub fn subsearch(&mut self, pattern: &str) -> PatternResult<()> {
        let child = subsearch::subsearch(self.contexts.active(), pattern)?;
        self.contexts.push(child);
        Ok(())
    }

    /// Pops the active context. Returns `false` when already at the root.
    pub fn pop_context(&mut self) -> bool {
        self.contexts.pop()
    }

    /// Blocks until the root pipeline's threads have all exited. A no-op
    /// if called twice.
    ///
    /// # Errors
    ///
    /// Propagates a worker panic as [`AppError::Pipeline`].
    pub fn shutdown(&mut self) -> Result<(), AppError> {
        if let Some(handle) = self.pipeline.take() {
            handle.join().map_err(AppError::Pipeline)?;
        }
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // Best-effort: a panicked worker at shutdown is not worth
        // escalating once the UI has already torn down.
        let _ = self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn config() -> ConfigFile {
        ConfigFile {
            editor_template: "vim +{line} {file}".to_string(),
            extensions: std::collections::HashSet::from([".c".to_string()]),
            specifics: std::collections::HashSet::new(),
        }
    }

    #[test]
    fn start_runs_the_pipeline_to_completion_and_populates_the_root_store() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.c"), "hello\nworld\n").unwrap();

        let cli = Cli::parse_from(["ngrip", "hello", dir.path().to_str().unwrap()]);
        let mut engine = Engine::start(&cli, &config()).unwrap();
        engine.shutdown().unwrap();

        assert_eq!(engine.active().store.match_count(), 1);
        assert!(engine.contexts.is_root());
    }

    #[test]
    fn subsearch_pushes_a_new_active_context() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.c"), "hello world\nhello there\n").unwrap();

        let cli = Cli::parse_from(["ngrip", "hello", dir.path().to_str().unwrap()]);
        let mut engine = Engine::start(&cli, &config()).unwrap();
        engine.shutdown().unwrap();

        engine.subsearch("world").unwrap();
        assert_eq!(engine.contexts.depth(), 2);
        assert_eq!(engine.active().store.match_count(), 1);

        assert!(engine.pop_context());
        assert_eq!(engine.contexts.depth(), 1);
    }
}
