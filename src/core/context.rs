use std::{
    cell::OnceCell,
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use anyhow::Result;
use rayon::prelude::*;

use crate::{
    cli::args::CommonArgs,
    config::{CONFIG_FILE_NAME, Config, load_config},
    core::{file_scanner::scan_files, frontend::TranslationUnit},
    diagnostics::{DiagnosticRegistry, Emitter},
    issues::ParseErrorIssue,
    rules::const_pow::RewriteOptions,
};

/// Parsed translation units, keyed by main file path.
pub type AllTranslationUnits = BTreeMap<String, TranslationUnit>;

/// Analysis context shared by the commands.
///
/// Files are scanned and the diagnostic is registered when the context is
/// created; translation units are parsed on first use.
pub struct CheckContext {
    /// Config file values with CLI overrides applied.
    pub config: Config,

    pub root_dir: PathBuf,

    /// Translation units to analyse, in path order.
    pub files: BTreeSet<String>,

    pub verbose: bool,

    /// Search path for quoted includes, CLI directories first.
    pub include_dirs: Vec<PathBuf>,

    rewrite_options: RewriteOptions,

    registry: DiagnosticRegistry,

    emitter: Emitter,

    units: OnceCell<AllTranslationUnits>,

    parse_errors: OnceCell<Vec<ParseErrorIssue>>,
}

impl CheckContext {
    pub fn new(common_args: &CommonArgs) -> Result<Self> {
        let verbose = common_args.verbose;
        let root_dir = common_args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        let config_result = load_config(&root_dir)?;
        if verbose && !config_result.from_file {
            eprintln!(
                "Note: No {} found, using default configuration",
                CONFIG_FILE_NAME
            );
        }
        let config = config_result.config;

        let include_dirs: Vec<PathBuf> = common_args
            .include_dirs
            .iter()
            .cloned()
            .chain(config.include_dirs.iter().map(|dir| resolve_dir(&root_dir, dir)))
            .collect();

        let scan_result = scan_files(
            &root_dir,
            &config.includes,
            &config.ignores,
            &config.extensions,
            verbose,
        );

        if scan_result.skipped_count > 0 {
            eprintln!(
                "Warning: {} path(s) skipped due to access errors{}",
                scan_result.skipped_count,
                if verbose { "" } else { " (use -v for details)" }
            );
        }

        let rewrite_options = config.rewrite_options();
        let mut registry = DiagnosticRegistry::new();
        let emitter = Emitter::new(&mut registry, rewrite_options.message());

        Ok(Self {
            config,
            root_dir,
            files: scan_result.files,
            verbose,
            include_dirs,
            rewrite_options,
            registry,
            emitter,
            units: OnceCell::new(),
            parse_errors: OnceCell::new(),
        })
    }

    /// Parse every scanned file (lazy initialization).
    ///
    /// Reading and parsing run in parallel; failures are collected as
    /// [`ParseErrorIssue`]s and available through `parse_errors()`.
    pub fn translation_units(&self) -> &AllTranslationUnits {
        self.units.get_or_init(|| {
            let include_dirs = &self.include_dirs;
            let results: Vec<_> = self
                .files
                .par_iter()
                .map(|file_path| {
                    let unit = TranslationUnit::from_file(Path::new(file_path), include_dirs);
                    (file_path.clone(), unit)
                })
                .collect();

            let mut units = BTreeMap::new();
            let mut errors = Vec::new();

            for (file_path, result) in results {
                match result {
                    Ok(unit) => {
                        tracing::debug!(
                            file = %file_path,
                            headers = unit.sources.file_count() - 1,
                            "parsed translation unit"
                        );
                        units.insert(file_path, unit);
                    }
                    Err(e) => {
                        if self.verbose {
                            eprintln!("Warning: {} - {:#}", file_path, e);
                        }
                        errors.push(ParseErrorIssue {
                            file_path,
                            error: format!("{:#}", e),
                        });
                    }
                }
            }

            let _ = self.parse_errors.set(errors);
            units
        })
    }

    /// Files that could not be read or parsed.
    pub fn parse_errors(&self) -> &Vec<ParseErrorIssue> {
        self.translation_units();
        self.parse_errors.get_or_init(Vec::new)
    }

    pub fn rewrite_options(&self) -> &RewriteOptions {
        &self.rewrite_options
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn registry(&self) -> &DiagnosticRegistry {
        &self.registry
    }
}

/// Config paths are relative to the source root.
fn resolve_dir(root_dir: &Path, dir: &str) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root_dir.join(path)
    }
}
