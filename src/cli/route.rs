//! CLI route: run context and the single route table.

use crate::classify::NulScan;
use crate::cli::output::exit_code_for_status;
use crate::cli::parse::Commands;
use crate::cli::presentation::{format_import_summary, format_refs, RefRow};
use crate::config::{ConfigLoader, GroveConfig};
use crate::error::GroveError;
use crate::filter::FilterRegistry;
use crate::html::Html;
use crate::mime::MimeTypes;
use crate::store::{ObjectBackend, ObjectStore, SledObjectStore, TreeImporter};
use crate::view::document::write_document;
use crate::view::{log_page, tree_page, LogRequest, Page, Query, RenderContext};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Result of one command: bytes for stdout and the process exit code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub exit_code: i32,
}

impl CommandOutput {
    fn text(text: String) -> Self {
        let mut stdout = text.into_bytes();
        stdout.push(b'\n');
        Self {
            stdout,
            exit_code: 0,
        }
    }
}

/// Runtime context for CLI execution: workspace, loaded config and store path.
pub struct RunContext {
    workspace_root: PathBuf,
    config: GroveConfig,
    store_path: PathBuf,
    head: String,
}

impl RunContext {
    /// Load configuration for the workspace (or from `config_path`) and
    /// resolve the store location. `head` defaults to the default branch.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        store_override: Option<PathBuf>,
        head: Option<String>,
    ) -> Result<Self, GroveError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::with_config(workspace_root, config, store_override, head))
    }

    /// Build from an already loaded configuration.
    pub fn with_config(
        workspace_root: PathBuf,
        config: GroveConfig,
        store_override: Option<PathBuf>,
        head: Option<String>,
    ) -> Self {
        let store_path = resolve_path(
            &workspace_root,
            store_override.as_deref().unwrap_or(&config.store.path),
        );
        let head = head.unwrap_or_else(|| config.repo.default_branch.clone());
        Self {
            workspace_root,
            config,
            store_path,
            head,
        }
    }

    pub fn config(&self) -> &GroveConfig {
        &self.config
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, GroveError> {
        let started = Instant::now();
        if !matches!(command, Commands::Config { .. }) {
            self.validate_config()?;
        }
        let result = match command {
            Commands::Import { dir, rev, message } => {
                self.handle_import(dir, rev.as_deref(), message)
            }
            Commands::Tree {
                rev,
                path,
                render,
                fragment,
                show_msg,
            } => self.handle_tree(rev.as_deref(), path.as_deref(), *render, *fragment, *show_msg),
            Commands::Log {
                rev,
                path,
                ofs,
                count,
                fragment,
                show_msg,
            } => {
                let req = LogRequest {
                    rev: rev.as_deref(),
                    path: path.as_deref(),
                    ofs: *ofs,
                    count: *count,
                };
                self.handle_log(&req, *fragment, *show_msg)
            }
            Commands::Refs { format } => self.handle_refs(format),
            Commands::Config { validate } => self.handle_config(*validate),
        };
        debug!(
            duration_ms = started.elapsed().as_millis(),
            ok = result.is_ok(),
            "Command finished"
        );
        result
    }

    fn validate_config(&self) -> Result<(), GroveError> {
        self.config.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            GroveError::ConfigError(format!("validation failed:\n{}", msgs.join("\n")))
        })
    }

    fn open_store(&self) -> Result<SledObjectStore, GroveError> {
        if let Some(parent) = self.store_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(SledObjectStore::new(&self.store_path)?)
    }

    fn handle_import(
        &self,
        dir: &Path,
        rev: Option<&str>,
        message: &str,
    ) -> Result<CommandOutput, GroveError> {
        let ref_name = rev.unwrap_or(&self.config.repo.default_branch);
        let dir = resolve_path(&self.workspace_root, dir);
        let store = self.open_store()?;
        let commit = TreeImporter::new(&dir, &store).import_commit(ref_name, message)?;
        store.flush()?;
        info!(ref_name, commit = %commit.short_hex(), "Imported directory");

        let color = std::io::stdout().is_terminal();
        Ok(CommandOutput::text(format_import_summary(
            &dir, ref_name, &commit, color,
        )))
    }

    fn handle_tree(
        &self,
        rev: Option<&str>,
        path: Option<&str>,
        use_render: bool,
        fragment: bool,
        show_msg: bool,
    ) -> Result<CommandOutput, GroveError> {
        self.render_page(fragment, show_msg, |ctx, body, page| {
            tree_page(ctx, body, page, rev, path, use_render).map(|_| ())
        })
    }

    fn handle_log(
        &self,
        req: &LogRequest<'_>,
        fragment: bool,
        show_msg: bool,
    ) -> Result<CommandOutput, GroveError> {
        self.render_page(fragment, show_msg, |ctx, body, page| {
            log_page(ctx, body, page, req).map(|_| ())
        })
    }

    /// Open the store, run one view into a page body and wrap it in a
    /// document unless only the fragment is wanted.
    fn render_page<F>(&self, fragment: bool, show_msg: bool, view: F) -> Result<CommandOutput, GroveError>
    where
        F: FnOnce(
            &RenderContext<'_, SledObjectStore>,
            &mut Html<Vec<u8>>,
            &mut Page,
        ) -> std::io::Result<()>,
    {
        let store = self.open_store()?;
        let filters = FilterRegistry::from_config(&self.config.filters);
        let mut mimetypes = MimeTypes::new(&self.config.mimetypes);
        if let Some(file) = &self.config.site.mimetype_file {
            mimetypes = mimetypes.with_mime_types_file(&resolve_path(&self.workspace_root, file));
        }
        let query = Query {
            head: self.head.clone(),
            show_msg,
        };
        let ctx = RenderContext {
            store: &store,
            site: &self.config.site,
            repo: &self.config.repo,
            filters: &filters,
            mimetypes: &mimetypes,
            classifier: &NulScan,
            query: &query,
        };

        let mut page = Page::new(self.config.repo.name.clone());
        let mut body = Html::new(Vec::new());
        view(&ctx, &mut body, &mut page)?;
        let body = body.into_inner();

        let stdout = if fragment {
            body
        } else {
            let mut document = Html::new(Vec::new());
            write_document(&mut document, &page, &body)?;
            document.into_inner()
        };
        Ok(CommandOutput {
            stdout,
            exit_code: exit_code_for_status(page.status),
        })
    }

    fn handle_refs(&self, format: &str) -> Result<CommandOutput, GroveError> {
        let store = self.open_store()?;
        let mut rows = Vec::new();
        for (name, target) in store.list_refs()? {
            let kind = store.object_info(&target).ok().map(|info| info.kind);
            rows.push(RefRow::new(name, &target, kind));
        }
        Ok(CommandOutput::text(format_refs(&rows, format)?))
    }

    fn handle_config(&self, validate: bool) -> Result<CommandOutput, GroveError> {
        if validate {
            self.validate_config()?;
            return Ok(CommandOutput::text("Configuration is valid.".to_string()));
        }
        let rendered = toml::to_string_pretty(&self.config)
            .map_err(|e| GroveError::ConfigError(format!("Failed to render config: {}", e)))?;
        Ok(CommandOutput {
            stdout: rendered.into_bytes(),
            exit_code: 0,
        })
    }
}

fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
