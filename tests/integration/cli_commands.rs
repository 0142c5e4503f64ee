//! Integration tests for CLI command routing

use crate::integration::test_utils::with_xdg_env;
use grove::cli::{Commands, RunContext};
use grove::config::GroveConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn workspace_with_site(test_dir: &TempDir) -> PathBuf {
    let workspace = test_dir.path().join("ws");
    let site = workspace.join("site");
    fs::create_dir_all(site.join("docs")).unwrap();
    fs::write(site.join("README.md"), "readme\n").unwrap();
    fs::write(site.join("docs/a.txt"), "a <b>\n").unwrap();
    workspace
}

fn import(ctx: &RunContext) {
    let output = ctx
        .execute(&Commands::Import {
            dir: PathBuf::from("site"),
            rev: None,
            message: "Import".to_string(),
        })
        .unwrap();
    assert_eq!(output.exit_code, 0);
}

fn tree(path: Option<&str>, render: bool, fragment: bool) -> Commands {
    Commands::Tree {
        rev: None,
        path: path.map(str::to_string),
        render,
        fragment,
        show_msg: false,
    }
}

fn stdout(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap()
}

fn context(workspace: &Path) -> RunContext {
    let mut config = GroveConfig::default();
    config.repo.name = "ws".to_string();
    config.repo.url = "ws".to_string();
    RunContext::with_config(workspace.to_path_buf(), config, None, None)
}

/// Import writes a commit that the tree command can render
#[test]
fn test_import_then_tree() {
    let test_dir = TempDir::new().unwrap();
    let workspace = workspace_with_site(&test_dir);
    let ctx = context(&workspace);

    let output = ctx
        .execute(&Commands::Import {
            dir: PathBuf::from("site"),
            rev: None,
            message: "Import".to_string(),
        })
        .unwrap();
    let summary = stdout(output.stdout);
    assert!(summary.starts_with("Imported "));
    assert_eq!(output.exit_code, 0);
    assert!(ctx.store_path().starts_with(&workspace));

    let output = ctx.execute(&tree(None, false, false)).unwrap();
    assert_eq!(output.exit_code, 0);
    let html = stdout(output.stdout);
    assert!(html.starts_with("<!DOCTYPE html>\n"));
    assert!(html.contains("<title>ws</title>"));
    assert!(html.contains("<a class='ls-blob md' href='/?url=ws/tree/README.md'>README.md</a>"));
    assert!(html.contains("<a class='ls-dir' href='/?url=ws/tree/docs'>docs</a>"));

    let output = ctx.execute(&tree(Some("docs/a.txt"), false, true)).unwrap();
    let html = stdout(output.stdout);
    assert!(html.starts_with("<div class='content'>blob: "));
    assert!(html.contains("<code>a &lt;b&gt;\n</code>"));
}

/// Missing paths exit with the not-found code and still print the error page
#[test]
fn test_tree_not_found_exit_code() {
    let test_dir = TempDir::new().unwrap();
    let workspace = workspace_with_site(&test_dir);
    let ctx = context(&workspace);
    import(&ctx);

    let output = ctx.execute(&tree(Some("nowhere"), false, false)).unwrap();
    assert_eq!(output.exit_code, 2);
    let html = stdout(output.stdout);
    assert!(html.contains("<div class='error'>Path not found</div>"));
    assert!(html.contains("<title>ws</title>"));
}

/// Refs are listed as JSON with the kind of their target
#[test]
fn test_refs_json() {
    let test_dir = TempDir::new().unwrap();
    let workspace = workspace_with_site(&test_dir);
    let ctx = context(&workspace);
    import(&ctx);

    let output = ctx
        .execute(&Commands::Refs {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["name"], "master");
    assert_eq!(parsed[0]["kind"], "commit");
}

/// An invalid configuration stops every command except `config`
#[test]
fn test_invalid_config_is_rejected() {
    let test_dir = TempDir::new().unwrap();
    let workspace = workspace_with_site(&test_dir);
    let mut config = GroveConfig::default();
    config.repo.source_filter = Some("missing".to_string());
    let ctx = RunContext::with_config(workspace, config, None, None);

    let err = ctx.execute(&tree(None, false, false)).unwrap_err();
    assert!(err.to_string().contains("source_filter 'missing'"));
    assert!(ctx.execute(&Commands::Config { validate: true }).is_err());

    let output = ctx.execute(&Commands::Config { validate: false }).unwrap();
    assert!(stdout(output.stdout).contains("source_filter = \"missing\""));
}

/// Workspace files are picked up by `RunContext::new`
#[test]
fn test_run_context_loads_workspace_config() {
    let test_dir = TempDir::new().unwrap();
    let workspace = workspace_with_site(&test_dir);
    fs::write(
        workspace.join("grove.toml"),
        "[site]\nvirtual_root = \"/git/\"\n\n[store]\npath = \"objects\"\n",
    )
    .unwrap();

    let ctx = with_xdg_env(&test_dir, || {
        RunContext::new(workspace.clone(), None, None, None).unwrap()
    });
    assert_eq!(ctx.store_path(), workspace.join("objects"));
    import(&ctx);

    let output = ctx.execute(&tree(None, false, true)).unwrap();
    assert!(stdout(output.stdout).contains("href='/git/ws/tree/README.md'"));
}

/// Render filters run as external commands
#[cfg(unix)]
#[test]
fn test_exec_render_filter() {
    let test_dir = TempDir::new().unwrap();
    let workspace = workspace_with_site(&test_dir);
    fs::write(
        workspace.join("grove.toml"),
        concat!(
            "[repo.render]\nmd = \"shout\"\n\n",
            "[filters.shout]\ncommand = \"/bin/sh\"\nargs = [\"-c\", \"tr a-z A-Z\"]\n"
        ),
    )
    .unwrap();

    let ctx = with_xdg_env(&test_dir, || {
        RunContext::new(workspace.clone(), None, None, None).unwrap()
    });
    import(&ctx);

    let output = ctx.execute(&tree(Some("README.md"), true, true)).unwrap();
    assert_eq!(output.exit_code, 0);
    assert!(stdout(output.stdout).contains("<div class='blob'>README\n</div>"));
}

/// Each import adds a commit that the log command lists, newest first
#[test]
fn test_log_after_two_imports() {
    let test_dir = TempDir::new().unwrap();
    let workspace = workspace_with_site(&test_dir);
    let ctx = context(&workspace);
    import(&ctx);
    fs::write(workspace.join("site/docs/a.txt"), "changed\n").unwrap();
    ctx.execute(&Commands::Import {
        dir: PathBuf::from("site"),
        rev: None,
        message: "Update a".to_string(),
    })
    .unwrap();

    let output = ctx
        .execute(&Commands::Log {
            rev: None,
            path: Some("docs/a.txt".to_string()),
            ofs: 0,
            count: None,
            fragment: true,
            show_msg: false,
        })
        .unwrap();
    assert_eq!(output.exit_code, 0);
    let html = stdout(output.stdout);
    assert!(html.starts_with("<div class='content'><table class='list nowrap'>"));
    assert_eq!(html.matches("<tr><td class='sha1'>").count(), 2);
    let update = html.find("<td>Update a</td>").unwrap();
    let first = html.find("<td>Import</td>").unwrap();
    assert!(update < first);
    assert!(html.contains("href='/?url=ws/tree/docs/a.txt&amp;id="));

    let output = ctx
        .execute(&Commands::Log {
            rev: Some("nope".to_string()),
            path: None,
            ofs: 0,
            count: None,
            fragment: true,
            show_msg: false,
        })
        .unwrap();
    assert_eq!(output.exit_code, 2);
    assert!(stdout(output.stdout).contains("Invalid revision name: nope"));
}
