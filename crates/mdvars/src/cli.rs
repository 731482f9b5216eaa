//! CLI command definitions and handlers

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mdvars::{Processor, Server, VariableStore};
use mdvars_core::{Config, Paths};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// mdvars - Variable expansion for Markdown documents
#[derive(Parser)]
#[command(name = "mdvars")]
#[command(version)]
#[command(about = "Expand {{name}} placeholders in Markdown and text documents")]
#[command(after_help = r#"DOCUMENT VARIABLES:
    Declare variables on a line of their own inside the document:
    <!-- @var title: Release notes -->
    Declarations are removed from the output and override globals.

GLOBAL VARIABLES:
    Stored in $MDVARS_DATA_DIR/globals.yaml (default ~/.local/share/mdvars):
    variables:
      - name: author
        value: Jane Doe

EXAMPLES:
    mdvars set author "Jane Doe"
    mdvars process notes.md -o notes.out.md
    cat notes.md | mdvars process
    mdvars load team.yaml
    mdvars export -o backup.yaml
    mdvars check notes.md
    mdvars serve                            # JSON-RPC over stdio
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Expand placeholders in a document
    Process {
        /// Document to process (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set a global variable
    Set {
        /// Variable name
        name: String,

        /// Variable value
        value: String,
    },

    /// Print a global variable
    Get {
        /// Variable name
        name: String,
    },

    /// Remove a global variable
    Unset {
        /// Variable name
        name: String,
    },

    /// List global variables
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge global variables from a YAML file
    Load {
        /// YAML variables document
        file: PathBuf,
    },

    /// Export global variables as YAML
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report placeholders that would be left unexpanded
    Check {
        /// Document to check (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Serve the variable operations as JSON-RPC over stdio
    Serve,
}

/// Everything a command needs: locations, settings and the global store
pub struct App {
    pub paths: Paths,
    pub config: Config,
    pub store: Arc<VariableStore>,
}

impl App {
    /// Load configuration and the persisted global variables
    pub fn load(paths: Paths) -> Result<Self> {
        let config = Config::load(&paths.config_file())?;

        let store = Arc::new(VariableStore::new());
        let globals_file = paths.globals_file();
        let count = store
            .load_file(&globals_file)
            .with_context(|| format!("Failed to load globals: {}", globals_file.display()))?;
        debug!("Loaded {} globals from {}", count, globals_file.display());

        Ok(Self {
            paths,
            config,
            store,
        })
    }

    fn save(&self) -> Result<()> {
        if !self.config.persist_globals {
            return Ok(());
        }
        let globals_file = self.paths.globals_file();
        self.store
            .save_file(&globals_file)
            .with_context(|| format!("Failed to save globals: {}", globals_file.display()))
    }
}

/// Read a document from a file or stdin, enforcing type and size limits
pub fn read_document(file: Option<&Path>, config: &Config) -> Result<String> {
    let Some(path) = file else {
        return read_limited(std::io::stdin().lock(), config.max_document_bytes)
            .context("Failed to read stdin");
    };

    check_extension(path, config)?;

    let metadata = std::fs::metadata(path)
        .with_context(|| format!("File not found: {}", path.display()))?;
    if metadata.len() > config.max_document_bytes {
        bail!(
            "File too large: {} ({} bytes, max {})",
            path.display(),
            metadata.len(),
            config.max_document_bytes
        );
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display()))
}

/// Read at most `max` bytes of UTF-8 text, failing if the reader holds more
fn read_limited(reader: impl Read, max: u64) -> Result<String> {
    let mut content = String::new();
    reader
        .take(max.saturating_add(1))
        .read_to_string(&mut content)?;
    if content.len() as u64 > max {
        bail!("Input too large (max {} bytes)", max);
    }
    Ok(content)
}

fn check_extension(path: &Path, config: &Config) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if !config.allows_extension(ext) {
        bail!(
            "Unsupported file type: {}\nAllowed extensions: {}",
            path.display(),
            config.allowed_extensions.join(", ")
        );
    }
    Ok(())
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

pub fn cmd_process(app: &App, file: Option<&Path>, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        check_extension(path, &app.config)?;
    }
    let content = read_document(file, &app.config)?;
    let processor = Processor::new(Arc::clone(&app.store));
    write_output(output, &processor.process(&content))
}

pub fn cmd_set(app: &App, name: &str, value: &str) -> Result<()> {
    app.store.set(name, value);
    app.save()?;
    println!("success: Set {}", name);
    Ok(())
}

pub fn cmd_get(app: &App, name: &str) -> Result<()> {
    match app.store.get(name) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => bail!("Variable not found: {}", name),
    }
}

pub fn cmd_unset(app: &App, name: &str) -> Result<()> {
    if app.store.remove(name).is_none() {
        bail!("Variable not found: {}", name);
    }
    app.save()?;
    println!("success: Removed {}", name);
    Ok(())
}

pub fn cmd_list(app: &App, json: bool) -> Result<()> {
    let vars = app.store.get_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&vars)?);
        return Ok(());
    }

    if vars.is_empty() {
        println!("\x1b[2mNo global variables. Add one with: mdvars set NAME VALUE\x1b[0m");
        return Ok(());
    }

    let mut entries: Vec<_> = vars.into_iter().collect();
    entries.sort();

    println!("\x1b[1mGlobal Variables\x1b[0m");
    println!();
    for (name, value) in entries {
        println!("  \x1b[32m{}\x1b[0m = {}", name, value);
    }

    Ok(())
}

pub fn cmd_load(app: &App, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read: {}", file.display()))?;
    let count = app
        .store
        .load_yaml(&text)
        .with_context(|| format!("Failed to load variables from {}", file.display()))?;
    app.save()?;
    println!("success: Loaded {} variables", count);
    Ok(())
}

pub fn cmd_export(app: &App, output: Option<&Path>) -> Result<()> {
    let yaml = app.store.export_yaml().context("Failed to export variables")?;
    write_output(output, &yaml)
}

/// Returns whether every placeholder resolves
pub fn cmd_check(app: &App, file: Option<&Path>) -> Result<bool> {
    let content = read_document(file, &app.config)?;
    let processor = Processor::new(Arc::clone(&app.store));

    let used = Processor::placeholders(&content);
    let unresolved = processor.unresolved(&content);

    if unresolved.is_empty() {
        println!("success: All {} placeholders resolve", used.len());
        return Ok(true);
    }

    println!("\x1b[33mUnresolved placeholders:\x1b[0m");
    for name in &unresolved {
        println!("  {{{{{}}}}}", name);
    }
    Ok(false)
}

pub async fn cmd_serve(app: &App) -> Result<()> {
    info!("Starting mdvars server");

    let mut server = Server::new(Arc::clone(&app.store));
    if app.config.persist_globals {
        server = server.with_globals_file(app.paths.globals_file());
    }
    server.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parsing() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_read_document_rejects_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "{{x}}").unwrap();

        let err = read_document(Some(path.as_path()), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[test]
    fn test_read_document_rejects_large_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.md");
        std::fs::write(&path, "0123456789").unwrap();

        let config = Config {
            max_document_bytes: 5,
            ..Config::default()
        };
        let err = read_document(Some(path.as_path()), &config).unwrap_err();
        assert!(err.to_string().contains("File too large"));
    }

    #[test]
    fn test_read_limited() {
        assert_eq!(read_limited("12345".as_bytes(), 5).unwrap(), "12345");

        let err = read_limited("123456".as_bytes(), 5).unwrap_err();
        assert!(err.to_string().contains("Input too large"));
    }

    #[test]
    fn test_process_rejects_output_extension() {
        let dir = TempDir::new().unwrap();
        let app = App::load(Paths::with_root(dir.path())).unwrap();

        let input = dir.path().join("doc.md");
        let output = dir.path().join("doc.html");
        std::fs::write(&input, "text").unwrap();

        let err = cmd_process(&app, Some(input.as_path()), Some(output.as_path())).unwrap_err();
        assert!(err.to_string().contains("Unsupported file type"));
        assert!(!output.exists());
    }

    #[test]
    fn test_read_document_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_document(Some(dir.path().join("none.md").as_path()), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_set_persists_globals() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::with_root(dir.path());

        let app = App::load(paths.clone()).unwrap();
        cmd_set(&app, "author", "Jane").unwrap();

        let reloaded = App::load(paths).unwrap();
        assert_eq!(reloaded.store.get("author"), Some("Jane".to_string()));
    }

    #[test]
    fn test_process_to_file() {
        let dir = TempDir::new().unwrap();
        let app = App::load(Paths::with_root(dir.path())).unwrap();
        app.store.set("name", "World");

        let input = dir.path().join("doc.md");
        let output = dir.path().join("out/doc.md");
        std::fs::write(&input, "<!-- @var greeting: Hello -->\n{{greeting}}, {{name}}!").unwrap();

        cmd_process(&app, Some(input.as_path()), Some(output.as_path())).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_check_reports_unresolved() {
        let dir = TempDir::new().unwrap();
        let app = App::load(Paths::with_root(dir.path())).unwrap();

        let doc = dir.path().join("doc.md");
        std::fs::write(&doc, "{{missing}}").unwrap();
        assert!(!cmd_check(&app, Some(doc.as_path())).unwrap());

        app.store.set("missing", "found");
        assert!(cmd_check(&app, Some(doc.as_path())).unwrap());
    }

    #[test]
    fn test_unset_missing_fails() {
        let dir = TempDir::new().unwrap();
        let app = App::load(Paths::with_root(dir.path())).unwrap();
        assert!(cmd_unset(&app, "nope").is_err());
    }
}
