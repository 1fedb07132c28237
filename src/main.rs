//! basirah CLI: tafsir, reflections, and topic search from the terminal.

use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use basirah::catalog::{Author, Language};
use basirah::client::TafsirClient;
use basirah::config::BasirahConfig;
use basirah::error::BasirahError;
use basirah::paths::BasirahPaths;
use basirah::reference::ReferenceData;
use basirah::render::{Block, JsonSink, OutputSink, StdoutSink};
use basirah::session::Session;
use basirah::view::{
    ReflectionForm, Submission, TafsirForm, TopicForm, ViewController, submit_reflection,
    submit_tafsir, submit_topic,
};

#[derive(Parser)]
#[command(
    name = "basirah",
    version,
    about = "Browse tafsir, generate reflections, and search topics"
)]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/basirah/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend root URL; overrides the config file and BASIRAH_API_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory holding surah.json and quran.json.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Bearer token from a previous `basirah login`.
    #[arg(long, global = true, env = "BASIRAH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Require a token for every read operation.
    #[arg(long, global = true)]
    require_auth: bool,

    /// Emit results as newline-delimited JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange credentials for an access token and print it.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Fetch one author's commentary on a single verse.
    Tafsir {
        #[arg(long)]
        author: Author,
        #[arg(long)]
        surah: u16,
        #[arg(long)]
        ayah: u16,
        #[arg(long, default_value = "ar")]
        lang: Language,
    },

    /// Generate a reflection over a verse range.
    Reflect {
        #[arg(long)]
        author: Author,
        #[arg(long)]
        surah: u16,
        #[arg(long)]
        from: u16,
        #[arg(long)]
        to: u16,
        #[arg(long, default_value = "en")]
        lang: Language,
    },

    /// Semantic search across commentaries.
    Search {
        /// Topic or phrase.
        query: String,
        #[arg(long)]
        author: Option<Author>,
        #[arg(long)]
        surah: Option<u16>,
        #[arg(long, default_value = "ar")]
        lang: Language,
        /// Number of results (1-10); defaults to the configured value.
        #[arg(long)]
        top_k: Option<u8>,
    },

    /// List the surah index.
    Surahs,

    /// Print a verse's Arabic text.
    Verse {
        #[arg(long)]
        surah: u16,
        #[arg(long)]
        ayah: u16,
    },

    /// Launch the interactive interface.
    Tui,

    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();
    let paths = BasirahPaths::resolve().map_err(BasirahError::from)?;

    init_tracing(&paths, matches!(cli.command, Commands::Tui))?;

    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let mut config = BasirahConfig::load_or_default(&config_path)
        .map_err(BasirahError::from)?
        .with_env_overrides()
        .with_base_url_override(cli.base_url.clone());
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
    }
    if cli.require_auth {
        config.require_auth = true;
    }

    let client = TafsirClient::from_config(&config);
    let session = Session::with_token(cli.token.clone().unwrap_or_default());
    let sink: Box<dyn OutputSink> = if cli.json {
        Box::new(JsonSink)
    } else {
        Box::new(StdoutSink)
    };
    let load_reference = || -> Result<ReferenceData> {
        Ok(ReferenceData::load(&config.data_dir(&paths)).map_err(BasirahError::from)?)
    };

    match cli.command {
        Commands::Login { username, password } => {
            let token = client
                .login(&username, &password)
                .map_err(BasirahError::from)?;
            println!("{token}");
        }

        Commands::Tafsir {
            author,
            surah,
            ayah,
            lang,
        } => {
            let reference = load_reference()?;
            let mut form = TafsirForm::new(&reference, lang);
            form.author = author;
            form.select_surah(&reference, surah)
                .map_err(BasirahError::from)?;
            form.select_ayah(&reference, ayah)
                .map_err(BasirahError::from)?;
            emit(&*sink, submit_tafsir(&client, &session, &reference, &form))?;
        }

        Commands::Reflect {
            author,
            surah,
            from,
            to,
            lang,
        } => {
            let reference = load_reference()?;
            let mut form = ReflectionForm::new(&reference, lang);
            form.author = author;
            form.select_surah(&reference, surah)
                .map_err(BasirahError::from)?;
            form.select_from(&reference, from)
                .map_err(BasirahError::from)?;
            form.select_to(&reference, to)
                .map_err(BasirahError::from)?;
            emit(&*sink, submit_reflection(&client, &session, &reference, &form))?;
        }

        Commands::Search {
            query,
            author,
            surah,
            lang,
            top_k,
        } => {
            let reference = load_reference()?;
            let mut form = TopicForm::new(lang, config.top_k());
            form.query = query;
            form.author = author;
            form.select_surah(&reference, surah)
                .map_err(BasirahError::from)?;
            if let Some(k) = top_k {
                form.select_top_k(k).map_err(BasirahError::from)?;
            }
            emit(&*sink, submit_topic(&client, &session, &reference, &form))?;
        }

        Commands::Surahs => {
            let reference = load_reference()?;
            for entry in reference.surahs().entries() {
                sink.emit(&Block::field(
                    reference.surah_label(entry.surah_number),
                    format!("{} ayat", entry.total_ayat),
                ));
            }
        }

        Commands::Verse { surah, ayah } => {
            let reference = load_reference()?;
            sink.emit(&Block::verse(reference.verse_locator(surah, ayah)));
        }

        Commands::Tui => {
            let reference = load_reference()?;
            let controller =
                ViewController::new(&reference, config.default_language, config.top_k());
            basirah::tui::launch(client, session, reference, controller)?;
        }

        Commands::Config => {
            let toml = config.to_toml().map_err(|e| miette::miette!("{e}"))?;
            print!("{toml}");
        }
    }

    Ok(())
}

/// Print a submission; backend failures become the process error.
fn emit(sink: &dyn OutputSink, submission: Submission) -> Result<()> {
    match submission {
        Submission::Skipped => Ok(()),
        Submission::Rendered(blocks) => {
            sink.emit_all(&blocks);
            Ok(())
        }
        Submission::Error(message) => Err(miette::miette!("{message}")),
    }
}

/// Install the tracing subscriber. The TUI owns the terminal, so its logs
/// go to a file under the state directory instead of stderr.
fn init_tracing(paths: &BasirahPaths, tui: bool) -> Result<()> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    if tui {
        let log_dir = paths.ensure_log_dir().map_err(BasirahError::from)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("basirah.log"))
            .into_diagnostic()?;
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}
