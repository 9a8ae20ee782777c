use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use railfile_core::commands::{ensure_initialized_at, init::railfile_root, Commands, TagScope};
use railfile_core::services::catalogue::TagUpdate;
use railfile_core::services::query::{
    parse_size, MediaKind, MediaQuery, Range, HEIGHT_RANGE, SIZE_RANGE, TRAINS_RANGE, WIDTH_RANGE,
};
use tagging::Filter;

#[derive(Parser)]
#[command(
    name = "railfile",
    about = "Catalogue, tag and search a folder of train photos and videos"
)]
struct Cli {
    /// Railfile root (defaults to $RAILFILE_ROOT, then .railfile)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Any,
    Images,
    Videos,
}

impl From<Kind> for MediaKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Any => MediaKind::Any,
            Kind::Images => MediaKind::Images,
            Kind::Videos => MediaKind::Videos,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Create the root layout, default config and vocabularies
    Init,
    /// Reconcile the media folder with the catalogue
    Scan,
    /// List catalogued media
    List {
        #[arg(long, value_enum, default_value = "any")]
        kind: Kind,
    },
    /// Edit tags of one item, or apply a JSON batch with --file
    Tag {
        id: Option<i64>,
        /// Context tag to add (repeatable)
        #[arg(long = "context")]
        context: Vec<String>,
        /// Comma-separated tags of one train (repeatable); replaces all trains
        #[arg(long = "train")]
        train: Vec<String>,
        /// Drop every train of the item
        #[arg(long, conflicts_with = "train")]
        clear_trains: bool,
        /// JSON array of {id, contextTags, trainTags}
        #[arg(long, conflicts_with_all = ["id", "context", "train", "clear_trains"])]
        file: Option<PathBuf>,
    },
    /// Search with a tag filter and metadata ranges
    Query {
        /// Filter as JSON, or @path to a JSON file
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, value_enum, default_value = "any")]
        kind: Kind,
        /// e.g. 800kb
        #[arg(long)]
        min_size: Option<String>,
        /// e.g. 15mb
        #[arg(long)]
        max_size: Option<String>,
        #[arg(long)]
        min_width: Option<u32>,
        #[arg(long)]
        max_width: Option<u32>,
        #[arg(long)]
        min_height: Option<u32>,
        #[arg(long)]
        max_height: Option<u32>,
        #[arg(long)]
        min_trains: Option<usize>,
        #[arg(long)]
        max_trains: Option<usize>,
        /// Also match files the last scan did not find
        #[arg(long)]
        include_missing: bool,
    },
    /// Show what a tag implies and what implies it
    Explain {
        tag: String,
        /// Look the tag up in the train vocabulary
        #[arg(long)]
        train: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let root = cli.root.unwrap_or_else(railfile_root);
    tracing::debug!(root = %root.display(), "using railfile root");
    match cli.cmd {
        Cmd::Init => {
            let report = ensure_initialized_at(&root)?;
            println!("root: {}", report.root.display());
            for c in &report.created {
                println!("  created {c}");
            }
            for e in &report.existed {
                println!("  exists  {e}");
            }
            Ok(())
        }
        Cmd::Scan => {
            let mut cmds = Commands::open(root)?;
            print_json(&cmds.scan()?)
        }
        Cmd::List { kind } => {
            let cmds = Commands::open(root)?;
            print_json(&cmds.list(kind.into())?)
        }
        Cmd::Tag {
            id,
            context,
            train,
            clear_trains,
            file,
        } => {
            let mut cmds = Commands::open(root)?;
            let updates = match (file, id) {
                (Some(path), _) => read_updates(&path)?,
                (None, Some(id)) => vec![single_update(&cmds, id, context, train, clear_trains)?],
                (None, None) => bail!("give a media id or --file"),
            };
            let n = cmds.update(updates)?;
            println!("updated {n} item(s)");
            Ok(())
        }
        Cmd::Query {
            filter,
            kind,
            min_size,
            max_size,
            min_width,
            max_width,
            min_height,
            max_height,
            min_trains,
            max_trains,
            include_missing,
        } => {
            let cmds = Commands::open(root)?;
            let query = MediaQuery {
                filter: match filter {
                    Some(arg) => read_filter(&arg)?,
                    None => Filter::default(),
                },
                kind: kind.into(),
                size: size_range(min_size.as_deref(), max_size.as_deref())?,
                width: range(min_width, max_width, WIDTH_RANGE),
                height: range(min_height, max_height, HEIGHT_RANGE),
                duration: None,
                trains: range(min_trains, max_trains, TRAINS_RANGE),
                include_missing,
            };
            print_json(&cmds.query(&query)?)
        }
        Cmd::Explain { tag, train } => {
            let cmds = Commands::open(root)?;
            let scope = if train { TagScope::Train } else { TagScope::Context };
            print_json(&cmds.explain_tag(&tag, scope))
        }
    }
}

/// `RUST_LOG` takes precedence over `-v`.
fn log_filter(verbose: bool) -> EnvFilter {
    let log_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "railfile={log_level},railfile_core={log_level},tagging={log_level}"
        ))
    })
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_updates(path: &Path) -> Result<Vec<TagUpdate>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Build one update from flags. Without --train or --clear-trains the stored
/// trains are sent back unchanged, since an update replaces them.
fn single_update(
    cmds: &Commands,
    id: i64,
    context: Vec<String>,
    train: Vec<String>,
    clear_trains: bool,
) -> Result<TagUpdate> {
    let train_tags = if clear_trains {
        Vec::new()
    } else if train.is_empty() {
        cmds.media(id)?
            .with_context(|| format!("no media with id {id}"))?
            .train_tags
    } else {
        train
            .iter()
            .map(|t| {
                t.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .collect()
    };
    Ok(TagUpdate {
        id,
        context_tags: context,
        train_tags,
    })
}

fn read_filter(arg: &str) -> Result<Filter> {
    let text = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {path}"))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).context("parsing filter JSON")
}

fn range<T: PartialOrd + Copy>(min: Option<T>, max: Option<T>, bounds: Range<T>) -> Option<Range<T>> {
    if min.is_none() && max.is_none() {
        return None;
    }
    Some(Range::new(min.unwrap_or(bounds.min), max.unwrap_or(bounds.max)))
}

fn size_range(min: Option<&str>, max: Option<&str>) -> Result<Option<Range<u64>>> {
    let parse = |s: &str| parse_size(s).with_context(|| format!("invalid size {s:?}"));
    let min = min.map(parse).transpose()?;
    let max = max.map(parse).transpose()?;
    Ok(range(min, max, SIZE_RANGE))
}
