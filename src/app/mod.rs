use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};

use filterql::config::{DataSource, FieldType, Settings};
use filterql::fields::{config_field_config, field_config};
use filterql::query::{FetchParameters, request_path};
use filterql::search::{combine_filters, words_to_filter};
use filterql::sexpr::{Operation, Symbol};
use filterql::translate::{FilterNode, Translator};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source definitions (YAML); the built-in sources are used when omitted
    #[arg(short, long, global = true, env = "FILTERQL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of threads for batch translation (default: all cores)
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Translate a query-builder filter tree into a filter expression
    Translate(TranslateArgs),
    /// Print the query-builder field definitions of a source
    Fields {
        #[arg(short, long)]
        source: String,
        /// Print the config document paths instead of the read-only columns
        #[arg(long)]
        config_fields: bool,
    },
    /// List the configured sources
    Sources,
}

#[derive(Args)]
pub struct TranslateArgs {
    /// Data source the filter is built for
    #[arg(short, long)]
    pub source: String,

    /// Filter tree JSON file, or `-` for stdin
    #[arg(long)]
    pub tree: Option<PathBuf>,

    /// Free-text search, AND-combined with the tree filter
    #[arg(long)]
    pub search: Option<String>,

    /// Field the search text is matched against (default: first text column)
    #[arg(long)]
    pub search_field: Option<String>,

    /// Paging offset for the request
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Print the full request path instead of the bare expression
    #[arg(long)]
    pub query: bool,

    /// Treat the input as one filter tree per line
    #[arg(long)]
    pub jsonl: bool,
}

pub fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::load_or_builtin(cli.config.as_deref())?;
    match &cli.command {
        Command::Translate(args) => run_translate(&settings, args),
        Command::Fields {
            source,
            config_fields,
        } => {
            let source = settings.data_source(source)?;
            let fields = if *config_fields {
                config_field_config(&source.config_fields)
            } else {
                field_config(&source.registry)
            };
            println!("{}", serde_json::to_string_pretty(&fields)?);
            Ok(())
        }
        Command::Sources => {
            for name in settings.source_names() {
                let source = settings.data_source(name)?;
                println!("{}\t{}", name, source.endpoint);
            }
            Ok(())
        }
    }
}

pub fn run_translate(settings: &Settings, args: &TranslateArgs) -> Result<()> {
    let source = settings.data_source(&args.source)?;
    let translator = Translator::for_source(&source).with_max_depth(settings.max_depth);
    tracing::info!(
        "Source: {} ({} columns, {} whitelisted)",
        source.name,
        source.registry.len(),
        source.context.whitelist.len()
    );

    let search = match &args.search {
        Some(text) => {
            let target = search_target(&source, &translator, args.search_field.as_deref())?;
            words_to_filter(text, &target)
        }
        None => None,
    };

    if args.jsonl {
        let path = args
            .tree
            .as_deref()
            .context("CLI: --jsonl requires --tree (use - for stdin)")?;
        return translate_lines(&read_input(path)?, &source, &translator, &search, args);
    }

    let tree = match &args.tree {
        Some(path) => {
            let input = read_input(path)?;
            let node: FilterNode = serde_json::from_str(&input)
                .with_context(|| format!("CLI: Failed to parse filter tree from {:?}", path))?;
            translator.translate(&node)?
        }
        None => None,
    };

    let filter = combine_filters(tree, search);
    if filter.is_none() {
        tracing::info!("No filter applies");
    }
    println!("{}", render(&source, filter, args));
    Ok(())
}

/// Translate one tree per line in parallel. Output keeps input order; failed
/// lines are reported on stderr and fail the command after the batch.
fn translate_lines(
    input: &str,
    source: &DataSource,
    translator: &Translator<'_>,
    search: &Option<Operation>,
    args: &TranslateArgs,
) -> Result<()> {
    let lines: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    let start = std::time::Instant::now();
    let results: Vec<Result<String>> = lines
        .par_iter()
        .map(|(_, line)| {
            let node: FilterNode = serde_json::from_str(line)?;
            let tree = translator.translate(&node)?;
            Ok(render(source, combine_filters(tree, search.clone()), args))
        })
        .collect();

    let mut failures = 0usize;
    for ((line_no, _), result) in lines.iter().zip(results) {
        match result {
            Ok(rendered) => println!("{}", rendered),
            Err(err) => {
                failures += 1;
                eprintln!("error: line {}: {:#}", line_no + 1, err);
                println!();
            }
        }
    }

    tracing::info!(
        "Translated {} trees in {:.3}s ({} failed)",
        lines.len(),
        start.elapsed().as_secs_f64(),
        failures
    );

    if failures > 0 {
        bail!("CLI: {} of {} filter trees failed to translate", failures, lines.len());
    }
    Ok(())
}

fn render(source: &DataSource, filter: Option<Operation>, args: &TranslateArgs) -> String {
    if args.query {
        request_path(source, &FetchParameters::new(filter, args.offset))
    } else {
        filter.map(|op| op.to_sexpr()).unwrap_or_default()
    }
}

fn search_target(
    source: &DataSource,
    translator: &Translator<'_>,
    field: Option<&str>,
) -> Result<Symbol> {
    let field = match field {
        Some(field) => field,
        None => source
            .registry
            .iter()
            .find(|col| col.field_type == FieldType::String)
            .map(|col| col.key.as_str())
            .ok_or_else(|| {
                anyhow!("CLI: Source '{}' has no text column; use --search-field", source.name)
            })?,
    };
    Ok(translator.field_symbol(field)?)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("CLI: Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("CLI: Failed to read {:?}", path))
    }
}
