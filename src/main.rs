use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blockconf::{ConfigTree, LoadOptions, Registry};

/// Name the CLI registers every loaded file under.
const CLI_CONFIG_NAME: &str = "cli";

#[derive(Parser)]
#[command(name = "blockconf")]
#[command(
	author,
	version,
	about = "Query, edit and rewrite hierarchical block/row/column config files"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Log every opened file and lookup miss (overridden by BLOCKCONF_LOG)
	#[arg(short, long, global = true)]
	verbose: bool,

	/// Fail on lines that cannot be parsed instead of skipping them
	#[arg(long, global = true)]
	strict: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Print one column value
	Get {
		file: PathBuf,
		/// Block path, ':'-separated ("" for top-level rows)
		block: String,
		row: String,
		column: String,
		/// Printed when the value is missing, instead of failing
		#[arg(long, allow_hyphen_values = true)]
		default: Option<String>,
	},
	/// List child blocks of a block path (the top level by default)
	Blocks { file: PathBuf, block: Option<String> },
	/// List rows of a block
	Rows { file: PathBuf, block: String },
	/// List columns of a row
	Columns {
		file: PathBuf,
		block: String,
		row: String,
	},
	/// Set one column value and write the config back
	Set {
		file: PathBuf,
		block: String,
		row: String,
		column: String,
		value: String,
		/// Write here instead of overwriting FILE
		#[arg(short, long, value_name = "OUT")]
		output: Option<PathBuf>,
	},
	/// Print the whole config, normalized
	Dump {
		file: PathBuf,
		#[arg(long, value_enum, default_value_t = DumpFormat::Blockconf)]
		format: DumpFormat,
	},
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
	Blockconf,
	Toml,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_logging(verbose: bool) {
	let fallback = if verbose { "debug" } else { "warn" };
	let filter = tracing_subscriber::EnvFilter::try_from_env("BLOCKCONF_LOG")
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	let options = LoadOptions::default()
		.verbose(cli.verbose)
		.strict(cli.strict);
	let mut registry = Registry::new();

	match cli.command {
		Commands::Get {
			file,
			block,
			row,
			column,
			default,
		} => {
			let config = load(&mut registry, &file, &options)?;
			handle_get(config, &block, &row, &column, default.as_deref())
		}
		Commands::Blocks { file, block } => {
			let config = load(&mut registry, &file, &options)?;
			let block = block.unwrap_or_default();
			let found = config
				.resolve(&split_path(&block))
				.ok_or_else(|| anyhow::anyhow!("Block not found: {}", block))?;
			print_lines(&found.list_blocks());
			Ok(ExitCode::SUCCESS)
		}
		Commands::Rows { file, block } => {
			let config = load(&mut registry, &file, &options)?;
			let (parent, last) = parent_and_last(config, &block)?;
			if !parent.children.contains_key(last) {
				anyhow::bail!("Block not found: {}", block);
			}
			print_lines(&parent.list_rows(last));
			Ok(ExitCode::SUCCESS)
		}
		Commands::Columns { file, block, row } => {
			let config = load(&mut registry, &file, &options)?;
			let (parent, last) = parent_and_last(config, &block)?;
			if !parent.row_exists(last, &row) {
				anyhow::bail!("Row not found: {} in block {}", row, block);
			}
			print_lines(&parent.list_columns(last, &row));
			Ok(ExitCode::SUCCESS)
		}
		Commands::Set {
			file,
			block,
			row,
			column,
			value,
			output,
		} => {
			let config = load(&mut registry, &file, &options)?;
			handle_set(config, &block, &row, &column, value)?;

			let target = output.unwrap_or(file);
			config
				.write(&target)
				.with_context(|| format!("Failed to write {}", target.display()))?;
			Ok(ExitCode::SUCCESS)
		}
		Commands::Dump { file, format } => {
			let config = load(&mut registry, &file, &options)?;
			match format {
				DumpFormat::Blockconf => print!("{}", config.render()),
				DumpFormat::Toml => {
					let rendered =
						toml::to_string(&config.root).context("Failed to render config as TOML")?;
					print!("{}", rendered);
				}
			}
			Ok(ExitCode::SUCCESS)
		}
	}
}

fn load<'r>(
	registry: &'r mut Registry,
	file: &Path,
	options: &LoadOptions,
) -> Result<&'r mut ConfigTree> {
	registry
		.load(CLI_CONFIG_NAME, file, options)
		.with_context(|| format!("Failed to load {}", file.display()))
}

fn handle_get(
	config: &ConfigTree,
	block: &str,
	row: &str,
	column: &str,
	default: Option<&str>,
) -> Result<ExitCode> {
	let path = split_path(block);

	let value = match default {
		Some(default) => config.get_nested_str(&path, row, column, default),
		None => config
			.resolve(&path)
			.and_then(|found| found.self_value(row, column))
			.map(str::to_string)
			.ok_or_else(|| anyhow::anyhow!("Value not found: {}.{}.{}", block, row, column))?,
	};

	println!("{}", value);
	Ok(ExitCode::SUCCESS)
}

fn handle_set(
	config: &mut ConfigTree,
	block: &str,
	row: &str,
	column: &str,
	value: String,
) -> Result<()> {
	let path = split_path(block);
	let Some((last, parents)) = path.split_last() else {
		anyhow::bail!("A block is required; top-level rows are not written back");
	};

	let mut parent = &mut config.root;
	for segment in parents {
		parent = parent.child_entry(segment);
	}
	parent.edit_entry(last, row, column, value);
	Ok(())
}

/// Split a ':'-separated block path; the empty string is the root.
fn split_path(block: &str) -> Vec<&str> {
	block
		.split(':')
		.map(str::trim)
		.filter(|segment| !segment.is_empty())
		.collect()
}

fn parent_and_last<'c, 'p>(
	config: &'c ConfigTree,
	block: &'p str,
) -> Result<(&'c blockconf::Block, &'p str)> {
	let path = split_path(block);
	let Some((last, parents)) = path.split_last() else {
		anyhow::bail!("A block name is required");
	};

	let parent = config
		.resolve(parents)
		.ok_or_else(|| anyhow::anyhow!("Block not found: {}", block))?;
	Ok((parent, *last))
}

fn print_lines(names: &[String]) {
	for name in names {
		println!("{}", name);
	}
}
