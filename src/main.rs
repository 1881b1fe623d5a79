use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use solremap::config::{
	CONFIG_FILE_NAME, LoadedConfig, discover_config, generate_init_template, user_config_path,
};
use solremap::preprocess::{preprocess_file, preprocess_project, transform_source, write_output};
use solremap::remap::{RemappingTable, load_rules_file, transform_line};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "SOLREMAP_LOG";

#[derive(Parser)]
#[command(name = "solremap")]
#[command(
	author,
	version,
	about = "Rewrite Solidity import paths using a remappings.txt table"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Remappings file to use instead of the configured one
	#[arg(long, global = true, value_name = "PATH")]
	remappings: Option<PathBuf>,

	/// Create a template .solremap.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .solremap.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Remap a single line and print the result
	Line {
		/// The source line to remap
		#[arg(allow_hyphen_values = true)]
		line: String,
	},
	/// Remap import lines of files (or stdin) and print the result
	///
	/// Several files are printed back to back, like `cat`.
	Transform {
		/// Files to remap; reads stdin when empty
		files: Vec<PathBuf>,

		/// Rewrite the files instead of printing them
		#[arg(long, short = 'i')]
		in_place: bool,
	},
	/// Remap all project sources and tests into the cache directory
	Build,
	/// Remappings file commands
	Remappings {
		#[command(subcommand)]
		action: RemappingsAction,
	},
	/// Configuration commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum RemappingsAction {
	/// Print the remapping rules in precedence order
	Show,
	/// Check the remappings file for errors
	Validate,
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display the effective configuration and where it came from
	Show,
}

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
		)
		.with_writer(std::io::stderr)
		.with_target(false)
		.without_time()
		.init();

	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	if cli.init {
		return handle_init(cli.force);
	}

	let Some(command) = cli.command else {
		// arg_required_else_help covers the no-argument case
		return Ok(ExitCode::SUCCESS);
	};

	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let loaded = discover_config(&cwd).context("Failed to load configuration")?;
	let remappings = cli
		.remappings
		.map(|p| cwd.join(p))
		.unwrap_or_else(|| loaded.remappings_path());

	match command {
		Commands::Line { line } => handle_line(&line, &remappings),
		Commands::Transform { files, in_place } => handle_transform(&files, in_place, &remappings),
		Commands::Build => handle_build(&loaded, &remappings),
		Commands::Remappings { action } => match action {
			RemappingsAction::Show => handle_remappings_show(&remappings),
			RemappingsAction::Validate => handle_remappings_validate(&remappings),
		},
		Commands::Config { action } => match action {
			ConfigAction::Show => handle_config_show(&loaded, &remappings),
		},
	}
}

fn load_table(path: &Path) -> Result<RemappingTable> {
	load_rules_file(path).with_context(|| format!("Failed to load remappings: {}", path.display()))
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, generate_init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn handle_line(line: &str, remappings: &Path) -> Result<ExitCode> {
	let table = load_table(remappings)?;
	println!("{}", transform_line(line, &table));
	Ok(ExitCode::SUCCESS)
}

fn handle_transform(files: &[PathBuf], in_place: bool, remappings: &Path) -> Result<ExitCode> {
	let table = load_table(remappings)?;

	if files.is_empty() {
		if in_place {
			anyhow::bail!("--in-place requires at least one file");
		}
		let mut source = String::new();
		std::io::stdin()
			.read_to_string(&mut source)
			.context("Failed to read stdin")?;
		let transformed = transform_source(&source, &table);
		std::io::stdout()
			.write_all(transformed.text.as_bytes())
			.context("Failed to write stdout")?;
		return Ok(ExitCode::SUCCESS);
	}

	// Remap everything up front so a bad file leaves no partial output.
	let transformed = files
		.iter()
		.map(|file| {
			preprocess_file(file, &table)
				.with_context(|| format!("Failed to remap {}", file.display()))
				.map(|t| (file, t))
		})
		.collect::<Result<Vec<_>>>()?;

	let mut stdout = std::io::stdout().lock();
	for (file, transformed) in transformed {
		if in_place {
			if transformed.rewritten > 0 {
				write_output(file, &transformed.text)?;
			}
			info!(path = %file.display(), rewritten = transformed.rewritten, "remapped in place");
		} else {
			stdout
				.write_all(transformed.text.as_bytes())
				.context("Failed to write stdout")?;
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_build(loaded: &LoadedConfig, remappings: &Path) -> Result<ExitCode> {
	let table = load_table(remappings)?;
	let report = preprocess_project(loaded, &table).context("Failed to preprocess project")?;

	println!(
		"Remapped {} import line(s) in {} file(s) into {}",
		report.rewritten_lines,
		report.files,
		loaded.cache_dir().display()
	);
	Ok(ExitCode::SUCCESS)
}

fn handle_remappings_show(remappings: &Path) -> Result<ExitCode> {
	let table = load_table(remappings)?;

	println!("# Source: {}", remappings.display());
	if table.is_empty() {
		println!("No remappings defined.");
		return Ok(ExitCode::SUCCESS);
	}

	for (i, rule) in table.rules().iter().enumerate() {
		println!("{:>4}. {} => {}", i + 1, rule.from, rule.to);
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_remappings_validate(remappings: &Path) -> Result<ExitCode> {
	let table = load_table(remappings)?;
	println!(
		"{}: valid ({} remapping(s))",
		remappings.display(),
		table.len()
	);
	Ok(ExitCode::SUCCESS)
}

fn handle_config_show(loaded: &LoadedConfig, remappings: &Path) -> Result<ExitCode> {
	match loaded.path {
		Some(ref path) => println!("# Source: {}", path.display()),
		None => println!("# Source: built-in defaults"),
	}
	println!("root: {}", loaded.root.display());
	println!("remappings: {}", remappings.display());
	println!("sources: {}", loaded.sources_dir().display());
	println!("tests: {}", loaded.tests_dir().display());
	println!("cache: {}", loaded.cache_dir().display());
	println!("extensions: {}", loaded.config.paths.extensions.join(", "));

	if let Ok(user_path) = user_config_path() {
		println!();
		println!("User config path: {}", user_path.display());
	}

	Ok(ExitCode::SUCCESS)
}
