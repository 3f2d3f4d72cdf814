use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use editorconfig_tool::config::{DEFAULT_CONFIG_FILE_NAME, ResolverOptions, parse_version};
use editorconfig_tool::document::{Document, Line, ROOT_KEY, Section};
use editorconfig_tool::{ResolvedSettings, Resolver};

#[derive(Parser)]
#[command(name = "editorconfig")]
#[command(
	author,
	version,
	about = "Print the editorconfig settings that apply to files, or edit a config file"
)]
#[command(arg_required_else_help = true, args_conflicts_with_subcommands = true)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Config file name to look for instead of .editorconfig
	#[arg(short = 'f', value_name = "NAME", default_value = DEFAULT_CONFIG_FILE_NAME)]
	config_file_name: String,

	/// Rule-set version to emulate (e.g. 0.9)
	#[arg(short = 'b', value_name = "VERSION")]
	rule_set_version: Option<String>,

	/// Print the settings as JSON
	#[arg(long)]
	json: bool,

	/// Files to print settings for; `-` reads newline-separated paths from stdin
	#[arg(value_name = "FILEPATH")]
	files: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
	/// Edit a config file in place, keeping untouched lines as they are
	Edit {
		#[command(subcommand)]
		action: EditAction,
	},
}

#[derive(Subcommand)]
enum EditAction {
	/// Set a property, adding the section when it does not exist yet
	Set {
		/// Config file to edit
		config: PathBuf,
		/// Section glob, e.g. "*.md" (ignored for `root`)
		section: String,
		key: String,
		value: String,
	},
	/// Remove a property from a section
	Unset {
		/// Config file to edit
		config: PathBuf,
		/// Section glob (ignored for `root`)
		section: String,
		key: String,
	},
}

fn main() -> ExitCode {
	init_tracing();

	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_tracing() {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_env("EDITORCONFIG_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
		)
		.with_writer(std::io::stderr)
		.init();
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	if let Some(command) = cli.command {
		return match command {
			Commands::Edit { action } => match action {
				EditAction::Set {
					config,
					section,
					key,
					value,
				} => handle_edit_set(&config, &section, &key, &value),
				EditAction::Unset {
					config,
					section,
					key,
				} => handle_edit_unset(&config, &section, &key),
			},
		};
	}

	let mut options = ResolverOptions::default().with_config_file_name(&cli.config_file_name);
	if let Some(ref version) = cli.rule_set_version {
		let version = parse_version(version).context("Invalid -b argument")?;
		options = options.with_version(version);
	}

	let files = expand_stdin_paths(&cli.files)?;
	handle_resolve(options, &files, cli.json)
}

/// Replace each `-` argument with the paths read from stdin.
fn expand_stdin_paths(args: &[String]) -> Result<Vec<String>> {
	let mut files = Vec::new();
	let mut stdin_paths = None;

	for arg in args {
		if arg != "-" {
			files.push(arg.clone());
			continue;
		}

		if stdin_paths.is_none() {
			let mut input = String::new();
			std::io::stdin()
				.read_to_string(&mut input)
				.context("Failed to read file paths from stdin")?;
			let paths: Vec<String> = input
				.lines()
				.map(str::trim)
				.filter(|line| !line.is_empty())
				.map(str::to_string)
				.collect();
			stdin_paths = Some(paths);
		}
		if let Some(ref paths) = stdin_paths {
			files.extend(paths.iter().cloned());
		}
	}

	Ok(files)
}

fn handle_resolve(options: ResolverOptions, files: &[String], json: bool) -> Result<ExitCode> {
	if files.is_empty() {
		anyhow::bail!("No file paths given");
	}

	let resolver = Resolver::new(options).context("Invalid resolver options")?;
	let results = resolver
		.resolve_many(files)
		.context("Failed to resolve settings")?;

	if json {
		let output =
			serde_json::to_string_pretty(&results).context("Failed to serialize settings")?;
		println!("{}", output);
	} else {
		print_settings(&results);
	}

	Ok(ExitCode::SUCCESS)
}

fn print_settings(results: &[ResolvedSettings]) {
	for settings in results {
		if results.len() != 1 {
			println!("[{}]", settings.file_name());
		}
		for (key, value) in settings.properties() {
			println!("{}={}", key, value);
		}
	}
}

fn handle_edit_set(config: &Path, section: &str, key: &str, value: &str) -> Result<ExitCode> {
	let mut document = Document::parse(config)
		.with_context(|| format!("Failed to load {}", config.display()))?;
	let line = Line::property(key, value).context("Invalid property")?;

	let mut session = document
		.edit()
		.with_context(|| format!("Failed to open {} for editing", config.display()))?;

	let target = if key.eq_ignore_ascii_case(ROOT_KEY) {
		session.global_mut()
	} else {
		session
			.get_or_add_section(section)
			.with_context(|| format!("Invalid section [{}]", section))?
	};
	set_property(target, key, line)
		.with_context(|| format!("Failed to set `{}` in [{}]", key, target_name(key, section)))?;

	session
		.commit()
		.with_context(|| format!("Failed to write {}", config.display()))?;

	println!("Set {} in [{}]", key, target_name(key, section));
	Ok(ExitCode::SUCCESS)
}

fn handle_edit_unset(config: &Path, section: &str, key: &str) -> Result<ExitCode> {
	let mut document = Document::parse(config)
		.with_context(|| format!("Failed to load {}", config.display()))?;
	let mut session = document
		.edit()
		.with_context(|| format!("Failed to open {} for editing", config.display()))?;

	let target = if key.eq_ignore_ascii_case(ROOT_KEY) {
		Some(session.global_mut())
	} else {
		session.section_mut(section)
	};
	let Some(target) = target else {
		anyhow::bail!("Section [{}] not found in {}", section, config.display());
	};

	let Some(id) = target.try_get_property(key).map(|found| found.id) else {
		anyhow::bail!(
			"Property `{}` not found in [{}]",
			key,
			target_name(key, section)
		);
	};
	target.remove_line(id);

	session
		.commit()
		.with_context(|| format!("Failed to write {}", config.display()))?;

	println!("Unset {} in [{}]", key, target_name(key, section));
	Ok(ExitCode::SUCCESS)
}

/// Replace the property line in place, or add it after the last non-blank line.
fn set_property(section: &mut Section, key: &str, line: Line) -> editorconfig_tool::Result<()> {
	match section.try_get_property(key).map(|found| found.id) {
		Some(id) => {
			section.replace_line(id, line)?;
		}
		None => {
			let index = section.end_of_content();
			section.insert_line(index, line)?;
		}
	}
	Ok(())
}

fn target_name<'a>(key: &str, section: &'a str) -> &'a str {
	if key.eq_ignore_ascii_case(ROOT_KEY) {
		editorconfig_tool::document::GLOBAL_SECTION_NAME
	} else {
		section
	}
}
