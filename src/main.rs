use clap::{Parser, Subcommand};
use goblock::{
    DynamicValue, ExecConfig, Executor, GoExecutor, Options, Params, ResultShape, SourceUnit,
    assemble,
    decode, resolve_args,
};
use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

type CliResult<T = ()> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "goblock")]
#[command(about = "goblock - typed Go programs from host values")]
struct Cli {
    /// Reject values without an unambiguous Go type
    #[arg(long, global = true)]
    strict: bool,

    /// Package for bodies that declare none
    #[arg(long, global = true, default_value = "main")]
    default_package: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Go source from parameter files
    Generate {
        /// Path to a .json parameters file or a directory of them
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read parameters from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON with each section
        #[arg(long)]
        json: bool,
    },

    /// Generate, compile and run, printing the decoded result as JSON
    Run {
        /// Path to a .json parameters file
        file: PathBuf,

        /// Toolchain binary
        #[arg(long, default_value = "go")]
        command: String,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,

        /// Override the result shape from the parameters
        #[arg(long, value_enum)]
        shape: Option<ResultShape>,

        /// JSON object of named references for argument resolution
        #[arg(long)]
        refs: Option<PathBuf>,
    },

    /// Decode program output read from stdin
    Decode {
        #[arg(long, value_enum, default_value_t = ResultShape::Table)]
        shape: ResultShape,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let options = Options {
        default_package: cli.default_package,
        strict: cli.strict,
    };

    let outcome = match cli.command {
        Commands::Generate { file, stdin, json } => {
            if stdin {
                generate_stdin(&options, json)
            } else if let Some(path) = file {
                generate_path(&path, &options)
            } else {
                Err("provide a file/directory or use --stdin".into())
            }
        }
        Commands::Run { file, command, timeout_secs, shape, refs } => {
            let config = ExecConfig {
                command,
                timeout: Duration::from_secs(timeout_secs),
                ..ExecConfig::default()
            };
            run_file(&file, &options, config, shape, refs.as_deref())
        }
        Commands::Decode { shape } => decode_stdin(shape),
    };

    if let Err(err) = outcome {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn generate_stdin(options: &Options, json_output: bool) -> CliResult {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;

    let params = Params::from_json(&text)?;
    let unit = assemble(&params, options)?;
    let code = unit.render();

    if json_output {
        let output = serde_json::json!({ "code": code, "sections": unit });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print!("{}", code);
    }
    Ok(())
}

fn generate_path(path: &Path, options: &Options) -> CliResult {
    if path.is_file() {
        if path.extension().is_none_or(|ext| ext != "json") {
            return Err(format!("{} is not a .json parameters file", path.display()).into());
        }
        let start = Instant::now();
        generate_file(path, options)?;
        report_batch(1, start.elapsed());
        Ok(())
    } else if path.is_dir() {
        generate_directory(path, options)
    } else {
        Err(format!("{} does not exist", path.display()).into())
    }
}

fn generate_directory(dir: &Path, options: &Options) -> CliResult {
    let start = Instant::now();
    let mut file_count = 0;

    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
    {
        generate_file(entry.path(), options)?;
        file_count += 1;
    }

    if file_count == 0 {
        return Err(format!("no .json parameter files found in {}", dir.display()).into());
    }

    report_batch(file_count, start.elapsed());
    Ok(())
}

fn generate_file(path: &Path, options: &Options) -> CliResult {
    let params = Params::from_file(path)?;
    let unit = assemble(&params, options).map_err(|err| format!("{}: {}", path.display(), err))?;

    let output = path.with_extension("go");
    fs::write(&output, unit.render())?;
    report_generated(path, &output, &describe(&unit));
    Ok(())
}

fn run_file(
    path: &Path,
    options: &Options,
    mut config: ExecConfig,
    shape: Option<ResultShape>,
    refs: Option<&Path>,
) -> CliResult {
    let params = Params::from_file(path)?;
    let code = goblock::generate(&params, options)?;

    let mut source = tempfile::Builder::new().prefix("goblock-").suffix(".go").tempfile()?;
    source.write_all(code.as_bytes())?;
    source.flush()?;

    let refs: HashMap<String, DynamicValue> = match refs {
        Some(refs_path) => serde_json::from_str(&fs::read_to_string(refs_path)?)?,
        None => HashMap::new(),
    };
    let args = resolve_args(&params.args, &refs);
    config.flags = params.flags.clone();

    let executor = GoExecutor::new(config);
    let output = executor.execute(source.path(), &args)?;

    let value = decode(&output, shape.unwrap_or(params.results));
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

fn decode_stdin(shape: ResultShape) -> CliResult {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    println!("{}", serde_json::to_string(&decode(&text, shape))?);
    Ok(())
}

/// e.g. `package main, 2 vars, 1 table`
fn describe(unit: &SourceUnit) -> String {
    let package = unit.package.lines().last().unwrap_or_default().trim();
    let package = package.rsplit_once("*/").map_or(package, |(_, rest)| rest.trim());
    let vars = unit.variables.as_deref().map_or(0, |text| text.lines().count());
    let tables = unit
        .table_helpers
        .as_deref()
        .map_or(0, |text| text.matches("_helper(row int").count());

    let mut out = format!("{package}, {}", counted(vars, "var"));
    if tables > 0 {
        out.push_str(&format!(", {}", counted(tables, "table")));
    }
    out
}

fn counted(n: usize, noun: &str) -> String {
    if n == 1 { format!("1 {noun}") } else { format!("{n} {noun}s") }
}

/// `params.json -> params.go (package main, 2 vars)`, green arrow on a tty
fn report_generated(source: &Path, output: &Path, summary: &str) {
    let arrow = if io::stderr().is_terminal() {
        "\x1b[32m->\x1b[0m"
    } else {
        "->"
    };
    eprintln!("{} {} {} ({})", source.display(), arrow, output.display(), summary);
}

fn report_batch(count: usize, elapsed: Duration) {
    tracing::info!(programs = count, ?elapsed, "generation finished");
    if count > 1 {
        eprintln!("{count} Go programs written in {:.1}ms", elapsed.as_secs_f64() * 1000.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goblock::{Binding, ColumnSpec};

    #[test]
    fn test_describe_generated_unit() {
        let mut params = Params::new("/* tool */ package tool\nx := 1");
        params.vars = vec![Binding::new("t", vec![vec!["a"]]), Binding::new("n", 1i64)];
        params.columns = vec![ColumnSpec::new("t", ["c"])];

        let unit = assemble(&params, &Options::default()).unwrap();
        assert_eq!(describe(&unit), "package tool, 2 vars, 1 table");

        let unit = assemble(&Params::new("x := 1"), &Options::default()).unwrap();
        assert_eq!(describe(&unit), "package main, 0 vars");
    }
}
