use std::{ops::Range, path::PathBuf};

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use bhvdsl::{DslConfig, DslContext, DslError, compile_path};
use bhvmodel::{BehaviourDescription, Hypothesis, variable::VariableCategory};
use clap::Parser as ClapParser;
use log::{LevelFilter, debug};
use strum::IntoEnumIterator;

#[derive(ClapParser)]
#[command(version, about)]
pub struct Arguments {
    /// Path to the behaviour file
    input: PathBuf,

    /// TOML configuration of the compiler
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interfaces to select, on top of the configured ones
    #[arg(short, long = "interface")]
    interfaces: Vec<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Arguments::parse();
    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(error) = run(&args) {
        report(&args, &error);
        std::process::exit(1);
    }
}

fn run(args: &Arguments) -> Result<(), DslError> {
    let mut config = match &args.config {
        Some(path) => DslConfig::load_from_toml(path)?,
        None => DslConfig::default(),
    };
    for name in &args.interfaces {
        if !config.interfaces.contains(name) {
            config.interfaces.push(name.clone());
        }
    }
    debug!("Configuration: {:?}", config);

    let context = DslContext::standard(config)?;
    let description = compile_path(&context, &args.input)?;
    print_summary(&description)?;
    Ok(())
}

fn print_summary(description: &BehaviourDescription) -> Result<(), DslError> {
    println!(
        "Behaviour `{}` ({})",
        description.class_name().unwrap_or_else(|| "<unnamed>".to_string()),
        description.behaviour_type()
    );
    println!("  hypotheses: {}", join(description.hypotheses().iter()));
    let distinct = description.distinct_hypotheses()?;
    println!("  distinct hypotheses: {}", join(distinct.iter()));

    for h in distinct {
        let data = description.behaviour_data(h)?;
        if h == Hypothesis::Undefined {
            println!("  [default]");
        } else {
            println!("  [{h}]");
        }
        for category in VariableCategory::iter() {
            let variables = data.variables(category);
            if variables.names().next().is_some() {
                println!("    {category}: {}", join(variables.names()));
            }
        }
        let blocks = data.code_block_names().collect::<Vec<_>>();
        if !blocks.is_empty() {
            println!("    code blocks: {}", blocks.join(", "));
        }
    }
    Ok(())
}

fn join<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
}

/// Character range covering the 1-based `line` of `source`.
fn line_span(source: &str, line: usize) -> Range<usize> {
    let mut start = 0;
    for (i, text) in source.split('\n').enumerate() {
        let len = text.chars().count();
        if i + 1 == line {
            return start..start + len.max(1);
        }
        start += len + 1;
    }
    start..start
}

fn report(args: &Arguments, error: &DslError) {
    let file = args.input.display().to_string();
    let source = std::fs::read_to_string(&args.input).ok();
    let (Some(line), Some(source)) = (error.line(), source) else {
        eprintln!("Error: {}", error);
        return;
    };

    let mut colors = ColorGenerator::new();
    let span = (file.clone(), line_span(&source, line));
    let printed = Report::build(ReportKind::Error, span.clone())
        .with_message(format!("{} ({:?})", error.root(), error.kind()))
        .with_label(
            Label::new(span)
                .with_message(error.to_string())
                .with_color(colors.next()),
        )
        .finish()
        .eprint((file, Source::from(source)));
    if printed.is_err() {
        eprintln!("Error: {}", error);
    }
}
