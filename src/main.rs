mod render;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use gpp_engine::config::AppConfig;
use gpp_engine::error::AppError;
use gpp_engine::import::{read_catalog_path, read_roster_path};
use gpp_engine::{telemetry, Catalog, CompiledRules, GradeCalculator, RuleBook, StudentId};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "gpp-calculator",
    about = "Allocate graded course credits into degree categories and report grade-point totals",
    version
)]
struct Cli {
    /// Rule book to use instead of GPP_RULES_PATH
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    /// Directory holding lectures.csv and students.csv instead of GPP_DATA_DIR
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate every student in the roster (default command)
    Calculate(CalculateArgs),
    /// List the distinct values of a catalog column, for writing category patterns
    Categories {
        /// Catalog column to inspect (defaults to the mapped category column)
        #[arg(long)]
        column: Option<String>,
    },
    /// Validate the rule book and catalog and list undefined lecture keys in the roster
    Check,
}

#[derive(Args, Debug, Default)]
struct CalculateArgs {
    /// Directory for per-student audit logs instead of GPP_LOG_DIR
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Write the summary table to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,
    /// Print results as JSON instead of a table
    #[arg(long)]
    json: bool,
    /// Only calculate these student ids (repeatable)
    #[arg(long = "student")]
    students: Vec<String>,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        if err.is_configuration() {
            eprintln!("no student was processed; fix the rule book or input tables and rerun");
        }
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load();
    if let Some(rules) = cli.rules {
        config.paths.rules = rules;
    }
    if let Some(data_dir) = cli.data_dir {
        config.paths.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;
    info!(?config.environment, rules = %config.paths.rules.display(), "gpp calculator starting");

    let command = cli
        .command
        .unwrap_or_else(|| Command::Calculate(CalculateArgs::default()));

    match command {
        Command::Calculate(mut args) => {
            if let Some(log_dir) = args.log_dir.take() {
                config.paths.log_dir = log_dir;
            }
            run_calculate(&config, args)
        }
        Command::Categories { column } => run_categories(&config, column),
        Command::Check => run_check(&config),
    }
}

fn load_inputs(config: &AppConfig) -> Result<(CompiledRules, Catalog), AppError> {
    let rules = RuleBook::load(&config.paths.rules)?.compile()?;
    let catalog = read_catalog_path(config.paths.lectures_csv(), &rules.lectures)?;
    Ok((rules, catalog))
}

fn run_calculate(config: &AppConfig, args: CalculateArgs) -> Result<(), AppError> {
    let (rules, catalog) = load_inputs(config)?;
    let roster = read_roster_path(config.paths.students_csv(), &rules)?;
    let calculator = GradeCalculator::new(catalog, rules);

    let reports = if args.students.is_empty() {
        calculator.run(&roster)?
    } else {
        let ids: Vec<StudentId> = args.students.into_iter().map(StudentId).collect();
        calculator.run_for(&roster, &ids)?
    };

    let written = render::write_audit_logs(&config.paths.log_dir, &reports, Local::now())?;
    info!(files = written, dir = %config.paths.log_dir.display(), "audit logs written");

    if args.json {
        render::print_json(&reports)?;
    } else {
        render::print_summary(&reports);
    }

    if let Some(path) = args.export {
        let rows: Vec<_> = reports.iter().map(|report| report.summary()).collect();
        gpp_engine::export::write_summary_path(path, &rows)?;
    }

    Ok(())
}

fn run_categories(config: &AppConfig, column: Option<String>) -> Result<(), AppError> {
    let (rules, catalog) = load_inputs(config)?;
    let column = column.unwrap_or_else(|| rules.lectures.category.clone());

    println!("Distinct values of '{column}'");
    for value in catalog.categories_of(&column) {
        let marker = if rules.valid_categories.is_match(&value) {
            ' '
        } else {
            '*'
        };
        println!("{marker} {value}");
    }
    println!("\n(* matches no category rule)");
    Ok(())
}

fn run_check(config: &AppConfig) -> Result<(), AppError> {
    let (rules, catalog) = load_inputs(config)?;
    let roster = read_roster_path(config.paths.students_csv(), &rules)?;

    println!(
        "Rule book OK: {} categories, {} secondary pools, target {} credits",
        rules.categories.len(),
        rules.secondary.len(),
        rules.target_credits
    );
    println!("Catalog OK: {} lectures", catalog.len());
    println!(
        "Roster: {} students, {} grade rows",
        roster.students().len(),
        roster.len()
    );

    let mut clean = true;
    for student in roster.students() {
        let undefined = catalog.find_undefined(roster.lecture_keys_for(&student.id));
        if !undefined.is_empty() {
            clean = false;
            println!(
                "- {} ({}): undefined lectures {}",
                student.id,
                student.name,
                undefined.join(", ")
            );
        }
    }
    if clean {
        println!("Every graded lecture is defined in the catalog");
    }
    Ok(())
}
