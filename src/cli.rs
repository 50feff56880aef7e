//! Terminal front end.
//!
//! Plays the part of the entry page: a location selector, a date field, a
//! water level field, and a submit action whose label follows the
//! controller's state. All rules live in `form` and `validate`; this module
//! only reads lines and prints.

use chrono::Utc;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::config::{self, AppConfig, Backend, ConfigError, DEFAULT_CONFIG_PATH};
use crate::form::{FormController, SubmitResult};
use crate::gateway::{self, SubmissionGateway};
use crate::locations::{LOCATION_CATALOG, label_for, location_by_index};
use crate::logging::{self, Component};
use crate::model::{Field, FieldErrors, Reading};
use crate::notify::ConsoleNotifier;
use crate::validate;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_INVALID: i32 = 3;

const USAGE: &str = "usage: athus_form <form|submit|validate|locations> [args] [--config PATH] [--dry-run]
  form                               interactive entry
  submit <location> <date> <level>   store one reading
  validate <location> <date> <level> check a reading without storing it
  locations                          list selectable locations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Form,
    Submit,
    Validate,
    Locations,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub config_path: PathBuf,
    pub dry_run: bool,
    /// Arguments after the command that are not flags.
    pub positional: Vec<String>,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("form") => Some(Command::Form),
        Some("submit") => Some(Command::Submit),
        Some("validate") => Some(Command::Validate),
        Some("locations") => Some(Command::Locations),
        _ => None,
    }
}

/// Splits the arguments after the command into flags and positionals.
pub fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        dry_run: false,
        positional: Vec::new(),
    };

    let mut iter = args.iter().skip(2);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                options.config_path = PathBuf::from(path);
            }
            "--dry-run" => options.dry_run = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option '{}'", flag)),
            value => options.positional.push(value.to_string()),
        }
    }
    Ok(options)
}

pub fn run_with_args(args: &[String]) -> i32 {
    let command = match parse_command(args) {
        Some(command) => command,
        None => {
            eprintln!("{}", USAGE);
            return EXIT_USAGE;
        }
    };
    let options = match parse_options(args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{}\n{}", err, USAGE);
            return EXIT_USAGE;
        }
    };

    match command {
        Command::Locations => {
            let mut out = io::stdout();
            match print_locations(&mut out) {
                Ok(()) => EXIT_OK,
                Err(_) => EXIT_FAILURE,
            }
        }
        Command::Validate => handle_validate(&options),
        Command::Submit => handle_submit(&options),
        Command::Form => handle_form(&options),
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Loads configuration; `--dry-run` swaps in the in-memory store.
fn load_settings(options: &Options) -> Result<AppConfig, ConfigError> {
    if !options.dry_run {
        return config::load_config(&options.config_path);
    }
    dotenv::dotenv().ok();
    let mut settings = config::read_config_file(&options.config_path)?;
    config::apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.store.backend = Backend::Memory;
    config::validate_config(&settings)?;
    Ok(settings)
}

fn open_gateway(options: &Options) -> Result<Box<dyn SubmissionGateway>, String> {
    let settings = load_settings(options).map_err(|e| e.to_string())?;

    let level = settings.logging.log_level().map_err(|e| e.to_string())?;
    logging::init_logger(level, settings.logging.file.as_deref(), settings.logging.timestamps);
    logging::debug(
        Component::Config,
        None,
        &format!("backend {:?}, table {}", settings.store.backend, settings.store.table),
    );

    let gateway = gateway::connect(&settings.store).map_err(|e| {
        logging::error(Component::Store, None, &format!("cannot open store: {}", e));
        e.to_string()
    })?;
    logging::debug(Component::System, None, &format!("using {}", gateway.describe()));
    Ok(gateway)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn print_locations<W: Write>(out: &mut W) -> io::Result<()> {
    for (i, location) in LOCATION_CATALOG.iter().enumerate() {
        writeln!(out, "{:>3}. {:<34} {}", i + 1, location.label, location.value)?;
    }
    Ok(())
}

/// Resolves a location argument: a 1-based catalog index or a raw value.
pub fn resolve_location(arg: &str) -> String {
    match arg.trim().parse::<usize>() {
        Ok(index) => location_by_index(index)
            .map(|l| l.value.to_string())
            .unwrap_or_else(|| arg.to_string()),
        Err(_) => arg.to_string(),
    }
}

fn reading_from_args(positional: &[String]) -> Option<Reading> {
    match positional {
        [location, date, level] => Some(Reading {
            location: resolve_location(location),
            rain_date: Some(date.clone()),
            water_level: level.clone(),
        }),
        _ => None,
    }
}

pub fn write_field_errors<W: Write>(out: &mut W, errors: &FieldErrors) -> io::Result<()> {
    for (field, error) in errors.iter() {
        writeln!(out, "  ✗ {}: {}", field, error)?;
    }
    Ok(())
}

fn handle_validate(options: &Options) -> i32 {
    let reading = match reading_from_args(&options.positional) {
        Some(reading) => reading,
        None => {
            eprintln!("{}", USAGE);
            return EXIT_USAGE;
        }
    };

    match validate::validate(&reading, Utc::now()) {
        Ok(valid) => {
            println!(
                "✓ {} | {} | {} mm",
                label_for(&valid.location).unwrap_or(valid.location.as_str()),
                valid.to_record().rain_date,
                valid.water_level
            );
            EXIT_OK
        }
        Err(errors) => {
            let _ = write_field_errors(&mut io::stderr(), &errors);
            EXIT_INVALID
        }
    }
}

fn handle_submit(options: &Options) -> i32 {
    let reading = match reading_from_args(&options.positional) {
        Some(reading) => reading,
        None => {
            eprintln!("{}", USAGE);
            return EXIT_USAGE;
        }
    };

    let mut gateway = match open_gateway(options) {
        Ok(gateway) => gateway,
        Err(err) => {
            eprintln!("{}", err);
            return EXIT_FAILURE;
        }
    };

    let mut form = FormController::new();
    form.set_location(reading.location);
    form.set_rain_date(reading.rain_date);
    form.set_water_level(reading.water_level);

    let mut notifier = ConsoleNotifier::stdio(false);
    submit_exit_code(&form.submit(&mut *gateway, &mut notifier))
}

fn handle_form(options: &Options) -> i32 {
    let mut gateway = match open_gateway(options) {
        Ok(gateway) => gateway,
        Err(err) => {
            eprintln!("{}", err);
            return EXIT_FAILURE;
        }
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    match run_form_session(&mut input, &mut output, &mut *gateway, true) {
        Ok(saved) => {
            logging::info(Component::System, None, &format!("session ended, {} saved", saved));
            EXIT_OK
        }
        Err(err) => {
            eprintln!("terminal error: {}", err);
            EXIT_FAILURE
        }
    }
}

fn submit_exit_code(result: &SubmitResult) -> i32 {
    match result {
        SubmitResult::Saved => EXIT_OK,
        SubmitResult::Failed | SubmitResult::Busy | SubmitResult::NotSubmitting => EXIT_FAILURE,
        SubmitResult::Invalid(errors) => {
            let _ = write_field_errors(&mut io::stderr(), errors);
            EXIT_INVALID
        }
    }
}

// ---------------------------------------------------------------------------
// Interactive session
// ---------------------------------------------------------------------------

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<Option<String>> {
    write!(output, "{}: ", label)?;
    output.flush()?;
    read_line(input)
}

/// Prompts for one field and applies it. Returns `false` on end of input.
fn edit_field<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    form: &mut FormController,
    field: Field,
) -> io::Result<bool> {
    let error = match field {
        Field::Location => {
            writeln!(output, "\nPilih lokasi tempat Athus anda.")?;
            print_locations(output)?;
            let Some(line) = prompt(input, output, "Lokasi (nomor atau koordinat)")? else {
                return Ok(false);
            };
            form.set_location(resolve_location(&line))
        }
        Field::RainDate => {
            writeln!(output, "\nPilih tanggal ketika hujan terjadi.")?;
            let Some(line) = prompt(input, output, "Tanggal Hujan (YYYY-MM-DD)")? else {
                return Ok(false);
            };
            let value = if line.trim().is_empty() { None } else { Some(line) };
            form.set_rain_date(value)
        }
        Field::WaterLevel => {
            writeln!(output, "\nMasukkan ketinggian air dalam milimeter.")?;
            let Some(line) = prompt(input, output, "Ketinggian Air (mm)")? else {
                return Ok(false);
            };
            form.set_water_level(line)
        }
    };

    if let Some(error) = error {
        writeln!(output, "  ✗ {}", error)?;
    }
    Ok(true)
}

fn write_summary<W: Write>(output: &mut W, form: &FormController) -> io::Result<()> {
    let reading = form.reading();
    let location = if reading.location.is_empty() {
        "Pilih lokasi".to_string()
    } else {
        label_for(&reading.location)
            .map(String::from)
            .unwrap_or_else(|| reading.location.clone())
    };
    let date = reading.rain_date.as_deref().unwrap_or("Pilih tanggal");

    writeln!(output, "\n  [1] Lokasi:              {}", location)?;
    writeln!(output, "  [2] Tanggal Hujan:       {}", date)?;
    writeln!(output, "  [3] Ketinggian Air (mm): {}", reading.water_level)?;
    write_field_errors(output, form.errors())?;
    writeln!(output, "  [s] {}    [q] Keluar", form.submit_label())?;
    Ok(())
}

/// Runs the entry loop until the user quits or input ends.
///
/// Returns the number of readings stored during the session.
pub fn run_form_session<R, W, G>(
    input: &mut R,
    output: &mut W,
    gateway: &mut G,
    require_ack: bool,
) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
    G: SubmissionGateway + ?Sized,
{
    let mut form = FormController::new();
    let mut saved = 0;

    writeln!(output, "Input Data Athus")?;
    for field in [Field::Location, Field::RainDate, Field::WaterLevel] {
        if !edit_field(input, output, &mut form, field)? {
            return Ok(saved);
        }
    }

    loop {
        write_summary(output, &form)?;
        let Some(choice) = prompt(input, output, "Pilihan")? else {
            return Ok(saved);
        };

        let field = match choice.trim() {
            "1" => Field::Location,
            "2" => Field::RainDate,
            "3" => Field::WaterLevel,
            "q" | "Q" => return Ok(saved),
            "s" | "S" => {
                let valid = match form.begin_submission_at(Utc::now()) {
                    Ok(valid) => valid,
                    // Field errors show in the next summary.
                    Err(_) => continue,
                };
                writeln!(output, "{}", form.submit_label())?;
                let result = {
                    let mut notifier = ConsoleNotifier::new(&mut *input, &mut *output, require_ack);
                    form.complete_submission(valid, gateway, &mut notifier)
                };
                if result == SubmitResult::Saved {
                    saved += 1;
                }
                continue;
            }
            other => {
                writeln!(output, "  Pilihan tidak dikenal: '{}'", other)?;
                continue;
            }
        };

        if !edit_field(input, output, &mut form, field)? {
            return Ok(saved);
        }
    }
}
