use carstore::csv_codec::EXPORT_FILE_NAME;
use carstore::record::parse_int;
use carstore::{
    Config, FilterCriteria, Inventory, KeyValueStore, MemoryKv, NewVehicle, Settings, SqliteKv, Theme, VehiclePatch,
    VehicleRecord, Year, image, sort_by_name,
};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{Level, debug, warn};

#[derive(Parser)]
#[command(name = "carstore")]
#[command(about = "CarStore CLI - Vehicle inventory with SQLite persistence and CSV import/export")]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ~/.config/carstore/config.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides the config file)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cars, optionally filtered and sorted
    List(ListArgs),

    /// Show every field of one car
    Show { id: String },

    /// Add a car
    Add(AddArgs),

    /// Change some fields of a car
    Edit(EditArgs),

    /// Delete a car
    Delete { id: String },

    /// Append the cars from a CSV file
    Import { file: PathBuf },

    /// Write the inventory to car-inventory.csv
    Export {
        /// Directory (or file path) to write to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Show or change display preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Match owner, make, model or id (case-insensitive)
    #[arg(long, default_value = "")]
    search: String,

    /// Exact model year
    #[arg(long, default_value = "")]
    year: String,

    /// Exact make (case-sensitive)
    #[arg(long, default_value = "")]
    make: String,

    /// Part of the model name (case-insensitive)
    #[arg(long, default_value = "")]
    model: String,

    /// year-desc, year-asc, make-asc or make-desc
    #[arg(long)]
    sort: Option<String>,
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    owner: String,

    #[arg(long)]
    make: String,

    #[arg(long)]
    model: String,

    #[arg(long)]
    year: String,

    #[arg(long, default_value = "")]
    color: String,

    #[arg(long, default_value = "")]
    mileage: String,

    /// Image file to attach
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Args)]
struct EditArgs {
    id: String,

    #[arg(long)]
    owner: Option<String>,

    #[arg(long)]
    make: Option<String>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    year: Option<String>,

    /// New color; an empty value clears it
    #[arg(long)]
    color: Option<String>,

    /// New mileage; an empty or non-positive value clears it
    #[arg(long)]
    mileage: Option<String>,

    /// Replacement image file
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change one or more settings
    Set {
        #[arg(long)]
        theme: Option<Theme>,

        #[arg(long)]
        large_text: Option<bool>,

        #[arg(long)]
        high_contrast: Option<bool>,

        #[arg(long)]
        screen_reader: Option<bool>,

        /// Language code (stored only)
        #[arg(long)]
        language: Option<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        notify_error(&format!("{:#}", e));
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    // Setup tracing
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::WARN)
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let store_path = cli.store_path.clone().unwrap_or_else(|| config.resolved_store_path());
    let mut inventory = Inventory::open(open_kv(&store_path)).context("Failed to load inventory")?;

    match cli.command {
        Commands::List(args) => list(&inventory, args, &config),
        Commands::Show { id } => show(&inventory, &id),
        Commands::Add(args) => add(&mut inventory, args),
        Commands::Edit(args) => edit(&mut inventory, args),
        Commands::Delete { id } => delete(&mut inventory, &id),
        Commands::Import { file } => import(&mut inventory, &file),
        Commands::Export { out } => export(&inventory, out),
        Commands::Settings { action } => settings(inventory.kv(), action),
    }
}

/// Open the on-disk store, falling back to memory when it cannot be opened
fn open_kv(path: &Path) -> Box<dyn KeyValueStore> {
    match SqliteKv::open(path) {
        Ok(kv) => {
            debug!(path = ?path, "Opened store");
            Box::new(kv)
        }
        Err(e) => {
            warn!(path = ?path, error = %e, "Cannot open store, working in memory");
            notify_warning("Persistent storage unavailable; changes will not be saved");
            Box::new(MemoryKv::new())
        }
    }
}

fn list(inventory: &Inventory, args: ListArgs, config: &Config) -> Result<()> {
    let criteria = FilterCriteria::default()
        .text(args.search)
        .year(args.year)
        .make(args.make)
        .model(args.model);

    let mut view = carstore::filter(inventory.all(), &criteria);

    if let Some(name) = args.sort.as_deref().or(config.default_sort.as_deref()) {
        if !sort_by_name(&mut view, name) {
            notify_warning(&format!("Unknown sort option '{}', order unchanged", name));
        }
    }

    if view.is_empty() {
        println!("No cars found");
        return Ok(());
    }

    for car in view {
        println!("{}  Owner: {} | ID: {}", car.title().bold(), car.owner, car.id);
    }
    Ok(())
}

fn show(inventory: &Inventory, id: &str) -> Result<()> {
    let car = inventory
        .get(id)
        .ok_or_else(|| carstore::InventoryError::NotFound(id.to_string()))?;
    print_details(car);
    Ok(())
}

fn add(inventory: &mut Inventory, args: AddArgs) -> Result<()> {
    let mut fields = NewVehicle::from_input(
        &args.owner,
        &args.make,
        &args.model,
        &args.year,
        &args.color,
        &args.mileage,
    );
    if let Some(path) = &args.image {
        fields = fields.with_image(image::data_uri_from_path(path).context("Failed to read image")?);
    }

    let car = inventory.add(fields);
    warn_if_degraded(inventory);
    notify_success(&format!("Car added successfully! ({})", car.id));
    Ok(())
}

fn edit(inventory: &mut Inventory, args: EditArgs) -> Result<()> {
    let image = match &args.image {
        Some(path) => Some(image::data_uri_from_path(path).context("Failed to read image")?),
        None => None,
    };

    let patch = VehiclePatch {
        owner: args.owner,
        make: args.make,
        model: args.model,
        year: args.year.as_deref().map(Year::parse),
        color: args.color.map(Some),
        mileage: args.mileage.as_deref().map(parse_int),
        image,
    };

    if patch.is_empty() {
        println!("Nothing to update");
        return Ok(());
    }

    let car = inventory.update(&args.id, patch)?.clone();
    warn_if_degraded(inventory);
    notify_success("Car updated successfully!");
    print_details(&car);
    Ok(())
}

fn delete(inventory: &mut Inventory, id: &str) -> Result<()> {
    let car = inventory.remove(id)?;
    warn_if_degraded(inventory);
    notify_success(&format!("Car deleted successfully! ({}, owner {})", car.title(), car.owner));
    Ok(())
}

fn import(inventory: &mut Inventory, file: &Path) -> Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let count = inventory.import_csv(&text).context("Error importing CSV file")?;

    warn_if_degraded(inventory);
    notify_success(&format!("CSV imported successfully! ({} cars)", count));
    Ok(())
}

fn export(inventory: &Inventory, out: PathBuf) -> Result<()> {
    let path = if out.is_dir() { out.join(EXPORT_FILE_NAME) } else { out };

    let csv = inventory.export_csv()?;
    fs::write(&path, csv).with_context(|| format!("Failed to write {}", path.display()))?;

    notify_success(&format!("CSV exported successfully! ({})", path.display()));
    Ok(())
}

fn settings(kv: &dyn KeyValueStore, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show { json } => {
            let settings = Settings::load(kv)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                println!("Theme:         {}", settings.theme);
                println!("Large text:    {}", on_off(settings.large_text));
                println!("High contrast: {}", on_off(settings.high_contrast));
                println!("Screen reader: {}", on_off(settings.screen_reader));
                println!("Language:      {}", settings.language);
            }
        }
        SettingsAction::Set {
            theme,
            large_text,
            high_contrast,
            screen_reader,
            language,
        } => {
            if let Some(theme) = theme {
                Settings::set_theme(kv, theme).context("Failed to save theme")?;
            }
            if let Some(on) = large_text {
                Settings::set_large_text(kv, on).context("Failed to save large text setting")?;
            }
            if let Some(on) = high_contrast {
                Settings::set_high_contrast(kv, on).context("Failed to save high contrast setting")?;
            }
            if let Some(on) = screen_reader {
                Settings::set_screen_reader(kv, on).context("Failed to save screen reader setting")?;
            }
            if let Some(language) = language {
                Settings::set_language(kv, &language).context("Failed to save language")?;
            }
            notify_success("Settings saved successfully!");
        }
    }
    Ok(())
}

fn print_details(car: &VehicleRecord) {
    println!("{}", car.title().bold());
    println!("Car ID:  {}", car.id);
    println!("Owner:   {}", car.owner);
    println!("Make:    {}", car.make);
    println!("Model:   {}", car.model);
    println!("Year:    {}", car.year);
    println!("Color:   {}", car.color.as_deref().unwrap_or("N/A"));
    match car.mileage {
        Some(miles) => println!("Mileage: {} miles", group_thousands(miles)),
        None => println!("Mileage: N/A"),
    }
    match car.image.as_deref() {
        Some(uri) => {
            let mime = uri
                .strip_prefix("data:")
                .and_then(|rest| rest.split(';').next())
                .unwrap_or("unknown");
            match image::payload_len(uri) {
                Some(size) => println!("Image:   {} ({} bytes)", mime, size),
                None => println!("Image:   {}", mime),
            }
        }
        None => println!("Image:   [CAR IMAGE]"),
    }
}

/// 45000 -> "45,000"
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 { format!("-{}", out) } else { out }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn warn_if_degraded(inventory: &Inventory) {
    if inventory.is_degraded() {
        notify_warning("Could not save to persistent storage; this change is in memory only");
    }
}

fn notify_success(message: &str) {
    println!("{}", message.green());
}

fn notify_warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

fn notify_error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}
