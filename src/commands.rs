use crate::{OutputMode, emit_success};
use ivy::config::{self, IvyConfig};
use ivy::import;
use ivy::medication::{evidence_description, Access, Medication};
use ivy::storage::SqliteStore;
use ivy::ui::{self, Icons};
use std::path::Path;

pub fn run_init(output_mode: OutputMode, config_path: &Path, database: &Path, force: bool) -> anyhow::Result<()> {
    let config = IvyConfig::with_database(database);
    config::write_config(config_path, &config, force)?;
    config::ensure_db_dir(database)?;
    SqliteStore::open(database)?;
    tracing::info!("Initialized {} with database {}", config_path.display(), database.display());

    if output_mode.is_human() {
        ui::success("Initialized ivy");
        ui::info("Config", &config_path.display().to_string());
        ui::info("Database", &database.display().to_string());
    } else {
        let data = serde_json::json!({
            "config": config_path.display().to_string(),
            "database": database.display().to_string(),
        });
        emit_success(output_mode, "init", data)?;
    }
    Ok(())
}

pub fn run_import(output_mode: OutputMode, store: &SqliteStore, file: &Path) -> anyhow::Result<()> {
    let records = import::read_records(file)?;
    if output_mode.is_human() {
        ui::header(&format!("Importing {} medications from {}", records.len(), file.display()));
    }

    let report = import::import_records(store, &records);

    if output_mode.is_human() {
        for failure in &report.failed {
            ui::warn(&format!("{} ({}): {}", failure.name, failure.id, failure.error));
        }
        println!("{}", report);
        if report.failed.is_empty() {
            ui::success("Import complete");
        }
    } else {
        emit_success(output_mode, "import", serde_json::to_value(&report)?)?;
    }
    Ok(())
}

pub fn run_list(output_mode: OutputMode, store: &SqliteStore, limit: usize, offset: usize) -> anyhow::Result<()> {
    let medications = store.list_medications(limit, offset)?;

    if output_mode.is_human() {
        if medications.is_empty() {
            println!("{} No medications available.", Icons::EMPTY);
        } else {
            println!("{}", ui::medication_table(&medications));
            println!("{}", ui::dim(&format!("{} shown (offset {})", medications.len(), offset)));
        }
    } else {
        emit_success(output_mode, "list", serde_json::to_value(&medications)?)?;
    }
    Ok(())
}

pub fn run_search(output_mode: OutputMode, store: &SqliteStore, query: &str, limit: usize) -> anyhow::Result<()> {
    let medications = store.search_medications(query, limit)?;

    if output_mode.is_human() {
        ui::header(&format!("Searching for: '{}' (limit: {})", query, limit));
        if medications.is_empty() {
            println!("{} No medications found matching \"{}\".", Icons::EMPTY, query);
        } else {
            println!("{}", ui::medication_table(&medications));
        }
    } else {
        emit_success(output_mode, "search", serde_json::to_value(&medications)?)?;
    }
    Ok(())
}

pub fn run_show(output_mode: OutputMode, store: &SqliteStore, id: &str, subscribed: bool) -> anyhow::Result<()> {
    let Some(medication) = store.get_medication_by_id(id)? else {
        anyhow::bail!("medication {} not found", id);
    };
    let access = medication.access(subscribed);

    if !output_mode.is_human() {
        let shown = match access {
            Access::Open => medication,
            Access::Restricted => medication.redacted(),
        };
        let data = serde_json::json!({
            "access": access,
            "medication": shown,
        });
        return emit_success(output_mode, "show", data);
    }

    print_header(&medication);
    match access {
        Access::Restricted => {
            println!();
            ui::locked(&format!(
                "Full details for {} are available to subscribers (use --subscriber).",
                medication.name
            ));
        }
        Access::Open => print_details(&medication),
    }
    Ok(())
}

fn print_header(medication: &Medication) {
    println!();
    match &medication.brand_name {
        Some(brand) => ui::header(&format!("{} ({})", medication.name, brand)),
        None => ui::header(&medication.name),
    }
    ui::summary_row("Risk:", &ui::risk_badge(medication.extravasation_risk.as_deref()));
    if let Some(class) = &medication.drug_class {
        ui::summary_row("Class:", class);
    }
    ui::summary_row("Evidence:", &ui::evidence_badge(medication.evidence_level.as_deref()));
    ui::summary_row("", &ui::muted(evidence_description(medication.evidence_level.as_deref())));
    if medication.is_free {
        ui::summary_row("Access:", &ui::free_badge());
    }
}

fn print_details(medication: &Medication) {
    if let Some(indication) = &medication.indication {
        ui::section("Indication");
        println!("{}", indication);
    }

    ui::section("Administration Recommendations");
    println!(
        "{}",
        medication
            .administration_recommendations
            .as_deref()
            .unwrap_or("N/A - Information to be added.")
    );

    ui::section("Line Requirements");
    let lines = medication.line_requirements;
    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
    println!(
        "Central: {}  Peripheral: {}  Midline: {}",
        yes_no(lines.central),
        yes_no(lines.peripheral),
        yes_no(lines.midline)
    );

    ui::section("Extravasation Management");
    println!("{}", medication.extravasation_management.as_deref().unwrap_or("N/A"));

    let optional_sections = [
        ("Mechanism of Injury", &medication.mechanism_of_injury),
        ("Dosage Considerations", &medication.dosage_considerations),
        ("Preparation Guidelines", &medication.preparation_guidelines),
        ("Administration Guidelines", &medication.administration_guidelines),
    ];
    for (title, body) in optional_sections {
        if let Some(body) = body {
            ui::section(title);
            println!("{}", body);
        }
    }

    ui::section("Antidotes");
    match medication.antidotes.as_deref() {
        Some(antidotes) if !antidotes.is_empty() => {
            for antidote in antidotes {
                println!("{} [{}]", antidote.name, antidote.priority.as_deref().unwrap_or("N/A"));
                if let Some(preparation) = &antidote.preparation {
                    ui::summary_row("Preparation:", preparation);
                }
                if let Some(administration) = &antidote.administration {
                    ui::summary_row("Administration:", administration);
                }
                if let Some(evidence) = &antidote.evidence_level {
                    ui::summary_row("Evidence:", evidence);
                }
                if let Some(reference) = &antidote.reference {
                    ui::summary_row("Ref:", reference);
                }
            }
        }
        _ => println!("{}", ui::dim("No specific antidotes listed.")),
    }

    ui::section("References");
    match medication.references.as_deref() {
        Some(references) if !references.is_empty() => {
            for reference in references {
                match &reference.url {
                    Some(url) => println!("{} {} <{}>", Icons::BOOK, reference.citation, url),
                    None => println!("{} {}", Icons::BOOK, reference.citation),
                }
            }
        }
        _ => println!("{}", ui::dim("No references listed.")),
    }

    if let Some(updated) = &medication.last_updated {
        println!();
        println!("{}", ui::dim(&format!("Last updated: {}", updated)));
    }
}

pub fn run_stats(output_mode: OutputMode, store: &SqliteStore) -> anyhow::Result<()> {
    let stats = store.stats()?;

    if output_mode.is_human() {
        println!("{} Ivy Statistics", Icons::STATS);
        let medications = stats.medications.to_string();
        let free = stats.free_medications.to_string();
        let antidotes = stats.antidotes.to_string();
        let references = stats.references.to_string();
        println!(
            "{}",
            ui::stats_table(&[
                ("Medications", medications.as_str()),
                ("Free", free.as_str()),
                ("Antidotes", antidotes.as_str()),
                ("References", references.as_str()),
            ])
        );
    } else {
        emit_success(output_mode, "stats", serde_json::to_value(&stats)?)?;
    }
    Ok(())
}
