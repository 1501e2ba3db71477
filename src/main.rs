use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use polytrend::{config::Config, registry::Registry, session::Session};

#[derive(Parser)]
#[command(
    name = "polytrend",
    version,
    about = "Fit polynomial trends to regional time series and describe them"
)]
struct Cli {
    #[arg(long, help = "TOML file overriding the default limits")]
    config: Option<PathBuf>,

    #[arg(long, help = "List categories and their entities, then exit")]
    list: bool,

    #[arg(short, long, help = "Category to explore (defaults to the first one)")]
    category: Option<String>,

    #[arg(short, long = "entity", help = "Entity to include; repeat for several")]
    entities: Vec<String>,

    #[arg(short, long, help = "Polynomial degree, clamped to what the data allows")]
    degree: Option<usize>,

    #[arg(short, long, help = "Year step between predictions")]
    interval: Option<f64>,

    #[arg(long = "set", value_name = "YEAR:ENTITY=VALUE", help = "Edit a cell; an empty value clears it")]
    edits: Vec<String>,

    #[arg(long = "add-row", value_name = "YEAR", help = "Add an empty row for a year")]
    add_rows: Vec<i32>,

    #[arg(long = "drop-year", value_name = "YEAR", help = "Remove the row for a year")]
    drop_years: Vec<i32>,

    #[arg(long, help = "Print the report as JSON")]
    json: bool,

    #[arg(long, value_name = "FILE", help = "Write a chart to an .svg or .png file")]
    plot: Option<PathBuf>,
}

/// A parsed `YEAR:ENTITY=VALUE` edit.
#[derive(Debug, PartialEq)]
struct CellEdit {
    year: i32,
    entity: String,
    value: Option<f64>,
}

fn parse_edit(text: &str) -> Result<CellEdit> {
    let (year, rest) = text
        .split_once(':')
        .with_context(|| format!("Edit `{text}` is not of the form YEAR:ENTITY=VALUE"))?;
    let (entity, value) = rest
        .split_once('=')
        .with_context(|| format!("Edit `{text}` is missing `=VALUE`"))?;

    let year = year
        .trim()
        .parse::<i32>()
        .with_context(|| format!("`{year}` is not a year"))?;
    let value = match value.trim() {
        "" => None,
        v => Some(v.parse::<f64>().with_context(|| format!("`{v}` is not a number"))?),
    };

    Ok(CellEdit {
        year,
        entity: entity.trim().to_string(),
        value,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let registry = Registry::builtin();
    if cli.list {
        for category in registry.categories() {
            println!("{category}: {}", registry.entities(category)?.join(", "));
        }
        return Ok(());
    }

    let mut session = Session::new(registry, config)?;
    if let Some(category) = &cli.category {
        session.select_category(category)?;
    }
    if !cli.entities.is_empty() {
        session.select_entities(&cli.entities)?;
    }

    // Edits change how many points are usable, so they go before the degree
    for year in &cli.add_rows {
        session.table_mut().insert_row(Some(*year))?;
    }
    for year in &cli.drop_years {
        if !session.table_mut().remove_year(*year) {
            log::warn!("No row for {year} to remove");
        }
    }
    for edit in &cli.edits {
        let edit = parse_edit(edit)?;
        session.table_mut().set_value(edit.year, &edit.entity, edit.value)?;
    }

    // A column too short for any degree fails on its own in the report
    if let Err(e) = session.set_degree(cli.degree.unwrap_or(session.config().default_degree)) {
        log::warn!("{e}; fitting at degree {}", session.degree());
    }
    if let Some(interval) = cli.interval {
        session.set_interval(interval)?;
    }

    let outcome = session.run()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    } else {
        println!("{}", session.table());
        for (entity, result) in outcome.report.entries() {
            match result {
                Ok(r) => println!(
                    "**{entity} Regression Equation (Degree {}):** {}",
                    r.degree, r.equation
                ),
                Err(e) => println!("**{entity}:** {e}"),
            }
        }

        println!();
        println!("Function Analysis");
        for (entity, text) in &outcome.narratives {
            println!("- {entity}: {text}");
        }
    }

    if let Some(path) = &cli.plot {
        write_plot(&session, &outcome.report, path)?;
    }

    Ok(())
}

#[cfg(feature = "plotting")]
fn write_plot(session: &Session<'_>, report: &polytrend::report::Report, path: &std::path::Path) -> Result<()> {
    use polytrend::plot::{write_chart, ChartSpec, PlotOptions};

    let spec = ChartSpec::from_report(session.category(), report);
    write_chart(&spec, &PlotOptions::from(session.config()), path)
        .with_context(|| format!("Failed to write chart to {}", path.display()))
}

#[cfg(not(feature = "plotting"))]
fn write_plot(_: &Session<'_>, _: &polytrend::report::Report, path: &std::path::Path) -> Result<()> {
    anyhow::bail!("Cannot write {}: built without the `plotting` feature", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit() {
        assert_eq!(
            parse_edit("2020:Mexico=130000000").unwrap(),
            CellEdit {
                year: 2020,
                entity: "Mexico".to_string(),
                value: Some(130_000_000.0),
            }
        );
        assert_eq!(parse_edit("1950:Life expectancy=").unwrap().value, None);
        assert!(parse_edit("2020-Mexico=1").is_err());
        assert!(parse_edit("2020:Mexico").is_err());
        assert!(parse_edit("year:Mexico=1").is_err());
        assert!(parse_edit("2020:Mexico=lots").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "polytrend", "-c", "Population", "-e", "Mexico", "-e", "Brazil", "-d", "4", "--set", "2020:Mexico=",
        ])
        .unwrap();
        assert_eq!(cli.entities, vec!["Mexico", "Brazil"]);
        assert_eq!(cli.degree, Some(4));
        assert_eq!(cli.edits.len(), 1);
    }
}
