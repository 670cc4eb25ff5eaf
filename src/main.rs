use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::error;

use contractor_registry::context::{context_block, prompt};
use contractor_registry::data::aggregate::{
    era_breakdown, grade_breakdown, overview, registrations_per_year, top_by_revenue, type_breakdown,
};
use contractor_registry::data::loader::load;
use contractor_registry::data::source::Source;
use contractor_registry::lookup::RegistryLookup;
use contractor_registry::state::DashboardState;
use contractor_registry::{AppConfig, EntityType, SnapshotCache};

#[derive(Parser)]
#[command(name = "contractor-registry")]
#[command(about = "Summaries and search over a contractor registry export")]
struct Args {
    /// JSON config file (REGISTRY_* environment variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV path or URL, overriding the configured source
    #[arg(short, long)]
    source: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Headline metrics
    Overview,
    /// Summaries by entity type, grade and era
    Groups,
    /// Highest-revenue companies
    Top {
        #[arg(short, default_value_t = 10)]
        n: usize,
    },
    /// Search companies by name and facets
    Search {
        #[arg(long)]
        text: Option<String>,
        /// Entity type (label such as "บจก." or name such as LimitedCompany); repeatable
        #[arg(long = "type")]
        types: Vec<String>,
        /// Grade; repeatable
        #[arg(long = "grade")]
        grades: Vec<String>,
        #[arg(long)]
        min_revenue: Option<f64>,
        #[arg(long)]
        min_capital: Option<f64>,
        /// Print matching records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the chat context block, optionally with a question appended
    Context {
        #[arg(long)]
        question: Option<String>,
    },
    /// Registry lookup URLs for every company with this exact name
    Lookup { name: String },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(source) = args.source {
        config.source.source = source;
    }

    let mut cache = SnapshotCache::new(config.cache_ttl());
    let key = Source::parse(&config.source.source).id();
    let mut state = DashboardState::default();
    match cache.get_or_load(&key, || load(&config.source)) {
        Ok(snapshot) => state.set_dataset(snapshot),
        Err(e) => {
            // Fail closed: nothing is rendered against a missing dataset.
            error!("{e}");
            return Err(e).context("loading registry data");
        }
    }
    let Some(dataset) = state.dataset.clone() else {
        anyhow::bail!("no dataset loaded");
    };

    match args.command {
        Command::Overview => {
            let o = overview(&dataset);
            println!("Companies:      {}", o.companies);
            println!("Total revenue:  {:.0} million", o.revenue_sum);
            println!("Mean revenue:   {}", fmt_opt(o.revenue_mean));
            match o.top_grade_count {
                Some(n) => println!("Grade A++:      {n}"),
                None => println!("Grade A++:      -"),
            }
            println!("Registrations per year:");
            for (year, n) in registrations_per_year(&dataset) {
                println!("  {year}: {n}");
            }
        }
        Command::Groups => {
            println!("By entity type:");
            for t in type_breakdown(&dataset) {
                println!(
                    "  {:<8} count={:<5} revenue={:.1} mean_revenue={} mean_capital={}",
                    t.entity_type.label(),
                    t.count,
                    t.revenue_sum,
                    fmt_opt(t.revenue_mean),
                    fmt_opt(t.capital_mean)
                );
            }
            println!("By grade:");
            match grade_breakdown(&dataset) {
                Some(rows) => {
                    for g in rows {
                        println!(
                            "  {:<8} count={:<5} mean_revenue={} mean_capital={}",
                            g.grade,
                            g.count,
                            fmt_opt(g.revenue_mean),
                            fmt_opt(g.capital_mean)
                        );
                    }
                }
                None => println!("  not applicable (no grade column)"),
            }
            println!("By era:");
            for e in era_breakdown(&dataset) {
                println!(
                    "  {:<10} count={:<5} mean_revenue={} mean_capital={}",
                    e.era.label(),
                    e.count,
                    fmt_opt(e.revenue_mean),
                    fmt_opt(e.capital_mean)
                );
            }
        }
        Command::Top { n } => {
            for (rank, r) in top_by_revenue(&dataset, n).into_iter().enumerate() {
                println!(
                    "{:>3}. {} ({}) {}",
                    rank + 1,
                    r.company_name,
                    r.entity_type.label(),
                    fmt_opt(r.total_revenue)
                );
            }
        }
        Command::Search {
            text,
            types,
            grades,
            min_revenue,
            min_capital,
            json,
        } => {
            if let Some(text) = text {
                state.set_search_text(text);
            }
            for t in &types {
                let parsed = EntityType::parse(t)
                    .with_context(|| format!("unknown entity type '{t}'"))?;
                state.toggle_entity_type(parsed);
            }
            for g in &grades {
                state.toggle_grade(g);
            }
            state.set_min_revenue(min_revenue);
            state.set_min_capital(min_capital);

            if json {
                let rows = state.visible_records();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if let Some(table) = state.visible_table() {
                println!("Found {} record(s)", table.rows.len());
                println!("{}", table.headers().join(" | "));
                for row in &table.rows {
                    println!("{}", row.join(" | "));
                }
            }
        }
        Command::Context { question } => {
            let ctx = context_block(&dataset);
            match question {
                Some(q) => println!("{}", prompt(&ctx, &q)),
                None => print!("{ctx}"),
            }
        }
        Command::Lookup { name } => {
            let lookup = RegistryLookup::from_config(&config.registry)?;
            let matches = dataset.find_by_name(&name);
            if matches.is_empty() {
                println!("No company named '{name}' in the dataset");
            } else if matches.len() > 1 {
                println!("{} companies share this name; links are identical for all", matches.len());
            }
            match (lookup.search_url(&name), lookup.profile_url(&name)) {
                (None, None) => println!("Registry lookup is not configured (set REGISTRY_SEARCH_URL / REGISTRY_PROFILE_URL)"),
                (search, profile) => {
                    if let Some(url) = search {
                        println!("search:  {url}");
                    }
                    if let Some(url) = profile {
                        println!("profile: {url}");
                    }
                }
            }
        }
    }

    Ok(())
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.1}")).unwrap_or_else(|| "n/a".to_string())
}
