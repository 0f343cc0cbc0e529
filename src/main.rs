use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tally::model::{EndpointConfig, Location};
use tally::remote::EndpointClient;
use tally::session::Session;
use tally::store::ConfigStore;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Stock movement entry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and list the master catalog
    Master {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Record one stock movement without the TUI
    Submit {
        /// Variant code (optional when maker/model/dia are given)
        #[arg(long, default_value = "")]
        code: String,

        #[arg(long, default_value = "")]
        maker: String,

        #[arg(long, default_value = "")]
        model: String,

        /// Diameter (numeric)
        #[arg(long, default_value = "")]
        dia: String,

        /// site_stock or warehouse_stock
        #[arg(long)]
        location: String,

        #[arg(long)]
        qty: String,

        /// Piece count (optional)
        #[arg(long, default_value = "")]
        hon: String,

        #[arg(long, default_value = "")]
        note: String,

        /// Register even if the variant is not in the catalog
        #[arg(long)]
        new: bool,
    },

    /// Configure or show the service endpoint
    Endpoint {
        #[command(subcommand)]
        command: EndpointCommands,
    },
}

#[derive(Subcommand)]
enum EndpointCommands {
    /// Show the configured endpoint
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Set the configured endpoint
    Set {
        #[arg(long)]
        url: String,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => tally::tui::run()?,

        Some(Commands::Master { json }) => {
            let store = ConfigStore::open_default()?;
            let client = require_client(&store)?;
            let master = client.fetch_master()?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&master).context("serialize master json")?
                );
            } else {
                for v in &master {
                    println!("{}\t{}\t{}\t{}", v.code, v.maker, v.model, v.dia);
                }
            }
        }

        Some(Commands::Submit {
            code,
            maker,
            model,
            dia,
            location,
            qty,
            hon,
            note,
            new,
        }) => {
            let store = ConfigStore::open_default()?;
            let client = require_client(&store)?;

            let mut session = Session::new(Some(client));
            session.refresh_catalog()?;

            session.set_new_mode(new);
            if code.trim().is_empty() {
                session.set_maker_text(&maker);
                session.set_model_text(&model);
                session.set_dia_text(&dia);
                // Fill the code from the catalog when the triple names a
                // known variant, so the sheet row carries it.
                session.sync_code();
            } else {
                session.enter_code(&code);
            }

            let location = Location::parse(&location)
                .with_context(|| format!("unknown location {:?} (site_stock or warehouse_stock)", location))?;
            session.set_location(location);
            session.set_quantity(&qty);
            session.set_piece_count(&hon);
            session.set_note(&note);

            session.submit()?;
            println!(
                "Recorded ({} variants in catalog)",
                session.catalog().len()
            );
        }

        Some(Commands::Endpoint { command }) => {
            let store = ConfigStore::open_default()?;
            match command {
                EndpointCommands::Show { json } => {
                    let cfg = store.read_config()?;
                    if json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&cfg.endpoint)
                                .context("serialize endpoint json")?
                        );
                    } else if let Some(endpoint) = cfg.endpoint {
                        println!("url: {}", endpoint.url);
                    } else {
                        println!("No endpoint configured");
                    }
                }
                EndpointCommands::Set { url } => {
                    let mut cfg = store.read_config()?;
                    cfg.endpoint = Some(EndpointConfig { url });
                    store.write_config(&cfg)?;
                    println!("Endpoint configured");
                }
            }
        }
    }

    Ok(())
}

fn require_client(store: &ConfigStore) -> Result<EndpointClient> {
    let endpoint = store
        .endpoint()?
        .context("no endpoint configured (run `tally endpoint set --url ...`)")?;
    EndpointClient::new(endpoint)
}
