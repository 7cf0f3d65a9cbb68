use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
#[cfg(target_family = "windows")]
use colored::control::set_virtual_terminal;
use colored::Colorize;
use hero_tour::{
    spawn_search_pipeline, Dashboard, Hero, HeroConfig, HeroDetail, HeroId, HeroService, HeroesView,
    MessageLog, MessagesPanel,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hero-tour", about = "Browse and edit the hero roster")]
struct Cli {
    #[arg(long, env = "HEROES_API_URL")]
    base_url: Option<String>,

    #[arg(long, env = "HEROES_SEARCH_DEBOUNCE_MS")]
    debounce_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// All heroes
    List,
    /// Top heroes
    Dashboard,
    Get {
        id: HeroId,
    },
    Add {
        name: String,
    },
    Rename {
        id: HeroId,
        name: String,
    },
    Delete {
        id: HeroId,
    },
    /// Type the given terms into the search box, one after another
    Search {
        #[arg(required = true)]
        terms: Vec<String>,
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },
    /// Live search: every stdin line is a new search-box value
    Shell,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = HeroConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(ms) = cli.debounce_ms {
        config = config.with_search_debounce(Duration::from_millis(ms));
    }
    tracing::info!(base_url = %config.base_url, "hero-tour starting");

    #[cfg(target_family = "windows")]
    {
        if set_virtual_terminal(true).is_err() {
            eprintln!("failed to print colorfully.")
        };
    }

    let messages = MessageLog::new();
    let service = HeroService::new(&config, messages.clone())?;

    match cli.command {
        Command::List => {
            let mut view = HeroesView::new(service);
            view.load().await;
            print_heroes("My Heroes", &view.heroes);
        }
        Command::Dashboard => {
            let mut dashboard = Dashboard::new(service);
            dashboard.load().await;
            print_heroes("Top Heroes", &dashboard.heroes);
        }
        Command::Get { id } => {
            let mut detail = HeroDetail::new(service);
            match detail.load(id).await {
                Some(hero) => print_detail(hero),
                None => eprintln!("{}", format!("no hero with id {id}").red()),
            }
        }
        Command::Add { name } => {
            let mut view = HeroesView::new(service);
            view.load().await;
            if view.add(&name).await.is_none() {
                eprintln!("{}", "hero not added".red());
            }
            print_heroes("My Heroes", &view.heroes);
        }
        Command::Rename { id, name } => {
            let mut detail = HeroDetail::new(service);
            detail.load(id).await;
            if detail.rename(&name) && detail.save().await {
                if let Some(hero) = &detail.hero {
                    print_detail(hero);
                }
            } else {
                eprintln!("{}", format!("hero {id} not renamed").red());
            }
        }
        Command::Delete { id } => {
            let mut view = HeroesView::new(service);
            view.load().await;
            view.delete(id).await;
            print_heroes("My Heroes", &view.heroes);
        }
        Command::Search { terms, interval_ms } => {
            let (handle, results) = spawn_search_pipeline(Arc::new(service), config.search_debounce);
            let typing = async move {
                for term in terms {
                    println!("{} {}", ">".cyan(), term);
                    handle.search(term);
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
            };
            futures::join!(typing, print_batches(results));
        }
        Command::Shell => {
            let (handle, mut results) = spawn_search_pipeline(Arc::new(service), config.search_debounce);
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                tokio::select! {
                    line = lines.next_line() => match line? {
                        Some(term) => {
                            handle.search(term);
                        }
                        None => break,
                    },
                    Some(batch) = results.recv() => print_heroes("Hero Search", &batch),
                }
            }
            drop(handle);
            print_batches(results).await;
        }
    }

    print_messages(&MessagesPanel::new(messages));
    Ok(())
}

async fn print_batches(mut results: UnboundedReceiver<Vec<Hero>>) {
    while let Some(batch) = results.recv().await {
        print_heroes("Hero Search", &batch);
    }
}

fn print_heroes(title: &str, heroes: &[Hero]) {
    println!("{}", title.bold());
    if heroes.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for hero in heroes {
        println!("  {:>4}  {}", hero.id.to_string().yellow(), hero.name);
    }
}

fn print_detail(hero: &Hero) {
    println!("{} Details", hero.name.to_uppercase().bold());
    println!("  id: {}", hero.id.to_string().yellow());
    println!("  name: {}", hero.name);
}

fn print_messages(panel: &MessagesPanel) {
    let messages = panel.messages();
    if messages.is_empty() {
        return;
    }
    println!("{}", "Messages".bold());
    for message in messages {
        if message.contains(" failed: ") {
            println!("  {}", message.red());
        } else {
            println!("  {}", message.green());
        }
    }
    panel.clear();
}
