use std::path::PathBuf;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;
use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use todo_web3::app::{App, StatusLevel};
use todo_web3::config::{self, expand_path, Config};
use todo_web3::core::{parse_command, Command, HELP};
use todo_web3::domain::{TaskRow, TodoError};
use todo_web3::infrastructure::ethereum::{create_wallet, ProviderConfig, SignerSource};
use todo_web3::infrastructure::runtime::{
    event_channel, EventSender, Mutation, MutationExecutor, TaskLoader, Ticket,
};

#[derive(Debug, Parser)]
#[command(
    name = "todo-web3",
    version,
    about = "Task lists stored in the Simple and TodoWeb3 contracts"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// Private key used to sign transactions
    #[arg(long, env = "TODO_WEB3_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Unlocked node account to send from when no private key is given
    #[arg(long)]
    account: Option<Address>,

    /// Networks JSON mapping chain ids to TodoWeb3 deployments
    #[arg(long)]
    networks: Option<PathBuf>,

    /// Simple store address
    #[arg(long)]
    simple_address: Option<Address>,

    /// Parallel task reads while loading (1 = sequential)
    #[arg(long)]
    fetch_concurrency: Option<usize>,
}

type Pending = FuturesUnordered<LocalBoxFuture<'static, ()>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = config::load();

    let provider_config = provider_config_from_args_and_config(&args, &config)?;
    let networks_path = args
        .networks
        .clone()
        .or_else(|| config.networks.as_deref().map(expand_path));
    let networks = config::load_networks(networks_path.as_deref())?;
    let simple_address = args
        .simple_address
        .unwrap_or_else(|| config.simple_address_or_default());
    let loader = TaskLoader::concurrent(
        args.fetch_concurrency
            .or(config.fetch_concurrency)
            .unwrap_or(1),
    );

    let wallet = create_wallet(provider_config)?;
    let mut app = App::new(loader);
    if let Err(err) = app.initialize(wallet.as_ref(), &networks, simple_address).await {
        // Unsupported network and failed initial loads both stop here
        return Err(err).context("startup failed");
    }

    println!(
        "connected to {} (chain {}) as {}",
        app.endpoint,
        app.chain_id.unwrap_or_default(),
        app.account.map(|a| a.to_string()).unwrap_or_default()
    );
    render(&app);

    run_app(app).await
}

async fn run_app(mut app: App) -> Result<()> {
    let (evt_tx, mut evt_rx) = event_channel();
    let mut pending: Pending = FuturesUnordered::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("read stdin")? {
                    Some(line) => handle_line(&mut app, &line, &evt_tx, &mut pending),
                    None => app.should_quit = true,
                }
            }
            Some(()) = pending.next(), if !pending.is_empty() => {}
            Some(event) = evt_rx.recv() => {
                app.apply_event(event);
                print_status(&app);
                if app.in_flight_count() == 0 {
                    render(&app);
                }
            }
        }

        app.on_tick();
        if app.should_quit {
            break;
        }
    }

    // Submitted transactions cannot be recalled; wait for them to settle
    if !pending.is_empty() {
        eprintln!("waiting for {} pending transaction(s)", pending.len());
        while pending.next().await.is_some() {}
    }
    while let Ok(event) = evt_rx.try_recv() {
        app.apply_event(event);
    }
    print_status(&app);
    Ok(())
}

fn handle_line(app: &mut App, line: &str, evt_tx: &EventSender, pending: &mut Pending) {
    if line.trim().is_empty() {
        return;
    }
    let prepared = match parse_command(line) {
        Command::Add(text) => app.on_add_simple(&text),
        Command::Complete(id) => app.on_complete_simple(id),
        Command::Create(text) => app.on_create(&text),
        Command::Toggle(id) => app.on_toggle(id),
        Command::ClearCompleted => app.on_clear_completed(),
        Command::Filter(filter) => {
            if app.set_filter(filter) {
                render(app);
            }
            return;
        }
        Command::Reload => {
            match app.executor() {
                Ok(executor) => {
                    let tx = evt_tx.clone();
                    pending.push(async move { executor.reload_all(&tx).await }.boxed_local());
                }
                Err(err) => app.set_status(err.to_string(), StatusLevel::Warn),
            }
            print_status(app);
            return;
        }
        Command::List => {
            render(app);
            return;
        }
        Command::Help => {
            println!("{HELP}");
            return;
        }
        Command::Quit => {
            app.should_quit = true;
            return;
        }
        Command::Unknown(input) => {
            app.set_status(format!("Unknown command: {input}"), StatusLevel::Warn);
            print_status(app);
            return;
        }
    };

    let (ticket, mutation) = match prepared {
        Ok(prepared) => prepared,
        Err(_) => return print_status(app),
    };
    match app.executor() {
        Ok(executor) => spawn_mutation(pending, executor, ticket, mutation, evt_tx.clone()),
        Err(err) => {
            app.discard(ticket);
            app.set_status(err.to_string(), StatusLevel::Warn);
            print_status(app);
        }
    }
}

fn spawn_mutation(
    pending: &mut Pending,
    executor: MutationExecutor,
    ticket: Ticket,
    mutation: Mutation,
    evt_tx: EventSender,
) {
    println!("#{ticket} {} …", mutation.method());
    pending.push(
        async move {
            // the outcome is reported through events
            let _: Result<_, TodoError> = executor.execute(ticket, mutation, &evt_tx).await;
        }
        .boxed_local(),
    );
}

fn provider_config_from_args_and_config(args: &Args, config: &Config) -> Result<ProviderConfig> {
    let rpc = args
        .rpc
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(normalize_http_endpoint)
        .unwrap_or_else(|| normalize_http_endpoint(&config.rpc_or_default()));

    let private_key = args
        .private_key
        .clone()
        .or_else(|| config.private_key.clone())
        .filter(|s| !s.trim().is_empty());
    let signer = match private_key {
        Some(key) => SignerSource::from_private_key(&key)?,
        None => SignerSource::Unlocked(args.account.or(config.account)),
    };

    Ok(ProviderConfig { rpc, signer })
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

fn render(app: &App) {
    println!("── Simple ──");
    print_rows(&app.simple_rows());
    println!(
        "── TodoWeb3 [{}] {} task(s){} ──",
        app.active_filter(),
        app.task_count(),
        if app.clear_completed_visible() {
            " · clear available"
        } else {
            ""
        }
    );
    print_rows(&app.task_rows());
}

fn print_rows(rows: &[TaskRow]) {
    if rows.is_empty() {
        println!("  (none)");
    }
    for row in rows {
        let mark = if row.completed { "✔" } else { " " };
        println!("  [{mark}] {:>3}  {}", row.id, row.text);
    }
}

fn print_status(app: &App) {
    if let Some((text, level)) = app.status_text() {
        match level {
            StatusLevel::Info => println!("{text}"),
            StatusLevel::Warn => println!("warning: {text}"),
            StatusLevel::Error => println!("error: {text}"),
        }
    }
}
