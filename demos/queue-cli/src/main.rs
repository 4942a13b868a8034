use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use queueline::prelude::*;
use queueline::{StoreQueue, describe_opening_days, logging, opening_hours};
use tokio::sync::mpsc;
use tracing::debug;

type Store = FileStore;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "queueline")]
#[command(about = "Queueline from the terminal: join queues, or run a store's queue", long_about = None)]
struct Cli {
    /// Where sessions are kept. Defaults to QUEUELINE_DATA_DIR, then the
    /// platform data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Customer app
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Seller app
    Seller {
        #[command(subcommand)]
        action: SellerAction,
    },
}

#[derive(Args)]
struct Credentials {
    username: String,
    #[arg(long, env = "QUEUELINE_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args)]
struct NewAccount {
    #[command(flatten)]
    credentials: Credentials,
    /// The password again
    #[arg(long, env = "QUEUELINE_PASSWORD_CONFIRM", hide_env_values = true)]
    confirm: String,
}

#[derive(Args)]
struct Position {
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,
}

#[derive(Subcommand)]
enum CustomerAction {
    /// Where the app would open
    Status,
    Login(Credentials),
    Register(NewAccount),
    Logout,
    /// Stores near a position
    Nearby(Position),
    Search {
        query: String,
        #[command(flatten)]
        position: Position,
    },
    /// A store and its queue
    Store { name: String },
    Join { store: String },
    Cancel { turn_id: String },
    /// Your turns and how many people are ahead
    Turns,
    /// Follow your turns until interrupted
    Watch,
    Rename { new_name: String },
}

#[derive(Subcommand)]
enum SellerAction {
    Status,
    Login(Credentials),
    Register {
        #[command(flatten)]
        account: NewAccount,
        #[command(flatten)]
        position: Position,
        /// ISO 8601, e.g. 2020-01-01T08:00:00
        #[arg(long)]
        opens: String,
        #[arg(long)]
        closes: String,
        /// Comma-separated, e.g. MO,TU,WE
        #[arg(long, value_delimiter = ',', required = true)]
        days: Vec<Weekday>,
    },
    Logout,
    /// The store's own record
    Store,
    /// The queue, in order
    Pending,
    History,
    Cancel { turn_id: String },
    Complete { turn_id: String },
    Absent { turn_id: String },
    /// Follow the queue until interrupted
    Watch,
    Rename { new_name: String },
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    logging::init("warn");
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "command failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn session_store(data_dir: &Path, role: &str) -> SessionStore<Store> {
    let dir = data_dir.join(role);
    SessionStore::new(
        FileStore::new(dir.join("secure.json")),
        FileStore::new(dir.join("cache.json")),
    )
}

fn resolve_data_dir(flag: Option<PathBuf>, config: &ClientConfig) -> PathBuf {
    flag.or_else(|| config.data_dir.clone())
        .or_else(|| dirs::data_dir().map(|d| d.join("queueline")))
        .unwrap_or_else(|| PathBuf::from(".queueline"))
}

async fn run(cli: Cli) -> Result<(), QueuelineError> {
    let config = ClientConfig::from_env()?;
    let data_dir = resolve_data_dir(cli.data_dir, &config);
    debug!(endpoint = %config.endpoint, data_dir = %data_dir.display(), "starting");

    match cli.command {
        Commands::Customer { action } => {
            let client = GraphQlClient::connect(&config, session_store(&data_dir, "customer"))?;
            let customer = Customer::new(client, PollingController::new(), config.poll_config());
            run_customer(&customer, action).await
        }
        Commands::Seller { action } => {
            let client = GraphQlClient::connect(&config, session_store(&data_dir, "seller"))?;
            let seller = Seller::new(client, PollingController::new(), config.poll_config());
            run_seller(&seller, action).await
        }
    }
}

/// Prints poll results until Ctrl-C. A rejected session ends the watch
/// with that error; other failures are shown and polling continues.
async fn follow<T>(
    handle: PollHandle,
    mut updates: mpsc::Receiver<Result<T, QueuelineError>>,
    mut show: impl FnMut(&T),
) -> Result<(), QueuelineError> {
    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            update = updates.recv() => match update {
                Some(Ok(value)) => show(&value),
                Some(Err(e)) if e.is_unauthorized() => break Err(e),
                Some(Err(e)) => eprintln!("{}", e.user_message()),
                None => break Ok(()),
            },
        }
    };
    handle.stop().await;
    outcome
}

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

async fn run_customer(
    customer: &Customer<HttpTransport, Store>,
    action: CustomerAction,
) -> Result<(), QueuelineError> {
    match action {
        CustomerAction::Status => println!("{:?}", customer.launch_route().await),
        CustomerAction::Login(c) => {
            customer.login(&c.username, &c.password).await?;
            println!("Logged in as {}", c.username);
        }
        CustomerAction::Register(account) => {
            let c = &account.credentials;
            customer.register(&c.username, &c.password, &account.confirm).await?;
            println!("Welcome, {}", c.username);
        }
        CustomerAction::Logout => customer.logout().await?,
        CustomerAction::Nearby(p) => {
            let here = FixedLocation::new(Coordinates::new(p.lat, p.lng));
            print_stores(&customer.nearby_stores_here(&here).await?);
        }
        CustomerAction::Search { query, position } => {
            let around = Coordinates::new(position.lat, position.lng);
            print_stores(&customer.search_stores(&query, around).await?);
        }
        CustomerAction::Store { name } => {
            let store = customer.store_detail(&name).await?;
            let me = customer.client().session().user_id().await;
            print_store_detail(&store, me.as_ref());
        }
        CustomerAction::Join { store } => {
            let turn = customer.join_queue(&store).await?;
            println!("Joined {store} (turn {})", turn.id);
        }
        CustomerAction::Cancel { turn_id } => {
            customer.cancel_turn(&TurnId::from(turn_id)).await?;
            println!("Turn canceled");
        }
        CustomerAction::Turns => print_my_turns(&customer.my_turns().await?),
        CustomerAction::Watch => {
            let (handle, updates) = customer.watch_my_turns();
            follow(handle, updates, |turns| print_my_turns(turns)).await?;
        }
        CustomerAction::Rename { new_name } => {
            let relogin = customer.change_username(&new_name).await?;
            println!("{}", relogin.message());
        }
    }
    Ok(())
}

fn print_stores(stores: &[StoreFeature]) {
    if stores.is_empty() {
        println!("No stores found");
    }
    for store in stores {
        let open = match store.properties.is_open {
            Some(true) => "open",
            Some(false) => "closed",
            None => "",
        };
        println!("{:<24} {open}", store.name());
    }
}

fn print_store_detail(store: &StoreFeature, me: Option<&UserId>) {
    let props = &store.properties;
    println!("{}", store.name());
    if let (Some(open), Some(close)) = (&props.opening_time, &props.closing_time) {
        println!("  {}", opening_hours(open, close));
    }
    if let Some(days) = &props.opening_days {
        println!("  {}", describe_opening_days(days));
    }

    let queue = StoreQueue::new(store);
    println!("  {} in queue", queue.len());
    if let Some(label) = me.and_then(|id| queue.label_for(id)) {
        println!("  You're in line: {label}");
    }
}

fn print_my_turns(turns: &[MyTurn]) {
    if turns.is_empty() {
        println!("You have no turns");
    }
    for entry in turns {
        println!(
            "{:<8} {:<24} {}",
            entry.turn.id,
            entry.store_name(),
            entry.people_ahead_label()
        );
    }
}

// ---------------------------------------------------------------------------
// Seller
// ---------------------------------------------------------------------------

async fn run_seller(
    seller: &Seller<HttpTransport, Store>,
    action: SellerAction,
) -> Result<(), QueuelineError> {
    match action {
        SellerAction::Status => println!("{:?}", seller.launch_route().await),
        SellerAction::Login(c) => {
            seller.login(&c.username, &c.password).await?;
            println!("Logged in as {}", c.username);
        }
        SellerAction::Register {
            account,
            position,
            opens,
            closes,
            days,
        } => {
            let registration = StoreRegistration {
                username: account.credentials.username,
                password: account.credentials.password,
                confirm_password: account.confirm,
                location: Coordinates::new(position.lat, position.lng),
                opening_time: opens,
                closing_time: closes,
                opening_days: days,
            };
            seller.register_store(&registration).await?;
            println!("Store {} is open for business", registration.username);
        }
        SellerAction::Logout => seller.logout().await?,
        SellerAction::Store => {
            let store = seller.store().await?;
            print_store_detail(&store, None);
        }
        SellerAction::Pending => print_pending(&seller.pending_turns().await?),
        SellerAction::History => {
            for closed in seller.turn_history().await? {
                println!(
                    "{:<8} {:<24} {}",
                    closed.turn.id,
                    closed.turn.member_name().unwrap_or("-"),
                    closed.outcome
                );
            }
        }
        SellerAction::Cancel { turn_id } => {
            seller.cancel_turn(&TurnId::from(turn_id)).await?;
        }
        SellerAction::Complete { turn_id } => {
            seller.complete_turn(&TurnId::from(turn_id)).await?;
        }
        SellerAction::Absent { turn_id } => {
            seller.mark_absent(&TurnId::from(turn_id)).await?;
        }
        SellerAction::Watch => {
            let (handle, updates) = seller.watch_pending_turns();
            follow(handle, updates, |turns| print_pending(turns)).await?;
        }
        SellerAction::Rename { new_name } => {
            let relogin = seller.rename_store(&new_name).await?;
            println!("{}", relogin.message());
        }
    }
    Ok(())
}

fn print_pending(turns: &[Turn]) {
    if turns.is_empty() {
        println!("Nobody is waiting");
    }
    for (position, turn) in turns.iter().enumerate() {
        println!(
            "{:>3}. {:<8} {}",
            position + 1,
            turn.id,
            turn.member_name().unwrap_or("-")
        );
    }
}
