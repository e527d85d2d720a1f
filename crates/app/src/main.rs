//! Plaza Application CLI

use std::process;

use clap::{Args, Parser, Subcommand};
use plaza_app::{
    database::{self, Db},
    domain::{
        sellers::{PgSellersService, SellersService, data::NewSeller, records::SellerUuid},
        users::{PgUsersService, UsersService, data::NewUser, records::UserUuid},
    },
};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "plaza-app", about = "Plaza CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    User(UserCommand),
    Seller(SellerCommand),
}

#[derive(Debug, Args)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    Create(CreateUserArgs),
}

#[derive(Debug, Args)]
struct CreateUserArgs {
    /// User display name
    #[arg(long)]
    name: String,

    /// Email address, unique per user
    #[arg(long)]
    email: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Optional user UUID; generated when omitted
    #[arg(long)]
    user_uuid: Option<Uuid>,
}

#[derive(Debug, Args)]
struct SellerCommand {
    #[command(subcommand)]
    command: SellerSubcommand,
}

#[derive(Debug, Subcommand)]
enum SellerSubcommand {
    Create(CreateSellerArgs),
}

#[derive(Debug, Args)]
struct CreateSellerArgs {
    /// Shop display name
    #[arg(long)]
    name: String,

    /// UUID of the user who owns the shop
    #[arg(long)]
    user_uuid: Uuid,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::User(UserCommand {
            command: UserSubcommand::Create(args),
        }) => create_user(args).await,
        Commands::Seller(SellerCommand {
            command: SellerSubcommand::Create(args),
        }) => create_seller(args).await,
    }
}

async fn connect(database_url: &str) -> Result<Db, String> {
    let pool = database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(Db::new(pool))
}

async fn create_user(args: CreateUserArgs) -> Result<(), String> {
    let db = connect(&args.database_url).await?;

    let service = PgUsersService::new(db);
    let uuid = args.user_uuid.map_or_else(UserUuid::new, UserUuid::from_uuid);

    let user = service
        .create_user(NewUser {
            uuid,
            name: args.name,
            email: args.email,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("user_name: {}", user.name);
    println!("user_email: {}", user.email);

    Ok(())
}

async fn create_seller(args: CreateSellerArgs) -> Result<(), String> {
    let db = connect(&args.database_url).await?;

    let service = PgSellersService::new(db);

    let seller = service
        .create_seller(NewSeller {
            uuid: SellerUuid::new(),
            user_uuid: UserUuid::from_uuid(args.user_uuid),
            name: args.name,
        })
        .await
        .map_err(|error| format!("failed to create seller: {error}"))?;

    println!("seller_uuid: {}", seller.uuid);
    println!("seller_name: {}", seller.name);
    println!("owner_uuid: {}", seller.user_uuid);

    Ok(())
}
