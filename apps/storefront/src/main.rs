mod config;
mod render;
mod shell;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AddOutcome, CartMode, CheckoutOutcome, FileCartIdStore, HttpStorefrontApi, LoadOutcome,
    StorefrontController,
};
use shared::domain::ProductId;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::load_settings, render::render_view, shell::print_notifications};

#[derive(Parser, Debug)]
#[command(name = "storefront", about = "Browse products and manage a cart")]
struct Cli {
    /// TOML settings file; `storefront.toml` in the working directory is
    /// read when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    /// `session` or `identifier`.
    #[arg(long)]
    cart_mode: Option<CartMode>,
    #[arg(long)]
    cart_id_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the catalog.
    Products,
    /// Show one product with its stock and price summary.
    Show { product_id: ProductId },
    Add {
        product_id: ProductId,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    Cart,
    Checkout,
    /// Interactive session (the default).
    Shell,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.server_url {
        settings.server_url = url;
    }
    if let Some(mode) = cli.cart_mode {
        settings.cart_mode = mode;
    }
    if let Some(path) = cli.cart_id_path {
        settings.cart_id_path = path;
    }

    let filter = EnvFilter::try_new(&settings.log_filter)
        .with_context(|| format!("invalid log filter '{}'", settings.log_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(
        server_url = %settings.server_url,
        cart_mode = %settings.cart_mode,
        "storefront: starting"
    );

    let api = HttpStorefrontApi::new(&settings.server_url, settings.request_timeout())?;
    let mut controller = StorefrontController::new(Arc::new(api), settings.cart_mode)
        .with_cart_id_store(Arc::new(FileCartIdStore::new(settings.cart_id_path.clone())))
        .with_notification_duration(settings.notification_duration());

    let command = cli.command.unwrap_or(Command::Shell);
    if let Command::Shell = command {
        shell::run(&mut controller).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut events = controller.subscribe_events();
    let ok = run_once(&mut controller, command).await;
    print_notifications(&mut events);
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Runs a single subcommand and prints the resulting view. Returns whether
/// the operation succeeded.
async fn run_once(controller: &mut StorefrontController, command: Command) -> bool {
    let ok = match command {
        Command::Products => controller.load_products().await == LoadOutcome::Loaded,
        Command::Show { product_id } => {
            controller.load_cart().await;
            controller.show_product_detail(product_id).await == LoadOutcome::Loaded
        }
        Command::Add {
            product_id,
            quantity,
        } => {
            controller.load_cart().await;
            let added = controller.add_to_cart(product_id, quantity).await == AddOutcome::Added;
            controller.show_cart();
            added
        }
        Command::Cart => {
            let outcome = controller.load_cart().await;
            controller.show_cart();
            outcome != LoadOutcome::Failed
        }
        Command::Checkout => {
            controller.load_cart().await;
            return controller.checkout().await == CheckoutOutcome::Completed;
        }
        Command::Shell => true,
    };
    print!("{}", render_view(&controller.view_model()));
    ok
}
