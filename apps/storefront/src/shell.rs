use anyhow::Result;
use client_core::{AddOutcome, StoreEvent, StorefrontController};
use shared::domain::ProductId;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast,
};
use tracing::debug;

use crate::render::{render_notification, render_view};

const HELP: &str = "\
commands:
  products            reload and list products
  show <id>           open a product
  qty <n>             set the quantity on the open product
  + / -               step the quantity
  add                 add the open product with the chosen quantity
  add <n>             set the quantity, then add the open product
  add <id> [n]        add a product directly (default 1)
  cart                reload and show the cart
  checkout            place the order
  back                return to the product list
  help                show this text
  quit                leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Products,
    Show(ProductId),
    Quantity(String),
    Increment,
    Decrement,
    AddCurrent(Option<String>),
    AddProduct(ProductId, u32),
    Cart,
    Checkout,
    Back,
    Help,
    Quit,
}

/// `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("products" | "list" | "ls", []) => ShellCommand::Products,
        ("show" | "open", [id]) => ShellCommand::Show(parse_product_id(id)?),
        ("qty" | "quantity", [value]) => ShellCommand::Quantity((*value).to_string()),
        ("+", []) => ShellCommand::Increment,
        ("-", []) => ShellCommand::Decrement,
        ("add", []) => ShellCommand::AddCurrent(None),
        ("add", [arg]) => match arg.parse::<ProductId>() {
            Ok(id) => ShellCommand::AddProduct(id, 1),
            Err(_) => ShellCommand::AddCurrent(Some((*arg).to_string())),
        },
        ("add", [id, quantity]) => {
            let quantity = quantity
                .parse::<u32>()
                .map_err(|_| format!("invalid quantity '{quantity}'"))?;
            ShellCommand::AddProduct(parse_product_id(id)?, quantity)
        }
        ("cart", []) => ShellCommand::Cart,
        ("checkout", []) => ShellCommand::Checkout,
        ("back", []) => ShellCommand::Back,
        ("help" | "?", []) => ShellCommand::Help,
        ("quit" | "exit" | "q", []) => ShellCommand::Quit,
        (other, _) => return Err(format!("unrecognized command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

fn parse_product_id(raw: &str) -> Result<ProductId, String> {
    raw.parse()
        .map_err(|_| format!("'{raw}' is not a product id"))
}

/// Reads commands from stdin until `quit` or end of input.
pub async fn run(controller: &mut StorefrontController) -> Result<()> {
    let mut events = controller.subscribe_events();
    controller.start().await;
    print_notifications(&mut events);
    print!("{}", render_view(&controller.view_model()));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        debug!(?command, "shell: dispatching command");

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                println!("{HELP}");
                continue;
            }
            command => dispatch(controller, command).await,
        }

        print_notifications(&mut events);
        print!("{}", render_view(&controller.view_model()));
    }
    Ok(())
}

async fn dispatch(controller: &mut StorefrontController, command: ShellCommand) {
    match command {
        ShellCommand::Products => {
            controller.load_products().await;
            controller.show_products();
        }
        ShellCommand::Show(id) => {
            controller.show_product_detail(id).await;
        }
        ShellCommand::Quantity(raw) => report_quantity(controller.set_quantity_input(raw)),
        ShellCommand::Increment => report_quantity(controller.increment_quantity()),
        ShellCommand::Decrement => report_quantity(controller.decrement_quantity()),
        ShellCommand::AddCurrent(quantity) => {
            if let Some(raw) = quantity {
                if let Err(err) = controller.set_quantity_input(raw) {
                    println!("{err}");
                    return;
                }
            }
            if let AddOutcome::Invalid(err) = controller.add_to_cart_from_detail().await {
                println!("{err}");
            }
        }
        ShellCommand::AddProduct(id, quantity) => {
            controller.add_to_cart(id, quantity).await;
        }
        ShellCommand::Cart => {
            controller.load_cart().await;
            controller.show_cart();
        }
        ShellCommand::Checkout => {
            controller.checkout().await;
        }
        ShellCommand::Back => controller.show_products(),
        ShellCommand::Help | ShellCommand::Quit => {}
    }
}

fn report_quantity<E: std::fmt::Display>(result: Result<u32, E>) {
    if let Err(err) = result {
        println!("{err}");
    }
}

/// Prints notifications emitted since the last call. Other events only
/// matter to the rendered view, which is redrawn after every command.
pub fn print_notifications(events: &mut broadcast::Receiver<StoreEvent>) {
    loop {
        match events.try_recv() {
            Ok(StoreEvent::Notification(notification)) => {
                println!("{}", render_notification(&notification));
            }
            Ok(_) => {}
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                debug!(skipped, "shell: event receiver lagged");
            }
            Err(_) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn add_distinguishes_quantity_from_product_id() {
        let id = Uuid::new_v4();
        assert_eq!(
            parse_command(&format!("add {id}")),
            Ok(Some(ShellCommand::AddProduct(ProductId(id), 1)))
        );
        assert_eq!(
            parse_command(&format!("add {id} 3")),
            Ok(Some(ShellCommand::AddProduct(ProductId(id), 3)))
        );
        assert_eq!(
            parse_command("add 4"),
            Ok(Some(ShellCommand::AddCurrent(Some("4".into()))))
        );
        assert_eq!(parse_command("add"), Ok(Some(ShellCommand::AddCurrent(None))));
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(parse_command("show nope").is_err());
        assert!(parse_command(&format!("add {} many", Uuid::new_v4())).is_err());
        assert!(parse_command("dance").is_err());
        assert!(parse_command("back now").is_err());
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(parse_command("CHECKOUT"), Ok(Some(ShellCommand::Checkout)));
        assert_eq!(parse_command("Qty 2"), Ok(Some(ShellCommand::Quantity("2".into()))));
    }
}
