use bter_trade::config::Config;
use bter_trade::exchange::{BterConnection, KeyHandler, PairTable};
use bter_trade::{OrderItem, TradeApi};
use log::info;
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// `None` once stdin is closed.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    io::stdout().flush().ok();
    next_line(&mut io::stdin().lock())
}

fn next_line(reader: &mut impl BufRead) -> Option<String> {
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

fn print_order(order: &OrderItem) {
    println!("\nOrder {}:", order.order_id());
    println!("  status: {}", order.status().unwrap_or("(not yet reported)"));
    println!("  pair: {}", order.pair());
    println!("  side: {}", order.side());
    println!("  rate: {} (initial {})", order.rate(), order.initial_rate());
    println!("  amount: {} (initial {})", order.amount(), order.initial_amount());
    if let Some(placed_at) = order.placed_at() {
        println!("  placed at: {}", placed_at.format("%Y-%m-%d %H:%M:%S"));
    }
}

fn init_api(config: &Config) -> Result<TradeApi, Box<dyn std::error::Error>> {
    let mut keys = KeyHandler::new();
    keys.add_key(config.api_key.clone(), config.api_secret.clone().into_bytes());

    let transport = BterConnection::new(&config.base_url, config.timeout)?;
    let api = TradeApi::new(
        config.api_key.clone(),
        &keys,
        Arc::new(transport),
        Arc::new(PairTable::bter()),
    )?
    .with_currencies(&config.currencies);
    Ok(api)
}

async fn place(api: &TradeApi, trade_type: &str) {
    let Some(pair) = read_line("Pair (e.g. btc_cny): ") else {
        return;
    };
    let Some(rate) = read_line("Rate: ") else {
        return;
    };
    let Some(amount) = read_line("Amount: ") else {
        return;
    };
    let Some(delay) = read_line("Seconds to wait before refreshing (blank for none): ") else {
        return;
    };

    let (rate, amount) = match (Decimal::from_str(&rate), Decimal::from_str(&amount)) {
        (Ok(r), Ok(a)) => (r, a),
        _ => {
            println!("Rate and amount must be decimal numbers");
            return;
        }
    };
    let delay = delay.parse::<u64>().ok().map(Duration::from_secs);

    match api.place_order(&pair, trade_type, rate, amount, delay).await {
        Ok(order) => print_order(&order),
        Err(e) => println!("Order failed: {}", e),
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::new();
    if config.api_key.is_empty() {
        println!("BTER_API_KEY is not set");
        return;
    }

    let api = match init_api(&config) {
        Ok(api) => api,
        Err(e) => {
            println!("Failed to start: {}", e);
            return;
        }
    };
    info!("trading client ready for {}", config.base_url);

    loop {
        println!("\nChoose an action:");
        println!("1. Show balances");
        println!("2. Order status");
        println!("3. Place buy order");
        println!("4. Place sell order");
        println!("5. Cancel order");
        println!("0. Exit");

        let Some(choice) = read_line("> ") else {
            println!("Bye");
            break;
        };

        match choice.as_str() {
            "1" => match api.get_funds().await {
                Ok(balances) => {
                    for (currency, balance) in balances {
                        println!(
                            "  {:<5} available {:<16} locked {}",
                            currency, balance.available, balance.locked
                        );
                    }
                }
                Err(e) => println!("Failed to fetch balances: {}", e),
            },
            "2" => match read_line("Order id: ").unwrap_or_default().parse::<u64>() {
                Ok(id) => match api.get_order_status(id).await {
                    Ok(order) => print_order(&order),
                    Err(e) => println!("Status query failed: {}", e),
                },
                Err(_) => println!("Order id must be an integer"),
            },
            "3" => place(&api, "buy").await,
            "4" => place(&api, "sell").await,
            "5" => match read_line("Order id: ").unwrap_or_default().parse::<u64>() {
                Ok(id) => match api.cancel_order(id, true).await {
                    Ok(msg) => println!("{}", msg.unwrap_or_else(|| "Cancelled".to_string())),
                    Err(e) => println!("Cancel failed: {}", e),
                },
                Err(_) => println!("Order id must be an integer"),
            },
            "0" => {
                println!("Bye");
                break;
            }
            _ => println!("Invalid choice"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_next_line_trims_input() {
        let mut input = Cursor::new("  3 \n0\n");
        assert_eq!(next_line(&mut input).as_deref(), Some("3"));
        assert_eq!(next_line(&mut input).as_deref(), Some("0"));
    }

    #[test]
    fn test_next_line_stops_at_eof() {
        let mut input = Cursor::new("1\n");
        assert_eq!(next_line(&mut input).as_deref(), Some("1"));
        assert_eq!(next_line(&mut input), None);
        assert_eq!(next_line(&mut input), None);
    }

    #[test]
    fn test_blank_line_is_not_eof() {
        let mut input = Cursor::new("\n");
        assert_eq!(next_line(&mut input).as_deref(), Some(""));
    }
}
