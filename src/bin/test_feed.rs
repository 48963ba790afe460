use anyhow::Result;
use colored::Colorize;
use feedlens::logging;
use feedlens::rss;
use std::env;
use std::process;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    logging::configure_logging();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        return Ok(());
    }

    let url = &args[1];
    let limit: usize = args
        .get(2)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(5);

    println!("Testing feed: {}", url);

    let client = rss::create_http_client()?;
    match rss::fetch_feed_items(&client, url, limit).await {
        Ok(items) => {
            println!("\n{}", "═".repeat(100).bright_blue());
            println!("{}  {}", "FEED ENTRIES".bright_blue(), url.bright_yellow());
            println!("{}", "═".repeat(100).bright_blue());

            for (i, item) in items.iter().enumerate() {
                println!(
                    "{}. {}\n   {}\n   {}",
                    i + 1,
                    item.title.bright_white(),
                    item.link.bright_cyan(),
                    item.summary.dimmed()
                );
            }

            println!("\n{}", "═".repeat(100).bright_blue());
            println!("Feed test completed successfully with {} entries", items.len());
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{} {}", "Feed test failed:".bright_red(), err);
            process::exit(1);
        }
    }
}

// Print usage instructions
fn print_usage(program_name: &str) {
    println!("Usage: {} <feed_url> [limit]", program_name);
    println!("\nExamples:");
    println!("  {} https://www.example.com/feed", program_name);
    println!("  {} https://www.example.com/feed 10", program_name);
}
