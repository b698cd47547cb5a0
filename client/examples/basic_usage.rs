use std::process::exit;

use dashamail_client::{ApiMessage, Client, ClientConfig, Params, Result};

fn main() -> Result<()> {
    // Expect the API key as the first argument
    // and an optional list id after
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <api_key> [list_id]", args[0]);
        exit(1);
    }

    let config = ClientConfig::new(args[1].clone()).with_raise_for_error(true);
    let client = Client::from_config(config)?;

    // List all contact lists
    let lists = client.lists_get(&Params::new())?;
    println!("Lists: {}", serde_json::to_string_pretty(&lists)?);

    let list_id = match args.get(2).map(|s| s.parse::<i64>()) {
        Some(Ok(id)) => id,
        Some(Err(e)) => {
            eprintln!("Invalid list id: {}", e);
            exit(1);
        }
        None => {
            let created = client.lists_add("rust-client-demo", &Params::new())?;
            println!("Created list: {}", serde_json::to_string(&created)?);
            match created.get("data").and_then(|d| d.get("list_id")).and_then(|v| v.as_i64()) {
                Some(id) => id,
                None => {
                    eprintln!("No list_id in response");
                    exit(1);
                }
            }
        }
    };

    // Add a single member with a merge field
    let added = client.lists_add_member(
        list_id,
        "demo@example.com",
        &Params::new().with("merge_1", "Demo"),
    )?;
    println!("Added member: {}", serde_json::to_string(&added)?);

    // Add a batch of members
    let batch = vec![
        vec!["first@example.com", "First"],
        vec!["second@example.com", "Second"],
    ];
    let batch_result = client.lists_add_member_batch(list_id, &batch, &Params::new())?;
    println!("Batch result: {}", serde_json::to_string(&batch_result)?);

    // Check an address without raising on API errors
    let lenient = Client::from_config(client.config().clone().with_raise_for_error(false))?;
    let check = lenient.lists_check_email("demo@example.com", list_id, &Params::new())?;
    let msg = ApiMessage::from_response(&check);
    if msg.is_error() {
        println!("Check failed: {} ({})", msg.text, msg.error_type);
    } else {
        println!("Check: {}", serde_json::to_string(&check)?);
    }

    Ok(())
}
