use clap::{Arg, Command};
use log::LevelFilter;
use parcel_recon::classifier::{AnalyzedMessage, ContentClassifier, MessageStatus};
use parcel_recon::config::Config;
use parcel_recon::filter::{FilterOptions, RecordFilter};
use parcel_recon::mailbox::MailStore;
use parcel_recon::message::MessageRecord;
use parcel_recon::reconciler::{OrderReconciler, OrderStatus};
use parcel_recon::report;
use std::process;

fn main() {
    let matches = Command::new("parcel-recon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Classify delivery mail and reconcile order numbers against a mail store")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("parcel-recon.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("orders")
                .long("orders")
                .value_name("FILE")
                .help("Reconcile the order numbers listed in FILE (one per line)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("mailbox")
                .long("mailbox")
                .value_name("FILE")
                .help("JSON mail store to search")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write the report to FILE as well as printing it")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("scan")
                .long("scan")
                .help("Classify every message in the mail store and print a summary")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("date-from")
                .long("date-from")
                .value_name("DATE")
                .help("Scan filter: keep messages on or after DATE (YYYY-MM-DD or DD/MM/YYYY)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("date-to")
                .long("date-to")
                .value_name("DATE")
                .help("Scan filter: keep messages on or before DATE (YYYY-MM-DD or DD/MM/YYYY)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-message")
                .long("test-message")
                .value_name("FILE")
                .help("Classify a single JSON message file and print the result")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let config_path = matches.get_one::<String>("config").unwrap();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("🔍 Testing configuration...");
        println!("  Complete keywords: {}", config.keywords.complete.len());
        println!("  Error keywords: {}", config.keywords.error.len());
        println!(
            "  Package success phrases: {}",
            config.keywords.package_success.len()
        );
        println!(
            "  Package failed phrases: {}",
            config.keywords.package_failed.len()
        );
        match ContentClassifier::new(config.keywords.clone()) {
            Ok(_) => println!("✅ All extraction patterns compiled successfully."),
            Err(e) => {
                println!("❌ Configuration validation failed: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let classifier = match ContentClassifier::new(config.keywords.clone()) {
        Ok(classifier) => classifier,
        Err(e) => {
            eprintln!("Error building classifier: {e}");
            process::exit(1);
        }
    };

    if let Some(message_file) = matches.get_one::<String>("test-message") {
        test_message_file(&classifier, message_file);
        return;
    }

    if matches.get_flag("scan") {
        let Some(mailbox_path) = matches.get_one::<String>("mailbox") else {
            eprintln!("--scan requires --mailbox FILE");
            process::exit(2);
        };
        run_scan(
            &matches,
            &classifier,
            mailbox_path,
            matches.get_one::<String>("output").map(String::as_str),
        );
        return;
    }

    if let Some(orders_path) = matches.get_one::<String>("orders") {
        let Some(mailbox_path) = matches.get_one::<String>("mailbox") else {
            eprintln!("--orders requires --mailbox FILE");
            process::exit(2);
        };
        run_reconcile(
            &config,
            &classifier,
            orders_path,
            mailbox_path,
            matches.get_one::<String>("output").map(String::as_str),
        );
        return;
    }

    eprintln!("Nothing to do: pass --orders with --mailbox, --scan, or --test-message");
    process::exit(2);
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the keyword lists to suit your mail.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn test_message_file(classifier: &ContentClassifier, path: &str) {
    println!("🧪 Testing message file: {path}");
    println!();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("❌ Error reading message file: {e}");
            process::exit(1);
        }
    };

    let record: MessageRecord = match serde_json::from_str(&content) {
        Ok(record) => record,
        Err(e) => {
            eprintln!("❌ Error parsing message file: {e}");
            process::exit(1);
        }
    };

    let result = classifier.classify(&record);

    println!("📧 Message details:");
    println!(
        "   Subject: {}",
        record.subject.as_deref().unwrap_or("(no subject)")
    );
    println!(
        "   From: {}",
        record.from.as_deref().unwrap_or("(unknown)")
    );
    println!();
    println!("   Status: {}", result.status);
    println!("   Confidence: {:.2}", result.confidence);
    if let Some(order_number) = result.order_number.as_deref() {
        println!("   Order number: {order_number}");
    }
    if !result.matched_complete.is_empty() {
        println!(
            "   Complete keywords: {}",
            result.matched_complete.join(", ")
        );
    }
    if !result.matched_error.is_empty() {
        println!("   Error keywords: {}", result.matched_error.join(", "));
    }
}

fn run_scan(
    matches: &clap::ArgMatches,
    classifier: &ContentClassifier,
    mailbox_path: &str,
    output_path: Option<&str>,
) {
    let store = match MailStore::from_file(mailbox_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error loading mail store: {e}");
            process::exit(1);
        }
    };

    let options = FilterOptions {
        date_from: matches.get_one::<String>("date-from").cloned(),
        date_to: matches.get_one::<String>("date-to").cloned(),
        ..Default::default()
    };
    let filter = match RecordFilter::new(&options) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Invalid filter: {e}");
            process::exit(1);
        }
    };

    let records = filter.apply(store.records());
    println!(
        "🔬 Analyzing {} of {} messages...",
        records.len(),
        store.len()
    );

    let analyzed = classifier.analyze(records);
    let summary = ContentClassifier::status_summary(&analyzed);

    println!();
    println!("📊 Status summary:");
    println!("  ✅ Delivered: {}", summary.delivered_total());
    println!("  ❌ Failed: {}", summary.failed_total());
    println!("  ❓ Unknown: {}", summary.unknown);
    println!("  📧 Total: {}", summary.total);

    let delivered_orders = order_numbers_with(
        &analyzed,
        &[MessageStatus::Complete, MessageStatus::PackageSuccess],
    );
    let failed_orders = order_numbers_with(
        &analyzed,
        &[MessageStatus::Error, MessageStatus::PackageFailed],
    );

    if !delivered_orders.is_empty() {
        println!();
        println!("📦 Delivered order numbers:");
        for (index, order) in delivered_orders.iter().enumerate() {
            println!("  {}. {order}", index + 1);
        }
    }
    if !failed_orders.is_empty() {
        println!();
        println!("📦 Failed order numbers:");
        for (index, order) in failed_orders.iter().enumerate() {
            println!("  {}. {order}", index + 1);
        }
    }

    if let Some(output_path) = output_path {
        if let Err(e) = report::write_analysis(&analyzed, output_path) {
            eprintln!("Error writing analysis: {e}");
            process::exit(1);
        }
        println!();
        println!("✅ Analysis written to: {output_path}");
    }
}

fn order_numbers_with(analyzed: &[AnalyzedMessage], statuses: &[MessageStatus]) -> Vec<String> {
    analyzed
        .iter()
        .filter(|message| statuses.contains(&message.result.status))
        .filter_map(|message| message.result.order_number.clone())
        .collect()
}

fn run_reconcile(
    config: &Config,
    classifier: &ContentClassifier,
    orders_path: &str,
    mailbox_path: &str,
    output_path: Option<&str>,
) {
    let order_numbers = match report::read_order_numbers(orders_path) {
        Ok(order_numbers) => order_numbers,
        Err(e) => {
            eprintln!("Error reading order numbers: {e}");
            process::exit(1);
        }
    };
    if order_numbers.is_empty() {
        eprintln!("No order numbers found in {orders_path}");
        process::exit(1);
    }

    let store = match MailStore::from_file(mailbox_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error loading mail store: {e}");
            process::exit(1);
        }
    };

    println!(
        "🔍 Reconciling {} order numbers against {} messages...",
        order_numbers.len(),
        store.len()
    );
    println!();

    let reconciler = OrderReconciler::new(config.search_max_results);
    let result = reconciler.reconcile(&order_numbers, &store, classifier);

    print!("{}", report::render_reconciliation(&result));
    println!();
    println!(
        "📈 {} success, {} failed, {} not found",
        result.count(OrderStatus::Success),
        result.count(OrderStatus::Failed),
        result.count(OrderStatus::NotFound)
    );

    if let Some(output_path) = output_path {
        if let Err(e) = report::write_reconciliation(&result, output_path) {
            eprintln!("Error writing report: {e}");
            process::exit(1);
        }
        println!("✅ Report written to: {output_path}");
    }
}
