use chargecompare::cli::{Args, run, setup_logging};
use clap::{CommandFactory, Parser};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    let args = Args::parse();

    // No subcommand: show help and exit
    if args.command.is_none() {
        let _ = Args::command().print_help();
        println!();
        process::exit(0);
    }

    setup_logging(&args);

    // Pipeline work is sequential; the runtime only serves Ctrl+C and file output
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to create async runtime: {}", e);
            process::exit(1);
        });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancellation_token.cancel();
            } else {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = run(args, cancellation_token.clone()) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(chargecompare::ChargeError::Interrupted {
                    reason: "Processing interrupted by user".to_string(),
                }
                .into())
            }
        }
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
