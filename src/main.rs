use console::style;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = eas::cli::run_cli().await {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        std::process::exit(1);
    }
}
