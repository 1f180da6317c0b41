#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = consensus_view_lib::run().await {
        log::error!("{}", e);
        eprintln!("{}\n{}", e, e.recovery_suggestion());
        std::process::exit(1);
    }
}
