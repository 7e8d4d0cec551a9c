use heist::HeistApp;

fn run() -> anyhow::Result<()> {
    let app = HeistApp::new()?;
    app.run()?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        println!("{:#}", err);
        std::process::exit(1);
    }
}
