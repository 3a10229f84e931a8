use passport::settings::*;

fn main() -> anyhow::Result<()> {
    // Load settings from the default location
    let project_settings = parse_settings(None)?;
    println!("Loaded settings: {:?}", project_settings);
    println!(
        "Token lifetimes: access {:?}, refresh {:?}",
        project_settings.jwt.access_ttl(),
        project_settings.jwt.refresh_ttl()
    );

    // Attempt to load from an invalid path (expected to fail)
    let is_err = parse_settings(Some("")).is_err();
    println!("Error on invalid path: {:?}", is_err);

    // Environment overrides, e.g.
    // $ PASSPORT_JWT__ACCESS_TTL_SECS=60 cargo run --bin settings_demo -- --settings=settings/dev.toml
    let cli = Cli::parse();
    let project_settings = parse_settings(cli.settings.as_deref())?;
    println!("Loaded settings: {:?}", project_settings);

    Ok(())
}
